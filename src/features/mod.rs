//! Per-token feature extraction for external sequence-labeling models.
//!
//! Each model type (segmentation, header, affiliation-address, fulltext,
//! figure) emits a fixed, ordered set of string-valued columns per token (or
//! per line for segmentation). The column order and count are part of the
//! model interchange format and must never change silently: every generator
//! verifies its arity and fails with [`Error::FeatureSchema`] on mismatch.
//!
//! Several columns reproduce a legacy feature schema whose signals are not
//! computed here; those are emitted as the named `DUMMY_*` constants below
//! and are intentionally inert.

pub mod affiliation;
pub mod figure;
pub mod fulltext;
pub mod header;
pub mod segmentation;

use crate::error::{Error, Result};
use crate::layout::{LayoutDocument, LayoutToken};

pub const LINESTART: &str = "LINESTART";
pub const LINEIN: &str = "LINEIN";
pub const LINEEND: &str = "LINEEND";
pub const BLOCKSTART: &str = "BLOCKSTART";
pub const BLOCKIN: &str = "BLOCKIN";
pub const BLOCKEND: &str = "BLOCKEND";
pub const PAGESTART: &str = "PAGESTART";
pub const PAGEIN: &str = "PAGEIN";
pub const PAGEEND: &str = "PAGEEND";

pub const ALLCAP: &str = "ALLCAP";
pub const INITCAP: &str = "INITCAP";
pub const NOCAPS: &str = "NOCAPS";

pub const ALLDIGIT: &str = "ALLDIGIT";
pub const CONTAINSDIGITS: &str = "CONTAINSDIGITS";
pub const NODIGIT: &str = "NODIGIT";

pub const SAMEFONT: &str = "SAMEFONT";
pub const NEWFONT: &str = "NEWFONT";
pub const HIGHERFONT: &str = "HIGHERFONT";
pub const LOWERFONT: &str = "LOWERFONT";
pub const SAMEFONTSIZE: &str = "SAMEFONTSIZE";

pub const LINEINDENT: &str = "LINEINDENT";
pub const ALIGNEDLEFT: &str = "ALIGNEDLEFT";

/// Placeholder value for legacy boolean columns with no signal behind them.
pub const DUMMY_FEATURE: &str = "0";
/// Placeholder page status emitted by token-level schemas.
pub const DUMMY_PAGE_STATUS: &str = PAGEIN;
/// Placeholder callout type column of the fulltext schema.
pub const DUMMY_CALLOUT_TYPE: &str = "UNKNOWN";

pub const LINE_SCALE_BINS: usize = 10;
pub const POSITION_BINS: usize = 12;

/// Discretize `pos` (0..=total) into `bins` following a linear scale.
///
/// Clamped to 0 at or below the start and to `bins` at or beyond the end, so
/// the boundary bin is inclusive.
pub fn linear_scale(pos: usize, total: usize, bins: usize) -> usize {
    if pos >= total {
        return bins;
    }
    if pos == 0 {
        return 0;
    }
    (pos as f64 / total as f64 * bins as f64).floor() as usize
}

pub fn bool_feature(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// ALLCAP when no lowercase letter is present and at least one letter exists,
/// INITCAP when the first character is uppercase, NOCAPS otherwise.
pub fn capitalisation_feature(text: &str) -> &'static str {
    let has_letter = text.chars().any(char::is_alphabetic);
    let has_lowercase = text.chars().any(char::is_lowercase);
    if has_letter && !has_lowercase {
        return ALLCAP;
    }
    if text.chars().next().is_some_and(char::is_uppercase) {
        return INITCAP;
    }
    NOCAPS
}

pub fn digit_feature(text: &str) -> &'static str {
    let mut any_digit = false;
    let mut all_digits = !text.is_empty();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            any_digit = true;
        } else {
            all_digits = false;
        }
    }
    if all_digits {
        ALLDIGIT
    } else if any_digit {
        CONTAINSDIGITS
    } else {
        NODIGIT
    }
}

fn char_shape(ch: char) -> char {
    if ch.is_ascii_digit() {
        'd'
    } else if ch.is_alphabetic() {
        if ch.is_uppercase() { 'X' } else { 'x' }
    } else {
        ch
    }
}

/// Word shape: first shape character verbatim, consecutive duplicates
/// collapsed in the middle, last two shape characters verbatim.
///
/// Shape characters are `d` for digits, `X`/`x` for upper/lowercase letters
/// and the character itself otherwise, so `"Smith"` becomes `"Xxxx"` and
/// `"A1234b"` becomes `"Xddx"`.
pub fn word_shape_feature(text: &str) -> String {
    let shape: Vec<char> = text.chars().map(char_shape).collect();
    let prefix = &shape[..shape.len().min(1)];
    let middle = if shape.len() > 3 {
        &shape[1..shape.len() - 2]
    } else {
        &[]
    };
    let suffix_start = shape.len().max(3) - 2;
    let suffix = if shape.len() > 1 {
        &shape[suffix_start..]
    } else {
        &[]
    };
    let mut collapsed: Vec<char> = Vec::with_capacity(shape.len());
    collapsed.extend_from_slice(prefix);
    let mut previous: Option<char> = None;
    for &ch in middle {
        if previous != Some(ch) {
            collapsed.push(ch);
        }
        previous = Some(ch);
    }
    collapsed.extend_from_slice(suffix);
    collapsed.into_iter().collect()
}

pub const OPENBRACKET: &str = "OPENBRACKET";
pub const ENDBRACKET: &str = "ENDBRACKET";
pub const DOT: &str = "DOT";
pub const COMMA: &str = "COMMA";
pub const HYPHEN: &str = "HYPHEN";
pub const QUOTE: &str = "QUOTE";
pub const PUNCT: &str = "PUNCT";
pub const NOPUNCT: &str = "NOPUNCT";

/// Punctuation glyphs participating in the line punctuation profile.
const PUNCTUATION_PROFILE_CHARACTERS: &str =
    "(（[ •*,:;?.!/)）-−–‐«»„\"“”‘’'`$#@]*\u{2666}\u{2665}\u{2663}\u{2660}\u{00A0}";

/// Category of a token that consists of a known punctuation glyph.
pub fn punctuation_type_feature(text: &str) -> &'static str {
    match text {
        "(" | "[" => OPENBRACKET,
        ")" | "]" => ENDBRACKET,
        "." => DOT,
        "," => COMMA,
        "-" | "–" => HYPHEN,
        "\"" | "'" | "`" | "’" => QUOTE,
        _ => {
            let is_punct = !text.is_empty()
                && text.chars().all(|ch| matches!(ch, ',' | ':' | ';' | '?' | '.'));
            if is_punct { PUNCT } else { NOPUNCT }
        }
    }
}

/// The punctuation glyphs of `text`, in order, everything else removed.
pub fn punctuation_profile_feature(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace() && PUNCTUATION_PROFILE_CHARACTERS.contains(*ch))
        .collect()
}

/// Length of a punctuation profile as a feature value: `"no"` when empty,
/// otherwise the length capped at 10.
pub fn punctuation_profile_length_feature(profile: &str) -> String {
    if profile.is_empty() {
        return "no".to_string();
    }
    profile.chars().count().min(10).to_string()
}

/// SAMEFONT/NEWFONT by comparing font family with the preceding token.
pub fn font_status_feature(
    previous_token: Option<&LayoutToken>,
    token: &LayoutToken,
) -> &'static str {
    match previous_token {
        Some(previous) if previous.font.font_family == token.font.font_family => SAMEFONT,
        _ => NEWFONT,
    }
}

/// Font-size trend relative to the preceding token, defaulting to HIGHERFONT
/// when either size is unknown or there is no preceding token.
pub fn font_size_feature(
    previous_token: Option<&LayoutToken>,
    token: &LayoutToken,
) -> &'static str {
    let Some(previous) = previous_token else {
        return HIGHERFONT;
    };
    match (previous.font.font_size, token.font.font_size) {
        (Some(previous_size), Some(size)) if previous_size != 0.0 && size != 0.0 => {
            if previous_size < size {
                HIGHERFONT
            } else if previous_size > size {
                LOWERFONT
            } else {
                SAMEFONTSIZE
            }
        }
        _ => HIGHERFONT,
    }
}

/// LINESTART/LINEIN/LINEEND by token index; for a single-token line the
/// LINEEND check wins.
pub fn line_status(token_index: usize, token_count: usize) -> &'static str {
    if token_index + 1 == token_count {
        LINEEND
    } else if token_index == 0 {
        LINESTART
    } else {
        LINEIN
    }
}

/// Variant where a single-token line reports LINESTART instead of LINEEND.
pub fn line_status_prefer_start(token_index: usize, token_count: usize) -> &'static str {
    if token_index == 0 {
        LINESTART
    } else if token_index + 1 == token_count {
        LINEEND
    } else {
        LINEIN
    }
}

/// Block status derived from the line position combined with the token's
/// line status; the BLOCKEND check wins for a single-line block.
pub fn block_status(line_index: usize, line_count: usize, line_status: &str) -> &'static str {
    if line_index + 1 == line_count && line_status == LINEEND {
        BLOCKEND
    } else if line_index == 0 && line_status == LINESTART {
        BLOCKSTART
    } else {
        BLOCKIN
    }
}

/// Variant where the BLOCKSTART check wins for a single-line block.
pub fn block_status_prefer_start(
    line_index: usize,
    line_count: usize,
    line_status: &str,
) -> &'static str {
    if line_index == 0 && line_status == LINESTART {
        BLOCKSTART
    } else if line_index + 1 == line_count && line_status == LINEEND {
        BLOCKEND
    } else {
        BLOCKIN
    }
}

/// Document-wide font statistics, computed once per document.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeFontSize {
    pub largest: f64,
    pub smallest: f64,
    pub mean: f64,
}

impl RelativeFontSize {
    pub fn for_tokens<'a>(tokens: impl Iterator<Item = &'a LayoutToken>) -> Self {
        let sizes: Vec<f64> = tokens
            .filter_map(|token| token.font.font_size)
            .filter(|&size| size != 0.0)
            .collect();
        if sizes.is_empty() {
            return Self {
                largest: 0.0,
                smallest: 0.0,
                mean: 0.0,
            };
        }
        Self {
            largest: sizes.iter().cloned().fold(f64::MIN, f64::max),
            smallest: sizes.iter().cloned().fold(f64::MAX, f64::min),
            mean: sizes.iter().sum::<f64>() / sizes.len() as f64,
        }
    }

    pub fn is_largest(&self, token: &LayoutToken) -> bool {
        token.font.font_size == Some(self.largest)
    }

    pub fn is_smallest(&self, token: &LayoutToken) -> bool {
        token.font.font_size == Some(self.smallest)
    }

    pub fn is_larger_than_average(&self, token: &LayoutToken) -> bool {
        token
            .font
            .font_size
            .is_some_and(|size| size != 0.0 && size > self.mean)
    }
}

/// Stateful per-line indentation tracker.
///
/// On each new line, the first positioned token's x coordinate is compared to
/// the previous line's; a shift larger than one estimated character width
/// (box width divided by character count) toggles the indentation status,
/// otherwise the status carries over. State changes only at
/// [`LineIndentation::on_new_line`] boundaries.
#[derive(Debug, Default)]
pub struct LineIndentation {
    line_start_x: Option<f64>,
    is_new_line: bool,
    is_indented: bool,
}

impl LineIndentation {
    pub fn new() -> Self {
        Self {
            line_start_x: None,
            is_new_line: true,
            is_indented: false,
        }
    }

    pub fn on_new_line(&mut self) {
        self.is_new_line = true;
    }

    /// Update with the next token in reading order and return the current
    /// indentation status.
    pub fn update(&mut self, token: &LayoutToken) -> bool {
        if self.is_new_line && !token.text.is_empty() {
            if let Some(coordinates) = token.coordinates {
                let previous_line_start_x = self.line_start_x;
                self.line_start_x = Some(coordinates.x);
                let character_width = coordinates.width / token.text.chars().count() as f64;
                if let Some(previous_x) = previous_line_start_x {
                    if coordinates.x - previous_x > character_width {
                        self.is_indented = true;
                    }
                    if previous_x - coordinates.x > character_width {
                        self.is_indented = false;
                    }
                }
            }
        }
        self.is_new_line = false;
        self.is_indented
    }
}

/// One generated feature row with back-references to its layout position.
///
/// `line_index` and `token_index` are document-order ordinals (lines and
/// tokens counted across the whole document) used to re-associate model
/// output with the layout document. Line-level rows carry no token ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutModelData {
    pub data_line: String,
    pub line_index: Option<usize>,
    pub token_index: Option<usize>,
}

impl LayoutModelData {
    /// The text column the model echoes back, i.e. the first column.
    pub fn label_token_text(&self) -> &str {
        self.data_line.split(' ').next().unwrap_or_default()
    }
}

/// A model-specific feature generator producing one row per token (or line).
pub trait DataGenerator {
    /// Stream feature rows for `document` in reading order.
    fn for_each_model_data(
        &self,
        document: &LayoutDocument,
        f: &mut dyn FnMut(LayoutModelData),
    ) -> Result<()>;

    fn model_data(&self, document: &LayoutDocument) -> Result<Vec<LayoutModelData>> {
        let mut rows = Vec::new();
        self.for_each_model_data(document, &mut |row| rows.push(row))?;
        Ok(rows)
    }

    fn data_lines(&self, document: &LayoutDocument) -> Result<Vec<String>> {
        Ok(self
            .model_data(document)?
            .into_iter()
            .map(|row| row.data_line)
            .collect())
    }

    /// Feature lines for multiple documents, blank-line separated.
    fn data_lines_for_documents(&self, documents: &[LayoutDocument]) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for (index, document) in documents.iter().enumerate() {
            if index > 0 {
                lines.push(String::new());
            }
            lines.extend(self.data_lines(document)?);
        }
        Ok(lines)
    }
}

/// Per-token feature context assembled during the document walk.
pub struct TokenFeatures<'a> {
    pub token: &'a LayoutToken,
    pub previous_token: Option<&'a LayoutToken>,
    pub token_index: usize,
    pub token_count: usize,
    pub line_index: usize,
    pub line_count: usize,
    pub document_token_index: usize,
    pub document_token_count: usize,
    pub document_line_index: usize,
    /// Concatenated token texts of the line, without whitespace.
    pub line_text: &'a str,
    pub max_line_text_length: usize,
    /// Running character position of the token within `line_text`.
    pub line_char_position: usize,
    pub is_indented: bool,
    pub font_stats: &'a RelativeFontSize,
}

impl TokenFeatures<'_> {
    pub fn token_text(&self) -> &str {
        &self.token.text
    }

    pub fn lower_token_text(&self) -> String {
        self.token.text.to_lowercase()
    }

    /// Prefix of up to `n` characters, not padded if shorter.
    pub fn prefix(&self, n: usize) -> String {
        self.token.text.chars().take(n).collect()
    }

    /// Suffix of up to `n` characters, not padded if shorter.
    pub fn suffix(&self, n: usize) -> String {
        let chars: Vec<char> = self.token.text.chars().collect();
        chars[chars.len().saturating_sub(n)..].iter().collect()
    }

    pub fn is_bold(&self) -> &'static str {
        bool_feature(self.token.font.is_bold)
    }

    pub fn is_italic(&self) -> &'static str {
        bool_feature(self.token.font.is_italics)
    }

    pub fn is_superscript(&self) -> &'static str {
        bool_feature(self.token.font.is_superscript)
    }

    pub fn is_single_char(&self) -> &'static str {
        bool_feature(self.token.text.chars().count() == 1)
    }

    pub fn digit_status(&self) -> &'static str {
        digit_feature(&self.token.text)
    }

    /// Purely-digit tokens are forced to NOCAPS regardless of case.
    pub fn capitalisation_status(&self) -> &'static str {
        if self.digit_status() == ALLDIGIT {
            return NOCAPS;
        }
        capitalisation_feature(&self.token.text)
    }

    pub fn punctuation_type(&self) -> &'static str {
        punctuation_type_feature(&self.token.text)
    }

    pub fn word_shape(&self) -> String {
        word_shape_feature(&self.token.text)
    }

    pub fn font_status(&self) -> &'static str {
        font_status_feature(self.previous_token, self.token)
    }

    pub fn font_size_status(&self) -> &'static str {
        font_size_feature(self.previous_token, self.token)
    }

    pub fn is_largest_font(&self) -> &'static str {
        bool_feature(self.font_stats.is_largest(self.token))
    }

    pub fn is_smallest_font(&self) -> &'static str {
        bool_feature(self.font_stats.is_smallest(self.token))
    }

    pub fn is_larger_than_average_font(&self) -> &'static str {
        bool_feature(self.font_stats.is_larger_than_average(self.token))
    }

    pub fn line_status(&self) -> &'static str {
        line_status(self.token_index, self.token_count)
    }

    pub fn line_status_prefer_start(&self) -> &'static str {
        line_status_prefer_start(self.token_index, self.token_count)
    }

    pub fn block_status(&self) -> &'static str {
        block_status(self.line_index, self.line_count, self.line_status())
    }

    pub fn block_status_prefer_start(&self) -> &'static str {
        block_status_prefer_start(
            self.line_index,
            self.line_count,
            self.line_status_prefer_start(),
        )
    }

    pub fn alignment_status(&self) -> &'static str {
        if self.is_indented { LINEINDENT } else { ALIGNEDLEFT }
    }

    pub fn line_punctuation_profile(&self) -> String {
        punctuation_profile_feature(self.line_text)
    }

    pub fn line_punctuation_profile_length(&self) -> String {
        punctuation_profile_length_feature(&self.line_punctuation_profile())
    }

    pub fn line_token_relative_position(&self) -> String {
        linear_scale(
            self.line_char_position,
            self.line_text.chars().count(),
            LINE_SCALE_BINS,
        )
        .to_string()
    }

    pub fn line_relative_length(&self) -> String {
        linear_scale(
            self.line_text.chars().count(),
            self.max_line_text_length,
            LINE_SCALE_BINS,
        )
        .to_string()
    }

    pub fn document_token_relative_position(&self) -> String {
        linear_scale(
            self.document_token_index,
            self.document_token_count,
            POSITION_BINS,
        )
        .to_string()
    }
}

/// Walk `document` in reading order, assembling a [`TokenFeatures`] context
/// per token.
///
/// The font statistics and indentation tracker are constructed fresh per
/// call; no state survives across documents. Lines without tokens are
/// skipped.
pub fn for_each_token_features(
    document: &LayoutDocument,
    mut f: impl FnMut(&TokenFeatures) -> Result<()>,
) -> Result<()> {
    let font_stats = RelativeFontSize::for_tokens(document.iter_all_tokens());
    let line_texts: Vec<String> = document
        .iter_all_lines()
        .map(|line| line.tokens.iter().map(|token| token.text.as_str()).collect())
        .collect();
    let max_line_text_length = line_texts
        .iter()
        .map(|text| text.chars().count())
        .max()
        .unwrap_or(0);
    let document_token_count = document.iter_all_tokens().count();
    let mut indentation = LineIndentation::new();
    let mut previous_token: Option<&LayoutToken> = None;
    let mut document_token_index = 0usize;
    let mut document_line_index = 0usize;
    for block in document.iter_all_blocks() {
        let line_count = block.lines.len();
        for (line_index, line) in block.lines.iter().enumerate() {
            indentation.on_new_line();
            let line_text = line_texts[document_line_index].as_str();
            let token_count = line.tokens.len();
            let mut line_char_position = 0usize;
            for (token_index, token) in line.tokens.iter().enumerate() {
                let is_indented = indentation.update(token);
                f(&TokenFeatures {
                    token,
                    previous_token,
                    token_index,
                    token_count,
                    line_index,
                    line_count,
                    document_token_index,
                    document_token_count,
                    document_line_index,
                    line_text,
                    max_line_text_length,
                    line_char_position,
                    is_indented,
                    font_stats: &font_stats,
                })?;
                previous_token = Some(token);
                line_char_position += token.text.chars().count();
                document_token_index += 1;
            }
            document_line_index += 1;
        }
    }
    Ok(())
}

/// A token-level feature schema: a fixed ordered column list per token.
pub trait TokenFeatureSchema {
    /// Exact number of columns per row; a mismatch is a fatal
    /// internal-consistency error.
    const COLUMN_COUNT: usize;

    fn row(&self, features: &TokenFeatures) -> Vec<String>;
}

impl<S: TokenFeatureSchema> DataGenerator for S {
    fn for_each_model_data(
        &self,
        document: &LayoutDocument,
        f: &mut dyn FnMut(LayoutModelData),
    ) -> Result<()> {
        for_each_token_features(document, |features| {
            let row = self.row(features);
            if row.len() != Self::COLUMN_COUNT {
                return Err(Error::FeatureSchema {
                    expected: Self::COLUMN_COUNT,
                    actual: row.len(),
                });
            }
            f(LayoutModelData {
                data_line: row.join(" "),
                line_index: Some(features.document_line_index),
                token_index: Some(features.document_token_index),
            });
            Ok(())
        })
    }
}

const NBSP: char = '\u{00A0}';

/// Escape a whole-line feature column: spaces and tabs become NBSP so the
/// column stays a single whitespace-delimited field.
pub fn format_feature_text(text: &str) -> String {
    text.trim()
        .chars()
        .map(|ch| if ch == ' ' || ch == '\t' { NBSP } else { ch })
        .collect()
}
