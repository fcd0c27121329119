//! Layout document model: the geometric/textual hierarchy parsed from ALTO.
//!
//! A [`LayoutDocument`] owns pages, which own blocks, which own lines, which
//! own tokens. Ordering at every level encodes reading order and is preserved
//! by all transformations. Tokens are immutable by convention: transformations
//! such as [`LayoutDocument::retokenize`] build new tokens instead of mutating
//! in place, sharing the interned [`LayoutFont`] via `Arc`.

pub mod tokenizer;

use std::sync::{Arc, LazyLock};

use crate::geometry::{BoundingBox, PageCoordinates, merge_bounding_boxes};

/// Font properties shared by reference across many tokens.
///
/// Fonts are interned by id during ALTO parsing; tokens hold an
/// `Arc<LayoutFont>` so that font identity comparisons and flag lookups stay
/// cheap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutFont {
    pub font_id: String,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub is_bold: bool,
    pub is_italics: bool,
    pub is_subscript: bool,
    pub is_superscript: bool,
}

static EMPTY_FONT: LazyLock<Arc<LayoutFont>> = LazyLock::new(|| {
    Arc::new(LayoutFont {
        font_id: "_EMPTY".to_string(),
        ..LayoutFont::default()
    })
});

impl LayoutFont {
    /// The sentinel font used when a token has no resolvable style reference.
    pub fn empty() -> Arc<LayoutFont> {
        EMPTY_FONT.clone()
    }
}

/// A single token (word or symbol) with its font and page position.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutToken {
    pub text: String,
    pub font: Arc<LayoutFont>,
    /// Whitespace following the token up to the next token.
    pub whitespace: String,
    pub coordinates: Option<PageCoordinates>,
}

impl LayoutToken {
    pub fn new(
        text: impl Into<String>,
        font: Arc<LayoutFont>,
        whitespace: impl Into<String>,
        coordinates: Option<PageCoordinates>,
    ) -> Self {
        Self {
            text: text.into(),
            font,
            whitespace: whitespace.into(),
            coordinates,
        }
    }

    /// A token with the empty font, a single trailing space and no
    /// coordinates.
    pub fn for_text(text: impl Into<String>) -> Self {
        Self::new(text, LayoutFont::empty(), " ", None)
    }
}

/// Concatenate token texts including inter-token whitespace.
///
/// The trailing whitespace of the final token is omitted, so joining the
/// result of a retokenization round-trips the original token text.
pub fn join_tokens(tokens: &[LayoutToken]) -> String {
    let mut text = String::new();
    for (index, token) in tokens.iter().enumerate() {
        text.push_str(&token.text);
        if index + 1 < tokens.len() {
            text.push_str(&token.whitespace);
        }
    }
    text
}

/// Split one token into word-level sub-tokens.
///
/// Sub-token coordinates partition the original bounding box proportionally
/// to character offsets; the font reference is shared unchanged. Whitespace
/// between words is folded into the preceding sub-token's trailing
/// whitespace, and the original trailing whitespace is carried by the last
/// sub-token. Whitespace-only tokens dissolve into nothing.
pub fn retokenize_token(token: &LayoutToken) -> Vec<LayoutToken> {
    if token.text.trim().is_empty() {
        return Vec::new();
    }
    let token_texts = tokenizer::tokenize_keep_whitespace(&token.text);
    if token_texts.len() == 1 {
        return vec![token.clone()];
    }
    let total_len: usize = token_texts.iter().map(|text| text.chars().count()).sum();
    // (text, trailing whitespace, character offset) per surviving sub-token
    let mut parts: Vec<(String, String, usize)> = Vec::new();
    let mut pending_text: Option<(String, usize)> = None;
    let mut pending_whitespace = String::new();
    let mut char_offset = 0usize;
    for token_text in token_texts {
        let len = token_text.chars().count();
        if token_text.trim().is_empty() {
            pending_whitespace.push_str(&token_text);
            char_offset += len;
            continue;
        }
        if let Some((text, offset)) = pending_text.take() {
            parts.push((text, std::mem::take(&mut pending_whitespace), offset));
        }
        pending_whitespace.clear();
        pending_text = Some((token_text, char_offset));
        char_offset += len;
    }
    pending_whitespace.push_str(&token.whitespace);
    if let Some((text, offset)) = pending_text {
        parts.push((text, pending_whitespace, offset));
    }
    parts
        .into_iter()
        .map(|(text, whitespace, offset)| {
            let len = text.chars().count();
            LayoutToken::new(
                text,
                token.font.clone(),
                whitespace,
                token
                    .coordinates
                    .map(|coordinates| coordinates.relative(offset, len, total_len)),
            )
        })
        .collect()
}

/// An ordered sequence of tokens forming one physical line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutLine {
    pub tokens: Vec<LayoutToken>,
}

impl LayoutLine {
    pub fn new(tokens: Vec<LayoutToken>) -> Self {
        Self { tokens }
    }

    /// Joined text of the line including inter-token whitespace.
    pub fn text(&self) -> String {
        join_tokens(&self.tokens)
    }

    pub fn flat_map_tokens(&self, f: &impl Fn(&LayoutToken) -> Vec<LayoutToken>) -> LayoutLine {
        LayoutLine::new(self.tokens.iter().flat_map(f).collect())
    }
}

/// An ordered sequence of lines forming one text block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutBlock {
    pub lines: Vec<LayoutLine>,
}

impl LayoutBlock {
    pub fn new(lines: Vec<LayoutLine>) -> Self {
        Self { lines }
    }

    /// A block with all tokens in a single line.
    pub fn for_tokens(tokens: Vec<LayoutToken>) -> Self {
        Self::new(vec![LayoutLine::new(tokens)])
    }

    /// A block built from plain text, tokenized into word tokens.
    pub fn for_text(text: &str) -> Self {
        Self::for_tokens(
            tokenizer::tokenize(text)
                .into_iter()
                .map(LayoutToken::for_text)
                .collect(),
        )
    }

    pub fn iter_tokens(&self) -> impl Iterator<Item = &LayoutToken> {
        self.lines.iter().flat_map(|line| line.tokens.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.tokens.is_empty())
    }

    pub fn text(&self) -> String {
        let tokens: Vec<LayoutToken> = self.iter_tokens().cloned().collect();
        join_tokens(&tokens)
    }

    /// Trailing whitespace of the block, i.e. of its last token.
    pub fn whitespace(&self) -> String {
        self.iter_tokens()
            .last()
            .map(|token| token.whitespace.clone())
            .unwrap_or_default()
    }

    /// Concatenate the lines of several blocks into one block, in order.
    pub fn merge_blocks(blocks: impl IntoIterator<Item = LayoutBlock>) -> LayoutBlock {
        LayoutBlock::new(blocks.into_iter().flat_map(|block| block.lines).collect())
    }

    /// Union of token bounding boxes, one entry per contiguous page run.
    ///
    /// Tokens without coordinates are skipped. A token on a different page
    /// than its predecessor starts a new coordinate group.
    pub fn merged_coordinates_list(&self) -> Vec<PageCoordinates> {
        let mut result: Vec<PageCoordinates> = Vec::new();
        let mut current_page: Option<u32> = None;
        let mut current_boxes: Vec<BoundingBox> = Vec::new();
        let mut flush =
            |page: Option<u32>, boxes: &mut Vec<BoundingBox>, result: &mut Vec<PageCoordinates>| {
                if let Some(page_number) = page {
                    if !boxes.is_empty() {
                        let merged = merge_bounding_boxes(boxes.drain(..));
                        result.push(PageCoordinates::new(
                            merged.x,
                            merged.y,
                            merged.width,
                            merged.height,
                            page_number,
                        ));
                    }
                }
            };
        for token in self.iter_tokens() {
            let Some(coordinates) = token.coordinates else {
                continue;
            };
            if current_page != Some(coordinates.page_number) {
                flush(current_page, &mut current_boxes, &mut result);
                current_page = Some(coordinates.page_number);
            }
            current_boxes.push(coordinates.bounding_box());
        }
        flush(current_page, &mut current_boxes, &mut result);
        result
    }

    pub fn flat_map_tokens(&self, f: &impl Fn(&LayoutToken) -> Vec<LayoutToken>) -> LayoutBlock {
        LayoutBlock::new(
            self.lines
                .iter()
                .map(|line| line.flat_map_tokens(f))
                .collect(),
        )
    }

    /// Drop lines left without tokens.
    pub fn remove_empty_lines(&self) -> LayoutBlock {
        LayoutBlock::new(
            self.lines
                .iter()
                .filter(|line| !line.tokens.is_empty())
                .cloned()
                .collect(),
        )
    }
}

/// An ordered sequence of blocks forming one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPage {
    pub blocks: Vec<LayoutBlock>,
}

impl LayoutPage {
    pub fn new(blocks: Vec<LayoutBlock>) -> Self {
        Self { blocks }
    }

    pub fn flat_map_tokens(&self, f: &impl Fn(&LayoutToken) -> Vec<LayoutToken>) -> LayoutPage {
        LayoutPage::new(
            self.blocks
                .iter()
                .map(|block| block.flat_map_tokens(f))
                .collect(),
        )
    }

    /// Drop empty lines, then blocks left without lines.
    pub fn remove_empty_blocks(&self) -> LayoutPage {
        LayoutPage::new(
            self.blocks
                .iter()
                .map(|block| block.remove_empty_lines())
                .filter(|block| !block.lines.is_empty())
                .collect(),
        )
    }
}

/// A whole document in physical layout order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutDocument {
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    pub fn new(pages: Vec<LayoutPage>) -> Self {
        Self { pages }
    }

    pub fn iter_all_blocks(&self) -> impl Iterator<Item = &LayoutBlock> {
        self.pages.iter().flat_map(|page| page.blocks.iter())
    }

    pub fn iter_all_lines(&self) -> impl Iterator<Item = &LayoutLine> {
        self.iter_all_blocks().flat_map(|block| block.lines.iter())
    }

    pub fn iter_all_tokens(&self) -> impl Iterator<Item = &LayoutToken> {
        self.iter_all_lines().flat_map(|line| line.tokens.iter())
    }

    /// Apply `f` to every token in document order, splicing the returned
    /// tokens in place while preserving the line/block/page nesting.
    pub fn flat_map_tokens(&self, f: impl Fn(&LayoutToken) -> Vec<LayoutToken>) -> LayoutDocument {
        LayoutDocument::new(
            self.pages
                .iter()
                .map(|page| page.flat_map_tokens(&f))
                .collect(),
        )
    }

    /// Re-split all tokens with the word tokenizer (see [`retokenize_token`]).
    pub fn retokenize(&self) -> LayoutDocument {
        self.flat_map_tokens(retokenize_token)
    }

    /// Drop empty lines, empty blocks and empty pages, bottom-up.
    pub fn remove_empty_blocks(&self) -> LayoutDocument {
        LayoutDocument::new(
            self.pages
                .iter()
                .map(|page| page.remove_empty_blocks())
                .filter(|page| !page.blocks.is_empty())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_coordinates(text: &str, coordinates: PageCoordinates) -> LayoutToken {
        LayoutToken::new(text, LayoutFont::empty(), " ", Some(coordinates))
    }

    #[test]
    fn join_tokens_omits_final_whitespace() {
        let tokens = vec![LayoutToken::for_text("a"), LayoutToken::for_text("b")];
        assert_eq!(join_tokens(&tokens), "a b");
    }

    #[test]
    fn retokenize_keeps_single_word_token() {
        let token = LayoutToken::for_text("token");
        assert_eq!(retokenize_token(&token), vec![token]);
    }

    #[test]
    fn retokenize_drops_whitespace_only_token() {
        let token = LayoutToken::for_text("   ");
        assert!(retokenize_token(&token).is_empty());
    }

    #[test]
    fn retokenize_folds_whitespace_into_preceding_token() {
        let token = LayoutToken::new("two  words", LayoutFont::empty(), "\n", None);
        let result = retokenize_token(&token);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "two");
        assert_eq!(result[0].whitespace, "  ");
        assert_eq!(result[1].text, "words");
        assert_eq!(result[1].whitespace, "\n");
    }

    #[test]
    fn retokenize_round_trips_text_and_whitespace() {
        let token = LayoutToken::new("a, b (c)", LayoutFont::empty(), " ", None);
        let result = retokenize_token(&token);
        let joined: String = result
            .iter()
            .map(|token| format!("{}{}", token.text, token.whitespace))
            .collect();
        assert_eq!(joined, "a, b (c) ");
    }

    #[test]
    fn retokenize_partitions_coordinates_proportionally() {
        let coordinates = PageCoordinates::new(0.0, 5.0, 100.0, 10.0, 1);
        let token = token_with_coordinates("ab cdefg", coordinates);
        let result = retokenize_token(&token);
        assert_eq!(result.len(), 2);
        let first = result[0].coordinates.unwrap();
        let second = result[1].coordinates.unwrap();
        // 8 characters total: "ab" covers 2/8, "cdefg" 5/8 starting at 3/8
        assert_eq!(first.x, 0.0);
        assert_eq!(first.width, 25.0);
        assert_eq!(second.x, 37.5);
        assert_eq!(second.width, 62.5);
        assert_eq!(first.y, 5.0);
        assert_eq!(first.height, 10.0);
        assert_eq!(second.page_number, 1);
    }

    #[test]
    fn retokenize_preserves_font_reference() {
        let font = Arc::new(LayoutFont {
            font_id: "font1".to_string(),
            is_bold: true,
            ..LayoutFont::default()
        });
        let token = LayoutToken::new("two words", font.clone(), " ", None);
        for sub_token in retokenize_token(&token) {
            assert!(Arc::ptr_eq(&sub_token.font, &font));
        }
    }

    #[test]
    fn document_retokenize_preserves_structure() {
        let document = LayoutDocument::new(vec![LayoutPage::new(vec![LayoutBlock::new(vec![
            LayoutLine::new(vec![LayoutToken::for_text("two words")]),
            LayoutLine::new(vec![LayoutToken::for_text("single")]),
        ])])]);
        let retokenized = document.retokenize();
        assert_eq!(retokenized.pages.len(), 1);
        assert_eq!(retokenized.pages[0].blocks.len(), 1);
        let block = &retokenized.pages[0].blocks[0];
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.lines[0].tokens.len(), 2);
        assert_eq!(block.lines[1].tokens.len(), 1);
    }

    #[test]
    fn remove_empty_blocks_prunes_bottom_up() {
        let document = LayoutDocument::new(vec![
            LayoutPage::new(vec![
                LayoutBlock::new(vec![
                    LayoutLine::new(vec![LayoutToken::for_text("kept")]),
                    LayoutLine::new(vec![]),
                ]),
                LayoutBlock::new(vec![LayoutLine::new(vec![])]),
            ]),
            LayoutPage::new(vec![]),
        ]);
        let pruned = document.remove_empty_blocks();
        assert_eq!(pruned.pages.len(), 1);
        assert_eq!(pruned.pages[0].blocks.len(), 1);
        assert_eq!(pruned.pages[0].blocks[0].lines.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_retokenize_round_trips_text_and_whitespace(
                text in "[a-zA-Z0-9,.()-]{1,12}( +[a-zA-Z0-9,.()-]{1,12}){0,4}",
                whitespace in " {0,3}",
            ) {
                let token = LayoutToken::new(&text, LayoutFont::empty(), &whitespace, None);
                let joined: String = retokenize_token(&token)
                    .iter()
                    .map(|sub_token| format!("{}{}", sub_token.text, sub_token.whitespace))
                    .collect();
                prop_assert_eq!(joined, format!("{text}{whitespace}"));
            }

            #[test]
            fn prop_retokenize_sub_token_widths_sum_to_original(
                words in prop::collection::vec("[a-z]{1,8}", 1..5),
                width in 1.0f64..500.0,
            ) {
                let text = words.join(" ");
                let token = LayoutToken::new(
                    &text,
                    LayoutFont::empty(),
                    " ",
                    Some(PageCoordinates::new(0.0, 0.0, width, 10.0, 1)),
                );
                let total_chars = text.chars().count() as f64;
                let covered: f64 = retokenize_token(&token)
                    .iter()
                    .filter_map(|sub_token| sub_token.coordinates)
                    .map(|coordinates| coordinates.width)
                    .sum();
                let whitespace_chars = (words.len() - 1) as f64;
                let expected = width * (total_chars - whitespace_chars) / total_chars;
                prop_assert!((covered - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn merged_coordinates_groups_by_page_run() {
        let block = LayoutBlock::for_tokens(vec![
            token_with_coordinates("a", PageCoordinates::new(0.0, 0.0, 10.0, 10.0, 1)),
            token_with_coordinates("b", PageCoordinates::new(20.0, 0.0, 10.0, 10.0, 1)),
            token_with_coordinates("c", PageCoordinates::new(0.0, 0.0, 10.0, 10.0, 2)),
        ]);
        let merged = block.merged_coordinates_list();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], PageCoordinates::new(0.0, 0.0, 30.0, 10.0, 1));
        assert_eq!(merged[1], PageCoordinates::new(0.0, 0.0, 10.0, 10.0, 2));
    }
}
