//! Feature schema of the segmentation model.
//!
//! Unlike the token-level models, segmentation emits one row per layout
//! *line*: the row describes the line's first token plus line-level context
//! (block/page status, line length, punctuation profile, the whole line text
//! as an NBSP-escaped column).

use crate::error::{Error, Result};
use crate::layout::{LayoutDocument, LayoutToken};

use super::{
    BLOCKEND, BLOCKIN, BLOCKSTART, DUMMY_FEATURE, DataGenerator, LINE_SCALE_BINS, LayoutModelData,
    PAGEEND, PAGEIN, PAGESTART, POSITION_BINS, bool_feature, capitalisation_feature,
    digit_feature, font_size_feature, font_status_feature, format_feature_text, linear_scale,
    punctuation_profile_feature, punctuation_profile_length_feature, ALLDIGIT, NOCAPS,
};

/// Line-level block status: first line is BLOCKSTART regardless of its
/// token-level line status.
fn segmentation_block_status(line_index: usize, line_count: usize) -> &'static str {
    if line_index == 0 {
        BLOCKSTART
    } else if line_index + 1 == line_count {
        BLOCKEND
    } else {
        BLOCKIN
    }
}

fn segmentation_page_status(
    block_index: usize,
    block_count: usize,
    block_status: &str,
) -> &'static str {
    if block_index == 0 && block_status == BLOCKSTART {
        PAGESTART
    } else if block_index + 1 == block_count && block_status == BLOCKEND {
        PAGEEND
    } else {
        PAGEIN
    }
}

/// Whether the block's bounding box intersects the page's main area; the
/// signal is not computed here, every line counts as main area.
const DUMMY_IS_MAIN_AREA: &str = "1";

pub const SEGMENTATION_COLUMN_COUNT: usize = 34;

/// Line-level generator for the segmentation model (34 columns).
#[derive(Debug, Default)]
pub struct SegmentationDataGenerator;

impl DataGenerator for SegmentationDataGenerator {
    fn for_each_model_data(
        &self,
        document: &LayoutDocument,
        f: &mut dyn FnMut(LayoutModelData),
    ) -> Result<()> {
        let document_token_count = document.iter_all_tokens().count();
        let mut document_token_index = 0usize;
        let mut document_line_index = 0usize;
        let mut previous_token: Option<&LayoutToken> = None;
        for page in &document.pages {
            let block_count = page.blocks.len();
            for (block_index, block) in page.blocks.iter().enumerate() {
                let line_count = block.lines.len();
                let line_texts: Vec<String> =
                    block.lines.iter().map(|line| line.text()).collect();
                let max_line_text_length = line_texts
                    .iter()
                    .map(|text| text.chars().count())
                    .max()
                    .unwrap_or(0);
                for (line_index, line) in block.lines.iter().enumerate() {
                    let line_document_token_index = document_token_index;
                    document_token_index += line.tokens.len();
                    let line_ordinal = document_line_index;
                    document_line_index += 1;
                    let Some(first_token) = line.tokens.first() else {
                        log::debug!("skipping line without tokens");
                        continue;
                    };
                    let line_text = &line_texts[line_index];
                    let mut chunks = line_text
                        .split([' ', '\t', '\u{000C}', '\u{00A0}'])
                        .filter(|chunk| !chunk.is_empty());
                    let token_text = chunks.next().unwrap_or_default().to_string();
                    let second_token_text = chunks.next().unwrap_or_default().to_string();
                    let digit_status = digit_feature(&token_text);
                    let capitalisation_status = if digit_status == ALLDIGIT {
                        NOCAPS
                    } else {
                        capitalisation_feature(&token_text)
                    };
                    let block_status = segmentation_block_status(line_index, line_count);
                    let punctuation_profile = punctuation_profile_feature(line_text);
                    let row: Vec<String> = vec![
                        token_text.clone(),
                        if second_token_text.is_empty() {
                            token_text.clone()
                        } else {
                            second_token_text
                        },
                        token_text.to_lowercase(),
                        token_text.chars().take(1).collect(),
                        token_text.chars().take(2).collect(),
                        token_text.chars().take(3).collect(),
                        token_text.chars().take(4).collect(),
                        block_status.to_string(),
                        segmentation_page_status(block_index, block_count, block_status)
                            .to_string(),
                        font_status_feature(previous_token, first_token).to_string(),
                        font_size_feature(previous_token, first_token).to_string(),
                        bool_feature(first_token.font.is_bold).to_string(),
                        bool_feature(first_token.font.is_italics).to_string(),
                        capitalisation_status.to_string(),
                        digit_status.to_string(),
                        bool_feature(token_text.chars().count() == 1).to_string(),
                        DUMMY_FEATURE.to_string(), // is proper name
                        DUMMY_FEATURE.to_string(), // is common name
                        DUMMY_FEATURE.to_string(), // is first name
                        DUMMY_FEATURE.to_string(), // is year
                        DUMMY_FEATURE.to_string(), // is month
                        DUMMY_FEATURE.to_string(), // is email
                        DUMMY_FEATURE.to_string(), // is http
                        linear_scale(
                            line_document_token_index,
                            document_token_count,
                            POSITION_BINS,
                        )
                        .to_string(),
                        DUMMY_FEATURE.to_string(), // relative page position
                        if punctuation_profile.is_empty() {
                            "no".to_string()
                        } else {
                            punctuation_profile.clone()
                        },
                        punctuation_profile_length_feature(&punctuation_profile),
                        linear_scale(
                            line_text.chars().count(),
                            max_line_text_length,
                            LINE_SCALE_BINS,
                        )
                        .to_string(),
                        DUMMY_FEATURE.to_string(), // is bitmap around
                        DUMMY_FEATURE.to_string(), // is vector around
                        DUMMY_FEATURE.to_string(), // is repetitive pattern
                        DUMMY_FEATURE.to_string(), // is first repetitive pattern
                        DUMMY_IS_MAIN_AREA.to_string(),
                        format_feature_text(line_text),
                    ];
                    if row.len() != SEGMENTATION_COLUMN_COUNT {
                        return Err(Error::FeatureSchema {
                            expected: SEGMENTATION_COLUMN_COUNT,
                            actual: row.len(),
                        });
                    }
                    f(LayoutModelData {
                        data_line: row.join(" "),
                        line_index: Some(line_ordinal),
                        token_index: None,
                    });
                    previous_token = Some(first_token);
                }
            }
        }
        Ok(())
    }
}
