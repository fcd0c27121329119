//! Feature schema of the fulltext (body text) model.

use super::{DUMMY_CALLOUT_TYPE, DUMMY_FEATURE, TokenFeatureSchema, TokenFeatures};

/// Token-level generator for the fulltext model (27 columns).
///
/// Uses the LINESTART/BLOCKSTART tie-break for single-token lines and
/// single-line blocks, and the indentation-based alignment status.
#[derive(Debug, Default)]
pub struct FullTextDataGenerator;

impl TokenFeatureSchema for FullTextDataGenerator {
    const COLUMN_COUNT: usize = 27;

    fn row(&self, features: &TokenFeatures) -> Vec<String> {
        vec![
            features.token_text().to_string(),
            features.lower_token_text(),
            features.prefix(1),
            features.prefix(2),
            features.prefix(3),
            features.prefix(4),
            features.suffix(1),
            features.suffix(2),
            features.suffix(3),
            features.suffix(4),
            features.block_status_prefer_start().to_string(),
            features.line_status_prefer_start().to_string(),
            features.alignment_status().to_string(),
            features.font_status().to_string(),
            features.font_size_status().to_string(),
            features.is_bold().to_string(),
            features.is_italic().to_string(),
            features.capitalisation_status().to_string(),
            features.digit_status().to_string(),
            features.is_single_char().to_string(),
            features.punctuation_type().to_string(),
            DUMMY_FEATURE.to_string(), // relative document position
            DUMMY_FEATURE.to_string(), // relative page position
            DUMMY_FEATURE.to_string(), // is bitmap around
            DUMMY_CALLOUT_TYPE.to_string(),
            DUMMY_FEATURE.to_string(), // is callout known
            features.is_superscript().to_string(),
        ]
    }
}
