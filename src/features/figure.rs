//! Feature schema of the figure model.

use super::{DUMMY_FEATURE, TokenFeatureSchema, TokenFeatures};

/// Token-level generator for the figure model (21 columns).
#[derive(Debug, Default)]
pub struct FigureDataGenerator;

impl TokenFeatureSchema for FigureDataGenerator {
    const COLUMN_COUNT: usize = 21;

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
            features.line_status_prefer_start().to_string(),
            features.block_status_prefer_start().to_string(),
            features.font_status().to_string(),
            features.is_bold().to_string(),
            features.is_italic().to_string(),
            features.capitalisation_status().to_string(),
            features.digit_status().to_string(),
            features.is_single_char().to_string(),
            features.punctuation_type().to_string(),
            DUMMY_FEATURE.to_string(), // relative document position
            features.word_shape(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DataGenerator;
    use crate::layout::{LayoutBlock, LayoutDocument, LayoutPage};

    #[test]
    fn fixed_arity() {
        let document = LayoutDocument::new(vec![LayoutPage::new(vec![LayoutBlock::for_text(
            "Figure 1 : example caption",
        )])]);
        for line in FigureDataGenerator.data_lines(&document).unwrap() {
            assert_eq!(line.split(' ').count(), 21, "line: {line}");
        }
    }
}
