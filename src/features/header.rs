//! Feature schema of the header (front matter) model.

use super::{DUMMY_FEATURE, TokenFeatureSchema, TokenFeatures};

/// Token-level generator for the header model (31 columns).
///
/// The header model leans on the relative font-size features to find titles
/// among the front-matter tokens.
#[derive(Debug, Default)]
pub struct HeaderDataGenerator;

impl TokenFeatureSchema for HeaderDataGenerator {
    const COLUMN_COUNT: usize = 31;

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
            features.line_status().to_string(),
            features.font_status().to_string(),
            features.font_size_status().to_string(),
            features.is_bold().to_string(),
            features.is_italic().to_string(),
            features.capitalisation_status().to_string(),
            features.digit_status().to_string(),
            features.is_single_char().to_string(),
            DUMMY_FEATURE.to_string(), // is proper name
            DUMMY_FEATURE.to_string(), // is common name
            DUMMY_FEATURE.to_string(), // is year
            DUMMY_FEATURE.to_string(), // is month
            DUMMY_FEATURE.to_string(), // is email
            DUMMY_FEATURE.to_string(), // is http
            features.is_largest_font().to_string(),
            features.is_smallest_font().to_string(),
            features.is_larger_than_average_font().to_string(),
            features.punctuation_type().to_string(),
            features.word_shape(),
            DUMMY_FEATURE.to_string(), // is known title
            DUMMY_FEATURE.to_string(), // is known suffix
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DataGenerator;
    use crate::layout::{LayoutBlock, LayoutDocument, LayoutFont, LayoutLine, LayoutPage, LayoutToken};
    use std::sync::Arc;

    fn sized_token(text: &str, size: f64) -> LayoutToken {
        LayoutToken::new(
            text,
            Arc::new(LayoutFont {
                font_id: format!("font-{size}"),
                font_family: Some("Times".to_string()),
                font_size: Some(size),
                ..LayoutFont::default()
            }),
            " ",
            None,
        )
    }

    #[test]
    fn title_tokens_carry_largest_font_flag() {
        let document = LayoutDocument::new(vec![LayoutPage::new(vec![LayoutBlock::new(vec![
            LayoutLine::new(vec![sized_token("Title", 18.0)]),
            LayoutLine::new(vec![sized_token("body", 10.0)]),
        ])])]);
        let lines = HeaderDataGenerator.data_lines(&document).unwrap();
        assert_eq!(lines.len(), 2);
        let title_columns: Vec<&str> = lines[0].split(' ').collect();
        let body_columns: Vec<&str> = lines[1].split(' ').collect();
        assert_eq!(title_columns.len(), 31);
        // largest / smallest / larger-than-average
        assert_eq!(&title_columns[24..27], &["1", "0", "1"]);
        assert_eq!(&body_columns[24..27], &["0", "1", "0"]);
    }
}
