//! Feature schema of the affiliation-address model.

use super::{DUMMY_FEATURE, TokenFeatureSchema, TokenFeatures};

/// Token-level generator for the affiliation-address model (22 columns).
#[derive(Debug, Default)]
pub struct AffiliationAddressDataGenerator;

impl TokenFeatureSchema for AffiliationAddressDataGenerator {
    const COLUMN_COUNT: usize = 22;

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
            features.capitalisation_status().to_string(),
            features.digit_status().to_string(),
            features.is_single_char().to_string(),
            DUMMY_FEATURE.to_string(), // is proper name
            DUMMY_FEATURE.to_string(), // is common name
            DUMMY_FEATURE.to_string(), // is first name
            DUMMY_FEATURE.to_string(), // is location name
            DUMMY_FEATURE.to_string(), // is country name
            features.punctuation_type().to_string(),
            features.word_shape(),
            DUMMY_FEATURE.to_string(), // label placeholder
        ]
    }
}
