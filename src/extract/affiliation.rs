//! Affiliation/address extraction.

use crate::layout::LayoutBlock;
use crate::semantic::{LeafKind, SemanticContent};

use super::{aggregate_entities, contains_kind, without_trailing_dot};

const TAG_TABLE: &[(&str, LeafKind)] = &[
    ("<marker>", LeafKind::Marker),
    ("<institution>", LeafKind::Institution),
    ("<department>", LeafKind::Department),
    ("<laboratory>", LeafKind::Laboratory),
    ("<addrLine>", LeafKind::AddressLine),
    ("<postCode>", LeafKind::PostCode),
    ("<postBox>", LeafKind::PostBox),
    ("<region>", LeafKind::Region),
    ("<settlement>", LeafKind::Settlement),
    ("<country>", LeafKind::Country),
];

/// Build affiliation aggregates from decoded affiliation-address entities.
///
/// A repeated `<marker>` or a second `<institution>` closes the current
/// affiliation and starts the next one. Country names lose one trailing
/// period.
pub fn extract_affiliations(entity_blocks: &[(String, LayoutBlock)]) -> Vec<SemanticContent> {
    aggregate_entities(
        entity_blocks,
        TAG_TABLE,
        |current, kind| {
            matches!(kind, LeafKind::Marker | LeafKind::Institution) && contains_kind(current, kind)
        },
        |kind, block| {
            if kind == LeafKind::Country {
                without_trailing_dot(&block)
            } else {
                block
            }
        },
        SemanticContent::AffiliationAddress,
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(pairs: &[(&str, &str)]) -> Vec<(String, LayoutBlock)> {
        pairs
            .iter()
            .map(|(tag, text)| (tag.to_string(), LayoutBlock::for_text(text)))
            .collect()
    }

    #[test]
    fn single_affiliation_aggregates_all_parts() {
        let result = extract_affiliations(&entities(&[
            ("<marker>", "1"),
            ("<institution>", "Example University"),
            ("<settlement>", "Example City"),
        ]));
        assert_eq!(result.len(), 1);
        let affiliation = &result[0];
        assert!(matches!(affiliation, SemanticContent::AffiliationAddress(_)));
        assert_eq!(affiliation.children().len(), 3);
        assert_eq!(
            affiliation.view_by_kind(LeafKind::Institution).text(),
            "Example University"
        );
    }

    #[test]
    fn leading_other_yields_standalone_note() {
        let result = extract_affiliations(&entities(&[
            ("O", "stray text"),
            ("<institution>", "Example University"),
        ]));
        assert_eq!(result.len(), 2);
        assert!(
            matches!(&result[0], SemanticContent::Note { note_type, .. } if note_type == "other")
        );
        assert!(matches!(&result[1], SemanticContent::AffiliationAddress(_)));
    }

    #[test]
    fn second_institution_starts_new_affiliation() {
        let result = extract_affiliations(&entities(&[
            ("<marker>", "1"),
            ("<institution>", "A"),
            ("<institution>", "B"),
        ]));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get_text(), "1 A");
        assert_eq!(result[1].get_text(), "B");
    }

    #[test]
    fn repeated_marker_starts_new_affiliation() {
        let result = extract_affiliations(&entities(&[
            ("<marker>", "1"),
            ("<institution>", "A"),
            ("<marker>", "2"),
            ("<institution>", "B"),
        ]));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get_text(), "1 A");
        assert_eq!(result[1].get_text(), "2 B");
    }

    #[test]
    fn country_loses_trailing_dot() {
        let result = extract_affiliations(&entities(&[
            ("<institution>", "Example University"),
            ("<country>", "France."),
        ]));
        assert_eq!(result[0].view_by_kind(LeafKind::Country).text(), "France");
    }

    #[test]
    fn unknown_tag_becomes_note_inside_affiliation() {
        let result = extract_affiliations(&entities(&[
            ("<institution>", "Example University"),
            ("<email>", "contact@example.org"),
        ]));
        assert_eq!(result.len(), 1);
        let children = result[0].children();
        assert!(
            matches!(&children[1], SemanticContent::Note { note_type, .. } if note_type == "email")
        );
    }
}
