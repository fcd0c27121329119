//! Body/back section extraction from the fulltext model's output.

use crate::layout::LayoutBlock;
use crate::semantic::{LeafKind, SectionType, SemanticContent};

use super::aggregate_entities;

const TAG_TABLE: &[(&str, LeafKind)] = &[
    ("<section>", LeafKind::Heading),
    ("<paragraph>", LeafKind::Paragraph),
];

/// Group the fulltext model's entities into sections.
///
/// A `<section>` heading closes the current section and opens the next;
/// paragraphs and notes accumulate in the open section. Content before the
/// first heading still forms a headless section, except for leading `O`
/// content, which stays a standalone note.
pub fn extract_sections(
    entity_blocks: &[(String, LayoutBlock)],
    section_type: SectionType,
) -> Vec<SemanticContent> {
    aggregate_entities(
        entity_blocks,
        TAG_TABLE,
        |_, kind| kind == LeafKind::Heading,
        |_, block| block,
        |children| SemanticContent::Section {
            section_type,
            children,
        },
        true,
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
    fn headings_split_sections() {
        let sections = extract_sections(
            &entities(&[
                ("<section>", "1 Introduction"),
                ("<paragraph>", "First paragraph"),
                ("<paragraph>", "Second paragraph"),
                ("<section>", "2 Methods"),
                ("<paragraph>", "Third paragraph"),
            ]),
            SectionType::Body,
        );
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].children().len(), 3);
        assert_eq!(
            sections[0].view_by_kind(LeafKind::Heading).text(),
            "1 Introduction"
        );
        assert_eq!(sections[1].children().len(), 2);
    }

    #[test]
    fn paragraph_before_any_heading_forms_headless_section() {
        let sections = extract_sections(
            &entities(&[("<paragraph>", "orphan"), ("<section>", "1 Introduction")]),
            SectionType::Body,
        );
        assert_eq!(sections.len(), 2);
        assert!(!sections[0].has_kind(LeafKind::Heading));
        assert!(sections[1].has_kind(LeafKind::Heading));
    }

    #[test]
    fn other_content_joins_open_section() {
        let sections = extract_sections(
            &entities(&[
                ("O", "page header"),
                ("<section>", "1 Introduction"),
                ("O", "figure callout"),
                ("<paragraph>", "text"),
            ]),
            SectionType::Body,
        );
        assert_eq!(sections.len(), 2);
        assert!(
            matches!(&sections[0], SemanticContent::Note { note_type, .. } if note_type == "other")
        );
        let section_children = sections[1].children();
        assert_eq!(section_children.len(), 3);
        assert!(matches!(
            &section_children[1],
            SemanticContent::Note { .. }
        ));
    }

    #[test]
    fn section_type_is_carried() {
        let sections = extract_sections(
            &entities(&[("<paragraph>", "thanks everyone")]),
            SectionType::Acknowledgement,
        );
        assert!(matches!(
            sections[0],
            SemanticContent::Section {
                section_type: SectionType::Acknowledgement,
                ..
            }
        ));
    }
}
