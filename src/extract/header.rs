//! Header (front matter) and author name extraction.

use crate::layout::LayoutBlock;
use crate::semantic::{LeafKind, SemanticContent, SemanticMeta};

use super::{aggregate_entities, contains_kind, note_type_for_tag};

/// Front matter extracted from the header model's output.
#[derive(Debug, Default)]
pub struct FrontMatter {
    pub meta: SemanticMeta,
    /// Raw author blocks, in order, for the name model.
    pub author_blocks: Vec<LayoutBlock>,
    /// Everything else, as typed notes.
    pub notes: Vec<SemanticContent>,
}

/// Split the header model's entities into document meta, author blocks and
/// notes.
///
/// The first `<title>` and `<abstract>` become the document meta; repeats
/// are demoted to notes so no content is lost.
pub fn extract_front(entity_blocks: &[(String, LayoutBlock)]) -> FrontMatter {
    let mut front = FrontMatter::default();
    for (tag, block) in entity_blocks {
        match tag.as_str() {
            "<title>" if front.meta.title.is_none() => {
                front.meta.title = Some(block.clone());
            }
            "<abstract>" if front.meta.abstract_text.is_none() => {
                front.meta.abstract_text = Some(block.clone());
            }
            "<author>" => front.author_blocks.push(block.clone()),
            _ => front.notes.push(SemanticContent::note(
                note_type_for_tag(tag),
                block.clone(),
            )),
        }
    }
    front
}

const NAME_TAG_TABLE: &[(&str, LeafKind)] = &[
    ("<title>", LeafKind::NameTitle),
    ("<forename>", LeafKind::GivenName),
    ("<middlename>", LeafKind::MiddleName),
    ("<surname>", LeafKind::Surname),
    ("<suffix>", LeafKind::NameSuffix),
    ("<marker>", LeafKind::Marker),
];

/// Build author aggregates from the name model's entities.
///
/// A repeated given name, surname or marker closes the current author and
/// starts the next one.
pub fn extract_authors(entity_blocks: &[(String, LayoutBlock)]) -> Vec<SemanticContent> {
    aggregate_entities(
        entity_blocks,
        NAME_TAG_TABLE,
        |current, kind| {
            matches!(
                kind,
                LeafKind::GivenName | LeafKind::Surname | LeafKind::Marker
            ) && contains_kind(current, kind)
        },
        |_, block| block,
        SemanticContent::Author,
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
    fn first_title_and_abstract_win() {
        let front = extract_front(&entities(&[
            ("<title>", "Real Title"),
            ("<abstract>", "The abstract."),
            ("<title>", "Running Head"),
        ]));
        assert_eq!(front.meta.title.unwrap().text(), "Real Title");
        assert_eq!(front.meta.abstract_text.unwrap().text(), "The abstract .");
        assert_eq!(front.notes.len(), 1);
        assert!(
            matches!(&front.notes[0], SemanticContent::Note { note_type, .. } if note_type == "title")
        );
    }

    #[test]
    fn author_blocks_are_collected_in_order() {
        let front = extract_front(&entities(&[
            ("<author>", "Jane Smith"),
            ("<keywords>", "parsing"),
            ("<author>", "John Doe"),
        ]));
        let texts: Vec<String> = front
            .author_blocks
            .iter()
            .map(|block| block.text())
            .collect();
        assert_eq!(texts, vec!["Jane Smith", "John Doe"]);
        assert_eq!(front.notes.len(), 1);
    }

    #[test]
    fn repeated_surname_starts_new_author() {
        let authors = extract_authors(&entities(&[
            ("<forename>", "Jane"),
            ("<surname>", "Smith"),
            ("<forename>", "John"),
            ("<surname>", "Doe"),
        ]));
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].get_text(), "Jane Smith");
        assert_eq!(authors[1].get_text(), "John Doe");
    }

    #[test]
    fn author_name_parts_are_typed() {
        let authors = extract_authors(&entities(&[
            ("<title>", "Dr"),
            ("<forename>", "Jane"),
            ("<middlename>", "Q"),
            ("<surname>", "Smith"),
            ("<suffix>", "Jr"),
        ]));
        assert_eq!(authors.len(), 1);
        let author = &authors[0];
        assert_eq!(author.view_by_kind(LeafKind::NameTitle).text(), "Dr");
        assert_eq!(author.view_by_kind(LeafKind::MiddleName).text(), "Q");
        assert_eq!(author.view_by_kind(LeafKind::NameSuffix).text(), "Jr");
    }
}
