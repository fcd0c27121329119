//! Semantic document tree built from labeled layout content.
//!
//! Extraction turns `(tag, LayoutBlock)` entity pairs into this tree; TEI
//! serialization walks it. Every leaf keeps the layout block it came from, so
//! fonts and coordinates survive all the way to the output.

use crate::layout::{LayoutBlock, LayoutToken};

/// The kind of a semantic leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Title,
    Abstract,
    Heading,
    Paragraph,
    Label,
    Caption,
    Marker,
    NameTitle,
    GivenName,
    MiddleName,
    Surname,
    NameSuffix,
    Institution,
    Department,
    Laboratory,
    AddressLine,
    PostCode,
    PostBox,
    Region,
    Settlement,
    Country,
}

/// Where a section belongs in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    Body,
    Acknowledgement,
    Other,
}

/// One node of the semantic tree.
///
/// Leaves wrap a single merged [`LayoutBlock`]; containers hold ordered
/// children.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticContent {
    Leaf {
        kind: LeafKind,
        block: LayoutBlock,
    },
    /// Content that carries no dedicated leaf kind; `note_type` is the tag
    /// name without angle brackets, or `"other"` for unlabeled content.
    Note {
        note_type: String,
        block: LayoutBlock,
    },
    Section {
        section_type: SectionType,
        children: Vec<SemanticContent>,
    },
    Author(Vec<SemanticContent>),
    AffiliationAddress(Vec<SemanticContent>),
    Figure(Vec<SemanticContent>),
}

impl SemanticContent {
    pub fn leaf(kind: LeafKind, block: LayoutBlock) -> Self {
        SemanticContent::Leaf { kind, block }
    }

    pub fn note(note_type: impl Into<String>, block: LayoutBlock) -> Self {
        SemanticContent::Note {
            note_type: note_type.into(),
            block,
        }
    }

    /// Child nodes of a container; empty for leaves.
    pub fn children(&self) -> &[SemanticContent] {
        match self {
            SemanticContent::Section { children, .. }
            | SemanticContent::Author(children)
            | SemanticContent::AffiliationAddress(children)
            | SemanticContent::Figure(children) => children,
            _ => &[],
        }
    }

    /// All tokens under this node in document order.
    pub fn iter_tokens(&self) -> Box<dyn Iterator<Item = &LayoutToken> + '_> {
        match self {
            SemanticContent::Leaf { block, .. } | SemanticContent::Note { block, .. } => {
                Box::new(block.iter_tokens())
            }
            _ => Box::new(self.children().iter().flat_map(|child| child.iter_tokens())),
        }
    }

    /// One block concatenating all descendant content in order.
    pub fn merged_block(&self) -> LayoutBlock {
        match self {
            SemanticContent::Leaf { block, .. } | SemanticContent::Note { block, .. } => {
                block.clone()
            }
            _ => LayoutBlock::merge_blocks(
                self.children().iter().map(|child| child.merged_block()),
            ),
        }
    }

    pub fn get_text(&self) -> String {
        self.merged_block().text()
    }

    /// Merged block over all direct children of the given kind.
    pub fn view_by_kind(&self, kind: LeafKind) -> LayoutBlock {
        LayoutBlock::merge_blocks(self.children().iter().filter_map(|child| match child {
            SemanticContent::Leaf {
                kind: child_kind,
                block,
            } if *child_kind == kind => Some(block.clone()),
            _ => None,
        }))
    }

    /// Whether any direct child is a leaf of the given kind.
    pub fn has_kind(&self, kind: LeafKind) -> bool {
        self.children().iter().any(|child| {
            matches!(child, SemanticContent::Leaf { kind: child_kind, .. } if *child_kind == kind)
        })
    }
}

/// Document metadata picked out of the header model's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticMeta {
    pub title: Option<LayoutBlock>,
    pub abstract_text: Option<LayoutBlock>,
}

/// The whole semantically tagged document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticDocument {
    pub meta: SemanticMeta,
    /// Authors, affiliations and front-matter notes.
    pub front: Vec<SemanticContent>,
    /// Body sections and figures.
    pub body: Vec<SemanticContent>,
    /// Acknowledgement and annex sections.
    pub back: Vec<SemanticContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: LeafKind, text: &str) -> SemanticContent {
        SemanticContent::leaf(kind, LayoutBlock::for_text(text))
    }

    #[test]
    fn container_text_concatenates_children() {
        let author = SemanticContent::Author(vec![
            leaf(LeafKind::GivenName, "Jane"),
            leaf(LeafKind::Surname, "Smith"),
        ]);
        assert_eq!(author.get_text(), "Jane Smith");
        assert_eq!(author.iter_tokens().count(), 2);
    }

    #[test]
    fn view_by_kind_merges_matching_children_only() {
        let affiliation = SemanticContent::AffiliationAddress(vec![
            leaf(LeafKind::Institution, "Example University"),
            leaf(LeafKind::Settlement, "Example City"),
            leaf(LeafKind::Institution, "Example Lab"),
        ]);
        assert_eq!(
            affiliation.view_by_kind(LeafKind::Institution).text(),
            "Example University Example Lab"
        );
        assert!(affiliation.has_kind(LeafKind::Settlement));
        assert!(!affiliation.has_kind(LeafKind::Country));
    }

    #[test]
    fn leaves_have_no_children() {
        let note = SemanticContent::note("other", LayoutBlock::for_text("stray"));
        assert!(note.children().is_empty());
        assert_eq!(note.get_text(), "stray");
    }
}
