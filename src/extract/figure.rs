//! Figure extraction.

use crate::layout::LayoutBlock;
use crate::semantic::{LeafKind, SemanticContent};

use super::aggregate_entities;

const TAG_TABLE: &[(&str, LeafKind)] = &[
    ("<label>", LeafKind::Label),
    ("<figDesc>", LeafKind::Caption),
];

/// Build a single figure aggregate from the figure model's entities.
///
/// The figure model is run over one figure's content at a time, so nothing
/// splits the aggregate.
pub fn extract_figures(entity_blocks: &[(String, LayoutBlock)]) -> Vec<SemanticContent> {
    aggregate_entities(
        entity_blocks,
        TAG_TABLE,
        |_, _| false,
        |_, block| block,
        SemanticContent::Figure,
        true,
    )
}
