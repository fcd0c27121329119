//! Tag-to-semantic extraction.
//!
//! Each model's extractor turns the `(tag, block)` pairs decoded from its
//! label sequence into semantic content. They all share one aggregation
//! protocol, parameterized by a tag table, a new-instance predicate and a
//! per-leaf postprocessing hook.

pub mod affiliation;
pub mod figure;
pub mod fulltext;
pub mod header;

use crate::layout::LayoutBlock;
use crate::semantic::{LeafKind, SemanticContent};

/// The tag emitted for content outside any entity.
pub const OTHER_TAG: &str = "O";

/// Note type for a tag without a leaf mapping (`O` becomes `"other"`,
/// `<foo>` becomes `"foo"`).
pub(crate) fn note_type_for_tag(tag: &str) -> &str {
    if tag == OTHER_TAG {
        "other"
    } else {
        tag.trim_start_matches('<').trim_end_matches('>')
    }
}

pub(crate) fn leaf_kind_for_tag(
    tag_table: &[(&str, LeafKind)],
    tag: &str,
) -> Option<LeafKind> {
    tag_table
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, kind)| *kind)
}

pub(crate) fn contains_kind(children: &[SemanticContent], kind: LeafKind) -> bool {
    children.iter().any(
        |child| matches!(child, SemanticContent::Leaf { kind: child_kind, .. } if *child_kind == kind),
    )
}

/// Strip one trailing period from the block's final token; a token that was
/// only a period is dropped.
pub(crate) fn without_trailing_dot(block: &LayoutBlock) -> LayoutBlock {
    let mut lines = block.lines.clone();
    if let Some(line) = lines.last_mut()
        && let Some(token) = line.tokens.last_mut()
        && let Some(stripped) = token.text.strip_suffix('.')
    {
        if stripped.is_empty() {
            line.tokens.pop();
        } else {
            token.text = stripped.to_string();
        }
    }
    LayoutBlock::new(lines)
}

/// Run the shared aggregation state machine over decoded entities.
///
/// Known tags become leaves inside the open aggregate, opening one if
/// needed; `starts_new_instance` decides when a leaf closes the current
/// aggregate first. Unknown tags become typed notes that continue the
/// aggregate. `O` content becomes a standalone `"other"` note, or joins the
/// open aggregate when `other_into_open` is set.
pub(crate) fn aggregate_entities(
    entity_blocks: &[(String, LayoutBlock)],
    tag_table: &[(&str, LeafKind)],
    mut starts_new_instance: impl FnMut(&[SemanticContent], LeafKind) -> bool,
    mut postprocess: impl FnMut(LeafKind, LayoutBlock) -> LayoutBlock,
    mut wrap: impl FnMut(Vec<SemanticContent>) -> SemanticContent,
    other_into_open: bool,
) -> Vec<SemanticContent> {
    let mut result: Vec<SemanticContent> = Vec::new();
    let mut current: Vec<SemanticContent> = Vec::new();
    let mut open = false;
    for (tag, block) in entity_blocks {
        if tag == OTHER_TAG {
            let note = SemanticContent::note("other", block.clone());
            if other_into_open && open {
                current.push(note);
            } else {
                result.push(note);
            }
            continue;
        }
        let content = match leaf_kind_for_tag(tag_table, tag) {
            Some(kind) => {
                if open && starts_new_instance(&current, kind) {
                    result.push(wrap(std::mem::take(&mut current)));
                }
                SemanticContent::leaf(kind, postprocess(kind, block.clone()))
            }
            None => SemanticContent::note(note_type_for_tag(tag), block.clone()),
        };
        open = true;
        current.push(content);
    }
    if open {
        result.push(wrap(current));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_types_strip_angle_brackets() {
        assert_eq!(note_type_for_tag("O"), "other");
        assert_eq!(note_type_for_tag("<figDesc>"), "figDesc");
    }

    #[test]
    fn trailing_dot_is_stripped_from_last_token() {
        let block = LayoutBlock::for_text("United Kingdom.");
        assert_eq!(without_trailing_dot(&block).text(), "United Kingdom");
    }

    #[test]
    fn lone_dot_token_is_dropped() {
        let block = LayoutBlock::for_text("France .");
        assert_eq!(without_trailing_dot(&block).text(), "France");
    }

    #[test]
    fn text_without_trailing_dot_is_unchanged() {
        let block =
            LayoutBlock::for_tokens(vec![crate::layout::LayoutToken::for_text("Netherlands")]);
        assert_eq!(without_trailing_dot(&block).text(), "Netherlands");
    }
}
