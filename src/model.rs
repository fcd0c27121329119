//! External model interfaces and tag decoding.
//!
//! The sequence-labeling model and the OCR model are external collaborators;
//! this module defines their contracts and the bookkeeping that re-associates
//! a model's flat per-line tag stream with the layout document it was
//! generated from.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::features::DataGenerator;
use crate::layout::{LayoutBlock, LayoutDocument, LayoutLine, LayoutPage, LayoutToken};

/// A sequence-labeling model: one tag per feature line.
///
/// Tags may carry `B-`/`I-` prefixes; `O` marks content outside any entity.
/// Implementations are expected to be blocking and potentially slow.
pub trait SequenceModel {
    fn predict(&self, data_lines: &[String]) -> Result<Vec<String>>;
}

/// An OCR model producing text for a single image region.
pub trait OcrModel {
    fn predict_single(&self, image: &[u8]) -> Result<String>;
}

/// Remove a `B-`/`I-` prefix from a tag, if present.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix("B-")
        .or_else(|| tag.strip_prefix("I-"))
        .unwrap_or(tag)
}

/// Decode a tag sequence into contiguous `(tag, start, end)` spans,
/// including `O` spans.
///
/// A new span starts on a `B-` prefix or on a tag change; `end` is inclusive.
pub fn entities_including_other(tags: &[String]) -> Vec<(String, usize, usize)> {
    let mut spans: Vec<(String, usize, usize)> = Vec::new();
    let mut previous_tag = "O";
    let mut previous_start = 0usize;
    for (index, prefixed_tag) in tags.iter().enumerate() {
        let (prefix, tag) = match prefixed_tag.split_once('-') {
            Some((prefix, tag)) => (prefix, tag),
            None => ("", prefixed_tag.as_str()),
        };
        if prefix == "B" || tag != previous_tag {
            if previous_start < index {
                spans.push((previous_tag.to_string(), previous_start, index - 1));
            }
            previous_tag = tag;
            previous_start = index;
        }
    }
    if previous_start < tags.len() {
        spans.push((previous_tag.to_string(), previous_start, tags.len() - 1));
    }
    spans
}

/// A model tag re-associated with its layout position (document-order
/// ordinals, matching [`crate::features::LayoutModelData`]).
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutModelLabel {
    pub label: String,
    pub line_index: Option<usize>,
    pub token_index: Option<usize>,
}

/// A tag paired with the token it labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledLayoutToken {
    pub label: String,
    pub token: LayoutToken,
}

/// Group labeled tokens into `(tag, block)` pairs per contiguous same-tag
/// span, with tag prefixes stripped.
pub fn entity_blocks_for_labeled_tokens(
    labeled_tokens: &[LabeledLayoutToken],
) -> Vec<(String, LayoutBlock)> {
    let labels: Vec<String> = labeled_tokens
        .iter()
        .map(|labeled| labeled.label.clone())
        .collect();
    entities_including_other(&labels)
        .into_iter()
        .map(|(tag, start, end)| {
            let tokens: Vec<LayoutToken> = labeled_tokens[start..=end]
                .iter()
                .map(|labeled| labeled.token.clone())
                .collect();
            (tag, LayoutBlock::for_tokens(tokens))
        })
        .collect()
}

/// Joined text per decoded entity span, for inspection and tests.
pub fn entity_values_for_predicted_labels(
    labeled_tokens: &[LabeledLayoutToken],
) -> Vec<(String, String)> {
    entity_blocks_for_labeled_tokens(labeled_tokens)
        .into_iter()
        .map(|(tag, block)| (tag, block.text()))
        .collect()
}

/// Labels for one document together with the document itself.
#[derive(Debug)]
pub struct LayoutDocumentLabelResult {
    pub document: LayoutDocument,
    pub labels: Vec<LayoutModelLabel>,
}

impl LayoutDocumentLabelResult {
    /// Rebuild a document containing only the lines (and tokens, for
    /// token-level labels) carrying one of `labels`.
    ///
    /// The surviving content keeps its line/block/page grouping; empty
    /// containers are not emitted.
    pub fn filtered_document_by_labels(&self, labels: &[&str]) -> LayoutDocument {
        let wanted: HashSet<&str> = labels.iter().copied().collect();
        let mut token_indices: HashSet<usize> = HashSet::new();
        let mut line_indices: HashSet<usize> = HashSet::new();
        for label in &self.labels {
            if !wanted.contains(strip_tag_prefix(&label.label)) {
                continue;
            }
            if let Some(token_index) = label.token_index {
                token_indices.insert(token_index);
            } else if let Some(line_index) = label.line_index {
                line_indices.insert(line_index);
            }
        }
        if token_indices.is_empty() && line_indices.is_empty() {
            log::warn!("no layout lines found for labels: {:?}", labels);
            return LayoutDocument::default();
        }
        let mut pages: Vec<LayoutPage> = Vec::new();
        let mut token_ordinal = 0usize;
        let mut line_ordinal = 0usize;
        for page in &self.document.pages {
            let mut blocks: Vec<LayoutBlock> = Vec::new();
            for block in &page.blocks {
                let mut lines: Vec<LayoutLine> = Vec::new();
                for line in &block.lines {
                    let line_wanted = line_indices.contains(&line_ordinal);
                    line_ordinal += 1;
                    if !token_indices.is_empty() {
                        let tokens: Vec<LayoutToken> = line
                            .tokens
                            .iter()
                            .filter(|_| {
                                let wanted = token_indices.contains(&token_ordinal);
                                token_ordinal += 1;
                                wanted
                            })
                            .cloned()
                            .collect();
                        if !tokens.is_empty() {
                            lines.push(LayoutLine::new(tokens));
                        }
                    } else {
                        token_ordinal += line.tokens.len();
                        if line_wanted {
                            lines.push(line.clone());
                        }
                    }
                }
                if !lines.is_empty() {
                    blocks.push(LayoutBlock::new(lines));
                }
            }
            if !blocks.is_empty() {
                pages.push(LayoutPage::new(blocks));
            }
        }
        LayoutDocument::new(pages)
    }
}

/// Run `generator` over `document`, feed the feature lines to `model` and
/// re-associate the returned tags with their layout positions.
///
/// The model must return exactly one tag per feature line; any other count
/// is a fatal mismatch.
pub fn label_layout_document(
    model: &dyn SequenceModel,
    generator: &dyn DataGenerator,
    document: &LayoutDocument,
) -> Result<LayoutDocumentLabelResult> {
    let model_data = generator.model_data(document)?;
    let data_lines: Vec<String> = model_data
        .iter()
        .map(|row| row.data_line.clone())
        .collect();
    let tags = model.predict(&data_lines)?;
    if tags.len() != model_data.len() {
        return Err(Error::ModelOutput(format!(
            "tag count does not match data lines: {} != {}",
            tags.len(),
            model_data.len()
        )));
    }
    let labels = tags
        .into_iter()
        .zip(&model_data)
        .map(|(label, row)| LayoutModelLabel {
            label,
            line_index: row.line_index,
            token_index: row.token_index,
        })
        .collect();
    Ok(LayoutDocumentLabelResult {
        document: document.clone(),
        labels,
    })
}

/// Pair each token-level label with its token, in document order.
///
/// Fails when the labels were produced by a line-level generator.
pub fn labeled_layout_tokens(result: &LayoutDocumentLabelResult) -> Result<Vec<LabeledLayoutToken>> {
    let tokens: Vec<&LayoutToken> = result.document.iter_all_tokens().collect();
    result
        .labels
        .iter()
        .map(|label| {
            let token_index = label.token_index.ok_or_else(|| {
                Error::ModelOutput("label is not associated with a token".to_string())
            })?;
            let token = tokens.get(token_index).ok_or_else(|| {
                Error::ModelOutput(format!("label token index out of range: {token_index}"))
            })?;
            Ok(LabeledLayoutToken {
                label: label.label.clone(),
                token: (*token).clone(),
            })
        })
        .collect()
}
