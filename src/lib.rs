//! # scitei
//!
//! A library for converting ALTO page-layout XML of scientific documents
//! into semantically tagged TEI XML, driven by an external sequence-labeling
//! model.
//!
//! ## Pipeline
//!
//! - Parse ALTO into a [`LayoutDocument`] (pages, blocks, lines, tokens with
//!   fonts and coordinates)
//! - Retokenize and generate fixed-schema feature lines per model
//!   (segmentation, header, affiliation-address, fulltext, figure)
//! - Feed the lines to a [`SequenceModel`] and decode its tags back into
//!   `(tag, block)` entity spans
//! - Extract a [`SemanticDocument`] from the entities
//! - Serialize it to TEI with style runs and coordinate annotations
//!
//! ## Quick Start
//!
//! ```
//! use scitei::extract::affiliation::extract_affiliations;
//! use scitei::layout::LayoutBlock;
//! use scitei::tei::{document_to_tei, TeiDocument};
//! use scitei::SemanticDocument;
//!
//! // Entities as decoded from an affiliation-address model's tags.
//! let entities = vec![
//!     ("<institution>".to_string(), LayoutBlock::for_text("Example University")),
//!     ("<settlement>".to_string(), LayoutBlock::for_text("Example City")),
//! ];
//! let document = SemanticDocument {
//!     front: extract_affiliations(&entities),
//!     ..SemanticDocument::default()
//! };
//! let tei: TeiDocument = document_to_tei(&document).unwrap();
//! assert!(tei.to_xml_string().contains("Example University"));
//! ```
//!
//! Feature generation works the same way for every model:
//!
//! ```
//! use scitei::alto::parse_alto;
//! use scitei::features::segmentation::SegmentationDataGenerator;
//! use scitei::features::DataGenerator;
//!
//! let alto = r#"<alto xmlns="http://www.loc.gov/standards/alto/ns-v3#">
//!   <Layout><Page><PrintSpace><TextBlock><TextLine>
//!     <String CONTENT="Example" HPOS="0" VPOS="0" WIDTH="50" HEIGHT="10"/>
//!   </TextLine></TextBlock></PrintSpace></Page></Layout>
//! </alto>"#;
//! let document = parse_alto(alto).unwrap().retokenize();
//! let lines = SegmentationDataGenerator.data_lines(&document).unwrap();
//! assert_eq!(lines.len(), 1);
//! ```

pub mod alto;
pub mod error;
pub mod extract;
pub mod features;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod semantic;
pub mod tei;

pub use alto::parse_alto;
pub use error::{Error, Result};
pub use layout::{LayoutBlock, LayoutDocument, LayoutFont, LayoutLine, LayoutPage, LayoutToken};
pub use model::{
    label_layout_document, LabeledLayoutToken, LayoutDocumentLabelResult, SequenceModel,
};
pub use semantic::{LeafKind, SectionType, SemanticContent, SemanticDocument, SemanticMeta};
pub use tei::{document_to_tei, TeiDocument};
