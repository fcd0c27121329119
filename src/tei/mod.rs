//! TEI output: an owned element tree plus the semantic-to-TEI serializer.

pub mod element;
pub mod serialize;

pub use element::{TeiElement, TeiNode, TEI_NS};
pub use serialize::{document_to_tei, format_coordinates, TeiDocument};
