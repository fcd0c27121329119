//! Error types for scitei operations.

use thiserror::Error;

/// Errors that can occur while parsing layout input or generating model data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid ALTO: {0}")]
    InvalidAlto(String),

    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Feature schema violation: expected {expected} columns, got {actual}")]
    FeatureSchema { expected: usize, actual: usize },

    #[error("Model output mismatch: {0}")]
    ModelOutput(String),

    #[error("Invalid TEI path step: {0}")]
    InvalidPathStep(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
