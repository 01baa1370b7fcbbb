use std::io;
use thiserror::Error;

/// Errors produced while parsing an SVG document or its geometry.
///
/// A recognized-but-unhandled transform keyword never escapes as
/// [`Error::UnsupportedTransform`]: the resolver converts it to "no
/// transform" by policy. The variant exists so the policy has a name
/// when callers probe a transform string directly.
#[derive(Error, Debug)]
pub enum Error {
    /// Unparseable path data in a `d` or `points` attribute.
    #[error("malformed path data: {0}")]
    MalformedPathData(String),

    /// Non-numeric value where a number is required.
    #[error("invalid value for attribute '{attribute}': {value:?}")]
    InvalidAttributeValue { attribute: String, value: String },

    /// Transform keyword outside the supported rotate/translate/matrix set.
    #[error("unsupported transform: {0}")]
    UnsupportedTransform(String),

    /// Malformed XML. Fatal for the whole conversion.
    #[error("invalid SVG document: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Unreadable input. Fatal for the whole conversion.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
