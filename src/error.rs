//! Error types for document loading

use std::fmt;

/// Errors that can occur before conversion starts
///
/// The converter itself never fails; malformed structure is reported through
/// [`crate::warning::ConversionWarning`] instead. These errors come from the
/// loading layer that turns raw bytes into a DOM.
#[derive(Debug)]
pub enum ConversionError {
    /// Character encoding error
    EncodingError(String),
    /// Invalid input data (e.g. no root content supplied)
    InvalidInput(String),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            ConversionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {}
