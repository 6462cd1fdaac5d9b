//! Error types for archetype data loading.

use thiserror::Error;

/// Errors that can occur when loading archetype definitions.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File or directory could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// Parsed, but the values make no sense (negative health, empty name).
    #[error("Invalid definition in '{path}': {details}")]
    Invalid { path: String, details: String },
}
