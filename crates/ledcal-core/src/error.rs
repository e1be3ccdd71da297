//! Error types for the calibration viewer.

use thiserror::Error;

/// The main error type for viewer operations.
#[derive(Error, Debug)]
pub enum LedcalError {
    /// A required host element is absent from the page.
    #[error("required element '{0}' is missing from the host page")]
    MissingElement(String),

    /// A host element exists but is not of the kind the viewer needs.
    #[error("element '{id}' is a {actual}, expected a {expected}")]
    WrongElementKind {
        id: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The calibration artifact could not be located.
    #[error("calibration artifact not found: {0}")]
    ArtifactNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for viewer operations.
pub type Result<T> = std::result::Result<T, LedcalError>;
