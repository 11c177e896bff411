//! Error types for hermit-data.

use thiserror::Error;

/// Errors that can occur while building or identifying marketplace records.
#[derive(Debug, Error)]
pub enum DataError {
    /// A record failed validation and must not enter the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The content-id function could not encode the record.
    ///
    /// Fatal to the single submission, never to the process.
    #[error("identity computation failed: {0}")]
    Identity(#[from] serde_json::Error),
}
