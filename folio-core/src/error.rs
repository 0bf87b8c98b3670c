//! Error types and result types for storage operations.
//!
//! Store lookups and mutations absorb bad input silently (returning `Option`
//! or no-op, see the provider contract in [`crate::provider`]); [`FolioError`]
//! covers the loud boundaries: serialization, revision-key parsing, query
//! parsing, and plugin wiring.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors surfaced by the folio crates.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// A revision key string did not match the `{timestamp}-{nonce}` format.
    #[error("Invalid revision key: {0}")]
    InvalidRevision(String),
    /// A query string could not be parsed into a query plan.
    #[error("Query error: {0}")]
    Query(String),
    /// The host wired the plugin adapter incorrectly (missing dispatcher, empty event map).
    /// This is the one failure the system raises loudly.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for folio operations.
///
/// This type alias is used throughout the workspace to indicate operations
/// that may fail with a [`FolioError`].
pub type FolioResult<T> = Result<T, FolioError>;

impl From<BsonError> for FolioError {
    fn from(err: BsonError) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for FolioError {
    fn from(err: SerdeJsonError) -> Self {
        FolioError::Serialization(err.to_string())
    }
}
