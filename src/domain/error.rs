//! Error types for the editor session and the repository publisher

use thiserror::Error;

/// Validation errors raised before any document or queue mutation
#[derive(Debug, Error)]
pub enum EditError {
    /// No content domain registered under this slug
    #[error("Unknown content domain: {0}")]
    UnknownDomain(String),

    /// No field with this path in the domain's schema
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Action payload does not match the field's type
    #[error("Invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Image pick with a non-PNG declared MIME type or extension
    #[error("Only PNG images are accepted, got {name:?}")]
    NotPng { name: String },

    /// Single-image field whose current value names no destination path
    #[error("Field {0} has no destination path configured")]
    MissingDestination(String),

    /// Gallery sibling field (directory or filename format) absent or not a string
    #[error("Required sibling field {0} is missing or not a string")]
    MissingSibling(String),

    /// Row or item index past the end of the current entries
    #[error("Row {row} is out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    /// List add/remove against a path that is not a registered list
    #[error("No editable list at path {0}")]
    UnknownList(String),
}

/// Errors raised while publishing a snapshot to the hosted repository
#[derive(Debug, Error)]
pub enum PublishError {
    /// Repository settings incomplete; no remote call was attempted
    #[error("Repository publishing is not configured: {0}")]
    Misconfigured(String),

    /// Non-success response from the contents API
    #[error("Repository API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Malformed payload (e.g. undecodable base64 image content)
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PublishError::Timeout
        } else if err.is_connect() {
            PublishError::Network(format!("Connection error: {}", err))
        } else {
            PublishError::Network(err.to_string())
        }
    }
}

/// Result type alias for editor operations
pub type EditResult<T> = Result<T, EditError>;

/// Result type alias for publish operations
pub type PublishResult<T> = Result<T, PublishError>;
