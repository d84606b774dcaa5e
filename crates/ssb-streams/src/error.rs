//! Error types for document encoding.

/// Errors raised while reading or writing a Simplestreams document.
#[derive(Debug, thiserror::Error)]
pub enum StreamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
