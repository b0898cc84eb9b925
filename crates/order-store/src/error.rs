use thiserror::Error;

/// Errors that can occur when decoding a raw payload into an [`Order`](crate::Order).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload was not valid UTF-8 JSON.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was valid JSON but not an object.
    #[error("Expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Result type for order decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;
