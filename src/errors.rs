use thiserror::Error;

/// All errors that can occur when using the Lightflow client.
///
/// Every failure is returned to the caller as-is; the client performs no
/// retries and stays usable after any error.
#[derive(Error, Debug)]
pub enum LightflowError {
    /// The outbound request body could not be encoded as JSON. No request was sent.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A transport-level HTTP error from reqwest (connection refused, timeout,
    /// body read failure).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status code of 400 or above. The response
    /// body is not parsed.
    #[error("request failed with status {status_code} {status_text}")]
    ApiStatus {
        status_code: u16,
        status_text: String,
    },

    /// The server answered with a non-error status that is not the one the
    /// operation requires (e.g. `201` where `200` was expected).
    #[error("failed to {operation}, status code: {status_code} {status_text}")]
    UnexpectedStatus {
        operation: &'static str,
        status_code: u16,
        status_text: String,
    },

    /// The response body is not valid JSON or does not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The bearer token contains characters that cannot be sent in an HTTP header.
    #[error("invalid bearer token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// A required client setting was not provided.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl LightflowError {
    /// HTTP status code carried by [`ApiStatus`](Self::ApiStatus) and
    /// [`UnexpectedStatus`](Self::UnexpectedStatus), `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiStatus { status_code, .. } | Self::UnexpectedStatus { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

/// A convenience alias for `Result<T, LightflowError>`.
pub type Result<T> = std::result::Result<T, LightflowError>;
