//! Failure shapes reported by the transport layer.
//!
//! These describe *what happened* on the wire; turning them into something a user can act
//! on is the job of [`crate::errors::classify`].

use thiserror::Error;

/// Convenience `Result` type for backend calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status code
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, if any
        message: Option<String>,
    },

    /// The request was sent but no response came back (connection refused, DNS, reset...)
    #[error("No response received: {0}")]
    NoResponse(String),

    /// The request could not be constructed (bad URL, invalid header value...)
    #[error("Failed to build request: {0}")]
    RequestSetup(String),

    /// The response body did not match the endpoint's contract
    #[error("Unexpected response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint path that produced the body
        endpoint: String,
        /// Decoder error
        reason: String,
    },
}

impl ApiError {
    /// Maps a `reqwest` failure onto the transport taxonomy.
    pub(crate) fn from_reqwest(endpoint: &str, error: &reqwest::Error) -> Self {
        if error.is_builder() {
            Self::RequestSetup(error.to_string())
        } else if error.is_decode() {
            Self::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: error.to_string(),
            }
        } else if let Some(status) = error.status() {
            Self::Status {
                status: status.as_u16(),
                message: None,
            }
        } else {
            Self::NoResponse(error.to_string())
        }
    }
}
