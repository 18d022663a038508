//! Unified error types and failure classification.
//!
//! [`Error`] is the crate-wide error. Backend failures travel inside it as
//! [`ApiError`]; [`classify`] maps those onto the [`ErrorCategory`] that decides what the user
//! is told. Classification is a pure function and never retries anything.

use crate::api::ApiError;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Local preference database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Backend request failure
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// User input rejected before any request was sent
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Explanation shown to the user
        message: String,
    },

    /// No person with this name in the mirrored people list
    #[error("Person not found: {name}")]
    PersonNotFound {
        /// The name that was looked up
        name: String,
    },

    /// The location id is not among the known locations
    #[error("Location not found: {id}")]
    LocationNotFound {
        /// The id that was requested
        id: i64,
    },

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while formatting a reply
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Discord framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// The message shown to the person who triggered the failing action.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => classify(error).user_message(),
            Self::InvalidInput { message } => message.clone(),
            Self::PersonNotFound { name } => {
                format!("No one named '{name}' is registered at this location.")
            }
            Self::LocationNotFound { id } => format!("There is no location with id {id}."),
            other => format!("An error occurred: {other}"),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of failure the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 401: API key missing or wrong
    Unauthorized,
    /// 403: caller lacks rights for the action
    Forbidden,
    /// 404: resource or URL does not exist
    NotFound,
    /// 500: backend failure, with the server's detail message when it sent one
    ServerError {
        /// Message from the response body
        detail: Option<String>,
    },
    /// Any other status code
    Other {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: Option<String>,
    },
    /// The request went out but nothing came back
    NoConnectivity,
    /// The request could not be built
    RequestSetup {
        /// Underlying error text
        message: String,
    },
    /// The body did not match the endpoint's contract
    UnexpectedResponse,
}

impl ErrorCategory {
    /// User-facing text for this category.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized access. Please check your API key.".to_string(),
            Self::Forbidden => {
                "Access denied. You do not have permission to perform this action.".to_string()
            }
            Self::NotFound => "The resource was not found. Please check the URL.".to_string(),
            Self::ServerError { detail: Some(detail) } => detail.clone(),
            Self::ServerError { detail: None } => {
                "Internal server error. Please try again later.".to_string()
            }
            Self::Other { message, .. } => format!(
                "An error occurred: {}",
                message.as_deref().unwrap_or("Unknown error")
            ),
            Self::NoConnectivity => {
                "No response received from the server. Please check your internet connection."
                    .to_string()
            }
            Self::RequestSetup { message } => format!("Could not send the request: {message}"),
            Self::UnexpectedResponse => {
                "The server returned data in an unexpected format.".to_string()
            }
        }
    }
}

/// Classifies a transport failure for display.
#[must_use]
pub fn classify(error: &ApiError) -> ErrorCategory {
    match error {
        ApiError::Status { status: 401, .. } => ErrorCategory::Unauthorized,
        ApiError::Status { status: 403, .. } => ErrorCategory::Forbidden,
        ApiError::Status { status: 404, .. } => ErrorCategory::NotFound,
        ApiError::Status {
            status: 500,
            message,
        } => ErrorCategory::ServerError {
            detail: message.clone(),
        },
        ApiError::Status { status, message } => ErrorCategory::Other {
            status: *status,
            message: message.clone(),
        },
        ApiError::NoResponse(_) => ErrorCategory::NoConnectivity,
        ApiError::RequestSetup(message) => ErrorCategory::RequestSetup {
            message: message.clone(),
        },
        ApiError::MalformedResponse { .. } => ErrorCategory::UnexpectedResponse,
    }
}
