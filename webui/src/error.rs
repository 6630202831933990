//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// A fragment set could not be loaded or parsed.
    ///
    /// Nothing is rendered when this occurs.
    #[error("Template parse error in {name}: {message}")]
    TemplateParse {
        /// Fragment (or render unit) that failed
        name: String,
        /// Parser diagnostic
        message: String,
    },

    /// A parsed render unit failed while substituting data.
    #[error("Template execution error in {name}: {message}")]
    TemplateExec {
        /// Render unit that failed
        name: String,
        /// Runtime diagnostic
        message: String,
    },

    /// A response body could not be encoded.
    ///
    /// Envelopes are built from internal structures, so this indicates a
    /// programming error rather than bad user input.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session store failure
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::TemplateParse {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn exec(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::TemplateExec {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateParse { .. } => "TEMPLATE_PARSE_ERROR",
            Self::TemplateExec { .. } => "TEMPLATE_EXEC_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Session(_) => "SESSION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let code = self.code();

        let user_message = match &self {
            Error::TemplateParse { name, message } => {
                tracing::error!(template = %name, "Template parse error: {}", message);
                "Page could not be rendered"
            }
            Error::TemplateExec { name, message } => {
                tracing::error!(template = %name, "Template execution error: {}", message);
                "Page could not be rendered"
            }
            Error::Serialization(e) => {
                tracing::error!("Response serialization error: {}", e);
                "Response could not be encoded"
            }
            Error::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                "Session operation failed"
            }
            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                "Service misconfigured"
            }
            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                "I/O operation failed"
            }
        };

        (
            status,
            Json(ErrorResponse::with_code(status, code, user_message)),
        )
            .into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        Error::Session(err.to_string())
    }
}
