//! Error handling for the MCP tool server.
//!
//! Every error that can reach a client maps to exactly one HTTP status code
//! and renders as `{ "error": <message>, "status": <code> }`. Authorization
//! failures are deliberately generic so a client cannot tell a malformed
//! credential from an unknown one.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Main error type for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// No credential, or a credential not in the configured key set (401)
    #[error("Unauthorized: Invalid or missing authorization key")]
    Unauthorized,

    /// Unparsable JSON body or missing/ill-typed fields (400)
    #[error("{0}")]
    MalformedRequest(String),

    /// Tool name not present in the registry (400)
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Path not served by the router (404)
    #[error("Not Found")]
    UnknownRoute,

    /// Unexpected fault during tool execution (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl ServerError {
    /// Create a malformed request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        ServerError::MalformedRequest(msg.into())
    }

    /// Create an unknown tool error
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        ServerError::UnknownTool(name.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ServerError::Internal(msg.into())
    }

    /// Message safe to hand back to a client.
    ///
    /// Internal faults are reported generically; their detail only goes to
    /// the log.
    pub fn client_message(&self) -> String {
        match self {
            ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::Io(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Build the JSON body for this error
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.client_message(),
            status: self.status_code().as_u16(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::MalformedRequest(_) | ServerError::UnknownTool(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::UnknownRoute => StatusCode::NOT_FOUND,
            ServerError::Internal(_)
            | ServerError::Config(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(error = ?self, "Error handling request");
        }

        HttpResponse::build(self.status_code()).json(self.to_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServerError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::malformed("Invalid JSON in request body").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::unknown_tool("bogus").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::UnknownRoute.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let body = ServerError::internal("database password was hunter2").to_body();
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.status, 500);
    }

    #[test]
    fn test_io_errors_are_reported_generically() {
        let err: ServerError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "port 8000 taken").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body().error, "Internal server error");
    }

    #[test]
    fn test_unknown_tool_message() {
        let body = ServerError::unknown_tool("bogus").to_body();
        assert_eq!(body.error, "Unknown tool: bogus");
        assert_eq!(body.status, 400);
    }
}
