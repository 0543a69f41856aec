use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("credential rejected"))]
    Unauthorized { message: Option<String> },

    #[error("Access denied: {}", .message.as_deref().unwrap_or("forbidden"))]
    AccessDenied { message: Option<String> },

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification used by the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Server,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// JSON fields that may carry the server's explanation, in priority order
const MESSAGE_FIELDS: [&str; 2] = ["message", "error"];

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    /// Pull the user-facing message out of an error body.
    ///
    /// JSON bodies contribute their `message` (or `error`) field verbatim;
    /// plain-text bodies are used as-is after truncation.
    pub fn extract_message(body: &str) -> Option<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(trimmed) {
            // Fields that are not strings (e.g. a structured `error`) are skipped
            Ok(Value::Object(fields)) => MESSAGE_FIELDS
                .iter()
                .filter_map(|key| fields.get(*key).and_then(Value::as_str))
                .find(|m| !m.trim().is_empty())
                .map(str::to_string),
            _ if trimmed.starts_with('{') || trimmed.starts_with('<') => None,
            _ => Some(Self::truncate_body(trimmed)),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { message },
            code => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unauthorized { .. } => ErrorKind::Auth,
            ApiError::AccessDenied { .. }
            | ApiError::Server { .. }
            | ApiError::InvalidResponse(_) => ErrorKind::Server,
        }
    }

    /// The message the server supplied, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message }
            | ApiError::Server { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "").kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            ApiError::from_status(StatusCode::FORBIDDEN, "").kind(),
            ErrorKind::Server
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "").kind(),
            ErrorKind::Server
        );
        assert_eq!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").kind(),
            ErrorKind::Server
        );
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            ApiError::extract_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            ApiError::extract_message(r#"{"error":"Account locked"}"#).as_deref(),
            Some("Account locked")
        );
        assert_eq!(
            ApiError::extract_message("Service unavailable").as_deref(),
            Some("Service unavailable")
        );
        assert_eq!(
            ApiError::extract_message(
                r#"{"success":false,"message":"Invalid credentials","error":{"code":"E_AUTH"}}"#
            )
            .as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            ApiError::extract_message(r#"{"message":"","error":"Account locked"}"#).as_deref(),
            Some("Account locked")
        );
        assert_eq!(ApiError::extract_message(r#"{"error":{"code":"E_AUTH"}}"#), None);
        assert_eq!(ApiError::extract_message(r#"{"message":""}"#), None);
        assert_eq!(ApiError::extract_message("<html>oops</html>"), None);
        assert_eq!(ApiError::extract_message("   "), None);
    }

    #[test]
    fn test_server_message_survives_status_mapping() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Bad password"}"#);
        assert_eq!(err.server_message(), Some("Bad password"));
        assert_eq!(err.to_string(), "Unauthorized: Bad password");

        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"message":"Invalid credentials","error":{"code":"E_AUTH"}}"#,
        );
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated"));
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
    }
}
