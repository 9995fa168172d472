//! Unified error handling for backend calls.
//!
//! Every failure a caller can see maps into [`ApiError`]: transport
//! failures, auth rejections, validation errors, and token decode errors.
//! The session store and cart synchronizer catch these and fold them into
//! stable state fields; the view layer decides what to show and whether to
//! retry. Nothing in this crate retries on its own.

use thiserror::Error;

use crate::session::token::TokenError;

/// Errors surfaced by the API gateway and the services built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/transport failure (connect, timeout, TLS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 - missing, invalid, or expired credentials.
    ///
    /// Surfaced as-is, never converted into a logout by the gateway; that
    /// policy belongs to the caller.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403 - authenticated but not allowed (e.g. non-admin calling an
    /// admin endpoint).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404 - resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// 400/422 - the backend rejected the request payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other non-success status.
    #[error("server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// Response body could not be parsed as the expected type.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Session token could not be decoded.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Operation requires a logged-in session and none exists.
    #[error("no active session")]
    NoSession,
}

impl ApiError {
    /// Map a non-success HTTP status and response body to an error.
    ///
    /// The body is passed through (truncated) rather than interpreted; the
    /// backend's error strings are already user-facing.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = truncate(body, 200);
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Whether this error means the session credentials were rejected.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }
}

fn truncate(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() <= max {
        trimmed.to_owned()
    } else {
        trimmed.chars().take(max).collect()
    }
}

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "expired"),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "admins only"),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "no such product"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "quantity must be positive"),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad field"),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_unknown_status_keeps_code() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_body_truncated() {
        let long = "x".repeat(500);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &long);
        match err {
            ApiError::Server { message, .. } => assert_eq!(message.len(), 200),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_is_auth() {
        assert!(ApiError::Unauthorized(String::new()).is_auth());
        assert!(ApiError::Forbidden(String::new()).is_auth());
        assert!(!ApiError::NoSession.is_auth());
        assert!(!ApiError::NotFound(String::new()).is_auth());
    }
}
