use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Machine-readable error code carried in every error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    ValidationError,
    DivisionByZero,
    MethodNotAllowed,
    InternalError,
    RateLimitExceeded,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::DivisionByZero => "DIVISION_BY_ZERO",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::ValidationError | ErrorCode::DivisionByZero => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned to the client as a structured envelope.
///
/// `source` is never serialized; it only reaches the server log.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message).with_details(details)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorCode::DivisionByZero, "division by zero is not allowed")
    }

    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            ErrorCode::MethodNotAllowed,
            format!("method {method} not allowed"),
        )
    }

    pub fn rate_limit_exceeded() -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            "rate limit exceeded, please try again later",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_http_status() {
        let cases = [
            (ErrorCode::InvalidInput, StatusCode::BAD_REQUEST),
            (ErrorCode::ValidationError, StatusCode::BAD_REQUEST),
            (ErrorCode::DivisionByZero, StatusCode::BAD_REQUEST),
            (ErrorCode::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (ErrorCode::RateLimitExceeded, StatusCode::TOO_MANY_REQUESTS),
            (ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(code.status(), status, "{code}");
        }
    }

    #[test]
    fn code_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::RateLimitExceeded).unwrap();
        assert_eq!(json, "\"RATE_LIMIT_EXCEEDED\"");
        assert_eq!(ErrorCode::DivisionByZero.to_string(), "DIVISION_BY_ZERO");
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = ApiError::validation("invalid a", "a must be a valid number, got NaN");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] invalid a");
        assert_eq!(
            err.details.as_deref(),
            Some("a must be a valid number, got NaN")
        );
    }

    #[test]
    fn source_is_kept_for_logging() {
        let parse = serde_json::from_str::<f64>("nope").unwrap_err();
        let err = ApiError::invalid_input("invalid request body").with_source(parse);
        assert!(err.source().is_some());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn method_not_allowed_names_the_method() {
        let err = ApiError::method_not_allowed(&Method::GET);
        assert_eq!(err.message, "method GET not allowed");
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
