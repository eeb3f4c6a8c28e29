//! Envelope writer shared by handlers and middleware.

use std::convert::Infallible;
use std::error::Error as _;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::FromRequestParts;
use axum::extract::rejection::BytesRejection;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::clock::Clock;
use crate::error::{ApiError, ErrorCode};
use crate::middleware::request_id::RequestId;
use crate::models::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    let mut res = Response::new(Body::from(body));
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    res
}

pub fn error(clock: &dyn Clock, request_id: &str, err: &ApiError) -> Response {
    let status = err.status();
    let envelope = ErrorResponse::new(err, request_id, clock.timestamp());

    match serde_json::to_vec(&envelope) {
        Ok(body) => json_response(status, body),
        Err(e) => {
            // only reachable if serde_json itself is broken; keep the status
            error!(error = %e, request_id, status = status.as_u16(), "failed to encode error response");
            let mut res = Response::new(Body::empty());
            *res.status_mut() = status;
            res
        }
    }
}

pub fn success<T: Serialize>(clock: &dyn Clock, request_id: &str, data: T) -> Response {
    let envelope = SuccessResponse {
        data,
        request_id: request_id.to_owned(),
        timestamp: clock.timestamp(),
    };

    match serde_json::to_vec(&envelope) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(e) => {
            let err = ApiError::internal("failed to encode response").with_source(e);
            log_error(request_id, &err);
            error(clock, request_id, &err)
        }
    }
}

fn log_error(request_id: &str, err: &ApiError) {
    let cause = err.source().map(ToString::to_string);
    if err.code == ErrorCode::InternalError {
        error!(request_id, code = %err.code, message = %err.message, cause = ?cause, "internal error");
    } else {
        debug!(request_id, code = %err.code, message = %err.message, cause = ?cause, "request rejected");
    }
}

/// Per-request responder: the request ID plus the clock used for timestamps.
pub struct Reply {
    request_id: String,
    clock: Arc<dyn Clock>,
}

impl Reply {
    pub fn new(request_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            request_id: request_id.into(),
            clock,
        }
    }

    pub fn ok<T: Serialize>(&self, data: T) -> Response {
        success(self.clock.as_ref(), &self.request_id, data)
    }

    pub fn err(&self, err: ApiError) -> Response {
        log_error(&self.request_id, &err);
        error(self.clock.as_ref(), &self.request_id, &err)
    }

    pub fn send<T: Serialize>(&self, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(data) => self.ok(data),
            Err(err) => self.err(err),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for Reply {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequestId(id) = RequestId::from_request_parts(parts, state).await?;
        Ok(Reply::new(id, Arc::clone(&state.clock)))
    }
}

#[derive(Debug, Error)]
#[error("{field} is not a finite number ({value})")]
pub struct NonFiniteResult {
    field: &'static str,
    value: f64,
}

/// Fails with `INTERNAL_ERROR` when a computed field is NaN or infinite.
/// serde_json would otherwise encode it as `null` inside a 200.
pub fn ensure_finite(fields: &[(&'static str, f64)]) -> Result<(), ApiError> {
    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, value)) => Err(ApiError::internal("failed to encode response")
            .with_source(NonFiniteResult { field, value })),
        None => Ok(()),
    }
}

/// Decodes a JSON request body. Empty, `null` and malformed bodies are
/// `INVALID_INPUT`.
pub fn decode_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let bytes = body.map_err(|e| ApiError::invalid_input("failed to read request body").with_source(e))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::invalid_input("request body is required"));
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::invalid_input("invalid request body").with_source(e))
}
