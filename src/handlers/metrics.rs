use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::metrics;
use crate::response::Reply;

// Prometheus text exposition, not wrapped in the envelope
pub async fn metrics_handler(reply: Reply) -> Response {
    match metrics::render() {
        Ok(body) => body.into_response(),
        Err(e) => reply.err(ApiError::internal("failed to encode metrics").with_source(e)),
    }
}
