use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use futures::FutureExt;
use tracing::error;

use crate::error::ApiError;
use crate::metrics::PANICS_RECOVERED;
use crate::middleware::request_id::RequestId;
use crate::state::AppState;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// Catch-all barrier: a panic anywhere below becomes a 500 `INTERNAL_ERROR`.
///
/// The panic message and a backtrace go to the log; the client only sees a
/// generic message.
pub async fn recover_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = RequestId::from_extensions(req.extensions());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => {
            PANICS_RECOVERED.inc();
            error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %panic_message(payload.as_ref()),
                stack = %Backtrace::force_capture(),
                "panic recovered"
            );
            state.error_response(&request_id, &ApiError::internal("internal server error"))
        }
    }
}
