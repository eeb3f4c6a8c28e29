use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::metrics::{PANICS_RECOVERED, REQUEST_TIMEOUTS};
use crate::middleware::request_id::RequestId;
use crate::state::AppState;

/// Deadline and cancellation signal for the current request.
///
/// Handlers may poll `cancellation` to stop early; nothing forces them to.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub deadline: Instant,
    pub cancellation: CancellationToken,
}

impl RequestContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Runs the rest of the stack as its own task and races it against the
/// configured request timeout.
///
/// On timeout the client gets a 500 right away. The inner task is detached,
/// not aborted: it keeps running and whatever it produces is dropped.
pub async fn timeout_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let timeout = state.request_timeout;
    let cancellation = CancellationToken::new();
    req.extensions_mut().insert(RequestContext {
        deadline: Instant::now() + timeout,
        cancellation: cancellation.clone(),
    });

    let request_id = RequestId::from_extensions(req.extensions());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut task = tokio::spawn(next.run(req));

    tokio::select! {
        joined = &mut task => match joined {
            Ok(res) => res,
            Err(join_err) => {
                // recover_middleware normally catches handler panics inside the task
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    panicked = join_err.is_panic(),
                    error = %join_err,
                    "request task failed"
                );
                if join_err.is_panic() {
                    PANICS_RECOVERED.inc();
                }
                state.error_response(&request_id, &ApiError::internal("internal server error"))
            }
        },
        () = tokio::time::sleep(timeout) => {
            cancellation.cancel();
            REQUEST_TIMEOUTS.inc();
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                timeout = ?timeout,
                "request timeout"
            );
            state.error_response(&request_id, &ApiError::internal("request timeout"))
        }
    }
}
