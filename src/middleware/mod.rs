//! Request pipeline, outermost first:
//! request id -> rate limit -> timeout -> logging -> panic recovery -> handler.
//!
//! The rate limiter lives in [`crate::rate_limit`]; the layers are stacked in
//! [`crate::app::with_middleware`].

pub mod logging;
pub mod recover;
pub mod request_id;
pub mod timeout;

pub use logging::logging_middleware;
pub use recover::recover_middleware;
pub use request_id::{
    MakeHexRequestId, RequestId, X_REQUEST_ID, generate_id, request_id_middleware,
    strip_client_request_id,
};
pub use timeout::{RequestContext, timeout_middleware};
