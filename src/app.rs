use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state, map_request};
use axum::routing::{MethodRouter, get, post};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::RequestBodyTimeoutLayer;

use crate::handlers::{self, method_not_allowed};
use crate::middleware::{
    MakeHexRequestId, X_REQUEST_ID, logging_middleware, recover_middleware,
    request_id_middleware, strip_client_request_id, timeout_middleware,
};
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

// POST-only route; any other method gets the structured 405
fn api<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: axum::handler::Handler<T, Arc<AppState>>,
    T: 'static,
{
    post(handler).fallback(method_not_allowed)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/math/add", api(handlers::add_handler))
        .route("/api/math/subtract", api(handlers::subtract_handler))
        .route("/api/math/multiply", api(handlers::multiply_handler))
        .route("/api/math/divide", api(handlers::divide_handler))
        .route("/api/finance/vat", api(handlers::vat_handler))
        .route(
            "/api/finance/compound-interest",
            api(handlers::compound_interest_handler),
        )
        .route("/api/finance/loan-payment", api(handlers::loan_payment_handler))
        .route("/api/utils/bmi", api(handlers::bmi_handler))
        .route(
            "/api/utils/unit-conversion",
            api(handlers::unit_conversion_handler),
        )
}

/// Wraps `routes` in the request pipeline. The last layer added runs first:
/// request id (strip, set, propagate, extension), rate limit, timeout,
/// logging, panic recovery, body read timeout.
pub fn with_middleware(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    routes
        .layer(RequestBodyTimeoutLayer::new(state.read_timeout))
        .layer(from_fn_with_state(state.clone(), recover_middleware))
        .layer(from_fn(logging_middleware))
        .layer(from_fn_with_state(state.clone(), timeout_middleware))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeHexRequestId))
        .layer(map_request(strip_client_request_id))
        .with_state(state)
}

pub fn router(state: Arc<AppState>) -> Router {
    with_middleware(routes(), state)
}
