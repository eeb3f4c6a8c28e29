use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;

use crate::metrics::REQUESTS_IN_FLIGHT;
use crate::models::{HealthResponse, ReadinessResponse};
use crate::response::Reply;
use crate::state::AppState;

const MAX_IN_FLIGHT: f64 = 1000.0;
const MAX_TRACKED_CLIENTS: usize = 100_000;

fn check(ok: bool) -> String {
    let status = if ok { "ok" } else { "warning" };
    status.to_owned()
}

// health handler
pub async fn health_handler(State(state): State<Arc<AppState>>, reply: Reply) -> Response {
    let mut checks = BTreeMap::new();
    checks.insert("in_flight".to_owned(), check(REQUESTS_IN_FLIGHT.get() <= MAX_IN_FLIGHT));
    checks.insert(
        "rate_limiter".to_owned(),
        check(state.limiter.tracked_clients() <= MAX_TRACKED_CLIENTS),
    );

    // whole seconds keep the uptime readable
    let uptime = std::time::Duration::from_secs(state.started_at.elapsed().as_secs());

    reply.ok(HealthResponse {
        status: "healthy".to_owned(),
        timestamp: state.clock.timestamp(),
        uptime: humantime::format_duration(uptime).to_string(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        checks,
    })
}

// readiness check; nothing external to wait for
pub async fn ready_handler(reply: Reply) -> Response {
    reply.ok(ReadinessResponse {
        ready: true,
        status: "ready".to_owned(),
    })
}
