use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL, REQUESTS_IN_FLIGHT};
use crate::middleware::request_id::RequestId;

// Decrements the in-flight gauge even if the request future is dropped.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        REQUESTS_IN_FLIGHT.inc();
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        REQUESTS_IN_FLIGHT.dec();
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let request_id = RequestId::from_extensions(req.extensions());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    REQUEST_TOTAL.inc();
    let _in_flight = InFlight::enter();
    let start = Instant::now();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        "request started"
    );

    let res = next.run(req).await;

    let elapsed = start.elapsed();
    REQUEST_LATENCY.observe(elapsed.as_secs_f64());
    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        remote_addr = %remote_addr,
        "request completed"
    );

    res
}
