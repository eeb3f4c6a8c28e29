use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("calc_api_requests_total", "Total number of requests").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "calc_api_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref REQUESTS_IN_FLIGHT: Gauge =
        register_gauge!("calc_api_requests_in_flight", "Requests currently being handled").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("calc_api_rate_limited_total", "Requests rejected by the rate limiter")
            .unwrap();
    pub static ref RATE_LIMIT_CLIENTS: Gauge = register_gauge!(
        "calc_api_rate_limit_clients",
        "Client buckets held by the rate limiter"
    )
    .unwrap();
    pub static ref PANICS_RECOVERED: Counter =
        register_counter!("calc_api_panics_recovered_total", "Handler panics converted to 500s")
            .unwrap();
    pub static ref REQUEST_TIMEOUTS: Counter =
        register_counter!("calc_api_request_timeouts_total", "Requests that hit the timeout")
            .unwrap();
}

/// Renders the default registry in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
