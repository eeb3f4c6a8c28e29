use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::response::Response;

use crate::calc::UnitRegistry;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ApiError;
use crate::rate_limit::RateLimiter;
use crate::response;

// app's shared state
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub units: UnitRegistry, // read-only after start-up
    pub limiter: RateLimiter,
    pub request_timeout: Duration,
    pub read_timeout: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            units: UnitRegistry::new(),
            limiter: RateLimiter::per_minute(config.rate_limit_rpm, config.rate_limit_burst),
            request_timeout: config.request_timeout,
            read_timeout: config.read_timeout,
            started_at: Instant::now(),
        }
    }

    pub fn error_response(&self, request_id: &str, err: &ApiError) -> Response {
        response::error(self.clock.as_ref(), request_id, err)
    }
}
