//! Per-client token-bucket rate limiting.
//!
//! Each client key (normally an IP) owns one bucket of `burst` tokens that
//! refills continuously at `rate` tokens per second. A request consumes one
//! token or is rejected outright.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use tracing::warn;

use crate::error::ApiError;
use crate::metrics::{RATE_LIMIT_CLIENTS, RATE_LIMITED_TOTAL};
use crate::middleware::request_id::RequestId;
use crate::state::AppState;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

// Token bucket - tracks tokens per client key
#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, capacity: f64, rate: f64, now: Instant) {
        // `now` may be older than `last_refill` when callers race; treat as no time passed
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Whole tokens left after this check.
    pub remaining: u32,
    /// Time until the next token is available; zero when allowed.
    pub retry_after: Duration,
}

pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    // tokens per second
    rate: f64,
    burst: u32,
}

impl RateLimiter {
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            rate,
            burst,
        }
    }

    /// Builds a limiter from a requests-per-minute budget.
    pub fn per_minute(requests_per_minute: f64, burst: u32) -> Self {
        Self::new(requests_per_minute / 60.0, burst)
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }

    pub fn allow(&self, key: &str) -> bool {
        self.check(key).allowed
    }

    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        self.check_at(key, now).allowed
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Refills and tries to take one token from `key`'s bucket as of `now`.
    ///
    /// The bucket entry stays locked for the whole read-modify-write, so
    /// concurrent checks for one key cannot over-admit.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let capacity = f64::from(self.burst);

        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| TokenBucket::full(capacity, now));
        bucket.refill(capacity, self.rate, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return RateLimitDecision {
                allowed: true,
                remaining: bucket.tokens.floor() as u32,
                retry_after: Duration::ZERO,
            };
        }

        let missing = 1.0 - bucket.tokens;
        let retry_after = if self.rate > 0.0 {
            Duration::try_from_secs_f64(missing / self.rate).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        };

        RateLimitDecision {
            allowed: false,
            remaining: 0,
            retry_after,
        }
    }

    // TODO: evict buckets that have been full and idle for longer than a configurable TTL;
    // until then entries live for the whole process.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// "203.0.113.7:51234" -> "203.0.113.7"; "[::1]:80" and "[::1]" -> "::1"
fn strip_port(addr: &str) -> &str {
    let host = match addr.parse::<SocketAddr>() {
        Ok(_) => addr.rsplit_once(':').map_or(addr, |(host, _)| host),
        Err(_) => addr,
    };
    host.trim_start_matches('[').trim_end_matches(']')
}

/// Client key in priority order: first `X-Forwarded-For` hop, `X-Real-IP`,
/// peer IP, then `"unknown"`.
pub fn client_key(req: &Request) -> String {
    let headers = req.headers();

    if let Some(xff) = header_str(headers, "x-forwarded-for") {
        let first = xff.split(',').next().unwrap_or(xff).trim();
        return strip_port(first).to_owned();
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_owned();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let limiter = &state.limiter;
    let client = client_key(&req);
    let decision = limiter.check(&client);
    RATE_LIMIT_CLIENTS.set(limiter.tracked_clients() as f64);

    if !decision.allowed {
        let request_id = RequestId::from_extensions(req.extensions());
        warn!(
            request_id = %request_id,
            client = %client,
            method = %req.method(),
            path = %req.uri().path(),
            "rate limit exceeded"
        );
        RATE_LIMITED_TOTAL.inc();

        let mut res = state.error_response(&request_id, &ApiError::rate_limit_exceeded());
        let retry_secs = decision.retry_after.as_secs_f64().ceil().max(1.0) as u64;
        let headers = res.headers_mut();
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.burst()));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
        return res;
    }

    let mut res = next.run(req).await;
    let headers = res.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.burst()));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn burst_then_refill() {
        let limiter = RateLimiter::new(1.0, 2);
        let t0 = Instant::now();

        assert!(limiter.allow_at("10.0.0.1", t0));
        assert!(limiter.allow_at("10.0.0.1", t0));
        assert!(!limiter.allow_at("10.0.0.1", t0));
        assert!(limiter.allow_at("10.0.0.1", t0 + Duration::from_secs(1)));
        assert!(!limiter.allow_at("10.0.0.1", t0 + Duration::from_secs(1)));
    }

    #[test]
    fn keys_do_not_share_buckets() {
        let limiter = RateLimiter::new(1.0, 1);
        let t0 = Instant::now();

        assert!(limiter.allow_at("a", t0));
        assert!(!limiter.allow_at("a", t0));
        assert!(limiter.allow_at("b", t0));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn tokens_never_exceed_capacity() {
        let limiter = RateLimiter::new(10.0, 3);
        let t0 = Instant::now();
        assert!(limiter.allow_at("k", t0));

        // an hour of refill still caps at 3
        let later = t0 + Duration::from_secs(3600);
        let first = limiter.check_at("k", later);
        assert!(first.allowed);
        assert_eq!(first.remaining, 2);
        assert!(limiter.allow_at("k", later));
        assert!(limiter.allow_at("k", later));
        assert!(!limiter.allow_at("k", later));
    }

    #[test]
    fn denied_check_reports_wait() {
        let limiter = RateLimiter::per_minute(30.0, 1);
        let t0 = Instant::now();
        assert!(limiter.allow_at("k", t0));

        let denied = limiter.check_at("k", t0);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after, Duration::from_secs(2));

        // a denial consumes nothing: half the wait leaves the bucket at half a token
        let half = limiter.check_at("k", t0 + Duration::from_secs(1));
        assert!(!half.allowed);
        assert!(limiter.allow_at("k", t0 + Duration::from_secs(2)));
    }

    #[test]
    fn out_of_order_instants_do_not_underflow() {
        let limiter = RateLimiter::new(1.0, 1);
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(5);
        assert!(limiter.allow_at("k", t1));
        assert!(!limiter.allow_at("k", t0));
    }

    #[test]
    fn concurrent_checks_never_over_admit() {
        let limiter = Arc::new(RateLimiter::new(0.0001, 50));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..100).filter(|_| limiter.allow("shared")).count())
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }

    fn request(headers: &[(&str, &str)], peer: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/math/add");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            let addr: SocketAddr = peer.parse().unwrap();
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    #[test]
    fn client_key_priority() {
        let peer = Some("192.168.1.1:12345");
        assert_eq!(
            client_key(&request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")], peer)),
            "203.0.113.7"
        );
        assert_eq!(
            client_key(&request(&[("x-forwarded-for", "203.0.113.7:8080")], peer)),
            "203.0.113.7"
        );
        assert_eq!(
            client_key(&request(&[("x-real-ip", "198.51.100.2")], peer)),
            "198.51.100.2"
        );
        assert_eq!(client_key(&request(&[], peer)), "192.168.1.1");
        assert_eq!(client_key(&request(&[("x-forwarded-for", "  ")], None)), "unknown");
    }

    #[test]
    fn strip_port_handles_ipv6() {
        assert_eq!(strip_port("[::1]:8080"), "::1");
        assert_eq!(strip_port("::1"), "::1");
        assert_eq!(strip_port("[2001:db8::1]"), "2001:db8::1");
        assert_eq!(strip_port("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn bracketed_ipv6_shares_bucket_with_bare_form() {
        let bracketed = request(&[("x-forwarded-for", "[2001:db8::1]")], None);
        let bare = request(&[("x-forwarded-for", "2001:db8::1")], None);
        let with_port = request(&[("x-forwarded-for", "[2001:db8::1]:443")], None);
        assert_eq!(client_key(&bracketed), "2001:db8::1");
        assert_eq!(client_key(&bracketed), client_key(&bare));
        assert_eq!(client_key(&with_port), client_key(&bare));

        let limiter = RateLimiter::new(1.0, 1);
        let t0 = Instant::now();
        assert!(limiter.allow_at(&client_key(&bracketed), t0));
        assert!(!limiter.allow_at(&client_key(&bare), t0));
    }
}
