//! Per-request identifiers.
//!
//! Every request gets a 32-char lowercase hex ID at ingress. Any
//! client-supplied `X-Request-ID` is dropped first. tower-http's
//! `SetRequestIdLayer` calls [`MakeHexRequestId`]. `PropagateRequestIdLayer`
//! echoes the ID back, and [`request_id_middleware`] exposes it as a typed
//! [`RequestId`] extension for the envelope writer.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{self, Extensions, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tower_http::request_id::{MakeRequestId, RequestId as HeaderRequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Returned when a request never went through [`request_id_middleware`].
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

const ID_BYTES: usize = 16;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// The attached ID, or `"unknown"` when there is none.
    pub fn from_extensions(extensions: &Extensions) -> String {
        extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_owned())
    }
}

impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestId(Self::from_extensions(&parts.extensions)))
    }
}

/// 16 bytes from the OS CSPRNG, hex-encoded.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => hex::encode(bytes),
        Err(err) => {
            tracing::warn!(error = %err, "OS random source unavailable, using fallback request id");
            fallback_id()
        }
    }
}

// Deterministic but process-unique: hash of a counter and the wall clock.
fn fallback_id() -> String {
    let seq = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(seq.to_le_bytes());
    hasher.update(nanos.to_le_bytes());
    hex::encode(&hasher.finalize()[..ID_BYTES])
}

/// ID source for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeHexRequestId;

impl MakeRequestId for MakeHexRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<HeaderRequestId> {
        HeaderValue::from_str(&generate_id())
            .ok()
            .map(HeaderRequestId::new)
    }
}

// IDs are always generated here, never taken from the client
pub async fn strip_client_request_id(mut req: Request) -> Request {
    req.headers_mut().remove(X_REQUEST_ID);
    req
}

/// Copies the ID assigned by `SetRequestIdLayer` into a [`RequestId`] extension.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = req
        .extensions()
        .get::<HeaderRequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(generate_id);
    req.extensions_mut().insert(RequestId(id));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_hex_id(id: &str) -> bool {
        id.len() == ID_BYTES * 2 && id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn generated_ids_are_fixed_length_hex() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| is_hex_id(id)));
    }

    #[test]
    fn fallback_ids_are_hex_and_distinct() {
        let a = fallback_id();
        let b = fallback_id();
        assert!(is_hex_id(&a) && is_hex_id(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn make_request_id_yields_hex_header_values() {
        let req = http::Request::new(());
        let mut make = MakeHexRequestId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert!(is_hex_id(a.header_value().to_str().unwrap()));
        assert_ne!(a.header_value(), b.header_value());
    }

    #[test]
    fn missing_id_reads_as_unknown() {
        let mut ext = Extensions::new();
        assert_eq!(RequestId::from_extensions(&ext), "unknown");
        ext.insert(RequestId("abc123".into()));
        assert_eq!(RequestId::from_extensions(&ext), "abc123");
    }
}
