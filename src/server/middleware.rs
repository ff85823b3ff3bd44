//! Request middleware: security headers, body size guard, and request logging.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;

/// `Content-Security-Policy` sent with every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; \
style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self' data:; \
connect-src 'self'; frame-ancestors 'none'; base-uri 'self'; form-action 'self'; \
object-src 'none'; upgrade-insecure-requests";

const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
];

/// Identify the client for rate limiting and logs.
///
/// Uses the first `X-Forwarded-For` hop when `trust_proxy` is set, then the
/// peer address, then `"unknown"`.
pub fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy
        && let Some(first_hop) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').map(str::trim).find(|hop| !hop.is_empty()))
    {
        return first_hop.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Attach the fixed set of security headers to every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

/// Reject requests whose declared `Content-Length` exceeds `limit` bytes.
///
/// Bodies without a length are capped by `DefaultBodyLimit` at extraction.
pub async fn enforce_body_limit(
    State(limit): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if let Some(length) = declared
        && length > limit as u64
    {
        tracing::debug!(length, limit, "Request body too large");
        return ApiError::PayloadTooLarge.into_response();
    }

    next.run(request).await
}

/// Log every completed request; `warn` for status >= 400.
pub async fn log_requests(
    State(trust_proxy): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_key(&request, trust_proxy);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status >= 400 {
        tracing::warn!(%method, %path, status, latency_ms, %client, %user_agent, "Request warning");
    } else {
        tracing::info!(%method, %path, status, latency_ms, %client, %user_agent, "Request");
    }

    response
}
