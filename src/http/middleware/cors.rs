//! Cross-origin middleware.
//!
//! Stamps permissive CORS headers on every response, including errors and
//! 404s, and answers `OPTIONS` preflights itself before routing runs.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOW_METHODS: HeaderValue = HeaderValue::from_static("GET, POST, OPTIONS");
const ALLOW_HEADERS: HeaderValue = HeaderValue::from_static("Content-Type, Authorization");
const ALLOW_CREDENTIALS: HeaderValue = HeaderValue::from_static("true");
const ANY_ORIGIN: HeaderValue = HeaderValue::from_static("*");

pub async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .cloned()
        .unwrap_or(ANY_ORIGIN);

    let mut response = if req.method() == Method::OPTIONS {
        tracing::debug!(path = %req.uri().path(), "Answering preflight");
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(response.headers_mut(), origin);
    response
}

/// Insert the CORS header set, echoing `origin`.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS);
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS);
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, ALLOW_CREDENTIALS);
}
