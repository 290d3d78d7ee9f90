//! Response construction helpers.
//!
//! # Responsibilities
//! - Build `text/html` and `application/json` responses from raw bytes
//! - The plain-text 404
//!
//! # Design Decisions
//! - Bodies are passed through as bytes; nothing here re-encodes content
//! - CORS headers are not set here; the middleware owns them

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const TEXT_HTML: HeaderValue = HeaderValue::from_static("text/html");
const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

/// 200 `text/html` with the given body.
pub fn html(body: impl Into<Bytes>) -> Response {
    with_content_type(StatusCode::OK, TEXT_HTML, body.into())
}

/// `application/json` with a pre-encoded body and an arbitrary status.
pub fn json_bytes(status: StatusCode, body: impl Into<Bytes>) -> Response {
    with_content_type(status, APPLICATION_JSON, body.into())
}

/// 404 plain text.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn with_content_type(status: StatusCode, content_type: HeaderValue, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    response
}
