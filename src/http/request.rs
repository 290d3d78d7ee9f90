//! Request identification and body accumulation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Read a request body in full, bounded by the configured limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An ID supplied by the caller is kept, not replaced
//! - Handlers always see the complete body; there is no streaming to upstream

use axum::{
    body::{Body, Bytes},
    http::{HeaderName, Request},
};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that assigns `x-request-id` to requests lacking one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Convenience accessor for the request ID header.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds the configured limit")]
    TooLarge,

    /// The client went away or sent a malformed body mid-stream.
    #[error("request body could not be read: {0}")]
    Interrupted(#[source] axum::Error),
}

impl From<axum::Error> for BodyError {
    fn from(err: axum::Error) -> Self {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(error) = current {
            if error.is::<LengthLimitError>() {
                return BodyError::TooLarge;
            }
            current = error.source();
        }
        BodyError::Interrupted(err)
    }
}

/// Accumulate the full request body, at most `limit` bytes.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, BodyError> {
    Ok(axum::body::to_bytes(body, limit).await?)
}
