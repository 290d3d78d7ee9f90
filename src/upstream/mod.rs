//! Upstream chat-completion proxy.
//!
//! # Data Flow
//! ```text
//! POST /api/chat
//!     → accumulate body
//!     → parse JSON (400 {"error":"Invalid JSON"} on failure, no outbound call)
//!     → client.rs: POST to provider with bearer credential
//!     → buffer upstream body
//!     → reply with upstream status + body, Content-Type: application/json
//!
//! transport failure → error.rs → 500 {"error","code","details"}
//! ```

pub mod client;
pub mod error;

use axum::{body::Body, response::{IntoResponse, Response}};

use crate::http::request::read_body;
use crate::http::response::json_bytes;

pub use client::{UpstreamProxy, UpstreamReply};
pub use error::{TransportKind, UpstreamError};

/// Handle `POST /api/chat`.
pub async fn relay_chat(proxy: &UpstreamProxy, body: Body, limit: usize, request_id: &str) -> Response {
    match relay(proxy, body, limit, request_id).await {
        Ok(reply) => json_bytes(reply.status, reply.body),
        Err(e) => {
            if matches!(e, UpstreamError::InvalidJson(_)) {
                tracing::warn!(request_id = %request_id, "Rejected chat payload: invalid JSON");
            }
            e.into_response()
        }
    }
}

async fn relay(proxy: &UpstreamProxy, body: Body, limit: usize, request_id: &str) -> Result<UpstreamReply, UpstreamError> {
    let bytes = read_body(body, limit).await.map_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Chat body rejected");
        UpstreamError::from(e)
    })?;
    let payload = UpstreamProxy::parse_payload(&bytes)?;
    proxy.relay(&payload, request_id).await
}
