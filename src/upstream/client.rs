//! Chat-completion relay client.
//!
//! # Responsibilities
//! - Parse the caller's payload as JSON (no schema)
//! - POST it to the provider with the bearer credential and exact length
//! - Buffer the complete upstream reply and hand back status + body
//!
//! # Design Decisions
//! - No retries; a failed call is reported once
//! - Idle pooling disabled: each call opens a fresh connection
//! - No deadline unless one is configured

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{header, StatusCode},
};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::error::UpstreamError;

/// The provider's reply, untouched.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Relays chat payloads to the configured provider.
#[derive(Clone)]
pub struct UpstreamProxy {
    client: Client,
    endpoint: Url,
    credential: String,
}

impl UpstreamProxy {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let endpoint = Url::parse(&config.url).map_err(|e| {
            tracing::error!(url = %config.url, error = %e, "Invalid upstream URL");
            UpstreamError::InvalidUrl(config.url.clone())
        })?;

        let mut builder = Client::builder().pool_max_idle_per_host(0);
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(UpstreamError::Client)?;

        Ok(Self {
            client,
            endpoint,
            credential: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Parse the caller's body. Any JSON value is accepted.
    pub fn parse_payload(body: &[u8]) -> Result<Value, UpstreamError> {
        serde_json::from_slice(body).map_err(UpstreamError::InvalidJson)
    }

    /// Forward `payload` and buffer the reply.
    pub async fn relay(&self, payload: &Value, request_id: &str) -> Result<UpstreamReply, UpstreamError> {
        let start = Instant::now();
        let body = payload.to_string().into_bytes();

        tracing::debug!(
            request_id = %request_id,
            endpoint = %self.endpoint,
            bytes = body.len(),
            "Forwarding chat request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.credential)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .map_err(|e| self.fail(e, request_id, start))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.fail(e, request_id, start))?;

        tracing::info!(
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream response"
        );
        if status != StatusCode::OK {
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&body),
                "Upstream error response"
            );
        }
        metrics::record_upstream("response", start);

        Ok(UpstreamReply { status, body })
    }

    fn fail(&self, source: reqwest::Error, request_id: &str, start: Instant) -> UpstreamError {
        let err = UpstreamError::transport(source);
        if let UpstreamError::Transport { kind, source, .. } = &err {
            tracing::error!(
                request_id = %request_id,
                kind = kind.as_str(),
                code = kind.code(),
                error = %crate::upstream::error::error_chain(source),
                "Upstream transport failure"
            );
            metrics::record_upstream(kind.as_str(), start);
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::error::TransportKind;

    fn config(url: &str) -> UpstreamConfig {
        UpstreamConfig {
            url: url.into(),
            api_key: "sk-test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_payload_accepts_any_json() {
        assert!(UpstreamProxy::parse_payload(br#"{"model":"m","messages":[]}"#).is_ok());
        assert!(UpstreamProxy::parse_payload(b"[1,2,3]").is_ok());
    }

    #[test]
    fn test_parse_payload_rejects_garbage() {
        let err = UpstreamProxy::parse_payload(b"{not json").unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidJson(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            UpstreamProxy::new(&config("not a url")),
            Err(UpstreamError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let proxy = UpstreamProxy::new(&config(&format!("http://{addr}/chat/completions"))).unwrap();
        let err = proxy
            .relay(&serde_json::json!({"messages": []}), "test")
            .await
            .unwrap_err();

        match err {
            UpstreamError::Transport { kind, ref message, .. } => {
                assert_eq!(kind, TransportKind::Connect);
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
