//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default chat-completion endpoint of the upstream provider.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.deepseek.com/chat/completions";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream chat-completion provider.
    pub upstream: UpstreamConfig,

    /// On-disk documents served by the gateway.
    pub content: ContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. `0` asks the OS for an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL a browser on this machine uses to reach the application.
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// Upstream chat-completion provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the chat-completion endpoint.
    pub url: String,

    /// Bearer credential injected into every outbound call.
    pub api_key: String,

    /// Optional connect timeout in seconds. `None` keeps the transport default.
    pub connect_timeout_secs: Option<u64>,

    /// Optional total request timeout in seconds. `None` means no deadline.
    pub request_timeout_secs: Option<u64>,
}

impl UpstreamConfig {
    /// Whether a usable credential is present.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Hand-written so the credential never ends up in logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &if self.has_credential() { "<redacted>" } else { "<unset>" })
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: String::new(),
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

/// Paths of the documents the gateway serves or stores.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// The live preview document (read/replace).
    pub preview_path: PathBuf,

    /// The application document (read-only).
    pub app_document: PathBuf,

    /// The landing document (read-only).
    pub landing_document: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            preview_path: PathBuf::from("preview.html"),
            app_document: PathBuf::from("obert-ai.html"),
            landing_document: PathBuf::from("landing.html"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "preview_gateway=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}
