//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Refuse to start without an upstream credential
//! - Validate value ranges (body limit > 0, parseable addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the listener is bound

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream API key is not set (set DEEPSEEK_API_KEY)")]
    MissingCredential,

    #[error("upstream url '{0}' is not a valid http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("listener host '{0}' is not a valid bind address")]
    InvalidListenerHost(String),

    #[error("metrics address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.upstream.has_credential() {
        errors.push(ValidationError::MissingCredential);
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
        _ => errors.push(ValidationError::InvalidUpstreamUrl(config.upstream.url.clone())),
    }

    if config.listener.bind_address().parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenerHost(config.listener.host.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let paths = [
        ("content.preview_path", &config.content.preview_path),
        ("content.app_document", &config.content.app_document),
        ("content.landing_document", &config.content.landing_document),
    ];
    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyPath(name));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("connect_timeout_secs"));
    }
    if config.upstream.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("request_timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
