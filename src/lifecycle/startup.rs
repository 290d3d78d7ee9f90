//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration (missing credential is fatal)
//! - Create the preview file from the placeholder if absent
//! - Build the server; the caller binds the listener last
//!
//! # Design Decisions
//! - Fail fast: nothing is served with a degraded configuration
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use thiserror::Error;

use crate::config::{validate_config, ConfigError, GatewayConfig};
use crate::content::{placeholder, ContentStore, StoreError};
use crate::http::GatewayServer;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not create preview document: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Validate `config`, bootstrap the preview file and build the server.
pub async fn bootstrap(config: GatewayConfig) -> Result<GatewayServer, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    let store = Arc::new(ContentStore::new(config.content.preview_path.clone()));
    if store.ensure_exists(&placeholder::bootstrap_document()).await? {
        tracing::info!(path = ?store.path(), "Created initial preview document");
    }

    Ok(GatewayServer::new(config, store)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationError;

    fn config_in(dir: &tempfile::TempDir) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.api_key = "sk-test".into();
        config.content.preview_path = dir.path().join("preview.html");
        config
    }

    #[tokio::test]
    async fn test_missing_credential_is_fatal_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.upstream.api_key.clear();

        let err = bootstrap(config).await.err().expect("startup should fail");
        assert!(matches!(
            err,
            StartupError::Config(ConfigError::Validation(ref e)) if e.contains(&ValidationError::MissingCredential)
        ));
        assert!(!dir.path().join("preview.html").exists());
    }

    #[tokio::test]
    async fn test_creates_placeholder_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        bootstrap(config_in(&dir)).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("preview.html")).unwrap();
        assert_eq!(written, placeholder::bootstrap_document());
    }

    #[tokio::test]
    async fn test_keeps_existing_preview() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("preview.html"), "<p>mine</p>").unwrap();
        bootstrap(config_in(&dir)).await.unwrap();

        let kept = std::fs::read_to_string(dir.path().join("preview.html")).unwrap();
        assert_eq!(kept, "<p>mine</p>");
    }
}
