//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, then overlay the process
/// environment. The result is not validated yet; callers may still apply
/// command-line overrides before calling [`validate_config`](crate::config::validate_config).
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env(&mut config, |var| std::env::var(var).ok())?;
    Ok(config)
}

fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts `std::env::var` so the mapping can be tested without
/// mutating the process environment. Empty values are treated as unset.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(value) = get("PORT").or_else(|| get("APP_PORT")) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: "PORT",
            value,
        })?;
    }
    if let Some(host) = get("BIND_HOST") {
        config.listener.host = host;
    }
    if let Some(key) = get("DEEPSEEK_API_KEY").or_else(|| get("UPSTREAM_API_KEY")) {
        config.upstream.api_key = key;
    }
    if let Some(url) = get("UPSTREAM_URL") {
        config.upstream.url = url;
    }
    if let Some(path) = get("PREVIEW_FILE") {
        config.content.preview_path = PathBuf::from(path);
    }
    Ok(())
}
