//! Obert development gateway.
//!
//! One process, one port: static app documents, the live preview slot, and
//! the chat-completion relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                     GATEWAY                       │
//!   Browser request      │  ┌──────────┐   ┌────────┐   ┌───────────────┐   │
//!   ─────────────────────┼─▶│ request  │──▶│  CORS  │──▶│ routing table │   │
//!                        │  │ id/trace │   │preflight│   │ first match   │   │
//!                        │  └──────────┘   └────────┘   └──────┬────────┘   │
//!                        │                                     │            │
//!                        │        ┌────────────────┬───────────┼──────┐     │
//!                        │        ▼                ▼           ▼      │     │
//!                        │  ┌──────────┐    ┌───────────┐ ┌─────────┐ │     │
//!                        │  │ static   │    │ preview   │ │upstream │─┼─────┼──▶ LLM API
//!                        │  │ documents│    │ channel   │ │ proxy   │ │     │
//!                        │  └──────────┘    └─────┬─────┘ └─────────┘ │     │
//!                        │                        ▼                   │     │
//!                        │                 ┌─────────────┐            │     │
//!                        │                 │content store│ preview.html     │
//!                        │                 └─────────────┘                  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use preview_gateway::config::{load_config, GatewayConfig};
use preview_gateway::lifecycle::{bootstrap, Shutdown};
use preview_gateway::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "preview-gateway", version, about = "Local development gateway for Obert")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind (overrides BIND_HOST).
    #[arg(short, long)]
    bind: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut GatewayConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(bind) = &self.bind {
            config.listener.host = bind.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    logging::init(&config.observability);
    tracing::info!("preview-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.url,
        preview = ?config.content.preview_path,
        "Configuration loaded"
    );

    let metrics_enabled = config.observability.metrics_enabled;
    let metrics_address = config.observability.metrics_address.clone();
    let app_url = config.listener.local_url();

    // Credential and other fatal checks happen here, before binding.
    let server = match bootstrap(config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    if metrics_enabled {
        match metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(metrics_address = %metrics_address, error = %e, "Failed to parse metrics address"),
        }
    }

    let listener = TcpListener::bind(server.config().listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    tracing::info!("Obert app running on {app_url}");
    tracing::info!("Preview available at {app_url}/preview");

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
