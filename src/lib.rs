//! Local development gateway for the Obert code-generation app.
//!
//! Serves the app and landing documents, holds the live preview document,
//! and relays chat-completion requests to the upstream LLM provider.

pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod preview;
pub mod routing;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
