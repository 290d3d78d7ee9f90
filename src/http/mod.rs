//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, body accumulation)
//!     → middleware/cors.rs (preflight short-circuit, CORS headers)
//!     → server.rs dispatch → routing table → one handler
//!     → response.rs (html / json / 404 builders)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
