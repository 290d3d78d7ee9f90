//! Middleware applied to every gateway response.

pub mod cors;

pub use cors::cors_middleware;
