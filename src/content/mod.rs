//! On-disk documents.
//!
//! # Data Flow
//! ```text
//! preview.html  ⇄ store.rs (read / atomic replace)     ⇄ preview channel
//! app, landing  → documents.rs (read per request)      → static routes
//! placeholder.rs: bootstrap + fallback HTML
//! ```

pub mod documents;
pub mod placeholder;
pub mod store;

pub use documents::{StaticDocument, StaticResponder};
pub use store::{ContentStore, StoreError};
