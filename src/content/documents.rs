//! Static document responder.
//!
//! Serves the application and landing documents by kind. Every request re-reads
//! the file; there is no caching and no conditional request support.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ContentConfig;
use crate::http::response::html;

/// Which static document to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticDocument {
    App,
    Landing,
}

impl StaticDocument {
    fn label(self) -> &'static str {
        match self {
            StaticDocument::App => "Obert",
            StaticDocument::Landing => "landing page",
        }
    }
}

/// The document file could not be read.
#[derive(Debug, Error)]
#[error("Error loading {label}")]
pub struct StaticError {
    label: &'static str,
    #[source]
    source: std::io::Error,
}

impl IntoResponse for StaticError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.source, document = self.label, "Static document unavailable");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Reads static documents from disk.
#[derive(Debug, Clone)]
pub struct StaticResponder {
    app: PathBuf,
    landing: PathBuf,
}

impl StaticResponder {
    pub fn new(content: &ContentConfig) -> Self {
        Self {
            app: content.app_document.clone(),
            landing: content.landing_document.clone(),
        }
    }

    /// Load the document bytes.
    pub async fn load(&self, doc: StaticDocument) -> Result<Vec<u8>, StaticError> {
        let path = match doc {
            StaticDocument::App => &self.app,
            StaticDocument::Landing => &self.landing,
        };
        tokio::fs::read(path).await.map_err(|source| StaticError {
            label: doc.label(),
            source,
        })
    }

    /// Serve the document as `text/html`, or 500 with a plain-text body.
    pub async fn respond(&self, doc: StaticDocument) -> Response {
        match self.load(doc).await {
            Ok(bytes) => html(bytes),
            Err(e) => e.into_response(),
        }
    }
}
