//! Live preview channel.
//!
//! `GET /preview` serves the stored document, or a fallback page when none can
//! be read (status stays 200 so the preview pane never shows an error).
//! `POST /preview/update` replaces the document with the `html` field of a JSON
//! body.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::{ContentStore, StoreError};
use crate::http::request::{read_body, BodyError};
use crate::http::response::html;
use crate::observability::metrics;

/// Body of `POST /preview/update`.
#[derive(Debug, Deserialize)]
pub struct PreviewUpdate {
    pub html: String,
}

/// Reply envelope of `POST /preview/update`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PreviewReply {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    BodyRead(#[source] BodyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PreviewError {
    fn status(&self) -> StatusCode {
        match self {
            PreviewError::InvalidJson(_) | PreviewError::BodyRead(_) => StatusCode::BAD_REQUEST,
            PreviewError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            PreviewError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn result_label(&self) -> &'static str {
        match self {
            PreviewError::InvalidJson(_) => "invalid_json",
            PreviewError::BodyTooLarge => "too_large",
            PreviewError::BodyRead(_) => "body_error",
            PreviewError::Store(_) => "store_error",
        }
    }
}

impl From<BodyError> for PreviewError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge => PreviewError::BodyTooLarge,
            other => PreviewError::BodyRead(other),
        }
    }
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        (self.status(), Json(PreviewReply::failed(self.to_string()))).into_response()
    }
}

/// Handle `GET /preview`.
pub async fn read_preview(store: &ContentStore, fallback: &str) -> Response {
    match store.read().await {
        Ok(document) => html(document),
        Err(e) => {
            if e.is_not_found() {
                tracing::debug!(path = ?store.path(), "No preview yet, serving fallback");
            } else {
                tracing::warn!(error = %e, "Preview unreadable, serving fallback");
            }
            html(fallback.to_owned())
        }
    }
}

/// Handle `POST /preview/update`.
pub async fn update_preview(store: &ContentStore, body: Body, limit: usize, request_id: &str) -> Response {
    match apply_update(store, body, limit).await {
        Ok(bytes) => {
            tracing::info!(request_id = %request_id, bytes, "Preview updated");
            metrics::record_preview_update("ok");
            Json(PreviewReply::ok()).into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Preview update failed");
            metrics::record_preview_update(e.result_label());
            e.into_response()
        }
    }
}

async fn apply_update(store: &ContentStore, body: Body, limit: usize) -> Result<usize, PreviewError> {
    let bytes = read_body(body, limit).await?;
    let update: PreviewUpdate = serde_json::from_slice(&bytes).map_err(PreviewError::InvalidJson)?;
    store.replace(&update.html).await?;
    Ok(update.html.len())
}
