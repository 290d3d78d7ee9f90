//! Upstream proxy error taxonomy.
//!
//! # Design Decisions
//! - An upstream *response*, whatever its status, is never an error here
//! - Transport failures are classified once, at the boundary, into a short
//!   stable code plus a human-readable message
//! - A connection reset gets an actionable message instead of the raw text

use std::error::Error as StdError;
use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::http::request::BodyError;

pub const RESET_MESSAGE: &str = "Connection to the API was reset; try again";
const DETAILS: &str = "Check gateway logs for more information";

/// Kind of outbound transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Reset,
    Timeout,
    Connect,
    Other,
}

impl TransportKind {
    /// Short stable token reported in the `code` field.
    pub fn code(self) -> &'static str {
        match self {
            TransportKind::Reset => "ECONNRESET",
            TransportKind::Timeout => "ETIMEDOUT",
            TransportKind::Connect => "ECONNREFUSED",
            TransportKind::Other => "EUPSTREAM",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Reset => "reset",
            TransportKind::Timeout => "timeout",
            TransportKind::Connect => "connect",
            TransportKind::Other => "other",
        }
    }
}

/// Error type for the chat relay.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    BodyRead(#[source] BodyError),

    #[error("{message}")]
    Transport {
        kind: TransportKind,
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid upstream url '{0}'")]
    InvalidUrl(String),
}

impl UpstreamError {
    /// Classify a failure raised while sending the request or reading the reply.
    pub fn transport(source: reqwest::Error) -> Self {
        let kind = classify(&source);
        let message = match kind {
            TransportKind::Reset => RESET_MESSAGE.to_string(),
            _ => error_chain(&source),
        };
        UpstreamError::Transport {
            kind,
            message,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::InvalidJson(_) | UpstreamError::BodyRead(_) => StatusCode::BAD_REQUEST,
            UpstreamError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UpstreamError::Transport { .. }
            | UpstreamError::Client(_)
            | UpstreamError::InvalidUrl(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl From<BodyError> for UpstreamError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge => UpstreamError::BodyTooLarge,
            other => UpstreamError::BodyRead(other),
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = match &self {
            UpstreamError::Transport { kind, .. } => ErrorEnvelope {
                error: self.to_string(),
                code: Some(kind.code()),
                details: Some(DETAILS),
            },
            _ => ErrorEnvelope {
                error: self.to_string(),
                code: None,
                details: None,
            },
        };
        (status, Json(envelope)).into_response()
    }
}

fn classify(err: &reqwest::Error) -> TransportKind {
    if is_connection_reset(err) {
        TransportKind::Reset
    } else if err.is_timeout() {
        TransportKind::Timeout
    } else if err.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Other
    }
}

/// Hyper's text for a peer that closed the connection without replying.
const INCOMPLETE_MESSAGE: &str = "connection closed before message completed";

/// Walk the source chain looking for a reset or hung-up connection.
pub fn is_connection_reset(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(error) = current {
        if let Some(io_err) = error.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
            ) {
                return true;
            }
        }
        let text = error.to_string().to_ascii_lowercase();
        if text.contains("connection reset") || text.contains(INCOMPLETE_MESSAGE) {
            return true;
        }
        current = error.source();
    }
    false
}

/// Join an error and its sources into one line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(error) = current {
        let text = error.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = error.source();
    }
    parts.join(": ")
}
