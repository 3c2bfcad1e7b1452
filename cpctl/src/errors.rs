//! Error types for the control-plane client

use control_plane_api::{ErrorResponse, Revision};
use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the control-plane client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The control plane answered with a status other than the expected one
    #[error("{context}: {status}: {body}")]
    StatusError {
        context: String,
        status: StatusCode,
        body: String,
    },

    #[error("Revision ID {revision_id} failed: {revision}")]
    RevisionFailed {
        revision_id: String,
        revision: Box<Revision>,
    },

    #[error("Timeout waiting for revision ID {revision_id} to be DEPLOYED: {}", last_seen(.revision))]
    Timeout {
        revision_id: String,
        revision: Option<Box<Revision>>,
    },

    #[error("Cancelled while waiting for revision ID {revision_id}")]
    Cancelled { revision_id: String },

    #[error("Interrupted by shutdown signal")]
    Interrupted,

    #[error("No revisions found for deployment ID {0}")]
    NoRevisions(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn last_seen(revision: &Option<Box<Revision>>) -> String {
    match revision {
        Some(revision) => revision.to_string(),
        None => "no revision observed".to_string(),
    }
}

impl ClientError {
    /// Structured `{error, message}` descriptor for callers that report errors as data
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            ClientError::StatusError { status, body, .. } => ErrorResponse {
                error: format!("HTTP {}", status.as_u16()),
                message: body.clone(),
            },
            ClientError::HttpError(_) | ClientError::JsonError(_) => ErrorResponse {
                error: "Request failed".to_string(),
                message: self.to_string(),
            },
            ClientError::RevisionFailed { .. } => ErrorResponse {
                error: "Revision failed".to_string(),
                message: self.to_string(),
            },
            ClientError::Timeout { .. } => ErrorResponse {
                error: "Timeout".to_string(),
                message: self.to_string(),
            },
            ClientError::Cancelled { .. } | ClientError::Interrupted => ErrorResponse {
                error: "Cancelled".to_string(),
                message: self.to_string(),
            },
            ClientError::NoRevisions(_) => ErrorResponse {
                error: "Not found".to_string(),
                message: self.to_string(),
            },
            ClientError::ConfigError(_) => ErrorResponse {
                error: "Configuration error".to_string(),
                message: self.to_string(),
            },
        }
    }
}
