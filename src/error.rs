//! Error types raised by pane construction and pane operations.
//!
//! Configuration and uniqueness problems are programmer errors: they are
//! returned synchronously and abort the operation. Transport failures are
//! never returned to the caller; they travel as [`TransportError`] values
//! into error hooks and the log while the pane recovers locally.

use thiserror::Error;

/// Coarse classification of a [`PaneError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Uniqueness,
}

#[derive(Debug, Error)]
pub enum PaneError {
    #[error("the container which a pane is created against must carry a non-blank id")]
    MissingId,
    #[error("the container id must be unique; a pane with id \"{id}\" already exists")]
    DuplicateId { id: String },
    #[error("no pane with id \"{id}\" is registered")]
    UnknownPane { id: String },
    #[error(
        "call parameters are required: a container id, request settings with a url, \
         and optionally a keep-modified probe and an after-call hook"
    )]
    MissingCallParams,
    #[error("a non-blank container id is required in order to issue a call")]
    MissingContainerId,
    #[error("a non-blank request url is required in order to issue a call")]
    MissingCallUrl,
    #[error("the refresh parameter name must not be blank")]
    BlankRefreshParameter,
    #[error("invalid pane configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("unable to read pane configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl PaneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaneError::DuplicateId { .. } => ErrorKind::Uniqueness,
            _ => ErrorKind::Configuration,
        }
    }
}

/// A failed request, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request to {url} failed ({}): {message}", status_label(.status))]
pub struct TransportError {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no status".to_string(),
    }
}

impl TransportError {
    pub fn new(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            message: message.into(),
        }
    }
}
