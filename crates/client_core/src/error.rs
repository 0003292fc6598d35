use shared::error::ProtocolError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} has media type {declared:?}, expected {expected}")]
pub struct InvalidDocument {
    pub name: String,
    pub declared: Option<String>,
    pub expected: String,
}

/// Any failure of the ask round trip. Callers treat every variant the same way.
#[derive(Debug, Error)]
pub enum RemoteFailure {
    #[error("ask request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("a question is already in flight")]
    Busy,
}
