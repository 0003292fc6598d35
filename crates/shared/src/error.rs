use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed ask response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("ask response is missing the answer field")]
    MissingAnswer,
}
