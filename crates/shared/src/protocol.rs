use serde::{Deserialize, Serialize};

use crate::{domain::AnswerSource, error::ProtocolError};

pub const ASK_ROUTE: &str = "/ask";
pub const FIELD_FILE: &str = "file";
pub const FIELD_QUESTION: &str = "question";
pub const FIELD_USE_WEB_FALLBACK: &str = "use_web_fallback";

/// Raw body returned by the answering backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponseBody {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A decoded answer with its source classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
    pub source: AnswerSource,
    /// Set when the backend sent a source tag this client does not know.
    pub unrecognized_source: Option<String>,
}

impl AskResponse {
    pub fn new(answer: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            answer: answer.into(),
            source,
            unrecognized_source: None,
        }
    }

    pub fn decode(raw: &[u8]) -> Result<Self, ProtocolError> {
        let body: AskResponseBody = serde_json::from_slice(raw)?;
        Self::try_from(body)
    }
}

impl TryFrom<AskResponseBody> for AskResponse {
    type Error = ProtocolError;

    fn try_from(body: AskResponseBody) -> Result<Self, Self::Error> {
        let answer = body.answer.ok_or(ProtocolError::MissingAnswer)?;
        let (source, unrecognized_source) = match body.source.as_deref() {
            None | Some("document") => (AnswerSource::Document, None),
            Some("external") => (AnswerSource::External, None),
            Some(other) => (AnswerSource::Document, Some(other.to_string())),
        };
        Ok(Self {
            answer,
            source,
            unrecognized_source,
        })
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
