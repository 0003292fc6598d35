use serde::{Deserialize, Serialize};

/// The one document format the answering backend accepts.
pub const ACCEPTED_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Speaker::User => "you",
            Speaker::Bot => "bot",
        }
    }
}

/// Where an answer was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    #[default]
    Document,
    External,
}
