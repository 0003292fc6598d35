//! Pure mapping from session state to what a front end draws.

use shared::domain::Speaker;

use crate::{document::DocumentRef, session::QueryState, transcript::Entry};

pub const INPUT_PLACEHOLDER: &str = "Ask a question...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    None,
    SearchingDocument,
    SearchingWeb,
}

impl StatusIndicator {
    pub fn label(self) -> Option<&'static str> {
        match self {
            StatusIndicator::None => None,
            StatusIndicator::SearchingDocument => Some("Searching document..."),
            StatusIndicator::SearchingWeb => Some("Searching the web..."),
        }
    }
}

impl From<QueryState> for StatusIndicator {
    fn from(state: QueryState) -> Self {
        match state {
            QueryState::Idle => StatusIndicator::None,
            QueryState::AwaitingLocalAnswer => StatusIndicator::SearchingDocument,
            QueryState::AwaitingExternalAnswer => StatusIndicator::SearchingWeb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub sequence: u64,
    pub speaker: Speaker,
    pub label: &'static str,
    pub side: BubbleSide,
    pub text: String,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        let side = match entry.speaker() {
            Speaker::User => BubbleSide::Right,
            Speaker::Bot => BubbleSide::Left,
        };
        Self {
            sequence: entry.sequence(),
            speaker: entry.speaker(),
            label: entry.speaker().label(),
            side,
            text: entry.text().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub entries: Vec<EntryView>,
    pub input_enabled: bool,
    pub input_placeholder: &'static str,
    pub status: StatusIndicator,
    pub document_label: Option<String>,
}

pub fn present(state: QueryState, entries: &[Entry], document: Option<&DocumentRef>) -> ViewModel {
    ViewModel {
        entries: entries.iter().map(EntryView::from).collect(),
        input_enabled: state.is_idle(),
        input_placeholder: INPUT_PLACEHOLDER,
        status: StatusIndicator::from(state),
        document_label: document.map(|document| document.name().to_string()),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
