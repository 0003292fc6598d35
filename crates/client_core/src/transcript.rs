use std::sync::Arc;

use shared::domain::Speaker;

/// One immutable transcript record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    speaker: Speaker,
    text: Arc<str>,
    sequence: u64,
}

impl Entry {
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Append-only conversation log. Sequence numbers start at zero and never skip.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, text: impl Into<Arc<str>>) -> Entry {
        let entry = Entry {
            speaker,
            text: text.into(),
            sequence: self.entries.len() as u64,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Snapshot of the log at call time. Later appends do not show up in it.
    pub fn all(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/transcript_tests.rs"]
mod tests;
