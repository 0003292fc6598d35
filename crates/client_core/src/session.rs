use std::fmt;

use shared::domain::Speaker;
use uuid::Uuid;

use crate::{
    document::{DocumentCandidate, DocumentHolder, DocumentRef},
    error::{InvalidDocument, OrchestratorError},
    transcript::{Entry, Transcript},
};

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome to ProductPal. Please upload a File to get started";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    AwaitingLocalAnswer,
    AwaitingExternalAnswer,
}

impl QueryState {
    pub fn is_idle(self) -> bool {
        self == QueryState::Idle
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryState::Idle => "idle",
            QueryState::AwaitingLocalAnswer => "awaiting_local_answer",
            QueryState::AwaitingExternalAnswer => "awaiting_external_answer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The question in flight, pinned to the document that was held when it was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub session_id: SessionId,
    pub question: String,
    pub document: DocumentRef,
}

#[derive(Debug, Clone)]
pub enum SubmitStep {
    Ignored,
    NeedsDocument { question: Entry, guidance: Entry },
    Dispatch { question: Entry, request: PendingRequest },
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: QueryState,
    pub entries: Vec<Entry>,
    pub document: Option<DocumentRef>,
}

/// Everything one conversation owns.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    documents: DocumentHolder,
    transcript: Transcript,
    state: QueryState,
    pending: Option<PendingRequest>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DocumentHolder::default(), Some(DEFAULT_WELCOME_MESSAGE))
    }
}

impl Session {
    pub fn new(documents: DocumentHolder, welcome: Option<&str>) -> Self {
        let mut transcript = Transcript::new();
        if let Some(welcome) = welcome.filter(|text| !text.trim().is_empty()) {
            transcript.append(Speaker::Bot, welcome);
        }
        Self {
            id: SessionId(Uuid::new_v4()),
            documents,
            transcript,
            state: QueryState::Idle,
            pending: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn document(&self) -> Option<DocumentRef> {
        self.documents.current()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn select_document(
        &mut self,
        candidate: DocumentCandidate,
    ) -> Result<DocumentRef, InvalidDocument> {
        self.documents.select(candidate)
    }

    /// First half of a submission: gates on state and document, records the question.
    pub fn begin_submit(
        &mut self,
        question: &str,
        guidance: &str,
    ) -> Result<SubmitStep, OrchestratorError> {
        if !self.state.is_idle() {
            return Err(OrchestratorError::Busy);
        }
        if question.trim().is_empty() {
            return Ok(SubmitStep::Ignored);
        }

        let Some(document) = self.documents.current() else {
            let question = self.transcript.append(Speaker::User, question);
            let guidance = self.transcript.append(Speaker::Bot, guidance);
            return Ok(SubmitStep::NeedsDocument { question, guidance });
        };

        let question_entry = self.transcript.append(Speaker::User, question);
        let request = PendingRequest {
            session_id: self.id,
            question: question.to_string(),
            document,
        };
        self.pending = Some(request.clone());
        self.state = QueryState::AwaitingLocalAnswer;
        Ok(SubmitStep::Dispatch {
            question: question_entry,
            request,
        })
    }

    /// Switches the indicator to the external lookup. Only valid while a request is pending.
    pub fn mark_external(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.state = QueryState::AwaitingExternalAnswer;
        true
    }

    /// Records the bot reply for the pending request and returns to idle.
    pub fn settle(&mut self, reply: &str) -> Entry {
        let entry = self.transcript.append(Speaker::Bot, reply);
        self.pending = None;
        self.state = QueryState::Idle;
        entry
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            entries: self.transcript.all(),
            document: self.documents.current(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
