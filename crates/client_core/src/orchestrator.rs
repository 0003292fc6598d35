use std::{sync::Arc, time::Duration};

use shared::domain::AnswerSource;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    document::{DocumentCandidate, DocumentRef},
    error::{InvalidDocument, OrchestratorError},
    remote::RemoteQuery,
    session::{PendingRequest, QueryState, Session, SessionId, SessionSnapshot, SubmitStep},
    timer::Timer,
    transcript::Entry,
    view::{present, ViewModel},
};

pub const DEFAULT_EXTERNAL_REVEAL_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_GUIDANCE_MESSAGE: &str =
    "Please upload a PDF document before asking a question.";
pub const DEFAULT_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while fetching the answer. Please try again.";
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Minimum time the external lookup indicator stays up before the answer appears.
    pub external_reveal_delay: Duration,
    pub guidance_message: String,
    pub failure_message: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            external_reveal_delay: DEFAULT_EXTERNAL_REVEAL_DELAY,
            guidance_message: DEFAULT_GUIDANCE_MESSAGE.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(QueryState),
    EntryAppended(Entry),
    DocumentSelected(DocumentRef),
    DocumentRejected(InvalidDocument),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank question; nothing changed.
    Ignored,
    /// No document held; the guidance reply was appended.
    NeedsDocument,
    /// The question is in flight. The handle resolves once the reply is in the transcript.
    Dispatched(JoinHandle<()>),
}

/// Drives one session through ask cycles.
pub struct QueryOrchestrator {
    session_id: SessionId,
    session: Mutex<Session>,
    remote: Arc<dyn RemoteQuery>,
    timer: Arc<dyn Timer>,
    settings: OrchestratorSettings,
    events: broadcast::Sender<SessionEvent>,
}

impl QueryOrchestrator {
    pub fn new(
        session: Session,
        remote: Arc<dyn RemoteQuery>,
        timer: Arc<dyn Timer>,
        settings: OrchestratorSettings,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            session_id: session.id(),
            session: Mutex::new(session),
            remote,
            timer,
            settings,
            events,
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> QueryState {
        self.session.lock().await.state()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn view(&self) -> ViewModel {
        let snapshot = self.snapshot().await;
        present(snapshot.state, &snapshot.entries, snapshot.document.as_ref())
    }

    pub async fn select_document(
        &self,
        candidate: DocumentCandidate,
    ) -> Result<DocumentRef, InvalidDocument> {
        let mut session = self.session.lock().await;
        match session.select_document(candidate) {
            Ok(document) => {
                info!(
                    session_id = %session.id(),
                    name = document.name(),
                    bytes = document.len(),
                    "document selected"
                );
                self.emit(SessionEvent::DocumentSelected(document.clone()));
                Ok(document)
            }
            Err(rejection) => {
                warn!(session_id = %session.id(), %rejection, "document rejected");
                self.emit(SessionEvent::DocumentRejected(rejection.clone()));
                Err(rejection)
            }
        }
    }

    /// Records the question and, when a document is held, starts the ask round trip
    /// on a background task. Returns without waiting for the answer.
    pub async fn submit(
        self: &Arc<Self>,
        question: &str,
    ) -> Result<SubmitOutcome, OrchestratorError> {
        let mut session = self.session.lock().await;
        let session_id = session.id();
        let step = match session.begin_submit(question, &self.settings.guidance_message) {
            Ok(step) => step,
            Err(err) => {
                warn!(%session_id, state = %session.state(), "submit rejected while busy");
                return Err(err);
            }
        };

        match step {
            SubmitStep::Ignored => Ok(SubmitOutcome::Ignored),
            SubmitStep::NeedsDocument { question, guidance } => {
                debug!(%session_id, "question asked without a document");
                self.emit(SessionEvent::EntryAppended(question));
                self.emit(SessionEvent::EntryAppended(guidance));
                Ok(SubmitOutcome::NeedsDocument)
            }
            SubmitStep::Dispatch { question, request } => {
                info!(
                    %session_id,
                    sequence = question.sequence(),
                    document = request.document.name(),
                    "dispatching question"
                );
                self.emit(SessionEvent::EntryAppended(question));
                self.emit(SessionEvent::StateChanged(session.state()));
                drop(session);

                let orchestrator = Arc::clone(self);
                let handle = tokio::spawn(async move { orchestrator.complete(request).await });
                Ok(SubmitOutcome::Dispatched(handle))
            }
        }
    }

    async fn complete(&self, request: PendingRequest) {
        let session_id = request.session_id;
        let reply = match self.remote.ask(&request).await {
            Ok(response) => {
                if let Some(tag) = &response.unrecognized_source {
                    warn!(
                        %session_id,
                        source = %tag,
                        "unknown answer source, treating as document"
                    );
                }
                if response.source == AnswerSource::External {
                    self.enter_external_lookup().await;
                    self.timer.sleep(self.settings.external_reveal_delay).await;
                }
                response.answer
            }
            Err(err) => {
                warn!(%session_id, %err, "ask request failed");
                self.settings.failure_message.clone()
            }
        };

        let mut session = self.session.lock().await;
        let entry = session.settle(&reply);
        info!(
            session_id = %session.id(),
            sequence = entry.sequence(),
            "answer settled"
        );
        self.emit(SessionEvent::EntryAppended(entry));
        self.emit(SessionEvent::StateChanged(session.state()));
    }

    async fn enter_external_lookup(&self) {
        let mut session = self.session.lock().await;
        if session.mark_external() {
            debug!(session_id = %session.id(), "answer came from external lookup");
            self.emit(SessionEvent::StateChanged(session.state()));
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the session state is the source of truth.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
