//! Conversation core for asking questions about a single uploaded document.

pub mod document;
pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod session;
pub mod timer;
pub mod transcript;
pub mod view;

pub use document::{DocumentCandidate, DocumentHolder, DocumentRef, INVALID_DOCUMENT_NOTICE};
pub use error::{InvalidDocument, OrchestratorError, RemoteFailure};
pub use orchestrator::{OrchestratorSettings, QueryOrchestrator, SessionEvent, SubmitOutcome};
pub use remote::{HttpQueryClient, RemoteQuery};
pub use session::{PendingRequest, QueryState, Session, SessionId, SessionSnapshot};
pub use timer::{Timer, TokioTimer};
pub use transcript::{Entry, Transcript};
pub use view::{present, BubbleSide, EntryView, StatusIndicator, ViewModel};
