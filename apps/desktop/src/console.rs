//! Terminal surface: input parsing and transcript rendering.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use client_core::{
    BubbleSide, DocumentCandidate, EntryView, OrchestratorError, QueryOrchestrator, SessionEvent,
    StatusIndicator, SubmitOutcome, ViewModel, INVALID_DOCUMENT_NOTICE,
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, warn};

pub const HELP: &str = "\
Commands:
  /open <path>   select the PDF to ask about
  /help          show this help
  /quit          leave
Anything else is sent as a question.";

pub const BUSY_NOTICE: &str = "Still waiting for the previous answer.";

const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Ask(String),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "open" if !arg.is_empty() => Command::Open(PathBuf::from(arg)),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Builds a picker candidate, declaring the media type from the file name.
pub async fn candidate_from_path(path: &Path) -> anyhow::Result<DocumentCandidate> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path).first_raw();
    Ok(DocumentCandidate::new(name, media_type, bytes))
}

pub async fn open_document(orchestrator: &QueryOrchestrator, path: &Path) {
    match candidate_from_path(path).await {
        // Selection results are reported through the event stream.
        Ok(candidate) => {
            let _ = orchestrator.select_document(candidate).await;
        }
        Err(err) => {
            warn!(error = %err, "document could not be read");
            println!("Could not open {}: {err:#}", path.display());
        }
    }
}

#[derive(Debug)]
pub enum QuestionOutcome {
    /// In flight; the handle resolves once the reply is in the transcript.
    Sent(JoinHandle<()>),
    /// Blank, or answered locally with the upload guidance.
    Handled,
    /// Input is disabled while an answer is pending; the line is dropped.
    Rejected,
}

/// Sends a typed question unless the view has input disabled.
pub async fn ask(orchestrator: &Arc<QueryOrchestrator>, question: &str) -> QuestionOutcome {
    if !orchestrator.view().await.input_enabled {
        println!("{BUSY_NOTICE}");
        return QuestionOutcome::Rejected;
    }
    match orchestrator.submit(question).await {
        Ok(SubmitOutcome::Dispatched(handle)) => QuestionOutcome::Sent(handle),
        Ok(SubmitOutcome::Ignored | SubmitOutcome::NeedsDocument) => QuestionOutcome::Handled,
        Err(OrchestratorError::Busy) => {
            println!("{BUSY_NOTICE}");
            QuestionOutcome::Rejected
        }
    }
}

pub fn format_entry(entry: &EntryView) -> String {
    match entry.side {
        BubbleSide::Left => format!("{:>4} | {}", entry.label, entry.text),
        BubbleSide::Right => {
            let bubble = format!("{} | {}", entry.text, entry.label);
            format!("{bubble:>LINE_WIDTH$}")
        }
    }
}

pub fn format_status(status: StatusIndicator) -> Option<String> {
    status.label().map(|label| format!("  ... {label}"))
}

pub fn render_view(view: &ViewModel) -> String {
    let mut lines: Vec<String> = view.entries.iter().map(format_entry).collect();
    match &view.document_label {
        Some(name) => lines.push(format!("[document: {name}]")),
        None => lines.push("[no document selected, use /open <path>]".to_string()),
    }
    if let Some(status) = format_status(view.status) {
        lines.push(status);
    }
    lines.join("\n")
}

pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::EntryAppended(entry) => Some(format_entry(&EntryView::from(entry))),
        SessionEvent::StateChanged(state) => format_status(StatusIndicator::from(*state)),
        SessionEvent::DocumentSelected(document) => Some(format!(
            "[document: {} ({} bytes)]",
            document.name(),
            document.len()
        )),
        SessionEvent::DocumentRejected(_) => Some(INVALID_DOCUMENT_NOTICE.to_string()),
    }
}

pub async fn render_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = render_event(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "renderer lagged behind session events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
