use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    DocumentHolder, HttpQueryClient, OrchestratorSettings, QueryOrchestrator, Session, TokioTimer,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use config::{load_settings, CliOverrides};
use console::{parse_line, Command, QuestionOutcome};

#[derive(Parser, Debug)]
#[command(name = "productpal", about = "Ask questions about a PDF document")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Document to select before the first question.
    #[arg(long)]
    document: Option<PathBuf>,
    #[command(flatten)]
    overrides: CliOverrides,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.overrides.apply(&mut settings);
    settings.validate()?;

    let remote = HttpQueryClient::new(&settings.backend_url, settings.request_timeout())
        .context("failed to build backend client")?;
    info!(url = %remote.ask_url(), "using answering backend");

    let session = Session::new(
        DocumentHolder::new(settings.accepted_media_type.clone()),
        settings.welcome_message.as_deref(),
    );
    let orchestrator = QueryOrchestrator::new(
        session,
        Arc::new(remote),
        Arc::new(TokioTimer),
        OrchestratorSettings {
            external_reveal_delay: settings.external_reveal_delay(),
            ..OrchestratorSettings::default()
        },
    );

    println!("{}", console::render_view(&orchestrator.view().await));
    let renderer = tokio::spawn(console::render_events(orchestrator.subscribe_events()));

    if let Some(path) = &args.document {
        console::open_document(&orchestrator, path).await;
    }

    let mut in_flight: Option<JoinHandle<()>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            Command::Quit => {
                if let Some(handle) = in_flight.take().filter(|handle| !handle.is_finished()) {
                    info!("leaving with a question still in flight");
                    handle.abort();
                }
                renderer.abort();
                return Ok(());
            }
            Command::Help => println!("{}", console::HELP),
            Command::Unknown(raw) => println!("Unknown command {raw}; try /help"),
            Command::Open(path) => console::open_document(&orchestrator, &path).await,
            Command::Ask(question) => {
                if let QuestionOutcome::Sent(handle) = console::ask(&orchestrator, &question).await
                {
                    in_flight = Some(handle);
                }
            }
        }
        // Let the renderer flush the events of this turn before reading on.
        tokio::task::yield_now().await;
    }

    // Input closed: let the last answer arrive before shutting down.
    if let Some(handle) = in_flight.take() {
        if let Err(err) = handle.await {
            error!(%err, "answer task ended abnormally");
        }
        tokio::task::yield_now().await;
    }

    renderer.abort();
    Ok(())
}
