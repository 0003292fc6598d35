use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::document::{DocumentCandidate, DocumentHolder};

#[derive(Debug, Clone, Default)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct AskServerState {
    status: StatusCode,
    body: &'static str,
    received: Arc<Mutex<Vec<ReceivedField>>>,
}

async fn handle_ask(
    State(state): State<AskServerState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.received.lock().await.push(ReceivedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_ask_server(
    status: StatusCode,
    body: &'static str,
) -> std::io::Result<(String, AskServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = AskServerState {
        status,
        body,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/ask", post(handle_ask))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn pending(question: &str) -> PendingRequest {
    let mut holder = DocumentHolder::default();
    let document = holder
        .select(DocumentCandidate::new(
            "manual.pdf",
            Some("application/pdf"),
            b"%PDF-1.4 fake".to_vec(),
        ))
        .expect("select");
    PendingRequest {
        session_id: crate::session::SessionId(uuid::Uuid::new_v4()),
        question: question.to_string(),
        document,
    }
}

fn field<'a>(fields: &'a [ReceivedField], name: &str) -> &'a ReceivedField {
    fields
        .iter()
        .find(|field| field.name == name)
        .unwrap_or_else(|| panic!("missing multipart field {name}"))
}

#[tokio::test]
async fn ask_posts_multipart_form_and_decodes_answer() {
    let (server_url, state) =
        spawn_ask_server(StatusCode::OK, r#"{"answer":"42","source":"document"}"#)
            .await
            .expect("spawn server");
    let client = HttpQueryClient::new(&server_url, None).expect("client");

    let response = client
        .ask(&pending("what is the answer?"))
        .await
        .expect("ask");
    assert_eq!(response.answer, "42");
    assert_eq!(response.source, shared::domain::AnswerSource::Document);

    let received = state.received.lock().await.clone();
    assert_eq!(received.len(), 3);

    let file = field(&received, "file");
    assert_eq!(file.file_name.as_deref(), Some("manual.pdf"));
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(file.bytes, b"%PDF-1.4 fake");

    assert_eq!(field(&received, "question").bytes, b"what is the answer?");
    assert_eq!(field(&received, "use_web_fallback").bytes, b"true");
}

#[tokio::test]
async fn external_source_is_passed_through() {
    let (server_url, _state) = spawn_ask_server(
        StatusCode::OK,
        r#"{"answer":"sky is blue","source":"external"}"#,
    )
    .await
    .expect("spawn server");
    let client = HttpQueryClient::new(&server_url, None).expect("client");

    let response = client.ask(&pending("sky colour?")).await.expect("ask");
    assert_eq!(response.source, shared::domain::AnswerSource::External);
}

#[tokio::test]
async fn error_status_is_a_remote_failure() {
    let (server_url, _state) =
        spawn_ask_server(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#)
            .await
            .expect("spawn server");
    let client = HttpQueryClient::new(&server_url, None).expect("client");

    let err = client.ask(&pending("q")).await.expect_err("500");
    assert!(matches!(err, RemoteFailure::Status(500)));
}

#[tokio::test]
async fn body_without_answer_is_a_remote_failure() {
    let (server_url, _state) = spawn_ask_server(StatusCode::OK, r#"{"detail":"no answer"}"#)
        .await
        .expect("spawn server");
    let client = HttpQueryClient::new(&server_url, None).expect("client");

    let err = client.ask(&pending("q")).await.expect_err("missing answer");
    assert!(matches!(err, RemoteFailure::Protocol(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpQueryClient::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("client");
    let err = client.ask(&pending("q")).await.expect_err("refused");
    assert!(matches!(err, RemoteFailure::Transport(_)));
}

#[test]
fn ask_url_appends_route_to_backend_root() {
    assert_eq!(
        ask_url("http://localhost:8000").expect("url").as_str(),
        "http://localhost:8000/ask"
    );
}

#[test]
fn ask_url_keeps_path_prefix() {
    assert_eq!(
        ask_url("https://example.com/api").expect("url").as_str(),
        "https://example.com/api/ask"
    );
    assert_eq!(
        ask_url("https://example.com/api/").expect("url").as_str(),
        "https://example.com/api/ask"
    );
}

#[test]
fn invalid_backend_url_is_rejected() {
    assert!(ask_url("not a url").is_err());
    assert!(matches!(
        HttpQueryClient::new("::", None),
        Err(RemoteFailure::InvalidUrl(_))
    ));
}
