use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Url,
};
use shared::protocol::{
    AskResponse, ASK_ROUTE, FIELD_FILE, FIELD_QUESTION, FIELD_USE_WEB_FALLBACK,
};
use tracing::debug;

use crate::{error::RemoteFailure, session::PendingRequest};

/// The answering backend, seen from the client.
#[async_trait]
pub trait RemoteQuery: Send + Sync {
    async fn ask(&self, request: &PendingRequest) -> Result<AskResponse, RemoteFailure>;
}

pub struct HttpQueryClient {
    http: Client,
    ask_url: Url,
}

impl HttpQueryClient {
    pub fn new(backend_url: &str, timeout: Option<Duration>) -> Result<Self, RemoteFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            ask_url: ask_url(backend_url)?,
        })
    }

    pub fn ask_url(&self) -> &Url {
        &self.ask_url
    }
}

/// Resolves the ask route beneath `backend_url`, keeping any path prefix it carries.
pub fn ask_url(backend_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(backend_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(ASK_ROUTE.trim_start_matches('/'))
}

#[async_trait]
impl RemoteQuery for HttpQueryClient {
    async fn ask(&self, request: &PendingRequest) -> Result<AskResponse, RemoteFailure> {
        let document = &request.document;
        let file = Part::bytes(document.bytes().to_vec())
            .file_name(document.name().to_string())
            .mime_str(document.media_type())?;
        let form = Form::new()
            .part(FIELD_FILE, file)
            .text(FIELD_QUESTION, request.question.clone())
            .text(FIELD_USE_WEB_FALLBACK, "true");

        debug!(url = %self.ask_url, bytes = document.len(), "posting ask request");
        let response = self
            .http
            .post(self.ask_url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFailure::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(AskResponse::decode(&body)?)
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
