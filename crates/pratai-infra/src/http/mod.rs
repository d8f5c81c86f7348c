//! HttpBackend: [`ChatBackend`] implementation over the backend's JSON API.
//!
//! Besides the chat, history, and reset calls the conversation store needs,
//! it exposes the secondary endpoints used by the CLI: PDF processing and
//! indexing, stats, and training.

pub mod streaming;

use std::path::Path;
use std::time::Duration;

use pratai_core::attachment::{Attachment, PDF_MIME};
use pratai_core::backend::client::{ChatBackend, RecordStream};
use pratai_types::backend::{
    ChatReply, ChatRequest, PdfContent, ResetReceipt, UploadReceipt,
};
use pratai_types::chat::{SessionId, Turn};
use pratai_types::config::ClientConfig;
use pratai_types::error::{ClientError, UploadError};
use serde::de::DeserializeOwned;

use crate::filesystem::load_attachment;
use streaming::create_record_stream;

/// Chat backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    stream_path: String,
}

impl HttpBackend {
    /// Default path of the event-stream endpoint.
    pub const DEFAULT_STREAM_PATH: &'static str = "/chat/stream";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            stream_path: Self::DEFAULT_STREAM_PATH.to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(
            Self::new(&config.api_base_url, Duration::from_secs(config.request_timeout_secs))?
                .with_stream_path(&config.stream_path),
        )
    }

    /// Use a different event-stream endpoint (e.g. `/stream`).
    pub fn with_stream_path(mut self, path: &str) -> Self {
        self.stream_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a PDF and return its extracted text.
    pub async fn process_pdf(&self, attachment: Attachment) -> Result<PdfContent, ClientError> {
        self.post_pdf("/process-pdf", attachment).await
    }

    /// Upload a PDF for server-side indexing.
    pub async fn upload_pdf(&self, attachment: Attachment) -> Result<UploadReceipt, ClientError> {
        self.post_pdf("/upload-pdf", attachment).await
    }

    /// Validate a local file, then extract its text. Nothing is sent when
    /// validation fails.
    pub async fn process_pdf_file(&self, path: &Path) -> Result<PdfContent, UploadError> {
        let attachment = load_attachment(path).await?;
        Ok(self.process_pdf(attachment).await?)
    }

    /// Validate a local file, then index it. Nothing is sent when validation
    /// fails.
    pub async fn upload_pdf_file(&self, path: &Path) -> Result<UploadReceipt, UploadError> {
        let attachment = load_attachment(path).await?;
        Ok(self.upload_pdf(attachment).await?)
    }

    /// Backend statistics, passed through as-is.
    pub async fn stats(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(self.url("/stats"))
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(ensure_success(response).await?).await
    }

    /// Trigger model training, passing the backend's answer through as-is.
    pub async fn train(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .post(self.url("/train"))
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(ensure_success(response).await?).await
    }

    async fn post_pdf<T: DeserializeOwned>(
        &self,
        path: &str,
        attachment: Attachment,
    ) -> Result<T, ClientError> {
        let (file_name, bytes) = attachment.into_parts();
        tracing::debug!(file = %file_name, size = bytes.len(), path, "Uploading PDF");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(PDF_MIME)
            .map_err(|e| ClientError::Transport(format!("invalid multipart part: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(ensure_success(response).await?).await
    }
}

impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(ensure_success(response).await?).await
    }

    fn stream_chat(&self, request: ChatRequest) -> RecordStream {
        create_record_stream(&self.client, &self.url(&self.stream_path), request)
    }

    async fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> Result<Vec<Turn>, ClientError> {
        let response = self
            .client
            .get(self.url("/history"))
            .query(&[("session_id", session_id.as_str())])
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(transport_error)?;
        decode_json(ensure_success(response).await?).await
    }

    async fn reset_history(&self, session_id: &SessionId) -> Result<ResetReceipt, ClientError> {
        let response = self
            .client
            .delete(self.url("/reset"))
            .query(&[("session_id", session_id.as_str())])
            .send()
            .await
            .map_err(transport_error)?;
        let body = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(transport_error)?;
        if body.trim().is_empty() {
            return Ok(ResetReceipt::default());
        }
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("failed to parse reset response: {e}")))
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> ClientError {
    ClientError::Transport(format!("HTTP request failed: {e}"))
}

/// Map a non-2xx response to [`ClientError::Status`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "Backend error response");
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Decode(format!("failed to parse response: {e}")))
}
