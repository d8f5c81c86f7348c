//! Wire shapes for the Prat.AI backend endpoints.
//!
//! Request/response bodies for `/chat`, the event-stream records produced by
//! `/chat/stream`, and the PDF and reset receipts.

use serde::{Deserialize, Serialize};

use crate::chat::{ReplyMetadata, SessionId};

/// Body for `/chat` and `/chat/stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Extracted text of an attached document, or empty.
    #[serde(default)]
    pub pdf_content: String,
    pub session_id: SessionId,
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            message: message.into(),
            pdf_content: String::new(),
            session_id,
            conversation_id: None,
        }
    }

    pub fn with_pdf_content(mut self, pdf_content: Option<&str>) -> Self {
        self.pdf_content = pdf_content.unwrap_or_default().to_string();
        self
    }
}

/// Single-shot reply from `/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(flatten)]
    pub metadata: ReplyMetadata,
}

/// One `data: ` record from the chat event stream.
///
/// Decoded by its `type` tag. Records with an unknown tag fail to decode and
/// are skipped by the stream reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamRecord {
    /// Partial reply text.
    Chunk {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_type: Option<String>,
    },

    /// Out-of-band information; never appended to the visible text.
    Metadata(ReplyMetadata),

    /// Final text. Terminates the exchange.
    Complete {
        #[serde(default)]
        full_response: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
    },

    /// Backend-reported failure. Aborts the exchange.
    Error {
        #[serde(default)]
        content: String,
    },
}

impl StreamRecord {
    /// Whether no further records are expected after this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamRecord::Complete { .. } | StreamRecord::Error { .. })
    }
}

/// Response of `/process-pdf`: the document's extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Response of `/upload-pdf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
}

/// Response of `/reset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetReceipt {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
