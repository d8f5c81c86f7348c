use thiserror::Error;

/// Errors from talking to the chat backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("stream ended before a complete record")]
    StreamEnded,

    #[error("backend error: {0}")]
    Backend(String),
}

impl ClientError {
    /// Whether a failed streaming attempt should be retried single-shot.
    ///
    /// Explicit backend-reported errors are surfaced as-is.
    pub fn is_fallback_trigger(&self) -> bool {
        !matches!(self, ClientError::Backend(_))
    }
}

/// Errors returned when a prompt is not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a valid message.")]
    EmptyPrompt,

    #[error("a reply is already in progress")]
    Busy,
}

/// Errors from local attachment validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error("Please select a valid PDF file (got '{mime}')")]
    NotPdf { mime: String },

    #[error("File too large ({size} bytes). Maximum size is 10MB.")]
    TooLarge { size: u64, max: u64 },

    #[error("could not read attachment: {0}")]
    Read(String),
}

/// Errors from sending a local document to the backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors from durable store operations (used by trait definitions in pratai-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}
