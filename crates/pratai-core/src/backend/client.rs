//! ChatBackend trait definition.
//!
//! This is the abstraction the delivery pipeline and conversation store talk
//! to. Uses RPITIT for request/response calls, and `Pin<Box<dyn Stream>>` for
//! `stream_chat` so the stream can be held across awaits without naming the
//! concrete type.

use std::pin::Pin;

use futures_util::Stream;

use pratai_types::backend::{ChatReply, ChatRequest, ResetReceipt, StreamRecord};
use pratai_types::chat::{SessionId, Turn};
use pratai_types::error::ClientError;

/// Boxed stream of decoded event-stream records.
pub type RecordStream = Pin<Box<dyn Stream<Item = Result<StreamRecord, ClientError>> + Send + 'static>>;

/// Trait for the remote chat service.
///
/// Implementations live in pratai-infra (e.g., `HttpBackend`).
pub trait ChatBackend: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Send a prompt and receive the full reply.
    fn send_chat(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatReply, ClientError>> + Send;

    /// Send a prompt and receive the reply as a stream of records.
    ///
    /// The stream yields records in arrival order and ends after a
    /// `Complete` or `Error` record, or with an `Err` item on a transport
    /// failure. A stream that ends without a terminal record was cut short.
    fn stream_chat(&self, request: ChatRequest) -> RecordStream;

    /// Fetch up to `limit` turns recorded for a session, oldest first.
    fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, ClientError>> + Send;

    /// Delete the server-side history of a session.
    fn reset_history(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<ResetReceipt, ClientError>> + Send;
}
