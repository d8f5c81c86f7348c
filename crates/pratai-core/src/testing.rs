//! In-memory test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use pratai_types::backend::{ChatReply, ChatRequest, ResetReceipt, StreamRecord};
use pratai_types::chat::{ReplyMetadata, SessionId, Turn};
use pratai_types::error::{ClientError, RepositoryError};
use serde_json::Value;

use crate::backend::client::{ChatBackend, RecordStream};
use crate::storage::kv_store::KvStore;

/// Key-value store backed by a `HashMap`, optionally failing every call.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Value>>,
    fail: bool,
}

impl MemoryKvStore {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.fail {
            Err(RepositoryError::Query("disk on fire".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryKvStore {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, RepositoryError>> + Send {
        let result = self.check().map(|_| self.value(key));
        async move { result }
    }

    fn set(
        &self,
        key: &str,
        value: &Value,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.check().map(|_| self.insert(key, value.clone()));
        async move { result }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.check().map(|_| {
            self.entries.lock().unwrap().remove(key);
        });
        async move { result }
    }
}

/// Scripted backend. Every call returns the configured outcome and is counted.
pub struct MockBackend {
    pub reply: Result<ChatReply, ClientError>,
    pub records: Vec<Result<StreamRecord, ClientError>>,
    pub history: Result<Vec<Turn>, ClientError>,
    pub reset: Result<ResetReceipt, ClientError>,
    pub chat_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    /// Single-shot replies with `text`; streaming yields nothing and ends.
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(ChatReply {
                response: text.to_string(),
                conversation_id: None,
                metadata: ReplyMetadata::default(),
            }),
            records: Vec::new(),
            history: Ok(Vec::new()),
            reset: Ok(ResetReceipt::default()),
            chat_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self::replying("")
            .with_reply(Err(ClientError::Transport("connection refused".to_string())))
            .with_records(vec![Err(ClientError::Transport(
                "connection refused".to_string(),
            ))])
            .with_history(Err(ClientError::Transport("connection refused".to_string())))
            .with_reset(Err(ClientError::Transport("connection refused".to_string())))
    }

    pub fn with_reply(mut self, reply: Result<ChatReply, ClientError>) -> Self {
        self.reply = reply;
        self
    }

    pub fn with_records(mut self, records: Vec<Result<StreamRecord, ClientError>>) -> Self {
        self.records = records;
        self
    }

    pub fn with_history(mut self, history: Result<Vec<Turn>, ClientError>) -> Self {
        self.history = history;
        self
    }

    pub fn with_reset(mut self, reset: Result<ResetReceipt, ClientError>) -> Self {
        self.reset = reset;
        self
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }
}

pub fn chunk(content: &str) -> Result<StreamRecord, ClientError> {
    Ok(StreamRecord::Chunk {
        content: content.to_string(),
        response_type: None,
    })
}

pub fn complete(full_response: &str) -> Result<StreamRecord, ClientError> {
    Ok(StreamRecord::Complete {
        full_response: full_response.to_string(),
        response_type: None,
        conversation_id: None,
    })
}

impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn send_chat(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, ClientError>> + Send {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.reply.clone();
        async move { reply }
    }

    fn stream_chat(&self, request: ChatRequest) -> RecordStream {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let records = self.records.clone();
        Box::pin(async_stream::stream! {
            for record in records {
                yield record;
            }
        })
    }

    fn fetch_history(
        &self,
        _session_id: &SessionId,
        _limit: u32,
    ) -> impl Future<Output = Result<Vec<Turn>, ClientError>> + Send {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let history = self.history.clone();
        async move { history }
    }

    fn reset_history(
        &self,
        _session_id: &SessionId,
    ) -> impl Future<Output = Result<ResetReceipt, ClientError>> + Send {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        let reset = self.reset.clone();
        async move { reset }
    }
}
