//! Event-stream record decoder and async stream adapter.
//!
//! The stream endpoint answers with `text/event-stream` lines of the form
//! `data: {json}`. Bytes arrive in arbitrary chunks, so the decoder buffers
//! raw bytes and only decodes complete lines. A newline byte never occurs
//! inside a multi-byte UTF-8 sequence, which makes a split character safe to
//! hold until the rest of its line arrives.

use futures_util::StreamExt;
use pratai_core::backend::client::RecordStream;
use pratai_types::backend::{ChatRequest, StreamRecord};
use pratai_types::error::ClientError;

use super::{ensure_success, transport_error};

/// Incremental decoder from raw bytes to [`StreamRecord`]s.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    buffer: Vec<u8>,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the records completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamRecord> {
        self.buffer.extend_from_slice(bytes);
        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(record) = parse_line(&line[..pos]) {
                records.push(record);
            }
        }
        records
    }

    /// Decode whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<StreamRecord> {
        let line = std::mem::take(&mut self.buffer);
        if line.is_empty() {
            return None;
        }
        parse_line(&line)
    }
}

/// Decode one line. Anything but a readable `data:` payload yields `None`.
fn parse_line(line: &[u8]) -> Option<StreamRecord> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping stream line with invalid UTF-8");
            return None;
        }
    };

    let payload = text.strip_prefix("data:")?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);
    if payload.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamRecord>(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, payload = %payload, "Skipping unreadable stream record");
            None
        }
    }
}

/// Open the stream endpoint and yield decoded records.
///
/// The stream ends right after the first terminal record, dropping the
/// response body. A non-2xx status or a body read error is yielded as the
/// final `Err` item.
pub fn create_record_stream(
    client: &reqwest::Client,
    url: &str,
    body: ChatRequest,
) -> RecordStream {
    let client = client.clone();
    let url = url.to_string();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let mut byte_stream = response.bytes_stream();
        let mut decoder = RecordDecoder::new();
        let mut terminated = false;

        'read: while let Some(chunk_result) = byte_stream.next().await {
            let chunk = chunk_result
                .map_err(|e| ClientError::Transport(format!("response body read: {e}")))?;
            for record in decoder.push(&chunk) {
                terminated = record.is_terminal();
                yield record;
                if terminated {
                    break 'read;
                }
            }
        }

        if !terminated {
            if let Some(record) = decoder.finish() {
                yield record;
            }
        }
    })
}
