//! Consumption of a decoded record stream.

use futures_util::StreamExt;
use pratai_types::backend::StreamRecord;
use pratai_types::chat::ReplyMetadata;
use pratai_types::delivery::DeliveryMode;
use pratai_types::error::ClientError;
use tracing::trace;

use super::Delivered;
use crate::backend::client::RecordStream;

/// Drive `stream` to its terminal record.
///
/// Chunk text is accumulated and reported through `on_progress` each time it
/// grows. The stream is dropped as soon as a terminal record or an error is
/// seen. A stream that ends without `complete` yields
/// [`ClientError::StreamEnded`].
pub(crate) async fn consume(
    mut stream: RecordStream,
    on_progress: &mut impl FnMut(&str),
) -> Result<Delivered, ClientError> {
    let mut text = String::new();
    let mut metadata = ReplyMetadata::default();

    while let Some(record) = stream.next().await {
        match record? {
            StreamRecord::Chunk {
                content,
                response_type,
            } => {
                if metadata.response_type.is_none() {
                    metadata.response_type = response_type;
                }
                if content.is_empty() {
                    continue;
                }
                text.push_str(&content);
                trace!(len = text.len(), "chunk received");
                on_progress(&text);
            }
            StreamRecord::Metadata(update) => {
                let previous = std::mem::replace(&mut metadata, update);
                metadata.merge(previous);
            }
            StreamRecord::Complete {
                full_response,
                response_type,
                conversation_id,
            } => {
                if response_type.is_some() {
                    metadata.response_type = response_type;
                }
                let final_text = if full_response.is_empty() {
                    text
                } else {
                    if full_response.len() > text.len() && full_response.starts_with(&text) {
                        on_progress(&full_response);
                    }
                    full_response
                };
                return Ok(Delivered {
                    text: final_text,
                    conversation_id,
                    metadata,
                    mode_used: DeliveryMode::Streaming,
                    fell_back: false,
                });
            }
            StreamRecord::Error { content } => {
                let message = if content.is_empty() {
                    "the backend reported an error".to_string()
                } else {
                    content
                };
                return Err(ClientError::Backend(message));
            }
        }
    }

    Err(ClientError::StreamEnded)
}
