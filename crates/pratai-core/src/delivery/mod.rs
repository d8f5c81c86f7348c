//! Reply delivery strategies.
//!
//! A [`DeliveryStrategy`] turns a [`ChatRequest`] into the bot's reply,
//! reporting the accumulated text through a progress callback as it becomes
//! available. The three [`DeliveryMode`]s share this one contract, so the
//! conversation store never needs to know which transport ran.
//!
//! Streaming falls back to a single-shot request once when the stream cannot
//! be established or read. An explicit `error` record from the backend is
//! surfaced as-is.

pub mod simulated;
pub mod streaming;

use std::time::Duration;

use pratai_types::backend::ChatRequest;
use pratai_types::chat::ReplyMetadata;
use pratai_types::config::ClientConfig;
use pratai_types::delivery::{DeliveryMode, RevealUnit};
use pratai_types::error::ClientError;
use tracing::{debug, warn};

use crate::backend::client::ChatBackend;

/// Final result of a delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    /// Raw, unformatted reply text.
    pub text: String,
    pub conversation_id: Option<String>,
    pub metadata: ReplyMetadata,
    /// Strategy that actually produced `text`.
    pub mode_used: DeliveryMode,
    /// Whether streaming failed and single-shot took over.
    pub fell_back: bool,
}

/// Delivery configuration: which mode to use and how to pace simulated
/// reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStrategy {
    pub mode: DeliveryMode,
    pub reveal_unit: RevealUnit,
    pub reveal_delay: Duration,
}

impl DeliveryStrategy {
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            mode,
            reveal_unit: RevealUnit::default(),
            reveal_delay: Duration::from_millis(20),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            mode: config.delivery_mode,
            reveal_unit: config.reveal_unit,
            reveal_delay: Duration::from_millis(config.reveal_delay_ms),
        }
    }

    pub fn with_reveal(mut self, unit: RevealUnit, delay: Duration) -> Self {
        self.reveal_unit = unit;
        self.reveal_delay = delay;
        self
    }

    /// Obtain the reply for `request`.
    ///
    /// `on_progress` receives the accumulated reply text, strictly growing
    /// within one transport. After a streaming fallback the single-shot reply
    /// restarts the reveal with the whole text.
    pub async fn deliver<B, F>(
        &self,
        backend: &B,
        request: ChatRequest,
        mut on_progress: F,
    ) -> Result<Delivered, ClientError>
    where
        B: ChatBackend,
        F: FnMut(&str),
    {
        debug!(
            backend = backend.name(),
            mode = %self.mode,
            session_id = %request.session_id,
            "Delivering reply"
        );

        match self.mode {
            DeliveryMode::SingleShot => single_shot(backend, &request, &mut on_progress).await,
            DeliveryMode::Simulated => {
                simulated::deliver(
                    backend,
                    &request,
                    self.reveal_unit,
                    self.reveal_delay,
                    &mut on_progress,
                )
                .await
            }
            DeliveryMode::Streaming => {
                let stream = backend.stream_chat(request.clone());
                match streaming::consume(stream, &mut on_progress).await {
                    Ok(delivered) => Ok(delivered),
                    Err(e) if e.is_fallback_trigger() => {
                        warn!(
                            backend = backend.name(),
                            error = %e,
                            "Streaming failed, falling back to single-shot"
                        );
                        let mut delivered =
                            single_shot(backend, &request, &mut on_progress).await?;
                        delivered.fell_back = true;
                        Ok(delivered)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

impl Default for DeliveryStrategy {
    fn default() -> Self {
        Self::new(DeliveryMode::default())
    }
}

/// One request, one response, reported as a single increment.
async fn single_shot<B: ChatBackend>(
    backend: &B,
    request: &ChatRequest,
    on_progress: &mut impl FnMut(&str),
) -> Result<Delivered, ClientError> {
    let reply = backend.send_chat(request).await?;
    if !reply.response.is_empty() {
        on_progress(&reply.response);
    }
    Ok(Delivered {
        text: reply.response,
        conversation_id: reply.conversation_id,
        metadata: reply.metadata,
        mode_used: DeliveryMode::SingleShot,
        fell_back: false,
    })
}
