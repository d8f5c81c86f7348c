//! Client-side paced reveal of a single-shot reply.

use std::time::Duration;

use pratai_types::backend::ChatRequest;
use pratai_types::delivery::{DeliveryMode, RevealUnit};
use pratai_types::error::ClientError;

use super::Delivered;
use crate::backend::client::ChatBackend;

pub(crate) async fn deliver<B: ChatBackend>(
    backend: &B,
    request: &ChatRequest,
    unit: RevealUnit,
    delay: Duration,
    on_progress: &mut impl FnMut(&str),
) -> Result<Delivered, ClientError> {
    let reply = backend.send_chat(request).await?;
    reveal(&reply.response, unit, delay, on_progress).await;
    Ok(Delivered {
        text: reply.response,
        conversation_id: reply.conversation_id,
        metadata: reply.metadata,
        mode_used: DeliveryMode::Simulated,
        fell_back: false,
    })
}

/// Report growing prefixes of `text`, pausing `delay` between them.
pub async fn reveal(
    text: &str,
    unit: RevealUnit,
    delay: Duration,
    on_progress: &mut impl FnMut(&str),
) {
    for (i, end) in reveal_points(text, unit).into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        on_progress(&text[..end]);
    }
}

/// Byte offsets at which each revealed prefix ends.
///
/// Offsets always fall on char boundaries. A word increment carries its
/// trailing whitespace.
pub fn reveal_points(text: &str, unit: RevealUnit) -> Vec<usize> {
    match unit {
        RevealUnit::Char => text
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect(),
        RevealUnit::Word => {
            let mut points = Vec::new();
            let mut end = 0;
            for piece in text.split_inclusive(char::is_whitespace) {
                end += piece.len();
                let is_blank = piece.trim().is_empty();
                match points.last_mut() {
                    Some(last) if is_blank => *last = end,
                    _ => points.push(end),
                }
            }
            points
        }
    }
}
