//! Session, turn, and UI snapshot types for the Prat.AI client.
//!
//! These types model one user's conversation with the backend: the durable
//! session identifier, completed turns, and the cached rendering state
//! restored on startup.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// Length of the random suffix in a generated session id.
const SESSION_SUFFIX_LEN: usize = 9;

/// Durable identifier scoping a conversation across restarts.
///
/// Generated once as `session_<unix-millis>_<suffix>` and cached in the
/// client's key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        let suffix = &random[..SESSION_SUFFIX_LEN];
        Self(format!("session_{millis}_{suffix}"))
    }

    /// Wrap an existing id. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Out-of-band classification the backend attaches to a reply.
///
/// Never part of the visible text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
}

impl ReplyMetadata {
    /// Fill unset fields from `other`, keeping values already present.
    pub fn merge(&mut self, other: ReplyMetadata) {
        if self.intent.is_none() {
            self.intent = other.intent;
        }
        if self.confidence.is_none() {
            self.confidence = other.confidence;
        }
        if self.sentiment.is_none() {
            self.sentiment = other.sentiment;
        }
        if self.response_type.is_none() {
            self.response_type = other.response_type;
        }
    }
}

/// One completed user/bot exchange.
///
/// Deserializes directly from the backend's `/history` records; the record
/// `id` column is ignored. Never mutated once appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user_message: String,
    /// Raw, unformatted reply text.
    pub bot_response: String,
    /// ISO-8601 completion time.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(flatten)]
    pub metadata: ReplyMetadata,
}

impl Turn {
    /// Build a turn completed now.
    pub fn completed(
        user_message: impl Into<String>,
        bot_response: impl Into<String>,
        conversation_id: Option<String>,
        metadata: ReplyMetadata,
    ) -> Self {
        Self {
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            conversation_id,
            metadata,
        }
    }
}

/// Minimal rendering state persisted between runs.
///
/// A cache only: safe to discard, never authoritative over the history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSnapshot {
    pub show_result: bool,
    pub recent_prompt: String,
    /// Formatted HTML of the displayed reply.
    pub result_data: String,
}
