//! Client configuration types for Prat.AI.
//!
//! `ClientConfig` represents the `config.toml` in the client data directory.
//! Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::delivery::{DeliveryMode, RevealUnit};

/// Top-level configuration for the Prat.AI client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are appended to.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Preferred delivery strategy.
    #[serde(default)]
    pub delivery_mode: DeliveryMode,

    /// Path of the event-stream endpoint (`/chat/stream` or `/stream`).
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// Number of turns requested from `/history`.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Whole-request timeout for backend calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Granularity of the simulated reveal.
    #[serde(default)]
    pub reveal_unit: RevealUnit,

    /// Pause between simulated increments.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_stream_path() -> String {
    "/chat/stream".to_string()
}

fn default_history_limit() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_reveal_delay_ms() -> u64 {
    20
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            delivery_mode: DeliveryMode::default(),
            stream_path: default_stream_path(),
            history_limit: default_history_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            reveal_unit: RevealUnit::default(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}
