//! Delivery strategy selectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a reply is obtained from the backend and revealed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// One request, one response, delivered as a single increment.
    SingleShot,
    /// Incremental records over a chunked event stream.
    Streaming,
    /// Single-shot request revealed in paced increments.
    Simulated,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::SingleShot => write!(f, "single_shot"),
            DeliveryMode::Streaming => write!(f, "streaming"),
            DeliveryMode::Simulated => write!(f, "simulated"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "single_shot" | "single" => Ok(DeliveryMode::SingleShot),
            "streaming" | "stream" => Ok(DeliveryMode::Streaming),
            "simulated" => Ok(DeliveryMode::Simulated),
            other => Err(format!("invalid delivery mode: '{other}'")),
        }
    }
}

impl Default for DeliveryMode {
    fn default() -> Self {
        DeliveryMode::Streaming
    }
}

/// Granularity of the simulated reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealUnit {
    Char,
    Word,
}

impl fmt::Display for RevealUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealUnit::Char => write!(f, "char"),
            RevealUnit::Word => write!(f, "word"),
        }
    }
}

impl FromStr for RevealUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "char" => Ok(RevealUnit::Char),
            "word" => Ok(RevealUnit::Word),
            other => Err(format!("invalid reveal unit: '{other}'")),
        }
    }
}

impl Default for RevealUnit {
    fn default() -> Self {
        RevealUnit::Char
    }
}
