//! Infrastructure layer for the Prat.AI client.
//!
//! Contains implementations of the ports defined in `pratai-core`: the
//! reqwest-based chat backend with its event-stream decoder, the SQLite
//! key-value store, and the configuration and data-directory helpers.

pub mod config;
pub mod filesystem;
pub mod http;
pub mod sqlite;
