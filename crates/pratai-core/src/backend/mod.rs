//! Chat backend abstractions.
//!
//! - `ChatBackend`: RPITIT trait for the remote Prat.AI service

pub mod client;
