//! Conversation logic and port trait definitions for the Prat.AI client.
//!
//! This crate defines the "ports" (backend and key-value store traits) that
//! the infrastructure layer implements, plus the response-delivery pipeline
//! built on them. It depends only on `pratai-types` -- never on
//! `pratai-infra` or any HTTP/database crate.

pub mod attachment;
pub mod backend;
pub mod delivery;
pub mod format;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
