//! Shared domain types for the Prat.AI client.
//!
//! This crate contains the types used across the client workspace:
//! sessions, turns, UI snapshots, backend wire shapes, stream records,
//! configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod backend;
pub mod chat;
pub mod config;
pub mod delivery;
pub mod error;
