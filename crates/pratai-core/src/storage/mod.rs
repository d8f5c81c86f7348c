//! Durable client-side storage abstractions.
//!
//! The conversation store caches the session identifier and the last UI
//! snapshot here so both survive restarts.

pub mod kv_store;
