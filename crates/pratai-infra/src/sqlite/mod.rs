//! SQLite persistence for durable client state.

pub mod kv;
pub mod pool;
