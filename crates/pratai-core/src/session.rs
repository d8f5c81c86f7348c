//! Durable session identity and UI snapshot persistence.
//!
//! Both live in the client's [`KvStore`]. Storage failures are logged and
//! never fatal: a missing or unreadable id is replaced by a fresh one, and a
//! missing or malformed snapshot just means no cached rendering.

use pratai_types::chat::{SessionId, UiSnapshot};
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::kv_store::KvStore;

/// Storage key of the session identifier.
pub const SESSION_ID_KEY: &str = "prat_ai_session_id";

/// Storage key of the last UI snapshot.
pub const UI_SNAPSHOT_KEY: &str = "prat_ai_ui_snapshot";

/// Restore the stored session id, creating and storing one if absent.
pub async fn restore_session_id<K: KvStore>(kv: &K) -> SessionId {
    match kv.get(SESSION_ID_KEY).await {
        Ok(Some(Value::String(raw))) => {
            if let Some(id) = SessionId::parse(&raw) {
                debug!(session_id = %id, "Restored session id");
                return id;
            }
            warn!("Stored session id is blank, generating a new one");
        }
        Ok(Some(other)) => {
            warn!(value = %other, "Stored session id is not a string, generating a new one");
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "Failed to read session id, generating a new one");
        }
    }
    rotate_session_id(kv).await
}

/// Generate a fresh session id and store it.
pub async fn rotate_session_id<K: KvStore>(kv: &K) -> SessionId {
    let id = SessionId::generate();
    if let Err(e) = kv.set(SESSION_ID_KEY, &Value::String(id.to_string())).await {
        warn!(session_id = %id, error = %e, "Failed to persist session id");
    }
    debug!(session_id = %id, "Created session id");
    id
}

/// Load the cached UI snapshot, if any.
pub async fn load_snapshot<K: KvStore>(kv: &K) -> Option<UiSnapshot> {
    let value = match kv.get(UI_SNAPSHOT_KEY).await {
        Ok(value) => value?,
        Err(e) => {
            warn!(error = %e, "Failed to read UI snapshot");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "Discarding malformed UI snapshot");
            None
        }
    }
}

/// Store the UI snapshot, replacing any previous one.
pub async fn save_snapshot<K: KvStore>(kv: &K, snapshot: &UiSnapshot) {
    let value = match serde_json::to_value(snapshot) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to serialize UI snapshot");
            return;
        }
    };
    if let Err(e) = kv.set(UI_SNAPSHOT_KEY, &value).await {
        warn!(error = %e, "Failed to persist UI snapshot");
    }
}

/// Remove the cached UI snapshot.
pub async fn clear_snapshot<K: KvStore>(kv: &K) {
    if let Err(e) = kv.delete(UI_SNAPSHOT_KEY).await {
        warn!(error = %e, "Failed to clear UI snapshot");
    }
}
