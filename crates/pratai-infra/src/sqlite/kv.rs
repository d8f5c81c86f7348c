//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `pratai-core`. Values are stored as JSON text
//! and deserialized on read.

use chrono::{SecondsFormat, Utc};
use pratai_core::storage::kv_store::KvStore;
use pratai_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => RepositoryError::Connection,
        other => RepositoryError::Query(other.to_string()),
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM client_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let value_str: String = row.try_get("value").map_err(query_error)?;
                let value = serde_json::from_str(&value_str)
                    .map_err(|e| RepositoryError::Query(format!("invalid JSON value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let value_str = serde_json::to_string(value)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize value: {e}")))?;

        sqlx::query(
            r#"INSERT INTO client_kv (key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM client_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pratai_core::session::{self, SESSION_ID_KEY};
    use pratai_types::chat::UiSnapshot;
    use serde_json::json;

    async fn test_store() -> SqliteKvStore {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        std::mem::forget(dir);
        SqliteKvStore::new(DatabasePool::new(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = test_store().await;
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = test_store().await;
        store.set("k", &json!({"a": [1, 2]})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": [1, 2]})));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = test_store().await;
        store.set("k", &json!("one")).await.unwrap();
        store.set("k", &json!("two")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!("two")));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = test_store().await;
        store.set("k", &json!(true)).await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_session_id_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("kv.db").display());

        let first = {
            let store = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
            session::restore_session_id(&store).await
        };
        let store = SqliteKvStore::new(DatabasePool::new(&url).await.unwrap());
        let second = session::restore_session_id(&store).await;

        assert_eq!(first, second);
        assert_eq!(
            store.get(SESSION_ID_KEY).await.unwrap(),
            Some(json!(first.as_str()))
        );
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_through_sqlite() {
        let store = test_store().await;
        let snapshot = UiSnapshot {
            show_result: true,
            recent_prompt: "Hello".to_string(),
            result_data: "<p><b>Hi</b></p>".to_string(),
        };
        session::save_snapshot(&store, &snapshot).await;
        assert_eq!(session::load_snapshot(&store).await, Some(snapshot));
    }
}
