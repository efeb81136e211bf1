use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub created_at: String,
}

/// SQLite store for users and their chat records.
#[derive(Clone)]
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    pub async fn new(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| ApiError::internal(format!("failed to open chat db: {}", e)))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_user
             ON chat_messages(user_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<i64, ApiError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::BadRequest("username already taken".to_string())
            }
            _ => ApiError::internal(e),
        })?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, ApiError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            username: row.get("username"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }

    pub async fn add_record(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
    ) -> Result<i64, ApiError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chat_messages (user_id, message, response, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(result.last_insert_rowid())
    }

    /// The caller's records, newest first.
    pub async fn history_for_user(&self, user_id: i64) -> Result<Vec<ChatRecord>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, user_id, message, response, created_at
             FROM chat_messages
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(rows
            .into_iter()
            .map(|row| ChatRecord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                message: row.get("message"),
                response: row.get("response"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Deletes chat records created before `cutoff`. Timestamps are stored
    /// as RFC3339 UTC strings, which order lexicographically.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE created_at < ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    async fn test_store() -> (ChatStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("test.db")).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let (store, _dir) = test_store().await;

        let id = store
            .create_user("alice", Some("alice@example.com"), "hash")
            .await
            .unwrap();

        let user = store.find_user("alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.password_hash, "hash");

        assert!(store.find_user("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (store, _dir) = test_store().await;

        store.create_user("alice", None, "hash").await.unwrap();
        let result = store.create_user("alice", None, "other").await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn history_is_per_user_and_newest_first() {
        let (store, _dir) = test_store().await;
        let alice = store.create_user("alice", None, "hash").await.unwrap();
        let bob = store.create_user("bob", None, "hash").await.unwrap();

        store.add_record(alice, "q1", "a1").await.unwrap();
        store.add_record(alice, "q2", "a2").await.unwrap();
        store.add_record(bob, "other", "answer").await.unwrap();

        let history = store.history_for_user(alice).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "q2");
        assert_eq!(history[1].message, "q1");
        assert!(history.iter().all(|r| r.user_id == alice));
    }

    #[tokio::test]
    async fn cleanup_deletes_only_old_records() {
        let (store, _dir) = test_store().await;
        let alice = store.create_user("alice", None, "hash").await.unwrap();

        let old = (Utc::now() - Duration::days(40)).to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_messages (user_id, message, response, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(alice)
        .bind("old question")
        .bind("old answer")
        .bind(&old)
        .execute(&store.pool)
        .await
        .unwrap();
        store.add_record(alice, "fresh question", "fresh answer").await.unwrap();

        let cutoff = Utc::now() - Duration::days(30);
        let deleted = store.delete_older_than(cutoff).await.unwrap();

        assert_eq!(deleted, 1);
        let remaining = store.history_for_user(alice).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "fresh question");
    }
}
