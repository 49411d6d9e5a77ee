//! SQLite-backed [`MemoryBackend`].

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use super::{forget, search, store, MemoryBackend, StoreError};
use crate::db;
use crate::embedding::EmbeddingProvider;
use crate::identity::UserId;

/// Memory store over a single SQLite connection and an embedding provider.
///
/// The connection sits behind a mutex; concurrent tool calls serialize on it.
pub struct SqliteMemoryEngine {
    conn: Mutex<Connection>,
    embedding: Arc<dyn EmbeddingProvider>,
    dedup_threshold: f64,
}

impl SqliteMemoryEngine {
    /// Wrap an initialized connection. Records the embedding model on first use and warns
    /// when the database was written with a different one.
    pub fn new(
        conn: Connection,
        embedding: Arc<dyn EmbeddingProvider>,
        dedup_threshold: f64,
    ) -> Result<Self> {
        match db::schema::get_embedding_model(&conn)? {
            Some(stored) if stored != embedding.model_name() => {
                tracing::warn!(
                    stored = %stored,
                    configured = %embedding.model_name(),
                    "embedding model changed — similarity against existing memories will fail \
                     or be meaningless until they are re-saved"
                );
            }
            Some(_) => {}
            None => db::schema::set_embedding_model(&conn, embedding.model_name())?,
        }

        Ok(Self {
            conn: Mutex::new(conn),
            embedding,
            dedup_threshold,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        self.embedding
            .embed(text)
            .map_err(|e| StoreError::Embedding(format!("{e:#}")))
    }
}

impl MemoryBackend for SqliteMemoryEngine {
    fn add(&self, content: &str, user_id: &UserId) -> Result<serde_json::Value, StoreError> {
        let embedding = self.embed(content)?;
        let mut conn = self.lock()?;
        let result = store::add_memory(&mut conn, user_id, content, &embedding, self.dedup_threshold)?;
        tracing::debug!(id = %result.id, event = ?result.event, user_id = %user_id, "memory written");
        Ok(json!({ "results": [result] }))
    }

    fn get_all(&self, user_id: &UserId) -> Result<serde_json::Value, StoreError> {
        let conn = self.lock()?;
        let items = search::list_memories(&conn, user_id)?;
        Ok(json!({ "results": items }))
    }

    fn search(
        &self,
        query: &str,
        user_id: &UserId,
        limit: usize,
    ) -> Result<serde_json::Value, StoreError> {
        let embedding = self.embed(query)?;
        let conn = self.lock()?;
        let items = search::search_memories(&conn, user_id, &embedding, limit)?;
        Ok(json!({ "results": items }))
    }

    fn delete_all(&self, user_id: &UserId) -> Result<serde_json::Value, StoreError> {
        let mut conn = self.lock()?;
        let deleted = forget::delete_user_memories(&mut conn, user_id)?;
        Ok(json!({ "message": "Memories deleted successfully!", "deleted": deleted }))
    }

    fn close(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        db::checkpoint(&conn)?;
        tracing::info!("memory store closed");
        Ok(())
    }
}
