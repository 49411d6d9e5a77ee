//! Storage capability behind the tool surface.
//!
//! [`MemoryBackend`] is the seam the tools talk to: add / get-all / search / delete-all,
//! every call scoped to one [`UserId`]. Results come back as mem0-shaped JSON
//! (`{"results": [{"memory": ...}, ...]}`) which the tool layer flattens.
//!
//! [`engine::SqliteMemoryEngine`] is the shipped implementation: SQLite +
//! sqlite-vec cosine ranking over embeddings from an [`crate::embedding::EmbeddingProvider`].

pub mod engine;
pub mod forget;
pub mod search;
pub mod store;
pub mod types;

pub use engine::SqliteMemoryEngine;

use crate::identity::UserId;

/// Failures raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    LockPoisoned,
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A long-term memory store partitioned by user.
///
/// Methods are synchronous; async callers go through `tokio::task::spawn_blocking`.
/// Implementations must never return or touch records outside `user_id`.
pub trait MemoryBackend: Send + Sync {
    /// Store `content` for `user_id`.
    fn add(&self, content: &str, user_id: &UserId) -> Result<serde_json::Value, StoreError>;

    /// Every memory owned by `user_id`.
    fn get_all(&self, user_id: &UserId) -> Result<serde_json::Value, StoreError>;

    /// Up to `limit` memories of `user_id`, most relevant first.
    fn search(
        &self,
        query: &str,
        user_id: &UserId,
        limit: usize,
    ) -> Result<serde_json::Value, StoreError>;

    /// Remove every memory owned by `user_id`.
    fn delete_all(&self, user_id: &UserId) -> Result<serde_json::Value, StoreError>;

    /// Release resources at shutdown.
    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Encode an f32 vector as the little-endian blob sqlite-vec expects.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}
