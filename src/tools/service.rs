//! Tool logic independent of the MCP wiring.
//!
//! Each operation resolves the caller's identity, makes exactly one backend call scoped
//! to it, and shapes the outcome into the string contract. Failures are typed
//! ([`ToolError`]) up to the very end and only then rendered as an `Error ...` string,
//! so a storage outage reaches the assistant in-band instead of as a protocol fault.

use std::sync::Arc;

use crate::identity::{self, RequestIdentityContext, ResolvedIdentity, UserId};
use crate::memory::{MemoryBackend, StoreError};

/// Characters of saved text echoed back in the save confirmation.
pub const PREVIEW_CHARS: usize = 100;

/// Default and maximum result counts for `search_memories`.
pub const DEFAULT_SEARCH_LIMIT: usize = 3;
pub const MAX_SEARCH_LIMIT: usize = 100;

pub const DELETION_NOT_CONFIRMED: &str =
    "Deletion not confirmed. Set confirm=true to delete all memories. This action cannot be undone.";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("unexpected storage response: {0}")]
    Shape(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The four memory operations over a shared backend.
#[derive(Clone)]
pub struct MemoryService {
    backend: Arc<dyn MemoryBackend>,
    default_user: UserId,
}

impl MemoryService {
    pub fn new(backend: Arc<dyn MemoryBackend>, default_user: UserId) -> Self {
        Self {
            backend,
            default_user,
        }
    }

    pub fn resolve(&self, explicit: Option<&str>, context: &RequestIdentityContext) -> ResolvedIdentity {
        let from_header = context.get();
        identity::resolve(
            explicit,
            from_header.as_ref().map(UserId::as_str),
            &self.default_user,
        )
    }

    /// Run a backend call off the async executor.
    async fn call<T, F>(&self, f: F) -> Result<T, ToolError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MemoryBackend) -> Result<T, StoreError> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        Ok(tokio::task::spawn_blocking(move || f(backend.as_ref())).await??)
    }

    pub async fn save(
        &self,
        text: String,
        explicit: Option<&str>,
        context: &RequestIdentityContext,
    ) -> String {
        let user = self.resolve(explicit, context).user_id;
        let preview = preview(&text);

        let uid = user.clone();
        match self.call(move |b| b.add(&text, &uid)).await {
            Ok(_) => {
                tracing::info!(user_id = %user, preview = %preview, "memory saved");
                format!("Successfully saved memory for user '{user}': {preview}")
            }
            Err(e) => {
                tracing::error!(user_id = %user, error = %e, "error saving memory");
                format!("Error saving memory: {e}")
            }
        }
    }

    pub async fn get_all(&self, explicit: Option<&str>, context: &RequestIdentityContext) -> String {
        let user = self.resolve(explicit, context).user_id;

        let uid = user.clone();
        let listed = self
            .call(move |b| b.get_all(&uid))
            .await
            .and_then(normalize_memories)
            .and_then(|memories| Ok((memories.len(), serde_json::to_string_pretty(&memories)?)));

        match listed {
            Ok((count, body)) => {
                tracing::info!(user_id = %user, count, "retrieved memories");
                body
            }
            Err(e) => {
                tracing::error!(user_id = %user, error = %e, "error retrieving memories");
                format!("Error retrieving memories: {e}")
            }
        }
    }

    pub async fn search(
        &self,
        query: String,
        limit: Option<i64>,
        explicit: Option<&str>,
        context: &RequestIdentityContext,
    ) -> String {
        let user = self.resolve(explicit, context).user_id;
        let limit = clamp_limit(limit);

        let uid = user.clone();
        let q = query.clone();
        let found = self
            .call(move |b| b.search(&q, &uid, limit))
            .await
            .and_then(normalize_memories)
            .and_then(|memories| Ok((memories.len(), serde_json::to_string_pretty(&memories)?)));

        match found {
            Ok((count, body)) => {
                tracing::info!(user_id = %user, query = %query, count, "search complete");
                body
            }
            Err(e) => {
                tracing::error!(user_id = %user, error = %e, "error searching memories");
                format!("Error searching memories: {e}")
            }
        }
    }

    /// Delete every memory of the resolved user. Without `confirm` nothing is resolved
    /// and the backend is not called.
    pub async fn delete_all(
        &self,
        confirm: bool,
        explicit: Option<&str>,
        context: &RequestIdentityContext,
    ) -> String {
        if !confirm {
            return DELETION_NOT_CONFIRMED.to_string();
        }

        let user = self.resolve(explicit, context).user_id;

        let uid = user.clone();
        match self.call(move |b| b.delete_all(&uid)).await {
            Ok(_) => {
                tracing::info!(user_id = %user, "all memories deleted");
                format!("Successfully deleted all memories for user '{user}'.")
            }
            Err(e) => {
                tracing::error!(user_id = %user, error = %e, "error deleting memories");
                format!("Error deleting memories: {e}")
            }
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, with `...` appended when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn clamp_limit(limit: Option<i64>) -> usize {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT as i64);
    usize::try_from(limit.max(1))
        .unwrap_or(MAX_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT)
}

/// Flatten a backend response into a list of memory texts.
///
/// `{"results": [{"memory": "a"}, ...]}` becomes `["a", ...]`; a bare array is passed
/// through unchanged.
pub fn normalize_memories(value: serde_json::Value) -> Result<Vec<serde_json::Value>, ToolError> {
    use serde_json::Value;

    match value {
        Value::Object(mut envelope) if envelope.contains_key("results") => {
            let Some(Value::Array(results)) = envelope.remove("results") else {
                return Err(ToolError::Shape("`results` is not an array".into()));
            };
            results
                .into_iter()
                .map(|entry| match entry {
                    Value::Object(mut record) => record
                        .remove("memory")
                        .ok_or_else(|| ToolError::Shape("result entry has no `memory` field".into())),
                    Value::String(_) => Ok(entry),
                    other => Err(ToolError::Shape(format!("unexpected result entry: {other}"))),
                })
                .collect()
        }
        Value::Array(list) => Ok(list),
        other => Err(ToolError::Shape(format!(
            "expected a list or a `results` envelope, got {other}"
        ))),
    }
}
