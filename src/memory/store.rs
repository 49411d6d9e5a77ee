//! Write path — per-user deduplication, insert, and audit logging.
//!
//! [`add_memory`] runs inside one transaction: look for a near-duplicate owned by the
//! same user, rewrite it if found, otherwise insert a new row, then log the operation.

use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::embedding_to_bytes;
use super::types::{AddEvent, AddResult};
use super::StoreError;
use crate::identity::UserId;

/// Store `content` for `user_id`, collapsing near-duplicates of that user's memories.
///
/// A memory counts as a duplicate when its cosine similarity to `embedding` is at least
/// `dedup_threshold`. Other users' memories are never considered.
pub fn add_memory(
    conn: &mut Connection,
    user_id: &UserId,
    content: &str,
    embedding: &[f32],
    dedup_threshold: f64,
) -> Result<AddResult, StoreError> {
    let tx = conn.transaction()?;
    let now = chrono::Utc::now().to_rfc3339();
    let blob = embedding_to_bytes(embedding);

    let result = match find_duplicate(&tx, user_id, &blob, dedup_threshold)? {
        Some(existing_id) => {
            tx.execute(
                "UPDATE memories SET content = ?1, embedding = ?2, updated_at = ?3 \
                 WHERE id = ?4 AND user_id = ?5",
                params![content, blob, now, existing_id, user_id.as_str()],
            )?;
            AddResult {
                id: existing_id,
                memory: content.to_string(),
                event: AddEvent::Update,
            }
        }
        None => {
            let id = uuid::Uuid::now_v7().to_string();
            tx.execute(
                "INSERT INTO memories (id, user_id, content, embedding, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![id, user_id.as_str(), content, blob, now],
            )?;
            AddResult {
                id,
                memory: content.to_string(),
                event: AddEvent::Add,
            }
        }
    };

    write_audit_log(&tx, result.event.as_str(), user_id, Some(&result.id), None)?;
    tx.commit()?;

    Ok(result)
}

/// Closest memory of `user_id`, if it is within the similarity threshold.
fn find_duplicate(
    tx: &Transaction,
    user_id: &UserId,
    blob: &[u8],
    threshold: f64,
) -> Result<Option<String>, StoreError> {
    let nearest: Option<(String, f64)> = tx
        .query_row(
            "SELECT id, vec_distance_cosine(embedding, ?1) AS distance FROM memories \
             WHERE user_id = ?2 ORDER BY distance ASC LIMIT 1",
            params![blob, user_id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(nearest
        .filter(|(_, distance)| 1.0 - distance >= threshold)
        .map(|(id, _)| id))
}

/// Append an entry to `memory_log`.
pub(crate) fn write_audit_log(
    conn: &Connection,
    operation: &str,
    user_id: &UserId,
    memory_id: Option<&str>,
    details: Option<&serde_json::Value>,
) -> Result<(), StoreError> {
    let details_json = details.map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO memory_log (operation, user_id, memory_id, details, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            operation,
            user_id.as_str(),
            memory_id,
            details_json,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}
