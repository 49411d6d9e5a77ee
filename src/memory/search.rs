//! Read path — listing and semantic search, always within one user's memories.

use rusqlite::{params, Connection, Row};

use super::embedding_to_bytes;
use super::types::MemoryItem;
use super::StoreError;
use crate::identity::UserId;

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<MemoryItem> {
    Ok(MemoryItem {
        id: row.get("id")?,
        memory: row.get("content")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        score: None,
    })
}

/// Every memory of `user_id`, newest first.
pub fn list_memories(conn: &Connection, user_id: &UserId) -> Result<Vec<MemoryItem>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, content, created_at, updated_at FROM memories \
         WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let items = stmt
        .query_map(params![user_id.as_str()], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Up to `limit` memories of `user_id` ranked by cosine similarity to `query_embedding`.
///
/// The ranking is exact: every row of that user is scored, no approximate index.
pub fn search_memories(
    conn: &Connection,
    user_id: &UserId,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<MemoryItem>, StoreError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT id, user_id, content, created_at, updated_at, \
                vec_distance_cosine(embedding, ?1) AS distance \
         FROM memories WHERE user_id = ?2 \
         ORDER BY distance ASC, created_at DESC LIMIT ?3",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let items = stmt
        .query_map(
            params![embedding_to_bytes(query_embedding), user_id.as_str(), limit],
            |row| {
                let mut item = item_from_row(row)?;
                let distance: f64 = row.get("distance")?;
                item.score = Some(1.0 - distance);
                Ok(item)
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}
