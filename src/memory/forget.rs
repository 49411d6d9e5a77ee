//! Bulk deletion of one user's memories.

use rusqlite::{params, Connection};

use super::store::write_audit_log;
use super::StoreError;
use crate::identity::UserId;

/// Permanently remove every memory owned by `user_id`. Returns how many rows went away.
pub fn delete_user_memories(conn: &mut Connection, user_id: &UserId) -> Result<usize, StoreError> {
    let tx = conn.transaction()?;
    let deleted = tx.execute(
        "DELETE FROM memories WHERE user_id = ?1",
        params![user_id.as_str()],
    )?;
    write_audit_log(
        &tx,
        "delete_all",
        user_id,
        None,
        Some(&serde_json::json!({ "deleted": deleted })),
    )?;
    tx.commit()?;
    Ok(deleted)
}
