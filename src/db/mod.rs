//! SQLite connection setup for the memory store.
//!
//! Every connection gets `vec_distance_cosine` from sqlite-vec and the memory schema.
//! File-backed connections also run in WAL mode with a busy timeout so short-lived
//! lock contention between the engine and `close()` does not fail a tool call.

pub mod schema;

use std::path::Path;
use std::sync::Once;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

static VECTOR_FUNCTIONS: Once = Once::new();

/// Make sqlite-vec's SQL functions available on every connection opened afterwards.
pub fn register_vector_functions() {
    VECTOR_FUNCTIONS.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite_vec::sqlite3_vec_init as *const (),
        )));
    });
}

/// Open the memory database file, creating it and its parent directory on first use.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create data directory {}", dir.display()))?;
    }

    register_vector_functions();
    let conn = Connection::open(path)
        .with_context(|| format!("cannot open memory database {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    prepare(&conn)?;

    tracing::info!(path = %path.display(), "memory database ready");
    Ok(conn)
}

/// Scratch database that lives only as long as the connection.
pub fn open_memory_database() -> Result<Connection> {
    register_vector_functions();
    let conn = Connection::open_in_memory().context("cannot open in-memory database")?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<()> {
    schema::init_schema(conn).context("cannot create memory schema")
}

/// Fold the write-ahead log back into the database file.
pub fn checkpoint(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
}
