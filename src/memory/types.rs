//! Record types returned by the SQLite engine.

use serde::Serialize;

/// One stored memory as exposed to callers.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryItem {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// The memory text.
    pub memory: String,
    pub user_id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-modification timestamp.
    pub updated_at: String,
    /// Cosine similarity to the query (search results only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// What a write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddEvent {
    /// A new memory row was created.
    Add,
    /// A near-duplicate of the same user was rewritten instead.
    Update,
}

impl AddEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
        }
    }
}

/// Result of a single add.
#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    pub id: String,
    pub memory: String,
    pub event: AddEvent,
}
