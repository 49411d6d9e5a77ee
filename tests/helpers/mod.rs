#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use scoped_memory::db;
use scoped_memory::embedding::EmbeddingProvider;
use scoped_memory::identity::UserId;
use scoped_memory::memory::{MemoryBackend, SqliteMemoryEngine, StoreError};
use scoped_memory::tools::MemoryService;
use serde_json::{json, Value};

/// Words that get their own embedding dimension; everything else shares the last one.
const VOCAB: [&str; 8] = ["tea", "coffee", "oslo", "paris", "cat", "dog", "rust", "go"];

/// Deterministic bag-of-words embedder: identical texts embed identically, texts with
/// disjoint vocabulary words are far apart.
pub struct KeywordEmbedder;

impl EmbeddingProvider for KeywordEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0f32; VOCAB.len() + 1];
        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            let slot = VOCAB.iter().position(|w| *w == word).unwrap_or(VOCAB.len());
            v[slot] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// SQLite engine over a fresh in-memory database.
pub fn test_engine() -> SqliteMemoryEngine {
    let conn = db::open_memory_database().unwrap();
    SqliteMemoryEngine::new(conn, Arc::new(KeywordEmbedder), 0.95).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

/// One recorded backend call: operation name and the user it was scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub user: String,
}

/// Test double that records every call. Listing/search answer with a `results`
/// envelope naming the owner, so a response proves which user it was scoped to.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failure: Option<String>,
    canned: Option<Value>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `StoreError::Unavailable(message)`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Listing and search return `response` verbatim.
    pub fn answering(response: Value) -> Self {
        Self {
            canned: Some(response),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    fn record(&self, op: &'static str, user: &UserId) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(Call {
            op,
            user: user.to_string(),
        });
        match &self.failure {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn listing(&self, user: &UserId) -> Value {
        self.canned
            .clone()
            .unwrap_or_else(|| json!({ "results": [{ "memory": format!("owner={user}") }] }))
    }
}

impl MemoryBackend for RecordingBackend {
    fn add(&self, content: &str, user_id: &UserId) -> Result<Value, StoreError> {
        self.record("add", user_id)?;
        Ok(json!({ "results": [{ "memory": content, "event": "ADD" }] }))
    }

    fn get_all(&self, user_id: &UserId) -> Result<Value, StoreError> {
        self.record("get_all", user_id)?;
        Ok(self.listing(user_id))
    }

    fn search(&self, _query: &str, user_id: &UserId, _limit: usize) -> Result<Value, StoreError> {
        self.record("search", user_id)?;
        Ok(self.listing(user_id))
    }

    fn delete_all(&self, user_id: &UserId) -> Result<Value, StoreError> {
        self.record("delete_all", user_id)?;
        Ok(json!({ "message": "Memories deleted successfully!" }))
    }
}

/// A service over `backend` with process default user `"default"`.
pub fn service_with(backend: Arc<RecordingBackend>) -> MemoryService {
    MemoryService::new(backend, user("default"))
}
