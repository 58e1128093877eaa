use std::collections::HashMap;

use crate::model::TaskTree;

/// Error type for the persistence collaborator
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no tree stored for owner {0}")]
    NotFound(String),
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed tree document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The external persistence boundary: a key-value document store reached
/// through load/save, keyed by an owner id. The wire protocol behind it is
/// not this crate's concern.
pub trait TreeStore {
    fn load_tree(&self, owner_id: &str) -> Result<TaskTree, StoreError>;
    fn save_tree(&mut self, owner_id: &str, tree: &TaskTree) -> Result<(), StoreError>;
}

/// In-memory store holding trees as JSON documents — the same shape the
/// remote store keeps. Used by tests and offline sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TreeStore for MemoryStore {
    fn load_tree(&self, owner_id: &str) -> Result<TaskTree, StoreError> {
        let doc = self
            .documents
            .get(owner_id)
            .ok_or_else(|| StoreError::NotFound(owner_id.to_string()))?;
        Ok(serde_json::from_str(doc)?)
    }

    fn save_tree(&mut self, owner_id: &str, tree: &TaskTree) -> Result<(), StoreError> {
        let doc = serde_json::to_string(tree)?;
        self.documents.insert(owner_id.to_string(), doc);
        Ok(())
    }
}
