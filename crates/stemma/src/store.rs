//! Storage collaborator.
//!
//! Object-safe trait over whatever backend holds trees. The engine only
//! ever sends the persistable projection (see `stemma_core::persist`);
//! `save_tree` carries the changed nodes, the full current edge set, and
//! any deletion tombstones; the backend upserts: nodes merge by id, edges
//! replace wholesale, tombstoned ids are erased.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use stemma_core::{PersistedEdge, PersistedNode};

mod fs;

pub use fs::FsTreeStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree not found: {tree_id}")]
    NotFound { tree_id: String },

    #[error("Storage backend failure: {message}")]
    Backend { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRecord {
    pub tree_id: String,
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    pub last_updated: DateTime<Utc>,
}

impl TreeRecord {
    pub fn empty(tree_id: impl Into<String>) -> Self {
        Self {
            tree_id: tree_id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Changed nodes plus the full current edge set, and the ids of nodes
/// removed since the last save whose stored records must be erased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

pub trait TreeStore: Send + Sync {
    fn save_tree<'a>(
        &'a self,
        tree_id: &'a str,
        request: SaveRequest,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Loads a tree; an absent tree resolves to an empty record, not an
    /// error.
    fn load_tree<'a>(&'a self, tree_id: &'a str) -> BoxFuture<'a, Result<TreeRecord, StoreError>>;

    fn delete_tree<'a>(&'a self, tree_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;

    fn list_tree_ids(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;
}
