//! Filesystem store: one pretty-printed JSON file per tree.

use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;

use stemma_core::PersistedNode;

use super::{SaveRequest, StoreError, TreeRecord, TreeStore};

#[derive(Debug, Clone)]
pub struct FsTreeStore {
    root: PathBuf,
}

impl FsTreeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tree_path(&self, tree_id: &str) -> PathBuf {
        self.root.join(format!("{tree_id}.json"))
    }

    fn read_record(&self, tree_id: &str) -> Result<TreeRecord, StoreError> {
        let path = self.tree_path(tree_id);
        if !path.exists() {
            return Ok(TreeRecord::empty(tree_id));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write_record(&self, record: &TreeRecord) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root)?;
        let text = serde_json::to_string_pretty(record)?;
        std::fs::write(self.tree_path(&record.tree_id), text)?;
        Ok(())
    }

    fn upsert(&self, tree_id: &str, request: SaveRequest) -> Result<(), StoreError> {
        let existing = self.read_record(tree_id)?;

        // Nodes merge by id (changed nodes overwrite stored ones), deleted
        // ids are erased; the edge set in a request is always complete and
        // replaces the stored one.
        let mut nodes: IndexMap<String, PersistedNode> = existing
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        for node in request.nodes {
            nodes.insert(node.id.clone(), node);
        }
        for id in &request.deleted {
            nodes.shift_remove(id.as_str());
        }

        self.write_record(&TreeRecord {
            tree_id: tree_id.to_string(),
            nodes: nodes.into_values().collect(),
            edges: request.edges,
            last_updated: Utc::now(),
        })
    }
}

impl TreeStore for FsTreeStore {
    fn save_tree<'a>(
        &'a self,
        tree_id: &'a str,
        request: SaveRequest,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        async move { self.upsert(tree_id, request) }.boxed()
    }

    fn load_tree<'a>(&'a self, tree_id: &'a str) -> BoxFuture<'a, Result<TreeRecord, StoreError>> {
        async move { self.read_record(tree_id) }.boxed()
    }

    fn delete_tree<'a>(&'a self, tree_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        async move {
            let path = self.tree_path(tree_id);
            if !path.exists() {
                return Err(StoreError::NotFound {
                    tree_id: tree_id.to_string(),
                });
            }
            std::fs::remove_file(path)?;
            Ok(())
        }
        .boxed()
    }

    fn list_tree_ids(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        async move {
            if !self.root.exists() {
                return Ok(Vec::new());
            }
            let mut ids = Vec::new();
            for entry in std::fs::read_dir(&self.root)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        ids.push(stem.to_string());
                    }
                }
            }
            ids.sort();
            Ok(ids)
        }
        .boxed()
    }
}
