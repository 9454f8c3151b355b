//! Tree-collection operations: the "which trees do I have" surface that
//! sits above any single engine instance. All auth-gated.

use tracing::info;
use uuid::Uuid;

use stemma_core::{Node, PersistedNode, PersonAttributes, Point};

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::store::{SaveRequest, TreeStore};

/// The synthesized root every fresh tree starts from.
pub fn initial_root_node(tree_id: &str) -> Node {
    Node::new(
        format!("root_{}", Uuid::new_v4().simple()),
        PersonAttributes {
            label: format!("{tree_id} Family Root"),
            family_name: tree_id.to_string(),
            tags: vec!["Root".to_string(), "Living".to_string()],
            notes: "Start building your tree here".to_string(),
            ..Default::default()
        },
    )
    .with_position(Point::new(250.0, 50.0))
}

pub async fn list_trees(store: &dyn TreeStore, auth: &dyn AuthProvider) -> Result<Vec<String>> {
    require_auth(auth)?;
    Ok(store.list_tree_ids().await?)
}

/// Creates and persists a fresh single-root tree.
pub async fn create_tree(
    store: &dyn TreeStore,
    auth: &dyn AuthProvider,
    tree_id: &str,
) -> Result<()> {
    require_auth(auth)?;
    let root = initial_root_node(tree_id);
    store
        .save_tree(
            tree_id,
            SaveRequest {
                nodes: vec![PersistedNode::capture(&root)],
                edges: Vec::new(),
                deleted: Vec::new(),
            },
        )
        .await?;
    info!(tree_id, "tree created");
    Ok(())
}

pub async fn delete_tree(
    store: &dyn TreeStore,
    auth: &dyn AuthProvider,
    tree_id: &str,
) -> Result<()> {
    require_auth(auth)?;
    store.delete_tree(tree_id).await?;
    info!(tree_id, "tree deleted");
    Ok(())
}

fn require_auth(auth: &dyn AuthProvider) -> Result<()> {
    match auth.current_user() {
        Some(_) => Ok(()),
        None => Err(Error::AuthRequired),
    }
}
