//! The engine facade.
//!
//! `TreeEngine` owns the graph, its history, and the sync manager, and is
//! the single command interface the rendering layer talks to. Every
//! mutation method runs the same pipeline; derived fields are never served
//! stale.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use stemma_core::{
    AttributePatch, Edge, GraphModel, GraphSnapshot, HistoryManager, Node, PersistedNode,
    PersonAttributes, Point, Relation, compute_levels, derive_hidden,
};
use stemma_layout::{LayoutConfig, LayoutNode};

use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::store::TreeStore;
use crate::sync::{DEBOUNCE_WINDOW, FlushOutcome, SyncManager};
use crate::trees::initial_root_node;

/// Read model handed to renderers, one entry per node.
#[derive(Debug)]
pub struct RenderNode<'a> {
    pub id: &'a str,
    pub attributes: &'a PersonAttributes,
    pub position: Point,
    pub level: i64,
    pub collapsed: bool,
}

pub struct TreeEngine {
    tree_id: String,
    model: GraphModel,
    history: HistoryManager,
    sync: SyncManager,
    layout: LayoutConfig,
    store: Arc<dyn TreeStore>,
    auth: Arc<dyn AuthProvider>,
    selected: Option<String>,
}

impl TreeEngine {
    pub fn new(
        tree_id: impl Into<String>,
        store: Arc<dyn TreeStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let tree_id = tree_id.into();
        Self {
            sync: SyncManager::new(store.clone(), tree_id.clone(), DEBOUNCE_WINDOW),
            tree_id,
            model: GraphModel::new(),
            history: HistoryManager::new(),
            layout: LayoutConfig::default(),
            store,
            auth,
            selected: None,
        }
    }

    pub fn with_layout_config(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_debounce_window(mut self, window: std::time::Duration) -> Self {
        self.sync = SyncManager::new(self.store.clone(), self.tree_id.clone(), window);
        self
    }

    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn sync(&self) -> &SyncManager {
        &self.sync
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id.filter(|id| self.model.contains_node(id));
    }

    fn require_auth(&self) -> Result<()> {
        match self.auth.current_user() {
            Some(_) => Ok(()),
            None => Err(Error::AuthRequired),
        }
    }

    /// Loads the tree from storage. A load failure or an empty record falls
    /// back to a fresh single-root tree so callers always end up with a
    /// valid graph.
    pub async fn load(&mut self) -> Result<()> {
        self.require_auth()?;
        match self.store.load_tree(&self.tree_id).await {
            Ok(record) if !record.is_empty() => {
                let snapshot = GraphSnapshot {
                    nodes: record.nodes,
                    edges: record.edges,
                };
                self.model.restore(&snapshot);
                // Positions were captured as-is; no layout pass on load.
                self.refresh_derived(false);
                self.history.reset(GraphSnapshot::capture(&self.model));
                info!(tree_id = %self.tree_id, nodes = self.model.node_count(), "tree loaded");
                Ok(())
            }
            Ok(_) => {
                info!(tree_id = %self.tree_id, "no stored tree; creating initial root");
                self.create_initial_tree();
                Ok(())
            }
            Err(err) => {
                warn!(tree_id = %self.tree_id, error = %err, "load failed; creating initial root");
                self.create_initial_tree();
                Ok(())
            }
        }
    }

    fn create_initial_tree(&mut self) {
        self.model = GraphModel::new();
        let root = initial_root_node(&self.tree_id);
        // The root was just built; insertion cannot fail. The seeded
        // position stands until the first mutation triggers a layout.
        let _ = self.model.add_node(root, Vec::new());
        self.refresh_derived(false);
        let snapshot = GraphSnapshot::capture(&self.model);
        self.history.reset(snapshot.clone());
        self.sync.mark_dirty(snapshot.nodes);
    }

    /// Adds a child under `parent_id`. When the parent has a spouse, the
    /// child gets a parent_child edge from both partners.
    pub fn add_child(&mut self, parent_id: &str) -> Result<String> {
        let parent = self.model.node(parent_id).ok_or_else(|| {
            stemma_core::Error::UnknownNode {
                id: parent_id.to_string(),
            }
        })?;
        let family_name = parent.attributes.family_name.clone();
        let spouse = self.model.spouse_of(parent_id).map(str::to_string);

        let id = new_node_id();
        let node = Node::new(
            id.clone(),
            PersonAttributes {
                label: "New Child".to_string(),
                family_name,
                ..Default::default()
            },
        );
        let mut edges = vec![Edge::new(
            format!("e{parent_id}-{id}"),
            parent_id,
            &id,
            Relation::ParentChild,
        )];
        if let Some(spouse) = spouse {
            edges.push(Edge::new(
                format!("e{spouse}-{id}"),
                &spouse,
                &id,
                Relation::ParentChild,
            ));
        }
        self.model.add_node(node, edges)?;
        self.selected = Some(id.clone());
        self.finish_mutation(true);
        Ok(id)
    }

    /// Adds a spouse next to `partner_id`, pinned at a fixed offset to the
    /// right (same y). The automatic layout pass is skipped: the pin is the
    /// placement.
    pub fn add_spouse(&mut self, partner_id: &str) -> Result<String> {
        let partner = self.model.node(partner_id).ok_or_else(|| {
            stemma_core::Error::UnknownNode {
                id: partner_id.to_string(),
            }
        })?;
        if self.model.spouse_edge_of(partner_id).is_some() {
            return Err(stemma_core::Error::SpouseConflict {
                id: partner_id.to_string(),
            }
            .into());
        }
        let family_name = partner.attributes.family_name.clone();
        let pin = Point::new(
            partner.position.x + self.layout.spouse_offset(),
            partner.position.y,
        );

        let id = new_node_id();
        let node = Node::new(
            id.clone(),
            PersonAttributes {
                label: "New Spouse".to_string(),
                family_name,
                ..Default::default()
            },
        )
        .with_manual_position(pin);
        let edge = Edge::new(
            format!("e-spouse-{partner_id}-{id}"),
            partner_id,
            &id,
            Relation::Spouse,
        )
        .with_style(spouse_edge_style());

        self.model.add_node(node, vec![edge])?;
        self.selected = Some(id.clone());
        self.finish_mutation(false);
        Ok(id)
    }

    /// Adds a parent above `child_id`.
    pub fn add_parent(&mut self, child_id: &str) -> Result<String> {
        let child = self.model.node(child_id).ok_or_else(|| {
            stemma_core::Error::UnknownNode {
                id: child_id.to_string(),
            }
        })?;
        let family_name = child.attributes.family_name.clone();

        let id = new_node_id();
        let node = Node::new(
            id.clone(),
            PersonAttributes {
                label: "New Parent".to_string(),
                family_name,
                ..Default::default()
            },
        );
        let edge = Edge::new(
            format!("e{id}-{child_id}"),
            &id,
            child_id,
            Relation::ParentChild,
        );
        self.model.add_node(node, vec![edge])?;
        self.selected = Some(id.clone());
        self.finish_mutation(true);
        Ok(id)
    }

    /// Draw-edge action. Layout reruns for parent_child edges; a spouse
    /// pairing does not move anyone.
    pub fn connect(&mut self, source: &str, target: &str, relation: Relation) -> Result<String> {
        let edge_id = self.model.connect(source, target, relation)?;
        self.finish_mutation(relation == Relation::ParentChild);
        Ok(edge_id)
    }

    pub fn update_node_attributes(&mut self, id: &str, patch: AttributePatch) -> Result<()> {
        self.model.update_node_attributes(id, patch)?;
        self.finish_mutation(false);
        Ok(())
    }

    /// Deletes a node and its incident edges; a no-op on an absent id. The
    /// id is tombstoned so the next save erases the stored record too.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if !self.model.delete_node(id) {
            return false;
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.sync.mark_deleted([id.to_string()]);
        self.finish_mutation(true);
        true
    }

    pub fn toggle_collapse(&mut self, id: &str) -> Result<bool> {
        let collapsed = self.model.toggle_collapsed(id)?;
        self.finish_mutation(false);
        Ok(collapsed)
    }

    /// Drag end: pins the node at its dropped coordinates. Only the dragged
    /// node is marked dirty.
    pub fn set_manual_position(&mut self, id: &str, position: Point) -> Result<()> {
        self.model.set_manual_position(id, position)?;
        self.refresh_derived(false);
        self.history.commit(GraphSnapshot::capture(&self.model));
        if let Some(node) = self.model.node(id) {
            self.sync.mark_dirty([PersistedNode::capture(node)]);
        }
        Ok(())
    }

    /// Explicit relayout command; manual pins are preserved.
    pub fn apply_layout(&mut self) {
        self.finish_mutation(true);
    }

    /// Restores the previous snapshot. Positions come back exactly as
    /// captured (no layout pass), and nothing is committed.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.restore_snapshot(snapshot)
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.restore_snapshot(snapshot)
    }

    fn restore_snapshot(&mut self, snapshot: GraphSnapshot) -> bool {
        // Nodes that exist now but not in the snapshot are deletions from
        // storage's point of view (e.g. redoing a delete).
        let incoming: HashSet<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        let removed: Vec<String> = self
            .model
            .node_ids()
            .filter(|id| !incoming.contains(id))
            .map(str::to_string)
            .collect();

        self.model.restore(&snapshot);
        self.refresh_derived(false);
        if self
            .selected
            .as_deref()
            .is_some_and(|id| !self.model.contains_node(id))
        {
            self.selected = None;
        }
        self.sync.mark_deleted(removed);
        self.sync.mark_dirty(snapshot.nodes);
        true
    }

    /// Manual "save now": same pipeline as the timer path, run immediately
    /// with every node marked dirty.
    pub async fn save_now(&mut self) -> Result<FlushOutcome> {
        self.require_auth()?;
        let snapshot = GraphSnapshot::capture(&self.model);
        self.sync.mark_dirty(snapshot.nodes);
        self.sync.flush(snapshot.edges).await
    }

    pub fn poll_sync(&self, now: Instant) -> bool {
        self.sync.poll_due(now)
    }

    /// Driver hook: runs a flush iff the debounce deadline has passed.
    pub async fn flush_if_due(&mut self) -> Result<Option<FlushOutcome>> {
        if !self.sync.poll_due(Instant::now()) {
            return Ok(None);
        }
        self.require_auth()?;
        let edges = GraphSnapshot::capture(&self.model).edges;
        self.sync.flush(edges).await.map(Some)
    }

    pub fn render_nodes(&self) -> Vec<RenderNode<'_>> {
        self.model
            .nodes()
            .map(|n| RenderNode {
                id: &n.id,
                attributes: &n.attributes,
                position: n.position,
                level: n.level,
                collapsed: n.attributes.collapsed,
            })
            .collect()
    }

    pub fn hidden_edges(&self) -> Vec<&str> {
        self.model
            .edges()
            .filter(|e| e.hidden)
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Sorted, deduplicated tag names across the whole graph.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        for node in self.model.nodes() {
            for tag in &node.attributes.tags {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.insert(tag.to_string());
                }
            }
        }
        tags.into_iter().collect()
    }

    /// Mutation tail: recompute derived state, commit, mark everything
    /// dirty.
    fn finish_mutation(&mut self, run_layout: bool) {
        self.refresh_derived(run_layout);
        let snapshot = GraphSnapshot::capture(&self.model);
        self.history.commit(snapshot.clone());
        self.sync.mark_dirty(snapshot.nodes);
    }

    fn refresh_derived(&mut self, run_layout: bool) {
        let levels = compute_levels(&self.model);
        self.model.apply_levels(&levels);

        if run_layout {
            let nodes: Vec<LayoutNode> = self
                .model
                .nodes()
                .map(|n| LayoutNode::new(n.id.clone(), n.manual_position.is_some()))
                .collect();
            let edges: Vec<(String, String)> = self
                .model
                .edges()
                .filter(|e| e.relation == Relation::ParentChild)
                .map(|e| (e.source.clone(), e.target.clone()))
                .collect();
            let positions = stemma_layout::layout(&nodes, &edges, &self.layout);
            let positions = positions
                .into_iter()
                .map(|(id, p)| (id, Point::new(p.x, p.y)))
                .collect();
            self.model.apply_positions(&positions);
            debug!(tree_id = %self.tree_id, "layout pass applied");
        }

        let hidden = derive_hidden(&self.model);
        self.model.apply_hidden(&hidden);
    }
}

fn new_node_id() -> String {
    format!("node_{}", Uuid::new_v4().simple())
}

fn spouse_edge_style() -> serde_json::Value {
    json!({ "stroke": "#ec4899", "strokeWidth": 3, "strokeDasharray": "6 6" })
}
