//! Canonical node/edge store with all-or-nothing mutation primitives.
//!
//! `GraphModel` exclusively owns the collections; derived state (levels,
//! hidden flags, automatic positions) is computed by pure functions and
//! merged back through the `apply_*` writers.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::model::{AttributePatch, Edge, Node, Point, Relation};
use crate::persist::GraphSnapshot;

#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// The spouse edge touching `id`, if any. At most one exists.
    pub fn spouse_edge_of(&self, id: &str) -> Option<&Edge> {
        self.edges
            .values()
            .find(|e| e.relation == Relation::Spouse && e.touches(id))
    }

    /// The partner node id paired with `id`, if any.
    pub fn spouse_of(&self, id: &str) -> Option<&str> {
        self.spouse_edge_of(id).and_then(|e| e.other_endpoint(id))
    }

    /// Inserts a node and zero or more edges atomically. Every edge endpoint
    /// must reference an existing node or the node being added; on failure
    /// nothing is applied.
    pub fn add_node(&mut self, node: Node, edges: Vec<Edge>) -> Result<()> {
        for edge in &edges {
            for endpoint in [&edge.source, &edge.target] {
                if *endpoint != node.id && !self.nodes.contains_key(endpoint) {
                    return Err(Error::UnknownNode {
                        id: endpoint.clone(),
                    });
                }
            }
        }
        // Spouse pairing stays unique even through the bulk path.
        for edge in &edges {
            if edge.relation == Relation::Spouse {
                for endpoint in [&edge.source, &edge.target] {
                    if *endpoint != node.id && self.spouse_edge_of(endpoint).is_some() {
                        return Err(Error::SpouseConflict {
                            id: endpoint.clone(),
                        });
                    }
                }
            }
        }

        self.nodes.insert(node.id.clone(), node);
        for edge in edges {
            self.edges.insert(edge.id.clone(), edge);
        }
        Ok(())
    }

    /// Field-wise attribute merge. Never touches `position`/`manual_position`.
    pub fn update_node_attributes(&mut self, id: &str, patch: AttributePatch) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound {
            id: id.to_string(),
        })?;
        let attrs = &mut node.attributes;
        if let Some(label) = patch.label {
            attrs.label = label;
        }
        if let Some(family_name) = patch.family_name {
            attrs.family_name = family_name;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            attrs.date_of_birth = date_of_birth;
        }
        if let Some(anniversary_date) = patch.anniversary_date {
            attrs.anniversary_date = anniversary_date;
        }
        if let Some(tags) = patch.tags {
            attrs.tags = tags;
        }
        if let Some(notes) = patch.notes {
            attrs.notes = notes;
        }
        if let Some(image_blob) = patch.image_blob {
            attrs.image_blob = Some(image_blob);
        }
        if let Some(collapsed) = patch.collapsed {
            attrs.collapsed = collapsed;
        }
        Ok(())
    }

    /// Removes a node and every incident edge. Silently no-ops on an absent
    /// id; returns whether anything was removed.
    pub fn delete_node(&mut self, id: &str) -> bool {
        if self.nodes.shift_remove(id).is_none() {
            return false;
        }
        self.edges.retain(|_, e| !e.touches(id));
        true
    }

    /// Creates an edge between two existing nodes. Spouse edges are unique
    /// per endpoint. Returns the new edge id.
    pub fn connect(&mut self, source: &str, target: &str, relation: Relation) -> Result<String> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::UnknownNode {
                    id: endpoint.to_string(),
                });
            }
        }
        if relation == Relation::Spouse {
            for endpoint in [source, target] {
                if self.spouse_edge_of(endpoint).is_some() {
                    return Err(Error::SpouseConflict {
                        id: endpoint.to_string(),
                    });
                }
            }
        }

        let id = match relation {
            Relation::ParentChild => format!("e{source}-{target}"),
            Relation::Spouse => format!("e-spouse-{source}-{target}"),
        };
        self.edges
            .insert(id.clone(), Edge::new(id.clone(), source, target, relation));
        Ok(id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    /// Pins a node, exempting it from the next automatic layout pass.
    pub fn set_manual_position(&mut self, id: &str, position: Point) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound {
            id: id.to_string(),
        })?;
        node.manual_position = Some(position);
        node.position = position;
        Ok(())
    }

    /// Clears a pin; the node rejoins the automatic layout pass.
    pub fn clear_manual_position(&mut self, id: &str) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound {
            id: id.to_string(),
        })?;
        node.manual_position = None;
        Ok(())
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound {
            id: id.to_string(),
        })?;
        node.attributes.collapsed = collapsed;
        Ok(())
    }

    /// Flips the user-facing collapsed flag and returns the new value.
    /// Edge visibility is re-derived separately (see `collapse`).
    pub fn toggle_collapsed(&mut self, id: &str) -> Result<bool> {
        let node = self.nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound {
            id: id.to_string(),
        })?;
        node.attributes.collapsed = !node.attributes.collapsed;
        Ok(node.attributes.collapsed)
    }

    pub fn apply_levels(&mut self, levels: &FxHashMap<String, i64>) {
        for (id, node) in &mut self.nodes {
            node.level = levels.get(id).copied().unwrap_or(0);
        }
    }

    /// Merges automatic positions back. Pinned nodes keep their pinned
    /// coordinates regardless of what the map contains.
    pub fn apply_positions(&mut self, positions: &FxHashMap<String, Point>) {
        for (id, node) in &mut self.nodes {
            if let Some(pinned) = node.manual_position {
                node.position = pinned;
            } else if let Some(p) = positions.get(id) {
                node.position = *p;
            }
        }
    }

    pub fn apply_hidden(&mut self, hidden: &FxHashSet<String>) {
        for (id, edge) in &mut self.edges {
            edge.hidden = hidden.contains(id);
        }
    }

    /// Replaces the whole graph with a snapshot's contents. Derived fields
    /// come back zeroed and must be recomputed by the caller.
    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.nodes.clear();
        self.edges.clear();
        for node in snapshot.to_nodes() {
            self.nodes.insert(node.id.clone(), node);
        }
        for edge in snapshot.to_edges() {
            self.edges.insert(edge.id.clone(), edge);
        }
    }
}
