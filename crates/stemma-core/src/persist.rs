//! Persistable projection of the graph.
//!
//! An explicit whitelist, not a destructuring cleanup: only the fields named
//! here ever reach history snapshots or storage, so transient state added to
//! the live types later cannot leak by accident. Derived fields (`level`,
//! `hidden`) are deliberately absent.

use serde::{Deserialize, Serialize};

use crate::graph::GraphModel;
use crate::model::{Edge, Node, NodeKind, PersonAttributes, Point, Relation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNode {
    pub id: String,
    pub kind: NodeKind,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_position: Option<Point>,
    pub attributes: PersonAttributes,
}

impl PersistedNode {
    pub fn capture(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            position: node.position,
            manual_position: node.manual_position,
            attributes: node.attributes.clone(),
        }
    }

    pub fn to_node(&self) -> Node {
        Node {
            id: self.id.clone(),
            kind: self.kind,
            position: self.position,
            manual_position: self.manual_position,
            attributes: self.attributes.clone(),
            level: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

impl PersistedEdge {
    pub fn capture(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            relation: edge.relation,
            style: edge.style.clone(),
        }
    }

    pub fn to_edge(&self) -> Edge {
        Edge {
            id: self.id.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            relation: self.relation,
            hidden: false,
            style: self.style.clone(),
        }
    }
}

/// An immutable, serializable view of the whole graph. History entries and
/// storage records are built from this and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<PersistedNode>,
    pub edges: Vec<PersistedEdge>,
}

impl GraphSnapshot {
    pub fn capture(model: &GraphModel) -> Self {
        Self {
            nodes: model.nodes().map(PersistedNode::capture).collect(),
            edges: model.edges().map(PersistedEdge::capture).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(PersistedNode::to_node).collect()
    }

    pub fn to_edges(&self) -> Vec<Edge> {
        self.edges.iter().map(PersistedEdge::to_edge).collect()
    }
}
