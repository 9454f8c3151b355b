//! Core node/edge types.
//!
//! `level` and `hidden` are derived fields. They are recomputed after every
//! mutation and excluded from the persistable projection (see `persist`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Person,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    ParentChild,
    Spouse,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAttributes {
    pub label: String,
    pub family_name: String,
    /// DD-MM-YYYY, or empty when unknown.
    pub date_of_birth: String,
    pub anniversary_date: String,
    /// Ordered; rendered comma-joined.
    pub tags: Vec<String>,
    pub notes: String,
    /// Opaque image payload. Size policing belongs to the upload collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_blob: Option<String>,
    pub collapsed: bool,
}

impl PersonAttributes {
    pub fn tags_joined(&self) -> String {
        self.tags.join(", ")
    }
}

/// Partial attribute update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttributePatch {
    pub label: Option<String>,
    pub family_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub anniversary_date: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub image_blob: Option<String>,
    pub collapsed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Current render position (top-left corner).
    pub position: Point,
    /// Present iff the node is pinned (user drag, or spouse placement).
    /// Pinned nodes are exempt from the automatic layout pass.
    pub manual_position: Option<Point>,
    pub attributes: PersonAttributes,
    /// Generation number, root = 0. Derived, not authoritative.
    pub level: i64,
}

impl Node {
    pub fn new(id: impl Into<String>, attributes: PersonAttributes) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Person,
            position: Point::default(),
            manual_position: None,
            attributes,
            level: 0,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_manual_position(mut self, position: Point) -> Self {
        self.position = position;
        self.manual_position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: Relation,
    /// Derived by collapse propagation. Never set directly.
    pub hidden: bool,
    /// Opaque render styling carried through persistence (e.g. the dashed
    /// spouse stroke).
    pub style: Option<serde_json::Value>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation: Relation,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation,
            hidden: false,
            style: None,
        }
    }

    pub fn with_style(mut self, style: serde_json::Value) -> Self {
        self.style = Some(style);
        self
    }

    /// For a spouse edge, the partner of `id` (spouse edges are an
    /// undirected pairing stored with an arbitrary direction).
    pub fn other_endpoint(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}
