#![forbid(unsafe_code)]

//! Deterministic rank-based hierarchical layout.
//!
//! Top-to-bottom placement using only parent_child edges for ranking and
//! ordering; spouse pairings are a rendering concern and never reach this
//! crate. Pinned nodes (manual positions) are excluded from the pass
//! entirely and never influence the placement of the rest.
//!
//! Determinism contract: identical input yields identical output. Ties in
//! ordering are broken lexicographically by node id.

pub mod order;
pub mod position;
pub mod rank;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Fixed node footprint and separations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between siblings within a rank.
    pub node_sep: f64,
    /// Vertical gap between ranks.
    pub rank_sep: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 140.0,
            node_sep: 50.0,
            rank_sep: 120.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal offset at which a spouse is pinned next to its partner.
    pub fn spouse_offset(&self) -> f64 {
        self.node_width + self.node_sep
    }
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    /// Pinned nodes keep their manual coordinates and are skipped.
    pub pinned: bool,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, pinned: bool) -> Self {
        Self {
            id: id.into(),
            pinned,
        }
    }
}

/// Computes top-left positions for every unpinned node.
///
/// `edges` are (parent, child) pairs; pairs touching a pinned or unknown
/// node are ignored. Pinned nodes never appear in the output map.
pub fn layout(
    nodes: &[LayoutNode],
    edges: &[(String, String)],
    config: &LayoutConfig,
) -> FxHashMap<String, Point> {
    let movable: Vec<&str> = nodes
        .iter()
        .filter(|n| !n.pinned)
        .map(|n| n.id.as_str())
        .collect();
    if movable.is_empty() {
        return FxHashMap::default();
    }

    let movable_set: rustc_hash::FxHashSet<&str> =
        movable.iter().copied().collect();
    let edges: Vec<(&str, &str)> = edges
        .iter()
        .filter(|(v, w)| movable_set.contains(v.as_str()) && movable_set.contains(w.as_str()))
        .map(|(v, w)| (v.as_str(), w.as_str()))
        .collect();

    let ranks = rank::assign_ranks(&movable, &edges);
    let ordered = order::order_ranks(&ranks, &edges);
    position::assign_coordinates(&ordered, config)
}
