//! Collapse visibility.
//!
//! A parent_child edge is hidden iff its source node, or any ancestor of the
//! source reachable upward through parent_child edges, is collapsed. Spouse
//! edges are never hidden. The whole edge set is re-derived on every toggle;
//! there is no incremental patching to drift out of sync.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::GraphModel;
use crate::model::Relation;

/// Returns the ids of edges that should be hidden. Pure; never fails.
pub fn derive_hidden(model: &GraphModel) -> FxHashSet<String> {
    let mut parents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for edge in model.edges() {
        if edge.relation == Relation::ParentChild {
            parents
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
        }
    }

    // covered = the node itself or any ancestor is collapsed.
    let mut covered: FxHashMap<&str, bool> = FxHashMap::default();
    for node in model.nodes() {
        is_covered(node.id.as_str(), model, &parents, &mut covered);
    }

    model
        .edges()
        .filter(|e| {
            e.relation == Relation::ParentChild
                && covered.get(e.source.as_str()).copied().unwrap_or(false)
        })
        .map(|e| e.id.clone())
        .collect()
}

fn is_covered<'a>(
    id: &'a str,
    model: &'a GraphModel,
    parents: &FxHashMap<&'a str, Vec<&'a str>>,
    covered: &mut FxHashMap<&'a str, bool>,
) -> bool {
    if let Some(&known) = covered.get(id) {
        return known;
    }
    // Mark before recursing so a malformed ancestry cycle terminates.
    covered.insert(id, false);

    let collapsed = model
        .node(id)
        .map(|n| n.attributes.collapsed)
        .unwrap_or(false);
    let result = collapsed
        || parents
            .get(id)
            .map(|ps| ps.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .any(|p| is_covered(p, model, parents, covered));

    covered.insert(id, result);
    result
}
