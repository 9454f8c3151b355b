//! Generation leveling.
//!
//! Breadth-first propagation from the roots (nodes with no incoming
//! parent_child edge). Spouses share a generation; a child with parents at
//! different depths takes the deeper one.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::graph::GraphModel;
use crate::model::Relation;

/// Computes the generation level for every node. Pure; never fails.
///
/// Unreachable nodes (orphans, inconsistent data) default to level 0. A
/// malformed cyclic parent_child chain cannot loop: each node's level may be
/// raised at most |V| + 1 times before further raises are ignored, which
/// leaves a deterministic partial assignment instead of diverging.
pub fn compute_levels(model: &GraphModel) -> FxHashMap<String, i64> {
    let mut levels: FxHashMap<String, i64> = FxHashMap::default();
    let mut raises: FxHashMap<String, usize> = FxHashMap::default();
    let raise_budget = model.node_count() + 1;

    let mut has_parent: rustc_hash::FxHashSet<&str> = rustc_hash::FxHashSet::default();
    for edge in model.edges() {
        if edge.relation == Relation::ParentChild {
            has_parent.insert(edge.target.as_str());
        }
    }

    let mut queue: VecDeque<String> = VecDeque::new();
    for node in model.nodes() {
        if !has_parent.contains(node.id.as_str()) {
            levels.insert(node.id.clone(), 0);
            queue.push_back(node.id.clone());
        }
    }

    while let Some(id) = queue.pop_front() {
        let current = levels.get(&id).copied().unwrap_or(0);

        // Spouses are always same-generation. The partner is assigned but not
        // enqueued: it propagates depth through its own parent edges only.
        if let Some(spouse) = model.spouse_of(&id) {
            levels.entry(spouse.to_string()).or_insert(current);
        }

        for edge in model.edges() {
            if edge.relation != Relation::ParentChild || edge.source != id {
                continue;
            }
            let child = edge.target.as_str();
            let assigned = levels.get(child).copied();
            if assigned.is_none_or(|l| l < current + 1) {
                let count = raises.entry(child.to_string()).or_insert(0);
                if *count > raise_budget {
                    continue;
                }
                *count += 1;
                levels.insert(child.to_string(), current + 1);
                queue.push_back(child.to_string());
            }
        }
    }

    for node in model.nodes() {
        levels.entry(node.id.clone()).or_insert(0);
    }

    levels
}
