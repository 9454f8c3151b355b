//! Rank assignment: longest path from the roots.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Assigns a rank to every node. Roots (no incoming edge) sit at rank 0;
/// each edge pushes its child to at least one rank below its deepest parent.
///
/// A raise budget per node (|V| + 1) guarantees termination even when the
/// input contains a malformed cycle; nodes a cycle starves of a rank default
/// to 0.
pub fn assign_ranks<'a>(
    nodes: &[&'a str],
    edges: &[(&'a str, &'a str)],
) -> FxHashMap<&'a str, usize> {
    let mut ranks: FxHashMap<&str, usize> = FxHashMap::default();
    let mut raises: FxHashMap<&str, usize> = FxHashMap::default();
    let raise_budget = nodes.len() + 1;

    let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let mut has_parent: FxHashSet<&str> = FxHashSet::default();
    for (v, w) in edges {
        children.entry(v).or_default().push(w);
        has_parent.insert(w);
    }

    let mut queue: VecDeque<&str> = VecDeque::new();
    for &id in nodes {
        if !has_parent.contains(id) {
            ranks.insert(id, 0);
            queue.push_back(id);
        }
    }

    while let Some(id) = queue.pop_front() {
        let current = ranks.get(id).copied().unwrap_or(0);
        let Some(kids) = children.get(id) else {
            continue;
        };
        for &child in kids {
            let assigned = ranks.get(child).copied();
            if assigned.is_none_or(|r| r < current + 1) {
                let count = raises.entry(child).or_insert(0);
                if *count > raise_budget {
                    continue;
                }
                *count += 1;
                ranks.insert(child, current + 1);
                queue.push_back(child);
            }
        }
    }

    for &id in nodes {
        ranks.entry(id).or_insert(0);
    }

    ranks
}
