//! In-rank ordering.
//!
//! One downward barycenter sweep: each node is keyed by the mean order index
//! of its parents in shallower ranks, which keeps sibling groups under their
//! parents. Parentless nodes keep their lexicographic slot; all ties break
//! by node id so the result is stable across calls.

use rustc_hash::FxHashMap;

/// Groups nodes into ranks and orders each rank. Returns ranks shallowest
/// first, each a left-to-right node list.
pub fn order_ranks<'a>(
    ranks: &FxHashMap<&'a str, usize>,
    edges: &[(&'a str, &'a str)],
) -> Vec<Vec<&'a str>> {
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<&str>> = vec![Vec::new(); max_rank + 1];
    for (&id, &rank) in ranks {
        layers[rank].push(id);
    }
    for layer in &mut layers {
        layer.sort_unstable();
    }

    let mut parents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for (v, w) in edges {
        parents.entry(w).or_default().push(v);
    }

    // Order index of every already-placed node, filled in as we sweep down.
    let mut placed: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, &id) in layers[0].iter().enumerate() {
        placed.insert(id, i);
    }

    for r in 1..layers.len() {
        let layer = &mut layers[r];
        let mut keyed: Vec<(f64, &str)> = layer
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let bc = parents.get(id).and_then(|ps| {
                    let indices: Vec<usize> = ps
                        .iter()
                        .filter_map(|p| placed.get(p).copied())
                        .collect();
                    if indices.is_empty() {
                        None
                    } else {
                        Some(indices.iter().sum::<usize>() as f64 / indices.len() as f64)
                    }
                });
                (bc.unwrap_or(i as f64), id)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        *layer = keyed.into_iter().map(|(_, id)| id).collect();
        for (i, &id) in layer.iter().enumerate() {
            placed.insert(id, i);
        }
    }

    layers
}
