//! Coordinate assignment.
//!
//! Ranks stack top to bottom; each rank is laid out left to right and
//! centered on the widest rank. Output coordinates are the node's top-left
//! corner.

use rustc_hash::FxHashMap;

use crate::{LayoutConfig, Point};

pub fn assign_coordinates(
    ordered: &[Vec<&str>],
    config: &LayoutConfig,
) -> FxHashMap<String, Point> {
    let rank_width = |n: usize| -> f64 {
        if n == 0 {
            0.0
        } else {
            n as f64 * config.node_width + (n as f64 - 1.0) * config.node_sep
        }
    };
    let total_width = ordered
        .iter()
        .map(|layer| rank_width(layer.len()))
        .fold(0.0, f64::max);

    let mut positions = FxHashMap::default();
    for (rank, layer) in ordered.iter().enumerate() {
        let offset = (total_width - rank_width(layer.len())) / 2.0;
        let y = rank as f64 * (config.node_height + config.rank_sep);
        for (i, &id) in layer.iter().enumerate() {
            let x = offset + i as f64 * (config.node_width + config.node_sep);
            positions.insert(id.to_string(), Point { x, y });
        }
    }
    positions
}
