//! Coordinate assignment in the top-to-bottom frame.
//!
//! Ranks are stacked along y separated by `ranksep`; nodes inside a rank are laid out along x in
//! `order`, separated by `nodesep`. Each rank is centred against the widest one.

use crate::LayoutGraph;
use crate::order::layers;

pub fn position(g: &mut LayoutGraph) {
    let layers = layers(g);
    let node_sep = g.graph().nodesep;
    let rank_sep = g.graph().ranksep;

    let extent = |ids: &[String]| -> f64 {
        let widths: f64 = ids
            .iter()
            .map(|id| g.node(id).map(|n| n.width).unwrap_or(0.0))
            .sum();
        widths + node_sep * ids.len().saturating_sub(1) as f64
    };
    let extents: Vec<f64> = layers.iter().map(|ids| extent(ids.as_slice())).collect();
    let widest = extents.iter().copied().fold(0.0_f64, f64::max);

    let mut prev_y: f64 = 0.0;
    for (ids, extent) in layers.iter().zip(&extents) {
        let max_h = ids
            .iter()
            .filter_map(|id| g.node(id).map(|n| n.height))
            .fold(0.0_f64, f64::max);

        let mut x_cursor = (widest - extent) / 2.0;
        for id in ids {
            let Some(n) = g.node_mut(id) else {
                continue;
            };
            n.x = Some(x_cursor + n.width / 2.0);
            n.y = Some(prev_y + max_h / 2.0);
            x_cursor += n.width + node_sep;
        }
        prev_y += max_h + rank_sep;
    }
}
