//! Fallback placement used when ranking fails.
//!
//! Nodes are placed row-major on a near-square grid in insertion order. Ranks stay unset, which
//! is how callers can tell a grid placement from a real layout.

use crate::LayoutGraph;

pub fn position(g: &mut LayoutGraph) {
    let n = g.node_count();
    if n == 0 {
        return;
    }
    let cols = (n as f64).sqrt().ceil().max(1.0) as usize;

    let label = g.graph().clone();
    let mut cell_w: f64 = 0.0;
    let mut cell_h: f64 = 0.0;
    g.for_each_node(|_id, n| {
        cell_w = cell_w.max(n.width);
        cell_h = cell_h.max(n.height);
    });

    let mut ix = 0usize;
    g.for_each_node_mut(|_id, n| {
        let col = ix % cols;
        let row = ix / cols;
        n.x = Some(label.marginx + col as f64 * (cell_w + label.nodesep) + cell_w / 2.0);
        n.y = Some(label.marginy + row as f64 * (cell_h + label.ranksep) + cell_h / 2.0);
        n.rank = None;
        n.order = None;
        ix += 1;
    });
}
