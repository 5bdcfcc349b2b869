//! Coordinate system adjustment helpers.
//!
//! Ranking and positioning assume a top-to-bottom coordinate system. For left-to-right /
//! right-to-left layouts node boxes are rotated before positioning and axes swapped afterwards;
//! bottom-to-top / right-to-left layouts flip the rank axis.

use crate::{LayoutGraph, RankDir};

pub fn adjust(g: &mut LayoutGraph) {
    if g.graph().rankdir.is_horizontal() {
        swap_width_height(g);
    }
}

/// Reverts [`adjust`] without touching coordinates (used when the pipeline bails out early).
pub fn restore_sizes(g: &mut LayoutGraph) {
    adjust(g);
}

pub fn undo(g: &mut LayoutGraph) {
    let rankdir = g.graph().rankdir;
    if rankdir.is_reversed() {
        reverse_y(g);
    }
    match rankdir {
        RankDir::LR | RankDir::RL => {
            swap_xy(g);
            swap_width_height(g);
        }
        RankDir::TB | RankDir::BT => {}
    }
}

fn swap_width_height(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        (n.width, n.height) = (n.height, n.width);
    });
}

fn reverse_y(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let Some(y) = n.y {
            n.y = Some(-y);
        }
    });
}

fn swap_xy(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            n.x = Some(y);
            n.y = Some(x);
        }
    });
}
