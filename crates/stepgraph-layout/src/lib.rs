#![forbid(unsafe_code)]

//! Layered layout for execution-trace graphs.
//!
//! The pipeline is a reduced Sugiyama-style pass: rank every node by its longest path from a
//! source, order nodes within a rank by creation order, assign coordinates, then rotate/flip for
//! the requested [`RankDir`]. Each call starts from a freshly built [`graphlib::Graph`], so the
//! result depends only on the input nodes and edges.

pub use stepgraph_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coordinate_system;
pub mod error;
pub mod grid;
pub mod model;
pub mod order;
pub mod position;
pub mod rank;

pub use error::{LayoutError, Result};
pub use model::{EdgeLabel, GraphLabel, NodeLabel, Point, RankDir};

pub type LayoutGraph = graphlib::Graph<NodeLabel, EdgeLabel, GraphLabel>;

/// Runs the full layout pipeline, writing `rank`, `order`, `x` and `y` onto every node.
///
/// Previous layout results stored on the nodes are discarded first, so applying this twice to
/// the same graph yields identical coordinates.
pub fn layout(g: &mut LayoutGraph) -> Result<()> {
    reset(g);
    coordinate_system::adjust(g);
    let ranked = rank::rank(g);
    if let Err(err) = ranked {
        coordinate_system::restore_sizes(g);
        return Err(err);
    }
    order::order(g);
    position::position(g);
    coordinate_system::undo(g);
    translate(g);
    Ok(())
}

/// Like [`layout`], but falls back to [`grid::position`] when ranking fails.
///
/// Returns the error that triggered the fallback, if any.
pub fn layout_or_grid(g: &mut LayoutGraph) -> Option<LayoutError> {
    match layout(g) {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(error = %err, nodes = g.node_count(), "layout failed; using grid fallback");
            reset(g);
            grid::position(g);
            Some(err)
        }
    }
}

fn reset(g: &mut LayoutGraph) {
    g.for_each_node_mut(|_id, n| {
        n.rank = None;
        n.order = None;
        n.x = None;
        n.y = None;
    });
}

/// Shifts the drawing so its top-left corner sits at `(marginx, marginy)`.
fn translate(g: &mut LayoutGraph) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    g.for_each_node(|_id, n| {
        if let (Some(x), Some(y)) = (n.x, n.y) {
            min_x = min_x.min(x - n.width / 2.0);
            min_y = min_y.min(y - n.height / 2.0);
        }
    });
    if !min_x.is_finite() || !min_y.is_finite() {
        return;
    }

    let dx = g.graph().marginx - min_x;
    let dy = g.graph().marginy - min_y;
    g.for_each_node_mut(|_id, n| {
        if let Some(x) = n.x.as_mut() {
            *x += dx;
        }
        if let Some(y) = n.y.as_mut() {
            *y += dy;
        }
    });
}
