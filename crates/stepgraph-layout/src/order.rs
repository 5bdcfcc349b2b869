//! In-rank ordering.
//!
//! Nodes within a rank keep their creation (insertion) order. Trace graphs are small trees or
//! near-trees where creation order already reads naturally left-to-right, and a stable order
//! keeps nodes from jumping around between playback steps.

use crate::LayoutGraph;
use std::collections::BTreeMap;

pub fn order(g: &mut LayoutGraph) {
    let mut next_in_rank: BTreeMap<i32, usize> = BTreeMap::new();
    g.for_each_node_mut(|_id, n| {
        let Some(rank) = n.rank else {
            return;
        };
        let slot = next_in_rank.entry(rank).or_insert(0);
        n.order = Some(*slot);
        *slot += 1;
    });
}

/// Node ids grouped by rank, each group sorted by `order`.
pub fn layers(g: &LayoutGraph) -> Vec<Vec<String>> {
    let mut by_rank: BTreeMap<i32, Vec<(usize, String)>> = BTreeMap::new();
    g.for_each_node(|id, n| {
        if let Some(rank) = n.rank {
            by_rank
                .entry(rank)
                .or_default()
                .push((n.order.unwrap_or(usize::MAX), id.to_string()));
        }
    });
    by_rank
        .into_values()
        .map(|mut ids| {
            ids.sort_by_key(|(order, _)| *order);
            ids.into_iter().map(|(_, id)| id).collect()
        })
        .collect()
}
