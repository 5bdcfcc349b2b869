//! Rank assignment.
//!
//! Longest path from any source: every in-degree-0 node starts at rank 0 and each edge `u -> v`
//! relaxes `rank(v) = max(rank(v), rank(u) + minlen)`. A node whose rank increases is pushed back
//! onto the work queue even if it was already processed, which is what makes nodes with several
//! incoming edges settle below their deepest parent.
//!
//! On an acyclic graph a node's rank can increase at most `|V| - 1` times. A node enqueued more
//! than `|V|` times therefore sits on a cycle, and ranking stops with
//! [`LayoutError::CycleDetected`] instead of looping forever.

use crate::graphlib::alg;
use crate::{LayoutError, LayoutGraph, Result};
use std::collections::VecDeque;

pub fn rank(g: &mut LayoutGraph) -> Result<()> {
    let ranks = longest_path_ranks(g)?;
    let mut ranks = ranks.into_iter();
    g.for_each_node_mut(|_id, n| {
        n.rank = ranks.next();
    });
    Ok(())
}

/// Computes ranks indexed by node insertion order, without mutating the graph.
pub fn longest_path_ranks(g: &LayoutGraph) -> Result<Vec<i32>> {
    let n = g.node_count();
    let mut ranks: Vec<Option<i32>> = vec![None; n];
    let mut enqueued: Vec<usize> = vec![0; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for (ix, id) in g.nodes().enumerate() {
        if g.in_degree(id) == 0 {
            ranks[ix] = Some(0);
            enqueued[ix] = 1;
            queue.push_back(ix);
        }
    }

    while let Some(u) = queue.pop_front() {
        let r_u = ranks[u].unwrap_or(0);
        for (v, label) in g.out_edge_ixs(u) {
            let candidate = r_u.saturating_add(label.minlen.max(1) as i32);
            if ranks[v].is_some_and(|r_v| r_v >= candidate) {
                continue;
            }
            ranks[v] = Some(candidate);
            enqueued[v] += 1;
            if enqueued[v] > n {
                return Err(cycle_error(g, v, enqueued[v]));
            }
            queue.push_back(v);
        }
    }

    let mut out: Vec<i32> = Vec::with_capacity(n);
    let mut unranked: Vec<String> = Vec::new();
    for (id, r) in g.nodes().zip(&ranks) {
        match r {
            Some(r) => out.push(*r),
            None => unranked.push(id.to_string()),
        }
    }
    if !unranked.is_empty() {
        return Err(LayoutError::Unreachable { nodes: unranked });
    }
    Ok(out)
}

fn cycle_error(g: &LayoutGraph, v_ix: usize, enqueued: usize) -> LayoutError {
    let node = g.nodes().nth(v_ix).unwrap_or_default().to_string();
    let cycle = alg::find_cycles(g)
        .into_iter()
        .find(|c| c.contains(&node))
        .unwrap_or_default();
    LayoutError::CycleDetected {
        node,
        enqueued,
        cycle,
    }
}
