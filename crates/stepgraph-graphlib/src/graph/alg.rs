//! Helper algorithms over [`Graph`].

use super::Graph;
use std::collections::BTreeSet;

/// Depth-first preorder from `roots`, following out-edges in insertion order.
pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut out: Vec<String> = Vec::new();
    for r in roots {
        if !g.has_node(r) {
            continue;
        }
        // Explicit stack: traces can produce call chains deep enough to overflow recursion.
        let mut stack: Vec<&str> = vec![*r];
        while let Some(v) = stack.pop() {
            if !visited.insert(v.to_string()) {
                continue;
            }
            out.push(v.to_string());
            for w in g.successors(v).into_iter().rev() {
                if !visited.contains(w) {
                    stack.push(w);
                }
            }
        }
    }
    out
}

/// Strongly connected components with more than one node, plus self-loops.
///
/// Members of each cycle are reported in node insertion order.
pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default,
    E: Default,
    G: Default,
{
    struct Tarjan<'a, N, E, G>
    where
        N: Default,
        E: Default,
        G: Default,
    {
        g: &'a Graph<N, E, G>,
        index: usize,
        stack: Vec<usize>,
        on_stack: Vec<bool>,
        indices: Vec<Option<usize>>,
        lowlink: Vec<usize>,
        sccs: Vec<Vec<usize>>,
    }

    impl<N, E, G> Tarjan<'_, N, E, G>
    where
        N: Default,
        E: Default,
        G: Default,
    {
        fn strongconnect(&mut self, v: usize) {
            self.indices[v] = Some(self.index);
            self.lowlink[v] = self.index;
            self.index += 1;
            self.stack.push(v);
            self.on_stack[v] = true;

            let succ: Vec<usize> = self.g.successor_ixs(v).collect();
            for w in succ {
                match self.indices[w] {
                    None => {
                        self.strongconnect(w);
                        self.lowlink[v] = self.lowlink[v].min(self.lowlink[w]);
                    }
                    Some(w_idx) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(w_idx);
                    }
                    Some(_) => {}
                }
            }

            if Some(self.lowlink[v]) == self.indices[v] {
                let mut scc: Vec<usize> = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack[w] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                self.sccs.push(scc);
            }
        }
    }

    let n = g.node_count();
    let mut tarjan = Tarjan {
        g,
        index: 0,
        stack: Vec::new(),
        on_stack: vec![false; n],
        indices: vec![None; n],
        lowlink: vec![0; n],
        sccs: Vec::new(),
    };
    for v in 0..n {
        if tarjan.indices[v].is_none() {
            tarjan.strongconnect(v);
        }
    }

    let ids = g.node_ids();
    let mut cycles: Vec<Vec<String>> = Vec::new();
    for mut scc in tarjan.sccs {
        let is_cycle = scc.len() > 1 || g.has_edge(&ids[scc[0]], &ids[scc[0]]);
        if !is_cycle {
            continue;
        }
        scc.sort_unstable();
        cycles.push(scc.into_iter().map(|ix| ids[ix].clone()).collect());
    }
    cycles.sort_by(|a, b| a.first().cmp(&b.first()));
    cycles
}

pub fn is_acyclic<N, E, G>(g: &Graph<N, E, G>) -> bool
where
    N: Default,
    E: Default,
    G: Default,
{
    find_cycles(g).is_empty()
}

/// Nodes not reachable from any in-degree-0 node.
pub fn unreachable_from_sources<N, E, G>(g: &Graph<N, E, G>) -> Vec<String>
where
    N: Default,
    E: Default,
    G: Default,
{
    let sources = g.sources();
    let reached: BTreeSet<String> = preorder(g, &sources).into_iter().collect();
    g.nodes()
        .filter(|v| !reached.contains(*v))
        .map(str::to_string)
        .collect()
}
