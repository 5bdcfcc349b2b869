//! Graph container APIs.
//!
//! The container is directed and simple (at most one edge per ordered `(v, w)` pair). Adjacency
//! lists are maintained eagerly on insert since the layout engine queries successors in a tight
//! work-queue loop.

mod edge_key;
mod entries;

pub mod alg;

pub use edge_key::EdgeKey;

use edge_key::EdgeKeyView;
use entries::{EdgeEntry, NodeEntry};
use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

pub struct Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    graph_label: G,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    // Edge indices per node index, in insertion order.
    out: Vec<Vec<usize>>,
    in_: Vec<Vec<usize>>,
}

impl<N, E, G> Default for Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E, G> Clone for Graph<N, E, G>
where
    N: Default + Clone,
    E: Default + Clone,
    G: Default + Clone,
{
    fn clone(&self) -> Self {
        Self {
            graph_label: self.graph_label.clone(),
            nodes: self.nodes.clone(),
            node_index: self.node_index.clone(),
            edges: self.edges.clone(),
            edge_index: self.edge_index.clone(),
            out: self.out.clone(),
            in_: self.in_.clone(),
        }
    }
}

impl<N, E, G> std::fmt::Debug for Graph<N, E, G>
where
    N: Default + std::fmt::Debug,
    E: Default + std::fmt::Debug,
    G: Default + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("graph", &self.graph_label)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish()
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new() -> Self {
        Self {
            graph_label: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            out: Vec::new(),
            in_: Vec::new(),
        }
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one (keeping its position in
    /// insertion order).
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self.out.push(Vec::new());
        self.in_.push(Vec::new());
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, N::default())
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    /// Insertion index of a node.
    pub fn node_ix(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(&str, &N),
    {
        for n in &self.nodes {
            f(&n.id, &n.label);
        }
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &mut N),
    {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_with_label(v, w, E::default())
    }

    /// Inserts an edge (creating missing endpoints), or replaces the label of an existing one.
    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        if let Some(idx) = self.edge_index_of(&v, &w) {
            self.edges[idx].label = label;
            return self;
        }

        self.ensure_node(v.clone());
        self.ensure_node(w.clone());
        let (Some(v_ix), Some(w_ix)) = (self.node_ix(&v), self.node_ix(&w)) else {
            return self;
        };

        let key = EdgeKey::new(v, w);
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            v_ix,
            w_ix,
            label,
        });
        self.edge_index.insert(key, idx);
        self.out[v_ix].push(idx);
        self.in_[w_ix].push(idx);
        self
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    fn edge_index_of(&self, v: &str, w: &str) -> Option<usize> {
        self.edge_index.get(&EdgeKeyView { v, w }).copied()
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        self.edge_index_of(v, w).is_some()
    }

    pub fn edge(&self, v: &str, w: &str) -> Option<&E> {
        self.edge_index_of(v, w).map(|idx| &self.edges[idx].label)
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(v_ix) = self.node_ix(v) else {
            return Vec::new();
        };
        self.out[v_ix]
            .iter()
            .map(|&edge_idx| self.edges[edge_idx].key.w.as_str())
            .collect()
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        let Some(v_ix) = self.node_ix(v) else {
            return Vec::new();
        };
        self.in_[v_ix]
            .iter()
            .map(|&edge_idx| self.edges[edge_idx].key.v.as_str())
            .collect()
    }

    /// Successor node indices of the node at `v_ix`.
    pub fn successor_ixs(&self, v_ix: usize) -> impl Iterator<Item = usize> + '_ {
        self.out
            .get(v_ix)
            .into_iter()
            .flatten()
            .map(|&edge_idx| self.edges[edge_idx].w_ix)
    }

    /// Out-edges of the node at `v_ix` as `(target index, label)` pairs.
    pub fn out_edge_ixs(&self, v_ix: usize) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.out.get(v_ix).into_iter().flatten().map(|&edge_idx| {
            let e = &self.edges[edge_idx];
            (e.w_ix, &e.label)
        })
    }

    pub fn in_degree(&self, v: &str) -> usize {
        self.node_ix(v).map(|ix| self.in_[ix].len()).unwrap_or(0)
    }

    pub fn out_degree(&self, v: &str) -> usize {
        self.node_ix(v).map(|ix| self.out[ix].len()).unwrap_or(0)
    }

    /// Nodes with in-degree 0, in insertion order.
    pub fn sources(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .zip(&self.in_)
            .filter(|(_, in_edges)| in_edges.is_empty())
            .map(|(n, _)| n.id.as_str())
            .collect()
    }

    pub fn sinks(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .zip(&self.out)
            .filter(|(_, out_edges)| out_edges.is_empty())
            .map(|(n, _)| n.id.as_str())
            .collect()
    }
}
