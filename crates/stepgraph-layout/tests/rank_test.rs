use stepgraph_layout::graphlib::Graph;
use stepgraph_layout::{EdgeLabel, LayoutError, LayoutGraph, NodeLabel, rank};

fn ranks(g: &LayoutGraph) -> Vec<(String, i32)> {
    g.nodes()
        .map(|id| (id.to_string(), g.node(id).unwrap().rank.unwrap()))
        .collect()
}

fn assert_edges_point_down(g: &LayoutGraph) {
    for e in g.edges() {
        let v = g.node(&e.v).unwrap().rank.unwrap();
        let w = g.node(&e.w).unwrap().rank.unwrap();
        assert!(w > v, "edge {} -> {} is not downward: {v} -> {w}", e.v, e.w);
    }
}

#[test]
fn rank_a_single_node_is_zero() {
    let mut g: LayoutGraph = Graph::new();
    g.set_node("a", NodeLabel::default());
    rank::rank(&mut g).unwrap();
    assert_eq!(g.node("a").unwrap().rank, Some(0));
}

#[test]
fn rank_uses_longest_path_for_nodes_with_several_parents() {
    // a -> b -> c -> d and a -> d: plain BFS would put d on rank 1.
    let mut g: LayoutGraph = Graph::new();
    g.set_path(&["a", "b", "c", "d"]);
    g.set_edge("a", "d");
    rank::rank(&mut g).unwrap();
    assert_eq!(
        ranks(&g),
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("c".to_string(), 2),
            ("d".to_string(), 3),
        ]
    );
    assert_edges_point_down(&g);
}

#[test]
fn rank_re_enqueues_nodes_processed_before_a_deeper_parent() {
    // d is reached from a first (rank 1), then from the long chain (rank 4); e below d must follow.
    let mut g: LayoutGraph = Graph::new();
    g.set_edge("a", "d");
    g.set_path(&["a", "b", "c", "x", "d", "e"]);
    rank::rank(&mut g).unwrap();
    assert_eq!(g.node("d").unwrap().rank, Some(4));
    assert_eq!(g.node("e").unwrap().rank, Some(5));
    assert_edges_point_down(&g);
}

#[test]
fn rank_treats_every_source_as_rank_zero() {
    let mut g: LayoutGraph = Graph::new();
    g.set_path(&["a", "b"]);
    g.set_path(&["c", "d", "b"]);
    rank::rank(&mut g).unwrap();
    assert_eq!(g.node("a").unwrap().rank, Some(0));
    assert_eq!(g.node("c").unwrap().rank, Some(0));
    assert_eq!(g.node("b").unwrap().rank, Some(2));
}

#[test]
fn rank_respects_minlen() {
    let mut g: LayoutGraph = Graph::new();
    g.set_edge_with_label("a", "b", EdgeLabel { minlen: 3 });
    rank::rank(&mut g).unwrap();
    assert_eq!(g.node("b").unwrap().rank, Some(3));
}

#[test]
fn rank_reports_a_cycle_reachable_from_a_source() {
    let mut g: LayoutGraph = Graph::new();
    g.set_path(&["root", "a", "b", "c", "a"]);
    let err = rank::rank(&mut g).unwrap_err();
    match err {
        LayoutError::CycleDetected { cycle, enqueued, .. } => {
            assert_eq!(cycle, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
            assert!(enqueued > g.node_count());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rank_reports_a_cycle_with_no_source() {
    let mut g: LayoutGraph = Graph::new();
    g.set_path(&["a", "b", "a"]);
    let err = rank::rank(&mut g).unwrap_err();
    assert_eq!(
        err,
        LayoutError::Unreachable {
            nodes: vec!["a".to_string(), "b".to_string()]
        }
    );
}
