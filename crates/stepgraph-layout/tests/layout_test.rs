use stepgraph_layout::graphlib::Graph;
use stepgraph_layout::{GraphLabel, LayoutGraph, NodeLabel, RankDir, layout, layout_or_grid};
use std::collections::BTreeMap;

fn coords(g: &LayoutGraph) -> BTreeMap<String, (f64, f64)> {
    g.nodes()
        .map(|id| {
            let n = g.node(id).unwrap();
            (id.to_string(), (n.x.unwrap(), n.y.unwrap()))
        })
        .collect()
}

fn tree(rankdir: RankDir) -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new();
    g.set_graph(GraphLabel {
        rankdir,
        nodesep: 10.0,
        ranksep: 20.0,
        ..Default::default()
    });
    for id in ["a", "b", "c"] {
        g.set_node(id, NodeLabel::sized(50.0, 30.0));
    }
    g.set_edge("a", "b");
    g.set_edge("a", "c");
    g
}

#[test]
fn layout_can_layout_a_single_node() {
    let mut g: LayoutGraph = Graph::new();
    g.set_node("a", NodeLabel::sized(50.0, 100.0));
    layout(&mut g).unwrap();
    assert_eq!(coords(&g), [("a".to_string(), (25.0, 50.0))].into());
}

#[test]
fn layout_top_bottom_centres_the_parent_over_its_children() {
    let mut g = tree(RankDir::TB);
    layout(&mut g).unwrap();
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (55.0, 15.0)),
            ("b".to_string(), (25.0, 65.0)),
            ("c".to_string(), (85.0, 65.0)),
        ]
        .into()
    );
    assert_eq!(g.node("c").unwrap().order, Some(1));
}

#[test]
fn layout_bottom_top_flips_the_rank_axis() {
    let mut g = tree(RankDir::BT);
    layout(&mut g).unwrap();
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (55.0, 65.0)),
            ("b".to_string(), (25.0, 15.0)),
            ("c".to_string(), (85.0, 15.0)),
        ]
        .into()
    );
}

#[test]
fn layout_left_right_swaps_axes() {
    let mut g = tree(RankDir::LR);
    layout(&mut g).unwrap();
    assert_eq!(
        coords(&g),
        [
            ("a".to_string(), (25.0, 35.0)),
            ("b".to_string(), (95.0, 15.0)),
            ("c".to_string(), (95.0, 55.0)),
        ]
        .into()
    );
    // Box sizes are restored after the rotation.
    assert_eq!(g.node("a").unwrap().width, 50.0);
    assert_eq!(g.node("a").unwrap().height, 30.0);
}

#[test]
fn layout_right_left_puts_the_root_on_the_right() {
    let mut g = tree(RankDir::RL);
    layout(&mut g).unwrap();
    let c = coords(&g);
    assert_eq!(c["a"], (95.0, 35.0));
    assert_eq!(c["b"], (25.0, 15.0));
}

#[test]
fn layout_rank_is_direction_independent() {
    for dir in [RankDir::TB, RankDir::BT, RankDir::LR, RankDir::RL] {
        let mut g = tree(dir);
        layout(&mut g).unwrap();
        assert_eq!(g.node("a").unwrap().rank, Some(0));
        assert_eq!(g.node("b").unwrap().rank, Some(1));
        assert_eq!(g.node("c").unwrap().rank, Some(1));
    }
}

#[test]
fn layout_is_idempotent() {
    for dir in [RankDir::TB, RankDir::BT, RankDir::LR, RankDir::RL] {
        let mut g = tree(dir);
        layout(&mut g).unwrap();
        let first = coords(&g);
        layout(&mut g).unwrap();
        assert_eq!(coords(&g), first, "drift for {dir}");
    }
}

#[test]
fn layout_applies_margins() {
    let mut g = tree(RankDir::TB);
    g.graph_mut().marginx = 5.0;
    g.graph_mut().marginy = 7.0;
    layout(&mut g).unwrap();
    assert_eq!(coords(&g)["b"], (30.0, 72.0));
}

#[test]
fn layout_or_grid_falls_back_on_cycles() {
    let mut g: LayoutGraph = Graph::new();
    for id in ["a", "b", "c", "d", "e"] {
        g.set_node(id, NodeLabel::sized(10.0, 10.0));
    }
    g.set_path(&["a", "b", "c", "a"]);

    let err = layout_or_grid(&mut g);
    assert!(err.is_some());
    let c = coords(&g);
    // 5 nodes -> 3 columns.
    assert_eq!(c["a"], (5.0, 5.0));
    assert_eq!(c["c"], (105.0, 5.0));
    assert_eq!(c["d"], (5.0, 75.0));
    assert!(g.node("a").unwrap().rank.is_none());
}

#[test]
fn layout_or_grid_returns_none_for_acyclic_graphs() {
    let mut g = tree(RankDir::TB);
    assert!(layout_or_grid(&mut g).is_none());
}
