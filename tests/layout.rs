use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use qgraph::layout::{LayoutConfig, LayoutEngine, Point, Viewport};
use qgraph::query_graph::display::DisplayGraph;
use qgraph::query_graph::{QueryGraph, QueryGraphEdge, QueryGraphNode};
use qgraph::style::NoColors;

fn graph(nodes: usize, edges: &[(usize, usize)]) -> QueryGraph {
    let mut qg = QueryGraph::new();
    for i in 0..nodes {
        qg.nodes.push(QueryGraphNode::new(format!("n{i}")));
    }
    for (i, &(s, o)) in edges.iter().enumerate() {
        qg.edges
            .push(QueryGraphEdge::new(format!("e{i}"), format!("n{s}"), format!("n{o}")));
    }
    qg
}

fn engine(qg: &QueryGraph, seed: u64) -> LayoutEngine {
    let config = LayoutConfig {
        seed: Some(seed),
        ..Default::default()
    };
    let mut engine = LayoutEngine::new(Viewport::new(800.0, 600.0).unwrap(), config).unwrap();
    engine.reseed(&DisplayGraph::derive(qg, &[], &NoColors));
    engine
}

#[test]
fn parallel_edges_fan_out_symmetrically() {
    let qg = graph(2, &[(0, 1), (0, 1), (0, 1)]);
    let mut engine = engine(&qg, 1);
    engine.place("n0", Point::new(200.0, 300.0));
    engine.place("n1", Point::new(600.0, 300.0));

    let frame = engine.frame();
    let mids: Vec<Point> = ["e0", "e1", "e2"]
        .iter()
        .map(|id| frame.edge(id).unwrap().midpoint)
        .collect();

    assert_abs_diff_eq!(mids[1].x, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(mids[1].y, 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(mids[0].x, mids[2].x, epsilon = 1e-9);
    assert_abs_diff_eq!(mids[0].y - 300.0, 300.0 - mids[2].y, epsilon = 1e-9);
    assert!((mids[0].y - mids[2].y).abs() > 1.0);
}

#[test]
fn opposite_edges_do_not_overlap() {
    let qg = graph(2, &[(0, 1), (1, 0)]);
    let mut engine = engine(&qg, 2);
    engine.place("n0", Point::new(200.0, 300.0));
    engine.place("n1", Point::new(600.0, 300.0));

    let frame = engine.frame();
    let forward = frame.edge("e0").unwrap().midpoint;
    let backward = frame.edge("e1").unwrap().midpoint;
    assert_abs_diff_eq!(forward.x, backward.x, epsilon = 1e-9);
    assert_abs_diff_eq!(forward.y - 300.0, 300.0 - backward.y, epsilon = 1e-9);
    assert!((forward.y - backward.y).abs() > 1.0);
}

#[test]
fn a_linked_pair_settles_near_the_rest_length() {
    let qg = graph(2, &[(0, 1)]);
    let mut engine = engine(&qg, 9);
    let mut ticks = 0;
    while engine.step() {
        ticks += 1;
    }
    assert!(engine.is_settled());
    assert!((299..=301).contains(&ticks), "ticks {ticks}");

    let a = engine.position("n0").unwrap();
    let b = engine.position("n1").unwrap();
    assert!((a.distance(b) - 225.0).abs() < 40.0, "distance {}", a.distance(b));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn nodes_stay_inside_the_viewport(len in 1usize..8, seed in any::<u64>(), ticks in 1usize..80) {
        let edges: Vec<(usize, usize)> = (1..len).map(|i| (i - 1, i)).collect();
        let qg = graph(len, &edges);
        let mut engine = engine(&qg, seed);
        for _ in 0..ticks {
            engine.step();
        }
        let frame = engine.frame();
        prop_assert_eq!(frame.nodes.len(), len);
        for node in &frame.nodes {
            prop_assert!(node.x.is_finite() && node.y.is_finite());
            prop_assert!(node.x >= node.radius && node.x <= frame.width - node.radius);
            prop_assert!(node.y >= node.radius && node.y <= frame.height - node.radius);
        }
        for edge in &frame.edges {
            for handle in [edge.source_handle, edge.target_handle] {
                prop_assert!(handle.x >= 0.0 && handle.x <= frame.width);
                prop_assert!(handle.y >= 0.0 && handle.y <= frame.height);
            }
        }
    }
}
