//! Query graph ordering for result tables.
//!
//! Picks a root node and walks outward from it so table columns follow the
//! shape of the query. Cyclic or disconnected graphs get a best-effort order:
//! unreachable nodes are appended in insertion order.

use std::collections::{HashMap, HashSet};

use super::QueryGraph;

/// Number of edge ends attached to each node. Dangling ends are counted too.
pub fn edges_per_node(graph: &QueryGraph) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *counts.entry(edge.subject.as_str()).or_default() += 1;
        *counts.entry(edge.object.as_str()).or_default() += 1;
    }
    counts
}

/// Choose the node a topological walk should start from.
///
/// Rules, in order:
/// 1. pinned nodes (bound to entities) before unpinned ones
/// 2. fewer connected edges first
/// 3. insertion order breaks ties
///
/// Nodes without any edge are only chosen when no connected node exists, in
/// which case the first node wins. Returns `None` for an empty graph.
pub fn find_starting_node(graph: &QueryGraph) -> Option<&str> {
    let counts = edges_per_node(graph);
    let connected = |pinned: bool| {
        graph
            .nodes
            .iter()
            .filter(|n| n.is_pinned() == pinned)
            .filter_map(|n| counts.get(n.id.as_str()).map(|&c| (n.id.as_str(), c)))
            // min_by_key keeps the first of equal minima.
            .min_by_key(|&(_, c)| c)
            .map(|(id, _)| id)
    };
    connected(true)
        .or_else(|| connected(false))
        .or_else(|| graph.nodes.first().map(|n| n.id.as_str()))
}

/// Order nodes by a depth-first walk from `start`.
///
/// At each node, attached edges are visited in insertion order; for each edge
/// the object is explored before the subject. Nodes unreachable from `start`
/// follow in insertion order.
pub fn sort_nodes(graph: &QueryGraph, start: &str) -> Vec<String> {
    let mut order: Vec<String> = vec![start.to_string()];
    let mut seen: HashSet<&str> = HashSet::from([start]);

    // Explicit stack of (node, next edge position, subject pending for that edge).
    let mut stack: Vec<(&str, usize, bool)> = vec![(start, 0, false)];
    while let Some(frame) = stack.last_mut() {
        let (node, pos, subject_pending) = *frame;
        let attached: Vec<_> = graph.edges_touching(node).collect();
        let Some(edge) = attached.get(pos) else {
            stack.pop();
            continue;
        };

        let next = if subject_pending {
            frame.1 += 1;
            frame.2 = false;
            edge.subject.as_str()
        } else {
            frame.2 = true;
            edge.object.as_str()
        };

        if seen.insert(next) {
            order.push(next.to_string());
            stack.push((next, 0, false));
        }
    }

    order.extend(
        graph
            .nodes
            .iter()
            .filter(|n| !seen.contains(n.id.as_str()))
            .map(|n| n.id.clone()),
    );
    order
}

/// Convenience: starting node plus full ordering.
pub fn topological_order(graph: &QueryGraph) -> Vec<String> {
    match find_starting_node(graph) {
        Some(start) => sort_nodes(graph, start),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_graph::{QueryGraphEdge, QueryGraphNode};

    fn graph(nodes: &[(&str, bool)], edges: &[(&str, &str)]) -> QueryGraph {
        let mut qg = QueryGraph::new();
        for &(id, pinned) in nodes {
            let mut node = QueryGraphNode::new(id);
            if pinned {
                node = node.with_ids(["MONDO:0004979"]);
            }
            qg.nodes.push(node);
        }
        for (i, &(s, o)) in edges.iter().enumerate() {
            qg.edges.push(QueryGraphEdge::new(format!("e{i}"), s, o));
        }
        qg
    }

    #[test]
    fn empty_graph_has_no_start() {
        assert_eq!(find_starting_node(&QueryGraph::new()), None);
        assert!(topological_order(&QueryGraph::new()).is_empty());
    }

    #[test]
    fn insertion_order_breaks_ties() {
        let qg = graph(&[("n0", false), ("n1", false)], &[("n0", "n1")]);
        assert_eq!(find_starting_node(&qg), Some("n0"));
    }

    #[test]
    fn pinned_nodes_win() {
        let qg = graph(
            &[("n0", false), ("n1", false), ("n2", true)],
            &[("n0", "n1"), ("n1", "n2")],
        );
        assert_eq!(find_starting_node(&qg), Some("n2"));
    }

    #[test]
    fn fewer_edges_win_among_unpinned() {
        let qg = graph(
            &[("n0", false), ("n1", false), ("n2", false)],
            &[("n0", "n1"), ("n1", "n2"), ("n0", "n2")],
        );
        // n0:2, n1:2, n2:2 → first in insertion order.
        assert_eq!(find_starting_node(&qg), Some("n0"));

        let chain = graph(
            &[("n0", false), ("n1", false), ("n2", false)],
            &[("n1", "n0"), ("n1", "n2")],
        );
        assert_eq!(find_starting_node(&chain), Some("n0"));
    }

    #[test]
    fn isolated_nodes_fall_back_to_first() {
        let qg = graph(&[("n0", false), ("n1", false)], &[]);
        assert_eq!(find_starting_node(&qg), Some("n0"));
    }

    #[test]
    fn walk_follows_objects_then_subjects() {
        // n2 → n0 ← n1, n0 → n3
        let qg = graph(
            &[("n0", false), ("n1", false), ("n2", false), ("n3", false)],
            &[("n2", "n0"), ("n1", "n0"), ("n0", "n3")],
        );
        assert_eq!(sort_nodes(&qg, "n0"), ["n0", "n2", "n1", "n3"]);
    }

    #[test]
    fn cycles_terminate_and_detached_nodes_trail() {
        let qg = graph(
            &[("n0", false), ("n1", false), ("n2", false), ("n3", false)],
            &[("n0", "n1"), ("n1", "n2"), ("n2", "n0")],
        );
        assert_eq!(sort_nodes(&qg, "n0"), ["n0", "n1", "n2", "n3"]);
    }
}
