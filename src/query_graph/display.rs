//! Display lists derived from the query graph.
//!
//! Rebuilt from scratch on every model change. Edges whose ends do not
//! resolve are dropped here, so a graph caught mid-mutation renders without
//! them instead of failing.

use std::collections::HashMap;

use serde::Serialize;

use crate::ontology::names;
use crate::style::CategoryColorMap;

use super::{QueryGraph, UNIVERSAL_PREDICATE};

/// A node as drawn by the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNode {
    pub id: String,
    /// Categories, defaulting to the universal category.
    pub categories: Vec<String>,
    pub name: Option<String>,
    pub is_set: bool,
    /// Bound to concrete entities.
    pub pinned: bool,
    /// Text drawn inside the node.
    pub label: String,
    pub color: String,
}

/// An edge as drawn by the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayEdge {
    pub id: String,
    pub subject: String,
    pub object: String,
    pub predicates: Vec<String>,
    /// Number of edges between the same unordered node pair.
    pub num_edges: usize,
    /// Position of this edge within its parallel group.
    pub index: usize,
    /// Runs opposite to the first edge of its parallel group.
    pub reversed: bool,
    /// The edge's predicates that the ontology flags as symmetric.
    pub symmetric: Vec<String>,
}

impl DisplayEdge {
    /// Whether the edge is drawn with an arrowhead.
    ///
    /// Edges whose every predicate is symmetric have no direction to show.
    pub fn has_arrow(&self) -> bool {
        let predicate_count = self.predicates.len().max(1);
        self.symmetric.len() < predicate_count
    }

    /// Signed position within the parallel group, centred on zero.
    pub fn fan_offset(&self) -> f64 {
        let k = self.index as f64 - (self.num_edges.max(1) as f64 - 1.0) / 2.0;
        if self.reversed { -k } else { k }
    }
}

/// Node and edge lists handed to the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayGraph {
    pub nodes: Vec<DisplayNode>,
    pub edges: Vec<DisplayEdge>,
}

impl DisplayGraph {
    /// Derive display lists from the query graph.
    pub fn derive(
        graph: &QueryGraph,
        symmetric_predicates: &[String],
        colors: &dyn CategoryColorMap,
    ) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| {
                let categories = node.effective_categories();
                let (category_label, color) = colors.color(&categories);
                let label = node
                    .name
                    .clone()
                    .or_else(|| {
                        node.ids
                            .as_ref()
                            .and_then(|ids| ids.first().cloned())
                    })
                    .or(category_label)
                    .unwrap_or_else(|| names::display_category(&categories[0]));
                DisplayNode {
                    id: node.id.clone(),
                    pinned: node.is_pinned(),
                    name: node.name.clone(),
                    is_set: node.is_set.unwrap_or(false),
                    categories,
                    label,
                    color,
                }
            })
            .collect();

        // Parallel groups keyed by unordered node pair; the first edge of each
        // group fixes the canonical direction.
        let mut groups: HashMap<(&str, &str), (String, usize)> = HashMap::new();
        let mut slots: Vec<usize> = Vec::with_capacity(graph.edges.len());
        let mut resolved = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            if !graph.contains_node(&edge.subject) || !graph.contains_node(&edge.object) {
                tracing::debug!(edge = %edge.id, "skipping edge with unresolved endpoint");
                continue;
            }
            let key = if edge.subject <= edge.object {
                (edge.subject.as_str(), edge.object.as_str())
            } else {
                (edge.object.as_str(), edge.subject.as_str())
            };
            let group = groups.entry(key).or_insert_with(|| (edge.subject.clone(), 0));
            slots.push(group.1);
            group.1 += 1;
            resolved.push((edge, key, group.0.clone()));
        }

        let edges = resolved
            .into_iter()
            .zip(slots)
            .map(|((edge, key, canonical_subject), index)| {
                let predicates = if edge.predicates.is_empty() {
                    vec![UNIVERSAL_PREDICATE.to_string()]
                } else {
                    edge.predicates.clone()
                };
                let symmetric = predicates
                    .iter()
                    .filter(|p| symmetric_predicates.contains(p))
                    .cloned()
                    .collect();
                DisplayEdge {
                    id: edge.id.clone(),
                    subject: edge.subject.clone(),
                    object: edge.object.clone(),
                    num_edges: groups.get(&key).map_or(1, |g| g.1),
                    index,
                    reversed: edge.subject != canonical_subject,
                    predicates,
                    symmetric,
                }
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&DisplayEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_graph::{QueryGraphEdge, QueryGraphNode};
    use crate::style::NoColors;

    fn pair_graph() -> QueryGraph {
        let mut qg = QueryGraph::new();
        qg.nodes.push(QueryGraphNode::new("n0").with_categories(["biolink:Gene"]));
        qg.nodes.push(QueryGraphNode::new("n1").with_name("asthma"));
        qg.edges.push(QueryGraphEdge::new("e0", "n0", "n1").with_predicates(["biolink:affects"]));
        qg.edges.push(QueryGraphEdge::new("e1", "n1", "n0"));
        qg.edges.push(QueryGraphEdge::new("e2", "n0", "n1"));
        qg
    }

    #[test]
    fn parallel_edges_are_counted_and_indexed() {
        let display = DisplayGraph::derive(&pair_graph(), &[], &NoColors);
        let summary: Vec<(usize, usize, bool)> = display
            .edges
            .iter()
            .map(|e| (e.num_edges, e.index, e.reversed))
            .collect();
        assert_eq!(summary, [(3, 0, false), (3, 1, true), (3, 2, false)]);
        assert_eq!(display.edges[0].fan_offset(), -1.0);
        assert_eq!(display.edges[1].fan_offset(), 0.0);
        assert_eq!(display.edges[2].fan_offset(), 1.0);
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let mut qg = pair_graph();
        qg.edges.push(QueryGraphEdge::new("e3", "n0", "gone"));
        let display = DisplayGraph::derive(&qg, &[], &NoColors);
        assert_eq!(display.edges.len(), 3);
        assert!(display.edge("e3").is_none());
    }

    #[test]
    fn labels_and_default_categories() {
        let display = DisplayGraph::derive(&pair_graph(), &[], &NoColors);
        assert_eq!(display.nodes[0].label, "Gene");
        assert_eq!(display.nodes[1].label, "asthma");
        assert_eq!(display.nodes[1].categories, ["biolink:NamedThing"]);
    }

    #[test]
    fn symmetric_predicates_drop_the_arrow() {
        let symmetric = vec!["biolink:related_to".to_string()];
        let display = DisplayGraph::derive(&pair_graph(), &symmetric, &NoColors);
        assert!(display.edge("e0").unwrap().has_arrow());
        assert!(!display.edge("e1").unwrap().has_arrow());
    }
}
