//! Query graph: the user-authored node/edge template of a search.
//!
//! - **Data model** ([`QueryGraph`], [`QueryGraphNode`], [`QueryGraphEdge`]) in the
//!   TRAPI JSON shape, with insertion order preserved
//! - **Store** ([`store`]): dispatch-based mutation interface plus an in-memory reducer
//! - **Display** ([`display`]): node/edge lists derived for the layout engine
//! - **Topology** ([`topology`]): starting node and node ordering for result tables
//!
//! Node positions are never stored here. The layout engine keeps them in its own
//! arena keyed by node id.

pub mod display;
pub mod store;
pub mod topology;

use serde::{Deserialize, Serialize};

use crate::error::QueryGraphError;
use crate::ordered_map::{self, Keyed};

/// Category used when a node declares none.
pub const UNIVERSAL_CATEGORY: &str = "biolink:NamedThing";

/// Predicate used when an edge declares none.
pub const UNIVERSAL_PREDICATE: &str = "biolink:related_to";

/// Result type for query graph operations.
pub type QueryGraphResult<T> = std::result::Result<T, QueryGraphError>;

/// A node template in the query graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryGraphNode {
    /// Node id, unique within the graph. Taken from the JSON object key.
    #[serde(skip)]
    pub id: String,
    /// Concrete entity identifiers this node is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Ontology class CURIEs, most specific first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_set: Option<bool>,
}

impl QueryGraphNode {
    /// Create an unbound node with no categories.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the node categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Bind the node to concrete entity ids.
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A node bound to one or more concrete entities.
    pub fn is_pinned(&self) -> bool {
        self.ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }

    /// The node's categories, or the universal category when none are set.
    pub fn effective_categories(&self) -> Vec<String> {
        if self.categories.is_empty() {
            vec![UNIVERSAL_CATEGORY.to_string()]
        } else {
            self.categories.clone()
        }
    }

    /// The most specific category, defaulting to the universal category.
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(UNIVERSAL_CATEGORY)
    }
}

impl Keyed for QueryGraphNode {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// A single qualifier constraint value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub qualifier_type_id: String,
    pub qualifier_value: String,
}

/// One alternative set of qualifiers; an edge matches if any set matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierConstraint {
    #[serde(default)]
    pub qualifier_set: Vec<Qualifier>,
}

/// An edge template in the query graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryGraphEdge {
    /// Edge id, unique within the graph. Taken from the JSON object key.
    #[serde(skip)]
    pub id: String,
    pub subject: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualifier_constraints: Vec<QualifierConstraint>,
}

impl QueryGraphEdge {
    pub fn new(id: impl Into<String>, subject: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            object: object.into(),
            ..Default::default()
        }
    }

    pub fn with_predicates<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates = predicates.into_iter().map(Into::into).collect();
        self
    }

    /// The first predicate, defaulting to the universal predicate.
    pub fn primary_predicate(&self) -> &str {
        self.predicates
            .first()
            .map(String::as_str)
            .unwrap_or(UNIVERSAL_PREDICATE)
    }

    /// Whether the edge touches the given node on either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.subject == node_id || self.object == node_id
    }

    /// Whether any qualifier set carries at least one qualifier.
    pub fn has_qualifiers(&self) -> bool {
        self.qualifier_constraints
            .first()
            .is_some_and(|c| !c.qualifier_set.is_empty())
    }
}

impl Keyed for QueryGraphEdge {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// Which end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Subject,
    Object,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Subject => write!(f, "subject"),
            Endpoint::Object => write!(f, "object"),
        }
    }
}

/// The query graph: nodes and edges in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryGraph {
    #[serde(default, with = "ordered_map::keyed")]
    pub nodes: Vec<QueryGraphNode>,
    #[serde(default, with = "ordered_map::keyed")]
    pub edges: Vec<QueryGraphEdge>,
}

impl QueryGraph {
    /// Create an empty query graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TRAPI query graph from JSON.
    pub fn from_json(json: &str) -> QueryGraphResult<Self> {
        serde_json::from_str(json).map_err(|e| QueryGraphError::Parse {
            message: e.to_string(),
        })
    }

    pub fn node(&self, id: &str) -> Option<&QueryGraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut QueryGraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&QueryGraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut QueryGraphEdge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Edges attached to the given node, in insertion order.
    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a QueryGraphEdge> {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    /// Check structural validity: every edge end resolves and no edge loops.
    ///
    /// Returns every problem found, in edge order. An empty list means valid.
    pub fn validate(&self) -> Vec<QueryGraphError> {
        let mut problems = Vec::new();
        for edge in &self.edges {
            for node in [&edge.subject, &edge.object] {
                if !self.contains_node(node) {
                    problems.push(QueryGraphError::DanglingReference {
                        edge: edge.id.clone(),
                        node: node.clone(),
                    });
                }
            }
            if edge.subject == edge.object {
                problems.push(QueryGraphError::SelfLoop {
                    edge: edge.id.clone(),
                    node: edge.subject.clone(),
                });
            }
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Lowest unused id of the form `{prefix}{i}`.
    pub(crate) fn next_id(&self, prefix: &str) -> String {
        let taken = |candidate: &str| match prefix {
            "n" => self.contains_node(candidate),
            _ => self.edge(candidate).is_some(),
        };
        (0..)
            .map(|i| format!("{prefix}{i}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| format!("{prefix}{}", self.nodes.len() + self.edges.len()))
    }
}
