//! Dispatch-based query graph store.
//!
//! The store is the single authority over the query graph. The editor only
//! reads it and proposes [`Intent`]s; the store validates each intent
//! synchronously and answers with either an [`Applied`] report or a rejection,
//! so callers can correct their visuals in the same frame.

use serde::{Deserialize, Serialize};

use crate::error::QueryGraphError;

use super::{Endpoint, QualifierConstraint, QueryGraph, QueryGraphEdge, QueryGraphNode, QueryGraphResult};

/// Node properties carried by add/edit intents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProps {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub ids: Option<Vec<String>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_set: Option<bool>,
}

impl NodeProps {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            categories: vec![category.into()],
            ..Default::default()
        }
    }
}

/// A requested mutation of the query graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Intent {
    AddNode { node: NodeProps },
    EditNode { id: String, node: NodeProps },
    /// Delete a node together with every edge attached to it.
    DeleteNode { id: String },
    AddEdge { subject: String, object: String },
    DeleteEdge { id: String },
    /// Rebind one end of an edge to another node.
    EditEdge {
        edge_id: String,
        endpoint: Endpoint,
        node_id: String,
    },
    EditPredicate { id: String, predicates: Vec<String> },
    EditQualifiers {
        id: String,
        qualifier_constraints: Vec<QualifierConstraint>,
    },
    /// Add a new unconstrained node and an edge from `node_id` to it.
    AddHop { node_id: String },
}

/// Outcome of an accepted intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// Validity of the graph after the mutation.
    pub is_valid: bool,
    /// Ids of nodes and edges created by the intent.
    pub created: Vec<String>,
}

/// The authoritative query graph container.
pub trait QueryGraphStore {
    /// Current graph state.
    fn query_graph(&self) -> &QueryGraph;

    /// Validate and apply an intent. A rejected intent leaves the graph untouched.
    fn dispatch(&mut self, intent: Intent) -> QueryGraphResult<Applied>;

    /// Derived validity flag of the current graph.
    fn is_valid(&self) -> bool;

    /// Monotonic counter bumped on every applied mutation.
    fn version(&self) -> u64;
}

/// In-memory reducer store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    graph: QueryGraph,
    version: u64,
    is_valid: bool,
}

impl MemoryStore {
    /// Create a store holding an empty graph.
    pub fn new() -> Self {
        Self::with_graph(QueryGraph::new())
    }

    /// Create a store seeded with an existing graph.
    pub fn with_graph(graph: QueryGraph) -> Self {
        let is_valid = graph.is_valid();
        Self {
            graph,
            version: 0,
            is_valid,
        }
    }

    /// Consume the store and return its graph.
    pub fn into_graph(self) -> QueryGraph {
        self.graph
    }

    fn require_node(&self, id: &str) -> QueryGraphResult<()> {
        if self.graph.contains_node(id) {
            Ok(())
        } else {
            Err(QueryGraphError::UnknownNode { id: id.to_string() })
        }
    }

    fn edge_mut(&mut self, id: &str) -> QueryGraphResult<&mut QueryGraphEdge> {
        self.graph
            .edge_mut(id)
            .ok_or_else(|| QueryGraphError::UnknownEdge { id: id.to_string() })
    }

    fn insert_node(&mut self, props: NodeProps) -> String {
        let id = self.graph.next_id("n");
        self.graph.nodes.push(QueryGraphNode {
            id: id.clone(),
            ids: props.ids,
            categories: props.categories,
            name: props.name,
            is_set: props.is_set,
        });
        id
    }

    fn insert_edge(&mut self, subject: String, object: String) -> QueryGraphResult<String> {
        self.require_node(&subject)?;
        self.require_node(&object)?;
        let id = self.graph.next_id("e");
        if subject == object {
            return Err(QueryGraphError::SelfLoop { edge: id, node: subject });
        }
        self.graph.edges.push(QueryGraphEdge::new(id.clone(), subject, object));
        Ok(id)
    }

    fn apply(&mut self, intent: Intent) -> QueryGraphResult<Vec<String>> {
        match intent {
            Intent::AddNode { node } => Ok(vec![self.insert_node(node)]),
            Intent::EditNode { id, node } => {
                let target = self
                    .graph
                    .node_mut(&id)
                    .ok_or_else(|| QueryGraphError::UnknownNode { id: id.clone() })?;
                target.categories = node.categories;
                target.ids = node.ids;
                target.name = node.name;
                target.is_set = node.is_set;
                Ok(vec![])
            }
            Intent::DeleteNode { id } => {
                self.require_node(&id)?;
                self.graph.nodes.retain(|n| n.id != id);
                self.graph.edges.retain(|e| !e.touches(&id));
                Ok(vec![])
            }
            Intent::AddEdge { subject, object } => Ok(vec![self.insert_edge(subject, object)?]),
            Intent::DeleteEdge { id } => {
                if self.graph.edge(&id).is_none() {
                    return Err(QueryGraphError::UnknownEdge { id });
                }
                self.graph.edges.retain(|e| e.id != id);
                Ok(vec![])
            }
            Intent::EditEdge {
                edge_id,
                endpoint,
                node_id,
            } => {
                self.require_node(&node_id)?;
                let edge = self.edge_mut(&edge_id)?;
                let other = match endpoint {
                    Endpoint::Subject => &edge.object,
                    Endpoint::Object => &edge.subject,
                };
                if *other == node_id {
                    return Err(QueryGraphError::SelfLoop {
                        edge: edge_id,
                        node: node_id,
                    });
                }
                match endpoint {
                    Endpoint::Subject => edge.subject = node_id,
                    Endpoint::Object => edge.object = node_id,
                }
                Ok(vec![])
            }
            Intent::EditPredicate { id, predicates } => {
                self.edge_mut(&id)?.predicates = predicates;
                Ok(vec![])
            }
            Intent::EditQualifiers {
                id,
                qualifier_constraints,
            } => {
                self.edge_mut(&id)?.qualifier_constraints = qualifier_constraints;
                Ok(vec![])
            }
            Intent::AddHop { node_id } => {
                self.require_node(&node_id)?;
                let new_node = self.insert_node(NodeProps::default());
                let new_edge = self.insert_edge(node_id, new_node.clone())?;
                Ok(vec![new_node, new_edge])
            }
        }
    }
}

impl QueryGraphStore for MemoryStore {
    fn query_graph(&self) -> &QueryGraph {
        &self.graph
    }

    fn dispatch(&mut self, intent: Intent) -> QueryGraphResult<Applied> {
        tracing::debug!(?intent, "dispatching query graph intent");
        let created = self.apply(intent).inspect_err(|e| {
            tracing::debug!(error = %e, "intent rejected");
        })?;
        self.version += 1;
        self.is_valid = self.graph.is_valid();
        Ok(Applied {
            is_valid: self.is_valid,
            created,
        })
    }

    fn is_valid(&self) -> bool {
        self.is_valid
    }

    fn version(&self) -> u64 {
        self.version
    }
}
