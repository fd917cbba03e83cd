//! Rich diagnostic error types for qgraph.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Lookups that simply find nothing (an
//! unknown category, a predicate the ontology does not know) are not errors:
//! they produce empty results.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for qgraph.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum QgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    QueryGraph(#[from] QueryGraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("failed to read ontology model: {path}")]
    #[diagnostic(
        code(qgraph::ontology::io),
        help("Check that the model file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse ontology model: {message}")]
    #[diagnostic(
        code(qgraph::ontology::parse),
        help(
            "The model must be a JSON document with `classes`, `slots` and `enums` \
             arrays. Each element needs at least a `name`."
        )
    )]
    Parse { message: String },

    #[error("ontology model defines no classes")]
    #[diagnostic(
        code(qgraph::ontology::empty),
        help("Load a model that defines at least the universal class (e.g. `named thing`).")
    )]
    Empty,
}

// ---------------------------------------------------------------------------
// Query graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum QueryGraphError {
    #[error("unknown node: {id}")]
    #[diagnostic(
        code(qgraph::query_graph::unknown_node),
        help("The node does not exist in the query graph. It may have been deleted.")
    )]
    UnknownNode { id: String },

    #[error("unknown edge: {id}")]
    #[diagnostic(
        code(qgraph::query_graph::unknown_edge),
        help("The edge does not exist in the query graph. It may have been deleted.")
    )]
    UnknownEdge { id: String },

    #[error("edge {edge} references missing node {node}")]
    #[diagnostic(
        code(qgraph::query_graph::dangling),
        help("Every edge subject and object must name an existing node.")
    )]
    DanglingReference { edge: String, node: String },

    #[error("edge {edge} would connect node {node} to itself")]
    #[diagnostic(
        code(qgraph::query_graph::self_loop),
        help("Drop the edge end on a different node, or delete the edge.")
    )]
    SelfLoop { edge: String, node: String },

    #[error("failed to parse query graph: {message}")]
    #[diagnostic(
        code(qgraph::query_graph::parse),
        help("Expected a TRAPI query graph: {{\"nodes\": {{...}}, \"edges\": {{...}}}}.")
    )]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Layout errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LayoutError {
    #[error("invalid viewport: {width}x{height}")]
    #[diagnostic(
        code(qgraph::layout::viewport),
        help("The drawing surface needs a positive, finite width and height.")
    )]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid layout configuration: {message}")]
    #[diagnostic(code(qgraph::layout::config), help("Check the [layout] section. {message}"))]
    InvalidConfig { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(qgraph::config::read),
        help("Check that the file exists and has read permissions.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(qgraph::config::write),
        help("Check that the parent directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(qgraph::config::parse),
        help("The config file must be valid TOML. Unknown keys are rejected.")
    )]
    Parse { path: String, message: String },
}

/// Convenience alias for functions returning qgraph results.
pub type QgResult<T> = std::result::Result<T, QgError>;
