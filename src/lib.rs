// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # qgraph
//!
//! Core of an interactive editor for biomedical query graphs: small graphs of
//! typed concept nodes joined by predicate-labelled edges, checked against
//! the Biolink model.
//!
//! ## Architecture
//!
//! - **Query graph** (`query_graph`): Nodes, edges, intent-driven store, display derivation
//! - **Ontology** (`ontology`): Biolink hierarchy on petgraph, association/qualifier resolver
//! - **Layout** (`layout`): Force-directed simulation and curved-edge geometry
//! - **Interaction** (`interaction`): Hit testing, gestures, click state, handler bindings
//! - **Editor** (`editor`): Facade tying the above to a store
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use qgraph::config::EditorConfig;
//! use qgraph::editor::QueryGraphEditor;
//! use qgraph::ontology::BiolinkModel;
//! use qgraph::query_graph::store::{Intent, MemoryStore, NodeProps};
//!
//! let model = BiolinkModel::load("biolink.json".as_ref()).unwrap();
//! let mut editor =
//!     QueryGraphEditor::new(MemoryStore::new(), Some(Arc::new(model)), &EditorConfig::default())
//!         .unwrap();
//! editor
//!     .dispatch(Intent::AddNode { node: NodeProps::category("biolink:Gene") })
//!     .unwrap();
//! editor.dispatch(Intent::AddHop { node_id: "n0".into() }).unwrap();
//! while editor.tick() {}
//! let associations = editor.valid_associations("e0");
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod ontology;
mod ordered_map;
pub mod query_graph;
pub mod style;

pub use editor::QueryGraphEditor;
pub use error::{QgError, QgResult};
