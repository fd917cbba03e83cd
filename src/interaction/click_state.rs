//! Click state and its reducer.
//!
//! The host owns the click state. The interaction layer only proposes
//! [`ClickIntent`]s; [`ClickState::apply`] is the reducer hosts run on them.

use serde::{Deserialize, Serialize};

use crate::layout::Point;

/// What kind of element an intent refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Edge,
}

/// The element whose editor is open, and where to anchor it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorTarget {
    pub id: String,
    pub anchor: Point,
    pub kind: ElementKind,
}

/// Click-state change proposed by the interaction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClickIntent {
    /// Select an element, or clear the selection with `None`.
    Click { id: Option<String> },
    OpenEditor {
        id: String,
        anchor: Point,
        kind: ElementKind,
    },
    /// Add a node to the connection being created.
    ConnectTerm { id: String },
}

/// Selection and mode of the graph editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickState {
    /// At most one selected element.
    pub clicked_id: Option<String>,
    pub creating_connection: bool,
    pub editor: Option<EditorTarget>,
    /// Terminals collected while creating a connection, in click order.
    pub pending_connection: Vec<String>,
}

impl ClickState {
    /// Enter connection-creation mode. Clears the selection.
    pub fn start_connection(&mut self) {
        self.creating_connection = true;
        self.clicked_id = None;
        self.editor = None;
        self.pending_connection.clear();
    }

    pub fn cancel_connection(&mut self) {
        self.creating_connection = false;
        self.pending_connection.clear();
    }

    /// Apply an intent.
    ///
    /// Returns `(subject, object)` when a `ConnectTerm` completes a
    /// connection; the state then leaves connection mode.
    pub fn apply(&mut self, intent: ClickIntent) -> Option<(String, String)> {
        match intent {
            ClickIntent::Click { id } => {
                if id.is_none() {
                    self.editor = None;
                }
                self.clicked_id = id;
                None
            }
            ClickIntent::OpenEditor { id, anchor, kind } => {
                self.clicked_id = Some(id.clone());
                self.editor = Some(EditorTarget { id, anchor, kind });
                None
            }
            ClickIntent::ConnectTerm { id } => {
                if !self.creating_connection || self.pending_connection.contains(&id) {
                    return None;
                }
                self.pending_connection.push(id);
                if self.pending_connection.len() < 2 {
                    return None;
                }
                let object = self.pending_connection.pop()?;
                let subject = self.pending_connection.pop()?;
                self.cancel_connection();
                Some((subject, object))
            }
        }
    }
}
