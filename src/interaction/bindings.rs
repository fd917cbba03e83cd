//! Listener bindings per input mode.
//!
//! Which gestures the editor reacts to depends on the click state. Every
//! click-state change detaches the previous set before attaching the next,
//! so no handler from an old mode survives a mode switch.

use serde::Serialize;

use super::click_state::{ClickState, ElementKind};

/// A gesture handler the interaction layer can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Binding {
    NodeClick,
    NodeHover,
    NodeDrag,
    NodeEdit,
    NodeDelete,
    EdgeClick,
    EdgeHover,
    EdgeDrag,
    EdgeEdit,
    EdgeDelete,
    /// Node clicks add terminals to a new connection.
    ConnectionClick,
    SurfaceClick,
}

impl Binding {
    pub fn edit(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Node => Binding::NodeEdit,
            ElementKind::Edge => Binding::EdgeEdit,
        }
    }

    pub fn delete(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Node => Binding::NodeDelete,
            ElementKind::Edge => Binding::EdgeDelete,
        }
    }
}

const NORMAL: &[Binding] = &[
    Binding::NodeClick,
    Binding::NodeHover,
    Binding::NodeDrag,
    Binding::NodeEdit,
    Binding::NodeDelete,
    Binding::EdgeClick,
    Binding::EdgeHover,
    Binding::EdgeDrag,
    Binding::EdgeEdit,
    Binding::EdgeDelete,
    Binding::SurfaceClick,
];

const CONNECTING: &[Binding] = &[Binding::ConnectionClick, Binding::NodeDrag, Binding::SurfaceClick];

/// The currently attached bindings.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    attached: Vec<Binding>,
    /// Incremented on every attach, for hosts mirroring listeners.
    generation: u64,
}

impl Bindings {
    /// The bindings a click state calls for.
    pub fn for_state(state: &ClickState) -> &'static [Binding] {
        if state.creating_connection {
            CONNECTING
        } else {
            NORMAL
        }
    }

    /// Detach everything, then attach the set for `state`.
    pub fn rebind(&mut self, state: &ClickState) {
        self.detach_all();
        self.attached.extend_from_slice(Self::for_state(state));
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            connecting = state.creating_connection,
            count = self.attached.len(),
            "attached bindings"
        );
    }

    pub fn detach_all(&mut self) {
        if !self.attached.is_empty() {
            tracing::debug!(count = self.attached.len(), "detached bindings");
        }
        self.attached.clear();
    }

    pub fn is_attached(&self, binding: Binding) -> bool {
        self.attached.contains(&binding)
    }

    pub fn attached(&self) -> &[Binding] {
        &self.attached
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_mode_suspends_hover_and_edges() {
        let mut bindings = Bindings::default();
        let mut state = ClickState::default();
        state.start_connection();
        bindings.rebind(&state);
        assert!(bindings.is_attached(Binding::ConnectionClick));
        assert!(bindings.is_attached(Binding::NodeDrag));
        for suspended in [
            Binding::NodeClick,
            Binding::NodeHover,
            Binding::NodeEdit,
            Binding::EdgeClick,
            Binding::EdgeDrag,
            Binding::EdgeHover,
        ] {
            assert!(!bindings.is_attached(suspended), "{suspended:?} still attached");
        }
    }

    #[test]
    fn rebind_replaces_instead_of_accumulating() {
        let mut bindings = Bindings::default();
        let state = ClickState::default();
        bindings.rebind(&state);
        bindings.rebind(&state);
        assert_eq!(bindings.attached().len(), NORMAL.len());
        assert_eq!(bindings.generation(), 2);

        bindings.detach_all();
        assert!(bindings.is_empty());
    }
}
