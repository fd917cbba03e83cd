//! Query graph editor facade.
//!
//! [`QueryGraphEditor`] owns the store, the ontology handle, the layout
//! engine, the interaction layer and the resolver cache, and keeps the
//! derived state in step with the store: whenever the store version or the
//! model changes, display lists are re-derived and the layout re-seeded with
//! preserved positions.
//!
//! ```no_run
//! use qgraph::config::EditorConfig;
//! use qgraph::editor::QueryGraphEditor;
//! use qgraph::interaction::PointerEvent;
//! use qgraph::query_graph::store::MemoryStore;
//!
//! let mut editor = QueryGraphEditor::new(MemoryStore::new(), None, &EditorConfig::default())?;
//! editor.tick();
//! let response = editor.handle_pointer(PointerEvent::down(10.0, 10.0));
//! for intent in response.intents {
//!     editor.apply(intent)?;
//! }
//! # Ok::<(), qgraph::error::QgError>(())
//! ```

use std::sync::Arc;

use crate::config::EditorConfig;
use crate::error::QgResult;
use crate::interaction::click_state::{ClickIntent, ClickState};
use crate::interaction::{EventResponse, InteractionLayer, Overlay, PointerEvent};
use crate::layout::{Frame, LayoutEngine, Viewport};
use crate::ontology::resolver::{ResolverCache, ValidAssociation};
use crate::ontology::{BiolinkModel, retain_known};
use crate::query_graph::display::DisplayGraph;
use crate::query_graph::store::{Applied, Intent, QueryGraphStore};
use crate::query_graph::{QueryGraphResult, UNIVERSAL_CATEGORY, UNIVERSAL_PREDICATE};
use crate::style::{CategoryColorMap, NoColors};

/// Interactive editor over a [`QueryGraphStore`].
pub struct QueryGraphEditor<S: QueryGraphStore> {
    store: S,
    model: Option<Arc<BiolinkModel>>,
    colors: Box<dyn CategoryColorMap>,
    layout: LayoutEngine,
    interaction: InteractionLayer,
    resolver: ResolverCache,
    click_state: ClickState,
    /// Store and model versions the layout was last seeded from.
    synced: Option<(u64, Option<u64>)>,
    mounted: bool,
}

impl<S: QueryGraphStore> QueryGraphEditor<S> {
    pub fn new(store: S, model: Option<Arc<BiolinkModel>>, config: &EditorConfig) -> QgResult<Self> {
        let layout = LayoutEngine::new(config.viewport()?, config.layout.clone())?;
        Ok(Self {
            store,
            model,
            colors: Box::new(NoColors),
            layout,
            interaction: InteractionLayer::new(config.interaction.clone()),
            resolver: ResolverCache::new(),
            click_state: ClickState::default(),
            synced: None,
            mounted: true,
        })
    }

    /// Use a colour map for node fills and labels.
    pub fn with_colors(mut self, colors: impl CategoryColorMap + 'static) -> Self {
        self.colors = Box::new(colors);
        self.synced = None;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model(&self) -> Option<&BiolinkModel> {
        self.model.as_deref()
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn frame(&self) -> &Frame {
        self.layout.frame()
    }

    pub fn overlay(&self) -> Overlay {
        self.interaction.overlay(&self.layout)
    }

    pub fn click_state(&self) -> &ClickState {
        &self.click_state
    }

    /// Swap the ontology. Cached resolutions for the old model are dropped.
    pub fn set_model(&mut self, model: Option<Arc<BiolinkModel>>) {
        self.model = model;
        self.resolver.clear();
        self.sync();
    }

    /// Re-derive display lists and re-seed the layout if the store or model
    /// changed since the last call. Returns whether a re-seed happened.
    pub fn sync(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let current = (self.store.version(), self.model.as_ref().map(|m| m.version()));
        if self.synced == Some(current) {
            return false;
        }
        let symmetric = self
            .model
            .as_ref()
            .map(|m| m.symmetric_predicates().to_vec())
            .unwrap_or_default();
        let display = DisplayGraph::derive(self.store.query_graph(), &symmetric, self.colors.as_ref());
        self.layout.reseed(&display);
        self.synced = Some(current);
        true
    }

    /// Advance the layout by one tick. Returns whether anything moved.
    pub fn tick(&mut self) -> bool {
        let reseeded = self.sync();
        self.layout.step() || reseeded
    }

    pub fn resize(&mut self, width: f64, height: f64) -> QgResult<()> {
        self.layout.resize(Viewport::new(width, height)?);
        Ok(())
    }

    /// Dispatch an intent to the store and resynchronise.
    pub fn dispatch(&mut self, intent: Intent) -> QueryGraphResult<Applied> {
        let applied = self.store.dispatch(intent)?;
        self.sync();
        Ok(applied)
    }

    // -----------------------------------------------------------------------
    // Pointer input and click state
    // -----------------------------------------------------------------------

    /// Feed a pointer event through the interaction layer.
    ///
    /// Click-state intents are returned, not applied: pass them to
    /// [`apply`](Self::apply) or run them through a host reducer and hand
    /// the result to [`set_click_state`](Self::set_click_state).
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventResponse {
        if !self.mounted {
            return EventResponse::default();
        }
        self.sync();
        let response = self.interaction.handle(event, &mut self.layout, &mut self.store);
        self.sync();
        response
    }

    /// Adopt a click state from the host. Rebinds gesture handlers.
    pub fn set_click_state(&mut self, state: ClickState) {
        self.click_state = state;
        if self.mounted {
            self.interaction.set_click_state(self.click_state.clone());
        }
    }

    /// Run the built-in reducer on an intent.
    ///
    /// A `ConnectTerm` that completes a connection adds the edge; its
    /// dispatch result is returned.
    pub fn apply(&mut self, intent: ClickIntent) -> QueryGraphResult<Option<Applied>> {
        let mut state = self.click_state.clone();
        let completed = state.apply(intent);
        self.set_click_state(state);
        match completed {
            Some((subject, object)) => self.complete_connection(subject, object).map(Some),
            None => Ok(None),
        }
    }

    /// Enter connection-creation mode.
    pub fn start_connection(&mut self) {
        let mut state = self.click_state.clone();
        state.start_connection();
        self.set_click_state(state);
    }

    /// Add the edge a finished connection describes.
    pub fn complete_connection(&mut self, subject: String, object: String) -> QueryGraphResult<Applied> {
        tracing::debug!(%subject, %object, "completing connection");
        self.dispatch(Intent::AddEdge { subject, object })
    }

    // -----------------------------------------------------------------------
    // Ontology queries
    // -----------------------------------------------------------------------

    fn node_categories(&self, node_id: &str) -> Vec<String> {
        self.store
            .query_graph()
            .node(node_id)
            .map(|n| n.effective_categories())
            .unwrap_or_else(|| vec![UNIVERSAL_CATEGORY.to_string()])
    }

    /// Legal associations for an edge, most specific first.
    ///
    /// Uses the primary category of each end. The edge's first predicate is
    /// only considered once the subject has a category; otherwise the
    /// universal predicate stands in. Unknown edges and a missing model give
    /// an empty list.
    pub fn valid_associations(&self, edge_id: &str) -> Arc<[ValidAssociation]> {
        let graph = self.store.query_graph();
        let Some(edge) = graph.edge(edge_id) else {
            return Arc::from(Vec::new());
        };
        let subject_node = graph.node(&edge.subject);
        let subject = subject_node.map_or(UNIVERSAL_CATEGORY, |n| n.primary_category());
        let object = graph
            .node(&edge.object)
            .map_or(UNIVERSAL_CATEGORY, |n| n.primary_category());
        let predicate = match subject_node {
            Some(n) if !n.categories.is_empty() => edge.primary_predicate(),
            _ => UNIVERSAL_PREDICATE,
        };
        self.resolver
            .resolve(subject, predicate, object, self.model.as_deref())
    }

    /// Predicates selectable on an edge, or `None` when the model cannot say.
    pub fn predicate_options(&self, edge_id: &str) -> Option<Vec<String>> {
        let model = self.model.as_deref()?;
        let edge = self.store.query_graph().edge(edge_id)?;
        model.predicate_options(
            &self.node_categories(&edge.subject),
            &self.node_categories(&edge.object),
        )
    }

    /// Drop predicates no longer selectable after an endpoint category
    /// change. Dispatches only when something is removed.
    pub fn refresh_predicates(&mut self, edge_id: &str) -> QueryGraphResult<Option<Applied>> {
        let Some(options) = self.predicate_options(edge_id) else {
            return Ok(None);
        };
        let Some(edge) = self.store.query_graph().edge(edge_id) else {
            return Ok(None);
        };
        let kept = retain_known(&edge.predicates, &options);
        if kept.len() == edge.predicates.len() {
            return Ok(None);
        }
        self.dispatch(Intent::EditPredicate {
            id: edge_id.to_string(),
            predicates: kept,
        })
        .map(Some)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Release bindings and simulation state. The store is kept.
    pub fn unmount(&mut self) {
        self.interaction.unmount();
        self.layout.unmount();
        self.resolver.clear();
        self.synced = None;
        self.mounted = false;
    }

    /// Re-attach after [`unmount`](Self::unmount).
    pub fn mount(&mut self) {
        self.mounted = true;
        self.interaction.set_click_state(self.click_state.clone());
        self.sync();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Consume the editor and return its store.
    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutState;
    use crate::ontology::tests::mini;
    use crate::query_graph::store::{MemoryStore, NodeProps};

    fn editor() -> QueryGraphEditor<MemoryStore> {
        let mut config = EditorConfig::default();
        config.layout.seed = Some(5);
        let mut store = MemoryStore::new();
        store
            .dispatch(Intent::AddNode {
                node: NodeProps::category("biolink:Gene"),
            })
            .unwrap();
        QueryGraphEditor::new(store, Some(Arc::new(mini())), &config).unwrap()
    }

    #[test]
    fn dispatch_reseeds_and_preserves_positions() {
        let mut editor = editor();
        editor.sync();
        let before = editor.layout().position("n0").unwrap();
        editor
            .dispatch(Intent::AddHop {
                node_id: "n0".into(),
            })
            .unwrap();
        assert_eq!(editor.layout().position("n0"), Some(before));
        assert_eq!(editor.frame().nodes.len(), 2);
        assert_eq!(editor.frame().edges.len(), 1);
    }

    #[test]
    fn connection_flow_adds_an_edge() {
        let mut editor = editor();
        editor
            .dispatch(Intent::AddNode {
                node: NodeProps::category("biolink:Disease"),
            })
            .unwrap();
        editor.start_connection();
        assert!(editor.apply(ClickIntent::ConnectTerm { id: "n0".into() }).unwrap().is_none());
        let applied = editor
            .apply(ClickIntent::ConnectTerm { id: "n1".into() })
            .unwrap()
            .unwrap();
        assert_eq!(applied.created, ["e0"]);
        assert!(!editor.click_state().creating_connection);
    }

    #[test]
    fn predicates_are_pruned_to_options() {
        let mut editor = editor();
        editor
            .dispatch(Intent::AddHop {
                node_id: "n0".into(),
            })
            .unwrap();
        editor
            .dispatch(Intent::EditPredicate {
                id: "e0".into(),
                predicates: vec!["biolink:affects".into(), "biolink:treats".into()],
            })
            .unwrap();
        assert!(editor.refresh_predicates("e0").unwrap().is_some());
        assert_eq!(
            editor.store().query_graph().edge("e0").unwrap().predicates,
            ["biolink:affects"]
        );
        assert!(editor.refresh_predicates("e0").unwrap().is_none());
    }

    #[test]
    fn unknown_edges_resolve_to_nothing() {
        let editor = editor();
        assert!(editor.valid_associations("e9").is_empty());
        assert!(editor.predicate_options("e9").is_none());
    }

    #[test]
    fn unmount_drops_layout_and_ignores_input() {
        let mut editor = editor();
        editor.tick();
        editor.unmount();
        assert_eq!(editor.layout().state(), LayoutState::Uninitialized);
        assert!(!editor.tick());
        let response = editor.handle_pointer(PointerEvent::down(1.0, 1.0));
        assert_eq!(response, EventResponse::default());

        editor.mount();
        assert_eq!(editor.layout().state(), LayoutState::Running);
    }
}
