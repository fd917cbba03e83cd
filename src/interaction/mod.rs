//! Graph interaction layer: pointer gestures to intents.
//!
//! - **Click state** ([`click_state`]): selection and mode, plus the host reducer
//! - **Bindings** ([`bindings`]): which gestures are live in the current mode
//! - **Hit testing** ([`hit`]): what lies under the pointer
//!
//! [`InteractionLayer::handle`] turns low-level pointer events into click-state
//! intents, store dispatches and layout adjustments. A press that travels less
//! than the drag threshold before release is a click, otherwise a drag.
//!
//! Edge rebinding is two-phase: dropping a grab handle on a node proposes an
//! `EditEdge` intent, the store validates it synchronously, and a rejected or
//! invalid result snaps the handle back in the same call.

pub mod bindings;
pub mod click_state;
pub mod hit;

use serde::{Deserialize, Serialize};

use crate::error::QueryGraphError;
use crate::layout::{LayoutEngine, Point};
use crate::query_graph::Endpoint;
use crate::query_graph::store::{Intent, QueryGraphStore};

use bindings::{Binding, Bindings};
use click_state::{ClickIntent, ClickState, ElementKind};
use hit::{Affordance, Affordances, HitTarget, hit_test, node_at};

/// Gesture tuning and host capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    /// Pointer travel in pixels below which a press counts as a click.
    pub drag_threshold: f64,
    /// Distance in pixels within which a click lands on an edge curve.
    pub edge_hit_tolerance: f64,
    pub button_radius: f64,
    pub handle_radius: f64,
    /// Surface clicks are consumed (not propagated to the host page).
    pub surface_click_clears_selection: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            edge_hit_tolerance: 6.0,
            button_radius: 12.0,
            handle_radius: 10.0,
            surface_click_clears_selection: true,
        }
    }
}

/// Low-level pointer input in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Leave,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::Down { x, y }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::Move { x, y }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::Up { x, y }
    }
}

/// In-progress pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    /// Button down, not yet a drag. `moved` marks a press that travelled
    /// past the threshold over something not draggable.
    Pressed {
        origin: Point,
        target: HitTarget,
        moved: bool,
    },
    DraggingNode { id: String },
    DraggingHandle { edge_id: String, endpoint: Endpoint },
}

/// Outcome of dropping an edge handle.
#[derive(Debug, PartialEq)]
pub enum RebindOutcome {
    Accepted,
    /// Dropped on nothing or back on the node it came from.
    SnappedBack,
    /// The store refused the rebind.
    Rejected(QueryGraphError),
    /// The store applied it but the graph became invalid.
    Invalid,
}

/// What handling one event produced.
#[derive(Debug, Default, PartialEq)]
pub struct EventResponse {
    /// Click-state intents for the host reducer, in order.
    pub intents: Vec<ClickIntent>,
    /// The event should not propagate past the editor surface.
    pub consumed: bool,
    pub rebind: Option<RebindOutcome>,
}

/// Selection, hover and affordance state for the host to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub affordances: Option<Affordances>,
}

/// Gesture recogniser bound to one click state at a time.
#[derive(Debug, Clone)]
pub struct InteractionLayer {
    config: InteractionConfig,
    click_state: ClickState,
    bindings: Bindings,
    gesture: Gesture,
    hovered: Option<String>,
    affordances_visible: bool,
}

impl InteractionLayer {
    /// Create a layer with bindings attached for the default click state.
    pub fn new(config: InteractionConfig) -> Self {
        let click_state = ClickState::default();
        let mut bindings = Bindings::default();
        bindings.rebind(&click_state);
        Self {
            config,
            click_state,
            bindings,
            gesture: Gesture::Idle,
            hovered: None,
            affordances_visible: true,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn click_state(&self) -> &ClickState {
        &self.click_state
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Adopt a new click state from the host and swap bindings accordingly.
    pub fn set_click_state(&mut self, state: ClickState) {
        if state.clicked_id.is_some() && state.clicked_id != self.click_state.clicked_id {
            self.affordances_visible = true;
        }
        self.click_state = state;
        self.bindings.rebind(&self.click_state);
        if self.click_state.creating_connection {
            self.hovered = None;
        }
    }

    /// Detach every binding. Later events are ignored until a click state
    /// is set again.
    pub fn unmount(&mut self) {
        self.bindings.detach_all();
        self.gesture = Gesture::Idle;
        self.hovered = None;
    }

    pub fn overlay(&self, engine: &LayoutEngine) -> Overlay {
        let affordances = match (&self.click_state.clicked_id, self.affordances_visible) {
            (Some(id), true) if !self.click_state.creating_connection => {
                Affordances::locate(engine.frame(), id, &self.config)
            }
            _ => None,
        };
        Overlay {
            selected: self.click_state.clicked_id.clone(),
            hovered: self.hovered.clone(),
            affordances,
        }
    }

    /// Handle one pointer event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        engine: &mut LayoutEngine,
        store: &mut dyn QueryGraphStore,
    ) -> EventResponse {
        if self.bindings.is_empty() {
            return EventResponse::default();
        }
        match event {
            PointerEvent::Down { x, y } => self.on_down(Point::new(x, y), engine),
            PointerEvent::Move { x, y } => self.on_move(Point::new(x, y), engine),
            PointerEvent::Up { x, y } => self.on_up(Point::new(x, y), engine, store),
            PointerEvent::Leave => self.on_leave(engine),
        }
    }

    fn selected_with_buttons(&self) -> Option<&str> {
        if self.affordances_visible {
            self.click_state.clicked_id.as_deref()
        } else {
            None
        }
    }

    fn on_down(&mut self, p: Point, engine: &LayoutEngine) -> EventResponse {
        let target = hit_test(
            engine.frame(),
            p,
            self.selected_with_buttons(),
            &self.bindings,
            &self.config,
        );
        let consumed = target != HitTarget::Surface;
        self.gesture = Gesture::Pressed {
            origin: p,
            target,
            moved: false,
        };
        EventResponse {
            consumed,
            ..Default::default()
        }
    }

    fn on_move(&mut self, p: Point, engine: &mut LayoutEngine) -> EventResponse {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {
                self.update_hover(p, engine);
                EventResponse::default()
            }
            Gesture::Pressed {
                origin,
                target,
                moved,
            } => {
                if moved || origin.distance(p) < self.config.drag_threshold {
                    self.gesture = Gesture::Pressed {
                        origin,
                        target,
                        moved,
                    };
                    return EventResponse::default();
                }
                self.gesture = match target {
                    HitTarget::Node(id) if self.bindings.is_attached(Binding::NodeDrag) => {
                        let alpha = engine.alpha().max(engine.config().alpha_min);
                        engine.set_alpha_target(engine.config().drag_alpha_target);
                        engine.restart(alpha);
                        engine.pin(&id, p);
                        Gesture::DraggingNode { id }
                    }
                    HitTarget::Handle { edge_id, endpoint } => {
                        engine.set_handle_override(&edge_id, endpoint, p);
                        Gesture::DraggingHandle { edge_id, endpoint }
                    }
                    other => Gesture::Pressed {
                        origin,
                        target: other,
                        moved: true,
                    },
                };
                EventResponse {
                    consumed: true,
                    ..Default::default()
                }
            }
            Gesture::DraggingNode { id } => {
                engine.pin(&id, p);
                self.gesture = Gesture::DraggingNode { id };
                EventResponse {
                    consumed: true,
                    ..Default::default()
                }
            }
            Gesture::DraggingHandle { edge_id, endpoint } => {
                engine.set_handle_override(&edge_id, endpoint, p);
                self.gesture = Gesture::DraggingHandle { edge_id, endpoint };
                EventResponse {
                    consumed: true,
                    ..Default::default()
                }
            }
        }
    }

    fn on_up(
        &mut self,
        p: Point,
        engine: &mut LayoutEngine,
        store: &mut dyn QueryGraphStore,
    ) -> EventResponse {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => EventResponse::default(),
            Gesture::Pressed { moved: true, .. } => EventResponse::default(),
            Gesture::Pressed { target, .. } => self.click(target, engine, store),
            Gesture::DraggingNode { id } => {
                self.release_node(&id, engine);
                EventResponse {
                    consumed: true,
                    ..Default::default()
                }
            }
            Gesture::DraggingHandle { edge_id, endpoint } => {
                let outcome = self.drop_handle(&edge_id, endpoint, p, engine, store);
                EventResponse {
                    consumed: true,
                    rebind: Some(outcome),
                    ..Default::default()
                }
            }
        }
    }

    fn on_leave(&mut self, engine: &mut LayoutEngine) -> EventResponse {
        self.hovered = None;
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::DraggingNode { id } => self.release_node(&id, engine),
            Gesture::DraggingHandle { .. } => snap_back(engine),
            Gesture::Idle | Gesture::Pressed { .. } => {}
        }
        EventResponse::default()
    }

    fn update_hover(&mut self, p: Point, engine: &LayoutEngine) {
        let frame = engine.frame();
        let mut hovered = None;
        if self.bindings.is_attached(Binding::NodeHover) {
            hovered = node_at(frame, p).map(str::to_string);
        }
        if hovered.is_none() && self.bindings.is_attached(Binding::EdgeHover) {
            hovered = frame
                .edges
                .iter()
                .rev()
                .find(|e| e.curve.distance_to(p) <= self.config.edge_hit_tolerance)
                .map(|e| e.id.clone());
        }
        self.hovered = hovered;
    }

    fn release_node(&mut self, id: &str, engine: &mut LayoutEngine) {
        engine.set_alpha_target(0.0);
        engine.unpin(id);
    }

    fn toggle(&self, id: String) -> ClickIntent {
        if self.click_state.clicked_id.as_deref() == Some(id.as_str()) {
            ClickIntent::Click { id: None }
        } else {
            ClickIntent::Click { id: Some(id) }
        }
    }

    fn click(
        &mut self,
        target: HitTarget,
        engine: &LayoutEngine,
        store: &mut dyn QueryGraphStore,
    ) -> EventResponse {
        let mut response = EventResponse {
            consumed: true,
            ..Default::default()
        };
        match target {
            HitTarget::Affordance {
                id,
                kind,
                affordance: Affordance::Edit,
            } => {
                if let Some(buttons) = Affordances::locate(engine.frame(), &id, &self.config) {
                    response.intents.push(ClickIntent::OpenEditor {
                        id,
                        anchor: buttons.anchor,
                        kind,
                    });
                }
            }
            HitTarget::Affordance {
                id,
                kind,
                affordance: Affordance::Delete,
            } => {
                let intent = match kind {
                    ElementKind::Node => Intent::DeleteNode { id },
                    ElementKind::Edge => Intent::DeleteEdge { id },
                };
                if let Err(e) = store.dispatch(intent) {
                    tracing::debug!(error = %e, "delete rejected");
                }
                response.intents.push(ClickIntent::Click { id: None });
            }
            HitTarget::Node(id) => {
                if self.bindings.is_attached(Binding::ConnectionClick) {
                    response.intents.push(ClickIntent::ConnectTerm { id });
                } else if self.bindings.is_attached(Binding::NodeClick) {
                    self.affordances_visible = true;
                    response.intents.push(self.toggle(id));
                }
            }
            HitTarget::Edge(id) | HitTarget::Handle { edge_id: id, .. } => {
                if self.bindings.is_attached(Binding::EdgeClick) {
                    self.affordances_visible = true;
                    response.intents.push(self.toggle(id));
                }
            }
            HitTarget::Surface => {
                if self.bindings.is_attached(Binding::SurfaceClick) {
                    self.affordances_visible = false;
                    self.hovered = None;
                    if self.click_state.clicked_id.is_some() {
                        response.intents.push(ClickIntent::Click { id: None });
                    }
                    response.consumed = self.config.surface_click_clears_selection;
                } else {
                    response.consumed = false;
                }
            }
        }
        response
    }

    /// Second phase of a rebind: validate through the store, snap back on
    /// anything but a clean acceptance.
    fn drop_handle(
        &mut self,
        edge_id: &str,
        endpoint: Endpoint,
        p: Point,
        engine: &mut LayoutEngine,
        store: &mut dyn QueryGraphStore,
    ) -> RebindOutcome {
        let current = engine.frame().edge(edge_id).map(|e| match endpoint {
            Endpoint::Subject => e.subject.clone(),
            Endpoint::Object => e.object.clone(),
        });
        let dropped_on = node_at(engine.frame(), p).map(str::to_string);

        let Some(node_id) = dropped_on.filter(|n| Some(n) != current.as_ref()) else {
            snap_back(engine);
            return RebindOutcome::SnappedBack;
        };

        let outcome = match store.dispatch(Intent::EditEdge {
            edge_id: edge_id.to_string(),
            endpoint,
            node_id,
        }) {
            Ok(applied) if applied.is_valid => RebindOutcome::Accepted,
            Ok(_) => RebindOutcome::Invalid,
            Err(e) => RebindOutcome::Rejected(e),
        };
        match &outcome {
            RebindOutcome::Accepted => {
                engine.clear_handle_override();
                engine.project();
            }
            other => {
                tracing::debug!(edge = edge_id, %endpoint, ?other, "rebind not applied, snapping back");
                snap_back(engine);
            }
        }
        outcome
    }
}

/// Drop any handle override and tick once so the handle returns to its node.
fn snap_back(engine: &mut LayoutEngine) {
    engine.clear_handle_override();
    engine.restart(engine.config().alpha_min);
    if !engine.step() {
        engine.project();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, Viewport};
    use crate::query_graph::display::DisplayGraph;
    use crate::query_graph::store::{MemoryStore, NodeProps};
    use crate::style::NoColors;

    fn setup() -> (InteractionLayer, LayoutEngine, MemoryStore) {
        let mut store = MemoryStore::new();
        for category in ["biolink:Gene", "biolink:Disease", "biolink:Drug"] {
            store
                .dispatch(Intent::AddNode {
                    node: NodeProps::category(category),
                })
                .unwrap();
        }
        store
            .dispatch(Intent::AddEdge {
                subject: "n0".into(),
                object: "n1".into(),
            })
            .unwrap();
        let config = LayoutConfig {
            seed: Some(3),
            ..Default::default()
        };
        let mut engine = LayoutEngine::new(Viewport::new(900.0, 600.0).unwrap(), config).unwrap();
        engine.reseed(&DisplayGraph::derive(store.query_graph(), &[], &NoColors));
        engine.place("n0", Point::new(200.0, 300.0));
        engine.place("n1", Point::new(600.0, 300.0));
        engine.place("n2", Point::new(400.0, 500.0));
        (InteractionLayer::new(InteractionConfig::default()), engine, store)
    }

    fn click(
        layer: &mut InteractionLayer,
        engine: &mut LayoutEngine,
        store: &mut MemoryStore,
        p: Point,
    ) -> EventResponse {
        layer.handle(PointerEvent::down(p.x, p.y), engine, store);
        layer.handle(PointerEvent::up(p.x + 1.0, p.y), engine, store)
    }

    #[test]
    fn click_toggles_selection() {
        let (mut layer, mut engine, mut store) = setup();
        let at = engine.position("n2").unwrap();
        let response = click(&mut layer, &mut engine, &mut store, at);
        assert_eq!(response.intents, [ClickIntent::Click { id: Some("n2".into()) }]);

        let mut state = layer.click_state().clone();
        state.apply(response.intents[0].clone());
        layer.set_click_state(state);
        let response = click(&mut layer, &mut engine, &mut store, at);
        assert_eq!(response.intents, [ClickIntent::Click { id: None }]);
    }

    #[test]
    fn drag_pins_then_releases() {
        let (mut layer, mut engine, mut store) = setup();
        let at = engine.position("n2").unwrap();
        layer.handle(PointerEvent::down(at.x, at.y), &mut engine, &mut store);
        layer.handle(PointerEvent::moved(at.x + 40.0, at.y), &mut engine, &mut store);
        assert!(matches!(layer.gesture(), Gesture::DraggingNode { id } if id == "n2"));
        engine.step();
        assert!(engine.frame().node("n2").unwrap().fixed);

        let response = layer.handle(PointerEvent::up(at.x + 40.0, at.y), &mut engine, &mut store);
        assert!(response.intents.is_empty());
        engine.project();
        assert!(!engine.frame().node("n2").unwrap().fixed);
    }

    #[test]
    fn surface_click_clears_selection_and_consumption_is_configurable() {
        let (mut layer, mut engine, mut store) = setup();
        let mut state = ClickState::default();
        state.clicked_id = Some("n0".into());
        layer.set_click_state(state);

        let empty = Point::new(1.0, 1.0);
        let response = click(&mut layer, &mut engine, &mut store, empty);
        assert_eq!(response.intents, [ClickIntent::Click { id: None }]);
        assert!(response.consumed);

        let mut layer = InteractionLayer::new(InteractionConfig {
            surface_click_clears_selection: false,
            ..Default::default()
        });
        let response = click(&mut layer, &mut engine, &mut store, empty);
        assert!(response.intents.is_empty());
        assert!(!response.consumed);
    }

    #[test]
    fn connection_mode_turns_node_clicks_into_terms() {
        let (mut layer, mut engine, mut store) = setup();
        let mut state = ClickState::default();
        state.start_connection();
        layer.set_click_state(state);
        let at = engine.position("n1").unwrap();
        let response = click(&mut layer, &mut engine, &mut store, at);
        assert_eq!(response.intents, [ClickIntent::ConnectTerm { id: "n1".into() }]);
    }

    #[test]
    fn delete_affordance_dispatches_and_clears() {
        let (mut layer, mut engine, mut store) = setup();
        let mut state = ClickState::default();
        state.clicked_id = Some("n2".into());
        layer.set_click_state(state);
        let buttons = layer.overlay(&engine).affordances.unwrap();
        let response = click(&mut layer, &mut engine, &mut store, buttons.delete);
        assert_eq!(response.intents, [ClickIntent::Click { id: None }]);
        assert!(store.query_graph().node("n2").is_none());
    }

    #[test]
    fn unmounted_layer_ignores_events() {
        let (mut layer, mut engine, mut store) = setup();
        layer.unmount();
        let at = engine.position("n0").unwrap();
        let response = click(&mut layer, &mut engine, &mut store, at);
        assert_eq!(response, EventResponse::default());
    }
}
