//! Force-directed layout engine.
//!
//! The engine owns the physics: a [`Simulation`](simulation::Simulation) of
//! bodies keyed by node id, driven by the host calling [`LayoutEngine::step`]
//! once per animation frame. Every tick (and every re-seed) runs a geometry
//! pass that produces a [`Frame`]: clamped node positions, edge curves, SVG
//! path strings, grab handles and button anchors.
//!
//! Positions survive re-seeding: when the query graph changes, existing nodes
//! keep their coordinates and only new nodes are placed at random.

pub mod frame;
pub mod geometry;
pub mod simulation;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::query_graph::Endpoint;
use crate::query_graph::display::DisplayGraph;

pub use frame::{EdgeFrame, Frame, NodeFrame};
pub use geometry::{Point, QuadCurve, bounded, curved_edge};
use simulation::{Body, Simulation};

/// Result type for layout operations.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning for the force simulation and geometry pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub node_radius: f64,
    /// Spring rest length.
    pub edge_length: f64,
    pub link_strength: f64,
    pub collide_strength: f64,
    pub center_strength: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    /// Ticking stops once alpha falls below this.
    pub alpha_min: f64,
    /// Alpha target while a node is dragged.
    pub drag_alpha_target: f64,
    /// Fraction of the node radius kept as padding for a dragged node.
    pub drag_inset: f64,
    /// Seed for initial placement and jiggle. Random when unset.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_radius: 48.0,
            edge_length: 225.0,
            link_strength: 1.0,
            collide_strength: 1.0,
            center_strength: 0.05,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
            drag_inset: 0.5,
            seed: None,
        }
    }
}

impl LayoutConfig {
    /// Per-tick cooling rate: alpha reaches `alpha_min` after 300 ticks.
    pub fn alpha_decay(&self) -> f64 {
        1.0 - self.alpha_min.powf(1.0 / 300.0)
    }

    pub fn validate(&self) -> LayoutResult<()> {
        let invalid = |message: &str| {
            Err(LayoutError::InvalidConfig {
                message: message.to_string(),
            })
        };
        if !(self.node_radius > 0.0 && self.node_radius.is_finite()) {
            return invalid("node_radius must be positive");
        }
        if !(self.edge_length > 0.0 && self.edge_length.is_finite()) {
            return invalid("edge_length must be positive");
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return invalid("velocity_decay must lie in [0, 1]");
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return invalid("alpha_min must lie in (0, 1)");
        }
        if !(0.0..=1.0).contains(&self.drag_alpha_target) {
            return invalid("drag_alpha_target must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.drag_inset) {
            return invalid("drag_inset must lie in [0, 1]");
        }
        Ok(())
    }
}

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> LayoutResult<Self> {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(LayoutError::InvalidViewport { width, height })
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutState {
    /// No graph seeded yet, or unmounted.
    Uninitialized,
    Running,
}

/// A grab handle being dragged by the pointer.
#[derive(Debug, Clone, PartialEq)]
struct HandleOverride {
    edge_id: String,
    endpoint: Endpoint,
    at: Point,
}

/// Force-directed layout of a [`DisplayGraph`].
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    viewport: Viewport,
    state: LayoutState,
    sim: Simulation,
    index: HashMap<String, usize>,
    display: DisplayGraph,
    handle: Option<HandleOverride>,
    frame: Frame,
}

impl LayoutEngine {
    pub fn new(viewport: Viewport, config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self {
            sim: Simulation::new(viewport.center(), config.seed),
            config,
            viewport,
            state: LayoutState::Uninitialized,
            index: HashMap::new(),
            display: DisplayGraph::default(),
            handle: None,
            frame: Frame::default(),
        })
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn alpha(&self) -> f64 {
        self.sim.alpha()
    }

    /// The simulation has cooled and `step` would do nothing.
    pub fn is_settled(&self) -> bool {
        self.sim.alpha() < self.config.alpha_min
    }

    /// The most recent geometry.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The display lists the engine was last seeded with.
    pub fn display(&self) -> &DisplayGraph {
        &self.display
    }

    pub fn position(&self, node_id: &str) -> Option<Point> {
        let &i = self.index.get(node_id)?;
        Some(self.sim.bodies()[i].position())
    }

    /// Load new display lists.
    ///
    /// Nodes already known keep their coordinates; new nodes are placed
    /// uniformly at random. Velocities and drag pins are cleared, alpha
    /// restarts at 1 and a frame is projected without ticking.
    pub fn reseed(&mut self, display: &DisplayGraph) {
        let previous: HashMap<String, Point> = self
            .sim
            .bodies()
            .iter()
            .map(|b| (b.id.clone(), b.position()))
            .collect();

        let mut bodies = Vec::with_capacity(display.nodes.len());
        let mut index = HashMap::with_capacity(display.nodes.len());
        for node in &display.nodes {
            let at = match previous.get(&node.id) {
                Some(&p) => p,
                None => self.sim.random_point(self.viewport.width, self.viewport.height),
            };
            index.insert(node.id.clone(), bodies.len());
            bodies.push(Body::new(node.id.clone(), at));
        }

        let links: Vec<(usize, usize)> = display
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.subject)?, *index.get(&e.object)?)))
            .collect();

        let kept = display
            .nodes
            .iter()
            .filter(|n| previous.contains_key(&n.id))
            .count();
        tracing::debug!(
            nodes = bodies.len(),
            links = links.len(),
            kept,
            "reseeding layout"
        );

        self.sim.reset(bodies, &links);
        self.sim.set_alpha(1.0);
        self.sim.set_alpha_target(0.0);
        self.index = index;
        self.display = display.clone();
        self.handle = None;
        self.state = LayoutState::Running;
        self.project();
    }

    /// Run one tick and refresh the frame. Returns whether a tick happened.
    pub fn step(&mut self) -> bool {
        if self.state == LayoutState::Uninitialized || self.is_settled() {
            return false;
        }
        self.sim.tick(&self.config);
        self.project();
        true
    }

    /// Set alpha. `restart(0.001)` yields exactly one more tick when the
    /// target is 0.
    pub fn restart(&mut self, alpha: f64) {
        self.sim.set_alpha(alpha);
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.sim.set_alpha_target(target);
    }

    /// Hold a node at `at`, kept inside the viewport with the drag inset.
    pub fn pin(&mut self, node_id: &str, at: Point) -> bool {
        let Some(&i) = self.index.get(node_id) else {
            return false;
        };
        let pad = self.config.node_radius * self.config.drag_inset;
        let body = &mut self.sim.bodies[i];
        body.fx = Some(bounded(at.x, self.viewport.width - pad, pad));
        body.fy = Some(bounded(at.y, self.viewport.height - pad, pad));
        true
    }

    pub fn unpin(&mut self, node_id: &str) {
        if let Some(&i) = self.index.get(node_id) {
            let body = &mut self.sim.bodies[i];
            body.fx = None;
            body.fy = None;
        }
    }

    /// Move a node to `at` and stop it. Used to restore a known layout.
    pub fn place(&mut self, node_id: &str, at: Point) -> bool {
        let Some(&i) = self.index.get(node_id) else {
            return false;
        };
        let body = &mut self.sim.bodies[i];
        body.x = at.x;
        body.y = at.y;
        body.vx = 0.0;
        body.vy = 0.0;
        self.project();
        true
    }

    /// Draw one end of an edge at `at` instead of on its node.
    pub fn set_handle_override(&mut self, edge_id: &str, endpoint: Endpoint, at: Point) {
        self.handle = Some(HandleOverride {
            edge_id: edge_id.to_string(),
            endpoint,
            at,
        });
        self.project();
    }

    /// Snap a dragged handle back onto its node at the next projection.
    pub fn clear_handle_override(&mut self) {
        self.handle = None;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.sim.set_center(viewport.center());
        if self.state == LayoutState::Running {
            self.project();
        }
    }

    /// Drop all simulation state.
    pub fn unmount(&mut self) {
        self.sim.reset(Vec::new(), &[]);
        self.index.clear();
        self.display = DisplayGraph::default();
        self.handle = None;
        self.frame = Frame::default();
        self.state = LayoutState::Uninitialized;
    }

    /// Clamp positions and rebuild the frame from current body positions.
    pub fn project(&mut self) {
        let Viewport { width, height } = self.viewport;
        let r = self.config.node_radius;

        for body in &mut self.sim.bodies {
            let pad = if body.is_fixed() {
                r * self.config.drag_inset
            } else {
                r
            };
            body.x = bounded(body.x, width - pad, pad);
            body.y = bounded(body.y, height - pad, pad);
        }

        let bodies = self.sim.bodies();
        let nodes = self
            .display
            .nodes
            .iter()
            .filter_map(|node| {
                let body = &bodies[*self.index.get(&node.id)?];
                Some(NodeFrame {
                    id: node.id.clone(),
                    x: body.x,
                    y: body.y,
                    radius: r,
                    label: node.label.clone(),
                    color: node.color.clone(),
                    pinned: node.pinned,
                    fixed: body.is_fixed(),
                })
            })
            .collect();

        let edges = self
            .display
            .edges
            .iter()
            .filter_map(|edge| {
                let source = bodies[*self.index.get(&edge.subject)?].position();
                let target = bodies[*self.index.get(&edge.object)?].position();
                let mut curve = curved_edge(source, target, edge.fan_offset(), r);

                let clamp = |p: Point| Point::new(bounded(p.x, width, 0.0), bounded(p.y, height, 0.0));
                let mut source_handle = clamp(curve.start);
                let mut target_handle = clamp(curve.end);
                if let Some(held) = self.handle.as_ref().filter(|h| h.edge_id == edge.id) {
                    match held.endpoint {
                        Endpoint::Subject => {
                            source_handle = held.at;
                            curve.start = held.at;
                        }
                        Endpoint::Object => {
                            target_handle = held.at;
                            curve.end = held.at;
                        }
                    }
                }
                let midpoint = QuadCurve {
                    start: source_handle,
                    control: curve.control,
                    end: target_handle,
                }
                .midpoint();

                Some(EdgeFrame {
                    id: edge.id.clone(),
                    subject: edge.subject.clone(),
                    object: edge.object.clone(),
                    path: curve.to_svg_path(),
                    label_path: curve.upright().to_svg_path(),
                    curve,
                    source_handle,
                    target_handle,
                    midpoint,
                    arrow: edge.has_arrow(),
                })
            })
            .collect();

        self.frame = Frame {
            width,
            height,
            alpha: self.sim.alpha(),
            nodes,
            edges,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_graph::display::DisplayGraph;
    use crate::query_graph::{QueryGraph, QueryGraphEdge, QueryGraphNode};
    use crate::style::NoColors;

    fn engine() -> LayoutEngine {
        let config = LayoutConfig {
            seed: Some(42),
            ..Default::default()
        };
        LayoutEngine::new(Viewport::new(800.0, 600.0).unwrap(), config).unwrap()
    }

    fn display(nodes: &[&str], edges: &[(&str, &str)]) -> DisplayGraph {
        let mut qg = QueryGraph::new();
        qg.nodes = nodes.iter().map(|id| QueryGraphNode::new(*id)).collect();
        qg.edges = edges
            .iter()
            .enumerate()
            .map(|(i, (s, o))| QueryGraphEdge::new(format!("e{i}"), *s, *o))
            .collect();
        DisplayGraph::derive(&qg, &[], &NoColors)
    }

    #[test]
    fn invalid_viewport_and_config_are_rejected() {
        assert!(matches!(
            Viewport::new(0.0, 10.0),
            Err(LayoutError::InvalidViewport { .. })
        ));
        let config = LayoutConfig {
            velocity_decay: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            LayoutEngine::new(Viewport::new(10.0, 10.0).unwrap(), config),
            Err(LayoutError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn step_is_a_noop_before_seeding() {
        let mut engine = engine();
        assert_eq!(engine.state(), LayoutState::Uninitialized);
        assert!(!engine.step());
    }

    #[test]
    fn nodes_stay_inside_the_viewport() {
        let mut engine = engine();
        engine.reseed(&display(&["n0", "n1", "n2"], &[("n0", "n1"), ("n1", "n2")]));
        for _ in 0..50 {
            engine.step();
        }
        for node in &engine.frame().nodes {
            assert!((48.0..=752.0).contains(&node.x), "x = {}", node.x);
            assert!((48.0..=552.0).contains(&node.y), "y = {}", node.y);
        }
    }

    #[test]
    fn restart_low_alpha_gives_exactly_one_tick() {
        let mut engine = engine();
        engine.reseed(&display(&["n0", "n1"], &[("n0", "n1")]));
        while engine.step() {}
        engine.restart(0.001);
        assert!(engine.step());
        assert!(!engine.step());
    }

    #[test]
    fn handle_override_moves_one_end_until_cleared() {
        let mut engine = engine();
        engine.reseed(&display(&["n0", "n1"], &[("n0", "n1")]));
        let before = engine.frame().edge("e0").unwrap().target_handle;

        engine.set_handle_override("e0", Endpoint::Object, Point::new(5.0, 5.0));
        let held = engine.frame().edge("e0").unwrap();
        assert_eq!(held.target_handle, Point::new(5.0, 5.0));
        assert!(held.path.ends_with(" 5,5"));

        engine.clear_handle_override();
        engine.project();
        assert_eq!(engine.frame().edge("e0").unwrap().target_handle, before);
    }

    #[test]
    fn pinned_nodes_follow_the_pointer_within_bounds() {
        let mut engine = engine();
        engine.reseed(&display(&["n0", "n1"], &[("n0", "n1")]));
        assert!(engine.pin("n0", Point::new(-100.0, 300.0)));
        engine.restart(0.5);
        engine.step();
        assert_eq!(engine.position("n0"), Some(Point::new(24.0, 300.0)));
        assert!(engine.frame().node("n0").unwrap().fixed);
        engine.unpin("n0");
        engine.project();
        assert!(!engine.frame().node("n0").unwrap().fixed);
    }

    #[test]
    fn unmount_resets_everything() {
        let mut engine = engine();
        engine.reseed(&display(&["n0"], &[]));
        engine.unmount();
        assert_eq!(engine.state(), LayoutState::Uninitialized);
        assert!(engine.frame().nodes.is_empty());
        assert!(engine.position("n0").is_none());
    }
}
