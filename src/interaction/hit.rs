//! Hit testing against a layout frame.
//!
//! Priority, highest first: affordance buttons of the selected element, edge
//! grab handles, nodes (top-most first), edge curves, the surface. Only
//! targets with an attached binding take part.

use serde::Serialize;

use crate::layout::{Frame, Point};
use crate::query_graph::Endpoint;

use super::InteractionConfig;
use super::bindings::{Binding, Bindings};
use super::click_state::ElementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Affordance {
    Edit,
    Delete,
}

/// Edit and delete button centres for the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Affordances {
    pub kind: ElementKind,
    /// Where an editor opened from these buttons is anchored.
    pub anchor: Point,
    pub edit: Point,
    pub delete: Point,
}

impl Affordances {
    /// Button positions for `id`, or `None` if it is not in the frame.
    pub fn locate(frame: &Frame, id: &str, config: &InteractionConfig) -> Option<Self> {
        let spacing = config.button_radius * 1.25;
        if let Some(node) = frame.node(id) {
            let y = node.y - node.radius - config.button_radius;
            return Some(Self {
                kind: ElementKind::Node,
                anchor: node.center(),
                edit: Point::new(node.x - spacing, y),
                delete: Point::new(node.x + spacing, y),
            });
        }
        let edge = frame.edge(id)?;
        let mid = edge.midpoint;
        Some(Self {
            kind: ElementKind::Edge,
            anchor: mid,
            edit: Point::new(mid.x - spacing, mid.y),
            delete: Point::new(mid.x + spacing, mid.y),
        })
    }
}

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HitTarget {
    Affordance {
        id: String,
        kind: ElementKind,
        affordance: Affordance,
    },
    Handle {
        edge_id: String,
        endpoint: Endpoint,
    },
    Node(String),
    Edge(String),
    Surface,
}

/// Top-most node whose circle contains `p`, skipping nothing.
pub fn node_at<'a>(frame: &'a Frame, p: Point) -> Option<&'a str> {
    frame
        .nodes
        .iter()
        .rev()
        .find(|n| n.contains(p))
        .map(|n| n.id.as_str())
}

/// Find the target under `p`.
///
/// `selected` is the element whose affordances are showing, if any.
pub fn hit_test(
    frame: &Frame,
    p: Point,
    selected: Option<&str>,
    bindings: &Bindings,
    config: &InteractionConfig,
) -> HitTarget {
    if let Some(id) = selected {
        if let Some(buttons) = Affordances::locate(frame, id, config) {
            for (affordance, centre, binding) in [
                (Affordance::Edit, buttons.edit, Binding::edit(buttons.kind)),
                (Affordance::Delete, buttons.delete, Binding::delete(buttons.kind)),
            ] {
                if bindings.is_attached(binding) && centre.distance(p) <= config.button_radius {
                    return HitTarget::Affordance {
                        id: id.to_string(),
                        kind: buttons.kind,
                        affordance,
                    };
                }
            }
        }
    }

    if bindings.is_attached(Binding::EdgeDrag) {
        for edge in frame.edges.iter().rev() {
            for (endpoint, handle) in [
                (Endpoint::Subject, edge.source_handle),
                (Endpoint::Object, edge.target_handle),
            ] {
                if handle.distance(p) <= config.handle_radius {
                    return HitTarget::Handle {
                        edge_id: edge.id.clone(),
                        endpoint,
                    };
                }
            }
        }
    }

    let nodes_live = [Binding::NodeClick, Binding::ConnectionClick, Binding::NodeDrag]
        .into_iter()
        .any(|b| bindings.is_attached(b));
    if nodes_live {
        if let Some(id) = node_at(frame, p) {
            return HitTarget::Node(id.to_string());
        }
    }

    if bindings.is_attached(Binding::EdgeClick) {
        if let Some(edge) = frame
            .edges
            .iter()
            .rev()
            .find(|e| e.curve.distance_to(p) <= config.edge_hit_tolerance)
        {
            return HitTarget::Edge(edge.id.clone());
        }
    }

    HitTarget::Surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::click_state::ClickState;
    use crate::layout::{EdgeFrame, NodeFrame, curved_edge};

    fn node(id: &str, x: f64, y: f64) -> NodeFrame {
        NodeFrame {
            id: id.into(),
            x,
            y,
            radius: 48.0,
            label: id.into(),
            color: String::new(),
            pinned: false,
            fixed: false,
        }
    }

    fn frame() -> Frame {
        let a = Point::new(100.0, 200.0);
        let b = Point::new(500.0, 200.0);
        let curve = curved_edge(a, b, 0.0, 48.0);
        Frame {
            width: 800.0,
            height: 400.0,
            alpha: 0.0,
            nodes: vec![node("n0", a.x, a.y), node("n1", b.x, b.y), node("n2", 130.0, 200.0)],
            edges: vec![EdgeFrame {
                id: "e0".into(),
                subject: "n0".into(),
                object: "n1".into(),
                path: curve.to_svg_path(),
                label_path: curve.upright().to_svg_path(),
                source_handle: curve.start,
                target_handle: curve.end,
                midpoint: curve.midpoint(),
                curve,
                arrow: true,
            }],
        }
    }

    fn normal() -> Bindings {
        let mut bindings = Bindings::default();
        bindings.rebind(&ClickState::default());
        bindings
    }

    #[test]
    fn later_nodes_are_on_top() {
        let config = InteractionConfig::default();
        let hit = hit_test(&frame(), Point::new(115.0, 200.0), None, &normal(), &config);
        assert_eq!(hit, HitTarget::Node("n2".into()));
    }

    #[test]
    fn handles_beat_nodes() {
        let config = InteractionConfig::default();
        let hit = hit_test(&frame(), Point::new(452.0, 200.0), None, &normal(), &config);
        assert_eq!(
            hit,
            HitTarget::Handle {
                edge_id: "e0".into(),
                endpoint: Endpoint::Object
            }
        );
    }

    #[test]
    fn edges_and_surface() {
        let config = InteractionConfig::default();
        let frame = frame();
        assert_eq!(
            hit_test(&frame, Point::new(300.0, 203.0), None, &normal(), &config),
            HitTarget::Edge("e0".into())
        );
        assert_eq!(
            hit_test(&frame, Point::new(300.0, 350.0), None, &normal(), &config),
            HitTarget::Surface
        );
    }

    #[test]
    fn affordances_of_selection_come_first() {
        let config = InteractionConfig::default();
        let frame = frame();
        let buttons = Affordances::locate(&frame, "e0", &config).unwrap();
        let hit = hit_test(&frame, buttons.delete, Some("e0"), &normal(), &config);
        assert_eq!(
            hit,
            HitTarget::Affordance {
                id: "e0".into(),
                kind: ElementKind::Edge,
                affordance: Affordance::Delete
            }
        );
    }

    #[test]
    fn connection_mode_sees_through_edges() {
        let config = InteractionConfig::default();
        let mut state = ClickState::default();
        state.start_connection();
        let mut bindings = Bindings::default();
        bindings.rebind(&state);
        assert_eq!(
            hit_test(&frame(), Point::new(300.0, 203.0), None, &bindings, &config),
            HitTarget::Surface
        );
    }
}
