//! Geometry produced by one layout pass.

use serde::Serialize;

use super::geometry::{Point, QuadCurve};

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub label: String,
    pub color: String,
    /// Bound to concrete entities.
    pub pinned: bool,
    /// Held in place by a drag.
    pub fixed: bool,
}

impl NodeFrame {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.center().distance(p) <= self.radius
    }
}

/// A positioned edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFrame {
    pub id: String,
    pub subject: String,
    pub object: String,
    pub curve: QuadCurve,
    /// SVG path data for the stroke.
    pub path: String,
    /// SVG path data for the label, always drawn left to right.
    pub label_path: String,
    /// Grab handle at the subject end, inside the viewport.
    pub source_handle: Point,
    /// Grab handle at the object end, inside the viewport.
    pub target_handle: Point,
    /// Where the edit/delete buttons sit.
    pub midpoint: Point,
    pub arrow: bool,
}

/// Everything the host needs to draw one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub alpha: f64,
    pub nodes: Vec<NodeFrame>,
    pub edges: Vec<EdgeFrame>,
}

impl Frame {
    pub fn node(&self, id: &str) -> Option<&NodeFrame> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeFrame> {
        self.edges.iter().find(|e| e.id == id)
    }
}
