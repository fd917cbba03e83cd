//! Plane geometry for drawn edges: points, quadratic curves, fan-out.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Clamp `value` into `[lower, upper]`. `upper` wins if the bounds cross.
pub fn bounded(value: f64, upper: f64, lower: f64) -> f64 {
    value.max(lower).min(upper)
}

/// Quadratic Bézier curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

impl QuadCurve {
    pub fn point_at(&self, t: f64) -> Point {
        let a = self.start.lerp(self.control, t);
        let b = self.control.lerp(self.end, t);
        a.lerp(b, t)
    }

    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// SVG path data: `Mx1,y1Qqx,qy x2,y2`.
    pub fn to_svg_path(&self) -> String {
        format!("M{}Q{} {}", self.start, self.control, self.end)
    }

    /// The same curve drawn left to right, so text along it stays upright.
    pub fn upright(&self) -> QuadCurve {
        if self.start.x > self.end.x {
            QuadCurve {
                start: self.end,
                control: self.control,
                end: self.start,
            }
        } else {
            *self
        }
    }

    /// Approximate distance from `p` to the curve, sampled along its length.
    pub fn distance_to(&self, p: Point) -> f64 {
        const SAMPLES: usize = 24;
        (0..=SAMPLES)
            .map(|i| self.point_at(i as f64 / SAMPLES as f64).distance(p))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Curve for an edge between two node centres.
///
/// `fan` is the edge's signed offset within its parallel group (0 for a lone
/// edge). Endpoints sit on the node circles rotated by `fan · π/15` off the
/// centre line, and the control point lies on the perpendicular bisector, so
/// parallel edges fan out symmetrically.
pub fn curved_edge(source: Point, target: Point, fan: f64, radius: f64) -> QuadCurve {
    let theta = (target.y - source.y).atan2(target.x - source.x);
    let spread = fan * PI / 15.0;

    let start = Point::new(
        source.x + radius * (theta - spread).cos(),
        source.y + radius * (theta - spread).sin(),
    );
    let end = Point::new(
        target.x - radius * (theta + spread).cos(),
        target.y - radius * (theta + spread).sin(),
    );

    // Perpendicular to the centre line, on the side the endpoints lean to.
    let (nx, ny) = (theta.sin(), -theta.cos());
    let bulge = fan * radius * 2.0;
    let middle = source.lerp(target, 0.5);
    let control = Point::new(middle.x + nx * bulge, middle.y + ny * bulge);

    QuadCurve {
        start,
        control,
        end,
    }
}
