//! Velocity-Verlet force simulation with collision, link and centring forces.
//!
//! The semantics follow the classic d3-force model: forces add to velocities
//! (centring shifts positions directly), velocities decay by a fixed factor
//! per tick, and an energy value `alpha` cools toward `alpha_target`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::LayoutConfig;
use super::geometry::Point;

/// A simulated node.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Fixed position while pinned by a drag.
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl Body {
    pub fn new(id: impl Into<String>, at: Point) -> Self {
        Self {
            id: id.into(),
            x: at.x,
            y: at.y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_fixed(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// A spring between two bodies, by arena index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub source: usize,
    pub target: usize,
    /// Share of the correction applied to the target; the rest moves the
    /// source. Higher-degree ends move less.
    pub bias: f64,
}

/// Physics state: bodies, springs and energy.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) bodies: Vec<Body>,
    springs: Vec<Spring>,
    alpha: f64,
    alpha_target: f64,
    center: Point,
    rng: StdRng,
}

impl Simulation {
    pub fn new(center: Point, seed: Option<u64>) -> Self {
        Self {
            bodies: Vec::new(),
            springs: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            center,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    /// Replace bodies and springs. `links` are `(source, target)` arena indices.
    pub fn reset(&mut self, bodies: Vec<Body>, links: &[(usize, usize)]) {
        let mut degree = vec![0usize; bodies.len()];
        for &(s, t) in links {
            degree[s] += 1;
            degree[t] += 1;
        }
        self.springs = links
            .iter()
            .map(|&(source, target)| Spring {
                source,
                target,
                bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
            })
            .collect();
        self.bodies = bodies;
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Uniform random point in `[0, width] x [0, height]`.
    pub fn random_point(&mut self, width: f64, height: f64) -> Point {
        Point::new(self.rng.gen_range(0.0..=width), self.rng.gen_range(0.0..=height))
    }

    /// Tiny random offset to separate coincident bodies.
    fn jiggle(&mut self) -> f64 {
        (self.rng.gen_range(0.0..1.0) - 0.5) * 1e-6
    }

    /// Advance one tick: cool, apply forces, integrate.
    pub fn tick(&mut self, config: &LayoutConfig) {
        self.alpha += (self.alpha_target - self.alpha) * config.alpha_decay();

        self.apply_collide(config.node_radius, config.collide_strength);
        self.apply_links(config.edge_length, config.link_strength);
        self.apply_center(config.center_strength);

        let keep = 1.0 - config.velocity_decay;
        for body in &mut self.bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= keep;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= keep;
                    body.y += body.vy;
                }
            }
        }
    }

    /// Push overlapping bodies apart using their predicted positions.
    fn apply_collide(&mut self, radius: f64, strength: f64) {
        let reach = radius * 2.0;
        for i in 0..self.bodies.len() {
            for j in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                let mut dx = (a.x + a.vx) - (b.x + b.vx);
                let mut dy = (a.y + a.vy) - (b.y + b.vy);
                let mut l = dx * dx + dy * dy;
                if l >= reach * reach {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.jiggle();
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                    l += dy * dy;
                }
                let l = l.sqrt();
                let push = (reach - l) / l * strength;
                dx *= push;
                dy *= push;

                // Equal radii: each body takes half the correction.
                let share = 0.5;
                self.bodies[i].vx += dx * share;
                self.bodies[i].vy += dy * share;
                self.bodies[j].vx -= dx * (1.0 - share);
                self.bodies[j].vy -= dy * (1.0 - share);
            }
        }
    }

    fn apply_links(&mut self, distance: f64, strength: f64) {
        for k in 0..self.springs.len() {
            let Spring { source, target, bias } = self.springs[k];
            let (s, t) = (&self.bodies[source], &self.bodies[target]);
            let mut dx = t.x + t.vx - s.x - s.vx;
            let mut dy = t.y + t.vy - s.y - s.vy;
            if dx == 0.0 {
                dx = self.jiggle();
            }
            if dy == 0.0 {
                dy = self.jiggle();
            }
            let l = dx.hypot(dy);
            let pull = (l - distance) / l * self.alpha * strength;
            dx *= pull;
            dy *= pull;

            self.bodies[target].vx -= dx * bias;
            self.bodies[target].vy -= dy * bias;
            self.bodies[source].vx += dx * (1.0 - bias);
            self.bodies[source].vy += dy * (1.0 - bias);
        }
    }

    /// Shift every body so the centroid moves toward the centre point.
    fn apply_center(&mut self, strength: f64) {
        let n = self.bodies.len();
        if n == 0 {
            return;
        }
        let (sx, sy) = self
            .bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
        let shift_x = (sx / n as f64 - self.center.x) * strength;
        let shift_y = (sy / n as f64 - self.center.y) * strength;
        for body in &mut self.bodies {
            body.x -= shift_x;
            body.y -= shift_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sim() -> Simulation {
        Simulation::new(Point::new(300.0, 200.0), Some(7))
    }

    #[test]
    fn alpha_cools_toward_target() {
        let config = LayoutConfig::default();
        let mut sim = sim();
        sim.tick(&config);
        assert_relative_eq!(sim.alpha(), 1.0 - config.alpha_decay(), epsilon = 1e-12);
        for _ in 0..299 {
            sim.tick(&config);
        }
        assert!(sim.alpha() < config.alpha_min * 1.01);
    }

    #[test]
    fn bias_favours_low_degree_ends() {
        let mut sim = sim();
        let bodies = vec![
            Body::new("hub", Point::new(0.0, 0.0)),
            Body::new("a", Point::new(10.0, 0.0)),
            Body::new("b", Point::new(0.0, 10.0)),
        ];
        sim.reset(bodies, &[(0, 1), (0, 2)]);
        assert_relative_eq!(sim.springs()[0].bias, 2.0 / 3.0);
    }

    #[test]
    fn springs_pull_toward_rest_length() {
        let config = LayoutConfig::default();
        let mut sim = sim();
        sim.reset(
            vec![
                Body::new("a", Point::new(0.0, 200.0)),
                Body::new("b", Point::new(600.0, 200.0)),
            ],
            &[(0, 1)],
        );
        let before = sim.bodies()[0].position().distance(sim.bodies()[1].position());
        sim.tick(&config);
        let after = sim.bodies()[0].position().distance(sim.bodies()[1].position());
        assert!(after < before);
    }

    #[test]
    fn collisions_separate_overlapping_bodies() {
        let config = LayoutConfig::default();
        let mut sim = sim();
        sim.reset(
            vec![
                Body::new("a", Point::new(300.0, 200.0)),
                Body::new("b", Point::new(310.0, 200.0)),
            ],
            &[],
        );
        for _ in 0..20 {
            sim.tick(&config);
        }
        let gap = sim.bodies()[0].position().distance(sim.bodies()[1].position());
        assert!(gap > 10.0);
    }

    #[test]
    fn fixed_bodies_stay_put() {
        let config = LayoutConfig::default();
        let mut sim = sim();
        let mut pinned = Body::new("a", Point::new(50.0, 50.0));
        pinned.fx = Some(80.0);
        pinned.fy = Some(90.0);
        sim.reset(vec![pinned, Body::new("b", Point::new(60.0, 50.0))], &[(0, 1)]);
        sim.tick(&config);
        let a = &sim.bodies()[0];
        assert_eq!((a.x, a.y, a.vx, a.vy), (80.0, 90.0, 0.0, 0.0));
    }

    #[test]
    fn seeded_random_points_repeat() {
        let p = sim().random_point(600.0, 400.0);
        let q = sim().random_point(600.0, 400.0);
        assert_eq!(p, q);
        assert!((0.0..=600.0).contains(&p.x) && (0.0..=400.0).contains(&p.y));
    }
}
