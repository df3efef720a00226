//! Mass-spring layout relaxation
//!
//! An alternative placement strategy: each room is modelled as a box attached
//! to a particle, and springs along the Delaunay triangulation of the box
//! centres push overlapping boxes apart until they rest at a small clearance.
//!
//! Springs never pull: a pair of boxes that already sits further apart than
//! its rest length keeps its current separation as the rest length.

use std::time::Instant;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::delaunay::Triangulation;
use crate::geometry::Vertex;

/// Options for [`LayoutRelaxer`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxOptions {
    /// Spring constant
    pub stiffness: f64,
    /// Velocity multiplier applied every step
    pub damping: f64,
    /// Gap kept between neighbouring boxes at rest
    pub clearance: f64,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            stiffness: 0.01,
            damping: 0.91,
            clearance: 2.0,
        }
    }
}

/// Axis-aligned box standing in for a room
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    /// Centre of the box
    pub center: Vertex,
    /// Full width and height
    pub size: DVec2,
    /// Particle mass
    pub mass: f64,
}

impl BoundBox {
    /// Create a box
    pub fn new(center: Vertex, size: DVec2, mass: f64) -> Self {
        Self { center, size, mass }
    }

    /// Distance from the centre to the box boundary along `dir`
    ///
    /// Picks the half-width or half-height depending on which face the ray
    /// leaves through. `dir` need not be normalised.
    pub fn exit_distance(&self, dir: DVec2) -> f64 {
        let dir = dir.normalize_or(DVec2::X);
        let half = self.size * 0.5;
        let tx = if dir.x != 0.0 { half.x / dir.x.abs() } else { f64::INFINITY };
        let ty = if dir.y != 0.0 { half.y / dir.y.abs() } else { f64::INFINITY };
        tx.min(ty)
    }

    /// Whether two boxes overlap (touching does not count)
    pub fn overlaps(&self, other: &BoundBox) -> bool {
        let gap = (self.center - other.center).abs();
        let reach = (self.size + other.size) * 0.5;
        gap.x < reach.x && gap.y < reach.y
    }
}

/// Point mass driven by spring forces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Current position
    pub position: Vertex,
    /// Mass
    pub mass: f64,
    /// Current velocity
    pub velocity: DVec2,
    /// Acceleration accumulated since the last update
    pub acceleration: DVec2,
    /// Velocity multiplier per update
    pub damping: f64,
}

impl Particle {
    /// Particle at rest
    pub fn new(position: Vertex, mass: f64, damping: f64) -> Self {
        Self {
            position,
            mass,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            damping,
        }
    }

    /// Add `force / mass` to the pending acceleration
    #[inline]
    pub fn apply_force(&mut self, force: DVec2) {
        self.acceleration += force / self.mass;
    }

    /// Semi-implicit Euler step
    pub fn update(&mut self) {
        self.velocity = (self.velocity + self.acceleration) * self.damping;
        self.position += self.velocity;
        self.acceleration = DVec2::ZERO;
    }
}

/// Spring between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// First particle index
    pub a: usize,
    /// Second particle index
    pub b: usize,
    /// Length at which the spring exerts no force
    pub rest_length: f64,
    /// Spring constant
    pub stiffness: f64,
}

impl Spring {
    /// Spring between two boxes with the given clearance
    pub fn between(a: usize, b: usize, boxes: &[BoundBox], clearance: f64, stiffness: f64) -> Self {
        let axis = boxes[b].center - boxes[a].center;
        let rest = boxes[a].exit_distance(axis) + boxes[b].exit_distance(-axis) + clearance;
        Self {
            a,
            b,
            rest_length: rest.max(axis.length()),
            stiffness,
        }
    }

    /// Push equal and opposite forces onto both ends
    pub fn apply(&self, particles: &mut [Particle]) {
        let delta = particles[self.b].position - particles[self.a].position;
        let dir = delta.normalize_or(DVec2::X);
        let force = dir * (self.stiffness * (delta.length() - self.rest_length));
        particles[self.a].apply_force(force);
        particles[self.b].apply_force(-force);
    }
}

/// Relaxes overlapping boxes with a spring network
#[derive(Debug, Clone)]
pub struct LayoutRelaxer {
    boxes: Vec<BoundBox>,
    particles: Vec<Particle>,
    springs: Vec<Spring>,
}

impl LayoutRelaxer {
    /// Connect the boxes with springs along the triangulation of their centres
    ///
    /// Two boxes get a single spring. Three or more colinear centres have no
    /// triangulation, so they are chained in input order instead.
    pub fn new(boxes: Vec<BoundBox>, options: RelaxOptions) -> Self {
        let particles: Vec<Particle> = boxes
            .iter()
            .map(|b| Particle::new(b.center, b.mass, options.damping))
            .collect();

        let pairs = spring_pairs(&boxes);
        let springs = pairs
            .into_iter()
            .map(|(a, b)| Spring::between(a, b, &boxes, options.clearance, options.stiffness))
            .collect();

        Self {
            boxes,
            particles,
            springs,
        }
    }

    /// Advance the simulation one step
    pub fn step(&mut self) {
        for spring in &self.springs {
            spring.apply(&mut self.particles);
        }
        for particle in &mut self.particles {
            particle.update();
        }
    }

    /// Advance the simulation `steps` times
    pub fn run(&mut self, steps: usize) {
        let start = Instant::now();
        for _ in 0..steps {
            self.step();
        }
        log::debug!(
            "[Relax] {} boxes, {} springs, {} steps in {:?}",
            self.boxes.len(),
            self.springs.len(),
            steps,
            start.elapsed()
        );
    }

    /// Current particle positions
    pub fn positions(&self) -> Vec<Vertex> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Boxes moved to the current particle positions
    pub fn boxes(&self) -> Vec<BoundBox> {
        self.boxes
            .iter()
            .zip(&self.particles)
            .map(|(b, p)| BoundBox { center: p.position, ..*b })
            .collect()
    }

    /// The spring network
    #[inline]
    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }
}

fn spring_pairs(boxes: &[BoundBox]) -> Vec<(usize, usize)> {
    match boxes.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![(0, 1)],
        _ => {}
    }

    let centers: Vec<Vertex> = boxes.iter().map(|b| b.center).collect();
    let mesh = Triangulation::new(&centers);
    if mesh.is_empty() {
        return (1..boxes.len()).map(|i| (i - 1, i)).collect();
    }

    // Boxes sharing a centre map to the first one; the triangulation skips duplicates
    let index_of = |v: Vertex| centers.iter().position(|&c| c == v);

    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for t in mesh.triangles() {
        for edge in t.edges() {
            if let (Some(a), Some(b)) = (index_of(edge.v0), index_of(edge.v1)) {
                let pair = (a.min(b), a.max(b));
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(center: Vertex, side: f64) -> BoundBox {
        BoundBox::new(center, DVec2::splat(side), 1.0)
    }

    #[test]
    fn test_exit_distance() {
        let b = BoundBox::new(Vertex::ZERO, DVec2::new(10.0, 4.0), 1.0);
        assert_relative_eq!(b.exit_distance(DVec2::X), 5.0);
        assert_relative_eq!(b.exit_distance(-DVec2::Y), 2.0);
        // 45 degrees leaves through the top face
        assert_relative_eq!(b.exit_distance(DVec2::new(1.0, 1.0)), 2.0 * 2f64.sqrt());
    }

    #[test]
    fn test_particle_update() {
        let mut p = Particle::new(Vertex::ZERO, 2.0, 0.5);
        p.apply_force(DVec2::new(4.0, 0.0));
        p.update();
        assert_eq!(p.velocity, DVec2::new(1.0, 0.0));
        assert_eq!(p.position, DVec2::new(1.0, 0.0));
        assert_eq!(p.acceleration, DVec2::ZERO);
    }

    #[test]
    fn test_two_boxes_settle_at_rest_length() {
        let boxes = vec![square(Vertex::new(0.0, 0.0), 10.0), square(Vertex::new(1.0, 0.0), 10.0)];
        let mut relaxer = LayoutRelaxer::new(boxes, RelaxOptions::default());
        assert_eq!(relaxer.springs().len(), 1);
        assert_relative_eq!(relaxer.springs()[0].rest_length, 12.0);

        relaxer.run(2000);

        let pos = relaxer.positions();
        assert_relative_eq!(pos[0].distance(pos[1]), 12.0, epsilon = 1e-6);
        // Equal masses keep the midpoint fixed
        assert_relative_eq!((pos[0] + pos[1]).x * 0.5, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_distant_boxes_do_not_move() {
        let boxes = vec![square(Vertex::new(0.0, 0.0), 2.0), square(Vertex::new(50.0, 0.0), 2.0)];
        let mut relaxer = LayoutRelaxer::new(boxes, RelaxOptions::default());
        relaxer.run(100);
        assert_eq!(relaxer.positions(), vec![Vertex::new(0.0, 0.0), Vertex::new(50.0, 0.0)]);
    }

    #[test]
    fn test_three_boxes_separate() {
        let boxes = vec![
            square(Vertex::new(0.0, 0.0), 4.0),
            square(Vertex::new(1.0, 0.0), 4.0),
            square(Vertex::new(0.5, 0.8), 4.0),
        ];
        assert!(boxes[0].overlaps(&boxes[1]));

        let mut relaxer = LayoutRelaxer::new(boxes, RelaxOptions::default());
        assert_eq!(relaxer.springs().len(), 3);
        relaxer.run(3000);

        let settled = relaxer.boxes();
        for i in 0..3 {
            for j in i + 1..3 {
                assert!(!settled[i].overlaps(&settled[j]), "boxes {i} and {j} overlap");
            }
        }
        let centroid = relaxer.positions().iter().copied().sum::<DVec2>() / 3.0;
        assert_relative_eq!(centroid.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(centroid.y, 0.8 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_colinear_boxes_are_chained() {
        let boxes: Vec<BoundBox> = (0..4).map(|i| square(Vertex::new(i as f64, 0.0), 1.0)).collect();
        let relaxer = LayoutRelaxer::new(boxes, RelaxOptions::default());
        let pairs: Vec<(usize, usize)> = relaxer.springs().iter().map(|s| (s.a, s.b)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3)]);
    }
}
