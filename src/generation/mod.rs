//! Core layout generation algorithms
//!
//! Each stage of the castle pipeline lives in its own module: point sampling,
//! Delaunay triangulation, the tower tour, room growth, the spring relaxer,
//! room connectivity and corridor path finding. The orchestrator in
//! [`crate::castle`] wires them together.

pub mod astar;
pub mod delaunay;
pub mod graph;
pub mod growth;
pub mod poisson;
pub mod relax;
pub mod tour;

pub use astar::{find_path, Corridor, PathResult};
pub use delaunay::{TriangleId, TrianglePool, Triangulation};
pub use graph::{finalize_room, mst_weight, prim_mst, MstEdge, Node, NodeGraph, NodeId, NodeKind};
pub use growth::{expand_room, grow_room, grow_rooms, seed_room, trim_outliers, GrowthOutcome};
pub use poisson::{filter_border, poisson_disc_sample};
pub use relax::{BoundBox, LayoutRelaxer, Particle, RelaxOptions, Spring};
pub use tour::{closed_tour_length, shortest_closed_tour, TowerPolygon, MAX_TOUR_POINTS};

use crate::geometry::Vertex;

/// Triangulate a point set with Bowyer–Watson
///
/// Shorthand for [`Triangulation::new`].
pub fn triangulate(points: &[Vertex]) -> Triangulation {
    Triangulation::new(points)
}
