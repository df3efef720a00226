//! Incremental Delaunay triangulation (Bowyer–Watson)
//!
//! Points are inserted one at a time into a super-triangle that encloses the
//! whole input. Each insertion removes every triangle whose circumcircle
//! contains the new point and re-fans the cavity boundary to it. The scan over
//! existing triangles is linear, so the whole build is O(n²); point counts in
//! the layout pipeline stay in the low thousands at most.
//!
//! Also home to [`TrianglePool`], the per-attempt split of the mesh into
//! unassigned and claimed triangles.

use std::collections::HashMap;
use std::time::Instant;

use crate::geometry::{Edge, Triangle, Vertex};
use crate::room::RoomId;

/// Index of a triangle within a [`Triangulation`]
pub type TriangleId = usize;

/// Super-triangle extent as a multiple of the input's largest dimension
const SUPER_TRIANGLE_MARGIN: f64 = 20.0;

/// Working triangle during insertion: vertex indices plus cached geometry
struct WorkTriangle {
    indices: [usize; 3],
    triangle: Triangle,
}

impl WorkTriangle {
    fn new(indices: [usize; 3], points: &[Vertex]) -> Self {
        Self {
            indices,
            triangle: Triangle::new(points[indices[0]], points[indices[1]], points[indices[2]]),
        }
    }
}

/// Key for an undirected edge between two vertex indices
#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// A finished triangulation with cached adjacency
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    points: Vec<Vertex>,
    triangles: Vec<Triangle>,
    indices: Vec<[usize; 3]>,
    adjacency: Vec<Vec<TriangleId>>,
    degenerate: usize,
}

impl Triangulation {
    /// Triangulate a point set
    ///
    /// Duplicate points are skipped. Fewer than three distinct points produce
    /// an empty triangulation. Colinear triangles are dropped from the result
    /// and counted in [`Triangulation::degenerate_count`].
    pub fn new(input: &[Vertex]) -> Self {
        let start = Instant::now();

        let mut points: Vec<Vertex> = Vec::with_capacity(input.len() + 3);
        for &p in input {
            if points.contains(&p) {
                log::debug!("[Delaunay] skipping duplicate point {p}");
                continue;
            }
            points.push(p);
        }
        let n = points.len();

        if n < 3 {
            return Self {
                points,
                ..Default::default()
            };
        }

        // Step 1: super-triangle
        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let extent = (max - min).max_element().max(1.0);
        let mid = (min + max) * 0.5;
        let margin = extent * SUPER_TRIANGLE_MARGIN;
        points.push(Vertex::new(mid.x - margin, mid.y - margin));
        points.push(Vertex::new(mid.x, mid.y + margin));
        points.push(Vertex::new(mid.x + margin, mid.y - margin));

        let mut work = vec![WorkTriangle::new([n, n + 1, n + 2], &points)];

        // Step 2: insert points in order
        for i in 0..n {
            let point = points[i];
            let mut boundary: HashMap<(usize, usize), (usize, usize, u32)> = HashMap::new();

            work.retain(|t| {
                if !t.triangle.in_circumcircle(point) {
                    return true;
                }
                let [a, b, c] = t.indices;
                for (u, v) in [(a, b), (b, c), (c, a)] {
                    boundary
                        .entry(edge_key(u, v))
                        .and_modify(|e| e.2 += 1)
                        .or_insert((u, v, 1));
                }
                false
            });

            // Sorted for a deterministic triangle order
            let mut cavity: Vec<(usize, usize)> = boundary
                .into_values()
                .filter(|&(_, _, count)| count == 1)
                .map(|(u, v, _)| (u, v))
                .collect();
            cavity.sort_unstable();

            for (u, v) in cavity {
                work.push(WorkTriangle::new([u, v, i], &points));
            }
        }

        // Step 3: drop anything touching the super-triangle, plus degenerates
        let mut degenerate = 0;
        let mut triangles = Vec::new();
        let mut indices = Vec::new();
        for t in work {
            if t.indices.iter().any(|&idx| idx >= n) {
                continue;
            }
            if t.triangle.is_degenerate() {
                degenerate += 1;
                continue;
            }
            triangles.push(t.triangle);
            indices.push(t.indices);
        }
        points.truncate(n);

        if degenerate > 0 {
            log::warn!("[Delaunay] discarded {degenerate} degenerate triangles");
        }

        // Step 4: adjacency through shared edges
        let adjacency = build_adjacency(&indices);

        log::debug!(
            "[Delaunay] {} points -> {} triangles in {:?}",
            n,
            triangles.len(),
            start.elapsed()
        );

        Self {
            points,
            triangles,
            indices,
            adjacency,
            degenerate,
        }
    }

    /// Distinct input points, in insertion order
    #[inline]
    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    /// All triangles
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the triangulation has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get a triangle by id
    #[inline]
    pub fn triangle(&self, id: TriangleId) -> &Triangle {
        &self.triangles[id]
    }

    /// Triangles sharing exactly one edge with `id`
    #[inline]
    pub fn neighbors(&self, id: TriangleId) -> &[TriangleId] {
        &self.adjacency[id]
    }

    /// Number of colinear triangles discarded during construction
    #[inline]
    pub fn degenerate_count(&self) -> usize {
        self.degenerate
    }

    /// The edge shared by two triangles, if they are adjacent
    pub fn shared_edge(&self, a: TriangleId, b: TriangleId) -> Option<Edge> {
        if a == b {
            return None;
        }
        let [a0, a1, a2] = self.indices[a];
        let other = self.indices[b];
        [(a0, a1), (a1, a2), (a2, a0)]
            .into_iter()
            .find(|&(u, v)| other.contains(&u) && other.contains(&v))
            .map(|(u, v)| Edge::new(self.points[u], self.points[v]))
    }

    /// Triangle on the other side of `edge` from `id`, if any
    pub fn neighbor_across(&self, id: TriangleId, edge: &Edge) -> Option<TriangleId> {
        self.adjacency[id]
            .iter()
            .copied()
            .find(|&n| self.triangles[n].has_edge(edge))
    }
}

fn build_adjacency(indices: &[[usize; 3]]) -> Vec<Vec<TriangleId>> {
    let mut by_edge: HashMap<(usize, usize), Vec<TriangleId>> = HashMap::new();
    for (tri_idx, &[a, b, c]) in indices.iter().enumerate() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            by_edge.entry(edge_key(u, v)).or_default().push(tri_idx);
        }
    }

    let mut adjacency = vec![Vec::new(); indices.len()];
    for tris in by_edge.values() {
        if let [t0, t1] = tris[..] {
            adjacency[t0].push(t1);
            adjacency[t1].push(t0);
        }
    }
    for list in &mut adjacency {
        list.sort_unstable();
    }
    adjacency
}

/// Partition of a mesh into unassigned triangles and triangles owned by rooms
///
/// The unassigned list keeps pool order: triangles start in id order, and a
/// released triangle goes to the back. A triangle is in the unassigned list
/// exactly when it has no owner.
#[derive(Debug, Clone)]
pub struct TrianglePool {
    unassigned: Vec<TriangleId>,
    owner: Vec<Option<RoomId>>,
}

impl TrianglePool {
    /// Pool with every triangle of `mesh` unassigned
    pub fn new(mesh: &Triangulation) -> Self {
        Self {
            unassigned: (0..mesh.len()).collect(),
            owner: vec![None; mesh.len()],
        }
    }

    /// Unassigned triangles in pool order
    #[inline]
    pub fn unassigned(&self) -> &[TriangleId] {
        &self.unassigned
    }

    /// Number of unassigned triangles
    #[inline]
    pub fn unassigned_count(&self) -> usize {
        self.unassigned.len()
    }

    /// Number of claimed triangles
    #[inline]
    pub fn claimed_count(&self) -> usize {
        self.owner.len() - self.unassigned.len()
    }

    /// Total number of triangles tracked
    #[inline]
    pub fn len(&self) -> usize {
        self.owner.len()
    }

    /// Whether the pool tracks no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Room that owns a triangle
    #[inline]
    pub fn owner(&self, id: TriangleId) -> Option<RoomId> {
        self.owner[id]
    }

    /// Whether a triangle is unassigned
    #[inline]
    pub fn is_unassigned(&self, id: TriangleId) -> bool {
        self.owner[id].is_none()
    }

    /// Hand a triangle to `room`; returns false if it was already claimed
    pub fn claim(&mut self, id: TriangleId, room: RoomId) -> bool {
        if self.owner[id].is_some() {
            return false;
        }
        if let Some(pos) = self.unassigned.iter().position(|&t| t == id) {
            self.unassigned.remove(pos);
        }
        self.owner[id] = Some(room);
        true
    }

    /// Return a claimed triangle to the back of the pool
    pub fn release(&mut self, id: TriangleId) -> bool {
        if self.owner[id].take().is_none() {
            return false;
        }
        self.unassigned.push(id);
        true
    }

    /// First unassigned triangle, in pool order, whose circumcircle contains `point`
    ///
    /// The circumcircle test is inclusive.
    pub fn find_containing(&self, mesh: &Triangulation, point: Vertex) -> Option<TriangleId> {
        self.unassigned
            .iter()
            .copied()
            .find(|&id| mesh.triangle(id).in_circumcircle(point))
    }
}
