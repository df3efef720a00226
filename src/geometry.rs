//! Mesh primitives
//!
//! Plain 2D value types shared by every stage of the pipeline: vertices,
//! unordered edges and triangles with a cached circumcircle.

use glam::DVec2;

/// A point in the layout plane
///
/// Equality is exact coordinate match, which is what the triangulator relies
/// on when it compares shared edges.
pub type Vertex = DVec2;

/// An unordered pair of vertices
///
/// `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// First endpoint
    pub v0: Vertex,
    /// Second endpoint
    pub v1: Vertex,
}

impl Edge {
    /// Create an edge between two vertices
    pub fn new(v0: Vertex, v1: Vertex) -> Self {
        Self { v0, v1 }
    }

    /// Midpoint of the edge
    #[inline]
    pub fn midpoint(&self) -> Vertex {
        (self.v0 + self.v1) * 0.5
    }

    /// Length of the edge
    #[inline]
    pub fn length(&self) -> f64 {
        self.v0.distance(self.v1)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.v0 == other.v0 && self.v1 == other.v1) || (self.v0 == other.v1 && self.v1 == other.v0)
    }
}

/// Circle passing through the three vertices of a triangle
///
/// # Containment policy
///
/// [`Circumcircle::contains`] is inclusive: a point exactly on the circle
/// counts as contained. The triangulator uses the same test, so cocircular
/// inputs (the corners of a square, for instance) are resolved by input order
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circumcircle {
    /// Circumcenter
    pub center: Vertex,
    /// Circumradius
    pub radius: f64,
}

impl Circumcircle {
    /// Compute the circumcircle of three points
    ///
    /// Returns `None` when the points are colinear (zero determinant) or the
    /// result is not finite.
    pub fn from_points(a: Vertex, b: Vertex, c: Vertex) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d == 0.0 {
            return None;
        }

        let a_sq = a.length_squared();
        let b_sq = b.length_squared();
        let c_sq = c.length_squared();

        let x = (a_sq * (b.y - c.y) + b_sq * (c.y - a.y) + c_sq * (a.y - b.y)) / d;
        let y = (a_sq * (c.x - b.x) + b_sq * (a.x - c.x) + c_sq * (b.x - a.x)) / d;
        let center = DVec2::new(x, y);
        let radius = center.distance(a);

        if !center.is_finite() || !radius.is_finite() {
            return None;
        }

        Some(Self { center, radius })
    }

    /// Whether `point` lies inside or on the circle
    #[inline]
    pub fn contains(&self, point: Vertex) -> bool {
        self.center.distance(point) <= self.radius
    }
}

/// A triangle of the layout mesh
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    /// The three corners
    pub vertices: [Vertex; 3],
    /// Cached circumcircle, `None` for degenerate triangles
    pub circumcircle: Option<Circumcircle>,
}

impl Triangle {
    /// Create a triangle and compute its circumcircle
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
            circumcircle: Circumcircle::from_points(v0, v1, v2),
        }
    }

    /// Whether the three corners are colinear
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.circumcircle.is_none()
    }

    /// Circumcenter, if defined
    #[inline]
    pub fn circumcenter(&self) -> Option<Vertex> {
        self.circumcircle.map(|c| c.center)
    }

    /// Circumradius, if defined
    #[inline]
    pub fn circumradius(&self) -> Option<f64> {
        self.circumcircle.map(|c| c.radius)
    }

    /// Inclusive circumcircle test; always false for degenerate triangles
    #[inline]
    pub fn in_circumcircle(&self, point: Vertex) -> bool {
        self.circumcircle.is_some_and(|c| c.contains(point))
    }

    /// Average of the three corners
    #[inline]
    pub fn centroid(&self) -> Vertex {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    /// The three edges, in vertex order
    pub fn edges(&self) -> [Edge; 3] {
        let [a, b, c] = self.vertices;
        [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
    }

    /// Whether `vertex` is one of the corners
    #[inline]
    pub fn has_vertex(&self, vertex: Vertex) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Whether `edge` is one of the three edges
    pub fn has_edge(&self, edge: &Edge) -> bool {
        self.edges().iter().any(|e| e == edge)
    }

    /// Unsigned area
    pub fn area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        ((b - a).perp_dot(c - a) * 0.5).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_edge_equality_is_symmetric() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(3.0, 4.0);
        assert_eq!(Edge::new(a, b), Edge::new(b, a));
        assert_ne!(Edge::new(a, b), Edge::new(a, Vertex::new(3.0, 4.5)));
        assert_relative_eq!(Edge::new(a, b).length(), 5.0);
        assert_eq!(Edge::new(a, b).midpoint(), Vertex::new(1.5, 2.0));
    }

    #[test]
    fn test_right_triangle_circumcircle() {
        // Hypotenuse is a diameter
        let t = Triangle::new(
            Vertex::new(0.0, 0.0),
            Vertex::new(4.0, 0.0),
            Vertex::new(0.0, 3.0),
        );
        let circle = t.circumcircle.unwrap();
        assert_relative_eq!(circle.center.x, 2.0);
        assert_relative_eq!(circle.center.y, 1.5);
        assert_relative_eq!(circle.radius, 2.5);
    }

    #[test]
    fn test_colinear_triangle_is_degenerate() {
        let t = Triangle::new(
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(2.0, 2.0),
        );
        assert!(t.is_degenerate());
        assert!(t.circumcenter().is_none());
        assert!(!t.in_circumcircle(Vertex::new(1.0, 1.0)));
    }

    #[test]
    fn test_circumcircle_inclusive_boundary() {
        let t = Triangle::new(
            Vertex::new(-1.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(0.0, 1.0),
        );
        assert!(t.in_circumcircle(Vertex::new(0.0, -1.0)));
        assert!(t.in_circumcircle(Vertex::new(0.0, 0.0)));
        assert!(!t.in_circumcircle(Vertex::new(0.0, -1.1)));
    }

    #[test]
    fn test_centroid_area_and_edges() {
        let t = Triangle::new(
            Vertex::new(0.0, 0.0),
            Vertex::new(3.0, 0.0),
            Vertex::new(0.0, 3.0),
        );
        assert_eq!(t.centroid(), Vertex::new(1.0, 1.0));
        assert_relative_eq!(t.area(), 4.5);
        assert!(t.has_edge(&Edge::new(Vertex::new(0.0, 3.0), Vertex::new(3.0, 0.0))));
        assert!(t.has_vertex(Vertex::new(3.0, 0.0)));
    }
}
