//! Shortest closed tour over the tower spawn points
//!
//! Tower counts are tiny, so the tour is found by brute force: the first point
//! stays fixed and every ordering of the rest is visited with Heap's algorithm.
//! The winning tour becomes the castle wall.

use geo::{Contains, LineString, Point, Polygon};

use crate::error::{CastleError, Result};
use crate::geometry::Vertex;

/// Largest point count the brute-force solver accepts
///
/// Ten points means 9! = 362 880 orderings, which still finishes quickly.
pub const MAX_TOUR_POINTS: usize = 10;

/// Length of the closed loop visiting `points` in order
pub fn closed_tour_length(points: &[Vertex]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance(*b))
        .sum()
}

/// Order `points` to minimise the closed tour length
///
/// `points[0]` is kept as the first element. Among tours of equal length the
/// first one enumerated wins.
///
/// # Errors
/// [`CastleError::TourTooLarge`] when more than [`MAX_TOUR_POINTS`] points are given.
pub fn shortest_closed_tour(points: &[Vertex]) -> Result<Vec<Vertex>> {
    if points.len() > MAX_TOUR_POINTS {
        return Err(CastleError::TourTooLarge {
            count: points.len(),
            max: MAX_TOUR_POINTS,
        });
    }
    if points.len() <= 3 {
        return Ok(points.to_vec());
    }

    let mut current = points.to_vec();
    let mut best = current.clone();
    let mut best_len = closed_tour_length(&current);

    // Iterative Heap's algorithm over current[1..]
    let n = current.len() - 1;
    let mut counters = vec![0usize; n];
    let mut i = 1;
    while i < n {
        if counters[i] < i {
            if i % 2 == 0 {
                current.swap(1, 1 + i);
            } else {
                current.swap(1 + counters[i], 1 + i);
            }

            let len = closed_tour_length(&current);
            if len < best_len {
                best_len = len;
                best.copy_from_slice(&current);
            }

            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }

    log::debug!("[Tour] {} points, wall length {:.2}", points.len(), best_len);
    Ok(best)
}

/// The castle wall: tower spawn points in tour order
#[derive(Debug, Clone)]
pub struct TowerPolygon {
    vertices: Vec<Vertex>,
    polygon: Polygon<f64>,
}

impl TowerPolygon {
    /// Build the wall polygon from an ordered tour
    pub fn from_tour(tour: Vec<Vertex>) -> Self {
        let ring: Vec<(f64, f64)> = tour.iter().map(|v| (v.x, v.y)).collect();
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        Self {
            vertices: tour,
            polygon,
        }
    }

    /// Tour vertices in order (not closed)
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Whether `point` lies strictly inside the wall
    pub fn contains(&self, point: Vertex) -> bool {
        self.vertices.len() >= 3 && self.polygon.contains(&Point::new(point.x, point.y))
    }

    /// Wall length
    pub fn perimeter(&self) -> f64 {
        closed_tour_length(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_square_tour_is_perimeter() {
        // Deliberately crossed input order
        let points = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(0.0, 1.0),
        ];
        assert!(closed_tour_length(&points) > 4.0 + 1e-9);

        let tour = shortest_closed_tour(&points).unwrap();
        assert_eq!(tour[0], points[0]);
        assert_eq!(tour.len(), 4);
        assert_relative_eq!(closed_tour_length(&tour), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tour_is_a_permutation() {
        let points: Vec<Vertex> = (0..7)
            .map(|i| {
                let a = i as f64 * 2.3;
                Vertex::new(a.cos() * 10.0, a.sin() * 7.0)
            })
            .collect();
        let tour = shortest_closed_tour(&points).unwrap();
        assert_eq!(tour.len(), points.len());
        for p in &points {
            assert!(tour.contains(p));
        }
        assert!(closed_tour_length(&tour) <= closed_tour_length(&points) + 1e-12);
    }

    #[test]
    fn test_too_many_points() {
        let points: Vec<Vertex> = (0..=MAX_TOUR_POINTS).map(|i| Vertex::new(i as f64, 0.0)).collect();
        let err = shortest_closed_tour(&points).unwrap_err();
        assert_eq!(
            err,
            CastleError::TourTooLarge {
                count: MAX_TOUR_POINTS + 1,
                max: MAX_TOUR_POINTS
            }
        );
    }

    #[test]
    fn test_small_inputs() {
        assert!(shortest_closed_tour(&[]).unwrap().is_empty());
        assert_eq!(closed_tour_length(&[Vertex::new(1.0, 1.0)]), 0.0);
        let two = [Vertex::new(0.0, 0.0), Vertex::new(3.0, 4.0)];
        assert_relative_eq!(closed_tour_length(&two), 10.0);
    }

    #[test]
    fn test_polygon_contains() {
        let wall = TowerPolygon::from_tour(vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ]);
        assert!(wall.contains(Vertex::new(5.0, 5.0)));
        assert!(!wall.contains(Vertex::new(15.0, 5.0)));
        assert_relative_eq!(wall.perimeter(), 40.0);
    }
}
