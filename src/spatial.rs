//! Spawn point pool with fast proximity queries
//!
//! Rooms are placed at spawn points drawn from a Poisson sample. Every point
//! can be consumed once per attempt. With the `spatial-index` feature the
//! remaining points are kept in a KD-tree; without it queries fall back to a
//! linear scan that returns the same points.

#[cfg(feature = "spatial-index")]
use kiddo::{KdTree, SquaredEuclidean};

use crate::geometry::Vertex;

/// Spawn points available to one layout attempt
///
/// # Performance
///
/// - Construction: O(n log n) with the KD-tree, O(n) without
/// - Nearest / within-radius: O(log n) with the KD-tree, O(n) without
/// - Consuming a point: O(log n) with the KD-tree, O(1) without
#[derive(Clone)]
pub struct SpawnPointPool {
    points: Vec<Vertex>,
    available: Vec<bool>,
    remaining: usize,
    #[cfg(feature = "spatial-index")]
    tree: KdTree<f64, 2>,
}

impl std::fmt::Debug for SpawnPointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnPointPool")
            .field("points", &self.points.len())
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl SpawnPointPool {
    /// Pool with every point available
    ///
    /// # Example
    ///
    /// ```
    /// use castle_layout::spatial::SpawnPointPool;
    /// use castle_layout::Vertex;
    ///
    /// let mut pool = SpawnPointPool::new(vec![Vertex::new(0.0, 0.0), Vertex::new(10.0, 0.0)]);
    /// let taken = pool.take_nearest(Vertex::new(9.0, 1.0));
    /// assert_eq!(taken, Some(Vertex::new(10.0, 0.0)));
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn new(points: Vec<Vertex>) -> Self {
        #[cfg(feature = "spatial-index")]
        let tree = {
            let mut tree: KdTree<f64, 2> = KdTree::with_capacity(points.len().max(1));
            for (i, p) in points.iter().enumerate() {
                tree.add(&[p.x, p.y], i as u64);
            }
            tree
        };

        Self {
            available: vec![true; points.len()],
            remaining: points.len(),
            points,
            #[cfg(feature = "spatial-index")]
            tree,
        }
    }

    /// Number of points not yet consumed
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining
    }

    /// Whether every point has been consumed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// All points, consumed or not, in sampling order
    #[inline]
    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    /// Whether point `index` can still be taken
    #[inline]
    pub fn is_available(&self, index: usize) -> bool {
        self.available.get(index).copied().unwrap_or(false)
    }

    /// Indices of the points still available, in sampling order
    pub fn available_indices(&self) -> Vec<usize> {
        (0..self.points.len()).filter(|&i| self.available[i]).collect()
    }

    /// Consume point `index`; `None` if it was already taken
    pub fn take(&mut self, index: usize) -> Option<Vertex> {
        if !self.is_available(index) {
            return None;
        }
        self.available[index] = false;
        self.remaining -= 1;

        let p = self.points[index];
        #[cfg(feature = "spatial-index")]
        self.tree.remove(&[p.x, p.y], index as u64);
        Some(p)
    }

    /// Index of the available point closest to `position`
    pub fn nearest(&self, position: Vertex) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.nearest_available(position)
    }

    #[cfg(feature = "spatial-index")]
    fn nearest_available(&self, position: Vertex) -> Option<usize> {
        let found = self.tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some(found.item as usize)
    }

    #[cfg(not(feature = "spatial-index"))]
    fn nearest_available(&self, position: Vertex) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            if !self.available[i] {
                continue;
            }
            let d = p.distance_squared(position);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Consume and return the available point closest to `position`
    pub fn take_nearest(&mut self, position: Vertex) -> Option<Vertex> {
        let index = self.nearest(position)?;
        self.take(index)
    }

    /// Indices of available points within `radius` of `position`, sorted
    pub fn within(&self, position: Vertex, radius: f64) -> Vec<usize> {
        let radius_sq = radius * radius;

        #[cfg(feature = "spatial-index")]
        let mut found: Vec<usize> = self
            .tree
            .within::<SquaredEuclidean>(&[position.x, position.y], radius_sq)
            .into_iter()
            .map(|n| n.item as usize)
            .collect();

        #[cfg(not(feature = "spatial-index"))]
        let mut found: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .filter(|&(i, p)| self.available[i] && p.distance_squared(position) <= radius_sq)
            .map(|(i, _)| i)
            .collect();

        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Vertex> {
        let mut points = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                points.push(Vertex::new(x as f64 * 10.0, y as f64 * 10.0));
            }
        }
        points
    }

    #[test]
    fn test_nearest_and_take() {
        let mut pool = SpawnPointPool::new(grid());
        assert_eq!(pool.len(), 25);

        let idx = pool.nearest(Vertex::new(21.0, 29.0)).unwrap();
        assert_eq!(pool.points()[idx], Vertex::new(20.0, 30.0));

        assert_eq!(pool.take(idx), Some(Vertex::new(20.0, 30.0)));
        assert_eq!(pool.take(idx), None);
        assert!(!pool.is_available(idx));
        assert_eq!(pool.len(), 24);

        // Next nearest skips the consumed point
        let next = pool.take_nearest(Vertex::new(20.0, 31.0)).unwrap();
        assert_eq!(next, Vertex::new(20.0, 40.0));
    }

    #[test]
    fn test_within_radius() {
        let mut pool = SpawnPointPool::new(grid());
        let center = Vertex::new(20.0, 20.0);
        // Centre plus its four axis neighbours
        assert_eq!(pool.within(center, 10.5).len(), 5);

        let idx = pool.nearest(center).unwrap();
        pool.take(idx);
        let found = pool.within(center, 10.5);
        assert_eq!(found.len(), 4);
        assert!(!found.contains(&idx));
    }

    #[test]
    fn test_exhausted_pool() {
        let mut pool = SpawnPointPool::new(vec![Vertex::new(1.0, 1.0)]);
        assert!(pool.take_nearest(Vertex::ZERO).is_some());
        assert!(pool.is_empty());
        assert_eq!(pool.nearest(Vertex::ZERO), None);
        assert!(pool.available_indices().is_empty());
        assert!(SpawnPointPool::new(Vec::new()).is_empty());
    }
}
