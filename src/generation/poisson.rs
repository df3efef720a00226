//! Poisson-disc point sampling
//!
//! Produces blue-noise points where no two samples are closer than a given
//! radius. A background grid with cell size `radius / √2` holds at most one
//! sample per cell, so each acceptance test only looks at the surrounding 5×5
//! block of cells.

use std::f64::consts::TAU;
use std::time::Instant;

use rand::Rng;

use crate::geometry::Vertex;

/// Sample points over `[0, width] × [0, height]` with minimum spacing `radius`
///
/// # Arguments
/// * `radius` - Minimum distance between any two samples
/// * `width`, `height` - Size of the sampled region
/// * `max_attempts` - Candidates tried around an active sample before it retires
/// * `rng` - Random number generator
///
/// Returns an empty vector when `radius` is not positive or the region is empty.
///
/// # Example
/// ```
/// use castle_layout::generation::poisson_disc_sample;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let points = poisson_disc_sample(10.0, 100.0, 100.0, 30, &mut rng);
/// assert!(!points.is_empty());
/// ```
pub fn poisson_disc_sample<R: Rng + ?Sized>(
    radius: f64,
    width: f64,
    height: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Vec<Vertex> {
    if !(radius > 0.0 && width > 0.0 && height > 0.0) || !radius.is_finite() {
        return Vec::new();
    }

    let start = Instant::now();
    let cell_size = radius / std::f64::consts::SQRT_2;
    let cols = (width / cell_size).ceil() as usize + 1;
    let rows = (height / cell_size).ceil() as usize + 1;
    let mut grid: Vec<Option<usize>> = vec![None; cols * rows];

    let cell_of = |p: Vertex| -> (usize, usize) {
        (
            ((p.x / cell_size) as usize).min(cols - 1),
            ((p.y / cell_size) as usize).min(rows - 1),
        )
    };

    let mut samples: Vec<Vertex> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let first = Vertex::new(rng.gen::<f64>() * width, rng.gen::<f64>() * height);
    let (cx, cy) = cell_of(first);
    grid[cy * cols + cx] = Some(0);
    samples.push(first);
    active.push(0);

    let radius_sq = radius * radius;

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let origin = samples[active[slot]];
        let mut placed = false;

        for _ in 0..max_attempts {
            let angle = rng.gen::<f64>() * TAU;
            let dist = rng.gen_range(radius..=2.0 * radius);
            let candidate = origin + Vertex::new(angle.cos(), angle.sin()) * dist;

            if candidate.x < 0.0 || candidate.x > width || candidate.y < 0.0 || candidate.y > height {
                continue;
            }

            let (gx, gy) = cell_of(candidate);
            let mut far_enough = true;
            'search: for ny in gy.saturating_sub(2)..=(gy + 2).min(rows - 1) {
                for nx in gx.saturating_sub(2)..=(gx + 2).min(cols - 1) {
                    if let Some(idx) = grid[ny * cols + nx] {
                        if samples[idx].distance_squared(candidate) < radius_sq {
                            far_enough = false;
                            break 'search;
                        }
                    }
                }
            }

            if far_enough {
                let idx = samples.len();
                grid[gy * cols + gx] = Some(idx);
                samples.push(candidate);
                active.push(idx);
                placed = true;
                break;
            }
        }

        if !placed {
            active.swap_remove(slot);
        }
    }

    log::debug!(
        "[Poisson] {} samples over {}x{} (r = {}) in {:?}",
        samples.len(),
        width,
        height,
        radius,
        start.elapsed()
    );

    samples
}

/// Keep points strictly inside `(margin, width - margin) × (margin, height - margin)`
pub fn filter_border(points: &[Vertex], margin: f64, width: f64, height: f64) -> Vec<Vertex> {
    points
        .iter()
        .copied()
        .filter(|p| p.x > margin && p.x < width - margin && p.y > margin && p.y < height - margin)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_minimum_spacing() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points = poisson_disc_sample(10.0, 100.0, 100.0, 30, &mut rng);

        // A 100x100 square at r = 10 holds far more than a handful of samples
        assert!(points.len() > 40, "only {} samples", points.len());
        for (i, a) in points.iter().enumerate() {
            assert!(a.x >= 0.0 && a.x <= 100.0 && a.y >= 0.0 && a.y <= 100.0);
            for b in &points[i + 1..] {
                assert!(a.distance(*b) >= 10.0 - 1e-9);
            }
        }
    }

    #[test]
    fn test_invalid_inputs_return_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(poisson_disc_sample(0.0, 100.0, 100.0, 30, &mut rng).is_empty());
        assert!(poisson_disc_sample(-1.0, 100.0, 100.0, 30, &mut rng).is_empty());
        assert!(poisson_disc_sample(5.0, 0.0, 100.0, 30, &mut rng).is_empty());
        assert!(poisson_disc_sample(f64::NAN, 100.0, 100.0, 30, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let a = poisson_disc_sample(8.0, 60.0, 40.0, 30, &mut ChaCha8Rng::seed_from_u64(7));
        let b = poisson_disc_sample(8.0, 60.0, 40.0, 30, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_border() {
        let points = vec![
            Vertex::new(5.0, 50.0),
            Vertex::new(50.0, 50.0),
            Vertex::new(10.0, 50.0),
            Vertex::new(95.0, 95.0),
        ];
        let kept = filter_border(&points, 10.0, 100.0, 100.0);
        assert_eq!(kept, vec![Vertex::new(50.0, 50.0)]);
    }
}
