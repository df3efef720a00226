//! Castle layout configuration and builder
//!
//! This module provides configuration types for deterministic castle generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::catalog::RoomCatalog;
use crate::error::{CastleError, Result};
use crate::generation::MAX_TOUR_POINTS;

/// Configuration for deterministic castle layout generation
///
/// The same configuration will always produce the identical layout.
///
/// # Example
///
/// ```rust
/// use castle_layout::*;
///
/// let config = LayoutConfigBuilder::new()
///     .seed(42)
///     .catalog(RoomCatalog::keep())
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: LayoutConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Random seed; attempt `i` runs on a generator derived from `seed` and `i`
    pub seed: u64,

    /// Minimum spacing of the triangulated sample points
    pub sample_radius: f64,

    /// Width of the layout region
    pub region_width: f64,

    /// Height of the layout region
    pub region_height: f64,

    /// Poisson-disc candidates tried per active sample
    pub sampling_attempts_per_point: usize,

    /// What to build
    pub catalog: RoomCatalog,

    /// Attempts before giving up with `CapacityUnmet`
    pub max_layout_retries: usize,

    /// Minimum spacing of room spawn points
    ///
    /// Tower spawn points are kept at least twice this far apart, and spawn
    /// points within twice this distance of the region edge are dropped.
    pub spawn_point_radius: f64,

    /// Growth rounds per batch before unfinished rooms are reported as stalled
    pub max_growth_rounds: usize,

    /// A* expansions per corridor before a partial path is accepted
    pub max_path_expansions: usize,

    /// Random draws allowed when placing the towers
    pub max_spawn_attempts: usize,
}

impl LayoutConfig {
    /// Check ranges and cross-field constraints
    ///
    /// The builder runs this on `build()`; [`generate_layout`](crate::generate_layout)
    /// runs it again since every field is public.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a radius or region dimension is not positive,
    /// the catalog is inconsistent, the tower count is 1, 2 or above the tour
    /// limit, or the spawn radius is below the sample radius
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_radius > 0.0 && self.sample_radius.is_finite()) {
            return Err(CastleError::InvalidConfig(format!(
                "Sample radius must be positive (got {})",
                self.sample_radius
            )));
        }
        if !(self.region_width > 0.0
            && self.region_height > 0.0
            && self.region_width.is_finite()
            && self.region_height.is_finite())
        {
            return Err(CastleError::InvalidConfig(format!(
                "Region must have positive size (got {} x {})",
                self.region_width, self.region_height
            )));
        }
        if self.sampling_attempts_per_point == 0 {
            return Err(CastleError::InvalidConfig(
                "Sampling attempts per point must be at least 1".to_string(),
            ));
        }

        self.catalog.validate()?;

        let towers = self.catalog.towers().len();
        if towers > MAX_TOUR_POINTS {
            return Err(CastleError::InvalidConfig(format!(
                "At most {} towers are supported (got {})",
                MAX_TOUR_POINTS, towers
            )));
        }
        if towers == 1 || towers == 2 {
            return Err(CastleError::InvalidConfig(format!(
                "A castle needs no towers or at least 3 to enclose a wall (got {})",
                towers
            )));
        }

        if self.spawn_point_radius < self.sample_radius {
            return Err(CastleError::InvalidConfig(format!(
                "Spawn point radius ({}) must be at least the sample radius ({})",
                self.spawn_point_radius, self.sample_radius
            )));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let builder = LayoutConfigBuilder::new();
        LayoutConfig {
            seed: 0,
            sample_radius: builder.sample_radius,
            region_width: builder.region_width,
            region_height: builder.region_height,
            sampling_attempts_per_point: builder.sampling_attempts_per_point,
            catalog: builder.catalog,
            max_layout_retries: builder.max_layout_retries,
            spawn_point_radius: builder.sample_radius * SPAWN_RADIUS_FACTOR,
            max_growth_rounds: builder.max_growth_rounds,
            max_path_expansions: builder.max_path_expansions,
            max_spawn_attempts: builder.max_spawn_attempts,
        }
    }
}

const DEFAULT_SAMPLE_RADIUS: f64 = 5.0;

/// Spawn point spacing relative to the sample radius when not set explicitly
const SPAWN_RADIUS_FACTOR: f64 = 3.0;

/// Builder for creating LayoutConfig with validation
///
/// # Example
///
/// ```rust
/// use castle_layout::*;
///
/// // Use defaults
/// let config = LayoutConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = LayoutConfigBuilder::new()
///     .seed(12345)
///     .region(120.0, 120.0)
///     .unwrap()
///     .sample_radius(4.0)
///     .unwrap()
///     .catalog(RoomCatalog::keep())
///     .max_layout_retries(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LayoutConfigBuilder {
    seed: Option<u64>,
    sample_radius: f64,
    region_width: f64,
    region_height: f64,
    sampling_attempts_per_point: usize,
    catalog: RoomCatalog,
    max_layout_retries: usize,
    spawn_point_radius: Option<f64>,
    max_growth_rounds: usize,
    max_path_expansions: usize,
    max_spawn_attempts: usize,
}

impl LayoutConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - sample_radius: 5
    /// - region: 200 × 200
    /// - sampling_attempts_per_point: 30
    /// - catalog: [`RoomCatalog::castle`]
    /// - max_layout_retries: 10
    /// - spawn_point_radius: 3 × sample_radius
    /// - max_growth_rounds: 1000
    /// - max_path_expansions: 500
    /// - max_spawn_attempts: 300
    pub fn new() -> Self {
        Self {
            seed: None,
            sample_radius: DEFAULT_SAMPLE_RADIUS,
            region_width: 200.0,
            region_height: 200.0,
            sampling_attempts_per_point: 30,
            catalog: RoomCatalog::castle(),
            max_layout_retries: 10,
            spawn_point_radius: None,
            max_growth_rounds: 1000,
            max_path_expansions: 500,
            max_spawn_attempts: 300,
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the minimum spacing of mesh sample points
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if radius is not a positive finite number
    pub fn sample_radius(mut self, radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(CastleError::InvalidConfig(format!(
                "Sample radius must be positive (got {})",
                radius
            )));
        }
        self.sample_radius = radius;
        Ok(self)
    }

    /// Set the region size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is not positive
    pub fn region(mut self, width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(CastleError::InvalidConfig(format!(
                "Region must have positive size (got {} x {})",
                width, height
            )));
        }
        self.region_width = width;
        self.region_height = height;
        Ok(self)
    }

    /// Set the Poisson-disc candidates tried per active sample
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if attempts is 0
    pub fn sampling_attempts_per_point(mut self, attempts: usize) -> Result<Self> {
        if attempts == 0 {
            return Err(CastleError::InvalidConfig(
                "Sampling attempts per point must be at least 1".to_string(),
            ));
        }
        self.sampling_attempts_per_point = attempts;
        Ok(self)
    }

    /// Set the room catalog
    pub fn catalog(mut self, catalog: RoomCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the number of attempts before giving up
    ///
    /// Zero is accepted; generation then fails immediately with `CapacityUnmet`.
    pub fn max_layout_retries(mut self, retries: usize) -> Self {
        self.max_layout_retries = retries;
        self
    }

    /// Set the spawn point spacing
    ///
    /// If not set, it is three times the sample radius.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if radius is not a positive finite number
    pub fn spawn_point_radius(mut self, radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(CastleError::InvalidConfig(format!(
                "Spawn point radius must be positive (got {})",
                radius
            )));
        }
        self.spawn_point_radius = Some(radius);
        Ok(self)
    }

    /// Set the growth round cap
    pub fn max_growth_rounds(mut self, rounds: usize) -> Self {
        self.max_growth_rounds = rounds;
        self
    }

    /// Set the A* expansion cap per corridor
    pub fn max_path_expansions(mut self, expansions: usize) -> Self {
        self.max_path_expansions = expansions;
        self
    }

    /// Set the number of random draws allowed when placing towers
    pub fn max_spawn_attempts(mut self, attempts: usize) -> Self {
        self.max_spawn_attempts = attempts;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for anything [`LayoutConfig::validate`] rejects
    pub fn build(self) -> Result<LayoutConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let spawn_point_radius = self
            .spawn_point_radius
            .unwrap_or(self.sample_radius * SPAWN_RADIUS_FACTOR);

        let config = LayoutConfig {
            seed,
            sample_radius: self.sample_radius,
            region_width: self.region_width,
            region_height: self.region_height,
            sampling_attempts_per_point: self.sampling_attempts_per_point,
            catalog: self.catalog,
            max_layout_retries: self.max_layout_retries,
            spawn_point_radius,
            max_growth_rounds: self.max_growth_rounds,
            max_path_expansions: self.max_path_expansions,
            max_spawn_attempts: self.max_spawn_attempts,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for LayoutConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
