//! Procedural castle floor-plan generation
//!
//! A standalone library that lays out a castle on a Delaunay-triangulated
//! region: towers joined by a wall, catalog rooms grown triangle by triangle
//! from spawn points, and hallway corridors found with A* between rooms.
//! Output is engine-agnostic; hand it to any renderer through [`mesh::Renderer`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use castle_layout::*;
//!
//! // Generate a layout
//! let config = LayoutConfigBuilder::new()
//!     .seed(42)
//!     .catalog(RoomCatalog::castle())
//!     .region(200.0, 200.0).unwrap()
//!     .build().unwrap();
//!
//! let layout = generate_layout(&config).unwrap();
//!
//! // Generate mesh for rendering
//! let mesh = generate_mesh(&layout, &BasicColorMapper);
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) spawn point queries using a KD-tree
//! - `serde`: Enables serialization support for configuration, catalog and geometry

// Modules
pub mod error;
pub mod config;
pub mod catalog;
pub mod geometry;
pub mod room;
pub mod generation;
pub mod spatial;
pub mod castle;
pub mod mesh;

// Re-export core types for convenience
pub use error::{CastleError, LayoutWarning, Result};
pub use config::{LayoutConfig, LayoutConfigBuilder};
pub use catalog::{GrowthPolicy, RoomCatalog, RoomKind, RoomSpec, TowerPlan};
pub use geometry::{Edge, Triangle, Vertex};
pub use room::{Door, Room, RoomId, RoomState};
pub use castle::{generate_layout, generate_layout_with_rng, AttemptFailure, CastleLayout, LayoutAttempt};
pub use mesh::{
    emit_layout, generate_mesh, BasicColorMapper, Category, ColorMapper, CustomColorMapper, MeshData, Renderer,
    RoomColor,
};
pub use generation::{LayoutRelaxer, RelaxOptions};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
