//! Castle layout orchestration
//!
//! A layout is built in attempts. Each attempt samples a fresh mesh, places the
//! towers, checks that the walls leave enough room for the catalog, grows the
//! rooms in three batches (towers, support rooms, free rooms) and finally
//! connects them with corridors. Attempts that cannot fit the catalog are
//! thrown away and retried with a new random stream.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::catalog::RoomKind;
use crate::config::LayoutConfig;
use crate::error::{CastleError, LayoutWarning, Result};
use crate::generation::{
    filter_border, finalize_room, find_path, grow_rooms, poisson_disc_sample, prim_mst,
    shortest_closed_tour, triangulate, BoundBox, Corridor, MstEdge, NodeGraph, NodeKind,
    TowerPolygon, TrianglePool, Triangulation,
};
use crate::geometry::Vertex;
use crate::room::{Door, Room, RoomId};
use crate::spatial::SpawnPointPool;

/// Why a single attempt was discarded
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptFailure {
    /// Not every tower found a spawn point far enough from the others
    #[error("placed {placed} of {wanted} towers")]
    TowerPlacement {
        /// Towers placed before the draws ran out
        placed: usize,
        /// Towers in the catalog
        wanted: usize,
    },

    /// Too few spawn points inside the walls, or too few near a tower
    #[error("{available} spawn points where {required} are needed")]
    Capacity {
        /// Spawn points found
        available: usize,
        /// Spawn points required
        required: usize,
    },

    /// A room could not get a spawn point during placement
    #[error("no spawn point left for {}", .0.name())]
    SpawnExhausted(RoomKind),

    /// Not retryable; aborts generation
    #[error(transparent)]
    Fatal(#[from] CastleError),
}

/// An accepted castle layout
#[derive(Debug, Clone)]
pub struct CastleLayout {
    /// The mesh every room is cut from
    pub mesh: Triangulation,
    /// Catalog rooms followed by hallway cells, indexed by [`RoomId`]
    pub rooms: Vec<Room>,
    /// Doors between rooms
    pub doors: Vec<Door>,
    /// One corridor per spanning-tree edge
    pub corridors: Vec<Corridor>,
    /// Room spanning tree
    pub mst_edges: Vec<MstEdge>,
    /// Castle wall, absent when the catalog has no towers
    pub wall: Option<TowerPolygon>,
    /// Every spawn point the attempt sampled, after border filtering
    pub spawn_points: Vec<Vertex>,
    /// Attempts made, including the accepted one
    pub attempts: usize,
    /// Recoverable problems met on the way
    pub warnings: Vec<LayoutWarning>,
}

impl CastleLayout {
    /// Get a room by id
    #[inline]
    pub fn room(&self, id: RoomId) -> &Room {
        &self.rooms[id]
    }

    /// Corridor cells created by the path finder
    pub fn hallways(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.is_hallway())
    }

    /// Catalog rooms, hallway cells excluded
    pub fn catalog_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| !r.is_hallway())
    }

    /// Rooms of one kind
    pub fn rooms_of_kind(&self, kind: RoomKind) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.kind == kind)
    }

    /// Tower spawn points in wall order
    pub fn tower_points(&self) -> &[Vertex] {
        match &self.wall {
            Some(wall) => wall.vertices(),
            None => &[],
        }
    }

    /// Axis-aligned bounds of every non-empty catalog room, for the spring relaxer
    ///
    /// Mass is the room's triangle count.
    pub fn room_bounds(&self) -> Vec<BoundBox> {
        self.catalog_rooms()
            .filter(|r| !r.triangles.is_empty())
            .map(|r| {
                let mut min = Vertex::splat(f64::INFINITY);
                let mut max = Vertex::splat(f64::NEG_INFINITY);
                for &t in &r.triangles {
                    for v in self.mesh.triangle(t).vertices {
                        min = min.min(v);
                        max = max.max(v);
                    }
                }
                BoundBox::new((min + max) * 0.5, max - min, r.triangles.len() as f64)
            })
            .collect()
    }
}

/// Working state of one attempt
///
/// Owns the mesh, the triangle and spawn pools and the rooms; nothing is
/// shared between attempts.
#[derive(Debug)]
pub struct LayoutAttempt<'a> {
    config: &'a LayoutConfig,
    mesh: Triangulation,
    pool: TrianglePool,
    spawn_points: Vec<Vertex>,
    spawns: SpawnPointPool,
    wall: Option<TowerPolygon>,
    rooms: Vec<Room>,
    doors: Vec<Door>,
    corridors: Vec<Corridor>,
    mst_edges: Vec<MstEdge>,
    warnings: Vec<LayoutWarning>,
}

impl<'a> LayoutAttempt<'a> {
    /// Sample the mesh and the spawn points
    pub fn new<R: Rng + ?Sized>(config: &'a LayoutConfig, rng: &mut R) -> Self {
        let points = poisson_disc_sample(
            config.sample_radius,
            config.region_width,
            config.region_height,
            config.sampling_attempts_per_point,
            rng,
        );
        let mesh = triangulate(&points);
        let pool = TrianglePool::new(&mesh);

        let mut warnings = Vec::new();
        if mesh.degenerate_count() > 0 {
            warnings.push(LayoutWarning::GeometryDegenerate {
                count: mesh.degenerate_count(),
            });
        }

        let spawn_points = filter_border(
            &poisson_disc_sample(
                config.spawn_point_radius,
                config.region_width,
                config.region_height,
                config.sampling_attempts_per_point,
                rng,
            ),
            2.0 * config.spawn_point_radius,
            config.region_width,
            config.region_height,
        );
        let spawns = SpawnPointPool::new(spawn_points.clone());

        log::debug!(
            "[Castle] mesh of {} triangles, {} spawn points",
            mesh.len(),
            spawn_points.len()
        );

        Self {
            config,
            mesh,
            pool,
            spawn_points,
            spawns,
            wall: None,
            rooms: Vec::new(),
            doors: Vec::new(),
            corridors: Vec::new(),
            mst_edges: Vec::new(),
            warnings,
        }
    }

    /// Run every stage and hand back the finished layout
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> std::result::Result<CastleLayout, AttemptFailure> {
        let config = self.config;
        let towers = self.place_towers(rng)?;
        self.build_wall(&towers)?;
        self.check_capacity(&towers)?;

        // Batch 1: towers
        for &spawn in &towers {
            self.push_room(RoomKind::Tower, spawn)?;
        }
        self.grow_batch(0, rng);

        // Batch 2: rooms hanging off the towers
        let batch = self.rooms.len();
        for (tower, plan) in config.catalog.towers().iter().enumerate() {
            for &kind in &plan.support_rooms {
                self.spawn_support(kind, tower)?;
            }
        }
        self.grow_batch(batch, rng);

        // Batch 3: free rooms anywhere inside the walls
        let batch = self.rooms.len();
        for &kind in config.catalog.free_rooms() {
            self.spawn_free(kind, rng)?;
        }
        self.grow_batch(batch, rng);

        for room in &mut self.rooms {
            finalize_room(room, &self.pool, &self.mesh, rng);
        }

        self.connect_rooms();

        // Hallway cells only need their outlines
        let first_hallway = self.rooms.iter().position(Room::is_hallway).unwrap_or(self.rooms.len());
        for room in &mut self.rooms[first_hallway..] {
            finalize_room(room, &self.pool, &self.mesh, rng);
        }

        Ok(CastleLayout {
            mesh: self.mesh,
            rooms: self.rooms,
            doors: self.doors,
            corridors: self.corridors,
            mst_edges: self.mst_edges,
            wall: self.wall,
            spawn_points: self.spawn_points,
            attempts: 1,
            warnings: self.warnings,
        })
    }

    /// Draw tower spawn points at random, rejecting any too close to a placed tower
    ///
    /// Every draw consumes its point, accepted or not.
    fn place_towers<R: Rng + ?Sized>(&mut self, rng: &mut R) -> std::result::Result<Vec<Vertex>, AttemptFailure> {
        let wanted = self.config.catalog.towers().len();
        let min_spacing = 2.0 * self.config.spawn_point_radius;
        let mut towers: Vec<Vertex> = Vec::with_capacity(wanted);

        let mut draws = 0;
        while towers.len() < wanted && draws < self.config.max_spawn_attempts && !self.spawns.is_empty() {
            draws += 1;
            let available = self.spawns.available_indices();
            let index = available[rng.gen_range(0..available.len())];
            let Some(candidate) = self.spawns.take(index) else {
                continue;
            };
            if towers.iter().all(|t| t.distance(candidate) >= min_spacing) {
                towers.push(candidate);
            }
        }

        if towers.len() < wanted {
            return Err(AttemptFailure::TowerPlacement {
                placed: towers.len(),
                wanted,
            });
        }
        Ok(towers)
    }

    /// Order the towers into the shortest wall and keep only spawn points inside it
    fn build_wall(&mut self, towers: &[Vertex]) -> std::result::Result<(), AttemptFailure> {
        if towers.is_empty() {
            return Ok(());
        }

        let tour = shortest_closed_tour(towers)?;
        let wall = TowerPolygon::from_tour(tour);

        let outside: Vec<usize> = self
            .spawns
            .available_indices()
            .into_iter()
            .filter(|&i| !wall.contains(self.spawn_points[i]))
            .collect();
        for i in outside {
            self.spawns.take(i);
        }

        log::debug!(
            "[Castle] wall of {:.1} encloses {} spawn points",
            wall.perimeter(),
            self.spawns.len()
        );
        self.wall = Some(wall);
        Ok(())
    }

    /// Enough interior points for every room, and for each tower's own supports nearby
    fn check_capacity(&self, towers: &[Vertex]) -> std::result::Result<(), AttemptFailure> {
        let required = self.config.catalog.interior_room_count();
        if self.spawns.len() < required {
            return Err(AttemptFailure::Capacity {
                available: self.spawns.len(),
                required,
            });
        }

        let reach = 2.0 * self.config.spawn_point_radius;
        for (plan, &tower) in self.config.catalog.towers().iter().zip(towers) {
            let nearby = self.spawns.within(tower, reach).len();
            if nearby < plan.support_rooms.len() {
                return Err(AttemptFailure::Capacity {
                    available: nearby,
                    required: plan.support_rooms.len(),
                });
            }
        }
        Ok(())
    }

    /// Place a support room at the free spawn point nearest its parent, then its own supports
    fn spawn_support(&mut self, kind: RoomKind, parent: RoomId) -> std::result::Result<(), AttemptFailure> {
        let anchor = self.rooms[parent].spawn_point;
        let spawn = self
            .spawns
            .take_nearest(anchor)
            .ok_or(AttemptFailure::SpawnExhausted(kind))?;

        let id = self.push_room(kind, spawn)?;
        self.rooms[id].parent = Some(parent);
        self.spawn_supports_of(id)
    }

    /// Place a free room at a random interior spawn point, then its supports
    fn spawn_free<R: Rng + ?Sized>(&mut self, kind: RoomKind, rng: &mut R) -> std::result::Result<(), AttemptFailure> {
        let available = self.spawns.available_indices();
        if available.is_empty() {
            return Err(AttemptFailure::SpawnExhausted(kind));
        }
        let index = available[rng.gen_range(0..available.len())];
        let spawn = self
            .spawns
            .take(index)
            .ok_or(AttemptFailure::SpawnExhausted(kind))?;

        let id = self.push_room(kind, spawn)?;
        self.spawn_supports_of(id)
    }

    fn spawn_supports_of(&mut self, id: RoomId) -> std::result::Result<(), AttemptFailure> {
        let supports = self.rooms[id].support_kinds.clone();
        for kind in supports {
            self.spawn_support(kind, id)?;
        }
        Ok(())
    }

    fn push_room(&mut self, kind: RoomKind, spawn: Vertex) -> std::result::Result<RoomId, AttemptFailure> {
        let spec = self.config.catalog.require(kind)?;
        let id = self.rooms.len();
        self.rooms.push(Room::from_spec(id, kind, spec, spawn));
        Ok(id)
    }

    fn grow_batch<R: Rng + ?Sized>(&mut self, first: RoomId, rng: &mut R) {
        let outcome = grow_rooms(
            &mut self.rooms[first..],
            &mut self.pool,
            &self.mesh,
            rng,
            self.config.max_growth_rounds,
        );
        self.warnings.extend(outcome.warnings);
    }

    /// Spanning tree over the rooms, one A* corridor per tree edge, doors where corridors cross rooms
    fn connect_rooms(&mut self) {
        self.mst_edges = prim_mst(&self.rooms);
        let mut graph = NodeGraph::from_mesh(&self.mesh, &self.pool, &self.rooms);

        for edge in self.mst_edges.clone() {
            let (Some(start), Some(goal)) = (
                self.rooms[edge.from].center_triangle,
                self.rooms[edge.to].center_triangle,
            ) else {
                continue;
            };

            let path = find_path(&mut graph, start, goal, self.config.max_path_expansions);
            if path.partial {
                log::warn!(
                    "[Castle] corridor {} -> {} stopped after {} expansions",
                    edge.from,
                    edge.to,
                    path.expansions
                );
                self.warnings.push(LayoutWarning::PathNotFound {
                    from: edge.from,
                    to: edge.to,
                });
            }

            // Empty ground on the path becomes hallway, so later corridors reuse it
            for &node in &path.nodes {
                if graph.node(node).kind != NodeKind::Empty {
                    continue;
                }
                let id = self.rooms.len();
                if self.pool.claim(node, id) {
                    let centroid = self.mesh.triangle(node).centroid();
                    self.rooms.push(Room::hallway(id, node, centroid));
                    graph.set_hallway(node, id);
                }
            }

            for pair in path.nodes.windows(2) {
                self.add_door(&graph, pair[0], pair[1]);
            }

            self.corridors.push(Corridor::new(edge.from, edge.to, path));
        }

        log::debug!(
            "[Castle] {} corridors, {} hallway cells, {} doors",
            self.corridors.len(),
            self.rooms.iter().filter(|r| r.is_hallway()).count(),
            self.doors.len()
        );
    }

    fn add_door(&mut self, graph: &NodeGraph, a: usize, b: usize) {
        let (Some(room_a), Some(room_b)) = (graph.node(a).room, graph.node(b).room) else {
            return;
        };
        if room_a == room_b || (self.rooms[room_a].is_hallway() && self.rooms[room_b].is_hallway()) {
            return;
        }
        if self.doors.iter().any(|d| d.connects(room_a, room_b)) {
            return;
        }
        if let Some(edge) = self.mesh.shared_edge(a, b) {
            self.doors.push(Door::new(room_a, room_b, edge));
        }
    }
}

/// Generate a castle layout
///
/// Attempt `i` runs on a [`ChaCha8Rng`] seeded from `config.seed` with stream
/// `i`, so the same configuration always yields the same layout.
///
/// # Errors
///
/// * [`CastleError::InvalidConfig`] if the configuration does not validate
/// * [`CastleError::CapacityUnmet`] if every attempt was rejected
///
/// # Example
///
/// ```rust,no_run
/// use castle_layout::*;
///
/// let config = LayoutConfigBuilder::new()
///     .seed(7)
///     .catalog(RoomCatalog::keep())
///     .build()
///     .unwrap();
///
/// let layout = generate_layout(&config).unwrap();
/// println!("{} rooms, {} doors", layout.rooms.len(), layout.doors.len());
/// ```
pub fn generate_layout(config: &LayoutConfig) -> Result<CastleLayout> {
    config.validate()?;
    retry(config, |attempt| {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        rng.set_stream(attempt as u64);
        LayoutAttempt::new(config, &mut rng).run(&mut rng)
    })
}

/// Generate a castle layout drawing every random number from `rng`
///
/// Attempts run back to back on the same generator.
///
/// # Errors
///
/// Same as [`generate_layout`].
pub fn generate_layout_with_rng<R: Rng + ?Sized>(config: &LayoutConfig, rng: &mut R) -> Result<CastleLayout> {
    config.validate()?;
    retry(config, |_| LayoutAttempt::new(config, &mut *rng).run(&mut *rng))
}

fn retry<F>(config: &LayoutConfig, mut attempt: F) -> Result<CastleLayout>
where
    F: FnMut(usize) -> std::result::Result<CastleLayout, AttemptFailure>,
{
    let start = Instant::now();

    for i in 0..config.max_layout_retries {
        match attempt(i) {
            Ok(mut layout) => {
                layout.attempts = i + 1;
                log::info!(
                    "[Castle] layout accepted on attempt {} ({} rooms, {} warnings) in {:?}",
                    layout.attempts,
                    layout.rooms.len(),
                    layout.warnings.len(),
                    start.elapsed()
                );
                return Ok(layout);
            }
            Err(AttemptFailure::Fatal(err)) => return Err(err),
            Err(failure) => {
                log::info!("[Castle] attempt {} rejected: {}", i + 1, failure);
            }
        }
    }

    log::warn!(
        "[Castle] gave up after {} attempts in {:?}",
        config.max_layout_retries,
        start.elapsed()
    );
    Err(CastleError::CapacityUnmet {
        attempts: config.max_layout_retries,
    })
}
