//! Render boundary for castle layouts
//!
//! The generator never draws anything itself. [`emit_layout`] walks a finished
//! [`CastleLayout`] and hands every artifact to a [`Renderer`] as plain
//! triangles, point sets and polylines, each tagged with a [`Category`] and a
//! color from a [`ColorMapper`]. [`MeshData`] is a renderer that collects the
//! primitives into engine-agnostic buffers.

mod colors;

pub use colors::{BasicColorMapper, ColorMapper, CustomColorMapper, RoomColor};

use crate::castle::CastleLayout;
use crate::catalog::RoomKind;
use crate::geometry::{Triangle, Vertex};

/// What a primitive represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    /// Mesh triangles no room claimed
    FreeMesh,
    /// Triangles of a catalog room
    Room(RoomKind),
    /// Hallway cells
    Hallway,
    /// Sampled spawn points
    SpawnPoint,
    /// Spawn points chosen for towers
    TowerPoint,
    /// Closed wall through the towers
    Wall,
    /// Spanning-tree edge between room centres
    MstEdge,
    /// Path of a corridor through the mesh
    Corridor,
    /// Doorway positions
    Door,
}

/// Receives the primitives of a layout
pub trait Renderer {
    /// Filled triangles
    fn triangles(&mut self, category: Category, color: RoomColor, triangles: &[Triangle]);

    /// Point markers of the given size
    fn points(&mut self, category: Category, color: RoomColor, points: &[Vertex], size: f32);

    /// Open polyline through `points`; closed shapes repeat the first point
    fn polyline(&mut self, category: Category, color: RoomColor, points: &[Vertex]);
}

/// Send every artifact of `layout` to `renderer`
///
/// Order: free mesh, catalog rooms, hallways, spawn points, tower points, wall,
/// spanning tree, corridors, doors.
pub fn emit_layout<R, C>(layout: &CastleLayout, renderer: &mut R, color_mapper: &C)
where
    R: Renderer + ?Sized,
    C: ColorMapper<Category> + ?Sized,
{
    let mesh = &layout.mesh;

    let mut claimed = vec![false; mesh.len()];
    for room in &layout.rooms {
        for &t in &room.triangles {
            if let Some(flag) = claimed.get_mut(t) {
                *flag = true;
            }
        }
    }
    let free: Vec<Triangle> = mesh
        .triangles()
        .iter()
        .zip(&claimed)
        .filter(|&(_, &c)| !c)
        .map(|(t, _)| *t)
        .collect();
    if !free.is_empty() {
        renderer.triangles(Category::FreeMesh, color_mapper.map_color(&Category::FreeMesh), &free);
    }

    for room in layout.catalog_rooms() {
        if room.triangles.is_empty() {
            continue;
        }
        let category = Category::Room(room.kind);
        let tris: Vec<Triangle> = room.triangles.iter().map(|&t| *mesh.triangle(t)).collect();
        renderer.triangles(category, color_mapper.map_color(&category), &tris);
    }

    let hallway: Vec<Triangle> = layout
        .hallways()
        .flat_map(|r| r.triangles.iter().map(|&t| *mesh.triangle(t)))
        .collect();
    if !hallway.is_empty() {
        renderer.triangles(Category::Hallway, color_mapper.map_color(&Category::Hallway), &hallway);
    }

    if !layout.spawn_points.is_empty() {
        renderer.points(
            Category::SpawnPoint,
            color_mapper.map_color(&Category::SpawnPoint),
            &layout.spawn_points,
            1.0,
        );
    }

    let towers = layout.tower_points();
    if !towers.is_empty() {
        renderer.points(Category::TowerPoint, color_mapper.map_color(&Category::TowerPoint), towers, 3.0);

        let mut ring = towers.to_vec();
        ring.push(towers[0]);
        renderer.polyline(Category::Wall, color_mapper.map_color(&Category::Wall), &ring);
    }

    let mst_color = color_mapper.map_color(&Category::MstEdge);
    for edge in &layout.mst_edges {
        if let (Some(a), Some(b)) = (layout.rooms[edge.from].center, layout.rooms[edge.to].center) {
            renderer.polyline(Category::MstEdge, mst_color, &[a, b]);
        }
    }

    // Corridor nodes are mesh triangles, drawn through their centroids
    let corridor_color = color_mapper.map_color(&Category::Corridor);
    for corridor in &layout.corridors {
        if corridor.nodes.len() < 2 {
            continue;
        }
        let line: Vec<Vertex> = corridor.nodes.iter().map(|&n| mesh.triangle(n).centroid()).collect();
        renderer.polyline(Category::Corridor, corridor_color, &line);
    }

    if !layout.doors.is_empty() {
        let doors: Vec<Vertex> = layout.doors.iter().map(|d| d.position).collect();
        renderer.points(Category::Door, color_mapper.map_color(&Category::Door), &doors, 2.0);
    }
}

/// Point marker collected by [`MeshData`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    /// Category
    pub category: Category,
    /// Position on the ground plane
    pub position: [f32; 3],
    /// RGBA color
    pub color: RoomColor,
    /// Marker size
    pub size: f32,
}

/// Polyline collected by [`MeshData`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// Category
    pub category: Category,
    /// Points along the line
    pub points: Vec<[f32; 3]>,
    /// RGBA color
    pub color: RoomColor,
}

/// Mesh data ready for rendering
///
/// The layout plane is mapped to `z = 0` with normals along `+z`. Triangles are
/// wound counter-clockwise.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Vec<[f32; 3]>,
    /// Vertex colors (RGBA)
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Point markers
    pub markers: Vec<Marker>,
    /// Polylines
    pub lines: Vec<Line>,
}

impl MeshData {
    /// Create empty mesh data
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh has no primitives at all
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.markers.is_empty() && self.lines.is_empty()
    }

    /// Markers of one category
    pub fn markers_of(&self, category: Category) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.category == category)
    }

    /// Lines of one category
    pub fn lines_of(&self, category: Category) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.category == category)
    }
}

#[inline]
fn to_position(v: Vertex) -> [f32; 3] {
    [v.x as f32, v.y as f32, 0.0]
}

impl Renderer for MeshData {
    fn triangles(&mut self, _category: Category, color: RoomColor, triangles: &[Triangle]) {
        for triangle in triangles {
            let [a, b, c] = triangle.vertices;
            let ccw = (b - a).perp_dot(c - a) >= 0.0;
            let ordered = if ccw { [a, b, c] } else { [a, c, b] };

            let base = self.positions.len() as u32;
            for v in ordered {
                self.positions.push(to_position(v));
                self.normals.push([0.0, 0.0, 1.0]);
                self.colors.push(color);
            }
            self.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
    }

    fn points(&mut self, category: Category, color: RoomColor, points: &[Vertex], size: f32) {
        self.markers.extend(points.iter().map(|&p| Marker {
            category,
            position: to_position(p),
            color,
            size,
        }));
    }

    fn polyline(&mut self, category: Category, color: RoomColor, points: &[Vertex]) {
        if points.len() < 2 {
            return;
        }
        self.lines.push(Line {
            category,
            points: points.iter().map(|&p| to_position(p)).collect(),
            color,
        });
    }
}

/// Generate renderable mesh data from a layout
///
/// # Example
///
/// ```rust,no_run
/// use castle_layout::*;
///
/// let config = LayoutConfigBuilder::new().seed(3).build().unwrap();
/// let layout = generate_layout(&config).unwrap();
/// let mesh = generate_mesh(&layout, &BasicColorMapper);
/// println!("{} triangles, {} markers", mesh.triangle_count(), mesh.markers.len());
/// ```
pub fn generate_mesh<C: ColorMapper<Category> + ?Sized>(layout: &CastleLayout, color_mapper: &C) -> MeshData {
    let mut mesh = MeshData::new();
    emit_layout(layout, &mut mesh, color_mapper);
    log::debug!(
        "[Mesh] {} triangles, {} markers, {} lines",
        mesh.triangle_count(),
        mesh.markers.len(),
        mesh.lines.len()
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{triangulate, MstEdge};
    use crate::room::{Door, Room};

    /// Two-triangle layout: one hallway cell, one free triangle
    fn tiny_layout() -> CastleLayout {
        let mesh = triangulate(&[
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(0.0, 1.0),
        ]);
        assert_eq!(mesh.len(), 2);
        let hall = Room::hallway(0, 0, mesh.triangle(0).centroid());
        let edge = mesh.triangle(0).edges()[0];

        CastleLayout {
            rooms: vec![hall],
            doors: vec![Door::new(0, 0, edge)],
            corridors: Vec::new(),
            mst_edges: Vec::<MstEdge>::new(),
            wall: None,
            spawn_points: vec![Vertex::new(0.5, 0.5)],
            attempts: 1,
            warnings: Vec::new(),
            mesh,
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Category, usize)>,
    }

    impl Renderer for Recorder {
        fn triangles(&mut self, category: Category, _color: RoomColor, triangles: &[Triangle]) {
            self.calls.push((category, triangles.len()));
        }
        fn points(&mut self, category: Category, _color: RoomColor, points: &[Vertex], _size: f32) {
            self.calls.push((category, points.len()));
        }
        fn polyline(&mut self, category: Category, _color: RoomColor, points: &[Vertex]) {
            self.calls.push((category, points.len()));
        }
    }

    #[test]
    fn test_emit_order_and_counts() {
        let layout = tiny_layout();
        let mut recorder = Recorder::default();
        emit_layout(&layout, &mut recorder, &BasicColorMapper);

        assert_eq!(
            recorder.calls,
            vec![
                (Category::FreeMesh, 1),
                (Category::Hallway, 1),
                (Category::SpawnPoint, 1),
                (Category::Door, 1),
            ]
        );
    }

    #[test]
    fn test_mesh_data_buffers() {
        let layout = tiny_layout();
        let mesh = generate_mesh(&layout, &BasicColorMapper);

        assert!(!mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.colors.len(), 6);
        assert_eq!(mesh.markers.len(), 2);
        assert_eq!(mesh.markers_of(Category::Door).count(), 1);

        // All indices in range and every triangle counter-clockwise
        for tri in mesh.indices.chunks(3) {
            let p: Vec<[f32; 3]> = tri.iter().map(|&i| mesh.positions[i as usize]).collect();
            let cross = (p[1][0] - p[0][0]) * (p[2][1] - p[0][1]) - (p[1][1] - p[0][1]) * (p[2][0] - p[0][0]);
            assert!(cross > 0.0);
        }

        let hallway = BasicColorMapper.map_color(&RoomKind::Hallway);
        assert_eq!(mesh.colors.iter().filter(|&&c| c == hallway).count(), 3);
    }

    #[test]
    fn test_polyline_needs_two_points() {
        let mut mesh = MeshData::new();
        mesh.polyline(Category::Wall, [0.0; 4], &[Vertex::ZERO]);
        assert!(mesh.lines.is_empty());

        mesh.polyline(Category::Wall, [0.0; 4], &[Vertex::ZERO, Vertex::X]);
        assert_eq!(mesh.lines_of(Category::Wall).count(), 1);
        assert!(mesh.vertex_count() == 0);
    }
}
