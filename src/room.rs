//! Room and door structures
//!
//! A room is a cluster of mesh triangles grown from a spawn point. Rooms are
//! identified by their index in the attempt's room list.

use crate::catalog::{GrowthPolicy, RoomKind, RoomSpec};
use crate::generation::TriangleId;
use crate::geometry::{Edge, Vertex};

/// Index of a room within one layout
pub type RoomId = usize;

/// Lifecycle of a room
///
/// Rooms only move forward: `Empty → Growing → Built`, and hallway cells are
/// created directly in the `Hallway` state. A room that finds no seed triangle
/// still passes through `Growing` and is built with no triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// Created from the catalog, no triangles yet
    Empty,
    /// Claiming triangles
    Growing,
    /// Growth finished and outliers trimmed
    Built,
    /// Single-triangle corridor cell
    Hallway,
}

/// A room in the castle layout
///
/// # Memory Usage
///
/// Triangle and border lists are small (tens of entries for most kinds, up to a
/// few hundred for a ward), so plain vectors are used throughout.
#[derive(Debug, Clone)]
pub struct Room {
    /// Index in the layout's room list
    pub id: RoomId,

    /// Catalog kind
    pub kind: RoomKind,

    /// Target size in triangles
    pub target_size: usize,

    /// Growth policy copied from the catalog
    pub growth: GrowthPolicy,

    /// Whether the room is a major room
    pub is_major: bool,

    /// Support room kinds declared by the catalog
    pub support_kinds: Vec<RoomKind>,

    /// Room this one supports, if any
    pub parent: Option<RoomId>,

    /// Point the room grows from
    pub spawn_point: Vertex,

    /// Claimed triangles in claim order
    pub triangles: Vec<TriangleId>,

    /// Edges on the room outline, filled in once the room is built
    pub border_edges: Vec<Edge>,

    /// Centroid of one randomly chosen claimed triangle
    pub center: Option<Vertex>,

    /// Triangle whose centroid is the center
    pub center_triangle: Option<TriangleId>,

    /// Lifecycle state
    pub state: RoomState,
}

impl Room {
    /// Create an empty room from a catalog entry
    pub fn from_spec(id: RoomId, kind: RoomKind, spec: &RoomSpec, spawn_point: Vertex) -> Self {
        Self {
            id,
            kind,
            target_size: spec.target_size,
            growth: spec.growth,
            is_major: spec.is_major,
            support_kinds: spec.support_rooms.clone(),
            parent: None,
            spawn_point,
            triangles: Vec::new(),
            border_edges: Vec::new(),
            center: None,
            center_triangle: None,
            state: RoomState::Empty,
        }
    }

    /// Create a single-triangle hallway cell
    pub fn hallway(id: RoomId, triangle: TriangleId, centroid: Vertex) -> Self {
        Self {
            id,
            kind: RoomKind::Hallway,
            target_size: 1,
            growth: GrowthPolicy::RandomWalk,
            is_major: false,
            support_kinds: Vec::new(),
            parent: None,
            spawn_point: centroid,
            triangles: vec![triangle],
            border_edges: Vec::new(),
            center: Some(centroid),
            center_triangle: Some(triangle),
            state: RoomState::Hallway,
        }
    }

    /// Number of claimed triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the room has reached its target size
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.triangles.len() >= self.target_size
    }

    /// Whether growth has finished
    #[inline]
    pub fn is_built(&self) -> bool {
        matches!(self.state, RoomState::Built | RoomState::Hallway)
    }

    /// Whether this is a corridor cell
    #[inline]
    pub fn is_hallway(&self) -> bool {
        self.state == RoomState::Hallway
    }

    /// Whether `other` is this room's parent or child
    #[inline]
    pub fn is_support_pair(&self, other: &Room) -> bool {
        self.parent == Some(other.id) || other.parent == Some(self.id)
    }
}

/// A doorway between two rooms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Door {
    /// First room
    pub room_a: RoomId,
    /// Second room
    pub room_b: RoomId,
    /// Border edge shared by the two rooms
    pub edge: Edge,
    /// Midpoint of the edge
    pub position: Vertex,
}

impl Door {
    /// Create a door on a shared border edge
    pub fn new(room_a: RoomId, room_b: RoomId, edge: Edge) -> Self {
        Self {
            room_a,
            room_b,
            edge,
            position: edge.midpoint(),
        }
    }

    /// Whether the door joins `a` and `b` in either order
    pub fn connects(&self, a: RoomId, b: RoomId) -> bool {
        (self.room_a == a && self.room_b == b) || (self.room_a == b && self.room_b == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_from_spec() {
        let spec = RoomSpec::new(12).major().supports([RoomKind::Pantry]);
        let room = Room::from_spec(3, RoomKind::Kitchen, &spec, Vertex::new(5.0, 5.0));

        assert_eq!(room.id, 3);
        assert_eq!(room.state, RoomState::Empty);
        assert!(room.is_major);
        assert_eq!(room.support_kinds, vec![RoomKind::Pantry]);
        assert!(!room.is_complete());
        assert!(!room.is_built());
    }

    #[test]
    fn test_support_pair() {
        let spec = RoomSpec::new(4);
        let kitchen = Room::from_spec(0, RoomKind::Kitchen, &spec, Vertex::ZERO);
        let mut pantry = Room::from_spec(1, RoomKind::Pantry, &spec, Vertex::ZERO);
        let chapel = Room::from_spec(2, RoomKind::Chapel, &spec, Vertex::ZERO);
        pantry.parent = Some(0);

        assert!(kitchen.is_support_pair(&pantry));
        assert!(pantry.is_support_pair(&kitchen));
        assert!(!kitchen.is_support_pair(&chapel));
    }

    #[test]
    fn test_door_position_and_connects() {
        let edge = Edge::new(Vertex::new(0.0, 0.0), Vertex::new(2.0, 0.0));
        let door = Door::new(4, 7, edge);
        assert_eq!(door.position, Vertex::new(1.0, 0.0));
        assert!(door.connects(7, 4));
        assert!(!door.connects(4, 5));
    }

    #[test]
    fn test_hallway_cell() {
        let hall = Room::hallway(9, 42, Vertex::new(1.0, 2.0));
        assert!(hall.is_hallway());
        assert!(hall.is_built());
        assert_eq!(hall.triangles, vec![42]);
        assert_eq!(hall.center_triangle, Some(42));
    }
}
