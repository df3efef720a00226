//! Room connectivity
//!
//! Built rooms get their outlines and centres here, the mesh is turned into a
//! walkable node graph, and the rooms are linked by a minimum spanning tree
//! that decides which pairs the path finder has to connect.

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::delaunay::{TrianglePool, Triangulation};
use crate::geometry::Vertex;
use crate::room::{Room, RoomId};

/// Index of a node in a [`NodeGraph`]
///
/// Graphs built from a mesh use the triangle id as the node id.
pub type NodeId = usize;

/// What a node stands on
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Unclaimed triangle
    Empty,
    /// Corridor cell
    Hallway,
    /// Triangle inside a room
    Room,
}

impl NodeKind {
    /// Cost of stepping onto a node of this kind
    #[inline]
    pub fn step_cost(self) -> f64 {
        match self {
            NodeKind::Empty => 5.0,
            NodeKind::Hallway => 1.0,
            NodeKind::Room => 2.0,
        }
    }
}

/// A walkable graph node
#[derive(Debug, Clone)]
pub struct Node {
    /// Node id
    pub id: NodeId,
    /// Position used by the heuristic
    pub position: Vertex,
    /// Owning room, if any
    pub room: Option<RoomId>,
    /// Kind of ground
    pub kind: NodeKind,
    /// Adjacent nodes
    pub neighbors: Vec<NodeId>,

    // Search state, reset before every search
    pub(crate) g: f64,
    pub(crate) h: f64,
    pub(crate) f: f64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) open: bool,
    pub(crate) closed: bool,
}

impl Node {
    fn new(id: NodeId, position: Vertex, room: Option<RoomId>, kind: NodeKind) -> Self {
        Self {
            id,
            position,
            room,
            kind,
            neighbors: Vec::new(),
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent: None,
            open: false,
            closed: false,
        }
    }

    fn reset_search(&mut self) {
        self.g = 0.0;
        self.h = 0.0;
        self.f = 0.0;
        self.parent = None;
        self.open = false;
        self.closed = false;
    }
}

/// Walkable graph over the mesh
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    nodes: Vec<Node>,
}

impl NodeGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// One node per triangle, placed at its centroid, with adjacency mirroring the mesh
    pub fn from_mesh(mesh: &Triangulation, pool: &TrianglePool, rooms: &[Room]) -> Self {
        let mut graph = Self::new();
        for (id, triangle) in mesh.triangles().iter().enumerate() {
            let room = pool.owner(id);
            let kind = match room {
                None => NodeKind::Empty,
                Some(r) if rooms.get(r).is_some_and(Room::is_hallway) => NodeKind::Hallway,
                Some(_) => NodeKind::Room,
            };
            graph.add_node(triangle.centroid(), room, kind);
        }
        for id in 0..mesh.len() {
            graph.nodes[id].neighbors = mesh.neighbors(id).to_vec();
        }
        graph
    }

    /// Append a node and return its id
    pub fn add_node(&mut self, position: Vertex, room: Option<RoomId>, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, position, room, kind));
        id
    }

    /// Connect two nodes both ways
    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        if !self.nodes[a].neighbors.contains(&b) {
            self.nodes[a].neighbors.push(b);
        }
        if !self.nodes[b].neighbors.contains(&a) {
            self.nodes[b].neighbors.push(a);
        }
    }

    /// Get a node
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// All nodes
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Turn a node into a hallway cell owned by `room`
    pub fn set_hallway(&mut self, id: NodeId, room: RoomId) {
        let node = &mut self.nodes[id];
        node.kind = NodeKind::Hallway;
        node.room = Some(room);
    }

    /// Clear g/h/f, parents and open/closed flags on every node
    pub fn reset_search(&mut self) {
        for node in &mut self.nodes {
            node.reset_search();
        }
    }
}

/// Compute a built room's border edges and pick its centre
///
/// A border edge is a triangle edge whose neighbour across is missing or owned
/// by a different room. The centre is the centroid of one claimed triangle
/// chosen at random. Rooms without triangles get no centre.
pub fn finalize_room<R: Rng + ?Sized>(
    room: &mut Room,
    pool: &TrianglePool,
    mesh: &Triangulation,
    rng: &mut R,
) {
    room.border_edges.clear();
    for &t in &room.triangles {
        for edge in mesh.triangle(t).edges() {
            let inside = mesh
                .neighbor_across(t, &edge)
                .is_some_and(|n| pool.owner(n) == Some(room.id));
            if !inside {
                room.border_edges.push(edge);
            }
        }
    }

    if room.triangles.is_empty() {
        room.center = None;
        room.center_triangle = None;
    } else {
        let pick = room.triangles[rng.gen_range(0..room.triangles.len())];
        room.center = Some(mesh.triangle(pick).centroid());
        room.center_triangle = Some(pick);
    }
}

/// Edge of the room spanning tree
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MstEdge {
    /// Room already in the tree
    pub from: RoomId,
    /// Room joined by this edge
    pub to: RoomId,
    /// Weight the edge was chosen with
    pub weight: f64,
}

/// Weight of the link between two rooms
///
/// * parent/child support pairs always weigh 1,
/// * two major rooms weigh half their floored centre distance,
/// * everything else weighs the floored centre distance.
///
/// Rooms without a centre are infinitely far apart.
pub fn mst_weight(a: &Room, b: &Room) -> f64 {
    if a.is_support_pair(b) {
        return 1.0;
    }
    let (Some(ca), Some(cb)) = (a.center, b.center) else {
        return f64::INFINITY;
    };
    let d = ca.distance(cb).floor();
    if a.is_major && b.is_major {
        d / 2.0
    } else {
        d
    }
}

/// Minimum spanning tree over rooms with a centre, using Prim's algorithm
///
/// Hallway rooms are skipped. The tree starts at the first eligible room and
/// ties go to the first candidate found. Returns `n - 1` edges for `n`
/// eligible rooms.
pub fn prim_mst(rooms: &[Room]) -> Vec<MstEdge> {
    let eligible: Vec<&Room> = rooms
        .iter()
        .filter(|r| !r.is_hallway() && r.center.is_some())
        .collect();
    let n = eligible.len();
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut link = vec![0usize; n];
    let mut edges = Vec::with_capacity(n - 1);

    in_tree[0] = true;
    for j in 1..n {
        best[j] = mst_weight(eligible[0], eligible[j]);
    }

    for _ in 1..n {
        let mut next = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            match next {
                Some(k) if best[j] >= best[k] => {}
                _ => next = Some(j),
            }
        }
        let Some(k) = next else { break };

        in_tree[k] = true;
        edges.push(MstEdge {
            from: eligible[link[k]].id,
            to: eligible[k].id,
            weight: best[k],
        });

        for j in 0..n {
            if !in_tree[j] {
                let w = mst_weight(eligible[k], eligible[j]);
                if w < best[j] {
                    best[j] = w;
                    link[j] = k;
                }
            }
        }
    }

    log::debug!("[MST] {} rooms, {} edges", n, edges.len());
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RoomKind, RoomSpec};
    use crate::room::RoomState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn placed(id: RoomId, center: Vertex, major: bool) -> Room {
        let mut spec = RoomSpec::new(5);
        if major {
            spec = spec.major();
        }
        let mut room = Room::from_spec(id, RoomKind::Chamber, &spec, center);
        room.center = Some(center);
        room.state = RoomState::Built;
        room
    }

    #[test]
    fn test_mst_weight_rules() {
        let a = placed(0, Vertex::new(0.0, 0.0), true);
        let b = placed(1, Vertex::new(10.7, 0.0), true);
        let c = placed(2, Vertex::new(0.0, 7.9), false);
        let mut d = placed(3, Vertex::new(90.0, 90.0), false);
        d.parent = Some(0);

        assert_eq!(mst_weight(&a, &b), 5.0);
        assert_eq!(mst_weight(&a, &c), 7.0);
        assert_eq!(mst_weight(&a, &d), 1.0);
        assert_eq!(mst_weight(&d, &a), 1.0);
    }

    #[test]
    fn test_prim_spans_all_rooms() {
        let rooms: Vec<Room> = (0..8)
            .map(|i| {
                let a = i as f64 * 0.9;
                placed(i, Vertex::new(a.cos() * (20.0 + i as f64), a.sin() * 30.0), i % 3 == 0)
            })
            .collect();
        let edges = prim_mst(&rooms);
        assert_eq!(edges.len(), rooms.len() - 1);

        // Union-find: every edge joins two separate components, so the tree is acyclic and connected
        let mut parent: Vec<usize> = (0..rooms.len()).collect();
        fn find(p: &mut Vec<usize>, x: usize) -> usize {
            let mut x = x;
            while p[x] != x {
                p[x] = p[p[x]];
                x = p[x];
            }
            x
        }
        for e in &edges {
            let (ra, rb) = (find(&mut parent, e.from), find(&mut parent, e.to));
            assert_ne!(ra, rb, "cycle through {:?}", e);
            parent[ra] = rb;
        }
        let root = find(&mut parent, 0);
        for i in 0..rooms.len() {
            assert_eq!(find(&mut parent, i), root);
        }
    }

    #[test]
    fn test_prim_prefers_support_links() {
        let mut rooms = vec![
            placed(0, Vertex::new(0.0, 0.0), false),
            placed(1, Vertex::new(5.0, 0.0), false),
            placed(2, Vertex::new(100.0, 0.0), false),
        ];
        rooms[2].parent = Some(0);

        let edges = prim_mst(&rooms);
        assert_eq!(edges[0], MstEdge { from: 0, to: 2, weight: 1.0 });
        assert_eq!(edges[1].to, 1);
    }

    #[test]
    fn test_prim_skips_hallways_and_empty_rooms() {
        let mut rooms = vec![
            placed(0, Vertex::new(0.0, 0.0), false),
            placed(1, Vertex::new(5.0, 0.0), false),
            Room::hallway(2, 0, Vertex::new(2.0, 0.0)),
            placed(3, Vertex::new(9.0, 0.0), false),
        ];
        rooms[3].center = None;
        let edges = prim_mst(&rooms);
        assert_eq!(edges.len(), 1);
        assert!(prim_mst(&rooms[..1]).is_empty());
    }

    #[test]
    fn test_finalize_room_border_and_center() {
        // Unit square split along a diagonal: one triangle per room
        let points = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(0.0, 1.0),
        ];
        let mesh = Triangulation::new(&points);
        let mut pool = TrianglePool::new(&mesh);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut room = placed(0, Vertex::ZERO, false);
        room.center = None;
        pool.claim(0, 0);
        pool.claim(1, 0);
        room.triangles = vec![0, 1];
        finalize_room(&mut room, &pool, &mesh, &mut rng);

        // The diagonal is internal, the four sides are border
        assert_eq!(room.border_edges.len(), 4);
        let diagonal = mesh.shared_edge(0, 1).unwrap();
        assert!(!room.border_edges.contains(&diagonal));
        let t = room.center_triangle.unwrap();
        assert_eq!(room.center, Some(mesh.triangle(t).centroid()));

        // Give the second triangle away: the diagonal becomes border
        pool.release(1);
        pool.claim(1, 5);
        room.triangles = vec![0];
        finalize_room(&mut room, &pool, &mesh, &mut rng);
        assert_eq!(room.border_edges.len(), 3);
        assert!(room.border_edges.contains(&diagonal));
    }

    #[test]
    fn test_graph_from_mesh_kinds() {
        let points = vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(0.0, 1.0),
        ];
        let mesh = Triangulation::new(&points);
        let mut pool = TrianglePool::new(&mesh);
        let rooms = vec![Room::hallway(0, 1, mesh.triangle(1).centroid())];
        pool.claim(1, 0);

        let mut graph = NodeGraph::from_mesh(&mesh, &pool, &rooms);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(0).kind, NodeKind::Empty);
        assert_eq!(graph.node(1).kind, NodeKind::Hallway);
        assert_eq!(graph.node(0).neighbors, vec![1]);

        graph.set_hallway(0, 3);
        assert_eq!(graph.node(0).kind, NodeKind::Hallway);
        assert_eq!(graph.node(0).room, Some(3));
    }
}
