//! Capped A* corridor search over a [`NodeGraph`]
//!
//! The open set is a plain vector scanned for the lowest `f`, which keeps
//! tie-breaking predictable (first inserted wins) and is fast enough for the
//! few hundred expansions a corridor is allowed.

use crate::generation::graph::{NodeGraph, NodeId};
use crate::geometry::Vertex;
use crate::room::RoomId;

/// Outcome of a single search
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Nodes from start to the last node reached, inclusive
    pub nodes: Vec<NodeId>,
    /// Accumulated step cost along `nodes`
    pub cost: f64,
    /// True when the goal was not reached
    pub partial: bool,
    /// Nodes expanded during the search
    pub expansions: usize,
}

/// A routed corridor for one spanning-tree edge
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    /// Room the corridor starts in
    pub from: RoomId,
    /// Room the corridor heads for
    pub to: RoomId,
    /// Node path
    pub nodes: Vec<NodeId>,
    /// Accumulated cost
    pub cost: f64,
    /// True when the search gave up before reaching `to`
    pub partial: bool,
}

impl Corridor {
    /// Wrap a search result
    pub fn new(from: RoomId, to: RoomId, path: PathResult) -> Self {
        Self {
            from,
            to,
            nodes: path.nodes,
            cost: path.cost,
            partial: path.partial,
        }
    }

    /// Node positions along the corridor
    pub fn polyline(&self, graph: &NodeGraph) -> Vec<Vertex> {
        self.nodes.iter().map(|&n| graph.node(n).position).collect()
    }
}

#[inline]
fn manhattan(a: Vertex, b: Vertex) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Find a path from `start` to `goal`
///
/// Step costs come from [`NodeKind::step_cost`](crate::generation::NodeKind::step_cost)
/// of the node being entered; the heuristic is the Manhattan distance between
/// node positions. Search state on every node is reset first.
///
/// When `max_expansions` nodes have been expanded, or the open set runs dry,
/// the path to the expanded node with the lowest heuristic (ties: lowest `g`)
/// is returned with `partial` set. The lowest `g` always belongs to the start,
/// so the fallback ranks expanded nodes by closeness to the goal instead.
pub fn find_path(graph: &mut NodeGraph, start: NodeId, goal: NodeId, max_expansions: usize) -> PathResult {
    graph.reset_search();
    let goal_pos = graph.node(goal).position;

    {
        let s = graph.node_mut(start);
        s.g = 0.0;
        s.h = manhattan(s.position, goal_pos);
        s.f = s.h;
        s.open = true;
    }

    let mut open: Vec<NodeId> = vec![start];
    let mut best = start;
    let mut expansions = 0;

    while !open.is_empty() && expansions < max_expansions {
        let mut slot = 0;
        for (i, &id) in open.iter().enumerate().skip(1) {
            if graph.node(id).f < graph.node(open[slot]).f {
                slot = i;
            }
        }
        let current = open.remove(slot);
        {
            let node = graph.node_mut(current);
            node.open = false;
            node.closed = true;
        }
        expansions += 1;

        let (cur_g, cur_h) = (graph.node(current).g, graph.node(current).h);
        let (best_g, best_h) = (graph.node(best).g, graph.node(best).h);
        if cur_h < best_h || (cur_h == best_h && cur_g < best_g) {
            best = current;
        }

        if current == goal {
            return PathResult {
                nodes: trace(graph, goal),
                cost: cur_g,
                partial: false,
                expansions,
            };
        }

        let neighbors = graph.node(current).neighbors.clone();
        for n in neighbors {
            let node = graph.node_mut(n);
            if node.closed {
                continue;
            }
            let tentative = cur_g + node.kind.step_cost();
            if !node.open || tentative < node.g {
                node.g = tentative;
                node.h = manhattan(node.position, goal_pos);
                node.f = node.g + node.h;
                node.parent = Some(current);
                if !node.open {
                    node.open = true;
                    open.push(n);
                }
            }
        }
    }

    log::debug!(
        "[AStar] gave up on {} -> {} after {} expansions",
        start,
        goal,
        expansions
    );
    PathResult {
        nodes: trace(graph, best),
        cost: graph.node(best).g,
        partial: true,
        expansions,
    }
}

fn trace(graph: &NodeGraph, end: NodeId) -> Vec<NodeId> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(parent) = graph.node(current).parent {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::graph::NodeKind;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Unit-spaced 4-connected lattice with random ground
    fn lattice(width: usize, height: usize, seed: u64) -> NodeGraph {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut graph = NodeGraph::new();
        for y in 0..height {
            for x in 0..width {
                let kind = match rng.gen_range(0..3) {
                    0 => NodeKind::Empty,
                    1 => NodeKind::Hallway,
                    _ => NodeKind::Room,
                };
                graph.add_node(Vertex::new(x as f64, y as f64), None, kind);
            }
        }
        for y in 0..height {
            for x in 0..width {
                let id = y * width + x;
                if x + 1 < width {
                    graph.connect(id, id + 1);
                }
                if y + 1 < height {
                    graph.connect(id, id + width);
                }
            }
        }
        graph
    }

    /// Plain Dijkstra with the same entering-node costs
    fn dijkstra(graph: &NodeGraph, start: NodeId, goal: NodeId) -> f64 {
        let mut dist = vec![f64::INFINITY; graph.len()];
        let mut done = vec![false; graph.len()];
        dist[start] = 0.0;
        loop {
            let Some(u) = (0..graph.len())
                .filter(|&i| !done[i] && dist[i].is_finite())
                .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))
            else {
                break;
            };
            done[u] = true;
            for &v in &graph.node(u).neighbors {
                let alt = dist[u] + graph.node(v).kind.step_cost();
                if alt < dist[v] {
                    dist[v] = alt;
                }
            }
        }
        dist[goal]
    }

    #[test]
    fn test_matches_dijkstra_when_uncapped() {
        for seed in 0..5 {
            let mut graph = lattice(9, 7, seed);
            let (start, goal) = (0, graph.len() - 1);
            let expected = dijkstra(&graph, start, goal);

            let result = find_path(&mut graph, start, goal, usize::MAX);
            assert!(!result.partial);
            assert_eq!(result.nodes.first(), Some(&start));
            assert_eq!(result.nodes.last(), Some(&goal));
            approx::assert_abs_diff_eq!(result.cost, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cost_is_monotone_along_path() {
        let mut graph = lattice(10, 10, 11);
        let result = find_path(&mut graph, 3, 96, usize::MAX);

        let mut acc = 0.0;
        for pair in result.nodes.windows(2) {
            assert!(graph.node(pair[0]).neighbors.contains(&pair[1]));
            let step = graph.node(pair[1]).kind.step_cost();
            assert!(step > 0.0);
            acc += step;
        }
        approx::assert_abs_diff_eq!(acc, result.cost, epsilon = 1e-9);
    }

    #[test]
    fn test_cap_returns_partial_path_toward_goal() {
        let mut graph = lattice(20, 20, 4);
        let goal = graph.len() - 1;
        let result = find_path(&mut graph, 0, goal, 10);

        assert!(result.partial);
        assert_eq!(result.expansions, 10);
        assert_eq!(result.nodes[0], 0);
        let last = *result.nodes.last().unwrap();
        let goal_pos = graph.node(goal).position;
        assert!(manhattan(graph.node(last).position, goal_pos) < manhattan(Vertex::ZERO, goal_pos));
    }

    #[test]
    fn test_unreachable_goal_is_partial() {
        let mut graph = NodeGraph::new();
        let a = graph.add_node(Vertex::new(0.0, 0.0), None, NodeKind::Empty);
        let b = graph.add_node(Vertex::new(1.0, 0.0), None, NodeKind::Hallway);
        let c = graph.add_node(Vertex::new(5.0, 0.0), None, NodeKind::Room);
        graph.connect(a, b);

        let result = find_path(&mut graph, a, c, 500);
        assert!(result.partial);
        assert_eq!(result.nodes, vec![a, b]);
        assert_eq!(result.cost, 1.0);
    }

    #[test]
    fn test_start_is_goal() {
        let mut graph = lattice(3, 3, 0);
        let result = find_path(&mut graph, 4, 4, 500);
        assert!(!result.partial);
        assert_eq!(result.nodes, vec![4]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_search_state_is_reset_between_runs() {
        let mut graph = lattice(6, 6, 2);
        let first = find_path(&mut graph, 0, 35, usize::MAX);
        let second = find_path(&mut graph, 0, 35, usize::MAX);
        assert_eq!(first, second);
    }
}
