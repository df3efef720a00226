//! Room growth over the triangle mesh
//!
//! Rooms start from a spawn point and claim neighbouring triangles from the
//! shared [`TrianglePool`] until they reach their target size. Rooms grown in
//! the same batch take turns, one expansion step each per round, so nearby
//! rooms compete fairly for the triangles between them.
//!
//! Once a room is done it is trimmed: triangles hanging off the room by a
//! single edge are handed back to the pool.

use std::time::Instant;

use rand::Rng;

use crate::catalog::GrowthPolicy;
use crate::error::LayoutWarning;
use crate::generation::delaunay::{TriangleId, TrianglePool, Triangulation};
use crate::room::{Room, RoomState};

/// Minimum number of same-room neighbours a triangle needs to survive trimming
const MIN_ROOM_NEIGHBORS: usize = 2;

/// Result of a growth batch
#[derive(Debug, Clone, Default)]
pub struct GrowthOutcome {
    /// Rounds run before every room finished or the cap fired
    pub rounds: usize,
    /// Rooms that stalled or were emptied by trimming
    pub warnings: Vec<LayoutWarning>,
}

/// Claim the first triangle containing the room's spawn point, plus its free neighbours
///
/// Triangles are searched in pool order and the inclusive circumcircle test is
/// used. Returns false if no unassigned triangle contains the spawn point.
/// A room that already holds triangles is left untouched.
pub fn seed_room(room: &mut Room, pool: &mut TrianglePool, mesh: &Triangulation) -> bool {
    if !room.triangles.is_empty() {
        return true;
    }

    let Some(seed) = pool.find_containing(mesh, room.spawn_point) else {
        return false;
    };

    claim_into(room, pool, seed);
    for &n in mesh.neighbors(seed) {
        claim_into(room, pool, n);
    }
    room.state = RoomState::Growing;
    true
}

/// Run one expansion step; returns the number of newly claimed triangles
pub fn expand_room<R: Rng + ?Sized>(
    room: &mut Room,
    pool: &mut TrianglePool,
    mesh: &Triangulation,
    rng: &mut R,
) -> usize {
    if room.triangles.is_empty() {
        return 0;
    }

    let before = room.triangles.len();
    match room.growth {
        GrowthPolicy::RandomWalk => {
            let pick = room.triangles[rng.gen_range(0..room.triangles.len())];
            for &n in mesh.neighbors(pick) {
                claim_into(room, pool, n);
            }
        }
        GrowthPolicy::Wavefront => {
            let front: Vec<TriangleId> = room.triangles.clone();
            for t in front {
                for &n in mesh.neighbors(t) {
                    claim_into(room, pool, n);
                }
            }
        }
    }
    room.triangles.len() - before
}

/// Release triangles with fewer than two same-room neighbours, repeatedly
///
/// Returns the number of triangles given back to the pool. Released
/// triangles go to the back of the pool order.
pub fn trim_outliers(room: &mut Room, pool: &mut TrianglePool, mesh: &Triangulation) -> usize {
    let mut released = 0;
    loop {
        let outliers: Vec<TriangleId> = room
            .triangles
            .iter()
            .copied()
            .filter(|&t| {
                mesh.neighbors(t)
                    .iter()
                    .filter(|&&n| pool.owner(n) == Some(room.id))
                    .count()
                    < MIN_ROOM_NEIGHBORS
            })
            .collect();

        if outliers.is_empty() {
            break;
        }
        for &t in &outliers {
            pool.release(t);
        }
        room.triangles.retain(|t| !outliers.contains(t));
        released += outliers.len();
    }
    released
}

/// Grow every unbuilt room in `rooms` as one batch
///
/// Each round gives every unfinished room one expansion step, in slice order.
/// A room that reaches its target is trimmed and marked built. Rooms that
/// cannot be seeded, run out of free neighbours, or are still short when
/// `max_rounds` fires are trimmed, marked built and reported as
/// [`LayoutWarning::GrowthStalled`]. None of this is fatal.
pub fn grow_rooms<R: Rng + ?Sized>(
    rooms: &mut [Room],
    pool: &mut TrianglePool,
    mesh: &Triangulation,
    rng: &mut R,
    max_rounds: usize,
) -> GrowthOutcome {
    let start = Instant::now();
    let mut outcome = GrowthOutcome::default();

    let mut pending: Vec<usize> = rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_built())
        .map(|(i, _)| i)
        .collect();

    while !pending.is_empty() && outcome.rounds < max_rounds {
        outcome.rounds += 1;
        let mut still_pending = Vec::with_capacity(pending.len());

        for idx in pending {
            let room = &mut rooms[idx];

            if room.triangles.is_empty() && !seed_room(room, pool, mesh) {
                log::debug!("[Growth] {} #{} found no seed triangle", room.kind.name(), room.id);
                room.state = RoomState::Growing;
                finish_room(room, pool, mesh, true, &mut outcome.warnings);
                continue;
            }
            if room.is_complete() {
                finish_room(room, pool, mesh, false, &mut outcome.warnings);
                continue;
            }

            let claimed = expand_room(room, pool, mesh, rng);
            if room.is_complete() {
                finish_room(room, pool, mesh, false, &mut outcome.warnings);
            } else if claimed == 0 && !has_frontier(room, pool, mesh) {
                finish_room(room, pool, mesh, true, &mut outcome.warnings);
            } else {
                still_pending.push(idx);
            }
        }
        pending = still_pending;
    }

    for idx in pending {
        finish_room(&mut rooms[idx], pool, mesh, true, &mut outcome.warnings);
    }

    log::debug!(
        "[Growth] batch of {} rooms finished after {} rounds in {:?}",
        rooms.len(),
        outcome.rounds,
        start.elapsed()
    );
    outcome
}

/// Grow a single room; same contract as [`grow_rooms`]
pub fn grow_room<R: Rng + ?Sized>(
    room: &mut Room,
    pool: &mut TrianglePool,
    mesh: &Triangulation,
    rng: &mut R,
    max_rounds: usize,
) -> GrowthOutcome {
    grow_rooms(std::slice::from_mut(room), pool, mesh, rng, max_rounds)
}

fn claim_into(room: &mut Room, pool: &mut TrianglePool, id: TriangleId) {
    if pool.claim(id, room.id) {
        room.triangles.push(id);
    }
}

fn has_frontier(room: &Room, pool: &TrianglePool, mesh: &Triangulation) -> bool {
    room.triangles
        .iter()
        .any(|&t| mesh.neighbors(t).iter().any(|&n| pool.is_unassigned(n)))
}

fn finish_room(
    room: &mut Room,
    pool: &mut TrianglePool,
    mesh: &Triangulation,
    stalled: bool,
    warnings: &mut Vec<LayoutWarning>,
) {
    let released = trim_outliers(room, pool, mesh);
    room.state = RoomState::Built;

    if released > 0 {
        log::debug!(
            "[Growth] trimmed {} outliers from {} #{}",
            released,
            room.kind.name(),
            room.id
        );
    }

    if stalled {
        log::warn!(
            "[Growth] {} #{} stalled at {}/{} triangles",
            room.kind.name(),
            room.id,
            room.triangles.len(),
            room.target_size
        );
        warnings.push(LayoutWarning::GrowthStalled {
            room: room.id,
            kind: room.kind,
            claimed: room.triangles.len(),
            target: room.target_size,
        });
    }
    if room.triangles.is_empty() {
        log::warn!("[Growth] {} #{} lost every triangle", room.kind.name(), room.id);
        warnings.push(LayoutWarning::RoomEmptied {
            room: room.id,
            kind: room.kind,
        });
    }
}
