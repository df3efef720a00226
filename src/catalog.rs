//! Room catalog
//!
//! Room kinds are plain data: each [`RoomKind`] maps to a [`RoomSpec`] that
//! says how large the room should grow, how it grows, whether it counts as a
//! major room and which support rooms hang off it. The castle itself is
//! described by a list of towers (each with its own support rooms) and a list
//! of free-standing rooms placed anywhere inside the walls.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CastleError, Result};

/// Every kind of room the generator knows how to build
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomKind {
    /// Corner tower; its spawn points define the castle walls
    Tower,
    /// Open courtyard
    Ward,
    /// Entrance
    Start,
    /// Great hall
    GreatHall,
    /// Throne room, supports the great hall
    ThroneRoom,
    /// Kitchen
    Kitchen,
    /// Bottle store, supports the kitchen
    Bottlery,
    /// Buttery, supports the kitchen
    Buttery,
    /// Store room
    StoreRoom,
    /// Pantry, supports the kitchen
    Pantry,
    /// Private chamber
    Chamber,
    /// Chapel
    Chapel,
    /// Barracks
    Barracks,
    /// Drill yard, supports the barracks
    PlaceOfArms,
    /// Mess hall, supports the barracks
    MessHall,
    /// Corridor cell created by the path finder
    Hallway,
}

impl RoomKind {
    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            RoomKind::Tower => "Tower",
            RoomKind::Ward => "Ward",
            RoomKind::Start => "Start",
            RoomKind::GreatHall => "Great Hall",
            RoomKind::ThroneRoom => "Throne Room",
            RoomKind::Kitchen => "Kitchen",
            RoomKind::Bottlery => "Bottlery",
            RoomKind::Buttery => "Buttery",
            RoomKind::StoreRoom => "Store Room",
            RoomKind::Pantry => "Pantry",
            RoomKind::Chamber => "Chamber",
            RoomKind::Chapel => "Chapel",
            RoomKind::Barracks => "Barracks",
            RoomKind::PlaceOfArms => "Place of Arms",
            RoomKind::MessHall => "Mess Hall",
            RoomKind::Hallway => "Hallway",
        }
    }
}

/// How a room claims neighbouring triangles each growth step
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Pick one claimed triangle at random and claim its free neighbours
    #[default]
    RandomWalk,
    /// Claim the free neighbours of every claimed triangle at once
    Wavefront,
}

/// Configuration record for one room kind
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSpec {
    /// Target size in triangles
    pub target_size: usize,
    /// Major rooms get cheaper MST links between each other
    pub is_major: bool,
    /// Growth policy
    pub growth: GrowthPolicy,
    /// Support rooms spawned next to every room of this kind
    pub support_rooms: Vec<RoomKind>,
}

impl RoomSpec {
    /// Minor room that grows by random walk with no support rooms
    pub fn new(target_size: usize) -> Self {
        Self {
            target_size,
            is_major: false,
            growth: GrowthPolicy::RandomWalk,
            support_rooms: Vec::new(),
        }
    }

    /// Mark the room as major
    pub fn major(mut self) -> Self {
        self.is_major = true;
        self
    }

    /// Set the growth policy
    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Set the support rooms
    pub fn supports(mut self, kinds: impl IntoIterator<Item = RoomKind>) -> Self {
        self.support_rooms = kinds.into_iter().collect();
        self
    }
}

/// One tower of the outer wall and the rooms that hang off it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TowerPlan {
    /// Rooms spawned at the spawn points closest to this tower
    pub support_rooms: Vec<RoomKind>,
}

impl TowerPlan {
    /// Tower with the given support rooms
    pub fn new(support_rooms: impl IntoIterator<Item = RoomKind>) -> Self {
        Self {
            support_rooms: support_rooms.into_iter().collect(),
        }
    }
}

/// Data-driven description of what to build
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RoomCatalog {
    specs: BTreeMap<RoomKind, RoomSpec>,
    towers: Vec<TowerPlan>,
    free_rooms: Vec<RoomKind>,
}

impl RoomCatalog {
    /// Empty catalog with no towers
    pub fn new() -> Self {
        Self {
            specs: BTreeMap::new(),
            towers: Vec::new(),
            free_rooms: Vec::new(),
        }
    }

    /// The classic castle: eight towers, kitchens, barracks, a great hall and a ward
    pub fn castle() -> Self {
        use RoomKind::*;

        Self::new()
            .with_spec(Tower, RoomSpec::new(13).growth(GrowthPolicy::Wavefront))
            .with_spec(Ward, RoomSpec::new(100).major())
            .with_spec(Start, RoomSpec::new(20).major())
            .with_spec(GreatHall, RoomSpec::new(55).major().supports([ThroneRoom]))
            .with_spec(ThroneRoom, RoomSpec::new(25))
            .with_spec(
                Kitchen,
                RoomSpec::new(45)
                    .major()
                    .supports([Bottlery, Buttery, StoreRoom, Pantry]),
            )
            .with_spec(Bottlery, RoomSpec::new(20))
            .with_spec(Buttery, RoomSpec::new(20))
            .with_spec(StoreRoom, RoomSpec::new(35))
            .with_spec(Pantry, RoomSpec::new(25))
            .with_spec(Chamber, RoomSpec::new(25))
            .with_spec(Chapel, RoomSpec::new(40).major())
            .with_spec(Barracks, RoomSpec::new(40).major().supports([PlaceOfArms, MessHall]))
            .with_spec(PlaceOfArms, RoomSpec::new(50))
            .with_spec(MessHall, RoomSpec::new(30))
            .with_spec(Hallway, RoomSpec::new(1))
            .with_tower(TowerPlan::new([Barracks]))
            .with_tower(TowerPlan::new([Kitchen]))
            .with_tower(TowerPlan::new([GreatHall]))
            .with_tower(TowerPlan::new([Chamber]))
            .with_tower(TowerPlan::new([Chamber]))
            .with_tower(TowerPlan::new([StoreRoom]))
            .with_tower(TowerPlan::default())
            .with_tower(TowerPlan::new([Chapel]))
            .with_free_room(Ward)
    }

    /// A small keep: four towers, a hall with a chamber and a ward
    ///
    /// Fits comfortably in a 120×120 region and is quick to generate.
    pub fn keep() -> Self {
        use RoomKind::*;

        Self::new()
            .with_spec(Tower, RoomSpec::new(6).growth(GrowthPolicy::Wavefront))
            .with_spec(GreatHall, RoomSpec::new(20).major().supports([Chamber]))
            .with_spec(Chamber, RoomSpec::new(8))
            .with_spec(Kitchen, RoomSpec::new(12).major())
            .with_spec(Ward, RoomSpec::new(25).major())
            .with_spec(Hallway, RoomSpec::new(1))
            .with_tower(TowerPlan::new([GreatHall]))
            .with_tower(TowerPlan::new([Kitchen]))
            .with_tower(TowerPlan::default())
            .with_tower(TowerPlan::default())
            .with_free_room(Ward)
    }

    /// Add or replace the spec for a kind
    pub fn with_spec(mut self, kind: RoomKind, spec: RoomSpec) -> Self {
        self.specs.insert(kind, spec);
        self
    }

    /// Add a tower
    pub fn with_tower(mut self, tower: TowerPlan) -> Self {
        self.towers.push(tower);
        self
    }

    /// Add a room placed at a random spawn point inside the walls
    pub fn with_free_room(mut self, kind: RoomKind) -> Self {
        self.free_rooms.push(kind);
        self
    }

    /// Look up the spec for a kind
    pub fn spec(&self, kind: RoomKind) -> Option<&RoomSpec> {
        self.specs.get(&kind)
    }

    /// Look up the spec for a kind, failing with `InvalidConfig` if absent
    pub fn require(&self, kind: RoomKind) -> Result<&RoomSpec> {
        self.spec(kind).ok_or_else(|| {
            CastleError::InvalidConfig(format!("room kind {} has no catalog entry", kind.name()))
        })
    }

    /// Towers in placement order
    pub fn towers(&self) -> &[TowerPlan] {
        &self.towers
    }

    /// Free-standing rooms in placement order
    pub fn free_rooms(&self) -> &[RoomKind] {
        &self.free_rooms
    }

    /// Number of rooms needed under `kind`, including `kind` itself
    ///
    /// Assumes the catalog has already been validated (no cycles).
    pub fn subtree_size(&self, kind: RoomKind) -> usize {
        1 + self
            .spec(kind)
            .map(|spec| spec.support_rooms.iter().map(|&k| self.subtree_size(k)).sum())
            .unwrap_or(0)
    }

    /// Number of non-tower rooms that need a spawn point inside the walls
    pub fn interior_room_count(&self) -> usize {
        let tower_supports: usize = self
            .towers
            .iter()
            .flat_map(|t| t.support_rooms.iter())
            .map(|&k| self.subtree_size(k))
            .sum();
        let free: usize = self.free_rooms.iter().map(|&k| self.subtree_size(k)).sum();
        tower_supports + free
    }

    /// Check that every referenced kind has a spec and support chains are acyclic
    pub fn validate(&self) -> Result<()> {
        if !self.towers.is_empty() {
            self.require(RoomKind::Tower)?;
        }
        self.require(RoomKind::Hallway)?;

        let roots = self
            .towers
            .iter()
            .flat_map(|t| t.support_rooms.iter())
            .chain(self.free_rooms.iter());
        for &kind in roots {
            self.check_chain(kind, &mut Vec::new())?;
        }
        for &kind in self.specs.keys() {
            self.check_chain(kind, &mut Vec::new())?;
        }
        Ok(())
    }

    fn check_chain(&self, kind: RoomKind, stack: &mut Vec<RoomKind>) -> Result<()> {
        if stack.contains(&kind) {
            return Err(CastleError::InvalidConfig(format!(
                "support room cycle through {}",
                kind.name()
            )));
        }
        let spec = self.require(kind)?;
        stack.push(kind);
        for &support in &spec.support_rooms {
            self.check_chain(support, stack)?;
        }
        stack.pop();
        Ok(())
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self::castle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castle_catalog_is_valid() {
        let catalog = RoomCatalog::castle();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.towers().len(), 8);
        assert_eq!(catalog.free_rooms(), &[RoomKind::Ward]);
        assert_eq!(
            catalog.spec(RoomKind::Tower).unwrap().growth,
            GrowthPolicy::Wavefront
        );
    }

    #[test]
    fn test_subtree_size_counts_nested_supports() {
        let catalog = RoomCatalog::castle();
        assert_eq!(catalog.subtree_size(RoomKind::Kitchen), 5);
        assert_eq!(catalog.subtree_size(RoomKind::Barracks), 3);
        assert_eq!(catalog.subtree_size(RoomKind::Chamber), 1);
    }

    #[test]
    fn test_interior_room_count() {
        // Barracks(3) + Kitchen(5) + GreatHall(2) + Chamber + Chamber + StoreRoom + Chapel + Ward
        assert_eq!(RoomCatalog::castle().interior_room_count(), 15);
        // GreatHall(2) + Kitchen + Ward
        assert_eq!(RoomCatalog::keep().interior_room_count(), 4);
    }

    #[test]
    fn test_missing_spec_is_rejected() {
        let catalog = RoomCatalog::new()
            .with_spec(RoomKind::Hallway, RoomSpec::new(1))
            .with_free_room(RoomKind::Chapel);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_support_cycle_is_rejected() {
        let catalog = RoomCatalog::new()
            .with_spec(RoomKind::Hallway, RoomSpec::new(1))
            .with_spec(RoomKind::Kitchen, RoomSpec::new(5).supports([RoomKind::Pantry]))
            .with_spec(RoomKind::Pantry, RoomSpec::new(5).supports([RoomKind::Kitchen]))
            .with_free_room(RoomKind::Kitchen);
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, CastleError::InvalidConfig(_)));
    }
}
