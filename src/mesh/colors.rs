//! Color mapping for layout categories

use std::collections::BTreeMap;

use super::Category;
use crate::catalog::RoomKind;

/// RGBA color type
pub type RoomColor = [f32; 4];

/// Trait for mapping layout items to colors
pub trait ColorMapper<T> {
    /// Map an item to an RGBA color
    fn map_color(&self, item: &T) -> RoomColor;
}

/// Default castle palette
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicColorMapper;

impl ColorMapper<RoomKind> for BasicColorMapper {
    fn map_color(&self, kind: &RoomKind) -> RoomColor {
        match kind {
            RoomKind::Tower => [0.45, 0.45, 0.5, 1.0],       // Slate
            RoomKind::Ward => [0.35, 0.6, 0.3, 1.0],         // Grass
            RoomKind::Start => [0.9, 0.85, 0.3, 1.0],        // Gold
            RoomKind::GreatHall => [0.7, 0.2, 0.2, 1.0],     // Crimson
            RoomKind::ThroneRoom => [0.55, 0.1, 0.45, 1.0],  // Purple
            RoomKind::Kitchen => [0.85, 0.5, 0.2, 1.0],      // Orange
            RoomKind::Bottlery => [0.5, 0.3, 0.5, 1.0],
            RoomKind::Buttery => [0.95, 0.85, 0.55, 1.0],
            RoomKind::StoreRoom => [0.55, 0.4, 0.25, 1.0],   // Brown
            RoomKind::Pantry => [0.75, 0.6, 0.4, 1.0],
            RoomKind::Chamber => [0.3, 0.45, 0.75, 1.0],     // Blue
            RoomKind::Chapel => [0.95, 0.95, 0.9, 1.0],      // White
            RoomKind::Barracks => [0.4, 0.35, 0.2, 1.0],
            RoomKind::PlaceOfArms => [0.6, 0.55, 0.45, 1.0],
            RoomKind::MessHall => [0.65, 0.35, 0.3, 1.0],
            RoomKind::Hallway => [0.8, 0.8, 0.75, 1.0],
        }
    }
}

impl ColorMapper<Category> for BasicColorMapper {
    fn map_color(&self, category: &Category) -> RoomColor {
        match category {
            Category::FreeMesh => [0.2, 0.2, 0.22, 1.0],
            Category::Room(kind) => self.map_color(kind),
            Category::Hallway => self.map_color(&RoomKind::Hallway),
            Category::SpawnPoint => [1.0, 1.0, 1.0, 1.0],
            Category::TowerPoint => [1.0, 0.3, 0.3, 1.0],
            Category::Wall => [0.1, 0.1, 0.1, 1.0],
            Category::MstEdge => [0.2, 0.9, 0.9, 1.0],
            Category::Corridor => [0.9, 0.9, 0.2, 1.0],
            Category::Door => [0.3, 0.2, 0.1, 1.0],
        }
    }
}

/// Color mapper with per-kind overrides on top of the basic palette
#[derive(Debug, Clone, Default)]
pub struct CustomColorMapper {
    /// Room kind overrides
    pub rooms: BTreeMap<RoomKind, RoomColor>,
    /// Color for unclaimed triangles, if overridden
    pub free_mesh: Option<RoomColor>,
}

impl CustomColorMapper {
    /// Override the color of one room kind
    pub fn with_room(mut self, kind: RoomKind, color: RoomColor) -> Self {
        self.rooms.insert(kind, color);
        self
    }
}

impl ColorMapper<RoomKind> for CustomColorMapper {
    fn map_color(&self, kind: &RoomKind) -> RoomColor {
        self.rooms
            .get(kind)
            .copied()
            .unwrap_or_else(|| BasicColorMapper.map_color(kind))
    }
}

impl ColorMapper<Category> for CustomColorMapper {
    fn map_color(&self, category: &Category) -> RoomColor {
        match category {
            Category::Room(kind) => self.map_color(kind),
            Category::Hallway => self.map_color(&RoomKind::Hallway),
            Category::FreeMesh => self
                .free_mesh
                .unwrap_or_else(|| BasicColorMapper.map_color(category)),
            other => BasicColorMapper.map_color(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_color_mapper() {
        let mapper = BasicColorMapper;

        let ward = mapper.map_color(&RoomKind::Ward);
        assert_eq!(ward[3], 1.0); // Alpha should be 1.0
        assert!(ward[1] > 0.5); // Green channel should be high

        let room = ColorMapper::<Category>::map_color(&mapper, &Category::Room(RoomKind::Ward));
        assert_eq!(room, ward);
    }

    #[test]
    fn test_custom_color_mapper() {
        let custom = CustomColorMapper::default().with_room(RoomKind::Chapel, [0.0, 0.2, 0.5, 1.0]);

        assert_eq!(custom.map_color(&RoomKind::Chapel), [0.0, 0.2, 0.5, 1.0]);
        assert_eq!(
            custom.map_color(&RoomKind::Kitchen),
            BasicColorMapper.map_color(&RoomKind::Kitchen)
        );
        assert_eq!(
            ColorMapper::<Category>::map_color(&custom, &Category::Room(RoomKind::Chapel)),
            [0.0, 0.2, 0.5, 1.0]
        );
    }

    #[test]
    fn test_hallway_category_matches_kind() {
        let mapper = BasicColorMapper;
        assert_eq!(
            ColorMapper::<Category>::map_color(&mapper, &Category::Hallway),
            mapper.map_color(&RoomKind::Hallway)
        );
    }
}
