//! Error and diagnostic types for castle layout generation

use thiserror::Error;

use crate::catalog::RoomKind;
use crate::room::RoomId;

/// Errors that can surface from configuration or layout generation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastleError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every attempt failed to find room for the requested catalog
    #[error("capacity unmet: no acceptable layout after {attempts} attempts")]
    CapacityUnmet {
        /// Number of attempts that were made
        attempts: usize,
    },

    /// The brute-force tour solver was asked for too many points
    #[error("tour too large: {count} points (limit {max})")]
    TourTooLarge {
        /// Number of points supplied
        count: usize,
        /// Largest supported point count
        max: usize,
    },
}

/// Result type alias for castle operations
pub type Result<T> = std::result::Result<T, CastleError>;

/// Recoverable conditions recorded while building a layout
///
/// None of these abort an attempt. They are carried on the final
/// [`CastleLayout`](crate::CastleLayout) so callers can inspect how
/// faithfully the catalog was realised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutWarning {
    /// Colinear triangles were dropped from the triangulation
    #[error("{count} degenerate triangles dropped")]
    GeometryDegenerate {
        /// Number of triangles discarded
        count: usize,
    },
    /// A room ran out of growth rounds before reaching its target size
    #[error("room {room} ({}) stalled at {claimed} of {target} triangles", .kind.name())]
    GrowthStalled {
        /// Room that stalled
        room: RoomId,
        /// Kind of the room
        kind: RoomKind,
        /// Triangles held after trimming
        claimed: usize,
        /// Target triangle count
        target: usize,
    },
    /// Outlier trimming removed every triangle of a room
    #[error("room {room} ({}) lost every triangle to trimming", .kind.name())]
    RoomEmptied {
        /// Room that was emptied
        room: RoomId,
        /// Kind of the room
        kind: RoomKind,
    },
    /// A corridor search hit its expansion cap or ran out of nodes
    #[error("no complete corridor from room {from} to room {to}")]
    PathNotFound {
        /// Room the corridor starts from
        from: RoomId,
        /// Room the corridor was heading to
        to: RoomId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CastleError::CapacityUnmet { attempts: 3 };
        assert_eq!(err.to_string(), "capacity unmet: no acceptable layout after 3 attempts");

        let warning = LayoutWarning::GrowthStalled {
            room: 4,
            kind: RoomKind::Kitchen,
            claimed: 7,
            target: 12,
        };
        assert_eq!(warning.to_string(), "room 4 (Kitchen) stalled at 7 of 12 triangles");
    }
}
