//! ECS Components for the distance engine.
//!
//! Components are pure data containers attached to unit entities.
//! The roster system reads them once per tick to build the frame's unit set.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position on the map (x = east/west, y = north/south).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance, skipping the square root. Enough for ordering.
    #[inline]
    pub fn distance_squared_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (f32, f32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable unique identity of a unit. Survives re-indexing between ticks.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UnitTag(pub u64);

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// BUNDLES
// ============================================================================

/// Everything a unit needs to take part in distance queries.
#[derive(Bundle, Debug, Clone, Copy)]
pub struct UnitBundle {
    pub tag: UnitTag,
    pub position: Position,
}

impl UnitBundle {
    pub fn new(tag: u64, x: f32, y: f32) -> Self {
        Self {
            tag: UnitTag(tag),
            position: Position::new(x, y),
        }
    }
}
