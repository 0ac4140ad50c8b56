//! The unit-side contract the distance engine consumes.
//!
//! The engine never owns units. It is handed a frame number and an ordered
//! slice of units, and trusts the index each unit reports to be its position
//! in that slice for the whole tick.

use crate::components::{Position, UnitTag};
use serde::{Deserialize, Serialize};

/// A point-like unit that can take part in distance queries.
pub trait DistanceUnit {
    /// Current 2D position.
    fn position(&self) -> Position;

    /// Stable identity, used for the self-pair shortcut and for diagnostics.
    fn tag(&self) -> UnitTag;

    /// Dense zero-based slot in `GameView::all_units`, valid for one tick.
    fn distance_calculation_index(&self) -> usize;
}

impl<U: DistanceUnit + ?Sized> DistanceUnit for &U {
    fn position(&self) -> Position {
        (**self).position()
    }

    fn tag(&self) -> UnitTag {
        (**self).tag()
    }

    fn distance_calculation_index(&self) -> usize {
        (**self).distance_calculation_index()
    }
}

/// The game state as seen by the distance engine for one tick.
pub trait GameView {
    type Unit: DistanceUnit;

    /// Frame counter. Never decreases while a session runs.
    fn game_loop(&self) -> u64;

    /// Every unit of the frame, ordered by distance-calculation index.
    fn all_units(&self) -> &[Self::Unit];
}

/// Plain copy of a unit for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub tag: UnitTag,
    pub position: Position,
    pub index: usize,
}

impl UnitSnapshot {
    pub fn new(tag: UnitTag, position: Position, index: usize) -> Self {
        Self { tag, position, index }
    }
}

impl DistanceUnit for UnitSnapshot {
    #[inline]
    fn position(&self) -> Position {
        self.position
    }

    #[inline]
    fn tag(&self) -> UnitTag {
        self.tag
    }

    #[inline]
    fn distance_calculation_index(&self) -> usize {
        self.index
    }
}

/// A frame number paired with a unit slice. Handy for tests and for callers
/// that keep their own unit storage.
#[derive(Debug, Clone, Copy)]
pub struct FrameUnits<'a, U> {
    pub game_loop: u64,
    pub units: &'a [U],
}

impl<'a, U> FrameUnits<'a, U> {
    pub fn new(game_loop: u64, units: &'a [U]) -> Self {
        Self { game_loop, units }
    }
}

impl<U: DistanceUnit> GameView for FrameUnits<'_, U> {
    type Unit = U;

    fn game_loop(&self) -> u64 {
        self.game_loop
    }

    fn all_units(&self) -> &[U] {
        self.units
    }
}

/// Build snapshots from positions, tagging and indexing them in order.
/// Tags start at 1.
pub fn snapshots_from_positions<I, P>(positions: I) -> Vec<UnitSnapshot>
where
    I: IntoIterator<Item = P>,
    P: Into<Position>,
{
    positions
        .into_iter()
        .enumerate()
        .map(|(i, p)| UnitSnapshot::new(UnitTag(i as u64 + 1), p.into(), i))
        .collect()
}
