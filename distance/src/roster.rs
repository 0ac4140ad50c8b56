//! Per-tick unit roster: the ECS side of the distance engine.
//!
//! The roster is rebuilt from scratch every tick. Units are ordered by tag so
//! the dense distance indices are deterministic. Tags must be unique within a
//! tick.
//!
//! ## Data Access
//! - Reads: SimTick, UnitTag, Position
//! - Writes: UnitRoster

use crate::components::{Position, UnitTag};
use crate::unit::{GameView, UnitSnapshot};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Global simulation tick counter. Doubles as the distance cache frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// All units of the current tick, in distance-index order.
#[derive(Resource, Debug, Default)]
pub struct UnitRoster {
    frame: u64,
    units: Vec<UnitSnapshot>,
    /// Reverse lookup: tag to distance index.
    by_tag: HashMap<UnitTag, usize>,
}

impl UnitRoster {
    /// Drop the previous tick's units and start a new frame.
    pub fn clear(&mut self, frame: u64) {
        self.frame = frame;
        self.units.clear();
        self.by_tag.clear();
    }

    /// Append a unit, assigning it the next dense index.
    pub fn push(&mut self, tag: UnitTag, position: Position) -> usize {
        let index = self.units.len();
        self.units.push(UnitSnapshot::new(tag, position, index));
        let previous = self.by_tag.insert(tag, index);
        debug_assert!(
            previous.is_none(),
            "duplicate unit tag {tag} in roster (indices {previous:?} and {index})"
        );
        index
    }

    /// Look up a unit of this tick by tag.
    pub fn get(&self, tag: UnitTag) -> Option<&UnitSnapshot> {
        self.by_tag.get(&tag).map(|&i| &self.units[i])
    }

    pub fn units(&self) -> &[UnitSnapshot] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl GameView for UnitRoster {
    type Unit = UnitSnapshot;

    fn game_loop(&self) -> u64 {
        self.frame
    }

    fn all_units(&self) -> &[UnitSnapshot] {
        &self.units
    }
}

/// System that rebuilds the roster each tick and hands out distance indices.
pub fn roster_update_system(
    tick: Res<SimTick>,
    mut roster: ResMut<UnitRoster>,
    query: Query<(&UnitTag, &Position)>,
) {
    roster.clear(tick.0);

    let mut units: Vec<_> = query.iter().collect();
    units.sort_by_key(|(tag, _)| **tag);

    for (tag, pos) in units {
        roster.push(*tag, *pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitBundle;

    fn run_roster(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(roster_update_system);
        schedule.run(world);
    }

    #[test]
    fn test_roster_orders_by_tag() {
        let mut world = World::new();
        world.insert_resource(SimTick(4));
        world.insert_resource(UnitRoster::default());

        world.spawn(UnitBundle::new(30, 3.0, 0.0));
        world.spawn(UnitBundle::new(10, 1.0, 0.0));
        world.spawn(UnitBundle::new(20, 2.0, 0.0));

        run_roster(&mut world);

        let roster = world.resource::<UnitRoster>();
        assert_eq!(roster.frame(), 4);
        let tags: Vec<u64> = roster.units().iter().map(|u| u.tag.0).collect();
        assert_eq!(tags, vec![10, 20, 30]);
        for (i, u) in roster.units().iter().enumerate() {
            assert_eq!(u.index, i);
        }
        assert_eq!(roster.get(UnitTag(20)).map(|u| u.position.x), Some(2.0));
        assert!(roster.get(UnitTag(99)).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "duplicate unit tag #1 in roster")]
    fn test_duplicate_tag_panics() {
        let mut roster = UnitRoster::default();
        roster.clear(0);
        roster.push(UnitTag(1), Position::new(0.0, 0.0));
        roster.push(UnitTag(1), Position::new(3.0, 4.0));
    }

    #[test]
    fn test_roster_rebuilt_after_despawn() {
        let mut world = World::new();
        world.insert_resource(SimTick(0));
        world.insert_resource(UnitRoster::default());

        let a = world.spawn(UnitBundle::new(1, 0.0, 0.0)).id();
        world.spawn(UnitBundle::new(2, 5.0, 0.0));
        run_roster(&mut world);
        assert_eq!(world.resource::<UnitRoster>().len(), 2);

        world.despawn(a);
        world.resource_mut::<SimTick>().increment();
        run_roster(&mut world);

        let roster = world.resource::<UnitRoster>();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.frame(), 1);
        assert_eq!(roster.get(UnitTag(2)).map(|u| u.index), Some(0));
    }
}
