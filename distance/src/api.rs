//! Public API for the distance engine.
//!
//! This module wraps an ECS world of units, the per-tick roster, and a
//! [`DistanceCalculation`] behind a small interface for the game loop.
//!
//! ## Ticks and Caching
//!
//! `step()` advances the tick and rebuilds the roster. Distance matrices are
//! not built by `step()`: the first distance query of a tick builds them,
//! and every later query of that tick reads the cache.

use crate::calculation::DistanceCalculation;
use crate::components::*;
use crate::config::DistanceConfig;
use crate::error::Result;
use crate::roster::{roster_update_system, SimTick, UnitRoster};
use bevy_ecs::prelude::*;
use tracing::debug;

/// The main distance world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Spawning, moving and removing units
/// - Stepping the simulation forward
/// - Querying distances between units and points
pub struct DistanceWorld {
    world: World,
    schedule: Schedule,
    calculation: DistanceCalculation,
}

impl DistanceWorld {
    /// Create a new empty world with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DistanceConfig::default())
    }

    /// Create a new world with custom configuration.
    pub fn with_config(config: DistanceConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(SimTick(0));
        world.insert_resource(UnitRoster::default());

        let calculation = DistanceCalculation::from_config(&config);
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(roster_update_system);

        let mut sim = Self {
            world,
            schedule,
            calculation,
        };
        // Populate the roster for tick 0.
        sim.schedule.run(&mut sim.world);
        sim
    }

    /// Create a world from a JSON config string.
    pub fn from_json_config(json: &str) -> Result<Self> {
        Ok(Self::with_config(DistanceConfig::from_json(json)?))
    }

    /// Advance one tick and rebuild the roster.
    pub fn step(&mut self) {
        self.world.resource_mut::<SimTick>().increment();
        self.schedule.run(&mut self.world);
        debug!(
            tick = self.current_tick(),
            units = self.roster().len(),
            "distance world stepped"
        );
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimTick>().0
    }

    /// Spawn a unit. Takes part in queries from the next `step()`.
    /// Returns false, spawning nothing, if a unit already has the tag.
    pub fn spawn_unit(&mut self, tag: u64, x: f32, y: f32) -> bool {
        let mut query = self.world.query::<&UnitTag>();
        if query.iter(&self.world).any(|t| t.0 == tag) {
            debug!(tag, "spawn rejected: tag already in use");
            return false;
        }
        self.world.spawn(UnitBundle::new(tag, x, y));
        true
    }

    /// Spawn `count` units on a grid centered at `(center_x, center_y)`.
    /// Returns the number of units spawned; tags already in use are skipped.
    pub fn spawn_mass_units(
        &mut self,
        center_x: f32,
        center_y: f32,
        count: usize,
        spread: f32,
        start_tag: u64,
    ) -> usize {
        if count == 0 {
            return 0;
        }
        let cols = (count as f32).sqrt().ceil() as usize;
        let spacing = spread / cols as f32;

        let mut spawned = 0;
        for i in 0..count {
            let row = i / cols;
            let col = i % cols;
            let x = center_x + (col as f32 - cols as f32 / 2.0) * spacing;
            let y = center_y + (row as f32 - (count / cols) as f32 / 2.0) * spacing;
            if self.spawn_unit(start_tag + i as u64, x, y) {
                spawned += 1;
            }
        }
        spawned
    }

    /// Move a unit. The new position is seen from the next `step()`.
    /// Returns false if no unit has the tag.
    pub fn move_unit(&mut self, tag: u64, x: f32, y: f32) -> bool {
        let mut query = self.world.query::<(&UnitTag, &mut Position)>();
        for (unit_tag, mut pos) in query.iter_mut(&mut self.world) {
            if unit_tag.0 == tag {
                *pos = Position::new(x, y);
                return true;
            }
        }
        false
    }

    /// Remove a unit. Returns false if no unit has the tag.
    pub fn despawn_unit(&mut self, tag: u64) -> bool {
        let mut query = self.world.query::<(Entity, &UnitTag)>();
        let entity = query
            .iter(&self.world)
            .find(|(_, t)| t.0 == tag)
            .map(|(e, _)| e);

        match entity {
            Some(entity) => self.world.despawn(entity),
            None => false,
        }
    }

    /// Squared distance between two units of the current tick.
    /// `None` if either tag is not in this tick's roster.
    pub fn squared_distance(&mut self, a: u64, b: u64) -> Option<f32> {
        let roster = self.world.resource::<UnitRoster>();
        let ua = *roster.get(UnitTag(a))?;
        let ub = *roster.get(UnitTag(b))?;
        Some(self.calculation.squared_distance(roster, &ua, &ub))
    }

    /// Linear distance between two units of the current tick.
    pub fn distance(&mut self, a: u64, b: u64) -> Option<f32> {
        self.squared_distance(a, b).map(f32::sqrt)
    }

    /// Distance from every unit of the current tick to a point,
    /// in distance-index order.
    pub fn distances_to_point(&self, x: f32, y: f32) -> Vec<(UnitTag, f32)> {
        let roster = self.roster();
        roster
            .units()
            .iter()
            .map(|u| u.tag)
            .zip(DistanceCalculation::distance_many(roster.units(), (x, y)))
            .collect()
    }

    /// Tags of units within `range` of unit `tag`, closest first.
    pub fn units_in_range(&mut self, tag: u64, range: f32) -> Option<Vec<UnitTag>> {
        let roster = self.world.resource::<UnitRoster>();
        let unit = roster.get(UnitTag(tag))?;
        let hits = self.calculation.units_in_range(roster, unit, range);
        Some(hits.into_iter().map(|u| u.tag).collect())
    }

    /// Tag of the closest other unit.
    pub fn closest_unit(&mut self, tag: u64) -> Option<UnitTag> {
        let roster = self.world.resource::<UnitRoster>();
        let unit = roster.get(UnitTag(tag))?;
        self.calculation.closest_unit(roster, unit).map(|u| u.tag)
    }

    /// Number of units in the current tick's roster.
    pub fn unit_count(&self) -> usize {
        self.roster().len()
    }

    /// This tick's roster.
    pub fn roster(&self) -> &UnitRoster {
        self.world.resource::<UnitRoster>()
    }

    /// Distance engine (for probes and direct matrix access).
    pub fn calculation(&self) -> &DistanceCalculation {
        &self.calculation
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for DistanceWorld {
    fn default() -> Self {
        Self::new()
    }
}
