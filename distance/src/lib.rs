//! This Bitter Ground - Unit Distance Engine
//!
//! Per-tick pairwise distance queries for large unit counts. A distance
//! method is picked once per session; cached methods build a condensed or
//! square squared-distance matrix on the first query of each tick and serve
//! every later query of that tick from it.
//!
//! `DistanceCalculation` works over any `GameView`. `DistanceWorld` wraps it
//! with a `bevy_ecs` world that keeps the per-tick unit roster.

pub mod api;
pub mod cache;
pub mod calculation;
pub mod components;
pub mod config;
pub mod error;
pub mod matrix;
pub mod metric;
pub mod roster;
pub mod unit;

pub use api::DistanceWorld;
pub use cache::{CacheStats, FrameCache};
pub use calculation::DistanceCalculation;
pub use components::*;
pub use config::{DistanceConfig, DistanceMethod};
pub use error::{DistanceError, Result};
pub use matrix::{square_to_condensed, CondensedMatrix, SquareMatrix};
pub use roster::{roster_update_system, SimTick, UnitRoster};
pub use unit::{DistanceUnit, FrameUnits, GameView, UnitSnapshot};
