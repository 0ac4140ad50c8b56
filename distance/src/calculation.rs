//! Distance query façade.
//!
//! [`DistanceCalculation`] answers every distance query of a tick through the
//! method picked at startup. Cached methods build their matrix on the first
//! query of a new frame and serve the rest of the frame from it.
//!
//! ## Method Selection
//!
//! The method is chosen once per session, either at construction or with
//! [`DistanceCalculation::select_method`] before the first unit query. After
//! that, asking for a different method is a configuration error.
//!
//! ## Shared Cache Slot
//!
//! There is one cache slot per layout, keyed only by frame. Querying two
//! different unit sets within the same frame reuses whichever was built first.

use crate::cache::{CacheStats, FrameCache};
use crate::components::{Position, UnitTag};
use crate::config::{DistanceConfig, DistanceMethod};
use crate::error::{DistanceError, Result};
use crate::matrix::{CondensedMatrix, SquareMatrix};
use crate::metric;
use crate::unit::{DistanceUnit, GameView};
use tracing::{debug, info, warn};

/// Per-session distance engine with frame-gated matrix caches.
#[derive(Debug, Default)]
pub struct DistanceCalculation {
    method: DistanceMethod,
    /// Set once a method is selected or the first unit query ran.
    locked: bool,
    condensed: FrameCache<CondensedMatrix>,
    square: FrameCache<SquareMatrix>,
}

impl DistanceCalculation {
    /// Create an engine with the default method, still open for selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine locked to `method`.
    pub fn with_method(method: DistanceMethod) -> Self {
        info!(method = ?method, "distance method selected");
        Self {
            method,
            locked: true,
            ..Self::default()
        }
    }

    pub fn from_config(config: &DistanceConfig) -> Self {
        Self::with_method(config.method)
    }

    /// Active method.
    pub fn method(&self) -> DistanceMethod {
        self.method
    }

    /// Pick the method for this session.
    ///
    /// Re-selecting the active method is a no-op. Switching after a selection
    /// or after the first unit query fails with [`DistanceError::MethodLocked`].
    pub fn select_method(&mut self, method: DistanceMethod) -> Result<()> {
        if self.locked {
            if method == self.method {
                warn!(method = ?method, "distance method already selected, ignoring");
                return Ok(());
            }
            return Err(DistanceError::MethodLocked {
                current: self.method,
                requested: method,
            });
        }
        self.method = method;
        self.locked = true;
        info!(method = ?method, "distance method selected");
        Ok(())
    }

    /// Pick the method by numeric mode (0..=3).
    pub fn select_strategy(&mut self, mode: u8) -> Result<()> {
        self.select_method(DistanceMethod::try_from(mode)?)
    }

    // ------------------------------------------------------------------------
    // Cached matrices
    // ------------------------------------------------------------------------

    /// Condensed matrix for the view's frame, rebuilt if stale.
    pub fn condensed<V: GameView>(&mut self, view: &V) -> &CondensedMatrix {
        let frame = view.game_loop();
        let units = view.all_units();
        self.condensed.get_or_build(frame, || {
            debug!(frame, units = units.len(), "rebuilding condensed distance matrix");
            CondensedMatrix::build(units)
        })
    }

    /// Square matrix for the view's frame, rebuilt if stale.
    ///
    /// Uses the unchecked build under [`DistanceMethod::SquareUnchecked`].
    pub fn square<V: GameView>(&mut self, view: &V) -> &SquareMatrix {
        let frame = view.game_loop();
        let units = view.all_units();
        let unchecked = self.method == DistanceMethod::SquareUnchecked;
        self.square.get_or_build(frame, || {
            debug!(frame, units = units.len(), unchecked, "rebuilding square distance matrix");
            if unchecked {
                SquareMatrix::build_unchecked(units)
            } else {
                SquareMatrix::build(units)
            }
        })
    }

    /// Make sure the active method's matrix is current for the view's frame.
    /// No-op for [`DistanceMethod::Direct`].
    pub fn calculate_distances<V: GameView>(&mut self, view: &V) {
        if !self.method.is_cached() {
            return;
        }
        if self.method == DistanceMethod::Condensed {
            self.condensed(view);
        } else {
            self.square(view);
        }
    }

    // ------------------------------------------------------------------------
    // Unit queries
    // ------------------------------------------------------------------------

    /// Squared distance between two units of the view's frame.
    pub fn squared_distance<V, U>(&mut self, view: &V, a: &U, b: &U) -> f32
    where
        V: GameView,
        U: DistanceUnit + ?Sized,
    {
        self.locked = true;
        match self.method {
            DistanceMethod::Direct => a.position().distance_squared_to(&b.position()),
            DistanceMethod::Condensed => {
                // The diagonal is not stored.
                if a.tag() == b.tag() {
                    return 0.0;
                }
                let matrix = self.condensed(view);
                let i = assert_slot(matrix.tag_at(a.distance_calculation_index()), a, matrix.unit_count());
                let j = assert_slot(matrix.tag_at(b.distance_calculation_index()), b, matrix.unit_count());
                let offset = matrix.offset(i, j);
                assert!(
                    offset < matrix.len(),
                    "condensed offset {offset} is beyond the {} calculated distances, units {} and {}",
                    matrix.len(),
                    a.tag(),
                    b.tag()
                );
                matrix.as_slice()[offset]
            }
            DistanceMethod::Square => {
                let matrix = self.square(view);
                let i = assert_slot(matrix.tag_at(a.distance_calculation_index()), a, matrix.unit_count());
                let j = assert_slot(matrix.tag_at(b.distance_calculation_index()), b, matrix.unit_count());
                matrix.get(i, j)
            }
            DistanceMethod::SquareUnchecked => {
                let (i, j) = (a.distance_calculation_index(), b.distance_calculation_index());
                self.square(view).get(i, j)
            }
        }
    }

    /// Linear distance between two units of the view's frame.
    pub fn unit_distance<V, U>(&mut self, view: &V, a: &U, b: &U) -> f32
    where
        V: GameView,
        U: DistanceUnit + ?Sized,
    {
        self.squared_distance(view, a, b).sqrt()
    }

    /// Units of the view within `range` of `unit`, closest first.
    pub fn units_in_range<'v, V>(&mut self, view: &'v V, unit: &V::Unit, range: f32) -> Vec<&'v V::Unit>
    where
        V: GameView,
    {
        let range_sq = range * range;
        let mut hits: Vec<(f32, &V::Unit)> = Vec::new();
        for other in view.all_units() {
            let d = self.squared_distance(view, unit, other);
            if d <= range_sq {
                hits.push((d, other));
            }
        }
        hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.into_iter().map(|(_, u)| u).collect()
    }

    /// Closest other unit to `unit`, if any.
    pub fn closest_unit<'v, V>(&mut self, view: &'v V, unit: &V::Unit) -> Option<&'v V::Unit>
    where
        V: GameView,
    {
        let mut best: Option<(f32, &V::Unit)> = None;
        for other in view.all_units() {
            if other.tag() == unit.tag() {
                continue;
            }
            let d = self.squared_distance(view, unit, other);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, other));
            }
        }
        best.map(|(_, u)| u)
    }

    // ------------------------------------------------------------------------
    // Point queries (never cached)
    // ------------------------------------------------------------------------

    /// Linear distance between two points.
    pub fn distance(p1: impl Into<Position>, p2: impl Into<Position>) -> f32 {
        metric::distance(p1, p2)
    }

    /// Distances from every unit to `point`. See [`metric::distance_many`].
    pub fn distance_many<'a, U, I, P>(units: I, point: P) -> impl Iterator<Item = f32> + 'a
    where
        U: DistanceUnit + 'a,
        I: IntoIterator<Item = &'a U> + 'a,
        P: Into<Position> + 'a,
    {
        metric::distance_many(units, point)
    }

    /// Distances from `unit` to every point. See [`metric::distance_to_points`].
    pub fn distance_to_points<'a, U, I, P>(unit: &U, points: I) -> impl Iterator<Item = f32> + 'a
    where
        U: DistanceUnit + ?Sized + 'a,
        I: IntoIterator<Item = P> + 'a,
        P: Into<Position> + 'a,
    {
        metric::distance_to_points(unit, points)
    }

    // ------------------------------------------------------------------------
    // Probes
    // ------------------------------------------------------------------------

    /// Total matrix builds across both layouts.
    pub fn build_count(&self) -> u64 {
        self.condensed.build_count() + self.square.build_count()
    }

    pub fn condensed_stats(&self) -> CacheStats {
        self.condensed.stats()
    }

    pub fn square_stats(&self) -> CacheStats {
        self.square.stats()
    }
}

/// Check that `unit` still owns the slot it claims in a built matrix.
fn assert_slot<U: DistanceUnit + ?Sized>(built: Option<UnitTag>, unit: &U, unit_count: usize) -> usize {
    let index = unit.distance_calculation_index();
    match built {
        Some(tag) if tag == unit.tag() => index,
        Some(tag) => panic!(
            "unit {} claims distance index {index}, which belonged to unit {tag} when the matrix was built",
            unit.tag()
        ),
        None => panic!(
            "unit {} has distance index {index}, outside the {unit_count} units of this frame's matrix",
            unit.tag()
        ),
    }
}
