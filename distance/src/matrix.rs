//! Pairwise squared-distance matrices, rebuilt from scratch every tick.
//!
//! Two layouts are available:
//!
//! - [`CondensedMatrix`]: upper triangle without the diagonal, `n·(n−1)/2`
//!   entries. Half the memory and arithmetic, but every lookup goes through
//!   [`square_to_condensed`] and the self pair must be special-cased.
//! - [`SquareMatrix`]: the full symmetric `n×n` matrix, zero diagonal.
//!   Lookups are a single multiply-add.
//!
//! ## Condensed Layout
//!
//! Pairs are stored with the smaller index as the outer loop:
//!
//! ```text
//! n = 4:  (1,0) (2,0) (3,0) (2,1) (3,1) (3,2)
//! offset:   0     1     2     3     4     5
//! ```
//!
//! ## Build Preconditions
//!
//! Checked builds assert that the flattened coordinate array holds exactly
//! `2·n` values and that every unit reports its own slot as its distance
//! index. A failure means the external indexing is out of sync with the unit
//! slice, and any distance read afterwards would be silently wrong.
//!
//! ## Parallel Feature
//!
//! With `--features parallel`, square rows are computed on the rayon pool.

use crate::components::UnitTag;
use crate::unit::DistanceUnit;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Flatten unit positions into `[x0, y0, x1, y1, ...]` in slice order.
pub fn flatten_positions<U: DistanceUnit>(units: &[U]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(2 * units.len());
    for unit in units {
        let pos = unit.position();
        flat.push(pos.x);
        flat.push(pos.y);
    }
    flat
}

/// Assert the flat layout matches the unit slice one-to-one.
fn assert_layout<U: DistanceUnit>(units: &[U], flat: &[f32]) {
    assert_eq!(
        flat.len(),
        2 * units.len(),
        "flattened position count {} does not match 2 * {} units",
        flat.len(),
        units.len()
    );
    for (slot, unit) in units.iter().enumerate() {
        let index = unit.distance_calculation_index();
        assert_eq!(
            index,
            slot,
            "unit {} reports distance index {} but sits at slot {} of {}",
            unit.tag(),
            index,
            slot,
            units.len()
        );
    }
}

#[inline]
fn squared_between(flat: &[f32], i: usize, j: usize) -> f32 {
    let dx = flat[2 * i] - flat[2 * j];
    let dy = flat[2 * i + 1] - flat[2 * j + 1];
    dx * dx + dy * dy
}

/// Number of entries in a condensed matrix over `n` units.
#[inline]
pub fn condensed_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Map a pair of square-matrix indices to its condensed offset.
///
/// Symmetric in `i` and `j`. Panics when `i == j`: the condensed layout has no
/// diagonal, so callers must answer the self pair themselves. Also panics when
/// either index is outside `0..n`.
#[inline]
pub fn square_to_condensed(n: usize, i: usize, j: usize) -> usize {
    assert!(
        i < n && j < n,
        "indices ({i}, {j}) outside a condensed matrix over {n} units"
    );
    assert_ne!(
        i, j,
        "no diagonal elements in a condensed matrix (index {i}); self distance is zero"
    );
    let (i, j) = if i < j { (j, i) } else { (i, j) };
    n * j - j * (j + 1) / 2 + i - 1 - j
}

/// Upper-triangle squared distances for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedMatrix {
    n: usize,
    data: Vec<f32>,
    tags: Vec<UnitTag>,
}

impl CondensedMatrix {
    /// Build from the tick's units. Panics if the indexing is inconsistent.
    pub fn build<U: DistanceUnit>(units: &[U]) -> Self {
        let flat = flatten_positions(units);
        assert_layout(units, &flat);

        let n = units.len();
        let mut data = Vec::with_capacity(condensed_len(n));
        for j in 0..n {
            for i in (j + 1)..n {
                data.push(squared_between(&flat, i, j));
            }
        }
        debug_assert_eq!(data.len(), condensed_len(n));

        Self {
            n,
            data,
            tags: units.iter().map(|u| u.tag()).collect(),
        }
    }

    /// Number of units the matrix was built over.
    pub fn unit_count(&self) -> usize {
        self.n
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Tag that held slot `index` when the matrix was built.
    pub fn tag_at(&self, index: usize) -> Option<UnitTag> {
        self.tags.get(index).copied()
    }

    /// Condensed offset of the pair, using the build-time unit count.
    #[inline]
    pub fn offset(&self, i: usize, j: usize) -> usize {
        square_to_condensed(self.n, i, j)
    }

    /// Squared distance between slots `i` and `j`.
    ///
    /// Panics on the self pair or on indices from outside this build.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(
            i < self.n && j < self.n,
            "indices ({i}, {j}) outside condensed matrix over {} units",
            self.n
        );
        let offset = self.offset(i, j);
        assert!(
            offset < self.data.len(),
            "condensed offset {offset} for indices ({i}, {j}) exceeds {} stored distances",
            self.data.len()
        );
        self.data[offset]
    }
}

/// Full `n×n` squared distances for one tick, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f32>,
    tags: Vec<UnitTag>,
}

impl SquareMatrix {
    /// Build from the tick's units. Panics if the indexing is inconsistent.
    pub fn build<U: DistanceUnit>(units: &[U]) -> Self {
        let flat = flatten_positions(units);
        assert_layout(units, &flat);
        Self::from_flat(units, &flat)
    }

    /// Build without the layout assertions.
    ///
    /// Slightly cheaper, but an indexing bug upstream shows up as a wrong
    /// distance or an opaque out-of-bounds panic instead of a clear message.
    pub fn build_unchecked<U: DistanceUnit>(units: &[U]) -> Self {
        let flat = flatten_positions(units);
        Self::from_flat(units, &flat)
    }

    fn from_flat<U: DistanceUnit>(units: &[U], flat: &[f32]) -> Self {
        let n = flat.len() / 2;
        let mut data = vec![0.0f32; n * n];

        if n > 0 {
            let fill_row = |(i, row): (usize, &mut [f32])| {
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = squared_between(flat, i, j);
                }
            };

            #[cfg(feature = "parallel")]
            data.par_chunks_mut(n).enumerate().for_each(fill_row);

            #[cfg(not(feature = "parallel"))]
            data.chunks_mut(n).enumerate().for_each(fill_row);
        }

        Self {
            n,
            data,
            tags: units.iter().map(|u| u.tag()).collect(),
        }
    }

    /// Number of units the matrix was built over.
    pub fn unit_count(&self) -> usize {
        self.n
    }

    /// Number of stored entries (`n²`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Tag that held slot `index` when the matrix was built.
    pub fn tag_at(&self, index: usize) -> Option<UnitTag> {
        self.tags.get(index).copied()
    }

    /// Squared distance between slots `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.n + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::unit::{snapshots_from_positions, UnitSnapshot};
    use proptest::prelude::*;

    fn triangle() -> Vec<UnitSnapshot> {
        snapshots_from_positions([(0.0, 0.0), (3.0, 4.0), (0.0, 4.0)])
    }

    #[test]
    fn test_condensed_triangle() {
        let m = CondensedMatrix::build(&triangle());
        assert_eq!(m.as_slice(), &[25.0, 16.0, 9.0]);
        assert_eq!(m.get(0, 1), 25.0);
        assert_eq!(m.get(2, 0), 16.0);
        assert_eq!(m.get(1, 2), 9.0);
    }

    #[test]
    fn test_square_triangle() {
        let m = SquareMatrix::build(&triangle());
        assert_eq!(
            m.as_slice(),
            &[
                0.0, 25.0, 16.0, //
                25.0, 0.0, 9.0, //
                16.0, 9.0, 0.0,
            ]
        );
        assert_eq!(m, SquareMatrix::build_unchecked(&triangle()));
    }

    #[test]
    fn test_condensed_layout_order() {
        let n = 4;
        let expected = [(1, 0), (2, 0), (3, 0), (2, 1), (3, 1), (3, 2)];
        for (offset, &(i, j)) in expected.iter().enumerate() {
            assert_eq!(square_to_condensed(n, i, j), offset);
            assert_eq!(square_to_condensed(n, j, i), offset);
        }
        assert_eq!(condensed_len(n), expected.len());
    }

    #[test]
    fn test_empty_builds() {
        let units: Vec<UnitSnapshot> = Vec::new();
        let c = CondensedMatrix::build(&units);
        let s = SquareMatrix::build(&units);
        assert!(c.is_empty());
        assert!(s.is_empty());
        assert_eq!(c.unit_count(), 0);
        assert_eq!(s.unit_count(), 0);
    }

    #[test]
    fn test_single_unit() {
        let units = snapshots_from_positions([(5.0, 5.0)]);
        assert!(CondensedMatrix::build(&units).is_empty());
        assert_eq!(SquareMatrix::build(&units).as_slice(), &[0.0]);
    }

    #[test]
    fn test_tags_recorded() {
        let m = CondensedMatrix::build(&triangle());
        assert_eq!(m.tag_at(2), Some(UnitTag(3)));
        assert_eq!(m.tag_at(3), None);
    }

    #[test]
    #[should_panic(expected = "no diagonal elements")]
    fn test_condensed_self_pair_panics() {
        square_to_condensed(3, 1, 1);
    }

    #[test]
    #[should_panic(expected = "indices (5, 3) outside a condensed matrix over 1 units")]
    fn test_condensed_offset_rejects_out_of_range_indices() {
        square_to_condensed(1, 5, 3);
    }

    #[test]
    #[should_panic(expected = "outside condensed matrix")]
    fn test_condensed_out_of_range_panics() {
        CondensedMatrix::build(&triangle()).get(0, 3);
    }

    #[test]
    #[should_panic(expected = "reports distance index")]
    fn test_renumbered_unit_panics_on_checked_build() {
        let mut units = triangle();
        units[1].index = 2;
        SquareMatrix::build(&units);
    }

    #[test]
    fn test_unchecked_build_ignores_indices() {
        let mut units = triangle();
        units[1].index = 7;
        let m = SquareMatrix::build_unchecked(&units);
        assert_eq!(m.get(0, 1), 25.0);
    }

    #[test]
    fn test_flatten_positions() {
        let units = vec![
            UnitSnapshot::new(UnitTag(9), Position::new(1.0, 2.0), 0),
            UnitSnapshot::new(UnitTag(4), Position::new(3.0, 4.0), 1),
        ];
        assert_eq!(flatten_positions(&units), vec![1.0, 2.0, 3.0, 4.0]);
    }

    proptest! {
        #[test]
        fn prop_condensed_offset_symmetric_and_in_range(
            (n, i, j) in (2usize..300).prop_flat_map(|n| (Just(n), 0..n, 0..n))
        ) {
            prop_assume!(i != j);
            let offset = square_to_condensed(n, i, j);
            prop_assert_eq!(offset, square_to_condensed(n, j, i));
            prop_assert!(offset < condensed_len(n));
        }
    }
}
