//! Direct (uncached) distance helpers.
//!
//! Everything here works on raw positions and never touches the per-tick
//! matrices. Arbitrary points cannot be indexed into the pairwise cache, so
//! point queries always land here.

use crate::components::Position;
use crate::unit::DistanceUnit;

/// Linear distance between two points.
#[inline]
pub fn distance(p1: impl Into<Position>, p2: impl Into<Position>) -> f32 {
    let (p1, p2) = (p1.into(), p2.into());
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

/// Squared distance between two points.
#[inline]
pub fn distance_squared(p1: impl Into<Position>, p2: impl Into<Position>) -> f32 {
    p1.into().distance_squared_to(&p2.into())
}

/// Distance from every unit to one point, lazily.
///
/// Does not scale well: past ~100 units a cached method is usually cheaper.
pub fn distance_many<'a, U, I, P>(units: I, point: P) -> impl Iterator<Item = f32> + 'a
where
    U: DistanceUnit + 'a,
    I: IntoIterator<Item = &'a U> + 'a,
    P: Into<Position> + 'a,
{
    let point = point.into();
    units.into_iter().map(move |u| distance(u.position(), point))
}

/// Distance from one unit to every point, lazily.
///
/// Same scaling caveat as [`distance_many`].
pub fn distance_to_points<'a, U, I, P>(unit: &U, points: I) -> impl Iterator<Item = f32> + 'a
where
    U: DistanceUnit + ?Sized + 'a,
    I: IntoIterator<Item = P> + 'a,
    P: Into<Position> + 'a,
{
    let pos = unit.position();
    points.into_iter().map(move |p| distance(p, pos))
}
