//! Pairwise gravitational interaction
//!
//! Every unordered pair of live bodies exchanges equal and opposite impulses
//! along the line between their centres. The scalar acceleration uses the
//! combined mass of the pair and a separation clamped from below so that
//! near-coincident bodies do not produce unbounded kicks.

use crate::physics::body::{Body, BodyHandle, BodyState};
use crate::physics::math::{Scalar, Vector3};

/// Tuning constants for the force evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityParams {
    pub gravitational_constant: Scalar,
    pub min_distance: Scalar,
}

impl Default for GravityParams {
    fn default() -> Self {
        Self {
            gravitational_constant: 0.05,
            min_distance: 1.0,
        }
    }
}

/// Acceleration vector pointing from `a` toward `b`, before the per-body
/// `1/mass` scaling.
pub fn pair_acceleration(a: &BodyState, b: &BodyState, params: &GravityParams) -> Vector3 {
    let offset = b.position - a.position;
    let distance = offset.length().max(params.min_distance);
    let magnitude = params.gravitational_constant * (a.mass + b.mass) / (distance * distance);

    // coincident bodies have no defined direction, so no impulse
    offset.normalized() * magnitude
}

/// Applies one pair's interaction to already-locked states.
#[track_caller]
pub fn apply_pair_gravity_locked(a: &mut BodyState, b: &mut BodyState, params: &GravityParams) {
    a.assert_physical();
    b.assert_physical();

    let acceleration = pair_acceleration(a, b, params);

    a.velocity += acceleration / a.mass;
    b.velocity -= acceleration / b.mass;
}

/// Locks both bodies in id order and applies their mutual attraction.
#[track_caller]
pub fn apply_pair_gravity(a: &Body, b: &Body, params: &GravityParams) {
    let (mut a, mut b) = Body::lock_pair(a, b);
    apply_pair_gravity_locked(&mut a, &mut b, params);
}

/// Index pairs `(i, j)` with `i < j` over `n` bodies.
pub fn unique_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Single-threaded all-pairs force phase.
pub fn accumulate_gravity(bodies: &[BodyHandle], params: &GravityParams) {
    for (i, j) in unique_pairs(bodies.len()) {
        apply_pair_gravity(&bodies[i], &bodies[j], params);
    }
}
