//! Per-tick statistics and whole-system measurements
//!
//! These are read by the HUD collaborator and by tests checking conservation
//! laws. All helpers lock each body once, so they must not be called while
//! any body lock is held.

use crate::physics::body::BodyHandle;
use crate::physics::math::{Scalar, Vector3};
use std::time::Duration;

/// Summary of one running tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// 1-based count of running ticks, including this one.
    pub tick: u64,
    /// Live bodies after the collision pass.
    pub body_count: usize,
    pub pair_count: usize,
    pub merges: usize,
    pub elapsed: Duration,
}

pub fn total_momentum(bodies: &[BodyHandle]) -> Vector3 {
    bodies
        .iter()
        .fold(Vector3::ZERO, |acc, body| acc + body.lock().momentum())
}

pub fn total_mass(bodies: &[BodyHandle]) -> Scalar {
    bodies.iter().map(|body| body.lock().mass).sum()
}

pub fn total_kinetic_energy(bodies: &[BodyHandle]) -> Scalar {
    bodies.iter().map(|body| body.lock().kinetic_energy()).sum()
}

/// Mass-weighted mean position, or `None` for an empty (massless) set.
pub fn barycenter(bodies: &[BodyHandle]) -> Option<Vector3> {
    let (weighted_positions, total_mass) =
        bodies
            .iter()
            .fold((Vector3::ZERO, 0.0), |(pos_acc, mass_acc), body| {
                let state = body.lock();
                (pos_acc + state.position * state.mass, mass_acc + state.mass)
            });

    if total_mass <= 0.0 {
        return None;
    }

    let barycenter = weighted_positions / total_mass;
    barycenter.is_finite().then_some(barycenter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Body;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn body(mass: Scalar, position: Vector3, velocity: Vector3) -> BodyHandle {
        Arc::new(Body::new(mass, 1.0, position, velocity).unwrap())
    }

    #[test]
    fn test_barycenter_of_empty_set() {
        assert_eq!(barycenter(&[]), None);
    }

    #[test]
    fn test_barycenter_weights_by_mass() {
        // (2*0 + 4*3) / (2+4) = 2 on the x axis
        let bodies = vec![
            body(2.0, Vector3::ZERO, Vector3::ZERO),
            body(4.0, Vector3::new(3.0, 0.0, 0.0), Vector3::ZERO),
        ];

        let centre = barycenter(&bodies).unwrap();
        assert_relative_eq!(centre.x, 2.0);
        assert_relative_eq!(centre.y, 0.0);
        assert_eq!(total_mass(&bodies), 6.0);
    }

    #[test]
    fn test_momentum_and_energy_totals() {
        let bodies = vec![
            body(2.0, Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)),
            body(1.0, Vector3::X, Vector3::new(-2.0, 0.0, 0.0)),
        ];

        assert_eq!(total_momentum(&bodies), Vector3::ZERO);
        assert_eq!(total_kinetic_energy(&bodies), 1.0 + 2.0);
    }

    #[test]
    fn test_default_stats() {
        let stats = TickStats::default();
        assert_eq!(stats.tick, 0);
        assert_eq!(stats.elapsed, Duration::ZERO);
    }
}
