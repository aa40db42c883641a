//! Per-tick motion update
//!
//! Velocities already carry this tick's gravitational impulses when the
//! integrator runs, so a step is a single `position += velocity`. The
//! position the body is leaving becomes a trail point when it is far enough
//! from the previous one.

use crate::physics::body::{BodyHandle, BodyState};

#[track_caller]
pub fn integrate(state: &mut BodyState) {
    state.assert_physical();

    let previous = state.position;
    state.position += state.velocity;
    state.position.assert_finite("integrated position");

    let spacing = state.radius;
    state.trail.record(previous, spacing);
}

pub fn integrate_all(bodies: &[BodyHandle]) {
    for body in bodies {
        integrate(&mut body.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::Body;
    use crate::physics::math::Vector3;
    use std::sync::Arc;

    #[test]
    fn test_position_advances_by_velocity() {
        let mut state = BodyState::new(1.0, 1.0, Vector3::ZERO, Vector3::new(0.5, -1.0, 2.0));

        integrate(&mut state);
        integrate(&mut state);

        assert_eq!(state.position, Vector3::new(1.0, -2.0, 4.0));
        assert_eq!(state.velocity, Vector3::new(0.5, -1.0, 2.0));
    }

    #[test]
    fn test_trail_records_departed_positions_sparsely() {
        let mut state = BodyState::new(1.0, 2.0, Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));

        for _ in 0..7 {
            integrate(&mut state);
        }

        // radius 2 and speed 1: every third departed position is kept
        let xs: Vec<f64> = state.trail.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut state = BodyState::new(1.0, 0.5, Vector3::ZERO, Vector3::new(10.0, 0.0, 0.0))
            .with_trail_length(4);

        for _ in 0..50 {
            integrate(&mut state);
        }

        assert_eq!(state.trail.len(), 4);
        assert_eq!(state.trail.latest(), Some(Vector3::new(490.0, 0.0, 0.0)));
    }

    #[test]
    fn test_stationary_body_keeps_single_trail_point() {
        let mut state = BodyState::new(1.0, 1.0, Vector3::new(3.0, 3.0, 3.0), Vector3::ZERO);
        for _ in 0..5 {
            integrate(&mut state);
        }
        assert_eq!(state.trail.len(), 1);
    }

    #[test]
    fn test_integrate_all() {
        let bodies: Vec<BodyHandle> = (0..3)
            .map(|i| {
                Arc::new(
                    Body::new(1.0, 1.0, Vector3::ZERO, Vector3::new(i as f64, 0.0, 0.0)).unwrap(),
                )
            })
            .collect();

        integrate_all(&bodies);

        for (i, body) in bodies.iter().enumerate() {
            assert_eq!(body.snapshot().position.x, i as f64);
        }
    }

    #[test]
    #[should_panic(expected = "non-finite vector")]
    fn test_overflowing_position_panics() {
        let mut state = BodyState::new(
            1.0,
            1.0,
            Vector3::new(f64::MAX, 0.0, 0.0),
            Vector3::new(f64::MAX, 0.0, 0.0),
        );
        integrate(&mut state);
    }
}
