//! Collision detection and resolution through momentum-conserving mergers
//!
//! Two bodies collide when their centres are no farther apart than the sum
//! of their radii. The heavier body survives and absorbs the lighter one:
//! - Total mass is conserved
//! - Total momentum is conserved
//! - Volume is conserved (constant density), so `r = cbrt(r_a³ + r_b³)`
//! - The survivor moves to the pair's centre of mass
//!
//! The kinetic energy a perfectly inelastic merge destroys is turned into
//! temperature on the survivor.

use crate::physics::body::{Body, BodyHandle, BodyId, BodyState};
use crate::physics::gravity::unique_pairs;
use crate::physics::math::Scalar;
use tracing::debug;

pub const DEFAULT_HEAT_FACTOR: Scalar = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    pub survivor: BodyId,
    pub absorbed: BodyId,
    pub energy_lost: Scalar,
}

/// Whether two bodies touch or overlap. Coincident centres always collide.
pub fn in_contact(a: &BodyState, b: &BodyState) -> bool {
    a.position.distance(b.position) <= a.radius + b.radius
}

/// Folds `absorbed` into `survivor` and invalidates `absorbed`.
///
/// Returns the kinetic energy lost in the merge.
#[track_caller]
pub fn merge_into(survivor: &mut BodyState, absorbed: &mut BodyState, heat_factor: Scalar) -> Scalar {
    survivor.assert_physical();
    absorbed.assert_physical();

    let total_mass = survivor.mass + absorbed.mass;
    let reduced_mass = survivor.mass * absorbed.mass / total_mass;
    let relative_velocity = survivor.velocity - absorbed.velocity;
    let energy_lost = 0.5 * reduced_mass * relative_velocity.length_squared();

    survivor.position =
        (survivor.position * survivor.mass + absorbed.position * absorbed.mass) / total_mass;
    survivor.velocity = (survivor.momentum() + absorbed.momentum()) / total_mass;
    survivor.radius = libm::cbrt(survivor.radius.powi(3) + absorbed.radius.powi(3));
    survivor.temperature =
        survivor.temperature.max(absorbed.temperature) + heat_factor * energy_lost;
    survivor.mass = total_mass;

    absorbed.invalidate();

    energy_lost
}

/// Merges every colliding pair, then drops absorbed bodies from `bodies`.
///
/// Pairs are visited in container order. A body absorbed earlier in the pass
/// takes part in no further pair; a survivor keeps absorbing with its grown
/// radius. Equal masses resolve in favour of the body earlier in the
/// container.
pub fn resolve_collisions(bodies: &mut Vec<BodyHandle>, heat_factor: Scalar) -> Vec<MergeEvent> {
    let mut events = Vec::new();

    for (i, j) in unique_pairs(bodies.len()) {
        let (first, second) = (&bodies[i], &bodies[j]);
        let (mut a, mut b) = Body::lock_pair(first, second);

        if !a.is_alive() || !b.is_alive() || !in_contact(&a, &b) {
            continue;
        }

        let event = if b.mass > a.mass {
            MergeEvent {
                survivor: second.id(),
                absorbed: first.id(),
                energy_lost: merge_into(&mut b, &mut a, heat_factor),
            }
        } else {
            MergeEvent {
                survivor: first.id(),
                absorbed: second.id(),
                energy_lost: merge_into(&mut a, &mut b, heat_factor),
            }
        };

        debug!(
            survivor = %event.survivor,
            absorbed = %event.absorbed,
            energy_lost = event.energy_lost,
            "bodies merged"
        );
        events.push(event);
    }

    if !events.is_empty() {
        bodies.retain(|body| body.is_alive());
    }

    events
}
