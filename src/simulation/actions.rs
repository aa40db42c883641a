//! Handlers for simulation commands
//!
//! Each handler takes the coarse lock only for the structural change it
//! makes; building bodies and file I/O happen outside it.

use super::World;
use crate::config::SimulationConfig;
use crate::error::{BodyError, PersistenceError};
use crate::persistence;
use crate::physics::body::{Body, BodyHandle, BodyId, BodyState};
use crate::physics::math::{Scalar, Vector3, radius_for_mass, random_point_in_ball};
use crate::resources::SharedRng;
use crate::states::RunState;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// A body at rest whose radius follows from its mass at the configured
/// density.
pub fn new_body(
    config: &SimulationConfig,
    position: Vector3,
    mass: Scalar,
) -> Result<BodyHandle, BodyError> {
    let radius = radius_for_mass(mass, config.physics.body_density);
    let state = BodyState::new(mass, radius, position, Vector3::ZERO)
        .with_trail_length(config.trail_length());
    Body::from_state(state).map(Arc::new)
}

pub fn spawn_body(
    world: &World,
    config: &SimulationConfig,
    position: Vector3,
    mass: Scalar,
) -> Result<BodyId, BodyError> {
    let body = new_body(config, position, mass)?;
    let id = body.id();
    world.lock_bodies().push(body);
    debug!(body = %id, %position, mass, "spawned body");
    Ok(id)
}

/// Mass of one volume body: `volume_mass` spread uniformly by the jitter
/// fraction. Jitter below 1 keeps the mass positive.
pub fn jittered_mass<R: Rng + ?Sized>(rng: &mut R, config: &SimulationConfig) -> Scalar {
    let jitter = config.spawn.volume_mass_jitter;
    if jitter > 0.0 {
        config.spawn.volume_mass * (1.0 + rng.random_range(-jitter..=jitter))
    } else {
        config.spawn.volume_mass
    }
}

/// Spawns `spawn.volume_body_count` bodies uniformly inside a ball of
/// `spawn.volume_radius` around `center`. Returns the number spawned.
pub fn spawn_volume(
    world: &World,
    config: &SimulationConfig,
    rng: &mut SharedRng,
    center: Vector3,
) -> usize {
    let spawn = &config.spawn;
    let mut cluster = Vec::with_capacity(spawn.volume_body_count);

    for _ in 0..spawn.volume_body_count {
        let position = random_point_in_ball(&mut **rng, center, spawn.volume_radius);
        let mass = jittered_mass(&mut **rng, config);
        match new_body(config, position, mass) {
            Ok(body) => cluster.push(body),
            Err(e) => debug!("skipped volume body: {}", e),
        }
    }

    let spawned = cluster.len();
    world.lock_bodies().extend(cluster);
    debug!(%center, spawned, "spawned volume");
    spawned
}

pub fn toggle_pause(world: &World) -> RunState {
    let next = world.state().toggled();
    world.set_state(next);
    next
}

/// Writes every live body to the configured universe file.
pub fn store_universe(world: &World, config: &SimulationConfig) -> Result<usize, PersistenceError> {
    let states: Vec<BodyState> = world.bodies().iter().map(|body| body.snapshot()).collect();
    persistence::store(&config.persistence.universe_path, &states)?;
    Ok(states.len())
}

/// Replaces the body set with the configured universe file. On any error
/// the current bodies are left in place.
pub fn load_universe(world: &World, config: &SimulationConfig) -> Result<usize, PersistenceError> {
    let bodies = persistence::load(&config.persistence.universe_path)?
        .into_iter()
        .enumerate()
        .map(|(index, state)| {
            Body::from_state(state.with_trail_length(config.trail_length()))
                .map(Arc::new)
                .map_err(|source| PersistenceError::InvalidRecord { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = bodies.len();
    *world.lock_bodies() = bodies;
    Ok(count)
}
