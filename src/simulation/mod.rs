//! The tick algorithm
//!
//! [`Simulation`] owns everything one tick needs: the command consumer, the
//! force pool, the spawn RNG and the configuration. It is single-threaded
//! from the caller's point of view; [`scheduler`] drives it on a dedicated
//! thread, and tests can drive it directly.
//!
//! State that readers on other threads need lives in [`World`], shared
//! behind an `Arc`.

pub mod actions;
pub mod scheduler;

use crate::commands::{Command, CommandSender, command_queue};
use crate::config::SimulationConfig;
use crate::diagnostics::TickStats;
use crate::error::OrreryError;
use crate::physics::body::BodyHandle;
use crate::physics::collisions::resolve_collisions;
use crate::physics::integrator::integrate_all;
use crate::physics::pool::ForcePool;
use crate::physics::trail::Trail;
use crate::resources::SharedRng;
use crate::states::RunState;
use crossbeam::channel::Receiver;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Shared view of the simulation.
///
/// `bodies` is the coarse lock: it is held for the whole physics phase of a
/// running tick and for every structural change to the body set.
#[derive(Debug, Default)]
pub struct World {
    bodies: Mutex<Vec<BodyHandle>>,
    paused: AtomicBool,
    ticks: AtomicU64,
    last_stats: Mutex<Option<TickStats>>,
}

impl World {
    fn new(bodies: Vec<BodyHandle>, state: RunState) -> Self {
        Self {
            bodies: Mutex::new(bodies),
            paused: AtomicBool::new(state.is_paused()),
            ..Self::default()
        }
    }

    /// Point-in-time copy of the live body handles. The coarse lock is held
    /// only while the handles are cloned.
    pub fn bodies(&self) -> Vec<BodyHandle> {
        self.lock_bodies().clone()
    }

    pub fn body_count(&self) -> usize {
        self.lock_bodies().len()
    }

    pub fn state(&self) -> RunState {
        if self.paused.load(Ordering::Acquire) {
            RunState::Paused
        } else {
            RunState::Running
        }
    }

    /// Number of running ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn last_tick_stats(&self) -> Option<TickStats> {
        *self
            .last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_bodies(&self) -> MutexGuard<'_, Vec<BodyHandle>> {
        self.bodies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RunState) {
        self.paused.store(state.is_paused(), Ordering::Release);
    }

    fn record_tick(&self, mut stats: TickStats) -> TickStats {
        stats.tick = self.ticks.fetch_add(1, Ordering::AcqRel) + 1;
        *self
            .last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(stats);
        stats
    }
}

pub struct Simulation {
    world: Arc<World>,
    commands: Receiver<Command>,
    pool: ForcePool,
    rng: SharedRng,
    config: SimulationConfig,
}

impl Simulation {
    /// Builds a simulation over `bodies` and returns it with the producer
    /// side of its command queue.
    ///
    /// Seed bodies get the configured trail capacity. A handle passed twice
    /// is kept once.
    pub fn new(
        bodies: Vec<BodyHandle>,
        config: SimulationConfig,
    ) -> Result<(Self, CommandSender), OrreryError> {
        config.validate()?;

        let mut seen = HashSet::new();
        let mut seeds = Vec::with_capacity(bodies.len());
        for body in bodies {
            if !seen.insert(body.id()) {
                warn!(body = %body.id(), "duplicate seed body ignored");
                continue;
            }
            {
                let mut state = body.lock();
                state.validate()?;
                if state.trail.max_points() != config.trail_length() {
                    state.trail = Trail::new(config.trail_length());
                }
            }
            seeds.push(body);
        }

        let pool = ForcePool::new(config.physics.worker_count, config.gravity())
            .map_err(OrreryError::Spawn)?;
        let (sender, receiver) = command_queue(config.scheduler.command_queue_capacity);
        let initial_state = if config.scheduler.start_paused {
            RunState::Paused
        } else {
            RunState::Running
        };

        let simulation = Self {
            world: Arc::new(World::new(seeds, initial_state)),
            commands: receiver,
            pool,
            rng: SharedRng::from_optional_seed(config.spawn.initial_seed),
            config,
        };

        Ok((simulation, sender))
    }

    pub fn world(&self) -> Arc<World> {
        self.world.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bodies(&self) -> Vec<BodyHandle> {
        self.world.bodies()
    }

    pub fn state(&self) -> RunState {
        self.world.state()
    }

    /// Applies every command that was queued when the drain began and
    /// returns how many were applied. Never blocks.
    pub fn drain_commands(&mut self) -> usize {
        let pending = self.commands.len();
        let mut applied = 0;
        while applied < pending {
            let Ok(command) = self.commands.try_recv() else {
                break;
            };
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// One scheduler iteration without pacing: drain commands, then run the
    /// physics phases unless paused. Returns stats for a running tick.
    pub fn tick(&mut self) -> Option<TickStats> {
        self.drain_commands();
        if self.state().is_paused() {
            return None;
        }
        Some(self.step())
    }

    /// Runs the physics phases once, regardless of run state.
    pub fn step(&mut self) -> TickStats {
        let started = Instant::now();

        let mut bodies = self.world.lock_bodies();
        let pair_count = self.pool.evaluate(&bodies);
        integrate_all(&bodies);
        let merges = resolve_collisions(&mut bodies, self.config.physics.merge_heat_factor);
        let body_count = bodies.len();
        drop(bodies);

        let stats = self.world.record_tick(TickStats {
            tick: 0,
            body_count,
            pair_count,
            merges: merges.len(),
            elapsed: started.elapsed(),
        });
        trace!(
            tick = stats.tick,
            bodies = stats.body_count,
            pairs = stats.pair_count,
            merges = stats.merges,
            elapsed_us = stats.elapsed.as_micros() as u64,
            "tick complete"
        );
        stats
    }

    fn apply(&mut self, command: Command) {
        debug!(command = command.name(), "applying command");
        match command {
            Command::SpawnBody { position, mass } => {
                if let Err(e) = actions::spawn_body(&self.world, &self.config, position, mass) {
                    warn!("Rejected spawn at {}: {}", position, e);
                }
            }
            Command::SpawnVolume { center } => {
                actions::spawn_volume(&self.world, &self.config, &mut self.rng, center);
            }
            Command::Pause => {
                let state = actions::toggle_pause(&self.world);
                info!("Simulation {}", state);
            }
            Command::Load => {
                let path = &self.config.persistence.universe_path;
                match actions::load_universe(&self.world, &self.config) {
                    Ok(count) => info!("Loaded {} bodies from {}", count, path.display()),
                    Err(e) => error!("Failed to load universe, keeping current bodies: {}", e),
                }
            }
            Command::Store => {
                let path = &self.config.persistence.universe_path;
                match actions::store_universe(&self.world, &self.config) {
                    Ok(count) => info!("Stored {} bodies to {}", count, path.display()),
                    Err(e) => error!("Failed to store universe: {}", e),
                }
            }
        }
    }
}
