//! Thread-safe handle to a running simulation
//!
//! [`Orrery`] starts the scheduler thread on construction and stops it on
//! [`Orrery::shutdown`] or drop. Renderers read snapshots through
//! [`Orrery::bodies`]; input handlers enqueue [`Command`]s.

use crate::commands::{Command, CommandSender};
use crate::config::SimulationConfig;
use crate::diagnostics::TickStats;
use crate::error::OrreryError;
use crate::physics::body::{Body, BodyHandle};
use crate::physics::math::Vector3;
use crate::simulation::{Simulation, World, scheduler};
use crate::states::RunState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::error;

/// A planet at the origin and a moon in a slow orbit around it.
pub fn default_bodies() -> Result<Vec<BodyHandle>, OrreryError> {
    let planet = Body::new(500.972, 30.0, Vector3::ZERO, Vector3::ZERO)?;
    let moon = Body::new(
        7.3459,
        5.0,
        Vector3::new(400.0, 0.0, 0.0),
        Vector3::new(0.0, 0.1, 0.0),
    )?;
    Ok(vec![Arc::new(planet), Arc::new(moon)])
}

pub struct Orrery {
    world: Arc<World>,
    commands: CommandSender,
    stop: Arc<AtomicBool>,
    scheduler: Option<JoinHandle<()>>,
    tick_interval: Duration,
}

impl Orrery {
    pub fn new(seed_bodies: Vec<BodyHandle>) -> Result<Self, OrreryError> {
        Self::with_config(seed_bodies, SimulationConfig::default())
    }

    pub fn with_config(
        seed_bodies: Vec<BodyHandle>,
        config: SimulationConfig,
    ) -> Result<Self, OrreryError> {
        let tick_interval = config.tick_interval();
        let (simulation, commands) = Simulation::new(seed_bodies, config)?;
        let world = simulation.world();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = scheduler::spawn(simulation, stop.clone()).map_err(OrreryError::Spawn)?;

        Ok(Self {
            world,
            commands,
            stop,
            scheduler: Some(handle),
            tick_interval,
        })
    }

    pub fn with_default_bodies(config: SimulationConfig) -> Result<Self, OrreryError> {
        Self::with_config(default_bodies()?, config)
    }

    /// Snapshot of the live bodies. Handles stay readable after the scheduler
    /// removes a body, but a removed body no longer changes.
    pub fn bodies(&self) -> Vec<BodyHandle> {
        self.world.bodies()
    }

    /// Enqueues `command`, blocking while the queue is full.
    pub fn queue_command(&self, command: Command) -> Result<(), OrreryError> {
        self.commands.send(command)
    }

    /// Another producer for the same queue, for use on other threads.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn state(&self) -> RunState {
        self.world.state()
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn tick_count(&self) -> u64 {
        self.world.tick_count()
    }

    pub fn last_tick_stats(&self) -> Option<TickStats> {
        self.world.last_tick_stats()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_running(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the scheduler at its next tick boundary and waits for it.
    pub fn shutdown(mut self) {
        self.stop_scheduler();
    }

    fn stop_scheduler(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.scheduler.take() {
            if handle.join().is_err() {
                error!("Simulation scheduler panicked");
            }
        }
    }
}

impl Drop for Orrery {
    fn drop(&mut self) {
        self.stop_scheduler();
    }
}
