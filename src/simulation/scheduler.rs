//! The simulation thread
//!
//! Loops until the stop flag is raised: one [`Simulation::tick`] per
//! iteration, then sleep for whatever remains of the tick interval. A paused
//! iteration sleeps for the full interval.

use super::Simulation;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Time left in the tick budget, or `None` on overrun.
pub fn remaining_budget(tick_interval: Duration, elapsed: Duration) -> Option<Duration> {
    tick_interval
        .checked_sub(elapsed)
        .filter(|remaining| !remaining.is_zero())
}

pub fn spawn(simulation: Simulation, stop: Arc<AtomicBool>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("orrery-scheduler".to_string())
        .spawn(move || run(simulation, &stop))
}

/// Drives `simulation` on the current thread until `stop` is set. The flag
/// is checked once per iteration, never mid-tick.
pub fn run(mut simulation: Simulation, stop: &AtomicBool) {
    let tick_interval = simulation.config().tick_interval();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_date = env!("BUILD_DATE"),
        bodies = simulation.world().body_count(),
        state = %simulation.state(),
        "Orrery scheduler started"
    );
    if let Ok(config) = toml::to_string_pretty(simulation.config()) {
        debug!("Active configuration:\n{}", config);
    }

    while !stop.load(Ordering::Acquire) {
        let started = Instant::now();

        if simulation.tick().is_none() {
            thread::sleep(tick_interval);
            continue;
        }

        let elapsed = started.elapsed();
        match remaining_budget(tick_interval, elapsed) {
            Some(remaining) => thread::sleep(remaining),
            None => trace!(
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = tick_interval.as_micros() as u64,
                "tick overrun"
            ),
        }
    }

    info!(
        ticks = simulation.world().tick_count(),
        "Orrery scheduler stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::config::SimulationConfig;
    use crate::test_utils::symmetric_pair;

    #[test]
    fn test_remaining_budget() {
        let interval = Duration::from_millis(5);
        assert_eq!(
            remaining_budget(interval, Duration::from_millis(2)),
            Some(Duration::from_millis(3))
        );
        assert_eq!(remaining_budget(interval, interval), None);
        assert_eq!(remaining_budget(interval, Duration::from_millis(9)), None);
    }

    #[test]
    fn test_run_returns_when_stopped() {
        let (simulation, _sender) =
            Simulation::new(symmetric_pair(1.0, 1.0, 50.0), SimulationConfig::default()).unwrap();
        let world = simulation.world();
        let stop = Arc::new(AtomicBool::new(false));

        let handle = spawn(simulation, stop.clone()).unwrap();
        while world.tick_count() < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        stop.store(true, Ordering::Release);
        handle.join().unwrap();

        assert!(world.tick_count() >= 3);
    }

    #[test]
    fn test_stopped_scheduler_disconnects_queue() {
        let (simulation, sender) =
            Simulation::new(Vec::new(), SimulationConfig::default()).unwrap();
        let stop = Arc::new(AtomicBool::new(true));

        spawn(simulation, stop).unwrap().join().unwrap();

        assert!(sender.send(Command::Pause).is_err());
    }
}
