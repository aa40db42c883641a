//! Inbound commands
//!
//! Producers (input handling, UI) never touch the body set directly: they
//! enqueue a [`Command`] through a [`CommandSender`] and the scheduler
//! applies it at the start of its next loop iteration.

use crate::error::{BodyError, OrreryError};
use crate::physics::math::{Scalar, Vector3};
use crossbeam::channel::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Adds one body at rest.
    SpawnBody { position: Vector3, mass: Scalar },
    /// Adds a jittered cluster of bodies around `center`.
    SpawnVolume { center: Vector3 },
    /// Toggles between running and paused.
    Pause,
    /// Replaces every body with the contents of the universe file.
    Load,
    /// Writes every body to the universe file.
    Store,
}

impl Command {
    /// Rejects commands that would put non-physical data into the body set.
    pub fn validate(&self) -> Result<(), BodyError> {
        match *self {
            Command::SpawnBody { position, mass } => {
                if !(mass > 0.0 && mass.is_finite()) {
                    return Err(BodyError::NonPositiveMass(mass));
                }
                if !position.is_finite() {
                    return Err(BodyError::NonFinite { field: "position" });
                }
                Ok(())
            }
            Command::SpawnVolume { center } => {
                if center.is_finite() {
                    Ok(())
                } else {
                    Err(BodyError::NonFinite { field: "position" })
                }
            }
            Command::Pause | Command::Load | Command::Store => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::SpawnBody { .. } => "spawn_body",
            Command::SpawnVolume { .. } => "spawn_volume",
            Command::Pause => "pause",
            Command::Load => "load",
            Command::Store => "store",
        }
    }
}

/// Producer side of the bounded command queue.
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<Command>,
}

impl CommandSender {
    /// Validates and enqueues `command`, blocking while the queue is full.
    ///
    /// Fails with [`OrreryError::Stopped`] once the consumer is gone.
    pub fn send(&self, command: Command) -> Result<(), OrreryError> {
        command.validate()?;
        self.sender
            .send(command)
            .map_err(|_| OrreryError::Stopped)
    }

    /// Commands waiting to be drained.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.sender.capacity()
    }
}

/// Creates a bounded multi-producer, single-consumer command queue.
pub fn command_queue(capacity: usize) -> (CommandSender, Receiver<Command>) {
    let (sender, receiver) = channel::bounded(capacity.max(1));
    (CommandSender { sender }, receiver)
}
