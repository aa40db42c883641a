//! Orrery prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! to reduce import boilerplate.

// External crate re-exports
pub use rand::Rng;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - States
pub use crate::states::RunState;

// Internal re-exports - Commands
pub use crate::commands::{Command, CommandSender};

// Internal re-exports - Errors
pub use crate::error::{BodyError, ConfigError, OrreryError, PersistenceError};

// Internal re-exports - Physics
pub use crate::physics::{Body, BodyHandle, BodyId, BodyState, Plane, Scalar, Vector3};

// Internal re-exports - Simulation
pub use crate::diagnostics::TickStats;
pub use crate::orrery::{Orrery, default_bodies};
pub use crate::resources::SharedRng;
pub use crate::simulation::{Simulation, World};
