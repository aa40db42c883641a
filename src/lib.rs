//! Orrery library
//!
//! The simulation core of an interactive N-body orrery: a body set under
//! mutual gravity, advanced on a dedicated thread, merged on contact, and
//! driven through a bounded command queue. Rendering and input live outside
//! this crate and use [`Orrery`] to read snapshots and enqueue commands.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod orrery;
pub mod persistence;
pub mod physics;
pub mod prelude;
pub mod resources;
pub mod simulation;
pub mod states;

// Test utilities are public for integration tests
pub mod test_utils;

pub use orrery::Orrery;
