//! Error types for the orrery core
//!
//! Invariant violations inside a running tick are panics (see
//! [`crate::physics`]); everything here is a recoverable condition reported
//! to the caller before bad data can reach the body set.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected body parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    #[error("body mass must be positive and finite, got {0}")]
    NonPositiveMass(f64),

    #[error("body radius must be non-negative and finite, got {0}")]
    NegativeRadius(f64),

    #[error("body {field} must be finite")]
    NonFinite { field: &'static str },
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed universe document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid body record #{index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: BodyError,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum OrreryError {
    #[error(transparent)]
    InvalidBody(#[from] BodyError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("the simulation scheduler has stopped")]
    Stopped,

    #[error("failed to start simulation thread: {0}")]
    Spawn(#[source] std::io::Error),
}
