//! Universe files
//!
//! A universe is a JSON array of body records:
//!
//! ```json
//! [{"T": 0.0, "R": 30.0, "M": 500.972, "Pos": {"X": 0.0, "Y": 0.0, "Z": 0.0}, "Vel": {"X": 0.0, "Y": 0.0, "Z": 0.0}}]
//! ```
//!
//! Trails are not persisted.

use crate::error::{BodyError, PersistenceError};
use crate::physics::body::BodyState;
use crate::physics::math::{Scalar, Vector3};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BodyRecord {
    #[serde(rename = "T")]
    pub temperature: Scalar,
    #[serde(rename = "R")]
    pub radius: Scalar,
    #[serde(rename = "M")]
    pub mass: Scalar,
    #[serde(rename = "Pos")]
    pub position: Vector3,
    #[serde(rename = "Vel")]
    pub velocity: Vector3,
}

impl From<&BodyState> for BodyRecord {
    fn from(state: &BodyState) -> Self {
        Self {
            temperature: state.temperature,
            radius: state.radius,
            mass: state.mass,
            position: state.position,
            velocity: state.velocity,
        }
    }
}

impl BodyRecord {
    /// Validated body state with an empty trail of default capacity.
    pub fn into_state(self) -> Result<BodyState, BodyError> {
        let state = BodyState::new(self.mass, self.radius, self.position, self.velocity)
            .with_temperature(self.temperature);
        state.validate()?;
        Ok(state)
    }
}

/// Writes `states` to `path`.
///
/// The document is written to a sibling temporary file first and renamed
/// over `path`, so readers never observe a partial universe.
pub fn store(path: impl AsRef<Path>, states: &[BodyState]) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let records: Vec<BodyRecord> = states.iter().map(BodyRecord::from).collect();
    let document = serde_json::to_vec_pretty(&records).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let staging = staging_path(path);
    fs::write(&staging, document).map_err(|source| PersistenceError::Io {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, path).map_err(|source| {
        let _ = fs::remove_file(&staging);
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Reads and validates every record in `path`. Either every record is
/// returned or none is.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<BodyState>, PersistenceError> {
    let path = path.as_ref();
    let document = fs::read(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<BodyRecord> =
        serde_json::from_slice(&document).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .into_state()
                .map_err(|source| PersistenceError::InvalidRecord { index, source })
        })
        .collect()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
