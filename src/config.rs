use crate::error::ConfigError;
use crate::physics::collisions::DEFAULT_HEAT_FACTOR;
use crate::physics::gravity::GravityParams;
use crate::physics::math::Scalar;
use crate::physics::pool::DEFAULT_WORKER_COUNT;
use crate::physics::trail::DEFAULT_TRAIL_LENGTH;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const ENV_PREFIX: &str = "ORRERY";
const ENV_SEPARATOR: &str = "__";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub scheduler: SchedulerConfig,
    pub trails: TrailConfig,
    pub spawn: SpawnConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravitational_constant: Scalar,
    /// Separations below this are clamped before computing attraction.
    pub min_interaction_distance: Scalar,
    /// Mass per unit volume of spawned bodies; sets their radius.
    pub body_density: Scalar,
    /// Fraction of the kinetic energy lost in a merge that becomes heat.
    pub merge_heat_factor: Scalar,
    pub worker_count: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let gravity = GravityParams::default();
        Self {
            gravitational_constant: gravity.gravitational_constant,
            min_interaction_distance: gravity.min_distance,
            body_density: 1.0,
            merge_heat_factor: DEFAULT_HEAT_FACTOR,
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_ms: u64,
    pub command_queue_capacity: usize,
    pub start_paused: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            command_queue_capacity: 64,
            start_paused: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrailConfig {
    pub enabled: bool,
    pub max_points_per_trail: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_points_per_trail: DEFAULT_TRAIL_LENGTH,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    pub volume_body_count: usize,
    pub volume_radius: Scalar,
    pub volume_mass: Scalar,
    /// Relative mass spread in `[0, 1)`; 0 gives every body `volume_mass`.
    pub volume_mass_jitter: Scalar,
    pub initial_seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            volume_body_count: 10,
            volume_radius: 10.0,
            volume_mass: 2.0,
            volume_mass_jitter: 0.0,
            initial_seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub universe_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            universe_path: PathBuf::from("universe.json"),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!("Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Layered load: defaults, then the TOML file if present, then
    /// `ORRERY__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "orrery").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from the platform config directory, or defaults on any failure.
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();
        if path.is_none() {
            warn!("No user config directory available. Using defaults.");
        }

        match Self::load(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load user configuration: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid(message.to_string()))
        };

        let physics = &self.physics;
        if !(physics.gravitational_constant >= 0.0 && physics.gravitational_constant.is_finite()) {
            return invalid("physics.gravitational_constant must be finite and non-negative");
        }
        if !(physics.min_interaction_distance > 0.0 && physics.min_interaction_distance.is_finite())
        {
            return invalid("physics.min_interaction_distance must be positive");
        }
        if !(physics.body_density > 0.0 && physics.body_density.is_finite()) {
            return invalid("physics.body_density must be positive");
        }
        if !(physics.merge_heat_factor >= 0.0 && physics.merge_heat_factor.is_finite()) {
            return invalid("physics.merge_heat_factor must be finite and non-negative");
        }
        if physics.worker_count == 0 {
            return invalid("physics.worker_count must be at least 1");
        }

        if self.scheduler.tick_interval_ms == 0 {
            return invalid("scheduler.tick_interval_ms must be at least 1");
        }
        if self.scheduler.command_queue_capacity == 0 {
            return invalid("scheduler.command_queue_capacity must be at least 1");
        }

        let spawn = &self.spawn;
        if !(spawn.volume_radius >= 0.0 && spawn.volume_radius.is_finite()) {
            return invalid("spawn.volume_radius must be finite and non-negative");
        }
        if !(spawn.volume_mass > 0.0 && spawn.volume_mass.is_finite()) {
            return invalid("spawn.volume_mass must be positive");
        }
        if !(0.0..1.0).contains(&spawn.volume_mass_jitter) {
            return invalid("spawn.volume_mass_jitter must be in [0, 1)");
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_interval_ms)
    }

    pub fn gravity(&self) -> GravityParams {
        GravityParams {
            gravitational_constant: self.physics.gravitational_constant,
            min_distance: self.physics.min_interaction_distance,
        }
    }

    /// Trail capacity for new bodies; zero when trails are disabled.
    pub fn trail_length(&self) -> usize {
        if self.trails.enabled {
            self.trails.max_points_per_trail
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_path;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.physics.gravitational_constant, 0.05);
        assert_eq!(config.physics.worker_count, 4);
        assert_eq!(config.tick_interval(), Duration::from_millis(5));
        assert_eq!(config.scheduler.command_queue_capacity, 64);
        assert_eq!(config.trail_length(), 20);
        assert_eq!(config.spawn.volume_body_count, 10);
        assert_eq!(config.persistence.universe_path, PathBuf::from("universe.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulationConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: SimulationConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            [physics]
            gravitational_constant = 0.5

            [spawn]
            initial_seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.physics.gravitational_constant, 0.5);
        assert_eq!(config.physics.worker_count, 4);
        assert_eq!(config.spawn.initial_seed, Some(7));
        assert_eq!(config.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_save_and_load_or_default() {
        let path = temp_path("config-save", "toml");
        let mut config = SimulationConfig::default();
        config.scheduler.tick_interval_ms = 16;
        config.trails.enabled = false;

        config.save(&path).unwrap();
        let loaded = SimulationConfig::load_or_default(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
        assert_eq!(loaded.trail_length(), 0);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let loaded = SimulationConfig::load_or_default(temp_path("config-missing", "toml"));
        assert_eq!(loaded, SimulationConfig::default());
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let path = temp_path("config-malformed", "toml");
        std::fs::write(&path, "physics = [not valid").unwrap();
        let loaded = SimulationConfig::load_or_default(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, SimulationConfig::default());
    }

    #[test]
    fn test_layered_load_reads_file() {
        let path = temp_path("config-layered", "toml");
        std::fs::write(&path, "[scheduler]\ncommand_queue_capacity = 3\n").unwrap();
        let loaded = SimulationConfig::load(Some(path.as_path()));
        std::fs::remove_file(&path).ok();

        let loaded = loaded.unwrap();
        assert_eq!(loaded.scheduler.command_queue_capacity, 3);
        assert_eq!(loaded.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_layered_load_without_file() {
        let path = temp_path("config-absent", "toml");
        let loaded = SimulationConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.spawn, SpawnConfig::default());
    }

    #[test]
    fn test_layered_load_rejects_invalid_values() {
        let path = temp_path("config-invalid", "toml");
        std::fs::write(&path, "[physics]\nworker_count = 0\n").unwrap();
        let loaded = SimulationConfig::load(Some(path.as_path()));
        std::fs::remove_file(&path).ok();

        assert!(matches!(loaded, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimulationConfig::default();
        config.spawn.volume_mass_jitter = 1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.physics.min_interaction_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.physics.gravitational_constant = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.scheduler.command_queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.scheduler.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_heat_factor_matches_collisions() {
        assert_eq!(
            PhysicsConfig::default().merge_heat_factor,
            DEFAULT_HEAT_FACTOR
        );
    }
}
