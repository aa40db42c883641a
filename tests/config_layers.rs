//! Environment layering runs in its own test binary so the variables it sets
//! cannot leak into the library's unit tests.

use orrery::config::SimulationConfig;
use orrery::test_utils::temp_path;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Sets variables for the lifetime of the guard.
struct ScopedEnv(Vec<&'static str>);

impl ScopedEnv {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            // SAFETY: callers hold ENV_LOCK, so no other test thread reads the
            // environment concurrently.
            unsafe { std::env::set_var(key, value) };
        }
        Self(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for key in &self.0 {
            // SAFETY: see `ScopedEnv::set`.
            unsafe { std::env::remove_var(key) };
        }
    }
}

#[test]
fn test_environment_overrides_file_and_defaults() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let path = temp_path("config-env", "toml");
    std::fs::write(
        &path,
        "[trails]\nmax_points_per_trail = 5\n\n[scheduler]\ncommand_queue_capacity = 3\n",
    )
    .unwrap();

    let loaded = {
        let _env = ScopedEnv::set(&[
            ("ORRERY__TRAILS__MAX_POINTS_PER_TRAIL", "9"),
            ("ORRERY__PHYSICS__WORKER_COUNT", "6"),
        ]);
        SimulationConfig::load(Some(path.as_path()))
    };
    std::fs::remove_file(&path).ok();

    let loaded = loaded.unwrap();
    assert_eq!(loaded.trails.max_points_per_trail, 9);
    assert_eq!(loaded.physics.worker_count, 6);
    assert_eq!(loaded.scheduler.command_queue_capacity, 3);
    assert_eq!(loaded.scheduler.tick_interval_ms, 5);
}

#[test]
fn test_invalid_environment_value_is_rejected() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _env = ScopedEnv::set(&[("ORRERY__SCHEDULER__TICK_INTERVAL_MS", "0")]);

    assert!(SimulationConfig::load(None).is_err());
}

#[test]
fn test_user_config_path_names_config_file() {
    if let Some(path) = SimulationConfig::user_config_path() {
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert!(path.to_string_lossy().contains("orrery"));
    }
}

#[test]
fn test_user_config_falls_back_to_valid_config() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _env = ScopedEnv::set(&[("ORRERY__PHYSICS__WORKER_COUNT", "0")]);

    // an invalid layer makes the whole load fail, leaving the defaults
    let config = SimulationConfig::load_from_user_config();
    assert!(config.validate().is_ok());
    assert_eq!(config.physics.worker_count, 4);
}
