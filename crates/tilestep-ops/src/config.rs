//! Configuration for the session controller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tilestep_core::Dimensions;

use crate::error::{OpsError, OpsResult};

/// Configuration for tilestep sessions and servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pause after a step-driven completion before the grid is rebuilt (ms).
    #[serde(default = "default_observation_delay_ms")]
    pub observation_delay_ms: u64,

    /// A `run` request may spend `width * height * multiplier` steps.
    #[serde(default = "default_run_budget_multiplier")]
    pub run_budget_multiplier: usize,

    /// Queue depth of each worker's request and response channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Port used by `serve` when none is given.
    #[serde(default = "default_port")]
    pub default_port: u16,
}

fn default_observation_delay_ms() -> u64 {
    1000
}

fn default_run_budget_multiplier() -> usize {
    1
}

fn default_channel_capacity() -> usize {
    32
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observation_delay_ms: default_observation_delay_ms(),
            run_budget_multiplier: default_run_budget_multiplier(),
            channel_capacity: default_channel_capacity(),
            default_port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from disk with environment overrides.
    pub fn load() -> OpsResult<Self> {
        Self::load_file()?.with_env_overrides()
    }

    /// Load the stored configuration file, if any.
    pub fn load_file() -> OpsResult<Self> {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when it does not exist.
    pub fn load_from(path: &Path) -> OpsResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Apply `TILESTEP_*` environment variables.
    fn with_env_overrides(mut self) -> OpsResult<Self> {
        for (var, key) in [
            ("TILESTEP_OBSERVATION_DELAY_MS", "observation_delay_ms"),
            ("TILESTEP_RUN_BUDGET_MULTIPLIER", "run_budget_multiplier"),
            ("TILESTEP_CHANNEL_CAPACITY", "channel_capacity"),
            ("TILESTEP_PORT", "default_port"),
        ] {
            if let Ok(value) = std::env::var(var) {
                self.set(key, &value)?;
            }
        }
        Ok(self)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> OpsResult<()> {
        if let Some(path) = Self::config_file_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> OpsResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "tilestep", "tilestep")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// The observation delay as a duration.
    pub fn observation_delay(&self) -> Duration {
        Duration::from_millis(self.observation_delay_ms)
    }

    /// Step budget of a `run` request on a grid of the given size.
    pub fn run_budget(&self, dimensions: Dimensions) -> usize {
        dimensions.area().saturating_mul(self.run_budget_multiplier.max(1))
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "observation_delay_ms" => Some(self.observation_delay_ms.to_string()),
            "run_budget_multiplier" => Some(self.run_budget_multiplier.to_string()),
            "channel_capacity" => Some(self.channel_capacity.to_string()),
            "default_port" => Some(self.default_port.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> OpsResult<()> {
        let invalid = || OpsError::Config(format!("Invalid number for {}: {}", key, value));
        match key {
            "observation_delay_ms" => {
                self.observation_delay_ms = value.parse().map_err(|_| invalid())?;
            }
            "run_budget_multiplier" => {
                self.run_budget_multiplier = value.parse().map_err(|_| invalid())?;
            }
            "channel_capacity" => {
                let capacity: usize = value.parse().map_err(|_| invalid())?;
                if capacity == 0 {
                    return Err(OpsError::Config("channel_capacity must be at least 1".into()));
                }
                self.channel_capacity = capacity;
            }
            "default_port" => {
                self.default_port = value.parse().map_err(|_| invalid())?;
            }
            _ => {
                return Err(OpsError::Config(format!("Unknown config key: {}", key)));
            }
        }
        Ok(())
    }

    /// All known configuration keys.
    pub fn keys() -> &'static [&'static str] {
        &[
            "observation_delay_ms",
            "run_budget_multiplier",
            "channel_capacity",
            "default_port",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.observation_delay(), Duration::from_secs(1));
        assert_eq!(config.run_budget(Dimensions::new(5, 4)), 20);
    }

    #[test]
    fn get_and_set_by_key() {
        let mut config = Config::default();
        config.set("observation_delay_ms", "250").unwrap();
        config.set("run_budget_multiplier", "3").unwrap();
        assert_eq!(config.get("observation_delay_ms").as_deref(), Some("250"));
        assert_eq!(config.run_budget(Dimensions::new(2, 2)), 12);

        for key in Config::keys() {
            assert!(config.get(key).is_some(), "{key} has no value");
        }
        assert!(config.get("nope").is_none());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("default_port", "ninety"),
            Err(OpsError::Config(_))
        ));
        assert!(matches!(config.set("channel_capacity", "0"), Err(OpsError::Config(_))));
        assert!(matches!(config.set("colour", "red"), Err(OpsError::Config(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.default_port = 4321;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_and_partial_file_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        std::fs::write(&path, r#"{"observation_delay_ms": 5}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.observation_delay_ms, 5);
        assert_eq!(config.channel_capacity, 32);
    }
}
