use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::engine::TrafficEmulator;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(with = "humantime_serde")]
    pub update_interval: std::time::Duration,
    /// Directory scanned for scenario YAML files.
    pub scenarios_dir: String,
    /// Scenario loaded on startup, by name.
    pub initial_scenario: Option<String>,
    /// Number of random vessels generated on startup when no scenario is
    /// configured.
    pub random_vessel_count: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_interval: crate::scenario::DEFAULT_UPDATE_INTERVAL,
            scenarios_dir: "scenarios".into(),
            initial_scenario: None,
            random_vessel_count: None,
        }
    }
}

impl Settings {
    /// Settings from an optional YAML file, overridden by
    /// `ARGOS_EMULATOR__`-prefixed environment variables.
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("update_interval", "30s")?
            .set_default("scenarios_dir", "scenarios")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("ARGOS_EMULATOR").separator("__"))
            .build()?
            .try_deserialize()
    }
}

impl TrafficEmulator {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.update_interval)
    }
}
