use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::models::DetectorConfig;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// How often a detection pass runs.
    #[serde(with = "humantime_serde")]
    pub detection_interval: std::time::Duration,
    pub cpa_threshold_nm: f64,
    pub tcpa_threshold_minutes: f64,
    pub min_speed_knots: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            detection_interval: std::time::Duration::from_secs(30),
            cpa_threshold_nm: crate::models::DEFAULT_CPA_THRESHOLD_NM,
            tcpa_threshold_minutes: crate::models::DEFAULT_TCPA_THRESHOLD_MINUTES,
            min_speed_knots: crate::models::DEFAULT_MIN_SPEED_KNOTS,
        }
    }
}

impl Settings {
    /// Settings from an optional YAML file, overridden by
    /// `ARGOS_DETECTOR__`-prefixed environment variables.
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("detection_interval", "30s")?
            .set_default("cpa_threshold_nm", crate::models::DEFAULT_CPA_THRESHOLD_NM)?
            .set_default(
                "tcpa_threshold_minutes",
                crate::models::DEFAULT_TCPA_THRESHOLD_MINUTES,
            )?
            .set_default("min_speed_knots", crate::models::DEFAULT_MIN_SPEED_KNOTS)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("ARGOS_DETECTOR").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            cpa_threshold_nm: self.cpa_threshold_nm,
            tcpa_threshold_minutes: self.tcpa_threshold_minutes,
            min_speed_knots: self.min_speed_knots,
        }
    }
}
