use argos_core::{CollisionRiskDetails, Mmsi, RiskLevel};
use serde::Serialize;

pub const DEFAULT_CPA_THRESHOLD_NM: f64 = 0.5;
pub const DEFAULT_TCPA_THRESHOLD_MINUTES: f64 = 30.0;
pub const DEFAULT_MIN_SPEED_KNOTS: f64 = 0.5;

/// Thresholds for a detection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// CPA below which a pair is considered at risk, nautical miles.
    pub cpa_threshold_nm: f64,
    /// Risks further out than this are ignored, minutes.
    pub tcpa_threshold_minutes: f64,
    /// Vessels slower than this are treated as stationary, knots.
    pub min_speed_knots: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cpa_threshold_nm: DEFAULT_CPA_THRESHOLD_NM,
            tcpa_threshold_minutes: DEFAULT_TCPA_THRESHOLD_MINUTES,
            min_speed_knots: DEFAULT_MIN_SPEED_KNOTS,
        }
    }
}

/// A risk the all-pairs scan found between two vessels.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRisk {
    pub vessel1_mmsi: Mmsi,
    pub vessel1_name: String,
    pub vessel2_mmsi: Mmsi,
    pub vessel2_name: String,
    /// Closest point of approach, nautical miles.
    pub cpa_nm: f64,
    /// Time to CPA, minutes.
    pub tcpa_minutes: f64,
    /// Separation right now, nautical miles.
    pub current_distance_nm: f64,
    pub risk_level: RiskLevel,
}

impl CollisionRisk {
    pub fn is_critical(&self) -> bool {
        self.risk_level == RiskLevel::Critical
    }

    pub fn is_high(&self) -> bool {
        matches!(self.risk_level, RiskLevel::Critical | RiskLevel::High)
    }

    pub fn details(&self) -> CollisionRiskDetails {
        CollisionRiskDetails {
            cpa_nm: self.cpa_nm,
            tcpa_minutes: self.tcpa_minutes,
            current_distance_nm: self.current_distance_nm,
            risk_level: self.risk_level,
        }
    }
}

/// Outcome of one detection pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionSummary {
    pub risks_detected: usize,
    pub alerts_created: usize,
    pub alerts_updated: usize,
    /// Risks whose persistence failed; they are retried naturally on the
    /// next pass.
    pub failures: usize,
}
