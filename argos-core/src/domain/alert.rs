use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use uuid::Uuid;

use super::{Mmsi, Position};

pub const COLLISION_RISK_ALERT_TYPE: &str = "collision_risk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AlertId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Alert,
    Critical,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

/// Collision risk severity bands, most urgent first.
///
/// The derived ordering (`Critical < High < Medium < Low`) is the detector's
/// sort key, keep the variant order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    EnumIter,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn severity(self) -> AlertSeverity {
        match self {
            Self::Critical => AlertSeverity::Critical,
            Self::High => AlertSeverity::Alert,
            Self::Medium => AlertSeverity::Warning,
            Self::Low => AlertSeverity::Info,
        }
    }
}

/// JSON-shaped detail blob embedded in a collision alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRiskDetails {
    pub cpa_nm: f64,
    pub tcpa_minutes: f64,
    pub current_distance_nm: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCollisionAlert {
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub vessel_mmsi: Mmsi,
    pub secondary_vessel_mmsi: Mmsi,
    pub position: Option<Position>,
    pub risk_score: f64,
    pub details: CollisionRiskDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollisionAlert {
    pub id: AlertId,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub title: String,
    pub message: String,
    pub vessel_mmsi: Mmsi,
    pub secondary_vessel_mmsi: Mmsi,
    pub position: Option<Position>,
    pub risk_score: f64,
    pub details: CollisionRiskDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollisionAlert {
    /// Whether this alert concerns the given unordered vessel pair.
    pub fn involves_pair(&self, first: Mmsi, second: Mmsi) -> bool {
        (self.vessel_mmsi == first && self.secondary_vessel_mmsi == second)
            || (self.vessel_mmsi == second && self.secondary_vessel_mmsi == first)
    }
}
