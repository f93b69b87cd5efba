//! Boundary contracts toward the excluded collaborators: storage, the
//! real-time notification channel and whatever ingests position reports.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    AisMessage, AlertId, CollisionAlert, CollisionRiskDetails, Mmsi, NewCollisionAlert, Result,
    VesselState,
};

/// Accepts batches of position reports produced by a data source.
#[async_trait]
pub trait PositionReportSink: Send + Sync {
    async fn add_position_reports(&self, messages: Vec<AisMessage>) -> Result<()>;
}

/// Read side of the vessel store as seen by the collision detector.
#[async_trait]
pub trait VesselStateOutbound: Send + Sync {
    /// States of vessels with a known position, speed and course whose last
    /// report is at most `window` old.
    async fn vessel_states_updated_within(&self, window: Duration) -> Result<Vec<VesselState>>;
}

/// Write side of the alert store.
#[async_trait]
pub trait AlertInbound: Send + Sync {
    /// An active collision alert for the unordered vessel pair created
    /// within `created_within`, if one exists. Both MMSI orderings match.
    async fn active_collision_alert(
        &self,
        first: Mmsi,
        second: Mmsi,
        created_within: Duration,
    ) -> Result<Option<CollisionAlert>>;

    async fn create_alert(&self, alert: NewCollisionAlert) -> Result<CollisionAlert>;

    async fn update_alert(
        &self,
        id: AlertId,
        details: CollisionRiskDetails,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Fire-and-forget push channel for newly created alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &CollisionAlert) -> Result<()>;
}
