use std::sync::{
    Mutex, Once,
    atomic::{AtomicUsize, Ordering},
};

use argos_core::{
    AlertId, AlertInbound, AlertNotifier, AlertStatus, COLLISION_RISK_ALERT_TYPE, CollisionAlert,
    CollisionRiskDetails, Mmsi, NewCollisionAlert, Position, VesselState, VesselStateOutbound,
    error::error::{NotificationSnafu, StorageSnafu},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use collision_detector::{CollisionDetector, DetectorConfig};
use tracing_subscriber::FmtSubscriber;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder()
                .with_max_level(tracing::Level::INFO)
                .finish(),
        )
        .unwrap();
    });
}

/// In-memory vessel state source.
pub struct StateSource {
    pub states: Vec<VesselState>,
}

#[async_trait]
impl VesselStateOutbound for StateSource {
    async fn vessel_states_updated_within(
        &self,
        _window: Duration,
    ) -> argos_core::Result<Vec<VesselState>> {
        Ok(self.states.clone())
    }
}

/// In-memory alert store implementing the upsert contract.
#[derive(Default)]
pub struct AlertStore {
    pub alerts: Mutex<Vec<CollisionAlert>>,
}

impl AlertStore {
    pub fn active_count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn updated_at(&self, id: AlertId) -> Option<DateTime<Utc>> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.updated_at)
    }
}

#[async_trait]
impl AlertInbound for AlertStore {
    async fn active_collision_alert(
        &self,
        first: Mmsi,
        second: Mmsi,
        created_within: Duration,
    ) -> argos_core::Result<Option<CollisionAlert>> {
        let cutoff = Utc::now() - created_within;
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.alert_type == COLLISION_RISK_ALERT_TYPE
                    && a.status == AlertStatus::Active
                    && a.created_at >= cutoff
                    && a.involves_pair(first, second)
            })
            .cloned())
    }

    async fn create_alert(&self, alert: NewCollisionAlert) -> argos_core::Result<CollisionAlert> {
        let now = Utc::now();
        let alert = CollisionAlert {
            id: AlertId::new(),
            alert_type: COLLISION_RISK_ALERT_TYPE.to_string(),
            severity: alert.severity,
            status: AlertStatus::Active,
            title: alert.title,
            message: alert.message,
            vessel_mmsi: alert.vessel_mmsi,
            secondary_vessel_mmsi: alert.secondary_vessel_mmsi,
            position: alert.position,
            risk_score: alert.risk_score,
            details: alert.details,
            created_at: now,
            updated_at: now,
        };
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(alert)
    }

    async fn update_alert(
        &self,
        id: AlertId,
        details: CollisionRiskDetails,
        updated_at: DateTime<Utc>,
    ) -> argos_core::Result<()> {
        let mut alerts = self.alerts.lock().unwrap();
        if let Some(alert) = alerts.iter_mut().find(|a| a.id == id) {
            alert.details = details;
            alert.updated_at = updated_at;
        }
        Ok(())
    }
}

/// Alert store whose writes always fail.
pub struct FailingAlertStore;

#[async_trait]
impl AlertInbound for FailingAlertStore {
    async fn active_collision_alert(
        &self,
        _first: Mmsi,
        _second: Mmsi,
        _created_within: Duration,
    ) -> argos_core::Result<Option<CollisionAlert>> {
        Ok(None)
    }

    async fn create_alert(&self, _alert: NewCollisionAlert) -> argos_core::Result<CollisionAlert> {
        StorageSnafu {
            reason: "write failed",
        }
        .fail()
    }

    async fn update_alert(
        &self,
        _id: AlertId,
        _details: CollisionRiskDetails,
        _updated_at: DateTime<Utc>,
    ) -> argos_core::Result<()> {
        StorageSnafu {
            reason: "write failed",
        }
        .fail()
    }
}

/// Notifier that counts pushes.
#[derive(Default)]
pub struct CountingNotifier {
    pub notified: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.notified.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertNotifier for CountingNotifier {
    async fn notify(&self, _alert: &CollisionAlert) -> argos_core::Result<()> {
        self.notified.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Notifier whose pushes always fail.
pub struct FailingNotifier;

#[async_trait]
impl AlertNotifier for FailingNotifier {
    async fn notify(&self, _alert: &CollisionAlert) -> argos_core::Result<()> {
        NotificationSnafu {
            reason: "channel down",
        }
        .fail()
    }
}

pub fn vessel(mmsi: i32, lat: f64, lon: f64, speed: f64, course: f64) -> VesselState {
    VesselState {
        mmsi: Mmsi::new(mmsi).unwrap(),
        name: format!("VESSEL {mmsi}"),
        position: Position::new(lat, lon).unwrap(),
        speed,
        course,
        length: None,
    }
}

/// Two vessels on the same meridian closing head-on, 3 nm apart.
pub fn head_on_pair() -> Vec<VesselState> {
    vec![
        vessel(237_001_000, 40.60, 22.90, 10.0, 0.0),
        vessel(237_002_000, 40.65, 22.90, 10.0, 180.0),
    ]
}

pub fn detector(
    states: Vec<VesselState>,
) -> CollisionDetector<StateSource, AlertStore, CountingNotifier> {
    init_tracing();
    CollisionDetector::new(
        StateSource { states },
        AlertStore::default(),
        CountingNotifier::default(),
        DetectorConfig::default(),
    )
}
