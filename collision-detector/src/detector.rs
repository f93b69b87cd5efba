//! Detection passes against the storage and notification ports.

use argos_core::{
    AlertInbound, AlertNotifier, CollisionAlert, NewCollisionAlert, VesselStateOutbound,
};
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::{
    cpa::detect_risks,
    error::Result,
    models::{CollisionRisk, DetectionSummary, DetectorConfig},
};

/// How far back a vessel's last report may lie for it to take part in a
/// detection pass, and how far back an active alert still deduplicates.
const RECENCY_WINDOW_MINUTES: i64 = 10;

pub struct CollisionDetector<S, A, N> {
    states: S,
    alerts: A,
    notifier: N,
    config: DetectorConfig,
}

impl<S, A, N> CollisionDetector<S, A, N>
where
    S: VesselStateOutbound,
    A: AlertInbound,
    N: AlertNotifier,
{
    pub fn new(states: S, alerts: A, notifier: N, config: DetectorConfig) -> Self {
        Self {
            states,
            alerts,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One full detection pass: scan recent vessel states pairwise and
    /// upsert an alert per detected risk. A risk whose persistence fails is
    /// counted and skipped so the rest of the pass still lands; it
    /// resurfaces on the next pass as long as the vessels stay on course.
    #[instrument(skip(self))]
    pub async fn run_detection(&self) -> Result<DetectionSummary> {
        let window = Duration::minutes(RECENCY_WINDOW_MINUTES);
        let states = self.states.vessel_states_updated_within(window).await?;

        let moving: Vec<_> = states
            .into_iter()
            .filter(|s| s.speed >= self.config.min_speed_knots)
            .collect();
        debug!("checking {} moving vessels for collision risks", moving.len());

        let risks = detect_risks(&moving, &self.config);
        info!("detected {} potential collision risks", risks.len());

        let mut summary = DetectionSummary {
            risks_detected: risks.len(),
            ..Default::default()
        };

        for risk in risks {
            match self.upsert_alert(&risk).await {
                Ok(created) => {
                    if created {
                        summary.alerts_created += 1;
                    } else {
                        summary.alerts_updated += 1;
                    }
                }
                Err(e) => {
                    summary.failures += 1;
                    warn!(
                        "failed to persist collision alert for {}/{}: {e}",
                        risk.vessel1_mmsi, risk.vessel2_mmsi
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Updates the active alert for the pair when one exists, otherwise
    /// creates one and pushes a notification. Returns whether an alert was
    /// created.
    async fn upsert_alert(&self, risk: &CollisionRisk) -> Result<bool> {
        let existing = self
            .alerts
            .active_collision_alert(
                risk.vessel1_mmsi,
                risk.vessel2_mmsi,
                Duration::minutes(RECENCY_WINDOW_MINUTES),
            )
            .await?;

        match existing {
            Some(alert) => {
                self.alerts
                    .update_alert(alert.id, risk.details(), Utc::now())
                    .await?;
                debug!(
                    "updated collision alert for {}/{}: CPA={:.2}nm, TCPA={:.1}min",
                    risk.vessel1_name, risk.vessel2_name, risk.cpa_nm, risk.tcpa_minutes
                );
                Ok(false)
            }
            None => {
                let alert = self.alerts.create_alert(build_alert(risk)).await?;
                info!(
                    "created collision alert: {}/{} - CPA={:.2}nm, TCPA={:.1}min ({})",
                    risk.vessel1_name,
                    risk.vessel2_name,
                    risk.cpa_nm,
                    risk.tcpa_minutes,
                    risk.risk_level
                );
                self.notify(&alert).await;
                Ok(true)
            }
        }
    }

    /// Runs detection passes at a fixed cadence until the token is
    /// cancelled. The in-flight pass always completes before this returns;
    /// a failed pass is logged and the cadence keeps going.
    pub async fn run_periodically(
        &self,
        interval: std::time::Duration,
        cancel: tokio_util::sync::CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.run_detection().await {
                        warn!("collision detection pass failed: {e}");
                    }
                }
            }
        }
        info!("collision detection loop stopped");
    }

    // The notification channel is best-effort; a failed push never fails
    // the pass.
    async fn notify(&self, alert: &CollisionAlert) {
        if let Err(e) = self.notifier.notify(alert).await {
            warn!("failed to emit collision alert: {e}");
        }
    }
}

fn build_alert(risk: &CollisionRisk) -> NewCollisionAlert {
    let title = format!(
        "Collision Risk: {} / {}",
        risk.vessel1_name, risk.vessel2_name
    );
    let message = format!(
        "Potential collision detected between {} (MMSI: {}) and {} (MMSI: {}). \
         CPA: {:.2} nm in {:.1} minutes. Current distance: {:.2} nm.",
        risk.vessel1_name,
        risk.vessel1_mmsi,
        risk.vessel2_name,
        risk.vessel2_mmsi,
        risk.cpa_nm,
        risk.tcpa_minutes,
        risk.current_distance_nm
    );

    let risk_score =
        100f64.min((1.0 - risk.cpa_nm) * 50.0 + (30.0 - risk.tcpa_minutes) * 2.0);

    NewCollisionAlert {
        severity: risk.risk_level.severity(),
        title,
        message,
        vessel_mmsi: risk.vessel1_mmsi,
        secondary_vessel_mmsi: risk.vessel2_mmsi,
        position: None,
        risk_score,
        details: risk.details(),
    }
}
