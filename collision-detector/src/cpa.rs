//! CPA/TCPA geometry and risk classification.
//!
//! Pairs are evaluated in a local flat-earth frame anchored at the average
//! latitude of the two vessels. The relative-velocity method gives the time
//! of closest approach directly; at typical encounter ranges the flat
//! approximation error is far below the alert thresholds.

use argos_core::{RiskLevel, VesselState, haversine_distance, velocity_components};
use itertools::Itertools;

use crate::models::{CollisionRisk, DetectorConfig};

/// Threshold on squared relative speed below which two vessels are treated
/// as keeping station on each other.
const RELATIVE_SPEED_EPSILON: f64 = 0.0001;

/// CPA in nautical miles and TCPA in minutes for a vessel pair.
///
/// TCPA is negative when the vessels are already past their closest point
/// and positive infinity when their relative velocity is essentially zero.
pub fn calculate_cpa_tcpa(a: &VesselState, b: &VesselState) -> (f64, f64) {
    let avg_lat = (a.position.latitude + b.position.latitude) / 2.0;
    let nm_per_deg_lat = 60.0;
    let nm_per_deg_lon = 60.0 * avg_lat.to_radians().cos();

    // Position of b relative to a, in nautical miles.
    let dx = (b.position.longitude - a.position.longitude) * nm_per_deg_lon;
    let dy = (b.position.latitude - a.position.latitude) * nm_per_deg_lat;

    let (ax, ay) = velocity_components(a.speed, a.course);
    let (bx, by) = velocity_components(b.speed, b.course);
    let dvx = bx - ax;
    let dvy = by - ay;

    let dv_squared = dvx * dvx + dvy * dvy;
    let current_distance = (dx * dx + dy * dy).sqrt();

    if dv_squared < RELATIVE_SPEED_EPSILON {
        return (current_distance, f64::INFINITY);
    }

    // Knots are nm/hour, so the projection is in hours.
    let tcpa_hours = -(dx * dvx + dy * dvy) / dv_squared;

    let cpa_dx = dx + dvx * tcpa_hours;
    let cpa_dy = dy + dvy * tcpa_hours;
    let cpa = (cpa_dx * cpa_dx + cpa_dy * cpa_dy).sqrt();

    (cpa, tcpa_hours * 60.0)
}

/// First matching band wins; the bands deliberately overlap so a risk is
/// always reported at its most urgent applicable level.
pub fn classify(cpa_nm: f64, tcpa_minutes: f64, cpa_threshold_nm: f64) -> Option<RiskLevel> {
    if cpa_nm < cpa_threshold_nm * 0.5 && tcpa_minutes < 10.0 {
        Some(RiskLevel::Critical)
    } else if cpa_nm < cpa_threshold_nm && tcpa_minutes < 15.0 {
        Some(RiskLevel::High)
    } else if cpa_nm < cpa_threshold_nm * 1.5 && tcpa_minutes < 20.0 {
        Some(RiskLevel::Medium)
    } else if cpa_nm < cpa_threshold_nm * 2.0 {
        Some(RiskLevel::Low)
    } else {
        None
    }
}

/// Assesses a single pair. `None` when either vessel is effectively
/// stationary, the closest approach lies in the past or beyond the time
/// window, or the CPA clears every band.
pub fn assess_collision_risk(
    a: &VesselState,
    b: &VesselState,
    config: &DetectorConfig,
) -> Option<CollisionRisk> {
    if a.speed < config.min_speed_knots || b.speed < config.min_speed_knots {
        return None;
    }

    let (cpa, tcpa) = calculate_cpa_tcpa(a, b);
    if tcpa < 0.0 || tcpa > config.tcpa_threshold_minutes {
        return None;
    }

    let risk_level = classify(cpa, tcpa, config.cpa_threshold_nm)?;
    let current_distance = haversine_distance(a.position, b.position);

    Some(CollisionRisk {
        vessel1_mmsi: a.mmsi,
        vessel1_name: a.name.clone(),
        vessel2_mmsi: b.mmsi,
        vessel2_name: b.name.clone(),
        cpa_nm: round_to(cpa, 3),
        tcpa_minutes: round_to(tcpa, 1),
        current_distance_nm: round_to(current_distance, 3),
        risk_level,
    })
}

/// All-pairs scan, most urgent risks first (severity, then soonest TCPA).
pub fn detect_risks(states: &[VesselState], config: &DetectorConfig) -> Vec<CollisionRisk> {
    let mut risks: Vec<CollisionRisk> = states
        .iter()
        .tuple_combinations()
        .filter_map(|(a, b)| assess_collision_risk(a, b, config))
        .collect();

    risks.sort_by(|a, b| {
        a.risk_level
            .cmp(&b.risk_level)
            .then(a.tcpa_minutes.total_cmp(&b.tcpa_minutes))
    });
    risks
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
