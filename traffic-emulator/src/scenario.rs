//! Scenario documents: YAML loading and validation.
//!
//! Validation is all-or-nothing. A scenario either converts into a fully
//! typed [`Scenario`] or fails with an error naming the offending vessel
//! index and field, and nothing is partially applied.

use std::{path::Path, time::Duration};

use argos_core::{BoundingBox, MAX_MMSI, MIN_MMSI, VesselType};
use config::FileFormat;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use tracing::info;

use crate::{
    behavior::BehaviorKind,
    error::{
        Result,
        error::{
            DuplicateMmsiSnafu, ExpectedAlertMissingFieldSnafu, InvalidFieldSnafu,
            MissingFieldSnafu, ScenarioExtensionSnafu, ScenarioNotFoundSnafu, ScenarioParseSnafu,
            VesselInvalidFieldSnafu, VesselMissingFieldSnafu,
        },
    },
    vessel::{AisGap, VesselConfig},
};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

const MAX_SCENARIO_SPEED_KNOTS: f64 = 50.0;

/// An alert the scenario author expects the detection pipeline to raise,
/// used by scenario-driven acceptance runs.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedAlert {
    pub alert_type: String,
    pub severity: String,
    pub expected_after_seconds: i64,
    pub zone_code: Option<String>,
    pub vessel_mmsi: Option<i32>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A fully validated scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub update_interval: Duration,
    pub vessels: Vec<VesselConfig>,
    pub expected_alerts: Vec<ExpectedAlert>,
    pub bounding_box: Option<BoundingBox>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Scenario {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_minutes as u64 * 60)
    }

    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }
}

/// Cheap scenario metadata for listings. A scenario that fails to parse
/// still produces an entry, with the failure in `error`.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    pub vessel_count: usize,
    pub has_expected_alerts: bool,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    name: Option<String>,
    description: Option<String>,
    duration_minutes: Option<i64>,
    update_interval: Option<i64>,
    vessels: Option<Vec<RawVessel>>,
    expected_alerts: Option<Vec<RawExpectedAlert>>,
    bounding_box: Option<RawBoundingBox>,
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct RawVessel {
    mmsi: Option<i64>,
    name: Option<String>,
    #[serde(rename = "type")]
    vessel_type: Option<String>,
    start_position: Option<Vec<f64>>,
    speed: Option<f64>,
    course: Option<f64>,
    behavior: Option<String>,
    waypoints: Option<Vec<Vec<f64>>>,
    #[serde(default, rename = "loop")]
    loop_route: bool,
    loiter_radius: Option<f64>,
    loiter_center: Option<Vec<f64>>,
    call_sign: Option<String>,
    imo_number: Option<i32>,
    length: Option<f64>,
    width: Option<f64>,
    draught: Option<f64>,
    destination: Option<String>,
    flag_state: Option<String>,
    ais_gap: Option<AisGap>,
}

#[derive(Debug, Deserialize)]
struct RawExpectedAlert {
    #[serde(rename = "type")]
    alert_type: Option<String>,
    severity: Option<String>,
    expected_after_seconds: Option<i64>,
    zone_code: Option<String>,
    vessel_mmsi: Option<i32>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawBoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

/// Loads and validates a scenario from a YAML file.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();

    ensure!(
        path.exists(),
        ScenarioNotFoundSnafu {
            path: path.to_path_buf(),
        }
    );
    let extension = path.extension().and_then(|e| e.to_str());
    ensure!(
        matches!(extension, Some("yaml" | "yml")),
        ScenarioExtensionSnafu {
            path: path.to_path_buf(),
        }
    );

    let raw: RawScenario = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .context(ScenarioParseSnafu)?
        .try_deserialize()
        .context(ScenarioParseSnafu)?;

    let scenario = validate(raw)?;
    info!(
        "loaded scenario: {} ({} vessels, {} minutes)",
        scenario.name,
        scenario.vessel_count(),
        scenario.duration_minutes
    );
    Ok(scenario)
}

/// Parses and validates a scenario from an in-memory YAML document.
pub fn parse_scenario_str(document: &str) -> Result<Scenario> {
    let raw: RawScenario = config::Config::builder()
        .add_source(config::File::from_str(document, FileFormat::Yaml))
        .build()
        .context(ScenarioParseSnafu)?
        .try_deserialize()
        .context(ScenarioParseSnafu)?;

    validate(raw)
}

fn validate(raw: RawScenario) -> Result<Scenario> {
    let name = raw.name.ok_or_else(|| {
        MissingFieldSnafu { field: "name" }.build()
    })?;
    let description = raw.description.ok_or_else(|| {
        MissingFieldSnafu {
            field: "description",
        }
        .build()
    })?;

    let duration_minutes = raw.duration_minutes.ok_or_else(|| {
        MissingFieldSnafu {
            field: "duration_minutes",
        }
        .build()
    })?;
    ensure!(
        duration_minutes > 0,
        InvalidFieldSnafu {
            field: "duration_minutes",
            reason: format!("must be a positive integer, got {duration_minutes}"),
        }
    );

    let update_interval = raw.update_interval.unwrap_or(30);
    ensure!(
        update_interval > 0,
        InvalidFieldSnafu {
            field: "update_interval",
            reason: format!("must be a positive integer, got {update_interval}"),
        }
    );

    let vessels = raw.vessels.ok_or_else(|| {
        MissingFieldSnafu { field: "vessels" }.build()
    })?;
    ensure!(
        !vessels.is_empty(),
        InvalidFieldSnafu {
            field: "vessels",
            reason: "must be a non-empty list".to_string(),
        }
    );

    // Duplicates are rejected before any per-vessel validation so the error
    // does not depend on which copy is inspected first.
    let mut seen = std::collections::HashSet::new();
    for vessel in &vessels {
        if let Some(mmsi) = vessel.mmsi {
            ensure!(
                seen.insert(mmsi),
                DuplicateMmsiSnafu { mmsi: mmsi as i32 }
            );
        }
    }

    let vessels = vessels
        .into_iter()
        .enumerate()
        .map(|(index, raw)| validate_vessel(raw, index))
        .collect::<Result<Vec<_>>>()?;

    let expected_alerts = raw
        .expected_alerts
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let alert_type = raw.alert_type.ok_or_else(|| {
                ExpectedAlertMissingFieldSnafu {
                    index,
                    field: "type",
                }
                .build()
            })?;
            let severity = raw.severity.ok_or_else(|| {
                ExpectedAlertMissingFieldSnafu {
                    index,
                    field: "severity",
                }
                .build()
            })?;
            Ok(ExpectedAlert {
                alert_type,
                severity,
                expected_after_seconds: raw.expected_after_seconds.unwrap_or(0),
                zone_code: raw.zone_code,
                vessel_mmsi: raw.vessel_mmsi,
                extra: raw.extra,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let bounding_box = match raw.bounding_box {
        Some(b) => Some(
            BoundingBox::new(b.min_lat, b.max_lat, b.min_lon, b.max_lon).map_err(|e| {
                InvalidFieldSnafu {
                    field: "bounding_box",
                    reason: e.to_string(),
                }
                .build()
            })?,
        ),
        None => None,
    };

    Ok(Scenario {
        name,
        description,
        duration_minutes: duration_minutes as u32,
        update_interval: Duration::from_secs(update_interval as u64),
        vessels,
        expected_alerts,
        bounding_box,
        metadata: raw.metadata.unwrap_or_default(),
    })
}

fn validate_vessel(raw: RawVessel, index: usize) -> Result<VesselConfig> {
    let mmsi = raw
        .mmsi
        .ok_or_else(|| VesselMissingFieldSnafu { index, field: "mmsi" }.build())?;
    ensure!(
        (MIN_MMSI as i64..=MAX_MMSI as i64).contains(&mmsi),
        VesselInvalidFieldSnafu {
            index,
            field: "mmsi",
            reason: format!("'{mmsi}' must be a 9-digit integer"),
        }
    );

    let name = raw
        .name
        .ok_or_else(|| VesselMissingFieldSnafu { index, field: "name" }.build())?;

    let vessel_type = raw.vessel_type.ok_or_else(|| {
        VesselMissingFieldSnafu {
            index,
            field: "type",
        }
        .build()
    })?;
    let vessel_type = vessel_type.to_lowercase();
    ensure!(
        vessel_type.parse::<VesselType>().is_ok(),
        VesselInvalidFieldSnafu {
            index,
            field: "type",
            reason: format!("unknown vessel type '{vessel_type}'"),
        }
    );

    let start_position = raw.start_position.ok_or_else(|| {
        VesselMissingFieldSnafu {
            index,
            field: "start_position",
        }
        .build()
    })?;
    ensure!(
        start_position.len() == 2,
        VesselInvalidFieldSnafu {
            index,
            field: "start_position",
            reason: "must be a [lat, lon] pair".to_string(),
        }
    );
    ensure!(
        (-90.0..=90.0).contains(&start_position[0]),
        VesselInvalidFieldSnafu {
            index,
            field: "start_position",
            reason: format!("invalid latitude {}", start_position[0]),
        }
    );
    ensure!(
        (-180.0..=180.0).contains(&start_position[1]),
        VesselInvalidFieldSnafu {
            index,
            field: "start_position",
            reason: format!("invalid longitude {}", start_position[1]),
        }
    );

    let behavior = raw
        .behavior
        .as_deref()
        .unwrap_or("straight")
        .to_lowercase();
    ensure!(
        behavior.parse::<BehaviorKind>().is_ok(),
        VesselInvalidFieldSnafu {
            index,
            field: "behavior",
            reason: format!("unknown behavior '{behavior}'"),
        }
    );

    if behavior == "waypoints" {
        let waypoints = raw.waypoints.as_deref().unwrap_or_default();
        ensure!(
            !waypoints.is_empty(),
            VesselMissingFieldSnafu {
                index,
                field: "waypoints",
            }
        );
        for (wp_index, wp) in waypoints.iter().enumerate() {
            ensure!(
                wp.len() == 2,
                VesselInvalidFieldSnafu {
                    index,
                    field: "waypoints",
                    reason: format!("waypoint {wp_index} must be a [lat, lon] pair"),
                }
            );
        }
    }

    let speed = raw.speed.unwrap_or(10.0);
    ensure!(
        (0.0..=MAX_SCENARIO_SPEED_KNOTS).contains(&speed),
        VesselInvalidFieldSnafu {
            index,
            field: "speed",
            reason: format!("must be between 0 and {MAX_SCENARIO_SPEED_KNOTS} knots"),
        }
    );

    let course = raw.course.unwrap_or(0.0);
    ensure!(
        (0.0..360.0).contains(&course),
        VesselInvalidFieldSnafu {
            index,
            field: "course",
            reason: "must be between 0 and 359 degrees".to_string(),
        }
    );

    Ok(VesselConfig {
        mmsi: mmsi as i32,
        name,
        vessel_type,
        start_position,
        speed,
        course,
        behavior: Some(behavior),
        waypoints: raw.waypoints,
        loop_route: raw.loop_route,
        loiter_radius: raw.loiter_radius,
        loiter_center: raw.loiter_center,
        call_sign: raw.call_sign,
        imo_number: raw.imo_number,
        length: raw.length,
        width: raw.width,
        draught: raw.draught,
        destination: raw.destination,
        flag_state: raw.flag_state,
        ais_gap: raw.ais_gap,
    })
}

/// Names of scenario files (without extension) in a directory, sorted and
/// deduplicated. A missing directory is treated as empty.
pub fn list_scenarios(scenarios_dir: impl AsRef<Path>) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(scenarios_dir.as_ref())
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml")
            )
        })
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();

    names.sort();
    names.dedup();
    names
}

/// Summarizes a scenario file without requiring it to be valid.
pub fn scenario_info(path: impl AsRef<Path>) -> ScenarioInfo {
    let path = path.as_ref();
    let stem = |path: &Path| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    match load_scenario(path) {
        Ok(scenario) => ScenarioInfo {
            name: scenario.name,
            description: scenario.description,
            duration_minutes: scenario.duration_minutes,
            vessel_count: scenario.vessels.len(),
            has_expected_alerts: !scenario.expected_alerts.is_empty(),
            error: None,
        },
        Err(e) => ScenarioInfo {
            name: stem(path),
            description: String::new(),
            duration_minutes: 0,
            vessel_count: 0,
            has_expected_alerts: false,
            error: Some(e.to_string()),
        },
    }
}
