//! Emulated vessels: identity, owned kinematics/behavior and AIS message
//! rendering.

use std::time::Duration;

use argos_core::{
    AisMessage, BoundingBox, KinematicState, Mmsi, NavigationStatus, Position, PositionAccuracy,
    VesselType,
};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::Deserialize;
use snafu::ensure;

use crate::{
    behavior::{
        Anchored, Behavior, BehaviorKind, DEFAULT_ARRIVAL_THRESHOLD_NM, DEFAULT_LOITER_RADIUS_NM,
        DEFAULT_MAX_DRIFT_NM, Evasive, Loiter, Straight, Waypoints,
    },
    error::{
        Result,
        error::{InvalidFieldSnafu, MissingFieldSnafu},
    },
};

pub const EMULATOR_SOURCE: &str = "emulator";

/// A scheduled transmission gap: the vessel goes dark `start_after_seconds`
/// into the simulation and stays dark for `duration_seconds`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AisGap {
    #[serde(default)]
    pub start_after_seconds: f64,
    #[serde(default)]
    pub duration_seconds: f64,
}

/// Declarative vessel description, one entry of a scenario's vessel list.
#[derive(Debug, Clone, Deserialize)]
pub struct VesselConfig {
    pub mmsi: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub vessel_type: String,
    pub start_position: Vec<f64>,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub course: f64,
    pub behavior: Option<String>,
    pub waypoints: Option<Vec<Vec<f64>>>,
    #[serde(default, rename = "loop")]
    pub loop_route: bool,
    pub loiter_radius: Option<f64>,
    pub loiter_center: Option<Vec<f64>>,
    pub call_sign: Option<String>,
    pub imo_number: Option<i32>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub draught: Option<f64>,
    pub destination: Option<String>,
    pub flag_state: Option<String>,
    pub ais_gap: Option<AisGap>,
}

fn default_speed() -> f64 {
    10.0
}

#[derive(Debug)]
pub struct EmulatedVessel {
    mmsi: Mmsi,
    name: String,
    vessel_type: VesselType,
    call_sign: Option<String>,
    imo_number: Option<i32>,
    length: Option<f64>,
    width: Option<f64>,
    draught: Option<f64>,
    destination: Option<String>,
    flag_state: Option<String>,
    state: KinematicState,
    behavior: Behavior,
    rng: StdRng,
    elapsed_seconds: f64,
    ais_gap: Option<AisGap>,
    transmitting: bool,
}

impl EmulatedVessel {
    pub fn new(
        mmsi: Mmsi,
        name: String,
        vessel_type: VesselType,
        position: Position,
        speed: f64,
        course: f64,
        behavior: Behavior,
    ) -> Self {
        Self {
            mmsi,
            name,
            vessel_type,
            call_sign: None,
            imo_number: None,
            length: None,
            width: None,
            draught: None,
            destination: None,
            flag_state: None,
            state: KinematicState {
                position,
                speed,
                course,
                heading: course,
            },
            behavior,
            rng: StdRng::from_os_rng(),
            elapsed_seconds: 0.0,
            ais_gap: None,
            transmitting: true,
        }
    }

    /// Builds a vessel from its declarative description. Pure, and fails
    /// before constructing anything when a required field is missing or
    /// invalid.
    pub fn from_config(config: &VesselConfig) -> Result<Self> {
        let mmsi = Mmsi::new(config.mmsi).map_err(|e| {
            InvalidFieldSnafu {
                field: "mmsi",
                reason: e.to_string(),
            }
            .build()
        })?;
        ensure!(!config.name.is_empty(), MissingFieldSnafu { field: "name" });

        let vessel_type: VesselType = config.vessel_type.parse().map_err(|_| {
            InvalidFieldSnafu {
                field: "type",
                reason: format!("unknown vessel type '{}'", config.vessel_type),
            }
            .build()
        })?;

        let position = parse_position(&config.start_position, "start_position")?;
        let behavior = build_behavior(config)?;

        let mut vessel = Self::new(
            mmsi,
            config.name.clone(),
            vessel_type,
            position,
            config.speed,
            config.course,
            behavior,
        );
        vessel.call_sign = config.call_sign.clone();
        vessel.imo_number = config.imo_number;
        vessel.length = config.length;
        vessel.width = config.width;
        vessel.draught = config.draught;
        vessel.destination = config.destination.clone();
        vessel.flag_state = config.flag_state.clone();
        vessel.ais_gap = config.ais_gap;
        Ok(vessel)
    }

    /// Replaces the vessel's RNG with a seeded one, for deterministic tests.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn mmsi(&self) -> Mmsi {
        self.mmsi
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vessel_type(&self) -> VesselType {
        self.vessel_type
    }

    pub fn behavior_kind(&self) -> BehaviorKind {
        self.behavior.kind()
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn course(&self) -> f64 {
        self.state.course
    }

    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    pub fn is_transmitting(&self) -> bool {
        self.transmitting
    }

    /// Derived from the behavior and current speed.
    pub fn navigation_status(&self) -> NavigationStatus {
        match self.behavior.kind() {
            BehaviorKind::Anchored => NavigationStatus::AtAnchor,
            BehaviorKind::Loiter if self.state.speed < 1.0 => NavigationStatus::AtAnchor,
            _ if self.state.speed < 0.5 => NavigationStatus::Moored,
            _ => NavigationStatus::UnderWayUsingEngine,
        }
    }

    /// Advances the vessel by `elapsed` of simulated time. The transmitting
    /// flag is recomputed first so a gap takes effect on the tick it starts.
    pub fn update(&mut self, elapsed: Duration) {
        self.elapsed_seconds += elapsed.as_secs_f64();
        self.update_gap_status();
        self.state = self.behavior.update(&self.state, elapsed, &mut self.rng);
    }

    fn update_gap_status(&mut self) {
        self.transmitting = match self.ais_gap {
            None => true,
            Some(gap) => {
                !(self.elapsed_seconds >= gap.start_after_seconds
                    && self.elapsed_seconds < gap.start_after_seconds + gap.duration_seconds)
            }
        };
    }

    /// Snapshots the vessel as a position report, with slight positional
    /// noise for realism.
    pub fn to_message(&mut self, now: DateTime<Utc>) -> argos_core::Result<AisMessage> {
        let lat_noise = self.rng.random_range(-0.00001..=0.00001);
        let lon_noise = self.rng.random_range(-0.00001..=0.00001);

        AisMessage {
            mmsi: self.mmsi,
            timestamp: now,
            latitude: self.state.position.latitude + lat_noise,
            longitude: self.state.position.longitude + lon_noise,
            speed_over_ground: Some((self.state.speed * 10.0).round() / 10.0),
            course_over_ground: Some((self.state.course * 10.0).round() / 10.0),
            heading: Some(self.state.heading as i32),
            rate_of_turn: None,
            navigation_status: Some(self.navigation_status()),
            vessel_name: Some(self.name.clone()),
            vessel_type: Some(self.vessel_type),
            call_sign: self.call_sign.clone(),
            imo_number: self.imo_number,
            length: self.length,
            width: self.width,
            draught: self.draught,
            destination: self.destination.clone(),
            position_accuracy: PositionAccuracy::High,
            source: EMULATOR_SOURCE.to_string(),
            source_quality: 1.0,
            received_at: now,
        }
        .normalized()
    }
}

fn parse_position(raw: &[f64], field: &'static str) -> Result<Position> {
    ensure!(
        raw.len() == 2,
        InvalidFieldSnafu {
            field,
            reason: "expected a [lat, lon] pair".to_string(),
        }
    );
    Position::new(raw[0], raw[1]).map_err(|e| {
        InvalidFieldSnafu {
            field,
            reason: e.to_string(),
        }
        .build()
    })
}

fn build_behavior(config: &VesselConfig) -> Result<Behavior> {
    let kind = match &config.behavior {
        None => BehaviorKind::Straight,
        // Unknown behavior names fall back to straight, mirroring the
        // permissive factory contract. Scenario validation is stricter.
        Some(name) => name.parse().unwrap_or(BehaviorKind::Straight),
    };

    Ok(match kind {
        BehaviorKind::Straight => Behavior::Straight(Straight::default()),
        BehaviorKind::Loiter => {
            let center = match &config.loiter_center {
                Some(raw) => Some(parse_position(raw, "loiter_center")?),
                None => None,
            };
            Behavior::Loiter(Loiter::new(
                center,
                config.loiter_radius.unwrap_or(DEFAULT_LOITER_RADIUS_NM),
                0.5,
            ))
        }
        BehaviorKind::Waypoints => {
            let raw = config.waypoints.as_deref().unwrap_or_default();
            let mut waypoints = Vec::with_capacity(raw.len());
            for wp in raw {
                waypoints.push(parse_position(wp, "waypoints")?);
            }
            Behavior::Waypoints(Waypoints::new(
                waypoints,
                DEFAULT_ARRIVAL_THRESHOLD_NM,
                config.loop_route,
            )?)
        }
        BehaviorKind::Evasive => Behavior::Evasive(Evasive::default()),
        BehaviorKind::Anchored => Behavior::Anchored(Anchored::new(DEFAULT_MAX_DRIFT_NM)),
    })
}

// Rectangular sub-areas of the Thermaikos Gulf that are guaranteed to be in
// water. Random traffic is biased into these so vessels do not spawn on land
// in the absence of real coastline data.
const THERMAIKOS_SEA_ZONES: [(f64, f64, f64, f64); 5] = [
    // Main shipping channel.
    (40.52, 40.58, 22.85, 22.95),
    // Southern approach.
    (40.48, 40.54, 22.80, 22.92),
    // Eastern channel.
    (40.54, 40.59, 22.90, 22.96),
    // Port approach area.
    (40.58, 40.62, 22.90, 22.94),
    // Western gulf.
    (40.50, 40.56, 22.78, 22.88),
];

const RANDOM_VESSEL_TYPES: [VesselType; 6] = [
    VesselType::Cargo,
    VesselType::Tanker,
    VesselType::Passenger,
    VesselType::Fishing,
    VesselType::Tug,
    VesselType::PleasureCraft,
];

const NAME_PREFIXES: [&str; 5] = ["AEGEAN", "POSEIDON", "OLYMPIC", "MEDITERRANEAN", "GREEK"];
const NAME_SUFFIXES: [&str; 5] = ["SPIRIT", "STAR", "VOYAGER", "CARRIER", "EXPRESS"];
const DESTINATIONS: [&str; 4] = ["PIRAEUS", "THESSALONIKI", "VOLOS", "PATRAS"];
const FLAG_STATES: [&str; 6] = ["GR", "MT", "CY", "PA", "LR", "MH"];

/// A random in-water position: one of the known sea zones when the bbox is
/// the Thermaikos area, uniform within the bbox otherwise.
pub fn random_sea_position(bbox: &BoundingBox, rng: &mut StdRng) -> Position {
    let is_thermaikos = (40.45..=40.65).contains(&bbox.min_lat())
        && (40.55..=40.70).contains(&bbox.max_lat())
        && (22.70..=23.10).contains(&bbox.min_lon())
        && (22.85..=23.10).contains(&bbox.max_lon());

    let (min_lat, max_lat, min_lon, max_lon) = if is_thermaikos {
        *THERMAIKOS_SEA_ZONES
            .choose(rng)
            .unwrap_or(&THERMAIKOS_SEA_ZONES[0])
    } else {
        (
            bbox.min_lat(),
            bbox.max_lat(),
            bbox.min_lon(),
            bbox.max_lon(),
        )
    };

    Position {
        latitude: rng.random_range(min_lat..=max_lat),
        longitude: rng.random_range(min_lon..=max_lon),
    }
}

/// Generates a randomly configured vessel within the bounding box.
pub fn generate_random_vessel(
    mmsi: Mmsi,
    bbox: &BoundingBox,
    vessel_types: Option<&[VesselType]>,
    rng: &mut StdRng,
) -> EmulatedVessel {
    let position = random_sea_position(bbox, rng);

    let vessel_type = *vessel_types
        .unwrap_or(&RANDOM_VESSEL_TYPES)
        .choose(rng)
        .unwrap_or(&VesselType::Cargo);

    let speed = rng.random_range(0.0..=15.0);
    let course = rng.random_range(0.0..360.0);

    // Weighted 70/15/15 toward straight movement.
    let roll: f64 = rng.random_range(0.0..1.0);
    let behavior = if roll < 0.70 {
        Behavior::Straight(Straight::default())
    } else if roll < 0.85 {
        Behavior::Loiter(Loiter::new(None, rng.random_range(0.05..=0.2), 0.5))
    } else {
        Behavior::Anchored(Anchored::new(DEFAULT_MAX_DRIFT_NM))
    };

    let name = format!(
        "{} {}",
        NAME_PREFIXES.choose(rng).unwrap_or(&NAME_PREFIXES[0]),
        NAME_SUFFIXES.choose(rng).unwrap_or(&NAME_SUFFIXES[0]),
    );

    let length = rng.random_range(50.0..=300.0);
    let width = length / rng.random_range(4.0..=7.0);

    let mut vessel = EmulatedVessel::new(mmsi, name, vessel_type, position, speed, course, behavior);
    vessel.length = Some(length);
    vessel.width = Some(width);
    vessel.draught = Some(rng.random_range(4.0..=15.0));
    vessel.destination = DESTINATIONS.choose(rng).map(|d| d.to_string());
    vessel.flag_state = FLAG_STATES.choose(rng).map(|f| f.to_string());
    vessel
}
