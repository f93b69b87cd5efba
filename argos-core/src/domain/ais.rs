use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use snafu::{ResultExt, ensure};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::error::{
    Error, Result,
    error::{
        InvalidBoundingBoxSnafu, InvalidLatitudeSnafu, InvalidLongitudeSnafu, InvalidMmsiSnafu,
        ParseMmsiSnafu,
    },
};

pub const MIN_MMSI: i32 = 100_000_000;
pub const MAX_MMSI: i32 = 999_999_999;

/// Maximum speed over ground encodable in an AIS position report.
pub const MAX_SOG_KNOTS: f64 = 102.2;

/// Maritime Mobile Service Identity, a 9-digit vessel identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(try_from = "i32")]
pub struct Mmsi(i32);

impl Mmsi {
    pub fn new(value: i32) -> Result<Self> {
        ensure!(
            (MIN_MMSI..=MAX_MMSI).contains(&value),
            InvalidMmsiSnafu { value }
        );
        Ok(Self(value))
    }

    pub fn into_inner(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Mmsi {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Mmsi> for i32 {
    fn from(value: Mmsi) -> Self {
        value.0
    }
}

impl FromStr for Mmsi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.parse().context(ParseMmsiSnafu)?)
    }
}

impl Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Geographic position in degrees.
///
/// `new` rejects out-of-range coordinates, it never clamps.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        ensure!(
            (-90.0..=90.0).contains(&latitude),
            InvalidLatitudeSnafu { value: latitude }
        );
        ensure!(
            (-180.0..=180.0).contains(&longitude),
            InvalidLongitudeSnafu { value: longitude }
        );
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Rectangular lat/lon filter region.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = Error;

    fn try_from(raw: RawBoundingBox) -> Result<Self> {
        Self::new(raw.min_lat, raw.max_lat, raw.min_lon, raw.max_lon)
    }
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self> {
        let valid = (-90.0..=90.0).contains(&min_lat)
            && (-90.0..=90.0).contains(&max_lat)
            && (-180.0..=180.0).contains(&min_lon)
            && (-180.0..=180.0).contains(&max_lon)
            && min_lat <= max_lat
            && min_lon <= max_lon;
        ensure!(
            valid,
            InvalidBoundingBoxSnafu {
                min_lat,
                max_lat,
                min_lon,
                max_lon
            }
        );
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.min_lat <= latitude
            && latitude <= self.max_lat
            && self.min_lon <= longitude
            && longitude <= self.max_lon
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }
}

/// Kinematic state of a moving vessel. Mutated only by a movement behavior's
/// update step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub position: Position,
    /// Knots.
    pub speed: f64,
    /// Degrees, [0, 360).
    pub course: f64,
    /// Degrees, [0, 360).
    pub heading: f64,
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize_repr,
    Deserialize_repr,
    strum::Display,
    AsRefStr,
    EnumString,
)]
#[repr(i32)]
pub enum NavigationStatus {
    UnderWayUsingEngine = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManoeuverability = 3,
    ConstrainedByDraught = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWaySailing = 8,
    Reserved9 = 9,
    Reserved10 = 10,
    Reserved11 = 11,
    Reserved12 = 12,
    Reserved13 = 13,
    AisSartIsActive = 14,
    NotDefined = 15,
}

/// Vessel type categories, simplified from the AIS ship type codes.
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
    EnumIter,
    IntoStaticStr,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VesselType {
    Cargo,
    Tanker,
    Passenger,
    Fishing,
    Military,
    PleasureCraft,
    HighSpeedCraft,
    Tug,
    PilotVessel,
    SearchAndRescue,
    Dredger,
    LawEnforcement,
    Sailing,
    Other,
    Unknown,
}

impl VesselType {
    pub fn from_ais_code(code: Option<i32>) -> Self {
        match code {
            None => Self::Unknown,
            Some(code) => match code {
                70..=79 => Self::Cargo,
                80..=89 => Self::Tanker,
                60..=69 => Self::Passenger,
                30 => Self::Fishing,
                35 => Self::Military,
                36..=37 => Self::PleasureCraft,
                40..=49 => Self::HighSpeedCraft,
                31..=32 => Self::Tug,
                50 => Self::PilotVessel,
                51 => Self::SearchAndRescue,
                33 => Self::Dredger,
                55 => Self::LawEnforcement,
                0 => Self::Unknown,
                _ => Self::Other,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
pub enum PositionAccuracy {
    /// Position error under 10 meters.
    #[serde(rename = "H")]
    #[strum(serialize = "H")]
    High,
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    Low,
}

/// Source-agnostic position report, the sole artifact the emulator hands to
/// the rest of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AisMessage {
    pub mmsi: Mmsi,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_over_ground: Option<f64>,
    pub course_over_ground: Option<f64>,
    pub heading: Option<i32>,
    pub rate_of_turn: Option<f64>,
    pub navigation_status: Option<NavigationStatus>,
    pub vessel_name: Option<String>,
    pub vessel_type: Option<VesselType>,
    pub call_sign: Option<String>,
    pub imo_number: Option<i32>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub draught: Option<f64>,
    pub destination: Option<String>,
    pub position_accuracy: PositionAccuracy,
    pub source: String,
    pub source_quality: f64,
    pub received_at: DateTime<Utc>,
}

impl AisMessage {
    /// Validates coordinates and normalizes the remaining fields.
    ///
    /// Speed is clamped to `[0, 102.2]`, course and heading are wrapped mod
    /// 360 and source quality is clamped to `[0, 1]`. Out-of-range
    /// coordinates are an error, not a clamp.
    pub fn normalized(mut self) -> Result<Self> {
        Position::new(self.latitude, self.longitude)?;

        if let Some(sog) = self.speed_over_ground {
            self.speed_over_ground = Some(sog.clamp(0.0, MAX_SOG_KNOTS));
        }
        if let Some(cog) = self.course_over_ground {
            self.course_over_ground = Some(cog.rem_euclid(360.0));
        }
        if let Some(heading) = self.heading {
            self.heading = Some(heading.rem_euclid(360));
        }
        self.source_quality = self.source_quality.clamp(0.0, 1.0);

        Ok(self)
    }

    pub fn position(&self) -> Result<Position> {
        Position::new(self.latitude, self.longitude)
    }

    /// Whether the vessel is moving faster than the stationary threshold.
    pub fn is_moving(&self) -> bool {
        self.speed_over_ground.unwrap_or(0.0) > 0.5
    }
}
