use std::path::PathBuf;

use snafu::{IntoError, Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Scenario file not found: {}", path.display()))]
    ScenarioNotFound {
        #[snafu(implicit)]
        location: Location,
        path: PathBuf,
    },
    #[snafu(display("Scenario file must have a .yaml or .yml extension: {}", path.display()))]
    ScenarioExtension {
        #[snafu(implicit)]
        location: Location,
        path: PathBuf,
    },
    #[snafu(display("Failed to parse scenario document"))]
    ScenarioParse {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: config::ConfigError,
    },
    #[snafu(display("Missing required field '{field}'"))]
    MissingField {
        #[snafu(implicit)]
        location: Location,
        field: &'static str,
    },
    #[snafu(display("Invalid field '{field}': {reason}"))]
    InvalidField {
        #[snafu(implicit)]
        location: Location,
        field: &'static str,
        reason: String,
    },
    #[snafu(display("Vessel {index}: missing required field '{field}'"))]
    VesselMissingField {
        #[snafu(implicit)]
        location: Location,
        index: usize,
        field: &'static str,
    },
    #[snafu(display("Vessel {index}: invalid field '{field}': {reason}"))]
    VesselInvalidField {
        #[snafu(implicit)]
        location: Location,
        index: usize,
        field: &'static str,
        reason: String,
    },
    #[snafu(display("Duplicate MMSI '{mmsi}' in vessels"))]
    DuplicateMmsi {
        #[snafu(implicit)]
        location: Location,
        mmsi: i32,
    },
    #[snafu(display("Expected alert {index}: missing required field '{field}'"))]
    ExpectedAlertMissingField {
        #[snafu(implicit)]
        location: Location,
        index: usize,
        field: &'static str,
    },
    #[snafu(display("Waypoints are required for the waypoints behavior"))]
    MissingWaypoints {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Data source '{source_name}' is not running"))]
    NotRunning {
        #[snafu(implicit)]
        location: Location,
        source_name: String,
    },
    #[snafu(display("Domain error"))]
    Core {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: argos_core::Error,
    },
}

impl From<argos_core::Error> for Error {
    fn from(error: argos_core::Error) -> Self {
        error::CoreSnafu.into_error(error)
    }
}
