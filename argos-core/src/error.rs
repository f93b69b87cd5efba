use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid MMSI '{value}', expected a 9-digit integer"))]
    InvalidMmsi {
        #[snafu(implicit)]
        location: Location,
        value: i32,
    },
    #[snafu(display("Invalid latitude '{value}'"))]
    InvalidLatitude {
        #[snafu(implicit)]
        location: Location,
        value: f64,
    },
    #[snafu(display("Invalid longitude '{value}'"))]
    InvalidLongitude {
        #[snafu(implicit)]
        location: Location,
        value: f64,
    },
    #[snafu(display(
        "Invalid bounding box, min_lat '{min_lat}', max_lat '{max_lat}', min_lon '{min_lon}', max_lon '{max_lon}'"
    ))]
    InvalidBoundingBox {
        #[snafu(implicit)]
        location: Location,
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },
    #[snafu(display("Failed to parse MMSI"))]
    ParseMmsi {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: std::num::ParseIntError,
    },
    #[snafu(display("Storage operation failed: {reason}"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        reason: String,
    },
    #[snafu(display("Notification push failed: {reason}"))]
    Notification {
        #[snafu(implicit)]
        location: Location,
        reason: String,
    },
}
