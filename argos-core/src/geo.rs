//! Geometry and kinematics primitives shared by the emulator and the
//! collision detector.
//!
//! Dead reckoning uses a flat-earth approximation with nm-per-degree factors
//! taken at the *current* latitude. The collision detector uses a different
//! local frame (factors at the pair's average latitude). Both conventions are
//! deliberate and only valid over short distances; emergent vessel tracks and
//! alert thresholds depend on them, so neither should be replaced with full
//! geodesic math.

use std::time::Duration;

use crate::Position;

/// Earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Nautical miles per degree of latitude.
pub const NM_PER_DEGREE: f64 = 60.0;

/// Great-circle distance between two positions in nautical miles.
pub fn haversine_distance(a: Position, b: Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_NM * c
}

/// Initial great-circle bearing from `from` toward `to`, degrees [0, 360).
pub fn bearing(from: Position, to: Position) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lon1 = from.longitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let lon2 = to.longitude.to_radians();

    let dlon = lon2 - lon1;

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Projects a position forward by dead reckoning.
pub fn dead_reckon(position: Position, speed_knots: f64, course_deg: f64, elapsed: Duration) -> Position {
    let hours = elapsed.as_secs_f64() / 3600.0;
    let distance_nm = speed_knots * hours;

    let lat_change = distance_nm * course_deg.to_radians().cos() / NM_PER_DEGREE;
    let lon_change = distance_nm * course_deg.to_radians().sin()
        / (NM_PER_DEGREE * position.latitude.to_radians().cos());

    Position {
        latitude: position.latitude + lat_change,
        longitude: position.longitude + lon_change,
    }
}

/// Decomposes speed and course into (eastward, northward) components in
/// knots. Course is measured clockwise from north.
pub fn velocity_components(speed_knots: f64, course_deg: f64) -> (f64, f64) {
    let course = course_deg.to_radians();
    (speed_knots * course.sin(), speed_knots * course.cos())
}
