use super::{Mmsi, Position};

/// Kinematic snapshot of a vessel as read back from storage, the detector's
/// view of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselState {
    pub mmsi: Mmsi,
    pub name: String,
    pub position: Position,
    /// Knots.
    pub speed: f64,
    /// Degrees clockwise from north.
    pub course: f64,
    /// Meters.
    pub length: Option<f64>,
}
