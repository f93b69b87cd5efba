//! Movement behaviors for emulated vessels.
//!
//! The behavior set is closed and exhaustively tested, so it is a sum type
//! rather than an open trait. Apart from waypoint arrival, every behavior
//! injects bounded random perturbation; callers must assert on bounds, not
//! exact trajectories. The RNG is passed in so tests can seed it.

use std::time::Duration;

use argos_core::{KinematicState, Position, bearing, dead_reckon, haversine_distance};
use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::error::{Result, error::MissingWaypointsSnafu};
use snafu::ensure;

pub const DEFAULT_COURSE_VARIATION_DEG: f64 = 2.0;
pub const DEFAULT_SPEED_VARIATION_KNOTS: f64 = 0.5;
pub const DEFAULT_LOITER_RADIUS_NM: f64 = 0.1;
pub const DEFAULT_DRIFT_SPEED_KNOTS: f64 = 0.5;
pub const DEFAULT_ARRIVAL_THRESHOLD_NM: f64 = 0.05;
pub const DEFAULT_MAX_DRIFT_NM: f64 = 0.01;

/// Loiter orbit rate in degrees per hour.
const LOITER_ANGULAR_SPEED: f64 = 10.0;

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
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Straight,
    Loiter,
    Waypoints,
    Evasive,
    Anchored,
}

/// Straight line movement with slight random variations.
#[derive(Debug, Clone)]
pub struct Straight {
    pub course_variation: f64,
    pub speed_variation: f64,
}

impl Default for Straight {
    fn default() -> Self {
        Self {
            course_variation: DEFAULT_COURSE_VARIATION_DEG,
            speed_variation: DEFAULT_SPEED_VARIATION_KNOTS,
        }
    }
}

impl Straight {
    fn update(&self, state: &KinematicState, elapsed: Duration, rng: &mut StdRng) -> KinematicState {
        let position = dead_reckon(state.position, state.speed, state.course, elapsed);

        let course = (state.course
            + rng.random_range(-self.course_variation..=self.course_variation))
        .rem_euclid(360.0);
        let speed = (state.speed
            + rng.random_range(-self.speed_variation..=self.speed_variation))
        .max(0.0);

        KinematicState {
            position,
            speed,
            course,
            heading: course,
        }
    }
}

/// Slow circular drift around a center point.
#[derive(Debug, Clone)]
pub struct Loiter {
    /// Lazily set to the first observed position when not configured.
    center: Option<Position>,
    radius_nm: f64,
    drift_speed: f64,
    angle: f64,
}

impl Loiter {
    pub fn new(center: Option<Position>, radius_nm: f64, drift_speed: f64) -> Self {
        Self {
            center,
            radius_nm,
            drift_speed,
            angle: 0.0,
        }
    }

    fn update(
        &mut self,
        state: &KinematicState,
        elapsed: Duration,
        rng: &mut StdRng,
    ) -> KinematicState {
        let center = *self.center.get_or_insert(state.position);

        let hours = elapsed.as_secs_f64() / 3600.0;
        self.angle = (self.angle + LOITER_ANGULAR_SPEED * hours).rem_euclid(360.0);

        let radius_deg = self.radius_nm / 60.0;
        let position = Position {
            latitude: center.latitude + radius_deg * self.angle.to_radians().cos(),
            longitude: center.longitude
                + radius_deg * self.angle.to_radians().sin() / center.latitude.to_radians().cos(),
        };

        // Course tangent to the orbit.
        let course = (self.angle + 90.0).rem_euclid(360.0);
        let speed = (self.drift_speed + rng.random_range(-0.2..=0.2)).clamp(0.1, 1.0);

        KinematicState {
            position,
            speed,
            course,
            heading: course,
        }
    }
}

/// Follows an ordered list of waypoints, then either loops or degrades to
/// straight-line motion.
#[derive(Debug, Clone)]
pub struct Waypoints {
    waypoints: Vec<Position>,
    arrival_threshold_nm: f64,
    loop_route: bool,
    current_index: usize,
    finished: bool,
}

impl Waypoints {
    pub fn new(waypoints: Vec<Position>, arrival_threshold_nm: f64, loop_route: bool) -> Result<Self> {
        ensure!(!waypoints.is_empty(), MissingWaypointsSnafu);
        Ok(Self {
            waypoints,
            arrival_threshold_nm,
            loop_route,
            current_index: 0,
            finished: false,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn current_waypoint(&self) -> Option<Position> {
        if self.finished || self.current_index >= self.waypoints.len() {
            None
        } else {
            Some(self.waypoints[self.current_index])
        }
    }

    fn update(
        &mut self,
        state: &KinematicState,
        elapsed: Duration,
        rng: &mut StdRng,
    ) -> KinematicState {
        let Some(target) = self.current_waypoint() else {
            return Straight::default().update(state, elapsed, rng);
        };

        let course = bearing(state.position, target);
        let position = dead_reckon(state.position, state.speed, course, elapsed);

        if haversine_distance(position, target) < self.arrival_threshold_nm {
            self.current_index += 1;
            if self.current_index >= self.waypoints.len() {
                if self.loop_route {
                    self.current_index = 0;
                } else {
                    self.finished = true;
                }
            }
        }

        KinematicState {
            position,
            speed: state.speed,
            course,
            heading: course,
        }
    }
}

/// Suspicious movement with large random course and speed changes.
#[derive(Debug, Clone)]
pub struct Evasive {
    pub course_change_range: f64,
    pub speed_change_range: f64,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for Evasive {
    fn default() -> Self {
        Self {
            course_change_range: 45.0,
            speed_change_range: 3.0,
            min_speed: 2.0,
            max_speed: 18.0,
        }
    }
}

impl Evasive {
    fn update(&self, state: &KinematicState, elapsed: Duration, rng: &mut StdRng) -> KinematicState {
        let course = (state.course
            + rng.random_range(-self.course_change_range..=self.course_change_range))
        .rem_euclid(360.0);
        let speed = (state.speed
            + rng.random_range(-self.speed_change_range..=self.speed_change_range))
        .clamp(self.min_speed, self.max_speed);

        let position = dead_reckon(state.position, speed, course, elapsed);

        KinematicState {
            position,
            speed,
            course,
            heading: course,
        }
    }
}

/// Stationary at anchor with minimal drift.
#[derive(Debug, Clone)]
pub struct Anchored {
    /// Lazily set to the first observed position.
    anchor: Option<Position>,
    max_drift_nm: f64,
}

impl Anchored {
    pub fn new(max_drift_nm: f64) -> Self {
        Self {
            anchor: None,
            max_drift_nm,
        }
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    fn update(
        &mut self,
        state: &KinematicState,
        _elapsed: Duration,
        rng: &mut StdRng,
    ) -> KinematicState {
        let anchor = *self.anchor.get_or_insert(state.position);

        let mut position = Position {
            latitude: state.position.latitude + rng.random_range(-0.0001..=0.0001),
            longitude: state.position.longitude + rng.random_range(-0.0001..=0.0001),
        };

        // Snap back when the drift exceeds the anchor chain.
        if haversine_distance(position, anchor) > self.max_drift_nm {
            position = anchor;
        }

        // The vessel swings at anchor.
        let heading = (state.heading + rng.random_range(-5.0..=5.0)).rem_euclid(360.0);

        KinematicState {
            position,
            speed: 0.0,
            course: state.course,
            heading,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Straight(Straight),
    Loiter(Loiter),
    Waypoints(Waypoints),
    Evasive(Evasive),
    Anchored(Anchored),
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Straight(_) => BehaviorKind::Straight,
            Self::Loiter(_) => BehaviorKind::Loiter,
            Self::Waypoints(_) => BehaviorKind::Waypoints,
            Self::Evasive(_) => BehaviorKind::Evasive,
            Self::Anchored(_) => BehaviorKind::Anchored,
        }
    }

    /// Produces the next kinematic state after `elapsed` of simulated time.
    pub fn update(
        &mut self,
        state: &KinematicState,
        elapsed: Duration,
        rng: &mut StdRng,
    ) -> KinematicState {
        match self {
            Self::Straight(b) => b.update(state, elapsed, rng),
            Self::Loiter(b) => b.update(state, elapsed, rng),
            Self::Waypoints(b) => b.update(state, elapsed, rng),
            Self::Evasive(b) => b.update(state, elapsed, rng),
            Self::Anchored(b) => b.update(state, elapsed, rng),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self::Straight(Straight::default())
    }
}
