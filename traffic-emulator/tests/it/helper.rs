use std::{
    sync::{Mutex, Once},
    time::Duration,
};

use argos_core::{AisMessage, PositionReportSink};
use async_trait::async_trait;
use tracing_subscriber::FmtSubscriber;
use traffic_emulator::{
    engine::TrafficEmulator,
    scenario::{Scenario, parse_scenario_str},
};

pub const TICK: Duration = Duration::from_millis(20);

static TRACING: Once = Once::new();

/// A deterministic emulator with a fast tick for tests.
pub fn emulator(seed: u64) -> TrafficEmulator {
    TRACING.call_once(|| {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder()
                .with_max_level(tracing::Level::INFO)
                .finish(),
        )
        .unwrap();
    });
    TrafficEmulator::with_seed(TICK, seed)
}

/// Sink that records every forwarded batch.
#[derive(Default)]
pub struct TestSink {
    pub batches: Mutex<Vec<Vec<AisMessage>>>,
}

#[async_trait]
impl PositionReportSink for TestSink {
    async fn add_position_reports(&self, messages: Vec<AisMessage>) -> argos_core::Result<()> {
        self.batches.lock().unwrap().push(messages);
        Ok(())
    }
}

pub fn two_vessel_scenario() -> Scenario {
    parse_scenario_str(
        r#"
name: "test"
description: "two transiting vessels"
duration_minutes: 10
update_interval: 1
vessels:
  - mmsi: 237001000
    name: "AEGEAN SPIRIT"
    type: "cargo"
    start_position: [40.60, 22.90]
    speed: 10.0
    course: 0.0
  - mmsi: 237002000
    name: "POSEIDON STAR"
    type: "tanker"
    start_position: [40.55, 22.85]
    speed: 8.0
    course: 90.0
"#,
    )
    .unwrap()
}

pub fn gap_vessel_scenario() -> Scenario {
    parse_scenario_str(
        r#"
name: "gap"
description: "one vessel goes dark immediately"
duration_minutes: 10
update_interval: 1
vessels:
  - mmsi: 237001000
    name: "AEGEAN SPIRIT"
    type: "cargo"
    start_position: [40.60, 22.90]
    speed: 10.0
    course: 0.0
  - mmsi: 237003000
    name: "DARK TRADER"
    type: "fishing"
    start_position: [40.55, 22.85]
    speed: 5.0
    course: 45.0
    ais_gap:
      start_after_seconds: 0.0
      duration_seconds: 3600.0
"#,
    )
    .unwrap()
}
