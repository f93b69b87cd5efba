//! The emulation engine: owns the vessel fleet and drives it forward on a
//! background tick task.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use argos_core::{AisMessage, BoundingBox, Mmsi, PositionReportSink, VesselType};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use snafu::ensure;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    error::{Result, error::NotRunningSnafu},
    scenario::{DEFAULT_UPDATE_INTERVAL, Scenario},
    vessel::{EmulatedVessel, generate_random_vessel},
};

pub const SOURCE_NAME: &str = "traffic-emulator";

/// First MMSI handed out to randomly generated vessels.
const RANDOM_TRAFFIC_MMSI_BASE: i32 = 999_000_000;

#[derive(Debug, Clone, Serialize)]
pub struct EmulatorStatistics {
    pub running: bool,
    pub vessel_count: usize,
    pub transmitting_count: usize,
    pub update_count: u64,
    pub elapsed_seconds: f64,
    pub scenario: Option<String>,
    pub update_interval_seconds: u64,
    pub vessel_types: BTreeMap<String, usize>,
    pub behaviors: BTreeMap<String, usize>,
    pub average_speed_knots: f64,
}

struct EmulatorState {
    vessels: HashMap<Mmsi, EmulatedVessel>,
    update_interval: Duration,
    started_at: Option<Instant>,
    last_update: Option<Instant>,
    update_count: u64,
    scenario_name: Option<String>,
    running: bool,
    rng: StdRng,
}

impl EmulatorState {
    fn update_positions(&mut self, elapsed: Duration) {
        for vessel in self.vessels.values_mut() {
            vessel.update(elapsed);
        }
        self.update_count += 1;
    }
}

pub struct TrafficEmulator {
    state: Arc<Mutex<EmulatorState>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Default for TrafficEmulator {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}

impl TrafficEmulator {
    pub fn new(update_interval: Duration) -> Self {
        Self::with_rng(update_interval, StdRng::from_os_rng())
    }

    /// A deterministic emulator for tests.
    pub fn with_seed(update_interval: Duration, seed: u64) -> Self {
        Self::with_rng(update_interval, StdRng::seed_from_u64(seed))
    }

    fn with_rng(update_interval: Duration, rng: StdRng) -> Self {
        Self {
            state: Arc::new(Mutex::new(EmulatorState {
                vessels: HashMap::new(),
                update_interval,
                started_at: None,
                last_update: None,
                update_count: 0,
                scenario_name: None,
                running: false,
                rng,
            })),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Replaces the current fleet with the scenario's vessels. A vessel that
    /// fails to build is skipped with a warning; the rest of the scenario
    /// still loads. Returns the number of vessels loaded.
    pub async fn load_scenario(&self, scenario: &Scenario) -> usize {
        let mut state = self.state.lock().await;
        state.vessels.clear();
        state.update_interval = scenario.update_interval;
        state.scenario_name = Some(scenario.name.clone());

        let mut loaded = 0;
        for config in &scenario.vessels {
            match EmulatedVessel::from_config(config) {
                Ok(vessel) => {
                    state.vessels.insert(vessel.mmsi(), vessel);
                    loaded += 1;
                }
                Err(e) => {
                    warn!("skipping vessel {} in scenario: {e}", config.mmsi);
                }
            }
        }

        info!("loaded {loaded} vessels from scenario '{}'", scenario.name);
        loaded
    }

    /// Replaces the current fleet with randomly generated traffic inside the
    /// bounding box. Returns the MMSIs of the generated vessels.
    pub async fn generate_random_traffic(
        &self,
        count: usize,
        bbox: &BoundingBox,
        vessel_types: Option<&[VesselType]>,
    ) -> Vec<Mmsi> {
        let mut state = self.state.lock().await;
        state.vessels.clear();
        state.scenario_name = None;

        let mut generated = Vec::with_capacity(count);

        for i in 0..count {
            let Ok(mmsi) = Mmsi::new(RANDOM_TRAFFIC_MMSI_BASE + i as i32) else {
                break;
            };
            let vessel = {
                let rng = &mut state.rng;
                generate_random_vessel(mmsi, bbox, vessel_types, rng)
            };
            state.vessels.insert(mmsi, vessel);
            generated.push(mmsi);
        }

        info!("generated {} random vessels", generated.len());
        generated
    }

    /// Adds a vessel to the fleet, replacing any existing vessel with the
    /// same MMSI.
    pub async fn add_vessel(&self, vessel: EmulatedVessel) {
        let mut state = self.state.lock().await;
        let mmsi = vessel.mmsi();
        if state.vessels.insert(mmsi, vessel).is_some() {
            warn!("replaced existing vessel with MMSI {mmsi}");
        }
    }

    pub async fn remove_vessel(&self, mmsi: Mmsi) -> bool {
        self.state.lock().await.vessels.remove(&mmsi).is_some()
    }

    pub async fn vessel_count(&self) -> usize {
        self.state.lock().await.vessels.len()
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    /// Starts the background tick task. Idempotent; a second call while
    /// running is a no-op.
    pub async fn start(&mut self) {
        {
            let mut state = self.state.lock().await;
            if state.running {
                return;
            }
            state.running = true;
            state.started_at = Some(Instant::now());
            state.last_update = None;
            state.update_count = 0;
        }

        let state = self.state.clone();
        let cancel = self.cancel.child_token();
        self.handle = Some(tokio::spawn(async move {
            run_tick_loop(state, cancel).await;
        }));
        info!("traffic emulator started");
    }

    /// Stops the background task and waits for the in-flight tick to finish.
    /// Idempotent; the emulator can be started again afterwards.
    pub async fn stop(&mut self) {
        {
            let state = self.state.lock().await;
            if !state.running {
                return;
            }
        }

        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("tick task failed: {e}");
            }
        }
        self.cancel = CancellationToken::new();

        let mut state = self.state.lock().await;
        state.running = false;
        info!("traffic emulator stopped after {} updates", state.update_count);
    }

    /// Advances the whole fleet by `elapsed` of simulated time without the
    /// background task, for deterministic stepping.
    pub async fn tick(&self, elapsed: Duration) {
        self.state.lock().await.update_positions(elapsed);
    }

    /// Current position reports for the fleet. Vessels inside an AIS gap are
    /// omitted unless `include_non_transmitting` is set; an optional bounding
    /// box filters by position.
    pub async fn messages(
        &self,
        bbox: Option<&BoundingBox>,
        include_non_transmitting: bool,
    ) -> Vec<AisMessage> {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let mut messages = Vec::with_capacity(state.vessels.len());
        for vessel in state.vessels.values_mut() {
            if !include_non_transmitting && !vessel.is_transmitting() {
                continue;
            }
            match vessel.to_message(now) {
                Ok(message) => {
                    if bbox.is_none_or(|b| b.contains(message.latitude, message.longitude)) {
                        messages.push(message);
                    }
                }
                Err(e) => {
                    warn!("dropping invalid position report for {}: {e}", vessel.mmsi());
                }
            }
        }
        messages
    }

    /// Like [`messages`](Self::messages), but fails when the emulator is not
    /// running, for callers that treat it as a live data source.
    pub async fn fetch_messages(
        &self,
        bbox: Option<&BoundingBox>,
        include_non_transmitting: bool,
    ) -> Result<Vec<AisMessage>> {
        ensure!(
            self.is_running().await,
            NotRunningSnafu {
                source_name: SOURCE_NAME,
            }
        );
        Ok(self.messages(bbox, include_non_transmitting).await)
    }

    /// Renders the fleet's current reports and forwards them to a sink.
    /// Returns the number of reports forwarded.
    pub async fn forward_messages(
        &self,
        sink: &dyn PositionReportSink,
    ) -> Result<usize> {
        let messages = self.messages(None, false).await;
        let count = messages.len();
        sink.add_position_reports(messages).await?;
        Ok(count)
    }

    pub async fn statistics(&self) -> EmulatorStatistics {
        let state = self.state.lock().await;

        let mut vessel_types = BTreeMap::new();
        let mut behaviors = BTreeMap::new();
        let mut transmitting_count = 0;
        let mut speed_sum = 0.0;
        for vessel in state.vessels.values() {
            *vessel_types
                .entry(vessel.vessel_type().as_ref().to_string())
                .or_insert(0) += 1;
            *behaviors
                .entry(vessel.behavior_kind().as_ref().to_string())
                .or_insert(0) += 1;
            if vessel.is_transmitting() {
                transmitting_count += 1;
            }
            speed_sum += vessel.speed();
        }
        let average_speed_knots = if state.vessels.is_empty() {
            0.0
        } else {
            (speed_sum / state.vessels.len() as f64 * 10.0).round() / 10.0
        };

        EmulatorStatistics {
            running: state.running,
            vessel_count: state.vessels.len(),
            transmitting_count,
            update_count: state.update_count,
            elapsed_seconds: state
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            scenario: state.scenario_name.clone(),
            update_interval_seconds: state.update_interval.as_secs(),
            vessel_types,
            behaviors,
            average_speed_knots,
        }
    }

    /// Clears the fleet and all counters. The running flag is untouched; a
    /// running emulator keeps ticking over an empty fleet.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.vessels.clear();
        state.update_count = 0;
        state.started_at = None;
        state.last_update = None;
        state.scenario_name = None;
        info!("traffic emulator reset");
    }

    pub async fn set_update_interval(&self, interval: Duration) {
        self.state.lock().await.update_interval = interval;
    }
}

async fn run_tick_loop(state: Arc<Mutex<EmulatorState>>, cancel: CancellationToken) {
    loop {
        let interval = {
            let mut state = state.lock().await;
            let now = Instant::now();
            // Wall-clock elapsed since the previous tick. An anomalously
            // large delta (a pause) falls back to the nominal interval so
            // the fleet does not teleport.
            let elapsed = match state.last_update {
                Some(last) if now - last < state.update_interval * 2 => now - last,
                _ => state.update_interval,
            };
            state.last_update = Some(now);
            state.update_positions(elapsed);
            state.update_interval
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
