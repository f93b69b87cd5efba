use std::time::Duration;

use argos_core::{BoundingBox, Mmsi};
use traffic_emulator::{
    error::Error,
    vessel::{EmulatedVessel, VesselConfig},
};

use crate::helper::{TICK, TestSink, emulator, gap_vessel_scenario, two_vessel_scenario};

fn vessel(mmsi: i32, name: &str) -> EmulatedVessel {
    EmulatedVessel::from_config(&VesselConfig {
        mmsi,
        name: name.into(),
        vessel_type: "cargo".into(),
        start_position: vec![40.60, 22.90],
        speed: 10.0,
        course: 0.0,
        behavior: None,
        waypoints: None,
        loop_route: false,
        loiter_radius: None,
        loiter_center: None,
        call_sign: None,
        imo_number: None,
        length: None,
        width: None,
        draught: None,
        destination: None,
        flag_state: None,
        ais_gap: None,
    })
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_background_task_ticks_and_stop_is_awaited() {
    let mut emulator = emulator(1);
    emulator.load_scenario(&two_vessel_scenario()).await;
    emulator.set_update_interval(TICK).await;

    emulator.start().await;
    // A second start while running is a no-op.
    emulator.start().await;
    assert!(emulator.is_running().await);

    tokio::time::sleep(TICK * 10).await;
    emulator.stop().await;
    assert!(!emulator.is_running().await);

    let frozen = emulator.statistics().await.update_count;
    assert!(frozen > 0);

    // No stray task keeps ticking after stop has returned.
    tokio::time::sleep(TICK * 5).await;
    assert_eq!(frozen, emulator.statistics().await.update_count);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_emulator_can_be_restarted_after_stop() {
    let mut emulator = emulator(2);
    emulator.load_scenario(&two_vessel_scenario()).await;
    emulator.set_update_interval(TICK).await;

    emulator.start().await;
    tokio::time::sleep(TICK * 5).await;
    emulator.stop().await;
    assert!(emulator.statistics().await.update_count > 0);

    // The counter starts over with the second run.
    emulator.start().await;
    tokio::time::sleep(TICK * 5).await;
    emulator.stop().await;

    let stats = emulator.statistics().await;
    assert!(stats.update_count > 0);
    assert!(stats.elapsed_seconds > 0.0);
}

#[tokio::test]
async fn test_vessels_move_between_ticks() {
    let emulator = emulator(3);
    emulator.load_scenario(&two_vessel_scenario()).await;

    let before = emulator.messages(None, true).await;
    emulator.tick(Duration::from_secs(60)).await;
    let after = emulator.messages(None, true).await;

    let mmsi = Mmsi::new(237_001_000).unwrap();
    let lat_before = before.iter().find(|m| m.mmsi == mmsi).unwrap().latitude;
    let lat_after = after.iter().find(|m| m.mmsi == mmsi).unwrap().latitude;

    // 10 knots north for a minute is about a sixth of a nautical mile.
    assert!(lat_after > lat_before + 0.001);
}

#[tokio::test]
async fn test_gap_vessels_are_omitted_unless_requested() {
    let emulator = emulator(4);
    emulator.load_scenario(&gap_vessel_scenario()).await;
    emulator.tick(Duration::from_secs(30)).await;

    let transmitting = emulator.messages(None, false).await;
    assert_eq!(transmitting.len(), 1);
    assert_eq!(transmitting[0].mmsi, Mmsi::new(237_001_000).unwrap());

    let all = emulator.messages(None, true).await;
    assert_eq!(all.len(), 2);

    let stats = emulator.statistics().await;
    assert_eq!(stats.vessel_count, 2);
    assert_eq!(stats.transmitting_count, 1);
}

#[tokio::test]
async fn test_bounding_box_filters_messages() {
    let emulator = emulator(5);
    emulator.load_scenario(&two_vessel_scenario()).await;

    // Tight box around the first vessel only.
    let bbox = BoundingBox::new(40.59, 40.61, 22.89, 22.91).unwrap();
    let messages = emulator.messages(Some(&bbox), true).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].mmsi, Mmsi::new(237_001_000).unwrap());
}

#[tokio::test]
async fn test_load_scenario_replaces_fleet() {
    let emulator = emulator(6);
    emulator.add_vessel(vessel(999_123_456, "OLD")).await;

    let loaded = emulator.load_scenario(&two_vessel_scenario()).await;
    assert_eq!(loaded, 2);
    assert_eq!(emulator.vessel_count().await, 2);
    assert!(!emulator.remove_vessel(Mmsi::new(999_123_456).unwrap()).await);
}

#[tokio::test]
async fn test_add_vessel_with_same_mmsi_replaces() {
    let emulator = emulator(7);
    emulator.add_vessel(vessel(237_001_000, "FIRST")).await;
    emulator.add_vessel(vessel(237_001_000, "SECOND")).await;
    assert_eq!(emulator.vessel_count().await, 1);

    let messages = emulator.messages(None, true).await;
    assert_eq!(messages[0].vessel_name.as_deref(), Some("SECOND"));
}

#[tokio::test]
async fn test_fetch_messages_fails_when_not_running() {
    let emulator = emulator(8);
    emulator.load_scenario(&two_vessel_scenario()).await;

    assert!(matches!(
        emulator.fetch_messages(None, false).await.unwrap_err(),
        Error::NotRunning { .. }
    ));
}

#[tokio::test]
async fn test_forward_messages_delivers_batch_to_sink() {
    let emulator = emulator(9);
    emulator.load_scenario(&two_vessel_scenario()).await;

    let sink = TestSink::default();
    let count = emulator.forward_messages(&sink).await.unwrap();
    assert_eq!(count, 2);

    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);
}

#[tokio::test]
async fn test_random_traffic_replaces_scenario_fleet() {
    let emulator = emulator(11);
    emulator.load_scenario(&two_vessel_scenario()).await;
    assert_eq!(emulator.vessel_count().await, 2);

    let bbox = BoundingBox::new(40.50, 40.60, 22.80, 22.98).unwrap();
    let generated = emulator.generate_random_traffic(5, &bbox, None).await;
    assert_eq!(generated.len(), 5);
    assert_eq!(emulator.vessel_count().await, 5);

    // The scenario vessels are gone and the statistics no longer name it.
    assert!(!emulator.remove_vessel(Mmsi::new(237_001_000).unwrap()).await);
    assert_eq!(emulator.statistics().await.scenario, None);
}

#[tokio::test]
async fn test_random_traffic_generation_and_reset() {
    let emulator = emulator(10);
    let bbox = BoundingBox::new(40.50, 40.60, 22.80, 22.98).unwrap();

    let generated = emulator.generate_random_traffic(20, &bbox, None).await;
    assert_eq!(generated.len(), 20);
    assert_eq!(emulator.vessel_count().await, 20);

    let stats = emulator.statistics().await;
    assert_eq!(stats.behaviors.values().sum::<usize>(), 20);
    assert_eq!(stats.vessel_types.values().sum::<usize>(), 20);
    assert!((0.0..=15.0).contains(&stats.average_speed_knots));

    emulator.reset().await;
    let stats = emulator.statistics().await;
    assert_eq!(stats.vessel_count, 0);
    assert_eq!(stats.update_count, 0);
}
