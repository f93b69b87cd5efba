use std::time::Duration;

use argos_core::{AlertSeverity, RiskLevel};
use collision_detector::{CollisionDetector, DetectorConfig};
use tokio_util::sync::CancellationToken;

use crate::helper::{
    AlertStore, CountingNotifier, FailingAlertStore, FailingNotifier, StateSource, detector,
    head_on_pair, init_tracing, vessel,
};

#[tokio::test]
async fn test_detection_creates_alert_and_notifies() {
    let detector = detector(head_on_pair());

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.risks_detected, 1);
    assert_eq!(summary.alerts_created, 1);
    assert_eq!(summary.alerts_updated, 0);
    assert_eq!(summary.failures, 0);

    assert_eq!(detector.alerts().active_count(), 1);
    assert_eq!(detector.notifier().count(), 1);

    let alerts = detector.alerts().alerts.lock().unwrap();
    let alert = &alerts[0];
    assert_eq!(alert.severity, AlertSeverity::Critical);
    assert_eq!(alert.details.risk_level, RiskLevel::Critical);
    assert!(alert.risk_score > 0.0);
}

#[tokio::test]
async fn test_second_pass_updates_instead_of_duplicating() {
    let detector = detector(head_on_pair());

    detector.run_detection().await.unwrap();
    let (id, first_updated_at) = {
        let alerts = detector.alerts().alerts.lock().unwrap();
        (alerts[0].id, alerts[0].updated_at)
    };

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.alerts_created, 0);
    assert_eq!(summary.alerts_updated, 1);

    // Still one alert, touched rather than duplicated, and no second
    // notification.
    assert_eq!(detector.alerts().active_count(), 1);
    assert!(detector.alerts().updated_at(id).unwrap() >= first_updated_at);
    assert_eq!(detector.notifier().count(), 1);
}

#[tokio::test]
async fn test_pair_ordering_does_not_affect_dedup() {
    let mut states = head_on_pair();
    let detector = detector(states.clone());
    detector.run_detection().await.unwrap();

    // Same encounter with the vessels swapped.
    states.swap(0, 1);
    let second = CollisionDetector::new(
        StateSource { states },
        AlertStore {
            alerts: std::sync::Mutex::new(
                detector.alerts().alerts.lock().unwrap().clone(),
            ),
        },
        CountingNotifier::default(),
        DetectorConfig::default(),
    );

    let summary = second.run_detection().await.unwrap();
    assert_eq!(summary.alerts_created, 0);
    assert_eq!(summary.alerts_updated, 1);
    assert_eq!(second.notifier().count(), 0);
}

#[tokio::test]
async fn test_no_alerts_for_calm_traffic() {
    // Parallel northbound vessels well separated.
    let detector = detector(vec![
        vessel(237_001_000, 40.60, 22.80, 10.0, 0.0),
        vessel(237_002_000, 40.60, 23.00, 10.0, 0.0),
    ]);

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.risks_detected, 0);
    assert_eq!(detector.alerts().active_count(), 0);
    assert_eq!(detector.notifier().count(), 0);
}

#[tokio::test]
async fn test_stationary_vessels_do_not_alert() {
    let detector = detector(vec![
        vessel(237_001_000, 40.60, 22.90, 0.1, 0.0),
        vessel(237_002_000, 40.61, 22.90, 0.2, 180.0),
    ]);

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.risks_detected, 0);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_pass() {
    init_tracing();
    let detector = CollisionDetector::new(
        StateSource {
            states: head_on_pair(),
        },
        AlertStore::default(),
        FailingNotifier,
        DetectorConfig::default(),
    );

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.alerts_created, 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(detector.alerts().active_count(), 1);
}

#[tokio::test]
async fn test_persistence_failure_is_counted_not_raised() {
    init_tracing();
    let detector = CollisionDetector::new(
        StateSource {
            states: head_on_pair(),
        },
        FailingAlertStore,
        CountingNotifier::default(),
        DetectorConfig::default(),
    );

    let summary = detector.run_detection().await.unwrap();
    assert_eq!(summary.risks_detected, 1);
    assert_eq!(summary.alerts_created, 0);
    assert_eq!(summary.failures, 1);
    assert_eq!(detector.notifier().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_periodic_loop_stops_on_cancellation() {
    let detector = detector(head_on_pair());
    let cancel = CancellationToken::new();

    let loop_cancel = cancel.clone();
    let run = async {
        detector
            .run_periodically(Duration::from_millis(10), loop_cancel)
            .await;
    };

    let stop = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    };

    tokio::join!(run, stop);

    // The first tick fires immediately, so at least one pass ran.
    assert!(detector.alerts().active_count() == 1);
    assert!(detector.notifier().count() >= 1);
}
