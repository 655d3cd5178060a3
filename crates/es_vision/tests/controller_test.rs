mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_test::{assert_err, assert_ok};

use common::{harness, settle, StaticClassifier};
use es_core::{EmoScopeError, EventKind, StatusText};
use es_vision::{CaptureConfig, SessionState, StartPolicy, TickDriver, TickOutcome};

#[tokio::test]
async fn test_successful_tick_updates_image_and_label() {
    let classifier = Arc::new(StaticClassifier::detecting("happy"));
    let mut h = harness(classifier.clone(), true, CaptureConfig::default());

    assert_ok!(h.controller.start());
    assert_eq!(h.controller.state(), SessionState::Running);

    let outcome = h.controller.tick();
    assert_eq!(outcome, TickOutcome::Reschedule(Duration::from_millis(10)));

    let image = h.display.image().expect("tick should publish an image");
    assert_eq!((image.width, image.height), (2, 2));
    assert_eq!(&image.rgba[..4], &[30, 20, 10, 255]);
    assert_eq!(image.frame_sequence, 1);

    settle(&h.controller).await;
    assert_eq!(classifier.calls(), 1);
    assert_eq!(h.display.label().to_string(), "Detected Emotion: HAPPY");
}

#[tokio::test]
async fn test_failed_read_reschedules_without_image_or_inference() {
    let classifier = Arc::new(StaticClassifier::detecting("sad"));
    let mut h = harness(classifier.clone(), true, CaptureConfig::default());
    h.probe.script_reads(&[false]);
    let mut events = h.events.subscribe();

    assert_ok!(h.controller.start());
    let generation = h.display.image_generation();

    let outcome = h.controller.tick();
    assert!(matches!(outcome, TickOutcome::Reschedule(_)));
    assert_eq!(h.display.image_generation(), generation);
    assert!(h.display.image().is_none());
    assert_eq!(h.controller.dispatcher().in_flight(), 0);

    tokio::task::yield_now().await;
    assert_eq!(classifier.calls(), 0);
    assert_eq!(h.display.label(), StatusText::Idle);

    assert_eq!(events.recv().await.unwrap().kind, EventKind::SessionStarted);
    assert_eq!(events.recv().await.unwrap().kind, EventKind::FrameReadFailed);

    // 下一次 tick 恢复正常
    h.controller.tick();
    assert!(h.display.image().is_some());
    assert_eq!(h.controller.session().unwrap().stats().read_failures, 1);
}

#[tokio::test]
async fn test_tick_after_stop_never_touches_released_handle() {
    let classifier = Arc::new(StaticClassifier::detecting("neutral"));
    let mut h = harness(classifier, true, CaptureConfig::default());

    assert_ok!(h.controller.start());
    h.controller.tick();
    h.controller.stop();

    assert_eq!(h.controller.tick(), TickOutcome::Halt);
    assert_eq!(h.probe.reads.load(Ordering::SeqCst), 1);
    assert_eq!(h.probe.reads_after_release.load(Ordering::SeqCst), 0);
    assert_eq!(h.probe.live(), 0);
    assert!(h.display.image().is_none());
}

#[tokio::test]
async fn test_start_while_running_is_ignored_by_default() {
    let classifier = Arc::new(StaticClassifier::no_face());
    let mut h = harness(classifier, true, CaptureConfig::default());

    assert_ok!(h.controller.start());
    let first = h.controller.session().unwrap().id();
    assert_ok!(h.controller.start());

    assert_eq!(h.probe.opens.load(Ordering::SeqCst), 1);
    assert_eq!(h.probe.live(), 1);
    assert_eq!(h.controller.session().unwrap().id(), first);
}

#[tokio::test]
async fn test_restart_policy_swaps_handle_without_overlap() {
    let classifier = Arc::new(StaticClassifier::no_face());
    let config = CaptureConfig {
        start_policy: StartPolicy::Restart,
        ..Default::default()
    };
    let mut h = harness(classifier, true, config);

    assert_ok!(h.controller.start());
    let first = h.controller.session().unwrap().id();
    assert_ok!(h.controller.start());

    assert_eq!(h.probe.opens.load(Ordering::SeqCst), 2);
    assert_eq!(h.probe.releases.load(Ordering::SeqCst), 1);
    assert_eq!(h.probe.live(), 1);
    assert_eq!(h.probe.peak_handles.load(Ordering::SeqCst), 1);
    assert_ne!(h.controller.session().unwrap().id(), first);
}

#[tokio::test]
async fn test_start_stop_sequences_keep_at_most_one_handle() {
    let classifier = Arc::new(StaticClassifier::detecting("surprise"));
    for policy in [StartPolicy::Ignore, StartPolicy::Restart] {
        let config = CaptureConfig {
            start_policy: policy,
            ..Default::default()
        };
        let mut h = harness(classifier.clone(), true, config);

        // 0 = start, 1 = stop, 2 = tick
        let script = [0, 0, 2, 1, 1, 2, 0, 2, 2, 0, 1, 0, 0, 2, 1, 2, 1, 0];
        for step in script {
            match step {
                0 => assert_ok!(h.controller.start()),
                1 => h.controller.stop(),
                _ => {
                    h.controller.tick();
                }
            }
            assert!(h.probe.live() <= 1);
        }

        drop(h.controller);
        assert_eq!(h.probe.peak_handles.load(Ordering::SeqCst), 1);
        assert_eq!(h.probe.live(), 0);
        assert_eq!(
            h.probe.opens.load(Ordering::SeqCst),
            h.probe.releases.load(Ordering::SeqCst)
        );
        assert_eq!(h.probe.reads_after_release.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_device_unavailable_is_reported_and_session_stays_stopped() {
    let classifier = Arc::new(StaticClassifier::detecting("happy"));
    let mut h = harness(classifier, false, CaptureConfig::default());
    let mut events = h.events.subscribe();

    let err = assert_err!(h.controller.start());
    assert!(matches!(
        err,
        EmoScopeError::DeviceUnavailable { device_id: 0, .. }
    ));
    assert_eq!(h.controller.state(), SessionState::Stopped);
    assert_eq!(h.display.label().to_string(), "Camera 0 unavailable");
    assert_eq!(h.controller.tick(), TickOutcome::Halt);
    assert_eq!(events.recv().await.unwrap().kind, EventKind::DeviceUnavailable);
}

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let classifier = Arc::new(StaticClassifier::no_face());
    let mut h = harness(classifier, true, CaptureConfig::default());
    let generation = h.display.image_generation();

    h.controller.stop();
    h.controller.stop();
    assert_eq!(h.display.image_generation(), generation);
    assert_eq!(h.probe.releases.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inference_finishing_after_stop_still_writes_label() {
    let classifier = Arc::new(StaticClassifier::detecting("angry"));
    let mut h = harness(classifier, true, CaptureConfig::default());

    assert_ok!(h.controller.start());
    h.controller.tick();
    h.controller.stop();
    assert!(h.display.image().is_none());

    settle(&h.controller).await;
    assert_eq!(h.display.label().to_string(), "Detected Emotion: ANGRY");
    assert!(h.display.image().is_none());
}

#[tokio::test]
async fn test_driver_runs_ticks_until_stopped() {
    let classifier = Arc::new(StaticClassifier::no_face());
    let config = CaptureConfig {
        tick_interval_ms: 5,
        ..Default::default()
    };
    let mut h = harness(classifier, true, config);
    let mut driver = TickDriver::new();

    assert_eq!(driver.poll(&mut h.controller, Instant::now()), None);

    assert_ok!(h.controller.start());
    driver.arm();
    assert_eq!(
        driver.poll(&mut h.controller, Instant::now()),
        Some(Duration::from_millis(5))
    );
    assert_eq!(h.probe.reads.load(Ordering::SeqCst), 1);

    // 未到期不 tick
    let waited = driver.poll(&mut h.controller, Instant::now());
    assert!(waited.is_some_and(|d| d <= Duration::from_millis(5)));
    assert_eq!(h.probe.reads.load(Ordering::SeqCst), 1);

    let later = Instant::now() + Duration::from_millis(10);
    driver.poll(&mut h.controller, later);
    assert_eq!(h.probe.reads.load(Ordering::SeqCst), 2);

    h.controller.stop();
    let later = Instant::now() + Duration::from_millis(10);
    assert_eq!(driver.poll(&mut h.controller, later), None);
    assert!(!driver.is_armed());
    assert_eq!(h.probe.reads.load(Ordering::SeqCst), 2);

    settle(&h.controller).await;
    assert_eq!(h.display.label().to_string(), "No face detected");
}
