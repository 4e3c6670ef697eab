// Integration tests for scan debouncing, the status banner and the scanner boundary

mod common;

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use attendscan::roster::MarkOutcome;
use attendscan::scan::{
    Banner, BannerKind, CameraFacing, CommandScanner, LineScanner, ScanDebouncer, ScanGuard, ScanService, ScannerConfig,
};
use attendscan::{AttendError, Result};
use chrono::Duration;

#[test]
fn test_repeat_inside_window_is_dropped() {
    let mut debouncer = ScanDebouncer::new(Duration::seconds(3));
    let t0 = common::start_time();

    assert!(debouncer.admit("CSC/100/01", t0));
    assert!(!debouncer.admit("CSC/100/01", t0 + Duration::milliseconds(100)));
    assert!(!debouncer.admit("CSC/100/01", t0 + Duration::milliseconds(2999)));
}

#[test]
fn test_repeat_after_window_is_admitted() {
    let mut debouncer = ScanDebouncer::new(Duration::seconds(3));
    let t0 = common::start_time();

    assert!(debouncer.admit("CSC/100/01", t0));
    assert!(debouncer.admit("CSC/100/01", t0 + Duration::seconds(3)));
}

#[test]
fn test_dropped_repeats_do_not_extend_window() {
    let mut debouncer = ScanDebouncer::new(Duration::seconds(3));
    let t0 = common::start_time();

    assert!(debouncer.admit("CSC/100/01", t0));
    assert!(!debouncer.admit("CSC/100/01", t0 + Duration::seconds(2)));
    // Window is measured from the accepted scan, not the dropped one
    assert!(debouncer.admit("CSC/100/01", t0 + Duration::milliseconds(3500)));
}

#[test]
fn test_different_code_resets_suppression() {
    let mut debouncer = ScanDebouncer::new(Duration::seconds(3));
    let t0 = common::start_time();

    assert!(debouncer.admit("CSC/100/01", t0));
    assert!(debouncer.admit("CSC/100/02", t0));
    // Single slot: the first code is no longer remembered
    assert!(debouncer.admit("CSC/100/01", t0 + Duration::milliseconds(10)));
}

#[test]
fn test_clear_forgets_last_scan() {
    let mut debouncer = ScanDebouncer::new(Duration::seconds(3));
    let t0 = common::start_time();

    assert!(debouncer.admit("CSC/100/01", t0));
    debouncer.clear();
    assert!(debouncer.admit("CSC/100/01", t0));
}

#[test]
fn test_banner_kind_and_expiry() {
    let t0 = common::start_time();
    let ok = MarkOutcome::CheckedIn { name: "Ada".to_string() };
    let missing = MarkOutcome::NotFound { matric: "X".to_string() };

    let banner = Banner::for_outcome(&ok, t0, Duration::seconds(3));
    assert_eq!(banner.kind, BannerKind::Success);
    assert!(banner.is_visible(t0 + Duration::milliseconds(2999)));
    assert!(!banner.is_visible(t0 + Duration::seconds(3)));

    let banner = Banner::for_outcome(&missing, t0, Duration::seconds(3));
    assert_eq!(banner.kind, BannerKind::Error);
    assert_eq!(banner.message, "❌ ID: X not found.");
}

#[test]
fn test_default_scanner_config() {
    let config = ScannerConfig::default();
    assert_eq!(config.fps, 10);
    assert_eq!((config.region_width, config.region_height), (250, 250));
    assert_eq!(config.facing, CameraFacing::Environment);
    assert!(config.remember_last_camera);

    let env = config.env();
    assert!(env.contains(&("ATTENDSCAN_REGION", "250x250".to_string())));
    assert!(env.contains(&("ATTENDSCAN_FACING", "environment".to_string())));
}

#[test]
fn test_line_scanner_forwards_each_line() {
    let input = Cursor::new("CSC/100/01\nCSC/100/02\n");
    let guard = ScanGuard::start(LineScanner::new(input), &ScannerConfig::default()).unwrap();

    assert_eq!(guard.recv().as_deref(), Some("CSC/100/01"));
    assert_eq!(guard.recv().as_deref(), Some("CSC/100/02"));
    assert_eq!(guard.recv(), None);
}

#[test]
fn test_line_scanner_starts_once() {
    let mut scanner = LineScanner::new(Cursor::new(""));
    assert!(scanner.start(&ScannerConfig::default()).is_ok());
    assert!(matches!(
        scanner.start(&ScannerConfig::default()),
        Err(AttendError::Scanner(_))
    ));
}

/// Service whose teardown always fails, counting how often it is asked to stop
struct FailingStop {
    stops: Arc<AtomicUsize>,
    events: Option<Receiver<String>>,
}

impl ScanService for FailingStop {
    fn start(&mut self, _config: &ScannerConfig) -> Result<Receiver<String>> {
        self.events
            .take()
            .ok_or_else(|| AttendError::Scanner("no events".to_string()))
    }

    fn stop(&mut self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Err(AttendError::Scanner("camera already released".to_string()))
    }
}

#[test]
fn test_guard_releases_on_drop_and_swallows_errors() {
    let stops = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = mpsc::channel();
    tx.send("CSC/100/01".to_string()).unwrap();

    let service = FailingStop {
        stops: stops.clone(),
        events: Some(rx),
    };

    {
        let guard = ScanGuard::start(service, &ScannerConfig::default()).unwrap();
        assert_eq!(guard.poll(), vec!["CSC/100/01".to_string()]);
        assert!(guard.poll().is_empty());
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }

    // Dropped without panicking despite the failed stop
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[cfg(unix)]
#[test]
fn test_command_scanner_forwards_decoder_output() {
    let scanner = CommandScanner::new("printf CSC/100/01\\nCSC/100/02\\n");
    let guard = ScanGuard::start(scanner, &ScannerConfig::default()).unwrap();

    assert_eq!(guard.recv().as_deref(), Some("CSC/100/01"));
    assert_eq!(guard.recv().as_deref(), Some("CSC/100/02"));
    assert_eq!(guard.recv(), None);
}

#[cfg(unix)]
#[test]
fn test_dropping_guard_kills_decoder() {
    let guard = ScanGuard::start(CommandScanner::new("sleep 60"), &ScannerConfig::default()).unwrap();
    assert!(guard.poll().is_empty());

    // Drop waits on the child, so it only returns promptly if the decoder was killed
    let started = Instant::now();
    drop(guard);
    assert!(started.elapsed() < StdDuration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn test_stop_reaps_decoder_that_already_exited() {
    let mut scanner = CommandScanner::new("true");
    let events = scanner.start(&ScannerConfig::default()).unwrap();
    assert_eq!(events.recv().ok(), None);

    assert!(scanner.stop().is_ok());
    // Nothing left to stop
    assert!(scanner.stop().is_ok());
}

#[test]
fn test_command_scanner_rejects_empty_command() {
    let mut scanner = CommandScanner::new("   ");
    match scanner.start(&ScannerConfig::default()) {
        Err(AttendError::Scanner(message)) => assert_eq!(message, "empty scanner command"),
        other => panic!("expected scanner error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_command_scanner_reports_missing_program() {
    let mut scanner = CommandScanner::new("attendscan-no-such-decoder --raw");
    assert!(matches!(
        scanner.start(&ScannerConfig::default()),
        Err(AttendError::Scanner(_))
    ));
}
