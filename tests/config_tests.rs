// Integration tests for settings loading

use std::io::Write;
use std::path::PathBuf;

use attendscan::config::Settings;
use attendscan::scan::CameraFacing;
use attendscan::AttendError;

#[test]
fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.institution, "UNIVERSITY OF OSUN");
    assert_eq!(settings.debounce_window().num_milliseconds(), 3000);
    assert_eq!(settings.banner_lifetime().num_milliseconds(), 3000);
    assert!(settings.roster_file.is_none());
    assert!(!settings.seed().unwrap().is_empty());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"pin": "1234", "debounce_ms": 1500, "scanner": {{"facing": "user"}}}}"#
    )
    .unwrap();

    let settings = Settings::from_file(file.path()).unwrap();
    assert_eq!(settings.pin, "1234");
    assert_eq!(settings.debounce_window().num_milliseconds(), 1500);
    assert_eq!(settings.scanner.facing, CameraFacing::User);
    assert_eq!(settings.scanner.fps, 10);
    assert_eq!(settings.institution, Settings::default().institution);
}

#[test]
fn test_malformed_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ pin = ").unwrap();

    assert!(matches!(Settings::from_file(file.path()), Err(AttendError::Config(_))));
}

#[test]
fn test_seed_from_roster_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"id": 1, "name": "Ada Lovelace", "matric": "CSC/100/01"}}]"#).unwrap();

    let settings = Settings {
        roster_file: Some(file.path().to_path_buf()),
        ..Settings::default()
    };
    let seed = settings.seed().unwrap();
    assert_eq!(seed.len(), 1);
    assert_eq!(seed[0].matric, "CSC/100/01");

    let missing = Settings {
        roster_file: Some(PathBuf::from("/nonexistent/roster.json")),
        ..Settings::default()
    };
    assert!(matches!(missing.seed(), Err(AttendError::Io(_))));
}
