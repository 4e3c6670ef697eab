// Integration tests for the roster and the mark-present routine

mod common;

use std::collections::HashSet;
use std::io::Write;

use attendscan::roster::{self, MarkOutcome, Roster, SeedStudent, Status};
use attendscan::AttendError;

#[test]
fn test_seeded_roster_starts_absent() {
    let roster = Roster::from_seed(&common::seed()).unwrap();

    assert_eq!(roster.len(), 3);
    assert!(roster
        .students()
        .iter()
        .all(|s| s.status == Status::Absent && s.check_in_time.is_none()));
    assert_eq!(roster.present_count(), 0);
    assert_eq!(roster.absent_count(), 3);
}

#[test]
fn test_duplicate_matric_rejected() {
    let mut seed = common::seed();
    seed.push(SeedStudent {
        id: 4,
        name: "Someone Else".to_string(),
        matric: "CSC/100/02".to_string(),
    });

    match Roster::from_seed(&seed) {
        Err(AttendError::DuplicateMatric(matric)) => assert_eq!(matric, "CSC/100/02"),
        other => panic!("expected duplicate matric error, got {:?}", other),
    }
}

#[test]
fn test_unknown_matric_leaves_roster_unchanged() {
    let mut roster = Roster::from_seed(&common::seed()).unwrap();
    let before = roster.clone();

    let outcome = roster.mark_present("CSC/999/99", "09:00:00 16/10/2026");

    assert_eq!(
        outcome,
        MarkOutcome::NotFound {
            matric: "CSC/999/99".to_string()
        }
    );
    assert_eq!(roster, before);
}

#[test]
fn test_mark_present_is_idempotent() {
    let mut roster = Roster::from_seed(&common::seed()).unwrap();

    let first = roster.mark_present("CSC/100/01", "09:00:00 16/10/2026");
    assert!(first.is_success());
    let student = roster.find("CSC/100/01").unwrap();
    assert_eq!(student.status, Status::Present);
    assert_eq!(student.check_in_time.as_deref(), Some("09:00:00 16/10/2026"));

    // A later scan must not move the check-in time
    let second = roster.mark_present("CSC/100/01", "09:05:00 16/10/2026");
    assert_eq!(
        second,
        MarkOutcome::AlreadyCheckedIn {
            name: "Ada Lovelace".to_string()
        }
    );
    let student = roster.find("CSC/100/01").unwrap();
    assert_eq!(student.status, Status::Present);
    assert_eq!(student.check_in_time.as_deref(), Some("09:00:00 16/10/2026"));
}

#[test]
fn test_lookup_is_exact() {
    let mut roster = Roster::from_seed(&common::seed()).unwrap();

    // No case folding or padding removal inside the routine itself
    assert!(matches!(roster.mark_present("csc/100/01", "t"), MarkOutcome::NotFound { .. }));
    assert!(matches!(roster.mark_present(" CSC/100/01", "t"), MarkOutcome::NotFound { .. }));
    assert_eq!(roster.present_count(), 0);
}

#[test]
fn test_counts_always_add_up() {
    let mut roster = Roster::from_seed(&common::seed()).unwrap();
    roster.mark_present("CSC/100/01", "t");
    roster.mark_present("CSC/100/03", "t");
    roster.mark_present("CSC/100/03", "t");

    assert_eq!(roster.present_count(), 2);
    assert_eq!(roster.present_count() + roster.absent_count(), roster.len());
}

#[test]
fn test_outcome_messages() {
    let ok = MarkOutcome::CheckedIn { name: "Ada".to_string() };
    let again = MarkOutcome::AlreadyCheckedIn { name: "Ada".to_string() };
    let missing = MarkOutcome::NotFound { matric: "X/1".to_string() };

    assert_eq!(ok.message(), "✅ Ada Checked In!");
    assert_eq!(again.message(), "⚠️ Ada is already checked in!");
    assert_eq!(missing.message(), "❌ ID: X/1 not found.");
}

#[test]
fn test_default_seed_is_valid() {
    let seed = roster::default_seed().unwrap();
    assert!(!seed.is_empty());

    let matrics: HashSet<_> = seed.iter().map(|s| s.matric.as_str()).collect();
    assert_eq!(matrics.len(), seed.len());
    assert!(Roster::from_seed(&seed).is_ok());
}

#[test]
fn test_load_seed_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": 7, "name": "Edsger Dijkstra", "matric": "CSC/200/07"}}]"#
    )
    .unwrap();

    let seed = roster::load_seed(file.path()).unwrap();
    assert_eq!(
        seed,
        vec![SeedStudent {
            id: 7,
            name: "Edsger Dijkstra".to_string(),
            matric: "CSC/200/07".to_string(),
        }]
    );
}

#[test]
fn test_roster_serializes_like_the_stored_students_entry() {
    let mut roster = Roster::from_seed(&common::seed()[..1]).unwrap();
    roster.mark_present("CSC/100/01", "09:00:00 16/10/2026");

    let json = serde_json::to_value(&roster).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": 1,
            "name": "Ada Lovelace",
            "matric": "CSC/100/01",
            "status": "Present",
            "checkInTime": "09:00:00 16/10/2026"
        }])
    );
}
