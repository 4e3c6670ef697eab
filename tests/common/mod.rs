// Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use attendscan::auth::SharedPin;
use attendscan::clock::ManualClock;
use attendscan::config::Settings;
use attendscan::roster::SeedStudent;
use attendscan::session::SetupForm;
use attendscan::storage::{MemoryStorage, Storage};
use attendscan::Tracker;
use chrono::{DateTime, Local, TimeZone};

pub const PIN: &str = "2024/58434";

pub fn seed() -> Vec<SeedStudent> {
    vec![
        SeedStudent { id: 1, name: "Ada Lovelace".to_string(), matric: "CSC/100/01".to_string() },
        SeedStudent { id: 2, name: "Alan Turing".to_string(), matric: "CSC/100/02".to_string() },
        SeedStudent { id: 3, name: "Grace Hopper".to_string(), matric: "CSC/100/03".to_string() },
    ]
}

pub fn start_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
}

pub fn settings() -> Settings {
    Settings {
        pin: PIN.to_string(),
        ..Settings::default()
    }
}

pub fn setup_form() -> SetupForm {
    SetupForm {
        department: "Software Engineering".to_string(),
        course_code: "SEN 211".to_string(),
        level: "200 Level".to_string(),
        course_title: None,
    }
}

pub fn tracker_with(storage: Box<dyn Storage>) -> (Tracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let tracker = Tracker::open(
        &settings(),
        seed(),
        storage,
        Box::new(SharedPin::new(PIN)),
        clock.clone(),
    )
    .unwrap();
    (tracker, clock)
}

pub fn tracker() -> (Tracker, Arc<ManualClock>) {
    tracker_with(Box::new(MemoryStorage::new()))
}

/// Logged in with the class set up
pub fn active_tracker() -> (Tracker, Arc<ManualClock>) {
    let (mut tracker, clock) = tracker();
    tracker.login(PIN).unwrap();
    tracker.complete_setup(setup_form()).unwrap();
    (tracker, clock)
}
