//! Class attendance by QR scan: log in, set up the class, scan student IDs
//! into the roster and export the register as a PDF.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod report;
pub mod roster;
pub mod scan;
pub mod session;
pub mod storage;
pub mod tracker;

#[cfg(feature = "gui")]
pub mod gui;

pub use error::{AttendError, Result};
pub use tracker::Tracker;
