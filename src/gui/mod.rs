mod app;
mod dashboard;
mod login_panel;
mod setup_panel;
mod theme;
mod utils;

pub use app::AttendScanApp;
