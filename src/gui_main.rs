use eframe::{run_native, NativeOptions};
use egui::ViewportBuilder;

use attendscan::gui::AttendScanApp;

fn main() -> Result<(), eframe::Error> {
    // Initialize logging
    env_logger::init();

    let options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([480.0, 800.0])
            .with_min_inner_size([380.0, 560.0])
            .with_title("AttendScan"),
        ..Default::default()
    };

    run_native(
        "AttendScan",
        options,
        Box::new(|cc| Box::new(AttendScanApp::new(cc))),
    )
}
