use egui::{Color32, Context, Key, RichText, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};
use log::{error, warn};

use crate::config::Settings;
use crate::scan::{CommandScanner, ScanGuard, ScannerConfig};
use crate::tracker::Tracker;

use super::theme::{ACCENT, DANGER, WARNING};
use super::utils::{action_button, show_banner, status_color, truncate_string};

/// What the dashboard asks the app to do
pub enum DashboardAction {
    EditSetup,
    Logout,
    Export,
    Alert(String),
}

/// Counts, scan controls and the class list
pub struct Dashboard {
    scanning: bool,
    scan_input: String,
    focus_input: bool,
    decoder: Option<ScanGuard<CommandScanner>>,
    decoder_error: Option<String>,
    scanner_command: Option<String>,
    scanner_config: ScannerConfig,
}

impl Dashboard {
    pub fn new(settings: &Settings) -> Self {
        Self {
            scanning: false,
            scan_input: String::new(),
            focus_input: false,
            decoder: None,
            decoder_error: None,
            scanner_command: settings.scanner_command.clone(),
            scanner_config: settings.scanner.clone(),
        }
    }

    /// Turn scanning on. The scan field always accepts keyboard-wedge input;
    /// a configured decoder command is started alongside it.
    pub fn start_scanning(&mut self) {
        self.scanning = true;
        self.focus_input = true;
        self.decoder_error = None;

        if let Some(command) = &self.scanner_command {
            match ScanGuard::start(CommandScanner::new(command.clone()), &self.scanner_config) {
                Ok(guard) => self.decoder = Some(guard),
                Err(e) => {
                    warn!("Decoder unavailable: {}", e);
                    self.decoder_error = Some(e.to_string());
                }
            }
        }
    }

    /// Turn scanning off, releasing the decoder
    pub fn stop_scanning(&mut self) {
        self.scanning = false;
        self.decoder = None;
        self.scan_input.clear();
    }

    fn submit(&mut self, tracker: &mut Tracker, decoded: &str) -> Option<DashboardAction> {
        match tracker.submit_scan(decoded) {
            Ok(_) => None,
            Err(e) => {
                error!("Failed to record scan: {}", e);
                Some(DashboardAction::Alert(e.to_string()))
            }
        }
    }

    pub fn show(&mut self, ui: &mut Ui, ctx: &Context, tracker: &mut Tracker) -> Option<DashboardAction> {
        let mut action = None;

        // Feed anything the decoder produced since the last frame
        let decoded: Vec<String> = self.decoder.as_ref().map(|d| d.poll()).unwrap_or_default();
        for text in decoded {
            if let Some(a) = self.submit(tracker, &text) {
                action = Some(a);
            }
        }

        // Header: course code, level, edit and logout
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading(RichText::new(&tracker.course().course_code).color(ACCENT).strong());
                ui.label(RichText::new(&tracker.course().level).color(Color32::GRAY));
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🚪 Logout").on_hover_text("Log out and clear all data").clicked() {
                    action = Some(DashboardAction::Logout);
                }
                if ui.button("✏ Edit").on_hover_text("Edit class setup").clicked() {
                    action = Some(DashboardAction::EditSetup);
                }
            });
        });

        ui.separator();

        // Stats
        let roster = tracker.roster();
        ui.columns(2, |cols| {
            stat_card(&mut cols[0], "Total", roster.len(), Color32::DARK_GRAY);
            stat_card(&mut cols[1], "Present", roster.present_count(), ACCENT);
        });

        ui.add_space(8.0);

        // Controls
        ui.horizontal(|ui| {
            if !self.scanning {
                if ui.add(action_button("📷 Scan ID", ACCENT)).clicked() {
                    self.start_scanning();
                }
            } else if ui.add(action_button("✖ Stop Camera", DANGER)).clicked() {
                self.stop_scanning();
            }

            if ui.add(action_button("🖨 PDF", Color32::from_rgb(75, 85, 99))).clicked() {
                action = Some(DashboardAction::Export);
            }
        });

        if self.scanning {
            ui.add_space(8.0);
            let response = ui.add(
                TextEdit::singleline(&mut self.scan_input)
                    .hint_text("Scan an ID card or type a matric number")
                    .desired_width(f32::INFINITY),
            );
            if self.focus_input {
                response.request_focus();
                self.focus_input = false;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                let text = std::mem::take(&mut self.scan_input);
                if !text.trim().is_empty() {
                    if let Some(a) = self.submit(tracker, &text) {
                        action = Some(a);
                    }
                }
                // Keep the field ready for the next card
                self.focus_input = true;
            }

            if let Some(err) = &self.decoder_error {
                ui.label(RichText::new(format!("Decoder not running: {}", err)).color(WARNING));
            }
        }

        if let Some(banner) = tracker.banner() {
            ui.add_space(8.0);
            show_banner(ui, banner);
        }

        // Keep polling the decoder and let the banner expire on time
        if self.scanning || tracker.banner().is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }

        ui.add_space(8.0);
        roster_table(ui, tracker);

        action
    }
}

fn stat_card(ui: &mut Ui, label: &str, value: usize, color: Color32) {
    ui.group(|ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(label).color(Color32::GRAY));
            ui.label(RichText::new(value.to_string()).size(28.0).strong().color(color));
        });
    });
}

fn roster_table(ui: &mut Ui, tracker: &Tracker) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::initial(240.0).at_least(160.0).resizable(true))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Student");
            });
            header.col(|ui| {
                ui.strong("Status");
            });
        })
        .body(|mut body| {
            for student in tracker.roster().students() {
                body.row(40.0, |mut row| {
                    row.col(|ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(truncate_string(&student.name, 40)).strong());
                            ui.label(RichText::new(&student.matric).small().color(Color32::GRAY));
                        });
                    });
                    row.col(|ui| {
                        ui.vertical(|ui| {
                            ui.label(
                                RichText::new(student.status.to_string())
                                    .color(status_color(student.status))
                                    .strong(),
                            );
                            if let Some(time) = &student.check_in_time {
                                ui.label(RichText::new(time).small());
                            }
                        });
                    });
                });
            }
        });
}
