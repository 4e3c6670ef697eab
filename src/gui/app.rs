use std::sync::Arc;

use anyhow::Result;
use eframe::{egui, CreationContext};
use egui::{Align2, Context, RichText};
use log::error;
use rfd::FileDialog;

use crate::auth::SharedPin;
use crate::clock::SystemClock;
use crate::config::Settings;
use crate::session::Gate;
use crate::storage::FileStorage;
use crate::tracker::Tracker;

use super::dashboard::{Dashboard, DashboardAction};
use super::login_panel::LoginPanel;
use super::setup_panel::SetupPanel;
use super::theme::DANGER;

/// The main application state
pub struct AttendScanApp {
    tracker: Option<Tracker>,
    startup_error: Option<String>,

    login_panel: LoginPanel,
    setup_panel: SetupPanel,
    dashboard: Dashboard,

    // Blocking dialogs
    alert: Option<String>,
    confirm_logout: bool,

    last_gate: Option<Gate>,
}

impl AttendScanApp {
    pub fn new(cc: &CreationContext) -> Self {
        super::theme::setup_custom_theme(&cc.egui_ctx);

        let settings = Settings::load().unwrap_or_else(|e| {
            error!("Falling back to default settings: {}", e);
            Settings::default()
        });
        let dashboard = Dashboard::new(&settings);

        let (tracker, startup_error) = match open_tracker(&settings) {
            Ok(tracker) => (Some(tracker), None),
            Err(e) => {
                error!("Could not open the register: {}", e);
                (None, Some(e.to_string()))
            }
        };

        Self {
            tracker,
            startup_error,
            login_panel: LoginPanel::new(),
            setup_panel: SetupPanel::new(),
            dashboard,
            alert: None,
            confirm_logout: false,
            last_gate: None,
        }
    }

    fn dialogs_open(&self) -> bool {
        self.alert.is_some() || self.confirm_logout
    }

    /// Blocking alert and logout confirmation windows
    fn show_dialogs(&mut self, ctx: &Context) {
        if let Some(message) = self.alert.clone() {
            egui::Window::new("Attention")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.alert = None;
                    }
                });
        }

        if self.confirm_logout {
            egui::Window::new("Log out")
                .collapsible(false)
                .resizable(false)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Logging out will CLEAR all attendance data. Continue?");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            self.confirm_logout = false;
                        }
                        if ui.button(RichText::new("Log out").color(DANGER)).clicked() {
                            self.confirm_logout = false;
                            self.logout();
                        }
                    });
                });
        }
    }

    fn logout(&mut self) {
        self.dashboard.stop_scanning();
        self.login_panel.clear();
        if let Some(tracker) = &mut self.tracker {
            if let Err(e) = tracker.logout() {
                self.alert = Some(e.to_string());
            }
        }
    }

    fn export(&mut self) {
        let Some(tracker) = &self.tracker else {
            return;
        };
        let report = tracker.report();

        if let Some(path) = FileDialog::new()
            .set_file_name(report.file_name())
            .add_filter("PDF Files", &["pdf"])
            .save_file()
        {
            if let Err(e) = report.save(&path) {
                error!("Export failed: {}", e);
                self.alert = Some(format!("Could not save the register: {}", e));
            }
        }
    }

    /// Re-sync panels when the gate changes underneath them
    fn on_gate_change(&mut self, gate: Gate) {
        if self.last_gate == Some(gate) {
            return;
        }
        self.last_gate = Some(gate);

        match gate {
            Gate::SetupIncomplete => {
                self.dashboard.stop_scanning();
                if let Some(tracker) = &self.tracker {
                    self.setup_panel.load(tracker.course());
                }
            }
            Gate::Unauthenticated => self.dashboard.stop_scanning(),
            Gate::Active => {}
        }
    }
}

impl eframe::App for AttendScanApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let Some(gate) = self.tracker.as_ref().map(|t| t.gate()) else {
            let message = self.startup_error.clone().unwrap_or_default();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Could not open the attendance register");
                ui.label(RichText::new(message).color(DANGER));
            });
            return;
        };
        self.on_gate_change(gate);

        let enabled = !self.dialogs_open();
        let mut action = None;
        let mut alert = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                let Some(tracker) = self.tracker.as_mut() else {
                    return;
                };

                match gate {
                    Gate::Unauthenticated => {
                        if let Some(pin) = self.login_panel.show(ui) {
                            if let Err(e) = tracker.login(&pin) {
                                alert = Some(e.to_string());
                            }
                        }
                    }
                    Gate::SetupIncomplete => {
                        if let Some(form) = self.setup_panel.show(ui) {
                            match tracker.complete_setup(form) {
                                // Setup drops straight into scanning
                                Ok(()) => self.dashboard.start_scanning(),
                                Err(e) => alert = Some(e.to_string()),
                            }
                        }
                    }
                    Gate::Active => {
                        action = self.dashboard.show(ui, ctx, tracker);
                    }
                }
            });
        });

        if let Some(message) = alert {
            self.alert = Some(message);
        }

        match action {
            Some(DashboardAction::EditSetup) => {
                if let Some(tracker) = &mut self.tracker {
                    if let Err(e) = tracker.edit_setup() {
                        self.alert = Some(e.to_string());
                    }
                }
            }
            Some(DashboardAction::Logout) => self.confirm_logout = true,
            Some(DashboardAction::Export) => self.export(),
            Some(DashboardAction::Alert(message)) => self.alert = Some(message),
            None => {}
        }

        self.show_dialogs(ctx);
    }
}

fn open_tracker(settings: &Settings) -> Result<Tracker> {
    let tracker = Tracker::open(
        settings,
        settings.seed()?,
        Box::new(FileStorage::new(&settings.state_dir)),
        Box::new(SharedPin::new(settings.pin.clone())),
        Arc::new(SystemClock),
    )?;
    Ok(tracker)
}
