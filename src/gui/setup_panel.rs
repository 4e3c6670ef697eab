use egui::{Grid, RichText, TextEdit, Ui};

use crate::session::{CourseInfo, SetupForm};

use super::theme::ACCENT;
use super::utils::action_button;

/// Class setup form
pub struct SetupPanel {
    form: SetupForm,
}

impl SetupPanel {
    pub fn new() -> Self {
        Self {
            form: SetupForm::default(),
        }
    }

    /// Pre-fill from the current descriptor when the form is (re)opened
    pub fn load(&mut self, course: &CourseInfo) {
        self.form = SetupForm::from_course(course);
    }

    /// Draw the form. Returns the form contents when "Start Attendance" is pressed.
    pub fn show(&mut self, ui: &mut Ui) -> Option<SetupForm> {
        let mut submitted = false;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.15);
            ui.heading(RichText::new("⚙ Class Setup").color(ACCENT));
            ui.add_space(16.0);

            Grid::new("setup_form")
                .num_columns(2)
                .spacing([12.0, 10.0])
                .show(ui, |ui| {
                    ui.label("Department");
                    ui.add(TextEdit::singleline(&mut self.form.department).hint_text("Software Engineering"));
                    ui.end_row();

                    ui.label("Course Code");
                    ui.add(TextEdit::singleline(&mut self.form.course_code).hint_text("SEN 211"));
                    ui.end_row();

                    ui.label("Level");
                    ui.add(TextEdit::singleline(&mut self.form.level).hint_text("200 Level"));
                    ui.end_row();
                });

            ui.add_space(16.0);
            if ui.add(action_button("Start Attendance", ACCENT)).clicked() {
                submitted = true;
            }
        });

        if submitted {
            Some(self.form.clone())
        } else {
            None
        }
    }
}
