use egui::{Key, RichText, TextEdit, Ui};

use super::theme::ACCENT;
use super::utils::action_button;

/// Course rep login form
pub struct LoginPanel {
    pin_input: String,
}

impl LoginPanel {
    pub fn new() -> Self {
        Self {
            pin_input: String::new(),
        }
    }

    /// Draw the form. Returns the entered secret when the form is submitted.
    pub fn show(&mut self, ui: &mut Ui) -> Option<String> {
        let mut submitted = false;

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.2);
            ui.label(RichText::new("📖").size(48.0).color(ACCENT));
            ui.heading("Course Rep Login");
            ui.add_space(12.0);

            let response = ui.add(
                TextEdit::singleline(&mut self.pin_input)
                    .password(true)
                    .hint_text("Enter Course Rep Matric")
                    .desired_width(260.0),
            );

            // Enter submits like the button does
            if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                submitted = true;
            }

            ui.add_space(8.0);
            if ui.add(action_button("Access Dashboard", ACCENT)).clicked() {
                submitted = true;
            }
        });

        if submitted {
            Some(self.pin_input.clone())
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.pin_input.clear();
    }
}
