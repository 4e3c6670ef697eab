use egui::{Button, Color32, Frame, RichText, Ui};

use crate::roster::Status;
use crate::scan::{Banner, BannerKind};

use super::theme::{ACCENT, DANGER};

/// Pill colour for a roster status
pub fn status_color(status: Status) -> Color32 {
    match status {
        Status::Present => ACCENT,
        Status::Absent => Color32::from_rgb(156, 163, 175),
    }
}

/// Draw the transient scan banner
pub fn show_banner(ui: &mut Ui, banner: &Banner) {
    let fill = match banner.kind {
        BannerKind::Success => ACCENT,
        BannerKind::Error => DANGER,
    };

    Frame::none()
        .fill(fill)
        .rounding(6.0)
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(&banner.message).color(Color32::WHITE).strong().size(16.0));
        });
}

/// Large filled button used for the main actions
pub fn action_button(text: &str, fill: Color32) -> Button<'static> {
    Button::new(RichText::new(text.to_string()).color(Color32::WHITE).strong())
        .fill(fill)
        .min_size(egui::vec2(140.0, 36.0))
}

/// Shorten a string for narrow columns
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
