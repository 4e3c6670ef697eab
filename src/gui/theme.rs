use egui::{Color32, Context, Rounding, Stroke, Visuals};

/// Register green, also used for the PDF heading
pub const ACCENT: Color32 = Color32::from_rgb(22, 163, 74);
pub const DANGER: Color32 = Color32::from_rgb(220, 38, 38);
pub const WARNING: Color32 = Color32::from_rgb(217, 119, 6);

/// Set up the application theme
pub fn setup_custom_theme(ctx: &Context) {
    // Light base, the register is used in bright lecture halls
    let mut visuals = Visuals::light();

    visuals.panel_fill = Color32::from_rgb(243, 244, 246);
    visuals.window_fill = Color32::WHITE;

    // Green selection and focus
    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.widgets.active.bg_fill = Color32::from_rgb(21, 128, 61);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);

    let rounding = Rounding::same(6.0);
    visuals.window_rounding = rounding;
    visuals.menu_rounding = rounding;

    ctx.set_visuals(visuals);
}
