use egui::{vec2, Color32, Frame, Margin, RichText, Rounding, Sense, Stroke, Ui, Vec2};

use crate::theme::AppTheme;

pub fn toolbar_frame(theme: &AppTheme) -> Frame {
    Frame::none()
        .fill(theme.surfaces.panel_bg)
        .rounding(Rounding::ZERO)
        .inner_margin(Margin::symmetric(
            theme.layout.panel_padding_x,
            theme.layout.panel_padding_y,
        ))
}

pub fn status_frame(theme: &AppTheme) -> Frame {
    Frame::none()
        .fill(theme.surfaces.app_bg)
        .rounding(Rounding::ZERO)
        .inner_margin(Margin::symmetric(
            theme.layout.panel_padding_x,
            theme.layout.space_1,
        ))
}

/// Mode selector chip; highlighted when its mode is active.
pub fn mode_chip(ui: &mut Ui, theme: &AppTheme, label: &str, selected: bool) -> egui::Response {
    let mut button = egui::Button::new(RichText::new(label).size(14.0))
        .min_size(vec2(0.0, theme.layout.chip_h))
        .rounding(Rounding::same(theme.controls.chip_rounding));

    if selected {
        button = button
            .fill(theme.surfaces.accent_soft)
            .stroke(Stroke::new(1.0, theme.surfaces.accent));
    } else {
        button = button.fill(theme.surfaces.card_bg);
    }

    ui.add(button)
}

pub fn primary_button(
    ui: &mut Ui,
    theme: &AppTheme,
    label: &str,
    min_size: Vec2,
) -> egui::Response {
    ui.add(
        egui::Button::new(RichText::new(label).strong().color(theme.text.primary))
            .min_size(min_size)
            .fill(theme.surfaces.accent_soft)
            .stroke(Stroke::new(1.0, theme.surfaces.accent))
            .rounding(Rounding::same(theme.controls.button_rounding)),
    )
}

pub fn ghost_button(ui: &mut Ui, theme: &AppTheme, label: &str, min_size: Vec2) -> egui::Response {
    ui.add(
        egui::Button::new(RichText::new(label).color(theme.text.secondary))
            .min_size(min_size)
            .fill(theme.surfaces.card_bg)
            .stroke(Stroke::new(1.0, theme.surfaces.stroke_soft))
            .rounding(Rounding::same(theme.controls.button_rounding)),
    )
}

/// Small tinted badge, used for the Incomplete marker in the region list.
pub fn subtle_badge(ui: &mut Ui, tint: Color32, text: &str) {
    let label = RichText::new(text).size(12.0).color(tint).strong();
    Frame::none()
        .fill(Color32::from_rgba_unmultiplied(
            tint.r(),
            tint.g(),
            tint.b(),
            30,
        ))
        .rounding(Rounding::same(10.0))
        .stroke(Stroke::new(
            1.0,
            Color32::from_rgba_unmultiplied(tint.r(), tint.g(), tint.b(), 90),
        ))
        .inner_margin(Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(label);
        });
}

pub fn vertical_divider(ui: &mut Ui, theme: &AppTheme, height: f32) {
    let (rect, _) = ui.allocate_exact_size(vec2(1.0, height), Sense::hover());
    ui.painter().line_segment(
        [rect.center_top(), rect.center_bottom()],
        Stroke::new(1.0, theme.surfaces.stroke_soft),
    );
}
