use egui::{vec2, Align, Layout, RichText, Ui};

use crate::state::{EditorMode, EditorState};
use crate::theme::{self, WidthClass};
use crate::ui_controls;

/// Toolbar intents that need the host (file dialog, store) to act.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarAction {
    OpenImage,
    Save,
}

/// Whether a mode chip is clickable in the current session state.
pub fn mode_available(state: &EditorState, mode: EditorMode) -> bool {
    if !state.can_edit() {
        return false;
    }
    match mode {
        EditorMode::Region => state.calibration.is_calibrated(),
        _ => true,
    }
}

pub fn show_toolbar(
    ui: &mut Ui,
    state: &mut EditorState,
    width_class: WidthClass,
) -> Option<ToolbarAction> {
    let theme = theme::editor_theme();
    let mut action = None;

    ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
        ui.spacing_mut().interact_size.y = theme.layout.chip_h;
        ui.spacing_mut().item_spacing = vec2(theme.layout.space_2, 0.0);

        if ui_controls::ghost_button(ui, &theme, "Open…", vec2(70.0, theme.layout.chip_h))
            .on_hover_text("Open a floorplan image")
            .clicked()
        {
            action = Some(ToolbarAction::OpenImage);
        }

        ui_controls::vertical_divider(ui, &theme, theme.layout.chip_h);

        for mode in [EditorMode::Crop, EditorMode::Scale, EditorMode::Region] {
            let label = if width_class == WidthClass::Compact {
                &mode.label()[..1]
            } else {
                mode.label()
            };
            let enabled = mode_available(state, mode);
            let selected = state.mode.current() == mode;
            let response = ui.add_enabled_ui(enabled, |ui| {
                ui_controls::mode_chip(ui, &theme, label, selected)
            });
            let mut chip = response.inner.on_hover_text(mode_hint(mode));
            if !enabled && mode == EditorMode::Region {
                chip = chip.on_disabled_hover_text("Set the scale first");
            }
            if chip.clicked() {
                state.set_mode(mode);
            }
        }

        ui_controls::vertical_divider(ui, &theme, theme.layout.chip_h);
        mode_controls(ui, state, &theme);

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let can_save = state.can_edit() && state.calibration.is_calibrated() && !state.saving;
            let save = ui.add_enabled_ui(can_save, |ui| {
                ui_controls::primary_button(ui, &theme, "Save", vec2(72.0, theme.layout.chip_h))
            });
            if save
                .inner
                .on_hover_text("Save crop, scale and regions")
                .clicked()
            {
                action = Some(ToolbarAction::Save);
            }
            if state.dirty && width_class != WidthClass::Compact {
                ui.label(
                    RichText::new("unsaved")
                        .size(12.0)
                        .color(theme.text.muted),
                );
            }
        });
    });

    action
}

fn mode_hint(mode: EditorMode) -> &'static str {
    match mode {
        EditorMode::Crop => "Crop the plan (1)",
        EditorMode::Scale => "Set the scale (2)",
        EditorMode::Region => "Map regions (3)",
        EditorMode::Pan => "Pan",
    }
}

fn mode_controls(ui: &mut Ui, state: &mut EditorState, theme: &theme::AppTheme) {
    let chip = vec2(0.0, theme.layout.chip_h);
    match state.mode.current() {
        EditorMode::Crop => {
            let has_crop = state.crop.area.is_some();
            if ui
                .add_enabled_ui(has_crop, |ui| {
                    ui_controls::primary_button(ui, theme, "Confirm crop", chip)
                })
                .inner
                .clicked()
            {
                state.confirm_crop();
            }
            if ui
                .add_enabled_ui(has_crop, |ui| {
                    ui_controls::ghost_button(ui, theme, "Clear", chip)
                })
                .inner
                .clicked()
            {
                state.crop.reset();
                state.dirty = true;
            }
        }
        EditorMode::Scale => {
            match state.calibration.pixels_per_metre {
                Some(ppm) => {
                    ui.label(
                        RichText::new(format!("{ppm:.1} px/m"))
                            .size(13.0)
                            .color(theme.text.secondary),
                    );
                    if ui_controls::ghost_button(ui, theme, "Reset scale", chip).clicked() {
                        state.reset_calibration();
                    }
                }
                None => {
                    ui.label(
                        RichText::new("Click two points a known distance apart")
                            .size(13.0)
                            .color(theme.text.muted),
                    );
                }
            }
        }
        EditorMode::Region => {
            let mode_label = state.trace.mode.label();
            if ui_controls::ghost_button(ui, theme, mode_label, vec2(90.0, theme.layout.chip_h))
                .on_hover_text("Toggle freeform / rectangle tracing (Tab)")
                .clicked()
            {
                state.trace.toggle_mode();
            }
            let tracing = state.trace.in_progress();
            if ui
                .add_enabled_ui(tracing, |ui| {
                    ui_controls::ghost_button(ui, theme, "Undo point", chip)
                })
                .inner
                .on_hover_text("Remove the last placed point (Backspace)")
                .clicked()
            {
                state.trace.remove_last();
            }
        }
        EditorMode::Pan => {
            ui.label(
                RichText::new("Panning")
                    .size(13.0)
                    .color(theme.text.muted),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn state_with_image() -> EditorState {
        let mut state = EditorState::default();
        state.set_image(
            "p".into(),
            "a.png".into(),
            DynamicImage::new_rgba8(100, 100),
        );
        state
    }

    #[test]
    fn nothing_is_available_without_an_image() {
        let state = EditorState::default();
        for mode in [EditorMode::Crop, EditorMode::Scale, EditorMode::Region] {
            assert!(!mode_available(&state, mode));
        }
    }

    #[test]
    fn region_chip_unlocks_with_calibration() {
        let mut state = state_with_image();
        assert!(mode_available(&state, EditorMode::Crop));
        assert!(mode_available(&state, EditorMode::Scale));
        assert!(!mode_available(&state, EditorMode::Region));

        state.calibration.pixels_per_metre = Some(20.0);
        assert!(mode_available(&state, EditorMode::Region));
    }
}
