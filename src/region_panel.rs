use egui::{vec2, ComboBox, RichText, ScrollArea, Ui};

use crate::model::RegionKind;
use crate::state::EditorState;
use crate::theme;
use crate::ui_controls;

pub fn show_region_panel(ui: &mut Ui, state: &mut EditorState) {
    let theme = theme::editor_theme();

    ui.add_space(theme.layout.space_2);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Regions").heading());
        if !state.regions.is_empty() {
            ui.label(
                RichText::new(format!("({})", state.regions.len()))
                    .color(theme.text.muted),
            );
        }
    });

    if state.regions.is_empty() {
        ui.add_space(theme.layout.space_2);
        ui.label(
            RichText::new("No regions yet. Switch to the Regions mode and click around a room.")
                .color(theme.text.muted)
                .size(13.0),
        );
        return;
    }

    let total: f64 = state
        .regions
        .iter()
        .filter_map(|r| r.dimensions.map(|d| d.area))
        .sum();
    if total > 0.0 {
        ui.label(
            RichText::new(format!("Total mapped: {total:.1} m²"))
                .color(theme.text.secondary)
                .size(13.0),
        );
    }
    ui.add_space(theme.layout.space_2);

    // Deletion is deferred to after the loop so indices stay valid.
    let mut remove: Option<usize> = None;
    let mut edited = false;

    ScrollArea::vertical()
        .id_source("region_panel_scroll")
        .show(ui, |ui| {
            for (index, region) in state.regions.iter_mut().enumerate() {
                egui::Frame::none()
                    .fill(theme.surfaces.card_bg)
                    .rounding(egui::Rounding::same(theme.controls.panel_rounding))
                    .stroke(egui::Stroke::new(1.0, theme.surfaces.stroke_soft))
                    .inner_margin(egui::Margin::symmetric(
                        theme.layout.space_3,
                        theme.layout.space_2,
                    ))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            let swatch = theme::region_kind_color(region.kind);
                            let (rect, _) =
                                ui.allocate_exact_size(vec2(10.0, 10.0), egui::Sense::hover());
                            ui.painter().rect_filled(rect, 3.0, swatch);

                            if ui
                                .add(
                                    egui::TextEdit::singleline(&mut region.name)
                                        .desired_width(130.0)
                                        .id_source(("region_name", index)),
                                )
                                .changed()
                            {
                                edited = true;
                            }

                            if !region.is_complete() {
                                ui_controls::subtle_badge(ui, theme.surfaces.warn, "Incomplete");
                            }
                        });

                        ui.horizontal(|ui| {
                            ComboBox::from_id_source(("region_kind", index))
                                .selected_text(region.kind.label())
                                .width(96.0)
                                .show_ui(ui, |ui| {
                                    for kind in RegionKind::ALL {
                                        if ui
                                            .selectable_value(&mut region.kind, kind, kind.label())
                                            .changed()
                                        {
                                            edited = true;
                                        }
                                    }
                                });

                            if ui_controls::ghost_button(ui, &theme, "Delete", vec2(60.0, 22.0))
                                .clicked()
                            {
                                remove = Some(index);
                            }
                        });

                        match &region.dimensions {
                            Some(dims) => {
                                ui.label(
                                    RichText::new(format!(
                                        "{:.1} × {:.1} m · {:.1} m²",
                                        dims.width, dims.height, dims.area
                                    ))
                                    .size(12.0)
                                    .color(theme.text.secondary),
                                );
                            }
                            None => {
                                ui.label(
                                    RichText::new("no measurements")
                                        .size(12.0)
                                        .color(theme.text.muted),
                                );
                            }
                        }
                    });
                ui.add_space(theme.layout.space_2);
            }
        });

    if edited {
        state.dirty = true;
    }
    if let Some(index) = remove {
        state.delete_region(index);
    }
}
