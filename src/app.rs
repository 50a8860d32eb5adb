use eframe::egui::{self, Context as EguiContext, Key, RichText, TopBottomPanel};
use eframe::{App, Frame};

use crate::canvas;
use crate::region_panel;
use crate::state::{EditorMode, EditorState, StatusLevel};
use crate::store::{FloorplanStore, JsonFileStore, MemoryStore};
use crate::theme;
use crate::toolbar::{self, ToolbarAction};
use crate::ui_controls;

pub struct FloorTraceApp {
    pub state: EditorState,
    store: Box<dyn FloorplanStore>,
    theme: theme::AppTheme,
}

impl FloorTraceApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = theme::editor_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let store: Box<dyn FloorplanStore> = match JsonFileStore::open() {
            Ok(store) => Box::new(store),
            Err(err) => {
                // Editing still works; saves just do not survive the session.
                log::warn!("file store unavailable, keeping records in memory: {err:#}");
                Box::new(MemoryStore::default())
            }
        };

        Self {
            state: EditorState::default(),
            store,
            theme,
        }
    }

    fn open_image_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Open floorplan image")
            .add_filter("Images", &["png", "jpg", "jpeg", "webp", "bmp"])
            .pick_file()
        else {
            return;
        };

        let property_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("floorplan")
            .to_owned();
        let path_str = path.display().to_string();

        match image::open(&path) {
            Ok(dynamic) => {
                log::info!(
                    "opened {path_str} ({}x{})",
                    dynamic.width(),
                    dynamic.height()
                );
                self.state.set_image(property_id, path_str, dynamic);
                self.state.load_from_store(self.store.as_ref());
            }
            Err(err) => self.state.set_image_error(&path_str, err.to_string()),
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        // Text fields (region names, the distance prompt) own the keyboard.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|input| input.key_pressed(Key::Num1)) {
            self.state.set_mode(EditorMode::Crop);
        }
        if ctx.input(|input| input.key_pressed(Key::Num2)) {
            self.state.set_mode(EditorMode::Scale);
        }
        if ctx.input(|input| input.key_pressed(Key::Num3)) {
            self.state.set_mode(EditorMode::Region);
        }

        // Hold-to-pan; releasing restores the previous mode.
        if ctx.input(|input| input.key_pressed(Key::Space)) {
            self.state.enter_pan();
        }
        if ctx.input(|input| input.key_released(Key::Space)) {
            self.state.exit_pan();
        }

        if self.state.mode.current() == EditorMode::Region {
            if ctx.input(|input| input.key_pressed(Key::Tab)) {
                self.state.trace.toggle_mode();
            }
            if ctx.input(|input| input.key_pressed(Key::Backspace)) {
                self.state.trace.remove_last();
            }
        }

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            match self.state.mode.current() {
                EditorMode::Region => self.state.trace.cancel(),
                EditorMode::Scale => self.state.calibration.cancel_entry(),
                EditorMode::Crop => self.state.crop.pointer_up(),
                EditorMode::Pan => self.state.exit_pan(),
            }
        }
    }

    fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let zoom_pct = self.state.viewport.zoom * 100.0;
            ui.label(
                RichText::new(format!("{zoom_pct:.0}%"))
                    .size(12.0)
                    .color(self.theme.text.muted),
            );

            if let Some(ppm) = self.state.calibration.pixels_per_metre {
                ui.label(
                    RichText::new(format!("{ppm:.1} px/m"))
                        .size(12.0)
                        .color(self.theme.text.muted),
                );
            }

            if let Some(status) = &self.state.status {
                let color = match status.level {
                    StatusLevel::Info => self.theme.text.secondary,
                    StatusLevel::Warn => self.theme.surfaces.warn,
                    StatusLevel::Error => self.theme.surfaces.error,
                };
                ui.label(RichText::new(&status.text).size(12.0).color(color));
            }
        });
    }
}

impl App for FloorTraceApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.handle_shortcuts(ctx);

        let action = TopBottomPanel::top("toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                let width_class = self.theme.width_class(ui.available_width());
                toolbar::show_toolbar(ui, &mut self.state, width_class)
            })
            .inner;

        match action {
            Some(ToolbarAction::OpenImage) => self.open_image_dialog(),
            Some(ToolbarAction::Save) => self.state.save_to_store(self.store.as_mut()),
            None => {}
        }

        TopBottomPanel::bottom("status_bar")
            .exact_height(self.theme.layout.status_height)
            .frame(ui_controls::status_frame(&self.theme))
            .show(ctx, |ui| {
                self.show_status_bar(ui);
            });

        if self.state.can_edit() {
            egui::SidePanel::right("region_panel")
                .exact_width(self.theme.layout.side_panel_width)
                .resizable(false)
                .show(ctx, |ui| {
                    region_panel::show_region_panel(ui, &mut self.state);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.surfaces.app_bg))
            .show(ctx, |ui| {
                canvas::show_canvas(ui, ctx, &mut self.state);
            });
    }
}
