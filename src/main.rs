mod app;
mod calibrate;
mod canvas;
mod crop;
mod geometry;
mod model;
mod region_panel;
mod render;
mod state;
mod store;
mod theme;
mod toolbar;
mod trace;
mod ui_controls;
mod viewport;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let viewport = egui::ViewportBuilder::default()
        .with_title("FloorTrace")
        .with_inner_size([1180.0, 800.0])
        .with_min_inner_size([720.0, 520.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "FloorTrace",
        options,
        Box::new(|cc| Box::new(app::FloorTraceApp::new(cc))),
    )
}
