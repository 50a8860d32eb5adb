use egui::epaint::PathShape;
use egui::{
    vec2, Align2, Color32, Context, FontId, Id, Key, Painter, Pos2, Rect, Response, Sense, Shape,
    Stroke, TextureId, Ui,
};

use crate::geometry::Point;
use crate::render::{self, DrawCmd};
use crate::state::{EditorMode, EditorState};
use crate::theme;

/// Scroll-to-zoom sensitivity; one notch of a typical wheel is ~50 units.
const WHEEL_ZOOM_RATE: f64 = 0.0015;

pub fn show_canvas(ui: &mut Ui, ctx: &Context, state: &mut EditorState) {
    let (canvas_rect, response) =
        ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

    if let Some(message) = &state.image_error {
        placeholder(ui, canvas_rect, &format!("Could not load image\n{message}"));
        return;
    }
    let texture_id = match state.image.as_mut() {
        Some(image) => {
            image.ensure_texture(ctx);
            match &image.texture {
                Some(texture) => texture.id(),
                None => return,
            }
        }
        None => {
            placeholder(ui, canvas_rect, "Open a floorplan image to begin");
            return;
        }
    };

    if state.needs_fit {
        if let Some(image) = &state.image {
            let (w, h) = image.size();
            state.viewport = crate::viewport::Viewport::fit_to_view(
                (w as f64, h as f64),
                (canvas_rect.width() as f64, canvas_rect.height() as f64),
            );
        }
        state.needs_fit = false;
    }

    handle_input(ctx, state, &response, canvas_rect);

    let pointer = response.hover_pos();
    let cmds = render::render(state, canvas_rect, ctx.pixels_per_point(), pointer);
    let painter = ui.painter_at(canvas_rect);
    execute(&painter, &cmds, texture_id);

    if state.calibration.entry.is_some() {
        distance_prompt(ui, state, canvas_rect);
    }
}

fn placeholder(ui: &Ui, rect: Rect, message: &str) {
    let theme = theme::editor_theme();
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 12.0, theme.surfaces.canvas_bg);
    painter.rect_stroke(rect, 12.0, Stroke::new(1.0, theme.surfaces.stroke_soft));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        message,
        FontId::proportional(17.0),
        theme.text.secondary,
    );
}

fn to_image(pos: Pos2, state: &EditorState, canvas: Rect) -> Point {
    state.viewport.to_image(Point::new(
        (pos.x - canvas.min.x) as f64,
        (pos.y - canvas.min.y) as f64,
    ))
}

fn handle_input(ctx: &Context, state: &mut EditorState, response: &Response, canvas: Rect) {
    if !state.can_edit() {
        return;
    }

    // Wheel zoom, anchored at the pointer so the image point under the
    // cursor stays put.
    if response.hovered() {
        let scroll = ctx.input(|input| input.raw_scroll_delta.y) as f64;
        if scroll != 0.0 {
            if let Some(pos) = response.hover_pos() {
                let factor = (scroll * WHEEL_ZOOM_RATE).exp();
                let anchor = Point::new(
                    (pos.x - canvas.min.x) as f64,
                    (pos.y - canvas.min.y) as f64,
                );
                state.viewport.zoom_by(anchor, factor);
            }
        }
    }

    let zoom = state.viewport.zoom;
    match state.mode.current() {
        EditorMode::Pan => {
            if response.dragged() {
                let delta = response.drag_delta();
                state.viewport.pan_by(delta.x as f64, delta.y as f64);
            }
        }
        EditorMode::Crop => {
            if response.drag_started() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = to_image(pos, state, canvas);
                    state.crop.pointer_down(p, zoom);
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = to_image(pos, state, canvas);
                    state.crop.pointer_move(p);
                }
            }
            if response.drag_stopped() {
                state.crop.pointer_up();
                state.dirty = true;
            }
        }
        EditorMode::Scale => {
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = to_image(pos, state, canvas);
                    state.calibration.add_point(p);
                }
            }
        }
        EditorMode::Region => {
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let p = to_image(pos, state, canvas);
                    state.handle_region_click(p);
                }
            }
            if response.secondary_clicked() {
                state.force_complete_region();
            }
        }
    }
}

fn execute(painter: &Painter, cmds: &[DrawCmd], texture: TextureId) {
    let mut painter = painter.clone();
    for cmd in cmds {
        match cmd {
            DrawCmd::Checkerboard { rect, cell } => checkerboard(&painter, *rect, *cell),
            DrawCmd::ClipRect { rect } => painter = painter.with_clip_rect(*rect),
            DrawCmd::Image { rect } => {
                painter.image(
                    texture,
                    *rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            DrawCmd::RectFilled { rect, color } => {
                painter.rect_filled(*rect, 0.0, *color);
            }
            DrawCmd::RectStroke { rect, width, color } => {
                painter.rect_stroke(*rect, 0.0, Stroke::new(*width, *color));
            }
            DrawCmd::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment([*from, *to], Stroke::new(*width, *color));
            }
            DrawCmd::Polygon {
                points,
                fill,
                stroke_width,
                stroke_color,
            } => {
                painter.add(Shape::Path(PathShape {
                    points: points.clone(),
                    closed: true,
                    fill: *fill,
                    stroke: Stroke::new(*stroke_width, *stroke_color),
                }));
            }
            DrawCmd::Circle {
                center,
                radius,
                fill,
                stroke_width,
                stroke_color,
            } => {
                painter.circle(
                    *center,
                    *radius,
                    *fill,
                    Stroke::new(*stroke_width, *stroke_color),
                );
            }
            DrawCmd::Text {
                pos,
                text,
                size,
                color,
            } => {
                painter.text(
                    *pos,
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(*size),
                    *color,
                );
            }
        }
    }
}

fn checkerboard(painter: &Painter, rect: Rect, cell: f32) {
    let theme = theme::editor_theme();
    painter.rect_filled(rect, 0.0, theme.surfaces.canvas_bg);
    let alt = theme.surfaces.panel_bg;

    let cols = (rect.width() / cell).ceil() as i32;
    let rows = (rect.height() / cell).ceil() as i32;
    for row in 0..rows {
        for col in 0..cols {
            if (row + col) % 2 == 0 {
                continue;
            }
            let min = Pos2::new(rect.min.x + col as f32 * cell, rect.min.y + row as f32 * cell);
            let cell_rect =
                Rect::from_min_size(min, vec2(cell, cell)).intersect(rect);
            painter.rect_filled(cell_rect, 0.0, alt);
        }
    }
}

/// Floating distance prompt next to the measured segment. Enter confirms,
/// Escape abandons the two-click attempt.
fn distance_prompt(ui: &mut Ui, state: &mut EditorState, canvas: Rect) {
    let theme = theme::editor_theme();
    let anchor = match state.calibration.points.as_slice() {
        [a, b] => {
            let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            let s = state.viewport.to_screen(mid);
            Pos2::new(canvas.min.x + s.x as f32 + 12.0, canvas.min.y + s.y as f32 + 12.0)
        }
        _ => canvas.center(),
    };

    let mut confirm = false;
    let mut cancel = false;

    egui::Area::new(Id::new("distance_prompt"))
        .order(egui::Order::Foreground)
        .fixed_pos(anchor)
        .show(ui.ctx(), |ui| {
            egui::Frame::none()
                .fill(theme.surfaces.card_bg)
                .rounding(egui::Rounding::same(theme.controls.panel_rounding))
                .stroke(Stroke::new(1.0, theme.surfaces.stroke_strong))
                .inner_margin(egui::Margin::symmetric(12.0, 10.0))
                .show(ui, |ui| {
                    ui.label("Real distance (m)");
                    let buffer = state.calibration.entry.get_or_insert_with(String::new);
                    let edit = ui.add(
                        egui::TextEdit::singleline(buffer)
                            .desired_width(90.0)
                            .hint_text("e.g. 4.5"),
                    );
                    edit.request_focus();

                    ui.horizontal(|ui| {
                        if crate::ui_controls::primary_button(
                            ui,
                            &theme,
                            "Set scale",
                            vec2(80.0, 24.0),
                        )
                        .clicked()
                        {
                            confirm = true;
                        }
                        if crate::ui_controls::ghost_button(ui, &theme, "Cancel", vec2(64.0, 24.0))
                            .clicked()
                        {
                            cancel = true;
                        }
                    });

                    if ui.input(|input| input.key_pressed(Key::Enter)) {
                        confirm = true;
                    }
                    if ui.input(|input| input.key_pressed(Key::Escape)) {
                        cancel = true;
                    }
                });
        });

    if confirm {
        state.confirm_calibration();
    } else if cancel {
        state.calibration.cancel_entry();
    }
}
