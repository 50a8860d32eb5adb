use egui::{Color32, Pos2, Rect};

use crate::crop::CropHandle;
use crate::geometry::Point;
use crate::model::{CropArea, Region, RegionKind};
use crate::state::{EditorMode, EditorState};
use crate::theme;
use crate::viewport::Viewport;

/// Side of one checkerboard cell in physical pixels.
const CHECKER_CELL_PX: f32 = 8.0;
/// On-screen radius of point markers and crop handles.
const MARKER_RADIUS: f32 = 4.5;
const REGION_STROKE: f32 = 2.0;
const TRACE_STROKE: f32 = 1.5;
const CROP_STROKE: f32 = 1.5;

/// One primitive of a rendered frame. The scene for a frame is computed as
/// plain data so overlays can be asserted on without a live painter, and so
/// the read-only viewer can replay the same scene.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// Two-tone checkerboard filling `rect`, cells `cell` points wide.
    Checkerboard { rect: Rect, cell: f32 },
    /// The floorplan texture stretched over `rect`.
    Image { rect: Rect },
    /// Restricts every subsequent command to `rect`.
    ClipRect { rect: Rect },
    RectFilled {
        rect: Rect,
        color: Color32,
    },
    RectStroke {
        rect: Rect,
        width: f32,
        color: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    Polygon {
        points: Vec<Pos2>,
        fill: Color32,
        stroke_width: f32,
        stroke_color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke_width: f32,
        stroke_color: Color32,
    },
    Text {
        pos: Pos2,
        text: String,
        size: f32,
        color: Color32,
    },
}

fn to_screen(p: Point, viewport: &Viewport, canvas: Rect) -> Pos2 {
    let s = viewport.to_screen(p);
    Pos2::new(canvas.min.x + s.x as f32, canvas.min.y + s.y as f32)
}

fn crop_screen_rect(crop: &CropArea, viewport: &Viewport, canvas: Rect) -> Rect {
    Rect::from_min_max(
        to_screen(Point::new(crop.x, crop.y), viewport, canvas),
        to_screen(Point::new(crop.right(), crop.bottom()), viewport, canvas),
    )
}

fn region_fill(kind: RegionKind) -> Color32 {
    let c = theme::region_kind_color(kind);
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 56)
}

/// Builds the full editor frame. Stroke widths and marker radii are in
/// screen points and do not scale with zoom; only geometry does.
pub fn render(
    state: &EditorState,
    canvas: Rect,
    pixels_per_point: f32,
    pointer: Option<Pos2>,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    let viewport = &state.viewport;

    // Cell size snaps to whole physical pixels so the pattern stays crisp
    // on fractional-scale displays.
    let ppp = pixels_per_point.max(0.5);
    let cell = (CHECKER_CELL_PX * ppp).round().max(1.0) / ppp;
    cmds.push(DrawCmd::Checkerboard { rect: canvas, cell });

    let Some(image) = &state.image else {
        return cmds;
    };
    let (w, h) = image.size();
    let image_rect = Rect::from_min_max(
        to_screen(Point::new(0.0, 0.0), viewport, canvas),
        to_screen(Point::new(w as f64, h as f64), viewport, canvas),
    );
    cmds.push(DrawCmd::Image { rect: image_rect });

    // While cropping, the outside is shaded but stays visible for
    // adjustment. In every other mode the crop is final for the session, so
    // calibration, regions and traces are clipped to it instead.
    if let Some(crop) = &state.crop.area {
        if state.mode.current() == EditorMode::Crop {
            push_crop_overlay(&mut cmds, crop, viewport, canvas);
            push_crop_handles(&mut cmds, crop, viewport, canvas);
        } else {
            let hole = crop_screen_rect(crop, viewport, canvas).intersect(canvas);
            cmds.push(DrawCmd::RectStroke {
                rect: hole,
                width: CROP_STROKE,
                color: theme::ACCENT,
            });
            cmds.push(DrawCmd::ClipRect { rect: hole });
        }
    }

    push_calibration(&mut cmds, state, canvas);
    for region in &state.regions {
        push_region(&mut cmds, region, viewport, canvas);
    }
    if state.mode.current() == EditorMode::Region {
        push_trace(&mut cmds, state, canvas, pointer);
    }

    cmds
}

/// The read-only scene a companion viewer replays: finished regions over
/// the image, plus the crop outline. No handles, markers, or previews.
pub fn render_overlay(
    regions: &[Region],
    crop: Option<&CropArea>,
    viewport: &Viewport,
    canvas: Rect,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    if let Some(crop) = crop {
        let hole = crop_screen_rect(crop, viewport, canvas).intersect(canvas);
        cmds.push(DrawCmd::RectStroke {
            rect: hole,
            width: CROP_STROKE,
            color: theme::ACCENT,
        });
        cmds.push(DrawCmd::ClipRect { rect: hole });
    }
    for region in regions {
        push_region(&mut cmds, region, viewport, canvas);
    }
    cmds
}

/// Darkens everything outside the crop with four rectangles around it, so
/// the crop interior shows the image at full brightness without any
/// re-composition of the texture.
fn push_crop_overlay(cmds: &mut Vec<DrawCmd>, crop: &CropArea, viewport: &Viewport, canvas: Rect) {
    let hole = crop_screen_rect(crop, viewport, canvas).intersect(canvas);
    let shade = Color32::from_black_alpha(140);

    let sides = [
        Rect::from_min_max(canvas.min, Pos2::new(canvas.max.x, hole.min.y)),
        Rect::from_min_max(Pos2::new(canvas.min.x, hole.max.y), canvas.max),
        Rect::from_min_max(Pos2::new(canvas.min.x, hole.min.y), Pos2::new(hole.min.x, hole.max.y)),
        Rect::from_min_max(Pos2::new(hole.max.x, hole.min.y), Pos2::new(canvas.max.x, hole.max.y)),
    ];
    for rect in sides {
        cmds.push(DrawCmd::RectFilled { rect, color: shade });
    }

    cmds.push(DrawCmd::RectStroke {
        rect: hole,
        width: CROP_STROKE,
        color: theme::ACCENT,
    });
}

fn push_crop_handles(cmds: &mut Vec<DrawCmd>, crop: &CropArea, viewport: &Viewport, canvas: Rect) {
    for handle in CropHandle::ALL {
        cmds.push(DrawCmd::Circle {
            center: to_screen(handle.position(crop), viewport, canvas),
            radius: MARKER_RADIUS,
            fill: Color32::WHITE,
            stroke_width: 1.0,
            stroke_color: theme::ACCENT,
        });
    }
}

fn push_calibration(cmds: &mut Vec<DrawCmd>, state: &EditorState, canvas: Rect) {
    let points = &state.calibration.points;
    if points.is_empty() {
        return;
    }
    let screen: Vec<Pos2> = points
        .iter()
        .map(|p| to_screen(*p, &state.viewport, canvas))
        .collect();

    if let [a, b] = screen.as_slice() {
        cmds.push(DrawCmd::Line {
            from: *a,
            to: *b,
            width: REGION_STROKE,
            color: theme::MEASURE,
        });
        if let Some(span) = state.calibration.pixel_span() {
            // Once a scale exists the label also shows the real distance
            // the measured segment corresponds to.
            let text = match state.calibration.pixels_per_metre {
                Some(ppm) if ppm > 0.0 => format!("{span:.0} px · {:.2} m", span / ppm),
                _ => format!("{span:.0} px"),
            };
            cmds.push(DrawCmd::Text {
                pos: Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0 - 14.0),
                text,
                size: 13.0,
                color: theme::MEASURE,
            });
        }
    }
    for pos in screen {
        cmds.push(DrawCmd::Circle {
            center: pos,
            radius: MARKER_RADIUS,
            fill: theme::MEASURE,
            stroke_width: 1.0,
            stroke_color: Color32::WHITE,
        });
    }
}

fn push_region(cmds: &mut Vec<DrawCmd>, region: &Region, viewport: &Viewport, canvas: Rect) {
    let screen: Vec<Pos2> = region
        .points
        .iter()
        .map(|p| to_screen(*p, viewport, canvas))
        .collect();
    let color = theme::region_kind_color(region.kind);

    if region.is_complete() {
        cmds.push(DrawCmd::Polygon {
            points: screen,
            fill: region_fill(region.kind),
            stroke_width: REGION_STROKE,
            stroke_color: color,
        });
    } else {
        // Abandoned or partial outline: edges only, no fill.
        for pair in screen.windows(2) {
            cmds.push(DrawCmd::Line {
                from: pair[0],
                to: pair[1],
                width: REGION_STROKE,
                color,
            });
        }
    }

    if let Some(anchor) = region.label_anchor() {
        let pos = to_screen(anchor, viewport, canvas);
        let mut label = region.name.clone();
        if let Some(dims) = &region.dimensions {
            label = format!(
                "{label}\n{:.1} × {:.1} m · {:.1} m²",
                dims.width, dims.height, dims.area
            );
        }
        cmds.push(DrawCmd::Text {
            pos,
            text: label,
            size: 13.0,
            color: Color32::WHITE,
        });
    }
}

fn push_trace(cmds: &mut Vec<DrawCmd>, state: &EditorState, canvas: Rect, pointer: Option<Pos2>) {
    let viewport = &state.viewport;
    let trace = &state.trace;

    if let Some(anchor) = trace.rect_anchor {
        let a = to_screen(anchor, viewport, canvas);
        if let Some(p) = pointer {
            cmds.push(DrawCmd::RectStroke {
                rect: Rect::from_two_pos(a, p),
                width: TRACE_STROKE,
                color: theme::ACCENT,
            });
        }
        cmds.push(DrawCmd::Circle {
            center: a,
            radius: MARKER_RADIUS,
            fill: theme::ACCENT,
            stroke_width: 1.0,
            stroke_color: Color32::WHITE,
        });
        return;
    }

    let screen: Vec<Pos2> = trace
        .points
        .iter()
        .map(|p| to_screen(*p, viewport, canvas))
        .collect();
    for pair in screen.windows(2) {
        cmds.push(DrawCmd::Line {
            from: pair[0],
            to: pair[1],
            width: TRACE_STROKE,
            color: theme::ACCENT,
        });
    }

    if let (Some(&last), Some(pointer)) = (screen.last(), pointer) {
        let image_pointer = {
            let rel = Pos2::new(pointer.x - canvas.min.x, pointer.y - canvas.min.y);
            viewport.to_image(Point::new(rel.x as f64, rel.y as f64))
        };
        if let Some(preview) = trace.preview(image_pointer, viewport.zoom) {
            let end = to_screen(preview.point, viewport, canvas);
            // The segment turns from blue to green when the pointer enters
            // the closing target.
            let color = if preview.closing {
                theme::TRACE_CLOSING
            } else {
                theme::ACCENT
            };
            cmds.push(DrawCmd::Line {
                from: last,
                to: end,
                width: TRACE_STROKE,
                color,
            });
            if preview.closing {
                cmds.push(DrawCmd::Circle {
                    center: screen[0],
                    radius: MARKER_RADIUS * 1.8,
                    fill: Color32::TRANSPARENT,
                    stroke_width: 2.0,
                    stroke_color: theme::TRACE_CLOSING,
                });
            }
        }
    }

    for pos in screen {
        cmds.push(DrawCmd::Circle {
            center: pos,
            radius: MARKER_RADIUS,
            fill: theme::ACCENT,
            stroke_width: 1.0,
            stroke_color: Color32::WHITE,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn canvas() -> Rect {
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(800.0, 600.0))
    }

    fn state_with_image() -> EditorState {
        let mut state = EditorState::default();
        state.set_image(
            "p".into(),
            "a.png".into(),
            DynamicImage::new_rgba8(400, 300),
        );
        state
    }

    fn count_filled(cmds: &[DrawCmd]) -> usize {
        cmds.iter()
            .filter(|c| matches!(c, DrawCmd::RectFilled { .. }))
            .count()
    }

    #[test]
    fn frame_starts_with_the_checkerboard() {
        let state = state_with_image();
        let cmds = render(&state, canvas(), 1.0, None);
        assert!(matches!(cmds[0], DrawCmd::Checkerboard { .. }));
        assert!(matches!(cmds[1], DrawCmd::Image { .. }));
    }

    #[test]
    fn checkerboard_cell_snaps_to_physical_pixels() {
        let state = EditorState::default();
        let cmds = render(&state, canvas(), 1.5, None);
        let DrawCmd::Checkerboard { cell, .. } = cmds[0] else {
            panic!("expected checkerboard");
        };
        // 8 * 1.5 = 12 physical pixels, exactly representable.
        assert_eq!(cell, 8.0);
        assert_eq!((cell * 1.5).fract(), 0.0);
    }

    #[test]
    fn crop_overlay_darkens_with_four_side_rects() {
        let mut state = state_with_image();
        state.crop.area = Some(CropArea {
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 80.0,
        });
        let cmds = render(&state, canvas(), 1.0, None);
        assert_eq!(count_filled(&cmds), 4);
        // Handles are visible because the editor starts in crop mode.
        let handles = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Circle { .. }))
            .count();
        assert_eq!(handles, 8);
    }

    #[test]
    fn confirmed_crop_clips_instead_of_shading() {
        let mut state = state_with_image();
        state.calibration.pixels_per_metre = Some(10.0);
        state.crop.area = Some(CropArea {
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 80.0,
        });
        state.set_mode(EditorMode::Scale);
        state.regions.push(Region {
            id: "r".into(),
            name: "Kitchen".into(),
            kind: RegionKind::Room,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 500.0),
                Point::new(500.0, 500.0),
            ],
            dimensions: None,
        });

        let cmds = render(&state, canvas(), 1.0, None);
        // No shade, no handles outside crop mode.
        assert_eq!(count_filled(&cmds), 0);
        assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Circle { .. })));

        let clip_at = cmds
            .iter()
            .position(|c| matches!(c, DrawCmd::ClipRect { .. }))
            .expect("clip command");
        let DrawCmd::ClipRect { rect } = cmds[clip_at] else {
            unreachable!();
        };
        assert_eq!(rect, Rect::from_min_max(Pos2::new(50.0, 50.0), Pos2::new(150.0, 130.0)));
        // Everything that could spill outside the crop comes after the clip.
        let polygon_at = cmds
            .iter()
            .position(|c| matches!(c, DrawCmd::Polygon { .. }))
            .expect("region polygon");
        assert!(clip_at < polygon_at);
    }

    #[test]
    fn crop_mode_keeps_the_outside_visible_unclipped() {
        let mut state = state_with_image();
        state.crop.area = Some(CropArea {
            x: 50.0,
            y: 50.0,
            width: 100.0,
            height: 80.0,
        });
        let cmds = render(&state, canvas(), 1.0, None);
        assert_eq!(count_filled(&cmds), 4);
        assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::ClipRect { .. })));
    }

    #[test]
    fn trace_preview_switches_color_when_closing() {
        let mut state = state_with_image();
        state.calibration.pixels_per_metre = Some(10.0);
        state.set_mode(EditorMode::Region);
        for p in [
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 130.0),
        ] {
            state.trace.click(p, 1.0);
        }

        // Outside closing range the preview stays the working blue; inside
        // it turns green, the go-ahead to close the outline.
        let far = render(&state, canvas(), 1.0, Some(Pos2::new(300.0, 300.0)));
        let far_preview = far
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { color, .. } => Some(*color),
                _ => None,
            })
            .last()
            .expect("preview line");
        assert_eq!(far_preview, theme::ACCENT);

        let near = render(&state, canvas(), 1.0, Some(Pos2::new(3.0, 3.0)));
        let near_preview = near
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Line { color, .. } => Some(*color),
                _ => None,
            })
            .last()
            .expect("preview line");
        assert_eq!(near_preview, theme::TRACE_CLOSING);
    }

    #[test]
    fn calibration_label_adds_metres_once_scale_is_set() {
        let mut state = state_with_image();
        state.calibration.points =
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];

        let label_of = |state: &EditorState| {
            render(state, canvas(), 1.0, None)
                .into_iter()
                .find_map(|c| match c {
                    DrawCmd::Text { text, .. } => Some(text),
                    _ => None,
                })
                .expect("measurement label")
        };

        assert_eq!(label_of(&state), "100 px");

        state.calibration.pixels_per_metre = Some(40.0);
        assert_eq!(label_of(&state), "100 px · 2.50 m");
    }

    #[test]
    fn region_stroke_width_does_not_scale_with_zoom() {
        let mut state = state_with_image();
        state.calibration.pixels_per_metre = Some(10.0);
        state.regions.push(Region {
            id: "r".into(),
            name: "Kitchen".into(),
            kind: RegionKind::Room,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 50.0),
                Point::new(50.0, 50.0),
            ],
            dimensions: None,
        });

        for zoom in [0.5, 1.0, 4.0] {
            state.viewport.set_zoom(zoom);
            let cmds = render(&state, canvas(), 1.0, None);
            let width = cmds
                .iter()
                .find_map(|c| match c {
                    DrawCmd::Polygon { stroke_width, .. } => Some(*stroke_width),
                    _ => None,
                })
                .expect("region polygon");
            assert_eq!(width, REGION_STROKE);
        }
    }

    #[test]
    fn incomplete_region_draws_edges_without_fill() {
        let mut state = state_with_image();
        state.regions.push(Region {
            id: "r".into(),
            name: "Partial".into(),
            kind: RegionKind::Room,
            points: vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)],
            dimensions: None,
        });
        let cmds = render(&state, canvas(), 1.0, None);
        assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Polygon { .. })));
        assert!(cmds.iter().any(|c| matches!(c, DrawCmd::Line { .. })));
    }

    #[test]
    fn overlay_scene_has_no_markers() {
        let regions = vec![Region {
            id: "r".into(),
            name: "Kitchen".into(),
            kind: RegionKind::Hallway,
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 50.0),
                Point::new(50.0, 50.0),
            ],
            dimensions: None,
        }];
        let crop = CropArea {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let cmds = render_overlay(&regions, Some(&crop), &Viewport::default(), canvas());
        assert!(!cmds.iter().any(|c| matches!(c, DrawCmd::Circle { .. })));
        assert!(cmds.iter().any(|c| matches!(c, DrawCmd::Polygon { .. })));
        assert!(cmds.iter().any(|c| matches!(c, DrawCmd::RectStroke { .. })));

        // Regions are clipped to the crop, matching the editor.
        let clip_at = cmds
            .iter()
            .position(|c| matches!(c, DrawCmd::ClipRect { .. }))
            .expect("clip command");
        let polygon_at = cmds
            .iter()
            .position(|c| matches!(c, DrawCmd::Polygon { .. }))
            .expect("region polygon");
        assert!(clip_at < polygon_at);
    }
}
