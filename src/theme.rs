use egui::epaint::Shadow;
use egui::{
    vec2, Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals,
};

use crate::model::RegionKind;

/// Primary interaction color: crop border, trace lines and the open
/// preview segment.
pub const ACCENT: Color32 = Color32::from_rgb(0x4D, 0x8D, 0xFF);
/// Scale calibration markers and the measurement line.
pub const MEASURE: Color32 = Color32::from_rgb(0xF2, 0xA7, 0x3B);
/// Preview highlight once the pointer is within closing range of the
/// trace start.
pub const TRACE_CLOSING: Color32 = Color32::from_rgb(0x46, 0xC8, 0x7A);

pub fn region_kind_color(kind: RegionKind) -> Color32 {
    match kind {
        RegionKind::Room => Color32::from_rgb(0x4D, 0x8D, 0xFF),
        RegionKind::Hallway => Color32::from_rgb(0xB8, 0x7B, 0xF2),
        RegionKind::Outdoor => Color32::from_rgb(0x46, 0xC8, 0x7A),
        RegionKind::Other => Color32::from_rgb(0x94, 0xA3, 0xB8),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthClass {
    Compact,
    Regular,
    Wide,
}

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
    pub breakpoints: Breakpoints,
    pub shadows: ShadowTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub canvas_bg: Color32,
    pub stroke_soft: Color32,
    pub stroke_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub warn: Color32,
    pub error: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub panel_rounding: f32,
    pub chip_rounding: f32,
    pub button_rounding: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub space_1: f32,
    pub space_2: f32,
    pub space_3: f32,
    pub panel_padding_x: f32,
    pub panel_padding_y: f32,
    pub toolbar_height: f32,
    pub status_height: f32,
    pub side_panel_width: f32,
    pub chip_h: f32,
}

#[derive(Clone, Debug)]
pub struct Breakpoints {
    pub compact_max: f32,
    pub regular_max: f32,
}

#[derive(Clone, Debug)]
pub struct ShadowTokens {
    pub ambient: Color32,
    pub elevation: Color32,
}

impl AppTheme {
    pub fn width_class(&self, width: f32) -> WidthClass {
        width_class(width, &self.breakpoints)
    }
}

pub fn width_class(width: f32, breakpoints: &Breakpoints) -> WidthClass {
    if width <= breakpoints.compact_max {
        WidthClass::Compact
    } else if width <= breakpoints.regular_max {
        WidthClass::Regular
    } else {
        WidthClass::Wide
    }
}

pub fn editor_theme() -> AppTheme {
    AppTheme {
        surfaces: SurfaceTokens {
            app_bg: Color32::from_rgb(0x15, 0x17, 0x1B),
            panel_bg: Color32::from_rgb(0x1B, 0x1D, 0x23),
            card_bg: Color32::from_rgb(0x22, 0x25, 0x2D),
            canvas_bg: Color32::from_rgb(0x11, 0x13, 0x18),
            stroke_soft: Color32::from_rgba_unmultiplied(255, 255, 255, 24),
            stroke_strong: Color32::from_rgba_unmultiplied(255, 255, 255, 46),
            accent: ACCENT,
            accent_soft: Color32::from_rgba_unmultiplied(77, 141, 255, 72),
            warn: Color32::from_rgb(0xF2, 0xA7, 0x3B),
            error: Color32::from_rgb(0xEF, 0x5A, 0x5A),
        },
        text: TextTokens {
            primary: Color32::from_rgb(0xF2, 0xF5, 0xFC),
            secondary: Color32::from_rgb(0xB2, 0xBD, 0xD2),
            muted: Color32::from_rgb(0x7E, 0x8A, 0xA2),
        },
        controls: ControlTokens {
            panel_rounding: 10.0,
            chip_rounding: 8.0,
            button_rounding: 8.0,
        },
        layout: LayoutTokens {
            space_1: 4.0,
            space_2: 8.0,
            space_3: 12.0,
            panel_padding_x: 12.0,
            panel_padding_y: 8.0,
            toolbar_height: 44.0,
            status_height: 28.0,
            side_panel_width: 280.0,
            chip_h: 28.0,
        },
        breakpoints: Breakpoints {
            compact_max: 860.0,
            regular_max: 1180.0,
        },
        shadows: ShadowTokens {
            ambient: Color32::from_rgba_unmultiplied(0, 0, 0, 56),
            elevation: Color32::from_rgba_unmultiplied(0, 0, 0, 110),
        },
    }
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let mut style: Style = (*ctx.style()).clone();

    style.spacing.item_spacing = vec2(theme.layout.space_2, theme.layout.space_2);
    style.spacing.button_padding = vec2(theme.layout.space_3, theme.layout.space_1);
    style.spacing.menu_margin = egui::Margin::symmetric(theme.layout.space_2, theme.layout.space_2);
    style.spacing.window_margin =
        egui::Margin::symmetric(theme.layout.space_3, theme.layout.space_3);

    style.visuals = Visuals::dark();
    style.visuals.override_text_color = Some(theme.text.primary);
    style.visuals.panel_fill = theme.surfaces.panel_bg;
    style.visuals.window_fill = theme.surfaces.panel_bg;
    style.visuals.faint_bg_color = theme.surfaces.panel_bg;
    style.visuals.extreme_bg_color = theme.surfaces.app_bg;
    style.visuals.window_rounding = Rounding::same(theme.controls.panel_rounding);

    style.visuals.widgets.noninteractive.bg_fill = theme.surfaces.panel_bg;
    style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, theme.text.secondary);
    style.visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);

    style.visuals.widgets.inactive.bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.weak_bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, theme.text.secondary);

    style.visuals.widgets.hovered.bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.hovered.weak_bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_strong);
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.widgets.active.bg_fill = theme.surfaces.accent_soft;
    style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.selection.bg_fill = theme.surfaces.accent_soft;
    style.visuals.selection.stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.popup_shadow = Shadow {
        offset: vec2(0.0, 8.0),
        blur: 18.0,
        spread: 0.0,
        color: theme.shadows.ambient,
    };
    style.visuals.window_shadow = Shadow {
        offset: vec2(0.0, 12.0),
        blur: 24.0,
        spread: 0.0,
        color: theme.shadows.elevation,
    };

    for widget in [
        &mut style.visuals.widgets.noninteractive,
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
        &mut style.visuals.widgets.open,
    ] {
        widget.rounding = Rounding::same(theme.controls.button_rounding);
    }

    style.text_styles.insert(
        TextStyle::Heading,
        FontId::new(20.0, FontFamily::Proportional),
    );
    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Button,
        FontId::new(14.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        TextStyle::Small,
        FontId::new(12.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}
