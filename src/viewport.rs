use crate::geometry::Point;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Ephemeral pan+zoom mapping between image space and screen space:
/// `screen = image * zoom + pan`. Screen coordinates here are relative to
/// the canvas origin; the canvas widget adds its own offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::new(0.0, 0.0),
        }
    }
}

impl Viewport {
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    pub fn to_image(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Changes zoom while keeping the image point under `screen_anchor`
    /// visually stationary: capture the image point before the change, then
    /// solve pan so it maps back to the same screen coordinate.
    pub fn zoom_at(&mut self, screen_anchor: Point, new_zoom: f64) {
        let fixed = self.to_image(screen_anchor);
        self.set_zoom(new_zoom);
        self.pan = Point::new(
            screen_anchor.x - fixed.x * self.zoom,
            screen_anchor.y - fixed.y * self.zoom,
        );
    }

    pub fn zoom_by(&mut self, screen_anchor: Point, factor: f64) {
        self.zoom_at(screen_anchor, self.zoom * factor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Initial framing: fit the whole image centered in the view with a
    /// small margin. Only called on image load; container resizes keep the
    /// current zoom and pan.
    pub fn fit_to_view(image_size: (f64, f64), view_size: (f64, f64)) -> Self {
        let (iw, ih) = image_size;
        let (vw, vh) = view_size;
        if iw <= 0.0 || ih <= 0.0 || vw <= 0.0 || vh <= 0.0 {
            return Self::default();
        }
        let margin = 24.0;
        let zoom = (((vw - margin) / iw).min((vh - margin) / ih)).clamp(MIN_ZOOM, MAX_ZOOM);
        Self {
            zoom,
            pan: Point::new((vw - iw * zoom) / 2.0, (vh - ih * zoom) / 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_within_tolerance() {
        let viewports = [
            Viewport { zoom: 0.1, pan: Point::new(-310.0, 42.5) },
            Viewport { zoom: 1.0, pan: Point::new(0.0, 0.0) },
            Viewport { zoom: 3.7, pan: Point::new(120.25, -980.0) },
            Viewport { zoom: 5.0, pan: Point::new(9999.0, 9999.0) },
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4096.0, 2160.0),
            Point::new(17.33, 951.07),
        ];

        for v in viewports {
            for p in points {
                let round = v.to_screen(v.to_image(p));
                assert!((round.x - p.x).abs() < 1e-6, "{round:?} vs {p:?} at {v:?}");
                assert!((round.y - p.y).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut v = Viewport::default();
        v.set_zoom(0.01);
        assert_eq!(v.zoom, MIN_ZOOM);
        v.set_zoom(80.0);
        assert_eq!(v.zoom, MAX_ZOOM);
    }

    #[test]
    fn zoom_at_keeps_anchor_point_stationary() {
        let mut v = Viewport {
            zoom: 1.0,
            pan: Point::new(-50.0, 30.0),
        };
        let anchor = Point::new(400.0, 260.0);
        let before = v.to_image(anchor);

        v.zoom_at(anchor, 2.5);
        let after = v.to_image(anchor);

        assert!((before.x - after.x).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);

        // Also holds when the requested zoom gets clamped.
        v.zoom_at(anchor, 50.0);
        let clamped = v.to_image(anchor);
        assert_eq!(v.zoom, MAX_ZOOM);
        assert!((before.x - clamped.x).abs() < 1e-6);
    }

    #[test]
    fn fit_to_view_centers_the_image() {
        let v = Viewport::fit_to_view((1000.0, 500.0), (500.0, 500.0));
        assert!(v.zoom < 0.5);
        let center = v.to_screen(Point::new(500.0, 250.0));
        assert!((center.x - 250.0).abs() < 1e-6);
        assert!((center.y - 250.0).abs() < 1e-6);
    }
}
