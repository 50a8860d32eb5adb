use crate::geometry::{
    fourth_rectangle_corner, has_right_angles, is_near_point, snap_to_angle, Point,
};

/// On-screen radius around the start point that closes a freeform trace;
/// divided by zoom so the closing target stays constant on screen.
pub const CLOSE_RADIUS: f64 = 12.0;
/// Degrees within which a new segment snaps to horizontal/vertical.
pub const SNAP_DEGREES: f64 = 5.0;
/// Degrees of tolerance for the auto-rectangle right-angle check.
pub const RIGHT_ANGLE_DEGREES: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceMode {
    Freeform,
    Rectangle,
}

impl TraceMode {
    pub fn toggled(self) -> Self {
        match self {
            TraceMode::Freeform => TraceMode::Rectangle,
            TraceMode::Rectangle => TraceMode::Freeform,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TraceMode::Freeform => "Freeform",
            TraceMode::Rectangle => "Rectangle",
        }
    }
}

/// Live preview of the segment from the last confirmed point to the
/// pointer: the snapped candidate, or the exact start point when the
/// pointer is within closing range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracePreview {
    pub point: Point,
    pub closing: bool,
}

/// The polygon authoring state machine. Produces finished outlines; turning
/// them into named, measured regions is the editor state's job.
#[derive(Clone, Debug)]
pub struct RegionTrace {
    pub mode: TraceMode,
    pub points: Vec<Point>,
    pub rect_anchor: Option<Point>,
}

impl Default for RegionTrace {
    fn default() -> Self {
        Self {
            mode: TraceMode::Freeform,
            points: Vec::new(),
            rect_anchor: None,
        }
    }
}

impl RegionTrace {
    pub fn in_progress(&self) -> bool {
        !self.points.is_empty() || self.rect_anchor.is_some()
    }

    /// Handles a primary click. Returns the finished outline when the click
    /// completes a region.
    pub fn click(&mut self, pos: Point, zoom: f64) -> Option<Vec<Point>> {
        match self.mode {
            TraceMode::Freeform => self.freeform_click(pos, zoom),
            TraceMode::Rectangle => self.rectangle_click(pos),
        }
    }

    fn freeform_click(&mut self, pos: Point, zoom: f64) -> Option<Vec<Point>> {
        let Some(&last) = self.points.last() else {
            // First click of a region: nothing to snap against yet.
            self.points.push(pos);
            return None;
        };

        let first = self.points[0];
        if self.points.len() >= 3 && is_near_point(pos, first, CLOSE_RADIUS / zoom) {
            if self.points.len() == 3
                && has_right_angles(self.points[0], self.points[1], self.points[2], RIGHT_ANGLE_DEGREES)
            {
                // Three right-angled corners: complete the rectangle with a
                // computed fourth corner instead of re-touching the start.
                let corner =
                    fourth_rectangle_corner(self.points[0], self.points[1], self.points[2]);
                self.points.push(corner);
            } else {
                self.points.push(first);
            }
            return Some(std::mem::take(&mut self.points));
        }

        self.points.push(snap_to_angle(last, pos, SNAP_DEGREES));
        None
    }

    fn rectangle_click(&mut self, pos: Point) -> Option<Vec<Point>> {
        let Some(anchor) = self.rect_anchor.take() else {
            self.rect_anchor = Some(pos);
            return None;
        };
        Some(vec![
            anchor,
            Point::new(pos.x, anchor.y),
            pos,
            Point::new(anchor.x, pos.y),
            anchor,
        ])
    }

    /// Secondary-click completion: takes the points collected so far
    /// verbatim, without requiring proximity to the start.
    pub fn force_complete(&mut self) -> Option<Vec<Point>> {
        self.rect_anchor = None;
        if self.points.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.points))
    }

    pub fn preview(&self, pointer: Point, zoom: f64) -> Option<TracePreview> {
        let last = *self.points.last()?;
        let closing =
            self.points.len() >= 3 && is_near_point(pointer, self.points[0], CLOSE_RADIUS / zoom);
        let point = if closing {
            self.points[0]
        } else {
            snap_to_angle(last, pointer, SNAP_DEGREES)
        };
        Some(TracePreview { point, closing })
    }

    /// Single-step point removal. Dropping to one remaining point abandons
    /// the trace entirely.
    pub fn remove_last(&mut self) {
        self.points.pop();
        if self.points.len() <= 1 {
            self.points.clear();
        }
    }

    pub fn cancel(&mut self) {
        self.points.clear();
        self.rect_anchor = None;
    }

    pub fn toggle_mode(&mut self) {
        self.cancel();
        self.mode = self.mode.toggled();
    }
}
