use serde::{Deserialize, Serialize};

/// A point in image-space pixels (origin top-left, independent of the
/// viewport). All tool math happens in this space; conversion to screen
/// coordinates is the viewport's job.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn pixel_distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Shoelace formula over the points in stored order, with the wrap-around
/// pair for the last point. Fewer than 3 points is degenerate and yields 0.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum.abs() / 2.0
}

/// Axis-aligned bounding box of a point run as (width, height) in pixels.
pub fn bounding_box(points: &[Point]) -> Option<(f64, f64)> {
    let first = points.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some((max_x - min_x, max_y - min_y))
}

/// Snaps `candidate` onto the horizontal or vertical axis through `anchor`
/// when the anchor->candidate angle is within `threshold_degrees` of
/// 0°/180° or ±90°. The anchor distance is preserved exactly; outside the
/// threshold the candidate is returned unchanged.
pub fn snap_to_angle(anchor: Point, candidate: Point, threshold_degrees: f64) -> Point {
    let dx = candidate.x - anchor.x;
    let dy = candidate.y - anchor.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= f64::EPSILON {
        return candidate;
    }

    let angle = dy.atan2(dx).to_degrees();
    let off_horizontal = angle.abs().min((180.0 - angle.abs()).abs());
    let off_vertical = (angle.abs() - 90.0).abs();

    if off_horizontal <= threshold_degrees {
        Point::new(anchor.x + dist * dx.signum(), anchor.y)
    } else if off_vertical <= threshold_degrees {
        Point::new(anchor.x, anchor.y + dist * dy.signum())
    } else {
        candidate
    }
}

/// Euclidean proximity test. The threshold is in image-space pixels; callers
/// that want a constant on-screen hit target must divide by the current zoom.
pub fn is_near_point(a: Point, b: Point, threshold: f64) -> bool {
    a.distance(b) <= threshold
}

/// True when the p1->p2 and p2->p3 segments meet at roughly 90°,
/// normalized modulo 180 so winding direction does not matter.
pub fn has_right_angles(p1: Point, p2: Point, p3: Point, threshold_degrees: f64) -> bool {
    let a1 = (p2.y - p1.y).atan2(p2.x - p1.x).to_degrees();
    let a2 = (p3.y - p2.y).atan2(p3.x - p2.x).to_degrees();
    let diff = (a2 - a1).rem_euclid(180.0);
    (diff - 90.0).abs() <= threshold_degrees
}

/// Completes a rectangle from three right-angled corners: `p1 + (p3 - p2)`.
pub fn fourth_rectangle_corner(p1: Point, p2: Point, p3: Point) -> Point {
    Point::new(p1.x + (p3.x - p2.x), p1.y + (p3.y - p2.y))
}

/// Rounds to 2 decimal places for display values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoelace_area_of_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        assert_eq!(polygon_area(&square), 100.0);
    }

    #[test]
    fn shoelace_ignores_duplicated_closing_point() {
        let closed = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        assert_eq!(polygon_area(&closed), 100.0);
    }

    #[test]
    fn degenerate_polygons_have_zero_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[Point::new(1.0, 1.0), Point::new(5.0, 5.0)]), 0.0);
    }

    #[test]
    fn snap_preserves_distance_within_threshold() {
        let anchor = Point::new(0.0, 0.0);
        let candidate = Point::new(10.0, 2.0);
        let original = anchor.distance(candidate);

        let snapped = snap_to_angle(anchor, candidate, 15.0);
        assert_eq!(snapped.y, 0.0);
        assert!((anchor.distance(snapped) - original).abs() < 1e-9);
    }

    #[test]
    fn snap_leaves_candidate_outside_threshold() {
        let anchor = Point::new(0.0, 0.0);
        let candidate = Point::new(10.0, 2.0); // ~11.3 degrees
        assert_eq!(snap_to_angle(anchor, candidate, 5.0), candidate);
    }

    #[test]
    fn snap_handles_vertical_and_negative_directions() {
        let anchor = Point::new(5.0, 5.0);

        let up = snap_to_angle(anchor, Point::new(5.4, -4.0), 5.0);
        assert_eq!(up.x, 5.0);
        assert!(up.y < anchor.y);

        let left = snap_to_angle(anchor, Point::new(-10.0, 5.3), 5.0);
        assert_eq!(left.y, 5.0);
        assert!(left.x < anchor.x);
    }

    #[test]
    fn near_point_threshold_is_inclusive() {
        let a = Point::new(0.0, 0.0);
        assert!(is_near_point(a, Point::new(3.0, 4.0), 5.0));
        assert!(!is_near_point(a, Point::new(3.0, 4.1), 5.0));
    }

    #[test]
    fn right_angle_detection_ignores_winding() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(0.0, 10.0);
        let p3 = Point::new(10.0, 10.0);
        assert!(has_right_angles(p1, p2, p3, 5.0));
        assert!(has_right_angles(p3, p2, p1, 5.0));
        assert!(!has_right_angles(p1, p2, Point::new(8.0, 18.0), 5.0));
    }

    #[test]
    fn fourth_corner_completes_rectangle() {
        let corner = fourth_rectangle_corner(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        );
        assert_eq!(corner, Point::new(10.0, 0.0));
    }

    #[test]
    fn round2_for_display() {
        assert_eq!(round2(1.005001), 1.01);
        assert_eq!(round2(2.0), 2.0);
    }
}
