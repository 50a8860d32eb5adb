use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point};

/// The only calibration flow this editor supports.
pub const CALIBRATION_METHOD: &str = "manual";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Room,
    Hallway,
    Outdoor,
    Other,
}

impl RegionKind {
    pub const ALL: [RegionKind; 4] = [
        RegionKind::Room,
        RegionKind::Hallway,
        RegionKind::Outdoor,
        RegionKind::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RegionKind::Room => "Room",
            RegionKind::Hallway => "Hallway",
            RegionKind::Outdoor => "Outdoor",
            RegionKind::Other => "Other",
        }
    }
}

/// Real-world measurements derived from a region outline at completion
/// time. Values are metres, rounded to 2 decimals for display. They are not
/// re-derived when the scale later changes; stale values stay as computed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub area: f64,
}

impl Dimensions {
    /// `None` for incomplete outlines (fewer than 3 points) or a
    /// non-positive scale.
    pub fn from_points(points: &[Point], pixels_per_metre: f64) -> Option<Self> {
        if points.len() < 3 || pixels_per_metre <= 0.0 {
            return None;
        }
        let (w, h) = geometry::bounding_box(points)?;
        Some(Self {
            width: geometry::round2(w / pixels_per_metre),
            height: geometry::round2(h / pixels_per_metre),
            area: geometry::round2(geometry::polygon_area(points) / pixels_per_metre.powi(2)),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub kind: RegionKind,
    /// Insertion order defines winding and edge order. A closed polygon
    /// repeats its first point last, except auto-completed rectangles whose
    /// fourth corner is computed rather than duplicated.
    pub points: Vec<Point>,
    pub dimensions: Option<Dimensions>,
}

impl Region {
    /// A region is paintable/measurable once it has at least 3 points.
    /// Shorter traces are abandoned work and flagged wherever listed.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= 3
    }

    /// Centroid of the outline (ignoring a duplicated closing point),
    /// used to center labels.
    pub fn label_anchor(&self) -> Option<Point> {
        let unique: &[Point] = match self.points.as_slice() {
            [] => return None,
            [rest @ .., last] if rest.first() == Some(last) && rest.len() > 1 => rest,
            all => all,
        };
        let n = unique.len() as f64;
        let (sx, sy) = unique
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

/// Axis-aligned crop rectangle in image-space pixels. Kept normalized:
/// width and height are never negative, whichever way a drag moved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropArea {
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// The persisted aggregate, one per property, replaced wholesale on save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorplanRecord {
    pub property_id: String,
    pub source_image_path: String,
    pub original_width: u32,
    pub original_height: u32,
    pub pixels_per_metre: f64,
    pub calibration_method: String,
    pub crop_area: Option<CropArea>,
    pub regions: Vec<Region>,
    pub saved_at: String,
}

impl FloorplanRecord {
    /// A record saved against a different source image must not be applied
    /// to the one currently being edited.
    pub fn matches_image(&self, source_image_path: &str) -> bool {
        self.source_image_path == source_image_path
    }
}
