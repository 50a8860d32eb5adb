use crate::geometry::{is_near_point, Point};
use crate::model::CropArea;

/// On-screen handle pick radius in pixels; divided by zoom so the hit
/// target stays the same size at any zoom level.
pub const HANDLE_RADIUS: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CropHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl CropHandle {
    pub const ALL: [CropHandle; 8] = [
        CropHandle::NorthWest,
        CropHandle::North,
        CropHandle::NorthEast,
        CropHandle::East,
        CropHandle::SouthEast,
        CropHandle::South,
        CropHandle::SouthWest,
        CropHandle::West,
    ];

    /// Image-space position of the handle on the crop rectangle's border.
    pub fn position(self, crop: &CropArea) -> Point {
        let cx = crop.x + crop.width / 2.0;
        let cy = crop.y + crop.height / 2.0;
        match self {
            CropHandle::NorthWest => Point::new(crop.x, crop.y),
            CropHandle::North => Point::new(cx, crop.y),
            CropHandle::NorthEast => Point::new(crop.right(), crop.y),
            CropHandle::East => Point::new(crop.right(), cy),
            CropHandle::SouthEast => Point::new(crop.right(), crop.bottom()),
            CropHandle::South => Point::new(cx, crop.bottom()),
            CropHandle::SouthWest => Point::new(crop.x, crop.bottom()),
            CropHandle::West => Point::new(crop.x, cy),
        }
    }

    fn owns_left(self) -> bool {
        matches!(self, CropHandle::NorthWest | CropHandle::West | CropHandle::SouthWest)
    }

    fn owns_right(self) -> bool {
        matches!(self, CropHandle::NorthEast | CropHandle::East | CropHandle::SouthEast)
    }

    fn owns_top(self) -> bool {
        matches!(self, CropHandle::NorthWest | CropHandle::North | CropHandle::NorthEast)
    }

    fn owns_bottom(self) -> bool {
        matches!(self, CropHandle::SouthWest | CropHandle::South | CropHandle::SouthEast)
    }

    fn flipped_horizontal(self) -> Self {
        match self {
            CropHandle::NorthWest => CropHandle::NorthEast,
            CropHandle::NorthEast => CropHandle::NorthWest,
            CropHandle::West => CropHandle::East,
            CropHandle::East => CropHandle::West,
            CropHandle::SouthWest => CropHandle::SouthEast,
            CropHandle::SouthEast => CropHandle::SouthWest,
            other => other,
        }
    }

    fn flipped_vertical(self) -> Self {
        match self {
            CropHandle::NorthWest => CropHandle::SouthWest,
            CropHandle::SouthWest => CropHandle::NorthWest,
            CropHandle::North => CropHandle::South,
            CropHandle::South => CropHandle::North,
            CropHandle::NorthEast => CropHandle::SouthEast,
            CropHandle::SouthEast => CropHandle::NorthEast,
            other => other,
        }
    }
}

pub fn hit_handle(crop: &CropArea, pos: Point, zoom: f64) -> Option<CropHandle> {
    let radius = HANDLE_RADIUS / zoom.max(f64::MIN_POSITIVE);
    CropHandle::ALL
        .into_iter()
        .find(|handle| is_near_point(handle.position(crop), pos, radius))
}

/// Moves the edges the handle owns to `pos`, then renormalizes. Dragging an
/// edge past its opposite flips the rectangle and the active handle, so a
/// continued drag keeps tracking the pointer.
pub fn apply_handle(crop: &CropArea, handle: CropHandle, pos: Point) -> (CropArea, CropHandle) {
    let mut left = crop.x;
    let mut right = crop.right();
    let mut top = crop.y;
    let mut bottom = crop.bottom();

    if handle.owns_left() {
        left = pos.x;
    }
    if handle.owns_right() {
        right = pos.x;
    }
    if handle.owns_top() {
        top = pos.y;
    }
    if handle.owns_bottom() {
        bottom = pos.y;
    }

    let mut next = handle;
    if left > right {
        std::mem::swap(&mut left, &mut right);
        next = next.flipped_horizontal();
    }
    if top > bottom {
        std::mem::swap(&mut top, &mut bottom);
        next = next.flipped_vertical();
    }

    (
        CropArea {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        },
        next,
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CropDrag {
    Creating { anchor: Point },
    Resizing { handle: CropHandle },
}

/// State machine over one optional crop rectangle. The area it exposes is
/// normalized at every intermediate frame.
#[derive(Clone, Debug, Default)]
pub struct CropTool {
    pub area: Option<CropArea>,
    pub drag: Option<CropDrag>,
}

impl CropTool {
    pub fn pointer_down(&mut self, pos: Point, zoom: f64) {
        if let Some(area) = &self.area {
            if let Some(handle) = hit_handle(area, pos, zoom) {
                self.drag = Some(CropDrag::Resizing { handle });
            }
            return;
        }
        self.area = Some(CropArea::from_corners(pos, pos));
        self.drag = Some(CropDrag::Creating { anchor: pos });
    }

    pub fn pointer_move(&mut self, pos: Point) {
        match self.drag {
            Some(CropDrag::Creating { anchor }) => {
                self.area = Some(CropArea::from_corners(anchor, pos));
            }
            Some(CropDrag::Resizing { handle }) => {
                if let Some(area) = &self.area {
                    let (next, flipped) = apply_handle(area, handle, pos);
                    self.area = Some(next);
                    self.drag = Some(CropDrag::Resizing { handle: flipped });
                }
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn reset(&mut self) {
        self.area = None;
        self.drag = None;
    }
}
