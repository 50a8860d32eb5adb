use chrono::Local;
use egui::{ColorImage, Context as EguiContext, TextureHandle, TextureOptions};
use image::DynamicImage;

use crate::calibrate::Calibration;
use crate::crop::CropTool;
use crate::geometry::Point;
use crate::model::{Dimensions, FloorplanRecord, Region, RegionKind, CALIBRATION_METHOD};
use crate::store::FloorplanStore;
use crate::trace::RegionTrace;
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Crop,
    Scale,
    Region,
    Pan,
}

impl EditorMode {
    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Crop => "Crop",
            EditorMode::Scale => "Scale",
            EditorMode::Region => "Regions",
            EditorMode::Pan => "Pan",
        }
    }
}

/// Current mode plus a single-slot memory of the mode pan was entered
/// from, so releasing pan restores it. Not a stack: entering pan twice
/// keeps the original previous mode.
#[derive(Clone, Copy, Debug)]
pub struct ModeMachine {
    current: EditorMode,
    previous: EditorMode,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self {
            current: EditorMode::Crop,
            previous: EditorMode::Crop,
        }
    }
}

impl ModeMachine {
    pub fn current(self) -> EditorMode {
        self.current
    }

    fn set(&mut self, mode: EditorMode) {
        self.current = mode;
        self.previous = mode;
    }

    pub fn enter_pan(&mut self) {
        if self.current != EditorMode::Pan {
            self.previous = self.current;
            self.current = EditorMode::Pan;
        }
    }

    pub fn exit_pan(&mut self) {
        if self.current == EditorMode::Pan {
            self.current = self.previous;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

pub struct EditorImage {
    pub dynamic: DynamicImage,
    pub texture: Option<TextureHandle>,
    pub path: String,
}

impl EditorImage {
    pub fn size(&self) -> (u32, u32) {
        (self.dynamic.width(), self.dynamic.height())
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.dynamic.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture("floorplan", color, TextureOptions::LINEAR));
    }
}

/// All session state of one editing session. Viewport and in-progress tool
/// state are discarded on close; regions, crop and scale become durable
/// only through an explicit save.
pub struct EditorState {
    pub property_id: String,
    pub image: Option<EditorImage>,
    /// Terminal decode failure; no geometry operations while set.
    pub image_error: Option<String>,
    pub viewport: Viewport,
    /// Set on image load, consumed by the canvas to fit the initial view.
    pub needs_fit: bool,
    pub mode: ModeMachine,
    pub crop: CropTool,
    pub calibration: Calibration,
    pub trace: RegionTrace,
    pub regions: Vec<Region>,
    created_regions: usize,
    pub saving: bool,
    pub dirty: bool,
    pub status: Option<StatusMessage>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            property_id: String::new(),
            image: None,
            image_error: None,
            viewport: Viewport::default(),
            needs_fit: false,
            mode: ModeMachine::default(),
            crop: CropTool::default(),
            calibration: Calibration::default(),
            trace: RegionTrace::default(),
            regions: Vec::new(),
            created_regions: 0,
            saving: false,
            dirty: false,
            status: None,
        }
    }
}

impl EditorState {
    /// Geometry-mutating input is only meaningful once the image extents
    /// are known and the decode did not fail.
    pub fn can_edit(&self) -> bool {
        self.image.is_some() && self.image_error.is_none()
    }

    pub fn set_image(&mut self, property_id: String, path: String, image: DynamicImage) {
        *self = Self {
            property_id,
            image: Some(EditorImage {
                dynamic: image,
                texture: None,
                path,
            }),
            needs_fit: true,
            ..Self::default()
        };
    }

    pub fn set_image_error(&mut self, path: &str, message: String) {
        log::error!("failed to decode {path}: {message}");
        self.image = None;
        self.image_error = Some(message.clone());
        self.status_error(format!("Could not load image: {message}"));
    }

    /// Mode switching, with the scale gate in front of region mapping.
    /// Returns false when the transition is rejected.
    pub fn set_mode(&mut self, mode: EditorMode) -> bool {
        if !self.can_edit() {
            return false;
        }
        if mode == EditorMode::Region && !self.calibration.is_calibrated() {
            self.status_warn("Set the scale before mapping regions".into());
            return false;
        }
        if mode == EditorMode::Pan {
            self.mode.enter_pan();
            return true;
        }
        if self.mode.current() == EditorMode::Region && mode != EditorMode::Region {
            self.trace.cancel();
        }
        self.crop.pointer_up();
        self.mode.set(mode);
        true
    }

    pub fn enter_pan(&mut self) {
        if self.can_edit() {
            self.mode.enter_pan();
        }
    }

    pub fn exit_pan(&mut self) {
        self.mode.exit_pan();
    }

    /// Crop confirmation moves on to scale calibration.
    pub fn confirm_crop(&mut self) {
        if self.crop.area.is_some() {
            self.crop.pointer_up();
            self.dirty = true;
            self.set_mode(EditorMode::Scale);
        }
    }

    pub fn confirm_calibration(&mut self) {
        match self.calibration.confirm_entry() {
            Ok(scale) => {
                self.dirty = true;
                self.status_info(format!("Scale set: {scale:.1} px/m"));
            }
            Err(err) => self.status_warn(format!("Invalid distance: {err}")),
        }
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
        self.trace.cancel();
        self.dirty = true;
        // Region mapping is gated off again until re-calibration.
        if self.mode.current() == EditorMode::Region {
            self.mode.set(EditorMode::Scale);
        }
    }

    pub fn handle_region_click(&mut self, pos: Point) {
        if let Some(outline) = self.trace.click(pos, self.viewport.zoom) {
            self.complete_region(outline);
        }
    }

    pub fn force_complete_region(&mut self) {
        if let Some(outline) = self.trace.force_complete() {
            self.complete_region(outline);
        }
    }

    fn complete_region(&mut self, points: Vec<Point>) {
        self.created_regions += 1;
        let n = self.created_regions;
        let dimensions = self
            .calibration
            .pixels_per_metre
            .and_then(|ppm| Dimensions::from_points(&points, ppm));
        self.regions.push(Region {
            id: format!("region-{}-{n}", Local::now().timestamp_millis()),
            name: format!("Region {n}"),
            kind: RegionKind::Room,
            points,
            dimensions,
        });
        self.dirty = true;
    }

    pub fn delete_region(&mut self, index: usize) {
        if index < self.regions.len() {
            self.regions.remove(index);
            self.dirty = true;
        }
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
        self.trace.cancel();
        self.dirty = true;
    }

    /// Applies a previously saved record, unless it was saved against a
    /// different source image, in which case it is discarded with an
    /// explicit warning rather than silently applied.
    pub fn apply_record(&mut self, record: FloorplanRecord) {
        let Some(image) = &self.image else {
            return;
        };
        if !record.matches_image(&image.path) {
            log::warn!(
                "stored floorplan for {} points at {}, not {}; ignoring it",
                record.property_id,
                record.source_image_path,
                image.path
            );
            self.status_warn(
                "Saved floorplan was made for a different image and was not loaded".into(),
            );
            return;
        }
        self.created_regions = record.regions.len();
        self.regions = record.regions;
        self.calibration.pixels_per_metre = Some(record.pixels_per_metre);
        self.crop.area = record.crop_area;
        self.dirty = false;
        log::info!(
            "loaded floorplan for {} ({} regions)",
            record.property_id,
            self.regions.len()
        );
    }

    /// Load failures other than not-found degrade to a fresh session; the
    /// stored record is only a convenience pre-population.
    pub fn load_from_store(&mut self, store: &dyn FloorplanStore) {
        match store.load(&self.property_id) {
            Ok(Some(record)) => self.apply_record(record),
            Ok(None) => {}
            Err(err) => {
                log::warn!("could not load floorplan for {}: {err:#}", self.property_id);
                self.status_info("No saved data could be read; starting fresh".into());
            }
        }
    }

    pub fn build_record(&self) -> anyhow::Result<FloorplanRecord> {
        let image = match &self.image {
            Some(image) => image,
            None => anyhow::bail!("no floorplan image is loaded"),
        };
        let pixels_per_metre = match self.calibration.pixels_per_metre {
            Some(ppm) => ppm,
            None => anyhow::bail!("set the scale before saving"),
        };
        let (width, height) = image.size();
        Ok(FloorplanRecord {
            property_id: self.property_id.clone(),
            source_image_path: image.path.clone(),
            original_width: width,
            original_height: height,
            pixels_per_metre,
            calibration_method: CALIBRATION_METHOD.into(),
            crop_area: self.crop.area,
            regions: self.regions.clone(),
            saved_at: Local::now().to_rfc3339(),
        })
    }

    /// Upsert save. Rejected locally before touching the store when the
    /// scale is missing; on store failure all editing state is kept so the
    /// operator can retry.
    pub fn save_to_store(&mut self, store: &mut dyn FloorplanStore) {
        if self.saving {
            return;
        }
        let record = match self.build_record() {
            Ok(record) => record,
            Err(err) => {
                self.status_warn(format!("Cannot save: {err}"));
                return;
            }
        };
        self.saving = true;
        match store.save(&record) {
            Ok(()) => {
                self.dirty = false;
                self.status_info(format!("Saved {} regions", record.regions.len()));
            }
            Err(err) => {
                log::error!("save failed for {}: {err:#}", record.property_id);
                self.status_error(format!("Save failed: {err}"));
            }
        }
        self.saving = false;
    }

    pub fn status_info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            level: StatusLevel::Info,
        });
    }

    pub fn status_warn(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            level: StatusLevel::Warn,
        });
    }

    pub fn status_error(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            level: StatusLevel::Error,
        });
    }
}
