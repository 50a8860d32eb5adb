use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::model::FloorplanRecord;

/// Record store boundary: load-by-property-id and upsert. The editor only
/// depends on this trait; hosts and tests supply their own backends.
pub trait FloorplanStore {
    fn load(&self, property_id: &str) -> Result<Option<FloorplanRecord>>;
    fn save(&mut self, record: &FloorplanRecord) -> Result<()>;
}

/// One pretty-printed JSON file per property under the platform data dir.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "floortrace", "floortrace")
            .context("cannot resolve data directory")?;
        Self::with_dir(dirs.data_dir().join("floorplans"))
    }

    pub fn with_dir(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn record_path(&self, property_id: &str) -> PathBuf {
        // Property ids come from the host; keep the filename tame.
        let safe: String = property_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl FloorplanStore for JsonFileStore {
    fn load(&self, property_id: &str) -> Result<Option<FloorplanRecord>> {
        let path = self.record_path(property_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read {}", path.display()))
            }
        };
        let record = serde_json::from_str(&raw)
            .with_context(|| format!("malformed floorplan record {}", path.display()))?;
        Ok(Some(record))
    }

    fn save(&mut self, record: &FloorplanRecord) -> Result<()> {
        let path = self.record_path(&record.property_id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
        log::info!(
            "saved floorplan for {} ({} regions)",
            record.property_id,
            record.regions.len()
        );
        Ok(())
    }
}

/// In-memory store for tests and embedding hosts without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    records: HashMap<String, FloorplanRecord>,
}

impl FloorplanStore for MemoryStore {
    fn load(&self, property_id: &str) -> Result<Option<FloorplanRecord>> {
        Ok(self.records.get(property_id).cloned())
    }

    fn save(&mut self, record: &FloorplanRecord) -> Result<()> {
        self.records
            .insert(record.property_id.clone(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CALIBRATION_METHOD;

    fn record(property_id: &str) -> FloorplanRecord {
        FloorplanRecord {
            property_id: property_id.into(),
            source_image_path: "plans/a.png".into(),
            original_width: 800,
            original_height: 600,
            pixels_per_metre: 25.0,
            calibration_method: CALIBRATION_METHOD.into(),
            crop_area: None,
            regions: Vec::new(),
            saved_at: "2026-08-28T09:00:00Z".into(),
        }
    }

    #[test]
    fn missing_record_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::with_dir(dir.path().into()).expect("store");
        assert_eq!(store.load("nope").expect("load"), None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::with_dir(dir.path().into()).expect("store");
        let rec = record("prop-1");

        store.save(&rec).expect("save");
        assert_eq!(store.load("prop-1").expect("load"), Some(rec));
    }

    #[test]
    fn saving_twice_is_an_idempotent_upsert() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::with_dir(dir.path().into()).expect("store");
        let rec = record("prop-1");

        store.save(&rec).expect("first save");
        store.save(&rec).expect("second save");

        let files: Vec<_> = fs::read_dir(dir.path()).expect("dir").collect();
        assert_eq!(files.len(), 1);
        assert_eq!(store.load("prop-1").expect("load"), Some(rec));
    }

    #[test]
    fn upsert_replaces_rather_than_merges() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::with_dir(dir.path().into()).expect("store");

        store.save(&record("prop-1")).expect("save");
        let mut updated = record("prop-1");
        updated.pixels_per_metre = 99.0;
        updated.regions.clear();
        store.save(&updated).expect("save");

        assert_eq!(store.load("prop-1").expect("load"), Some(updated));
    }

    #[test]
    fn awkward_property_ids_map_to_safe_filenames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::with_dir(dir.path().into()).expect("store");
        store.save(&record("unit 4/b")).expect("save");
        assert!(store.load("unit 4/b").expect("load").is_some());
    }

    #[test]
    fn memory_store_upserts_by_property_id() {
        let mut store = MemoryStore::default();
        store.save(&record("p")).expect("save");
        let mut updated = record("p");
        updated.pixels_per_metre = 1.0;
        store.save(&updated).expect("save");
        assert_eq!(store.load("p").expect("load"), Some(updated));
    }
}
