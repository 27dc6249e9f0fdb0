//! Durable catalog storage
//!
//! The catalog is one pretty-printed JSON array. Writes replace the whole
//! file atomically: the new content goes to a temporary file in the same
//! directory, is synced, and is then renamed over the old file. If anything
//! fails before the rename, the temporary file is dropped and the previous
//! catalog stays as it was.

use crate::error::PersistenceError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tierdex_common::model::CharacterRecord;
use tierdex_common::Catalog;
use tracing::info;

/// JSON file holding an ordered list of records
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; a missing file is an empty list
    pub fn load(&self) -> tierdex_common::Result<Vec<CharacterRecord>> {
        Catalog::load(&self.path).map(Catalog::into_records)
    }

    /// Replace the stored catalog with `records`
    pub fn write(&self, records: &[CharacterRecord]) -> Result<(), PersistenceError> {
        let mut json = serde_json::to_vec_pretty(records)?;
        json.push(b'\n');
        write_atomic(&self.path, &json)?;

        info!(path = %self.path.display(), records = records.len(), "Catalog written");
        Ok(())
    }

    /// Merge `records` into the file keyed by slug (incoming wins), keeping
    /// the result sorted by slug. Used for the vanished-record archive.
    pub fn merge_by_slug(&self, records: Vec<CharacterRecord>) -> Result<usize, PersistenceError> {
        let existing = self.load().map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut by_slug: BTreeMap<String, CharacterRecord> = existing
            .into_iter()
            .map(|r| (r.slug.clone(), r))
            .collect();
        for record in records {
            by_slug.insert(record.slug.clone(), record);
        }

        let merged: Vec<CharacterRecord> = by_slug.into_values().collect();
        self.write(&merged)?;
        Ok(merged.len())
    }
}

/// Write `bytes` to `path` through a synced temporary file and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    // Dropped (and deleted) on any early return below
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    sync_dir(dir);
    Ok(())
}

/// Flush the rename itself; best-effort, not every platform supports it
fn sync_dir(dir: &Path) {
    if let Ok(handle) = std::fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tierdex_common::model::CuratedContent;

    fn record(slug: &str, rarity: u8) -> CharacterRecord {
        CharacterRecord {
            id: slug.to_string(),
            game_id: Some(format!("id-{}", slug)),
            name: slug.to_string(),
            slug: slug.to_string(),
            rarity,
            path: "Harmony".to_string(),
            internal_path_id: Some("Shaman".to_string()),
            element: "Ice".to_string(),
            curated: CuratedContent::pending(),
            last_updated: None,
        }
    }

    fn temp_entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_write_then_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("data/characters.json"));
        let records = vec![record("b", 5), record("a", 4)];

        store.write(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("characters.json"));
        store.write(&[record("a", 4), record("b", 4)]).unwrap();
        store.write(&[record("c", 5)]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].slug, "c");
        assert_eq!(temp_entries(dir.path()), vec!["characters.json".to_string()]);
    }

    #[test]
    fn test_output_is_pretty_printed_with_two_spaces() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::new(dir.path().join("characters.json"));
        store.write(&[record("a", 4)]).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"a\""));
    }

    #[test]
    fn test_failed_write_keeps_old_store() {
        let dir = TempDir::new().unwrap();
        // Target is an existing directory: the final rename must fail
        let target = dir.path().join("characters.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        let err = write_atomic(&target, b"[]").unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(target.join("keep").exists());
        assert_eq!(temp_entries(dir.path()), vec!["characters.json".to_string()]);
    }

    #[test]
    fn test_merge_by_slug_latest_wins() {
        let dir = TempDir::new().unwrap();
        let archive = CatalogStore::new(dir.path().join("archive.json"));
        archive.merge_by_slug(vec![record("old", 4), record("gone", 5)]).unwrap();

        let mut newer = record("gone", 5);
        newer.name = "Gone Again".to_string();
        let total = archive.merge_by_slug(vec![newer]).unwrap();

        let loaded = archive.load().unwrap();
        assert_eq!(total, 2);
        assert_eq!(loaded.iter().map(|r| r.slug.as_str()).collect::<Vec<_>>(), vec!["gone", "old"]);
        assert_eq!(loaded[0].name, "Gone Again");
    }
}
