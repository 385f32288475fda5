//! Durable best-score storage.
//!
//! Scores are whole stroke counts stored under a string key. The file store
//! keeps every key in one small TOML table.

use crate::{GolfError, Result};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Key/value store the session reads the best score from and writes it to.
pub trait ScoreStore {
    /// `Ok(None)` when no value was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<u32>>;

    fn save(&mut self, key: &str, value: u32) -> Result<()>;
}

/// In-process store. Lost on exit.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    values: BTreeMap<String, u32>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: u32) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value);
        store
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self, key: &str) -> Result<Option<u32>> {
        Ok(self.values.get(key).copied())
    }

    fn save(&mut self, key: &str, value: u32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// TOML file store. A missing file reads as empty.
#[derive(Clone, Debug)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, u32>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(GolfError::StorageIo(e)),
        };
        toml::from_str(&contents).map_err(|e| GolfError::StorageParse(e.to_string()))
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self, key: &str) -> Result<Option<u32>> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&mut self, key: &str, value: u32) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        let contents =
            toml::to_string(&values).map_err(|e| GolfError::StorageParse(e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(GolfError::StorageIo)?;
        }
        std::fs::write(&self.path, contents).map_err(GolfError::StorageIo)?;
        log::debug!("saved {key} = {value} to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BEST_SCORE_KEY;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("minigolf-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("scores.toml")
    }

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryScoreStore::new();
        assert_eq!(store.load(BEST_SCORE_KEY).unwrap(), None);
        store.save(BEST_SCORE_KEY, 12).unwrap();
        assert_eq!(store.load(BEST_SCORE_KEY).unwrap(), Some(12));
    }

    #[test]
    fn missing_file_reads_as_no_record() {
        let store = FileScoreStore::new(scratch_path("missing"));
        assert_eq!(store.load(BEST_SCORE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances_and_keeps_other_keys() {
        let path = scratch_path("persist");
        let mut store = FileScoreStore::new(&path);
        store.save("other", 3).unwrap();
        store.save(BEST_SCORE_KEY, 17).unwrap();
        store.save(BEST_SCORE_KEY, 15).unwrap();

        let reopened = FileScoreStore::new(&path);
        assert_eq!(reopened.load(BEST_SCORE_KEY).unwrap(), Some(15));
        assert_eq!(reopened.load("other").unwrap(), Some(3));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let path = scratch_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not = [valid").unwrap();
        let store = FileScoreStore::new(&path);
        assert!(matches!(
            store.load(BEST_SCORE_KEY),
            Err(GolfError::StorageParse(_))
        ));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
