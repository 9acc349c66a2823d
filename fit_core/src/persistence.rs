//! Persistence of the catalog and day log.
//!
//! Both records are loaded together at startup and written together after
//! every mutation. The on-disk store keeps them in two JSON files and
//! replaces each file atomically under an exclusive lock.

use crate::catalog::ExerciseCatalog;
use crate::daylog::DayLog;
use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const EXERCISES_FILE: &str = "exercises.json";
pub const EXERCISE_TYPES_FILE: &str = "exercise_types.json";

/// Everything the tracker persists
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerState {
    pub catalog: ExerciseCatalog,
    pub log: DayLog,
}

/// Storage backend for tracker state
pub trait StateStore {
    fn load(&self) -> Result<TrackerState>;
    fn save(&mut self, state: &TrackerState) -> Result<()>;
}

/// Stores state as two JSON files in a data directory
pub struct JsonFileStore {
    exercises_path: PathBuf,
    types_path: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            exercises_path: dir.join(EXERCISES_FILE),
            types_path: dir.join(EXERCISE_TYPES_FILE),
        }
    }

    pub fn exercises_path(&self) -> &Path {
        &self.exercises_path
    }

    pub fn types_path(&self) -> &Path {
        &self.types_path
    }
}

impl StateStore for JsonFileStore {
    /// Missing files load as empty records. Unreadable or corrupt files are
    /// reported rather than replaced, since the next save would overwrite them.
    fn load(&self) -> Result<TrackerState> {
        let catalog: ExerciseCatalog = read_record(&self.types_path)?.unwrap_or_default();
        let mut log: DayLog = read_record(&self.exercises_path)?.unwrap_or_default();
        let pruned = log.prune_empty();
        if pruned > 0 {
            tracing::warn!("Dropped {} logged exercises without sets", pruned);
        }

        tracing::debug!(
            "Loaded {} exercise types from {:?}",
            catalog.len(),
            self.types_path
        );
        Ok(TrackerState {
            catalog: catalog.normalized(),
            log,
        })
    }

    fn save(&mut self, state: &TrackerState) -> Result<()> {
        // Stage both files before replacing either one.
        let types = stage_record(&self.types_path, &state.catalog)?;
        let exercises = stage_record(&self.exercises_path, &state.log)?;

        // The day log goes first. If the catalog rename then fails, the disk
        // only lacks catalog entries, which the next registration restores.
        exercises
            .persist(&self.exercises_path)
            .map_err(|e| Error::storage(&self.exercises_path, e.error))?;
        types
            .persist(&self.types_path)
            .map_err(|e| Error::storage(&self.types_path, e.error))?;

        tracing::debug!("Saved tracker state to {:?}", self.exercises_path);
        Ok(())
    }
}

/// Read one JSON record with a shared lock. `None` if the file doesn't exist.
fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        tracing::info!("No state file at {:?}, starting empty", path);
        return Ok(None);
    }

    let file = File::open(path).map_err(|e| Error::storage(path, e))?;
    file.lock_shared().map_err(|e| Error::storage(path, e))?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    read.map_err(|e| Error::storage(path, e))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| Error::storage(path, format!("corrupt state file: {}", e)))
}

/// Write a record to a synced temp file next to `path`, ready to be persisted
fn stage_record<T: Serialize>(path: &Path, record: &T) -> Result<NamedTempFile> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::storage(path, "state path missing parent"))?;
    std::fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;

    let temp = NamedTempFile::new_in(parent).map_err(|e| Error::storage(parent, e))?;
    temp.as_file()
        .lock_exclusive()
        .map_err(|e| Error::storage(path, e))?;

    let contents = serde_json::to_string(record)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer
            .write_all(contents.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| Error::storage(path, e))?;
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| Error::storage(path, e))?;
    temp.as_file()
        .unlock()
        .map_err(|e| Error::storage(path, e))?;
    Ok(temp)
}

/// In-process store, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: TrackerState,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently saved state
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Number of completed saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<TrackerState> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &TrackerState) -> Result<()> {
        self.state = state.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateKey, ExerciseEntry, ExerciseSet};
    use chrono::Utc;

    fn sample_state() -> TrackerState {
        let mut state = TrackerState::default();
        state
            .catalog
            .register_if_absent("Deadlift", "reps", ["back", "legs"]);
        state.log.push_entry(
            DateKey::from_ymd(2024, 2, 29).unwrap(),
            ExerciseEntry {
                id: "01".into(),
                name: "Deadlift".into(),
                rep_unit: "reps".into(),
                body_parts: ["back".to_string(), "legs".to_string()].into_iter().collect(),
                sets: vec![
                    ExerciseSet::new(5.0, Some(315.0)).unwrap(),
                    ExerciseSet::new(5.0, None).unwrap(),
                ],
                logged_at: Utc::now(),
            },
        );
        state
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path());

        let state = sample_state();
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("missing"));

        let state = store.load().unwrap();
        assert!(state.catalog.is_empty());
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_corrupted_state_is_reported() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        std::fs::write(store.exercises_path(), "{ invalid json }").unwrap();

        let result = store.load();
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
    }

    #[test]
    fn test_files_use_persisted_shapes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path());
        store.save(&sample_state()).unwrap();

        let types: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.types_path()).unwrap()).unwrap();
        assert_eq!(types["deadlift"]["displayName"], "Deadlift");

        let exercises: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.exercises_path()).unwrap())
                .unwrap();
        let entry = &exercises["2024-02-29"][0];
        assert_eq!(entry["name"], "Deadlift");
        assert_eq!(entry["sets"][0]["weight"], 315.0);
        assert!(entry["sets"][1]["weight"].is_null());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path());
        store.save(&sample_state()).unwrap();
        store.save(&TrackerState::default()).unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![EXERCISE_TYPES_FILE, EXERCISES_FILE]);
    }

    #[test]
    fn test_loads_browser_storage_export() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        std::fs::write(
            store.types_path(),
            r#"{"push-up": {"name": "Push-Up", "repType": "reps", "bodyParts": ["chest"]}}"#,
        )
        .unwrap();
        std::fs::write(
            store.exercises_path(),
            r#"{"2024-01-05": [{"id": "1704470400000", "name": "Push-Up", "repType": "reps",
                "bodyParts": ["chest"], "sets": [{"reps": 20, "weight": null}],
                "timestamp": "2024-01-05T16:00:00.000Z"}]}"#,
        )
        .unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.catalog.lookup("PUSH-UP").unwrap().rep_unit, "reps");
        let day = state
            .log
            .list_for_date(DateKey::from_ymd(2024, 1, 5).unwrap());
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].sets[0].reps, 20.0);
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().log.is_empty());

        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.saves(), 1);
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_load_drops_days_without_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        std::fs::write(
            store.exercises_path(),
            r#"{"2024-01-01": [],
                "2024-01-02": [{"id": "1", "name": "Squat", "repUnit": "reps",
                    "bodyParts": [], "sets": [], "loggedAt": "2024-01-02T10:00:00Z"}],
                "2024-01-03": [{"id": "2", "name": "Squat", "repUnit": "reps",
                    "bodyParts": [], "sets": [{"reps": 5, "weight": 100}],
                    "loggedAt": "2024-01-03T10:00:00Z"}]}"#,
        )
        .unwrap();

        let state = store.load().unwrap();
        let dates: Vec<String> = state.log.dates().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-03"]);
    }

    #[test]
    fn test_failed_log_write_leaves_catalog_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(temp_dir.path());
        // A directory in place of the log file makes its rename fail.
        std::fs::create_dir(store.exercises_path()).unwrap();
        std::fs::write(store.exercises_path().join("keep"), "x").unwrap();

        assert!(store.save(&sample_state()).is_err());
        assert!(!store.types_path().exists());
    }
}
