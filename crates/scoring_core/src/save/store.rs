use super::error::SaveError;
use super::format::{
    decompress_and_deserialize, is_valid_innings_id, serialize_and_compress, InningsSave,
};
use super::migration::migrate_save;

use std::fs::{create_dir_all, read_dir, remove_file, rename, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

const EXTENSION: &str = "inn";

/// Directory of innings snapshots, one file per innings id.
#[derive(Debug, Clone)]
pub struct InningsStore {
    dir: PathBuf,
}

impl InningsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a snapshot, replacing any previous one for the same innings
    pub fn save(&self, save: &InningsSave) -> Result<(), SaveError> {
        let path = self.path_for(&save.innings_id)?;
        let _lock = Self::lock(&path)?;
        Self::save_to_path(&path, save)?;
        log::info!(
            "Innings {} saved at version {}",
            save.innings_id,
            save.session_version
        );
        Ok(())
    }

    /// Persist a snapshot for a new innings. Refuses to replace an existing one.
    pub fn create(&self, save: &InningsSave) -> Result<(), SaveError> {
        let path = self.path_for(&save.innings_id)?;
        let _lock = Self::lock(&path)?;
        if path.exists() {
            return Err(SaveError::AlreadyExists { innings_id: save.innings_id.clone() });
        }
        Self::save_to_path(&path, save)?;
        log::info!("Innings {} created", save.innings_id);
        Ok(())
    }

    /// Persist a snapshot only if the stored one is still at `expected_version`.
    ///
    /// Holds an exclusive lock on the innings from the version check to the
    /// rename, so two processes that loaded the same version cannot both
    /// write: the second gets `StaleVersion`.
    pub fn update(&self, save: &InningsSave, expected_version: u64) -> Result<(), SaveError> {
        let path = self.path_for(&save.innings_id)?;
        let _lock = Self::lock(&path)?;
        if !path.exists() {
            return Err(SaveError::NotFound { innings_id: save.innings_id.clone() });
        }

        let stored = Self::load_from_path(&path)?;
        if stored.session_version != expected_version {
            log::warn!(
                "Innings {} moved to version {} while version {} was being edited",
                save.innings_id,
                stored.session_version,
                expected_version
            );
            return Err(SaveError::StaleVersion {
                expected: expected_version,
                actual: stored.session_version,
            });
        }

        Self::save_to_path(&path, save)?;
        log::info!(
            "Innings {} updated {} -> {}",
            save.innings_id,
            expected_version,
            save.session_version
        );
        Ok(())
    }

    /// Load, migrate and validate a snapshot
    pub fn load(&self, innings_id: &str) -> Result<InningsSave, SaveError> {
        let path = self.path_for(innings_id)?;
        if !path.exists() {
            return Err(SaveError::NotFound { innings_id: innings_id.to_string() });
        }
        let save = Self::load_from_path(&path)?;
        log::info!("Innings {} loaded", innings_id);
        Ok(save)
    }

    pub fn exists(&self, innings_id: &str) -> bool {
        match self.path_for(innings_id) {
            Ok(path) => path.exists(),
            Err(_) => false,
        }
    }

    pub fn delete(&self, innings_id: &str) -> Result<(), SaveError> {
        let path = self.path_for(innings_id)?;
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted innings {}", innings_id);
        }
        Ok(())
    }

    /// Summary of every readable snapshot, most recent first. Unreadable
    /// files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<SavedInningsInfo>, SaveError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut infos = Vec::new();
        for entry in read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(save) => infos.push(SavedInningsInfo::from(&save)),
                Err(e) => log::warn!("Skipping unreadable snapshot {:?}: {}", path, e),
            }
        }

        infos.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)); // Most recent first
        Ok(infos)
    }

    /// Checksum of the stored bytes for an innings, for out-of-band verification.
    pub fn checksum(&self, innings_id: &str) -> Result<String, SaveError> {
        let path = self.path_for(innings_id)?;
        if !path.exists() {
            return Err(SaveError::NotFound { innings_id: innings_id.to_string() });
        }
        let bytes = std::fs::read(&path)?;
        Ok(super::format::checksum_hex(&bytes))
    }

    // Private helper methods

    fn path_for(&self, innings_id: &str) -> Result<PathBuf, SaveError> {
        if !is_valid_innings_id(innings_id) {
            return Err(SaveError::InvalidId { innings_id: innings_id.to_string() });
        }
        Ok(self.dir.join(format!("{innings_id}.{EXTENSION}")))
    }

    /// Exclusive advisory lock next to the snapshot, released on drop.
    fn lock(path: &Path) -> Result<File, SaveError> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path.with_extension("lock"))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn save_to_path(path: &Path, save: &InningsSave) -> Result<(), SaveError> {
        let data = serialize_and_compress(save)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }

        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<InningsSave, SaveError> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let save = decompress_and_deserialize(&data)?;
        let save = migrate_save(save)?;
        save.validate()?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(save)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedInningsInfo {
    pub innings_id: String,
    pub timestamp: u64,
    pub session_version: u64,
    pub batting_team: String,
    pub bowling_team: String,
    pub score: String,
    pub overs: String,
}

impl From<&InningsSave> for SavedInningsInfo {
    fn from(save: &InningsSave) -> Self {
        Self {
            innings_id: save.innings_id.clone(),
            timestamp: save.timestamp,
            session_version: save.session_version,
            batting_team: save.state.batting_team.clone(),
            bowling_team: save.state.bowling_team.clone(),
            score: format!("{}/{}", save.state.total_runs, save.state.wickets),
            overs: save.state.overs.to_string(),
        }
    }
}

impl SavedInningsInfo {
    pub fn get_display_text(&self) -> String {
        format!(
            "{}: {} {} v {} ({} ov)",
            self.innings_id, self.score, self.batting_team, self.bowling_team, self.overs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_fixtures::{play, ready_innings};
    use crate::models::BallOutcome;
    use tempfile::TempDir;

    fn snapshot(id: &str) -> InningsSave {
        let state = play(ready_innings(), &[BallOutcome::runs(2), BallOutcome::no_ball(0)]);
        InningsSave::new(id.to_string(), 5, state)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path().join("innings"));

        let original = snapshot("match-1");
        store.save(&original).unwrap();

        let loaded = store.load("match-1").unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());

        store.save(&snapshot("atomic")).unwrap();

        let path = temp_dir.path().join("atomic.inn");
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_and_invalid_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());

        assert!(matches!(store.load("nope"), Err(SaveError::NotFound { .. })));
        assert!(matches!(store.load("../etc"), Err(SaveError::InvalidId { .. })));
        assert!(!store.exists("../etc"));
    }

    #[test]
    fn test_list_skips_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());

        store.save(&snapshot("one")).unwrap();
        store.save(&snapshot("two")).unwrap();
        std::fs::write(temp_dir.path().join("broken.inn"), b"not a snapshot at all, no").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|info| info.score == "3/0"));
    }

    #[test]
    fn test_update_refuses_second_writer_at_same_version() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());
        store.create(&snapshot("race")).unwrap();

        // Two operators both load version 5 and each score a delivery.
        let mut first = store.load("race").unwrap();
        let mut second = store.load("race").unwrap();
        first.session_version = 6;
        first.state = play(first.state, &[BallOutcome::runs(4)]);
        second.session_version = 6;
        second.state = play(second.state, &[BallOutcome::runs(1)]);

        store.update(&first, 5).unwrap();
        let err = store.update(&second, 5).unwrap_err();
        assert!(matches!(err, SaveError::StaleVersion { expected: 5, actual: 6 }));
        assert!(err.is_recoverable());

        let kept = store.load("race").unwrap();
        assert_eq!(kept.state.total_runs, 7);
        assert_eq!(kept.state.recent_balls.len(), 3);
    }

    #[test]
    fn test_create_and_update_preconditions() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());

        assert!(matches!(store.update(&snapshot("fresh"), 5), Err(SaveError::NotFound { .. })));
        store.create(&snapshot("fresh")).unwrap();
        assert!(matches!(
            store.create(&snapshot("fresh")),
            Err(SaveError::AlreadyExists { .. })
        ));
        // lock files never show up as snapshots
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_checksum() {
        let temp_dir = TempDir::new().unwrap();
        let store = InningsStore::new(temp_dir.path());

        store.save(&snapshot("gone")).unwrap();
        assert_eq!(store.checksum("gone").unwrap().len(), 64);
        store.delete("gone").unwrap();
        assert!(!store.exists("gone"));
        assert!(matches!(store.checksum("gone"), Err(SaveError::NotFound { .. })));
    }
}
