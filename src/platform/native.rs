//! JSON file score store
//!
//! The whole table is one JSON array of rows. Writes go to a sibling temp
//! file first and are renamed over the real one, so a crash mid-write leaves
//! the previous table intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::leaderboard::{
    LeaderboardEntry, MemoryScoreStore, ScoreStore, ScoreSubmission, StoreError, StoredScore,
};

/// Score table persisted to a JSON file
#[derive(Debug, Clone)]
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

    /// Read the table; a missing file is an empty table
    fn load(&self) -> Result<MemoryScoreStore, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MemoryScoreStore::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        let rows: Vec<StoredScore> =
            serde_json::from_str(&json).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(MemoryScoreStore::with_entries(rows))
    }

    fn save(&self, table: &MemoryScoreStore) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&table.entries)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

impl ScoreStore for FileScoreStore {
    fn insert(&mut self, submission: &ScoreSubmission) -> Result<(), StoreError> {
        let mut table = self.load()?;
        table.insert(submission)?;
        self.save(&table)?;
        log::debug!("Wrote {} rows to {}", table.len(), self.path.display());
        Ok(())
    }

    fn fetch_top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.load()?.fetch_top(limit)
    }
}
