//! JSON file persistence for the store: the night list plus the player library.

use crate::models::{GameNight, Player};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that survives a restart.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub nights: Vec<GameNight>,
    /// Reusable player names, independent of any night.
    #[serde(default)]
    pub library: Vec<Player>,
}

/// Errors reading or writing the data file.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single JSON data file.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved state. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<SavedState>, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Write the whole state, replacing the file only once the new content is on disk.
    pub fn save(&self, state: &SavedState) -> Result<(), StorageError> {
        let json = serde_json::to_vec(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Delete the data file. A missing file is fine.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
