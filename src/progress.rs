//! Last-played level, persisted per session id in a small JSON file.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    play_level: BTreeMap<String, i64>,
}

#[derive(Clone, Debug)]
pub struct ProgressStore {
    path: PathBuf,
    session_id: String,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_id: session_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Level to start from, if one was stored for this session.
    pub fn last_played(&self) -> Result<Option<i64>, ProgressError> {
        Ok(self.read()?.play_level.get(&self.session_id).copied())
    }

    pub fn record(&self, level: i64) -> Result<(), ProgressError> {
        let mut file = self.read()?;
        file.play_level.insert(self.session_id.clone(), level);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json).map_err(|source| self.io_error(source))?;
        tracing::debug!(path = %self.path.display(), session = %self.session_id, level, "progress saved");
        Ok(())
    }

    fn read(&self) -> Result<ProgressFile, ProgressError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ProgressFile::default()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ProgressError {
        ProgressError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
