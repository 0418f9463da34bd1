//! Lock-file hash record deciding whether requirements export can be skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{PywfError, Result};
use crate::core::tooling::scope;

pub const EXPORT_RECORD_DESCRIPTION: &str = "DON'T edit this file manually! This file is the cache of the poetry.lock file hash. It is used to avoid unnecessary expansive 'poetry export ...' command.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub hash: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Present(ExportRecord),
}

#[derive(Debug, Clone)]
pub struct ExportCache {
    path: PathBuf,
}

impl ExportCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. Unreadable or malformed records count as absent.
    #[must_use]
    pub fn load(&self) -> CacheState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return CacheState::Absent,
            Err(err) => {
                scope::warn(format_args!(
                    "ignoring unreadable {}: {err}",
                    self.path.display()
                ));
                return CacheState::Absent;
            }
        };
        match serde_json::from_str::<ExportRecord>(&raw) {
            Ok(record) => CacheState::Present(record),
            Err(err) => {
                scope::warn(format_args!(
                    "ignoring corrupt {}: {err}",
                    self.path.display()
                ));
                CacheState::Absent
            }
        }
    }

    #[must_use]
    pub fn needs_export(&self, current_hash: &str) -> bool {
        match self.load() {
            CacheState::Absent => true,
            CacheState::Present(record) => record.hash != current_hash,
        }
    }

    /// Persists `hash`; call only after a successful real export.
    pub fn record(&self, hash: &str) -> Result<()> {
        let record = ExportRecord {
            hash: hash.to_string(),
            description: EXPORT_RECORD_DESCRIPTION.to_string(),
        };
        let mut body = serde_json::to_string_pretty(&record).map_err(|err| {
            PywfError::io(
                "failed to serialize",
                &self.path,
                std::io::Error::new(ErrorKind::InvalidData, err),
            )
        })?;
        body.push('\n');
        fs::write(&self.path, body)
            .map_err(|source| PywfError::io("failed to write", &self.path, source))
    }
}
