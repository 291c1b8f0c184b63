//! Read-only access to exported OpenProject backup files.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Files an export folder may expose. Anything else is refused.
pub const ALLOWED_FILES: [&str; 9] = [
    "project_roles.json",
    "projects.json",
    "queries.json",
    "relations.json",
    "types.json",
    "users.json",
    "versions.json",
    "work_packages.json",
    "grids.json",
];

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("file not allowed: {0}")]
    NotAllowed(String),
    #[error("invalid backup folder: {0}")]
    InvalidFolder(String),
    #[error("could not read backup file: {0}")]
    Io(#[from] std::io::Error),
    #[error("backup file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub struct BackupStore {
    base_dir: PathBuf,
}

impl BackupStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Reads and parses `{base_dir}/{folder}/{filename}`.
    pub async fn load(&self, folder: &str, filename: &str) -> Result<Value, BackupError> {
        if !ALLOWED_FILES.contains(&filename) {
            return Err(BackupError::NotAllowed(filename.to_string()));
        }
        if folder.is_empty()
            || folder == "."
            || folder.contains("..")
            || folder.contains(['/', '\\'])
        {
            return Err(BackupError::InvalidFolder(folder.to_string()));
        }

        let path = self.base_dir.join(folder).join(filename);
        let raw = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}
