//! Status of the last completed fetch.

use std::{path::PathBuf, sync::RwLock};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub last_fetch: chrono::DateTime<chrono::Utc>,
}

/// Last-write-wins store for the source status.
pub trait StatusRecorder {
    type Error;
    fn record(&self, status: SourceStatus) -> impl Future<Output = Result<(), Self::Error>>;
}

#[derive(Default, Debug)]
pub struct MemoryStatus {
    current: RwLock<Option<SourceStatus>>,
}

impl MemoryStatus {
    pub fn latest(&self) -> Option<SourceStatus> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl StatusRecorder for MemoryStatus {
    type Error = std::convert::Infallible;

    async fn record(&self, status: SourceStatus) -> Result<(), Self::Error> {
        *self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(status);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStatusError {
    #[error("failed to serialize status: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to write status ({path:?}): {error}")]
    Write {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Keeps the status as a JSON document on disk.
#[derive(Debug)]
pub struct FileStatus {
    path: PathBuf,
}

impl FileStatus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatusRecorder for FileStatus {
    type Error = FileStatusError;

    async fn record(&self, status: SourceStatus) -> Result<(), Self::Error> {
        let content = serde_json::to_vec_pretty(&status).map_err(FileStatusError::Serialize)?;
        let write_error = |error| FileStatusError::Write {
            path: self.path.clone(),
            error,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(&self.path, content)
            .await
            .map_err(write_error)
    }
}
