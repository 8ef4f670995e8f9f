use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt as _;

use crate::node::Node;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open node file ({path:?}): {error}")]
    Open {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("failed to serialize node {id}: {error}")]
    Serialize {
        id: String,
        error: serde_json::Error,
    },
    #[error("failed to write node file ({path:?}): {error}")]
    Write {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Writes one JSON document per node and line.
pub struct JsonLinesSink {
    path: PathBuf,
    file: tokio::sync::Mutex<tokio::io::BufWriter<tokio::fs::File>>,
}

impl JsonLinesSink {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_owned();
        let open_error = |error| Error::Open {
            path: path.clone(),
            error,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(open_error)?;
        }
        let file = tokio::fs::File::create(&path).await.map_err(open_error)?;
        Ok(Self {
            file: tokio::sync::Mutex::new(tokio::io::BufWriter::new(file)),
            path,
        })
    }

    /// Flush buffered lines to disk.
    pub async fn finish(&self) -> Result<(), Error> {
        self.file
            .lock()
            .await
            .flush()
            .await
            .map_err(|error| Error::Write {
                path: self.path.clone(),
                error,
            })
    }
}

impl super::NodeSink for JsonLinesSink {
    type Error = Error;

    async fn create_node(&self, node: Node) -> Result<(), Self::Error> {
        let mut line = serde_json::to_vec(&node).map_err(|error| Error::Serialize {
            id: node.id().to_string(),
            error,
        })?;
        line.push(b'\n');
        self.file
            .lock()
            .await
            .write_all(&line)
            .await
            .map_err(|error| Error::Write {
                path: self.path.clone(),
                error,
            })
    }
}
