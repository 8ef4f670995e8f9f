//! Attachment descriptors and the materializer seam.

use std::path::PathBuf;

use serde::Deserialize;

use crate::node::ContentDigest;

pub mod download;

/// One entry of an attachment field, as returned by the row source.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    pub url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// A remote attachment copied to local storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub url: String,
    /// Id the remote assigned to the attachment, if any.
    pub attachment_id: Option<String>,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: String,
    pub digest: ContentDigest,
}

/// Turns attachment URLs into local files. Calls are independent of each other.
pub trait FileMaterializer {
    type Error: std::fmt::Display;
    fn materialize(
        &self,
        attachment: &Attachment,
    ) -> impl Future<Output = Result<LocalFile, Self::Error>>;
}
