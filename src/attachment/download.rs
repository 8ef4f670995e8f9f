use std::path::PathBuf;

use tracing::debug;

use super::{Attachment, FileMaterializer, LocalFile};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid attachment URL ({url}): {error}")]
    InvalidUrl {
        url: String,
        error: url::ParseError,
    },
    #[error("failed to fetch remote file ({url}): {error}")]
    FetchRemote { url: url::Url, error: reqwest::Error },
    #[error("failed to write cached file ({path:?}): {error}")]
    Write {
        path: PathBuf,
        error: std::io::Error,
    },
}

/// Downloads attachments into a content-addressed cache directory.
#[derive(Debug)]
pub struct DownloadMaterializer {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl DownloadMaterializer {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache_dir: cache_dir.into(),
        }
    }
}

fn derive_name_from_url(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| segment.to_owned())
        })
        .unwrap_or_else(|| urlencoding::encode(url.as_str()).into_owned())
}

/// Local file name for an attachment: its own filename if usable, otherwise the URL's last segment.
pub(crate) fn file_name(attachment: &Attachment, url: &url::Url) -> String {
    let name = attachment
        .filename
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| derive_name_from_url(url));
    name.replace(['/', '\\'], "_")
}

impl FileMaterializer for DownloadMaterializer {
    type Error = Error;

    async fn materialize(&self, attachment: &Attachment) -> Result<LocalFile, Self::Error> {
        let url = url::Url::parse(&attachment.url).map_err(|error| Error::InvalidUrl {
            url: attachment.url.clone(),
            error,
        })?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::FetchRemote {
                url: url.clone(),
                error,
            })?
            .bytes()
            .await
            .map_err(|error| Error::FetchRemote {
                url: url.clone(),
                error,
            })?;
        let hash = blake3::hash(&body);
        let name = file_name(attachment, &url);
        let dir = self.cache_dir.join(hash.to_hex().as_str());
        let path = dir.join(&name);
        let write_error = |error| Error::Write {
            path: path.clone(),
            error,
        };
        tokio::fs::create_dir_all(&dir).await.map_err(write_error)?;
        tokio::fs::write(&path, &body).await.map_err(write_error)?;
        debug!(url = %url, path = %path.display(), size = body.len(), "cached attachment");

        let content_type = attachment.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&name)
                .first_or_octet_stream()
                .to_string()
        });
        Ok(LocalFile {
            url: attachment.url.clone(),
            attachment_id: attachment.id.clone(),
            size: body.len() as _,
            content_type,
            digest: hash.into(),
            path,
        })
    }
}
