//! Resolution of attachment fields into local files.

use futures::future::join_all;
use serde::Deserialize as _;
use tracing::{debug, error};

use crate::{
    RowContext,
    attachment::{Attachment, FileMaterializer, LocalFile},
    warn_source,
};

fn attachments(ctx: &RowContext, field: &str, value: &serde_json::Value) -> Vec<Attachment> {
    match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| match Attachment::deserialize(item) {
                Ok(attachment) => Some(attachment),
                Err(error) => {
                    warn_source!("{ctx}: skipping malformed attachment in field `{field}`: {error}");
                    None
                }
            })
            .collect(),
        other => {
            warn_source!("{ctx}: field `{field}` is mapped to files but holds {other}");
            Vec::new()
        }
    }
}

/// Materialize every attachment of a field concurrently.
///
/// Failed attachments are logged and left out; the others keep their order.
pub async fn resolve_attachments<M: FileMaterializer>(
    materializer: &M,
    ctx: &RowContext,
    field: &str,
    value: &serde_json::Value,
) -> Vec<LocalFile> {
    let attachments = attachments(ctx, field, value);
    let results = join_all(
        attachments
            .iter()
            .map(|attachment| materializer.materialize(attachment)),
    )
    .await;
    attachments
        .iter()
        .zip(results)
        .filter_map(|(attachment, result)| match result {
            Ok(file) => {
                debug!(%ctx, field, url = attachment.url.as_str(), path = %file.path.display(), "resolved attachment");
                Some(file)
            }
            Err(e) => {
                error!(%ctx, field, url = attachment.url.as_str(), error = %e, "failed to resolve attachment");
                crate::warning::collect(format!(
                    "{ctx}: failed to resolve attachment {} in field `{field}`: {e}",
                    attachment.url
                ));
                None
            }
        })
        .collect()
}
