//! Row processing
//!
//! Turns one composed row into its parent node, the child nodes of its mapped
//! fields, and the file nodes of its attachments.

use futures::future::join_all;

use crate::{Error, attachment::FileMaterializer, config::MappingTag, naming::KeyCleaner};

pub mod assemble;
pub mod attachment;
pub mod child;
pub mod classify;
pub mod row;

pub use assemble::AssembledRow;
pub use classify::{Classified, FieldKind};
pub use row::TableRow;

/// Classify a row, build its children, and assemble the parent.
pub async fn process_row<M: FileMaterializer>(
    row: &TableRow,
    cleaner: &KeyCleaner,
    materializer: &M,
) -> Result<AssembledRow, Error> {
    let digest = row.digest()?;
    let Classified { data, pending } = classify::classify(row, cleaner)?;
    let ctx = row.context();
    let ctx = &ctx;

    let built = join_all(pending.into_iter().map(|pending| async move {
        let files = match pending.tag {
            MappingTag::File => Some(
                attachment::resolve_attachments(materializer, ctx, &pending.field, &pending.raw)
                    .await,
            ),
            MappingTag::Media(_) => None,
        };
        let child = child::build_child(row, pending, files.as_deref(), digest);
        let files = files
            .unwrap_or_default()
            .into_iter()
            .map(|file| child::file_node(file, &child.id))
            .collect::<Vec<_>>();
        (child, files)
    }))
    .await;

    let (children, files): (Vec<_>, Vec<_>) = built.into_iter().unzip();
    Ok(assemble::assemble(
        row,
        data,
        children,
        files.into_iter().flatten().collect(),
        digest,
    ))
}
