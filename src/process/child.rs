use crate::{
    attachment::LocalFile,
    config::MappingTag,
    naming::sanitize_type_name,
    node::{CHILD_TYPE, ChildNode, ContentDigest, FILE_TYPE, FileNode, Internal, NodeId},
};

use super::{classify::PendingChild, row::TableRow};

pub fn child_type(row: &TableRow, tag: &MappingTag) -> String {
    if row.table.separate_map_type {
        format!("{CHILD_TYPE}{}", sanitize_type_name(Some(tag.as_str())))
    } else {
        CHILD_TYPE.to_owned()
    }
}

fn content(raw: &serde_json::Value) -> String {
    match raw {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Build the child node for a mapped field.
///
/// `digest` is the digest of the whole owning row, not of the field.
pub fn build_child(
    row: &TableRow,
    pending: PendingChild,
    local_files: Option<&[LocalFile]>,
    digest: ContentDigest,
) -> ChildNode {
    let PendingChild { id, tag, raw, .. } = pending;
    let local_files = local_files.map(|files| {
        files
            .iter()
            .map(|file| NodeId::file(&id, &file.url))
            .collect()
    });
    ChildNode {
        id,
        parent: row.parent_id(),
        children: Vec::new(),
        local_files,
        internal: Internal {
            node_type: child_type(row, &tag),
            media_type: Some(tag.as_str().to_owned()),
            content: Some(content(&raw)),
            content_digest: digest,
        },
        raw,
    }
}

pub fn file_node(file: LocalFile, owner: &NodeId) -> FileNode {
    FileNode {
        id: NodeId::file(owner, &file.url),
        parent: owner.clone(),
        children: Vec::new(),
        url: file.url,
        attachment_id: file.attachment_id,
        path: file.path,
        size: file.size,
        internal: Internal {
            node_type: FILE_TYPE.to_owned(),
            media_type: Some(file.content_type),
            content: None,
            content_digest: file.digest,
        },
    }
}
