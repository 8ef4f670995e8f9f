use crate::{
    config::TableConfig,
    naming::sanitize_type_name,
    node::{ChildNode, ContentDigest, FileNode, Internal, Node, PARENT_TYPE, ParentNode},
    warn_source,
};

use super::row::TableRow;

/// All nodes produced for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    pub parent: ParentNode,
    pub children: Vec<ChildNode>,
    pub files: Vec<FileNode>,
}

impl AssembledRow {
    /// Parent first, then children in field order, then their files.
    pub fn into_nodes(self) -> impl Iterator<Item = Node> {
        std::iter::once(Node::Parent(self.parent))
            .chain(self.children.into_iter().map(Node::Child))
            .chain(self.files.into_iter().map(Node::File))
    }
}

/// Falls back to the base type when no usable query name exists; the table
/// check reports that case once.
pub fn parent_type(row: &TableRow) -> String {
    match type_suffix(&row.table) {
        Some(suffix) => format!("{PARENT_TYPE}{suffix}"),
        None => PARENT_TYPE.to_owned(),
    }
}

fn type_suffix(table: &TableConfig) -> Option<String> {
    if !table.separate_node_type {
        return None;
    }
    Some(sanitize_type_name(table.query_name.as_deref())).filter(|suffix| !suffix.is_empty())
}

/// Warn when `separate_node_type` is set but cannot be honoured.
pub fn check_node_type(table: &TableConfig) {
    if table.separate_node_type && type_suffix(table).is_none() {
        warn_source!(
            "Table `{}` in base `{}` sets separate_node_type but has no usable query_name; using `{PARENT_TYPE}`",
            table.table_name,
            table.base_id
        );
    }
}

pub fn assemble(
    row: &TableRow,
    data: serde_json::Map<String, serde_json::Value>,
    children: Vec<ChildNode>,
    files: Vec<FileNode>,
    digest: ContentDigest,
) -> AssembledRow {
    let parent = ParentNode {
        id: row.parent_id(),
        parent: None,
        children: children.iter().map(|child| child.id.clone()).collect(),
        table: row.table.table_name.clone(),
        record_id: row.id.clone(),
        query_name: row.table.query_name.clone(),
        row_index: row.row_index,
        created_time: row.created_time.clone(),
        data,
        internal: Internal {
            node_type: parent_type(row),
            media_type: None,
            content: None,
            content_digest: digest,
        },
    };
    AssembledRow {
        parent,
        children,
        files,
    }
}
