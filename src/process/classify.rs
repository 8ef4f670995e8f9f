//! Field classification
//!
//! Each field of a row is resolved once into a [`FieldKind`]; everything
//! downstream matches on that instead of comparing tags again.

use tracing::trace;

use crate::{
    Error, ErrorDetail,
    config::{MappingTag, TableConfig},
    naming::KeyCleaner,
    node::{NodeId, REFERENCE_SUFFIX},
};

use super::row::TableRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Plain,
    /// Holds ids of other rows.
    Link,
    /// Becomes its own child node.
    Mapped(MappingTag),
}

/// A child node to build once the row is classified.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChild {
    pub id: NodeId,
    pub field: String,
    pub tag: MappingTag,
    pub raw: serde_json::Value,
}

#[derive(Debug, Default, PartialEq)]
pub struct Classified {
    pub data: serde_json::Map<String, serde_json::Value>,
    pub pending: Vec<PendingChild>,
}

/// Links win over mappings; `cleaned` must already be a cleaned key.
pub fn field_kind(table: &TableConfig, cleaned: &str) -> FieldKind {
    if table.table_links.iter().any(|link| link == cleaned) {
        FieldKind::Link
    } else if let Some(tag) = table.mapping.get(cleaned) {
        FieldKind::Mapped(tag.clone())
    } else {
        FieldKind::Plain
    }
}

pub fn reference_key(cleaned: &str) -> String {
    format!("{cleaned}{REFERENCE_SUFFIX}")
}

fn linked_ids(
    row: &TableRow,
    field: &str,
    value: &serde_json::Value,
) -> Result<Vec<serde_json::Value>, Error> {
    let mismatch = |got: &serde_json::Value| {
        row.context().error(ErrorDetail::TypeMismatch {
            field: field.to_owned(),
            expected: "array of record ids",
            got: got.clone(),
        })
    };
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::String(id) => Ok(vec![NodeId::parent(id).into()]),
        serde_json::Value::Array(ids) => ids
            .iter()
            .map(|id| match id {
                serde_json::Value::String(id) => Ok(NodeId::parent(id).into()),
                other => Err(mismatch(other)),
            })
            .collect(),
        other => Err(mismatch(other)),
    }
}

/// Split a row's fields into inline data and pending child nodes.
pub fn classify(row: &TableRow, cleaner: &KeyCleaner) -> Result<Classified, Error> {
    let mut classified = Classified::default();
    for (name, value) in &row.fields {
        let cleaned = cleaner.clean(name);
        let kind = field_kind(&row.table, &cleaned);
        trace!(record = row.id.as_str(), field = cleaned.as_str(), ?kind, "classify field");
        match kind {
            FieldKind::Link => {
                let ids = linked_ids(row, &cleaned, value)?;
                classified
                    .data
                    .insert(reference_key(&cleaned), serde_json::Value::Array(ids));
            }
            FieldKind::Mapped(tag) => {
                let id = NodeId::child(&row.id, &cleaned);
                classified
                    .data
                    .insert(reference_key(&cleaned), id.clone().into());
                classified.pending.push(PendingChild {
                    id,
                    field: cleaned,
                    tag,
                    raw: value.clone(),
                });
            }
            FieldKind::Plain => {
                classified.data.insert(cleaned, value.clone());
            }
        }
    }
    Ok(classified)
}
