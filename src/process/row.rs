//! Fetched rows composed with their table configuration.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    Error, ErrorDetail, RowContext,
    config::TableConfig,
    node::{ContentDigest, NodeId},
    source::Row,
};

/// A fetched row paired with its table's configuration.
///
/// `fields` already holds the table defaults underneath the fetched values;
/// the value is never mutated after composition, so concurrent row tasks can
/// share the table configuration freely.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub created_time: Option<String>,
    pub row_index: usize,
    pub table: Arc<TableConfig>,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DigestBasis<'a> {
    id: &'a str,
    created_time: Option<&'a str>,
    base_id: &'a str,
    table: &'a str,
    query_name: Option<&'a str>,
    row_index: usize,
    fields: &'a serde_json::Map<String, serde_json::Value>,
}

impl TableRow {
    pub fn compose(table: Arc<TableConfig>, row_index: usize, row: Row) -> Self {
        let Row {
            id,
            created_time,
            mut fields,
        } = row;
        for (name, value) in &table.default_values {
            fields.entry(name.clone()).or_insert_with(|| value.clone());
        }
        Self {
            id,
            created_time,
            row_index,
            table,
            fields,
        }
    }

    pub fn parent_id(&self) -> NodeId {
        NodeId::parent(&self.id)
    }

    pub fn context(&self) -> RowContext {
        RowContext::new(&self.table.base_id, &self.table.table_name).with_record(&self.id)
    }

    /// Digest over everything the row carries.
    pub fn digest(&self) -> Result<ContentDigest, Error> {
        ContentDigest::of(&DigestBasis {
            id: &self.id,
            created_time: self.created_time.as_deref(),
            base_id: &self.table.base_id,
            table: &self.table.table_name,
            query_name: self.table.query_name.as_deref(),
            row_index: self.row_index,
            fields: &self.fields,
        })
        .map_err(|error| self.context().error(ErrorDetail::Serialize(error)))
    }
}
