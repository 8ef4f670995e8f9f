//! Row sources
//!
//! A row source answers one query per configured table with the table's rows,
//! in the order the remote returns them.

use serde::Deserialize;

pub mod rest;

/// What to fetch from a single table.
#[derive(Debug, Clone, Copy)]
pub struct TableQuery<'a> {
    pub base_id: &'a str,
    pub table_name: &'a str,
    pub view: Option<&'a str>,
    pub fields: Option<&'a [String]>,
}

/// One fetched record.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    pub fn new(id: impl Into<String>, fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }
}

pub trait RowSource {
    type Error;
    fn select(&self, query: TableQuery<'_>)
    -> impl Future<Output = Result<Vec<Row>, Self::Error>>;
}
