pub mod attachment;
pub mod config;
pub mod naming;
pub mod node;
pub mod pipeline;
pub mod process;
pub mod sink;
pub mod source;
pub mod status;
pub mod warning;


pub use pipeline::{HaltReason, Pipeline, PipelineError, RunReport};

#[derive(Debug, thiserror::Error)]
#[error("{context}: {detail}")]
pub struct Error {
    pub context: Box<RowContext>,
    pub detail: Box<ErrorDetail>,
}

/// Where in the source a row-level error happened.
#[derive(Debug, Clone)]
pub struct RowContext {
    pub base_id: String,
    pub table: String,
    pub record_id: Option<String>,
}

impl RowContext {
    pub fn new(base_id: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table: table.into(),
            record_id: None,
        }
    }

    pub fn with_record(&self, record_id: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            ..self.clone()
        }
    }

    pub fn error(&self, detail: ErrorDetail) -> Error {
        Error {
            context: Box::new(self.clone()),
            detail: Box::new(detail),
        }
    }
}

impl std::fmt::Display for RowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.record_id {
            Some(id) => write!(f, "{}/{}#{id}", self.base_id, self.table),
            None => write!(f, "{}/{}", self.base_id, self.table),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorDetail {
    #[error("Failed to serialize row: {0}")]
    Serialize(serde_json::Error),
    #[error("Type mismatch in field {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: serde_json::Value,
    },
}
