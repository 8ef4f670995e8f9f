use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::naming::KeyCleaner;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_ENDPOINT: &str = "https://api.airtable.com/v0";

/// Mapping tag reserved for attachment fields.
pub const FILE_NODE_TAG: &str = "fileNode";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config ({path:?}): {error}")]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(serde_yaml::Error),
    #[error("failed to parse TOML config: {0}")]
    ParseToml(toml::de::Error),
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

#[derive(Deserialize, Clone, Debug)]
pub struct Options {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// Name of a built-in key cleaner.
    #[serde(default)]
    pub clean_key: Option<String>,
    /// Takes precedence over `clean_key` when set programmatically.
    #[serde(skip)]
    pub key_cleaner: Option<KeyCleaner>,
    /// Base URL of the REST API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Options {
    pub fn new(api_key: impl Into<String>, tables: Vec<TableConfig>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            tables,
            concurrency: None,
            clean_key: None,
            key_cleaner: None,
            endpoint: default_endpoint(),
        }
    }

    /// Load options from a YAML or TOML file, chosen by extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| ConfigError::Read {
                path: path.to_owned(),
                error,
            })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::ParseYaml)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseToml)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(from = "String")]
pub enum MappingTag {
    File,
    /// Any other tag, usually a media type such as `text/markdown`.
    Media(String),
}

impl MappingTag {
    pub fn as_str(&self) -> &str {
        match self {
            Self::File => FILE_NODE_TAG,
            Self::Media(tag) => tag,
        }
    }
}

impl From<String> for MappingTag {
    fn from(tag: String) -> Self {
        if tag == FILE_NODE_TAG {
            Self::File
        } else {
            Self::Media(tag)
        }
    }
}

impl From<&str> for MappingTag {
    fn from(tag: &str) -> Self {
        tag.to_owned().into()
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TableConfig {
    pub base_id: String,
    pub table_name: String,
    #[serde(default)]
    pub table_view: Option<String>,
    #[serde(default)]
    pub query_name: Option<String>,
    #[serde(default)]
    pub default_values: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub mapping: IndexMap<String, MappingTag>,
    #[serde(default)]
    pub table_links: Vec<String>,
    /// Restrict the fetched fields to these raw names.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub separate_node_type: bool,
    #[serde(default)]
    pub separate_map_type: bool,
}

impl TableConfig {
    pub fn new(base_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// `mapping` keys and `table_links` entries that are not already cleaned.
    pub fn dirty_keys<'a>(&'a self, cleaner: &KeyCleaner) -> Vec<&'a str> {
        self.mapping
            .keys()
            .chain(self.table_links.iter())
            .map(String::as_str)
            .filter(|key| !cleaner.is_clean(key))
            .collect()
    }
}
