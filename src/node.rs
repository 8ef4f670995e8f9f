//! Node shapes handed to the sink.
//!
//! Every identifier is derived from a seed string made of fixed prefixes,
//! record ids and field names, so unchanged source data always produces the
//! same ids and digests.

use serde::Serialize;
use uuid::Uuid;

/// Suffix marking a field whose value holds node ids instead of data.
pub const REFERENCE_SUFFIX: &str = "___NODE";
pub const PARENT_TYPE: &str = "Airtable";
pub const CHILD_TYPE: &str = "AirtableField";
pub const FILE_TYPE: &str = "File";

const NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_93b7_5d08_a1e4_7c3b_9f20_d655);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Name-based UUIDv5 of `seed`.
    pub fn derive(seed: &str) -> Self {
        Self(Uuid::new_v5(&NAMESPACE, seed.as_bytes()).to_string())
    }

    pub fn parent(record_id: &str) -> Self {
        Self::derive(&format!("{PARENT_TYPE}_{record_id}"))
    }

    pub fn child(record_id: &str, field: &str) -> Self {
        Self::derive(&format!("{CHILD_TYPE}_{record_id}_{field}"))
    }

    /// Files are owned by the child that references them, so the same URL
    /// in two fields yields two ids.
    pub fn file(owner: &NodeId, url: &str) -> Self {
        Self::derive(&format!("{FILE_TYPE}_{owner}_{url}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl From<NodeId> for serde_json::Value {
    fn from(id: NodeId) -> Self {
        serde_json::Value::String(id.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(blake3::Hash);

impl ContentDigest {
    /// Digest of the canonical JSON form of `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self(blake3::hash(&bytes)))
    }
}

impl From<blake3::Hash> for ContentDigest {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.to_hex().as_str())
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.to_hex().as_str())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Internal {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub content_digest: ContentDigest,
}

/// One node per fetched row.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParentNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub table: String,
    pub record_id: String,
    pub query_name: Option<String>,
    pub row_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub internal: Internal,
}

/// One node per mapped field of a row.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChildNode {
    pub id: NodeId,
    pub parent: NodeId,
    pub children: Vec<NodeId>,
    pub raw: serde_json::Value,
    #[serde(
        rename = "localFiles___NODE",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_files: Option<Vec<NodeId>>,
    pub internal: Internal,
}

/// A materialized attachment, owned by the child node of its field.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: NodeId,
    pub parent: NodeId,
    pub children: Vec<NodeId>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    pub path: std::path::PathBuf,
    pub size: u64,
    pub internal: Internal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Node {
    Parent(ParentNode),
    Child(ChildNode),
    File(FileNode),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Parent(node) => &node.id,
            Self::Child(node) => &node.id,
            Self::File(node) => &node.id,
        }
    }

    pub fn internal(&self) -> &Internal {
        match self {
            Self::Parent(node) => &node.internal,
            Self::Child(node) => &node.internal,
            Self::File(node) => &node.internal,
        }
    }

    pub fn as_parent(&self) -> Option<&ParentNode> {
        match self {
            Self::Parent(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_child(&self) -> Option<&ChildNode> {
        match self {
            Self::Child(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Self::File(node) => Some(node),
            _ => None,
        }
    }
}
