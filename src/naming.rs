//! Field-name normalization and node type suffixes.

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
#[error("unknown key cleaner `{0}` (expected one of: underscore, snake_case, camel_case, identity)")]
pub struct UnknownKeyCleaner(pub String);

/// Maps raw field names to the keys used for lookups and output.
#[derive(Clone)]
pub struct KeyCleaner(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl KeyCleaner {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Resolve one of the built-in cleaners by name.
    pub fn from_name(name: &str) -> Result<Self, UnknownKeyCleaner> {
        match name {
            "underscore" => Ok(Self::default()),
            "snake_case" => Ok(Self::custom(stringcase::snake_case)),
            "camel_case" => Ok(Self::custom(stringcase::camel_case)),
            "identity" => Ok(Self::custom(str::to_owned)),
            _ => Err(UnknownKeyCleaner(name.to_owned())),
        }
    }

    pub fn clean(&self, key: &str) -> String {
        (self.0)(key)
    }

    pub fn is_clean(&self, key: &str) -> bool {
        self.clean(key) == key
    }
}

impl Default for KeyCleaner {
    fn default() -> Self {
        Self::custom(replace_spaces)
    }
}

impl std::fmt::Debug for KeyCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyCleaner(..)")
    }
}

pub fn replace_spaces(key: &str) -> String {
    key.replace(' ', "_")
}

/// Strip characters that are not allowed in a node type suffix.
pub fn sanitize_type_name(name: Option<&str>) -> String {
    name.unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, ' ' | '/' | '+'))
        .collect()
}
