//! Key-value tag dictionaries attached to network entities

use ahash::AHashMap;
use serde_json::Value;

/// A map from string keys to dynamically-typed values.
///
/// Every entity carries one for diagnostics and user metadata. Tag values
/// never influence scheduling or numeric results.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    tags: AHashMap<String, Value>,
}

impl TagMap {
    /// Create an empty tag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag, replacing any previous value under the same key.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Get a tag value by key.
    pub fn get_tag(&self, key: &str) -> Option<&Value> {
        self.tags.get(key)
    }

    /// Get a tag as a string slice, if present and a string.
    pub fn get_tag_str(&self, key: &str) -> Option<&str> {
        self.tags.get(key).and_then(Value::as_str)
    }

    /// Remove a tag; returns the previous value if one existed.
    pub fn remove_tag(&mut self, key: &str) -> Option<Value> {
        self.tags.remove(key)
    }

    /// Number of tags in the map.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check whether the map holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
