//! Per-tag metadata from the tag data document.
//!
//! Only a handful of fields matter here: the category hints used by the
//! resolver, the art/commercial values used by the audience breakdown, and the
//! unlock condition string.

use std::collections::HashMap;

use serde_json::Value;

use crate::edge::coerce_weight;

/// Static attributes of one tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMetadata {
    /// Explicit category name (`CategoryID`), if non-empty.
    pub category_id: Option<String>,
    /// Numeric category code (`category`).
    pub category_code: Option<i64>,
    pub art_value: f64,
    pub commercial_value: f64,
    /// `parameters.Condition`.
    pub condition: Option<String>,
}

impl TagMetadata {
    /// Build from one raw JSON entry. Non-object entries yield `None`.
    pub fn from_json(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let category_id = obj
            .get("CategoryID")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let category_code = obj.get("category").and_then(Value::as_i64);

        let condition = obj
            .get("parameters")
            .and_then(Value::as_object)
            .and_then(|params| params.get("Condition"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            category_id,
            category_code,
            art_value: coerce_weight(obj.get("artValue")),
            commercial_value: coerce_weight(obj.get("commercialValue")),
            condition,
        })
    }
}

/// Tag id → metadata.
#[derive(Debug, Clone, Default)]
pub struct TagMetadataTable {
    entries: HashMap<String, TagMetadata>,
}

impl TagMetadataTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the raw document. Non-object documents and entries are ignored.
    pub fn from_json(raw: &Value) -> Self {
        let mut table = Self::new();
        let Some(obj) = raw.as_object() else {
            tracing::warn!("tag metadata document is not a JSON object; ignoring it");
            return table;
        };
        for (tag_id, entry) in obj {
            match TagMetadata::from_json(entry) {
                Some(meta) => table.insert(tag_id.clone(), meta),
                None => tracing::debug!(tag = %tag_id, "skipping non-object metadata entry"),
            }
        }
        table
    }

    pub fn insert(&mut self, tag_id: impl Into<String>, meta: TagMetadata) {
        self.entries.insert(tag_id.into(), meta);
    }

    pub fn get(&self, tag_id: &str) -> Option<&TagMetadata> {
        self.entries.get(tag_id)
    }

    /// Art and commercial value of a tag, `(0.0, 0.0)` when unknown.
    pub fn appeal(&self, tag_id: &str) -> (f64, f64) {
        self.get(tag_id)
            .map(|m| (m.art_value, m.commercial_value))
            .unwrap_or((0.0, 0.0))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagMetadata)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
