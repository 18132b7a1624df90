//! Declarative field descriptors driving the generic JSON editor
//!
//! A content domain exposes a flat, ordered list of `FieldConfig`; the admin
//! UI renders one control per entry and the editor funnels every change
//! through the field's path. Variable-length arrays get their fixed-shape
//! field lists from [`repeat_fields`].

use serde::{Deserialize, Serialize};

use super::path::FieldPath;

/// Descriptor for one editable field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub path: FieldPath,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldConfig {
    pub fn new(path: FieldPath, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            path,
            label: label.into(),
            description: None,
            field_type,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Edit surface of a field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FieldType {
    /// Single-line text, written verbatim
    #[serde(rename = "string")]
    Text,
    /// Multi-line text, written verbatim
    #[serde(rename = "textarea")]
    Textarea,
    /// One list item per line; trimmed, blank lines dropped
    #[serde(rename = "string[]")]
    StringList,
    /// Structured rows with positional bulk paste
    #[serde(rename = "table")]
    Table(TableSpec),
    /// Single PNG upload; destination taken from the field's current value
    #[serde(rename = "image")]
    Image,
    /// Ordered multi-PNG upload; destination derived from sibling fields
    #[serde(rename = "gallery")]
    Gallery(GallerySpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<TableColumn>,
    /// Display-only ordering hint; the persisted row order is untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<TableSort>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

impl TableColumn {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSort {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

/// Sibling-field wiring for a gallery upload: the directory the pages live
/// in and the filename prefix, both read from the same document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GallerySpec {
    pub dir_path: FieldPath,
    pub format_path: FieldPath,
}

/// Scope handed to a [`repeat_fields`] item factory: the list item's base
/// path plus its display label ("Testimonial #3")
pub struct ItemScope {
    base: FieldPath,
    label: String,
}

impl ItemScope {
    pub fn base(&self) -> &FieldPath {
        &self.base
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// A sub-field of this item, labelled "{item label} {suffix}"
    pub fn field(&self, key: &str, suffix: &str, field_type: FieldType) -> FieldConfig {
        FieldConfig::new(
            self.base.clone().key(key),
            format!("{} {suffix}", self.label),
            field_type,
        )
    }
}

/// Expands a fixed-shape field list for each of `count` items of a list
///
/// Pure data expansion; the caller derives `count` from the live document and
/// regenerates the schema whenever the list length changes.
pub fn repeat_fields<F>(
    list_base: FieldPath,
    label_base: &str,
    count: usize,
    item_fields: F,
) -> Vec<FieldConfig>
where
    F: Fn(&ItemScope) -> Vec<FieldConfig>,
{
    let mut fields = Vec::new();
    for i in 0..count {
        let scope = ItemScope {
            base: list_base.clone().index(i),
            label: format!("{label_base} #{}", i + 1),
        };
        fields.extend(item_fields(&scope));
    }
    fields
}
