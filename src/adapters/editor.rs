//! Applies typed field edits to content documents
//!
//! Every edit validates against the domain's field schema, then mutates a
//! clone of the document through the field path and swaps the clone into the
//! store. Image picks additionally queue bytes on the upload queue; all
//! validation happens before any document or queue mutation.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::adapters::content_store::ContentStore;
use crate::adapters::upload_queue::{NewUpload, UploadQueue};
use crate::domain::registry;
use crate::domain::{
    EditError, EditResult, FieldConfig, FieldPath, FieldType, GallerySpec, TableSpec,
};

/// A file the operator picked in the admin UI
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    /// Declared MIME type from the upload, when present
    pub mime: Option<String>,
    pub bytes: Bytes,
}

/// One field edit, as posted by the admin UI
#[derive(Debug, Clone, Deserialize)]
pub struct EditRequest {
    pub path: FieldPath,
    #[serde(flatten)]
    pub action: EditAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EditAction {
    /// `string` / `textarea`: the raw value, written verbatim
    SetText { value: String },
    /// `string[]`: one item per line; trimmed, blanks dropped
    SetStringList { raw: String },
    /// `table`: patch one cell of one row in place
    SetCell {
        row: usize,
        column: String,
        value: String,
    },
    /// `table`: append an empty row
    AddRow,
    /// `table`: drop one row
    RemoveRow { row: usize },
    /// `table`: replace all rows from pasted CSV / tab-separated text
    BulkPaste { text: String },
}

/// Add/remove a list item; the field schema regenerates with the new count
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ListAction {
    Push { path: FieldPath },
    Remove { path: FieldPath, index: usize },
}

/// Result of an image pick: the (possibly updated) document plus the public
/// paths that were queued
#[derive(Debug)]
pub struct ImagePickOutcome {
    pub document: Value,
    pub queued: Vec<String>,
}

/// The generic JSON editor, bound to one session's store and queue
#[derive(Clone)]
pub struct Editor {
    store: ContentStore,
    queue: UploadQueue,
    /// Repository directory the public asset root maps to (default `public`)
    asset_base_path: String,
}

impl Editor {
    pub fn new(store: ContentStore, queue: UploadQueue, asset_base_path: String) -> Self {
        Self {
            store,
            queue,
            asset_base_path,
        }
    }

    /// Applies one text/table edit and returns the new document
    pub async fn apply_edit(&self, slug: &str, request: EditRequest) -> EditResult<Value> {
        let document = self
            .store
            .get(slug)
            .await
            .ok_or_else(|| EditError::UnknownDomain(slug.to_string()))?;
        let field = resolve_field(slug, &document, &request.path)?;

        let new_value = match (&field.field_type, &request.action) {
            (FieldType::Text | FieldType::Textarea, EditAction::SetText { value }) => {
                Value::String(value.clone())
            }
            (FieldType::StringList, EditAction::SetStringList { raw }) => Value::Array(
                normalize_string_list(raw)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
            (FieldType::Table(spec), action) => {
                let mut rows = current_rows(&document, &field.path);
                apply_table_action(&mut rows, spec, action, &field.path)?;
                Value::Array(rows)
            }
            (_, _) => {
                return Err(EditError::InvalidValue {
                    field: field.path.to_string(),
                    reason: "action does not match the field's type".into(),
                })
            }
        };

        let mut updated = document;
        field.path.set(&mut updated, new_value);
        self.store.replace(slug, updated.clone()).await;
        Ok(updated)
    }

    /// Handles a file pick against an image or gallery field
    pub async fn apply_image_pick(
        &self,
        slug: &str,
        path: &FieldPath,
        files: Vec<PickedFile>,
    ) -> EditResult<ImagePickOutcome> {
        let document = self
            .store
            .get(slug)
            .await
            .ok_or_else(|| EditError::UnknownDomain(slug.to_string()))?;
        let field = resolve_field(slug, &document, path)?;

        // Reject every non-PNG before anything is queued
        for file in &files {
            validate_png(file)?;
        }

        match &field.field_type {
            FieldType::Image => self.pick_single(document, &field, files).await,
            FieldType::Gallery(spec) => {
                self.pick_gallery(slug, document, &field, spec, files).await
            }
            _ => Err(EditError::InvalidValue {
                field: field.path.to_string(),
                reason: "field does not accept image uploads".into(),
            }),
        }
    }

    /// Adds or removes a list item, returning the new document
    pub async fn apply_list_action(&self, slug: &str, action: ListAction) -> EditResult<Value> {
        let document = self
            .store
            .get(slug)
            .await
            .ok_or_else(|| EditError::UnknownDomain(slug.to_string()))?;

        let (path, mutate): (&FieldPath, _) = match &action {
            ListAction::Push { path } => (path, None),
            ListAction::Remove { path, index } => (path, Some(*index)),
        };
        let list = registry::lists_for(slug)
            .into_iter()
            .find(|l| &l.path == path)
            .ok_or_else(|| EditError::UnknownList(path.to_string()))?;

        let mut items = current_rows(&document, &list.path);
        match mutate {
            None => items.push(list.template.clone()),
            Some(index) => {
                if index >= items.len() {
                    return Err(EditError::RowOutOfRange {
                        row: index,
                        len: items.len(),
                    });
                }
                items.remove(index);
            }
        }

        let mut updated = document;
        list.path.set(&mut updated, Value::Array(items));
        self.store.replace(slug, updated.clone()).await;
        Ok(updated)
    }

    /// Single image: destination comes from the field's current string value;
    /// the document is left untouched (it already names the destination)
    async fn pick_single(
        &self,
        document: Value,
        field: &FieldConfig,
        mut files: Vec<PickedFile>,
    ) -> EditResult<ImagePickOutcome> {
        if files.len() != 1 {
            return Err(EditError::InvalidValue {
                field: field.path.to_string(),
                reason: format!("expected exactly one file, got {}", files.len()),
            });
        }
        let file = files.remove(0);

        let public_path = field
            .path
            .get(&document)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EditError::MissingDestination(field.path.to_string()))?
            .to_string();

        self.queue
            .queue(NewUpload {
                repo_path: self.repo_path_for(&public_path),
                public_path: public_path.clone(),
                bytes: file.bytes,
            })
            .await;

        Ok(ImagePickOutcome {
            document,
            queued: vec![public_path],
        })
    }

    /// Gallery: destination directory and filename prefix come from sibling
    /// fields; the field's array value is overwritten with the computed paths
    async fn pick_gallery(
        &self,
        slug: &str,
        document: Value,
        field: &FieldConfig,
        spec: &GallerySpec,
        files: Vec<PickedFile>,
    ) -> EditResult<ImagePickOutcome> {
        let dir = spec
            .dir_path
            .get(&document)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EditError::MissingSibling(spec.dir_path.to_string()))?
            .trim_end_matches('/')
            .to_string();
        let prefix = spec
            .format_path
            .get(&document)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut public_paths = Vec::with_capacity(files.len());
        let mut uploads = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            // Selection order, not filename order, decides the page number
            let file_name = match &prefix {
                Some(prefix) => format!("{prefix}{}.png", index + 1),
                None => file.name.clone(),
            };
            let public_path = format!("{dir}/{file_name}");
            uploads.push(NewUpload {
                repo_path: self.repo_path_for(&public_path),
                public_path: public_path.clone(),
                bytes: file.bytes,
            });
            public_paths.push(public_path);
        }

        let mut updated = document;
        field.path.set(
            &mut updated,
            Value::Array(public_paths.iter().cloned().map(Value::String).collect()),
        );
        self.store.replace(slug, updated.clone()).await;
        self.queue.queue_many(uploads).await;

        Ok(ImagePickOutcome {
            document: updated,
            queued: public_paths,
        })
    }

    fn repo_path_for(&self, public_path: &str) -> String {
        format!(
            "{}/{}",
            self.asset_base_path.trim_end_matches('/'),
            public_path.trim_start_matches('/')
        )
    }
}

fn resolve_field(slug: &str, document: &Value, path: &FieldPath) -> EditResult<FieldConfig> {
    let fields = registry::fields_for(slug, document)
        .ok_or_else(|| EditError::UnknownDomain(slug.to_string()))?;
    fields
        .into_iter()
        .find(|f| &f.path == path)
        .ok_or_else(|| EditError::UnknownField(path.to_string()))
}

fn current_rows(document: &Value, path: &FieldPath) -> Vec<Value> {
    path.get(document)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Splits multi-line input into list items: trimmed, blank lines dropped
pub fn normalize_string_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn apply_table_action(
    rows: &mut Vec<Value>,
    spec: &TableSpec,
    action: &EditAction,
    path: &FieldPath,
) -> EditResult<()> {
    match action {
        EditAction::SetCell { row, column, value } => {
            if !spec.columns.iter().any(|c| &c.key == column) {
                return Err(EditError::InvalidValue {
                    field: path.to_string(),
                    reason: format!("unknown column {column:?}"),
                });
            }
            let len = rows.len();
            let slot = rows.get_mut(*row).ok_or(EditError::RowOutOfRange {
                row: *row,
                len,
            })?;
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Some(obj) = slot.as_object_mut() {
                obj.insert(column.clone(), Value::String(value.clone()));
            }
        }
        EditAction::AddRow => {
            rows.push(empty_row(spec));
        }
        EditAction::RemoveRow { row } => {
            if *row >= rows.len() {
                return Err(EditError::RowOutOfRange {
                    row: *row,
                    len: rows.len(),
                });
            }
            rows.remove(*row);
        }
        EditAction::BulkPaste { text } => {
            *rows = parse_bulk_paste(text, spec);
        }
        _ => {
            return Err(EditError::InvalidValue {
                field: path.to_string(),
                reason: "action does not match the field's type".into(),
            })
        }
    }
    Ok(())
}

fn empty_row(spec: &TableSpec) -> Value {
    let mut row = Map::new();
    for column in &spec.columns {
        row.insert(column.key.clone(), Value::String(String::new()));
    }
    Value::Object(row)
}

/// Pasted rows, one per line; cells split by tab when the text contains any,
/// by comma otherwise, and mapped to columns positionally
pub fn parse_bulk_paste(text: &str, spec: &TableSpec) -> Vec<Value> {
    let delimiter = if text.contains('\t') { '\t' } else { ',' };
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cells = line.split(delimiter).map(str::trim);
            let mut row = Map::new();
            for column in &spec.columns {
                let cell = cells.next().unwrap_or_default();
                row.insert(column.key.clone(), Value::String(cell.to_string()));
            }
            Value::Object(row)
        })
        .collect()
}

/// PNG-only, checked against both the declared MIME type and the filename
/// extension (the declared type alone is unreliable)
pub fn validate_png(file: &PickedFile) -> EditResult<()> {
    let declared_ok = file
        .mime
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("image/png"));
    let extension_ok = mime_guess::from_path(&file.name)
        .first()
        .is_some_and(|m| m == mime_guess::mime::IMAGE_PNG);
    if declared_ok && extension_ok {
        Ok(())
    } else {
        Err(EditError::NotPng {
            name: file.name.clone(),
        })
    }
}
