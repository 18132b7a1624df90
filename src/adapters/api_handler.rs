//! REST API handlers for the admin UI
//!
//! The editor session surface (documents, schemas, edits, queue, save) plus
//! the raw publishing endpoints (`/api/update-content`, `/api/upload-image`)
//! that commit straight to the hosted repository.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::adapters::content_store::ContentStore;
use crate::adapters::editor::{EditRequest, Editor, ListAction, PickedFile};
use crate::adapters::save_orchestrator::{SaveOrchestrator, SaveStatus};
use crate::adapters::upload_queue::{QueuedUploadInfo, UploadQueue};
use crate::domain::registry;
use crate::domain::{
    ContentUpdate, EditError, FieldConfig, ImageWrite, PublisherPort, UpdateContentRequest,
};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: ContentStore,
    pub queue: UploadQueue,
    pub editor: Editor,
    pub orchestrator: Arc<SaveOrchestrator>,
    /// Absent when repository settings are incomplete
    pub publisher: Option<Arc<dyn PublisherPort>>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

#[derive(Serialize)]
pub struct DomainOverview {
    pub slug: String,
    pub dirty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub save_status: SaveStatus,
    pub unsaved_changes: bool,
    pub queued_images: usize,
}

fn edit_error_status(error: &EditError) -> StatusCode {
    match error {
        EditError::UnknownDomain(_) | EditError::UnknownField(_) | EditError::UnknownList(_) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// ============================================================================
// Editor session endpoints
// ============================================================================

pub async fn get_content_overview(State(state): State<ApiState>) -> impl IntoResponse {
    let domains: Vec<DomainOverview> = state
        .store
        .overview()
        .await
        .into_iter()
        .map(|(slug, dirty)| DomainOverview { slug, dirty })
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(domains)))
}

pub async fn get_content(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&slug).await {
        Some(document) => (StatusCode::OK, Json(ApiResponse::success(document))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Value>::error("Content domain not found")),
        ),
    }
}

pub async fn get_schema(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let Some(document) = state.store.get(&slug).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Vec<FieldConfig>>::error(
                "Content domain not found",
            )),
        );
    };
    match registry::fields_for(&slug, &document) {
        Some(fields) => (StatusCode::OK, Json(ApiResponse::success(fields))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Vec<FieldConfig>>::error(
                "Content domain not found",
            )),
        ),
    }
}

pub async fn apply_edit(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(request): Json<EditRequest>,
) -> impl IntoResponse {
    match state.editor.apply_edit(&slug, request).await {
        Ok(document) => (StatusCode::OK, Json(ApiResponse::success(document))),
        Err(e) => (
            edit_error_status(&e),
            Json(ApiResponse::<Value>::error(e.to_string())),
        ),
    }
}

pub async fn apply_list_action(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    Json(action): Json<ListAction>,
) -> impl IntoResponse {
    match state.editor.apply_list_action(&slug, action).await {
        Ok(document) => (StatusCode::OK, Json(ApiResponse::success(document))),
        Err(e) => (
            edit_error_status(&e),
            Json(ApiResponse::<Value>::error(e.to_string())),
        ),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePickDto {
    pub document: Value,
    pub queued: Vec<String>,
}

/// Image pick for a single-image or gallery field: multipart with a `path`
/// text part naming the field, followed by the file part(s) in selection
/// order
pub async fn pick_images(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut field_path: Option<String> = None;
    let mut files: Vec<PickedFile> = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(part)) => {
                let name = part.name().map(str::to_string);
                let file_name = part.file_name().map(str::to_string);
                let mime = part.content_type().map(str::to_string);
                if name.as_deref() == Some("path") {
                    match part.text().await {
                        Ok(text) => field_path = Some(text),
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(ApiResponse::<ImagePickDto>::error(e.to_string())),
                            )
                        }
                    }
                } else if let Some(name) = file_name {
                    match part.bytes().await {
                        Ok(bytes) => files.push(PickedFile { name, mime, bytes }),
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(ApiResponse::<ImagePickDto>::error(e.to_string())),
                            )
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<ImagePickDto>::error(e.to_string())),
                )
            }
        }
    }

    let Some(raw_path) = field_path else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ImagePickDto>::error("Missing 'path' part")),
        );
    };
    let path = match crate::domain::FieldPath::parse(&raw_path) {
        Ok(path) => path,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<ImagePickDto>::error(e.to_string())),
            )
        }
    };
    if files.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<ImagePickDto>::error("No files supplied")),
        );
    }

    match state.editor.apply_image_pick(&slug, &path, files).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(ImagePickDto {
                document: outcome.document,
                queued: outcome.queued,
            })),
        ),
        Err(e) => (
            edit_error_status(&e),
            Json(ApiResponse::<ImagePickDto>::error(e.to_string())),
        ),
    }
}

pub async fn list_queue(State(state): State<ApiState>) -> impl IntoResponse {
    let entries: Vec<QueuedUploadInfo> = state.queue.list().await;
    (StatusCode::OK, Json(ApiResponse::success(entries)))
}

pub async fn clear_queue(State(state): State<ApiState>) -> impl IntoResponse {
    state.queue.clear().await;
    (StatusCode::OK, Json(ApiResponse::<()>::ok()))
}

pub async fn get_preview(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> Response {
    match state.queue.preview_bytes(&token).await {
        Some(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn save_all(State(state): State<ApiState>) -> impl IntoResponse {
    match state.orchestrator.save_all().await {
        SaveStatus::Success => (
            StatusCode::OK,
            Json(ApiResponse::success(SaveStatus::Success)),
        ),
        SaveStatus::Error { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<SaveStatus>::error(message)),
        ),
        other => (StatusCode::OK, Json(ApiResponse::success(other))),
    }
}

pub async fn get_status(State(state): State<ApiState>) -> impl IntoResponse {
    let status = SessionStatus {
        save_status: state.orchestrator.status().await,
        unsaved_changes: state.orchestrator.has_unsaved_changes().await,
        queued_images: state.queue.len().await,
    };
    (StatusCode::OK, Json(ApiResponse::success(status)))
}

// ============================================================================
// Raw publishing endpoints
// ============================================================================

/// `POST /api/update-content`: batch `{updates, images}` or the legacy
/// single-document `{slug, content}` form
pub async fn update_content(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let request = match parse_update_request(&body) {
        Ok(request) => request,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
        }
    };

    let Some(publisher) = &state.publisher else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "server misconfigured" })),
        );
    };

    match publisher.publish(&request).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "update failed", "detail": e.to_string() })),
        ),
    }
}

fn parse_update_request(body: &Value) -> Result<UpdateContentRequest, String> {
    if body.get("updates").is_some() || body.get("images").is_some() {
        let updates = parse_updates(body.get("updates"))?;
        let images = parse_images(body.get("images"))?;
        if updates.is_empty() && images.is_empty() {
            return Err("empty batch".to_string());
        }
        return Ok(UpdateContentRequest { updates, images });
    }

    // Legacy single-document form behaves as a batch of one
    let update = parse_update(body)?;
    Ok(UpdateContentRequest {
        updates: vec![update],
        images: Vec::new(),
    })
}

fn parse_updates(raw: Option<&Value>) -> Result<Vec<ContentUpdate>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let items = raw.as_array().ok_or("'updates' must be an array")?;
    items.iter().map(parse_update).collect()
}

fn parse_update(raw: &Value) -> Result<ContentUpdate, String> {
    let slug = raw
        .get("slug")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or("missing or empty 'slug'")?;
    let content = raw.get("content").ok_or("missing 'content'")?;
    Ok(ContentUpdate {
        slug: slug.to_string(),
        content: content.clone(),
    })
}

fn parse_images(raw: Option<&Value>) -> Result<Vec<ImageWrite>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let items = raw.as_array().ok_or("'images' must be an array")?;
    items
        .iter()
        .map(|item| {
            let target_path = item
                .get("targetPath")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .ok_or("missing or empty 'targetPath'")?;
            let content_base64 = item
                .get("contentBase64")
                .and_then(Value::as_str)
                .ok_or("missing 'contentBase64'")?;
            Ok(ImageWrite {
                target_path: target_path.to_string(),
                content_base64: content_base64.to_string(),
            })
        })
        .collect()
}

/// `POST /api/upload-image`: single-file multipart variant, superseded by
/// the batch form but kept for the existing admin UI
pub async fn upload_image(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut target_path: Option<String> = None;
    let mut file_bytes: Option<bytes::Bytes> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(part)) => {
                let name = part.name().map(str::to_string);
                match name.as_deref() {
                    Some("targetPath") => match part.text().await {
                        Ok(text) => target_path = Some(text),
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(json!({ "error": e.to_string() })),
                            )
                        }
                    },
                    Some("file") => match part.bytes().await {
                        Ok(bytes) => file_bytes = Some(bytes),
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(json!({ "error": e.to_string() })),
                            )
                        }
                    },
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": e.to_string() })),
                )
            }
        }
    }

    let Some(target_path) = target_path else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing 'targetPath'" })),
        );
    };
    if target_path.contains("..") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid 'targetPath'" })),
        );
    }
    let Some(file_bytes) = file_bytes else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing 'file'" })),
        );
    };

    let Some(publisher) = &state.publisher else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "server misconfigured" })),
        );
    };

    let request = UpdateContentRequest {
        updates: Vec::new(),
        images: vec![ImageWrite {
            target_path,
            content_base64: base64::engine::general_purpose::STANDARD.encode(&file_bytes),
        }],
    };
    match publisher.publish(&request).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "upload failed", "detail": e.to_string() })),
        ),
    }
}
