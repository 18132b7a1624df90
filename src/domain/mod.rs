//! Core types of the content admin: field paths, field schemas, the publish
//! batch format, and the publisher port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod error;
pub mod field;
pub mod path;
pub mod registry;

pub use error::{EditError, EditResult, PublishError, PublishResult};
pub use field::{FieldConfig, FieldType, GallerySpec, TableColumn, TableSort, TableSpec};
pub use path::{FieldPath, PathError, Segment};

/// One content domain's JSON snapshot, keyed by slug
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentUpdate {
    pub slug: String,
    pub content: Value,
}

/// One binary asset write, base64-encoded for transport
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageWrite {
    pub target_path: String,
    pub content_base64: String,
}

/// The single outbound batch a save produces: every domain's JSON plus every
/// queued image, in order
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UpdateContentRequest {
    #[serde(default)]
    pub updates: Vec<ContentUpdate>,
    #[serde(default)]
    pub images: Vec<ImageWrite>,
}

/// Port to whatever commits a batch to the hosted repository
///
/// The contract is best-effort: files are written sequentially with no
/// cross-file atomicity, and a mid-batch failure surfaces as one error with
/// no per-file detail.
#[async_trait]
pub trait PublisherPort: Send + Sync {
    async fn publish(&self, request: &UpdateContentRequest) -> PublishResult<()>;
}
