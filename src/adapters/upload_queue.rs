//! In-memory queue of image uploads awaiting the next save
//!
//! Each entry is keyed by its repository destination path; picking a new file
//! for the same destination replaces the pending entry. Every entry owns at
//! most one preview handle whose bytes are served at a token URL until the
//! handle is explicitly released (on replacement or clear).

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A file picked for upload, before it enters the queue
#[derive(Debug, Clone)]
pub struct NewUpload {
    /// Destination inside the repository (e.g. `public/images/avatars/2.png`)
    pub repo_path: String,
    /// Path the published site serves the asset under (e.g. `/images/avatars/2.png`)
    pub public_path: String,
    pub bytes: Bytes,
}

/// Queue entry metadata returned to callers; the bytes stay inside the queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedUploadInfo {
    pub repo_path: String,
    pub public_path: String,
    pub preview_url: String,
    pub size_bytes: usize,
}

struct QueuedUpload {
    repo_path: String,
    public_path: String,
    bytes: Bytes,
    preview_token: String,
}

#[derive(Default)]
struct QueueInner {
    entries: Vec<QueuedUpload>,
    previews: HashMap<String, Bytes>,
}

impl QueueInner {
    fn install_preview(&mut self, bytes: Bytes) -> String {
        let token = Uuid::new_v4().to_string();
        self.previews.insert(token.clone(), bytes);
        token
    }

    fn release_preview(&mut self, token: &str) {
        self.previews.remove(token);
    }

    fn queue(&mut self, upload: NewUpload) {
        let preview_token = self.install_preview(upload.bytes.clone());
        let entry = QueuedUpload {
            repo_path: upload.repo_path,
            public_path: upload.public_path,
            bytes: upload.bytes,
            preview_token,
        };
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.repo_path == entry.repo_path)
        {
            let old_token = std::mem::replace(&mut existing.preview_token, entry.preview_token);
            existing.public_path = entry.public_path;
            existing.bytes = entry.bytes;
            self.release_preview(&old_token);
        } else {
            self.entries.push(entry);
        }
    }
}

/// Session-owned upload queue; cheap to clone, shared by handle
#[derive(Clone, Default)]
pub struct UploadQueue {
    inner: Arc<RwLock<QueueInner>>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn queue(&self, upload: NewUpload) {
        let mut inner = self.inner.write().await;
        inner.queue(upload);
    }

    /// Queues several files, preserving the caller-supplied order (position
    /// encodes page number for leaflet uploads)
    pub async fn queue_many(&self, uploads: Vec<NewUpload>) {
        let mut inner = self.inner.write().await;
        for upload in uploads {
            inner.queue(upload);
        }
    }

    /// Copies of the queue metadata, in queue order; the entries themselves
    /// stay owned by the queue
    pub async fn list(&self) -> Vec<QueuedUploadInfo> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .map(|e| QueuedUploadInfo {
                repo_path: e.repo_path.clone(),
                public_path: e.public_path.clone(),
                preview_url: preview_url(&e.preview_token),
                size_bytes: e.bytes.len(),
            })
            .collect()
    }

    /// `(repo_path, bytes)` pairs in queue order, for the save snapshot
    pub async fn pending_writes(&self) -> Vec<(String, Bytes)> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .map(|e| (e.repo_path.clone(), e.bytes.clone()))
            .collect()
    }

    /// Releases every preview and empties the queue
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let tokens: Vec<String> = inner
            .entries
            .iter()
            .map(|e| e.preview_token.clone())
            .collect();
        for token in tokens {
            inner.release_preview(&token);
        }
        inner.entries.clear();
    }

    /// Preview URL for a pending upload to `public_path`, if any
    pub async fn preview_for(&self, public_path: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .find(|e| e.public_path == public_path)
            .map(|e| preview_url(&e.preview_token))
    }

    /// Preview URLs for every pending upload under a public directory prefix,
    /// in queue order; empty when nothing is queued there
    pub async fn previews_for_directory(&self, public_prefix: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .filter(|e| e.public_path.starts_with(public_prefix))
            .map(|e| preview_url(&e.preview_token))
            .collect()
    }

    /// Bytes behind a preview token, for the preview route
    pub async fn preview_bytes(&self, token: &str) -> Option<Bytes> {
        let inner = self.inner.read().await;
        inner.previews.get(token).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn live_preview_count(&self) -> usize {
        self.inner.read().await.previews.len()
    }
}

fn preview_url(token: &str) -> String {
    format!("/api/previews/{token}")
}
