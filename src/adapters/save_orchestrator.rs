//! Save-all: one best-effort publish of the whole session
//!
//! Collects every domain's current document plus every queued image into a
//! single batch and hands it to the publisher. Success clears the queue and
//! the dirty flags; failure leaves the session untouched so the operator can
//! retry without redoing work.

use base64::Engine;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::adapters::content_store::ContentStore;
use crate::adapters::upload_queue::UploadQueue;
use crate::domain::{ImageWrite, PublisherPort, UpdateContentRequest};

/// Outcome of the most recent save attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SaveStatus {
    Idle,
    Saving,
    Success,
    Error { message: String },
}

pub struct SaveOrchestrator {
    store: ContentStore,
    queue: UploadQueue,
    /// Absent when repository settings are incomplete; saving then fails
    /// without attempting any remote call
    publisher: Option<Arc<dyn PublisherPort>>,
    status: RwLock<SaveStatus>,
    deploy_hook_url: Option<String>,
    http: reqwest::Client,
}

impl SaveOrchestrator {
    pub fn new(
        store: ContentStore,
        queue: UploadQueue,
        publisher: Option<Arc<dyn PublisherPort>>,
        deploy_hook_url: Option<String>,
    ) -> Self {
        Self {
            store,
            queue,
            publisher,
            status: RwLock::new(SaveStatus::Idle),
            deploy_hook_url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn status(&self) -> SaveStatus {
        self.status.read().await.clone()
    }

    /// Dirty documents or pending uploads
    pub async fn has_unsaved_changes(&self) -> bool {
        self.store.has_unsaved_changes().await || !self.queue.is_empty().await
    }

    /// Runs one save attempt and returns the final status
    pub async fn save_all(&self) -> SaveStatus {
        {
            // idle -> saving; a re-entered save starts from a clean status
            let mut status = self.status.write().await;
            *status = SaveStatus::Saving;
        }

        let Some(publisher) = &self.publisher else {
            return self
                .finish(SaveStatus::Error {
                    message: "server misconfigured: repository publishing is not set up".into(),
                })
                .await;
        };

        let updates = self.store.snapshot().await;
        let images: Vec<ImageWrite> = self
            .queue
            .pending_writes()
            .await
            .into_iter()
            .map(|(target_path, bytes)| ImageWrite {
                target_path,
                content_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
            })
            .collect();

        let request = UpdateContentRequest { updates, images };
        info!(
            updates = request.updates.len(),
            images = request.images.len(),
            "Saving all content"
        );

        match publisher.publish(&request).await {
            Ok(()) => {
                self.queue.clear().await;
                self.store.clear_dirty().await;
                self.trigger_deploy_hook();
                self.finish(SaveStatus::Success).await
            }
            Err(e) => {
                // Session state is preserved untouched for retry
                error!("Save failed: {e}");
                self.finish(SaveStatus::Error {
                    message: e.to_string(),
                })
                .await
            }
        }
    }

    async fn finish(&self, outcome: SaveStatus) -> SaveStatus {
        let mut status = self.status.write().await;
        *status = outcome.clone();
        outcome
    }

    /// Fire-and-forget: the commit already succeeded, so hook failures are
    /// logged and never surfaced
    fn trigger_deploy_hook(&self) {
        let Some(url) = self.deploy_hook_url.clone() else {
            return;
        };
        let http = self.http.clone();
        tokio::spawn(async move {
            match http.post(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Deploy hook triggered");
                }
                Ok(response) => {
                    warn!("Deploy hook returned {}", response.status());
                }
                Err(e) => warn!("Deploy hook failed: {e}"),
            }
        });
    }
}
