//! Repository-backed implementation of the publisher port
//!
//! Writes JSON updates first, then images, each as an independent contents
//! API call in the supplied order. There is no cross-file atomicity: a
//! mid-batch failure leaves earlier writes in place and is reported as one
//! error without per-file detail.

use async_trait::async_trait;
use base64::Engine;
use tracing::info;

use crate::adapters::repo_client::RepoClient;
use crate::config::RepositorySettings;
use crate::domain::{PublishError, PublishResult, PublisherPort, UpdateContentRequest};

pub struct ContentPublisher {
    client: RepoClient,
    content_base_path: String,
}

impl ContentPublisher {
    pub fn new(settings: &RepositorySettings) -> PublishResult<Self> {
        Ok(Self {
            client: RepoClient::new(settings)?,
            content_base_path: settings.content_base_path.trim_matches('/').to_string(),
        })
    }

    fn content_path(&self, slug: &str) -> String {
        format!("{}/{slug}.json", self.content_base_path)
    }
}

#[async_trait]
impl PublisherPort for ContentPublisher {
    async fn publish(&self, request: &UpdateContentRequest) -> PublishResult<()> {
        for update in &request.updates {
            let rendered = serde_json::to_string_pretty(&update.content)
                .map_err(|e| PublishError::Encoding(e.to_string()))?;
            self.client
                .put_file(
                    &self.content_path(&update.slug),
                    rendered.as_bytes(),
                    &format!("Update {} content", update.slug),
                )
                .await?;
        }

        for image in &request.images {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&image.content_base64)
                .map_err(|e| {
                    PublishError::Encoding(format!(
                        "Undecodable image content for {}: {e}",
                        image.target_path
                    ))
                })?;
            self.client
                .put_file(
                    &image.target_path,
                    &bytes,
                    &format!("Upload {}", image.target_path),
                )
                .await?;
        }

        info!(
            updates = request.updates.len(),
            images = request.images.len(),
            "Published content batch"
        );
        Ok(())
    }
}
