//! Session store for per-domain content documents
//!
//! One JSON document per content domain, loaded from the local content
//! directory at startup and replaced wholesale on every successful edit.
//! Dirty flags track which domains have unsaved changes; persistence only
//! ever happens through the save orchestrator's snapshot.

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::ContentUpdate;

struct StoreInner {
    /// Slug order, as configured; also the order snapshots are emitted in
    slugs: Vec<String>,
    documents: HashMap<String, Value>,
    dirty: HashSet<String>,
}

/// Cheaply clonable handle to the session's documents
#[derive(Clone)]
pub struct ContentStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ContentStore {
    /// A store with the given domains, each starting from an empty document
    pub fn new(slugs: Vec<String>) -> Self {
        let documents = slugs.iter().map(|s| (s.clone(), json!({}))).collect();
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                slugs,
                documents,
                dirty: HashSet::new(),
            })),
        }
    }

    /// Loads `{slug}.json` for each domain from the content directory.
    /// A missing or unreadable file leaves that domain at an empty document.
    pub fn load_dir(dir: &Path, slugs: Vec<String>) -> anyhow::Result<Self> {
        let mut documents = HashMap::new();
        for slug in &slugs {
            let path = dir.join(format!("{slug}.json"));
            let document = match std::fs::read_to_string(&path) {
                Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                    anyhow::anyhow!("invalid JSON in {}: {e}", path.display())
                })?,
                Err(e) => {
                    warn!("Content file {} not readable ({e}), starting empty", path.display());
                    json!({})
                }
            };
            documents.insert(slug.clone(), document);
        }
        Ok(Self {
            inner: Arc::new(RwLock::new(StoreInner {
                slugs,
                documents,
                dirty: HashSet::new(),
            })),
        })
    }

    pub async fn slugs(&self) -> Vec<String> {
        self.inner.read().await.slugs.clone()
    }

    pub async fn get(&self, slug: &str) -> Option<Value> {
        self.inner.read().await.documents.get(slug).cloned()
    }

    /// Swaps in a new document for a domain and marks it dirty.
    /// Returns `false` for an unregistered slug.
    pub async fn replace(&self, slug: &str, document: Value) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.documents.contains_key(slug) {
            return false;
        }
        inner.documents.insert(slug.to_string(), document);
        inner.dirty.insert(slug.to_string());
        true
    }

    /// Seeds a document without marking it dirty (initial load, tests)
    pub async fn seed(&self, slug: &str, document: Value) {
        let mut inner = self.inner.write().await;
        if !inner.slugs.iter().any(|s| s == slug) {
            inner.slugs.push(slug.to_string());
        }
        inner.documents.insert(slug.to_string(), document);
    }

    pub async fn is_dirty(&self, slug: &str) -> bool {
        self.inner.read().await.dirty.contains(slug)
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        !self.inner.read().await.dirty.is_empty()
    }

    pub async fn clear_dirty(&self) {
        self.inner.write().await.dirty.clear();
    }

    /// Every domain's current document, in configured order
    pub async fn snapshot(&self) -> Vec<ContentUpdate> {
        let inner = self.inner.read().await;
        inner
            .slugs
            .iter()
            .filter_map(|slug| {
                inner.documents.get(slug).map(|content| ContentUpdate {
                    slug: slug.clone(),
                    content: content.clone(),
                })
            })
            .collect()
    }

    /// `(slug, dirty)` pairs in configured order, for the dashboard
    pub async fn overview(&self) -> Vec<(String, bool)> {
        let inner = self.inner.read().await;
        inner
            .slugs
            .iter()
            .map(|slug| (slug.clone(), inner.dirty.contains(slug)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_dir_reads_existing_and_defaults_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("about.json"),
            r#"{ "hero": { "title": "Hi" } }"#,
        )
        .unwrap();

        let store = ContentStore::load_dir(
            dir.path(),
            vec!["about".to_string(), "home".to_string()],
        )
        .unwrap();

        assert_eq!(
            store.get("about").await.unwrap()["hero"]["title"],
            "Hi"
        );
        assert_eq!(store.get("home").await.unwrap(), json!({}));
        assert!(!store.has_unsaved_changes().await);
    }

    #[tokio::test]
    async fn load_dir_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.json"), "{ not json").unwrap();
        assert!(ContentStore::load_dir(dir.path(), vec!["about".to_string()]).is_err());
    }

    #[tokio::test]
    async fn replace_marks_dirty_and_snapshot_keeps_order() {
        let store = ContentStore::new(vec!["home".to_string(), "about".to_string()]);
        assert!(store.replace("about", json!({ "x": 1 })).await);
        assert!(!store.replace("blog", json!({})).await);
        assert!(store.is_dirty("about").await);
        assert!(!store.is_dirty("home").await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].slug, "home");
        assert_eq!(snapshot[1].slug, "about");
        assert_eq!(snapshot[1].content, json!({ "x": 1 }));

        store.clear_dirty().await;
        assert!(!store.has_unsaved_changes().await);
    }
}
