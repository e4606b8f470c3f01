use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::domain::{normalize_key, now_millis, InstagramUnlock, ManualRequest, Subscription, UnlockDocument};
use super::UnlockStore;
use crate::errors::ServiceError;
use crate::storage::json_document_store::JsonDocumentStore;

/// File-backed unlock store.
/// Keeps the whole `UnlockDocument` in one pretty-printed JSON file.
pub struct FileUnlockStore {
    doc: JsonDocumentStore<UnlockDocument>,
}

impl FileUnlockStore {
    /// Bind to `path` and make sure the document exists.
    /// A corrupt existing document is reported but left in place.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = Self { doc: JsonDocumentStore::new(path) };
        store.doc.initialize().await?;
        if let Err(e) = store.doc.try_read().await {
            warn!(error = %e, "unlock document unreadable; serving empty state until the next write");
        }
        info!(path = %store.doc.path().display(), "unlock store ready");
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &std::path::Path {
        self.doc.path()
    }
}

fn require(raw: &str, field: &str) -> Result<String, ServiceError> {
    normalize_key(raw).ok_or_else(|| ServiceError::required(field))
}

#[async_trait]
impl UnlockStore for FileUnlockStore {
    async fn initialize(&self) -> Result<(), ServiceError> {
        self.doc.initialize().await
    }

    async fn load(&self) -> UnlockDocument {
        self.doc.read().await
    }

    async fn save(&self, doc: &UnlockDocument) -> Result<(), ServiceError> {
        self.doc.write(doc).await
    }

    async fn mark_instagram_unlocked(&self, handle: &str, meta: Value) -> Result<(), ServiceError> {
        let key = require(handle, "instagram_handle")?;
        self.doc
            .update(|d| {
                d.instagram.insert(key.clone(), InstagramUnlock { unlocked: true, meta, at: now_millis() });
                Ok(())
            })
            .await?;
        debug!(handle = %key, "instagram handle unlocked");
        Ok(())
    }

    async fn mark_subscribed(&self, email: &str, details: Value) -> Result<(), ServiceError> {
        let key = require(email, "email")?;
        self.doc
            .update(|d| {
                d.lemonsqueezy.insert(key.clone(), Subscription { subscribed: true, details, at: now_millis() });
                Ok(())
            })
            .await?;
        debug!(email = %key, "subscription recorded");
        Ok(())
    }

    async fn is_instagram_unlocked(&self, handle: &str) -> bool {
        match normalize_key(handle) {
            Some(key) => self.doc.read().await.is_instagram_unlocked(&key),
            None => false,
        }
    }

    async fn is_subscribed(&self, email: &str) -> bool {
        match normalize_key(email) {
            Some(key) => self.doc.read().await.is_subscribed(&key),
            None => false,
        }
    }

    async fn enqueue_manual_request(&self, handle: &str, proof: &str) -> Result<ManualRequest, ServiceError> {
        let handle = require(handle, "instagram_handle")?;
        let req = ManualRequest {
            handle,
            proof: proof.trim().to_string(),
            at: now_millis(),
            processed: false,
            processed_at: None,
        };
        let queued = req.clone();
        self.doc
            .update(move |d| {
                d.manual_requests.push(queued);
                Ok(())
            })
            .await?;
        Ok(req)
    }

    async fn list_manual_requests(&self) -> Vec<ManualRequest> {
        self.doc.read().await.manual_requests
    }

    async fn approve_manual_request(&self, handle: &str) -> Result<usize, ServiceError> {
        let key = require(handle, "instagram_handle")?;
        let marked = self
            .doc
            .update(|d| {
                let at = now_millis();
                d.instagram.insert(
                    key.clone(),
                    InstagramUnlock { unlocked: true, meta: json!({"method": "manual"}), at },
                );
                Ok(d.mark_requests_processed(&key, at))
            })
            .await?;
        info!(handle = %key, marked, "manual unlock approved");
        Ok(marked)
    }
}
