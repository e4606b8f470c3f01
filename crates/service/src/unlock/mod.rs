//! Unlock and subscription tracking.
//!
//! Handles and emails are case-insensitive identities: every operation trims
//! and lowercases its key before touching the document.

pub mod domain;
pub mod file_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ServiceError;
pub use domain::{InstagramUnlock, ManualRequest, Subscription, UnlockDocument};
pub use file_store::FileUnlockStore;

/// Store abstraction consumed by the HTTP layer.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait UnlockStore: Send + Sync {
    /// Create the backing document if it does not exist yet. Idempotent.
    async fn initialize(&self) -> Result<(), ServiceError>;
    /// Whole document; unreadable content yields an empty one.
    async fn load(&self) -> UnlockDocument;
    /// Replace the whole document.
    async fn save(&self, doc: &UnlockDocument) -> Result<(), ServiceError>;

    async fn mark_instagram_unlocked(&self, handle: &str, meta: Value) -> Result<(), ServiceError>;
    async fn mark_subscribed(&self, email: &str, details: Value) -> Result<(), ServiceError>;
    async fn is_instagram_unlocked(&self, handle: &str) -> bool;
    async fn is_subscribed(&self, email: &str) -> bool;

    /// Append a request to the queue. Repeated requests are all kept.
    async fn enqueue_manual_request(&self, handle: &str, proof: &str) -> Result<ManualRequest, ServiceError>;
    async fn list_manual_requests(&self) -> Vec<ManualRequest>;
    /// Unlock `handle` and mark all of its queued requests processed.
    /// Returns the number of queue entries that matched.
    async fn approve_manual_request(&self, handle: &str) -> Result<usize, ServiceError>;
}
