use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Milliseconds since the Unix epoch, the timestamp unit of the document.
pub type EpochMillis = i64;

pub fn now_millis() -> EpochMillis {
    Utc::now().timestamp_millis()
}

/// Trim and lowercase a handle or email; `None` when nothing is left.
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    if key.is_empty() { None } else { Some(key) }
}

/// The whole persisted document.
///
/// Every section defaults to empty, so a file missing one of them still loads
/// and is written back with all three present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UnlockDocument {
    #[serde(default)]
    pub instagram: BTreeMap<String, InstagramUnlock>,
    #[serde(default)]
    pub lemonsqueezy: BTreeMap<String, Subscription>,
    #[serde(default, rename = "manualRequests")]
    pub manual_requests: Vec<ManualRequest>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InstagramUnlock {
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub at: EpochMillis,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    #[serde(default)]
    pub subscribed: bool,
    #[serde(default)]
    pub details: Value,
    #[serde(default)]
    pub at: EpochMillis,
}

/// A queued request from someone asking to be unlocked by hand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ManualRequest {
    pub handle: String,
    #[serde(default)]
    pub proof: String,
    #[serde(default)]
    pub at: EpochMillis,
    #[serde(default)]
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<EpochMillis>,
}

impl UnlockDocument {
    pub fn is_instagram_unlocked(&self, key: &str) -> bool {
        self.instagram.get(key).is_some_and(|e| e.unlocked)
    }

    pub fn is_subscribed(&self, key: &str) -> bool {
        self.lemonsqueezy.get(key).is_some_and(|e| e.subscribed)
    }

    /// Mark every queued request for `key` processed; returns how many matched.
    pub fn mark_requests_processed(&mut self, key: &str, at: EpochMillis) -> usize {
        let mut n = 0;
        for req in self.manual_requests.iter_mut().filter(|r| r.handle == key) {
            req.processed = true;
            req.processed_at = Some(at);
            n += 1;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_key_trims_and_lowercases() {
        assert_eq!(normalize_key("  Alice.B "), Some("alice.b".to_string()));
        assert_eq!(normalize_key("Bob@Example.COM"), Some("bob@example.com".to_string()));
        assert_eq!(normalize_key("   "), None);
        assert_eq!(normalize_key(""), None);
    }

    #[test]
    fn empty_document_has_all_sections() {
        let v = serde_json::to_value(UnlockDocument::default()).unwrap();
        assert_eq!(v, json!({"instagram": {}, "lemonsqueezy": {}, "manualRequests": []}));
    }

    #[test]
    fn partial_document_loads_with_defaults() {
        let doc: UnlockDocument = serde_json::from_value(json!({
            "instagram": {"carol": {"unlocked": true, "meta": {"method": "manual"}, "at": 1700000000000_i64}}
        }))
        .unwrap();
        assert!(doc.is_instagram_unlocked("carol"));
        assert!(doc.lemonsqueezy.is_empty());
        assert!(doc.manual_requests.is_empty());
    }

    #[test]
    fn processed_at_only_written_once_processed() {
        let req = ManualRequest { handle: "bob".into(), proof: "proof.png".into(), at: 1, processed: false, processed_at: None };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("processed_at").is_none());

        let mut doc = UnlockDocument { manual_requests: vec![req], ..Default::default() };
        assert_eq!(doc.mark_requests_processed("bob", 42), 1);
        let v = serde_json::to_value(&doc.manual_requests[0]).unwrap();
        assert_eq!(v["processed_at"], 42);
        assert_eq!(v["processed"], true);
    }

    #[test]
    fn flags_must_be_true_to_count() {
        let doc: UnlockDocument = serde_json::from_value(json!({
            "instagram": {"dan": {"unlocked": false, "meta": null, "at": 0}},
            "lemonsqueezy": {"e@x.io": {"subscribed": false, "details": {}, "at": 0}},
            "manualRequests": []
        }))
        .unwrap();
        assert!(!doc.is_instagram_unlocked("dan"));
        assert!(!doc.is_subscribed("e@x.io"));
    }
}
