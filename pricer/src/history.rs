use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use socioprice::storage::{read_json, write_json};
use socioprice::{PricingRecommendation, PricingRequest, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
    pub request: PricingRequest,
    pub recommendation: PricingRecommendation,
}

static ENTRY_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn new_entry_id(fingerprint: &str) -> String {
    let counter = ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed);
    let short = fingerprint.get(..8).unwrap_or(fingerprint);
    format!("rec-{}-{}-{}", Utc::now().timestamp_millis(), short, counter)
}

/// Past recommendations, newest first. Changes reach memory only after
/// they are on disk.
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub async fn load(path: PathBuf, limit: usize) -> Result<Self> {
        let entries = read_json(&path, "history").await?;
        Ok(Self {
            path,
            limit: limit.max(1),
            entries: Mutex::new(entries),
        })
    }

    pub async fn list(&self) -> Vec<HistoryEntry> {
        let guard = self.entries.lock().await;
        guard.clone()
    }

    pub async fn get(&self, entry_id: &str) -> Option<HistoryEntry> {
        let guard = self.entries.lock().await;
        guard.iter().find(|entry| entry.id == entry_id).cloned()
    }

    pub async fn add(&self, entry: HistoryEntry) -> Result<HistoryEntry> {
        let mut guard = self.entries.lock().await;
        let mut updated = Vec::with_capacity(self.limit);
        updated.push(entry.clone());
        updated.extend(guard.iter().take(self.limit - 1).cloned());

        write_json(&self.path, &updated, "history").await?;
        *guard = updated;
        Ok(entry)
    }

    pub async fn delete(&self, entry_id: &str) -> Result<bool> {
        let mut guard = self.entries.lock().await;
        let updated: Vec<HistoryEntry> = guard
            .iter()
            .filter(|entry| entry.id != entry_id)
            .cloned()
            .collect();
        if updated.len() == guard.len() {
            return Ok(false);
        }

        write_json(&self.path, &updated, "history").await?;
        *guard = updated;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socioprice::config::PricingConfig;
    use socioprice::recommend_with_config;

    fn entry(id: &str) -> HistoryEntry {
        let request = PricingRequest::new("Guide", "ebook");
        let recommendation =
            recommend_with_config(&request, &[], &PricingConfig::default()).unwrap();
        HistoryEntry {
            id: id.to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            fingerprint: "abc".to_string(),
            request,
            recommendation,
        }
    }

    #[tokio::test]
    async fn add_keeps_newest_first_and_caps_length() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(dir.path().join("history.json"), 2)
            .await
            .unwrap();

        store.add(entry("one")).await.unwrap();
        store.add(entry("two")).await.unwrap();
        store.add(entry("three")).await.unwrap();

        let ids: Vec<String> = store.list().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["three", "two"]);
    }

    #[tokio::test]
    async fn entries_survive_reload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/history.json");
        {
            let store = HistoryStore::load(path.clone(), 10).await.unwrap();
            store.add(entry("keep")).await.unwrap();
            store.add(entry("drop")).await.unwrap();
        }

        let store = HistoryStore::load(path, 10).await.unwrap();
        assert!(store.get("keep").await.is_some());
        assert!(store.delete("drop").await.unwrap());
        assert!(!store.delete("drop").await.unwrap());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_write_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = HistoryStore::load(blocker.join("history.json"), 10)
            .await
            .unwrap();

        assert!(store.add(entry("lost")).await.is_err());
        assert!(store.list().await.is_empty());
        assert!(store.get("lost").await.is_none());
    }
}
