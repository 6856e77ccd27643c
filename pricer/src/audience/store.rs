use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::audience::{Platform, SocialAccountSnapshot};
use crate::error::Result;
use crate::storage::{read_json, write_json};

type AccountsByUser = BTreeMap<String, Vec<SocialAccountSnapshot>>;

/// Connected accounts per user, persisted as a single JSON document.
///
/// Mutations are written to disk before they become visible in memory, so a
/// failed write leaves the store as it was.
pub struct AccountStore {
    path: PathBuf,
    accounts: RwLock<AccountsByUser>,
}

impl AccountStore {
    pub async fn load(path: PathBuf) -> Result<Self> {
        let accounts = read_json(&path, "accounts").await?;
        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
        })
    }

    pub async fn users(&self) -> Vec<String> {
        let guard = self.accounts.read().await;
        guard.keys().cloned().collect()
    }

    pub async fn accounts(&self, user_id: &str) -> Vec<SocialAccountSnapshot> {
        let guard = self.accounts.read().await;
        guard.get(user_id).cloned().unwrap_or_default()
    }

    /// Stores `snapshot`, replacing any earlier snapshot of the same platform
    /// for this user. Returns the user's accounts after the update.
    pub async fn upsert(
        &self,
        user_id: &str,
        snapshot: SocialAccountSnapshot,
    ) -> Result<Vec<SocialAccountSnapshot>> {
        snapshot.validate()?;
        let mut guard = self.accounts.write().await;
        let mut updated = guard.clone();
        let accounts = updated.entry(user_id.to_string()).or_default();
        accounts.retain(|existing| existing.platform != snapshot.platform);
        accounts.push(snapshot);
        accounts.sort_by_key(|account| account.platform);
        let user_accounts = accounts.clone();

        write_json(&self.path, &updated, "accounts").await?;
        *guard = updated;
        Ok(user_accounts)
    }

    pub async fn remove(&self, user_id: &str, platform: Platform) -> Result<bool> {
        let mut guard = self.accounts.write().await;
        let Some(existing) = guard.get(user_id) else {
            return Ok(false);
        };
        let remaining: Vec<SocialAccountSnapshot> = existing
            .iter()
            .filter(|account| account.platform != platform)
            .cloned()
            .collect();
        if remaining.len() == existing.len() {
            return Ok(false);
        }

        let mut updated = guard.clone();
        if remaining.is_empty() {
            updated.remove(user_id);
        } else {
            updated.insert(user_id.to_string(), remaining);
        }
        write_json(&self.path, &updated, "accounts").await?;
        *guard = updated;
        Ok(true)
    }
}
