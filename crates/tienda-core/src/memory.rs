//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::Result;
use crate::session::CredentialKey;
use crate::traits::CredentialStore;

/// A credential store that lives for the process only.
///
/// Every multi-key operation runs under a single lock acquisition, so
/// readers always see whole writes.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: impl IntoIterator<Item = (CredentialKey, String)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Number of keys currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn get_many(&self, keys: &[CredentialKey]) -> Result<Vec<Option<String>>> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
    }

    async fn set_many(&self, new_entries: &[(CredentialKey, String)]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for (key, value) in new_entries {
            entries.insert(*key, value.clone());
        }
        debug!(keys = new_entries.len(), "stored credentials");
        Ok(())
    }

    async fn remove_many(&self, keys: &[CredentialKey]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        debug!(keys = keys.len(), "removed credentials");
        Ok(())
    }
}
