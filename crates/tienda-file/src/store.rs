//! JSON file storage for session credentials.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use tienda_core::error::{Error, StoreError};
use tienda_core::{CredentialKey, CredentialStore, Result};

fn map_io(err: std::io::Error) -> Error {
    Error::Store(StoreError::Unavailable {
        message: format!("IO error: {}", err),
    })
}

/// On-disk document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// Credential store persisted to a single JSON file.
///
/// Each multi-key write re-reads the file under an exclusive lock, applies
/// the change and replaces the whole file through a temporary file and a
/// rename, so a reader (in this process or another) sees either the old set
/// of keys or the new one. Reads are served from the state as of the last
/// open or write. The file is created with mode 0600 on Unix.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<HashMap<CredentialKey, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, loading any credentials already saved there.
    ///
    /// A missing file is an empty store. Unknown keys in the file are ignored.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path)?;
        debug!(path = %path.display(), keys = entries.len(), "opened credential file");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn load(path: &Path) -> Result<HashMap<CredentialKey, String>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(map_io(e)),
        };

        let stored: StoredCredentials = serde_json::from_str(&content).map_err(|e| {
            Error::Store(StoreError::Corrupt {
                message: format!("{}: {}", path.display(), e),
            })
        })?;

        let mut entries = HashMap::new();
        for (name, value) in stored.entries {
            match CredentialKey::from_name(&name) {
                Some(key) => {
                    entries.insert(key, value);
                }
                None => warn!(key = %name, "ignoring unknown credential key"),
            }
        }
        Ok(entries)
    }

    /// Apply `change` to the entries on disk and write the result back.
    ///
    /// The file is re-read under the exclusive lock, so a change made by
    /// another process since this store was opened is kept. Returns the
    /// entries as written.
    fn update(
        &self,
        change: impl FnOnce(&mut HashMap<CredentialKey, String>),
    ) -> Result<HashMap<CredentialKey, String>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io)?;
        lock_file.lock_exclusive().map_err(map_io)?;

        let result = Self::load(&self.path).and_then(|mut entries| {
            change(&mut entries);
            self.write_atomically(&entries)?;
            Ok(entries)
        });

        if let Err(e) = FileExt::unlock(&lock_file) {
            warn!(error = %e, "failed to release credential file lock");
        }
        result
    }

    fn write_atomically(&self, entries: &HashMap<CredentialKey, String>) -> Result<()> {
        let stored = StoredCredentials {
            entries: entries
                .iter()
                .map(|(key, value)| (key.as_str().to_string(), value.clone()))
                .collect(),
            updated_at: Some(Utc::now().to_rfc3339()),
        };
        let content = serde_json::to_string_pretty(&stored).map_err(|e| {
            Error::Store(StoreError::Unavailable {
                message: format!("failed to serialize credentials: {}", e),
            })
        })?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("credentials.json");
        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written = Self::write_private(&temp_path, content.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(map_io(e));
        }

        debug!(path = %self.path.display(), keys = entries.len(), "wrote credential file");
        Ok(())
    }

    fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file: File = options.open(path)?;
        file.write_all(content)?;
        file.sync_all()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn get_many(&self, keys: &[CredentialKey]) -> Result<Vec<Option<String>>> {
        let entries = self.entries.lock().await;
        Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
    }

    #[instrument(skip_all, fields(count = new_entries.len()))]
    async fn set_many(&self, new_entries: &[(CredentialKey, String)]) -> Result<()> {
        let mut entries = self.entries.lock().await;

        *entries = self.update(|current| {
            for (key, value) in new_entries {
                current.insert(*key, value.clone());
            }
        })?;
        Ok(())
    }

    #[instrument(skip_all, fields(count = keys.len()))]
    async fn remove_many(&self, keys: &[CredentialKey]) -> Result<()> {
        let mut entries = self.entries.lock().await;

        *entries = self.update(|current| {
            for key in keys {
                current.remove(key);
            }
        })?;
        Ok(())
    }
}
