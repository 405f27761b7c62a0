//! Durable secret storage for backend credentials
//!
//! Secrets are independent key -> string entries with no listing API; the
//! credential layer knows which keys exist. The default store writes one
//! file per key under ~/.local/share/wingman/secrets/ with 0600 permissions
//! (owner read/write only).

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Key under which the chosen provider name is stored.
pub const PROVIDER_KEY: &str = "provider";

/// Key under which the chosen model identifier is stored.
pub const MODEL_KEY: &str = "model";

/// Key under which the API key for `provider` is stored.
///
/// Parameterized by the provider, so switching providers orphans the old
/// provider's key in the store rather than overwriting it.
pub fn api_key_key(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase())
}

/// Durable key -> string storage consumed by the credential layer.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read a secret, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a secret (last write wins).
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a secret; deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// File-backed secret store, one file per key.
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    /// Open the store at the default platform data directory.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .context("Failed to determine data directory")?;

        Self::open(data_dir.join("wingman").join("secrets"))
    }

    /// Open the store at an explicit directory (used by tests).
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir).context("Failed to create secrets directory")?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.secret", key))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path).context("Failed to read secret file")?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);

        // Write to temp file first, then rename (atomic)
        let temp_path = path.with_extension("secret.tmp");
        std::fs::write(&temp_path, value).context("Failed to write temp secret file")?;

        // Set secure permissions (0600 = owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, perms)
                .context("Failed to set secret file permissions")?;
        }

        std::fs::rename(&temp_path, &path).context("Failed to save secret file")?;
        tracing::debug!("Stored secret '{}'", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to delete secret file")?;
            tracing::info!("Deleted secret '{}'", key);
        }
        Ok(())
    }
}

/// In-memory secret store for tests.
pub struct MemorySecretStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_key_is_provider_scoped() {
        assert_eq!(api_key_key("google"), "GOOGLE_API_KEY");
        assert_eq!(api_key_key("ollama"), "OLLAMA_API_KEY");
    }

    #[tokio::test]
    async fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(store.get("provider").await.unwrap(), None);
        store.set("provider", "google").await.unwrap();
        assert_eq!(
            store.get("provider").await.unwrap(),
            Some("google".to_string())
        );

        // Last write wins
        store.set("provider", "ollama").await.unwrap();
        assert_eq!(
            store.get("provider").await.unwrap(),
            Some("ollama".to_string())
        );

        store.delete("provider").await.unwrap();
        assert_eq!(store.get("provider").await.unwrap(), None);
        // Deleting again is not an error
        store.delete("provider").await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_store_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSecretStore::open(dir.path().to_path_buf()).unwrap();
        store.set("GOOGLE_API_KEY", "sk-test").await.unwrap();

        let path = dir.path().join("GOOGLE_API_KEY.secret");
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
