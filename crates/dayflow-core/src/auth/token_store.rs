use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed storage key the credential lives under within an origin
pub const STORAGE_KEY: &str = "dayflow_token";

/// Application name used for cache directory paths
const APP_NAME: &str = "dayflow-hrms";

/// Opaque bearer token. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for building the authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Durable storage for the single bearer credential of an origin.
///
/// Only the session manager writes or clears a store; the API client reads it.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<Credential>>;
    fn set(&self, credential: &Credential) -> Result<()>;
    /// Remove the credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// `scheme://host[:port]` of a base URL, lowercased
pub fn origin_of(url: &str) -> String {
    let url = url.trim();
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", url),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    format!("{}://{}", scheme, authority).to_lowercase()
}

/// Filesystem-safe form of an origin
fn origin_slug(origin: &str) -> String {
    origin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ============================================================================
// File store
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    stored_at: DateTime<Utc>,
}

/// Credential persisted as JSON in the cache directory, one file per origin
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store rooted at `base_dir`, scoped to `origin`
    pub fn for_origin(base_dir: &Path, origin: &str) -> Self {
        Self::new(
            base_dir
                .join(origin_slug(&origin_of(origin)))
                .join(format!("{}.json", STORAGE_KEY)),
        )
    }

    /// Store under the platform cache directory, scoped to `origin`
    pub fn in_cache_dir(origin: &str) -> Result<Self> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(Self::for_origin(&cache_dir.join(APP_NAME), origin))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read credential file")?;
        let stored: StoredCredential =
            serde_json::from_str(&contents).context("Failed to parse credential file")?;

        debug!(
            age_minutes = (Utc::now() - stored.stored_at).num_minutes(),
            "Loaded stored credential"
        );
        Ok(Some(Credential::new(stored.token)))
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create credential directory")?;
        }
        let stored = StoredCredential {
            token: credential.expose().to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents).context("Failed to write credential file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict credential file permissions")?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential file"),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            credential: Mutex::new(Some(Credential::new(token))),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<Credential>>> {
        self.credential
            .lock()
            .map_err(|_| anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<Credential>> {
        Ok(self.slot()?.clone())
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        *self.slot()? = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(origin_of("http://localhost:5000/api"), "http://localhost:5000");
        assert_eq!(origin_of("HTTPS://HR.Example.com/"), "https://hr.example.com");
        assert_eq!(origin_of("https://hr.example.com?x=1"), "https://hr.example.com");
        assert_eq!(origin_of("localhost:5000/api"), "http://localhost:5000");
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::for_origin(dir.path(), "http://localhost:5000/api");

        assert!(store.get().unwrap().is_none());

        store.set(&Credential::new("tok-1")).unwrap();
        assert_eq!(store.get().unwrap(), Some(Credential::new("tok-1")));

        store.set(&Credential::new("tok-2")).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "tok-2");

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_is_scoped_by_origin() {
        let dir = TempDir::new().unwrap();
        let a = FileTokenStore::for_origin(dir.path(), "http://localhost:5000/api");
        let same_origin = FileTokenStore::for_origin(dir.path(), "http://localhost:5000/other");
        let b = FileTokenStore::for_origin(dir.path(), "https://hr.example.com");

        a.set(&Credential::new("local")).unwrap();
        assert_eq!(same_origin.get().unwrap().unwrap().expose(), "local");
        assert!(b.get().unwrap().is_none());
        assert!(a.path().ends_with("dayflow_token.json"));
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.get().is_err());
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryTokenStore::new();
        assert!(store.get().unwrap().is_none());
        store.set(&Credential::new("abc")).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "abc");
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }
}
