//! Durable token persistence.
//!
//! The persisted auth token is the single durable piece of client state;
//! everything else is in-memory and rebuilt from the backend on startup.
//! The [`TokenStore`] trait is the seam: production code uses
//! [`FileTokenStore`], tests use [`MemoryTokenStore`].

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Errors from the durable token store.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable storage for the single auth token.
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> Result<Option<String>, TokenStoreError>;

    /// Persist the token, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the persisted token. Removing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// File-backed token store.
///
/// Stores the bare token string in a single file, created with the
/// process's default permissions.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_owned()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        use std::io::Write;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // The token is a credential at rest; keep the file owner-only.
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(token.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory token store for tests.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("haberdash-token-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = temp_token_path("round-trip");
        let store = FileTokenStore::new(&path);

        assert!(store.load().unwrap().is_none());

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let path = temp_token_path("clear-idempotent");
        let store = FileTokenStore::new(&path);
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_ignores_surrounding_whitespace() {
        let path = temp_token_path("whitespace");
        std::fs::write(&path, "  tok-1\n").unwrap();
        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_writes_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_token_path("owner-only");
        let store = FileTokenStore::new(&path);
        store.save("abc123").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("seed");
        assert_eq!(store.load().unwrap().as_deref(), Some("seed"));
        store.save("next").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("next"));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
