//! Durable storage backends for the session record

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::UserSession;
use crate::error::Error;

/// Persists at most one [`UserSession`].
///
/// Implementations report failures; [`super::SessionContext`] decides how to
/// degrade.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored session, `Ok(None)` if nothing is stored
    async fn load(&self) -> Result<Option<UserSession>, Error>;

    /// Overwrite the stored session
    async fn save(&self, session: &UserSession) -> Result<(), Error>;

    /// Remove the stored session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), Error>;
}

/// Stores the session as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: Option<PathBuf>,
}

impl FileSessionStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Create a store with no backing location.
    ///
    /// Loads fail, which callers treat as "nobody is logged in".
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    /// Create a store from an optional location
    pub fn from_path(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// The file this store writes to, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn require_path(&self) -> Result<&Path, Error> {
        self.path
            .as_deref()
            .ok_or_else(|| Error::storage("no session location available"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<UserSession>, Error> {
        let path = self.require_path()?;

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let session = serde_json::from_slice::<UserSession>(&data)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &UserSession) -> Result<(), Error> {
        let path = self.require_path()?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so readers never see a torn file.
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&tmp, data).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let path = self.require_path()?;

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keeps the serialized session in memory. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: RwLock<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with raw (possibly invalid) serialized data
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: RwLock::new(Some(raw.to_string())),
        }
    }

    /// The raw serialized record, if any
    pub fn raw(&self) -> Option<String> {
        self.raw.read().ok().and_then(|raw| raw.clone())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<UserSession>, Error> {
        let raw = self
            .raw
            .read()
            .map_err(|_| Error::storage("session lock poisoned"))?
            .clone();

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &UserSession) -> Result<(), Error> {
        let raw = serde_json::to_string(session)?;
        let mut guard = self
            .raw
            .write()
            .map_err(|_| Error::storage("session lock poisoned"))?;
        *guard = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        let mut guard = self
            .raw
            .write()
            .map_err(|_| Error::storage("session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        assert!(store.load().await.unwrap().is_none());

        let session = UserSession::new("ana", "tok123");
        store.save(&session).await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_uses_camel_case_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store.save(&UserSession::new("ana", "tok123")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["username"], "ana");
        assert_eq!(raw["accessToken"], "tok123");
        assert!(raw.get("refreshToken").is_none());
    }

    #[tokio::test]
    async fn test_file_store_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.load().await, Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = FileSessionStore::unavailable();
        assert!(store.path().is_none());
        assert!(matches!(store.load().await, Err(Error::Storage(_))));
        assert!(store.save(&UserSession::new("ana", "t")).await.is_err());
    }

    #[test]
    fn test_memory_store() {
        tokio_test::block_on(async {
            let store = MemorySessionStore::new();
            assert!(store.load().await.unwrap().is_none());

            store.save(&UserSession::new("ana", "tok")).await.unwrap();
            assert!(store.raw().unwrap().contains("\"accessToken\":\"tok\""));

            store.clear().await.unwrap();
            assert!(store.raw().is_none());

            let broken = MemorySessionStore::with_raw("nope");
            assert!(broken.load().await.is_err());
        });
    }
}
