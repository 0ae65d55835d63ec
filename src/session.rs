use crate::models::SessionUser;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Fixed storage key of the session record.
pub const SESSION_KEY: &str = "user";

/// SessionError
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Io(#[from] io::Error),
    #[error("session record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

// 1. SessionStore Contract
/// SessionStore
///
/// Storage port for the single authenticated-user record. The router and the views
/// only ever see this trait, so tests can swap the file-backed store for the
/// in-memory one.
pub trait SessionStore: Send + Sync {
    /// The stored record, or `None` when nobody is logged in. Unreadable records
    /// count as absent.
    fn load(&self) -> Option<SessionUser>;

    fn save(&self, user: &SessionUser) -> Result<(), SessionError>;

    /// Removes the record. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;

    fn is_authenticated(&self) -> bool {
        self.load().is_some()
    }
}

/// SessionState
///
/// Shared handle to whichever `SessionStore` the application was built with.
pub type SessionState = Arc<dyn SessionStore>;

// 2. The Real Implementation (JSON file)
/// FileSessionStore
///
/// Persists the record as `<dir>/user.json` so a session survives restarts.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<SessionUser> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read session file {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("ignoring corrupt session file {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// 3. The In-Memory Implementation (For Unit Tests)
/// MemorySessionStore
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<SessionUser>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: SessionUser) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<SessionUser> {
        self.user.lock().clone()
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        *self.user.lock() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.user.lock().take();
        Ok(())
    }
}
