//! Persisted session stores
//!
//! A store holds one opaque blob: the serialized session record. The session
//! manager decides what is well-formed; stores only move bytes.

use crate::error::{CoachError, Result};
use sled::Db;
use std::path::Path;
use std::sync::Mutex;

/// Key under which the session record is stored
pub const SESSION_KEY: &str = "session";

/// Key/value storage for the session blob
pub trait SessionStore: Send + Sync {
    /// Reads the stored blob, if any
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store cannot be read
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Replaces the stored blob
    ///
    /// # Errors
    ///
    /// Returns error if the write fails
    fn save(&self, blob: &[u8]) -> Result<()>;

    /// Removes the stored blob; removing nothing is not an error
    ///
    /// # Errors
    ///
    /// Returns error if the removal fails
    fn clear(&self) -> Result<()>;
}

/// Session store backed by an embedded `sled` database
///
/// # Examples
///
/// ```
/// use coachkit::session::{SessionStore, SledSessionStore};
///
/// # fn main() -> coachkit::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let store = SledSessionStore::open(dir.path().join("session.db"))?;
/// store.save(b"{}")?;
/// assert_eq!(store.load()?, Some(b"{}".to_vec()));
/// # Ok(())
/// # }
/// ```
pub struct SledSessionStore {
    db: Db,
}

impl SledSessionStore {
    /// Opens or creates the database at `path`
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| CoachError::Storage(format!("Failed to open session database: {}", e)))?;
        Ok(Self { db })
    }
}

impl SessionStore for SledSessionStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(SESSION_KEY)
            .map_err(|e| CoachError::Storage(format!("Get failed: {}", e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn save(&self, blob: &[u8]) -> Result<()> {
        self.db
            .insert(SESSION_KEY, blob)
            .map_err(|e| CoachError::Storage(format!("Insert failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| CoachError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.db
            .remove(SESSION_KEY)
            .map_err(|e| CoachError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| CoachError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

/// In-memory session store for tests and ephemeral hosts
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemorySessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `blob`
    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Vec<u8>>>> {
        self.blob
            .lock()
            .map_err(|_| CoachError::Storage("Session store lock poisoned".to_string()).into())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, blob: &[u8]) -> Result<()> {
        *self.lock()? = Some(blob.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
