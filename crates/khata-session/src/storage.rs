//! Durable storage for the session record.
//!
//! One logical key-value slot holding the serialized current agent:
//! present means logged in, absent means logged out.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use khata_core::constants::AGENT_SESSION_FILE;
use khata_core::models::Agent;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Session storage errors
#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid session record: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for session storage operations
pub type SessionStorageResult<T> = Result<T, SessionStorageError>;

/// Storage abstraction for the current agent record.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the stored agent, if any.
    async fn load(&self) -> SessionStorageResult<Option<Agent>>;

    /// Replace the stored agent.
    async fn save(&self, agent: &Agent) -> SessionStorageResult<()>;

    /// Remove the stored agent. Removing an absent record is not an error.
    async fn clear(&self) -> SessionStorageResult<()>;
}

/// File-backed session storage: one JSON document in a data directory.
#[derive(Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Create storage rooted at `data_dir`, creating the directory if
    /// needed.
    pub async fn new(data_dir: impl Into<PathBuf>) -> SessionStorageResult<Self> {
        let dir = data_dir.into();

        fs::create_dir_all(&dir).await.map_err(|e| {
            SessionStorageError::ConfigError(format!(
                "Failed to create data directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(FileSessionStorage {
            path: dir.join(AGENT_SESSION_FILE),
        })
    }

    /// Path of the session record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> SessionStorageResult<Option<Agent>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(None);
        }

        let data = fs::read(&self.path).await.map_err(|e| {
            SessionStorageError::ReadFailed(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let agent = serde_json::from_slice(&data)?;
        Ok(Some(agent))
    }

    async fn save(&self, agent: &Agent) -> SessionStorageResult<()> {
        let data = serde_json::to_vec(agent)?;

        let mut file = fs::File::create(&self.path).await.map_err(|e| {
            SessionStorageError::WriteFailed(format!(
                "Failed to create {}: {}",
                self.path.display(),
                e
            ))
        })?;

        file.write_all(&data).await.map_err(|e| {
            SessionStorageError::WriteFailed(format!(
                "Failed to write {}: {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            SessionStorageError::WriteFailed(format!(
                "Failed to sync {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "session record written");

        Ok(())
    }

    async fn clear(&self) -> SessionStorageResult<()> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&self.path).await.map_err(|e| {
            SessionStorageError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), "session record deleted");

        Ok(())
    }
}

/// In-memory session storage for tests and embedders that manage their
/// own persistence.
#[derive(Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<Agent>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> SessionStorageResult<Option<Agent>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn save(&self, agent: &Agent) -> SessionStorageResult<()> {
        *self.slot.lock().unwrap() = Some(agent.clone());
        Ok(())
    }

    async fn clear(&self) -> SessionStorageResult<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}
