//! Settings persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::errors::VeilResult;

use super::Settings;

/// Asynchronous settings storage. Absence is not an error: loads fall back
/// to the built-in defaults.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> VeilResult<Settings>;
    async fn save(&self, settings: &Settings) -> VeilResult<()>;
}

/// JSON file store under the user's home directory.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default location, `~/.veil/settings.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".veil")
            .join("settings.json")
    }

    pub fn default_store() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn load(&self) -> VeilResult<Settings> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::built_in());
            }
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                // A corrupt file should not break masking.
                warn!(path = %self.path.display(), error = %err, "unreadable settings, using defaults");
                Ok(Settings::built_in())
            }
        }
    }

    async fn save(&self, settings: &Settings) -> VeilResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> VeilResult<Settings> {
        Ok(self
            .inner
            .lock()
            .await
            .clone()
            .unwrap_or_else(Settings::built_in))
    }

    async fn save(&self, settings: &Settings) -> VeilResult<()> {
        *self.inner.lock().await = Some(settings.clone());
        Ok(())
    }
}
