//! Preference Storage
//!
//! Local preferences stored as a JSON file. File I/O goes through
//! `spawn_blocking` to keep the async runtime unblocked. Everything here is
//! best-effort: a missing or corrupt file reads as defaults.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted local preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Display name used on the last successful join.
    pub display_name: Option<String>,
}

/// JSON-file-backed preference store.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load preferences, falling back to defaults on any failure.
    pub async fn load(&self) -> Preferences {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || std::fs::read_to_string(path)).await;

        match result {
            Ok(Ok(contents)) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                debug!(error = %e, "Corrupt preference file, using defaults");
                Preferences::default()
            }),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => Preferences::default(),
            Ok(Err(e)) => {
                debug!(error = %e, "Failed to read preferences, using defaults");
                Preferences::default()
            }
            Err(e) => {
                debug!(error = %e, "Preference read task failed, using defaults");
                Preferences::default()
            }
        }
    }

    /// The display name from the last successful join, if any.
    pub async fn last_display_name(&self) -> Option<String> {
        self.load().await.display_name
    }

    /// Persist the display name used for a successful join.
    pub async fn remember_display_name(&self, display_name: &str) -> std::io::Result<()> {
        let mut preferences = self.load().await;
        preferences.display_name = Some(display_name.to_owned());
        self.save(preferences).await
    }

    async fn save(&self, preferences: Preferences) -> std::io::Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&preferences).map_err(std::io::Error::other)?;
            std::fs::write(path, json)
        })
        .await
        .map_err(std::io::Error::other)?
    }
}

#[cfg(test)]
mod tests {
    use super::PreferenceStore;

    #[tokio::test]
    async fn display_name_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PreferenceStore::new(dir.path().join("preferences.json"));

        assert_eq!(store.last_display_name().await, None);

        store
            .remember_display_name("alice")
            .await
            .expect("remember");
        assert_eq!(store.last_display_name().await, Some("alice".into()));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").expect("write");

        let store = PreferenceStore::new(path);
        assert_eq!(store.last_display_name().await, None);
    }
}
