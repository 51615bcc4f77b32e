//! Filter history for completion
//!
//! Previously used filter strings, kept in insertion order and rewritten to a
//! small TOML file after every accepted entry.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::HistoryError;

/// On-disk shape: `history = ["..", ".."]`
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    history: Vec<String>,
}

/// Ordered list of previously used filter strings
#[derive(Debug, Clone)]
pub struct FilterHistory {
    path: Option<PathBuf>,
    items: Vec<String>,
}

impl FilterHistory {
    /// History that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Vec::new(),
        }
    }

    /// Load from `path`. A missing or unreadable file yields an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match Self::read(&path) {
            Ok(items) => items,
            Err(HistoryError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!("no filter history at {}", path.display());
                Vec::new()
            }
            Err(err) => {
                warn!("ignoring filter history: {err}");
                Vec::new()
            }
        };

        Self {
            path: Some(path),
            items,
        }
    }

    fn read(path: &Path) -> Result<Vec<String>, HistoryError> {
        let content = fs::read_to_string(path).map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: HistoryFile = toml::from_str(&content)?;
        Ok(file.history)
    }

    /// Remember `text`. Empty strings and exact duplicates are ignored.
    ///
    /// Returns whether the history changed. Nothing is kept when the write
    /// fails, so a later call with the same text tries again.
    pub fn record(&mut self, text: &str) -> Result<bool, HistoryError> {
        if text.is_empty() || self.items.iter().any(|item| item == text) {
            return Ok(false);
        }
        self.items.push(text.to_string());
        if let Err(err) = self.save() {
            self.items.pop();
            return Err(err);
        }
        Ok(true)
    }

    /// Forget everything and persist the empty list
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.items.clear();
        self.save()
    }

    /// Entries starting with `prefix` (case-insensitive), in stored order
    pub fn completions(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let io_err = |source| HistoryError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string(&HistoryFile {
            history: self.items.clone(),
        })?;
        fs::write(path, content).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = FilterHistory::load(dir.path().join("nope.toml"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_record_skips_empty_and_duplicates() {
        let mut history = FilterHistory::in_memory();
        assert!(history.record("error").unwrap());
        assert!(!history.record("").unwrap());
        assert!(!history.record("error").unwrap());
        assert!(history.record("Error").unwrap());
        assert_eq!(history.items(), ["error", "Error"]);
    }

    #[test]
    fn test_record_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.toml");

        let mut history = FilterHistory::load(&path);
        history.record("timeout").unwrap();
        history.record("worker-\\d+").unwrap();

        let reloaded = FilterHistory::load(&path);
        assert_eq!(reloaded.items(), ["timeout", "worker-\\d+"]);
    }

    #[test]
    fn test_failed_save_is_retried() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("history.toml");

        let mut history = FilterHistory::load(&path);
        assert!(matches!(
            history.record("timeout"),
            Err(HistoryError::Io { .. })
        ));
        assert!(history.is_empty());

        fs::remove_file(&blocker).unwrap();
        assert!(history.record("timeout").unwrap());
        assert!(path.exists());
        assert_eq!(FilterHistory::load(&path).items(), ["timeout"]);
    }

    #[test]
    fn test_clear_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.toml");

        let mut history = FilterHistory::load(&path);
        history.record("a").unwrap();
        history.clear().unwrap();

        assert!(history.is_empty());
        assert!(FilterHistory::load(&path).is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.toml");
        fs::write(&path, "history = 42").unwrap();

        let history = FilterHistory::load(&path);
        assert!(history.is_empty());
    }

    #[test]
    fn test_completions_prefix_case_insensitive() {
        let mut history = FilterHistory::in_memory();
        for text in ["Timeout", "thread", "error", "TIMER"] {
            history.record(text).unwrap();
        }

        assert_eq!(history.completions("ti"), ["Timeout", "TIMER"]);
        assert_eq!(history.completions(""), ["Timeout", "thread", "error", "TIMER"]);
        assert!(history.completions("x").is_empty());
    }
}
