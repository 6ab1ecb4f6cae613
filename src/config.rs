//! Shell configuration.
//!
//! Loaded from a YAML file when one is present; every field has a default so
//! a missing file or empty document is not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_history_limit() -> usize {
    1000
}

fn default_max_suggestions() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Retained history entries; oldest are evicted past this cap.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Maximum candidate command lines shown for an ambiguous phrase.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Override for the persisted history file location.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            max_suggestions: default_max_suggestions(),
            history_file: None,
        }
    }
}

impl Config {
    /// Load from a YAML file. A missing file yields the defaults; a present
    /// but malformed file is a startup error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config {}", path.display()));
            }
        };
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Resolved history file path, honoring the config override.
    pub fn history_path(&self, home: &Path) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| crate::history::HistoryStore::default_path(home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.history_limit, 1000);
        assert_eq!(config.max_suggestions, 3);
        assert!(config.history_file.is_none());
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = Config::load(Path::new("/nonexistent/nlshell.yaml")).unwrap();
        assert_eq!(config.history_limit, 1000);
    }

    #[test]
    fn test_partial_yaml() {
        let config: Config = serde_yaml::from_str("history_limit: 50\n").unwrap();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.max_suggestions, 3);
    }

    #[test]
    fn test_history_path_override() {
        let config = Config {
            history_file: Some(PathBuf::from("/tmp/custom_history")),
            ..Config::default()
        };
        assert_eq!(
            config.history_path(Path::new("/home/u")),
            PathBuf::from("/tmp/custom_history")
        );

        let config = Config::default();
        assert_eq!(
            config.history_path(Path::new("/home/u")),
            PathBuf::from("/home/u/.nlshell_history")
        );
    }
}
