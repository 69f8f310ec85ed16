use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotopiaError, Result};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where the local document store keeps its collections
    pub data_dir: PathBuf,

    /// Directory backing the offline buffer
    pub buffer_dir: PathBuf,

    /// Identity stamped on documents by this installation
    pub user_uid: String,

    /// Email shown for the current identity
    pub user_email: String,

    /// Default editor command (falls back to $EDITOR, then platform)
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notopia");
        Config {
            data_dir: base.join("store"),
            buffer_dir: base.join("buffer"),
            user_uid: "local".to_string(),
            user_email: "local@notopia.app".to_string(),
            editor_command: None,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notopia")
            .join("config.json")
    }

    /// Loads the config from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persists the config to `path`, creating parent directories.
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Updates a single setting from a `key=value` string.
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            NotopiaError::ConfigError {
                message: format!("Expected key=value, got '{}'", assignment),
            }
        })?;

        match key.trim() {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "buffer_dir" => self.buffer_dir = PathBuf::from(value),
            "user_uid" => self.user_uid = value.to_string(),
            "user_email" => self.user_email = value.to_string(),
            "editor_command" => {
                self.editor_command = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            other => {
                return Err(NotopiaError::ConfigError {
                    message: format!("Unknown setting '{}'", other),
                })
            }
        }
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -t".to_string()
        } else {
            // Try common Linux editors
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_known_keys() {
        let mut config = Config::default();
        config.set("user_uid=abc123").unwrap();
        assert_eq!(config.user_uid, "abc123");
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let mut config = Config::default();
        assert!(config.set("bogus=1").is_err());
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/notopia-config.json");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.user_uid, "local");
    }
}
