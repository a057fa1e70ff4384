//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>` or `$XDG_CONFIG_HOME/mindmap/mindmap.toml`
//! 3. Environment variables: `MINDMAP_*` prefix
//! 4. Command line flags (applied by the caller)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Default directory for stored maps, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Unified configuration for mindmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<name>.json` map files (default: ./data)
    pub data_dir: PathBuf,
    /// REPL history file; no history is kept when unset
    pub history_file: Option<PathBuf>,
    /// Ask before deleting a node
    pub confirm_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            history_file: default_history_file(),
            confirm_delete: true,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
    pub confirm_delete: Option<bool>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "mindmap")
}

fn default_history_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("history.txt"))
}

/// Get the XDG config directory for mindmap.
pub fn global_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mindmap.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the path unchanged.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    fn expand_paths(&mut self) {
        self.data_dir = expand_path(&self.data_dir);
        self.history_file = self.history_file.as_deref().map(expand_path);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            history_file: overlay
                .history_file
                .clone()
                .or_else(|| self.history_file.clone()),
            confirm_delete: overlay.confirm_delete.unwrap_or(self.confirm_delete),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; replaces the global config file when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply MINDMAP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MINDMAP").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("history_file") {
            settings.history_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("confirm_delete") {
            settings.confirm_delete = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mindmap configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/mindmap/mindmap.toml  (or --config <file>)
#   Env:  MINDMAP_* environment variables (e.g. MINDMAP_DATA_DIR)
#   CLI:  --data-dir

# Directory where maps are stored as <name>.json
# data_dir = "data"

# REPL history file
# history_file = "~/.local/share/mindmap/history.txt"

# Ask for confirmation before deleting a node
# confirm_delete = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_data_dir_is_local_data() {
        let settings = Settings::default();
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert!(settings.confirm_delete);
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/maps"),
            history_file: Some(PathBuf::from("$HOME/.mindmap_history")),
            confirm_delete: true,
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.data_dir.to_string_lossy().starts_with(&home));
        assert!(!settings.data_dir.to_string_lossy().contains('~'));
        assert!(settings
            .history_file
            .as_ref()
            .is_some_and(|p| p.to_string_lossy().starts_with(&home)));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_dir: Some(PathBuf::from("/tmp/maps")),
            history_file: None,
            confirm_delete: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.data_dir, PathBuf::from("/tmp/maps"));
        assert_eq!(merged.history_file, base.history_file);
        assert!(merged.confirm_delete);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.data_dir.is_none());
    }
}
