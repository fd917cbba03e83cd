//! Editor configuration, persisted as TOML.
//!
//! ```toml
//! width = 900.0
//! height = 600.0
//!
//! [layout]
//! node_radius = 48.0
//! seed = 7
//!
//! [interaction]
//! surface_click_clears_selection = false
//! ```
//!
//! Every field has a default, so an empty file is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LayoutError};
use crate::interaction::InteractionConfig;
use crate::layout::{LayoutConfig, Viewport};

/// Result type for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn viewport(&self) -> Result<Viewport, LayoutError> {
        Viewport::new(self.width, self.height)
    }

    /// Parse from TOML text. `origin` names the source in errors.
    pub fn from_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = EditorConfig::from_toml("", "inline").unwrap();
        assert_eq!(cfg, EditorConfig::default());
        assert_eq!(cfg.layout.node_radius, 48.0);
        assert_eq!(cfg.interaction.drag_threshold, 3.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = EditorConfig::from_toml(
            "width = 1024.0\n[layout]\nseed = 9\n[interaction]\nsurface_click_clears_selection = false\n",
            "inline",
        )
        .unwrap();
        assert_eq!(cfg.width, 1024.0);
        assert_eq!(cfg.height, 600.0);
        assert_eq!(cfg.layout.seed, Some(9));
        assert_eq!(cfg.layout.edge_length, 225.0);
        assert!(!cfg.interaction.surface_click_clears_selection);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EditorConfig::from_toml("[layout]\nspring = 3\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("editor.toml");
        let cfg = EditorConfig {
            width: 1200.0,
            layout: LayoutConfig {
                seed: Some(11),
                ..Default::default()
            },
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = EditorConfig::load(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
