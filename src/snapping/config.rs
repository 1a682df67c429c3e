//! Configuration for the snapping engine

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a snapping configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read snapping config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapping config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable constants of the snapping engine.
///
/// Toggles that change per interaction (free/grid snapping enabled,
/// snapping suppressed) live on the
/// [`VisualDataProvider`](crate::snapping::VisualDataProvider) instead;
/// these are the stable editor preferences.
#[derive(Debug, Clone)]
pub struct SnapConfig {
    /// Half-width of the window around a snap point value in which a
    /// dragged edge engages it
    pub snap_distance: i32,

    /// Window within which a resize matches a sibling's size
    pub same_size_window: i32,

    /// Fixed indent of an indented-component snap point
    pub indent: i32,

    /// Extra length added to each end of a feedback line
    pub feedback_margin: i32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_distance: 10,
            same_size_window: 5,
            indent: 10,
            feedback_margin: 4,
        }
    }
}

/// TOML structure for deserializing preferences; missing keys keep defaults
#[derive(Deserialize)]
struct TomlConfig {
    snapping: Option<TomlSnapping>,
}

#[derive(Deserialize)]
struct TomlSnapping {
    snap_distance: Option<i32>,
    same_size_window: Option<i32>,
    indent: Option<i32>,
    feedback_margin: Option<i32>,
}

impl SnapConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snap engagement distance
    pub fn with_snap_distance(mut self, distance: i32) -> Self {
        self.snap_distance = distance;
        self
    }

    /// Set the same-size matching window
    pub fn with_same_size_window(mut self, window: i32) -> Self {
        self.same_size_window = window;
        self
    }

    /// Set the indented snap point offset
    pub fn with_indent(mut self, indent: i32) -> Self {
        self.indent = indent;
        self
    }

    /// Load preferences from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(s) = parsed.snapping {
            if let Some(v) = s.snap_distance {
                config.snap_distance = v;
            }
            if let Some(v) = s.same_size_window {
                config.same_size_window = v;
            }
            if let Some(v) = s.indent {
                config.indent = v;
            }
            if let Some(v) = s.feedback_margin {
                config.feedback_margin = v;
            }
        }
        Ok(config)
    }

    /// Load preferences from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapConfig::default();
        assert_eq!(config.snap_distance, 10);
        assert_eq!(config.same_size_window, 5);
        assert_eq!(config.indent, 10);
        assert_eq!(config.feedback_margin, 4);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SnapConfig::new().with_snap_distance(8).with_indent(12);
        assert_eq!(config.snap_distance, 8);
        assert_eq!(config.indent, 12);
        assert_eq!(config.same_size_window, 5);
    }

    #[test]
    fn test_from_toml_partial_keys() {
        let config = SnapConfig::from_toml_str(
            r#"
[snapping]
snap_distance = 6
"#,
        )
        .expect("should parse");
        assert_eq!(config.snap_distance, 6);
        assert_eq!(config.indent, 10); // default preserved
    }

    #[test]
    fn test_from_toml_empty() {
        let config = SnapConfig::from_toml_str("").expect("should parse");
        assert_eq!(config.snap_distance, 10);
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(SnapConfig::from_toml_str("not valid {{{{").is_err());
    }
}
