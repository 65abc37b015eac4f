//! Menu configuration, loadable from TOML.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default inset kept between a menu and the viewport edge.
pub const DEFAULT_VIEWPORT_MARGIN: f32 = 8.0;

/// Default coordinate used to park a menu off-screen while it is measured.
pub const DEFAULT_OFFSCREEN_OFFSET: f32 = -9999.0;

/// Class names applied to rendered nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Wrapper around the top-level item list
    pub wrapper: String,
    /// Interactive item
    pub item: String,
    /// Divider
    pub separator: String,
    /// Nested item list of a submenu trigger
    pub submenu: String,
    /// Icon span
    pub icon: String,
    /// Label span
    pub label: String,
    /// Accelerator hint span
    pub accel: String,
    /// Submenu indicator span
    pub indicator: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            wrapper: "menu".to_string(),
            item: "item".to_string(),
            separator: "sep".to_string(),
            submenu: "submenu".to_string(),
            icon: "icon".to_string(),
            label: "label".to_string(),
            accel: "accel".to_string(),
            indicator: "right".to_string(),
        }
    }
}

impl ClassNames {
    fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("classes.wrapper", &self.wrapper),
            ("classes.item", &self.item),
            ("classes.separator", &self.separator),
            ("classes.submenu", &self.submenu),
            ("classes.icon", &self.icon),
            ("classes.label", &self.label),
            ("classes.accel", &self.accel),
            ("classes.indicator", &self.indicator),
        ]
    }
}

/// Tunables for one menu instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Inset kept between the menu and the viewport edge
    pub viewport_margin: f32,
    /// Off-screen coordinate used during measurement
    pub offscreen_offset: f32,
    /// Text shown after the label of a submenu trigger
    pub submenu_indicator: String,
    /// Class names for rendered nodes
    pub classes: ClassNames,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            viewport_margin: DEFAULT_VIEWPORT_MARGIN,
            offscreen_offset: DEFAULT_OFFSCREEN_OFFSET,
            submenu_indicator: "▶".to_string(),
            classes: ClassNames::default(),
        }
    }
}

impl MenuConfig {
    /// Default config file name.
    pub const CONFIG_FILE: &'static str = "popmenu.toml";

    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport margin.
    #[must_use]
    pub const fn viewport_margin(mut self, margin: f32) -> Self {
        self.viewport_margin = margin;
        self
    }

    /// Set the submenu indicator text.
    #[must_use]
    pub fn submenu_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.submenu_indicator = indicator.into();
        self
    }

    /// Parse and validate a configuration from a TOML string.
    ///
    /// Missing keys take their default values.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    #[must_use]
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Load and validate a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.viewport_margin.is_finite() || self.viewport_margin < 0.0 {
            return Err(invalid(
                "viewport_margin",
                "must be finite and non-negative",
            ));
        }
        if !self.offscreen_offset.is_finite() {
            return Err(invalid("offscreen_offset", "must be finite"));
        }
        for (field, value) in self.classes.fields() {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MenuConfig::default();
        assert_eq!(config.viewport_margin, 8.0);
        assert_eq!(config.offscreen_offset, -9999.0);
        assert_eq!(config.submenu_indicator, "▶");
        assert_eq!(config.classes.item, "item");
        assert_eq!(config.classes.separator, "sep");
        assert_eq!(config.classes.submenu, "submenu");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MenuConfig::new().viewport_margin(4.0).submenu_indicator("›");
        assert_eq!(config.viewport_margin, 4.0);
        assert_eq!(config.submenu_indicator, "›");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = MenuConfig::from_toml(
            r#"
            viewport_margin = 12.0

            [classes]
            item = "menu-item"
            "#,
        )
        .unwrap();
        assert_eq!(config.viewport_margin, 12.0);
        assert_eq!(config.offscreen_offset, DEFAULT_OFFSCREEN_OFFSET);
        assert_eq!(config.classes.item, "menu-item");
        assert_eq!(config.classes.separator, "sep");
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(MenuConfig::from_toml("").unwrap(), MenuConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = MenuConfig::new().viewport_margin(3.0);
        let parsed = MenuConfig::from_toml(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_toml_syntax_error() {
        let err = MenuConfig::from_toml("viewport_margin = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validate_negative_margin() {
        let err = MenuConfig::from_toml("viewport_margin = -1.0").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "viewport_margin"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_class() {
        let mut config = MenuConfig::default();
        config.classes.submenu = " ".to_string();
        match config.validate().unwrap_err() {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "classes.submenu"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = MenuConfig::load_from_file(Path::new("/nonexistent/popmenu.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
