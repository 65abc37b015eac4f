//! Error types shared by surfaces and configuration.

use crate::surface::NodeId;
use thiserror::Error;

/// Errors reported by a [`Surface`](crate::Surface) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The node handle does not refer to a live node.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The backing platform rejected the operation.
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Errors loading a [`MenuConfig`](crate::MenuConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML syntax or type error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_display() {
        assert_eq!(
            SurfaceError::UnknownNode(NodeId(4)).to_string(),
            "unknown node: node#4"
        );
        assert_eq!(
            SurfaceError::Backend("detached".to_string()).to_string(),
            "surface backend error: detached"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "viewport_margin".to_string(),
            message: "must be finite and non-negative".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'viewport_margin': must be finite and non-negative"
        );
    }
}
