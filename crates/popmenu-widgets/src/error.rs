//! Error types for the menu engine.

use crate::registry::MenuId;
use popmenu_core::SurfaceError;
use thiserror::Error;

/// Errors returned by menu operations.
///
/// Panics raised by caller-supplied predicates and actions are not converted;
/// they unwind to the caller of `open`/`handle_event`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MenuError {
    /// The surface rejected a node or listener operation.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// The anchor point is not a finite coordinate.
    #[error("invalid anchor ({x}, {y}): coordinates must be finite")]
    InvalidAnchor {
        /// Anchor x
        x: f32,
        /// Anchor y
        y: f32,
    },

    /// A menu was asked to close while one of its own callbacks was running.
    #[error("menu {0} is busy handling an event")]
    Reentrant(MenuId),
}
