//! Input events delivered to menu instances.

use crate::geometry::Point;
use crate::surface::{EventKind, NodeId};
use serde::{Deserialize, Serialize};

/// Input event types the engine reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Pointer pressed
    PointerDown {
        /// Node under the pointer, `None` when the surface does not track it
        target: Option<NodeId>,
        /// Position in surface coordinates
        position: Point,
        /// Button pressed
        button: MouseButton,
    },
    /// Click (press and release on the same node)
    Click {
        /// Node that received the click
        target: NodeId,
    },
    /// Key pressed
    KeyDown {
        /// Key pressed
        key: Key,
    },
}

impl Event {
    /// Subscription kind this event is delivered through.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::Click { .. } => EventKind::Click,
            Self::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    /// Convenience constructor for a primary-button press.
    #[must_use]
    pub const fn pointer_down(target: NodeId, position: Point) -> Self {
        Self::PointerDown {
            target: Some(target),
            position,
            button: MouseButton::Left,
        }
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (wheel click)
    Middle,
    /// Additional button 1
    Button4,
    /// Additional button 2
    Button5,
}

/// Keyboard key identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Space bar
    Space,
    /// Tab
    Tab,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Home
    Home,
    /// End
    End,
    /// Any printable character
    Char(char),
}

/// What the host should do with an event after a menu saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventResponse {
    /// The menu did not react.
    #[default]
    Ignored,
    /// The menu reacted.
    Handled {
        /// Suppress the host's default action (focus stealing, scrolling, ...)
        prevent_default: bool,
    },
}

impl EventResponse {
    /// Handled, default action suppressed.
    pub const CONSUMED: Self = Self::Handled {
        prevent_default: true,
    };

    /// Handled, default action kept.
    pub const HANDLED: Self = Self::Handled {
        prevent_default: false,
    };

    /// Whether the menu reacted.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Whether the host must suppress the default action.
    #[must_use]
    pub const fn prevents_default(&self) -> bool {
        matches!(
            self,
            Self::Handled {
                prevent_default: true
            }
        )
    }

    /// Combine two responses to the same event (e.g. from several menus).
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Ignored, r) | (r, Self::Ignored) => r,
            (
                Self::Handled {
                    prevent_default: a,
                },
                Self::Handled {
                    prevent_default: b,
                },
            ) => Self::Handled {
                prevent_default: a || b,
            },
        }
    }
}
