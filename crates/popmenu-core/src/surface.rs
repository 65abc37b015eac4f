//! The host rendering surface.
//!
//! A [`Surface`] is a tree of visual nodes the menu engine renders into. The
//! engine never owns the tree: it creates nodes under a caller-provided root,
//! mutates their attributes and styles, measures them, moves keyboard focus
//! and subscribes to input. Implementations exist for the browser DOM
//! (`popmenu::browser`) and for tests (`popmenu_test::Document`).

use crate::error::SurfaceError;
use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a live event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Input streams a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Pointer pressed
    PointerDown,
    /// Click
    Click,
    /// Key pressed
    KeyDown,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::Click => "click",
            Self::KeyDown => "keydown",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenTarget {
    /// The whole document (sees every event of its kind)
    Document,
    /// A single node (sees events targeting it or its descendants)
    Node(NodeId),
}

/// Listener registration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListenerOptions {
    /// Fire during the capture phase, before node listeners
    pub capture: bool,
}

impl ListenerOptions {
    /// Capture-phase listener.
    pub const CAPTURE: Self = Self { capture: true };
}

/// A tree of visual nodes supporting mutation, measurement, focus and events.
///
/// Node-scoped listeners belong to their node: removing a node with
/// [`Surface::clear_children`] drops its listeners too.
pub trait Surface {
    /// Create a detached element with the given tag name.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, SurfaceError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError>;

    /// Remove and discard every descendant of `node`.
    fn clear_children(&mut self, node: NodeId) -> Result<(), SurfaceError>;

    /// Set an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError>;

    /// Read an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Replace the text content of a node.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SurfaceError>;

    /// Set an inline style property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str)
        -> Result<(), SurfaceError>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Bounding box in surface coordinates, `None` when the node is not
    /// attached to the visible tree.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    /// Size of the visible viewport.
    fn viewport(&self) -> Size;

    /// Force pending layout so the next measurement is accurate.
    ///
    /// Surfaces that lay out synchronously keep the default no-op.
    fn flush_layout(&mut self) {}

    /// Move keyboard focus to a node.
    fn focus(&mut self, node: NodeId) -> Result<(), SurfaceError>;

    /// Node holding keyboard focus, if the surface tracks it.
    fn focused(&self) -> Option<NodeId>;

    /// Subscribe to an input stream.
    fn listen(
        &mut self,
        target: ListenTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> Result<ListenerId, SurfaceError>;

    /// Drop a subscription. Unknown ids are ignored.
    fn unlisten(&mut self, listener: ListenerId);
}
