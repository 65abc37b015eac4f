//! Hierarchical, keyboard-navigable context menu engine.
//!
//! Menus are declared as a [`MenuTree`], mounted on a caller-owned root node
//! of any [`Surface`](popmenu_core::Surface) with [`ContextMenu`], and driven
//! by feeding input through [`ContextMenu::handle_event`]. Every menu shares a
//! [`Registry`] so that opening one closes all others.

pub mod context_menu;
pub mod error;
pub mod model;
pub mod placement;
pub mod registry;
pub mod render;

pub use context_menu::ContextMenu;
pub use error::MenuError;
pub use model::{Action, Disabled, MenuEntry, MenuItem, MenuTree, Predicate};
pub use placement::{clamp_to_viewport, place};
pub use registry::{Dismiss, Member, MenuId, Registry};
pub use render::{EntryKind, RenderedEntry, RenderedMenu, Renderer};
