//! Popmenu: hierarchical, keyboard-navigable context menus.
//!
//! The engine is surface-agnostic: menus render through the
//! [`Surface`] trait, so the same code drives the in-memory test
//! document and, on `wasm32`, the browser DOM.
//!
//! # Browser Usage (WASM)
//!
//! ```ignore
//! use popmenu::browser::BrowserHost;
//! use popmenu::MenuItem;
//!
//! let host = BrowserHost::<String>::new()?;
//! let root = document.get_element_by_id("menu-root").unwrap();
//! let menu = host.mount(root, vec![
//!     MenuItem::action("Rename", |path: &String| rename(path)).into(),
//! ]);
//! host.open(&menu, x, y, path)?;
//! ```

#![allow(
    clippy::doc_markdown,
    clippy::missing_const_for_fn,
    clippy::needless_pass_by_value,
    clippy::type_complexity,
    unreachable_pub
)]

pub use popmenu_core::*;
pub use popmenu_widgets as widgets;
pub use popmenu_widgets::{
    clamp_to_viewport, place, Action, ContextMenu, Disabled, Dismiss, MenuEntry, MenuError,
    MenuId, MenuItem, MenuTree, Predicate, Registry,
};

pub mod browser;

pub use browser::key_from_dom;
#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHost, DomSurface};
