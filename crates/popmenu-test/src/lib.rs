#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]
//! Testing tools for popmenu.
//!
//! - [`Document`]: an in-memory [`Surface`](popmenu_core::Surface) with a
//!   deterministic block layout, for rendering menus without a browser.
//! - [`Selector`]: CSS-like queries over a document.
//! - [`MenuHarness`]: mounts several menus on one document and simulates
//!   pointer and keyboard input the way a browser delivers it.
//!
//! ```ignore
//! use popmenu_test::MenuHarness;
//!
//! let mut h = MenuHarness::new();
//! let menu = h.add_menu(vec![MenuItem::new("Copy").into()]);
//! h.open(menu, 10.0, 10.0, ())?;
//! h.assert_open(menu).assert_focused("Copy");
//! ```

mod document;
mod harness;
mod selector;

pub use document::{Document, Listener, ROW_HEIGHT, ROW_WIDTH, SEPARATOR_HEIGHT};
pub use harness::MenuHarness;
pub use selector::{Selector, SelectorError, SelectorParser};
