//! Browser runtime for popmenu.
//!
//! This module bridges the menu engine and the DOM: event translation
//! works on every target, the `web-sys` surface and host only on `wasm32`.

// Cross-platform modules
pub mod events;

// WASM-only modules
#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use events::{button_from_dom, key_from_dom};

#[cfg(target_arch = "wasm32")]
pub use app::BrowserHost;
#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
