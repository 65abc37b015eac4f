//! Core types for the popmenu context-menu engine.
//!
//! This crate provides the foundation the engine and its hosts share:
//! - Geometric primitives: [`Point`], [`Size`], [`Rect`]
//! - Input: [`Event`], [`Key`], [`MouseButton`], [`EventResponse`]
//! - The host rendering abstraction: [`Surface`] with [`NodeId`] handles
//! - Configuration: [`MenuConfig`]

mod config;
mod error;
mod event;
mod geometry;
mod surface;

pub use config::{ClassNames, MenuConfig, DEFAULT_OFFSCREEN_OFFSET, DEFAULT_VIEWPORT_MARGIN};
pub use error::{ConfigError, SurfaceError};
pub use event::{Event, EventResponse, Key, MouseButton};
pub use geometry::{Point, Rect, Size};
pub use surface::{EventKind, ListenTarget, ListenerId, ListenerOptions, NodeId, Surface};
