//! Browser event handling: converts DOM events to menu [`Event`]s.
//!
//! Key and button mapping is plain string/number work and available on
//! every target; the `web-sys` conversions are `wasm32` only.

use popmenu_core::{Key, MouseButton, NodeId};

#[cfg(target_arch = "wasm32")]
use popmenu_core::{Event, EventKind, Point};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{Element, KeyboardEvent, MouseEvent};

/// Attribute tagging every element a [`DomSurface`](super::DomSurface) owns.
pub const NODE_ATTRIBUTE: &str = "data-popmenu-node";

/// Map a `KeyboardEvent.key` value to a [`Key`].
///
/// Returns `None` for keys the menu never reacts to (modifiers, function
/// keys, IME composition).
pub fn key_from_dom(key: &str) -> Option<Key> {
    match key {
        "Enter" => Some(Key::Enter),
        "Escape" | "Esc" => Some(Key::Escape),
        " " | "Spacebar" => Some(Key::Space),
        "Tab" => Some(Key::Tab),
        "ArrowUp" | "Up" => Some(Key::Up),
        "ArrowDown" | "Down" => Some(Key::Down),
        "ArrowLeft" | "Left" => Some(Key::Left),
        "ArrowRight" | "Right" => Some(Key::Right),
        "Home" => Some(Key::Home),
        "End" => Some(Key::End),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_control() => Some(Key::Char(c)),
                _ => None,
            }
        }
    }
}

/// Map a `MouseEvent.button` value to a [`MouseButton`].
pub const fn button_from_dom(button: i16) -> MouseButton {
    match button {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        3 => MouseButton::Button4,
        _ => MouseButton::Button5,
    }
}

/// Parse the value of [`NODE_ATTRIBUTE`].
pub fn parse_node_id(value: &str) -> Option<NodeId> {
    value.parse().ok().map(NodeId)
}

/// Node owning the event target: the closest tagged ancestor-or-self.
#[cfg(target_arch = "wasm32")]
pub fn target_node(event: &web_sys::Event) -> Option<NodeId> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let owner = element
        .closest(&format!("[{NODE_ATTRIBUTE}]"))
        .ok()
        .flatten()?;
    parse_node_id(&owner.get_attribute(NODE_ATTRIBUTE)?)
}

/// Convert a `pointerdown` (or `mousedown`) event.
#[cfg(target_arch = "wasm32")]
pub fn pointer_event_to_menu(event: &MouseEvent) -> Event {
    Event::PointerDown {
        target: target_node(event),
        position: Point::new(event.client_x() as f32, event.client_y() as f32),
        button: button_from_dom(event.button()),
    }
}

/// Convert a `keydown` event; `None` for keys the menu ignores.
#[cfg(target_arch = "wasm32")]
pub fn keyboard_event_to_menu(event: &KeyboardEvent) -> Option<Event> {
    if event.is_composing() {
        return None;
    }
    key_from_dom(&event.key()).map(|key| Event::KeyDown { key })
}

/// Convert any DOM event delivered through a listener of `kind`.
#[cfg(target_arch = "wasm32")]
pub fn dom_event_to_menu(event: &web_sys::Event, kind: EventKind) -> Option<Event> {
    match kind {
        EventKind::PointerDown => event.dyn_ref::<MouseEvent>().map(pointer_event_to_menu),
        EventKind::Click => target_node(event).map(|target| Event::Click { target }),
        EventKind::KeyDown => event
            .dyn_ref::<KeyboardEvent>()
            .and_then(keyboard_event_to_menu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Key Mapping Tests
    // =========================================================================

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_from_dom("ArrowUp"), Some(Key::Up));
        assert_eq!(key_from_dom("ArrowDown"), Some(Key::Down));
        assert_eq!(key_from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(key_from_dom("ArrowRight"), Some(Key::Right));
        assert_eq!(key_from_dom("Home"), Some(Key::Home));
        assert_eq!(key_from_dom("End"), Some(Key::End));
    }

    #[test]
    fn test_activation_keys() {
        assert_eq!(key_from_dom("Enter"), Some(Key::Enter));
        assert_eq!(key_from_dom(" "), Some(Key::Space));
        assert_eq!(key_from_dom("Escape"), Some(Key::Escape));
    }

    #[test]
    fn test_legacy_edge_names() {
        assert_eq!(key_from_dom("Esc"), Some(Key::Escape));
        assert_eq!(key_from_dom("Spacebar"), Some(Key::Space));
        assert_eq!(key_from_dom("Down"), Some(Key::Down));
    }

    #[test]
    fn test_printable_characters() {
        assert_eq!(key_from_dom("a"), Some(Key::Char('a')));
        assert_eq!(key_from_dom("É"), Some(Key::Char('É')));
    }

    #[test]
    fn test_ignored_keys() {
        assert_eq!(key_from_dom("Shift"), None);
        assert_eq!(key_from_dom("F5"), None);
        assert_eq!(key_from_dom(""), None);
        assert_eq!(key_from_dom("\u{7f}"), None);
    }

    // =========================================================================
    // Button and Node Attribute Tests
    // =========================================================================

    #[test]
    fn test_button_mapping() {
        assert_eq!(button_from_dom(0), MouseButton::Left);
        assert_eq!(button_from_dom(1), MouseButton::Middle);
        assert_eq!(button_from_dom(2), MouseButton::Right);
        assert_eq!(button_from_dom(3), MouseButton::Button4);
        assert_eq!(button_from_dom(9), MouseButton::Button5);
    }

    #[test]
    fn test_parse_node_id() {
        assert_eq!(parse_node_id("17"), Some(NodeId(17)));
        assert_eq!(parse_node_id("node"), None);
        assert_eq!(parse_node_id("-1"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_single_printable_char_maps_to_char(c in any::<char>().prop_filter("printable", |c| !c.is_control() && *c != ' ')) {
                prop_assert_eq!(key_from_dom(&c.to_string()), Some(Key::Char(c)));
            }

            #[test]
            fn prop_multi_char_names_never_chars(s in "[a-z]{2,8}") {
                prop_assert!(!matches!(key_from_dom(&s), Some(Key::Char(_))));
            }
        }
    }
}
