//! WASM browser tests - run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use popmenu::browser::{BrowserHost, DomSurface};
use popmenu::{Event, EventKind, EventResponse, Key, ListenTarget, ListenerOptions, MenuItem, Surface};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_root() -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn dispatch_key(key: &str) -> bool {
    let init = web_sys::KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .dispatch_event(&event)
        .unwrap()
}

// ============================================================================
// DomSurface Tests
// ============================================================================

#[wasm_bindgen_test]
fn test_created_nodes_are_tagged() {
    let mut surface = DomSurface::new().unwrap();
    let node = surface.create_element("button").unwrap();
    assert_eq!(
        surface.attribute(node, "data-popmenu-node"),
        Some(node.0.to_string())
    );
}

#[wasm_bindgen_test]
fn test_detached_node_has_no_rect() {
    let mut surface = DomSurface::new().unwrap();
    let node = surface.create_element("div").unwrap();
    assert_eq!(surface.bounding_rect(node), None);
}

#[wasm_bindgen_test]
fn test_clear_children_forgets_descendants() {
    let mut surface = DomSurface::new().unwrap();
    let root = surface.adopt(fresh_root()).unwrap();
    let child = surface.create_element("button").unwrap();
    surface.append_child(root, child).unwrap();
    surface
        .listen(ListenTarget::Node(child), EventKind::Click, ListenerOptions::default())
        .unwrap();
    assert!(surface.contains(root, child));

    surface.clear_children(root).unwrap();
    assert!(surface.element(child).is_none());
    assert_eq!(surface.listener_count(), 0);
}

#[wasm_bindgen_test]
fn test_dispatcher_receives_keys_and_prevents_default() {
    let mut surface = DomSurface::new().unwrap();
    let seen = Rc::new(Cell::new(0));
    let sink = Rc::clone(&seen);
    surface.set_dispatcher(move |event| {
        if matches!(event, Event::KeyDown { key: Key::Down }) {
            sink.set(sink.get() + 1);
            EventResponse::CONSUMED
        } else {
            EventResponse::Ignored
        }
    });
    let listener = surface
        .listen(ListenTarget::Document, EventKind::KeyDown, ListenerOptions::default())
        .unwrap();

    assert!(!dispatch_key("ArrowDown"));
    assert!(dispatch_key("Shift"));
    assert_eq!(seen.get(), 1);

    surface.unlisten(listener);
    assert!(dispatch_key("ArrowDown"));
    assert_eq!(seen.get(), 1);
}

// ============================================================================
// BrowserHost Tests
// ============================================================================

#[wasm_bindgen_test]
fn test_host_open_escape_close() {
    let host: BrowserHost<()> = BrowserHost::new().unwrap();
    let menu = host
        .mount(
            fresh_root(),
            vec![MenuItem::new("Copy").into(), MenuItem::new("Paste").into()],
        )
        .unwrap();

    host.open(&menu, 20.0, 20.0, ()).unwrap();
    assert!(menu.is_open());
    let focused = host.surface().borrow().focused();
    assert!(focused.is_some());

    assert!(!dispatch_key("Escape"));
    assert!(!menu.is_open());
    assert_eq!(host.surface().borrow().listener_count(), 0);
}

#[wasm_bindgen_test]
fn test_host_click_runs_action() {
    let hits = Rc::new(Cell::new(0));
    let sink = Rc::clone(&hits);
    let host: BrowserHost<u32> = BrowserHost::new().unwrap();
    let menu = host
        .mount(
            fresh_root(),
            vec![MenuItem::action("Go", move |n: &u32| sink.set(sink.get() + n)).into()],
        )
        .unwrap();
    host.open(&menu, 0.0, 0.0, 5).unwrap();

    let button = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .query_selector("[role=menuitem]")
        .unwrap()
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    button.click();

    assert_eq!(hits.get(), 5);
    assert!(!menu.is_open());
}

#[wasm_bindgen_test]
fn test_host_keeps_one_menu_open() {
    let host: BrowserHost<()> = BrowserHost::new().unwrap();
    let a = host.mount(fresh_root(), vec![MenuItem::new("A").into()]).unwrap();
    let b = host.mount(fresh_root(), vec![MenuItem::new("B").into()]).unwrap();
    host.open(&a, 0.0, 0.0, ()).unwrap();
    host.open(&b, 0.0, 0.0, ()).unwrap();
    assert!(!a.is_open());
    assert!(b.is_open());
    host.close_all().unwrap();
    assert!(!b.is_open());
    assert_eq!(host.menu_count(), 2);
}
