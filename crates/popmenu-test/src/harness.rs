//! Test harness driving several menus over one [`Document`].

use crate::document::Document;
use popmenu_core::{Event, EventResponse, Key, MenuConfig, NodeId, Point, Size, Surface};
use popmenu_widgets::{ContextMenu, MenuEntry, MenuError, Registry};
use std::rc::Rc;

/// Test harness for simulating pointer and keyboard input across menus.
///
/// Events are delivered the way a browser would: only menus that are open
/// when an event starts are listening, and each listening menu sees the
/// event once.
pub struct MenuHarness<C> {
    doc: Document,
    registry: Rc<Registry<Document>>,
    menus: Vec<ContextMenu<C, Document>>,
    deliveries: Vec<usize>,
}

impl<C: 'static> MenuHarness<C> {
    /// Create a harness with a 1280x720 viewport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            doc: Document::default(),
            registry: Registry::new(),
            menus: Vec::new(),
            deliveries: Vec::new(),
        }
    }

    /// Set the viewport size.
    #[must_use]
    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.doc.set_viewport(Size::new(width, height));
        self
    }

    /// Mount a menu on a fresh root and return its index.
    pub fn add_menu(&mut self, items: Vec<MenuEntry<C>>) -> usize {
        self.add_menu_with_config(items, MenuConfig::default())
    }

    /// Mount a menu with a custom configuration.
    pub fn add_menu_with_config(&mut self, items: Vec<MenuEntry<C>>, config: MenuConfig) -> usize {
        let root = self.doc.create_root();
        let menu = ContextMenu::with_config(&self.registry, root, config);
        menu.set_items(items);
        self.menus.push(menu);
        self.deliveries.push(0);
        self.menus.len() - 1
    }

    // === Menu Operations ===

    /// Open menu `index` at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if no menu was mounted at `index`.
    pub fn open(&mut self, index: usize, x: f32, y: f32, ctx: C) -> Result<(), MenuError> {
        self.menus[index].open(&mut self.doc, x, y, ctx)
    }

    /// Close menu `index`.
    pub fn close(&mut self, index: usize) -> Result<(), MenuError> {
        self.menus[index].close(&mut self.doc)
    }

    // === Event Simulation ===

    /// Deliver an event to every menu that is open, merging their responses.
    pub fn dispatch(&mut self, event: &Event) -> Result<EventResponse, MenuError> {
        let listening: Vec<usize> = (0..self.menus.len())
            .filter(|&i| self.menus[i].is_open())
            .collect();
        let mut response = EventResponse::Ignored;
        for index in listening {
            self.deliveries[index] += 1;
            response = response.merge(self.menus[index].handle_event(&mut self.doc, event)?);
        }
        Ok(response)
    }

    /// Press and release the pointer on the first node matching `selector`.
    ///
    /// Focus moves to the node unless the pointer-down response suppresses
    /// the default action. Does nothing when no node matches.
    pub fn click(&mut self, selector: &str) -> Result<EventResponse, MenuError> {
        let Some(node) = self.doc.query(selector) else {
            return Ok(EventResponse::Ignored);
        };
        self.click_node(node)
    }

    /// Press and release the pointer on a node.
    pub fn click_node(&mut self, node: NodeId) -> Result<EventResponse, MenuError> {
        let position = self
            .doc
            .bounding_rect(node)
            .map_or_else(Point::default, |r| r.center());
        let down = self.dispatch(&Event::pointer_down(node, position))?;
        if !down.prevents_default() && self.doc.tag(node) == Some("button") {
            self.doc.focus(node)?;
        }
        let click = self.dispatch(&Event::Click { target: node })?;
        Ok(down.merge(click))
    }

    /// Press the pointer on the page background, outside every menu.
    pub fn pointer_down_outside(&mut self) -> Result<EventResponse, MenuError> {
        let body = self.doc.body();
        self.dispatch(&Event::pointer_down(body, Point::default()))
    }

    /// Simulate a key press.
    pub fn press_key(&mut self, key: Key) -> Result<EventResponse, MenuError> {
        self.dispatch(&Event::KeyDown { key })
    }

    /// Simulate a sequence of key presses.
    pub fn press_keys(&mut self, keys: &[Key]) -> Result<(), MenuError> {
        for &key in keys {
            self.press_key(key)?;
        }
        Ok(())
    }

    // === Queries ===

    /// The document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// The document, mutably.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &Rc<Registry<Document>> {
        &self.registry
    }

    /// Handle to menu `index`.
    #[must_use]
    pub fn menu(&self, index: usize) -> &ContextMenu<C, Document> {
        &self.menus[index]
    }

    /// Whether menu `index` is open.
    #[must_use]
    pub fn is_open(&self, index: usize) -> bool {
        self.menus[index].is_open()
    }

    /// Number of open menus.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.menus.iter().filter(|m| m.is_open()).count()
    }

    /// Number of events delivered to menu `index` so far.
    #[must_use]
    pub fn deliveries(&self, index: usize) -> usize {
        self.deliveries[index]
    }

    /// First node matching a selector.
    #[must_use]
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.doc.query(selector)
    }

    /// Every node matching a selector.
    #[must_use]
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.doc.query_all(selector)
    }

    /// Text of the first node matching a selector, empty when none matches.
    #[must_use]
    pub fn text(&self, selector: &str) -> String {
        self.query(selector)
            .map(|node| self.doc.text_content(node))
            .unwrap_or_default()
    }

    /// Label text of the focused node.
    #[must_use]
    pub fn focused_label(&self) -> Option<String> {
        let focused = self.doc.focused()?;
        let label = self
            .doc
            .children(focused)
            .into_iter()
            .find(|&child| {
                self.doc
                    .attribute(child, "class")
                    .is_some_and(|class| class.split_whitespace().any(|c| c == "label"))
            })
            .unwrap_or(focused);
        Some(self.doc.text_content(label))
    }

    /// Check if a node matches the selector.
    #[must_use]
    pub fn exists(&self, selector: &str) -> bool {
        self.query(selector).is_some()
    }

    // === Assertions ===

    /// Assert that menu `index` is open.
    ///
    /// # Panics
    ///
    /// Panics if the menu is closed.
    pub fn assert_open(&self, index: usize) -> &Self {
        assert!(self.is_open(index), "Expected menu {index} to be open");
        self
    }

    /// Assert that menu `index` is closed.
    ///
    /// # Panics
    ///
    /// Panics if the menu is open.
    pub fn assert_closed(&self, index: usize) -> &Self {
        assert!(!self.is_open(index), "Expected menu {index} to be closed");
        self
    }

    /// Assert the label of the focused item.
    ///
    /// # Panics
    ///
    /// Panics if the focused label differs.
    pub fn assert_focused(&self, expected: &str) -> &Self {
        let actual = self.focused_label();
        assert_eq!(
            actual.as_deref(),
            Some(expected),
            "Expected focus on '{expected}' but got {actual:?}"
        );
        self
    }

    /// Assert that a node matching the selector exists.
    ///
    /// # Panics
    ///
    /// Panics if nothing matches.
    pub fn assert_exists(&self, selector: &str) -> &Self {
        assert!(
            self.exists(selector),
            "Expected node matching '{selector}' to exist"
        );
        self
    }

    /// Assert that no node matches the selector.
    ///
    /// # Panics
    ///
    /// Panics if something matches.
    pub fn assert_not_exists(&self, selector: &str) -> &Self {
        assert!(
            !self.exists(selector),
            "Expected node matching '{selector}' to not exist"
        );
        self
    }

    /// Assert the count of matching nodes.
    ///
    /// # Panics
    ///
    /// Panics if the count does not match.
    pub fn assert_count(&self, selector: &str, expected: usize) -> &Self {
        let actual = self.query_all(selector).len();
        assert_eq!(
            actual, expected,
            "Expected {expected} nodes matching '{selector}' but found {actual}"
        );
        self
    }

    /// Assert the text of the first matching node.
    ///
    /// # Panics
    ///
    /// Panics if the text does not match.
    pub fn assert_text(&self, selector: &str, expected: &str) -> &Self {
        let actual = self.text(selector);
        assert_eq!(
            actual, expected,
            "Expected text '{expected}' but got '{actual}' for '{selector}'"
        );
        self
    }
}

impl<C: 'static> Default for MenuHarness<C> {
    fn default() -> Self {
        Self::new()
    }
}
