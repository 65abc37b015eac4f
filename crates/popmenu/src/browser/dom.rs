//! `web-sys` backed [`Surface`].
//!
//! Every element the surface creates or adopts is tagged with
//! [`NODE_ATTRIBUTE`], which is how DOM event targets map back to
//! [`NodeId`]s. A native event may pass several listeners on its way
//! through the tree; it reaches the dispatcher once.

use super::events::{dom_event_to_menu, parse_node_id, NODE_ATTRIBUTE};
use popmenu_core::{
    Event, EventKind, EventResponse, ListenTarget, ListenerId, ListenerOptions, NodeId, Rect,
    Size, Surface, SurfaceError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement, Window};

/// Callback receiving every converted event.
pub type Dispatcher = Box<dyn FnMut(&Event) -> EventResponse>;

type DomCallback = Closure<dyn FnMut(web_sys::Event)>;

struct Registration {
    target: EventTarget,
    node: Option<NodeId>,
    kind: EventKind,
    capture: bool,
    callback: DomCallback,
}

impl Registration {
    fn detach(&self) {
        // Removal during dispatch also stops the browser from invoking it later in the same dispatch.
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.kind.dom_name(),
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// DOM surface for one browser document.
pub struct DomSurface {
    window: Window,
    document: Document,
    nodes: HashMap<NodeId, Element>,
    next_node: u64,
    listeners: HashMap<ListenerId, Registration>,
    next_listener: u64,
    dispatcher: Rc<RefCell<Option<Dispatcher>>>,
    last_event: Rc<RefCell<Option<web_sys::Event>>>,
    retired: Rc<RefCell<Vec<DomCallback>>>,
}

fn backend(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(format!("{err:?}"))
}

impl DomSurface {
    /// Create a surface over the current window's document.
    pub fn new() -> Result<Self, SurfaceError> {
        let window =
            web_sys::window().ok_or_else(|| SurfaceError::Backend("No window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| SurfaceError::Backend("No document".to_string()))?;
        Ok(Self {
            window,
            document,
            nodes: HashMap::new(),
            next_node: 0,
            listeners: HashMap::new(),
            next_listener: 0,
            dispatcher: Rc::new(RefCell::new(None)),
            last_event: Rc::new(RefCell::new(None)),
            retired: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Install the callback that receives converted events.
    pub fn set_dispatcher(&self, dispatcher: impl FnMut(&Event) -> EventResponse + 'static) {
        *self.dispatcher.borrow_mut() = Some(Box::new(dispatcher));
    }

    /// Take ownership of an existing element, typically a menu root.
    pub fn adopt(&mut self, element: Element) -> Result<NodeId, SurfaceError> {
        if let Some(id) = element
            .get_attribute(NODE_ATTRIBUTE)
            .and_then(|value| parse_node_id(&value))
            .filter(|id| self.nodes.contains_key(id))
        {
            return Ok(id);
        }
        self.register(element)
    }

    /// Element behind a node.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node)
    }

    /// Number of live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn register(&mut self, element: Element) -> Result<NodeId, SurfaceError> {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        element
            .set_attribute(NODE_ATTRIBUTE, &id.0.to_string())
            .map_err(backend)?;
        self.nodes.insert(id, element);
        Ok(id)
    }

    fn node(&self, node: NodeId) -> Result<&Element, SurfaceError> {
        self.nodes.get(&node).ok_or(SurfaceError::UnknownNode(node))
    }

    fn retire(&mut self, listener: ListenerId) {
        if let Some(registration) = self.listeners.remove(&listener) {
            registration.detach();
            self.retired.borrow_mut().push(registration.callback);
        }
    }

    fn callback(&self, kind: EventKind) -> DomCallback {
        let dispatcher = Rc::clone(&self.dispatcher);
        let last_event = Rc::clone(&self.last_event);
        let retired = Rc::clone(&self.retired);
        Closure::new(move |raw: web_sys::Event| {
            // Callbacks retired by an earlier dispatch are no longer running.
            let stale = std::mem::take(&mut *retired.borrow_mut());
            drop(stale);

            if last_event.borrow().as_ref() == Some(&raw) {
                return;
            }
            *last_event.borrow_mut() = Some(raw.clone());

            let Some(event) = dom_event_to_menu(&raw, kind) else {
                return;
            };
            let Ok(mut slot) = dispatcher.try_borrow_mut() else {
                tracing::warn!(kind = kind.dom_name(), "nested dispatch dropped");
                return;
            };
            if let Some(dispatch) = slot.as_mut() {
                if dispatch(&event).prevents_default() {
                    raw.prevent_default();
                }
            }
        })
    }
}

impl Surface for DomSurface {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, SurfaceError> {
        let element = self.document.create_element(tag).map_err(backend)?;
        self.register(element)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        let child = self.node(child)?.clone();
        self.node(parent)?.append_child(&child).map_err(backend)?;
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let element = self.node(node)?.clone();
        let descendants = element
            .query_selector_all(&format!("[{NODE_ATTRIBUTE}]"))
            .map_err(backend)?;
        let mut removed = Vec::with_capacity(descendants.length() as usize);
        for index in 0..descendants.length() {
            let id = descendants
                .get(index)
                .and_then(|n| n.dyn_into::<Element>().ok())
                .and_then(|e| e.get_attribute(NODE_ATTRIBUTE))
                .and_then(|value| parse_node_id(&value));
            if let Some(id) = id {
                removed.push(id);
            }
        }
        element.set_inner_html("");

        let stale: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|(_, r)| r.node.is_some_and(|n| removed.contains(&n)))
            .map(|(&id, _)| id)
            .collect();
        for listener in stale {
            self.retire(listener);
        }
        for id in removed {
            self.nodes.remove(&id);
        }
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.node(node)?.set_attribute(name, value).map_err(backend)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(&node)?.get_attribute(name)
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SurfaceError> {
        self.node(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), SurfaceError> {
        let element = self.node(node)?;
        let html = element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| SurfaceError::Backend(format!("{node} is not an HTML element")))?;
        html.style().set_property(property, value).map_err(backend)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.nodes.get(&ancestor), self.nodes.get(&node)) {
            (Some(ancestor), Some(node)) => {
                let node: &web_sys::Node = node.as_ref();
                ancestor.contains(Some(node))
            }
            _ => false,
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        let element = self.nodes.get(&node)?;
        if !element.is_connected() {
            return None;
        }
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(
            rect.x() as f32,
            rect.y() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn viewport(&self) -> Size {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or_default() as f32
        };
        Size::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn focus(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let element = self.node(node)?;
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.focus().map_err(backend),
            None => Err(SurfaceError::Backend(format!("{node} is not focusable"))),
        }
    }

    fn focused(&self) -> Option<NodeId> {
        let active = self.document.active_element()?;
        parse_node_id(&active.get_attribute(NODE_ATTRIBUTE)?).filter(|id| self.nodes.contains_key(id))
    }

    fn listen(
        &mut self,
        target: ListenTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> Result<ListenerId, SurfaceError> {
        let (event_target, node): (EventTarget, Option<NodeId>) = match target {
            ListenTarget::Document => (self.document.clone().into(), None),
            ListenTarget::Node(node) => (self.node(node)?.clone().into(), Some(node)),
        };
        let callback = self.callback(kind);
        event_target
            .add_event_listener_with_callback_and_bool(
                kind.dom_name(),
                callback.as_ref().unchecked_ref(),
                options.capture,
            )
            .map_err(backend)?;

        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Registration {
                target: event_target,
                node,
                kind,
                capture: options.capture,
                callback,
            },
        );
        Ok(id)
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.retire(listener);
    }
}

impl Drop for DomSurface {
    fn drop(&mut self) {
        for (_, registration) in self.listeners.drain() {
            registration.detach();
        }
    }
}
