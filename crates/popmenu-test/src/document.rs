//! In-memory surface for tests.
//!
//! [`Document`] is a small element tree with a deterministic block layout:
//! buttons are one row tall, separators are a thin strip, containers stack
//! their children vertically and `display: none` collapses a subtree to
//! nothing. Nodes are positioned by their `left`/`top` styles, or stacked
//! under their parent when unstyled. Sizes can be overridden per node with
//! [`Document::set_measured_size`].

use crate::selector::Selector;
use popmenu_core::{
    EventKind, ListenTarget, ListenerId, ListenerOptions, NodeId, Point, Rect, Size, Surface,
    SurfaceError,
};
use std::collections::{BTreeMap, HashMap};

/// Height of one `button` row.
pub const ROW_HEIGHT: f32 = 24.0;
/// Height of a `role="separator"` node.
pub const SEPARATOR_HEIGHT: f32 = 9.0;
/// Width of rows and separators.
pub const ROW_WIDTH: f32 = 200.0;

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    style_history: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    /// Handle returned by `listen`
    pub id: ListenerId,
    /// Scope
    pub target: ListenTarget,
    /// Stream
    pub kind: EventKind,
    /// Options
    pub options: ListenerOptions,
}

/// In-memory element tree implementing [`Surface`].
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    viewport: Size,
    focused: Option<NodeId>,
    listeners: Vec<Listener>,
    next_listener: u64,
    measured: HashMap<NodeId, Size>,
    layout_flushes: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 720.0))
    }
}

impl Document {
    /// Create a document containing only `body`.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            nodes: vec![Node {
                tag: "body".to_string(),
                ..Node::default()
            }],
            body: NodeId(0),
            viewport,
            focused: None,
            listeners: Vec::new(),
            next_listener: 1,
            measured: HashMap::new(),
            layout_flushes: 0,
        }
    }

    /// The `body` node.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Create an absolutely positioned `div` attached to `body`, ready to
    /// host a menu.
    pub fn create_root(&mut self) -> NodeId {
        let root = self.push_node("div");
        self.attach(self.body, root);
        if let Some(node) = self.node_mut(root) {
            node.styles.insert("position".to_string(), "absolute".to_string());
        }
        root
    }

    /// Override the measured size of a node.
    pub fn set_measured_size(&mut self, node: NodeId, size: Size) {
        self.measured.insert(node, size);
    }

    /// Tag name.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.tag.as_str())
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Ancestors from the parent up to the topmost node.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Current value of an inline style property.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node).and_then(|n| n.styles.get(property).cloned())
    }

    /// Every value ever written to a style property, oldest first.
    #[must_use]
    pub fn style_history(&self, node: NodeId, property: &str) -> Vec<String> {
        self.node(node)
            .map(|n| {
                n.style_history
                    .iter()
                    .filter(|(p, _)| p == property)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Concatenated text of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    /// Whether the node is reachable from `body`.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.body || self.ancestors(node).any(|a| a == self.body)
    }

    /// Live subscriptions.
    #[must_use]
    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether any document-scope listener of `kind` is live.
    #[must_use]
    pub fn has_document_listener(&self, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|l| l.kind == kind && l.target == ListenTarget::Document)
    }

    /// Whether `node` itself has a listener of `kind`.
    #[must_use]
    pub fn has_node_listener(&self, node: NodeId, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|l| l.kind == kind && l.target == ListenTarget::Node(node))
    }

    /// Number of `flush_layout` calls so far.
    #[must_use]
    pub const fn layout_flushes(&self) -> usize {
        self.layout_flushes
    }

    /// First attached node matching a selector, in document order.
    #[must_use]
    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// Every attached node matching a selector, in document order.
    ///
    /// An invalid selector matches nothing.
    #[must_use]
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Ok(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        let mut results = Vec::new();
        self.find_all(self.body, &sel, &mut results);
        results
    }

    fn find_all(&self, node: NodeId, sel: &Selector, results: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if sel.matches(self, child) {
                results.push(child);
            }
            self.find_all(child, sel, results);
        }
    }

    fn collect_text(&self, node: NodeId, text: &mut String) {
        if let Some(n) = self.node(node) {
            text.push_str(&n.text);
            for &child in &n.children {
                self.collect_text(child, text);
            }
        }
    }

    fn index(id: NodeId) -> Option<usize> {
        usize::try_from(id.0).ok()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        Self::index(id).and_then(|i| self.nodes.get(i))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        Self::index(id).and_then(|i| self.nodes.get_mut(i))
    }

    fn live(&mut self, id: NodeId) -> Result<&mut Node, SurfaceError> {
        self.node_mut(id).ok_or(SurfaceError::UnknownNode(id))
    }

    fn push_node(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.parent(child) {
            if let Some(node) = self.node_mut(old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for child in self.children(node) {
            self.collect_subtree(child, out);
        }
    }

    fn measure(&self, id: NodeId) -> Size {
        let Some(node) = self.node(id) else {
            return Size::ZERO;
        };
        if node.styles.get("display").is_some_and(|d| d == "none") {
            return Size::ZERO;
        }
        if let Some(size) = self.measured.get(&id) {
            return *size;
        }
        if node.tag == "button" {
            return Size::new(ROW_WIDTH, ROW_HEIGHT);
        }
        if node.attributes.get("role").is_some_and(|r| r == "separator") {
            return Size::new(ROW_WIDTH, SEPARATOR_HEIGHT);
        }
        node.children.iter().fold(Size::ZERO, |acc, &child| {
            let size = self.measure(child);
            Size::new(acc.width.max(size.width), acc.height + size.height)
        })
    }

    fn origin(&self, id: NodeId) -> Point {
        let Some(node) = self.node(id) else {
            return Point::default();
        };
        let styled = |property: &str| node.styles.get(property).and_then(|v| parse_px(v));
        if let (Some(left), Some(top)) = (styled("left"), styled("top")) {
            return Point::new(left, top);
        }
        let Some(parent) = node.parent else {
            return Point::default();
        };
        let above: f32 = self
            .children(parent)
            .into_iter()
            .take_while(|&sibling| sibling != id)
            .map(|sibling| self.measure(sibling).height)
            .sum();
        let base = self.origin(parent);
        Point::new(base.x, base.y + above)
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

impl Surface for Document {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, SurfaceError> {
        if tag.is_empty() {
            return Err(SurfaceError::Backend("empty tag name".to_string()));
        }
        Ok(self.push_node(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SurfaceError> {
        self.live(parent)?;
        self.live(child)?;
        if self.contains(child, parent) {
            return Err(SurfaceError::Backend(format!(
                "cannot append {child} inside its own subtree"
            )));
        }
        self.attach(parent, child);
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        let children = std::mem::take(&mut self.live(node)?.children);
        let mut removed = Vec::new();
        for &child in &children {
            self.collect_subtree(child, &mut removed);
            if let Some(n) = self.node_mut(child) {
                n.parent = None;
            }
        }
        self.listeners
            .retain(|l| !matches!(l.target, ListenTarget::Node(n) if removed.contains(&n)));
        if self.focused.is_some_and(|f| removed.contains(&f)) {
            self.focused = None;
        }
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SurfaceError> {
        self.live(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SurfaceError> {
        text.clone_into(&mut self.live(node)?.text);
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), SurfaceError> {
        let n = self.live(node)?;
        n.styles.insert(property.to_string(), value.to_string());
        n.style_history.push((property.to_string(), value.to_string()));
        Ok(())
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        if self.node(node).is_none() || !self.is_attached(node) {
            return None;
        }
        Some(Rect::from_origin_size(self.origin(node), self.measure(node)))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn flush_layout(&mut self) {
        self.layout_flushes += 1;
    }

    fn focus(&mut self, node: NodeId) -> Result<(), SurfaceError> {
        self.live(node)?;
        self.focused = Some(node);
        Ok(())
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn listen(
        &mut self,
        target: ListenTarget,
        kind: EventKind,
        options: ListenerOptions,
    ) -> Result<ListenerId, SurfaceError> {
        if let ListenTarget::Node(node) = target {
            self.live(node)?;
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            target,
            kind,
            options,
        });
        Ok(id)
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.listeners.retain(|l| l.id != listener);
    }
}
