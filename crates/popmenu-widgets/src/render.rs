//! Materializes a menu tree onto a surface.
//!
//! Every open rebuilds the whole subtree from scratch; there is no diffing.
//! The result is a [`RenderedMenu`]: a flat arena of interactive entries in
//! document order that the controller uses for focus traversal and
//! expand/collapse bookkeeping. Expanded state is mirrored on the surface as
//! `aria-expanded` on the trigger and `display` on its submenu container.

use crate::error::MenuError;
use crate::model::{Action, MenuEntry, MenuItem};
use popmenu_core::{EventKind, ListenTarget, ListenerOptions, MenuConfig, NodeId, Surface};

/// What activating an entry does.
pub enum EntryKind<C> {
    /// Runs its action and closes the menu
    Leaf {
        /// Callback, if any
        action: Option<Action<C>>,
    },
    /// Toggles a nested list
    Trigger {
        /// Container holding the nested entries
        submenu: NodeId,
        /// Whether the nested list is shown
        expanded: bool,
    },
}

/// One interactive node produced by the renderer.
pub struct RenderedEntry<C> {
    node: NodeId,
    parent: Option<usize>,
    disabled: bool,
    kind: EntryKind<C>,
}

impl<C> RenderedEntry<C> {
    /// The item node.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Index of the trigger whose submenu holds this entry.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Disabled state resolved at render time.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Entry kind.
    #[must_use]
    pub const fn kind(&self) -> &EntryKind<C> {
        &self.kind
    }

    /// Whether this entry toggles a submenu.
    #[must_use]
    pub const fn is_trigger(&self) -> bool {
        matches!(self.kind, EntryKind::Trigger { .. })
    }

    /// Whether this entry is an expanded trigger.
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        match self.kind {
            EntryKind::Trigger { expanded, .. } => expanded,
            EntryKind::Leaf { .. } => false,
        }
    }
}

/// Interactive entries of one open session, in document order.
pub struct RenderedMenu<C> {
    entries: Vec<RenderedEntry<C>>,
}

impl<C> Default for RenderedMenu<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> RenderedMenu<C> {
    /// Number of interactive entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing interactive was rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RenderedEntry<C>> {
        self.entries.get(index)
    }

    /// Index of the entry rendered as exactly `node`.
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.node == node)
    }

    /// Index of the entry whose node is `target` or one of its ancestors.
    pub fn entry_containing<S: Surface>(&self, surface: &S, target: NodeId) -> Option<usize> {
        self.index_of(target).or_else(|| {
            self.entries
                .iter()
                .position(|entry| surface.contains(entry.node, target))
        })
    }

    /// Whether every enclosing trigger is expanded.
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        let mut parent = self.entries.get(index).and_then(|e| e.parent);
        while let Some(p) = parent {
            let entry = &self.entries[p];
            if !entry.is_expanded() {
                return false;
            }
            parent = entry.parent;
        }
        true
    }

    /// Visible, enabled entries in document order.
    #[must_use]
    pub fn focusable(&self) -> Vec<usize> {
        (0..self.entries.len())
            .filter(|&i| !self.entries[i].disabled && self.is_visible(i))
            .collect()
    }

    /// First visible, enabled entry.
    #[must_use]
    pub fn first_focusable(&self) -> Option<usize> {
        self.focusable().first().copied()
    }

    /// First enabled direct child of a trigger.
    #[must_use]
    pub fn first_enabled_child(&self, trigger: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.parent == Some(trigger) && !e.disabled)
    }

    /// Number of expanded triggers.
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_expanded()).count()
    }

    /// Action of a leaf entry.
    #[must_use]
    pub fn action(&self, index: usize) -> Option<Action<C>> {
        match &self.entries.get(index)?.kind {
            EntryKind::Leaf { action } => action.clone(),
            EntryKind::Trigger { .. } => None,
        }
    }

    /// Show or hide a trigger's nested list.
    ///
    /// Collapsing also collapses every expanded descendant. Leaves are
    /// ignored.
    pub fn set_expanded<S: Surface>(
        &mut self,
        surface: &mut S,
        index: usize,
        expanded: bool,
    ) -> Result<(), MenuError> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(());
        };
        let node = entry.node;
        let submenu = match &mut entry.kind {
            EntryKind::Trigger {
                submenu,
                expanded: flag,
            } => {
                *flag = expanded;
                *submenu
            }
            EntryKind::Leaf { .. } => return Ok(()),
        };

        surface.set_attribute(node, "aria-expanded", bool_attr(expanded))?;
        surface.set_style(submenu, "display", if expanded { "block" } else { "none" })?;
        tracing::trace!(%node, expanded, "submenu toggled");

        if !expanded {
            let children: Vec<usize> = (0..self.entries.len())
                .filter(|&i| self.entries[i].parent == Some(index) && self.entries[i].is_expanded())
                .collect();
            for child in children {
                self.set_expanded(surface, child, false)?;
            }
        }
        Ok(())
    }

    /// Collapse every expanded trigger sharing `index`'s level.
    pub fn collapse_siblings<S: Surface>(
        &mut self,
        surface: &mut S,
        index: usize,
    ) -> Result<(), MenuError> {
        let Some(parent) = self.entries.get(index).map(|e| e.parent) else {
            return Ok(());
        };
        let siblings: Vec<usize> = (0..self.entries.len())
            .filter(|&i| i != index && self.entries[i].parent == parent && self.entries[i].is_expanded())
            .collect();
        for sibling in siblings {
            self.set_expanded(surface, sibling, false)?;
        }
        Ok(())
    }

    /// Collapse siblings, then flip a trigger's expanded flag.
    pub fn toggle<S: Surface>(&mut self, surface: &mut S, index: usize) -> Result<(), MenuError> {
        self.collapse_siblings(surface, index)?;
        let expanded = self.entries.get(index).is_some_and(RenderedEntry::is_expanded);
        self.set_expanded(surface, index, !expanded)
    }

    /// Collapse every expanded trigger.
    pub fn collapse_all<S: Surface>(&mut self, surface: &mut S) -> Result<(), MenuError> {
        let top: Vec<usize> = (0..self.entries.len())
            .filter(|&i| self.entries[i].is_expanded())
            .collect();
        for index in top {
            self.set_expanded(surface, index, false)?;
        }
        Ok(())
    }
}

/// Builds visual nodes for a menu tree.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    config: &'a MenuConfig,
}

impl<'a> Renderer<'a> {
    /// Create a renderer using the given class names and indicator.
    #[must_use]
    pub const fn new(config: &'a MenuConfig) -> Self {
        Self { config }
    }

    /// Replace the children of `root` with a rendering of `tree`.
    ///
    /// Disabled predicates are evaluated against `ctx` here and nowhere else.
    pub fn render<C, S: Surface>(
        &self,
        surface: &mut S,
        root: NodeId,
        tree: &[MenuEntry<C>],
        ctx: &C,
    ) -> Result<RenderedMenu<C>, MenuError> {
        surface.clear_children(root)?;

        let wrapper = surface.create_element("div")?;
        surface.set_attribute(wrapper, "class", &self.config.classes.wrapper)?;
        surface.set_attribute(wrapper, "role", "menu")?;

        let mut menu = RenderedMenu::default();
        self.render_entries(surface, wrapper, tree, ctx, None, &mut menu)?;
        surface.append_child(root, wrapper)?;
        Ok(menu)
    }

    fn render_entries<C, S: Surface>(
        &self,
        surface: &mut S,
        container: NodeId,
        entries: &[MenuEntry<C>],
        ctx: &C,
        parent: Option<usize>,
        menu: &mut RenderedMenu<C>,
    ) -> Result<(), MenuError> {
        for entry in entries {
            match entry {
                MenuEntry::Separator => {
                    let sep = surface.create_element("div")?;
                    surface.set_attribute(sep, "class", &self.config.classes.separator)?;
                    surface.set_attribute(sep, "role", "separator")?;
                    surface.append_child(container, sep)?;
                }
                MenuEntry::Item(item) => {
                    self.render_item(surface, container, item, ctx, parent, menu)?;
                }
            }
        }
        Ok(())
    }

    fn render_item<C, S: Surface>(
        &self,
        surface: &mut S,
        container: NodeId,
        item: &MenuItem<C>,
        ctx: &C,
        parent: Option<usize>,
        menu: &mut RenderedMenu<C>,
    ) -> Result<(), MenuError> {
        let classes = &self.config.classes;
        let disabled = item.disabled.resolve(ctx);
        let has_sub = item.is_submenu();

        let button = surface.create_element("button")?;
        surface.set_attribute(button, "class", &classes.item)?;
        surface.set_attribute(button, "role", "menuitem")?;
        surface.set_attribute(button, "aria-disabled", bool_attr(disabled))?;
        surface.set_attribute(button, "tabindex", if disabled { "-1" } else { "0" })?;
        if let Some(id) = &item.id {
            surface.set_attribute(button, "data-id", id)?;
        }
        if has_sub {
            surface.set_attribute(button, "data-has-sub", "1")?;
            surface.set_attribute(button, "aria-expanded", "false")?;
        }

        if let Some(icon) = &item.icon {
            self.span(surface, button, &classes.icon, icon)?;
        }
        self.span(surface, button, &classes.label, item.label.as_deref().unwrap_or(""))?;
        if let Some(accel) = &item.accel {
            self.span(surface, button, &classes.accel, accel)?;
        }
        if has_sub {
            self.span(surface, button, &classes.indicator, &self.config.submenu_indicator)?;
        }

        surface.listen(
            ListenTarget::Node(button),
            EventKind::PointerDown,
            ListenerOptions::default(),
        )?;
        surface.listen(
            ListenTarget::Node(button),
            EventKind::Click,
            ListenerOptions::default(),
        )?;
        surface.append_child(container, button)?;

        let index = menu.entries.len();
        if has_sub {
            let submenu = surface.create_element("div")?;
            surface.set_attribute(submenu, "class", &classes.submenu)?;
            surface.set_attribute(submenu, "role", "menu")?;
            surface.set_style(submenu, "display", "none")?;
            menu.entries.push(RenderedEntry {
                node: button,
                parent,
                disabled,
                kind: EntryKind::Trigger {
                    submenu,
                    expanded: false,
                },
            });
            self.render_entries(surface, submenu, &item.children, ctx, Some(index), menu)?;
            surface.append_child(container, submenu)?;
        } else {
            menu.entries.push(RenderedEntry {
                node: button,
                parent,
                disabled,
                kind: EntryKind::Leaf {
                    action: item.action.clone(),
                },
            });
        }
        Ok(())
    }

    fn span<S: Surface>(
        &self,
        surface: &mut S,
        parent: NodeId,
        class: &str,
        text: &str,
    ) -> Result<(), MenuError> {
        let span = surface.create_element("span")?;
        surface.set_attribute(span, "class", class)?;
        surface.set_text(span, text)?;
        surface.append_child(parent, span)?;
        Ok(())
    }
}

const fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MenuItem, MenuTree};
    use popmenu_core::Size;
    use popmenu_test::Document;

    struct Ctx {
        readonly: bool,
    }

    fn tree() -> MenuTree<Ctx> {
        vec![
            MenuItem::new("Open").id("open").icon("📂").accel("Ctrl+O").into(),
            MenuEntry::separator(),
            MenuItem::new("Save").disabled_when(|c: &Ctx| c.readonly).into(),
            MenuItem::submenu(
                "Export",
                vec![
                    MenuItem::new("PNG").into(),
                    MenuItem::submenu("Vector", vec![MenuItem::new("SVG").into()]).into(),
                ],
            )
            .into(),
            MenuItem::submenu("Share", vec![MenuItem::new("Link").into()]).into(),
        ]
    }

    fn render(doc: &mut Document, ctx: &Ctx) -> (NodeId, RenderedMenu<Ctx>) {
        let root = doc.create_root();
        let config = MenuConfig::default();
        let menu = Renderer::new(&config).render(doc, root, &tree(), ctx).unwrap();
        (root, menu)
    }

    fn doc() -> Document {
        Document::new(Size::new(800.0, 600.0))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[test]
    fn test_entries_in_document_order() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        // Open, Save, Export, PNG, Vector, SVG, Share, Link
        assert_eq!(menu.len(), 8);
        let labels: Vec<String> = (0..menu.len())
            .map(|i| doc.text_content(menu.get(i).unwrap().node()))
            .collect();
        assert!(labels[0].contains("Open"));
        assert!(labels[2].starts_with("Export"));
        assert_eq!(labels[5], "SVG");
        assert_eq!(menu.get(5).unwrap().parent(), Some(4));
        assert_eq!(menu.get(4).unwrap().parent(), Some(2));
    }

    #[test]
    fn test_separator_renders_divider_without_entry() {
        let mut doc = doc();
        let (root, menu) = render(&mut doc, &Ctx { readonly: false });
        let seps = doc.query_all(".sep");
        assert_eq!(seps.len(), 1);
        assert!(doc.contains(root, seps[0]));
        assert!(menu.index_of(seps[0]).is_none());
    }

    #[test]
    fn test_item_attributes() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        let open = menu.get(0).unwrap().node();
        assert_eq!(doc.attribute(open, "role").as_deref(), Some("menuitem"));
        assert_eq!(doc.attribute(open, "aria-disabled").as_deref(), Some("false"));
        assert_eq!(doc.attribute(open, "tabindex").as_deref(), Some("0"));
        assert_eq!(doc.attribute(open, "data-id").as_deref(), Some("open"));
        assert!(doc.attribute(open, "aria-expanded").is_none());
        assert_eq!(doc.text_content(open), "📂OpenCtrl+O");
    }

    #[test]
    fn test_trigger_attributes() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        let export = menu.get(2).unwrap();
        assert!(export.is_trigger());
        assert_eq!(doc.attribute(export.node(), "data-has-sub").as_deref(), Some("1"));
        assert_eq!(doc.attribute(export.node(), "aria-expanded").as_deref(), Some("false"));
        assert_eq!(doc.text_content(export.node()), "Export▶");
        let EntryKind::Trigger { submenu, expanded } = export.kind() else {
            panic!("Expected Trigger");
        };
        assert!(!expanded);
        assert_eq!(doc.style(*submenu, "display").as_deref(), Some("none"));
        assert_eq!(doc.attribute(*submenu, "class").as_deref(), Some("submenu"));
    }

    #[test]
    fn test_disabled_predicate_resolved_against_context() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: true });
        let save = menu.get(1).unwrap();
        assert!(save.is_disabled());
        assert_eq!(doc.attribute(save.node(), "aria-disabled").as_deref(), Some("true"));
        assert_eq!(doc.attribute(save.node(), "tabindex").as_deref(), Some("-1"));

        let mut doc2 = Document::new(Size::new(800.0, 600.0));
        let (_, menu) = render(&mut doc2, &Ctx { readonly: false });
        assert!(!menu.get(1).unwrap().is_disabled());
    }

    #[test]
    fn test_rerender_replaces_previous_content() {
        let mut doc = doc();
        let root = doc.create_root();
        let config = MenuConfig::default();
        let renderer = Renderer::new(&config);
        let ctx = Ctx { readonly: false };
        let _ = renderer.render(&mut doc, root, &tree(), &ctx).unwrap();
        let menu = renderer.render(&mut doc, root, &tree(), &ctx).unwrap();
        assert_eq!(doc.query_all(".item").len(), menu.len());
        assert_eq!(doc.children(root).len(), 1);
    }

    #[test]
    fn test_items_get_node_listeners() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        let node = menu.get(0).unwrap().node();
        assert!(doc.has_node_listener(node, EventKind::PointerDown));
        assert!(doc.has_node_listener(node, EventKind::Click));
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    #[test]
    fn test_focusable_excludes_hidden_and_disabled() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: true });
        // Open, Export, Share (Save disabled, nested hidden)
        assert_eq!(menu.focusable(), vec![0, 2, 6]);
        assert_eq!(menu.first_focusable(), Some(0));
    }

    #[test]
    fn test_set_expanded_mirrors_surface() {
        let mut doc = doc();
        let (_, mut menu) = render(&mut doc, &Ctx { readonly: false });
        menu.set_expanded(&mut doc, 2, true).unwrap();
        let export = menu.get(2).unwrap();
        assert!(export.is_expanded());
        assert_eq!(doc.attribute(export.node(), "aria-expanded").as_deref(), Some("true"));
        assert_eq!(menu.focusable(), vec![0, 1, 2, 3, 4, 6]);
    }

    #[test]
    fn test_collapse_clears_descendants() {
        let mut doc = doc();
        let (_, mut menu) = render(&mut doc, &Ctx { readonly: false });
        menu.set_expanded(&mut doc, 2, true).unwrap();
        menu.set_expanded(&mut doc, 4, true).unwrap();
        assert_eq!(menu.expanded_count(), 2);

        menu.set_expanded(&mut doc, 2, false).unwrap();
        assert_eq!(menu.expanded_count(), 0);
        let vector = menu.get(4).unwrap().node();
        assert_eq!(doc.attribute(vector, "aria-expanded").as_deref(), Some("false"));
    }

    #[test]
    fn test_toggle_collapses_siblings() {
        let mut doc = doc();
        let (_, mut menu) = render(&mut doc, &Ctx { readonly: false });
        menu.toggle(&mut doc, 2).unwrap();
        menu.toggle(&mut doc, 4).unwrap();
        assert!(menu.get(2).unwrap().is_expanded());
        assert!(menu.get(4).unwrap().is_expanded());

        menu.toggle(&mut doc, 6).unwrap();
        assert!(!menu.get(2).unwrap().is_expanded());
        assert!(!menu.get(4).unwrap().is_expanded());
        assert!(menu.get(6).unwrap().is_expanded());

        menu.toggle(&mut doc, 6).unwrap();
        assert_eq!(menu.expanded_count(), 0);
    }

    #[test]
    fn test_set_expanded_ignores_leaves() {
        let mut doc = doc();
        let (_, mut menu) = render(&mut doc, &Ctx { readonly: false });
        menu.set_expanded(&mut doc, 0, true).unwrap();
        assert_eq!(menu.expanded_count(), 0);
        menu.set_expanded(&mut doc, 99, true).unwrap();
    }

    #[test]
    fn test_first_enabled_child() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        assert_eq!(menu.first_enabled_child(2), Some(3));
        assert_eq!(menu.first_enabled_child(4), Some(5));
        assert_eq!(menu.first_enabled_child(0), None);
    }

    #[test]
    fn test_entry_containing_resolves_spans() {
        let mut doc = doc();
        let (_, menu) = render(&mut doc, &Ctx { readonly: false });
        let open = menu.get(0).unwrap().node();
        let span = doc.children(open)[1];
        assert_eq!(menu.entry_containing(&doc, span), Some(0));
        assert_eq!(menu.entry_containing(&doc, open), Some(0));
        assert_eq!(menu.entry_containing(&doc, doc.body()), None);
    }
}
