//! The interaction controller.
//!
//! A [`ContextMenu`] is a cheap handle to one mounted menu instance. It is
//! either closed, or open with two live document-scope subscriptions: a
//! capturing pointer-down listener for outside dismissal and a key-down
//! listener for keyboard navigation. All input reaches the instance through
//! [`ContextMenu::handle_event`].

use crate::error::MenuError;
use crate::model::{Action, MenuEntry, MenuTree};
use crate::placement;
use crate::registry::{Dismiss, Member, MenuId, Registry};
use crate::render::{RenderedMenu, Renderer};
use popmenu_core::{
    Event, EventKind, EventResponse, Key, ListenTarget, ListenerId, ListenerOptions, MenuConfig,
    NodeId, Point, Surface,
};
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed,
    Open {
        pointer_down: ListenerId,
        key_down: ListenerId,
    },
}

/// Result of reacting to an event while the instance is borrowed.
enum Transition<C> {
    Done(EventResponse),
    /// Run a leaf action with the borrow released, then close.
    Invoke {
        action: Action<C>,
        ctx: Rc<C>,
        response: EventResponse,
    },
}

struct MenuState<C> {
    id: MenuId,
    root: NodeId,
    items: MenuTree<C>,
    config: Rc<MenuConfig>,
    phase: Phase,
    ctx: Option<Rc<C>>,
    rendered: Option<RenderedMenu<C>>,
}

impl<C> MenuState<C> {
    fn open<S: Surface>(&mut self, surface: &mut S, anchor: Point, ctx: C) -> Result<(), MenuError> {
        if let Phase::Open {
            pointer_down,
            key_down,
        } = std::mem::replace(&mut self.phase, Phase::Closed)
        {
            surface.unlisten(pointer_down);
            surface.unlisten(key_down);
            surface.set_attribute(self.root, "data-open", "false")?;
        }
        self.rendered = None;
        self.ctx = None;

        let ctx = Rc::new(ctx);
        let rendered = Renderer::new(&self.config).render(surface, self.root, &self.items, &*ctx)?;
        let position = placement::place(surface, self.root, anchor, &self.config)?;
        surface.set_attribute(self.root, "data-open", "true")?;

        let pointer_down = surface.listen(
            ListenTarget::Document,
            EventKind::PointerDown,
            ListenerOptions::CAPTURE,
        )?;
        let key_down = surface.listen(
            ListenTarget::Document,
            EventKind::KeyDown,
            ListenerOptions::default(),
        )?;
        self.phase = Phase::Open {
            pointer_down,
            key_down,
        };
        self.ctx = Some(ctx);

        tracing::debug!(
            menu = %self.id,
            x = position.x,
            y = position.y,
            entries = rendered.len(),
            "menu opened"
        );

        if let Some(first) = rendered.first_focusable().and_then(|i| rendered.get(i)) {
            surface.focus(first.node())?;
        }
        self.rendered = Some(rendered);
        Ok(())
    }

    fn close<S: Surface>(&mut self, surface: &mut S) -> Result<(), MenuError> {
        let Phase::Open {
            pointer_down,
            key_down,
        } = std::mem::replace(&mut self.phase, Phase::Closed)
        else {
            return Ok(());
        };
        self.rendered = None;
        self.ctx = None;

        surface.set_attribute(self.root, "data-open", "false")?;
        surface.clear_children(self.root)?;
        surface.unlisten(pointer_down);
        surface.unlisten(key_down);
        tracing::debug!(menu = %self.id, "menu closed");
        Ok(())
    }

    fn react<S: Surface>(&mut self, surface: &mut S, event: &Event) -> Result<Transition<C>, MenuError> {
        if self.phase == Phase::Closed {
            return Ok(Transition::Done(EventResponse::Ignored));
        }
        match event {
            Event::PointerDown { target, .. } => {
                let inside = target.is_some_and(|t| surface.contains(self.root, t));
                if !inside {
                    self.close(surface)?;
                    return Ok(Transition::Done(EventResponse::HANDLED));
                }
                let on_item = target
                    .and_then(|t| self.rendered.as_ref()?.entry_containing(&*surface, t))
                    .is_some();
                Ok(Transition::Done(if on_item {
                    EventResponse::CONSUMED
                } else {
                    EventResponse::Ignored
                }))
            }
            Event::Click { target } => {
                match self
                    .rendered
                    .as_ref()
                    .and_then(|r| r.entry_containing(&*surface, *target))
                {
                    Some(index) => self.activate(surface, index, EventResponse::HANDLED),
                    None => Ok(Transition::Done(EventResponse::Ignored)),
                }
            }
            Event::KeyDown { key } => self.on_key(surface, *key),
        }
    }

    fn on_key<S: Surface>(&mut self, surface: &mut S, key: Key) -> Result<Transition<C>, MenuError> {
        let Some(rendered) = self.rendered.as_mut() else {
            return Ok(Transition::Done(EventResponse::Ignored));
        };
        let current = surface.focused().and_then(|node| rendered.index_of(node));

        match key {
            Key::Escape => {
                self.close(surface)?;
                Ok(Transition::Done(EventResponse::CONSUMED))
            }
            Key::Down | Key::Up => {
                let focusable = rendered.focusable();
                let position = current.and_then(|c| focusable.iter().position(|&i| i == c));
                let next = match (key, position) {
                    (_, _) if focusable.is_empty() => None,
                    (Key::Down, Some(p)) => Some(focusable[(p + 1) % focusable.len()]),
                    (Key::Down, None) => focusable.first().copied(),
                    (_, Some(p)) => Some(focusable[(p + focusable.len() - 1) % focusable.len()]),
                    (_, None) => focusable.last().copied(),
                };
                if let Some(entry) = next.and_then(|i| rendered.get(i)) {
                    surface.focus(entry.node())?;
                    tracing::trace!(menu = %self.id, node = %entry.node(), "focus moved");
                }
                Ok(Transition::Done(EventResponse::CONSUMED))
            }
            Key::Right => {
                let Some(index) = current.filter(|&i| rendered.get(i).is_some_and(|e| e.is_trigger()))
                else {
                    return Ok(Transition::Done(EventResponse::Ignored));
                };
                rendered.collapse_siblings(surface, index)?;
                rendered.set_expanded(surface, index, true)?;
                if let Some(child) = rendered.first_enabled_child(index).and_then(|i| rendered.get(i)) {
                    surface.focus(child.node())?;
                }
                Ok(Transition::Done(EventResponse::CONSUMED))
            }
            Key::Left => {
                let Some(parent) = current.and_then(|i| rendered.get(i)).and_then(|e| e.parent())
                else {
                    return Ok(Transition::Done(EventResponse::Ignored));
                };
                rendered.set_expanded(surface, parent, false)?;
                if let Some(trigger) = rendered.get(parent) {
                    surface.focus(trigger.node())?;
                }
                Ok(Transition::Done(EventResponse::CONSUMED))
            }
            Key::Enter | Key::Space => match current {
                Some(index) => self.activate(surface, index, EventResponse::CONSUMED),
                None => Ok(Transition::Done(EventResponse::CONSUMED)),
            },
            _ => Ok(Transition::Done(EventResponse::Ignored)),
        }
    }

    fn activate<S: Surface>(
        &mut self,
        surface: &mut S,
        index: usize,
        response: EventResponse,
    ) -> Result<Transition<C>, MenuError> {
        let Some(rendered) = self.rendered.as_mut() else {
            return Ok(Transition::Done(EventResponse::Ignored));
        };
        let Some(entry) = rendered.get(index) else {
            return Ok(Transition::Done(EventResponse::Ignored));
        };
        if entry.is_disabled() {
            return Ok(Transition::Done(EventResponse::Ignored));
        }
        let node = entry.node();
        if entry.is_trigger() {
            rendered.toggle(surface, index)?;
            return Ok(Transition::Done(response));
        }

        rendered.collapse_all(surface)?;
        tracing::debug!(menu = %self.id, %node, "item activated");
        match (rendered.action(index), self.ctx.clone()) {
            (Some(action), Some(ctx)) => Ok(Transition::Invoke {
                action,
                ctx,
                response,
            }),
            _ => {
                self.close(surface)?;
                Ok(Transition::Done(response))
            }
        }
    }
}

impl<C, S: Surface> Dismiss<S> for MenuState<C> {
    fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    fn close(&mut self, surface: &mut S) -> Result<(), MenuError> {
        Self::close(self, surface)
    }
}

/// Handle to one mounted menu instance.
///
/// Cloning the handle is cheap and yields another handle to the same
/// instance. Predicates and actions may capture handles and read them;
/// the read accessors never panic while the instance is busy.
pub struct ContextMenu<C, S: Surface> {
    id: MenuId,
    root: NodeId,
    config: Rc<MenuConfig>,
    state: Rc<RefCell<MenuState<C>>>,
    registry: Rc<Registry<S>>,
}

impl<C: 'static, S: Surface + 'static> ContextMenu<C, S> {
    /// Mount a menu on `root` with the default configuration.
    #[must_use]
    pub fn new(registry: &Rc<Registry<S>>, root: NodeId) -> Self {
        Self::with_config(registry, root, MenuConfig::default())
    }

    /// Mount a menu on `root` and register it for exclusivity.
    #[must_use]
    pub fn with_config(registry: &Rc<Registry<S>>, root: NodeId, config: MenuConfig) -> Self {
        let config = Rc::new(config);
        let state = Rc::new(RefCell::new(MenuState {
            id: MenuId(0),
            root,
            items: Vec::new(),
            config: Rc::clone(&config),
            phase: Phase::Closed,
            ctx: None,
            rendered: None,
        }));
        let member: Member<S> = state.clone();
        let id = registry.add(&member);
        state.borrow_mut().id = id;
        Self {
            id,
            root,
            config,
            state,
            registry: Rc::clone(registry),
        }
    }
}

impl<C, S: Surface> ContextMenu<C, S> {
    /// Replace the tree shown by the next `open`.
    pub fn set_items(&self, items: impl IntoIterator<Item = MenuEntry<C>>) -> &Self {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.items = items.into_iter().collect();
        } else {
            tracing::warn!(menu = %self.id, "set_items ignored while the menu is busy");
        }
        self
    }

    /// Open at `(x, y)` with a fresh context, closing every other menu first.
    ///
    /// Opening an already open menu re-renders and re-places it.
    pub fn open(&self, surface: &mut S, x: f32, y: f32, ctx: C) -> Result<(), MenuError> {
        let anchor = Point::new(x, y);
        if !anchor.is_finite() {
            return Err(MenuError::InvalidAnchor { x, y });
        }
        self.registry.close_all_except(surface, self.id)?;
        self.borrow_mut()?.open(surface, anchor, ctx)
    }

    /// Close the menu. No-op when already closed.
    pub fn close(&self, surface: &mut S) -> Result<(), MenuError> {
        self.borrow_mut()?.close(surface)
    }

    /// Close every other registered menu.
    pub fn close_others(&self, surface: &mut S) -> Result<(), MenuError> {
        self.registry.close_all_except(surface, self.id)
    }

    /// Feed one input event to the menu.
    ///
    /// Closed menus ignore everything. A leaf action runs after the menu's
    /// own state is released, then the menu closes.
    pub fn handle_event(&self, surface: &mut S, event: &Event) -> Result<EventResponse, MenuError> {
        let transition = self.borrow_mut()?.react(surface, event)?;
        match transition {
            Transition::Done(response) => Ok(response),
            Transition::Invoke {
                action,
                ctx,
                response,
            } => {
                action(&ctx);
                self.borrow_mut()?.close(surface)?;
                Ok(response)
            }
        }
    }

    /// Whether the menu is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state
            .try_borrow()
            .map_or(true, |state| state.phase != Phase::Closed)
    }

    /// Registry identifier.
    #[must_use]
    pub const fn id(&self) -> MenuId {
        self.id
    }

    /// Root node the menu renders into.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Number of expanded submenus in the open session.
    ///
    /// Zero while the menu is closed or busy rendering.
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.state.try_borrow().map_or(0, |state| {
            state
                .rendered
                .as_ref()
                .map_or(0, RenderedMenu::expanded_count)
        })
    }

    fn borrow_mut(&self) -> Result<RefMut<'_, MenuState<C>>, MenuError> {
        self.state
            .try_borrow_mut()
            .map_err(|_| MenuError::Reentrant(self.id))
    }
}

impl<C, S: Surface> Clone for ContextMenu<C, S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            root: self.root,
            config: Rc::clone(&self.config),
            state: Rc::clone(&self.state),
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<C, S: Surface> fmt::Debug for ContextMenu<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenu")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}
