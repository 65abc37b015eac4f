//! Declarative menu content.
//!
//! A menu is a tree of [`MenuEntry`] values: interactive [`MenuItem`]s and
//! separators. An item with a non-empty `children` list is a submenu trigger.
//! The model carries no behavior beyond two optional callbacks evaluated
//! against the caller's context `C`.

use std::fmt;
use std::rc::Rc;

/// Callback invoked when an item is activated.
pub type Action<C> = Rc<dyn Fn(&C)>;

/// Predicate deciding whether an item is disabled for a context.
pub type Predicate<C> = Rc<dyn Fn(&C) -> bool>;

/// Ordered sequence of entries, possibly nested.
pub type MenuTree<C> = Vec<MenuEntry<C>>;

/// Disabled state of an item.
pub enum Disabled<C> {
    /// Fixed state
    Flag(bool),
    /// Evaluated against the context every time the menu is rendered
    When(Predicate<C>),
}

impl<C> Disabled<C> {
    /// Resolve against a context.
    pub fn resolve(&self, ctx: &C) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::When(predicate) => predicate(ctx),
        }
    }
}

impl<C> Default for Disabled<C> {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl<C> Clone for Disabled<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Flag(flag) => Self::Flag(*flag),
            Self::When(predicate) => Self::When(Rc::clone(predicate)),
        }
    }
}

impl<C> fmt::Debug for Disabled<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::When(_) => f.write_str("When(<fn>)"),
        }
    }
}

impl<C> From<bool> for Disabled<C> {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// One interactive menu item.
pub struct MenuItem<C> {
    /// Optional identifier, rendered as `data-id`
    pub id: Option<String>,
    /// Label text
    pub label: Option<String>,
    /// Icon text (emoji, glyph, ...)
    pub icon: Option<String>,
    /// Accelerator hint, display only
    pub accel: Option<String>,
    /// Disabled state
    pub disabled: Disabled<C>,
    /// Activation callback; never invoked on submenu triggers
    pub action: Option<Action<C>>,
    /// Nested entries; non-empty makes this a submenu trigger
    pub children: Vec<MenuEntry<C>>,
}

impl<C> MenuItem<C> {
    /// Create an item with a label and nothing else.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: Some(label.into()),
            icon: None,
            accel: None,
            disabled: Disabled::default(),
            action: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf item with an action.
    #[must_use]
    pub fn action(label: impl Into<String>, action: impl Fn(&C) + 'static) -> Self {
        Self::new(label).on_activate(action)
    }

    /// Create a submenu trigger.
    #[must_use]
    pub fn submenu(label: impl Into<String>, children: Vec<MenuEntry<C>>) -> Self {
        Self::new(label).children(children)
    }

    /// Set the identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the accelerator hint.
    #[must_use]
    pub fn accel(mut self, accel: impl Into<String>) -> Self {
        self.accel = Some(accel.into());
        self
    }

    /// Set a fixed disabled state.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Disabled::Flag(disabled);
        self
    }

    /// Disable the item whenever `predicate` holds for the context.
    #[must_use]
    pub fn disabled_when(mut self, predicate: impl Fn(&C) -> bool + 'static) -> Self {
        self.disabled = Disabled::When(Rc::new(predicate));
        self
    }

    /// Set the activation callback.
    #[must_use]
    pub fn on_activate(mut self, action: impl Fn(&C) + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    /// Replace the nested entries.
    #[must_use]
    pub fn children(mut self, children: Vec<MenuEntry<C>>) -> Self {
        self.children = children;
        self
    }

    /// Whether activating this item toggles a submenu.
    ///
    /// An empty `children` list is the same as none.
    #[must_use]
    pub fn is_submenu(&self) -> bool {
        !self.children.is_empty()
    }
}

impl<C> Clone for MenuItem<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            icon: self.icon.clone(),
            accel: self.accel.clone(),
            disabled: self.disabled.clone(),
            action: self.action.clone(),
            children: self.children.clone(),
        }
    }
}

impl<C> fmt::Debug for MenuItem<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("accel", &self.accel)
            .field("disabled", &self.disabled)
            .field("action", &self.action.as_ref().map(|_| "<fn>"))
            .field("children", &self.children)
            .finish()
    }
}

/// An item or a separator.
pub enum MenuEntry<C> {
    /// Interactive item
    Item(MenuItem<C>),
    /// Visual divider, never focusable
    Separator,
}

impl<C> MenuEntry<C> {
    /// Create a separator.
    #[must_use]
    pub const fn separator() -> Self {
        Self::Separator
    }

    /// The item, unless this is a separator.
    #[must_use]
    pub const fn as_item(&self) -> Option<&MenuItem<C>> {
        match self {
            Self::Item(item) => Some(item),
            Self::Separator => None,
        }
    }

    /// Whether this entry is a separator.
    #[must_use]
    pub const fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }
}

impl<C> From<MenuItem<C>> for MenuEntry<C> {
    fn from(item: MenuItem<C>) -> Self {
        Self::Item(item)
    }
}

impl<C> Clone for MenuEntry<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Item(item) => Self::Item(item.clone()),
            Self::Separator => Self::Separator,
        }
    }
}

impl<C> fmt::Debug for MenuEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(item) => f.debug_tuple("Item").field(item).finish(),
            Self::Separator => f.write_str("Separator"),
        }
    }
}
