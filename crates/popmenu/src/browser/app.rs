//! Browser host wiring DOM events to mounted menus.

use super::dom::DomSurface;
use popmenu_core::{EventResponse, MenuConfig, SurfaceError};
use popmenu_widgets::{ContextMenu, MenuEntry, MenuError, Registry};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::Element;

/// Owns the DOM surface, the registry and every mounted menu.
///
/// Events reach each menu that is open when the event arrives. Menu
/// actions run while the host dispatches, so an action must not call back
/// into [`BrowserHost::open`] synchronously; the call reports
/// [`MenuError::Surface`] instead.
pub struct BrowserHost<C> {
    surface: Rc<RefCell<DomSurface>>,
    registry: Rc<Registry<DomSurface>>,
    menus: Rc<RefCell<Vec<ContextMenu<C, DomSurface>>>>,
}

fn busy() -> MenuError {
    MenuError::Surface(SurfaceError::Backend("surface busy".to_string()))
}

impl<C: 'static> BrowserHost<C> {
    /// Create a host over the current document.
    pub fn new() -> Result<Self, MenuError> {
        console_error_panic_hook::set_once();

        let surface = Rc::new(RefCell::new(DomSurface::new()?));
        let menus: Rc<RefCell<Vec<ContextMenu<C, DomSurface>>>> = Rc::default();

        let weak = Rc::downgrade(&surface);
        let listening = Rc::clone(&menus);
        surface.borrow().set_dispatcher(move |event| {
            let Some(surface) = weak.upgrade() else {
                return EventResponse::Ignored;
            };
            let Ok(mut surface) = surface.try_borrow_mut() else {
                tracing::warn!("surface busy; event dropped");
                return EventResponse::Ignored;
            };
            let open: Vec<_> = listening
                .borrow()
                .iter()
                .filter(|menu| menu.is_open())
                .cloned()
                .collect();
            open.iter().fold(EventResponse::Ignored, |response, menu| {
                match menu.handle_event(&mut *surface, event) {
                    Ok(r) => response.merge(r),
                    Err(err) => {
                        tracing::warn!(menu = %menu.id(), %err, "event handling failed");
                        response
                    }
                }
            })
        });

        Ok(Self {
            surface,
            registry: Registry::new(),
            menus,
        })
    }

    /// Mount a menu on an existing element.
    pub fn mount(
        &self,
        root: Element,
        items: Vec<MenuEntry<C>>,
    ) -> Result<ContextMenu<C, DomSurface>, MenuError> {
        self.mount_with_config(root, items, MenuConfig::default())
    }

    /// Mount a menu with a custom configuration.
    pub fn mount_with_config(
        &self,
        root: Element,
        items: Vec<MenuEntry<C>>,
        config: MenuConfig,
    ) -> Result<ContextMenu<C, DomSurface>, MenuError> {
        let root = self.surface.try_borrow_mut().map_err(|_| busy())?.adopt(root)?;
        let menu = ContextMenu::with_config(&self.registry, root, config);
        menu.set_items(items);
        self.menus.borrow_mut().push(menu.clone());
        Ok(menu)
    }

    /// Open a menu at viewport coordinates.
    pub fn open(
        &self,
        menu: &ContextMenu<C, DomSurface>,
        x: f32,
        y: f32,
        ctx: C,
    ) -> Result<(), MenuError> {
        let mut surface = self.surface.try_borrow_mut().map_err(|_| busy())?;
        menu.open(&mut surface, x, y, ctx)
    }

    /// Close a menu.
    pub fn close(&self, menu: &ContextMenu<C, DomSurface>) -> Result<(), MenuError> {
        let mut surface = self.surface.try_borrow_mut().map_err(|_| busy())?;
        menu.close(&mut surface)
    }

    /// Close every open menu.
    pub fn close_all(&self) -> Result<(), MenuError> {
        let mut surface = self.surface.try_borrow_mut().map_err(|_| busy())?;
        let menus = self.menus.borrow().clone();
        for menu in &menus {
            menu.close(&mut surface)?;
        }
        Ok(())
    }

    /// Number of mounted menus.
    pub fn menu_count(&self) -> usize {
        self.menus.borrow().len()
    }

    /// The shared surface.
    pub fn surface(&self) -> &Rc<RefCell<DomSurface>> {
        &self.surface
    }

    /// The shared registry.
    pub fn registry(&self) -> &Rc<Registry<DomSurface>> {
        &self.registry
    }
}
