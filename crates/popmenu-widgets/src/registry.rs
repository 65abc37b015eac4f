//! Process-wide coordination between menu instances.
//!
//! The host constructs one [`Registry`] and hands it to every
//! [`ContextMenu`](crate::ContextMenu) it creates. Opening any member closes
//! every other member first, so at most one menu is open at a time.

use crate::error::MenuError;
use popmenu_core::Surface;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier assigned to a registry member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(pub(crate) u64);

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Anything the registry can close to keep exclusivity.
pub trait Dismiss<S: Surface> {
    /// Whether the member is currently open.
    fn is_open(&self) -> bool;

    /// Transition to closed. Must be a no-op when already closed.
    fn close(&mut self, surface: &mut S) -> Result<(), MenuError>;
}

/// Shared handle to a registry member.
pub type Member<S> = Rc<RefCell<dyn Dismiss<S>>>;

struct Slot<S: Surface> {
    id: MenuId,
    member: Weak<RefCell<dyn Dismiss<S>>>,
}

/// Set of live menu instances enforcing the single-open-menu invariant.
pub struct Registry<S: Surface> {
    slots: RefCell<Vec<Slot<S>>>,
    next_id: Cell<u64>,
}

impl<S: Surface> Default for Registry<S> {
    fn default() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }
}

impl<S: Surface> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("members", &self.len())
            .finish()
    }
}

impl<S: Surface> Registry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Record a member. Adding the same member again returns its existing id.
    pub fn add(&self, member: &Member<S>) -> MenuId {
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots
            .iter()
            .find(|slot| slot.member.upgrade().is_some_and(|m| Rc::ptr_eq(&m, member)))
        {
            return slot.id;
        }

        let id = MenuId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        slots.push(Slot {
            id,
            member: Rc::downgrade(member),
        });
        tracing::trace!(menu = %id, "registered");
        id
    }

    /// Close every member except `target`.
    ///
    /// Members whose handles have all been dropped are pruned here.
    pub fn close_all_except(&self, surface: &mut S, target: MenuId) -> Result<(), MenuError> {
        for (id, member) in self.live_members() {
            if id == target {
                continue;
            }
            let mut member = member
                .try_borrow_mut()
                .map_err(|_| MenuError::Reentrant(id))?;
            member.close(surface)?;
        }
        Ok(())
    }

    /// Number of live members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_members().len()
    }

    /// Whether no live member is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of members currently open.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.live_members()
            .iter()
            .filter(|(_, member)| member.try_borrow().map_or(true, |m| m.is_open()))
            .count()
    }

    fn live_members(&self) -> Vec<(MenuId, Member<S>)> {
        let mut slots = self.slots.borrow_mut();
        slots.retain(|slot| slot.member.strong_count() > 0);
        slots
            .iter()
            .filter_map(|slot| slot.member.upgrade().map(|m| (slot.id, m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_core::Size;
    use popmenu_test::Document;

    #[derive(Default)]
    struct Probe {
        open: bool,
        closes: usize,
    }

    impl Dismiss<Document> for Probe {
        fn is_open(&self) -> bool {
            self.open
        }

        fn close(&mut self, _surface: &mut Document) -> Result<(), MenuError> {
            if self.open {
                self.open = false;
                self.closes += 1;
            }
            Ok(())
        }
    }

    fn probe(open: bool) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(Probe { open, closes: 0 }))
    }

    fn member(probe: &Rc<RefCell<Probe>>) -> Member<Document> {
        probe.clone()
    }

    #[test]
    fn test_add_is_idempotent() {
        let registry = Registry::<Document>::new();
        let a = probe(false);
        let first = registry.add(&member(&a));
        let second = registry.add(&member(&a));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_are_distinct() {
        let registry = Registry::<Document>::new();
        let a = registry.add(&member(&probe(false)));
        let b_probe = probe(false);
        let b = registry.add(&member(&b_probe));
        assert_ne!(a, b);
    }

    #[test]
    fn test_close_all_except_spares_target() {
        let mut doc = Document::new(Size::new(800.0, 600.0));
        let registry = Registry::<Document>::new();
        let a = probe(true);
        let b = probe(true);
        let c = probe(true);
        let _ = registry.add(&member(&a));
        let b_id = registry.add(&member(&b));
        let _ = registry.add(&member(&c));
        assert_eq!(registry.open_count(), 3);

        registry.close_all_except(&mut doc, b_id).unwrap();

        assert!(!a.borrow().open);
        assert!(b.borrow().open);
        assert!(!c.borrow().open);
        assert_eq!(registry.open_count(), 1);
    }

    #[test]
    fn test_close_all_except_is_idempotent_per_member() {
        let mut doc = Document::new(Size::new(800.0, 600.0));
        let registry = Registry::<Document>::new();
        let a = probe(true);
        let b = probe(false);
        let _ = registry.add(&member(&a));
        let b_id = registry.add(&member(&b));

        registry.close_all_except(&mut doc, b_id).unwrap();
        registry.close_all_except(&mut doc, b_id).unwrap();
        assert_eq!(a.borrow().closes, 1);
    }

    #[test]
    fn test_dropped_members_are_pruned() {
        let mut doc = Document::new(Size::new(800.0, 600.0));
        let registry = Registry::<Document>::new();
        let keep = probe(true);
        let keep_id = registry.add(&member(&keep));
        {
            let gone = probe(true);
            let _ = registry.add(&member(&gone));
            assert_eq!(registry.len(), 2);
        }
        registry.close_all_except(&mut doc, keep_id).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_busy_member_reports_reentrancy() {
        let mut doc = Document::new(Size::new(800.0, 600.0));
        let registry = Registry::<Document>::new();
        let a = probe(true);
        let a_id = registry.add(&member(&a));
        let other = registry.add(&member(&probe(false)));
        let _guard = a.borrow_mut();

        let err = registry.close_all_except(&mut doc, other).unwrap_err();
        assert_eq!(err, MenuError::Reentrant(a_id));
    }
}
