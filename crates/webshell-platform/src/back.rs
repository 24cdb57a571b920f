//! Hardware back-button dispatch with scoped subscriptions.
//!
//! Listeners run newest-first; the first one returning `true` consumes the
//! press and later listeners are skipped. An unconsumed press is the host's
//! to handle (usually app exit).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::services::BackButtonSource;

type Listener = Box<dyn FnMut() -> bool>;

struct Slot {
    id: u64,
    /// `None` while the listener is executing.
    listener: Option<Listener>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: Vec<Slot>,
}

/// Single-threaded back-press dispatcher.
#[derive(Clone, Default)]
pub struct BackHandler {
    registry: Rc<RefCell<Registry>>,
}

impl BackHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.borrow().slots.len()
    }

    /// Deliver a back press. Returns whether a listener consumed it.
    ///
    /// Listeners may remove their own (or any other) subscription while
    /// running; a removed listener is never called again.
    pub fn press(&self) -> bool {
        let ids: Vec<u64> = self
            .registry
            .borrow()
            .slots
            .iter()
            .rev()
            .map(|s| s.id)
            .collect();

        for id in ids {
            let taken = {
                let mut reg = self.registry.borrow_mut();
                reg.slots
                    .iter_mut()
                    .find(|s| s.id == id)
                    .and_then(|s| s.listener.take())
            };
            let Some(mut listener) = taken else {
                continue;
            };

            let consumed = listener();

            if let Some(slot) = self
                .registry
                .borrow_mut()
                .slots
                .iter_mut()
                .find(|s| s.id == id)
            {
                slot.listener = Some(listener);
            }

            if consumed {
                return true;
            }
        }
        false
    }
}

impl BackButtonSource for BackHandler {
    fn subscribe(&self, handler: Box<dyn FnMut() -> bool>) -> BackSubscription {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.slots.push(Slot {
                id,
                listener: Some(handler),
            });
            id
        };
        log::debug!("back listener {id} registered");

        let registry: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        BackSubscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().slots.retain(|s| s.id != id);
                log::debug!("back listener {id} removed");
            }
        })
    }
}

/// Registration handle for a back-button listener.
///
/// Releasing the handle (via [`remove`](Self::remove) or drop) deregisters
/// the listener exactly once.
pub struct BackSubscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl BackSubscription {
    /// Wrap a release action. Sources other than [`BackHandler`] use this to
    /// hook their own deregistration.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Whether the listener is still registered through this handle.
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    /// Deregister the listener now.
    pub fn remove(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for BackSubscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for BackSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn press_without_listeners_is_not_consumed() {
        let handler = BackHandler::new();
        assert!(!handler.press());
    }

    #[test]
    fn consuming_listener_stops_dispatch() {
        let handler = BackHandler::new();
        let older = counter();
        let older_c = Rc::clone(&older);
        let _a = handler.subscribe(Box::new(move || {
            older_c.set(older_c.get() + 1);
            false
        }));
        let _b = handler.subscribe(Box::new(|| true));

        assert!(handler.press());
        // Newest listener consumed it; the older one never ran.
        assert_eq!(older.get(), 0);
    }

    #[test]
    fn non_consuming_listeners_all_run_newest_first() {
        let handler = BackHandler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _a = handler.subscribe(Box::new(move || {
            o1.borrow_mut().push("first");
            false
        }));
        let _b = handler.subscribe(Box::new(move || {
            o2.borrow_mut().push("second");
            false
        }));

        assert!(!handler.press());
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn removed_listener_is_never_called() {
        let handler = BackHandler::new();
        let calls = counter();
        let c = Rc::clone(&calls);
        let sub = handler.subscribe(Box::new(move || {
            c.set(c.get() + 1);
            true
        }));
        assert!(handler.press());
        sub.remove();

        assert!(!handler.press());
        assert_eq!(calls.get(), 1);
        assert_eq!(handler.listener_count(), 0);
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let handler = BackHandler::new();
        {
            let _sub = handler.subscribe(Box::new(|| true));
            assert_eq!(handler.listener_count(), 1);
        }
        assert_eq!(handler.listener_count(), 0);
        assert!(!handler.press());
    }

    #[test]
    fn subscription_outliving_handler_is_harmless() {
        let handler = BackHandler::new();
        let sub = handler.subscribe(Box::new(|| true));
        drop(handler);
        assert!(sub.is_active());
        sub.remove();
    }

    #[test]
    fn listener_can_remove_itself_mid_press() {
        let handler = BackHandler::new();
        let slot: Rc<RefCell<Option<BackSubscription>>> = Rc::new(RefCell::new(None));
        let slot_c = Rc::clone(&slot);
        let calls = counter();
        let c = Rc::clone(&calls);
        let sub = handler.subscribe(Box::new(move || {
            c.set(c.get() + 1);
            slot_c.borrow_mut().take();
            true
        }));
        *slot.borrow_mut() = Some(sub);

        assert!(handler.press());
        assert!(!handler.press());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn release_runs_once() {
        let released = counter();
        let r = Rc::clone(&released);
        let sub = BackSubscription::new(move || r.set(r.get() + 1));
        assert!(sub.is_active());
        sub.remove();
        assert_eq!(released.get(), 1);
    }
}
