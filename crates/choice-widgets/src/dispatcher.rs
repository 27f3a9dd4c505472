#![forbid(unsafe_code)]

//! Outside-click routing.
//!
//! Open popups close when the user clicks anywhere outside their widget.
//! Rather than every widget watching the whole document, open widgets
//! register with one [`OutsideClickDispatcher`] and unregister on close.
//! The host reports each document pointer-down once, with the ids of the
//! widgets on the event path, and the dispatcher answers which registered
//! widgets were clicked outside of.
//!
//! [`global`] returns the process-wide instance. Hosts that need isolation
//! (tests, multiple documents) create their own [`SharedDispatcher`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Identity of one widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    /// A fresh id, unique within the process.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Registry of widgets whose popups are open.
#[derive(Debug, Default)]
pub struct OutsideClickDispatcher {
    open: Vec<WidgetId>,
}

impl OutsideClickDispatcher {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start routing outside clicks to `id`. Registering twice is harmless.
    pub fn register(&mut self, id: WidgetId) {
        if !self.open.contains(&id) {
            self.open.push(id);
        }
    }

    /// Stop routing outside clicks to `id`.
    pub fn unregister(&mut self, id: WidgetId) {
        self.open.retain(|open| *open != id);
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.open.contains(&id)
    }

    /// Number of registered widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Registered widgets that are not on `path`, in registration order.
    #[must_use]
    pub fn dispatch(&self, path: &[WidgetId]) -> Vec<WidgetId> {
        self.open
            .iter()
            .copied()
            .filter(|id| !path.contains(id))
            .collect()
    }
}

/// A dispatcher shared between widgets.
pub type SharedDispatcher = Arc<Mutex<OutsideClickDispatcher>>;

/// A new, isolated shared dispatcher.
#[must_use]
pub fn shared() -> SharedDispatcher {
    Arc::new(Mutex::new(OutsideClickDispatcher::new()))
}

/// The process-wide dispatcher.
#[must_use]
pub fn global() -> SharedDispatcher {
    static GLOBAL: OnceLock<SharedDispatcher> = OnceLock::new();
    Arc::clone(GLOBAL.get_or_init(shared))
}

/// Lock a shared dispatcher.
///
/// The registry is a plain list that is valid after any panic, so a
/// poisoned lock is recovered instead of propagated.
pub(crate) fn lock(dispatcher: &SharedDispatcher) -> MutexGuard<'_, OutsideClickDispatcher> {
    dispatcher
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = WidgetId::next();
        let b = WidgetId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn dispatch_reports_widgets_off_path() {
        let (a, b, c) = (WidgetId::next(), WidgetId::next(), WidgetId::next());
        let mut dispatcher = OutsideClickDispatcher::new();
        dispatcher.register(a);
        dispatcher.register(b);
        dispatcher.register(b);
        assert_eq!(dispatcher.len(), 2);

        assert_eq!(dispatcher.dispatch(&[a]), vec![b]);
        assert_eq!(dispatcher.dispatch(&[c]), vec![a, b]);
        assert!(dispatcher.dispatch(&[a, b]).is_empty());

        dispatcher.unregister(a);
        assert!(!dispatcher.is_registered(a));
        assert_eq!(dispatcher.dispatch(&[]), vec![b]);
    }

    #[test]
    fn global_is_one_instance() {
        let id = WidgetId::next();
        lock(&global()).register(id);
        assert!(lock(&global()).is_registered(id));
        lock(&global()).unregister(id);
        assert!(!lock(&global()).is_registered(id));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let dispatcher = shared();
        let clone = Arc::clone(&dispatcher);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock();
            panic!("poison the lock");
        })
        .join();
        assert!(dispatcher.is_poisoned());
        lock(&dispatcher).register(WidgetId::next());
        assert_eq!(lock(&dispatcher).len(), 1);
    }
}
