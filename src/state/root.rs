use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::config::WindowStoreConfig;
use super::controller::WindowController;
use super::window::{Transition, WindowChange, WindowDelta, WindowKey, WindowState};
use super::WindowStateStore;

pub type Listener = Arc<dyn Fn(&WindowChange) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// Shared handle to the window store of one UI root.
///
/// Clones refer to the same store. Separate roots never share state.
#[derive(Clone)]
pub struct WindowRoot {
    store: Arc<Mutex<WindowStateStore>>,
    listeners: Arc<Mutex<Listeners>>,
}

impl Default for WindowRoot {
    fn default() -> Self {
        Self::new(WindowStoreConfig::default())
    }
}

impl WindowRoot {
    pub fn new(config: WindowStoreConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(WindowStateStore::new(config))),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Read-only access to the store. Mutation goes through `set_state` so
    /// that every change reaches subscribers.
    pub fn with_store<R>(&self, read: impl FnOnce(&WindowStateStore) -> R) -> R {
        read(&self.store())
    }

    /// A poisoned lock is recovered: every transition completes before the
    /// guard is released, so the data is consistent.
    fn store(&self) -> MutexGuard<'_, WindowStateStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_state(&self, key: &WindowKey) -> WindowState {
        self.store().get_state(key)
    }

    /// Apply a transition, then notify subscribers outside the store lock
    pub fn set_state(&self, key: &WindowKey, delta: WindowDelta) -> Transition {
        let transition = self.store().set_state(key, delta);
        self.publish(&transition);
        transition
    }

    pub fn config(&self) -> WindowStoreConfig {
        *self.store().config()
    }

    pub fn stacking_order(&self) -> Vec<WindowKey> {
        self.store().stacking_order()
    }

    pub fn focused(&self) -> Option<WindowKey> {
        self.store().focused().cloned()
    }

    pub fn snapshot(&self) -> Vec<(WindowKey, WindowState)> {
        self.store().snapshot()
    }

    /// Handle bound to `key`; stays valid across every state change
    pub fn controller(&self, key: impl Into<WindowKey>, title: impl Into<String>) -> WindowController {
        WindowController::new(self.clone(), key.into(), title.into())
    }

    pub fn subscribe(&self, listener: impl Fn(&WindowChange) + Send + Sync + 'static) -> SubscriptionId {
        let mut listeners = self.listeners();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, transition: &Transition) {
        if transition.changes.is_empty() {
            return;
        }
        // Snapshot so listeners may subscribe or call back into the root
        let listeners: Vec<Listener> = self
            .listeners()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for change in &transition.changes {
            for listener in &listeners {
                listener(change);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::window::{Size, TransitionKind};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(root: &WindowRoot) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        root.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_roots_are_independent() {
        let left = WindowRoot::default();
        let right = WindowRoot::default();
        left.set_state(&"a".into(), WindowDelta::open());

        assert!(left.get_state(&"a".into()).open);
        assert!(!right.get_state(&"a".into()).open);
    }

    #[test]
    fn test_clones_share_store() {
        let root = WindowRoot::default();
        let other = root.clone();
        root.set_state(&"a".into(), WindowDelta::open());
        assert_eq!(other.focused(), Some(WindowKey::new("a")));
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let root = WindowRoot::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        root.subscribe(move |change| {
            sink.lock().unwrap().push((change.key.clone(), change.state.is_focused));
        });

        root.set_state(&"a".into(), WindowDelta::open());
        root.set_state(&"b".into(), WindowDelta::open());

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (WindowKey::new("a"), true),
                (WindowKey::new("b"), true),
                (WindowKey::new("a"), false),
            ]
        );
    }

    #[test]
    fn test_noop_publishes_nothing() {
        let root = WindowRoot::default();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        root.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        root.set_state(&"a".into(), WindowDelta::Close);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let root = WindowRoot::default();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = root.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(root.unsubscribe(id));
        assert!(!root.unsubscribe(id));
        root.set_state(&"a".into(), WindowDelta::open());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_read_back() {
        let root = WindowRoot::default();
        let reader = root.clone();
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        root.subscribe(move |change| {
            *sink.lock().unwrap() = Some(reader.get_state(&change.key));
        });

        root.set_state(&"a".into(), WindowDelta::open());
        assert!(observed.lock().unwrap().is_some_and(|s| s.open));
    }

    #[test]
    fn test_with_store_reads_current_state() {
        let root = WindowRoot::default();
        root.set_state(&"a".into(), WindowDelta::open());
        root.set_state(&"b".into(), WindowDelta::open());

        let (open, capacity) = root.with_store(|store| (store.open_count(), store.capacity()));
        assert_eq!(open, 2);
        assert_eq!(capacity, 1024);
    }

    #[test]
    fn test_every_public_mutation_is_published() {
        let root = WindowRoot::default();
        let count = counting_listener(&root);
        let window = root.controller("a", "A");

        window.open(None, None);
        window.resize(Size::new(200.0, 100.0));
        window.close();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_poisoned_store_lock_is_recovered() {
        let root = WindowRoot::default();
        root.set_state(&"a".into(), WindowDelta::open());

        let poisoner = root.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(move || {
            let _guard = poisoner.store();
            panic!("render handler crashed while holding the store");
        }));
        assert!(result.is_err());
        assert!(root.store.is_poisoned());

        let count = counting_listener(&root);
        let t = root.set_state(&"b".into(), WindowDelta::open());
        assert_eq!(t.kind, TransitionKind::Admit);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        let a = root.get_state(&"a".into());
        let b = root.get_state(&"b".into());
        assert!(a.open && !a.is_focused);
        assert!(b.open && b.is_focused);
        assert!(b.z_index > a.z_index);
        assert_eq!(root.focused(), Some(WindowKey::new("b")));
    }

    #[test]
    fn test_poisoned_listener_lock_is_recovered() {
        let root = WindowRoot::default();
        let count = counting_listener(&root);

        let poisoner = root.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(move || {
            let _guard = poisoner.listeners();
            panic!("subscriber setup crashed while holding the listeners");
        }));
        assert!(result.is_err());
        assert!(root.listeners.is_poisoned());

        let late = counting_listener(&root);
        root.set_state(&"a".into(), WindowDelta::open());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(late.load(Ordering::SeqCst), 1);
        assert!(root.get_state(&"a".into()).is_focused);
    }
}
