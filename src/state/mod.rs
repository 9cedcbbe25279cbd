use std::collections::HashMap;
use tracing::debug;

use self::config::WindowStoreConfig;
use self::stack::StackEntry;
use self::window::{
    Point, Size, Transition, TransitionKind, WindowChange, WindowDelta, WindowKey, WindowState,
};

pub mod config;
pub mod controller;
pub mod root;
pub mod stack;
pub mod window;

/// Single source of truth for the windows of one UI root
pub struct WindowStateStore {
    config: WindowStoreConfig,
    windows: HashMap<WindowKey, WindowState>,
    stack: Vec<StackEntry>, // Open windows, highest z-index first
}

impl Default for WindowStateStore {
    fn default() -> Self {
        Self::new(WindowStoreConfig::default())
    }
}

impl WindowStateStore {
    pub fn new(config: WindowStoreConfig) -> Self {
        Self {
            config: config.sanitized(),
            windows: HashMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn config(&self) -> &WindowStoreConfig {
        &self.config
    }

    /// Current state for `key`, or a defaulted closed state if never seen
    pub fn get_state(&self, key: &WindowKey) -> WindowState {
        self.windows
            .get(key)
            .copied()
            .unwrap_or_else(|| self.default_state())
    }

    /// Apply one transition. Never fails; malformed geometry is clamped.
    pub fn set_state(&mut self, key: &WindowKey, delta: WindowDelta) -> Transition {
        let was_open = self.windows.get(key).is_some_and(|w| w.open);
        if !was_open && delta == WindowDelta::Close {
            return Transition::noop();
        }

        // Only the target and currently open windows can change
        let before: Vec<(WindowKey, Option<WindowState>)> = std::iter::once(key)
            .chain(self.stack.iter().map(|e| &e.key).filter(|k| *k != key))
            .map(|k| (k.clone(), self.windows.get(k).copied()))
            .collect();

        let (kind, evicted) = match (was_open, delta) {
            (false, WindowDelta::Close) => return Transition::noop(),
            (false, WindowDelta::Open { position, size }) => {
                (TransitionKind::Admit, self.admit(key, position, size))
            }
            (true, WindowDelta::Open { position, size }) => {
                (TransitionKind::Promote, self.promote(key, position, size))
            }
            (true, WindowDelta::Close) => {
                self.retire(key);
                (TransitionKind::Retire, None)
            }
        };

        debug!(key = %key, ?kind, evicted = ?evicted.as_ref().map(WindowKey::as_str), "window transition");

        let changes = before
            .into_iter()
            .filter_map(|(key, prev)| {
                let state = self.windows.get(&key).copied()?;
                (prev != Some(state)).then_some(WindowChange { key, state })
            })
            .collect();

        Transition {
            kind,
            evicted,
            changes,
        }
    }

    /// Open keys, topmost first
    pub fn stacking_order(&self) -> Vec<WindowKey> {
        self.stack.iter().map(|e| e.key.clone()).collect()
    }

    /// Open windows with their state, topmost first
    pub fn snapshot(&self) -> Vec<(WindowKey, WindowState)> {
        self.stack
            .iter()
            .map(|e| (e.key.clone(), self.get_state(&e.key)))
            .collect()
    }

    pub fn focused(&self) -> Option<&WindowKey> {
        self.stack.first().map(|e| &e.key)
    }

    pub fn open_count(&self) -> usize {
        self.stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    fn default_state(&self) -> WindowState {
        WindowState::closed(
            self.config.default_position,
            self.config.default_size,
            self.config.z_index_min,
        )
    }

    fn admit(
        &mut self,
        key: &WindowKey,
        position: Option<Point>,
        size: Option<Size>,
    ) -> Option<WindowKey> {
        let mut state = self.get_state(key);
        merge_geometry(&mut state, position, size);
        state.open = true;
        self.windows.insert(key.clone(), state);

        let evicted = stack::admit(
            &mut self.stack,
            key.clone(),
            self.config.z_index_min,
            self.config.z_index_max,
        );
        self.close_evicted(evicted.as_ref());
        self.sync_stack();
        evicted
    }

    fn promote(
        &mut self,
        key: &WindowKey,
        position: Option<Point>,
        size: Option<Size>,
    ) -> Option<WindowKey> {
        if let Some(state) = self.windows.get_mut(key) {
            merge_geometry(state, position, size);
        }

        let evicted = stack::promote(
            &mut self.stack,
            key.clone(),
            self.config.z_index_min,
            self.config.z_index_max,
        );
        self.close_evicted(evicted.as_ref());
        self.sync_stack();
        evicted
    }

    fn retire(&mut self, key: &WindowKey) {
        if let Some(state) = self.windows.get_mut(key) {
            state.open = false;
            state.is_focused = false;
        }
        stack::remove(&mut self.stack, key);
        self.sync_stack();
    }

    fn close_evicted(&mut self, evicted: Option<&WindowKey>) {
        if let Some(state) = evicted.and_then(|k| self.windows.get_mut(k)) {
            state.open = false;
            state.is_focused = false;
        }
    }

    /// Copy stack z-indices into the per-key states and focus the top entry
    fn sync_stack(&mut self) {
        for (i, entry) in self.stack.iter().enumerate() {
            if let Some(state) = self.windows.get_mut(&entry.key) {
                state.z_index = entry.z_index;
                state.is_focused = i == 0;
            }
        }
    }
}

fn merge_geometry(state: &mut WindowState, position: Option<Point>, size: Option<Size>) {
    if let Some(position) = position {
        state.position = position.sanitized();
    }
    if let Some(size) = size {
        state.size = size.sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(s: &str) -> WindowKey {
        WindowKey::new(s)
    }

    fn small_store(z_min: i32, z_max: i32) -> WindowStateStore {
        WindowStateStore::new(WindowStoreConfig {
            z_index_min: z_min,
            z_index_max: z_max,
            ..WindowStoreConfig::default()
        })
    }

    #[test]
    fn test_unseen_key_is_default_closed() {
        let store = WindowStateStore::default();
        let state = store.get_state(&k("nope"));
        assert!(!state.open);
        assert!(!state.is_focused);
        assert_eq!(state.position, store.config().default_position);
        assert_eq!(state.size, store.config().default_size);
        assert_eq!(state.z_index, store.config().z_index_min);
    }

    #[test]
    fn test_admit_focuses_and_reports_change() {
        let mut store = WindowStateStore::default();
        let t = store.set_state(&k("a"), WindowDelta::open_at(Point::new(5.0, 6.0)));

        assert_eq!(t.kind, TransitionKind::Admit);
        assert_eq!(t.evicted, None);
        assert_eq!(t.changes.len(), 1);
        assert_eq!(t.changes[0].key, k("a"));

        let state = store.get_state(&k("a"));
        assert!(state.open && state.is_focused);
        assert_eq!(state.z_index, 2047);
        assert_eq!(state.position, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_admit_second_window_moves_focus() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open());
        let t = store.set_state(&k("b"), WindowDelta::open());

        assert_eq!(t.changes.len(), 2);
        let a = store.get_state(&k("a"));
        let b = store.get_state(&k("b"));
        assert!(!a.is_focused && b.is_focused);
        assert!(b.z_index > a.z_index);
        assert_eq!(store.focused(), Some(&k("b")));
    }

    #[test]
    fn test_promote_top_changes_nothing() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open());
        let t = store.set_state(&k("a"), WindowDelta::open());
        assert_eq!(t.kind, TransitionKind::Promote);
        assert!(!t.has_changes());
    }

    #[test]
    fn test_promote_merges_geometry() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open());
        store.set_state(&k("a"), WindowDelta::open_sized(Size::new(300.0, 200.0)));
        let state = store.get_state(&k("a"));
        assert_eq!(state.size, Size::new(300.0, 200.0));
        assert_eq!(state.position, store.config().default_position);
    }

    #[test]
    fn test_retire_refocuses_new_top() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open());
        store.set_state(&k("b"), WindowDelta::open());
        let t = store.set_state(&k("b"), WindowDelta::Close);

        assert_eq!(t.kind, TransitionKind::Retire);
        assert!(!store.get_state(&k("b")).open);
        assert!(store.get_state(&k("a")).is_focused);
        assert_eq!(store.stacking_order(), vec![k("a")]);
    }

    #[test]
    fn test_retire_last_leaves_no_focus() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open());
        store.set_state(&k("a"), WindowDelta::Close);
        assert_eq!(store.focused(), None);
        assert_eq!(store.open_count(), 0);
        assert!(!store.get_state(&k("a")).is_focused);
    }

    #[test]
    fn test_close_unseen_is_noop_and_creates_nothing() {
        let mut store = WindowStateStore::default();
        let t = store.set_state(&k("ghost"), WindowDelta::Close);
        assert_eq!(t.kind, TransitionKind::Noop);
        assert!(store.windows.is_empty());
    }

    #[test]
    fn test_eviction_closes_lowest() {
        let mut store = small_store(1, 2);
        store.set_state(&k("a"), WindowDelta::open());
        store.set_state(&k("b"), WindowDelta::open());
        let t = store.set_state(&k("c"), WindowDelta::open());

        assert_eq!(t.evicted, Some(k("a")));
        let a = store.get_state(&k("a"));
        assert!(!a.open && !a.is_focused);
        assert!(t.changes.iter().any(|c| c.key == k("a") && !c.state.open));
        assert_eq!(store.stacking_order(), vec![k("c"), k("b")]);
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let mut store = WindowStateStore::default();
        store.set_state(&k("a"), WindowDelta::open_sized(Size::new(-10.0, 50.0)));
        assert_eq!(store.get_state(&k("a")).size, Size::new(0.0, 50.0));
    }

    #[test]
    fn test_reopen_reuses_last_geometry() {
        let mut store = WindowStateStore::default();
        store.set_state(
            &k("a"),
            WindowDelta::Open {
                position: Some(Point::new(1.0, 2.0)),
                size: Some(Size::new(300.0, 400.0)),
            },
        );
        store.set_state(&k("a"), WindowDelta::Close);
        store.set_state(&k("a"), WindowDelta::open());

        let state = store.get_state(&k("a"));
        assert_eq!(state.position, Point::new(1.0, 2.0));
        assert_eq!(state.size, Size::new(300.0, 400.0));
    }

    #[test]
    fn test_snapshot_is_top_first() {
        let mut store = WindowStateStore::default();
        for name in ["a", "b", "c"] {
            store.set_state(&k(name), WindowDelta::open());
        }
        let snapshot = store.snapshot();
        let z: Vec<i32> = snapshot.iter().map(|(_, s)| s.z_index).collect();
        assert_eq!(z, vec![2047, 2046, 2045]);
        assert!(snapshot[0].1.is_focused);
    }
}
