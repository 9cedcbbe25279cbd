// Pointer drag state machine shared by header-move and corner-resize

use tracing::trace;

use super::types::{CancelMode, PointerDelta};
use crate::state::config::WindowStoreConfig;
use crate::state::root::WindowRoot;
use crate::state::window::{Point, Size, WindowDelta, WindowKey, WindowState};

/// A window property a drag can drive
pub trait DragSubject: Copy + PartialEq + std::fmt::Debug {
    /// Read the current value out of the store's state
    fn read(state: &WindowState) -> Self;

    /// Value for a pointer offset from the drag origin
    fn apply(initial: Self, delta: PointerDelta, config: &WindowStoreConfig) -> Self;

    /// The `set_state` delta that commits this value
    fn into_delta(self) -> WindowDelta;
}

impl DragSubject for Point {
    fn read(state: &WindowState) -> Self {
        state.position
    }

    fn apply(initial: Self, delta: PointerDelta, _config: &WindowStoreConfig) -> Self {
        Point::new(initial.x + delta.dx, initial.y + delta.dy).sanitized()
    }

    fn into_delta(self) -> WindowDelta {
        WindowDelta::open_at(self)
    }
}

impl DragSubject for Size {
    fn read(state: &WindowState) -> Self {
        state.size
    }

    fn apply(initial: Self, delta: PointerDelta, config: &WindowStoreConfig) -> Self {
        Size::new(initial.width + delta.dx, initial.height + delta.dy)
            .sanitized()
            .at_least(config.minimum_size)
    }

    fn into_delta(self) -> WindowDelta {
        WindowDelta::open_sized(self)
    }
}

/// Values captured at pointer-down; never re-read from the store mid-drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession<S> {
    pub initial_pointer: Point,
    pub initial_value: S,
    pub last_committed: S,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState<S> {
    Idle,
    Dragging(DragSession<S>),
}

/// Drag interaction for one window.
///
/// Every pointer move is committed to the store through `set_state`, so the
/// store always reflects the in-progress value.
#[derive(Debug, Clone)]
pub struct DragInteraction<S: DragSubject> {
    key: WindowKey,
    cancel_mode: CancelMode,
    state: DragState<S>,
}

pub type MoveDrag = DragInteraction<Point>;
pub type ResizeDrag = DragInteraction<Size>;

impl<S: DragSubject> DragInteraction<S> {
    pub fn new(key: WindowKey) -> Self {
        Self::with_cancel_mode(key, CancelMode::default())
    }

    pub fn with_cancel_mode(key: WindowKey, cancel_mode: CancelMode) -> Self {
        Self {
            key,
            cancel_mode,
            state: DragState::Idle,
        }
    }

    pub fn key(&self) -> &WindowKey {
        &self.key
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession<S>> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Pointer pressed on the drag surface. Ignored if already dragging.
    pub fn begin(&mut self, root: &WindowRoot, pointer: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        let initial_value = S::read(&root.get_state(&self.key));
        trace!(key = %self.key, ?pointer, ?initial_value, "drag begin");
        self.state = DragState::Dragging(DragSession {
            initial_pointer: pointer,
            initial_value,
            last_committed: initial_value,
        });
        true
    }

    /// Pointer moved. Commits and returns the new value, `None` when idle.
    pub fn update(&mut self, root: &WindowRoot, pointer: Point) -> Option<S> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        let delta = PointerDelta {
            dx: pointer.x - session.initial_pointer.x,
            dy: pointer.y - session.initial_pointer.y,
        };
        let value = S::apply(session.initial_value, delta, &root.config());
        session.last_committed = value;

        trace!(key = %self.key, ?pointer, ?value, "drag frame");
        root.set_state(&self.key, value.into_delta());
        Some(value)
    }

    /// Pointer released. The last frame is already in the store.
    pub fn end(&mut self) -> Option<S> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging(session) => {
                trace!(key = %self.key, value = ?session.last_committed, "drag end");
                Some(session.last_committed)
            }
            DragState::Idle => None,
        }
    }

    /// Cancel key pressed. Re-commits a value per the cancel mode and stops
    /// following the pointer.
    pub fn cancel(&mut self, root: &WindowRoot) -> Option<S> {
        let DragState::Dragging(session) = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return None;
        };
        let value = match self.cancel_mode {
            CancelMode::Freeze => session.last_committed,
            CancelMode::Revert => session.initial_value,
        };
        trace!(key = %self.key, mode = ?self.cancel_mode, ?value, "drag cancelled");
        root.set_state(&self.key, value.into_delta());
        Some(value)
    }
}
