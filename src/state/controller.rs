use super::root::WindowRoot;
use super::window::{Point, Size, Transition, WindowDelta, WindowKey, WindowState, WindowStyle};

/// Imperative handle for one window slot.
///
/// Holds no state of its own: every read goes to the store, every write goes
/// through `set_state`, so handles never go stale.
#[derive(Clone)]
pub struct WindowController {
    root: WindowRoot,
    key: WindowKey,
    title: String,
}

impl WindowController {
    pub(crate) fn new(root: WindowRoot, key: WindowKey, title: String) -> Self {
        Self { root, key, title }
    }

    pub fn key(&self) -> &WindowKey {
        &self.key
    }

    /// Display only
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn open(&self, position: Option<Point>, size: Option<Size>) -> Transition {
        self.root
            .set_state(&self.key, WindowDelta::Open { position, size })
    }

    pub fn close(&self) -> Transition {
        self.root.set_state(&self.key, WindowDelta::Close)
    }

    /// Move the window, raising it to the top
    pub fn reposition(&self, position: Point) -> Transition {
        self.open(Some(position), None)
    }

    /// Resize the window, raising it to the top
    pub fn resize(&self, size: Size) -> Transition {
        self.open(None, Some(size))
    }

    pub fn state(&self) -> WindowState {
        self.root.get_state(&self.key)
    }

    pub fn style(&self) -> WindowStyle {
        WindowStyle::from(&self.state())
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn root(&self) -> &WindowRoot {
        &self.root
    }
}
