use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one window slot. Never reused for another window.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowKey(String);

impl WindowKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Mint a fresh key for a window that has no natural name
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for WindowKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Top-left corner of a window, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Replace non-finite coordinates with zero
    pub fn sanitized(self) -> Self {
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp negative or non-finite dimensions to zero
    pub fn sanitized(self) -> Self {
        Self {
            width: finite_or_zero(self.width).max(0.0),
            height: finite_or_zero(self.height).max(0.0),
        }
    }

    /// Raise each dimension to at least the matching dimension of `floor`
    pub fn at_least(self, floor: Size) -> Self {
        Self {
            width: self.width.max(floor.width),
            height: self.height.max(floor.height),
        }
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Authoritative per-key state held by the store
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub open: bool,
    /// Only meaningful while `open`; left stale after close
    pub z_index: i32,
    pub is_focused: bool,
    pub position: Point,
    pub size: Size,
}

impl WindowState {
    pub fn closed(position: Point, size: Size, z_index: i32) -> Self {
        Self {
            open: false,
            z_index,
            is_focused: false,
            position,
            size,
        }
    }
}

/// Requested change for one key
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WindowDelta {
    Open {
        #[serde(default)]
        position: Option<Point>,
        #[serde(default)]
        size: Option<Size>,
    },
    Close,
}

impl WindowDelta {
    pub fn open() -> Self {
        WindowDelta::Open {
            position: None,
            size: None,
        }
    }

    pub fn open_at(position: Point) -> Self {
        WindowDelta::Open {
            position: Some(position),
            size: None,
        }
    }

    pub fn open_sized(size: Size) -> Self {
        WindowDelta::Open {
            position: None,
            size: Some(size),
        }
    }
}

/// Which branch of the transition table a `set_state` call took
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Admit,
    Promote,
    Retire,
    Noop,
}

/// One key whose state differs after a transition
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowChange {
    pub key: WindowKey,
    pub state: WindowState,
}

/// Outcome of a single `set_state` call
#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub kind: TransitionKind,
    pub evicted: Option<WindowKey>,
    pub changes: Vec<WindowChange>,
}

impl Transition {
    pub fn noop() -> Self {
        Self {
            kind: TransitionKind::Noop,
            evicted: None,
            changes: Vec::new(),
        }
    }

    /// Whether any key's state differs. A `Promote` of the top window
    /// reports none, although its kind is not `Noop`.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Computed on-screen box of one window, as the renderer consumes it
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowStyle {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub focused: bool,
    pub open: bool,
}

impl From<&WindowState> for WindowStyle {
    fn from(state: &WindowState) -> Self {
        Self {
            left: state.position.x,
            top: state.position.y,
            width: state.size.width,
            height: state.size.height,
            z_index: state.z_index,
            focused: state.is_focused,
            open: state.open,
        }
    }
}
