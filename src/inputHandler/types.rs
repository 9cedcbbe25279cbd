// Core data structures for pointer drag handling

use serde::{Deserialize, Serialize};

/// Which drag surface the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragTarget {
    /// Window header, moves the window
    Move,
    /// Corner handle, resizes the window
    Resize,
}

impl DragTarget {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "move" | "header" => Some(DragTarget::Move),
            "resize" | "corner" => Some(DragTarget::Resize),
            _ => None,
        }
    }
}

/// What a cancelled drag leaves behind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelMode {
    /// Keep the last committed value and stop following the pointer
    #[default]
    Freeze,
    /// Restore the value captured when the drag began
    Revert,
}

/// Pointer offset since the drag began
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerDelta {
    pub dx: f64,
    pub dy: f64,
}
