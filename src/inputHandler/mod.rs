// Input handler module for pointer-driven window interaction
// Handles header-move and corner-resize drags with Escape cancellation

pub mod drag;
pub mod types;

pub use drag::{DragInteraction, DragSubject, MoveDrag, ResizeDrag};
pub use types::*;
