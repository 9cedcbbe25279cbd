// Input handler module for pointer-driven window drags
#[path = "inputHandler/mod.rs"]
pub mod input_handler;

// Window state management module
pub mod state;

// Tauri shell exposing the window manager to the editor webview
#[cfg(feature = "desktop")]
mod commands;

pub use input_handler::{CancelMode, DragInteraction, DragSubject, DragTarget, MoveDrag, ResizeDrag};
pub use state::config::{ConfigError, WindowStoreConfig};
pub use state::controller::WindowController;
pub use state::root::{SubscriptionId, WindowRoot};
pub use state::window::{
    Point, Size, Transition, TransitionKind, WindowChange, WindowDelta, WindowKey, WindowState,
    WindowStyle,
};
pub use state::WindowStateStore;

#[cfg(feature = "desktop")]
pub use commands::run;
