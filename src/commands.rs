use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, State};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::input_handler::{DragTarget, MoveDrag, ResizeDrag};
use crate::state::config::WindowStoreConfig;
use crate::state::root::WindowRoot;
use crate::state::window::{Point, Size, Transition, WindowKey, WindowState};

const WINDOW_CONFIG_FILE: &str = "windows.json";

// Event payload types for frontend communication
#[derive(Clone, Serialize)]
struct DragFinishedPayload {
    key: String,
    cancelled: bool,
}

/// The one drag a pointer can drive at a time
enum ActiveDrag {
    Move(MoveDrag),
    Resize(ResizeDrag),
}

impl ActiveDrag {
    fn key(&self) -> &WindowKey {
        match self {
            ActiveDrag::Move(drag) => drag.key(),
            ActiveDrag::Resize(drag) => drag.key(),
        }
    }

    fn update(&mut self, root: &WindowRoot, pointer: Point) -> bool {
        match self {
            ActiveDrag::Move(drag) => drag.update(root, pointer).is_some(),
            ActiveDrag::Resize(drag) => drag.update(root, pointer).is_some(),
        }
    }

    fn end(&mut self) {
        match self {
            ActiveDrag::Move(drag) => {
                drag.end();
            }
            ActiveDrag::Resize(drag) => {
                drag.end();
            }
        }
    }

    fn cancel(&mut self, root: &WindowRoot) {
        match self {
            ActiveDrag::Move(drag) => {
                drag.cancel(root);
            }
            ActiveDrag::Resize(drag) => {
                drag.cancel(root);
            }
        }
    }
}

// Global state for the window manager of this webview
struct AppState {
    root: WindowRoot,
    drag: Mutex<Option<ActiveDrag>>,
}

// ===== Window Management Commands =====

#[tauri::command]
fn window_open(
    key: String,
    position: Option<Point>,
    size: Option<Size>,
    state: State<AppState>,
) -> Result<Transition, String> {
    let window = state.root.controller(key, "");
    Ok(window.open(position, size))
}

#[tauri::command]
fn window_close(key: String, state: State<AppState>) -> Result<Transition, String> {
    let window = state.root.controller(key, "");
    Ok(window.close())
}

#[tauri::command]
fn window_state(key: String, state: State<AppState>) -> Result<WindowState, String> {
    Ok(state.root.get_state(&WindowKey::new(key)))
}

#[tauri::command]
fn window_stacking_order(state: State<AppState>) -> Result<Vec<WindowKey>, String> {
    Ok(state.root.stacking_order())
}

// ===== Drag Commands =====

/// Pointer pressed on a window header or resize corner
#[tauri::command]
fn drag_begin(
    key: String,
    target: String,
    x: f64,
    y: f64,
    app: AppHandle,
    state: State<AppState>,
) -> Result<(), String> {
    let target =
        DragTarget::from_str(&target).ok_or_else(|| format!("Unknown drag target: {}", target))?;

    let mut active = state
        .drag
        .lock()
        .map_err(|e| format!("Failed to lock drag state: {}", e))?;
    if let Some(drag) = active.as_ref() {
        return Err(format!("Drag already in progress on window {}", drag.key()));
    }

    let key = WindowKey::new(key);
    let pointer = Point::new(x, y);
    let mut drag = match target {
        DragTarget::Move => ActiveDrag::Move(MoveDrag::new(key)),
        DragTarget::Resize => ActiveDrag::Resize(ResizeDrag::new(key)),
    };
    match &mut drag {
        ActiveDrag::Move(d) => d.begin(&state.root, pointer),
        ActiveDrag::Resize(d) => d.begin(&state.root, pointer),
    };
    *active = Some(drag);

    set_cancel_shortcut_enabled(&app, true);
    Ok(())
}

#[tauri::command]
fn drag_move(x: f64, y: f64, state: State<AppState>) -> Result<Option<WindowState>, String> {
    let mut active = state
        .drag
        .lock()
        .map_err(|e| format!("Failed to lock drag state: {}", e))?;

    match active.as_mut() {
        Some(drag) if drag.update(&state.root, Point::new(x, y)) => {
            Ok(Some(state.root.get_state(drag.key())))
        }
        _ => Ok(None),
    }
}

#[tauri::command]
fn drag_end(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    finish_drag(&app, &state, false)
}

#[tauri::command]
fn drag_cancel(app: AppHandle, state: State<AppState>) -> Result<(), String> {
    finish_drag(&app, &state, true)
}

/// End or cancel the active drag and release the Escape binding
fn finish_drag(app: &AppHandle, state: &AppState, cancelled: bool) -> Result<(), String> {
    let taken = state
        .drag
        .lock()
        .map_err(|e| format!("Failed to lock drag state: {}", e))?
        .take();

    set_cancel_shortcut_enabled(app, false);

    let Some(mut drag) = taken else {
        return Ok(());
    };
    if cancelled {
        drag.cancel(&state.root);
    } else {
        drag.end();
    }

    app.emit(
        "drag-finished",
        DragFinishedPayload {
            key: drag.key().to_string(),
            cancelled,
        },
    )
    .map_err(|e| e.to_string())
}

fn cancel_shortcut() -> Shortcut {
    Shortcut::new(Some(Modifiers::empty()), Code::Escape)
}

/// Escape is only bound while a drag is active
fn set_cancel_shortcut_enabled(app: &AppHandle, enabled: bool) {
    let shortcuts = app.global_shortcut();
    let result = if enabled {
        // Avoid "already registered" errors
        let _ = shortcuts.unregister(cancel_shortcut());
        shortcuts.register(cancel_shortcut())
    } else {
        shortcuts.unregister(cancel_shortcut())
    };
    if let Err(e) = result {
        warn!(enabled, error = %e, "failed to toggle drag cancel shortcut");
    }
}

fn load_window_config(path: &Path) -> WindowStoreConfig {
    if !path.exists() {
        info!(path = %path.display(), "no window config, using defaults");
        return WindowStoreConfig::default();
    }
    match WindowStoreConfig::load(path) {
        Ok(config) => {
            info!(path = %path.display(), "loaded window config");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring window config");
            WindowStoreConfig::default()
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| {
                    // Only process on key press, not release
                    if event.state != ShortcutState::Pressed || shortcut != &cancel_shortcut() {
                        return;
                    }
                    if let Some(state) = app.try_state::<AppState>() {
                        if let Err(e) = finish_drag(app, &state, true) {
                            warn!(error = %e, "failed to cancel drag");
                        }
                    }
                })
                .build(),
        )
        .setup(|app| {
            let config = match app.path().app_config_dir() {
                Ok(dir) => load_window_config(&dir.join(WINDOW_CONFIG_FILE)),
                Err(e) => {
                    warn!(error = %e, "no app config directory, using default window config");
                    WindowStoreConfig::default()
                }
            };

            let root = WindowRoot::new(config);
            let handle = app.handle().clone();
            root.subscribe(move |change| {
                if let Err(e) = handle.emit("window-state-changed", change) {
                    warn!(key = %change.key, error = %e, "failed to emit window change");
                }
            });

            app.manage(AppState {
                root,
                drag: Mutex::new(None),
            });
            info!("window manager initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Window management commands
            window_open,
            window_close,
            window_state,
            window_stacking_order,
            // Drag commands
            drag_begin,
            drag_move,
            drag_end,
            drag_cancel,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
