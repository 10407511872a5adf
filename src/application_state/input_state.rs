//! # Input State
//!
//! The per-frame snapshot handed from the input manager to the engine.

use std::collections::HashMap;

use winit::keyboard::KeyCode;

use crate::engine_state::camera_state::movement::MovementKeys;

/// Key that walks forward
pub const KEY_FORWARD: KeyCode = KeyCode::KeyW;
/// Key that strafes left
pub const KEY_LEFT: KeyCode = KeyCode::KeyA;
/// Key that walks backward
pub const KEY_BACKWARD: KeyCode = KeyCode::KeyS;
/// Key that strafes right
pub const KEY_RIGHT: KeyCode = KeyCode::KeyD;
/// Key that rises along +z
pub const KEY_ASCEND: KeyCode = KeyCode::Space;
/// Key that sinks along -z
pub const KEY_DESCEND: KeyCode = KeyCode::ControlLeft;
/// Key that closes the viewer
pub const KEY_EXIT: KeyCode = KeyCode::Escape;

/// A snapshot of the tracked input for one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessedInputState {
    /// Whether each tracked key is currently held down
    pub keyboard_states: HashMap<KeyCode, bool>,

    /// Pointer motion accumulated since the previous snapshot (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Whether `key` is held. Untracked keys always report `false`.
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.keyboard_states.get(&key).copied().unwrap_or(false)
    }

    /// Pointer motion since the previous snapshot
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }

    /// Maps the held keys onto the movement resolver's key set.
    pub fn movement_keys(&self) -> MovementKeys {
        MovementKeys {
            forward: self.is_down(KEY_FORWARD),
            left: self.is_down(KEY_LEFT),
            backward: self.is_down(KEY_BACKWARD),
            right: self.is_down(KEY_RIGHT),
            ascend: self.is_down(KEY_ASCEND),
            descend: self.is_down(KEY_DESCEND),
        }
    }
}
