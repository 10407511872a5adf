//! # Input Manager
//!
//! Collects window and device events between frames and turns them into a
//! `ProcessedInputState` snapshot once per frame.
//!
//! Key state is level-triggered: a key stays down from its press event until
//! its release event, so holding a key keeps moving the camera. Pointer motion
//! is edge-triggered: deltas are summed until the next snapshot and then
//! cleared.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{
    ProcessedInputState, KEY_ASCEND, KEY_BACKWARD, KEY_DESCEND, KEY_EXIT, KEY_FORWARD, KEY_LEFT,
    KEY_RIGHT,
};

const KEY_CODES: [KeyCode; 7] = [
    KEY_FORWARD,
    KEY_LEFT,
    KEY_BACKWARD,
    KEY_RIGHT,
    KEY_ASCEND,
    KEY_DESCEND,
    KEY_EXIT,
];

/// Tracks the state of the viewer's keys and pointer between frames.
pub struct InputManager {
    /// Current state of all tracked keyboard keys
    keyboard_inputs: HashMap<KeyCode, bool>,

    /// Pointer motion accumulated since the last snapshot
    mouse_delta: Option<(f64, f64)>,
}

impl InputManager {
    /// Creates an input manager with every tracked key released.
    pub fn new() -> Self {
        let keyboard_inputs = KEY_CODES.iter().map(|&key| (key, false)).collect();

        Self {
            keyboard_inputs,
            mouse_delta: None,
        }
    }

    /// Records a keyboard event. Events for untracked keys are ignored.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event: KeyEvent {
                state,
                physical_key,
                ..
            },
            ..
        } = event
        {
            self.intake_key(*physical_key, *state);
        }
    }

    /// Records a key transition. Unidentified and untracked keys are ignored.
    pub fn intake_key(&mut self, physical_key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(key) = physical_key else {
            return;
        };
        if let Some(key_state) = self.keyboard_inputs.get_mut(&key) {
            *key_state = state == ElementState::Pressed;
        }
    }

    /// Adds raw pointer motion to the pending delta.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) motion reported by the device
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (pending_x, pending_y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((pending_x + delta.0, pending_y + delta.1));
    }

    /// Returns the snapshot for this frame and clears the pending pointer motion.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: self.keyboard_inputs.clone(),
            mouse_delta: self.mouse_delta.take(),
        }
    }

    /// Releases every key and drops pending pointer motion.
    ///
    /// Called when the window loses focus so keys released elsewhere do not
    /// stay stuck down.
    pub fn reset_inputs(&mut self) {
        for key_state in self.keyboard_inputs.values_mut() {
            *key_state = false;
        }
        self.mouse_delta = None;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winit::keyboard::NativeKeyCode;

    fn press(manager: &mut InputManager, key: KeyCode, pressed: bool) {
        let state = if pressed {
            ElementState::Pressed
        } else {
            ElementState::Released
        };
        manager.intake_key(PhysicalKey::Code(key), state);
    }

    #[test]
    fn all_keys_start_released() {
        let mut manager = InputManager::new();
        let snapshot = manager.get_and_reset_processed_input();
        for key in KEY_CODES {
            assert!(!snapshot.is_down(key));
        }
        assert_eq!(snapshot.get_mouse_delta(), None);
    }

    #[test]
    fn held_keys_persist_across_snapshots() {
        let mut manager = InputManager::new();
        press(&mut manager, KEY_FORWARD, true);
        press(&mut manager, KEY_LEFT, true);

        let first = manager.get_and_reset_processed_input();
        let second = manager.get_and_reset_processed_input();

        assert_eq!(first.movement_keys().combo(), 3);
        assert_eq!(second.movement_keys().combo(), 3);
    }

    #[test]
    fn pointer_motion_accumulates_until_snapshot() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((3.0, -1.0));
        manager.intake_mouse_motion((2.0, 4.0));

        assert_eq!(
            manager.get_and_reset_processed_input().get_mouse_delta(),
            Some((5.0, 3.0))
        );
        assert_eq!(manager.get_and_reset_processed_input().get_mouse_delta(), None);
    }

    #[test]
    fn reset_releases_everything() {
        let mut manager = InputManager::new();
        press(&mut manager, KEY_ASCEND, true);
        manager.intake_mouse_motion((1.0, 1.0));

        manager.reset_inputs();

        let snapshot = manager.get_and_reset_processed_input();
        assert!(!snapshot.is_down(KEY_ASCEND));
        assert_eq!(snapshot.get_mouse_delta(), None);
    }

    #[test]
    fn vertical_keys_map_to_movement() {
        let mut manager = InputManager::new();
        press(&mut manager, KEY_DESCEND, true);
        let keys = manager.get_and_reset_processed_input().movement_keys();
        assert!(keys.descend);
        assert!(!keys.ascend);
        assert_eq!(keys.combo(), 0);
    }

    #[test]
    fn release_event_lifts_a_held_key() {
        let mut manager = InputManager::new();
        press(&mut manager, KEY_RIGHT, true);
        assert!(manager.get_and_reset_processed_input().is_down(KEY_RIGHT));

        press(&mut manager, KEY_RIGHT, false);
        assert!(!manager.get_and_reset_processed_input().is_down(KEY_RIGHT));
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut manager = InputManager::new();
        press(&mut manager, KeyCode::KeyQ, true);
        manager.intake_key(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Pressed,
        );

        let snapshot = manager.get_and_reset_processed_input();
        assert!(!snapshot.is_down(KeyCode::KeyQ));
        assert_eq!(snapshot.keyboard_states.len(), KEY_CODES.len());
        assert_eq!(snapshot.movement_keys().combo(), 0);
    }

    #[test]
    fn non_keyboard_window_events_change_nothing() {
        let mut manager = InputManager::new();
        manager.intake_input(&WindowEvent::Focused(true));
        manager.intake_input(&WindowEvent::CloseRequested);

        let snapshot = manager.get_and_reset_processed_input();
        assert!(KEY_CODES.iter().all(|key| !snapshot.is_down(*key)));
    }
}
