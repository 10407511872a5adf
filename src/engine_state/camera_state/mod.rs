//! # Camera State Management
//!
//! This module handles everything that moves the player's eye:
//! - `camera`: orientation math, the camera itself and the projection
//! - `movement`: key combos resolved into a displacement
//! - `CameraController`: applies one frame of input to the world
//!
//! ## Controls
//! - W / A / S / D walk relative to the current yaw
//! - Space rises, Left Control sinks
//! - Pointer motion turns the camera; it is not scaled by frame time

use super::voxels::world::World;
use crate::application_state::input_state::ProcessedInputState;

pub mod camera;
pub mod movement;

/// Applies per-frame input to the world's camera.
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    /// Distance per reference frame while a movement key is held
    speed: f32,
    /// Degrees turned per unit of pointer motion
    sensitivity: f32,
}

impl CameraController {
    /// Creates a controller.
    ///
    /// # Arguments
    /// * `speed` - Distance covered per reference frame
    /// * `sensitivity` - Degrees turned per pixel of pointer motion
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self { speed, sensitivity }
    }

    /// Moves then turns the camera for one frame.
    ///
    /// Keys are applied before pointer motion so the walk direction uses the
    /// yaw the player saw on the previous frame.
    ///
    /// # Arguments
    /// * `world` - The world whose camera is driven
    /// * `input` - This frame's input snapshot
    /// * `elapsed_ratio` - Actual frame time divided by the reference frame time
    pub fn apply(&self, world: &mut World, input: &ProcessedInputState, elapsed_ratio: f32) {
        let step = self.speed * elapsed_ratio;
        let displacement =
            movement::resolve_displacement(&input.movement_keys(), world.camera().theta(), step);
        if displacement != cgmath::Vector3::new(0.0, 0.0, 0.0) {
            world.move_player(displacement);
        }

        if let Some((delta_x, delta_y)) = input.get_mouse_delta() {
            // Pointer right turns clockwise, pointer down tilts down
            let d_theta = -(delta_x as f32) * self.sensitivity;
            let d_phi = -(delta_y as f32) * self.sensitivity;
            world.spin_player(d_theta, d_phi);
        }
    }
}
