//! # Cube Module
//!
//! A single placed cube in the voxel grid.

use cgmath::{Point3, Vector3};

use crate::engine_state::camera_state::camera::wrap_degrees;

/// One cube instance.
///
/// The position is fixed at creation. Only the second Euler axis animates;
/// it spins a little every frame and always stays in `[0, 360)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    /// Grid coordinate of the cube's center
    position: Point3<f32>,
    /// Euler angles in degrees
    eulers: Vector3<f32>,
}

impl Cube {
    /// Creates a cube at `position` with the given Euler angles in degrees.
    ///
    /// The animated axis is wrapped on construction so the range invariant
    /// holds from the start.
    pub fn new<P: Into<Point3<f32>>, E: Into<Vector3<f32>>>(position: P, eulers: E) -> Self {
        let mut eulers = eulers.into();
        eulers.y = wrap_degrees(eulers.y);
        Self {
            position: position.into(),
            eulers,
        }
    }

    /// Grid coordinate of the cube's center
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Euler angles in degrees
    pub fn eulers(&self) -> Vector3<f32> {
        self.eulers
    }

    /// Advances the animated axis by `degrees`, wrapping at 360.
    pub fn spin(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.eulers.y = wrap_degrees(self.eulers.y + degrees);
        }
    }
}
