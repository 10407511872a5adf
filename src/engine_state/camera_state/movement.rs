//! # Movement Resolution
//!
//! Turns the held movement keys into a world-space displacement.
//!
//! The four horizontal keys are packed into a 4-bit combo
//! (`forward = 1`, `left = 2`, `backward = 4`, `right = 8`) and looked up in a
//! fixed table of angle offsets relative to the camera's yaw. Combos made only
//! of opposing pairs (`0`, `5`, `10`, `15`) are absent from the table on
//! purpose: they cancel out and produce no horizontal motion.
//!
//! Ascend and descend are resolved separately and added on the z axis.

use cgmath::{Angle, Deg, Rad, Vector3, Zero};
use phf::phf_map;

/// Horizontal walking direction, in degrees counter-clockwise from the camera's
/// yaw, for every key combo that has an unambiguous direction.
static WALK_OFFSETS: phf::Map<u8, f32> = phf_map! {
    1u8 => 0.0,
    2u8 => 90.0,
    3u8 => 45.0,
    4u8 => 180.0,
    6u8 => 135.0,
    7u8 => 90.0,
    8u8 => 270.0,
    9u8 => 315.0,
    11u8 => 0.0,
    12u8 => 225.0,
    13u8 => 270.0,
    14u8 => 180.0,
};

/// Which movement keys are held this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementKeys {
    /// Walk toward the camera's yaw
    pub forward: bool,
    /// Strafe left
    pub left: bool,
    /// Walk away from the camera's yaw
    pub backward: bool,
    /// Strafe right
    pub right: bool,
    /// Rise along +z
    pub ascend: bool,
    /// Sink along -z
    pub descend: bool,
}

impl MovementKeys {
    /// Builds the key set from a 4-bit horizontal combo. Vertical keys are left released.
    pub fn from_combo(combo: u8) -> Self {
        Self {
            forward: combo & 1 != 0,
            left: combo & 2 != 0,
            backward: combo & 4 != 0,
            right: combo & 8 != 0,
            ascend: false,
            descend: false,
        }
    }

    /// Packs the horizontal keys into a combo in `0..=15`.
    pub fn combo(&self) -> u8 {
        self.forward as u8
            | (self.left as u8) << 1
            | (self.backward as u8) << 2
            | (self.right as u8) << 3
    }
}

/// Looks up the walking offset for a combo.
///
/// # Returns
/// `None` for combos with no net direction (`0`, `5`, `10`, `15`) and for
/// values outside the 4-bit range.
pub fn walk_offset(combo: u8) -> Option<Deg<f32>> {
    WALK_OFFSETS.get(&combo).copied().map(Deg)
}

/// Resolves the displacement for one frame.
///
/// # Arguments
/// * `keys` - The held movement keys
/// * `theta` - Camera yaw in degrees
/// * `step` - Distance covered this frame, already scaled by elapsed time
///
/// # Returns
/// `step · (cos(θ + offset), sin(θ + offset), 0)` for the horizontal part,
/// plus `±step` on z for each held vertical key.
pub fn resolve_displacement(keys: &MovementKeys, theta: f32, step: f32) -> Vector3<f32> {
    let mut displacement = match walk_offset(keys.combo()) {
        Some(offset) => {
            let (heading_sin, heading_cos) = Rad::from(Deg(theta) + offset).sin_cos();
            Vector3::new(step * heading_cos, step * heading_sin, 0.0)
        }
        None => Vector3::zero(),
    };

    if keys.ascend {
        displacement.z += step;
    }
    if keys.descend {
        displacement.z -= step;
    }

    displacement
}
