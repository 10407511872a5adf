//! # Camera Implementation
//!
//! This module contains the first-person camera:
//! - `Orientation`: direction vectors derived from yaw and pitch
//! - `Camera`: eye position plus wrapped yaw and clamped pitch
//! - `Projection`: perspective projection for the window
//!
//! The world is z-up. Yaw (`theta`) turns around the z axis starting from +x,
//! pitch (`phi`) tilts toward +z. Both are stored in degrees.

use cgmath::*;

/// Transformation matrix to convert from OpenGL's clip space to WGPU's.
///
/// cgmath builds projections for an NDC depth range of [-1, 1]; WGPU expects [0, 1].
/// The last two rows scale z by one half and shift it by one half.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// World up axis used to derive the camera's right vector
pub const GLOBAL_UP: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

/// Pitch limit in degrees. Kept strictly below 90 so `right` never collapses.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Full turn in degrees
const FULL_TURN_DEGREES: f32 = 360.0;

/// Facing vectors for a yaw/pitch pair.
///
/// None of the vectors are renormalized. `forward` is unit length by
/// construction; `right` and `up` are unit length only while pitch stays
/// away from the poles, which the camera's clamp guarantees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Direction the camera looks in
    pub forward: Vector3<f32>,
    /// `forward × GLOBAL_UP`
    pub right: Vector3<f32>,
    /// `right × forward`
    pub up: Vector3<f32>,
}

impl Orientation {
    /// Computes the facing vectors for the given angles.
    ///
    /// # Arguments
    /// * `theta` - Yaw in degrees, measured from +x toward +y
    /// * `phi` - Pitch in degrees, positive looks toward +z
    pub fn from_angles(theta: Deg<f32>, phi: Deg<f32>) -> Self {
        let (theta_sin, theta_cos) = Rad::from(theta).sin_cos();
        let (phi_sin, phi_cos) = Rad::from(phi).sin_cos();

        let forward = Vector3::new(theta_cos * phi_cos, theta_sin * phi_cos, phi_sin);
        let right = forward.cross(GLOBAL_UP);
        let up = right.cross(forward);

        Self { forward, right, up }
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEGREES);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= FULL_TURN_DEGREES {
        0.0
    } else {
        wrapped
    }
}

/// A first-person camera.
///
/// `position` is free-floating and public. The angles are private: `turn` is
/// the only way to change them, so the wrap and clamp invariants and the
/// cached orientation can never go stale.
#[derive(Debug, Clone)]
pub struct Camera {
    /// The eye position in world space
    pub position: Point3<f32>,
    /// Yaw in degrees, always in `[0, 360)`
    theta: f32,
    /// Pitch in degrees, always in `[-89, 89]`
    phi: f32,
    /// Facing vectors for the current angles
    orientation: Orientation,
}

impl Camera {
    /// Creates a camera at `position` looking along +x with a level horizon.
    ///
    /// # Example
    /// ```ignore
    /// let camera = Camera::new(Point3::new(0.0, 0.0, 2.0));
    /// assert_eq!(camera.theta(), 0.0);
    /// ```
    pub fn new<V: Into<Point3<f32>>>(position: V) -> Self {
        Self {
            position: position.into(),
            theta: 0.0,
            phi: 0.0,
            orientation: Orientation::from_angles(Deg(0.0), Deg(0.0)),
        }
    }

    /// Yaw in degrees
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Pitch in degrees
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// The camera's current facing vectors
    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    /// Moves the eye by `displacement`. No bounds or collision checks.
    pub fn translate(&mut self, displacement: Vector3<f32>) {
        self.position += displacement;
    }

    /// Turns the camera and recomputes its facing vectors.
    ///
    /// Yaw wraps into `[0, 360)`; pitch is clamped to `[-89, 89]`.
    /// Non-finite deltas are ignored so a bad input sample cannot poison the
    /// camera state.
    ///
    /// # Arguments
    /// * `d_theta` - Yaw change in degrees
    /// * `d_phi` - Pitch change in degrees
    pub fn turn(&mut self, d_theta: f32, d_phi: f32) {
        if d_theta.is_finite() {
            self.theta = wrap_degrees(self.theta + d_theta);
        } else {
            log::debug!("Ignoring non-finite yaw delta {}", d_theta);
        }

        if d_phi.is_finite() {
            self.phi = (self.phi + d_phi).clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        } else {
            log::debug!("Ignoring non-finite pitch delta {}", d_phi);
        }

        self.orientation = Orientation::from_angles(Deg(self.theta), Deg(self.phi));
    }

    /// Calculates the view matrix for this camera.
    ///
    /// Looks from `position` toward `position + forward`, using the camera's
    /// own `up` vector rather than the world axis.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            self.position,
            self.position + self.orientation.forward,
            self.orientation.up,
        )
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Current aspect ratio
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix in WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_vec_eq(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn level_camera_faces_positive_x() {
        let orientation = Orientation::from_angles(Deg(0.0), Deg(0.0));
        assert_vec_eq(orientation.forward, Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(orientation.right, Vector3::new(0.0, -1.0, 0.0));
        assert_vec_eq(orientation.up, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn quarter_yaw_faces_positive_y() {
        let orientation = Orientation::from_angles(Deg(90.0), Deg(0.0));
        assert_vec_eq(orientation.forward, Vector3::new(0.0, 1.0, 0.0));
        assert_vec_eq(orientation.right, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn vectors_stay_orthonormal_away_from_poles() {
        for &(theta, phi) in &[(30.0, 45.0), (200.0, -60.0), (359.0, 89.0), (0.0, -89.0)] {
            let o = Orientation::from_angles(Deg(theta), Deg(phi));
            assert!((o.forward.magnitude() - 1.0).abs() < EPSILON);
            assert!(o.forward.dot(o.right).abs() < EPSILON);
            assert!(o.forward.dot(o.up).abs() < EPSILON);
            assert!(o.right.dot(o.up).abs() < EPSILON);
            // right shrinks with cos(phi) because nothing renormalizes it
            let phi_cos = Rad::from(Deg(phi)).cos();
            assert!((o.right.magnitude() - phi_cos).abs() < 1e-4);
        }
    }

    #[test]
    fn right_is_nonzero_at_pitch_limit() {
        let o = Orientation::from_angles(Deg(123.0), Deg(PITCH_LIMIT_DEGREES));
        assert!(o.right.magnitude() > 0.01);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(-720.0), 0.0);
        let tiny = wrap_degrees(-1e-9);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn turn_wraps_yaw_for_many_inputs() {
        let starts = [0.0f32, 10.0, 179.5, 359.9];
        let deltas = [-1000.0f32, -360.0, -0.5, 0.0, 0.25, 90.0, 359.99, 725.0];
        for &start in &starts {
            for &delta in &deltas {
                let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
                camera.turn(start, 0.0);
                camera.turn(delta, 0.0);
                let expected = (start + delta).rem_euclid(360.0) % 360.0;
                assert!((0.0..360.0).contains(&camera.theta()));
                let diff = (camera.theta() - expected).abs();
                assert!(diff < 1e-3 || (360.0 - diff) < 1e-3, "{start} + {delta}");
            }
        }
    }

    #[test]
    fn turn_clamps_pitch() {
        let deltas = [-500.0f32, -89.0, -10.0, 0.0, 45.5, 88.9, 89.0, 90.0, 1e6];
        for &start in &[-89.0f32, -30.0, 0.0, 60.0, 89.0] {
            for &delta in &deltas {
                let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
                camera.turn(0.0, start);
                camera.turn(0.0, delta);
                assert_eq!(camera.phi(), (start + delta).clamp(-89.0, 89.0));
            }
        }
    }

    #[test]
    fn turn_refreshes_orientation() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
        camera.turn(90.0, 0.0);
        assert_vec_eq(camera.orientation().forward, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn non_finite_turn_is_ignored() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
        camera.turn(45.0, 10.0);
        camera.turn(f32::NAN, f32::INFINITY);
        assert_eq!(camera.theta(), 45.0);
        assert_eq!(camera.phi(), 10.0);
        assert!(camera.orientation().forward.x.is_finite());
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let mut camera = Camera::new(Point3::new(1.0, 2.0, 3.0));
        camera.turn(33.0, -12.0);
        let eye = camera.calc_matrix() * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert!(eye.truncate().magnitude() < EPSILON);
    }

    #[test]
    fn view_matrix_puts_target_in_front() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 2.0));
        let target = camera.calc_matrix() * Vector4::new(5.0, 0.0, 2.0, 1.0);
        // right-handed view space looks down -z
        assert!(target.z < 0.0);
        assert!(target.x.abs() < EPSILON && target.y.abs() < EPSILON);
    }

    #[test]
    fn projection_survives_zero_height_resize() {
        let mut projection = Projection::new(640, 480, Deg(45.0), 0.1, 100.0);
        assert!((projection.aspect() - 640.0 / 480.0).abs() < EPSILON);
        projection.resize(800, 0);
        assert!(projection.aspect().is_finite());
    }
}
