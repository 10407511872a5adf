//! # World Module
//!
//! The `World` owns everything the renderer samples each frame: the camera
//! and the ordered list of cubes.
//!
//! ## Lifecycle
//!
//! The cube set is built once, usually as a regular grid, and never grows or
//! shrinks at runtime. Per frame the driver moves and turns the camera, then
//! calls `advance` to spin the cubes, and only then hands the world to the
//! renderer.

use cgmath::{Point3, Vector3};

use crate::engine_state::camera_state::camera::Camera;

use super::cube::Cube;

/// Cube spin per reference frame, in degrees
pub const DEFAULT_ROTATION_STEP_DEGREES: f32 = 0.25;

/// The viewer's scene.
///
/// # Examples
///
/// ```ignore
/// let mut world = World::grid([3, 3, 3], Point3::new(0.0, 0.0, 2.0));
/// assert_eq!(world.cubes().len(), 27);
///
/// world.advance(1.0);
/// world.move_player(Vector3::new(0.1, 0.0, 0.0));
/// world.spin_player(5.0, -2.0);
/// ```
#[derive(Debug, Clone)]
pub struct World {
    /// The player's eye
    camera: Camera,
    /// Cubes in render order
    cubes: Vec<Cube>,
    /// Degrees each cube spins per reference frame
    rotation_step: f32,
}

impl World {
    /// Creates a world from an explicit camera and cube list.
    pub fn new(camera: Camera, cubes: Vec<Cube>) -> Self {
        Self {
            camera,
            cubes,
            rotation_step: DEFAULT_ROTATION_STEP_DEGREES,
        }
    }

    /// Creates a world with one cube on every integer coordinate of a
    /// `dimensions[0] × dimensions[1] × dimensions[2]` grid starting at the origin.
    ///
    /// # Arguments
    /// * `dimensions` - Number of cubes along x, y and z
    /// * `spawn` - Initial camera position
    pub fn grid<P: Into<Point3<f32>>>(dimensions: [u32; 3], spawn: P) -> Self {
        let [size_x, size_y, size_z] = dimensions;
        let capacity = (size_x as usize)
            .checked_mul(size_y as usize)
            .and_then(|xy| xy.checked_mul(size_z as usize))
            .unwrap_or(0);
        let mut cubes = Vec::with_capacity(capacity);

        for x in 0..size_x {
            for y in 0..size_y {
                for z in 0..size_z {
                    cubes.push(Cube::new(
                        Point3::new(x as f32, y as f32, z as f32),
                        Vector3::new(0.0, 0.0, 0.0),
                    ));
                }
            }
        }

        Self::new(Camera::new(spawn), cubes)
    }

    /// Overrides how many degrees the cubes spin per reference frame.
    pub fn with_rotation_step(mut self, degrees: f32) -> Self {
        self.rotation_step = degrees;
        self
    }

    /// The player's camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// All cubes in render order
    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Spins every cube by one rotation step scaled by `elapsed_ratio`.
    ///
    /// # Arguments
    /// * `elapsed_ratio` - Actual frame time divided by the reference frame time
    pub fn advance(&mut self, elapsed_ratio: f32) {
        let increment = self.rotation_step * elapsed_ratio;
        for cube in self.cubes.iter_mut() {
            cube.spin(increment);
        }
    }

    /// Moves the camera by `displacement`.
    pub fn move_player(&mut self, displacement: Vector3<f32>) {
        self.camera.translate(displacement);
    }

    /// Turns the camera. Yaw wraps and pitch clamps inside `Camera::turn`.
    pub fn spin_player(&mut self, d_theta: f32, d_phi: f32) {
        self.camera.turn(d_theta, d_phi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_grid_has_27_cubes_on_integer_coordinates() {
        let world = World::grid([3, 3, 3], Point3::new(0.0, 0.0, 2.0));
        assert_eq!(world.cubes().len(), 27);
        assert_eq!(world.cubes()[0].position(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(world.cubes()[26].position(), Point3::new(2.0, 2.0, 2.0));
        // z varies fastest
        assert_eq!(world.cubes()[1].position(), Point3::new(0.0, 0.0, 1.0));
        assert_eq!(world.camera().position, Point3::new(0.0, 0.0, 2.0));
        assert_eq!(world.camera().theta(), 0.0);
        assert_eq!(world.camera().phi(), 0.0);
    }

    #[test]
    fn empty_grid_is_allowed() {
        let world = World::grid([0, 3, 3], Point3::new(0.0, 0.0, 0.0));
        assert!(world.cubes().is_empty());
    }

    #[test]
    fn degenerate_grid_with_huge_sides_does_not_overflow() {
        let world = World::grid([65536, 65536, 0], Point3::new(0.0, 0.0, 0.0));
        assert!(world.cubes().is_empty());
    }

    #[test]
    fn advance_spins_only_the_second_axis() {
        let mut world = World::grid([1, 1, 2], Point3::new(0.0, 0.0, 0.0));
        world.advance(2.0);
        for cube in world.cubes() {
            assert_eq!(cube.eulers(), Vector3::new(0.0, 0.5, 0.0));
        }
    }

    #[test]
    fn four_full_turns_return_to_start() {
        let cubes = vec![
            Cube::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 10.0, 0.0)),
            Cube::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)),
            Cube::new(Point3::new(2.0, 0.0, 0.0), Vector3::new(5.0, 359.75, 7.0)),
        ];
        let starts: Vec<_> = cubes.iter().map(|cube| cube.eulers()).collect();
        let mut world = World::new(Camera::new(Point3::new(0.0, 0.0, 0.0)), cubes);

        // 1440 degrees at 0.25 per reference frame
        for _ in 0..5760 {
            world.advance(1.0);
            for cube in world.cubes() {
                assert!((0.0..360.0).contains(&cube.eulers().y));
            }
        }

        for (cube, start) in world.cubes().iter().zip(starts) {
            assert_eq!(cube.eulers(), start);
        }
    }

    #[test]
    fn custom_rotation_step_is_scaled_by_elapsed_ratio() {
        let mut world =
            World::grid([1, 1, 1], Point3::new(0.0, 0.0, 0.0)).with_rotation_step(100.0);
        world.advance(1.5);
        world.advance(1.5);
        assert_eq!(world.cubes()[0].eulers().y, 300.0);
        world.advance(1.0);
        assert_eq!(world.cubes()[0].eulers().y, 40.0);
    }

    #[test]
    fn move_player_is_unbounded() {
        let mut world = World::grid([1, 1, 1], Point3::new(0.0, 0.0, 0.0));
        world.move_player(Vector3::new(-1000.0, 5.0, 0.25));
        world.move_player(Vector3::new(0.0, 0.0, 0.25));
        assert_eq!(world.camera().position, Point3::new(-1000.0, 5.0, 0.5));
    }

    #[test]
    fn spin_player_wraps_and_clamps() {
        let mut world = World::grid([1, 1, 1], Point3::new(0.0, 0.0, 0.0));
        world.spin_player(-30.0, 120.0);
        assert_eq!(world.camera().theta(), 330.0);
        assert_eq!(world.camera().phi(), 89.0);
    }

    #[test]
    fn cube_construction_wraps_animated_axis() {
        let cube = Cube::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 370.0, 0.0));
        assert_eq!(cube.eulers().y, 10.0);
    }
}
