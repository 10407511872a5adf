//! Per-frame instance transform pipeline.
//!
//! Every frame the cube list is turned into one model matrix per cube,
//! the matrices are streamed to the render target in a single contiguous
//! upload, and one instanced draw covers them all.
//!
//! The render target is passed in explicitly so the pipeline can run against
//! the GPU or against a recorder in tests.

use cgmath::{Matrix4, Vector3};

use super::vertex::InstanceRaw;
use crate::engine_state::voxels::world::World;

/// Where a frame's commands go.
pub trait FrameTarget {
    /// Sets the camera view matrix for the coming draw.
    fn set_view(&mut self, view: &Matrix4<f32>);

    /// Replaces the instance stream with `bytes`.
    fn stream_instances(&mut self, bytes: &[u8]);

    /// Draws `vertex_count` mesh vertices for each of `instance_count` instances.
    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32);
}

/// What a frame submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Instances covered by the draw
    pub instance_count: u32,
    /// Bytes handed to `stream_instances`
    pub uploaded_bytes: usize,
    /// Draw commands issued
    pub draw_calls: u32,
}

/// Builds and submits the instance transforms for a world.
#[derive(Debug)]
pub struct InstanceTransformPipeline {
    /// Reused between frames to avoid reallocating
    transforms: Vec<InstanceRaw>,
    /// Vertices in the shared mesh
    vertex_count: u32,
}

impl InstanceTransformPipeline {
    /// Creates a pipeline that draws `vertex_count` mesh vertices per instance.
    pub fn new(vertex_count: u32) -> Self {
        Self {
            transforms: Vec::new(),
            vertex_count,
        }
    }

    /// Rebuilds the model matrices from the current cube positions.
    ///
    /// Only translation is baked in. Cube rotation is animated in the world
    /// but not uploaded.
    pub fn rebuild(&mut self, world: &World) -> &[InstanceRaw] {
        self.transforms.clear();
        self.transforms.extend(world.cubes().iter().map(|cube| {
            let position = cube.position();
            InstanceRaw::from_matrix(Matrix4::from_translation(Vector3::new(
                position.x, position.y, position.z,
            )))
        }));
        &self.transforms
    }

    /// Records one frame into `target`.
    ///
    /// An empty world still sets the view and issues a zero-instance draw;
    /// targets are expected to treat that as a no-op.
    pub fn render<T: FrameTarget>(&mut self, world: &World, target: &mut T) -> FrameStats {
        target.set_view(&world.camera().calc_matrix());

        let instance_count = self.rebuild(world).len() as u32;
        let bytes: &[u8] = bytemuck::cast_slice(&self.transforms);
        target.stream_instances(bytes);
        target.draw_instanced(self.vertex_count, instance_count);

        FrameStats {
            instance_count,
            uploaded_bytes: bytes.len(),
            draw_calls: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        camera_state::camera::Camera,
        rendering::vertex::CUBE_VERTICES,
        voxels::cube::Cube,
    };
    use cgmath::Point3;

    #[derive(Debug, PartialEq)]
    enum Command {
        View(Matrix4<f32>),
        Stream(Vec<u8>),
        Draw { vertex_count: u32, instance_count: u32 },
    }

    #[derive(Default)]
    struct RecordingTarget {
        commands: Vec<Command>,
    }

    impl FrameTarget for RecordingTarget {
        fn set_view(&mut self, view: &Matrix4<f32>) {
            self.commands.push(Command::View(*view));
        }

        fn stream_instances(&mut self, bytes: &[u8]) {
            self.commands.push(Command::Stream(bytes.to_vec()));
        }

        fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32) {
            self.commands.push(Command::Draw {
                vertex_count,
                instance_count,
            });
        }
    }

    fn draws(target: &RecordingTarget) -> Vec<(u32, u32)> {
        target
            .commands
            .iter()
            .filter_map(|command| match command {
                Command::Draw {
                    vertex_count,
                    instance_count,
                } => Some((*vertex_count, *instance_count)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn reference_grid_uploads_27_matrices_in_one_draw() {
        let world = World::grid([3, 3, 3], Point3::new(0.0, 0.0, 2.0));
        let mut pipeline = InstanceTransformPipeline::new(CUBE_VERTICES.len() as u32);
        let mut target = RecordingTarget::default();

        let stats = pipeline.render(&world, &mut target);

        assert_eq!(stats.instance_count, 27);
        assert_eq!(stats.uploaded_bytes, 27 * 64);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(draws(&target), vec![(36, 27)]);
        assert!(matches!(&target.commands[1], Command::Stream(bytes) if bytes.len() == 27 * 64));
    }

    #[test]
    fn empty_world_streams_nothing_without_fault() {
        let world = World::new(Camera::new(Point3::new(0.0, 0.0, 0.0)), Vec::new());
        let mut pipeline = InstanceTransformPipeline::new(36);
        let mut target = RecordingTarget::default();

        let stats = pipeline.render(&world, &mut target);

        assert_eq!(stats.instance_count, 0);
        assert_eq!(stats.uploaded_bytes, 0);
        assert_eq!(draws(&target), vec![(36, 0)]);
        assert!(matches!(&target.commands[1], Command::Stream(bytes) if bytes.is_empty()));
    }

    #[test]
    fn view_is_set_before_the_draw() {
        let world = World::grid([1, 1, 1], Point3::new(0.0, 0.0, 2.0));
        let mut target = RecordingTarget::default();

        InstanceTransformPipeline::new(36).render(&world, &mut target);

        assert_eq!(target.commands[0], Command::View(world.camera().calc_matrix()));
        assert!(matches!(target.commands.last(), Some(Command::Draw { .. })));
    }

    #[test]
    fn uploaded_transforms_ignore_cube_rotation() {
        let cubes = vec![Cube::new(
            Point3::new(1.0, -2.0, 3.0),
            Vector3::new(30.0, 45.0, 60.0),
        )];
        let mut world = World::new(Camera::new(Point3::new(0.0, 0.0, 0.0)), cubes);
        world.advance(10.0);

        let mut pipeline = InstanceTransformPipeline::new(36);
        let transforms = pipeline.rebuild(&world);

        let expected = InstanceRaw::from_matrix(Matrix4::from_translation(Vector3::new(1.0, -2.0, 3.0)));
        assert_eq!(transforms, &[expected]);
    }

    #[test]
    fn every_frame_replaces_the_whole_stream() {
        let mut world = World::grid([2, 1, 1], Point3::new(0.0, 0.0, 0.0));
        let mut pipeline = InstanceTransformPipeline::new(36);

        let mut first = RecordingTarget::default();
        pipeline.render(&world, &mut first);
        world.advance(1.0);
        let mut second = RecordingTarget::default();
        let stats = pipeline.render(&world, &mut second);

        assert_eq!(stats.uploaded_bytes, 2 * 64);
        assert_eq!(first.commands[1], second.commands[1]);
    }
}
