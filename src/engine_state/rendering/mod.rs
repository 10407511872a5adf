//! Rendering system for the viewer.
//!
//! This module owns the surface and every GPU resource needed to draw the
//! cube grid with a single instanced draw per frame.

use log::{debug, info};
use wgpu::{util::BufferInitDescriptor, BufferUsages, Device, Queue, Surface, SurfaceConfiguration};

use crate::{core::StSystem, error::ViewerError};

use super::{buffer_state::BufferState, camera_state::camera, voxels::world::World};

pub mod bind_group_state;
pub mod instancing;
pub mod pipeline_manager;
pub mod texture;
pub mod vertex;

use bind_group_state::{CameraUniform, CAMERA_BUFFER_NAME};
use instancing::{FrameStats, InstanceTransformPipeline};
use pipeline_manager::{PipelineManager, WgpuFrameTarget};
use texture::MipChain;
use vertex::{InstanceRaw, CUBE_VERTICES};

/// Name of the shared cube mesh buffer
pub const MESH_BUFFER_NAME: &str = "cube_mesh_buffer";
/// Name of the per-frame instance transform buffer
pub const INSTANCE_BUFFER_NAME: &str = "instance_transform_buffer";

/// Inputs needed to build the renderer once the GPU is ready.
pub struct RendererDescriptor<'a> {
    /// WGSL source for the cube pipeline
    pub shader_string: &'a str,
    /// Cube texture with its mip chain
    pub material: &'a MipChain,
    /// Background RGBA
    pub clear_color: [f64; 4],
    /// Instances the buffer is first sized for
    pub initial_instance_count: usize,
}

/// Manages the entire rendering pipeline for the viewer.
///
/// This struct is the main entry point for all rendering operations.
/// It manages the WebGPU surface, device, queue, and rendering pipeline.
pub struct InstanceRendererManager {
    /// The WebGPU surface being rendered to
    surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    device: StSystem<Device>,
    /// The WebGPU queue for submitting command buffers
    queue: StSystem<Queue>,
    /// Shared registry of named GPU buffers
    buffer_state: StSystem<BufferState>,
    /// Manages the rendering pipeline and shaders
    pipeline_manager: PipelineManager,
    /// Turns the world into instance transforms each frame
    instance_pipeline: InstanceTransformPipeline,
    /// Camera projection settings
    camera_projection: camera::Projection,
}

impl InstanceRendererManager {
    /// Creates the renderer and uploads the static resources.
    ///
    /// # Arguments
    /// * `surface` - The configured surface to render to
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The GPU device
    /// * `queue` - The GPU command queue
    /// * `camera_projection` - Initial projection settings
    /// * `descriptor` - Shader, texture and scene sizing
    ///
    /// # Errors
    /// Fails if the shader does not compile.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: StSystem<Device>,
        queue: StSystem<Queue>,
        camera_projection: camera::Projection,
        descriptor: RendererDescriptor,
    ) -> Result<Self, ViewerError> {
        let mut buffer_state = BufferState::new(device.clone(), queue.clone());

        buffer_state.create_buffer_init(
            MESH_BUFFER_NAME,
            BufferInitDescriptor {
                label: Some(MESH_BUFFER_NAME),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: BufferUsages::VERTEX,
            },
        );

        buffer_state.create_buffer(
            INSTANCE_BUFFER_NAME,
            wgpu::BufferDescriptor {
                label: Some(INSTANCE_BUFFER_NAME),
                size: super::buffer_state::aligned_capacity(
                    (descriptor.initial_instance_count * std::mem::size_of::<InstanceRaw>()) as u64,
                ),
                usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            },
        );

        let camera_uniform = CameraUniform::new(camera_projection.calc_matrix());
        buffer_state.create_buffer_init(
            CAMERA_BUFFER_NAME,
            BufferInitDescriptor {
                label: Some(CAMERA_BUFFER_NAME),
                contents: bytemuck::bytes_of(&camera_uniform),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            },
        );

        let buffer_state = StSystem::new(buffer_state);

        let pipeline_manager = PipelineManager::new(
            device.clone(),
            queue.clone(),
            &surface_config,
            buffer_state.clone(),
            descriptor.shader_string,
            descriptor.material,
            descriptor.clear_color,
        )?;

        info!(
            "Renderer ready: {} GPU bytes allocated",
            buffer_state.get().get_total_allocated_memory()
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            buffer_state,
            pipeline_manager,
            instance_pipeline: InstanceTransformPipeline::new(CUBE_VERTICES.len() as u32),
            camera_projection,
        })
    }

    /// Handles window resize events.
    ///
    /// Zero-sized resizes (minimized windows) are ignored.
    ///
    /// # Arguments
    /// * `size` - The new window size in physical pixels
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            debug!("Ignoring zero-sized resize");
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.reconfigure();

        self.camera_projection.resize(size.width, size.height);
        let projection: [[f32; 4]; 4] = self.camera_projection.calc_matrix().into();
        self.buffer_state.get_mut().write_buffer(
            CAMERA_BUFFER_NAME,
            CameraUniform::PROJECTION_OFFSET,
            bytemuck::bytes_of(&projection),
        );

        self.pipeline_manager
            .resize(&self.device.get(), &self.surface_config);
    }

    /// Reapplies the current configuration to the surface, as needed after
    /// it is lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface
            .configure(&self.device.get(), &self.surface_config);
    }

    /// Renders the world.
    ///
    /// The instance pipeline records into a GPU frame target, then the
    /// pipeline manager encodes and presents the pass.
    ///
    /// # Errors
    /// Returns the surface error when the frame could not be acquired.
    pub fn render(&mut self, world: &World) -> Result<FrameStats, wgpu::SurfaceError> {
        let (stats, draw_call) = {
            let mut target = WgpuFrameTarget::new(self.buffer_state.get_mut());
            let stats = self.instance_pipeline.render(world, &mut target);
            (stats, target.finish())
        };

        self.pipeline_manager.render(
            &self.surface,
            &self.device.get(),
            &self.queue.get(),
            draw_call,
        )?;
        Ok(stats)
    }
}
