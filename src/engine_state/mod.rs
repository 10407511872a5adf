//! # Engine State Module
//!
//! The core engine module that owns the scene and everything needed to draw it.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `buffer_state` - Manages GPU buffers for rendering
//! * `camera_state` - Handles camera positioning and movement
//! * `rendering` - Contains the instanced cube renderer
//! * `voxels` - Cubes and the world that holds them
//!
//! ## Frame Order
//!
//! Each frame the application calls `process_input`, then `update`, then
//! `render`. Input and animation are scaled by the elapsed ratio handed in by
//! the frame timer.

use cgmath::{Deg, Point3};
use log::info;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::{
    application_state::input_state::ProcessedInputState, config::ViewerConfig, core::StSystem,
    error::ViewerError,
};
use camera_state::{camera::Projection, CameraController};
use rendering::{instancing::FrameStats, texture::MipChain, InstanceRendererManager, RendererDescriptor};
use voxels::world::World;

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod voxels;

/// GPU handles and assets produced by the graphics bootstrap.
pub struct GraphicsContext {
    /// Configured window surface
    pub surface: Surface<'static>,
    /// Configuration the surface was set up with
    pub surface_config: SurfaceConfiguration,
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
    /// WGSL source for the cube pipeline
    pub shader_string: String,
    /// Decoded cube texture
    pub material: MipChain,
}

/// The main state container for the viewer.
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(context, &config)?;
///
/// // Main loop
/// loop {
///     engine_state.process_input(&input, ratio);
///     engine_state.update(ratio);
///     engine_state.render()?;
/// }
/// ```
pub struct EngineState {
    /// Camera and cubes
    world: World,
    /// Applies input to the camera
    camera_controller: CameraController,
    /// Manager for rendering operations
    render_manager: InstanceRendererManager,
}

impl EngineState {
    /// Builds the scene and the renderer.
    ///
    /// # Arguments
    ///
    /// * `context` - GPU handles plus the loaded shader and texture
    /// * `config` - Scene, camera and projection settings
    ///
    /// # Errors
    ///
    /// Fails if the renderer cannot be created, e.g. when the shader does not
    /// compile.
    pub fn new(context: GraphicsContext, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let world = World::grid(config.grid_size, Point3::from(config.spawn_position))
            .with_rotation_step(config.rotation_step_degrees);
        info!("Built world with {} cubes", world.cubes().len());

        let projection = Projection::new(
            context.surface_config.width,
            context.surface_config.height,
            Deg(config.fov_y_degrees),
            config.z_near,
            config.z_far,
        );

        let render_manager = InstanceRendererManager::new(
            context.surface,
            context.surface_config,
            StSystem::new(context.device),
            StSystem::new(context.queue),
            projection,
            RendererDescriptor {
                shader_string: &context.shader_string,
                material: &context.material,
                clear_color: config.clear_color,
                initial_instance_count: world.cubes().len(),
            },
        )?;

        Ok(Self {
            world,
            camera_controller: CameraController::new(config.move_speed, config.mouse_sensitivity),
            render_manager,
        })
    }

    /// Moves and turns the camera from this frame's input.
    pub fn process_input(&mut self, input: &ProcessedInputState, elapsed_ratio: f32) {
        self.camera_controller
            .apply(&mut self.world, input, elapsed_ratio);
    }

    /// Advances the cube animation.
    pub fn update(&mut self, elapsed_ratio: f32) {
        self.world.advance(elapsed_ratio);
    }

    /// Draws the current world.
    ///
    /// # Errors
    /// Returns the surface error when the frame could not be acquired.
    pub fn render(&mut self) -> Result<FrameStats, wgpu::SurfaceError> {
        self.render_manager.render(&self.world)
    }

    /// Rebuilds size-dependent resources after a window resize.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
    }

    /// Reconfigures the surface after it was lost or became outdated.
    pub fn reconfigure_surface(&mut self) {
        self.render_manager.reconfigure();
    }
}
