//! # Graphics Resources Builder
//!
//! This module handles the creation of the graphics resources the viewer needs
//! before its first frame: the window, the WebGPU device and surface, the
//! shader source and the decoded cube texture.
//!
//! The main components are:
//! - `Graphics`: Holds the window and the resources handed to the engine
//! - `GraphicsBuilder`: Builds `Graphics` once the event loop is running
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::sync::Arc;

use log::{info, warn};
use wgpu::Features;
use winit::{
    dpi::PhysicalSize,
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    engine_state::{
        rendering::texture::{decode_rgba, MipChain},
        GraphicsContext,
    },
    error::ViewerError,
};

/// Everything produced by graphics initialization.
pub struct Graphics {
    /// The viewer window
    pub window: Arc<Window>,
    /// GPU handles and loaded assets
    pub context: GraphicsContext,
}

/// Reads the shader source and decodes the texture named by the config.
///
/// # Errors
/// Fails if either file is missing or the texture cannot be decoded.
pub fn load_assets(config: &ViewerConfig) -> Result<(String, MipChain), ViewerError> {
    let shader_string = std::fs::read_to_string(&config.shader_path).map_err(|source| {
        ViewerError::ShaderRead {
            path: config.shader_path.clone(),
            source,
        }
    })?;

    let texture_bytes =
        std::fs::read(&config.texture_path).map_err(|source| ViewerError::TextureRead {
            path: config.texture_path.clone(),
            source,
        })?;
    let material = MipChain::generate(&decode_rgba(&texture_bytes)?);
    info!(
        "Loaded texture {} ({}x{}, {} mip levels)",
        config.texture_path.display(),
        material.width,
        material.height,
        material.level_count
    );

    Ok((shader_string, material))
}

/// Creates the window and starts creating the GPU resources for it.
///
/// Window and surface creation must happen on the event loop thread and are
/// done eagerly; adapter and device requests are returned as a future.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
/// * `config` - Window size, title and asset paths
fn create_graphics(
    event_loop: &ActiveEventLoop,
    config: &ViewerConfig,
) -> Result<impl Future<Output = Result<Graphics, ViewerError>> + 'static, ViewerError> {
    let (shader_string, material) = load_assets(config)?;

    let window_attrs = Window::default_attributes()
        .with_title(config.window_title.clone())
        .with_inner_size(PhysicalSize::new(config.window_width, config.window_height))
        .with_resizable(true);

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    // The instance is a handle to our GPU
    // Backends::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(ViewerError::SurfaceUnsupported)?;
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok::<_, ViewerError>(Graphics {
            window,
            context: GraphicsContext {
                surface,
                surface_config,
                device,
                queue,
                shader_string,
                material,
            },
        })
    })
}

/// Helper struct for managing the initialization of graphics resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
    config: ViewerConfig,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume
    Builder(GraphicsBuilder),

    /// Graphics resources are ready but not yet handed to the engine
    Graphics(Graphics),

    /// Graphics resources have been moved into the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a new GraphicsBuilder with the specified event loop proxy.
    ///
    /// # Arguments
    /// * `event_loop_proxy` - Used to send the initialized graphics resources back to the event loop
    /// * `config` - Settings for the window and assets
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>, config: ViewerConfig) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
            config,
        }
    }

    /// Builds the graphics resources and sends them back through the event
    /// loop as a user event.
    ///
    /// Does nothing if graphics were already built.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop used to create the graphics context
    ///
    /// # Errors
    /// Returns the first initialization failure.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return Ok(());
        };

        let gfx = pollster::block_on(create_graphics(event_loop, &self.config)?)?;
        if event_loop_proxy.send_event(gfx).is_err() {
            warn!("Event loop closed before graphics were delivered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_shader_is_reported_with_its_path() {
        let config = ViewerConfig {
            shader_path: PathBuf::from("no/such/shader.wgsl"),
            ..ViewerConfig::default()
        };
        match load_assets(&config) {
            Err(ViewerError::ShaderRead { path, .. }) => {
                assert_eq!(path, PathBuf::from("no/such/shader.wgsl"))
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("loading should fail"),
        }
    }

    #[test]
    fn bundled_assets_load() {
        let assets = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        let config = ViewerConfig {
            shader_path: assets.join("shaders/instanced_cube.wgsl"),
            texture_path: assets.join("textures/grass.png"),
            ..ViewerConfig::default()
        };

        let (shader, material) = load_assets(&config).expect("bundled assets load");
        assert!(shader.contains("fn vs_main"));
        assert_eq!((material.width, material.height), (16, 16));
        assert_eq!(material.level_count, 5);
    }
}
