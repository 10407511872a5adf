//! # Viewer Errors
//!
//! Startup failures for the viewer. Every variant here is fatal: the
//! application logs it and exits before the first frame is rendered.
//! Per-frame conditions are absorbed by the engine and never surface as
//! a `ViewerError`.

use std::path::PathBuf;

/// Errors that abort viewer startup.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The configuration file could not be read
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `ViewerConfig`
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The configuration parsed but holds unusable values
    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    /// The shader source file could not be read
    #[error("failed to read shader {path:?}: {source}")]
    ShaderRead {
        /// Path of the shader source
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The shader failed validation or the render pipeline could not be built
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// The texture file could not be read
    #[error("failed to read texture {path:?}: {source}")]
    TextureRead {
        /// Path of the texture image
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The texture bytes are not a decodable image
    #[error("failed to decode texture: {0}")]
    TextureDecode(#[from] image::ImageError),

    /// The texture is empty or exceeds the device's 2D texture limit
    #[error("texture is {width}x{height}, device supports 1 to {max} texels per side")]
    TextureSize {
        /// Base level width
        width: u32,
        /// Base level height
        height: u32,
        /// Largest side the device accepts
        max: u32,
    },

    /// The device rejected the texture upload
    #[error("texture upload failed: {0}")]
    TextureUpload(String),

    /// The OS refused to create the window
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or exited abnormally
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// No rendering surface could be created for the window
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// The surface reports no texture format usable with the adapter
    #[error("surface is not supported by the adapter")]
    SurfaceUnsupported,

    /// No GPU adapter is compatible with the surface
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
