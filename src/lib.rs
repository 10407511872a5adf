#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Viewer
//!
//! A first-person viewer for a grid of textured cubes, built with Rust and WGPU.
//!
//! Every cube shares one mesh; their transforms are streamed to the GPU each
//! frame and drawn with a single instanced draw call.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, input, frame timing and the event loop handler
//! * `core` - Shared single-threaded handles used by the renderer
//! * `engine_state` - Camera, world and the instanced renderer
//! * `config` - Settings loaded from JSON
//! * `error` - Startup errors
//!
//! ## Usage
//!
//! ```ignore
//! fn main() {
//!     if let Err(err) = voxel_viewer::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! ## Controls
//!
//! W/A/S/D walk, Space and Left Control rise and sink, the pointer looks
//! around and Escape quits.

use application_state::{
    graphics_resources_builder::{GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
use log::info;
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::ViewerConfig;
pub use error::ViewerError;

/// Starts the viewer and blocks until its window closes.
///
/// Installs the logger, loads the configuration and runs the event loop.
///
/// # Errors
///
/// Returns the first startup failure: bad configuration, missing or invalid
/// assets, or no usable window, GPU or shader.
pub fn run() -> Result<(), ViewerError> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = ViewerConfig::load()?;

    let event_loop = EventLoop::with_user_event().build()?;

    let mut state = ApplicationState::new(
        MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy(), config.clone())),
        config,
    );

    event_loop.run_app(&mut state)?;

    match state.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
