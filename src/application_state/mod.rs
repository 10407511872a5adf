//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Frame timing and the per-frame update/render order
//! - Application lifecycle events

pub mod frame_timer;
pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use frame_timer::FrameTimer;
use graphics_resources_builder::{Graphics, MaybeGraphics};
use input_manager::InputManager;
use input_state::KEY_EXIT;

use log::{error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{config::ViewerConfig, engine_state::EngineState, error::ViewerError};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window and device events.
pub struct ApplicationState {
    /// The current graphics state, which may be pending, ready or moved into the engine
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Viewer settings
    pub config: ViewerConfig,

    /// The startup failure that stopped the event loop, if any
    pub startup_error: Option<ViewerError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Measures framerate and derives the elapsed ratio
    pub frame_timer: FrameTimer,
}

impl ApplicationState {
    /// Creates the application in its pre-graphics state.
    pub fn new(graphics: MaybeGraphics, config: ViewerConfig) -> Self {
        Self {
            graphics,
            state: None,
            config,
            startup_error: None,
        }
    }

    /// Records a fatal startup failure and stops the event loop.
    fn fail_startup(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("Startup failed: {}", err);
        self.startup_error = Some(err);
        event_loop.exit();
    }

    /// Initializes the application state with the graphics resources.
    ///
    /// This method transitions the application from the initialization phase to the running state
    /// by setting up the engine state with the provided graphics resources.
    fn initialize_application_state(&mut self) -> Result<(), ViewerError> {
        let MaybeGraphics::Graphics(_) = &self.graphics else {
            return Ok(());
        };
        let MaybeGraphics::Graphics(graphics) =
            std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return Ok(());
        };

        let Graphics { window, context } = graphics;
        let engine_state = EngineState::new(context, &self.config)?;

        grab_cursor(&window);

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
            frame_timer: FrameTimer::new(web_time::Instant::now(), self.config.reference_frame_ms),
        });
        info!("Viewer running");
        Ok(())
    }
}

/// Hides the pointer and keeps it inside the window.
///
/// Locking is preferred; platforms without it fall back to confining.
fn grab_cursor(window: &Window) {
    window.set_cursor_visible(false);
    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
    {
        warn!("Could not grab the cursor: {}", err);
    }
}

impl InitializedApplicationState {
    /// Draws a frame and updates the framerate shown in the title.
    ///
    /// Surface loss is recovered by reconfiguring; running out of memory
    /// ends the application.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        match self.engine_state.render() {
            Ok(stats) => trace!(
                "Drew {} instances ({} bytes, {} draw calls)",
                stats.instance_count,
                stats.uploaded_bytes,
                stats.draw_calls
            ),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.engine_state.reconfigure_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
                return;
            }
            Err(err) => {
                warn!("Skipping frame: {}", err);
            }
        }

        if let Some(framerate) = self.frame_timer.tick(web_time::Instant::now()) {
            self.window.set_title(&format!("running at {framerate}"));
        }
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            if let WindowEvent::CloseRequested = event {
                event_loop.exit();
            }
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if is_focused {
                    grab_cursor(&state.window);
                } else {
                    state.input_manager.reset_inputs();
                }
            }
            WindowEvent::RedrawRequested => {
                state.redraw(event_loop);
            }
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KEY_EXIT),
                        ..
                    },
                ..
            } => {
                info!("Exit requested");
                event_loop.exit();
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    /// * `_device_id` - ID of the device that generated the event
    /// * `event` - The device event to process
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Called when the application is resumed.
    ///
    /// Triggers graphics initialization if it has not happened yet.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let MaybeGraphics::Builder(builder) = &mut self.graphics else {
            return;
        };
        if let Err(err) = builder.build_and_send(event_loop) {
            self.fail_startup(event_loop, err);
        }
    }

    /// Receives the built graphics resources and starts the engine.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `graphics` - The initialized graphics resources
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);

        if let Err(err) = self.initialize_application_state() {
            self.fail_startup(event_loop, err);
        }
    }

    /// Called before the event loop goes to sleep.
    ///
    /// Applies this frame's input, advances the animation and requests the
    /// redraw, in that order.
    ///
    /// # Arguments
    /// * `_event_loop` - Reference to the active event loop
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let elapsed_ratio = state.frame_timer.frame_ratio();
            let processed_input = state.input_manager.get_and_reset_processed_input();

            state
                .engine_state
                .process_input(&processed_input, elapsed_ratio);
            state.engine_state.update(elapsed_ratio);

            state.window.request_redraw();
        }
    }
}
