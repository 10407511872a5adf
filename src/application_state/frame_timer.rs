//! # Frame Timer
//!
//! Measures the framerate and turns it into the elapsed ratio that scales
//! movement and animation.
//!
//! The frame time is only recomputed once at least a second has passed, from
//! the number of frames drawn in that window. Between measurements every frame
//! uses the last computed value.

use web_time::{Duration, Instant};

const MEASUREMENT_WINDOW: Duration = Duration::from_secs(1);

/// Counts frames and derives the per-frame elapsed ratio.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    /// Start of the current measurement window
    window_start: Instant,
    /// Frames drawn since `window_start`
    frames: u32,
    /// Last measured frame time in milliseconds
    frame_time_ms: f32,
    /// Frame time movement and animation speeds are tuned for
    reference_frame_ms: f32,
}

impl FrameTimer {
    /// Starts timing at `now`.
    ///
    /// Until the first measurement the frame time equals the reference, so
    /// the first second runs at ratio 1.
    pub fn new(now: Instant, reference_frame_ms: f32) -> Self {
        Self {
            window_start: now,
            frames: 0,
            frame_time_ms: reference_frame_ms,
            reference_frame_ms,
        }
    }

    /// Records a finished frame.
    ///
    /// Returns the measured framerate when a measurement window closes.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < MEASUREMENT_WINDOW {
            return None;
        }

        let framerate = ((self.frames as f64 / elapsed.as_secs_f64()) as u32).max(1);
        self.frame_time_ms = 1000.0 / framerate as f32;
        self.window_start = now;
        self.frames = 0;

        Some(framerate)
    }

    /// Last measured frame time in milliseconds
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    /// Last measured frame time divided by the reference frame time
    pub fn frame_ratio(&self) -> f32 {
        self.frame_time_ms / self.reference_frame_ms
    }
}
