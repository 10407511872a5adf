//! # Viewer Configuration
//!
//! Runtime settings for the viewer, loaded once at startup from a JSON file.
//!
//! ## Lookup Order
//! 1. The file named by the `VOXEL_VIEWER_CONFIG` environment variable (must exist)
//! 2. `assets/viewer.json`, if present
//! 3. Built-in defaults
//!
//! Every field is optional in the file; missing fields take their default.

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::ViewerError;

/// Bytes uploaded per cube each frame
const INSTANCE_STRIDE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VOXEL_VIEWER_CONFIG";

/// Config file picked up when no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "assets/viewer.json";

/// Settings for the window, camera, scene and assets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Initial window width in pixels
    pub window_width: u32,
    /// Initial window height in pixels
    pub window_height: u32,
    /// Window title shown until the first framerate measurement
    pub window_title: String,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clipping plane distance
    pub z_near: f32,
    /// Far clipping plane distance
    pub z_far: f32,
    /// Background color as RGBA
    pub clear_color: [f64; 4],
    /// Distance moved per reference frame while a movement key is held
    pub move_speed: f32,
    /// Degrees turned per pixel of pointer motion
    pub mouse_sensitivity: f32,
    /// Frame duration, in milliseconds, that movement and animation are tuned for
    pub reference_frame_ms: f32,
    /// Cube spin per reference frame, in degrees
    pub rotation_step_degrees: f32,
    /// Number of cubes along x, y and z
    pub grid_size: [u32; 3],
    /// Starting camera position
    pub spawn_position: [f32; 3],
    /// WGSL source for the instanced cube pipeline
    pub shader_path: PathBuf,
    /// Image applied to every cube face
    pub texture_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            window_title: String::from("Voxel Viewer"),
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            clear_color: [0.0, 0.7, 1.0, 1.0],
            move_speed: 0.1,
            mouse_sensitivity: 0.05,
            reference_frame_ms: 16.7,
            rotation_step_degrees: 0.25,
            grid_size: [3, 3, 3],
            spawn_position: [0.0, 0.0, 2.0],
            shader_path: PathBuf::from("assets/shaders/instanced_cube.wgsl"),
            texture_path: PathBuf::from("assets/textures/grass.png"),
        }
    }
}

impl ViewerConfig {
    /// Loads the configuration following the lookup order described in the module docs.
    ///
    /// # Errors
    /// Returns an error if an explicitly requested file is missing, if a file
    /// cannot be parsed, or if the resulting values fail validation.
    pub fn load() -> Result<Self, ViewerError> {
        if let Ok(explicit_path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_path(Path::new(&explicit_path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            return Self::from_path(default_path);
        }

        info!("No config file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    ///
    /// # Arguments
    /// * `path` - Location of the JSON file
    pub fn from_path(path: &Path) -> Result<Self, ViewerError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ViewerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json(contents: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would break projection or time normalization.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ViewerError::ConfigInvalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if !(self.reference_frame_ms > 0.0) {
            return Err(ViewerError::ConfigInvalid(format!(
                "reference_frame_ms must be positive, got {}",
                self.reference_frame_ms
            )));
        }
        if !(self.z_near > 0.0 && self.z_near < self.z_far) {
            return Err(ViewerError::ConfigInvalid(format!(
                "clip planes must satisfy 0 < z_near < z_far, got {} and {}",
                self.z_near, self.z_far
            )));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ViewerError::ConfigInvalid(format!(
                "fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        self.grid_instance_bytes()?;
        Ok(())
    }

    /// Number of cubes the configured grid holds, or `None` if it overflows.
    pub fn grid_cube_count(&self) -> Option<u64> {
        let [x, y, z] = self.grid_size;
        u64::from(x)
            .checked_mul(u64::from(y))?
            .checked_mul(u64::from(z))
    }

    /// Size of the per-frame instance stream for the configured grid.
    ///
    /// The stream must fit in one buffer under the default device limits.
    fn grid_instance_bytes(&self) -> Result<u64, ViewerError> {
        let max_buffer_size = wgpu::Limits::default().max_buffer_size;
        self.grid_cube_count()
            .and_then(|count| count.checked_mul(INSTANCE_STRIDE))
            .filter(|bytes| *bytes <= max_buffer_size)
            .ok_or_else(|| {
                ViewerError::ConfigInvalid(format!(
                    "grid_size {:?} needs more than {} bytes of instance data",
                    self.grid_size, max_buffer_size
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.grid_size, [3, 3, 3]);
        assert_eq!(config.spawn_position, [0.0, 0.0, 2.0]);
        assert_eq!(config.reference_frame_ms, 16.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = ViewerConfig::from_json(r#"{ "move_speed": 0.5, "grid_size": [2, 1, 4] }"#)
            .unwrap();
        assert_eq!(config.move_speed, 0.5);
        assert_eq!(config.grid_size, [2, 1, 4]);
        assert_eq!(config.window_width, 640);
        assert_eq!(config.mouse_sensitivity, 0.05);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = ViewerConfig::from_json("{ not json");
        assert!(matches!(result, Err(ViewerError::ConfigParse(_))));
    }

    #[test]
    fn non_positive_reference_frame_is_rejected() {
        let result = ViewerConfig::from_json(r#"{ "reference_frame_ms": 0.0 }"#);
        assert!(matches!(result, Err(ViewerError::ConfigInvalid(_))));
    }

    #[test]
    fn inverted_clip_planes_are_rejected() {
        let result = ViewerConfig::from_json(r#"{ "z_near": 10.0, "z_far": 1.0 }"#);
        assert!(matches!(result, Err(ViewerError::ConfigInvalid(_))));
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let result = ViewerConfig::from_json(r#"{ "grid_size": [65536, 65536, 1] }"#);
        assert!(matches!(result, Err(ViewerError::ConfigInvalid(_))));

        let result = ViewerConfig::from_json(r#"{ "grid_size": [4294967295, 4294967295, 4294967295] }"#);
        assert!(matches!(result, Err(ViewerError::ConfigInvalid(_))));
    }

    #[test]
    fn grid_larger_than_one_buffer_is_rejected() {
        let result = ViewerConfig::from_json(r#"{ "grid_size": [200, 200, 200] }"#);
        assert!(matches!(result, Err(ViewerError::ConfigInvalid(_))));
    }

    #[test]
    fn empty_and_moderate_grids_are_accepted() {
        let empty = ViewerConfig::from_json(r#"{ "grid_size": [0, 5, 5] }"#).unwrap();
        assert_eq!(empty.grid_cube_count(), Some(0));

        let moderate = ViewerConfig::from_json(r#"{ "grid_size": [100, 100, 100] }"#).unwrap();
        assert_eq!(moderate.grid_cube_count(), Some(1_000_000));
    }

    #[test]
    fn missing_file_reports_path() {
        let result = ViewerConfig::from_path(Path::new("definitely/not/here.json"));
        match result {
            Err(ViewerError::ConfigRead { path, .. }) => {
                assert_eq!(path, PathBuf::from("definitely/not/here.json"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
