//! # Voxel Viewer Entry Point
//!
//! Runs the viewer and exits with a non-zero status if startup fails.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! VOXEL_VIEWER_CONFIG=my_scene.json cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_viewer::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
