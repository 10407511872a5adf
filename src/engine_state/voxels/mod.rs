//! Scene data for the viewer: the cube instances and the world that owns
//! them together with the camera.

pub mod cube;
pub mod world;
