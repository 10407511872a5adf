//! # Core Module
//!
//! Shared-ownership primitives used by the renderer. The viewer runs a single
//! thread, so the only container needed is `StSystem`, a reference-counted
//! handle with `RefCell` interior mutability.

pub mod st_system;

pub use st_system::StSystem;
