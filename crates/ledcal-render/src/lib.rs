//! Rendering backend for the LED calibration viewer.
//!
//! This crate provides:
//! - The wgpu [`RenderEngine`] that draws a [`ledcal_core::Scene`]
//! - The viewer [`Camera`] and damped [`OrbitControls`]
//!
//! [`Camera`] and [`OrbitControls`] do not touch the GPU and can be driven headless.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Pixel sizes and element counts are cast between integer and float types
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod camera;
pub mod controls;
pub mod engine;
pub mod error;

pub use camera::Camera;
pub use controls::OrbitControls;
pub use engine::{GlobalUniforms, ObjectUniforms, RenderEngine, Vertex};
pub use error::{RenderError, RenderResult};
