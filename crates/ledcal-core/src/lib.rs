//! Core abstractions for the LED calibration viewer.
//!
//! This crate holds everything that does not need a GPU:
//! - [`CalibrationResult`] and the calibration data model
//! - The fixed server-to-render coordinate transform ([`coords`])
//! - A small arena [`Scene`] graph and the meshes placed in it
//! - Ray picking through a [`PickLayer`]
//! - The selection state machine ([`LedVisual`], [`LedCollection`]), the
//!   [`CameraRepresentation`] and the camera [`Animation`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Mesh tessellation and averaging cast counts to f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod animation;
pub mod calibration;
pub mod camera_rep;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod led;
pub mod options;
pub mod pick;
pub mod scene;

pub use animation::{Animation, CameraPose};
pub use calibration::{Calibration, CalibrationResult, Led, Plane};
pub use camera_rep::CameraRepresentation;
pub use error::{LedcalError, Result};
pub use geometry::{LineSet, MeshGeometry};
pub use led::{LedCollection, LedVisual};
pub use options::ViewerOptions;
pub use pick::{Collider, PickHit, PickLayer, PickRole, Ray};
pub use scene::{Material, NodeContent, NodeId, Scene, SceneNode};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
