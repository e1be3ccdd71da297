//! ledcal: an interactive viewer for LED rig calibration results.
//!
//! A calibration run photographs every LED of a rig through a camera and reflective
//! reference spheres, then solves for the LED positions. This crate shows the outcome
//! of one run in 3D: the LEDs, the spheres, the fitted reference plane and the camera
//! that took the photographs.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledcal::{DataDirSource, HostPage, Viewer, ViewerConfig};
//!
//! fn main() -> Result<(), ledcal::AppError> {
//!     let config = ViewerConfig::new("42", "/var/lib/ledcal");
//!     let page = HostPage::standard(&config.options);
//!     let source = Arc::new(DataDirSource::new(config.data_dir()));
//!     let mut viewer = Viewer::new(config, page, source)?;
//!     viewer.begin_fetch();
//!     ledcal::run(viewer)
//! }
//! ```
//!
//! # Interaction
//!
//! - Click an LED to light it, click it again to switch it off
//! - Arrow keys step through the LEDs
//! - Click the camera to fly back to where the photographs were taken
//! - Drag to orbit, right-drag or shift-drag to pan, scroll to zoom

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Pixel coordinates are converted between f64, f32 and u32
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

mod app;
pub mod config;
pub mod source;
pub mod viewer;

pub use app::{run, AppError};
pub use config::ViewerConfig;
pub use source::{spawn_fetch, ArtifactSource, DataDirSource, FetchOutcome, PendingFetch};
pub use viewer::{NavKey, Viewer, ViewerState, NO_LED_SELECTED};

// Re-export the types callers need to build a viewer
pub use ledcal_core::{CalibrationResult, LedcalError, Result, ViewerOptions};
pub use ledcal_ui::{ids, HostPage, PageEvent};
