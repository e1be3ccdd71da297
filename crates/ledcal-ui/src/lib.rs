//! UI layer for the LED calibration viewer using egui.
//!
//! The viewer talks to its surroundings through a [`HostPage`]: a registry of
//! named elements it resolves once at start-up and then drives through typed
//! handles. [`panels`] draws that page with egui.

// Window scale factors arrive as f64
#![allow(clippy::cast_possible_truncation)]

pub mod integration;
pub mod page;
pub mod panels;
pub mod photo;

pub use integration::EguiIntegration;
pub use page::{
    ids, CheckboxHandle, ContainerHandle, ElementKind, HostPage, ImageHandle, PageEvent,
    SectionHandle, TextHandle,
};
pub use panels::{build_page_panel, PanelOutput};
pub use photo::{Photo, PhotoCache};
