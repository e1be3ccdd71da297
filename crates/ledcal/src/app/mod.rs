//! Application window and event loop management.

mod input;
mod render;

use std::sync::Arc;

use ledcal_core::LedcalError;
use ledcal_render::{RenderEngine, RenderError};
use ledcal_ui::{EguiIntegration, PhotoCache};
use thiserror::Error;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::viewer::Viewer;

/// Errors that stop the application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Viewer(#[from] LedcalError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// Window, GPU and UI state wrapped around a [`Viewer`].
pub(crate) struct App {
    pub(super) viewer: Viewer,
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) egui: Option<EguiIntegration>,
    pub(super) photos: PhotoCache,
    pub(super) close_requested: bool,
    // Set when start-up fails inside the event loop
    pub(super) fatal: Option<AppError>,
    // Mouse state in physical pixels
    pub(super) mouse_pos: (f64, f64),
    pub(super) left_mouse_down: bool,
    pub(super) right_mouse_down: bool,
    pub(super) shift_down: bool,
    // Accumulated distance since the last press
    pub(super) drag_distance: f64,
    // 3D view area as [x, y, width, height] in physical pixels
    pub(super) viewport: [f32; 4],
    // Scene revision whose geometry the engine holds
    pub(super) uploaded_revision: u64,
}

impl App {
    fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            window: None,
            engine: None,
            egui: None,
            photos: PhotoCache::new(),
            close_requested: false,
            fatal: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            shift_down: false,
            drag_distance: 0.0,
            viewport: [0.0; 4],
            uploaded_revision: 0,
        }
    }

    /// Whether the mouse is over the 3D view.
    pub(super) fn mouse_in_viewport(&self) -> bool {
        let [x, y, width, height] = self.viewport;
        let (mx, my) = (self.mouse_pos.0 as f32, self.mouse_pos.1 as f32);
        mx >= x && my >= y && mx < x + width && my < y + height
    }
}

/// Opens the viewer window and runs until it is closed.
pub fn run(viewer: Viewer) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(viewer);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
