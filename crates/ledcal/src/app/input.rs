use std::sync::Arc;

use glam::Vec2;
use ledcal_render::RenderEngine;
use ledcal_ui::EguiIntegration;
use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use super::{App, AppError};
use crate::viewer::NavKey;

/// Pointer travel in pixels below which a press and release count as a click.
const DRAG_THRESHOLD: f64 = 5.0;

impl App {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attributes = Window::default_attributes()
            .with_title(format!(
                "LED calibration {}",
                self.viewer.config().calibration_id
            ))
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let mut engine = RenderEngine::new_windowed(window.clone()).block_on()?;
        engine.background_color = self.viewer.config().options.background_color;
        let egui = EguiIntegration::new(&engine.device, engine.surface_format(), &window);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.egui = Some(egui);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window(event_loop) {
            log::error!("{err}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Track the physical button state even when egui takes the event.
        match &event {
            WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                (MouseButton::Left, ElementState::Pressed) => {
                    self.left_mouse_down = true;
                    self.drag_distance = 0.0;
                }
                (MouseButton::Left, ElementState::Released) => {
                    self.left_mouse_down = false;
                }
                (MouseButton::Right, ElementState::Pressed) => {
                    self.right_mouse_down = true;
                    self.drag_distance = 0.0;
                }
                (MouseButton::Right, ElementState::Released) => {
                    self.right_mouse_down = false;
                }
                _ => {}
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_down = modifiers.state().shift_key();
            }
            _ => {}
        }

        let egui_consumed = if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            egui.handle_event(window, &event)
        } else {
            false
        };
        let egui_wants_pointer = self.egui.as_ref().is_some_and(EguiIntegration::wants_pointer);

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.0;
                let delta_y = position.y - self.mouse_pos.1;
                self.mouse_pos = (position.x, position.y);

                if self.left_mouse_down || self.right_mouse_down {
                    self.drag_distance += delta_x.abs() + delta_y.abs();
                }

                let [x, y, ..] = self.viewport;
                self.viewer
                    .on_pointer_move(position.x as f32 - x, position.y as f32 - y);

                let delta = Vec2::new(delta_x as f32, delta_y as f32);
                let is_rotate = self.left_mouse_down && !self.shift_down && !egui_wants_pointer;
                let is_left_pan = self.left_mouse_down && self.shift_down && !egui_wants_pointer;
                if is_rotate {
                    self.viewer.controls_mut().rotate(delta);
                } else if is_left_pan || self.right_mouse_down {
                    self.viewer.controls_mut().pan(delta);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                if egui_consumed || egui_wants_pointer || !self.mouse_in_viewport() {
                    return;
                }
                if self.drag_distance < DRAG_THRESHOLD {
                    self.viewer.on_pointer_up();
                } else {
                    log::trace!("drag of {:.1} px, not a click", self.drag_distance);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if egui_consumed || !self.mouse_in_viewport() {
                    return;
                }
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.viewer.controls_mut().zoom(lines);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_consumed {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                match (event.state, code) {
                    (ElementState::Pressed, KeyCode::Escape) => {
                        self.close_requested = true;
                    }
                    (ElementState::Released, KeyCode::ArrowUp) => {
                        self.viewer.on_key_up(NavKey::Up);
                    }
                    (ElementState::Released, KeyCode::ArrowDown) => {
                        self.viewer.on_key_up(NavKey::Down);
                    }
                    (ElementState::Released, KeyCode::ArrowLeft) => {
                        self.viewer.on_key_up(NavKey::Left);
                    }
                    (ElementState::Released, KeyCode::ArrowRight) => {
                        self.viewer.on_key_up(NavKey::Right);
                    }
                    _ => {}
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }
}
