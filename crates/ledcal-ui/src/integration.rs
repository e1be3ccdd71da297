//! egui on top of the viewer window.

use egui::{Context, FullOutput};
use egui_wgpu::{Renderer, ScreenDescriptor};
use winit::event::WindowEvent;
use winit::window::Window;

/// egui state for one window: input translation, the context and the wgpu painter.
pub struct EguiIntegration {
    context: Context,
    state: egui_winit::State,
    renderer: Renderer,
}

impl EguiIntegration {
    /// Creates the integration for `window`, painting into `output_format` targets.
    #[must_use]
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        context.set_visuals(egui::Visuals::dark());

        let state = egui_winit::State::new(
            context.clone(),
            context.viewport_id(),
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = Renderer::new(device, output_format, None, 1, false);

        Self {
            context,
            state,
            renderer,
        }
    }

    /// The egui context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Feeds a window event to egui. Returns true if egui consumed it.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Returns true while the pointer is over a panel or dragging a widget.
    #[must_use]
    pub fn wants_pointer(&self) -> bool {
        self.context.is_pointer_over_area() || self.context.is_using_pointer()
    }

    /// Runs one egui pass with `build_ui` and returns what it produced.
    ///
    /// Platform output (cursor icon, clipboard) is applied to `window` before returning.
    pub fn run<R>(
        &mut self,
        window: &Window,
        build_ui: impl FnOnce(&Context) -> R,
    ) -> (FullOutput, R) {
        let raw_input = self.state.take_egui_input(window);
        self.context.begin_pass(raw_input);
        let result = build_ui(&self.context);
        let output = self.context.end_pass();
        self.state
            .handle_platform_output(window, output.platform_output.clone());
        (output, result)
    }

    /// Paints `output` over whatever `view` already holds.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        screen: &ScreenDescriptor,
        output: FullOutput,
    ) {
        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let primitives = self
            .context
            .tessellate(output.shapes, output.pixels_per_point);
        self.renderer
            .update_buffers(device, queue, encoder, &primitives, screen);

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("page overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            // egui-wgpu needs a pass without the encoder lifetime.
            let mut pass = pass.forget_lifetime();
            self.renderer.render(&mut pass, &primitives, screen);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
