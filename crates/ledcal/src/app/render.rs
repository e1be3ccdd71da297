use egui_wgpu::ScreenDescriptor;
use ledcal_render::RenderError;
use ledcal_ui::build_page_panel;

use super::App;

impl App {
    /// Renders a single frame.
    pub(super) fn render(&mut self) {
        let (Some(engine), Some(egui), Some(window)) =
            (&mut self.engine, &mut self.egui, &self.window)
        else {
            return;
        };

        let viewer = &mut self.viewer;
        let photos = &mut self.photos;
        let (egui_output, (panel, scale)) = egui.run(window, |ctx| {
            let panel = build_page_panel(ctx, viewer.page_mut(), photos);
            (panel, ctx.pixels_per_point())
        });
        for event in panel.events {
            self.viewer.handle_page_event(event);
        }

        let rect = panel.viewport;
        let viewport = [
            rect.min.x * scale,
            rect.min.y * scale,
            rect.width() * scale,
            rect.height() * scale,
        ];
        if viewport != self.viewport {
            self.viewport = viewport;
            self.viewer.on_resize(viewport[2], viewport[3]);
        }

        self.viewer.frame();
        if self.viewer.scene_revision() != self.uploaded_revision {
            engine.forget_nodes();
            self.uploaded_revision = self.viewer.scene_revision();
        }

        let frame = match engine.acquire_frame() {
            Ok(frame) => frame,
            Err(RenderError::SurfaceLost | RenderError::SurfaceOutdated) => {
                engine.reconfigure();
                return;
            }
            Err(err) => {
                log::error!("skipping frame: {err}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        engine.render_scene(
            &mut encoder,
            &view,
            self.viewer.scene(),
            self.viewer.camera(),
            Some(viewport),
        );

        let screen = ScreenDescriptor {
            size_in_pixels: [engine.width, engine.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        egui.paint(
            &engine.device,
            &engine.queue,
            &mut encoder,
            &view,
            &screen,
            egui_output,
        );

        engine.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
