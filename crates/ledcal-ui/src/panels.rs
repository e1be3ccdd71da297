//! Draws the host page.

use egui::{Context, RichText, SidePanel, Ui};

use crate::page::{ElementView, HostPage, PageEvent};
use crate::photo::{Photo, PhotoCache};

/// Width of the photograph in the panel, in points.
const PHOTO_WIDTH: f32 = 300.0;

/// What the panel reports back each frame.
#[derive(Debug, Clone)]
pub struct PanelOutput {
    /// Checkbox changes made this frame.
    pub events: Vec<PageEvent>,
    /// Screen area left for the 3D view, in points.
    pub viewport: egui::Rect,
}

/// Builds the right side panel from the page elements, in page order.
///
/// Checkbox changes are written back into the page and reported as events.
pub fn build_page_panel(ctx: &Context, page: &mut HostPage, photos: &mut PhotoCache) -> PanelOutput {
    let mut events = Vec::new();

    SidePanel::right("ledcal_page_panel")
        .default_width(PHOTO_WIDTH + 20.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("LED calibration");
            ui.separator();
            build_elements(ui, page, photos, &mut events);
        });

    for event in &events {
        let PageEvent::CheckboxChanged { checkbox, checked } = *event;
        page.set_checked(checkbox, checked);
    }

    PanelOutput {
        events,
        viewport: ctx.available_rect(),
    }
}

fn build_elements(
    ui: &mut Ui,
    page: &HostPage,
    photos: &mut PhotoCache,
    events: &mut Vec<PageEvent>,
) {
    for (index, element) in page.view() {
        if !page.element_shown(index) {
            continue;
        }
        match element {
            ElementView::Container => {}
            ElementView::Section { message } => {
                if !message.is_empty() {
                    ui.label(RichText::new(message).strong());
                }
            }
            ElementView::Checkbox {
                handle,
                label,
                checked,
            } => {
                let mut value = checked;
                if ui.checkbox(&mut value, label).changed() {
                    events.push(PageEvent::CheckboxChanged {
                        checkbox: handle,
                        checked: value,
                    });
                }
            }
            ElementView::Text { text } => {
                ui.add_space(4.0);
                ui.label(text);
            }
            ElementView::Image { source } => {
                let Some(path) = source else {
                    photos.clear();
                    continue;
                };
                match photos.texture(ui.ctx(), path) {
                    Photo::Ready(texture) => {
                        let size = texture.size_vec2();
                        let scale = (PHOTO_WIDTH / size.x).min(1.0);
                        ui.add(egui::Image::new(egui::load::SizedTexture::new(
                            texture.id(),
                            size * scale,
                        )));
                    }
                    Photo::Loading => {
                        ui.weak("Loading photograph");
                    }
                    Photo::Unavailable => {
                        ui.weak(format!("Photograph unavailable: {}", path.display()));
                    }
                }
            }
        }
    }
}
