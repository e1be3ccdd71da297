//! The host page: named UI elements the viewer drives.
//!
//! Elements are looked up by id once, when the viewer starts. A missing id or an
//! element of the wrong kind is reported as an error; afterwards the viewer only
//! holds typed handles and never looks elements up again.

use std::path::{Path, PathBuf};

use ledcal_core::{LedcalError, Result, ViewerOptions};

/// Ids of the elements of [`HostPage::standard`].
pub mod ids {
    /// Area the 3D view is drawn into.
    pub const CONTAINER: &str = "container";
    /// Section shown once the scene is built.
    pub const VISUALIZER: &str = "visualizer";
    /// Section shown when the calibration failed.
    pub const FAILED: &str = "calibration-failed";
    /// Section shown when the calibration was skipped.
    pub const SKIPPED: &str = "calibration-skipped";
    /// Checkbox toggling the direction rays.
    pub const SHOW_LINES: &str = "show-lines";
    /// Checkbox toggling the reference plane.
    pub const SHOW_PLANE: &str = "show-plane";
    /// Label naming the selected LED.
    pub const LED_LABEL: &str = "led-label";
    /// Photograph of the selected LED.
    pub const LED_PHOTO: &str = "led-photo";
}

/// Kind of a page element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Viewport area.
    Container,
    /// Block that can be shown or hidden.
    Section,
    /// Boolean input.
    Checkbox,
    /// Text output.
    Text,
    /// Image output.
    Image,
}

impl ElementKind {
    /// Lowercase name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Section => "section",
            Self::Checkbox => "checkbox",
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ElementState {
    Container { width: f32, height: f32 },
    Section { visible: bool, message: String },
    Checkbox { label: String, checked: bool },
    Text { text: String },
    Image { source: Option<PathBuf> },
}

impl ElementState {
    fn kind(&self) -> ElementKind {
        match self {
            Self::Container { .. } => ElementKind::Container,
            Self::Section { .. } => ElementKind::Section,
            Self::Checkbox { .. } => ElementKind::Checkbox,
            Self::Text { .. } => ElementKind::Text,
            Self::Image { .. } => ElementKind::Image,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    id: String,
    section: Option<usize>,
    state: ElementState,
}

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(usize);
    };
}

handle!(
    /// Resolved viewport container.
    ContainerHandle
);
handle!(
    /// Resolved section.
    SectionHandle
);
handle!(
    /// Resolved checkbox.
    CheckboxHandle
);
handle!(
    /// Resolved text element.
    TextHandle
);
handle!(
    /// Resolved image element.
    ImageHandle
);

/// User input reported by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A checkbox changed value.
    CheckboxChanged {
        /// The checkbox.
        checkbox: CheckboxHandle,
        /// New value.
        checked: bool,
    },
}

/// Ordered registry of page elements.
#[derive(Debug, Clone, Default)]
pub struct HostPage {
    elements: Vec<Element>,
    current_section: Option<usize>,
}

impl HostPage {
    /// Creates an empty page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The page the viewer binary shows.
    ///
    /// Sections start hidden. Checkboxes start at the option values.
    #[must_use]
    pub fn standard(options: &ViewerOptions) -> Self {
        Self::new()
            .section(ids::FAILED, "Calibration failed.")
            .end_section()
            .section(ids::SKIPPED, "Calibration was skipped.")
            .end_section()
            .section(ids::VISUALIZER, "")
            .container(ids::CONTAINER)
            .checkbox(ids::SHOW_LINES, "Show rays", options.show_lines)
            .checkbox(ids::SHOW_PLANE, "Show plane", options.show_plane)
            .text(ids::LED_LABEL)
            .image(ids::LED_PHOTO)
            .end_section()
    }

    /// Opens a hidden section. Elements added until [`Self::end_section`] belong to it.
    #[must_use]
    pub fn section(mut self, id: &str, message: &str) -> Self {
        let index = self.push(
            id,
            ElementState::Section {
                visible: false,
                message: message.to_string(),
            },
        );
        self.current_section = Some(index);
        self
    }

    /// Closes the open section.
    #[must_use]
    pub fn end_section(mut self) -> Self {
        self.current_section = None;
        self
    }

    /// Adds the viewport container.
    #[must_use]
    pub fn container(mut self, id: &str) -> Self {
        self.push(
            id,
            ElementState::Container {
                width: 0.0,
                height: 0.0,
            },
        );
        self
    }

    /// Adds a checkbox.
    #[must_use]
    pub fn checkbox(mut self, id: &str, label: &str, checked: bool) -> Self {
        self.push(
            id,
            ElementState::Checkbox {
                label: label.to_string(),
                checked,
            },
        );
        self
    }

    /// Adds an empty text element.
    #[must_use]
    pub fn text(mut self, id: &str) -> Self {
        self.push(id, ElementState::Text { text: String::new() });
        self
    }

    /// Adds an image element without a source.
    #[must_use]
    pub fn image(mut self, id: &str) -> Self {
        self.push(id, ElementState::Image { source: None });
        self
    }

    fn push(&mut self, id: &str, state: ElementState) -> usize {
        self.elements.push(Element {
            id: id.to_string(),
            section: self.current_section,
            state,
        });
        self.elements.len() - 1
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn resolve(&self, id: &str, expected: ElementKind) -> Result<usize> {
        let index = self
            .elements
            .iter()
            .position(|element| element.id == id)
            .ok_or_else(|| LedcalError::MissingElement(id.to_string()))?;
        let actual = self.elements[index].state.kind();
        if actual != expected {
            return Err(LedcalError::WrongElementKind {
                id: id.to_string(),
                expected: expected.name(),
                actual: actual.name(),
            });
        }
        Ok(index)
    }

    /// Looks up a container.
    pub fn resolve_container(&self, id: &str) -> Result<ContainerHandle> {
        self.resolve(id, ElementKind::Container).map(ContainerHandle)
    }

    /// Looks up a section.
    pub fn resolve_section(&self, id: &str) -> Result<SectionHandle> {
        self.resolve(id, ElementKind::Section).map(SectionHandle)
    }

    /// Looks up a checkbox.
    pub fn resolve_checkbox(&self, id: &str) -> Result<CheckboxHandle> {
        self.resolve(id, ElementKind::Checkbox).map(CheckboxHandle)
    }

    /// Looks up a text element.
    pub fn resolve_text(&self, id: &str) -> Result<TextHandle> {
        self.resolve(id, ElementKind::Text).map(TextHandle)
    }

    /// Looks up an image element.
    pub fn resolve_image(&self, id: &str) -> Result<ImageHandle> {
        self.resolve(id, ElementKind::Image).map(ImageHandle)
    }

    /// Shows or hides a section and everything in it.
    pub fn set_visible(&mut self, section: SectionHandle, visible: bool) {
        if let ElementState::Section { visible: v, .. } = &mut self.elements[section.0].state {
            *v = visible;
        }
    }

    /// Whether a section is shown.
    #[must_use]
    pub fn is_visible(&self, section: SectionHandle) -> bool {
        self.section_visible(section.0)
    }

    /// Sets a checkbox value.
    pub fn set_checked(&mut self, checkbox: CheckboxHandle, checked: bool) {
        if let ElementState::Checkbox { checked: c, .. } = &mut self.elements[checkbox.0].state {
            *c = checked;
        }
    }

    /// Current checkbox value.
    #[must_use]
    pub fn is_checked(&self, checkbox: CheckboxHandle) -> bool {
        matches!(
            self.elements[checkbox.0].state,
            ElementState::Checkbox { checked: true, .. }
        )
    }

    /// Replaces the content of a text element.
    pub fn set_text(&mut self, text: TextHandle, content: impl Into<String>) {
        if let ElementState::Text { text: t } = &mut self.elements[text.0].state {
            *t = content.into();
        }
    }

    /// Content of a text element.
    #[must_use]
    pub fn text_of(&self, text: TextHandle) -> &str {
        match &self.elements[text.0].state {
            ElementState::Text { text } => text,
            _ => "",
        }
    }

    /// Points an image at a file, or hides it with `None`.
    pub fn set_image(&mut self, image: ImageHandle, source: Option<PathBuf>) {
        if let ElementState::Image { source: s } = &mut self.elements[image.0].state {
            *s = source;
        }
    }

    /// Source of an image element; `None` while hidden.
    #[must_use]
    pub fn image_source(&self, image: ImageHandle) -> Option<&Path> {
        match &self.elements[image.0].state {
            ElementState::Image { source } => source.as_deref(),
            _ => None,
        }
    }

    /// Records the container size in pixels.
    pub fn set_container_size(&mut self, container: ContainerHandle, width: f32, height: f32) {
        if let ElementState::Container {
            width: w,
            height: h,
        } = &mut self.elements[container.0].state
        {
            *w = width;
            *h = height;
        }
    }

    /// Container size in pixels.
    #[must_use]
    pub fn container_size(&self, container: ContainerHandle) -> (f32, f32) {
        match self.elements[container.0].state {
            ElementState::Container { width, height } => (width, height),
            _ => (0.0, 0.0),
        }
    }

    /// Whether the element at `index` is shown, taking its section into account.
    pub(crate) fn element_shown(&self, index: usize) -> bool {
        let element = &self.elements[index];
        if let ElementState::Section { .. } = element.state {
            return self.section_visible(index);
        }
        element.section.map_or(true, |section| self.section_visible(section))
    }

    fn section_visible(&self, index: usize) -> bool {
        matches!(
            self.elements[index].state,
            ElementState::Section { visible: true, .. }
        )
    }

    /// Elements in page order, for drawing.
    pub(crate) fn view(&self) -> impl Iterator<Item = (usize, ElementView<'_>)> {
        self.elements.iter().enumerate().map(|(index, element)| {
            let view = match &element.state {
                ElementState::Container { .. } => ElementView::Container,
                ElementState::Section { message, .. } => ElementView::Section { message },
                ElementState::Checkbox { label, checked } => ElementView::Checkbox {
                    handle: CheckboxHandle(index),
                    label,
                    checked: *checked,
                },
                ElementState::Text { text } => ElementView::Text { text },
                ElementState::Image { source } => ElementView::Image {
                    source: source.as_deref(),
                },
            };
            (index, view)
        })
    }
}

/// Read-only view of one element, handed to the panel builder.
pub(crate) enum ElementView<'a> {
    Container,
    Section { message: &'a str },
    Checkbox {
        handle: CheckboxHandle,
        label: &'a str,
        checked: bool,
    },
    Text { text: &'a str },
    Image { source: Option<&'a Path> },
}
