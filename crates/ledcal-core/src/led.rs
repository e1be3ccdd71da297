//! LED visuals and the single-selection collection.

use glam::Vec3;

use crate::calibration::{Calibration, Led};
use crate::coords;
use crate::geometry::{LineSet, MeshGeometry};
use crate::options::ViewerOptions;
use crate::pick::{Collider, PickLayer, PickRole};
use crate::scene::{Material, NodeContent, NodeId, Scene};

/// Colors an LED can take.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LedPalette {
    base: Vec3,
    hover: Vec3,
    on: Vec3,
}

/// One pickable LED: a sphere, its direction rays and a point light.
///
/// The rays and the light are children of the sphere node and are only shown
/// while the LED is on.
#[derive(Debug, Clone)]
pub struct LedVisual {
    index: usize,
    name: String,
    display_name: String,
    position: Vec3,
    radius: f32,
    mesh: NodeId,
    lines: NodeId,
    light: NodeId,
    on: bool,
    hovered: bool,
    palette: LedPalette,
}

impl LedVisual {
    /// Builds the LED's nodes under `parent`.
    ///
    /// Each direction is paired with the sphere at the same index. Its ray starts at
    /// that sphere's center and runs `ray_length` along the direction, stored
    /// relative to the LED node.
    pub fn new(
        scene: &mut Scene,
        parent: NodeId,
        index: usize,
        led: &Led,
        spheres: &[Vec3],
        options: &ViewerOptions,
    ) -> Self {
        let palette = LedPalette {
            base: options.led_color,
            hover: options.led_hover_color,
            on: options.led_on_color,
        };
        let position = coords::to_render(led.position);

        let mesh = scene.add(
            parent,
            led.name.clone(),
            position,
            NodeContent::Mesh {
                geometry: MeshGeometry::uv_sphere(options.led_radius, 16, 12),
                material: Material::unlit(palette.base),
            },
        );

        // Each direction points from its paired sphere toward the LED.
        let segments = led
            .directions
            .iter()
            .zip(spheres)
            .map(|(direction, sphere)| {
                let start = coords::to_render(*sphere) - position;
                let end = start + coords::direction_to_render(*direction) * options.ray_length;
                [start, end]
            })
            .collect();
        let lines = scene.add(
            mesh,
            format!("{} rays", led.name),
            Vec3::ZERO,
            NodeContent::Lines {
                lines: LineSet::new(segments),
                material: Material::unlit(options.ray_color),
            },
        );
        scene.set_visible(lines, false);

        let light = scene.add(
            mesh,
            format!("{} light", led.name),
            Vec3::ZERO,
            NodeContent::PointLight {
                color: options.led_on_color,
                intensity: options.led_light_intensity,
                range: options.led_light_range,
            },
        );
        scene.set_visible(light, false);

        Self {
            index,
            name: led.name.clone(),
            display_name: led.display_name().to_string(),
            position,
            radius: options.led_radius,
            mesh,
            lines,
            light,
            on: false,
            hovered: false,
            palette,
        }
    }

    /// Position of this LED in the collection.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Photograph filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without extension.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Render-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The sphere node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.mesh
    }

    /// The direction ray node.
    #[must_use]
    pub fn lines_node(&self) -> NodeId {
        self.lines
    }

    /// The point light node.
    #[must_use]
    pub fn light_node(&self) -> NodeId {
        self.light
    }

    /// Whether the LED is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Whether the LED is hovered.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Hit shape in world space.
    #[must_use]
    pub fn collider(&self) -> Collider {
        Collider::Sphere {
            center: self.position,
            radius: self.radius,
        }
    }

    /// Color derived from the current state: on, then hovered, then base.
    #[must_use]
    pub fn color(&self) -> Vec3 {
        if self.on {
            self.palette.on
        } else if self.hovered {
            self.palette.hover
        } else {
            self.palette.base
        }
    }

    /// Marks the LED hovered. Does nothing while it is on.
    pub fn hover(&mut self, scene: &mut Scene) {
        if self.on {
            return;
        }
        self.hovered = true;
        self.refresh_color(scene);
    }

    /// Clears the hovered flag. Does nothing while it is on.
    pub fn un_hover(&mut self, scene: &mut Scene) {
        if self.on {
            return;
        }
        self.hovered = false;
        self.refresh_color(scene);
    }

    /// Switches the LED on, showing its light and, if `show_lines`, its rays.
    pub fn turn_on(&mut self, scene: &mut Scene, show_lines: bool) {
        self.on = true;
        scene.set_visible(self.light, true);
        scene.set_visible(self.lines, show_lines);
        self.refresh_color(scene);
    }

    /// Switches the LED off, hiding its light and rays.
    pub fn turn_off(&mut self, scene: &mut Scene) {
        self.on = false;
        scene.set_visible(self.light, false);
        scene.set_visible(self.lines, false);
        self.refresh_color(scene);
    }

    /// Flips the on flag and recolors. Light and ray visibility are left as they are.
    pub fn toggle(&mut self, scene: &mut Scene) {
        self.on = !self.on;
        self.refresh_color(scene);
    }

    /// Shows or hides the rays without touching the on state.
    pub fn set_lines_visible(&self, scene: &mut Scene, visible: bool) {
        scene.set_visible(self.lines, visible);
    }

    fn refresh_color(&self, scene: &mut Scene) {
        scene.set_color(self.mesh, self.color());
    }
}

/// Ordered LEDs with at most one of them on.
///
/// `current` is the index of the lit LED. When it is `None` every LED is off
/// and the depth light is enabled.
#[derive(Debug, Clone)]
pub struct LedCollection {
    group: NodeId,
    depth_light: NodeId,
    leds: Vec<LedVisual>,
    current: Option<usize>,
    show_lines: bool,
}

impl LedCollection {
    /// Builds one visual per LED of `calibration` under a new group node.
    pub fn new(
        scene: &mut Scene,
        parent: NodeId,
        calibration: &Calibration,
        options: &ViewerOptions,
    ) -> Self {
        let group = scene.add_group(parent, "leds");
        let depth_light = scene.add(
            group,
            "depth light",
            Vec3::ZERO,
            NodeContent::DirectionalLight {
                direction: Vec3::new(-0.3, -0.5, 1.0).normalize(),
                intensity: options.depth_light_intensity,
            },
        );

        let leds = calibration
            .leds
            .iter()
            .enumerate()
            .map(|(index, led)| {
                LedVisual::new(scene, group, index, led, &calibration.spheres, options)
            })
            .collect();

        Self {
            group,
            depth_light,
            leds,
            current: None,
            show_lines: options.show_lines,
        }
    }

    /// Registers every LED sphere as pickable.
    pub fn register_picking(&self, layer: &mut PickLayer) {
        for led in &self.leds {
            layer.insert(led.node(), PickRole::Led(led.index()), led.collider());
        }
    }

    /// The group node holding all LEDs.
    #[must_use]
    pub fn group(&self) -> NodeId {
        self.group
    }

    /// The depth light node.
    #[must_use]
    pub fn depth_light(&self) -> NodeId {
        self.depth_light
    }

    /// Whether the depth light is currently enabled.
    #[must_use]
    pub fn is_depth_light_enabled(&self, scene: &Scene) -> bool {
        scene.is_visible(self.depth_light)
    }

    /// Number of LEDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leds.len()
    }

    /// Returns true if there are no LEDs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }

    /// LED at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LedVisual> {
        self.leds.get(index)
    }

    /// All LEDs in order.
    pub fn iter(&self) -> impl Iterator<Item = &LedVisual> {
        self.leds.iter()
    }

    /// Index of the lit LED.
    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// The lit LED.
    #[must_use]
    pub fn current_led(&self) -> Option<&LedVisual> {
        self.current.and_then(|index| self.leds.get(index))
    }

    /// Current ray visibility preference.
    #[must_use]
    pub fn show_lines(&self) -> bool {
        self.show_lines
    }

    /// Switches the LED at `index` off if it is lit, otherwise makes it the only lit LED.
    pub fn toggle(&mut self, scene: &mut Scene, index: usize) {
        if index >= self.leds.len() {
            log::warn!("ignoring toggle of LED {index}, collection has {}", self.leds.len());
            return;
        }

        if self.current == Some(index) {
            self.current = None;
            self.leds[index].turn_off(scene);
            scene.set_visible(self.depth_light, true);
            return;
        }

        for (i, led) in self.leds.iter_mut().enumerate() {
            if i != index {
                led.turn_off(scene);
            }
        }
        self.activate(scene, index);
    }

    /// Lights the next LED, wrapping around. Starts at index 0 when none is lit.
    pub fn next(&mut self, scene: &mut Scene) -> Option<usize> {
        self.step(scene, |current, len| (current + 1) % len)
    }

    /// Lights the previous LED, wrapping around. Starts at index 0 when none is lit.
    pub fn previous(&mut self, scene: &mut Scene) -> Option<usize> {
        self.step(scene, |current, len| (current + len - 1) % len)
    }

    /// Stores the ray preference and applies it to the lit LED only.
    pub fn set_show_lines(&mut self, scene: &mut Scene, show: bool) {
        self.show_lines = show;
        if let Some(led) = self.current_led() {
            led.set_lines_visible(scene, show);
        }
    }

    /// Clears the hovered flag of every LED.
    pub fn un_hover_all(&mut self, scene: &mut Scene) {
        for led in &mut self.leds {
            led.un_hover(scene);
        }
    }

    /// Marks the LED at `index` hovered.
    pub fn hover(&mut self, scene: &mut Scene, index: usize) {
        if let Some(led) = self.leds.get_mut(index) {
            led.hover(scene);
        }
    }

    fn step(
        &mut self,
        scene: &mut Scene,
        advance: impl Fn(usize, usize) -> usize,
    ) -> Option<usize> {
        let len = self.leds.len();
        if len == 0 {
            return None;
        }

        let index = match self.current {
            None => 0,
            Some(current) => {
                self.leds[current].turn_off(scene);
                advance(current, len)
            }
        };
        self.activate(scene, index);
        Some(index)
    }

    fn activate(&mut self, scene: &mut Scene, index: usize) {
        self.leds[index].turn_on(scene, self.show_lines);
        self.current = Some(index);
        scene.set_visible(self.depth_light, false);
    }
}
