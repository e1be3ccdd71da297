//! The viewer: scene construction, selection and per-frame logic.
//!
//! [`Viewer`] holds every piece of state that reacts to input. It does not touch
//! the GPU, so the whole interaction model can be driven headless; the window
//! layer in [`crate::app`] only forwards events and draws [`Viewer::scene`].

use std::sync::Arc;

use glam::{Vec2, Vec3};
use ledcal_core::{
    coords, Animation, Calibration, CalibrationResult, CameraPose, CameraRepresentation,
    LedCollection, LineSet, Material, MeshGeometry, NodeContent, NodeId, PickHit, PickLayer,
    PickRole, Ray, Result, Scene,
};
use ledcal_render::{Camera, OrbitControls};
use ledcal_ui::{
    ids, CheckboxHandle, ContainerHandle, HostPage, ImageHandle, PageEvent, SectionHandle,
    TextHandle,
};

use crate::config::ViewerConfig;
use crate::source::{spawn_fetch, ArtifactSource, PendingFetch};

/// Label shown while no LED is on.
pub const NO_LED_SELECTED: &str = "No LED selected";

/// Where the viewer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// Waiting for the artifact, or the artifact could not be read.
    Loading,
    /// The calibration run failed.
    Failed,
    /// The calibration run was skipped.
    Skipped,
    /// The scene is built and interactive.
    Ready,
}

/// Arrow keys used for LED navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
}

/// Page elements the viewer drives, resolved once at start-up.
#[derive(Debug, Clone, Copy)]
struct PageHandles {
    container: ContainerHandle,
    visualizer: SectionHandle,
    failed: SectionHandle,
    skipped: SectionHandle,
    show_lines: CheckboxHandle,
    show_plane: CheckboxHandle,
    label: TextHandle,
    photo: ImageHandle,
}

impl PageHandles {
    fn resolve(page: &HostPage) -> Result<Self> {
        Ok(Self {
            container: page.resolve_container(ids::CONTAINER)?,
            visualizer: page.resolve_section(ids::VISUALIZER)?,
            failed: page.resolve_section(ids::FAILED)?,
            skipped: page.resolve_section(ids::SKIPPED)?,
            show_lines: page.resolve_checkbox(ids::SHOW_LINES)?,
            show_plane: page.resolve_checkbox(ids::SHOW_PLANE)?,
            label: page.resolve_text(ids::LED_LABEL)?,
            photo: page.resolve_image(ids::LED_PHOTO)?,
        })
    }
}

/// Scene content that only exists once a calibration is loaded.
struct LoadedScene {
    leds: LedCollection,
    camera_rep: CameraRepresentation,
    plane: NodeId,
    return_pose: CameraPose,
}

/// Interactive calibration viewer.
pub struct Viewer {
    config: ViewerConfig,
    source: Arc<dyn ArtifactSource>,
    page: HostPage,
    handles: PageHandles,
    state: ViewerState,
    generation: u64,
    pending: Option<PendingFetch>,
    scene: Scene,
    scene_revision: u64,
    picking: PickLayer,
    loaded: Option<LoadedScene>,
    camera: Camera,
    controls: OrbitControls,
    animation: Option<Animation>,
    pointer: Vec2,
}

impl Viewer {
    /// Creates a viewer bound to `page`.
    ///
    /// Fails if any required element is missing or has the wrong kind. Nothing is
    /// shown in that case.
    pub fn new(
        config: ViewerConfig,
        page: HostPage,
        source: Arc<dyn ArtifactSource>,
    ) -> Result<Self> {
        let handles = PageHandles::resolve(&page)?;
        let mut camera = Camera::default();
        let (width, height) = page.container_size(handles.container);
        if width > 0.0 && height > 0.0 {
            camera.set_aspect_ratio(width / height);
        }

        log::info!(
            "viewer created for calibration '{}' in {}",
            config.calibration_id,
            config.data_dir().display()
        );

        Ok(Self {
            config,
            source,
            page,
            handles,
            state: ViewerState::Loading,
            generation: 0,
            pending: None,
            scene: Scene::new(),
            scene_revision: 0,
            picking: PickLayer::new(),
            loaded: None,
            camera,
            controls: OrbitControls::new(),
            animation: None,
            pointer: Vec2::ZERO,
        })
    }

    /// Starts fetching the configured calibration. Answers to earlier fetches are
    /// ignored from now on.
    pub fn begin_fetch(&mut self) {
        self.generation += 1;
        self.pending = Some(spawn_fetch(
            Arc::clone(&self.source),
            self.config.calibration_id.clone(),
            self.generation,
        ));
    }

    /// Applies the fetch result if it has arrived. Returns true if one was consumed.
    pub fn poll_fetch(&mut self) -> bool {
        let Some(outcome) = self.pending.as_ref().and_then(PendingFetch::try_take) else {
            return false;
        };
        self.pending = None;
        self.accept_outcome(outcome.generation, outcome.result);
        true
    }

    /// Blocks until the pending fetch answers, then applies it.
    pub fn wait_for_fetch(&mut self) {
        if let Some(pending) = self.pending.take() {
            let outcome = pending.wait();
            self.accept_outcome(outcome.generation, outcome.result);
        }
    }

    fn accept_outcome(&mut self, generation: u64, result: Result<CalibrationResult>) {
        if generation != self.generation {
            log::debug!(
                "dropping fetch result of generation {generation}, current is {}",
                self.generation
            );
            return;
        }
        match result {
            Ok(result) => self.apply_result(result),
            Err(err) => log::error!(
                "failed to load calibration '{}': {err}",
                self.config.calibration_id
            ),
        }
    }

    /// Reacts to a calibration outcome.
    ///
    /// Exactly one of the failed, skipped and visualizer sections is shown afterwards,
    /// whatever an earlier fetch displayed.
    pub fn apply_result(&mut self, result: CalibrationResult) {
        match result {
            CalibrationResult::Failure => {
                log::info!("calibration '{}' failed", self.config.calibration_id);
                self.clear_scene();
                self.show_outcome(ViewerState::Failed);
            }
            CalibrationResult::Skipped => {
                log::info!("calibration '{}' was skipped", self.config.calibration_id);
                self.clear_scene();
                self.show_outcome(ViewerState::Skipped);
            }
            CalibrationResult::Calibration(calibration) => {
                self.build_scene(&calibration);
                self.show_outcome(ViewerState::Ready);
                self.refresh_photo();
                log::info!(
                    "calibration '{}' loaded: {} LEDs, {} spheres",
                    self.config.calibration_id,
                    calibration.leds.len(),
                    calibration.spheres.len()
                );
            }
        }
    }

    fn show_outcome(&mut self, state: ViewerState) {
        self.state = state;
        self.page
            .set_visible(self.handles.failed, state == ViewerState::Failed);
        self.page
            .set_visible(self.handles.skipped, state == ViewerState::Skipped);
        self.page
            .set_visible(self.handles.visualizer, state == ViewerState::Ready);
    }

    /// Drops a previously loaded calibration and everything that refers to it.
    fn clear_scene(&mut self) {
        if self.loaded.is_none() {
            return;
        }
        self.loaded = None;
        self.animation = None;
        self.picking = PickLayer::new();
        self.scene = Scene::new();
        self.scene_revision += 1;
        self.page.set_text(self.handles.label, NO_LED_SELECTED);
        self.page.set_image(self.handles.photo, None);
    }

    fn build_scene(&mut self, calibration: &Calibration) {
        let options = &self.config.options;
        let mut scene = Scene::new();
        scene.ambient = options.ambient_intensity;
        let root = scene.root();
        let mut picking = PickLayer::new();

        let camera_rep = CameraRepresentation::new(&mut scene, root, options);
        camera_rep.register_picking(&mut picking);

        let mut leds = LedCollection::new(&mut scene, root, calibration, options);
        leds.register_picking(&mut picking);
        leds.set_show_lines(&mut scene, self.page.is_checked(self.handles.show_lines));

        let spheres: Vec<Vec3> = calibration.spheres.iter().copied().map(coords::to_render).collect();
        let sphere_group = scene.add_group(root, "spheres");
        for (i, center) in spheres.iter().enumerate() {
            scene.add(
                sphere_group,
                format!("sphere {i}"),
                *center,
                NodeContent::Mesh {
                    geometry: MeshGeometry::uv_sphere(options.sphere_radius, 24, 16),
                    material: Material::lit(options.sphere_color),
                },
            );
        }

        let centroid = coords::to_render(calibration.sphere_centroid());
        let plane = coords::plane_to_render(&calibration.plane);
        let plane_center = plane.project(centroid);
        let spread = spheres
            .iter()
            .map(|s| s.distance(centroid))
            .fold(0.0_f32, f32::max);
        let plane_node = scene.add(
            root,
            "reference plane",
            plane_center,
            NodeContent::Mesh {
                geometry: MeshGeometry::square(Vec3::ZERO, plane.normal, (spread * 1.5).max(1.0)),
                material: Material::lit(options.plane_color).with_opacity(options.plane_opacity),
            },
        );
        scene.set_visible(plane_node, self.page.is_checked(self.handles.show_plane));

        add_axes(&mut scene, root, options.axes_length);

        let (min, max) = calibration
            .leds
            .iter()
            .map(|led| coords::to_render(led.position))
            .chain(spheres.iter().copied())
            .fold((Vec3::ZERO, Vec3::ZERO), |(min, max), p| (min.min(p), max.max(p)));
        self.camera.look_at_box(min, max);
        self.controls.sync();
        self.animation = None;

        self.scene = scene;
        self.scene_revision += 1;
        self.picking = picking;
        self.loaded = Some(LoadedScene {
            leds,
            camera_rep,
            plane: plane_node,
            return_pose: CameraPose::new(Vec3::ZERO, centroid),
        });
    }

    /// Runs one frame of logic: fetch polling, controls, animation and hover.
    pub fn frame(&mut self) {
        if self.pending.is_some() {
            self.poll_fetch();
        }
        if self.state != ViewerState::Ready {
            return;
        }

        self.controls.update(&mut self.camera);

        if let Some(animation) = &mut self.animation {
            let pose = animation.update(self.config.options.animation_step);
            if animation.is_finished() {
                let end = animation.end();
                self.animation = None;
                self.camera.set_pose(end);
            } else {
                self.camera.set_pose(pose);
            }
            self.controls.sync();
        }

        self.update_hover();
    }

    fn cast_pointer(&self) -> Option<PickHit> {
        let ray = Ray::from_eye(
            self.camera.position,
            self.pointer,
            self.camera.inverse_view_projection_matrix(),
        )?;
        self.picking.cast(&ray)
    }

    fn update_hover(&mut self) {
        let hit = self.cast_pointer();
        let Some(loaded) = &mut self.loaded else {
            return;
        };

        let camera_hovered = hit.is_some_and(|hit| {
            hit.role == PickRole::Camera && loaded.camera_rep.accepts_hover_at(hit.distance)
        });
        if camera_hovered {
            loaded.camera_rep.hover(&mut self.scene);
        } else {
            loaded.camera_rep.un_hover(&mut self.scene);
        }

        loaded.leds.un_hover_all(&mut self.scene);
        if let Some(PickHit {
            role: PickRole::Led(index),
            ..
        }) = hit
        {
            loaded.leds.hover(&mut self.scene, index);
        }
    }

    /// Records the pointer position in container pixels, origin top-left.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let (width, height) = self.page.container_size(self.handles.container);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.pointer = Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0);
    }

    /// Handles a click: toggles the LED under the pointer or flies back to the camera.
    pub fn on_pointer_up(&mut self) {
        if self.state != ViewerState::Ready {
            return;
        }
        let hit = self.cast_pointer();
        let Some(loaded) = &mut self.loaded else {
            return;
        };

        match hit {
            Some(PickHit {
                role: PickRole::Led(index),
                ..
            }) => {
                log::debug!("clicked LED {index}");
                loaded.leds.toggle(&mut self.scene, index);
                self.refresh_photo();
            }
            Some(PickHit {
                role: PickRole::Camera,
                distance,
                ..
            }) if loaded.camera_rep.accepts_hover_at(distance) => {
                log::debug!("clicked camera representation at distance {distance:.2}");
                self.animation = Some(Animation::new(self.camera.pose(), loaded.return_pose));
            }
            _ => log::debug!("click hit nothing"),
        }
    }

    /// Arrow key released: Down/Right select the next LED, Up/Left the previous one.
    pub fn on_key_up(&mut self, key: NavKey) {
        if self.state != ViewerState::Ready {
            return;
        }
        let Some(loaded) = &mut self.loaded else {
            return;
        };
        let selected = match key {
            NavKey::Down | NavKey::Right => loaded.leds.next(&mut self.scene),
            NavKey::Up | NavKey::Left => loaded.leds.previous(&mut self.scene),
        };
        log::debug!("keyboard selected LED {selected:?}");
        self.refresh_photo();
    }

    /// Applies a change made on the page.
    pub fn handle_page_event(&mut self, event: PageEvent) {
        let PageEvent::CheckboxChanged { checkbox, checked } = event;
        if checkbox == self.handles.show_lines {
            self.set_show_lines(checked);
        } else if checkbox == self.handles.show_plane {
            self.set_show_plane(checked);
        }
    }

    /// Shows or hides the rays of the lit LED, and of LEDs lit later.
    pub fn set_show_lines(&mut self, show: bool) {
        self.page.set_checked(self.handles.show_lines, show);
        if let Some(loaded) = &mut self.loaded {
            loaded.leds.set_show_lines(&mut self.scene, show);
        }
    }

    /// Shows or hides the reference plane.
    pub fn set_show_plane(&mut self, show: bool) {
        self.page.set_checked(self.handles.show_plane, show);
        if let Some(loaded) = &self.loaded {
            self.scene.set_visible(loaded.plane, show);
        }
    }

    /// The container was resized to `width` x `height` pixels.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.page
            .set_container_size(self.handles.container, width, height);
        if width > 0.0 && height > 0.0 {
            self.camera.set_aspect_ratio(width / height);
        }
    }

    fn refresh_photo(&mut self) {
        let Some(loaded) = &self.loaded else {
            return;
        };
        match loaded.leds.current_led() {
            Some(led) => {
                let label = format!(
                    "{} ({}/{})",
                    led.display_name(),
                    led.index() + 1,
                    loaded.leds.len()
                );
                let path = self
                    .source
                    .photo_path(&self.config.calibration_id, led.name());
                self.page.set_text(self.handles.label, label);
                self.page.set_image(self.handles.photo, Some(path));
            }
            None => {
                self.page.set_text(self.handles.label, NO_LED_SELECTED);
                self.page.set_image(self.handles.photo, None);
            }
        }
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> ViewerState {
        self.state
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Bumped every time the scene is rebuilt.
    #[must_use]
    pub fn scene_revision(&self) -> u64 {
        self.scene_revision
    }

    /// The host page.
    #[must_use]
    pub fn page(&self) -> &HostPage {
        &self.page
    }

    /// Mutable host page, for the panel builder.
    pub fn page_mut(&mut self) -> &mut HostPage {
        &mut self.page
    }

    /// The viewer camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable viewer camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Orbit controls fed by pointer gestures.
    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// The LED collection, once loaded.
    #[must_use]
    pub fn leds(&self) -> Option<&LedCollection> {
        self.loaded.as_ref().map(|loaded| &loaded.leds)
    }

    /// The camera representation, once loaded.
    #[must_use]
    pub fn camera_representation(&self) -> Option<&CameraRepresentation> {
        self.loaded.as_ref().map(|loaded| &loaded.camera_rep)
    }

    /// The reference plane node, once loaded.
    #[must_use]
    pub fn plane_node(&self) -> Option<NodeId> {
        self.loaded.as_ref().map(|loaded| loaded.plane)
    }

    /// Pose the return animation flies to, once loaded.
    #[must_use]
    pub fn return_pose(&self) -> Option<CameraPose> {
        self.loaded.as_ref().map(|loaded| loaded.return_pose)
    }

    /// The running camera animation.
    #[must_use]
    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    /// Pointer position in normalized device coordinates.
    #[must_use]
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer
    }

    /// Moves the pointer to the screen position of a world-space point.
    pub fn point_at(&mut self, world: Vec3) {
        let clip = self.camera.view_projection_matrix() * world.extend(1.0);
        if clip.w.abs() > f32::EPSILON {
            self.pointer = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        }
    }

    /// Label text of the host page.
    #[must_use]
    pub fn label(&self) -> &str {
        self.page.text_of(self.handles.label)
    }

    /// Photograph source of the host page.
    #[must_use]
    pub fn photo(&self) -> Option<&std::path::Path> {
        self.page.image_source(self.handles.photo)
    }

    /// Whether the section with `id` is shown.
    #[must_use]
    pub fn is_section_visible(&self, id: &str) -> bool {
        self.page
            .resolve_section(id)
            .is_ok_and(|section| self.page.is_visible(section))
    }
}

/// Red, green and blue segments along +X, +Y and +Z.
fn add_axes(scene: &mut Scene, parent: NodeId, length: f32) {
    let group = scene.add_group(parent, "axes");
    for (name, axis) in [("x axis", Vec3::X), ("y axis", Vec3::Y), ("z axis", Vec3::Z)] {
        scene.add(
            group,
            name,
            Vec3::ZERO,
            NodeContent::Lines {
                lines: LineSet::new(vec![[Vec3::ZERO, axis * length]]),
                material: Material::unlit(axis),
            },
        );
    }
}
