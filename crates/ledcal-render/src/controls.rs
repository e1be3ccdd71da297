//! Damped orbit controls.
//!
//! Pointer gestures only queue motion. [`OrbitControls::update`] applies a share of
//! the queued motion to the camera every frame and decays the rest, which gives the
//! camera a short glide after the gesture ends.

use glam::Vec2;

use crate::camera::Camera;

/// Queued motion below this magnitude is dropped.
const REST_THRESHOLD: f32 = 1e-5;

/// Orbit, pan and zoom driven by pointer deltas.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Whether gestures are accepted.
    pub enabled: bool,
    /// Share of the queued motion applied per update, in `(0, 1]`.
    pub damping_factor: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// Pan distance per pixel, relative to the target distance.
    pub pan_speed: f32,
    /// Zoom distance per wheel line, relative to the target distance.
    pub zoom_speed: f32,
    pending_orbit: Vec2,
    pending_pan: Vec2,
    pending_zoom: f32,
}

impl OrbitControls {
    /// Creates controls with the default speeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            damping_factor: 0.25,
            rotate_speed: 0.01,
            pan_speed: 0.002,
            zoom_speed: 0.1,
            pending_orbit: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }

    /// Queues an orbit gesture of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        if self.enabled {
            self.pending_orbit += delta * self.rotate_speed;
        }
    }

    /// Queues a pan gesture of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2) {
        if self.enabled {
            self.pending_pan += delta;
        }
    }

    /// Queues a zoom of `lines` wheel lines; positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        if self.enabled {
            self.pending_zoom += lines;
        }
    }

    /// Returns true while queued motion remains.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.pending_orbit != Vec2::ZERO || self.pending_pan != Vec2::ZERO || self.pending_zoom != 0.0
    }

    /// Applies a damped share of the queued motion to `camera`.
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.is_moving() {
            return false;
        }
        let factor = self.damping_factor.clamp(f32::EPSILON, 1.0);
        let distance = camera.position.distance(camera.target);

        let orbit = self.pending_orbit * factor;
        camera.orbit(orbit.x, orbit.y);

        let pan = self.pending_pan * factor * distance * self.pan_speed;
        camera.pan(-pan.x, pan.y);

        let zoom = self.pending_zoom * factor;
        camera.zoom(zoom * distance * self.zoom_speed);

        self.pending_orbit -= orbit;
        self.pending_pan *= 1.0 - factor;
        self.pending_zoom -= zoom;
        self.settle();
        true
    }

    /// Drops queued motion so the controls continue from the camera's current pose.
    ///
    /// Called after something other than the controls moved the camera.
    pub fn sync(&mut self) {
        self.pending_orbit = Vec2::ZERO;
        self.pending_pan = Vec2::ZERO;
        self.pending_zoom = 0.0;
    }

    fn settle(&mut self) {
        if self.pending_orbit.length() < REST_THRESHOLD {
            self.pending_orbit = Vec2::ZERO;
        }
        if self.pending_pan.length() < REST_THRESHOLD {
            self.pending_pan = Vec2::ZERO;
        }
        if self.pending_zoom.abs() < REST_THRESHOLD {
            self.pending_zoom = 0.0;
        }
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn camera() -> Camera {
        let mut camera = Camera::new(1.0);
        camera.position = Vec3::new(0.0, 0.0, -10.0);
        camera.target = Vec3::ZERO;
        camera
    }

    #[test]
    fn test_idle_update_leaves_camera() {
        let mut controls = OrbitControls::new();
        let mut camera = camera();
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_rotation_glides_then_settles() {
        let mut controls = OrbitControls::new();
        let mut camera = camera();
        controls.rotate(Vec2::new(40.0, 0.0));

        assert!(controls.update(&mut camera));
        let first = camera.position;
        assert_ne!(first, Vec3::new(0.0, 0.0, -10.0));

        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_moving());
        assert!((camera.position.distance(camera.target) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_in_reduces_distance() {
        let mut controls = OrbitControls::new();
        controls.damping_factor = 1.0;
        let mut camera = camera();
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!(camera.position.distance(camera.target) < 10.0);
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_sync_drops_pending_motion() {
        let mut controls = OrbitControls::new();
        controls.rotate(Vec2::new(10.0, 5.0));
        controls.pan(Vec2::new(3.0, 3.0));
        controls.sync();
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_disabled_ignores_gestures() {
        let mut controls = OrbitControls::new();
        controls.enabled = false;
        controls.rotate(Vec2::ONE);
        controls.zoom(2.0);
        assert!(!controls.is_moving());
    }

    #[derive(Debug, Clone)]
    enum Gesture {
        Rotate(f32, f32),
        Pan(f32, f32),
        Zoom(f32),
    }

    fn gesture_strategy() -> impl Strategy<Value = Gesture> {
        prop_oneof![
            (-200.0f32..200.0, -200.0f32..200.0).prop_map(|(x, y)| Gesture::Rotate(x, y)),
            (-200.0f32..200.0, -200.0f32..200.0).prop_map(|(x, y)| Gesture::Pan(x, y)),
            (-5.0f32..5.0).prop_map(Gesture::Zoom),
        ]
    }

    proptest! {
        #[test]
        fn prop_gestures_glide_to_rest(
            gestures in prop::collection::vec(gesture_strategy(), 1..8),
            damping in 0.05f32..1.0,
        ) {
            let mut controls = OrbitControls::new();
            controls.damping_factor = damping;
            let mut camera = camera();
            for gesture in gestures {
                match gesture {
                    Gesture::Rotate(x, y) => controls.rotate(Vec2::new(x, y)),
                    Gesture::Pan(x, y) => controls.pan(Vec2::new(x, y)),
                    Gesture::Zoom(lines) => controls.zoom(lines),
                }
                controls.update(&mut camera);
            }

            for _ in 0..2000 {
                if !controls.update(&mut camera) {
                    break;
                }
                prop_assert!(camera.position.is_finite());
                prop_assert!(camera.target.is_finite());
                prop_assert!(camera.position.distance(camera.target) >= 0.1 - 1e-4);
            }
            prop_assert!(!controls.is_moving());
        }
    }
}
