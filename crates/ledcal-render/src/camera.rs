//! Viewer camera.

use glam::{Mat4, Vec3};
use ledcal_core::CameraPose;

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            near: 0.1,
            far: 5000.0,
        }
    }

    /// Sets the aspect ratio. Degenerate sizes are ignored.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse of the view-projection matrix, used to unproject the pointer.
    #[must_use]
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Current position and target.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }

    /// Moves the camera to `pose`.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.target = pose.target;
    }

    /// Orbits the camera around the target, turntable style around `up`.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius < f32::EPSILON {
            return;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Pans the camera and its target together.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right = self.right();
        let up = right.cross(self.forward()).normalize_or_zero();
        let offset = right * delta_x + up * delta_y;
        self.position += offset;
        self.target += offset;
    }

    /// Moves the camera toward (positive `delta`) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.1);
        self.position = self.target - direction * new_distance;
    }

    /// Frames the given bounding box, looking along +Z like the physical camera.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length().max(1.0);

        self.target = center;
        self.position = center - Vec3::Z * size * 1.5;
        self.near = size * 0.001;
        self.far = size * 100.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
