//! Configuration options for the viewer.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable appearance and interaction settings.
///
/// Every field has a default, so an options file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Background color.
    pub background_color: Vec3,

    /// Radius of the LED spheres.
    pub led_radius: f32,
    /// LED color when neither on nor hovered.
    pub led_color: Vec3,
    /// LED color while hovered.
    pub led_hover_color: Vec3,
    /// LED color while on.
    pub led_on_color: Vec3,
    /// Point light intensity of the lit LED.
    pub led_light_intensity: f32,
    /// Distance at which the lit LED's light fades out.
    pub led_light_range: f32,

    /// Length factor applied to each direction observation.
    pub ray_length: f32,
    /// Color of the direction rays.
    pub ray_color: Vec3,

    /// Radius of the reference sphere markers.
    pub sphere_radius: f32,
    /// Color of the reference sphere markers.
    pub sphere_color: Vec3,

    /// Color of the reference plane.
    pub plane_color: Vec3,
    /// Opacity of the reference plane.
    pub plane_opacity: f32,

    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Intensity of the depth light used while no LED is on.
    pub depth_light_intensity: f32,

    /// Distance from the camera representation's apex to its frame.
    pub camera_focal_length: f32,
    /// Vertical field of view of the camera representation, in degrees.
    pub camera_fov_degrees: f32,
    /// Aspect ratio of the camera representation's frame.
    pub camera_aspect_ratio: f32,
    /// Face opacity of the camera representation.
    pub camera_face_opacity: f32,
    /// Face opacity of the camera representation while hovered.
    pub camera_hover_face_opacity: f32,
    /// Wireframe color of the camera representation.
    pub camera_wire_color: Vec3,
    /// Wireframe color of the camera representation while hovered.
    pub camera_hover_wire_color: Vec3,
    /// Hits on the camera representation closer than this are ignored.
    pub camera_hover_min_distance: f32,

    /// Progress added to the camera animation every frame.
    pub animation_step: f32,

    /// Length of the axes helper.
    pub axes_length: f32,

    /// Initial state of the "show rays" checkbox.
    pub show_lines: bool,
    /// Initial state of the "show plane" checkbox.
    pub show_plane: bool,
}

impl ViewerOptions {
    /// Loads options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            background_color: Vec3::new(0.08, 0.08, 0.1),
            led_radius: 0.5,
            led_color: Vec3::new(0.3, 0.3, 0.3),
            led_hover_color: Vec3::new(0.55, 0.5, 0.15),
            led_on_color: Vec3::new(1.0, 0.9, 0.2),
            led_light_intensity: 1.5,
            led_light_range: 200.0,
            ray_length: 100.0,
            ray_color: Vec3::new(1.0, 0.6, 0.1),
            sphere_radius: 1.0,
            sphere_color: Vec3::new(0.85, 0.85, 0.85),
            plane_color: Vec3::new(0.3, 0.5, 0.9),
            plane_opacity: 0.25,
            ambient_intensity: 0.35,
            depth_light_intensity: 0.6,
            camera_focal_length: 1.0,
            camera_fov_degrees: 50.0,
            camera_aspect_ratio: 1.5,
            camera_face_opacity: 0.15,
            camera_hover_face_opacity: 0.45,
            camera_wire_color: Vec3::new(0.8, 0.8, 0.8),
            camera_hover_wire_color: Vec3::new(1.0, 0.9, 0.2),
            camera_hover_min_distance: 2.0,
            animation_step: 0.02,
            axes_length: 5.0,
            show_lines: true,
            show_plane: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: ViewerOptions =
            serde_json::from_str(r#"{ "ray_length": 50.0, "show_plane": false }"#).unwrap();
        assert!((options.ray_length - 50.0).abs() < f32::EPSILON);
        assert!(!options.show_plane);
        assert_eq!(options.led_on_color, ViewerOptions::default().led_on_color);
    }

    #[test]
    fn test_defaults_are_consistent() {
        let options = ViewerOptions::default();
        assert!(options.camera_hover_min_distance > options.camera_focal_length);
        assert!(options.animation_step > 0.0 && options.animation_step < 1.0);
        assert_ne!(options.led_on_color, options.led_hover_color);
        assert_ne!(options.led_hover_color, options.led_color);
    }
}
