//! Calibration artifact data model.
//!
//! The calibration server writes one JSON document per run. It is either the
//! literal string `"failure"`, the literal string `"skipped"`, or an object with
//! `leds`, `spheres` and `plane` fields. All positions use the server's axis
//! convention; see [`crate::coords`] for the conversion to render space.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResult", into = "RawResult")]
pub enum CalibrationResult {
    /// The calibration run did not converge.
    Failure,
    /// The calibration was not attempted.
    Skipped,
    /// The calibration succeeded.
    Calibration(Calibration),
}

impl CalibrationResult {
    /// Parses an artifact from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the calibration if this is the success variant.
    #[must_use]
    pub fn calibration(&self) -> Option<&Calibration> {
        match self {
            Self::Calibration(calibration) => Some(calibration),
            Self::Failure | Self::Skipped => None,
        }
    }
}

/// Geometry produced by a successful calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// LEDs in capture order. The order drives cycling and photograph naming.
    pub leds: Vec<Led>,
    /// Centers of the reference spheres.
    pub spheres: Vec<Vec3>,
    /// Best-fit plane through the sphere centers.
    pub plane: Plane,
}

impl Calibration {
    /// Mean of the sphere centers, in server coordinates.
    ///
    /// Returns the origin when there are no spheres.
    #[must_use]
    pub fn sphere_centroid(&self) -> Vec3 {
        if self.spheres.is_empty() {
            return Vec3::ZERO;
        }
        self.spheres.iter().copied().sum::<Vec3>() / self.spheres.len() as f32
    }

    /// Finds the index of the LED with the given name.
    #[must_use]
    pub fn led_index(&self, name: &str) -> Option<usize> {
        self.leds.iter().position(|led| led.name == name)
    }
}

/// One LED as estimated by the calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Led {
    /// Photograph filename, unique within a calibration.
    pub name: String,
    /// Estimated position.
    pub position: Vec3,
    /// Estimated light direction seen from each sphere, indexed like `spheres`.
    pub directions: Vec<Vec3>,
}

impl Led {
    /// Photograph name without its extension (everything before the first `.`).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

/// A plane `normal · p = alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed offset along the normal.
    pub alpha: f32,
}

impl Plane {
    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Vec3 {
        let normal = self.normal.normalize_or_zero();
        point - normal * (normal.dot(point) - self.alpha)
    }
}

/// Wire representation: the two negative outcomes are bare strings.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawResult {
    Outcome(Outcome),
    Calibration(Calibration),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Failure,
    Skipped,
}

impl From<RawResult> for CalibrationResult {
    fn from(raw: RawResult) -> Self {
        match raw {
            RawResult::Outcome(Outcome::Failure) => Self::Failure,
            RawResult::Outcome(Outcome::Skipped) => Self::Skipped,
            RawResult::Calibration(calibration) => Self::Calibration(calibration),
        }
    }
}

impl From<CalibrationResult> for RawResult {
    fn from(result: CalibrationResult) -> Self {
        match result {
            CalibrationResult::Failure => Self::Outcome(Outcome::Failure),
            CalibrationResult::Skipped => Self::Outcome(Outcome::Skipped),
            CalibrationResult::Calibration(calibration) => Self::Calibration(calibration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "leds": [
            {
                "name": "led_0001.jpg",
                "position": [1.0, 2.0, 30.0],
                "directions": [[0.0, 0.0, 1.0], [0.1, 0.0, 0.99]]
            },
            {
                "name": "led_0002.jpg",
                "position": [-1.0, 2.5, 31.0],
                "directions": [[0.0, 0.1, 0.99], [0.0, 0.0, 1.0]]
            }
        ],
        "spheres": [[-2.0, 0.0, 20.0], [2.0, 0.0, 20.0]],
        "plane": { "normal": [0.0, 0.0, 1.0], "alpha": 20.0 }
    }"#;

    #[test]
    fn test_parse_failure() {
        let result = CalibrationResult::from_json_str("\"failure\"").unwrap();
        assert_eq!(result, CalibrationResult::Failure);
        assert!(result.calibration().is_none());
    }

    #[test]
    fn test_parse_skipped() {
        let result = CalibrationResult::from_json_str("\"skipped\"").unwrap();
        assert_eq!(result, CalibrationResult::Skipped);
    }

    #[test]
    fn test_parse_calibration() {
        let result = CalibrationResult::from_json_str(ARTIFACT).unwrap();
        let calibration = result.calibration().expect("success variant");
        assert_eq!(calibration.leds.len(), 2);
        assert_eq!(calibration.leds[0].name, "led_0001.jpg");
        assert_eq!(calibration.leds[1].position, Vec3::new(-1.0, 2.5, 30.0 + 1.0));
        assert_eq!(calibration.leds[0].directions.len(), calibration.spheres.len());
        assert_eq!(calibration.plane.normal, Vec3::Z);
        assert!((calibration.plane.alpha - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_outcome_is_rejected() {
        assert!(CalibrationResult::from_json_str("\"pending\"").is_err());
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let text = r#"{ "LEDs": [], "spheres": [], "plane": { "normal": [0, 0, 1], "alpha": 0 } }"#;
        assert!(CalibrationResult::from_json_str(text).is_err());
    }

    #[test]
    fn test_outcomes_serialize_as_strings() {
        assert_eq!(
            serde_json::to_string(&CalibrationResult::Failure).unwrap(),
            "\"failure\""
        );
        assert_eq!(
            serde_json::to_string(&CalibrationResult::Skipped).unwrap(),
            "\"skipped\""
        );
    }

    #[test]
    fn test_display_name_strips_extension() {
        let led = Led {
            name: "led_0001.small.jpg".to_string(),
            position: Vec3::ZERO,
            directions: Vec::new(),
        };
        assert_eq!(led.display_name(), "led_0001");

        let bare = Led {
            name: "led_0002".to_string(),
            ..led
        };
        assert_eq!(bare.display_name(), "led_0002");
    }

    #[test]
    fn test_sphere_centroid() {
        let result = CalibrationResult::from_json_str(ARTIFACT).unwrap();
        let calibration = result.calibration().unwrap();
        assert_eq!(calibration.sphere_centroid(), Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(calibration.led_index("led_0002.jpg"), Some(1));
        assert_eq!(calibration.led_index("missing.jpg"), None);
    }

    #[test]
    fn test_plane_projection() {
        let plane = Plane {
            normal: Vec3::Z,
            alpha: 5.0,
        };
        assert_eq!(plane.project(Vec3::new(1.0, 2.0, 9.0)), Vec3::new(1.0, 2.0, 5.0));
    }
}
