//! Conversion between the calibration server's axes and render space.
//!
//! The server reports geometry in the physical camera frame. The renderer uses a
//! right-handed display convention, reached by swapping and negating the first two
//! axes: `render = (-s.y, -s.x, s.z)`. The map is orthogonal, so directions and
//! plane normals go through the same permutation and plane offsets are unchanged.
//! It is also an involution, which makes [`to_source`] the same permutation.

use glam::Vec3;

use crate::calibration::Plane;

/// Converts a point from server coordinates to render coordinates.
#[must_use]
pub fn to_render(source: Vec3) -> Vec3 {
    Vec3::new(-source.y, -source.x, source.z)
}

/// Converts a direction vector from server coordinates to render coordinates.
#[must_use]
pub fn direction_to_render(source: Vec3) -> Vec3 {
    Vec3::new(-source.y, -source.x, source.z)
}

/// Converts a point from render coordinates back to server coordinates.
#[must_use]
pub fn to_source(render: Vec3) -> Vec3 {
    Vec3::new(-render.y, -render.x, render.z)
}

/// Converts a plane from server coordinates to render coordinates.
#[must_use]
pub fn plane_to_render(plane: &Plane) -> Plane {
    Plane {
        normal: direction_to_render(plane.normal),
        alpha: plane.alpha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_permutation() {
        assert_eq!(to_render(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(-2.0, -1.0, 3.0));
        assert_eq!(to_render(Vec3::X), Vec3::NEG_Y);
        assert_eq!(to_render(Vec3::Y), Vec3::NEG_X);
        assert_eq!(to_render(Vec3::Z), Vec3::Z);
    }

    #[test]
    fn test_round_trip_zero_and_negative() {
        for p in [
            Vec3::ZERO,
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, -2.5, 0.0),
            Vec3::new(-3.0, -4.0, -5.0),
            Vec3::new(7.0, -0.0, 12.5),
        ] {
            assert_eq!(to_source(to_render(p)), p);
        }
    }

    #[test]
    fn test_plane_membership_is_preserved() {
        let plane = Plane {
            normal: Vec3::new(0.6, 0.0, 0.8),
            alpha: 4.0,
        };
        // A point on the source plane stays on the converted plane.
        let on_plane = Vec3::new(2.0, 7.0, 3.5);
        assert!((plane.normal.dot(on_plane) - plane.alpha).abs() < 1e-5);

        let converted = plane_to_render(&plane);
        let moved = to_render(on_plane);
        assert!((converted.normal.dot(moved) - converted.alpha).abs() < 1e-5);
        assert_eq!(converted.normal, Vec3::new(0.0, -0.6, 0.8));
    }

    #[test]
    fn test_direction_matches_point_difference() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(-4.0, 5.0, 0.5);
        assert_eq!(direction_to_render(b - a), to_render(b) - to_render(a));
    }

    proptest! {
        #[test]
        fn prop_round_trip(x in -1.0e4f32..1.0e4, y in -1.0e4f32..1.0e4, z in -1.0e4f32..1.0e4) {
            let p = Vec3::new(x, y, z);
            prop_assert_eq!(to_source(to_render(p)), p);
        }

        #[test]
        fn prop_length_preserved(x in -100.0f32..100.0, y in -100.0f32..100.0, z in -100.0f32..100.0) {
            let d = Vec3::new(x, y, z);
            prop_assert!((direction_to_render(d).length() - d.length()).abs() < 1e-3);
        }
    }
}
