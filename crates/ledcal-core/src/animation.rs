//! Linear camera pose animation.

use glam::Vec3;

/// Position and look-at target of the viewer camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position.
    pub position: Vec3,
    /// Look-at point.
    pub target: Vec3,
}

impl CameraPose {
    /// Creates a pose.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Blends two poses: `(1 - t) * from + t * to` for both position and target.
    #[must_use]
    pub fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            position: from.position * (1.0 - t) + to.position * t,
            target: from.target * (1.0 - t) + to.target * t,
        }
    }
}

/// Blend between two poses driven by an accumulated progress `t`.
///
/// `update` does not clamp. Once [`Animation::is_finished`] reports `t > 1` the
/// caller drops the animation and applies [`Animation::end`] itself.
#[derive(Debug, Clone)]
pub struct Animation {
    start: CameraPose,
    end: CameraPose,
    t: f32,
}

impl Animation {
    /// Captures both poses by value.
    #[must_use]
    pub fn new(start: CameraPose, end: CameraPose) -> Self {
        Self { start, end, t: 0.0 }
    }

    /// Advances progress by `delay` and returns the blended pose.
    pub fn update(&mut self, delay: f32) -> CameraPose {
        self.t += delay;
        CameraPose::lerp(&self.start, &self.end, self.t)
    }

    /// Current progress.
    #[must_use]
    pub fn t(&self) -> f32 {
        self.t
    }

    /// Returns true once progress went past 1.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.t > 1.0
    }

    /// Pose the animation started from.
    #[must_use]
    pub fn start(&self) -> CameraPose {
        self.start
    }

    /// Pose the animation is heading to.
    #[must_use]
    pub fn end(&self) -> CameraPose {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poses() -> (CameraPose, CameraPose) {
        (
            CameraPose::new(Vec3::new(10.0, -4.0, 2.0), Vec3::new(0.0, 0.0, 20.0)),
            CameraPose::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 25.0)),
        )
    }

    #[test]
    fn test_quarter_steps_blend_exactly() {
        let (start, end) = poses();
        let mut animation = Animation::new(start, end);
        assert!(animation.t().abs() < f32::EPSILON);

        for expected_t in [0.25_f32, 0.5, 0.75, 1.0] {
            let pose = animation.update(0.25);
            assert_eq!(animation.t(), expected_t);
            assert_eq!(
                pose.position,
                start.position * (1.0 - expected_t) + end.position * expected_t
            );
            assert_eq!(
                pose.target,
                start.target * (1.0 - expected_t) + end.target * expected_t
            );
            assert!(!animation.is_finished());
        }

        // Fifth step overshoots and the animation reports itself finished.
        let overshoot = animation.update(0.25);
        assert!(animation.is_finished());
        assert_ne!(overshoot.position, end.position);
        assert_eq!(animation.end(), end);
    }

    #[test]
    fn test_poses_are_captured_by_value() {
        let (mut start, end) = poses();
        let mut animation = Animation::new(start, end);
        start.position = Vec3::splat(100.0);
        let pose = animation.update(0.0);
        assert_eq!(pose.position, Vec3::new(10.0, -4.0, 2.0));
        assert_ne!(animation.start().position, start.position);
    }

    #[test]
    fn test_no_clamping_inside_update() {
        let (start, end) = poses();
        let mut animation = Animation::new(start, end);
        let pose = animation.update(2.0);
        assert_eq!(pose.position, start.position * -1.0 + end.position * 2.0);
    }
}
