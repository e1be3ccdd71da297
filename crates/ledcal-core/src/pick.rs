//! Ray picking against the interactive part of the scene.
//!
//! Only what is registered in a [`PickLayer`] can be hit. Each entry maps a scene
//! node to its [`PickRole`] and carries a world-space [`Collider`], so resolving a
//! hit never inspects the node itself.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::NodeId;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Unprojects a normalized device coordinate (`[-1, 1]` on both axes, +y up)
    /// through the inverse view-projection matrix.
    ///
    /// Uses wgpu's `[0, 1]` depth range. Returns `None` for degenerate matrices.
    #[must_use]
    pub fn from_ndc(ndc: Vec2, inv_view_proj: Mat4) -> Option<Self> {
        let near = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
            return None;
        }

        let origin = near.truncate() / near.w;
        let direction = (far.truncate() / far.w - origin).normalize_or_zero();
        if direction.length_squared() < 1e-12 {
            return None;
        }

        Some(Self { origin, direction })
    }

    /// Like [`Ray::from_ndc`], but starting at the camera `eye`, so hit distances
    /// are measured from the camera position rather than from the near plane.
    #[must_use]
    pub fn from_eye(eye: Vec3, ndc: Vec2, inv_view_proj: Mat4) -> Option<Self> {
        let through = Self::from_ndc(ndc, inv_view_proj)?;
        Some(Self {
            origin: eye,
            direction: through.direction,
        })
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first intersection with a sphere, if any.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near > 0.0 {
            return Some(near);
        }
        // Origin inside the sphere: the exit point is the hit.
        let far = -b + sqrt_d;
        (far > 0.0).then_some(far)
    }

    /// Distance to a triangle (Möller–Trumbore), if hit in front of the origin.
    #[must_use]
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let eps = 1e-6;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < eps {
            return None;
        }
        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        (t > eps).then_some(t)
    }
}

/// Hit shape of a pickable entry, in world space.
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    /// Solid sphere.
    Sphere { center: Vec3, radius: f32 },
    /// Triangle soup.
    Triangles(Vec<[Vec3; 3]>),
}

impl Collider {
    /// Nearest hit distance along `ray`.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Sphere { center, radius } => ray.intersect_sphere(*center, *radius),
            Self::Triangles(triangles) => triangles
                .iter()
                .filter_map(|[a, b, c]| ray.intersect_triangle(*a, *b, *c))
                .min_by(f32::total_cmp),
        }
    }
}

/// What a pickable node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickRole {
    /// The LED at this index of the collection.
    Led(usize),
    /// The physical camera representation.
    Camera,
}

/// Nearest intersection found by [`PickLayer::cast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Node that was hit.
    pub node: NodeId,
    /// Role registered for that node.
    pub role: PickRole,
    /// Distance from the ray origin.
    pub distance: f32,
}

#[derive(Debug, Clone)]
struct PickEntry {
    node: NodeId,
    role: PickRole,
    collider: Collider,
}

/// The subset of the scene eligible for pointer hit-testing.
#[derive(Debug, Clone, Default)]
pub struct PickLayer {
    entries: Vec<PickEntry>,
}

impl PickLayer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pickable node.
    pub fn insert(&mut self, node: NodeId, role: PickRole, collider: Collider) {
        self.entries.push(PickEntry {
            node,
            role,
            collider,
        });
    }

    /// Role registered for `node`.
    #[must_use]
    pub fn role_of(&self, node: NodeId) -> Option<PickRole> {
        self.entries
            .iter()
            .find(|entry| entry.node == node)
            .map(|entry| entry.role)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is pickable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the nearest hit along `ray`, or `None` when nothing is hit.
    #[must_use]
    pub fn cast(&self, ray: &Ray) -> Option<PickHit> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.collider.intersect(ray).map(|distance| PickHit {
                    node: entry.node,
                    role: entry.role,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
