//! Mesh and line geometry placed in the scene.

use std::f32::consts::PI;

use glam::Vec3;

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    /// Vertex positions in node-local space.
    pub positions: Vec<Vec3>,
    /// Vertex normals, one per position.
    pub normals: Vec<Vec3>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// Builds a UV sphere centered at the local origin.
    #[must_use]
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = 2.0 * PI * segment as f32 / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.positions.push(normal * radius);
                mesh.normals.push(normal);
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        mesh
    }

    /// Builds a square of half-size `half_size` centered at `center`, lying in the
    /// plane orthogonal to `normal`.
    #[must_use]
    pub fn square(center: Vec3, normal: Vec3, half_size: f32) -> Self {
        let normal = normal.normalize_or_zero();
        let (u, v) = plane_axes(normal);
        let (u, v) = (u * half_size, v * half_size);
        Self {
            positions: vec![
                center - u - v,
                center + u - v,
                center + u + v,
                center - u + v,
            ],
            normals: vec![normal; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// Builds the faces of a camera frustum: the four sides from `root` to the frame
    /// corners plus the frame rectangle itself.
    ///
    /// `corners` are ordered upper-left, upper-right, lower-right, lower-left.
    #[must_use]
    pub fn frustum(root: Vec3, corners: [Vec3; 4]) -> Self {
        let mut mesh = Self::default();
        let mut push_triangle = |a: Vec3, b: Vec3, c: Vec3| {
            let normal = (b - a).cross(c - a).normalize_or_zero();
            let base = mesh.positions.len() as u32;
            mesh.positions.extend_from_slice(&[a, b, c]);
            mesh.normals.extend_from_slice(&[normal; 3]);
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        };

        for i in 0..4 {
            push_triangle(root, corners[i], corners[(i + 1) % 4]);
        }
        push_triangle(corners[0], corners[2], corners[1]);
        push_triangle(corners[0], corners[3], corners[2]);

        mesh
    }

    /// Iterates over the triangles of the mesh, offset by `origin`.
    pub fn triangles(&self, origin: Vec3) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize] + origin,
                self.positions[tri[1] as usize] + origin,
                self.positions[tri[2] as usize] + origin,
            ]
        })
    }

    /// Number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Unconnected line segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSet {
    /// Segment endpoints in node-local space.
    pub segments: Vec<[Vec3; 2]>,
}

impl LineSet {
    /// Creates a line set from explicit segments.
    #[must_use]
    pub fn new(segments: Vec<[Vec3; 2]>) -> Self {
        Self { segments }
    }

    /// Builds a line set from nodes and edges, the way curve networks are described.
    #[must_use]
    pub fn from_edges(nodes: &[Vec3], edges: &[[u32; 2]]) -> Self {
        Self {
            segments: edges
                .iter()
                .map(|[tail, tip]| [nodes[*tail as usize], nodes[*tip as usize]])
                .collect(),
        }
    }

    /// Flattened endpoint list, two vertices per segment.
    #[must_use]
    pub fn vertices(&self) -> Vec<Vec3> {
        self.segments.iter().flat_map(|[a, b]| [*a, *b]).collect()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Two unit vectors spanning the plane orthogonal to `normal`.
#[must_use]
pub fn plane_axes(normal: Vec3) -> (Vec3, Vec3) {
    let up = if normal.dot(Vec3::Y).abs() < 0.99 {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let u = up.cross(normal).normalize();
    let v = normal.cross(u).normalize();
    (u, v)
}
