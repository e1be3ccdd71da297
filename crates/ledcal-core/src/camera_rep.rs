//! Frustum marker for the physical camera.
//!
//! The calibration frame is the camera frame, so the camera sits at the origin and
//! looks along +Z with image y pointing down. The frame corners are built in that
//! convention and then converted like any other server geometry.

use glam::Vec3;

use crate::coords;
use crate::geometry::{LineSet, MeshGeometry};
use crate::options::ViewerOptions;
use crate::pick::{Collider, PickLayer, PickRole};
use crate::scene::{Material, NodeContent, NodeId, Scene};

/// Pickable representation of the physical camera.
#[derive(Debug, Clone)]
pub struct CameraRepresentation {
    group: NodeId,
    faces: NodeId,
    wireframe: NodeId,
    triangles: Vec<[Vec3; 3]>,
    hovered: bool,
    face_opacity: f32,
    hover_face_opacity: f32,
    wire_color: Vec3,
    hover_wire_color: Vec3,
    min_hover_distance: f32,
}

impl CameraRepresentation {
    /// Adds the frustum faces and wireframe under `parent`.
    pub fn new(scene: &mut Scene, parent: NodeId, options: &ViewerOptions) -> Self {
        let root = Vec3::ZERO;
        let corners = frame_corners(options);
        let faces_mesh = MeshGeometry::frustum(root, corners);
        let triangles = faces_mesh.triangles(root).collect();

        let group = scene.add_group(parent, "camera");
        let faces = scene.add(
            group,
            "camera faces",
            Vec3::ZERO,
            NodeContent::Mesh {
                geometry: faces_mesh,
                material: Material::unlit(options.camera_wire_color)
                    .with_opacity(options.camera_face_opacity),
            },
        );
        let wireframe = scene.add(
            group,
            "camera wireframe",
            Vec3::ZERO,
            NodeContent::Lines {
                lines: wireframe(root, corners),
                material: Material::unlit(options.camera_wire_color),
            },
        );

        Self {
            group,
            faces,
            wireframe,
            triangles,
            hovered: false,
            face_opacity: options.camera_face_opacity,
            hover_face_opacity: options.camera_hover_face_opacity,
            wire_color: options.camera_wire_color,
            hover_wire_color: options.camera_hover_wire_color,
            min_hover_distance: options.camera_hover_min_distance,
        }
    }

    /// Registers the frustum faces as pickable.
    pub fn register_picking(&self, layer: &mut PickLayer) {
        layer.insert(
            self.faces,
            PickRole::Camera,
            Collider::Triangles(self.triangles.clone()),
        );
    }

    /// Group node holding faces and wireframe.
    #[must_use]
    pub fn group(&self) -> NodeId {
        self.group
    }

    /// Face mesh node, the pickable one.
    #[must_use]
    pub fn faces(&self) -> NodeId {
        self.faces
    }

    /// Wireframe node.
    #[must_use]
    pub fn wireframe(&self) -> NodeId {
        self.wireframe
    }

    /// Whether the representation is styled as hovered.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Hits closer than this to the viewer camera do not count as hovering,
    /// so the marker does not light up while the viewer sits on top of it.
    #[must_use]
    pub fn accepts_hover_at(&self, distance: f32) -> bool {
        distance > self.min_hover_distance
    }

    /// Applies hover styling.
    pub fn hover(&mut self, scene: &mut Scene) {
        self.hovered = true;
        scene.set_opacity(self.faces, self.hover_face_opacity);
        scene.set_color(self.wireframe, self.hover_wire_color);
    }

    /// Restores the resting style.
    pub fn un_hover(&mut self, scene: &mut Scene) {
        self.hovered = false;
        scene.set_opacity(self.faces, self.face_opacity);
        scene.set_color(self.wireframe, self.wire_color);
    }
}

/// Frame corners in render space, ordered upper-left, upper-right, lower-right,
/// lower-left as seen by the camera.
fn frame_corners(options: &ViewerOptions) -> [Vec3; 4] {
    let focal = options.camera_focal_length;
    let half_height = focal * (options.camera_fov_degrees.to_radians() / 2.0).tan();
    let half_width = options.camera_aspect_ratio * half_height;

    [
        Vec3::new(-half_width, -half_height, focal),
        Vec3::new(half_width, -half_height, focal),
        Vec3::new(half_width, half_height, focal),
        Vec3::new(-half_width, half_height, focal),
    ]
    .map(coords::to_render)
}

/// Apex edges, the frame rectangle and an orientation triangle above the frame.
fn wireframe(root: Vec3, corners: [Vec3; 4]) -> LineSet {
    let [upper_left, upper_right, lower_right, lower_left] = corners;
    let center = (upper_left + lower_right) / 2.0;
    let up = (upper_left + upper_right) / 2.0 - center;
    let right = (upper_right - upper_left) / 2.0;

    let nodes = [
        root,
        upper_left,
        upper_right,
        lower_right,
        lower_left,
        center + up * 1.2 - right * 0.7,
        center + up * 1.2 + right * 0.7,
        center + up * 2.0,
    ];
    let edges = [
        [0, 1],
        [0, 2],
        [0, 3],
        [0, 4],
        [1, 2],
        [2, 3],
        [3, 4],
        [4, 1],
        [5, 6],
        [6, 7],
        [7, 5],
    ];
    LineSet::from_edges(&nodes, &edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::Ray;

    fn camera() -> (Scene, CameraRepresentation) {
        let mut scene = Scene::new();
        let root = scene.root();
        let camera = CameraRepresentation::new(&mut scene, root, &ViewerOptions::default());
        (scene, camera)
    }

    #[test]
    fn test_frame_faces_forward() {
        let options = ViewerOptions::default();
        let corners = frame_corners(&options);
        for corner in corners {
            assert!((corner.z - options.camera_focal_length).abs() < 1e-6);
        }
        // Image up (server -y) maps to render +x.
        assert!(corners[0].x > 0.0 && corners[3].x < 0.0);
    }

    #[test]
    fn test_wireframe_edges() {
        let (scene, camera) = camera();
        let NodeContent::Lines { lines, .. } = &scene.node(camera.wireframe()).content else {
            panic!("wireframe should hold lines");
        };
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn test_hover_styling() {
        let options = ViewerOptions::default();
        let (mut scene, mut camera) = camera();

        camera.hover(&mut scene);
        assert!(camera.is_hovered());
        let faces = scene.material(camera.faces()).unwrap();
        assert!((faces.opacity - options.camera_hover_face_opacity).abs() < 1e-6);
        assert_eq!(
            scene.material(camera.wireframe()).unwrap().color,
            options.camera_hover_wire_color
        );

        camera.un_hover(&mut scene);
        assert!(!camera.is_hovered());
        let faces = scene.material(camera.faces()).unwrap();
        assert!((faces.opacity - options.camera_face_opacity).abs() < 1e-6);
    }

    #[test]
    fn test_picked_from_front() {
        let (_, camera) = camera();
        let mut layer = PickLayer::new();
        camera.register_picking(&mut layer);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = layer.cast(&ray).unwrap();
        assert_eq!(hit.role, PickRole::Camera);
        assert!(camera.accepts_hover_at(hit.distance));
        assert!(!camera.accepts_hover_at(0.5));
    }
}
