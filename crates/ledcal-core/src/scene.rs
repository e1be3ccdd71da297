//! Arena scene graph.
//!
//! Nodes carry a translation, a visibility flag, children and a [`NodeContent`].
//! Interactive entities ([`crate::LedVisual`], [`crate::CameraRepresentation`])
//! keep the ids of the nodes they drive and hold their own state; logic never walks
//! the child lists to discover what a node is.

use glam::Vec3;

use crate::geometry::{LineSet, MeshGeometry};

/// Handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena, stable for the lifetime of the scene.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Surface appearance of meshes and lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base color (linear RGB).
    pub color: Vec3,
    /// Opacity in `[0, 1]`; anything below 1 is drawn in the transparent pass.
    pub opacity: f32,
    /// Whether scene lights affect the surface. Unlit surfaces show `color` as is.
    pub lit: bool,
}

impl Material {
    /// Opaque lit material.
    #[must_use]
    pub fn lit(color: Vec3) -> Self {
        Self {
            color,
            opacity: 1.0,
            lit: true,
        }
    }

    /// Opaque unlit material.
    #[must_use]
    pub fn unlit(color: Vec3) -> Self {
        Self {
            color,
            opacity: 1.0,
            lit: false,
        }
    }

    /// Returns a copy with the given opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Returns true if the material needs blending.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// What a node draws or emits.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    /// Pure transform node.
    Group,
    /// Triangle mesh.
    Mesh {
        geometry: MeshGeometry,
        material: Material,
    },
    /// Line segments.
    Lines { lines: LineSet, material: Material },
    /// Omni light at the node position.
    PointLight {
        color: Vec3,
        intensity: f32,
        range: f32,
    },
    /// Light shining along `direction` everywhere in the scene.
    DirectionalLight { direction: Vec3, intensity: f32 },
}

impl NodeContent {
    /// Returns the material for drawable content.
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        match self {
            Self::Mesh { material, .. } | Self::Lines { material, .. } => Some(material),
            _ => None,
        }
    }

    fn material_mut(&mut self) -> Option<&mut Material> {
        match self {
            Self::Mesh { material, .. } | Self::Lines { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name.
    pub name: String,
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Own visibility flag. Hidden nodes hide their whole subtree.
    pub visible: bool,
    /// Content of the node.
    pub content: NodeContent,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Owner of every node.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    /// Ambient light intensity applied to lit materials.
    pub ambient: f32,
}

impl Scene {
    /// Creates a scene with a single root group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                name: "root".to_string(),
                position: Vec3::ZERO,
                visible: true,
                content: NodeContent::Group,
                parent: None,
                children: Vec::new(),
            }],
            ambient: 0.35,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds a node under `parent` and returns its id.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        position: Vec3,
        content: NodeContent,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            position,
            visible: true,
            content,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Adds an empty group node.
    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.add(parent, name, Vec3::ZERO, NodeContent::Group)
    }

    /// Borrows a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    /// Mutably borrows a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Sets the node's own visibility flag.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.0].visible = visible;
    }

    /// Returns the node's own visibility flag.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes[id.0].visible
    }

    /// Returns true if the node and all of its ancestors are visible.
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Position of the node in world space.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let mut position = Vec3::ZERO;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            position += node.position;
            current = node.parent;
        }
        position
    }

    /// Material of a mesh or line node.
    #[must_use]
    pub fn material(&self, id: NodeId) -> Option<&Material> {
        self.nodes[id.0].content.material()
    }

    /// Sets the color of a mesh or line node. Other nodes are left untouched.
    pub fn set_color(&mut self, id: NodeId, color: Vec3) {
        if let Some(material) = self.nodes[id.0].content.material_mut() {
            material.color = color;
        }
    }

    /// Sets the opacity of a mesh or line node. Other nodes are left untouched.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        if let Some(material) = self.nodes[id.0].content.material_mut() {
            material.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Ids of every effectively visible node, parents before children.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.visible {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Iterates over all nodes with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
