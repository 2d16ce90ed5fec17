//! Scene graph nodes
//!
//! Every node carries a local transform and an optional payload that depends on
//! its [`NodeType`]. Hierarchy links are stored as [`NodeId`]s into the owning
//! [`Scene`](crate::scene::Scene).

use std::fmt;
use std::rc::Rc;

use crate::foundation::math::{euler_to_quaternion, Mat4, Mat4Ext, Quat, Vec3};
use crate::render::{Camera, Light, Mesh};
use crate::scene::{NodeId, SceneError, SceneResult};

/// What a node carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Grouping node, transform only
    Empty,
    /// Draws a mesh
    Mesh,
    /// Provides the view and projection
    Camera,
    /// Lights the scene
    Light,
}

enum Payload {
    Empty,
    Mesh(Option<Rc<Mesh>>),
    Camera(Option<Box<dyn Camera>>),
    Light {
        light: Option<Light>,
        view_position: Vec3,
    },
}

impl Payload {
    fn for_type(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Empty => Self::Empty,
            NodeType::Mesh => Self::Mesh(None),
            NodeType::Camera => Self::Camera(None),
            NodeType::Light => Self::Light {
                light: None,
                view_position: Vec3::zeros(),
            },
        }
    }

    const fn node_type(&self) -> NodeType {
        match self {
            Self::Empty => NodeType::Empty,
            Self::Mesh(_) => NodeType::Mesh,
            Self::Camera(_) => NodeType::Camera,
            Self::Light { .. } => NodeType::Light,
        }
    }
}

/// Scene graph node
///
/// The local matrix is rebuilt as `T * R * S` whenever position, rotation or
/// scaling changes. [`Node::set_transform_matrix`] overwrites it directly and
/// leaves the stored TRS components untouched.
pub struct Node {
    name: String,
    position: Vec3,
    rotation: Quat,
    scaling: Vec3,
    transform: Mat4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    payload: Payload,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, node_type: NodeType, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scaling: Vec3::repeat(1.0),
            transform: Mat4::identity(),
            parent,
            children: Vec::new(),
            payload: Payload::for_type(node_type),
        }
    }

    /// Node name, unique within its scene when non-empty
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload kind
    pub const fn node_type(&self) -> NodeType {
        self.payload.node_type()
    }

    /// Parent id as stored; use [`Scene::parent`](crate::scene::Scene::parent)
    /// for a liveness-checked lookup
    pub const fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local position
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation quaternion
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub const fn scaling(&self) -> Vec3 {
        self.scaling
    }

    /// Local transform matrix
    pub const fn transform_matrix(&self) -> &Mat4 {
        &self.transform
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_transform();
    }

    /// Set local rotation from Euler angles in radians
    pub fn set_rotation_euler(&mut self, euler: Vec3) {
        self.set_rotation_quaternion(euler_to_quaternion(euler));
    }

    /// Set local rotation from a quaternion, used as given
    pub fn set_rotation_quaternion(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.update_transform();
    }

    /// Set local scale
    pub fn set_scaling(&mut self, scaling: Vec3) {
        self.scaling = scaling;
        self.update_transform();
    }

    /// Replace the local matrix
    pub fn set_transform_matrix(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn update_transform(&mut self) {
        self.transform = Mat4::from_trs(self.position, &self.rotation, self.scaling);
    }

    fn mismatch(&self, expected: NodeType) -> SceneError {
        SceneError::NodeTypeMismatch {
            expected,
            found: self.node_type(),
        }
    }

    /// Attached camera
    pub fn camera(&self) -> Option<&dyn Camera> {
        match &self.payload {
            Payload::Camera(camera) => camera.as_deref(),
            _ => None,
        }
    }

    /// Attached camera, mutable
    pub fn camera_mut(&mut self) -> Option<&mut (dyn Camera + 'static)> {
        match &mut self.payload {
            Payload::Camera(camera) => camera.as_deref_mut(),
            _ => None,
        }
    }

    /// Attach a camera. Fails unless this is a camera node.
    pub fn set_camera(&mut self, camera: Box<dyn Camera>) -> SceneResult<()> {
        match &mut self.payload {
            Payload::Camera(slot) => {
                *slot = Some(camera);
                Ok(())
            }
            _ => Err(self.mismatch(NodeType::Camera)),
        }
    }

    /// Attached light
    pub const fn light(&self) -> Option<&Light> {
        match &self.payload {
            Payload::Light { light, .. } => light.as_ref(),
            _ => None,
        }
    }

    /// Attach a light. Fails unless this is a light node.
    pub fn set_light(&mut self, new_light: Light) -> SceneResult<()> {
        match &mut self.payload {
            Payload::Light { light, .. } => {
                *light = Some(new_light);
                Ok(())
            }
            _ => Err(self.mismatch(NodeType::Light)),
        }
    }

    /// View-space light position cached by the renderer for the current frame.
    /// Zero for nodes that are not lights.
    pub fn light_position(&self) -> Vec3 {
        match &self.payload {
            Payload::Light { view_position, .. } => *view_position,
            _ => Vec3::zeros(),
        }
    }

    /// Cache the view-space light position. Ignored on non-light nodes.
    pub fn set_light_position(&mut self, position: Vec3) {
        if let Payload::Light { view_position, .. } = &mut self.payload {
            *view_position = position;
        }
    }

    /// Attached mesh
    pub const fn mesh(&self) -> Option<&Rc<Mesh>> {
        match &self.payload {
            Payload::Mesh(mesh) => mesh.as_ref(),
            _ => None,
        }
    }

    /// Attach a mesh. Fails unless this is a mesh node.
    pub fn set_mesh(&mut self, mesh: Rc<Mesh>) -> SceneResult<()> {
        match &mut self.payload {
            Payload::Mesh(slot) => {
                *slot = Some(mesh);
                Ok(())
            }
            _ => Err(self.mismatch(NodeType::Mesh)),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("type", &self.node_type())
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scaling", &self.scaling)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use crate::render::{LightType, PerspectiveCamera};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_defaults() {
        let node = Node::new("n", NodeType::Empty, None);
        assert_eq!(node.position(), Vec3::zeros());
        assert_eq!(node.rotation(), Quat::identity());
        assert_eq!(node.scaling(), Vec3::repeat(1.0));
        assert_eq!(*node.transform_matrix(), Mat4::identity());
    }

    #[test]
    fn test_trs_applied_to_origin() {
        let mut node = Node::new("n", NodeType::Empty, None);
        node.set_scaling(Vec3::new(2.0, 2.0, 2.0));
        node.set_rotation_euler(Vec3::new(0.0, FRAC_PI_2, 0.0));
        node.set_position(Vec3::new(1.0, 2.0, 3.0));

        let m = node.transform_matrix();
        assert_relative_eq!(m.transform_point(&Point3::origin()), Point3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
        // Scale then a quarter turn about Y sends +X to -Z.
        assert_relative_eq!(
            m.transform_point(&Point3::new(1.0, 0.0, 0.0)),
            Point3::new(1.0, 2.0, 1.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_direct_matrix_keeps_trs_fields() {
        let mut node = Node::new("n", NodeType::Empty, None);
        node.set_position(Vec3::new(1.0, 0.0, 0.0));
        node.set_transform_matrix(Mat4::new_translation(&Vec3::new(0.0, 9.0, 0.0)));
        assert_eq!(node.position(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(node.transform_matrix().translation(), Vec3::new(0.0, 9.0, 0.0));

        // The next TRS update rebuilds from the stored fields.
        node.set_scaling(Vec3::repeat(1.0));
        assert_eq!(node.transform_matrix().translation(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_payload_type_checks() {
        let mut empty = Node::new("e", NodeType::Empty, None);
        assert!(matches!(
            empty.set_light(Light::point()),
            Err(SceneError::NodeTypeMismatch { expected: NodeType::Light, found: NodeType::Empty })
        ));
        assert!(empty.camera().is_none());

        let mut camera = Node::new("c", NodeType::Camera, None);
        assert!(camera.camera().is_none());
        camera
            .set_camera(Box::new(PerspectiveCamera::new(1.0, 1.0, 0.1, 10.0)))
            .unwrap();
        assert!(camera.camera().is_some());

        let mut light = Node::new("l", NodeType::Light, None);
        light.set_light(Light::new(LightType::Spot)).unwrap();
        light.set_light_position(Vec3::new(0.0, 1.0, -2.0));
        assert_eq!(light.light().map(Light::light_type), Some(LightType::Spot));
        assert_eq!(light.light_position(), Vec3::new(0.0, 1.0, -2.0));

        empty.set_light_position(Vec3::repeat(5.0));
        assert_eq!(empty.light_position(), Vec3::zeros());
    }
}
