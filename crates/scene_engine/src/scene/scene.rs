use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;

use crate::foundation::math::Mat4;
use crate::render::{BackendResult, Camera, DrawingContext, Light, Mesh, RenderError, SharedContext};
use crate::scene::{Node, NodeId, NodeType, SceneError, SceneResult};

/// A named scene graph bound to a drawing context
///
/// The scene owns every node. The root is created with the scene, has an empty
/// name and an identity transform, and cannot be fetched mutably or removed.
pub struct Scene {
    name: String,
    context: Weak<RefCell<dyn DrawingContext>>,
    nodes: SlotMap<NodeId, Node>,
    names: HashMap<String, NodeId>,
    root: NodeId,
    active_camera: Option<NodeId>,
}

impl Scene {
    /// Create an empty scene rendered through `context`
    pub fn new(name: impl Into<String>, context: &SharedContext) -> Self {
        let name = name.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("", NodeType::Empty, None));
        log::debug!("Created scene '{}'", name);
        Self {
            name,
            context: Rc::downgrade(context),
            nodes,
            names: HashMap::new(),
            root,
            active_camera: None,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drawing context, if it is still alive
    pub fn drawing_context(&self) -> Option<SharedContext> {
        self.context.upgrade()
    }

    fn with_context(&self, f: impl FnOnce(&mut dyn DrawingContext) -> BackendResult<()>) -> BackendResult<()> {
        let context = self.drawing_context().ok_or(RenderError::MissingDrawingContext)?;
        let mut context = context.try_borrow_mut().map_err(|_| RenderError::ContextBusy)?;
        f(&mut *context)
    }

    /// Make the scene's drawing context current
    pub fn activate(&self) -> BackendResult<()> {
        self.with_context(|context| context.activate())
    }

    /// Release the scene's drawing context
    pub fn deactivate(&self) -> BackendResult<()> {
        self.with_context(|context| context.deactivate())
    }

    /// Root node id
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Node by id, mutable. The root is refused.
    pub fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Node id by name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Parent of `id`, or `None` for the root, missing nodes and dead parents
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .get(id)
            .and_then(|node| node.parent)
            .filter(|parent| self.nodes.contains_key(*parent))
    }

    /// Children of `id`; empty for missing nodes
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Create a node under `parent`
    ///
    /// Non-empty names must be unique within the scene.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        node_type: NodeType,
    ) -> SceneResult<NodeId> {
        let name = name.into();
        if !self.nodes.contains_key(parent) {
            log::error!("Cannot create node '{}': parent {:?} does not exist", name, parent);
            return Err(SceneError::InvalidParent(parent));
        }
        if !name.is_empty() && self.names.contains_key(&name) {
            log::error!("Cannot create node '{}': name already in use", name);
            return Err(SceneError::DuplicateName(name));
        }

        let id = self.nodes.insert(Node::new(name.clone(), node_type, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        log::debug!("Created {:?} node '{}' in scene '{}'", node_type, name, self.name);
        if !name.is_empty() {
            self.names.insert(name, id);
        }
        Ok(id)
    }

    /// Create a camera node with `camera` attached
    pub fn create_camera_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        camera: Box<dyn Camera>,
    ) -> SceneResult<NodeId> {
        let id = self.create_node(name, parent, NodeType::Camera)?;
        self.node_mut(id)?.set_camera(camera)?;
        Ok(id)
    }

    /// Create a light node with `light` attached
    pub fn create_light_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        light: Light,
    ) -> SceneResult<NodeId> {
        let id = self.create_node(name, parent, NodeType::Light)?;
        self.node_mut(id)?.set_light(light)?;
        Ok(id)
    }

    /// Create a mesh node drawing `mesh`
    pub fn create_mesh_node(
        &mut self,
        name: impl Into<String>,
        parent: NodeId,
        mesh: Rc<Mesh>,
    ) -> SceneResult<NodeId> {
        let id = self.create_node(name, parent, NodeType::Mesh)?;
        self.node_mut(id)?.set_mesh(mesh)?;
        Ok(id)
    }

    /// Remove a node and its whole subtree
    pub fn remove_node(&mut self, id: NodeId) -> SceneResult<()> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_node.children.retain(|child| *child != id);
        }

        let doomed = self.depth_first(id);
        for node_id in &doomed {
            if let Some(node) = self.nodes.remove(*node_id) {
                if !node.name().is_empty() {
                    self.names.remove(node.name());
                }
            }
        }
        if self.active_camera.is_some_and(|camera| doomed.contains(&camera)) {
            log::info!("Active camera removed from scene '{}'", self.name);
            self.active_camera = None;
        }
        log::debug!("Removed {} node(s) from scene '{}'", doomed.len(), self.name);
        Ok(())
    }

    /// Choose the camera node used for rendering
    pub fn set_active_camera(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?;
        if node.node_type() != NodeType::Camera {
            return Err(SceneError::NodeTypeMismatch {
                expected: NodeType::Camera,
                found: node.node_type(),
            });
        }
        log::info!("Scene '{}' active camera set to '{}'", self.name, node.name());
        self.active_camera = Some(id);
        Ok(())
    }

    /// Active camera node, if any
    pub const fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    /// World transform of `id`: the parent's world transform times the local
    /// matrix, recomputed on every call
    pub fn total_transform(&self, id: NodeId) -> SceneResult<Mat4> {
        let node = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?;
        let mut total = *node.transform_matrix();
        let mut parent = node.parent;
        while let Some(parent_node) = parent.and_then(|p| self.nodes.get(p)) {
            total = *parent_node.transform_matrix() * total;
            parent = parent_node.parent;
        }
        Ok(total)
    }

    /// Every light node, depth-first in child order
    pub fn light_nodes(&self) -> Vec<NodeId> {
        self.depth_first(self.root)
            .into_iter()
            .filter(|id| self.nodes[*id].node_type() == NodeType::Light)
            .collect()
    }

    /// `start` and its descendants in pre-order
    pub fn depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("active_camera", &self.active_camera)
            .finish_non_exhaustive()
    }
}
