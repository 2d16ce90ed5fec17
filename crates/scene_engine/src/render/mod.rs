//! Rendering system
//!
//! Cameras, lights, meshes and materials attached to scene nodes, plus the
//! [`Renderer`] that walks a scene each frame and issues draw calls through a
//! [`GraphicsDevice`].

pub mod backend;
pub mod backends;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod renderer;
pub mod shader_cache;

pub use backend::{
    BackendResult, BufferHandle, BufferKind, CullFace, DepthFunc, DrawingContext, FrontFace,
    GraphicsDevice, ProgramHandle, RenderState, ShaderHandle, ShaderStage, SharedContext,
    TextureHandle, TextureWrap, Topology, Uniform,
};
pub use camera::{Camera, PerspectiveCamera};
pub use light::{Light, LightType};
pub use material::{
    DrawMatrices, FlatColorMaterial, FlatTextureMaterial, Material, PhongColorMaterial, PhongParams,
};
pub use mesh::{AttributeData, ComponentType, Mesh, Primitive};
pub use renderer::Renderer;
pub use shader_cache::ShaderCache;

use thiserror::Error;

use crate::scene::{NodeId, SceneError};

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The scene's drawing context has been dropped
    #[error("Scene has no drawing context")]
    MissingDrawingContext,

    /// The drawing context is already borrowed elsewhere
    #[error("Drawing context is already in use")]
    ContextBusy,

    /// No usable active camera node
    #[error("Scene has no active camera")]
    NoActiveCamera,

    /// The active camera node carries no camera
    #[error("Active camera node has no camera attached")]
    MissingCamera,

    /// Traversal reached a node id that is not in the scene
    #[error("Node {0:?} is missing from the scene graph")]
    NullNode(NodeId),

    /// Renderer or context initialization failed
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    Backend(String),

    /// Shader compilation or linking failed
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// Scene graph lookup failed
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Shader compilation and linking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A stage failed to compile
    #[error("Failed to compile {stage:?} shader: {log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler output
        log: String,
    },

    /// Stages failed to link
    #[error("Failed to link shader program: {log}")]
    Link {
        /// Linker output
        log: String,
    },
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
