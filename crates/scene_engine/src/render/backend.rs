//! Backend abstraction traits for the rendering system
//!
//! A [`DrawingContext`] owns the binding between a display surface and a
//! [`GraphicsDevice`]. The renderer and materials only talk to these traits,
//! so the actual graphics API lives outside the engine.

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::color::RgbaColor;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::mesh::AttributeData;
use crate::render::{RenderError, ShaderError};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Drawing context shared between scenes and the application
pub type SharedContext = Rc<RefCell<dyn DrawingContext>>;

/// Opaque handle to a device buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Opaque handle to a compiled shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Opaque handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u64);

/// Opaque handle to a device texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Texture coordinate wrapping outside `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureWrap {
    /// Tile the image
    #[default]
    Repeat,
    /// Clamp to the border texel
    ClampToEdge,
    /// Tile, mirroring every other repeat
    MirroredRepeat,
}

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

/// What a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attributes
    Vertex,
    /// Element indices
    Index,
}

/// How vertices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Point list
    Points,
    /// Line list
    Lines,
    /// Connected line strip
    LineStrip,
    /// Triangle list
    #[default]
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
}

/// Depth comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    /// Pass when less
    Less,
    /// Pass when less or equal
    LessEqual,
    /// Always pass
    Always,
}

/// Faces removed by culling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull back faces
    Back,
    /// Cull front faces
    Front,
}

/// Winding that counts as front facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise
    CounterClockwise,
    /// Clockwise
    Clockwise,
}

/// Fixed-function state applied once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Face culling, `None` disables it
    pub cull_face: Option<CullFace>,
    /// Front-face winding
    pub front_face: FrontFace,
    /// Depth test, `None` disables it
    pub depth_test: Option<DepthFunc>,
}

impl RenderState {
    /// Back-face culling, counter-clockwise front faces, less-or-equal depth test
    pub const OPAQUE: Self = Self {
        cull_face: Some(CullFace::Back),
        front_face: FrontFace::CounterClockwise,
        depth_test: Some(DepthFunc::LessEqual),
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Uniform value handed to a shader program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// Integer, also used for sampler units
    Int(i32),
    /// Scalar
    Float(f32),
    /// 3-vector
    Vec3(Vec3),
    /// 4-vector
    Vec4(Vec4),
    /// 4×4 matrix, column-major
    Mat4(Mat4),
}

impl From<RgbaColor> for Uniform {
    fn from(color: RgbaColor) -> Self {
        Self::Vec4(color.to_vec4())
    }
}

/// Graphics device the renderer and materials issue commands to
pub trait GraphicsDevice {
    /// Apply fixed-function state
    fn set_render_state(&mut self, state: &RenderState) -> BackendResult<()>;

    /// Clear colour and depth
    fn clear(&mut self, color: RgbaColor) -> BackendResult<()>;

    /// Upload raw bytes into a new buffer
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Compile one shader stage
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, ShaderError>;

    /// Link a vertex and fragment stage into a program
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError>;

    /// Make a program current
    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()>;

    /// Set a uniform on the given program
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: Uniform) -> BackendResult<()>;

    /// Bind vertex attributes to the program's inputs
    fn bind_attributes(&mut self, program: ProgramHandle, attributes: &[AttributeData]) -> BackendResult<()>;

    /// Release attribute bindings made by [`GraphicsDevice::bind_attributes`]
    fn unbind_attributes(&mut self, program: ProgramHandle, attributes: &[AttributeData]) -> BackendResult<()>;

    /// Upload tightly packed RGBA8 pixels into a new 2D texture
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        wrap: TextureWrap,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle>;

    /// Bind a texture to a sampler unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()>;

    /// Release whatever is bound to a sampler unit
    fn unbind_texture(&mut self, unit: u32) -> BackendResult<()>;

    /// Draw `count` vertices starting at `first`
    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) -> BackendResult<()>;

    /// Draw `count` indexed vertices
    fn draw_elements(&mut self, topology: Topology, count: u32, indices: &AttributeData) -> BackendResult<()>;
}

/// Binding between a display surface and a graphics device
pub trait DrawingContext {
    /// Whether the underlying display is still open
    fn is_device_open(&self) -> bool;

    /// Make this context current
    fn activate(&mut self) -> BackendResult<()>;

    /// Release this context
    fn deactivate(&mut self) -> BackendResult<()>;

    /// Whether this context is current
    fn is_active(&self) -> bool;

    /// Present the finished frame
    fn present(&mut self) -> BackendResult<()>;

    /// Graphics device behind this context
    fn device(&mut self) -> &mut dyn GraphicsDevice;
}
