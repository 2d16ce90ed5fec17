//! Materials
//!
//! A material owns a shader program and knows which uniforms to feed it.
//! [`Material::setup`] runs before a primitive's draw call and
//! [`Material::deactivate`] after it.

use std::fmt::Debug;

use crate::foundation::color::RgbaColor;
use crate::foundation::math::Mat4;
use crate::render::backend::{BackendResult, GraphicsDevice, ProgramHandle, TextureHandle, Uniform};
use crate::render::mesh::AttributeData;
use crate::render::shader_cache::ShaderCache;
use crate::render::ShaderError;
use crate::scene::Node;

/// Uniform names shared by the built-in shaders
pub mod uniforms {
    /// Model-view matrix
    pub const MODEL_VIEW: &str = "u_mvMx";
    /// Projection matrix
    pub const PROJECTION: &str = "u_pMx";
    /// Normal matrix
    pub const NORMAL: &str = "u_normMx";
    /// Flat colour
    pub const COLOR: &str = "u_color";
    /// Ambient coefficient
    pub const KA: &str = "u_ka";
    /// Diffuse coefficient
    pub const KD: &str = "u_kd";
    /// Specular coefficient
    pub const KS: &str = "u_ks";
    /// Specular exponent
    pub const SHININESS: &str = "u_shininess";
    /// Ambient colour
    pub const AMBIENT_COLOR: &str = "u_ambientColor";
    /// Diffuse colour
    pub const DIFFUSE_COLOR: &str = "u_diffuseColor";
    /// Specular colour
    pub const SPECULAR_COLOR: &str = "u_specularColor";
    /// View-space light position
    pub const LIGHT_POSITION: &str = "u_lightPos";
    /// Colour sampler
    pub const TEXTURE: &str = "u_tex";
}

/// Vertex attribute names expected by the built-in shaders
pub mod attributes {
    /// Vertex position, `vec3`
    pub const POSITION: &str = "POSITION";
    /// Vertex normal, `vec3`
    pub const NORMAL: &str = "NORMAL";
    /// First texture coordinate set, `vec2`
    pub const TEXCOORD_0: &str = "TEXCOORD_0";
}

/// Per-draw matrices computed by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawMatrices {
    /// View × model
    pub model_view: Mat4,
    /// Camera projection
    pub projection: Mat4,
    /// Transposed inverse of the model matrix
    pub normal: Mat4,
}

/// Shading recipe for a primitive
pub trait Material: Debug {
    /// Program this material draws with
    fn program(&self) -> ProgramHandle;

    /// Upload per-draw uniforms. `lights` are the scene's light nodes with
    /// their view-space positions already cached.
    fn apply_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        lights: &[&Node],
    ) -> BackendResult<()>;

    /// Activate the program, bind attributes, then upload uniforms
    fn setup(
        &self,
        device: &mut dyn GraphicsDevice,
        attributes: &[AttributeData],
        matrices: &DrawMatrices,
        lights: &[&Node],
    ) -> BackendResult<()> {
        let program = self.program();
        device.use_program(program)?;
        device.bind_attributes(program, attributes)?;
        self.apply_uniforms(device, matrices, lights)
    }

    /// Release attribute bindings
    fn deactivate(
        &self,
        device: &mut dyn GraphicsDevice,
        attributes: &[AttributeData],
    ) -> BackendResult<()> {
        device.unbind_attributes(self.program(), attributes)
    }
}

const FLAT_VERTEX_SHADER: &str = "\
attribute vec3 POSITION;
uniform mat4 u_mvMx;
uniform mat4 u_pMx;
void main() {
  gl_Position = u_pMx * u_mvMx * vec4(POSITION, 1.0);
}
";

const FLAT_FRAGMENT_SHADER: &str = "\
precision mediump float;
uniform vec4 u_color;
void main() {
  gl_FragColor = u_color;
}
";

/// Unlit single-colour material
#[derive(Debug, Clone)]
pub struct FlatColorMaterial {
    program: ProgramHandle,
    color: RgbaColor,
}

impl FlatColorMaterial {
    /// Create the material, compiling its program through `cache`
    pub fn new(
        cache: &mut ShaderCache,
        device: &mut dyn GraphicsDevice,
        color: RgbaColor,
    ) -> Result<Self, ShaderError> {
        let program = cache.program(device, FLAT_VERTEX_SHADER, FLAT_FRAGMENT_SHADER)?;
        Ok(Self { program, color })
    }

    /// Fill colour
    pub const fn color(&self) -> RgbaColor {
        self.color
    }
}

impl Material for FlatColorMaterial {
    fn program(&self) -> ProgramHandle {
        self.program
    }

    fn apply_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        _lights: &[&Node],
    ) -> BackendResult<()> {
        device.set_uniform(self.program, uniforms::MODEL_VIEW, Uniform::Mat4(matrices.model_view))?;
        device.set_uniform(self.program, uniforms::PROJECTION, Uniform::Mat4(matrices.projection))?;
        device.set_uniform(self.program, uniforms::COLOR, self.color.into())
    }
}

const FLAT_TEXTURE_VERTEX_SHADER: &str = "\
attribute vec3 POSITION;
attribute vec2 TEXCOORD_0;
uniform mat4 u_mvMx;
uniform mat4 u_pMx;
varying vec2 v_uv;
void main() {
  v_uv = TEXCOORD_0;
  gl_Position = u_pMx * u_mvMx * vec4(POSITION, 1.0);
}
";

const FLAT_TEXTURE_FRAGMENT_SHADER: &str = "\
precision mediump float;
uniform sampler2D u_tex;
varying vec2 v_uv;
void main() {
  gl_FragColor = texture2D(u_tex, v_uv);
}
";

/// Unlit material sampling a single colour texture
///
/// The texture is bound to sampler unit 0 for the duration of the draw.
#[derive(Debug, Clone)]
pub struct FlatTextureMaterial {
    program: ProgramHandle,
    texture: TextureHandle,
}

impl FlatTextureMaterial {
    const UNIT: u32 = 0;

    /// Create the material, compiling its program through `cache`
    pub fn new(
        cache: &mut ShaderCache,
        device: &mut dyn GraphicsDevice,
        texture: TextureHandle,
    ) -> Result<Self, ShaderError> {
        let program = cache.program(device, FLAT_TEXTURE_VERTEX_SHADER, FLAT_TEXTURE_FRAGMENT_SHADER)?;
        Ok(Self { program, texture })
    }

    /// Sampled texture
    pub const fn texture(&self) -> TextureHandle {
        self.texture
    }
}

impl Material for FlatTextureMaterial {
    fn program(&self) -> ProgramHandle {
        self.program
    }

    fn apply_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        _lights: &[&Node],
    ) -> BackendResult<()> {
        device.set_uniform(self.program, uniforms::MODEL_VIEW, Uniform::Mat4(matrices.model_view))?;
        device.set_uniform(self.program, uniforms::PROJECTION, Uniform::Mat4(matrices.projection))?;
        device.set_uniform(self.program, uniforms::TEXTURE, Uniform::Int(Self::UNIT as i32))?;
        device.bind_texture(Self::UNIT, self.texture)
    }

    fn deactivate(
        &self,
        device: &mut dyn GraphicsDevice,
        attributes: &[AttributeData],
    ) -> BackendResult<()> {
        device.unbind_texture(Self::UNIT)?;
        device.unbind_attributes(self.program, attributes)
    }
}

const PHONG_VERTEX_SHADER: &str = "\
attribute vec3 POSITION;
attribute vec3 NORMAL;
uniform mat4 u_mvMx;
uniform mat4 u_pMx;
uniform mat4 u_normMx;
varying vec3 v_pos;
varying vec3 v_norm;
void main() {
  vec4 viewPos = u_mvMx * vec4(POSITION, 1.0);
  v_pos = viewPos.xyz / viewPos.w;
  v_norm = vec3(u_normMx * vec4(NORMAL, 0.0));
  gl_Position = u_pMx * viewPos;
}
";

const PHONG_FRAGMENT_SHADER: &str = "\
precision mediump float;
uniform float u_ka;
uniform float u_kd;
uniform float u_ks;
uniform float u_shininess;
uniform vec3 u_ambientColor;
uniform vec3 u_diffuseColor;
uniform vec3 u_specularColor;
uniform vec3 u_lightPos;
varying vec3 v_pos;
varying vec3 v_norm;
void main() {
  vec3 n = normalize(v_norm);
  vec3 l = normalize(u_lightPos - v_pos);
  float lambert = max(dot(n, l), 0.0);
  vec3 r = reflect(-l, n);
  vec3 v = normalize(-v_pos);
  float spec = pow(max(dot(v, r), 0.0), u_shininess);
  gl_FragColor = vec4(u_ka * u_ambientColor
                    + u_kd * lambert * u_diffuseColor
                    + u_ks * spec * u_specularColor, 1.0);
}
";

/// Parameters of the Phong reflection model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongParams {
    /// Ambient colour
    pub ambient: RgbaColor,
    /// Diffuse colour
    pub diffuse: RgbaColor,
    /// Specular colour
    pub specular: RgbaColor,
    /// Ambient coefficient
    pub ka: f32,
    /// Diffuse coefficient
    pub kd: f32,
    /// Specular coefficient
    pub ks: f32,
    /// Specular exponent
    pub shininess: f32,
}

impl Default for PhongParams {
    fn default() -> Self {
        Self {
            ambient: RgbaColor::rgb(0.2, 0.2, 0.2),
            diffuse: RgbaColor::rgb(0.8, 0.8, 0.8),
            specular: RgbaColor::WHITE,
            ka: 1.0,
            kd: 1.0,
            ks: 1.0,
            shininess: 80.0,
        }
    }
}

/// Per-fragment Phong shading with constant colours
///
/// Lit by the first light in the scene only; further lights are ignored.
#[derive(Debug, Clone)]
pub struct PhongColorMaterial {
    program: ProgramHandle,
    params: PhongParams,
}

impl PhongColorMaterial {
    /// Create the material, compiling its program through `cache`
    pub fn new(
        cache: &mut ShaderCache,
        device: &mut dyn GraphicsDevice,
        params: PhongParams,
    ) -> Result<Self, ShaderError> {
        let program = cache.program(device, PHONG_VERTEX_SHADER, PHONG_FRAGMENT_SHADER)?;
        Ok(Self { program, params })
    }

    /// Shading parameters
    pub const fn params(&self) -> &PhongParams {
        &self.params
    }
}

const fn rgb(color: RgbaColor) -> Uniform {
    Uniform::Vec3(color.to_vec3())
}

impl Material for PhongColorMaterial {
    fn program(&self) -> ProgramHandle {
        self.program
    }

    fn apply_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        lights: &[&Node],
    ) -> BackendResult<()> {
        let p = &self.params;
        let program = self.program;

        device.set_uniform(program, uniforms::MODEL_VIEW, Uniform::Mat4(matrices.model_view))?;
        device.set_uniform(program, uniforms::PROJECTION, Uniform::Mat4(matrices.projection))?;
        device.set_uniform(program, uniforms::NORMAL, Uniform::Mat4(matrices.normal))?;
        device.set_uniform(program, uniforms::KA, Uniform::Float(p.ka))?;
        device.set_uniform(program, uniforms::KD, Uniform::Float(p.kd))?;
        device.set_uniform(program, uniforms::KS, Uniform::Float(p.ks))?;
        device.set_uniform(program, uniforms::SHININESS, Uniform::Float(p.shininess))?;
        device.set_uniform(program, uniforms::AMBIENT_COLOR, rgb(p.ambient))?;
        device.set_uniform(program, uniforms::DIFFUSE_COLOR, rgb(p.diffuse))?;
        device.set_uniform(program, uniforms::SPECULAR_COLOR, rgb(p.specular))?;

        // TODO: upload every light once the shader takes a light array.
        if let Some(light) = lights.first() {
            device.set_uniform(program, uniforms::LIGHT_POSITION, Uniform::Vec3(light.light_position()))?;
        }
        Ok(())
    }
}
