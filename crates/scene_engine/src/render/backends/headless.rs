//! Headless backend
//!
//! [`RecordingDevice`] validates and records every call instead of talking to
//! a GPU, and [`HeadlessContext`] pairs it with a
//! [`HeadlessDisplay`](crate::platform::headless::HeadlessDisplay). Used for
//! automated runs and tests.

use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::color::RgbaColor;
use crate::platform::headless::HeadlessDisplay;
use crate::platform::{DeviceState, DisplayDevice};
use crate::render::backend::{
    BackendResult, BufferHandle, BufferKind, DrawingContext, GraphicsDevice, ProgramHandle,
    RenderState, ShaderHandle, ShaderStage, TextureHandle, TextureWrap, Topology, Uniform,
};
use crate::render::mesh::AttributeData;
use crate::render::{RenderError, RenderResult, ShaderError};

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Fixed-function state applied
    SetRenderState(RenderState),
    /// Framebuffer cleared
    Clear(RgbaColor),
    /// Buffer created
    CreateBuffer {
        /// New buffer
        buffer: BufferHandle,
        /// Buffer contents kind
        kind: BufferKind,
        /// Size in bytes
        size: usize,
    },
    /// Stage compiled
    CompileShader {
        /// Stage kind
        stage: ShaderStage,
        /// New stage handle
        shader: ShaderHandle,
    },
    /// Program linked
    LinkProgram {
        /// New program
        program: ProgramHandle,
        /// Vertex stage
        vertex: ShaderHandle,
        /// Fragment stage
        fragment: ShaderHandle,
    },
    /// Program made current
    UseProgram(ProgramHandle),
    /// Uniform uploaded
    SetUniform {
        /// Target program
        program: ProgramHandle,
        /// Uniform name
        name: String,
        /// Value
        value: Uniform,
    },
    /// Attributes bound
    BindAttributes {
        /// Target program
        program: ProgramHandle,
        /// Attribute names in binding order
        names: Vec<String>,
    },
    /// Attributes released
    UnbindAttributes {
        /// Target program
        program: ProgramHandle,
    },
    /// Texture uploaded
    CreateTexture {
        /// New texture
        texture: TextureHandle,
        /// Width in texels
        width: u32,
        /// Height in texels
        height: u32,
        /// Wrap mode
        wrap: TextureWrap,
    },
    /// Texture bound to a sampler unit
    BindTexture {
        /// Sampler unit
        unit: u32,
        /// Bound texture
        texture: TextureHandle,
    },
    /// Sampler unit released
    UnbindTexture(u32),
    /// Non-indexed draw
    DrawArrays {
        /// Topology
        topology: Topology,
        /// First vertex
        first: u32,
        /// Vertex count
        count: u32,
    },
    /// Indexed draw
    DrawElements {
        /// Topology
        topology: Topology,
        /// Index count
        count: u32,
        /// Index buffer
        indices: BufferHandle,
    },
    /// Frame presented
    Present,
}

/// Graphics device that records calls for later inspection
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    next_handle: u64,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    shaders: HashMap<ShaderHandle, ShaderStage>,
    programs: HashMap<ProgramHandle, (ShaderHandle, ShaderHandle)>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    texture_units: HashMap<u32, TextureHandle>,
    current_program: Option<ProgramHandle>,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Every recorded command in call order
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drain the command log, keeping resources alive
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Contents of a buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Number of linked programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Size of a texture in texels
    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    /// Texture currently bound to `unit`
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.texture_units.get(&unit).copied()
    }

    /// Number of recorded draw calls
    pub fn draw_call_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::DrawArrays { .. } | DeviceCommand::DrawElements { .. }))
            .count()
    }

    /// Values uploaded to the uniform `name`, oldest first
    pub fn uniform_values(&self, name: &str) -> Vec<Uniform> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, command: DeviceCommand) {
        log::trace!("Device: {:?}", command);
        self.commands.push(command);
    }

    fn require_program(&self, program: ProgramHandle) -> BackendResult<()> {
        if self.programs.contains_key(&program) {
            Ok(())
        } else {
            Err(RenderError::Backend(format!("unknown program {program:?}")))
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn set_render_state(&mut self, state: &RenderState) -> BackendResult<()> {
        self.record(DeviceCommand::SetRenderState(*state));
        Ok(())
    }

    fn clear(&mut self, color: RgbaColor) -> BackendResult<()> {
        self.record(DeviceCommand::Clear(color));
        Ok(())
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle> {
        let buffer = BufferHandle(self.next_id());
        self.buffers.insert(buffer, data.to_vec());
        self.record(DeviceCommand::CreateBuffer {
            buffer,
            kind,
            size: data.len(),
        });
        Ok(buffer)
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, ShaderError> {
        if !source.contains("void main") {
            return Err(ShaderError::Compile {
                stage,
                log: "missing entry point 'main'".to_string(),
            });
        }
        let shader = ShaderHandle(self.next_id());
        self.shaders.insert(shader, stage);
        self.record(DeviceCommand::CompileShader { stage, shader });
        Ok(shader)
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError> {
        match (self.shaders.get(&vertex), self.shaders.get(&fragment)) {
            (Some(ShaderStage::Vertex), Some(ShaderStage::Fragment)) => {}
            stages => {
                return Err(ShaderError::Link {
                    log: format!("expected vertex + fragment stages, got {stages:?}"),
                })
            }
        }
        let program = ProgramHandle(self.next_id());
        self.programs.insert(program, (vertex, fragment));
        self.record(DeviceCommand::LinkProgram {
            program,
            vertex,
            fragment,
        });
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramHandle) -> BackendResult<()> {
        self.require_program(program)?;
        self.current_program = Some(program);
        self.record(DeviceCommand::UseProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: Uniform) -> BackendResult<()> {
        if self.current_program != Some(program) {
            return Err(RenderError::Backend(format!(
                "uniform '{name}' set on {program:?} while it is not in use"
            )));
        }
        self.record(DeviceCommand::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn bind_attributes(&mut self, program: ProgramHandle, attributes: &[AttributeData]) -> BackendResult<()> {
        self.require_program(program)?;
        if let Some(missing) = attributes.iter().find(|a| !self.buffers.contains_key(&a.buffer())) {
            return Err(RenderError::Backend(format!(
                "attribute '{}' refers to unknown buffer {:?}",
                missing.name(),
                missing.buffer()
            )));
        }
        self.record(DeviceCommand::BindAttributes {
            program,
            names: attributes.iter().map(|a| a.name().to_string()).collect(),
        });
        Ok(())
    }

    fn unbind_attributes(&mut self, program: ProgramHandle, _attributes: &[AttributeData]) -> BackendResult<()> {
        self.require_program(program)?;
        self.record(DeviceCommand::UnbindAttributes { program });
        Ok(())
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        wrap: TextureWrap,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(RenderError::Backend(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        let texture = TextureHandle(self.next_id());
        self.textures.insert(texture, (width, height));
        self.record(DeviceCommand::CreateTexture {
            texture,
            width,
            height,
            wrap,
        });
        Ok(texture)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> BackendResult<()> {
        if !self.textures.contains_key(&texture) {
            return Err(RenderError::Backend(format!("unknown texture {texture:?}")));
        }
        self.texture_units.insert(unit, texture);
        self.record(DeviceCommand::BindTexture { unit, texture });
        Ok(())
    }

    fn unbind_texture(&mut self, unit: u32) -> BackendResult<()> {
        self.texture_units.remove(&unit);
        self.record(DeviceCommand::UnbindTexture(unit));
        Ok(())
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) -> BackendResult<()> {
        self.record(DeviceCommand::DrawArrays {
            topology,
            first,
            count,
        });
        Ok(())
    }

    fn draw_elements(&mut self, topology: Topology, count: u32, indices: &AttributeData) -> BackendResult<()> {
        if !self.buffers.contains_key(&indices.buffer()) {
            return Err(RenderError::Backend(format!(
                "index buffer {:?} does not exist",
                indices.buffer()
            )));
        }
        self.record(DeviceCommand::DrawElements {
            topology,
            count,
            indices: indices.buffer(),
        });
        Ok(())
    }
}

/// Drawing context over a headless display and a [`RecordingDevice`]
#[derive(Debug)]
pub struct HeadlessContext {
    display: Rc<HeadlessDisplay>,
    device: RecordingDevice,
    active: bool,
    frames_presented: u64,
}

impl HeadlessContext {
    /// Bind a context to an open display
    pub fn new(display: Rc<HeadlessDisplay>) -> RenderResult<Self> {
        if display.state() != DeviceState::Open {
            log::error!("Cannot create a drawing context on a closed display");
            return Err(RenderError::InitializationFailed(
                "display device is closed".to_string(),
            ));
        }
        log::info!("Headless context created ({}x{})", display.width(), display.height());
        Ok(Self {
            display,
            device: RecordingDevice::new(),
            active: false,
            frames_presented: 0,
        })
    }

    /// Context on a fresh display of the given size
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            display: Rc::new(HeadlessDisplay::new(width, height)),
            device: RecordingDevice::new(),
            active: false,
            frames_presented: 0,
        }
    }

    /// Display this context presents to
    pub fn display(&self) -> &Rc<HeadlessDisplay> {
        &self.display
    }

    /// Recorded device state
    pub const fn recording(&self) -> &RecordingDevice {
        &self.device
    }

    /// Recorded device state, mutable
    pub fn recording_mut(&mut self) -> &mut RecordingDevice {
        &mut self.device
    }

    /// Frames presented so far
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl DrawingContext for HeadlessContext {
    fn is_device_open(&self) -> bool {
        self.display.state() == DeviceState::Open
    }

    fn activate(&mut self) -> BackendResult<()> {
        if !self.is_device_open() {
            return Err(RenderError::Backend("display device is closed".to_string()));
        }
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) -> BackendResult<()> {
        self.active = false;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn present(&mut self) -> BackendResult<()> {
        if !self.active {
            return Err(RenderError::Backend("present on an inactive context".to_string()));
        }
        self.device.record(DeviceCommand::Present);
        self.frames_presented += 1;
        self.display.frame_presented();
        Ok(())
    }

    fn device(&mut self) -> &mut dyn GraphicsDevice {
        &mut self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mesh::ComponentType;

    #[test]
    fn test_closed_display_is_rejected() {
        let display = Rc::new(HeadlessDisplay::new(4, 4));
        display.close();
        assert!(matches!(
            HeadlessContext::new(display),
            Err(RenderError::InitializationFailed(_))
        ));
    }

    #[test]
    fn test_upload_casts_vertex_data() {
        let mut device = RecordingDevice::new();
        let positions = [[0.0_f32, 1.0, 0.0], [-1.0, -1.0, 0.0], [1.0, -1.0, 0.0]];
        let attribute = AttributeData::upload(
            &mut device,
            BufferKind::Vertex,
            "POSITION",
            ComponentType::Float,
            3,
            &positions,
        )
        .unwrap();

        assert_eq!(attribute.count(), 3);
        let bytes = device.buffer_data(attribute.buffer()).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[4..8], &1.0_f32.to_ne_bytes());
    }

    #[test]
    fn test_program_validation() {
        let mut device = RecordingDevice::new();
        assert!(matches!(
            device.compile_shader(ShaderStage::Vertex, "garbage"),
            Err(ShaderError::Compile { stage: ShaderStage::Vertex, .. })
        ));

        let vs = device.compile_shader(ShaderStage::Vertex, "void main() {}").unwrap();
        let fs = device.compile_shader(ShaderStage::Fragment, "void main() {}").unwrap();
        assert!(matches!(device.link_program(fs, vs), Err(ShaderError::Link { .. })));

        let program = device.link_program(vs, fs).unwrap();
        assert!(device.set_uniform(program, "u", Uniform::Float(1.0)).is_err());
        device.use_program(program).unwrap();
        device.set_uniform(program, "u", Uniform::Float(1.0)).unwrap();
        assert_eq!(device.uniform_values("u"), vec![Uniform::Float(1.0)]);
    }

    #[test]
    fn test_texture_validation() {
        let mut device = RecordingDevice::new();
        assert!(device.create_texture(2, 2, TextureWrap::Repeat, &[0; 15]).is_err());
        assert!(device.create_texture(0, 2, TextureWrap::Repeat, &[]).is_err());
        assert!(device.bind_texture(0, TextureHandle(99)).is_err());

        let texture = device
            .create_texture(2, 2, TextureWrap::ClampToEdge, &[255; 16])
            .unwrap();
        assert_eq!(device.texture_size(texture), Some((2, 2)));

        device.bind_texture(1, texture).unwrap();
        assert_eq!(device.bound_texture(1), Some(texture));
        assert_eq!(device.bound_texture(0), None);
        device.unbind_texture(1).unwrap();
        assert_eq!(device.bound_texture(1), None);
    }

    #[test]
    fn test_present_requires_activation() {
        let mut context = HeadlessContext::open(8, 8);
        assert!(context.present().is_err());
        context.activate().unwrap();
        context.present().unwrap();
        assert_eq!(context.frames_presented(), 1);
        assert_eq!(context.recording().commands().last(), Some(&DeviceCommand::Present));
    }

    #[test]
    fn test_frame_budget_closes_display() {
        let display = Rc::new(HeadlessDisplay::new(8, 8).with_frame_budget(2));
        let mut context = HeadlessContext::new(Rc::clone(&display)).unwrap();
        context.activate().unwrap();
        context.present().unwrap();
        assert!(context.is_device_open());
        context.present().unwrap();
        assert!(!context.is_device_open());
    }
}
