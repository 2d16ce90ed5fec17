//! Mesh data: vertex attributes, primitives and meshes
//!
//! A [`Mesh`] is a list of [`Primitive`]s, each pairing a set of vertex
//! attribute buffers with the material that draws them. Meshes are shared
//! between nodes through `Rc`.

use std::rc::Rc;

use crate::render::backend::{BackendResult, BufferHandle, BufferKind, GraphicsDevice, Topology};
use crate::render::material::{DrawMatrices, Material};
use crate::render::RenderError;
use crate::scene::Node;

/// Scalar type of one attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// `i8`
    Byte,
    /// `u8`
    UnsignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `u32`
    UnsignedInt,
    /// `f32`
    Float,
}

impl ComponentType {
    /// Size in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }
}

/// One vertex attribute (or index list) stored in a device buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeData {
    name: String,
    buffer: BufferHandle,
    component_type: ComponentType,
    components: u32,
    count: u32,
    normalized: bool,
    stride: u32,
    offset: u32,
}

impl AttributeData {
    /// Describe data already living in `buffer`
    ///
    /// `name` is the shader input the attribute binds to, `count` the number
    /// of elements of `components` values each.
    pub fn new(
        name: impl Into<String>,
        buffer: BufferHandle,
        component_type: ComponentType,
        components: u32,
        count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            buffer,
            component_type,
            components,
            count,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Upload `data` into a new device buffer and describe it
    pub fn upload<T: bytemuck::Pod>(
        device: &mut dyn GraphicsDevice,
        kind: BufferKind,
        name: impl Into<String>,
        component_type: ComponentType,
        components: u32,
        data: &[T],
    ) -> BackendResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let count = element_count(bytes.len(), component_type.size() * components as usize)?;
        let buffer = device.create_buffer(kind, bytes)?;
        Ok(Self::new(name, buffer, component_type, components, count))
    }

    /// Set interleaving stride and byte offset
    #[must_use]
    pub const fn with_layout(mut self, stride: u32, offset: u32) -> Self {
        self.stride = stride;
        self.offset = offset;
        self
    }

    /// Mark integer components as normalized to [0, 1] / [-1, 1]
    #[must_use]
    pub const fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Shader input name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing buffer
    pub const fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    /// Component scalar type
    pub const fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Components per element
    pub const fn components(&self) -> u32 {
        self.components
    }

    /// Number of elements
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Whether integer data is normalized
    pub const fn normalized(&self) -> bool {
        self.normalized
    }

    /// Bytes between consecutive elements, zero for tightly packed
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset of the first element
    pub const fn offset(&self) -> u32 {
        self.offset
    }
}

fn element_count(byte_len: usize, element_size: usize) -> BackendResult<u32> {
    if element_size == 0 {
        return Ok(0);
    }
    let count = byte_len / element_size;
    u32::try_from(count)
        .map_err(|_| RenderError::Backend(format!("Attribute has too many elements: {count}")))
}

/// Drawable unit: attributes, topology and the material that shades them
#[derive(Debug, Clone)]
pub struct Primitive {
    attributes: Vec<AttributeData>,
    topology: Topology,
    vertex_count: u32,
    material: Rc<dyn Material>,
    indices: Option<AttributeData>,
}

impl Primitive {
    /// Create a non-indexed primitive
    pub fn new(
        attributes: Vec<AttributeData>,
        topology: Topology,
        vertex_count: u32,
        material: Rc<dyn Material>,
    ) -> Self {
        Self {
            attributes,
            topology,
            vertex_count,
            material,
            indices: None,
        }
    }

    /// Draw through an index buffer instead of sequential vertices
    #[must_use]
    pub fn with_indices(mut self, indices: AttributeData) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Vertex attributes
    pub fn attributes(&self) -> &[AttributeData] {
        &self.attributes
    }

    /// Assembly topology
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Vertices drawn on the non-indexed path
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Material used to draw this primitive
    pub fn material(&self) -> &Rc<dyn Material> {
        &self.material
    }

    /// Index buffer, if any
    pub const fn indices(&self) -> Option<&AttributeData> {
        self.indices.as_ref()
    }

    /// Set up the material, issue the draw call and release the material
    pub fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        lights: &[&Node],
    ) -> BackendResult<()> {
        self.material.setup(device, &self.attributes, matrices, lights)?;
        match &self.indices {
            Some(indices) => device.draw_elements(self.topology, indices.count(), indices)?,
            None => device.draw_arrays(self.topology, 0, self.vertex_count)?,
        }
        self.material.deactivate(device, &self.attributes)
    }
}

/// Named list of primitives
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    name: String,
    primitives: Vec<Primitive>,
}

impl Mesh {
    /// Create a mesh
    pub fn new(name: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            primitives,
        }
    }

    /// Mesh name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All primitives
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Draw every primitive in order
    pub fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        matrices: &DrawMatrices,
        lights: &[&Node],
    ) -> BackendResult<()> {
        log::trace!("Drawing mesh '{}' ({} primitives)", self.name, self.primitives.len());
        for primitive in &self.primitives {
            primitive.draw(device, matrices, lights)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::color::RgbaColor;
    use crate::foundation::math::Mat4;
    use crate::render::backends::{DeviceCommand, RecordingDevice};
    use crate::render::material::FlatColorMaterial;
    use crate::render::shader_cache::ShaderCache;

    fn material(device: &mut RecordingDevice) -> Rc<dyn Material> {
        let mut cache = ShaderCache::new();
        Rc::new(FlatColorMaterial::new(&mut cache, device, RgbaColor::WHITE).unwrap())
    }

    fn matrices() -> DrawMatrices {
        DrawMatrices {
            model_view: Mat4::identity(),
            projection: Mat4::identity(),
            normal: Mat4::identity(),
        }
    }

    #[test]
    fn test_upload_counts_elements() {
        let mut device = RecordingDevice::new();
        let data: [f32; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

        let attribute =
            AttributeData::upload(&mut device, BufferKind::Vertex, "POSITION", ComponentType::Float, 3, &data)
                .unwrap();

        assert_eq!(attribute.count(), 2);
        assert_eq!(attribute.name(), "POSITION");
        assert_eq!(device.buffer_data(attribute.buffer()).map(<[u8]>::len), Some(24));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_element_count_overflow() {
        assert_eq!(element_count(24, 12).unwrap(), 2);
        assert_eq!(element_count(24, 0).unwrap(), 0);

        let too_many = (u32::MAX as usize + 1) * 4;
        assert!(matches!(element_count(too_many, 4), Err(RenderError::Backend(_))));
    }

    #[test]
    fn test_component_sizes() {
        assert_eq!(ComponentType::Byte.size(), 1);
        assert_eq!(ComponentType::UnsignedShort.size(), 2);
        assert_eq!(ComponentType::Float.size(), 4);
    }

    #[test]
    fn test_mesh_draws_each_primitive() {
        let mut device = RecordingDevice::new();
        let material = material(&mut device);
        let data: [f32; 9] = [0.0; 9];
        let position =
            AttributeData::upload(&mut device, BufferKind::Vertex, "POSITION", ComponentType::Float, 3, &data)
                .unwrap();
        let indices: [u32; 3] = [0, 1, 2];
        let index =
            AttributeData::upload(&mut device, BufferKind::Index, "indices", ComponentType::UnsignedInt, 1, &indices)
                .unwrap();

        let mesh = Mesh::new(
            "pair",
            vec![
                Primitive::new(vec![position.clone()], Topology::Lines, 2, Rc::clone(&material)),
                Primitive::new(vec![position], Topology::Triangles, 3, material).with_indices(index),
            ],
        );
        device.take_commands();

        mesh.draw(&mut device, &matrices(), &[]).unwrap();

        let draws: Vec<_> = device
            .commands()
            .iter()
            .filter(|c| matches!(c, DeviceCommand::DrawArrays { .. } | DeviceCommand::DrawElements { .. }))
            .cloned()
            .collect();
        assert_eq!(draws.len(), 2);
        assert!(matches!(draws[0], DeviceCommand::DrawArrays { topology: Topology::Lines, first: 0, count: 2 }));
        assert!(matches!(draws[1], DeviceCommand::DrawElements { topology: Topology::Triangles, count: 3, .. }));
    }

    #[test]
    fn test_unknown_buffer_fails_draw() {
        let mut device = RecordingDevice::new();
        let material = material(&mut device);
        let bogus = AttributeData::new("POSITION", BufferHandle(999), ComponentType::Float, 3, 3);
        let primitive = Primitive::new(vec![bogus], Topology::Triangles, 3, material);

        assert!(primitive.draw(&mut device, &matrices(), &[]).is_err());
        assert_eq!(device.draw_call_count(), 0);
    }
}
