//! Light sources attached to light nodes

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    /// Emits in all directions from the node's position
    #[default]
    Point,
    /// Parallel rays along the node's orientation
    Directional,
    /// Cone of light from the node's position
    Spot,
}

/// Light description
///
/// Placement comes from the owning node. Materials read the view-space
/// position the renderer caches on that node each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Light {
    light_type: LightType,
}

impl Light {
    /// Light of the given kind
    pub const fn new(light_type: LightType) -> Self {
        Self { light_type }
    }

    /// Point light
    pub const fn point() -> Self {
        Self::new(LightType::Point)
    }

    /// Kind of light
    pub const fn light_type(&self) -> LightType {
        self.light_type
    }
}
