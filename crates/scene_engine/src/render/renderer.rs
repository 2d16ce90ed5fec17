//! Scene renderer
//!
//! One [`Renderer::render`] call draws one frame:
//!
//! 1. skip quietly if the display has closed
//! 2. activate the scene's drawing context
//! 3. derive the view matrix from the active camera node and take its projection
//! 4. cache every light's view-space position on its node
//! 5. set render state, clear, then walk the graph from the root drawing meshes
//! 6. present

use crate::core::config::RendererConfig;
use crate::foundation::color::RgbaColor;
use crate::foundation::math::{Mat4, Mat4Ext, Vec4};
use crate::render::backend::{GraphicsDevice, RenderState};
use crate::render::material::DrawMatrices;
use crate::render::{RenderError, RenderResult};
use crate::scene::{Node, NodeId, Scene};

/// Draws scenes through their drawing context
#[derive(Debug, Clone)]
pub struct Renderer {
    background_color: RgbaColor,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frame_count: u64,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with a transparent black background
    pub fn new() -> Self {
        Self {
            background_color: RgbaColor::TRANSPARENT,
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            frame_count: 0,
        }
    }

    /// Create a renderer from configuration
    pub fn with_config(config: &RendererConfig) -> Self {
        let mut renderer = Self::new();
        renderer.set_background_color(config.background());
        renderer
    }

    /// Clear colour
    pub const fn background_color(&self) -> RgbaColor {
        self.background_color
    }

    /// Set the clear colour
    pub fn set_background_color(&mut self, color: RgbaColor) {
        self.background_color = color;
    }

    /// View matrix of the last rendered frame
    pub const fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix of the last rendered frame
    pub const fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Frames presented so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render one frame of `scene`
    ///
    /// Returns `Ok` without drawing when the display is closed.
    ///
    /// # Errors
    /// Fails when the drawing context is gone or busy, when the scene has no
    /// usable active camera, or when the device reports an error.
    pub fn render(&mut self, scene: &mut Scene) -> RenderResult<()> {
        let context = scene.drawing_context().ok_or_else(|| {
            log::error!("Scene '{}' has no drawing context", scene.name());
            RenderError::MissingDrawingContext
        })?;
        let mut context = context.try_borrow_mut().map_err(|_| RenderError::ContextBusy)?;

        if !context.is_device_open() {
            log::trace!("Display closed, skipping frame");
            return Ok(());
        }

        context.activate()?;

        let camera_id = scene.active_camera().ok_or_else(|| {
            log::error!("Scene '{}' has no active camera", scene.name());
            RenderError::NoActiveCamera
        })?;
        if !scene.contains(camera_id) {
            log::error!("Active camera node of scene '{}' no longer exists", scene.name());
            return Err(RenderError::NoActiveCamera);
        }
        self.view_matrix = scene.total_transform(camera_id)?.inverted();

        let camera = scene
            .node(camera_id)
            .and_then(Node::camera)
            .ok_or_else(|| {
                log::error!("Active camera node of scene '{}' has no camera", scene.name());
                RenderError::MissingCamera
            })?;
        self.projection_matrix = *camera.projection_matrix();

        let light_ids = scene.light_nodes();
        for id in &light_ids {
            let model_view = self.view_matrix * scene.total_transform(*id)?;
            let position = model_view * Vec4::new(0.0, 0.0, 0.0, 1.0);
            let position = position.xyz() / position.w;
            scene.node_mut(*id)?.set_light_position(position);
        }
        let lights: Vec<&Node> = light_ids.iter().filter_map(|id| scene.node(*id)).collect();

        let device = context.device();
        device.set_render_state(&RenderState::OPAQUE)?;
        device.clear(self.background_color)?;

        self.render_node(scene, scene.root(), &Mat4::identity(), &lights, device)?;

        context.present()?;
        self.frame_count += 1;
        log::trace!("Presented frame {}", self.frame_count);
        Ok(())
    }

    fn render_node(
        &self,
        scene: &Scene,
        id: NodeId,
        parent_transform: &Mat4,
        lights: &[&Node],
        device: &mut dyn GraphicsDevice,
    ) -> RenderResult<()> {
        let node = scene.node(id).ok_or_else(|| {
            log::error!("Traversal reached missing node {:?}", id);
            RenderError::NullNode(id)
        })?;
        let model = *parent_transform * *node.transform_matrix();

        if let Some(mesh) = node.mesh() {
            let matrices = DrawMatrices {
                model_view: self.view_matrix * model,
                projection: self.projection_matrix,
                normal: model.inverted().transpose(),
            };
            mesh.draw(device, &matrices, lights)?;
        }

        for child in node.children() {
            self.render_node(scene, *child, &model, lights, device)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;

    #[test]
    fn test_defaults() {
        let renderer = Renderer::default();
        assert_eq!(renderer.background_color(), RgbaColor::TRANSPARENT);
        assert_eq!(*renderer.view_matrix(), Mat4::identity());
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn test_background_from_config() {
        let config = EngineConfig::default().with_background(RgbaColor::BLACK);
        let renderer = Renderer::with_config(&config.renderer);
        assert_eq!(renderer.background_color(), RgbaColor::BLACK);
    }
}
