//! Procedural scene source
//!
//! Builds a small room: a Phong-shaded cube on a flat-coloured floor, lit by
//! one point light and watched by a perspective camera.

use std::rc::Rc;

use scene_engine::prelude::*;
use scene_engine::render::backend::{BufferKind, Topology};
use scene_engine::render::material::attributes;
use scene_engine::render::ComponentType;

/// Cube faces as (normal, tangent u, tangent v)
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.0)),
    (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
    (Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
];

/// Imports the demo room
pub struct ProceduralImporter {
    config: EngineConfig,
    aspect_ratio: f32,
    shaders: ShaderCache,
}

impl ProceduralImporter {
    /// `aspect_ratio` comes from the display the scene will be shown on
    pub fn new(config: EngineConfig, aspect_ratio: f32) -> Self {
        Self {
            config,
            aspect_ratio,
            shaders: ShaderCache::new(),
        }
    }

    fn cube(device: &mut dyn GraphicsDevice, material: Rc<dyn Material>) -> Result<Mesh, AssetError> {
        let mut positions = Vec::with_capacity(24 * 3);
        let mut normals = Vec::with_capacity(24 * 3);
        let mut indices: Vec<u16> = Vec::with_capacity(36);

        for (face, (normal, u, v)) in CUBE_FACES.iter().enumerate() {
            let base = u16::try_from(face * 4).map_err(|e| AssetError::Import(e.to_string()))?;
            for (su, sv) in [(-1.0_f32, -1.0_f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = (normal + u * su + v * sv) * 0.5_f32;
                positions.extend_from_slice(corner.as_slice());
                normals.extend_from_slice(normal.as_slice());
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        let position = AttributeData::upload(
            device,
            BufferKind::Vertex,
            attributes::POSITION,
            ComponentType::Float,
            3,
            &positions,
        )?;
        let normal = AttributeData::upload(
            device,
            BufferKind::Vertex,
            attributes::NORMAL,
            ComponentType::Float,
            3,
            &normals,
        )?;
        let index = AttributeData::upload(
            device,
            BufferKind::Index,
            "indices",
            ComponentType::UnsignedShort,
            1,
            &indices,
        )?;

        let primitive = Primitive::new(vec![position, normal], Topology::Triangles, 24, material)
            .with_indices(index);
        Ok(Mesh::new("cube", vec![primitive]))
    }

    fn floor(device: &mut dyn GraphicsDevice, material: Rc<dyn Material>) -> Result<Mesh, AssetError> {
        let positions: [f32; 12] = [
            -5.0, 0.0, 5.0, //
            5.0, 0.0, 5.0, //
            -5.0, 0.0, -5.0, //
            5.0, 0.0, -5.0,
        ];
        let position = AttributeData::upload(
            device,
            BufferKind::Vertex,
            attributes::POSITION,
            ComponentType::Float,
            3,
            &positions,
        )?;
        let primitive = Primitive::new(vec![position], Topology::TriangleStrip, 4, material);
        Ok(Mesh::new("floor", vec![primitive]))
    }
}

impl SceneImporter for ProceduralImporter {
    fn import(&mut self, context: &SharedContext) -> Result<Vec<Scene>, AssetError> {
        let (cube, floor) = {
            let mut context = context
                .try_borrow_mut()
                .map_err(|_| AssetError::Render(RenderError::ContextBusy))?;
            let device = context.device();

            let phong: Rc<dyn Material> = Rc::new(PhongColorMaterial::new(
                &mut self.shaders,
                device,
                PhongParams {
                    diffuse: RgbaColor::rgb(0.8, 0.45, 0.2),
                    ..PhongParams::default()
                },
            ).map_err(RenderError::from)?);
            let flat: Rc<dyn Material> = Rc::new(
                FlatColorMaterial::new(&mut self.shaders, device, RgbaColor::rgb(0.3, 0.3, 0.35))
                    .map_err(RenderError::from)?,
            );

            (Self::cube(device, phong)?, Self::floor(device, flat)?)
        };

        let mut scene = Scene::new("room", context);
        let root = scene.root();

        let floor_node = scene.create_mesh_node("floor", root, Rc::new(floor))?;
        scene.node_mut(floor_node)?.set_position(Vec3::new(0.0, -0.5, 0.0));

        let cube_node = scene.create_mesh_node("cube", root, Rc::new(cube))?;
        scene
            .node_mut(cube_node)?
            .set_rotation_euler(Vec3::new(0.0, std::f32::consts::FRAC_PI_4, 0.0));

        let light = scene.create_light_node("light", root, Light::point())?;
        scene.node_mut(light)?.set_position(Vec3::new(0.0, 2.0, 1.0));

        let camera = PerspectiveCamera::from_config(&self.config.camera, self.aspect_ratio);
        let camera = scene.create_camera_node("camera", root, Box::new(camera))?;
        scene.node_mut(camera)?.set_position(Vec3::new(0.0, 0.0, 3.0));
        scene.set_active_camera(camera)?;

        log::info!("Imported scene '{}' with {} nodes", scene.name(), scene.node_count());
        Ok(vec![scene])
    }
}
