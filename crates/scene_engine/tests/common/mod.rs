//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scene_engine::foundation::math::Mat4;
use scene_engine::render::backend::{BufferKind, Topology, Uniform};
use scene_engine::render::material::attributes;
use scene_engine::render::ComponentType;
use scene_engine::prelude::*;

/// Headless context kept both concretely (for inspection) and as a shared
/// drawing context (for scenes)
pub struct Fixture {
    pub headless: Rc<RefCell<HeadlessContext>>,
    pub context: SharedContext,
    pub cache: ShaderCache,
}

impl Fixture {
    pub fn new() -> Self {
        let headless = Rc::new(RefCell::new(HeadlessContext::open(640, 480)));
        let context: SharedContext = headless.clone();
        Self {
            headless,
            context,
            cache: ShaderCache::new(),
        }
    }

    pub fn scene(&self, name: &str) -> Scene {
        Scene::new(name, &self.context)
    }

    pub fn flat_material(&mut self, color: RgbaColor) -> Rc<dyn Material> {
        let mut headless = self.headless.borrow_mut();
        Rc::new(FlatColorMaterial::new(&mut self.cache, headless.recording_mut(), color).unwrap())
    }

    pub fn phong_material(&mut self) -> Rc<dyn Material> {
        let mut headless = self.headless.borrow_mut();
        Rc::new(
            PhongColorMaterial::new(&mut self.cache, headless.recording_mut(), PhongParams::default())
                .unwrap(),
        )
    }

    /// Single triangle with positions and normals
    pub fn triangle(&mut self, name: &str, material: Rc<dyn Material>) -> Rc<Mesh> {
        let positions: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];
        let normals: [f32; 9] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];

        let mut headless = self.headless.borrow_mut();
        let device = headless.recording_mut();
        let position = AttributeData::upload(
            device,
            BufferKind::Vertex,
            attributes::POSITION,
            ComponentType::Float,
            3,
            &positions,
        )
        .unwrap();
        let normal = AttributeData::upload(
            device,
            BufferKind::Vertex,
            attributes::NORMAL,
            ComponentType::Float,
            3,
            &normals,
        )
        .unwrap();

        let primitive = Primitive::new(vec![position, normal], Topology::Triangles, 3, material);
        Rc::new(Mesh::new(name, vec![primitive]))
    }

    pub fn perspective_camera(&self) -> Box<dyn Camera> {
        Box::new(PerspectiveCamera::new(
            640.0 / 480.0,
            std::f32::consts::FRAC_PI_4,
            0.1,
            100.0,
        ))
    }

    pub fn uniform_mats(&self, name: &str) -> Vec<Mat4> {
        self.headless
            .borrow()
            .recording()
            .uniform_values(name)
            .into_iter()
            .filter_map(|value| match value {
                Uniform::Mat4(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn uniform_vec3s(&self, name: &str) -> Vec<Vec3> {
        self.headless
            .borrow()
            .recording()
            .uniform_values(name)
            .into_iter()
            .filter_map(|value| match value {
                Uniform::Vec3(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn draw_calls(&self) -> usize {
        self.headless.borrow().recording().draw_call_count()
    }
}
