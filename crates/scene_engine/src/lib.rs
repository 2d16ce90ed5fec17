//! # Scene Engine
//!
//! A small real-time 3D scene-graph engine.
//!
//! ## Features
//!
//! - **Scene Graph**: Hierarchical nodes with TRS transforms, cameras, lights and meshes
//! - **Renderer**: View/projection derivation and depth-first mesh drawing
//! - **Materials**: Flat colour and Phong shading with a shared shader cache
//! - **Events**: Bitmask-filtered event dispatch from pluggable input devices
//! - **Camera Control**: First-person walk-through controller
//! - **Headless Backend**: Recording graphics device for tests and tooling
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context: SharedContext = Rc::new(RefCell::new(HeadlessContext::open(640, 480)));
//!     let mut scene = Scene::new("demo", &context);
//!
//!     let camera = PerspectiveCamera::new(640.0 / 480.0, std::f32::consts::FRAC_PI_4, 0.1, 100.0);
//!     let camera_node = scene.create_camera_node("camera", scene.root(), Box::new(camera))?;
//!     scene.node_mut(camera_node)?.set_position(Vec3::new(0.0, 0.0, 5.0));
//!     scene.set_active_camera(camera_node)?;
//!
//!     let mut renderer = Renderer::new();
//!     renderer.render(&mut scene)?;
//!     assert_eq!(renderer.frame_count(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod core;
pub mod events;
pub mod foundation;
pub mod input;
pub mod platform;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, SceneImporter},
        config::{Config, ConfigError, ConfigFormat},
        core::config::{
            CameraConfig, ControllerConfig, DisplayConfig, EngineConfig, RendererConfig,
        },
        events::{EventDispatcher, EventError, EventHandler, HandlerHandle, SharedDispatcher},
        foundation::{
            color::RgbaColor,
            math::{Mat4, Mat4Ext, Point3, Quat, Vec3, Vec4},
        },
        input::{FpsCameraController, KeyCode, TouchButton},
        platform::{
            headless::{HeadlessDisplay, ScriptedInput},
            DeviceState, DisplayDevice, Event, EventType, InputDevice,
        },
        render::{
            backends::HeadlessContext, AttributeData, Camera, DrawingContext, FlatColorMaterial,
            FlatTextureMaterial, GraphicsDevice, Light, LightType, Material, Mesh,
            PerspectiveCamera, PhongColorMaterial, PhongParams, Primitive, RenderError, Renderer,
            ShaderCache, SharedContext, TextureHandle, TextureWrap,
        },
        scene::{Node, NodeId, NodeType, Scene, SceneError},
    };
}
