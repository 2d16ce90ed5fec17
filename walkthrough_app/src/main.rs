//! Walk-through demo application
//!
//! Imports a procedural room and walks a first-person camera through it,
//! driven by a scripted input device on the headless backend. Reads
//! `walkthrough.toml` (or `.ron`) from the working directory when present.

mod importer;

use std::cell::RefCell;
use std::rc::Rc;

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use thiserror::Error;

use crate::importer::ProceduralImporter;

const CONFIG_PATH: &str = "walkthrough.toml";
const FRAME_BUDGET: u64 = 600;

#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Import error: {0}")]
    Asset(#[from] AssetError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Importer produced no scenes")]
    NoScene,

    #[error("Imported scene has no active camera")]
    NoCamera,
}

struct WalkthroughApp {
    config: EngineConfig,
    display: Rc<HeadlessDisplay>,
    context: SharedContext,
    renderer: Renderer,
}

impl WalkthroughApp {
    fn new(config: EngineConfig) -> Result<Self, AppError> {
        let display = Rc::new(
            HeadlessDisplay::from_config(&config.display).with_frame_budget(FRAME_BUDGET),
        );
        let context: SharedContext = Rc::new(RefCell::new(HeadlessContext::new(Rc::clone(&display))?));
        let renderer = Renderer::with_config(&config.renderer);
        log::info!(
            "Display '{}' opened at {}x{}",
            config.display.title,
            display.width(),
            display.height()
        );

        Ok(Self {
            config,
            display,
            context,
            renderer,
        })
    }

    /// Scripted tour: look around, walk to the cube, strafe past it, back off
    fn scripted_input(&self) -> ScriptedInput {
        let mut input = ScriptedInput::new(self.display.clone());

        // Settle the pointer, then turn a little to the left and down.
        input.push_batch([Event::TouchMove { button: None, x: 960, y: 540 }]);
        for step in 1..=10 {
            input.push_batch([Event::TouchMove {
                button: None,
                x: 960 - step * 5,
                y: 540 + step * 2,
            }]);
        }

        input.push_batch([Event::KeyPress(KeyCode::W)]);
        for _ in 0..40 {
            input.push_batch(Vec::new());
        }
        input.push_batch([Event::KeyRelease(KeyCode::W), Event::KeyPress(KeyCode::D)]);
        for _ in 0..20 {
            input.push_batch(Vec::new());
        }
        input.push_batch([Event::KeyRelease(KeyCode::D), Event::KeyPress(KeyCode::S)]);
        for _ in 0..10 {
            input.push_batch(Vec::new());
        }
        input.push_batch([Event::KeyRelease(KeyCode::S), Event::Close]);
        input
    }

    fn run(&mut self) -> Result<(), AppError> {
        let mut importer = ProceduralImporter::new(self.config.clone(), self.display.aspect_ratio());
        let mut scene = importer
            .import(&self.context)?
            .into_iter()
            .next()
            .ok_or(AppError::NoScene)?;
        let camera = scene.active_camera().ok_or(AppError::NoCamera)?;

        let dispatcher = EventDispatcher::new(Some(Box::new(self.scripted_input()))).into_shared();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, self.config.controller.clone())?;

        scene.activate()?;
        while self.display.state() == DeviceState::Open {
            dispatcher.borrow_mut().process_events();
            controller.process(&mut scene)?;
            self.renderer.render(&mut scene)?;
        }
        scene.deactivate()?;

        let position = scene.total_transform(camera)?.translation();
        log::info!(
            "Walk-through finished after {} frames, camera at ({:.2}, {:.2}, {:.2})",
            self.renderer.frame_count(),
            position.x,
            position.y,
            position.z
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(logging::LevelFilter::Info);
    log::info!("Starting walk-through demo");

    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    let mut app = WalkthroughApp::new(config)?;

    match app.run() {
        Ok(()) => {
            log::info!("Walk-through completed");
            Ok(())
        }
        Err(e) => {
            log::error!("Walk-through failed: {}", e);
            Err(e.into())
        }
    }
}
