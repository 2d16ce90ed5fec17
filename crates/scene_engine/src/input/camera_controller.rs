//! First-person camera controller
//!
//! W/S move along the camera's local Z axis, A/D strafe along local X, and
//! pointer motion turns the camera. Height is preserved while moving.

use std::cell::RefCell;
use std::f32::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use crate::core::config::ControllerConfig;
use crate::events::{EventError, HandlerHandle, SharedDispatcher};
use crate::foundation::math::{Mat4, Mat4Ext};
use crate::input::KeyCode;
use crate::platform::{Event, EventType};
use crate::scene::{NodeId, Scene, SceneResult};

/// Input accumulated between two `process` calls
#[derive(Debug, Default)]
struct ControllerInput {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    last_x: i32,
    last_y: i32,
    next_x: i32,
    next_y: i32,
    has_pointer: bool,
}

impl ControllerInput {
    fn handle(&mut self, event: &Event) {
        match *event {
            Event::KeyPress(key) => self.set_key(key, true),
            Event::KeyRelease(key) => self.set_key(key, false),
            Event::TouchMove { x, y, .. } => {
                if !self.has_pointer {
                    self.last_x = x;
                    self.last_y = y;
                    self.has_pointer = true;
                }
                self.next_x = x;
                self.next_y = y;
            }
            _ => {}
        }
    }

    fn set_key(&mut self, key: KeyCode, pressed: bool) {
        match key {
            KeyCode::W => self.forward = pressed,
            KeyCode::S => self.back = pressed,
            KeyCode::A => self.left = pressed,
            KeyCode::D => self.right = pressed,
            _ => {}
        }
    }

    /// Pointer delta since the previous call
    fn take_delta(&mut self) -> (i32, i32) {
        let delta = (self.next_x - self.last_x, self.next_y - self.last_y);
        self.last_x = self.next_x;
        self.last_y = self.next_y;
        delta
    }
}

/// Drives a camera node from key and pointer events
pub struct FpsCameraController {
    dispatcher: SharedDispatcher,
    handle: HandlerHandle,
    camera: NodeId,
    config: ControllerConfig,
    input: Rc<RefCell<ControllerInput>>,
    pitch: f32,
    yaw: f32,
}

impl FpsCameraController {
    /// Register with `dispatcher` to control `camera`
    ///
    /// # Errors
    /// Returns [`EventError::DispatcherBusy`] if the dispatcher is borrowed.
    pub fn new(
        dispatcher: &SharedDispatcher,
        camera: NodeId,
        config: ControllerConfig,
    ) -> Result<Self, EventError> {
        let input = Rc::new(RefCell::new(ControllerInput::default()));

        let handle = {
            let mut events = dispatcher
                .try_borrow_mut()
                .map_err(|_| EventError::DispatcherBusy)?;
            let handle = events.create_handle();
            let sink = Rc::clone(&input);
            events.register_handler(
                handle,
                move |event: &Event| sink.borrow_mut().handle(event),
                EventType::ALL_KEY | EventType::ALL_TOUCH,
            )?;
            handle
        };

        log::debug!("Camera controller attached to node {:?}", camera);
        Ok(Self {
            dispatcher: Rc::clone(dispatcher),
            handle,
            camera,
            config,
            input,
            pitch: 0.0,
            yaw: 0.0,
        })
    }

    /// Controlled camera node
    pub const fn camera(&self) -> NodeId {
        self.camera
    }

    /// Dispatcher handle the controller listens on
    pub const fn handle(&self) -> HandlerHandle {
        self.handle
    }

    /// Accumulated rotation about X, in radians
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Accumulated rotation about Y, in radians
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Apply the input gathered since the last call to the camera node
    ///
    /// The node's local matrix is rebuilt from the accumulated rotation and
    /// its previous translation, then moved in its own XZ plane.
    ///
    /// # Errors
    /// Returns [`SceneError::NodeNotFound`](crate::scene::SceneError) if the
    /// camera node has been removed.
    pub fn process(&mut self, scene: &mut Scene) -> SceneResult<()> {
        let node = scene.node_mut(self.camera)?;
        let translation = node.transform_matrix().translation();

        let mut input = self.input.borrow_mut();
        let (dx, dy) = input.take_delta();

        #[allow(clippy::cast_precision_loss)]
        let (yaw_delta, pitch_delta) = (
            dx as f32 / self.config.yaw_divisor * PI,
            dy as f32 / self.config.pitch_divisor * PI,
        );
        self.pitch = (self.pitch - pitch_delta).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.yaw -= yaw_delta;

        let mut transform = Mat4::identity();
        transform
            .rotate_x(self.pitch)
            .rotate_y(self.yaw)
            .translate(translation);

        let step = self.config.move_step;
        let mut move_z = 0.0;
        let mut move_x = 0.0;
        if input.forward {
            move_z -= step;
        }
        if input.back {
            move_z += step;
        }
        if input.left {
            move_x -= step;
        }
        if input.right {
            move_x += step;
        }
        transform.translate_local_xz(move_x, move_z);

        node.set_transform_matrix(transform);
        log::trace!("Camera moved to {:?}", transform.translation());
        Ok(())
    }
}

impl Drop for FpsCameraController {
    fn drop(&mut self) {
        match self.dispatcher.try_borrow_mut() {
            Ok(mut events) => {
                if let Err(e) = events.destroy_handle(self.handle) {
                    log::debug!("Controller handle already released: {}", e);
                }
            }
            Err(_) => log::warn!("Event dispatcher busy, leaking controller handle {:?}", self.handle),
        }
    }
}

impl std::fmt::Debug for FpsCameraController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FpsCameraController")
            .field("camera", &self.camera)
            .field("pitch", &self.pitch)
            .field("yaw", &self.yaw)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventDispatcher;
    use crate::foundation::math::Vec3;
    use crate::render::backends::HeadlessContext;
    use crate::render::backend::SharedContext;
    use crate::render::camera::PerspectiveCamera;
    use crate::scene::SceneError;
    use approx::assert_relative_eq;

    fn setup() -> (SharedContext, Scene, NodeId, SharedDispatcher) {
        let context: SharedContext = Rc::new(RefCell::new(HeadlessContext::open(64, 64)));
        let mut scene = Scene::new("controller", &context);
        let root = scene.root();
        let camera = scene
            .create_camera_node("camera", root, Box::new(PerspectiveCamera::new(1.0, FRAC_PI_2, 0.1, 100.0)))
            .unwrap();
        scene
            .node_mut(camera)
            .unwrap()
            .set_position(Vec3::new(1.0, 2.0, 3.0));
        let dispatcher = EventDispatcher::new(None).into_shared();
        (context, scene, camera, dispatcher)
    }

    #[test]
    fn test_idle_process_keeps_position() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();

        controller.process(&mut scene).unwrap();
        let transform = *scene.node(camera).unwrap().transform_matrix();
        assert_relative_eq!(transform, Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_forward_moves_along_negative_z() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();

        dispatcher.borrow_mut().dispatch_event(&Event::KeyPress(KeyCode::W));
        controller.process(&mut scene).unwrap();
        controller.process(&mut scene).unwrap();
        dispatcher.borrow_mut().dispatch_event(&Event::KeyRelease(KeyCode::W));
        controller.process(&mut scene).unwrap();

        let position = scene.node(camera).unwrap().transform_matrix().translation();
        assert_relative_eq!(position, Vec3::new(1.0, 2.0, 2.9), epsilon = 1e-5);
    }

    #[test]
    fn test_strafe_and_back() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();

        dispatcher.borrow_mut().dispatch_event(&Event::KeyPress(KeyCode::D));
        dispatcher.borrow_mut().dispatch_event(&Event::KeyPress(KeyCode::S));
        controller.process(&mut scene).unwrap();

        let position = scene.node(camera).unwrap().transform_matrix().translation();
        assert_relative_eq!(position, Vec3::new(1.05, 2.0, 3.05), epsilon = 1e-5);
    }

    #[test]
    fn test_first_pointer_sample_does_not_turn() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();

        dispatcher.borrow_mut().dispatch_event(&Event::TouchMove { button: None, x: 300, y: 200 });
        controller.process(&mut scene).unwrap();
        assert_relative_eq!(controller.yaw(), 0.0);
        assert_relative_eq!(controller.pitch(), 0.0);

        dispatcher.borrow_mut().dispatch_event(&Event::TouchMove { button: None, x: 400, y: 240 });
        controller.process(&mut scene).unwrap();
        assert_relative_eq!(controller.yaw(), -0.1 * PI, epsilon = 1e-6);
        assert_relative_eq!(controller.pitch(), -0.1 * PI, epsilon = 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();

        dispatcher.borrow_mut().dispatch_event(&Event::TouchMove { button: None, x: 0, y: 0 });
        dispatcher.borrow_mut().dispatch_event(&Event::TouchMove { button: None, x: 0, y: -4000 });
        controller.process(&mut scene).unwrap();
        assert_relative_eq!(controller.pitch(), FRAC_PI_2);

        let position = scene.node(camera).unwrap().transform_matrix().translation();
        assert_relative_eq!(position, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_drop_releases_handle() {
        let (_context, _scene, camera, dispatcher) = setup();
        let controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();
        assert_eq!(dispatcher.borrow().handle_count(), 1);
        drop(controller);
        assert_eq!(dispatcher.borrow().handle_count(), 0);
    }

    #[test]
    fn test_drop_after_handle_destroyed() {
        let (_context, _scene, camera, dispatcher) = setup();
        let controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();
        dispatcher.borrow_mut().destroy_handle(controller.handle()).unwrap();
        assert_eq!(dispatcher.borrow().handle_count(), 0);

        drop(controller);
        assert_eq!(dispatcher.borrow().handle_count(), 0);
    }

    #[test]
    fn test_missing_camera_node() {
        let (_context, mut scene, camera, dispatcher) = setup();
        let mut controller =
            FpsCameraController::new(&dispatcher, camera, ControllerConfig::default()).unwrap();
        scene.remove_node(camera).unwrap();
        assert_eq!(controller.process(&mut scene), Err(SceneError::NodeNotFound(camera)));
    }

    #[test]
    fn test_busy_dispatcher() {
        let (_context, _scene, camera, dispatcher) = setup();
        let _guard = dispatcher.borrow_mut();
        let result = FpsCameraController::new(&dispatcher, camera, ControllerConfig::default());
        assert!(matches!(result, Err(EventError::DispatcherBusy)));
    }
}
