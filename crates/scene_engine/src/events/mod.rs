//! Event dispatching
//!
//! - Handlers are registered against a handle obtained from the dispatcher
//! - Each registration carries a filter; only matching events are delivered
//! - Re-registering a handle replaces its previous handler
//! - Events are pulled from the input device once per frame

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::SlotMap;
use thiserror::Error;

use crate::platform::{DeviceState, Event, EventType, InputDevice};

slotmap::new_key_type! {
    /// Registration slot owned by one client
    pub struct HandlerHandle;
}

/// Dispatcher shared between the main loop and its clients
pub type SharedDispatcher = Rc<RefCell<EventDispatcher>>;

/// Event handler
///
/// Implemented for every `FnMut(&Event)` closure.
pub trait EventHandler {
    /// Handle an event
    fn on_event(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> EventHandler for F {
    fn on_event(&mut self, event: &Event) {
        self(event);
    }
}

/// Event dispatch errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Handle was destroyed or never created here
    #[error("Unknown event handler handle {0:?}")]
    UnknownHandle(HandlerHandle),

    /// Dispatcher is borrowed, e.g. from inside a handler
    #[error("Event dispatcher is busy")]
    DispatcherBusy,
}

#[derive(Default)]
struct Registration {
    handler: Option<Box<dyn EventHandler>>,
    filter: EventType,
}

/// Routes events from an input device to filtered handlers
#[derive(Default)]
pub struct EventDispatcher {
    device: Option<Box<dyn InputDevice>>,
    registrations: SlotMap<HandlerHandle, Registration>,
}

impl EventDispatcher {
    /// Create a dispatcher reading from `device`
    ///
    /// Without a device, [`EventDispatcher::process_events`] does nothing but
    /// [`EventDispatcher::dispatch_event`] still works.
    pub fn new(device: Option<Box<dyn InputDevice>>) -> Self {
        Self {
            device,
            registrations: SlotMap::with_key(),
        }
    }

    /// Wrap into a [`SharedDispatcher`]
    pub fn into_shared(self) -> SharedDispatcher {
        Rc::new(RefCell::new(self))
    }

    /// Allocate a handle with no handler
    pub fn create_handle(&mut self) -> HandlerHandle {
        self.registrations.insert(Registration::default())
    }

    /// Release a handle and its handler
    pub fn destroy_handle(&mut self, handle: HandlerHandle) -> Result<(), EventError> {
        self.registrations
            .remove(handle)
            .map(|_| ())
            .ok_or(EventError::UnknownHandle(handle))
    }

    /// Install `handler` for events matching `filter`, replacing any previous
    /// handler on this handle
    pub fn register_handler(
        &mut self,
        handle: HandlerHandle,
        handler: impl EventHandler + 'static,
        filter: EventType,
    ) -> Result<(), EventError> {
        let registration = self
            .registrations
            .get_mut(handle)
            .ok_or(EventError::UnknownHandle(handle))?;
        registration.handler = Some(Box::new(handler));
        registration.filter = filter;
        log::debug!("Registered event handler {:?} with filter {:?}", handle, filter);
        Ok(())
    }

    /// Remove the handler on `handle`, keeping the handle itself
    pub fn unregister_handler(&mut self, handle: HandlerHandle) -> Result<(), EventError> {
        let registration = self
            .registrations
            .get_mut(handle)
            .ok_or(EventError::UnknownHandle(handle))?;
        *registration = Registration::default();
        Ok(())
    }

    /// Number of live handles
    pub fn handle_count(&self) -> usize {
        self.registrations.len()
    }

    /// Input device, if any
    pub fn device(&self) -> Option<&dyn InputDevice> {
        self.device.as_deref()
    }

    /// Drain pending events from the input device and dispatch each one
    pub fn process_events(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if device.state() != DeviceState::Open {
            return;
        }

        device.poll();
        while device.state() == DeviceState::Open && device.pending() > 0 {
            let Some(event) = device.next_event() else {
                break;
            };
            Self::deliver(&mut self.registrations, &event);
        }
    }

    /// Deliver `event` to every handler whose filter matches
    pub fn dispatch_event(&mut self, event: &Event) {
        Self::deliver(&mut self.registrations, event);
    }

    fn deliver(registrations: &mut SlotMap<HandlerHandle, Registration>, event: &Event) {
        log::trace!("Dispatching {:?}", event);
        for registration in registrations.values_mut() {
            if !event.matches(registration.filter) {
                continue;
            }
            if let Some(handler) = registration.handler.as_mut() {
                handler.on_event(event);
            }
        }
    }
}
