//! The boundary between the quiz and whatever renders it.
//!
//! A host exposes named scene objects as observable world transforms, a
//! string input through which an outside controller can force a phase, and
//! a sink for the named values the quiz publishes.

use std::collections::BTreeMap;

use runtime::{Observable, OutputBus, OutputSink, Signal};
use scene::components::Transform;

pub const CAMERA: &str = "Camera";
pub const EARTH: &str = "Earth";
pub const SUN: &str = "Sun";

pub trait Host {
    type Outputs: OutputSink;

    /// World transform of a scene object, if the scene has one by that name.
    fn object(&mut self, name: &str) -> Option<&mut dyn Observable<Transform>>;

    fn state_request(&mut self) -> &mut dyn Observable<String>;

    fn outputs(&mut self) -> &mut Self::Outputs;
}

/// In-process host used by the CLI and tests. Every input is a [`Signal`]
/// that can be set directly; outputs land in an [`OutputBus`].
pub struct SimulatedHost {
    objects: BTreeMap<String, Signal<Transform>>,
    state_request: Signal<String>,
    outputs: OutputBus,
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            state_request: Signal::new(String::new()),
            outputs: OutputBus::new(),
        }
    }

    /// Host with a camera, globe and sun, the objects the quiz needs.
    pub fn with_scene(camera: Transform, earth: Transform, sun: Transform) -> Self {
        let mut host = Self::new();
        host.insert_object(CAMERA, camera);
        host.insert_object(EARTH, earth);
        host.insert_object(SUN, sun);
        host
    }

    pub fn insert_object(&mut self, name: impl Into<String>, transform: Transform) {
        self.objects.insert(name.into(), Signal::new(transform));
    }

    pub fn transform(&self, name: &str) -> Option<Transform> {
        self.objects.get(name).map(|s| *s.get())
    }

    /// Moves an object. Returns `false` if there is no such object or the
    /// transform did not change.
    pub fn set_transform(&mut self, name: &str, transform: Transform) -> bool {
        match self.objects.get_mut(name) {
            Some(signal) => signal.set(transform),
            None => false,
        }
    }

    pub fn request_state(&mut self, name: impl Into<String>) -> bool {
        self.state_request.set(name.into())
    }

    pub fn bus(&self) -> &OutputBus {
        &self.outputs
    }

    pub fn into_bus(self) -> OutputBus {
        self.outputs
    }
}

impl Host for SimulatedHost {
    type Outputs = OutputBus;

    fn object(&mut self, name: &str) -> Option<&mut dyn Observable<Transform>> {
        self.objects
            .get_mut(name)
            .map(|s| s as &mut dyn Observable<Transform>)
    }

    fn state_request(&mut self) -> &mut dyn Observable<String> {
        &mut self.state_request
    }

    fn outputs(&mut self) -> &mut OutputBus {
        &mut self.outputs
    }
}
