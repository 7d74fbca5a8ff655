//! Wiring between the host and the quiz.
//!
//! Host signals are forwarded into an inbox by their subscriptions and
//! handled on the next `pump` or `tick`, so the effect never runs inside a
//! host callback. A camera or globe move re-runs the geolocator; the
//! resulting coordinate goes through the selection throttle before it
//! reaches the round machine.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use foundation::Millis;
use foundation::math::{GeoCoordinate, Vec3, look_at_euler};
use game::{Phase, RoundMachine};
use rand::Rng;
use runtime::{
    Change, OutputSink, OutputValue, SubscriptionId, Throttle, TimerId, TimerQueue,
};
use scene::components::Transform;
use scene::picking::Geolocator;
use tracing::{debug, error, info};

use crate::error::{SetupError, error_chain};
use crate::host::{CAMERA, EARTH, Host, SUN};
use crate::settings::QuizSetup;
use crate::sun::publish_sun_matrix;

pub const P_WORLD: &str = "pWorld";
pub const P_MODEL: &str = "pModel";
pub const UV: &str = "uv";
pub const R_MODEL: &str = "rModel";

#[derive(Debug, Clone, PartialEq)]
enum HostEvent {
    Moved(&'static str, Transform),
    StateRequest(String),
}

type Inbox = Rc<RefCell<VecDeque<HostEvent>>>;

pub struct QuizEffect<R> {
    session: Option<Box<Session<R>>>,
}

struct Session<R> {
    machine: RoundMachine<R>,
    geolocator: Geolocator,
    camera: Transform,
    earth: Transform,
    inbox: Inbox,
    subscriptions: Vec<(&'static str, SubscriptionId)>,
    state_subscription: SubscriptionId,
    selection: Throttle<Option<GeoCoordinate>>,
    selection_wake: Option<TimerId>,
    wakes: TimerQueue<()>,
    last_geo: Option<Option<GeoCoordinate>>,
}

impl<R: Rng> QuizEffect<R> {
    /// Wires the quiz to `host`.
    ///
    /// Setup failures are logged and leave the effect uninitialized: every
    /// later call becomes a no-op and the host keeps running.
    pub fn initialize<H: Host>(host: &mut H, setup: QuizSetup<R>, now: Millis) -> Self {
        match Session::open(host, setup, now) {
            Ok(session) => {
                info!(phase = %session.machine.phase(), "quiz effect ready");
                Self {
                    session: Some(Box::new(session)),
                }
            }
            Err(err) => {
                error!(
                    error = %error_chain(&err),
                    backtrace = %Backtrace::capture(),
                    "quiz setup failed; running uninitialized"
                );
                Self { session: None }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.session.as_ref().map(|s| s.machine.phase())
    }

    pub fn machine(&self) -> Option<&RoundMachine<R>> {
        self.session.as_ref().map(|s| &s.machine)
    }

    /// Earliest time something is scheduled to happen without new input.
    pub fn next_wake(&self) -> Option<Millis> {
        let session = self.session.as_ref()?;
        match (session.machine.next_wake(), session.wakes.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handles host changes queued since the last call.
    pub fn pump<H: Host>(&mut self, now: Millis, host: &mut H) {
        if let Some(session) = self.session.as_mut() {
            session.pump(now, host.outputs());
        }
    }

    /// Periodic host tick.
    pub fn tick<H: Host>(&mut self, now: Millis, host: &mut H) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let out = host.outputs();
        session.pump(now, out);
        session.fire_wakes(now, out);
        session.machine.on_tick(now, out);
    }

    /// Detaches from the host's signals.
    pub fn shutdown<H: Host>(&mut self, host: &mut H) {
        let Some(session) = self.session.take() else {
            return;
        };
        for (name, id) in session.subscriptions {
            if let Some(object) = host.object(name) {
                object.unsubscribe(id);
            }
        }
        host.state_request().unsubscribe(session.state_subscription);
        debug!("quiz effect detached");
    }
}

impl<R: Rng> Session<R> {
    fn open<H: Host>(host: &mut H, setup: QuizSetup<R>, now: Millis) -> Result<Self, SetupError> {
        setup.config.validate()?;
        let countries = setup.atlas.load()?;

        let camera = snapshot(host, CAMERA)?;
        let earth = snapshot(host, EARTH)?;
        let sun = snapshot(host, SUN)?;

        let inbox: Inbox = Rc::default();
        let mut subscriptions = Vec::new();
        for name in [CAMERA, EARTH, SUN] {
            let object = host.object(name).ok_or(SetupError::MissingObject(name))?;
            let queue = Rc::clone(&inbox);
            let id = object.subscribe(Box::new(move |change: &Change<Transform>| {
                queue
                    .borrow_mut()
                    .push_back(HostEvent::Moved(name, change.new));
            }));
            subscriptions.push((name, id));
        }
        let queue = Rc::clone(&inbox);
        let state_subscription =
            host.state_request()
                .subscribe(Box::new(move |change: &Change<String>| {
                    queue
                        .borrow_mut()
                        .push_back(HostEvent::StateRequest(change.new.clone()));
                }));

        let selection = Throttle::new(setup.config.selection_throttle_ms);
        let mut session = Session {
            machine: RoundMachine::new(setup.config, countries, setup.rng),
            geolocator: Geolocator::new(setup.globe),
            camera,
            earth,
            inbox,
            subscriptions,
            state_subscription,
            selection,
            selection_wake: None,
            wakes: TimerQueue::new(),
            last_geo: None,
        };

        let out = host.outputs();
        publish_sun_matrix(&sun, out);
        session.machine.start(now, out);
        session.view_changed(now, out);
        Ok(session)
    }

    fn pump(&mut self, now: Millis, out: &mut impl OutputSink) {
        let events: Vec<HostEvent> = self.inbox.borrow_mut().drain(..).collect();
        let mut view_moved = false;
        for event in events {
            match event {
                HostEvent::Moved(CAMERA, t) => {
                    self.camera = t;
                    view_moved = true;
                }
                HostEvent::Moved(EARTH, t) => {
                    self.earth = t;
                    view_moved = true;
                }
                HostEvent::Moved(_, t) => publish_sun_matrix(&t, out),
                HostEvent::StateRequest(name) => {
                    self.machine.request_named(&name, now, out);
                }
            }
        }
        if view_moved {
            self.view_changed(now, out);
        }
    }

    /// Re-runs the geolocator and feeds the coordinate to the selection
    /// throttle when it changed.
    fn view_changed(&mut self, now: Millis, out: &mut impl OutputSink) {
        let hit = self.geolocator.pick(&self.camera, &self.earth);
        if let Some(hit) = hit {
            out.set_vector(P_WORLD, hit.world);
            out.set_vector(P_MODEL, hit.model);
            out.publish(UV, OutputValue::Point2(hit.uv));
            if let Some(rotation) = look_at_euler(hit.model, Vec3::ZERO) {
                out.set_vector(R_MODEL, rotation.as_vec3());
            }
        }

        let geo = hit.map(|h| h.geo);
        if self.last_geo == Some(geo) {
            return;
        }
        self.last_geo = Some(geo);

        match self.selection.call(now, geo) {
            Some(geo) => {
                self.disarm_selection_wake();
                self.machine.on_coordinate(geo, now, out);
            }
            None => self.arm_selection_wake(),
        }
    }

    fn arm_selection_wake(&mut self) {
        let Some(due) = self.selection.next_deadline() else {
            return;
        };
        if let Some(id) = self.selection_wake
            && self.wakes.is_pending(id)
            && self.wakes.next_due() == Some(due)
        {
            return;
        }
        self.disarm_selection_wake();
        self.selection_wake = Some(self.wakes.schedule(due, ()));
    }

    fn disarm_selection_wake(&mut self) {
        if let Some(id) = self.selection_wake.take() {
            self.wakes.cancel(id);
        }
    }

    fn fire_wakes(&mut self, now: Millis, out: &mut impl OutputSink) {
        while let Some((id, ())) = self.wakes.pop_due(now) {
            if self.selection_wake == Some(id) {
                self.selection_wake = None;
            }
            if let Some(geo) = self.selection.poll(now) {
                self.machine.on_coordinate(geo, now, out);
            }
        }
    }
}

fn snapshot<H: Host>(host: &mut H, name: &'static str) -> Result<Transform, SetupError> {
    host.object(name)
        .map(|object| *object.get())
        .ok_or(SetupError::MissingObject(name))
}
