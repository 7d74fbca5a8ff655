//! Deterministic replay of a scripted session against a virtual clock.
//!
//! Ticks are generated every `tick_interval_ms` between script events, the
//! way a host's interval timer would deliver them.

use std::fs;
use std::path::Path;

use foundation::Millis;
use foundation::math::{GeoCoordinate, Vec3};
use game::Phase;
use rand::Rng;
use runtime::{OutputBus, OutputValue};
use scene::components::Transform;
use scene::picking::Geolocator;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::effect::QuizEffect;
use crate::host::{CAMERA, EARTH, SUN, SimulatedHost};
use crate::settings::QuizSetup;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneSetup {
    pub camera: Transform,
    pub earth: Transform,
    pub sun: Transform,
}

impl Default for SceneSetup {
    fn default() -> Self {
        Self {
            camera: Transform::translate(Vec3::new(0.0, 0.0, 0.3)),
            earth: Transform::identity(),
            sun: Transform::identity(),
        }
    }
}

fn default_aim_distance() -> f64 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Extra tick outside the regular interval.
    Tick { at_ms: u64 },
    Camera { at_ms: u64, transform: Transform },
    /// Points the camera straight down at a coordinate on the globe.
    Aim {
        at_ms: u64,
        lon_deg: f64,
        lat_deg: f64,
        #[serde(default = "default_aim_distance")]
        distance: f64,
    },
    Earth { at_ms: u64, transform: Transform },
    Sun { at_ms: u64, transform: Transform },
    StateRequest { at_ms: u64, state: String },
}

impl ScriptEvent {
    pub fn at(&self) -> Millis {
        let at_ms = match self {
            ScriptEvent::Tick { at_ms }
            | ScriptEvent::Camera { at_ms, .. }
            | ScriptEvent::Aim { at_ms, .. }
            | ScriptEvent::Earth { at_ms, .. }
            | ScriptEvent::Sun { at_ms, .. }
            | ScriptEvent::StateRequest { at_ms, .. } => *at_ms,
        };
        Millis(at_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub scene: SceneSetup,
    pub events: Vec<ScriptEvent>,
    /// Keep ticking until this time after the last event.
    #[serde(default)]
    pub until_ms: Option<u64>,
}

impl Script {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }
}

pub struct ReplayReport {
    pub outputs: OutputBus,
    pub phase: Option<Phase>,
    pub ended_at: Millis,
}

impl ReplayReport {
    /// Latest value of every output, as JSON.
    pub fn latest_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in self.outputs.latest() {
            map.insert(name.to_string(), output_json(value));
        }
        json!({
            "phase": self.phase.map(|p| p.as_str()),
            "ended_at_ms": self.ended_at.as_u64(),
            "outputs": Value::Object(map),
        })
    }
}

pub fn output_json(value: &OutputValue) -> Value {
    match value {
        OutputValue::Scalar(v) => json!(v),
        OutputValue::Text(s) => json!(s),
        OutputValue::Bool(b) => json!(b),
        OutputValue::Vector(v) => json!([v.x, v.y, v.z]),
        OutputValue::Point2(p) => json!([p.x, p.y]),
    }
}

/// Runs `script` from time zero and returns everything the quiz published.
pub fn replay<R: Rng>(script: &Script, setup: QuizSetup<R>) -> ReplayReport {
    let interval = setup.config.tick_interval_ms.max(1);
    let locator = Geolocator::new(setup.globe);
    let scene = &script.scene;
    let mut host = SimulatedHost::with_scene(scene.camera, scene.earth, scene.sun);
    let mut effect = QuizEffect::initialize(&mut host, setup, Millis::ZERO);

    let mut events: Vec<&ScriptEvent> = script.events.iter().collect();
    events.sort_by_key(|e| e.at());

    let mut next_tick = Millis(interval);
    let mut run_ticks = |effect: &mut QuizEffect<R>, host: &mut SimulatedHost, until: Millis| {
        while next_tick <= until {
            effect.tick(next_tick, host);
            next_tick = next_tick.saturating_add(interval);
        }
    };

    let mut now = Millis::ZERO;
    for event in events {
        now = event.at();
        run_ticks(&mut effect, &mut host, now);
        debug!(?event, "replay event");
        match event {
            ScriptEvent::Tick { .. } => effect.tick(now, &mut host),
            ScriptEvent::Camera { transform, .. } => {
                host.set_transform(CAMERA, *transform);
            }
            ScriptEvent::Aim {
                lon_deg,
                lat_deg,
                distance,
                ..
            } => {
                let geo = GeoCoordinate::new(*lon_deg, *lat_deg);
                let camera = host
                    .transform(EARTH)
                    .and_then(|earth| locator.aim(&earth, geo, *distance));
                match camera {
                    Some(camera) => {
                        host.set_transform(CAMERA, camera);
                    }
                    None => warn!(%geo, "cannot aim camera"),
                }
            }
            ScriptEvent::Earth { transform, .. } => {
                host.set_transform(EARTH, *transform);
            }
            ScriptEvent::Sun { transform, .. } => {
                host.set_transform(SUN, *transform);
            }
            ScriptEvent::StateRequest { state, .. } => {
                host.request_state(state.clone());
            }
        }
        effect.pump(now, &mut host);
    }

    if let Some(until) = script.until_ms.map(Millis) {
        run_ticks(&mut effect, &mut host, until);
        now = now.max(until);
    }

    ReplayReport {
        phase: effect.phase(),
        outputs: host.into_bus(),
        ended_at: now,
    }
}
