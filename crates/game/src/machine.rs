//! The quiz loop.
//!
//! Phase changes are never applied inline. A request records the target
//! phase with a fresh generation and arms a timer; the phase is committed
//! when that timer fires and its generation still matches the pending one.
//! Entry actions run once at commit, and `ROUND_STARTED` additionally
//! watches the clock on every tick.
//!
//! The last coordinate handed to the machine is remembered across phases,
//! so entering `EXPLORE` or `ROUND_STARTED` evaluates the country already
//! under the cursor instead of waiting for the next move.
//!
//! All state lives in one `RoundMachine` value driven serially by the host:
//! ticks, throttled coordinates and external phase requests.

use foundation::Millis;
use foundation::math::GeoCoordinate;
use layers::{CountryFeature, CountryIndex, CountryResolver, Resolution};
use rand::Rng;
use runtime::{OutputSink, TimerId, TimerQueue};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::outputs;
use crate::phase::Phase;
use crate::round::RoundState;
use crate::summary::game_over_text;

/// A requested phase change, tagged with the generation it was issued in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub generation: u64,
}

#[derive(Debug, Copy, Clone)]
struct PendingTransition {
    transition: Transition,
    timer: TimerId,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Scheduled(Transition),
    /// The same phase is already waiting to be committed.
    AlreadyPending,
    /// The machine is already in that phase.
    AlreadyCommitted,
    /// The name did not parse; nothing changed.
    Rejected,
}

pub struct RoundMachine<R> {
    config: GameConfig,
    countries: CountryIndex,
    rng: R,
    phase: Phase,
    pending: Option<PendingTransition>,
    generation: u64,
    timers: TimerQueue<Transition>,
    round: RoundState,
    explore: CountryResolver,
    cursor: Option<GeoCoordinate>,
}

impl<R: Rng> RoundMachine<R> {
    pub fn new(config: GameConfig, countries: CountryIndex, rng: R) -> Self {
        let round = RoundState::new(config.total_rounds);
        Self {
            phase: config.initial_phase,
            config,
            countries,
            rng,
            pending: None,
            generation: 0,
            timers: TimerQueue::new(),
            round,
            explore: CountryResolver::new(),
            cursor: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_phase(&self) -> Option<Phase> {
        self.pending.map(|p| p.transition.phase)
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn countries(&self) -> &CountryIndex {
        &self.countries
    }

    pub fn target(&self) -> Option<&CountryFeature> {
        self.round.target.and_then(|id| self.countries.feature(id))
    }

    /// Earliest time a pending transition wants to be committed.
    pub fn next_wake(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// Publishes the initial outputs and enters the configured phase.
    pub fn start(&mut self, now: Millis, out: &mut impl OutputSink) {
        out.set_scalar(outputs::TOTAL, f64::from(self.config.total_rounds));
        out.set_scalar(outputs::CORRECT, f64::from(self.round.correct));
        self.phase = self.config.initial_phase;
        info!(phase = %self.phase, at = %now, "round machine started");
        out.set_text(outputs::STATE, self.phase.as_str());
        self.enter(now, out);
        self.advance(now, out);
    }

    /// Asks for `phase` to be committed `delay_ms` from `now`.
    ///
    /// Requesting the phase that is already pending or already committed is
    /// a no-op. Any other pending transition is superseded and its timer
    /// cancelled.
    pub fn request(&mut self, phase: Phase, delay_ms: u64, now: Millis) -> RequestOutcome {
        if self.pending_phase() == Some(phase) {
            return RequestOutcome::AlreadyPending;
        }
        if self.phase == phase {
            return RequestOutcome::AlreadyCommitted;
        }
        if let Some(old) = self.pending.take() {
            self.timers.cancel(old.timer);
            debug!(superseded = %old.transition.phase, by = %phase, "pending transition replaced");
        }
        self.generation += 1;
        let transition = Transition {
            phase,
            generation: self.generation,
        };
        let timer = self.timers.schedule_after(now, delay_ms, transition);
        self.pending = Some(PendingTransition { transition, timer });
        RequestOutcome::Scheduled(transition)
    }

    /// Handles a phase name coming from the host's state request input.
    pub fn request_named(
        &mut self,
        name: &str,
        now: Millis,
        out: &mut impl OutputSink,
    ) -> RequestOutcome {
        let phase = match name.parse::<Phase>() {
            Ok(p) => p,
            Err(err) => {
                warn!(requested = name, %err, "ignoring phase request");
                return RequestOutcome::Rejected;
            }
        };
        let outcome = self.request(phase, 0, now);
        self.advance(now, out);
        outcome
    }

    /// Commits every transition whose timer is due at `now`.
    pub fn advance(&mut self, now: Millis, out: &mut impl OutputSink) {
        while let Some((_, transition)) = self.timers.pop_due(now) {
            self.fire(transition, now, out);
        }
    }

    pub fn on_tick(&mut self, now: Millis, out: &mut impl OutputSink) {
        self.advance(now, out);
        if self.phase == Phase::RoundStarted && self.pending.is_none() {
            self.watch_clock(now, out);
        }
        self.advance(now, out);
    }

    /// Handles a (throttled) cursor coordinate. `None` means the cursor is
    /// off the globe.
    pub fn on_coordinate(
        &mut self,
        coord: Option<GeoCoordinate>,
        now: Millis,
        out: &mut impl OutputSink,
    ) {
        self.cursor = coord;
        match self.phase {
            Phase::RoundStarted => self.check_target(now, out),
            Phase::Explore => self.explore_cursor(out),
            _ => {}
        }
        self.advance(now, out);
    }

    /// Scores the round when the cursor is inside the target.
    ///
    /// `correct` only moves here, on a detected hit. A `ROUND_WIN` requested
    /// from outside commits the phase without scoring.
    fn check_target(&mut self, now: Millis, out: &mut impl OutputSink) {
        if self.pending.is_some() {
            return;
        }
        let hit = self
            .cursor
            .is_some_and(|p| self.target().is_some_and(|t| t.contains(p)));
        if hit {
            self.round.correct += 1;
            info!(correct = self.round.correct, "target found");
            out.set_scalar(outputs::CORRECT, f64::from(self.round.correct));
            out.set_bool(outputs::SELECTED, true);
            self.request(Phase::RoundWin, 0, now);
        }
    }

    fn explore_cursor(&mut self, out: &mut impl OutputSink) {
        let resolution = match self.cursor {
            Some(p) => self.explore.resolve(&self.countries, p),
            None => {
                self.explore.clear();
                Resolution::None
            }
        };
        self.publish_explore(resolution, out);
    }

    fn fire(&mut self, transition: Transition, now: Millis, out: &mut impl OutputSink) {
        match self.pending {
            Some(p) if p.transition == transition => {
                self.pending = None;
                self.commit(transition.phase, now, out);
            }
            _ => {
                debug!(
                    phase = %transition.phase,
                    generation = transition.generation,
                    "dropping stale transition"
                );
            }
        }
    }

    fn commit(&mut self, phase: Phase, now: Millis, out: &mut impl OutputSink) {
        if self.phase == Phase::Explore && phase != Phase::Explore {
            self.explore.clear();
        }
        info!(from = %self.phase, to = %phase, at = %now, "phase committed");
        self.phase = phase;
        out.set_text(outputs::STATE, phase.as_str());
        self.enter(now, out);
    }

    fn enter(&mut self, now: Millis, out: &mut impl OutputSink) {
        match self.phase {
            Phase::GameStart => {
                self.round.reset(self.config.total_rounds);
                out.set_scalar(outputs::CORRECT, 0.0);
                self.request(Phase::RoundStarting, 0, now);
            }
            Phase::RoundStarting => {
                if self.round.is_exhausted() {
                    self.request(Phase::GameEnd, 0, now);
                    return;
                }
                let target = self
                    .countries
                    .random_name(&mut self.rng)
                    .and_then(|name| self.countries.id_of(name));
                let Some(target) = target else {
                    warn!("no country to pick a target from");
                    self.request(Phase::GameEnd, 0, now);
                    return;
                };
                self.round.begin(target, now);
                let name = self.target().map(|f| f.name.clone()).unwrap_or_default();
                info!(target = %name, rounds_left = self.round.rounds_left, "round starting");
                out.set_text(outputs::TARGET_COUNTRY, name);
                out.set_bool(outputs::SELECTED, false);
                self.request(Phase::RoundStarted, 0, now);
            }
            Phase::RoundStarted => {
                self.watch_clock(now, out);
                self.check_target(now, out);
            }
            Phase::RoundWin => {
                self.request(Phase::RoundStarting, self.config.win_delay_ms, now);
            }
            Phase::RoundTimeout => {
                self.request(Phase::RoundStarting, self.config.timeout_delay_ms, now);
            }
            Phase::GameEnd => {
                let text = game_over_text(self.round.correct, self.config.total_rounds);
                info!(correct = self.round.correct, total = self.config.total_rounds, "game over");
                out.set_text(outputs::GAME_OVER_TEXT, text);
            }
            Phase::Explore => self.explore_cursor(out),
        }
    }

    fn watch_clock(&mut self, now: Millis, out: &mut impl OutputSink) {
        let limit = self.config.round_time_limit_ms;
        let Some(elapsed) = self.round.elapsed(now) else {
            return;
        };
        if elapsed > limit {
            out.set_text(outputs::SECONDS_REMAINING, "0");
            self.request(Phase::RoundTimeout, 0, now);
        } else {
            let seconds = (limit - elapsed) / 1000;
            out.set_text(outputs::SECONDS_REMAINING, seconds.to_string());
        }
    }

    fn publish_explore(&self, resolution: Resolution, out: &mut impl OutputSink) {
        let name = resolution
            .country()
            .and_then(|id| self.countries.feature(id))
            .map(|f| f.name.as_str());
        out.set_text(
            outputs::EXPLORE_COUNTRY,
            name.unwrap_or(outputs::SELECTED_NONE_TEXT),
        );
        out.set_bool(outputs::SELECTED, name.is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestOutcome, RoundMachine, Transition};
    use crate::config::GameConfig;
    use crate::outputs;
    use crate::phase::Phase;
    use foundation::Millis;
    use foundation::math::GeoCoordinate;
    use layers::{CountryFeature, CountryIndex};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use runtime::OutputBus;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn run<T>(&self, f: impl FnOnce() -> T) -> T {
            let writer = self.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn square(name: &str, lon: f64, lat: f64) -> CountryFeature {
        CountryFeature::new(
            name,
            vec![vec![vec![
                GeoCoordinate::new(lon, lat),
                GeoCoordinate::new(lon + 10.0, lat),
                GeoCoordinate::new(lon + 10.0, lat + 10.0),
                GeoCoordinate::new(lon, lat + 10.0),
            ]]],
        )
    }

    fn machine(initial: Phase) -> RoundMachine<StdRng> {
        let countries = CountryIndex::from_features(vec![
            square("Alpha", 0.0, 0.0),
            square("Bravo", 20.0, 0.0),
            square("Charlie", 40.0, 0.0),
        ])
        .unwrap();
        let config = GameConfig {
            initial_phase: initial,
            ..GameConfig::default()
        };
        RoundMachine::new(config, countries, StdRng::seed_from_u64(7))
    }

    fn target_center(m: &RoundMachine<StdRng>) -> GeoCoordinate {
        let b = m.target().and_then(|t| t.bounds()).unwrap();
        GeoCoordinate::new(
            (b.min.lon_deg + b.max.lon_deg) / 2.0,
            (b.min.lat_deg + b.max.lat_deg) / 2.0,
        )
    }

    fn states(bus: &OutputBus) -> Vec<String> {
        bus.values_of(outputs::STATE)
            .filter_map(|v| v.as_text())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn three_correct_rounds_end_with_perfect_score() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);

        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(m.round().rounds_left, 2);
        assert_eq!(states(&bus), ["GAME_START", "ROUND_STARTING", "ROUND_STARTED"]);
        assert_eq!(bus.scalar(outputs::TOTAL), Some(3.0));

        let hit = target_center(&m);
        m.on_coordinate(Some(hit), Millis(1_000), &mut bus);
        assert_eq!(m.phase(), Phase::RoundWin);
        assert_eq!(m.round().correct, 1);
        assert_eq!(m.pending_phase(), Some(Phase::RoundStarting));
        // Off the globe, so a repeated target has to be found again.
        m.on_coordinate(None, Millis(1_500), &mut bus);

        m.on_tick(Millis(2_999), &mut bus);
        assert_eq!(m.phase(), Phase::RoundWin);
        m.on_tick(Millis(3_000), &mut bus);
        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(m.round().rounds_left, 1);

        let hit = target_center(&m);
        m.on_coordinate(Some(hit), Millis(4_000), &mut bus);
        m.on_coordinate(None, Millis(4_500), &mut bus);
        m.on_tick(Millis(6_000), &mut bus);
        assert_eq!(m.round().rounds_left, 0);

        let hit = target_center(&m);
        m.on_coordinate(Some(hit), Millis(7_000), &mut bus);
        assert_eq!(m.round().correct, 3);
        m.on_tick(Millis(9_000), &mut bus);

        assert_eq!(m.phase(), Phase::GameEnd);
        assert_eq!(m.pending_phase(), None);
        assert_eq!(bus.scalar(outputs::CORRECT), Some(3.0));
        assert_eq!(
            bus.text(outputs::GAME_OVER_TEXT),
            Some("Wow! Great job!\nYou got them all!")
        );
        let tail: Vec<String> = states(&bus).into_iter().rev().take(3).collect();
        assert_eq!(tail, ["GAME_END", "ROUND_STARTING", "ROUND_WIN"]);
    }

    #[test]
    fn timeout_moves_on_without_scoring() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);

        m.on_tick(Millis(5_000), &mut bus);
        assert_eq!(bus.text(outputs::SECONDS_REMAINING), Some("15"));
        m.on_tick(Millis(20_000), &mut bus);
        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(bus.text(outputs::SECONDS_REMAINING), Some("0"));

        m.on_tick(Millis(20_001), &mut bus);
        assert_eq!(m.phase(), Phase::RoundTimeout);
        assert_eq!(bus.text(outputs::SECONDS_REMAINING), Some("0"));

        m.on_tick(Millis(22_000), &mut bus);
        assert_eq!(m.phase(), Phase::RoundTimeout);
        m.on_tick(Millis(22_001), &mut bus);
        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(m.round().rounds_left, 1);
        assert_eq!(m.round().correct, 0);
    }

    #[test]
    fn miss_outside_target_does_not_score() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        m.on_coordinate(Some(GeoCoordinate::new(-120.0, -60.0)), Millis(10), &mut bus);
        m.on_coordinate(None, Millis(20), &mut bus);
        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(m.round().correct, 0);
    }

    #[test]
    fn invalid_phase_request_changes_nothing() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        let hit = target_center(&m);
        m.on_coordinate(Some(hit), Millis(100), &mut bus);
        let before = (m.phase(), m.pending_phase(), m.round().clone());

        let outcome = m.request_named("NOT_A_STATE", Millis(200), &mut bus);

        assert_eq!(outcome, RequestOutcome::Rejected);
        assert_eq!((m.phase(), m.pending_phase(), m.round().clone()), before);
    }

    #[test]
    fn invalid_phase_request_is_logged() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);

        let logs = LogCapture::default();
        let outcome = logs.run(|| m.request_named("NOT_A_STATE", Millis(10), &mut bus));

        assert_eq!(outcome, RequestOutcome::Rejected);
        let text = logs.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("NOT_A_STATE"), "{text}");
    }

    #[test]
    fn start_does_not_log_a_transition() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();

        let logs = LogCapture::default();
        logs.run(|| m.start(Millis(0), &mut bus));

        let text = logs.text();
        assert!(text.contains("round machine started"), "{text}");
        assert!(!text.contains("phase committed"), "{text}");
        assert_eq!(states(&bus), ["EXPLORE"]);
    }

    #[test]
    fn repeated_requests_do_not_double_schedule() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);

        assert!(matches!(
            m.request(Phase::GameEnd, 500, Millis(0)),
            RequestOutcome::Scheduled(_)
        ));
        assert_eq!(
            m.request(Phase::GameEnd, 500, Millis(100)),
            RequestOutcome::AlreadyPending
        );
        assert_eq!(
            m.request(Phase::Explore, 0, Millis(100)),
            RequestOutcome::AlreadyCommitted
        );
        assert_eq!(m.next_wake(), Some(Millis(500)));
    }

    #[test]
    fn superseded_transition_never_commits() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        let hit = target_center(&m);
        m.on_coordinate(Some(hit), Millis(1_000), &mut bus);
        assert_eq!(m.pending_phase(), Some(Phase::RoundStarting));

        m.request_named("EXPLORE", Millis(1_500), &mut bus);
        assert_eq!(m.phase(), Phase::Explore);

        m.on_tick(Millis(3_000), &mut bus);
        assert_eq!(m.phase(), Phase::Explore);
        assert_eq!(m.next_wake(), None);
    }

    #[test]
    fn stale_timer_is_dropped() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        let RequestOutcome::Scheduled(live) = m.request(Phase::GameStart, 1_000, Millis(0)) else {
            panic!("expected a scheduled transition");
        };

        let stale = Transition {
            phase: Phase::GameEnd,
            generation: live.generation - 1,
        };
        m.fire(stale, Millis(10), &mut bus);

        assert_eq!(m.phase(), Phase::Explore);
        assert_eq!(m.pending_phase(), Some(Phase::GameStart));
    }

    #[test]
    fn explore_publishes_country_under_cursor() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("..."));

        m.on_coordinate(Some(GeoCoordinate::new(25.0, 5.0)), Millis(10), &mut bus);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("Bravo"));
        assert_eq!(bus.get(outputs::SELECTED).and_then(|v| v.as_bool()), Some(true));

        m.on_coordinate(Some(GeoCoordinate::new(15.0, 5.0)), Millis(20), &mut bus);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("..."));
        assert_eq!(bus.get(outputs::SELECTED).and_then(|v| v.as_bool()), Some(false));

        m.on_coordinate(Some(GeoCoordinate::new(5.0, 5.0)), Millis(30), &mut bus);
        m.on_coordinate(None, Millis(40), &mut bus);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("..."));
    }

    #[test]
    fn reentering_explore_shows_country_under_cursor() {
        let mut m = machine(Phase::Explore);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        m.on_coordinate(Some(GeoCoordinate::new(25.0, 5.0)), Millis(10), &mut bus);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("Bravo"));

        m.request_named("GAME_START", Millis(20), &mut bus);
        assert_ne!(m.phase(), Phase::Explore);
        m.request_named("EXPLORE", Millis(30), &mut bus);

        assert_eq!(m.phase(), Phase::Explore);
        assert_eq!(bus.text(outputs::EXPLORE_COUNTRY), Some("Bravo"));
        assert_eq!(bus.get(outputs::SELECTED).and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn round_scores_target_already_under_cursor() {
        let countries = CountryIndex::from_features(vec![square("Alpha", 0.0, 0.0)]).unwrap();
        let config = GameConfig {
            initial_phase: Phase::Explore,
            ..GameConfig::default()
        };
        let mut m = RoundMachine::new(config, countries, StdRng::seed_from_u64(1));
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        m.on_coordinate(Some(GeoCoordinate::new(5.0, 5.0)), Millis(10), &mut bus);

        m.request_named("GAME_START", Millis(20), &mut bus);

        assert_eq!(m.phase(), Phase::RoundWin);
        assert_eq!(m.round().correct, 1);
        assert_eq!(bus.scalar(outputs::CORRECT), Some(1.0));
    }

    #[test]
    fn game_can_restart_after_end() {
        let mut m = machine(Phase::GameStart);
        let mut bus = OutputBus::new();
        m.start(Millis(0), &mut bus);
        m.request_named("GAME_END", Millis(10), &mut bus);
        assert_eq!(m.phase(), Phase::GameEnd);
        assert_eq!(
            bus.text(outputs::GAME_OVER_TEXT),
            Some("Oops! You found none.\nBetter luck next time!")
        );

        m.request_named("GAME_START", Millis(20), &mut bus);
        assert_eq!(m.phase(), Phase::RoundStarted);
        assert_eq!(m.round().rounds_left, 2);
        assert_eq!(m.round().correct, 0);
    }
}
