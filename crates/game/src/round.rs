use foundation::Millis;
use layers::CountryId;

/// Counters for one game, owned by the round machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pub rounds_left: u32,
    pub correct: u32,
    pub target: Option<CountryId>,
    pub round_start: Option<Millis>,
}

impl RoundState {
    pub fn new(total: u32) -> Self {
        Self {
            rounds_left: total,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, total: u32) {
        *self = Self::new(total);
    }

    /// Starts the next round at `now`, consuming one from `rounds_left`.
    pub fn begin(&mut self, target: CountryId, now: Millis) {
        self.target = Some(target);
        self.round_start = Some(now);
        self.rounds_left = self.rounds_left.saturating_sub(1);
    }

    pub fn is_exhausted(&self) -> bool {
        self.rounds_left == 0
    }

    /// Milliseconds elapsed in the current round, if one is running.
    pub fn elapsed(&self, now: Millis) -> Option<u64> {
        self.round_start.map(|start| now.since(start))
    }
}
