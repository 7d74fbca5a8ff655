use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phase of the quiz loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    GameStart,
    RoundStarting,
    RoundStarted,
    RoundWin,
    RoundTimeout,
    GameEnd,
    Explore,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::GameStart,
        Phase::RoundStarting,
        Phase::RoundStarted,
        Phase::RoundWin,
        Phase::RoundTimeout,
        Phase::GameEnd,
        Phase::Explore,
    ];

    /// Name used on the host's `state` input and output.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::GameStart => "GAME_START",
            Phase::RoundStarting => "ROUND_STARTING",
            Phase::RoundStarted => "ROUND_STARTED",
            Phase::RoundWin => "ROUND_WIN",
            Phase::RoundTimeout => "ROUND_TIMEOUT",
            Phase::GameEnd => "GAME_END",
            Phase::Explore => "EXPLORE",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase `{0}`")]
pub struct PhaseParseError(pub String);

impl FromStr for Phase {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PhaseParseError(s.to_string()))
    }
}
