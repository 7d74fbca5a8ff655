use serde::{Deserialize, Serialize};

use crate::phase::Phase;

/// Tunables for the quiz loop. Every field has a default so a partial
/// JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub total_rounds: u32,
    pub round_time_limit_ms: u64,
    pub win_delay_ms: u64,
    pub timeout_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub selection_throttle_ms: u64,
    pub initial_phase: Phase,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 3,
            round_time_limit_ms: 20_000,
            win_delay_ms: 2_000,
            timeout_delay_ms: 2_000,
            tick_interval_ms: 64,
            selection_throttle_ms: 166,
            initial_phase: Phase::GameStart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("total_rounds must be at least 1")]
    NoRounds,
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "tick_interval_ms",
            });
        }
        if self.round_time_limit_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "round_time_limit_ms",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GameConfig};
    use crate::phase::Phase;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{ "total_rounds": 5, "initial_phase": "EXPLORE" }"#)
                .unwrap();
        assert_eq!(
            cfg,
            GameConfig {
                total_rounds: 5,
                initial_phase: Phase::Explore,
                ..GameConfig::default()
            }
        );
        assert_eq!(cfg.round_time_limit_ms, 20_000);
        assert_eq!(cfg.selection_throttle_ms, 166);
        assert_eq!(GameConfig::default().initial_phase, Phase::GameStart);
    }

    #[test]
    fn zero_rounds_is_invalid() {
        let cfg = GameConfig {
            total_rounds: 0,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoRounds));
        assert!(GameConfig::default().validate().is_ok());
    }
}
