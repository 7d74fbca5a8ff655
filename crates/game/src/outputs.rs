//! Names of the values the quiz loop publishes to the host.

pub const STATE: &str = "state";
pub const TARGET_COUNTRY: &str = "targetCountry";
pub const SECONDS_REMAINING: &str = "sRemaining";
pub const CORRECT: &str = "nCorrect";
pub const TOTAL: &str = "nTotal";
pub const SELECTED: &str = "selected";
pub const EXPLORE_COUNTRY: &str = "exploreCountry";
pub const GAME_OVER_TEXT: &str = "gameOverText";

/// Shown in place of a country name when nothing is under the cursor.
pub const SELECTED_NONE_TEXT: &str = "...";
