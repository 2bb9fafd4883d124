use std::{env, time::Duration};

const DEFAULT_DIFFICULTY: &str = "Beginner";
const DEFAULT_TICK_MILLIS: u64 = 1000;

/// Settings for a hosted session, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Preset name, checked when the session is built.
    pub difficulty: String,
    /// Seed for mine placement; `None` picks one at random.
    pub seed: Option<u64>,
    /// Period of the game clock. One tick is one game second.
    pub tick_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            seed: None,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
        }
    }
}

impl HostConfig {
    /// Reads `MINESWEEPER_DIFFICULTY`, `MINESWEEPER_SEED` and
    /// `MINESWEEPER_TICK_MILLIS`, falling back to the defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let difficulty = lookup("MINESWEEPER_DIFFICULTY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());

        let seed = lookup("MINESWEEPER_SEED").and_then(|value| value.trim().parse().ok());

        let tick_millis: u64 = lookup("MINESWEEPER_TICK_MILLIS")
            .and_then(|value| value.trim().parse().ok())
            .filter(|millis| *millis > 0)
            .unwrap_or(DEFAULT_TICK_MILLIS);

        Self {
            difficulty,
            seed,
            tick_interval: Duration::from_millis(tick_millis),
        }
    }
}
