//! Tunable game rules and presentation assets

use shared::{HAZARD_CHANCE, ROUND_DURATION_SECS, STARTING_LIVES};
use std::time::Duration;

const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1593397899681-12c47155d9b8?q=80&w=1200&h=630&fit=crop";

/// Image URLs handed to the renderer with each frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSet {
    pub welcome: String,
    pub game: String,
    pub game_over: String,
}

impl Default for ImageSet {
    fn default() -> Self {
        Self {
            welcome: DEFAULT_IMAGE.to_string(),
            game: DEFAULT_IMAGE.to_string(),
            game_over: DEFAULT_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Time allowed for a whole session, measured from game start
    pub round_duration: Duration,
    pub starting_lives: i64,
    /// Probability that a round offers the hazard coin
    pub hazard_chance: f64,
    pub images: ImageSet,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_duration: Duration::from_secs(ROUND_DURATION_SECS),
            starting_lives: STARTING_LIVES,
            hazard_chance: HAZARD_CHANCE,
            images: ImageSet::default(),
        }
    }
}

impl GameConfig {
    pub fn round_duration_ms(&self) -> u64 {
        self.round_duration.as_millis().min(u64::MAX as u128) as u64
    }
}

/// Parses a probability in `[0, 1]`; used for the `--hazard-chance` flag
pub fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|e| format!("`{}` is not a number: {}", raw, e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside 0.0..=1.0", value))
    }
}
