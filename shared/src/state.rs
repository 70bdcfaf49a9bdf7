use crate::coin::Coin;
use crate::{OPTION_COUNT, STATE_VERSION};
use serde::{Deserialize, Serialize};

/// Screen the player is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Menu,
    Game,
    Rules,
    Leaderboard,
    Shop,
    GameOver,
}

impl Screen {
    /// Screens that only offer "new game" and "back to menu"
    pub fn is_info(&self) -> bool {
        matches!(self, Screen::Rules | Screen::Leaderboard | Screen::Shop)
    }
}

/// Everything the server needs to continue a session
///
/// The server never stores this: it is serialized into the response and the
/// client echoes it back with its next button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Schema version of the serialized blob
    pub version: u32,
    pub score: i64,
    pub lives: i64,
    /// The coins offered this round, in display order
    pub options: Vec<Coin>,
    pub combo: i64,
    /// Unix time in milliseconds when the current session started
    pub start_time: u64,
    pub game_over: bool,
    pub screen: Screen,
}

impl GameState {
    pub fn new(options: Vec<Coin>, lives: i64, start_time: u64) -> Self {
        Self {
            version: STATE_VERSION,
            score: 0,
            lives,
            options,
            combo: 1,
            start_time,
            game_over: false,
            screen: Screen::Menu,
        }
    }

    pub fn hazard_count(&self) -> usize {
        self.options.iter().filter(|coin| coin.is_hazard).count()
    }

    /// Checks the shape a well-behaved server would have produced. Values
    /// are not checked for plausibility, only for being representable.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.options.len() != OPTION_COUNT {
            return Err("wrong number of options");
        }
        if self.hazard_count() > 1 {
            return Err("more than one hazard offered");
        }
        if self.combo < 1 {
            return Err("combo below 1");
        }
        if self.lives < 0 {
            return Err("negative lives");
        }
        if self.score < 0 {
            return Err("negative score");
        }
        Ok(())
    }

    /// Whether the session has ended, either flagged or by running out of lives
    pub fn is_finished(&self) -> bool {
        self.game_over || self.lives <= 0
    }
}
