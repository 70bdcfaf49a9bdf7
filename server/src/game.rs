//! Authoritative game rules
//!
//! [`GameEngine`] is a pure function of the incoming state, the pressed button,
//! the current time and a random source. It keeps no memory between calls: every
//! session lives in the [`GameState`] the client sends back.

use crate::config::GameConfig;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Coin, CoinCatalog, Frame, GameState, Screen, StateCodec, OPTION_COUNT};

const TITLE: &str = "Crypto Ninja";
const LIFE_GLYPH: &str = "❤️";
const HAZARD_MARKER: &str = "☠️";
const MAX_LIFE_GLYPHS: i64 = 10;

/// Values that survive from one round to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundCarry {
    pub score: i64,
    pub lives: i64,
    pub combo: i64,
    pub start_time: u64,
}

impl From<&GameState> for RoundCarry {
    fn from(state: &GameState) -> Self {
        Self {
            score: state.score,
            lives: state.lives,
            combo: state.combo,
            start_time: state.start_time,
        }
    }
}

pub struct GameEngine {
    config: GameConfig,
    catalog: CoinCatalog,
}

impl GameEngine {
    pub fn new(config: GameConfig, catalog: CoinCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CoinCatalog {
        &self.catalog
    }

    /// Deals the next three options, keeping score, lives, combo and the
    /// session clock from `carry`
    pub fn new_round<R: Rng + ?Sized>(&self, carry: RoundCarry, rng: &mut R) -> GameState {
        let mut regular: Vec<&Coin> = self.catalog.regular().collect();
        regular.shuffle(rng);

        let mut options: Vec<Coin> = regular
            .into_iter()
            .take(OPTION_COUNT)
            .cloned()
            .collect();

        if rng.gen::<f64>() < self.config.hazard_chance {
            options.pop();
            options.push(self.catalog.hazard().clone());
        }
        options.shuffle(rng);

        GameState {
            score: carry.score,
            combo: carry.combo,
            screen: Screen::Game,
            ..GameState::new(options, carry.lives, carry.start_time)
        }
    }

    /// A state for a player who has not started playing yet
    pub fn fresh_state<R: Rng + ?Sized>(&self, now: u64, rng: &mut R) -> GameState {
        GameState {
            screen: Screen::Menu,
            ..self.new_round(self.fresh_carry(now), rng)
        }
    }

    fn fresh_carry(&self, now: u64) -> RoundCarry {
        RoundCarry {
            score: 0,
            lives: self.config.starting_lives,
            combo: 1,
            start_time: now,
        }
    }

    fn start_game<R: Rng + ?Sized>(&self, now: u64, rng: &mut R) -> GameState {
        info!("Starting new game");
        self.new_round(self.fresh_carry(now), rng)
    }

    /// Milliseconds left in the session, saturating at zero. A start time in
    /// the future counts as no time elapsed.
    pub fn remaining_ms(&self, start_time: u64, now: u64) -> u64 {
        let elapsed = now.saturating_sub(start_time);
        self.config.round_duration_ms().saturating_sub(elapsed)
    }

    /// Decodes a client blob, falling back to a fresh menu state
    pub fn decode_state<R: Rng + ?Sized>(
        &self,
        raw: Option<&str>,
        now: u64,
        rng: &mut R,
    ) -> GameState {
        StateCodec::decode(raw, || self.fresh_state(now, rng))
    }

    /// Applies one button press (1-based) and renders the resulting screen
    pub fn handle_press<R: Rng + ?Sized>(
        &self,
        state: Option<GameState>,
        button_index: u8,
        now: u64,
        rng: &mut R,
    ) -> (GameState, Frame) {
        let state = match state {
            Some(state) => state,
            None => self.fresh_state(now, rng),
        };
        let from = state.screen;

        let next = match (from, button_index) {
            (Screen::Menu, 1) => self.start_game(now, rng),
            (Screen::Menu, 2) => Self::show(state, Screen::Rules),
            (Screen::Menu, 3) => Self::show(state, Screen::Leaderboard),
            (Screen::Menu, 4) => Self::show(state, Screen::Shop),

            (screen, 1) if screen.is_info() => self.start_game(now, rng),
            // A finished session stops at the leaderboard, it never reaches the menu
            (screen, 2) if screen.is_info() && state.is_finished() => self.fresh_state(now, rng),
            (screen, 2) if screen.is_info() => Self::show(state, Screen::Menu),

            (Screen::GameOver, 1) => self.start_game(now, rng),
            (Screen::GameOver, 2) => Self::show(state, Screen::Leaderboard),
            (Screen::GameOver, 3) => self.fresh_state(now, rng),

            (Screen::Game, _) => self.play(state, button_index, now, rng),

            _ => {
                debug!("Ignoring button {} on {:?}", button_index, from);
                state
            }
        };

        if next.screen != from {
            debug!("Screen {:?} -> {:?}", from, next.screen);
        }

        let frame = self.render(&next, now);
        (next, frame)
    }

    fn show(state: GameState, screen: Screen) -> GameState {
        GameState { screen, ..state }
    }

    fn end_game(state: GameState) -> GameState {
        info!("Game over with score {}", state.score);
        GameState {
            game_over: true,
            screen: Screen::GameOver,
            ..state
        }
    }

    fn play<R: Rng + ?Sized>(
        &self,
        state: GameState,
        button_index: u8,
        now: u64,
        rng: &mut R,
    ) -> GameState {
        // A finished session only ever re-renders its result
        if state.is_finished() {
            return Self::end_game(state);
        }

        if self.remaining_ms(state.start_time, now) == 0 {
            debug!("Session clock expired, ignoring button {}", button_index);
            return Self::end_game(state);
        }

        let picked = (button_index as usize)
            .checked_sub(1)
            .and_then(|index| state.options.get(index))
            .cloned();

        match picked {
            Some(coin) => self.resolve_pick(state, &coin, rng),
            None => {
                debug!("Ignoring button {} during play", button_index);
                state
            }
        }
    }

    fn resolve_pick<R: Rng + ?Sized>(
        &self,
        mut state: GameState,
        coin: &Coin,
        rng: &mut R,
    ) -> GameState {
        if coin.is_hazard {
            state.lives -= 1;
            state.combo = 1;
            state.score = state.score.saturating_add(coin.points).max(0);
            debug!("Sliced {}: lives now {}", coin.symbol, state.lives);
        } else {
            let gained = coin.points.saturating_mul(state.combo);
            state.score = state.score.saturating_add(gained);
            state.combo = state.combo.saturating_add(1);
            debug!("Sliced {} for {} points", coin.symbol, gained);
        }

        if state.lives <= 0 {
            return Self::end_game(state);
        }

        self.new_round(RoundCarry::from(&state), rng)
    }

    /// The frame shown before any state exists
    pub fn landing_frame(&self) -> Frame {
        Frame::new(
            self.config.images.welcome.as_str(),
            format!("⚔️ {}", TITLE),
            &["🎮 Start Game", "📜 Rules", "🏆 Leaderboard", "🛒 Shop"],
        )
    }

    /// Projects a state onto the frame the renderer expects
    pub fn render(&self, state: &GameState, now: u64) -> Frame {
        let images = &self.config.images;

        match state.screen {
            Screen::Menu => self.landing_frame(),
            Screen::Rules => Frame::new(
                images.welcome.as_str(),
                format!(
                    "📜 Slice coins for points, combos multiply. Avoid the {}! {} lives, {}s on the clock.",
                    self.catalog.hazard().name,
                    self.config.starting_lives,
                    self.config.round_duration.as_secs()
                ),
                &["🎮 Start Game", "⬅️ Menu"],
            ),
            Screen::Leaderboard => {
                let title = if state.game_over {
                    format!("🏆 Leaderboard coming soon. Your score: {}", state.score)
                } else {
                    "🏆 Leaderboard coming soon".to_string()
                };
                Frame::new(images.welcome.as_str(), title, &["🎮 Start Game", "⬅️ Menu"])
            }
            Screen::Shop => Frame::new(
                images.welcome.as_str(),
                "🛒 Shop coming soon",
                &["🎮 Start Game", "⬅️ Menu"],
            ),
            Screen::Game => {
                let lives = life_glyphs(state.lives);
                let remaining_secs = self
                    .remaining_ms(state.start_time, now)
                    .saturating_add(999)
                    / 1000;
                let title = format!(
                    "Score: {} | Lives: {} | Combo: x{} | ⏱ {}s",
                    state.score, lives, state.combo, remaining_secs
                );
                let labels: Vec<String> = state.options.iter().map(option_label).collect();
                let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
                Frame::new(images.game.as_str(), title, &labels)
            }
            Screen::GameOver => Frame::new(
                images.game_over.as_str(),
                format!("🎮 Game Over! Final Score: {}", state.score),
                &["🔄 Play Again", "🏆 Leaderboard", "🏠 Menu"],
            ),
        }
    }
}

fn life_glyphs(lives: i64) -> String {
    if lives > MAX_LIFE_GLYPHS {
        format!("{}x{}", LIFE_GLYPH, lives)
    } else {
        LIFE_GLYPH.repeat(lives.max(0) as usize)
    }
}

fn option_label(coin: &Coin) -> String {
    if coin.is_hazard {
        format!("{} {} ({})", coin.glyph, coin.name, HAZARD_MARKER)
    } else {
        format!("{} {} ({:+})", coin.glyph, coin.name, coin.points)
    }
}
