//! Score and clock accounting.

use super::constants::{ANIMATION_TICKS, TICK_RATE};
use super::game::GameState;
use crate::types::Team;

/// Goals, elapsed ticks, limits and the goal/end animation countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameScore {
    pub red: u32,
    pub blue: u32,
    /// Ticks elapsed in KICKOFF and PLAYING states.
    pub ticks: u64,
    /// Minutes; 0 = unlimited.
    pub time_limit: u32,
    /// Goals; 0 = unlimited.
    pub score_limit: u32,
    pub animation_timeout: i32,
}

impl Default for GameScore {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl GameScore {
    pub fn new(time_limit: u32, score_limit: u32) -> Self {
        Self { red: 0, blue: 0, ticks: 0, time_limit, score_limit, animation_timeout: 0 }
    }

    /// Elapsed game time in seconds.
    pub fn time(&self) -> f64 {
        self.ticks as f64 / TICK_RATE as f64
    }

    /// Advance the clock. Only live states count.
    pub(crate) fn step(&mut self, state: GameState) {
        if matches!(state, GameState::Kickoff | GameState::Playing) {
            self.ticks += 1;
        }
    }

    /// Register a goal for `team` and start the goal animation.
    pub(crate) fn update_score(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
            Team::Spectator => {}
        }
        self.animation_timeout = ANIMATION_TICKS;
    }

    /// Start the end-of-game animation.
    pub(crate) fn end_animation(&mut self) {
        self.animation_timeout = ANIMATION_TICKS;
    }

    pub fn is_animation(&self) -> bool {
        self.animation_timeout > 0
    }

    /// Whether a limit has been reached: the score limit by either team, or
    /// the time limit while one team leads.
    pub fn is_game_over(&self) -> bool {
        if self.score_limit > 0 && (self.red >= self.score_limit || self.blue >= self.score_limit)
        {
            return true;
        }
        self.time_limit > 0
            && self.time() >= (self.time_limit * 60) as f64
            && self.red != self.blue
    }

    /// Reset counters, keep the configured limits.
    pub(crate) fn stop(&mut self) {
        self.red = 0;
        self.blue = 0;
        self.ticks = 0;
        self.animation_timeout = 0;
    }
}
