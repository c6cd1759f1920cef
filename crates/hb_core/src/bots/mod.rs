//! Bot policies.
//!
//! A bot is anything that maps the observable game state to an action
//! triple. Bots are attached to players and polled through
//! [`Game::poll_actions`](crate::Game::poll_actions); they never mutate the
//! game.

use crate::engine::Game;
use crate::types::PlayerAction;

/// A policy producing one action triple per tick.
pub trait Bot {
    fn step(&mut self, game: &Game, player_index: usize) -> PlayerAction;
}

/// Always returns the same action. With `symmetric`, the horizontal axis is
/// mirrored so the same bot works from the right-hand side of the pitch.
#[derive(Debug, Clone)]
pub struct ConstantActionBot {
    action: PlayerAction,
    symmetry: bool,
}

impl ConstantActionBot {
    pub fn new(action: PlayerAction) -> Self {
        Self { action, symmetry: false }
    }

    pub fn symmetric(action: PlayerAction) -> Self {
        Self { action, symmetry: true }
    }
}

impl Bot for ConstantActionBot {
    fn step(&mut self, _game: &Game, _player_index: usize) -> PlayerAction {
        if self.symmetry {
            PlayerAction { dx: -self.action.dx, ..self.action }
        } else {
            self.action
        }
    }
}

/// Steers straight at the ball and kicks when in reach. Re-decides every
/// `tick_skip` ticks and repeats the previous action in between.
#[derive(Debug, Clone)]
pub struct ChaseBot {
    tick_skip: u32,
    cooldown: u32,
    last: PlayerAction,
}

/// Axis dead zone; below this the bot stops steering on that axis.
const CHASE_DEAD_ZONE: f64 = 2.0;

impl ChaseBot {
    pub fn new(tick_skip: u32) -> Self {
        Self { tick_skip, cooldown: 0, last: PlayerAction::default() }
    }
}

impl Bot for ChaseBot {
    fn step(&mut self, game: &Game, player_index: usize) -> PlayerAction {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return self.last;
        }
        self.cooldown = self.tick_skip;

        let Some(disc_index) = game.players()[player_index].disc_index() else {
            return PlayerAction::default();
        };
        let stadium = game.stadium();
        let me = &stadium.discs[disc_index];
        let ball = stadium.ball();

        let delta = ball.position - me.position;
        let axis = |value: f64| {
            if value > CHASE_DEAD_ZONE {
                1
            } else if value < -CHASE_DEAD_ZONE {
                -1
            } else {
                0
            }
        };
        let gap = delta.norm() - me.radius - ball.radius;
        let kick = i32::from(gap <= stadium.player_physics.kick_reach);

        self.last = PlayerAction { dx: axis(delta.x), dy: axis(delta.y), kick };
        self.last
    }
}
