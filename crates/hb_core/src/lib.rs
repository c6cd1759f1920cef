//! # hb_core - Deterministic Arcade Football Simulation Engine
//!
//! This library provides a deterministic, tick-driven rigid-body simulation
//! of a 2D top-down arcade football game (HaxBall-style): circular discs,
//! straight and curved boundary segments, half-space planes, point obstacles,
//! goal lines and a kickoff/playing/goal/end state machine.
//!
//! ## Features
//! - 100% deterministic simulation (same stadium + same inputs = same result)
//! - Declarative `.hbs` stadium descriptions with trait inheritance
//! - Single-pass impulse-based collision resolution
//! - Binary (msgpack) action replays that reproduce a match bit for bit
//!
//! The simulation is single-threaded and step-driven: the caller owns the
//! loop and feeds one action triple per player into [`Game::step`] at 60 Hz.

pub mod bots;
pub mod engine;
pub mod error;
pub mod replay;
pub mod stadium;
pub mod types;

// Re-export the public game surface
pub use engine::{Game, GameConfig, GameScore, GameState, PlayerHandler};
pub use error::{GameError, Result};
pub use stadium::{load_stadium_hbs, Stadium, StadiumError};
pub use types::{CollisionFlag, PlayerAction, Team, Vec2};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
