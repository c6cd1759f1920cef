//! Simulation engine: integration, collision resolution, players, score and
//! the game orchestrator.

pub mod collision;
pub mod constants;
pub mod game;
pub mod physics;
pub mod player;
pub mod score;

pub use collision::resolve_collisions;
pub use game::{Game, GameConfig, GameState};
pub use physics::update_discs;
pub use player::PlayerHandler;
pub use score::GameScore;
