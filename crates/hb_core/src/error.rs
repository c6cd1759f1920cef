use thiserror::Error;

/// Top-level error type for the game surface.
///
/// The simulation itself never fails mid-tick: malformed per-tick input is
/// clamped, not rejected. Everything that can go wrong happens at the edges
/// (loading a stadium, validating a config, saving a recording) or when the
/// caller hands `step` an action vector of the wrong shape.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("invalid stadium: {0}")]
    Stadium(#[from] crate::stadium::StadiumError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("recording error: {0}")]
    Recording(#[from] crate::replay::RecordingError),

    #[error("expected {expected} player actions, got {got}")]
    ActionShape { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, GameError>;
