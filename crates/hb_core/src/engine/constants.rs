//! Fixed simulation constants.

/// Simulation rate in ticks per second.
pub const TICK_RATE: u32 = 60;

/// Ticks the goal and end-of-game animations run for.
pub const ANIMATION_TICKS: i32 = 150;

pub mod spawn {
    /// Vertical spacing of the procedural spawn fallback.
    pub const FALLBACK_Y_STEP: f64 = 55.0;
}

pub mod kit {
    /// Player disc colors by team (RGBA).
    pub const RED: [u8; 4] = [229, 110, 86, 255];
    pub const BLUE: [u8; 4] = [86, 137, 229, 255];
    pub const NEUTRAL: [u8; 4] = [255, 255, 255, 255];
}
