//! Match recording: binary (msgpack) action streams and position streams.
//!
//! The action recording is the authoritative replay format: together with
//! the stadium and roster it reproduces a match bit for bit. The position
//! recording is a denormalized per-tick dump for external viewers.

mod position;
mod recorder;

pub use position::GamePositionRecorder;
pub use recorder::{GameActionRecorder, PlayerInfo};

use thiserror::Error;

use crate::types::PlayerAction;

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Input bits of one packed action byte.
pub mod input {
    pub const UP: u8 = 1;
    pub const DOWN: u8 = 2;
    pub const LEFT: u8 = 4;
    pub const RIGHT: u8 = 8;
    pub const SHOOT: u8 = 16;
}

/// Pack an action triple into one input byte.
pub fn encode_action(action: PlayerAction) -> u8 {
    let mut byte = 0;
    match action.dx {
        -1 => byte |= input::LEFT,
        1 => byte |= input::RIGHT,
        _ => {}
    }
    match action.dy {
        -1 => byte |= input::DOWN,
        1 => byte |= input::UP,
        _ => {}
    }
    if action.kick != 0 {
        byte |= input::SHOOT;
    }
    byte
}

/// Invert [`encode_action`].
pub fn decode_action(byte: u8) -> PlayerAction {
    let axis = |negative: u8, positive: u8| {
        if byte & negative != 0 {
            -1
        } else if byte & positive != 0 {
            1
        } else {
            0
        }
    };
    PlayerAction {
        dx: axis(input::LEFT, input::RIGHT),
        dy: axis(input::DOWN, input::UP),
        kick: i32::from(byte & input::SHOOT != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_byte_packing() {
        assert_eq!(encode_action(PlayerAction::new(0, 0, 0)), 0);
        assert_eq!(encode_action(PlayerAction::new(-1, 0, 0)), input::LEFT);
        assert_eq!(encode_action(PlayerAction::new(1, -1, 0)), input::RIGHT | input::DOWN);
        assert_eq!(
            encode_action(PlayerAction::new(1, 1, 1)),
            input::RIGHT | input::UP | input::SHOOT
        );
    }

    #[test]
    fn test_action_byte_round_trip() {
        for dx in -1..=1 {
            for dy in -1..=1 {
                for kick in 0..=1 {
                    let action = PlayerAction::new(dx, dy, kick);
                    assert_eq!(decode_action(encode_action(action)), action);
                }
            }
        }
    }
}
