//! Shared simulation types: vectors, teams, input triples, collision masks.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use nalgebra::Vector2;

/// 2D vector used throughout the physics core.
///
/// `f64` everywhere: replays must be bit-identical across runs, so the whole
/// pipeline sticks to one precision and one evaluation order.
pub type Vec2 = Vector2<f64>;

/// 2D cross product (z component of the 3D cross).
#[inline]
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Team identifier. The integer codes are the replay wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Team {
    #[default]
    Spectator = 0,
    Red = 1,
    Blue = 2,
}

impl Team {
    /// Wire code used in replay player info and kickoff options.
    pub fn as_int(self) -> u8 {
        self as u8
    }

    /// Parse the stadium-file team tag ("red" / "blue").
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "red" => Some(Team::Red),
            "blue" => Some(Team::Blue),
            _ => None,
        }
    }
}

/// One player's per-tick input triple.
///
/// `dx`, `dy` are movement axes in {-1, 0, 1}; `kick` is {0, 1}. Values
/// outside those ranges are clamped when the action is handed to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerAction {
    pub dx: i32,
    pub dy: i32,
    pub kick: i32,
}

impl PlayerAction {
    pub fn new(dx: i32, dy: i32, kick: i32) -> Self {
        Self { dx, dy, kick }.clamped()
    }

    /// Normalize to the valid input range.
    pub fn clamped(self) -> Self {
        Self {
            dx: self.dx.clamp(-1, 1),
            dy: self.dy.clamp(-1, 1),
            kick: self.kick.clamp(0, 1),
        }
    }
}

impl From<[i32; 3]> for PlayerAction {
    fn from(triple: [i32; 3]) -> Self {
        Self::new(triple[0], triple[1], triple[2])
    }
}

/// Collision bitmask over the fixed flag set.
///
/// A contact between two bodies is admitted iff each side's group intersects
/// the other's mask: `(a.group & b.mask) != 0 && (b.group & a.mask) != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionFlag(pub u32);

impl CollisionFlag {
    pub const NONE: Self = Self(0);
    pub const BALL: Self = Self(1);
    pub const RED: Self = Self(2);
    pub const BLUE: Self = Self(4);
    pub const RED_KO: Self = Self(8);
    pub const BLUE_KO: Self = Self(16);
    pub const WALL: Self = Self(32);
    /// ball | red | blue | redKO | blueKO | wall
    pub const ALL: Self = Self(63);
    pub const KICK: Self = Self(64);
    pub const SCORE: Self = Self(128);
    pub const PLAYER: Self = Self(256);
    pub const C0: Self = Self(1 << 28);
    pub const C1: Self = Self(1 << 29);
    pub const C2: Self = Self(1 << 30);
    pub const C3: Self = Self(1 << 31);

    /// Everything a player disc collides with outside of kickoff.
    pub const PLAYER_COLLISION: Self =
        Self(Self::BALL.0 | Self::RED.0 | Self::BLUE.0 | Self::WALL.0 | Self::PLAYER.0);

    /// Parse a single stadium-file flag name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "ball" => Self::BALL,
            "red" => Self::RED,
            "blue" => Self::BLUE,
            "redKO" => Self::RED_KO,
            "blueKO" => Self::BLUE_KO,
            "wall" => Self::WALL,
            "all" => Self::ALL,
            "kick" => Self::KICK,
            "score" => Self::SCORE,
            "player" => Self::PLAYER,
            "c0" => Self::C0,
            "c1" => Self::C1,
            "c2" => Self::C2,
            "c3" => Self::C3,
            _ => return None,
        })
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CollisionFlag {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CollisionFlag {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
