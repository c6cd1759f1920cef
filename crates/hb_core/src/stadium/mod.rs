//! Stadium data model and `.hbs` loader.
//!
//! This module contains:
//! - The resolved physics entities (Disc, Segment, Plane, Vertex, Goal)
//! - The Stadium container (discs[0] is always the ball)
//! - Trait/default resolution of declarative stadium descriptions
//! - The embedded "Classic" stadium

mod raw;

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{CollisionFlag, Team, Vec2};

#[derive(Error, Debug)]
pub enum StadiumError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown ball value {name:?}")]
    UnknownBall { name: String },

    #[error("segment references vertex {index} but only {count} exist")]
    InvalidVertexIndex { index: usize, count: usize },

    #[error("unknown collision flag {name:?}")]
    UnknownCollisionFlag { name: String },

    #[error("unknown team {name:?}")]
    UnknownTeam { name: String },

    #[error("invalid value: {what}")]
    InvalidValue { what: String },
}

/// What gets restored from the stadium template after a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KickoffReset {
    /// Every template disc restores.
    Full,
    /// Only the ball restores; other world discs keep their position.
    #[default]
    Partial,
}

/// A circular rigid body.
///
/// `inv_mass == 0` marks the disc immovable: the integrator skips it and
/// collision corrections never displace it.
#[derive(Debug, Clone, PartialEq)]
pub struct Disc {
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity: Vec2,
    pub radius: f64,
    pub inv_mass: f64,
    pub damping: f64,
    pub b_coef: f64,
    pub c_group: CollisionFlag,
    pub c_mask: CollisionFlag,
    /// RGBA, carried for the rendering front-end; opaque to physics.
    pub color: [u8; 4],
    /// Back-reference to the owning player, identity only.
    pub player_id: Option<u32>,
}

impl Disc {
    /// The ball synthesized when a stadium file has no `ball` entry.
    pub fn default_ball() -> Self {
        Self {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            gravity: Vec2::zeros(),
            radius: 10.0,
            inv_mass: 1.0,
            damping: 0.99,
            b_coef: 0.5,
            c_group: CollisionFlag::BALL | CollisionFlag::KICK | CollisionFlag::SCORE,
            c_mask: CollisionFlag::ALL,
            color: [255, 255, 255, 255],
            player_id: None,
        }
    }
}

/// A boundary edge between two endpoints, straight or curved.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub p0: Vec2,
    pub p1: Vec2,
    /// Signed curvature in degrees; 0 = straight line. Positive curvature
    /// sweeps counterclockwise from p0 to p1 (arc center left of the chord).
    pub curve: f64,
    /// One-sided collision when non-zero: contact is kept only when the sign
    /// of cross(disc - p0, p1 - p0) matches the sign of the bias.
    pub bias: f64,
    pub b_coef: f64,
    pub c_group: CollisionFlag,
    pub c_mask: CollisionFlag,
    /// Rendering payload, opaque to physics.
    pub vis: bool,
    pub color: [u8; 4],
    arc: Option<SegmentArc>,
}

/// Precomputed circle data for a curved segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentArc {
    pub center: Vec2,
    pub radius: f64,
}

impl Segment {
    pub fn new(
        p0: Vec2,
        p1: Vec2,
        curve: f64,
        bias: f64,
        b_coef: f64,
        c_group: CollisionFlag,
        c_mask: CollisionFlag,
    ) -> Self {
        let arc = (curve != 0.0).then(|| {
            let half = curve.to_radians() / 2.0;
            let chord = p1 - p0;
            let length = chord.norm();
            // Perpendicular on the left of the chord; tan(±90°) is huge, so
            // the offset collapses to ~0 for 180° arcs as expected.
            let perp = Vec2::new(-chord.y, chord.x) / length;
            let offset = length / (2.0 * half.tan());
            SegmentArc {
                center: (p0 + p1) * 0.5 + perp * offset,
                radius: length / (2.0 * half.sin().abs()),
            }
        });
        Self {
            p0,
            p1,
            curve,
            bias,
            b_coef,
            c_group,
            c_mask,
            vis: true,
            color: [0, 0, 0, 255],
            arc,
        }
    }

    pub fn arc(&self) -> Option<&SegmentArc> {
        self.arc.as_ref()
    }
}

/// An infinite half-space boundary. `normal` is unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec2,
    pub dist: f64,
    pub b_coef: f64,
    pub c_group: CollisionFlag,
    pub c_mask: CollisionFlag,
}

/// A point obstacle; discs collide with it as with an immovable radius-0 disc.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub b_coef: f64,
    pub c_group: CollisionFlag,
    pub c_mask: CollisionFlag,
}

/// A goal line. Not a physics body: only the goal detector reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub p0: Vec2,
    pub p1: Vec2,
    pub team: Team,
}

/// Resolved player physics template: the disc every player spawns with plus
/// the movement and kick parameters of the player handler.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPhysics {
    pub radius: f64,
    pub inv_mass: f64,
    pub damping: f64,
    pub b_coef: f64,
    pub gravity: Vec2,
    pub acceleration: f64,
    pub kicking_acceleration: f64,
    /// Damping applied to the player disc while the kick input is held.
    pub kicking_damping: f64,
    pub kick_strength: f64,
    /// Surface-to-surface distance within which a kick connects.
    pub kick_reach: f64,
    pub c_group: CollisionFlag,
    pub c_mask: CollisionFlag,
}

impl Default for PlayerPhysics {
    fn default() -> Self {
        Self {
            radius: 15.0,
            inv_mass: 0.5,
            damping: 0.96,
            b_coef: 0.5,
            gravity: Vec2::zeros(),
            acceleration: 0.1,
            kicking_acceleration: 0.07,
            kicking_damping: 0.96,
            kick_strength: 5.0,
            kick_reach: 4.0,
            c_group: CollisionFlag::PLAYER,
            c_mask: CollisionFlag::ALL,
        }
    }
}

impl PlayerPhysics {
    /// Build a fresh player disc from the template.
    pub fn to_disc(&self) -> Disc {
        Disc {
            position: Vec2::zeros(),
            velocity: Vec2::zeros(),
            gravity: self.gravity,
            radius: self.radius,
            inv_mass: self.inv_mass,
            damping: self.damping,
            b_coef: self.b_coef,
            c_group: self.c_group,
            c_mask: self.c_mask,
            color: [255, 255, 255, 255],
            player_id: None,
        }
    }
}

/// The resolved world description.
///
/// The loaded stadium is immutable for the lifetime of a game; the live
/// stadium the simulation mutates is a `clone()` of it.
#[derive(Debug, Clone)]
pub struct Stadium {
    pub name: String,
    pub spawn_distance: f64,
    pub kickoff_reset: KickoffReset,
    /// `discs[0]` is always the ball.
    pub discs: Vec<Disc>,
    pub segments: Vec<Segment>,
    pub planes: Vec<Plane>,
    pub vertexes: Vec<Vertex>,
    pub goals: Vec<Goal>,
    pub red_spawn_points: Vec<Vec2>,
    pub blue_spawn_points: Vec<Vec2>,
    pub player_physics: PlayerPhysics,
}

impl Stadium {
    /// Parse and resolve a `.hbs` stadium description.
    pub fn from_hbs_str(contents: &str) -> Result<Self, StadiumError> {
        let raw: raw::StadiumRaw = serde_json::from_str(contents)?;
        raw.resolve()
    }

    /// The ball disc.
    pub fn ball(&self) -> &Disc {
        &self.discs[0]
    }
}

/// Load and resolve a `.hbs` stadium file.
pub fn load_stadium_hbs<P: AsRef<Path>>(path: P) -> Result<Stadium, StadiumError> {
    let contents = fs::read_to_string(path)?;
    Stadium::from_hbs_str(&contents)
}

static CLASSIC_HBS: &str = include_str!("../../stadiums/classic.hbs");

static CLASSIC: Lazy<Stadium> = Lazy::new(|| {
    Stadium::from_hbs_str(CLASSIC_HBS).expect("embedded classic stadium must resolve")
});

/// The built-in Classic stadium.
pub fn classic() -> Stadium {
    CLASSIC.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(extra: &str) -> String {
        format!(r#"{{ "name": "test" {}{} }}"#, if extra.is_empty() { "" } else { ", " }, extra)
    }

    #[test]
    fn test_empty_stadium_gets_default_ball() {
        let stadium = Stadium::from_hbs_str(&minimal("")).unwrap();
        assert_eq!(stadium.discs.len(), 1);
        let ball = stadium.ball();
        assert_eq!(ball.radius, 10.0);
        assert!(ball
            .c_group
            .contains(CollisionFlag::BALL | CollisionFlag::KICK | CollisionFlag::SCORE));
        assert_eq!(stadium.kickoff_reset, KickoffReset::Partial);
    }

    #[test]
    fn test_trait_inheritance_and_defaults() {
        let stadium = Stadium::from_hbs_str(&minimal(
            r#""traits": { "bouncy": { "bCoef": 0.7, "cMask": ["ball"] } },
               "vertexes": [
                   { "x": 1.0, "y": 2.0, "trait": "bouncy" },
                   { "x": 3.0, "y": 4.0, "bCoef": 0.2, "trait": "bouncy" },
                   { "x": 5.0, "y": 6.0 }
               ]"#,
        ))
        .unwrap();

        // trait value fills the gap
        assert_eq!(stadium.vertexes[0].b_coef, 0.7);
        assert_eq!(stadium.vertexes[0].c_mask, CollisionFlag::BALL);
        // explicit value wins over the trait
        assert_eq!(stadium.vertexes[1].b_coef, 0.2);
        // hard defaults
        assert_eq!(stadium.vertexes[2].b_coef, 1.0);
        assert_eq!(stadium.vertexes[2].c_group, CollisionFlag::WALL);
        assert_eq!(stadium.vertexes[2].c_mask, CollisionFlag::ALL);
    }

    #[test]
    fn test_ball_disc0_promotion() {
        let stadium = Stadium::from_hbs_str(&minimal(
            r#""ball": "disc0",
               "discs": [
                   { "pos": [5.0, 6.0], "radius": 12.0, "cGroup": ["ball", "kick", "score"] },
                   { "pos": [50.0, 0.0], "radius": 8.0 }
               ]"#,
        ))
        .unwrap();
        assert_eq!(stadium.discs.len(), 2);
        assert_eq!(stadium.ball().radius, 12.0);
        assert_eq!(stadium.discs[1].radius, 8.0);
    }

    #[test]
    fn test_ball_inline_forced_to_origin() {
        let stadium = Stadium::from_hbs_str(&minimal(
            r#""ball": { "pos": [99.0, 99.0], "radius": 11.0, "cGroup": ["ball"] }"#,
        ))
        .unwrap();
        let ball = stadium.ball();
        assert_eq!(ball.position, Vec2::zeros());
        assert_eq!(ball.radius, 11.0);
        assert!(ball.c_group.contains(CollisionFlag::KICK | CollisionFlag::SCORE));
    }

    #[test]
    fn test_unknown_ball_string_rejected() {
        let err = Stadium::from_hbs_str(&minimal(r#""ball": "disc7""#)).unwrap_err();
        assert!(matches!(err, StadiumError::UnknownBall { .. }));
    }

    #[test]
    fn test_segment_with_bad_vertex_index_rejected() {
        let err = Stadium::from_hbs_str(&minimal(
            r#""vertexes": [{ "x": 0.0, "y": 0.0 }], "segments": [{ "v0": 0, "v1": 3 }]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, StadiumError::InvalidVertexIndex { index: 3, count: 1 }));
    }

    #[test]
    fn test_unknown_collision_flag_rejected() {
        let err = Stadium::from_hbs_str(&minimal(
            r#""vertexes": [{ "x": 0.0, "y": 0.0, "cGroup": ["lava"] }]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, StadiumError::UnknownCollisionFlag { .. }));
    }

    #[test]
    fn test_unknown_goal_team_rejected() {
        let err = Stadium::from_hbs_str(&minimal(
            r#""goals": [{ "p0": [0.0, -1.0], "p1": [0.0, 1.0], "team": "green" }]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, StadiumError::UnknownTeam { .. }));
    }

    #[test]
    fn test_plane_normal_renormalized() {
        let stadium = Stadium::from_hbs_str(&minimal(
            r#""planes": [{ "normal": [0.0, 3.0], "dist": -100.0 }]"#,
        ))
        .unwrap();
        assert_eq!(stadium.planes[0].normal, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_arc_precompute_half_circle() {
        let segment = Segment::new(
            Vec2::new(0.0, -75.0),
            Vec2::new(0.0, 75.0),
            180.0,
            0.0,
            1.0,
            CollisionFlag::WALL,
            CollisionFlag::ALL,
        );
        let arc = segment.arc().unwrap();
        assert!(arc.center.norm() < 1e-9);
        assert!((arc.radius - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_precompute_quarter() {
        // 90° arc over a chord of length 10: center at (5, 5), R = 5√2.
        let segment = Segment::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            90.0,
            0.0,
            1.0,
            CollisionFlag::WALL,
            CollisionFlag::ALL,
        );
        let arc = segment.arc().unwrap();
        assert!((arc.center - Vec2::new(5.0, 5.0)).norm() < 1e-9);
        assert!((arc.radius - 50.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Stadium::from_hbs_str("{ not json").unwrap_err();
        assert!(matches!(err, StadiumError::Parse(_)));
    }

    #[test]
    fn test_bad_radius_rejected() {
        let err = Stadium::from_hbs_str(&minimal(r#""discs": [{ "radius": -3.0 }]"#)).unwrap_err();
        assert!(matches!(err, StadiumError::InvalidValue { .. }));
    }

    #[test]
    fn test_bad_color_rejected() {
        let err =
            Stadium::from_hbs_str(&minimal(r#""discs": [{ "color": "notahex" }]"#)).unwrap_err();
        assert!(matches!(err, StadiumError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.hbs");
        std::fs::write(&path, minimal(r#""spawnDistance": 42.0"#)).unwrap();

        let stadium = load_stadium_hbs(&path).unwrap();
        assert_eq!(stadium.spawn_distance, 42.0);

        let err = load_stadium_hbs(dir.path().join("missing.hbs")).unwrap_err();
        assert!(matches!(err, StadiumError::Io(_)));
    }

    #[test]
    fn test_classic_stadium_resolves() {
        let stadium = classic();
        assert_eq!(stadium.name, "Classic");
        assert_eq!(stadium.kickoff_reset, KickoffReset::Partial);
        assert!(stadium.ball().c_group.contains(CollisionFlag::SCORE));
        assert_eq!(stadium.goals.len(), 2);
        assert_eq!(stadium.planes.len(), 4);
        // split kickoff circle: one arc per KO flag
        let red_ko = stadium
            .segments
            .iter()
            .filter(|s| s.c_group.contains(CollisionFlag::RED_KO) && s.curve != 0.0)
            .count();
        let blue_ko = stadium
            .segments
            .iter()
            .filter(|s| s.c_group.contains(CollisionFlag::BLUE_KO) && s.curve != 0.0)
            .count();
        assert_eq!(red_ko, 1);
        assert_eq!(blue_ko, 1);
    }
}
