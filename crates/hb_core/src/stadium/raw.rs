//! Raw `.hbs` wire schema and trait/default resolution.
//!
//! Stadium files are declarative JSON with camelCase field names. Every
//! geometry item may leave physics fields unset and point at a named trait;
//! resolution fills a field from the item itself, then from its trait, then
//! from the hard-coded default. The resolved output types live in the parent
//! module and carry no optional fields.

use std::collections::HashMap;

use serde::Deserialize;

use super::{
    Disc, Goal, KickoffReset, Plane, PlayerPhysics, Segment, Stadium, StadiumError, Vertex,
};
use crate::types::{CollisionFlag, Team, Vec2};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StadiumRaw {
    pub name: String,
    pub spawn_distance: Option<f64>,
    #[serde(default)]
    pub kickoff_reset: KickoffReset,
    #[serde(default)]
    pub traits: HashMap<String, TraitRaw>,
    #[serde(default)]
    pub vertexes: Vec<VertexRaw>,
    #[serde(default)]
    pub segments: Vec<SegmentRaw>,
    #[serde(default)]
    pub planes: Vec<PlaneRaw>,
    #[serde(default)]
    pub discs: Vec<DiscRaw>,
    #[serde(default)]
    pub goals: Vec<GoalRaw>,
    #[serde(default)]
    pub red_spawn_points: Vec<[f64; 2]>,
    #[serde(default)]
    pub blue_spawn_points: Vec<[f64; 2]>,
    pub player_physics: Option<PlayerPhysicsRaw>,
    pub ball: Option<BallRaw>,
}

/// Named bundle of default physics fields inherited by raw geometry items.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TraitRaw {
    pub b_coef: Option<f64>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
    pub radius: Option<f64>,
    pub inv_mass: Option<f64>,
    pub damping: Option<f64>,
    pub gravity: Option<[f64; 2]>,
    pub curve: Option<f64>,
    pub bias: Option<f64>,
    pub vis: Option<bool>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VertexRaw {
    pub x: f64,
    pub y: f64,
    pub b_coef: Option<f64>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SegmentRaw {
    pub v0: usize,
    pub v1: usize,
    pub b_coef: Option<f64>,
    pub curve: Option<f64>,
    pub bias: Option<f64>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
    pub vis: Option<bool>,
    pub color: Option<String>,
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaneRaw {
    pub normal: [f64; 2],
    pub dist: f64,
    pub b_coef: Option<f64>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DiscRaw {
    pub pos: Option<[f64; 2]>,
    pub speed: Option<[f64; 2]>,
    pub gravity: Option<[f64; 2]>,
    pub radius: Option<f64>,
    pub inv_mass: Option<f64>,
    pub damping: Option<f64>,
    pub b_coef: Option<f64>,
    pub color: Option<String>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GoalRaw {
    pub p0: [f64; 2],
    pub p1: [f64; 2],
    pub team: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlayerPhysicsRaw {
    pub radius: Option<f64>,
    pub inv_mass: Option<f64>,
    pub damping: Option<f64>,
    pub b_coef: Option<f64>,
    pub gravity: Option<[f64; 2]>,
    pub acceleration: Option<f64>,
    pub kicking_acceleration: Option<f64>,
    pub kicking_damping: Option<f64>,
    pub kick_strength: Option<f64>,
    pub kick_reach: Option<f64>,
    pub c_group: Option<Vec<String>>,
    pub c_mask: Option<Vec<String>>,
}

/// The ball descriptor: absent, the string `"disc0"`, or an inline disc.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum BallRaw {
    Named(String),
    Inline(DiscRaw),
}

// ============================================================
// Resolution helpers
// ============================================================

static EMPTY_TRAIT: TraitRaw = TraitRaw {
    b_coef: None,
    c_group: None,
    c_mask: None,
    radius: None,
    inv_mass: None,
    damping: None,
    gravity: None,
    curve: None,
    bias: None,
    vis: None,
    color: None,
};

/// Look up an item's trait. An unknown trait name resolves as an empty trait.
fn trait_of<'a>(
    traits: &'a HashMap<String, TraitRaw>,
    name: Option<&String>,
) -> &'a TraitRaw {
    match name {
        None => &EMPTY_TRAIT,
        Some(name) => traits.get(name).unwrap_or_else(|| {
            log::warn!("unknown trait {name:?}, resolving as empty");
            &EMPTY_TRAIT
        }),
    }
}

fn resolve_flags(
    own: Option<&Vec<String>>,
    inherited: Option<&Vec<String>>,
    default: CollisionFlag,
) -> Result<CollisionFlag, StadiumError> {
    let Some(names) = own.or(inherited) else {
        return Ok(default);
    };
    let mut flags = CollisionFlag::NONE;
    for name in names {
        flags |= CollisionFlag::from_wire(name)
            .ok_or_else(|| StadiumError::UnknownCollisionFlag { name: name.clone() })?;
    }
    Ok(flags)
}

fn resolve_color(
    own: Option<&String>,
    inherited: Option<&String>,
) -> Result<[u8; 4], StadiumError> {
    let Some(value) = own.or(inherited) else {
        return Ok([255, 255, 255, 255]);
    };
    if value == "transparent" {
        return Ok([0, 0, 0, 0]);
    }
    let parse = |s: &str| u8::from_str_radix(s, 16).ok();
    if value.len() == 6 {
        if let (Some(r), Some(g), Some(b)) =
            (parse(&value[0..2]), parse(&value[2..4]), parse(&value[4..6]))
        {
            return Ok([r, g, b, 255]);
        }
    }
    Err(StadiumError::InvalidValue { what: format!("color {value:?}") })
}

fn vec2(pair: [f64; 2]) -> Vec2 {
    Vec2::new(pair[0], pair[1])
}

// ============================================================
// Per-item resolution
// ============================================================

impl VertexRaw {
    pub(super) fn resolve(
        &self,
        traits: &HashMap<String, TraitRaw>,
    ) -> Result<Vertex, StadiumError> {
        let tr = trait_of(traits, self.trait_name.as_ref());
        Ok(Vertex {
            position: Vec2::new(self.x, self.y),
            b_coef: self.b_coef.or(tr.b_coef).unwrap_or(1.0),
            c_group: resolve_flags(
                self.c_group.as_ref(),
                tr.c_group.as_ref(),
                CollisionFlag::WALL,
            )?,
            c_mask: resolve_flags(self.c_mask.as_ref(), tr.c_mask.as_ref(), CollisionFlag::ALL)?,
        })
    }
}

impl SegmentRaw {
    pub(super) fn resolve(
        &self,
        traits: &HashMap<String, TraitRaw>,
        vertexes: &[Vertex],
    ) -> Result<Segment, StadiumError> {
        let tr = trait_of(traits, self.trait_name.as_ref());
        let endpoint = |index: usize| {
            vertexes
                .get(index)
                .map(|vertex| vertex.position)
                .ok_or(StadiumError::InvalidVertexIndex { index, count: vertexes.len() })
        };
        let p0 = endpoint(self.v0)?;
        let p1 = endpoint(self.v1)?;
        let curve = self.curve.or(tr.curve).unwrap_or(0.0);
        if curve != 0.0 && (p1 - p0).norm_squared() == 0.0 {
            return Err(StadiumError::InvalidValue {
                what: format!("zero-length curved segment {}-{}", self.v0, self.v1),
            });
        }
        let mut segment = Segment::new(
            p0,
            p1,
            curve,
            self.bias.or(tr.bias).unwrap_or(0.0),
            self.b_coef.or(tr.b_coef).unwrap_or(1.0),
            resolve_flags(self.c_group.as_ref(), tr.c_group.as_ref(), CollisionFlag::WALL)?,
            resolve_flags(self.c_mask.as_ref(), tr.c_mask.as_ref(), CollisionFlag::ALL)?,
        );
        segment.vis = self.vis.or(tr.vis).unwrap_or(true);
        segment.color = resolve_color(self.color.as_ref(), tr.color.as_ref())?;
        Ok(segment)
    }
}

impl PlaneRaw {
    pub(super) fn resolve(
        &self,
        traits: &HashMap<String, TraitRaw>,
    ) -> Result<Plane, StadiumError> {
        let tr = trait_of(traits, self.trait_name.as_ref());
        let normal = vec2(self.normal);
        let length = normal.norm();
        if length == 0.0 {
            return Err(StadiumError::InvalidValue { what: "zero-length plane normal".into() });
        }
        Ok(Plane {
            normal: normal / length,
            dist: self.dist,
            b_coef: self.b_coef.or(tr.b_coef).unwrap_or(1.0),
            c_group: resolve_flags(
                self.c_group.as_ref(),
                tr.c_group.as_ref(),
                CollisionFlag::WALL,
            )?,
            c_mask: resolve_flags(self.c_mask.as_ref(), tr.c_mask.as_ref(), CollisionFlag::ALL)?,
        })
    }
}

impl DiscRaw {
    pub(super) fn resolve(
        &self,
        traits: &HashMap<String, TraitRaw>,
    ) -> Result<Disc, StadiumError> {
        let tr = trait_of(traits, self.trait_name.as_ref());
        let radius = self.radius.or(tr.radius).unwrap_or(10.0);
        if radius <= 0.0 {
            return Err(StadiumError::InvalidValue { what: format!("disc radius {radius}") });
        }
        Ok(Disc {
            position: vec2(self.pos.unwrap_or([0.0, 0.0])),
            velocity: vec2(self.speed.unwrap_or([0.0, 0.0])),
            gravity: vec2(self.gravity.or(tr.gravity).unwrap_or([0.0, 0.0])),
            radius,
            inv_mass: self.inv_mass.or(tr.inv_mass).unwrap_or(1.0),
            damping: self.damping.or(tr.damping).unwrap_or(0.99),
            b_coef: self.b_coef.or(tr.b_coef).unwrap_or(0.5),
            c_group: resolve_flags(self.c_group.as_ref(), tr.c_group.as_ref(), CollisionFlag::ALL)?,
            c_mask: resolve_flags(self.c_mask.as_ref(), tr.c_mask.as_ref(), CollisionFlag::ALL)?,
            color: resolve_color(self.color.as_ref(), tr.color.as_ref())?,
            player_id: None,
        })
    }
}

impl GoalRaw {
    pub(super) fn resolve(&self) -> Result<Goal, StadiumError> {
        let team = Team::from_wire(&self.team)
            .ok_or_else(|| StadiumError::UnknownTeam { name: self.team.clone() })?;
        Ok(Goal { p0: vec2(self.p0), p1: vec2(self.p1), team })
    }
}

impl PlayerPhysicsRaw {
    pub(super) fn resolve(&self) -> Result<PlayerPhysics, StadiumError> {
        let defaults = PlayerPhysics::default();
        Ok(PlayerPhysics {
            radius: self.radius.unwrap_or(defaults.radius),
            inv_mass: self.inv_mass.unwrap_or(defaults.inv_mass),
            damping: self.damping.unwrap_or(defaults.damping),
            b_coef: self.b_coef.unwrap_or(defaults.b_coef),
            gravity: self.gravity.map(vec2).unwrap_or(defaults.gravity),
            acceleration: self.acceleration.unwrap_or(defaults.acceleration),
            kicking_acceleration: self
                .kicking_acceleration
                .unwrap_or(defaults.kicking_acceleration),
            kicking_damping: self.kicking_damping.unwrap_or(defaults.kicking_damping),
            kick_strength: self.kick_strength.unwrap_or(defaults.kick_strength),
            kick_reach: self.kick_reach.unwrap_or(defaults.kick_reach),
            c_group: resolve_flags(self.c_group.as_ref(), None, CollisionFlag::PLAYER)?,
            c_mask: resolve_flags(self.c_mask.as_ref(), None, CollisionFlag::ALL)?,
        })
    }
}

// ============================================================
// Whole-stadium resolution
// ============================================================

impl StadiumRaw {
    pub(super) fn resolve(self) -> Result<Stadium, StadiumError> {
        let traits = &self.traits;

        let vertexes = self
            .vertexes
            .iter()
            .map(|raw| raw.resolve(traits))
            .collect::<Result<Vec<_>, _>>()?;
        let segments = self
            .segments
            .iter()
            .map(|raw| raw.resolve(traits, &vertexes))
            .collect::<Result<Vec<_>, _>>()?;
        let planes = self
            .planes
            .iter()
            .map(|raw| raw.resolve(traits))
            .collect::<Result<Vec<_>, _>>()?;
        let goals = self
            .goals
            .iter()
            .map(|raw| raw.resolve())
            .collect::<Result<Vec<_>, _>>()?;
        let mut discs = self
            .discs
            .iter()
            .map(|raw| raw.resolve(traits))
            .collect::<Result<Vec<_>, _>>()?;

        // Resolve the ball and place it at discs[0].
        let ball = match &self.ball {
            None => Disc::default_ball(),
            Some(BallRaw::Named(name)) => {
                if name != "disc0" {
                    return Err(StadiumError::UnknownBall { name: name.clone() });
                }
                if discs.is_empty() {
                    return Err(StadiumError::InvalidValue {
                        what: "ball \"disc0\" with no discs".into(),
                    });
                }
                discs.remove(0)
            }
            Some(BallRaw::Inline(raw)) => {
                let mut ball = raw.resolve(traits)?;
                ball.position = Vec2::zeros();
                ball.c_group |= CollisionFlag::KICK | CollisionFlag::SCORE;
                ball
            }
        };
        discs.insert(0, ball);

        Ok(Stadium {
            name: self.name,
            spawn_distance: self.spawn_distance.unwrap_or(100.0),
            kickoff_reset: self.kickoff_reset,
            discs,
            segments,
            planes,
            vertexes,
            goals,
            red_spawn_points: self.red_spawn_points.into_iter().map(vec2).collect(),
            blue_spawn_points: self.blue_spawn_points.into_iter().map(vec2).collect(),
            player_physics: self
                .player_physics
                .map(|raw| raw.resolve())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}
