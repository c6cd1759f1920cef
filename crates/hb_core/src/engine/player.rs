//! Player handler: input storage, movement forces, kick resolution.

use crate::bots::Bot;
use crate::stadium::Stadium;
use crate::types::{CollisionFlag, PlayerAction, Team, Vec2};

/// One player: identity, team, input state, and the index of its disc in the
/// live stadium's disc pool. The disc itself is owned by the stadium; both
/// sides reference it by index only.
pub struct PlayerHandler {
    pub name: String,
    /// Assigned by the game when the player is added.
    pub(crate) id: u32,
    pub team: Team,
    pub(crate) disc_index: Option<usize>,
    pub(crate) action: PlayerAction,
    /// Whether the kick input is currently held. Selects the kicking
    /// acceleration and damping.
    pub kicking: bool,
    /// Armed after the first held tick of a kick press; prevents auto-kick
    /// while the input stays held. Cleared on release.
    pub(crate) kick_cancel: bool,
    pub(crate) bot: Option<Box<dyn Bot>>,
}

impl std::fmt::Debug for PlayerHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandler")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("team", &self.team)
            .field("disc_index", &self.disc_index)
            .field("action", &self.action)
            .field("kicking", &self.kicking)
            .field("has_bot", &self.bot.is_some())
            .finish()
    }
}

impl PlayerHandler {
    pub fn new(name: impl Into<String>, team: Team) -> Self {
        Self {
            name: name.into(),
            id: 0,
            team,
            disc_index: None,
            action: PlayerAction::default(),
            kicking: false,
            kick_cancel: false,
            bot: None,
        }
    }

    /// Create a player driven by a bot policy.
    pub fn with_bot(name: impl Into<String>, team: Team, bot: Box<dyn Bot>) -> Self {
        Self { bot: Some(bot), ..Self::new(name, team) }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The last action applied to this player.
    pub fn action(&self) -> PlayerAction {
        self.action
    }

    /// Index of the player's disc in the live stadium, `None` when the game
    /// is stopped.
    pub fn disc_index(&self) -> Option<usize> {
        self.disc_index
    }

    pub(crate) fn set_action(&mut self, action: PlayerAction) {
        self.action = action.clamped();
    }

    /// Apply the stored action to the player's disc: movement force plus, on
    /// the first tick of a kick press, an impulse to every kick-eligible
    /// disc in reach. Damping and gravity stay with the integrator; this
    /// only adjusts velocities.
    pub(crate) fn resolve_movement(&mut self, stadium: &mut Stadium) {
        let Some(index) = self.disc_index else {
            return;
        };
        let physics = stadium.player_physics.clone();

        self.kicking = self.action.kick == 1;
        let acceleration =
            if self.kicking { physics.kicking_acceleration } else { physics.acceleration };

        {
            let disc = &mut stadium.discs[index];
            disc.damping = if self.kicking { physics.kicking_damping } else { physics.damping };
            let direction = Vec2::new(self.action.dx as f64, self.action.dy as f64);
            if direction.norm_squared() > 0.0 {
                disc.velocity += direction.normalize() * acceleration;
            }
        }

        if self.action.kick == 1 {
            if !self.kick_cancel {
                if kick_targets_in_reach(stadium, index, physics.kick_reach, physics.kick_strength)
                {
                    log::debug!("player {} kicked", self.name);
                }
                self.kick_cancel = true;
            }
        } else {
            self.kick_cancel = false;
        }
    }
}

/// Impulse every kick-eligible disc within reach of the kicker. Returns
/// whether any kick connected.
fn kick_targets_in_reach(
    stadium: &mut Stadium,
    kicker: usize,
    kick_reach: f64,
    kick_strength: f64,
) -> bool {
    let mut kicked = false;
    let kicker_position = stadium.discs[kicker].position;
    let kicker_radius = stadium.discs[kicker].radius;

    for index in 0..stadium.discs.len() {
        if index == kicker {
            continue;
        }
        let target = &mut stadium.discs[index];
        if !target.c_group.intersects(CollisionFlag::KICK) {
            continue;
        }
        let delta = target.position - kicker_position;
        let dist = delta.norm();
        if dist == 0.0 {
            continue;
        }
        if dist - kicker_radius - target.radius > kick_reach {
            continue;
        }
        target.velocity += (delta / dist) * kick_strength;
        kicked = true;
    }
    kicked
}
