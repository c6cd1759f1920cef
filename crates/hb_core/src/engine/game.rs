//! Game orchestrator: tick pipeline, lifecycle state machine, resets.
//!
//! One call to [`Game::step`] runs a complete tick atomically:
//! input application → disc integration → collision resolution → goal
//! detection → state-machine transition → score/time accounting → recorder.
//! The engine never sleeps and never suspends; the caller owns the loop.

use std::path::{Path, PathBuf};

use super::collision::resolve_collisions;
use super::constants::kit;
use super::constants::spawn::FALLBACK_Y_STEP;
use super::physics::update_discs;
use super::player::PlayerHandler;
use super::score::GameScore;
use crate::error::{GameError, Result};
use crate::replay::GameActionRecorder;
use crate::stadium::{self, load_stadium_hbs, KickoffReset, Stadium};
use crate::types::{cross, CollisionFlag, PlayerAction, Team, Vec2};

/// Lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Kickoff,
    Playing,
    Goal,
    End,
}

/// Construction-time configuration.
///
/// The renderer fields (`enable_renderer`, `enable_vsync`, `fov`) are carried
/// for an external rendering front-end; the simulation itself never reads
/// them past validation.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Stadium file to load; `None` uses the built-in Classic stadium.
    pub stadium_file: Option<PathBuf>,
    pub enable_recorder: bool,
    /// Directory recordings are saved into.
    pub folder_rec: PathBuf,
    pub enable_renderer: bool,
    pub enable_vsync: bool,
    pub fov: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stadium_file: None,
            enable_recorder: false,
            folder_rec: PathBuf::from("."),
            enable_renderer: false,
            enable_vsync: false,
            fov: 550,
        }
    }
}

/// The simulation: owns the loaded stadium template, the live stadium, the
/// players and the score, and drives one tick per [`Game::step`] call.
pub struct Game {
    config: GameConfig,
    score: GameScore,
    state: GameState,
    team_kickoff: Team,
    players: Vec<PlayerHandler>,
    next_player_id: u32,
    stadium_store: Stadium,
    stadium_game: Stadium,
    recorder: Option<GameActionRecorder>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        if config.enable_renderer && config.fov == 0 {
            return Err(GameError::Config("fov must be positive with renderer enabled".into()));
        }
        let stadium_store = match &config.stadium_file {
            Some(path) => load_stadium_hbs(path)?,
            None => stadium::classic(),
        };
        let stadium_game = stadium_store.clone();
        Ok(Self {
            config,
            score: GameScore::default(),
            state: GameState::Kickoff,
            team_kickoff: Team::Red,
            players: Vec::new(),
            next_player_id: 0,
            stadium_store,
            stadium_game,
            recorder: None,
        })
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn score(&self) -> &GameScore {
        &self.score
    }

    /// Configure limits; call before `start()`.
    pub fn set_score(&mut self, score: GameScore) {
        self.score = score;
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn team_kickoff(&self) -> Team {
        self.team_kickoff
    }

    /// The live stadium being simulated.
    pub fn stadium(&self) -> &Stadium {
        &self.stadium_game
    }

    /// The immutable stadium template.
    pub fn stadium_store(&self) -> &Stadium {
        &self.stadium_store
    }

    #[cfg(test)]
    pub(crate) fn stadium_mut(&mut self) -> &mut Stadium {
        &mut self.stadium_game
    }

    pub fn players(&self) -> &[PlayerHandler] {
        &self.players
    }

    pub fn get_player_by_id(&self, id: u32) -> Option<&PlayerHandler> {
        self.players.iter().find(|player| player.id == id)
    }

    // ========================================
    // Roster and stadium management
    // ========================================

    pub fn add_player(&mut self, mut player: PlayerHandler) {
        player.id = self.next_player_id;
        self.next_player_id += 1;
        self.players.push(player);
    }

    pub fn add_players(&mut self, players: Vec<PlayerHandler>) {
        for player in players {
            self.add_player(player);
        }
    }

    /// Replace the stadium. Only valid while stopped.
    pub fn load_map<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.stadium_store = load_stadium_hbs(path)?;
        self.stadium_game = self.stadium_store.clone();
        Ok(())
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Inject player discs into the live stadium and place everything at its
    /// kickoff position.
    pub fn start(&mut self) {
        for index in 0..self.players.len() {
            if self.players[index].disc_index.is_some() {
                continue;
            }
            let disc = self.stadium_game.player_physics.to_disc();
            self.stadium_game.discs.push(disc);
            self.players[index].disc_index = Some(self.stadium_game.discs.len() - 1);
        }
        self.reset_discs_positions();
        if self.config.enable_recorder {
            self.recorder = Some(GameActionRecorder::start(&self.players, self.team_kickoff));
        }
    }

    /// Tear the game down to its pristine state. A pending recording is
    /// saved when requested; a save failure is logged, never fatal.
    pub fn stop(&mut self, save_recording: bool) {
        if let Some(recorder) = self.recorder.take() {
            match recorder.stop(
                self.score.red,
                self.score.blue,
                save_recording,
                &self.config.folder_rec,
            ) {
                Ok(Some(path)) => log::debug!("recording saved under {}", path.display()),
                Ok(None) => {}
                Err(err) => log::error!("failed to save recording: {err}"),
            }
        }
        log::debug!(
            "game stopped with score {}-{} at {:.2}s",
            self.score.red,
            self.score.blue,
            self.score.time()
        );
        self.score.stop();
        self.state = GameState::Kickoff;
        self.team_kickoff = Team::Red;
        self.stadium_game = self.stadium_store.clone();
        for player in &mut self.players {
            player.disc_index = None;
            player.action = PlayerAction::default();
            player.kicking = false;
            player.kick_cancel = false;
        }
    }

    pub fn reset(&mut self, save_recording: bool) {
        self.stop(save_recording);
        self.start();
    }

    // ========================================
    // Tick pipeline
    // ========================================

    /// Run one tick. Returns `true` exactly on the tick the end-of-game
    /// animation completes.
    pub fn step(&mut self, actions: &[PlayerAction]) -> Result<bool> {
        if actions.len() != self.players.len() {
            return Err(GameError::ActionShape {
                expected: self.players.len(),
                got: actions.len(),
            });
        }

        {
            let Game { players, stadium_game, .. } = self;
            for (player, action) in players.iter_mut().zip(actions) {
                player.set_action(*action);
                player.resolve_movement(stadium_game);
            }
        }

        let previous = self.score_disc_positions();
        update_discs(&mut self.stadium_game);
        resolve_collisions(&mut self.stadium_game);
        let done = self.handle_game_state(&previous);

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.step(actions);
        }
        Ok(done)
    }

    /// Collect bot actions for this tick. Players without a bot contribute
    /// their last externally-set action.
    pub fn poll_actions(&mut self) -> Vec<PlayerAction> {
        let mut actions: Vec<PlayerAction> =
            self.players.iter().map(|player| player.action).collect();
        for index in 0..self.players.len() {
            if let Some(mut bot) = self.players[index].bot.take() {
                actions[index] = bot.step(self, index);
                self.players[index].bot = Some(bot);
            }
        }
        actions
    }

    /// Positions of every SCORE-flagged disc, in disc order.
    fn score_disc_positions(&self) -> Vec<Vec2> {
        self.stadium_game
            .discs
            .iter()
            .filter(|disc| disc.c_group.intersects(CollisionFlag::SCORE))
            .map(|disc| disc.position)
            .collect()
    }

    // ========================================
    // State machine
    // ========================================

    fn handle_game_state(&mut self, previous: &[Vec2]) -> bool {
        self.score.step(self.state);
        match self.state {
            GameState::Kickoff => {
                self.handle_kickoff_state();
                false
            }
            GameState::Playing => {
                self.handle_playing_state(previous);
                false
            }
            GameState::Goal => {
                self.handle_goal_state();
                false
            }
            GameState::End => self.handle_end_state(),
        }
    }

    /// Hold the kickoff barrier masks until any touch sets the ball moving.
    fn handle_kickoff_state(&mut self) {
        let barrier = if self.team_kickoff == Team::Red {
            CollisionFlag::RED_KO
        } else {
            CollisionFlag::BLUE_KO
        };
        let kickoff_made = {
            let Game { players, stadium_game, .. } = self;
            for player in players.iter() {
                if let Some(index) = player.disc_index {
                    stadium_game.discs[index].c_mask = CollisionFlag::PLAYER_COLLISION | barrier;
                }
            }
            stadium_game.discs[0].velocity.norm_squared() > 0.0
        };
        if kickoff_made {
            log::debug!("kickoff made");
            self.state = GameState::Playing;
        }
    }

    fn handle_playing_state(&mut self, previous: &[Vec2]) {
        {
            let Game { players, stadium_game, .. } = self;
            for player in players.iter() {
                if let Some(index) = player.disc_index {
                    stadium_game.discs[index].c_mask = CollisionFlag::PLAYER_COLLISION;
                }
            }
        }

        if let Some(team_goal) = self.check_goal(previous) {
            log::debug!("{team_goal:?} goal line crossed");
            self.state = GameState::Goal;
            self.score.update_score(team_goal);
            if !self.score.is_game_over() {
                // The scored-on kickoff rule, encoded as in the original
                // engine: blue goal -> blue kicks off, anything else -> red.
                self.team_kickoff =
                    if team_goal == Team::Blue { Team::Blue } else { Team::Red };
            }
        } else if self.score.is_game_over() {
            self.state = GameState::End;
            self.score.end_animation();
        }
    }

    fn handle_goal_state(&mut self) {
        self.score.animation_timeout -= 1;
        if !self.score.is_animation() {
            if self.score.is_game_over() {
                self.state = GameState::End;
                self.score.end_animation();
            } else {
                self.reset_discs_positions();
                self.state = GameState::Kickoff;
            }
        }
    }

    fn handle_end_state(&mut self) -> bool {
        self.score.animation_timeout -= 1;
        !self.score.is_animation()
    }

    // ========================================
    // Goal detection
    // ========================================

    /// Segment-crossing test between the pre-integration snapshot and the
    /// current position of every SCORE-flagged disc. Returns the crossed
    /// goal's own team tag.
    fn check_goal(&self, previous: &[Vec2]) -> Option<Team> {
        let current = self
            .stadium_game
            .discs
            .iter()
            .filter(|disc| disc.c_group.intersects(CollisionFlag::SCORE));
        for (previous_position, disc) in previous.iter().zip(current) {
            let motion = disc.position - previous_position;
            for goal in &self.stadium_game.goals {
                let current_p0 = disc.position - goal.p0;
                let current_p1 = disc.position - goal.p1;
                let previous_p0 = previous_position - goal.p0;
                let goal_line = goal.p1 - goal.p0;
                if cross(&current_p0, &motion) * cross(&current_p1, &motion) <= 0.0
                    && cross(&previous_p0, &goal_line) * cross(&current_p0, &goal_line) <= 0.0
                {
                    return Some(goal.team);
                }
            }
        }
        None
    }

    // ========================================
    // Resets
    // ========================================

    /// Restore disc positions for a kickoff. `kickoff_reset` selects whether
    /// all template discs restore or only the ball; player discs are rebuilt
    /// from the player physics template and placed on their spawn points.
    pub(crate) fn reset_discs_positions(&mut self) {
        let Game { players, stadium_store, stadium_game, .. } = self;

        let restore_count = match stadium_game.kickoff_reset {
            KickoffReset::Full => stadium_store.discs.len().min(stadium_game.discs.len()),
            KickoffReset::Partial => 1,
        };
        for index in 0..restore_count {
            stadium_game.discs[index] = stadium_store.discs[index].clone();
        }

        let mut red_count: u32 = 0;
        let mut blue_count: u32 = 0;
        for player in players.iter_mut() {
            let Some(index) = player.disc_index else {
                continue;
            };
            let mut disc = stadium_store.player_physics.to_disc();
            disc.player_id = Some(player.id);
            match player.team {
                Team::Red => {
                    disc.c_group |= CollisionFlag::RED;
                    disc.color = kit::RED;
                    disc.position = spawn_position(
                        -stadium_store.spawn_distance,
                        red_count,
                        &stadium_store.red_spawn_points,
                    );
                    red_count += 1;
                }
                Team::Blue => {
                    disc.c_group |= CollisionFlag::BLUE;
                    disc.color = kit::BLUE;
                    disc.position = spawn_position(
                        stadium_store.spawn_distance,
                        blue_count,
                        &stadium_store.blue_spawn_points,
                    );
                    blue_count += 1;
                }
                Team::Spectator => {
                    disc.color = kit::NEUTRAL;
                }
            }
            stadium_game.discs[index] = disc;
        }
    }
}

/// Team spawn slot: the stadium's spawn list when provided, otherwise the
/// procedural column at `x = ±spawn_distance` alternating above and below
/// the halfway line.
fn spawn_position(x: f64, count: u32, spawn_points: &[Vec2]) -> Vec2 {
    if !spawn_points.is_empty() {
        return spawn_points[(count as usize).min(spawn_points.len() - 1)];
    }
    let step = ((count + 1) >> 1) as f64 * FALLBACK_Y_STEP;
    let y = if count % 2 == 1 { -step } else { step };
    Vec2::new(x, y)
}
