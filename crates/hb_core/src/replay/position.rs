//! Position recorder: per-tick disc state dumps for external viewers.
//!
//! Same container as the action recording, but every stream entry is a
//! denormalized state row instead of a packed input byte; the ball gets a
//! trailing pseudo-player stream. Filename suffix: `.hbpr`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{PlayerInfo, RecordingError};
use crate::engine::Game;

/// One recorded row: player discs carry kick state, the ball does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionFrame {
    /// `[x, y, vx, vy, kicking, kick_cancel]`
    Player(f64, f64, f64, f64, u8, u8),
    /// `[x, y, vx, vy]`
    Ball(f64, f64, f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct GamePositionRecorder {
    options: u8,
    player_info: Vec<PlayerInfo>,
    streams: Vec<Vec<PositionFrame>>,
}

impl GamePositionRecorder {
    /// Begin recording the given game's roster plus the ball stream.
    pub fn start(game: &Game) -> Self {
        let mut player_info: Vec<PlayerInfo> = game
            .players()
            .iter()
            .map(|player| (player.name.clone(), player.id().to_string(), player.team.as_int()))
            .collect();
        player_info.push(("ball".to_string(), "0".to_string(), 0));
        let streams = vec![Vec::new(); player_info.len()];
        Self { options: game.team_kickoff().as_int() * 8, player_info, streams }
    }

    /// Record the current tick's disc states.
    pub fn step(&mut self, game: &Game) {
        for (player, stream) in game.players().iter().zip(&mut self.streams) {
            let Some(index) = player.disc_index() else {
                continue;
            };
            let disc = &game.stadium().discs[index];
            stream.push(PositionFrame::Player(
                disc.position.x,
                disc.position.y,
                disc.velocity.x,
                disc.velocity.y,
                u8::from(player.kicking),
                u8::from(player.kick_cancel),
            ));
        }
        let ball = game.stadium().ball();
        if let Some(stream) = self.streams.last_mut() {
            stream.push(PositionFrame::Ball(
                ball.position.x,
                ball.position.y,
                ball.velocity.x,
                ball.velocity.y,
            ));
        }
    }

    /// Finish the recording, saving it into `folder` when requested.
    pub fn stop(
        self,
        red: u32,
        blue: u32,
        save: bool,
        folder: &Path,
    ) -> Result<Option<PathBuf>, RecordingError> {
        if !save {
            return Ok(None);
        }
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let path =
            folder.join(format!("HBR_{timestamp}_{red}-{blue}_{}.hbpr", self.options));
        self.save(&path)?;
        Ok(Some(path))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordingError> {
        let entries: Vec<(&PlayerInfo, &Vec<PositionFrame>)> =
            self.player_info.iter().zip(&self.streams).collect();
        let recording = (self.options, entries);
        fs::write(path, rmp_serde::to_vec(&recording)?)?;
        Ok(())
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecordingError> {
        let bytes = fs::read(path)?;
        let (options, entries): (u8, Vec<(PlayerInfo, Vec<PositionFrame>)>) =
            rmp_serde::from_slice(&bytes)?;
        let (player_info, streams) = entries.into_iter().unzip();
        Ok(Self { options, player_info, streams })
    }

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn player_info(&self) -> &[PlayerInfo] {
        &self.player_info
    }

    pub fn stream(&self, index: usize) -> &[PositionFrame] {
        &self.streams[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameConfig, PlayerHandler};
    use crate::types::{PlayerAction, Team};

    #[test]
    fn test_position_streams_follow_the_game() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.add_players(vec![
            PlayerHandler::new("P0", Team::Red),
            PlayerHandler::new("P1", Team::Blue),
        ]);
        game.start();

        let mut recorder = GamePositionRecorder::start(&game);
        assert_eq!(recorder.player_info().last().unwrap().0, "ball");

        let idle = [PlayerAction::default(), PlayerAction::default()];
        for _ in 0..3 {
            game.step(&idle).unwrap();
            recorder.step(&game);
        }

        // red player parked on its spawn point the whole time
        match recorder.stream(0)[2] {
            PositionFrame::Player(x, y, _, _, kicking, _) => {
                assert_eq!((x, y), (-170.0, 0.0));
                assert_eq!(kicking, 0);
            }
            ref other => panic!("expected player frame, got {other:?}"),
        }
        match recorder.stream(2)[0] {
            PositionFrame::Ball(x, y, vx, vy) => {
                assert_eq!((x, y, vx, vy), (0.0, 0.0, 0.0, 0.0));
            }
            ref other => panic!("expected ball frame, got {other:?}"),
        }
    }

    #[test]
    fn test_position_file_round_trip() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.add_player(PlayerHandler::new("P0", Team::Red));
        game.start();

        let mut recorder = GamePositionRecorder::start(&game);
        game.step(&[PlayerAction::new(1, 0, 0)]).unwrap();
        recorder.step(&game);

        let dir = tempfile::tempdir().unwrap();
        let path = recorder
            .clone()
            .stop(0, 0, true, dir.path())
            .unwrap()
            .expect("a path must be written");
        assert_eq!(path.extension().unwrap(), "hbpr");

        let loaded = GamePositionRecorder::read_from_file(&path).unwrap();
        assert_eq!(loaded.options(), recorder.options());
        assert_eq!(loaded.player_info(), recorder.player_info());
        assert_eq!(loaded.stream(0), recorder.stream(0));
        assert_eq!(loaded.stream(1), recorder.stream(1));
    }
}
