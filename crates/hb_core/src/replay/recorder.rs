//! Action recorder: the HBR replay container.
//!
//! Wire format (msgpack, positional arrays):
//! `[options, [[[name, id, team], [byte, byte, ...]], ...]]`
//! with `options = team_kickoff * 8` and one packed input byte per player
//! per tick. Filename: `HBR_<unix_seconds>_<red>-<blue>_<options>.hbar`.

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use super::{decode_action, encode_action, RecordingError};
use crate::engine::PlayerHandler;
use crate::types::{PlayerAction, Team};

/// Per-player replay metadata: name, id (stringified), team wire code.
pub type PlayerInfo = (String, String, u8);

#[derive(Debug, Clone, Default)]
pub struct GameActionRecorder {
    options: u8,
    player_info: Vec<PlayerInfo>,
    player_actions: Vec<Vec<u8>>,
}

impl GameActionRecorder {
    /// Begin recording for the given roster.
    pub(crate) fn start(players: &[PlayerHandler], team_kickoff: Team) -> Self {
        Self {
            options: team_kickoff.as_int() * 8,
            player_info: players
                .iter()
                .map(|player| {
                    (player.name.clone(), player.id().to_string(), player.team.as_int())
                })
                .collect(),
            player_actions: vec![Vec::new(); players.len()],
        }
    }

    /// Append one tick of actions.
    pub(crate) fn step(&mut self, actions: &[PlayerAction]) {
        for (stream, action) in self.player_actions.iter_mut().zip(actions) {
            stream.push(encode_action(*action));
        }
    }

    /// Finish the recording, saving it into `folder` when requested.
    /// Returns the written path, if any.
    pub(crate) fn stop(
        self,
        red: u32,
        blue: u32,
        save: bool,
        folder: &Path,
    ) -> Result<Option<PathBuf>, RecordingError> {
        if !save {
            return Ok(None);
        }
        let path = folder.join(self.replay_name(red, blue));
        self.save(&path)?;
        Ok(Some(path))
    }

    /// `HBR_<unix_seconds>_<red>-<blue>_<options>.hbar`
    fn replay_name(&self, red: u32, blue: u32) -> String {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        format!("HBR_{timestamp}_{red}-{blue}_{}.hbar", self.options)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordingError> {
        let entries: Vec<(&PlayerInfo, &Vec<u8>)> =
            self.player_info.iter().zip(&self.player_actions).collect();
        let recording = (self.options, entries);
        fs::write(path, rmp_serde::to_vec(&recording)?)?;
        Ok(())
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecordingError> {
        let bytes = fs::read(path)?;
        let (options, entries): (u8, Vec<(PlayerInfo, Vec<u8>)>) =
            rmp_serde::from_slice(&bytes)?;
        let (player_info, player_actions) = entries.into_iter().unzip();
        Ok(Self { options, player_info, player_actions })
    }

    // ========================================
    // Replay access
    // ========================================

    pub fn options(&self) -> u8 {
        self.options
    }

    pub fn player_info(&self) -> &[PlayerInfo] {
        &self.player_info
    }

    /// Number of recorded ticks.
    pub fn num_ticks(&self) -> usize {
        self.player_actions.first().map_or(0, Vec::len)
    }

    /// Decode the action vector of one tick, suitable to feed back into
    /// `Game::step`.
    pub fn actions_at(&self, tick: usize) -> Vec<PlayerAction> {
        self.player_actions
            .iter()
            .map(|stream| decode_action(stream[tick]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::ConstantActionBot;
    use crate::engine::{Game, GameConfig, GameScore};
    use crate::types::Vec2;

    fn roster() -> Vec<PlayerHandler> {
        vec![PlayerHandler::new("P0", Team::Red), PlayerHandler::new("P1", Team::Blue)]
    }

    #[test]
    fn test_recorder_collects_streams() {
        let mut players = roster();
        players[0].id = 0;
        players[1].id = 1;
        let mut recorder = GameActionRecorder::start(&players, Team::Red);

        recorder.step(&[PlayerAction::new(1, 0, 0), PlayerAction::new(-1, 1, 1)]);
        recorder.step(&[PlayerAction::new(0, 0, 1), PlayerAction::new(0, 0, 0)]);

        assert_eq!(recorder.options(), 8);
        assert_eq!(recorder.num_ticks(), 2);
        assert_eq!(
            recorder.player_info(),
            &[
                ("P0".to_string(), "0".to_string(), 1),
                ("P1".to_string(), "1".to_string(), 2)
            ]
        );
        assert_eq!(
            recorder.actions_at(0),
            vec![PlayerAction::new(1, 0, 0), PlayerAction::new(-1, 1, 1)]
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round_trip.hbar");

        let players = roster();
        let mut recorder = GameActionRecorder::start(&players, Team::Blue);
        recorder.step(&[PlayerAction::new(1, 1, 0), PlayerAction::new(0, -1, 1)]);
        recorder.save(&path).unwrap();

        let loaded = GameActionRecorder::read_from_file(&path).unwrap();
        assert_eq!(loaded.options(), 16);
        assert_eq!(loaded.player_info(), recorder.player_info());
        assert_eq!(loaded.actions_at(0), recorder.actions_at(0));
    }

    #[test]
    fn test_replay_name_shape() {
        let recorder = GameActionRecorder::start(&roster(), Team::Red);
        let name = recorder.replay_name(2, 1);
        assert!(name.starts_with("HBR_"));
        assert!(name.ends_with("_2-1_8.hbar"));
    }

    #[test]
    fn test_game_saves_recording_on_stop() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig {
            enable_recorder: true,
            folder_rec: dir.path().to_path_buf(),
            ..GameConfig::default()
        };
        let mut game = Game::new(config).unwrap();
        game.add_players(roster());
        game.start();
        let idle = [PlayerAction::default(), PlayerAction::default()];
        for _ in 0..5 {
            game.step(&idle).unwrap();
        }
        game.stop(true);

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "hbar"))
            .collect();
        assert_eq!(saved.len(), 1);

        let loaded = GameActionRecorder::read_from_file(&saved[0]).unwrap();
        assert_eq!(loaded.num_ticks(), 5);
        assert_eq!(loaded.player_info().len(), 2);
    }

    #[test]
    fn test_replay_reproduces_the_match() {
        // record a short bot match, then replay the decoded action stream
        // into a fresh game: score and ball trajectory must be identical
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig {
            enable_recorder: true,
            folder_rec: dir.path().to_path_buf(),
            ..GameConfig::default()
        };

        let mut game = Game::new(config).unwrap();
        game.set_score(GameScore::new(1, 1));
        game.add_players(vec![
            PlayerHandler::with_bot(
                "P0",
                Team::Red,
                Box::new(ConstantActionBot::new(PlayerAction::new(1, 0, 1))),
            ),
            PlayerHandler::with_bot(
                "P1",
                Team::Blue,
                Box::new(ConstantActionBot::symmetric(PlayerAction::new(1, 1, 0))),
            ),
        ]);
        game.start();

        let mut live_trace: Vec<Vec2> = Vec::new();
        for _ in 0..300 {
            let actions = game.poll_actions();
            game.step(&actions).unwrap();
            live_trace.push(game.stadium().ball().position);
        }
        let live_score = (game.score().red, game.score().blue);
        game.stop(true);

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        let recording = GameActionRecorder::read_from_file(&saved[0]).unwrap();
        assert_eq!(recording.num_ticks(), 300);

        // fresh game, same stadium and roster, inputs taken from the replay
        let mut replayed = Game::new(GameConfig::default()).unwrap();
        replayed.set_score(GameScore::new(1, 1));
        replayed.add_players(roster());
        replayed.start();

        let mut replay_trace: Vec<Vec2> = Vec::new();
        for tick in 0..recording.num_ticks() {
            replayed.step(&recording.actions_at(tick)).unwrap();
            replay_trace.push(replayed.stadium().ball().position);
        }

        assert_eq!(live_trace, replay_trace);
        assert_eq!((replayed.score().red, replayed.score().blue), live_score);
    }
}
