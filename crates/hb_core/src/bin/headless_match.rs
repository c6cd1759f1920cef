//! Headless two-bot match on the built-in Classic stadium.
//!
//! Runs the simulation loop to completion and prints the result line the
//! way an integration smoke test would.

use hb_core::bots::{ChaseBot, ConstantActionBot};
use hb_core::{Game, GameConfig, GameScore, PlayerAction, PlayerHandler, Team};

fn main() -> anyhow::Result<()> {
    let mut game = Game::new(GameConfig::default())?;
    game.set_score(GameScore::new(1, 1));

    game.add_players(vec![
        PlayerHandler::with_bot("P0", Team::Red, Box::new(ChaseBot::new(2))),
        PlayerHandler::with_bot(
            "P1",
            Team::Blue,
            Box::new(ConstantActionBot::symmetric(PlayerAction::new(1, 1, 1))),
        ),
    ]);
    game.start();

    let mut done = false;
    let mut safety = 0u64;
    while !done && safety < 1_000_000 {
        let actions = game.poll_actions();
        done = game.step(&actions)?;
        safety += 1;
    }

    println!(
        "final score {}-{} after {} ticks ({:.2}s simulated)",
        game.score().red,
        game.score().blue,
        game.score().ticks,
        game.score().time()
    );
    game.stop(false);
    Ok(())
}
