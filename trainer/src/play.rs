//! Interactive play: a human at the terminal against a search agent.
//!
//! Moves are read as action ids, one per line. Anything that is not a
//! legal action id is rejected and the prompt repeats.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use engine_core::{ActionId, Game};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::arena::Agent;

/// Play one game. Returns the outcome from the human's side: 1 won, -1 lost,
/// 0 drawn.
pub fn play_interactive<R: BufRead, W: Write>(
    game: &mut dyn Game,
    agent: &Agent<'_>,
    human_first: bool,
    mut input: R,
    mut output: W,
    rng: &mut ChaCha20Rng,
) -> Result<i32> {
    game.reset(rng);
    let human_sign = if human_first { 1.0 } else { -1.0 };
    writeln!(
        output,
        "{}: you play {} against {}",
        game.env_id(),
        if human_first { "first" } else { "second" },
        agent.name()
    )?;

    let result = loop {
        if let Some(result) = game.result() {
            break result;
        }
        if game.history_len() >= game.max_game_length() {
            bail!("game still running after {} plies", game.max_game_length());
        }

        let action = if game.turn_sign() == human_sign {
            read_move(game, &mut input, &mut output)?
        } else {
            let action = agent.select_move(game, rng)?;
            writeln!(output, "{} plays {}", agent.name(), action)?;
            action
        };
        debug!(ply = game.history_len(), action, "Interactive move");
        game.step(action)
            .with_context(|| format!("action {action} rejected"))?;
    };

    let outcome = result * human_sign;
    let message = if outcome > 0.0 {
        "You win"
    } else if outcome < 0.0 {
        "You lose"
    } else {
        "Draw"
    };
    writeln!(output, "{message}")?;

    Ok(if outcome > 0.0 {
        1
    } else if outcome < 0.0 {
        -1
    } else {
        0
    })
}

fn read_move<R: BufRead, W: Write>(
    game: &dyn Game,
    input: &mut R,
    output: &mut W,
) -> Result<ActionId> {
    let legal = game.legal_actions();
    loop {
        write!(output, "legal actions {:?}> ", legal)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed before the game ended");
        }
        match line.trim().parse::<ActionId>() {
            Ok(action) if legal.contains(&action) => return Ok(action),
            _ => writeln!(output, "'{}' is not a legal action", line.trim())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::AgentConfig;
    use games_connect4::Connect4;
    use mcts::UniformEvaluator;
    use rand::SeedableRng;
    use std::io::Cursor;

    #[test]
    fn test_human_wins_vertical_line() {
        let mut game = Connect4::new();
        let evaluator = UniformEvaluator::new();
        // A greedy uniform agent with one simulation answers in column 0,
        // so column 6 stays open for the human.
        let agent = Agent::new("bot", &evaluator, AgentConfig::greedy(1, 1.0));
        let mut out = Vec::new();
        let input = Cursor::new("6\n6\n6\n6\n");

        let outcome = play_interactive(
            &mut game,
            &agent,
            true,
            input,
            &mut out,
            &mut ChaCha20Rng::seed_from_u64(0),
        )
        .unwrap();

        assert_eq!(outcome, 1);
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("You win"));
        assert_eq!(game.history_len(), 7);
    }

    #[test]
    fn test_invalid_input_is_reprompted() {
        let mut game = Connect4::new();
        let evaluator = UniformEvaluator::new();
        let agent = Agent::new("bot", &evaluator, AgentConfig::greedy(1, 1.0));
        let mut out = Vec::new();
        let input = Cursor::new("x\n9\n6\n");

        // The input runs out after the first accepted move.
        let err = play_interactive(
            &mut game,
            &agent,
            true,
            input,
            &mut out,
            &mut ChaCha20Rng::seed_from_u64(0),
        )
        .unwrap_err();

        assert!(err.to_string().contains("input closed"));
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("'x' is not a legal action"));
        assert!(transcript.contains("'9' is not a legal action"));
        assert_eq!(game.history_len(), 2);
    }
}
