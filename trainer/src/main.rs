//! Trainer - self-play training and arena evaluation for tinyzero
//!
//! `trainer train` plays self-play games with MCTS guided by a linear
//! oracle, trains the oracle on a replay buffer and checkpoints it to
//! `<data_dir>/<env_id>`. `trainer eval` loads that checkpoint and pits it
//! against itself or against classic (rollout) MCTS. `trainer play` lets a
//! human play against either agent from the terminal.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use engine_core::{create_game, list_registered_games, Game};
use linear_oracle::LinearOracle;
use mcts::{Oracle, OracleEvaluator, RolloutEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{error, info};

mod arena;
mod config;
mod play;
mod replay;
mod self_play;
mod training;

use crate::arena::{evaluate, Agent};
use crate::config::{oracle_config, Cli, Command, CommonArgs, EvalArgs, Opponent, PlayArgs, TrainArgs};
use crate::play::play_interactive;
use crate::training::Trainer;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.validate()?;

    init_tracing(&cli.common.log_level)?;
    info!(log_level = %cli.common.log_level, "Tracing initialized");

    engine_games::register_all_games();
    let mut game = create_game(&cli.common.env_id).ok_or_else(|| {
        anyhow!(
            "unknown env_id '{}' (registered: {})",
            cli.common.env_id,
            list_registered_games().join(", ")
        )
    })?;

    let mut rng = match cli.common.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let run_result = match &cli.command {
        Command::Train(args) => train(game.as_mut(), &cli.common, args, &mut rng),
        Command::Eval(args) => eval(game.as_mut(), &cli.common, args, &mut rng),
        Command::Play(args) => play(game.as_mut(), &cli.common, args, &mut rng),
    };

    if let Err(ref e) = run_result {
        error!("Trainer failed: {:#}", e);
    }
    run_result
}

fn train(
    game: &mut dyn Game,
    common: &CommonArgs,
    args: &TrainArgs,
    rng: &mut ChaCha20Rng,
) -> Result<()> {
    let mut oracle = LinearOracle::new(
        game.observation_size(),
        game.action_space_size(),
        &oracle_config(Some(args.learning_rate), common.seed),
    );

    let config = args.training_config(common);
    let summary = Trainer::new(game, &mut oracle, config)?.run(rng)?;

    info!(
        games = summary.games_played,
        checkpoints = summary.checkpoints_saved,
        best_loss = summary.best_loss,
        final_lr = oracle.learning_rate(),
        checkpoint_dir = %common.checkpoint_dir().display(),
        "Training complete"
    );
    Ok(())
}

fn eval(
    game: &mut dyn Game,
    common: &CommonArgs,
    args: &EvalArgs,
    rng: &mut ChaCha20Rng,
) -> Result<()> {
    let oracle = load_oracle(game, common)?;

    let oracle_evaluator = OracleEvaluator::new(&oracle);
    let rollout_evaluator = RolloutEvaluator::new();
    let oracle_agent = Agent::new("oracle", &oracle_evaluator, args.oracle_agent());
    let classic_agent = Agent::new("classic", &rollout_evaluator, args.classic_agent());

    info!(
        env_id = game.env_id(),
        mode = ?args.mode,
        games = args.games,
        oracle_simulations = args.num_simulations,
        classic_simulations = args.classic_simulations,
        "Starting evaluation"
    );
    let report = evaluate(game, args.mode, &oracle_agent, &classic_agent, args.games, rng)?;

    for (first, second, stats) in &report.matches {
        println!(
            "{first} vs {second}: {} wins / {} losses / {} draws (score {:.3})",
            stats.first_wins,
            stats.second_wins,
            stats.draws,
            stats.first_score()
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_oracle(game: &dyn Game, common: &CommonArgs) -> Result<LinearOracle> {
    let checkpoint_dir = common.checkpoint_dir();
    let mut oracle = LinearOracle::new(
        game.observation_size(),
        game.action_space_size(),
        &oracle_config(None, common.seed),
    );
    oracle
        .load(&checkpoint_dir)
        .with_context(|| format!("failed to load checkpoint from {}", checkpoint_dir.display()))?;
    Ok(oracle)
}

fn play(
    game: &mut dyn Game,
    common: &CommonArgs,
    args: &PlayArgs,
    rng: &mut ChaCha20Rng,
) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let outcome = match args.opponent {
        Opponent::Oracle => {
            let oracle = load_oracle(game, common)?;
            let evaluator = OracleEvaluator::new(&oracle);
            let agent = Agent::new("oracle", &evaluator, args.agent());
            play_interactive(game, &agent, !args.human_second, stdin.lock(), stdout.lock(), rng)?
        }
        Opponent::Classic => {
            let evaluator = RolloutEvaluator::new();
            let agent = Agent::new("classic", &evaluator, args.agent());
            play_interactive(game, &agent, !args.human_second, stdin.lock(), stdout.lock(), rng)?
        }
    };
    info!(outcome, "Interactive game finished");
    Ok(())
}
