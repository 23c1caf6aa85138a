use super::*;
use rand::{Rng, SeedableRng};

fn play(game: &mut Connect4, columns: &[usize]) {
    for &col in columns {
        game.step(col).unwrap();
    }
}

#[test]
fn test_initial_state() {
    let game = Connect4::new();
    assert_eq!(game.board, [0; BOARD_SIZE]);
    assert_eq!(game.current_player(), 1);
    assert_eq!(game.winner(), 0);
    assert_eq!(game.column_heights, [0; COLS]);
    assert_eq!(game.result(), None);
    assert_eq!(game.turn_sign(), 1.0);
    assert_eq!(game.history_len(), 0);
}

#[test]
fn test_legal_actions() {
    let mut game = Connect4::new();
    assert_eq!(game.legal_actions(), (0..COLS).collect::<Vec<_>>());
    assert_eq!(game.legal_moves_mask(), 0x7F);

    game.step(3).unwrap();
    assert_eq!(game.legal_actions().len(), 7);
}

#[test]
fn test_step_places_disc_and_switches_player() {
    let mut game = Connect4::new();
    game.step(3).unwrap();

    assert_eq!(game.cell(3, 0), 1);
    assert_eq!(game.column_heights[3], 1);
    assert_eq!(game.current_player(), 2);
    assert_eq!(game.turn_sign(), -1.0);
}

#[test]
fn test_full_column_is_illegal() {
    let mut game = Connect4::new();
    play(&mut game, &[0; ROWS]);

    assert!(!game.legal_actions().contains(&0));
    let before = game.clone();
    assert_eq!(game.step(0), Err(GameError::IllegalAction { action: 0 }));
    assert_eq!(game, before);
}

#[test]
fn test_out_of_range_action_is_illegal() {
    let mut game = Connect4::new();
    assert_eq!(game.step(7), Err(GameError::IllegalAction { action: 7 }));
    assert_eq!(game.history_len(), 0);
}

#[test]
fn test_horizontal_win() {
    let mut game = Connect4::new();
    // Red: bottom row 0..3, Yellow stacks on top
    play(&mut game, &[0, 0, 1, 1, 2, 2, 3]);

    assert_eq!(game.winner(), 1);
    assert_eq!(game.result(), Some(1.0));
    // Yellow is to move and has lost
    assert_eq!(game.turn_sign(), -1.0);
    assert_eq!(game.first_person_result(), Some(-1.0));
    assert!(game.legal_actions().is_empty());
}

#[test]
fn test_vertical_win_for_second_player() {
    let mut game = Connect4::new();
    play(&mut game, &[0, 1, 0, 1, 0, 1, 6, 1]);

    assert_eq!(game.winner(), 2);
    assert_eq!(game.result(), Some(-1.0));
    assert_eq!(game.first_person_result(), Some(-1.0));
}

#[test]
fn test_diagonal_win() {
    let mut game = Connect4::new();
    // Red builds (0,0) (1,1) (2,2) (3,3)
    play(&mut game, &[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);

    assert_eq!(game.winner(), 1);
    assert_eq!(game.result(), Some(1.0));
}

#[test]
fn test_anti_diagonal_win() {
    let mut game = Connect4::new();
    // Red builds (3,0) (2,1) (1,2) (0,3)
    play(&mut game, &[3, 2, 2, 1, 1, 0, 1, 0, 0, 6, 0]);

    assert_eq!(game.winner(), 1);
}

#[test]
fn test_draw() {
    let mut game = Connect4::new();
    // Column pattern that fills the board without four in a row:
    // pairs of columns alternate colours every two rows.
    let order = [0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1];
    play(&mut game, &order);
    let order = [2, 3, 2, 3, 3, 2, 3, 2, 2, 3, 2, 3];
    play(&mut game, &order);
    let order = [4, 5, 4, 5, 5, 4, 5, 4, 4, 5, 4, 5];
    play(&mut game, &order);
    play(&mut game, &[6; ROWS]);

    assert_eq!(game.history_len(), BOARD_SIZE);
    assert_eq!(game.winner(), 3);
    assert_eq!(game.result(), Some(0.0));
    assert!(game.legal_actions().is_empty());
}

#[test]
fn test_undo_restores_position() {
    let mut game = Connect4::new();
    play(&mut game, &[3, 3, 4]);
    let before = game.clone();
    let obs_before = game.to_observation();

    game.step(5).unwrap();
    game.undo_last_action().unwrap();

    assert_eq!(game, before);
    assert_eq!(game.to_observation(), obs_before);
}

#[test]
fn test_undo_after_win_reopens_game() {
    let mut game = Connect4::new();
    play(&mut game, &[0, 0, 1, 1, 2, 2, 3]);
    assert!(game.is_terminal());

    game.undo_last_action().unwrap();
    assert!(!game.is_terminal());
    assert_eq!(game.current_player(), 1);
    assert_eq!(game.legal_actions().len(), 7);
}

#[test]
fn test_undo_empty_history() {
    let mut game = Connect4::new();
    assert_eq!(game.undo_last_action(), Err(GameError::EmptyHistory));
}

#[test]
fn test_observation_is_from_mover_perspective() {
    let mut game = Connect4::new();
    game.step(3).unwrap();

    let obs = game.to_observation();
    assert_eq!(obs.len(), game.observation_size());
    assert_eq!(game.observation_shape(), &[3, 6, 7]);

    let idx = Connect4::pos(3, 0);
    // Yellow to move: the Red disc is an opponent disc
    assert_eq!(obs[idx], 0.0);
    assert_eq!(obs[BOARD_SIZE + idx], 1.0);
    assert_eq!(obs[2 * BOARD_SIZE + idx], 0.0);

    // Every cell is in exactly one plane
    for i in 0..BOARD_SIZE {
        let total = obs[i] + obs[BOARD_SIZE + i] + obs[2 * BOARD_SIZE + i];
        assert_eq!(total, 1.0);
    }
}

#[test]
fn test_reset_clears_history() {
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let mut game = Connect4::new();
    play(&mut game, &[1, 2, 3]);

    game.reset(&mut rng);
    assert_eq!(game, Connect4::new());
}

#[test]
fn test_registration() {
    register_connect4();
    let game = engine_core::create_game("connect4").unwrap();
    assert_eq!(game.env_id(), "connect4");
    assert_eq!(game.action_space_size(), COLS);
    assert_eq!(game.max_game_length(), BOARD_SIZE);
}

#[test]
fn test_random_games_invariants() {
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut game = Connect4::new();
        game.reset(&mut rng);
        let initial_obs = game.to_observation();

        while !game.is_terminal() {
            let legal = game.legal_actions();
            assert!(
                !legal.is_empty(),
                "Non-terminal game must have legal moves (seed={}, moves={})",
                seed,
                game.history_len()
            );

            let action = legal[rng.gen_range(0..legal.len())];
            let before = game.to_observation();
            let prev_sign = game.turn_sign();

            game.step(action).unwrap();
            assert_eq!(game.turn_sign(), -prev_sign, "seed={}", seed);

            // step/undo round trip from every intermediate position
            game.undo_last_action().unwrap();
            assert_eq!(game.to_observation(), before, "seed={}", seed);
            game.step(action).unwrap();

            assert!(game.history_len() <= game.max_game_length());
        }

        let result = game.result().unwrap();
        assert_eq!(
            game.first_person_result(),
            Some(result * game.turn_sign()),
            "seed={}",
            seed
        );

        // Unwind the whole game back to the opening
        while game.history_len() > 0 {
            game.undo_last_action().unwrap();
        }
        assert_eq!(game.to_observation(), initial_obs, "seed={}", seed);
        assert_eq!(game, Connect4::new());
    }
}
