//! Engine integration tests - drops, locks, clears, scoring and progression

use hexon_tetris::core::config::MAX_DIMENSION;
use hexon_tetris::core::{EngineConfig, GameState, LoggedAction, PieceQueue, Randomizer};
use hexon_tetris::types::{GameAction, PieceKind};

fn fill_row(game: &mut GameState, y: i8, except: &[i8]) {
    let cols = game.board().width() as i8;
    for x in 0..cols {
        if !except.contains(&x) {
            game.board_mut().set(x, y, Some(PieceKind::L));
        }
    }
}

/// Drop a vertical I into column 5 (spawn x = 3, state 1 sits at x + 2)
fn drop_vertical_i(game: &mut GameState) -> u32 {
    assert!(game.spawn_kind(PieceKind::I));
    assert!(game.rotate());
    assert_eq!(game.active_cells().map(|c| c[0].0), Some(5));
    game.hard_drop()
}

/// Fill rows 16..=19 except column 5 and drop a vertical I into the gap
fn tetris(game: &mut GameState) {
    for y in 16..20 {
        fill_row(game, y, &[5]);
    }
    drop_vertical_i(game);
}

#[test]
fn test_o_hard_drop_on_empty_board() {
    let mut game = GameState::new(7);
    game.spawn_kind(PieceKind::O);

    let falls = game.hard_drop();
    assert_eq!(falls, 19);
    assert_eq!(game.score(), 38);
    assert_eq!(game.gp(), 38);
    assert_eq!(game.board().filled_count(), 4);
    assert_eq!(game.combo(), 0);
    assert_eq!(game.board().get(4, 19), Some(Some(PieceKind::O)));
    assert_eq!(game.board().get(5, 18), Some(Some(PieceKind::O)));
}

#[test]
fn test_single_line_clear() {
    let mut game = GameState::new(7);
    fill_row(&mut game, 19, &[4, 5]);
    game.spawn_kind(PieceKind::O);
    game.hard_drop();

    assert_eq!(game.lines(), 1);
    assert_eq!(game.combo(), 1);
    assert_eq!(game.score(), 38 + 100);
    assert_eq!(game.gp(), 38 + 10 + 5);
    assert_eq!(game.gp_earned(), game.gp());
    // Top half of the O slides into the cleared row.
    assert_eq!(game.board().filled_count(), 2);
    assert_eq!(game.board().get(4, 19), Some(Some(PieceKind::O)));

    let event = game.take_last_event().unwrap();
    assert_eq!(event.lines_cleared, 1);
    assert_eq!(event.line_clear_score, 100);
    assert_eq!(event.gp_awarded, 15);
    assert!(!event.level_up);
}

#[test]
fn test_combo_grows_and_resets() {
    let mut game = GameState::new(7);
    tetris(&mut game);
    assert_eq!(game.combo(), 1);
    tetris(&mut game);
    assert_eq!(game.combo(), 2);
    // Second clear: 4 * 10 + combo 2 * 5.
    let event = game.take_last_event().unwrap();
    assert_eq!(event.gp_awarded, 50);

    game.spawn_kind(PieceKind::O);
    game.hard_drop();
    assert_eq!(game.combo(), 0);
    assert_eq!(game.take_last_event().unwrap().combo, 0);
}

#[test]
fn test_line_score_scales_with_level() {
    let mut game = GameState::new(7);
    tetris(&mut game);
    tetris(&mut game);
    // 8 lines; a double lands exactly on 10.
    fill_row(&mut game, 18, &[5]);
    fill_row(&mut game, 19, &[5]);
    let before = game.score();
    let falls = drop_vertical_i(&mut game);
    assert_eq!(game.score() - before, falls * 2 + 300);
    assert_eq!(game.lines(), 10);
    assert_eq!(game.level(), 2);
    assert_eq!(game.drop_interval_ms(), 900);

    // Next tetris is worth 800 * 2. Clear out the I leftovers first.
    game.board_mut().clear();
    let before = game.score();
    tetris(&mut game);
    assert_eq!(game.score() - before, 17 * 2 + 1600);
}

#[test]
fn test_level_up_requires_exact_multiple_of_ten() {
    let mut game = GameState::new(7);
    tetris(&mut game);
    tetris(&mut game);
    assert_eq!(game.lines(), 8);
    tetris(&mut game);
    assert_eq!(game.lines(), 12);
    // 8 -> 12 jumps over 10 without landing on it.
    assert_eq!(game.level(), 1);
    assert_eq!(game.drop_interval_ms(), 1000);
}

#[test]
fn test_drop_interval_floor() {
    let config = EngineConfig {
        initial_drop_ms: 160,
        ..EngineConfig::default()
    };
    let mut game = GameState::with_config(config, 3).unwrap();
    tetris(&mut game);
    tetris(&mut game);
    fill_row(&mut game, 18, &[5]);
    fill_row(&mut game, 19, &[5]);
    drop_vertical_i(&mut game);

    assert_eq!(game.level(), 2);
    assert_eq!(game.drop_interval_ms(), 150);
}

#[test]
fn test_spawn_collision_is_game_over() {
    let mut game = GameState::new(7);
    game.board_mut().set(4, 0, Some(PieceKind::T));

    assert!(!game.spawn_kind(PieceKind::O));
    assert!(game.game_over());
    assert!(!game.playing());
    assert!(game.active().is_none());
    assert_eq!(
        game.action_log().last().map(|r| r.action),
        Some(LoggedAction::GameOver { score: 0, lines: 0 })
    );

    // Nothing moves the game until a restart.
    assert!(!game.soft_drop());
    assert_eq!(game.hard_drop(), 0);
    assert!(!game.tick());
    assert_eq!(game.board().filled_count(), 1);
}

#[test]
fn test_game_over_on_lock_reports_event() {
    let mut game = GameState::new(7);
    for y in 1..20 {
        fill_row(&mut game, y, &[0]);
    }
    game.spawn_kind(PieceKind::O);
    game.hard_drop();

    assert!(game.game_over());
    assert!(game.take_last_event().unwrap().game_over);
}

#[test]
fn test_restart_clears_progress_but_keeps_balance() {
    let mut game = GameState::new(7);
    game.start();
    game.apply_action(GameAction::HardDrop);
    game.sync_gp(250);
    assert!(game.score() > 0);

    assert!(game.apply_action(GameAction::Restart));
    assert_eq!(game.score(), 0);
    assert_eq!(game.lines(), 0);
    assert_eq!(game.level(), 1);
    assert_eq!(game.gp_earned(), 0);
    assert_eq!(game.gp(), 250);
    assert_eq!(game.board().filled_count(), 0);
    assert_eq!(game.episode_id(), 1);
    assert_eq!(game.piece_id(), 1);
}

#[test]
fn test_rotation_round_trip_keeps_anchor() {
    for kind in PieceKind::ALL {
        let mut game = GameState::new(1);
        game.spawn_kind(kind);
        let start = game.active().unwrap();
        let states = hexon_tetris::core::pieces::state_count(kind);

        for _ in 0..states {
            assert!(game.rotate(), "{:?} failed to rotate", kind);
        }

        let end = game.active().unwrap();
        assert_eq!(end.rotation, 0, "{:?}", kind);
        assert_eq!((end.x, end.y), (start.x, start.y), "{:?}", kind);
        assert_eq!(end.cells(), start.cells(), "{:?}", kind);
    }
}

#[test]
fn test_o_rotation_stays_on_single_state() {
    let mut game = GameState::new(1);
    game.spawn_kind(PieceKind::O);
    let before = game.active_cells();
    game.rotate();
    assert_eq!(game.active().unwrap().rotation, 0);
    assert_eq!(game.active_cells(), before);
}

#[test]
fn test_rotation_at_wall_kicks() {
    let mut game = GameState::new(1);
    game.spawn_kind(PieceKind::I);
    game.rotate();
    while game.move_horizontal(1) {}
    // Vertical I pinned to column 9.
    assert_eq!(game.active_cells().unwrap()[0].0, 9);

    assert!(game.rotate());
    let cells = game.active_cells().unwrap();
    assert!(cells.iter().all(|&(x, _)| (0..10).contains(&x)));
    assert_eq!(game.active().unwrap().rotation, 2);
}

#[test]
fn test_preview_is_cosmetic_by_default() {
    let seed = 99;
    let mut reference = PieceQueue::new(seed, Randomizer::Uniform);
    let draws: Vec<PieceKind> = (0..4).map(|_| reference.draw()).collect();

    let mut game = GameState::new(seed);
    game.start();
    assert_eq!(game.active().unwrap().kind, draws[0]);
    assert_eq!(game.next_piece(), Some(draws[1]));

    game.hard_drop();
    // The shown preview was discarded; the spawn drew a fresh kind.
    assert_eq!(game.active().unwrap().kind, draws[2]);
    assert_eq!(game.next_piece(), Some(draws[3]));
}

#[test]
fn test_preview_commits_when_configured() {
    let seed = 99;
    let mut reference = PieceQueue::new(seed, Randomizer::Uniform);
    let draws: Vec<PieceKind> = (0..3).map(|_| reference.draw()).collect();

    let config = EngineConfig {
        commit_preview: true,
        ..EngineConfig::default()
    };
    let mut game = GameState::with_config(config, seed).unwrap();
    game.start();
    assert_eq!(game.next_piece(), Some(draws[1]));

    game.hard_drop();
    assert_eq!(game.active().unwrap().kind, draws[1]);
    assert_eq!(game.next_piece(), Some(draws[2]));
}

#[test]
fn test_wide_board_spawns_centered() {
    let mut game = GameState::with_config(EngineConfig::wide(), 5).unwrap();
    game.spawn_kind(PieceKind::O);
    assert_eq!(game.active().unwrap().x, 5);
    assert_eq!(game.hard_drop(), 23);
}

fn widest_game() -> GameState {
    let config = EngineConfig {
        cols: MAX_DIMENSION,
        ..EngineConfig::default()
    };
    GameState::with_config(config, 5).unwrap()
}

#[test]
fn test_widest_board_blocked_rotation_is_a_no_op() {
    let mut game = widest_game();
    assert!(game.spawn_kind(PieceKind::I));
    assert!(game.rotate());
    while game.move_horizontal(1) {}

    let piece = game.active().unwrap();
    assert_eq!((piece.x, piece.y, piece.rotation), (117, -1, 1));

    // Every kick for the flat I either leaves the board or hits this cell.
    game.board_mut().set(116, 1, Some(PieceKind::L));
    assert!(!game.rotate());
    assert_eq!(game.active(), Some(piece));
}

#[test]
fn test_widest_board_rotates_every_kind_against_both_walls() {
    let mut game = widest_game();
    for kind in PieceKind::ALL {
        for dir in [1, -1] {
            game.board_mut().clear();
            assert!(game.spawn_kind(kind));
            for _ in 0..4 {
                while game.move_horizontal(dir) {}
                game.rotate();
            }
            let cells = game.active_cells().unwrap();
            assert!(cells
                .iter()
                .all(|&(x, _)| (0..MAX_DIMENSION as i8).contains(&x)));
        }
    }
}

#[test]
fn test_bag_randomizer_deals_each_kind_once_per_bag() {
    let config = EngineConfig {
        randomizer: Randomizer::Bag,
        commit_preview: true,
        ..EngineConfig::default()
    };
    let mut game = GameState::with_config(config, 11).unwrap();
    game.start();

    let mut seen = Vec::new();
    seen.push(game.active().unwrap().kind);
    for _ in 0..6 {
        // Clear the board so stacking never ends the game.
        game.board_mut().clear();
        game.hard_drop();
        seen.push(game.active().unwrap().kind);
    }

    seen.sort_by_key(|k| k.id());
    assert_eq!(seen, PieceKind::ALL.to_vec());
}

#[test]
fn test_action_log_records_effective_actions_only() {
    let mut game = GameState::new(1);
    game.spawn_kind(PieceKind::O);
    let logged = game.action_log().len();

    while game.move_horizontal(-1) {}
    let after_moves = game.action_log().len();
    // Four successful moves; the blocked one is not recorded.
    assert_eq!(after_moves - logged, 4);

    game.hard_drop();
    let names: Vec<&str> = game
        .action_log()
        .iter()
        .skip(after_moves)
        .map(|r| r.action.name())
        .collect();
    assert_eq!(names, vec!["hardDrop", "spawn"]);
}

#[test]
fn test_session_report_uses_earned_currency() {
    let mut game = GameState::new(1);
    game.spawn_kind(PieceKind::O);
    game.hard_drop();
    game.sync_gp(1000);

    let id = hexon_tetris::core::SessionId::from_seed(4);
    let report = game.session_report(&id);
    assert_eq!(report.session_id, id);
    assert_eq!(report.score, 38);
    assert_eq!(report.gp_earned, 38);
    assert_eq!(
        report.action_log.last().map(|r| r.action),
        Some(LoggedAction::CurrencySync { gp: 1000 })
    );
}
