//! Property tests - collision and board invariants under random play

use proptest::prelude::*;

use hexon_tetris::core::{Board, EngineConfig, GameState};
use hexon_tetris::types::{GameAction, PieceKind};

fn action_strategy() -> impl Strategy<Value = GameAction> {
    prop_oneof![
        4 => Just(GameAction::MoveLeft),
        4 => Just(GameAction::MoveRight),
        3 => Just(GameAction::Rotate),
        3 => Just(GameAction::SoftDrop),
        2 => Just(GameAction::Tick),
        1 => Just(GameAction::HardDrop),
    ]
}

fn kind_strategy() -> impl Strategy<Value = PieceKind> {
    (0usize..7).prop_map(|i| PieceKind::ALL[i])
}

proptest! {
    #[test]
    fn active_piece_never_overlaps(
        seed in any::<u32>(),
        wide in any::<bool>(),
        actions in prop::collection::vec(action_strategy(), 0..300),
    ) {
        let config = if wide { EngineConfig::wide() } else { EngineConfig::default() };
        let mut game = GameState::with_config(config, seed).unwrap();
        game.start();

        for action in actions {
            game.apply_action(action);
            if let Some(cells) = game.active_cells() {
                prop_assert!(!game.board().collision(&cells));
                for (x, y) in cells {
                    prop_assert!(x >= 0 && x < game.board().width() as i8);
                    prop_assert!(y < game.board().height() as i8);
                }
            }
            prop_assert_eq!(game.game_over(), game.active().is_none());
        }
    }

    #[test]
    fn lock_conserves_cells(
        seed in any::<u32>(),
        actions in prop::collection::vec(action_strategy(), 0..300),
    ) {
        let mut game = GameState::new(seed);
        game.start();
        let cols = game.board().width() as usize;

        for action in actions {
            let before = game.board().filled_count();
            game.apply_action(action);
            if let Some(event) = game.take_last_event() {
                let expected =
                    before + event.cells_locked as usize - cols * event.lines_cleared as usize;
                prop_assert_eq!(game.board().filled_count(), expected);
                prop_assert!(event.lines_cleared <= 4);
            }
        }
    }

    #[test]
    fn scores_never_decrease(
        seed in any::<u32>(),
        actions in prop::collection::vec(action_strategy(), 0..200),
    ) {
        let mut game = GameState::new(seed);
        game.start();
        let (mut score, mut lines, mut level) = (0, 0, 1);

        for action in actions {
            game.apply_action(action);
            prop_assert!(game.score() >= score);
            prop_assert!(game.lines() >= lines);
            prop_assert!(game.level() >= level);
            prop_assert!(game.drop_interval_ms() >= 150);
            score = game.score();
            lines = game.lines();
            level = game.level();
        }
    }

    #[test]
    fn same_seed_same_game(
        seed in any::<u32>(),
        actions in prop::collection::vec(action_strategy(), 0..150),
    ) {
        let mut a = GameState::new(seed);
        let mut b = GameState::new(seed);
        a.start();
        b.start();
        for action in actions {
            a.apply_action(action);
            b.apply_action(action);
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn clear_rows_keeps_non_full_rows_in_order(
        fills in prop::collection::vec(prop::collection::vec(any::<bool>(), 10), 20),
        full_rows in prop::collection::btree_set(0usize..20, 0..=4),
        kind in kind_strategy(),
    ) {
        let mut board = Board::default();
        for (y, row) in fills.iter().enumerate() {
            let full = full_rows.contains(&y);
            for (x, &filled) in row.iter().enumerate() {
                // Keep partial rows partial so only the chosen rows are full.
                let set = full || (filled && x != 0);
                if set {
                    board.set(x as i8, y as i8, Some(kind));
                }
            }
        }

        let survivors: Vec<Vec<bool>> = board
            .rows()
            .enumerate()
            .filter(|(y, _)| !full_rows.contains(y))
            .map(|(_, row)| row.iter().map(|c| c.is_some()).collect())
            .collect();

        let found = board.full_rows();
        let expected: Vec<usize> = full_rows.iter().copied().collect();
        prop_assert_eq!(found.as_slice(), expected.as_slice());
        let removed = board.clear_rows(&found);
        prop_assert_eq!(removed, full_rows.len());

        let after: Vec<Vec<bool>> = board
            .rows()
            .map(|row| row.iter().map(|c| c.is_some()).collect())
            .collect();
        let empty_top = vec![vec![false; 10]; removed];
        prop_assert_eq!(&after[..removed], &empty_top[..]);
        prop_assert_eq!(&after[removed..], &survivors[..]);
    }
}
