//! Core game logic - the board and piece engine
//!
//! Pure, deterministic and free of I/O: no rendering, no networking and no
//! clock. A host feeds logical commands in and reads state back out.
//!
//! # Module Structure
//!
//! - [`board`]: configurable grid with the permeable-top collision rule and line clearing
//! - [`pieces`]: per-kind rotation-state tables and the ordered kick list
//! - [`rng`]: seeded LCG with uniform (default) or 7-bag piece selection
//! - [`scoring`]: line-clear points, drop rewards, currency, level progression
//! - [`config`]: board dimensions, timing and randomizer settings
//! - [`game_state`]: the engine itself (`GameState`)
//! - [`action_log`]: bounded record of effective actions
//! - [`session`]: session id and the end-of-game report
//! - [`snapshot`]: owned copy of readable state for renderers and observers
//!
//! # Game Rules
//!
//! - Pieces spawn centered over a 4-column span, one row above the board.
//! - Rotation advances one state and tries kicks: none, left, right, 2 left, 2 right, up.
//! - Only `tick` and `hard_drop` lock; a failed soft drop does nothing.
//! - A clear of N rows scores `[0, 100, 300, 500, 800][N] * level`.
//! - Level rises when the line total lands exactly on a multiple of 10; each
//!   level-up multiplies the drop interval by 0.9, floored at 150ms.
//! - A spawn that collides ends the game.
//!
//! # Example
//!
//! ```
//! use hexon_tetris_core::GameState;
//! use hexon_tetris_types::{GameAction, PieceKind};
//!
//! let mut game = GameState::new(12345);
//! game.spawn_kind(PieceKind::O);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert_eq!(game.score(), 38); // 19 rows fallen, 2 points each
//! assert_eq!(game.board().filled_count(), 4);
//! ```

pub mod action_log;
pub mod board;
pub mod config;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use hexon_tetris_types as types;

// Re-export commonly used types for convenience
pub use action_log::{ActionLog, ActionRecord, LoggedAction};
pub use board::Board;
pub use config::{ConfigError, EngineConfig};
pub use game_state::{GameState, Tetromino};
pub use pieces::{get_shape, try_rotate, KICKS};
pub use rng::{PieceQueue, Randomizer, SimpleRng};
pub use session::{SessionId, SessionReport};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
