//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, making them usable
//! from the engine, the host loop, and the JSON adapter alike.
//!
//! # Board Dimensions
//!
//! Two grid presets are in use:
//!
//! - **Default**: 20 rows x 10 columns
//! - **Wide**: 24 rows x 14 columns
//!
//! New pieces spawn horizontally centered over a reserved 4-column span,
//! with their anchor one row above the visible board (`SPAWN_Y = -1`).
//!
//! # Progression Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_DROP_MS` | 1000 | Drop interval at level 1 |
//! | `DROP_SPEEDUP_NUMERATOR / DROP_SPEEDUP_DENOMINATOR` | 9/10 | Interval factor per level-up |
//! | `DROP_INTERVAL_FLOOR_MS` | 150 | Interval never drops below this |
//! | `LINES_PER_LEVEL` | 10 | Level-up when the line total is a multiple of this |
//!
//! # Examples
//!
//! ```
//! use hexon_tetris_types::{GameAction, PieceKind, DEFAULT_COLS, DEFAULT_ROWS};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! let action = GameAction::from_str("hardDrop").unwrap();
//! assert_eq!(action, GameAction::HardDrop);
//!
//! assert_eq!((DEFAULT_ROWS, DEFAULT_COLS), (20, 10));
//! ```

/// Default board height in rows
pub const DEFAULT_ROWS: u8 = 20;

/// Default board width in columns
pub const DEFAULT_COLS: u8 = 10;

/// Wide preset height in rows
pub const WIDE_ROWS: u8 = 24;

/// Wide preset width in columns
pub const WIDE_COLS: u8 = 14;

/// Width of the column span a new piece is centered over
pub const SPAWN_SPAN: u8 = 4;

/// Anchor row for newly spawned pieces (one row above the visible board)
pub const SPAWN_Y: i8 = -1;

/// Host poll granularity in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Drop interval at level 1 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Drop interval speed-up per level (9/10 = x0.9)
pub const DROP_SPEEDUP_NUMERATOR: u32 = 9;

/// Drop interval speed-up denominator
pub const DROP_SPEEDUP_DENOMINATOR: u32 = 10;

/// Drop interval floor (150ms)
pub const DROP_INTERVAL_FLOOR_MS: u32 = 150;

/// Lines needed per level-up
pub const LINES_PER_LEVEL: u32 = 10;

/// Level at game start
pub const START_LEVEL: u32 = 1;

/// Line clear scoring table
///
/// Base points for clearing N lines in one lock, multiplied by the level:
/// - 1 line: 100
/// - 2 lines: 300
/// - 3 lines: 500
/// - 4 lines: 800
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Score and currency for one successful soft-drop step
pub const SOFT_DROP_REWARD: u32 = 1;

/// Score and currency per row fallen during a hard drop
pub const HARD_DROP_MULTIPLIER: u32 = 2;

/// Currency per cleared line
pub const CLEAR_REWARD_PER_LINE: u32 = 10;

/// Currency per combo step on a clearing lock
pub const COMBO_REWARD: u32 = 5;

/// Maximum number of entries retained by the action log
pub const ACTION_LOG_CAPACITY: usize = 5000;

/// Number of trailing action log entries carried by a session report
pub const REPORT_LOG_TAIL: usize = 2000;

/// The seven tetromino piece kinds
///
/// The kind is stored in locked board cells purely for identity/color;
/// gameplay never branches on it beyond shape lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in canonical order (the order random selection indexes into)
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use hexon_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "o" => Some(PieceKind::O),
            "s" => Some(PieceKind::S),
            "t" => Some(PieceKind::T),
            "z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }

    /// Stable 1-based id used in u8 board grids (0 means empty)
    pub fn id(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::J => 2,
            PieceKind::L => 3,
            PieceKind::O => 4,
            PieceKind::S => 5,
            PieceKind::T => 6,
            PieceKind::Z => 7,
        }
    }
}

/// Logical commands accepted by the engine
///
/// These come from any input source (keyboard, touch, remote controller);
/// the engine never sees devices, only these actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Step the piece down one row (rewarded on success, never locks)
    SoftDrop,
    /// Drop to the lowest valid row and lock
    HardDrop,
    /// Advance to the next rotation state, trying kicks
    Rotate,
    /// Automatic gravity step: descend or lock
    Tick,
    /// Reset the board and spawn a fresh piece
    Restart,
}

impl GameAction {
    /// Parse action from string (for the host protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use hexon_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::Rotate));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotate" => Some(GameAction::Rotate),
            "tick" => Some(GameAction::Tick),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string for the host protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::Rotate => "rotate",
            GameAction::Tick => "tick",
            GameAction::Restart => "restart",
        }
    }
}

/// Core-side event emitted after a piece locks.
///
/// Engine-internal; the adapter maps it to the protocol `last_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreLastEvent {
    /// Cells written to the board (cells still above the top are discarded)
    pub cells_locked: u8,
    pub lines_cleared: u32,
    pub line_clear_score: u32,
    /// Currency earned by the clear (drop rewards are not included)
    pub gp_awarded: u32,
    pub combo: u32,
    pub level_up: bool,
    /// The spawn that followed this lock failed
    pub game_over: bool,
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Cell filled with the specified piece kind
pub type Cell = Option<PieceKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_defaults() {
        assert_eq!(BASE_DROP_MS, 1000);
        assert_eq!(DROP_INTERVAL_FLOOR_MS, 150);
        assert_eq!(
            BASE_DROP_MS * DROP_SPEEDUP_NUMERATOR / DROP_SPEEDUP_DENOMINATOR,
            900
        );
        assert_eq!(LINES_PER_LEVEL, 10);
        assert_eq!(START_LEVEL, 1);
    }

    #[test]
    fn spawn_span_fits_both_presets() {
        assert!(SPAWN_SPAN <= DEFAULT_COLS);
        assert!(SPAWN_SPAN <= WIDE_COLS);
        assert!(REPORT_LOG_TAIL <= ACTION_LOG_CAPACITY);
    }
}
