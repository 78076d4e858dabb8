//! Owned, renderer-friendly copy of everything a UI or observer reads.

use crate::types::PieceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
    /// Absolute cells; rows may be negative while the piece is above the board
    pub cells: [(i8, i8); 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major piece ids, 0 = empty
    pub board: Vec<Vec<u8>>,
    pub active: Option<ActiveSnapshot>,
    pub next: Option<PieceKind>,
    pub score: u32,
    pub gp: u32,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub drop_interval_ms: u32,
    pub playing: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub piece_id: u32,
    pub seed: u32,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.playing && !self.game_over
    }
}
