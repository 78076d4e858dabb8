//! Action log - bounded record of what happened during a game
//!
//! Hosts attach the tail of this log to the session report sent after game over.
//! Only effective actions are recorded (a move into a wall leaves no entry).
//! The engine has no clock; `seq` orders entries and a host may pair it with
//! its own timestamps.

use std::collections::VecDeque;

use crate::types::{PieceKind, ACTION_LOG_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggedAction {
    Spawn { kind: PieceKind },
    Move { dir: i8 },
    SoftDrop,
    HardDrop { falls: u32 },
    Rotate { rotation: u8 },
    /// Automatic gravity step; `moved == false` means the tick locked the piece
    TickDrop { moved: bool },
    Clear { count: u32, combo: u32 },
    GameOver { score: u32, lines: u32 },
    CurrencySync { gp: u32 },
}

impl LoggedAction {
    /// Short name used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            LoggedAction::Spawn { .. } => "spawn",
            LoggedAction::Move { .. } => "move",
            LoggedAction::SoftDrop => "softDrop",
            LoggedAction::HardDrop { .. } => "hardDrop",
            LoggedAction::Rotate { .. } => "rotate",
            LoggedAction::TickDrop { .. } => "tickDrop",
            LoggedAction::Clear { .. } => "clear",
            LoggedAction::GameOver { .. } => "gameOver",
            LoggedAction::CurrencySync { .. } => "currencySync",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    pub seq: u64,
    pub action: LoggedAction,
}

/// Bounded FIFO of action records; the oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct ActionLog {
    records: VecDeque<ActionRecord>,
    capacity: usize,
    next_seq: u64,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::with_capacity(ACTION_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(ACTION_LOG_CAPACITY)),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, action: LoggedAction) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(ActionRecord {
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// The last `n` records, oldest first
    pub fn tail(&self, n: usize) -> Vec<ActionRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total entries ever pushed since the last clear
    pub fn total_recorded(&self) -> u64 {
        self.next_seq
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.next_seq = 0;
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
