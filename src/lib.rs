//! Hexon Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under short names and adds the [`host`]
//! module, the serial game-loop driver used by the `hexon-tetris` binary.

pub use hexon_tetris_adapter as adapter;
pub use hexon_tetris_core as core;
pub use hexon_tetris_types as types;

pub mod host;
