//! Pieces module - tetromino rotation states and kick-based rotation
//!
//! Each kind owns an ordered list of rotation states; a state is four cell
//! offsets relative to the piece anchor (top-left of its bounding frame).
//! Symmetric kinds carry fewer states: O has one, S and Z have two.
//!
//! Rotation advances the state index by one (modulo the state count) and tries
//! a short prioritized list of positional nudges ("kicks"). The first kick whose
//! cells are free wins; no attempt is made to rank kicks.

use crate::types::{PieceKind, SPAWN_SPAN};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - 4 mino offsets from piece origin
pub type PieceShape = [MinoOffset; 4];

const I_STATES: [PieceShape; 4] = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

const J_STATES: [PieceShape; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_STATES: [PieceShape; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

const O_STATES: [PieceShape; 1] = [[(1, 0), (2, 0), (1, 1), (2, 1)]];

const S_STATES: [PieceShape; 2] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
];

const T_STATES: [PieceShape; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_STATES: [PieceShape; 2] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
];

/// Ordered rotation states for a piece kind
pub fn rotation_states(kind: PieceKind) -> &'static [PieceShape] {
    match kind {
        PieceKind::I => &I_STATES,
        PieceKind::J => &J_STATES,
        PieceKind::L => &L_STATES,
        PieceKind::O => &O_STATES,
        PieceKind::S => &S_STATES,
        PieceKind::T => &T_STATES,
        PieceKind::Z => &Z_STATES,
    }
}

/// Number of distinct rotation states for a kind
pub fn state_count(kind: PieceKind) -> u8 {
    rotation_states(kind).len() as u8
}

/// Get the shape for a kind and rotation index (index taken modulo the state count)
pub fn get_shape(kind: PieceKind, rotation: u8) -> PieceShape {
    let states = rotation_states(kind);
    states[rotation as usize % states.len()]
}

/// Kick offsets tried in order when rotating: none, left, right, 2 left, 2 right, up
pub const KICKS: [(i8, i8); 6] = [(0, 0), (-1, 0), (1, 0), (-2, 0), (2, 0), (0, -1)];

/// Try to rotate a piece with kicks
///
/// `is_free` reports whether a candidate set of absolute cells is collision-free.
/// Returns `Some((new_rotation, kick_offset))` for the first kick that fits,
/// `None` if every kick collides.
pub fn try_rotate(
    kind: PieceKind,
    rotation: u8,
    x: i8,
    y: i8,
    is_free: impl Fn(&[(i8, i8); 4]) -> bool,
) -> Option<(u8, (i8, i8))> {
    let new_rotation = (rotation + 1) % state_count(kind);
    let shape = get_shape(kind, new_rotation);

    for &(dx, dy) in KICKS.iter() {
        let cells = absolute_cells(&shape, x + dx, y + dy);
        if is_free(&cells) {
            return Some((new_rotation, (dx, dy)));
        }
    }

    None
}

/// Translate a shape by an anchor into absolute board cells
pub fn absolute_cells(shape: &PieceShape, x: i8, y: i8) -> [(i8, i8); 4] {
    shape.map(|(dx, dy)| (x + dx, y + dy))
}

/// Horizontal anchor centering the reserved spawn span on a board of `cols` columns
pub fn spawn_x(cols: u8) -> i8 {
    (cols.saturating_sub(SPAWN_SPAN) / 2) as i8
}
