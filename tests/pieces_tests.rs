//! Pieces module tests - rotation-state tables and the kick list

use hexon_tetris::core::pieces::{
    absolute_cells, get_shape, rotation_states, spawn_x, state_count, try_rotate, KICKS,
};
use hexon_tetris::core::Board;
use hexon_tetris::types::{PieceKind, DEFAULT_COLS, WIDE_COLS};

// ============== Shape Tests ==============

#[test]
fn test_i_piece_shapes() {
    assert_eq!(get_shape(PieceKind::I, 0), [(0, 1), (1, 1), (2, 1), (3, 1)]);
    assert_eq!(get_shape(PieceKind::I, 1), [(2, 0), (2, 1), (2, 2), (2, 3)]);
    assert_eq!(state_count(PieceKind::I), 4);
}

#[test]
fn test_o_piece_single_state() {
    assert_eq!(state_count(PieceKind::O), 1);
    let shape = get_shape(PieceKind::O, 0);
    assert_eq!(shape, [(1, 0), (2, 0), (1, 1), (2, 1)]);
    assert_eq!(get_shape(PieceKind::O, 3), shape);
}

#[test]
fn test_s_and_z_have_two_states() {
    for kind in [PieceKind::S, PieceKind::Z] {
        assert_eq!(state_count(kind), 2);
        assert_eq!(get_shape(kind, 2), get_shape(kind, 0));
        assert_ne!(get_shape(kind, 1), get_shape(kind, 0));
    }
}

#[test]
fn test_four_state_kinds() {
    for kind in [PieceKind::I, PieceKind::J, PieceKind::L, PieceKind::T] {
        assert_eq!(rotation_states(kind).len(), 4, "{:?}", kind);
    }
}

// ============== Spawn Tests ==============

#[test]
fn test_spawn_x_centers_span() {
    assert_eq!(spawn_x(DEFAULT_COLS), 3);
    assert_eq!(spawn_x(WIDE_COLS), 5);
    assert_eq!(spawn_x(4), 0);
    assert_eq!(spawn_x(11), 3);
}

#[test]
fn test_absolute_cells_translate() {
    let cells = absolute_cells(&get_shape(PieceKind::T, 0), 3, -1);
    assert_eq!(cells, [(4, -1), (3, 0), (4, 0), (5, 0)]);
}

// ============== Rotation Tests ==============

#[test]
fn test_kick_order() {
    assert_eq!(KICKS, [(0, 0), (-1, 0), (1, 0), (-2, 0), (2, 0), (0, -1)]);
}

#[test]
fn test_rotate_in_open_space_uses_no_kick() {
    let board = Board::default();
    let result = try_rotate(PieceKind::T, 0, 3, 5, |cells| !board.collision(cells));
    assert_eq!(result, Some((1, (0, 0))));
}

#[test]
fn test_rotate_wraps_state_index() {
    let board = Board::default();
    let result = try_rotate(PieceKind::J, 3, 3, 5, |cells| !board.collision(cells));
    assert_eq!(result, Some((0, (0, 0))));

    let result = try_rotate(PieceKind::S, 1, 3, 5, |cells| !board.collision(cells));
    assert_eq!(result, Some((0, (0, 0))));
}

#[test]
fn test_rotate_against_right_wall_kicks_left() {
    // Vertical I in column 9 (anchor x = 7); its horizontal state spans x..x+3.
    let board = Board::default();
    let result = try_rotate(PieceKind::I, 1, 7, 5, |cells| !board.collision(cells));
    // Unkicked x=7 covers columns 7..=10, one over. Left by one fits.
    assert_eq!(result, Some((2, (-1, 0))));
}

#[test]
fn test_rotate_against_left_wall_kicks_right() {
    // Vertical I in column 0 (anchor x = -1); state 2 needs columns x..x+3.
    let board = Board::default();
    let result = try_rotate(PieceKind::I, 3, -1, 5, |cells| !board.collision(cells));
    // (0,0) covers -1..=2, (-1,0) worse, (1,0) fits.
    assert_eq!(result, Some((0, (1, 0))));
}

#[test]
fn test_rotate_blocked_everywhere() {
    let result = try_rotate(PieceKind::T, 0, 3, 5, |_| false);
    assert_eq!(result, None);
}

#[test]
fn test_rotate_falls_back_to_upward_kick() {
    let mut board = Board::default();
    // Wall off every horizontal kick for T state 1 at anchor (3, 17).
    for x in 0..DEFAULT_COLS as i8 {
        board.set(x, 19, Some(PieceKind::Z));
    }
    let result = try_rotate(PieceKind::T, 0, 3, 17, |cells| !board.collision(cells));
    // State 1 occupies rows y..y+2; at y=17 that reaches the filled row 19.
    assert_eq!(result, Some((1, (0, -1))));
}
