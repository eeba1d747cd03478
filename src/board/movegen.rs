/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Pseudo-legal move generation, dispatched per piece kind.
//!
//! "Pseudo-legal" means consistent with the piece's movement pattern, but
//! not yet checked for leaving the mover's own king in check; that filter
//! lives in [`Board::generate_legal_moves`].

use crate::{Board, Color, Move, Piece, PieceKind, Square};

/// The eight directions a queen can go, as (file, rank) deltas.
///
/// Rook directions are the orthogonal half (zero file or rank delta),
/// bishop directions the diagonal half.
pub(crate) const QUEEN_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// The eight jumps a knight can make, as (file, rank) deltas.
pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const ROOK_DELTAS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Appends all pseudo-legal moves for the piece on `origin` to `moves`.
///
/// With `captures_only` set, quiet moves are skipped and only captures are
/// generated.
///
/// Does nothing if `origin` is empty; the square loop in
/// [`Board::generate_moves`] only calls this for occupied squares.
pub(crate) fn append_moves(
    board: &Board,
    origin: Square,
    captures_only: bool,
    moves: &mut Vec<Move>,
) {
    let Some(piece) = board.piece_at(origin) else {
        return;
    };

    match piece.kind() {
        PieceKind::Pawn => pawn_moves(board, piece, origin, captures_only, moves),
        PieceKind::Knight => leaper_moves(board, piece, origin, &KNIGHT_DELTAS, captures_only, moves),
        PieceKind::King => leaper_moves(board, piece, origin, &QUEEN_DELTAS, captures_only, moves),
        PieceKind::Bishop => rider_moves(board, piece, origin, &BISHOP_DELTAS, captures_only, moves),
        PieceKind::Rook => rider_moves(board, piece, origin, &ROOK_DELTAS, captures_only, moves),
        PieceKind::Queen => rider_moves(board, piece, origin, &QUEEN_DELTAS, captures_only, moves),
    }
}

/// Generates moves for a piece that jumps exactly one delta (knight, king).
fn leaper_moves(
    board: &Board,
    piece: Piece,
    origin: Square,
    deltas: &[(i8, i8)],
    captures_only: bool,
    moves: &mut Vec<Move>,
) {
    for &(delta_file, delta_rank) in deltas {
        let Some(target) = origin.offset_by(delta_file, delta_rank) else {
            continue;
        };

        match board.piece_at(target) {
            None if !captures_only => {
                moves.push(Move::from_parts(origin, target, piece, None, None));
            }
            Some(occupant) if occupant.color() != piece.color() => {
                moves.push(Move::from_parts(origin, target, piece, Some(occupant), None));
            }
            _ => {}
        }
    }
}

/// Generates moves for a piece that slides along deltas until blocked
/// (bishop, rook, queen).
fn rider_moves(
    board: &Board,
    piece: Piece,
    origin: Square,
    deltas: &[(i8, i8)],
    captures_only: bool,
    moves: &mut Vec<Move>,
) {
    for &(delta_file, delta_rank) in deltas {
        for distance in 1..Square::SIZE as i8 {
            let Some(target) = origin.offset_by(delta_file * distance, delta_rank * distance)
            else {
                break;
            };

            match board.piece_at(target) {
                None => {
                    if !captures_only {
                        moves.push(Move::from_parts(origin, target, piece, None, None));
                    }
                }
                Some(occupant) => {
                    if occupant.color() != piece.color() {
                        moves.push(Move::from_parts(origin, target, piece, Some(occupant), None));
                    }
                    break;
                }
            }
        }
    }
}

/// Generates pawn pushes, double pushes, and diagonal captures.
///
/// A pawn arriving on its last rank always promotes to a queen. There is no
/// en passant.
fn pawn_moves(
    board: &Board,
    piece: Piece,
    origin: Square,
    captures_only: bool,
    moves: &mut Vec<Move>,
) {
    let (forward, start_rank, promotion_rank) = match piece.color() {
        Color::White => (1, 2, 8),
        Color::Black => (-1, 7, 1),
    };

    let push_pawn = |target: Square, captured: Option<Piece>, moves: &mut Vec<Move>| {
        let promoted = if target.rank() == promotion_rank {
            Some(Piece::new(piece.color(), PieceKind::Queen))
        } else {
            None
        };
        moves.push(Move::from_parts(origin, target, piece, captured, promoted));
    };

    if !captures_only {
        if let Some(one) = origin.offset_by(0, forward) {
            if board.piece_at(one).is_none() {
                push_pawn(one, None, moves);

                // A double push is only available from the pawn's starting
                // rank, and both squares must be empty.
                if origin.rank() == start_rank {
                    if let Some(two) = origin.offset_by(0, forward * 2) {
                        if board.piece_at(two).is_none() {
                            moves.push(Move::from_parts(origin, two, piece, None, None));
                        }
                    }
                }
            }
        }
    }

    for delta_file in [-1, 1] {
        let Some(target) = origin.offset_by(delta_file, forward) else {
            continue;
        };

        if let Some(occupant) = board.piece_at(target) {
            if occupant.color() != piece.color() {
                push_pawn(target, Some(occupant), moves);
            }
        }
    }
}
