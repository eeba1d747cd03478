/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Board, Color, Piece, PieceKind, Score, Square};

/// Encapsulates the logic of scoring a chess position.
///
/// Scores are *side-relative*: a positive number is good for the side being
/// evaluated, and a score of 0 is considered equal. The evaluation is pure
/// material plus a few small positional nudges; it is deliberately simple,
/// deterministic, and cheap, since search calls it at every leaf.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The board whose position to evaluate.
    board: &'a Board,

    /// Whether the position is an endgame, which changes where the king
    /// wants to be.
    endgame: bool,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for the provided board.
    #[inline(always)]
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            endgame: board.is_endgame(),
        }
    }

    /// Evaluate this position from the side-to-move's perspective.
    #[inline(always)]
    pub fn eval(self) -> Score {
        let side = self.board.side_to_move();
        self.eval_for(side)
    }

    /// Evaluate this position from `color`'s perspective.
    ///
    /// A positive/high number is good for `color`, while a negative number
    /// is better for the opponent.
    pub fn eval_for(&self, color: Color) -> Score {
        let mut total = 0;

        for square in Square::iter() {
            if let Some(piece) = self.board.piece_at(square) {
                let value = piece.value() + self.positional(piece, square);

                if piece.color() == color {
                    total += value;
                } else {
                    total -= value;
                }
            }
        }

        Score(total)
    }

    /// A small positional bonus (or penalty) for `piece` standing on `square`.
    fn positional(&self, piece: Piece, square: Square) -> i32 {
        let rank = square.rank() as i32;
        let file = square.file() as i32;
        let on_rim = rank == 1 || rank == 8 || file == 1 || file == 8;

        match piece.kind() {
            PieceKind::Pawn => {
                // Pawns gain as they advance toward promotion.
                let advance = match piece.color() {
                    Color::White => rank - 2,
                    Color::Black => 7 - rank,
                };
                advance * 4 + if square.is_center() { 12 } else { 0 }
            }

            PieceKind::Knight => {
                if square.is_center() {
                    14
                } else if on_rim {
                    -12
                } else {
                    0
                }
            }

            PieceKind::Bishop => {
                if square.is_center() {
                    8
                } else {
                    0
                }
            }

            PieceKind::Rook => 0,

            PieceKind::Queen => {
                if square.is_center() {
                    6
                } else {
                    0
                }
            }

            PieceKind::King => {
                if self.endgame {
                    // With little material left the king must activate;
                    // penalize distance from the center.
                    let file_distance = (2 * file - 9).abs();
                    let rank_distance = (2 * rank - 9).abs();
                    -(file_distance + rank_distance) * 2
                } else {
                    // Before that, it belongs tucked away on its back rank.
                    let back_rank = match piece.color() {
                        Color::White => 1,
                        Color::Black => 8,
                    };
                    if rank == back_rank {
                        12
                    } else {
                        -12
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_position_is_balanced() {
        let board = Board::standard();
        assert_eq!(Evaluator::new(&board).eval(), Score::DRAW);
        assert_eq!(Evaluator::new(&board).eval_for(Color::Black), Score::DRAW);
    }

    #[test]
    fn test_material_advantage_dominates() {
        // White is up a queen.
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let eval = Evaluator::new(&board);

        assert!(eval.eval_for(Color::White) > 800);
        assert!(eval.eval_for(Color::Black) < -800);
    }

    #[test]
    fn test_eval_is_symmetric() {
        let board = Board::from_fen("r3k3/2n5/8/8/8/8/5N2/3K2R1 w - - 0 1").unwrap();
        let eval = Evaluator::new(&board);

        assert_eq!(
            eval.eval_for(Color::White),
            -eval.eval_for(Color::Black)
        );
    }
}
