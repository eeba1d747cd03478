/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Pseudo-legal move generation per piece kind.
mod movegen;

/// A single ply and its inverse.
mod moves;

/// Pieces and their identities.
mod piece;

/// Squares and algebraic positions.
mod square;

pub use moves::*;
pub use piece::*;
pub use square::*;

use std::fmt;

use anyhow::{bail, Result};
use thiserror::Error;

use movegen::{KNIGHT_DELTAS, QUEEN_DELTAS};

/// The reasons a move can be rejected by [`Board::validate_move`].
///
/// These are recoverable, caller-facing rejections: the board is always left
/// unmodified when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMoveError {
    /// The source square holds no piece to move.
    #[error("the square {0} is empty")]
    EmptySquare(Square),

    /// The moving piece belongs to the side that is not on turn.
    #[error("it is not {}'s turn to move", .0.name())]
    WrongSide(Color),

    /// The piece on the source square cannot move that way.
    #[error("that is not a valid move for a {0}")]
    NotInMoveSet(PieceKind),

    /// The move would leave the mover's own king attacked.
    #[error("that would leave {}'s king in check from {attacker}", side.name())]
    LeavesKingInCheck { side: Color, attacker: Square },
}

/// Represents a chess board and the pieces on it.
///
/// The grid is a 64-slot array in [`Square`] index order, with `None` for
/// empty squares. Alongside the grid, a [`Board`] tracks whose turn it is,
/// a per-side cache of the king's square, and per-side counts of non-pawn
/// pieces (used by the endgame heuristic). The caches are maintained by
/// [`Board::set_piece`] and [`Board::move_piece`] and always match the grid.
///
/// A board is mutated in place: move application and search both use strict
/// apply/undo pairing rather than copying. See [`Move::apply`].
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; Square::COUNT],
    side_to_move: Color,
    king_square: [Option<Square>; Color::COUNT],
    piece_count: [u8; Color::COUNT],
}

impl Board {
    /// Creates an empty [`Board`] with White to move.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            squares: [None; Square::COUNT],
            side_to_move: Color::White,
            king_square: [None; Color::COUNT],
            piece_count: [0; Color::COUNT],
        }
    }

    /// Creates a [`Board`] with the pieces set up for traditional chess.
    ///
    /// # Example
    /// ```
    /// # use stoat::Board;
    /// let board = Board::standard();
    /// assert_eq!(
    ///     board.to_fen(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 0"
    /// );
    /// ```
    pub fn standard() -> Self {
        let mut board = Self::new();

        for file in 1..=Square::SIZE {
            board.set_piece(Square::new(file, 2), Some(Piece::WHITE_PAWN));
            board.set_piece(Square::new(file, 7), Some(Piece::BLACK_PAWN));
        }

        use PieceKind::*;
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (i, kind) in back_rank.into_iter().enumerate() {
            let file = i as u8 + 1;
            board.set_piece(Square::new(file, 1), Some(Piece::new(Color::White, kind)));
            board.set_piece(Square::new(file, 8), Some(Piece::new(Color::Black, kind)));
        }

        board
    }

    /// Creates a [`Board`] from the first two fields of a
    /// [FEN](https://www.chessprogramming.org/Forsyth-Edwards_Notation) string.
    ///
    /// All 6 space-separated fields must be present, but the castling,
    /// en passant, and move-counter fields are ignored, since this board
    /// does not track them.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            bail!(
                "FEN string must have 6 space-separated fields. Got {}",
                fields.len()
            );
        }

        let mut board = Self::new();
        let mut index = 0;
        let mut file = 0;

        for ch in fields[0].chars() {
            match ch {
                '/' => {
                    if file != Square::SIZE {
                        bail!("FEN rank must total 8 files. Got {file}");
                    }
                    file = 0;
                }
                '1'..='8' => {
                    let run = ch as u8 - b'0';
                    file += run;
                    index += run as usize;
                }
                _ => {
                    let piece = Piece::from_char(ch)?;
                    if file >= Square::SIZE || index >= Square::COUNT {
                        bail!("FEN rank overflows 8 files");
                    }
                    board.set_piece(Square::from_index(index as u8), Some(piece));
                    file += 1;
                    index += 1;
                }
            }

            if file > Square::SIZE {
                bail!("FEN rank must total 8 files. Got {file}");
            }
        }

        if file != Square::SIZE || index != Square::COUNT {
            bail!("FEN placements must cover all 64 squares. Got {index}");
        }

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => bail!("FEN side-to-move must be \"w\" or \"b\". Got {other:?}"),
        };

        Ok(board)
    }

    /// Renders this [`Board`] as a FEN string.
    ///
    /// The castling, en passant, and move-counter fields are not tracked by
    /// this board, so they are emitted as fixed placeholders.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        let mut skipped = 0;

        for square in Square::iter() {
            match self.piece_at(square) {
                None => skipped += 1,
                Some(piece) => {
                    if skipped > 0 {
                        fen.push((b'0' + skipped) as char);
                        skipped = 0;
                    }
                    fen.push(piece.to_char());
                }
            }

            if (square.index() + 1) % Square::SIZE as usize == 0 {
                if skipped > 0 {
                    fen.push((b'0' + skipped) as char);
                    skipped = 0;
                }
                if square.index() < Square::COUNT - 1 {
                    fen.push('/');
                }
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.to_char());

        // We don't track the rest.
        fen.push_str(" - - 0 0");

        fen
    }

    /// Parses a [`Board`] from an ASCII layout: 64 non-whitespace characters
    /// in row-major order from rank 8 to rank 1, with `.` for empty squares,
    /// uppercase for White and lowercase for Black. Whitespace is ignored,
    /// so the layout can be written as 8 rows of 8.
    ///
    /// The side to move is White; call [`Board::set_side_to_move`] to change it.
    pub fn parse(layout: &str) -> Result<Self> {
        let mut board = Self::new();
        let mut index = 0;

        for ch in layout.chars() {
            if ch.is_whitespace() {
                continue;
            }

            if index >= Square::COUNT {
                bail!("Board layout has more than 64 squares");
            }

            if ch != '.' {
                board.set_piece(Square::from_index(index as u8), Some(Piece::from_char(ch)?));
            }
            index += 1;
        }

        if index != Square::COUNT {
            bail!("Board layout must have exactly 64 squares. Got {index}");
        }

        Ok(board)
    }

    /// Serializes this [`Board`] to a 65-character token: 64 piece characters
    /// (`.` for empty) in square-index order, followed by one digit for the
    /// side to move. The token contains only URL-safe characters and
    /// round-trips exactly through [`Board::deserialize`].
    pub fn serialize(&self) -> String {
        let mut token = String::with_capacity(Square::COUNT + 1);

        for square in Square::iter() {
            match self.piece_at(square) {
                None => token.push('.'),
                Some(piece) => token.push(piece.to_char()),
            }
        }
        token.push((b'0' + self.side_to_move.index() as u8) as char);

        token
    }

    /// Deserializes a [`Board`] from the token created by [`Board::serialize`].
    pub fn deserialize(token: &str) -> Result<Self> {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() != Square::COUNT + 1 {
            bail!(
                "Board token must be exactly 65 characters. Got {}",
                chars.len()
            );
        }

        let mut board = Self::new();
        for (i, &ch) in chars[..Square::COUNT].iter().enumerate() {
            if ch != '.' {
                board.set_piece(Square::from_index(i as u8), Some(Piece::from_char(ch)?));
            }
        }

        board.side_to_move = match chars[Square::COUNT] {
            '0' => Color::White,
            '1' => Color::Black,
            other => bail!("Board token side digit must be 0 or 1. Got {other:?}"),
        };

        Ok(board)
    }

    /// Returns the piece at `square`, or `None` if the square is empty.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Returns the side whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Sets the side whose turn it is.
    #[inline(always)]
    pub fn set_side_to_move(&mut self, side: Color) {
        self.side_to_move = side;
    }

    /// Swaps the side whose turn it is, returning the new side.
    #[inline(always)]
    pub fn swap_sides(&mut self) -> Color {
        self.side_to_move = self.side_to_move.opponent();
        self.side_to_move
    }

    /// Returns the cached square of `side`'s king, or `None` if that king is
    /// not on the board.
    #[inline(always)]
    pub const fn king_square(&self, side: Color) -> Option<Square> {
        self.king_square[side.index()]
    }

    /// Returns the number of non-pawn pieces for `side`.
    #[inline(always)]
    pub const fn num_pieces(&self, side: Color) -> u8 {
        self.piece_count[side.index()]
    }

    /// Returns the total number of non-pawn pieces on the board.
    #[inline(always)]
    pub const fn total_pieces(&self) -> u8 {
        self.piece_count[0] + self.piece_count[1]
    }

    /// Returns whether the game has reached the endgame: at most 4 pieces
    /// besides the kings and pawns remain on the board.
    #[inline(always)]
    pub const fn is_endgame(&self) -> bool {
        // total_pieces() counts both kings.
        self.total_pieces() <= 6
    }

    /// Sets the piece at `square`, or empties it with `None`, keeping the
    /// king cache and piece counts in sync with the grid.
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        let previous = self.squares[square.index()];
        self.squares[square.index()] = piece;

        // Forget the previous occupant.
        if let Some(previous) = previous {
            if previous.is_king() {
                self.king_square[previous.color().index()] = None;
            }
            if !previous.is_pawn() {
                self.piece_count[previous.color().index()] -= 1;
            }
        }

        if let Some(piece) = piece {
            if piece.is_king() {
                self.king_square[piece.color().index()] = Some(square);
            }
            if !piece.is_pawn() {
                self.piece_count[piece.color().index()] += 1;
            }
        }
    }

    /// Moves a piece from one square to another, returning whatever occupied
    /// the destination, or `None` if it was empty.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let previous_to = self.piece_at(to);
        let previous_from = self.piece_at(from);

        // Clear the source before writing the destination: with both squares
        // briefly holding the piece, the king cache and piece counts would
        // come out wrong.
        self.set_piece(from, None);
        self.set_piece(to, previous_from);

        previous_to
    }

    /// If `target` is attacked by `attacking_side`, returns the square of
    /// (any) one attacking piece. Otherwise returns `None`.
    ///
    /// Callers that need *all* attackers must re-scan excluding the squares
    /// already found; nothing in the engine currently does.
    pub fn attacker_of(&self, target: Square, attacking_side: Color) -> Option<Square> {
        // Check every queen direction, which covers rook, bishop, king, and
        // pawn attacks as distance-limited special cases.
        for &(delta_file, delta_rank) in &QUEEN_DELTAS {
            for distance in 1..Square::SIZE as i8 {
                let Some(other) =
                    target.offset_by(delta_file * distance, delta_rank * distance)
                else {
                    // Off board.
                    break;
                };

                let Some(piece) = self.piece_at(other) else {
                    continue;
                };

                if piece.color() == attacking_side {
                    let diagonal = delta_file != 0 && delta_rank != 0;

                    match piece.kind() {
                        PieceKind::Queen => return Some(other),
                        PieceKind::King if distance == 1 => return Some(other),
                        PieceKind::Rook if !diagonal => return Some(other),
                        PieceKind::Bishop if diagonal => return Some(other),
                        PieceKind::Pawn if diagonal && distance == 1 => {
                            // A pawn only attacks toward the side it moves:
                            // a white attacker sits at a higher index than
                            // its target, a black attacker at a lower one.
                            let attacks_target = match attacking_side {
                                Color::White => other.index() > target.index(),
                                Color::Black => other.index() < target.index(),
                            };
                            if attacks_target {
                                return Some(other);
                            }
                        }
                        _ => {}
                    }
                }

                // Stop this direction anyway, we've hit a piece.
                break;
            }
        }

        // Knight attacks jump over blockers, so check them separately.
        for &(delta_file, delta_rank) in &KNIGHT_DELTAS {
            if let Some(other) = target.offset_by(delta_file, delta_rank) {
                if let Some(piece) = self.piece_at(other) {
                    if piece.kind() == PieceKind::Knight && piece.color() == attacking_side {
                        return Some(other);
                    }
                }
            }
        }

        None
    }

    /// If the king of `side` is in check, returns the square of (any) one
    /// attacking piece. Otherwise returns `None`.
    ///
    /// A board with no king for `side` (a transient construction state) is
    /// never in check.
    ///
    /// # Panics
    /// If the cached king square does not actually hold that side's king.
    /// That means the board's bookkeeping has been corrupted, and continuing
    /// could select or apply a materially wrong move.
    pub fn checker(&self, side: Color) -> Option<Square> {
        let king_square = self.king_square(side)?;

        match self.piece_at(king_square) {
            Some(piece) if piece.is_king() && piece.color() == side => {}
            other => panic!(
                "king cache for {} points at {king_square}, which holds {other:?}",
                side.name()
            ),
        }

        self.attacker_of(king_square, side.opponent())
    }

    /// Returns `true` if the king of `side` is in check.
    #[inline(always)]
    pub fn is_in_check(&self, side: Color) -> bool {
        self.checker(side).is_some()
    }

    /// Checks whether applying `mv` would leave the mover's own king
    /// attacked, returning the square of the offending attacker if so.
    ///
    /// This is the sole king-safety filter. It works by applying the move,
    /// probing for check, and applying the inverse; the board is unchanged
    /// when it returns.
    pub fn exposes_king(&mut self, mv: &Move) -> Option<Square> {
        mv.apply(self);
        let attacker = self.checker(mv.piece().color());
        mv.undo(self);

        attacker
    }

    /// Computes whether each side is in check after `mv`, as
    /// `(mover_in_check, opponent_in_check)`, using the same transient
    /// apply/undo probe as [`Board::exposes_king`].
    pub fn check_status(&mut self, mv: &Move) -> (bool, bool) {
        let mover = mv.piece().color();

        mv.apply(self);
        let status = (self.is_in_check(mover), self.is_in_check(mover.opponent()));
        mv.undo(self);

        status
    }

    /// Generates all pseudo-legal moves for `side`: moves consistent with
    /// each piece's movement pattern, but not yet checked for leaving the
    /// mover's own king in check.
    ///
    /// With `captures_only` set, quiet moves are skipped.
    pub fn generate_moves(&self, side: Color, captures_only: bool) -> Vec<Move> {
        let mut moves = Vec::new();

        for square in Square::iter() {
            if let Some(piece) = self.piece_at(square) {
                if piece.color() == side {
                    movegen::append_moves(self, square, captures_only, &mut moves);
                }
            }
        }

        moves
    }

    /// Like [`Board::generate_moves`], but with each move's check status
    /// filled in and any move that would leave `side`'s own king in check
    /// discarded.
    pub fn generate_legal_moves(&mut self, side: Color) -> Vec<Move> {
        let mut moves = self.generate_moves(side, false);

        for mv in &mut moves {
            let (mover, opponent) = self.check_status(mv);
            mv.set_check_status(mover, opponent);
        }

        // Can't put yourself in check.
        moves.retain(|mv| !mv.mover_in_check());

        moves
    }

    /// Fully checks `mv` for validity: the side whose turn it is, the motion
    /// of the piece, and king safety. This is a relatively slow check; call
    /// it at user-interface speeds, not inside search.
    ///
    /// The board is unchanged when this returns.
    pub fn validate_move(&mut self, mv: &Move) -> Result<(), IllegalMoveError> {
        if mv.piece().color() != self.side_to_move {
            return Err(IllegalMoveError::WrongSide(mv.piece().color()));
        }

        let move_list = self.generate_moves(self.side_to_move, false);
        if !move_list.contains(mv) {
            return Err(IllegalMoveError::NotInMoveSet(mv.piece().kind()));
        }

        if let Some(attacker) = self.exposes_king(mv) {
            return Err(IllegalMoveError::LeavesKingInCheck {
                side: self.side_to_move,
                attacker,
            });
        }

        Ok(())
    }

    /// Parses and fully validates a move like `"e2-e4"` in the context of
    /// this board. A pawn moving to its last rank is promoted to a queen.
    pub fn parse_move(&mut self, text: &str) -> Result<Move> {
        let bytes = text.as_bytes();
        if !text.is_ascii() || bytes.len() != 5 || bytes[2] != b'-' {
            bail!("Move is badly formatted: {text:?}");
        }

        let from: Square = text[0..2].parse()?;
        let to: Square = text[3..5].parse()?;

        let Some(piece) = self.piece_at(from) else {
            return Err(IllegalMoveError::EmptySquare(from).into());
        };

        let promotion_rank = match self.side_to_move {
            Color::White => 8,
            Color::Black => 1,
        };

        let mv = if piece.is_pawn() && to.rank() == promotion_rank {
            let queen = Piece::new(self.side_to_move, PieceKind::Queen);
            Move::new_promotion(self, from, to, queen)?
        } else {
            Move::new(self, from, to)?
        };

        self.validate_move(&mv)?;

        Ok(mv)
    }
}

impl Default for Board {
    /// A default [`Board`] is empty, with White to move.
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Renders the board as an ASCII grid from rank 8 down to rank 1, with
    /// `.` for empty squares and rank/file labels on the edges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=Square::SIZE).rev() {
            write!(f, "{rank} ")?;
            for file in 1..=Square::SIZE {
                let ch = match self.piece_at(Square::new(file, rank)) {
                    None => '.',
                    Some(piece) => piece.to_char(),
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        write!(f, "   {} to move", self.side_to_move.name())
    }
}
