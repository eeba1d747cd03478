/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{cmp::Ordering, fmt};

use anyhow::{bail, Result};

use crate::{Board, IllegalMoveError, Piece, PieceKind, Square};

/// Represents a single ply in a chess game, along with enough information to undo it.
///
/// A [`Move`] records the squares involved, the moving piece, whatever was
/// captured (if anything), and the piece promoted to (if any). The two
/// post-move check flags and the progress counter are *derived* state: they
/// are filled in by [`Board::generate_legal_moves`] and
/// [`crate::Game::push`] respectively, and do not participate in equality.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
    promoted: Option<Piece>,

    /// Whether the moving side is in check after this move.
    mover_in_check: bool,

    /// Whether the non-moving side is in check after this move.
    opponent_in_check: bool,

    /// Number of plies since the last capture or pawn move, this one included.
    ///
    /// `Some(0)` if this move is itself a capture or pawn move. `None` means
    /// "unknown": the value needs game history to compute, and is filled in
    /// when the move is added to a [`crate::Game`].
    plies_since_progress: Option<u16>,
}

impl Move {
    /// Creates a new [`Move`] of the piece on `from`, with the moving and
    /// captured pieces read off the board.
    ///
    /// # Errors
    /// If `from` is an empty square.
    #[inline(always)]
    pub fn new(board: &Board, from: Square, to: Square) -> Result<Self, IllegalMoveError> {
        let Some(piece) = board.piece_at(from) else {
            return Err(IllegalMoveError::EmptySquare(from));
        };

        Ok(Self::from_parts(from, to, piece, board.piece_at(to), None))
    }

    /// Like [`Move::new`], but promoting the moving pawn to `promoted` on arrival.
    #[inline(always)]
    pub fn new_promotion(
        board: &Board,
        from: Square,
        to: Square,
        promoted: Piece,
    ) -> Result<Self, IllegalMoveError> {
        let Some(piece) = board.piece_at(from) else {
            return Err(IllegalMoveError::EmptySquare(from));
        };

        Ok(Self::from_parts(
            from,
            to,
            piece,
            board.piece_at(to),
            Some(promoted),
        ))
    }

    /// Assembles a [`Move`] directly from its parts.
    ///
    /// The caller is responsible for supplying fields consistent with the
    /// board the move will be applied to.
    pub(crate) fn from_parts(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        promoted: Option<Piece>,
    ) -> Self {
        // Captures and pawn moves reset the no-progress counter. Anything
        // else needs game history, which we don't have access to here.
        let plies_since_progress = if captured.is_some() || piece.is_pawn() {
            Some(0)
        } else {
            None
        };

        Self {
            from,
            to,
            piece,
            captured,
            promoted,
            mover_in_check: false,
            opponent_in_check: false,
            plies_since_progress,
        }
    }

    /// Parses a [`Move`] from [long algebraic notation](https://en.wikipedia.org/wiki/Algebraic_notation_(chess)),
    /// e.g. `"e2e4"` or `"b7b8q"`, in the context of `board`.
    ///
    /// Only queen promotions are supported.
    pub fn from_lan(board: &Board, lan: &str) -> Result<Self> {
        if lan == "0000" {
            bail!("Null moves are not supported");
        }

        if !lan.is_ascii() || lan.len() < 4 || lan.len() > 5 {
            bail!("Move must be 4 or 5 characters of long algebraic notation. Got {lan:?}");
        }

        let from: Square = lan[0..2].parse()?;
        let to: Square = lan[2..4].parse()?;

        if lan.len() == 5 {
            if lan.as_bytes()[4] != b'q' {
                bail!("Only queen promotions are supported. Got {lan:?}");
            }

            let queen = Piece::new(board.side_to_move(), PieceKind::Queen);
            Ok(Self::new_promotion(board, from, to, queen)?)
        } else {
            Ok(Self::new(board, from, to)?)
        }
    }

    /// Returns the source square.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Returns the destination square.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Returns the piece being moved.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// Returns the piece captured by this move, or `None` if it is not a capture.
    #[inline(always)]
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// Returns the piece promoted to, or `None` if this is not a promotion.
    #[inline(always)]
    pub const fn promoted(&self) -> Option<Piece> {
        self.promoted
    }

    /// Returns `true` if this move captures a piece.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Returns `true` if this move leaves the *moving* side in check.
    ///
    /// Such a move is never legal; the flag exists so move generation can
    /// filter it out after inspection.
    #[inline(always)]
    pub const fn mover_in_check(&self) -> bool {
        self.mover_in_check
    }

    /// Returns `true` if this move puts the opposing king in check.
    #[inline(always)]
    pub const fn is_check(&self) -> bool {
        self.opponent_in_check
    }

    /// Returns the number of plies since the last capture or pawn move, or
    /// `None` if that is not yet known. See [`crate::Game::push`].
    #[inline(always)]
    pub const fn plies_since_progress(&self) -> Option<u16> {
        self.plies_since_progress
    }

    pub(crate) fn set_check_status(&mut self, mover_in_check: bool, opponent_in_check: bool) {
        self.mover_in_check = mover_in_check;
        self.opponent_in_check = opponent_in_check;
    }

    pub(crate) fn set_plies_since_progress(&mut self, plies: u16) {
        self.plies_since_progress = Some(plies);
    }

    /// Applies this move to `board`.
    ///
    /// Must be paired with a later call to [`Move::undo`]; apply/undo pairs may
    /// nest across *different* moves (as recursive search does) but never on
    /// the same move.
    ///
    /// # Panics
    /// If the piece occupying the destination square does not match this
    /// move's recorded capture. That means the move was constructed for a
    /// different position, and applying it has already corrupted bookkeeping
    /// that cannot be repaired here.
    pub fn apply(&self, board: &mut Board) {
        let captured = board.move_piece(self.from, self.to);

        if captured != self.captured {
            panic!(
                "applied move {self} does not match the board: expected capture of {:?}, found {:?}",
                self.captured, captured
            );
        }

        if let Some(promoted) = self.promoted {
            board.set_piece(self.to, Some(promoted));
        }
    }

    /// Applies the inverse of this move to `board`, restoring the position
    /// that [`Move::apply`] was called on.
    pub fn undo(&self, board: &mut Board) {
        board.move_piece(self.to, self.from);
        board.set_piece(self.to, self.captured);

        // The piece that arrived was the promotion; what left was always a pawn.
        if let Some(promoted) = self.promoted {
            board.set_piece(
                self.from,
                Some(Piece::new(promoted.color(), PieceKind::Pawn)),
            );
        }
    }

    /// Renders this move in long algebraic notation, e.g. `"e2e4"` or `"b7b8q"`.
    pub fn to_lan(&self) -> String {
        let mut lan = format!("{}{}", self.from, self.to);

        if self.promoted.is_some() {
            lan.push('q');
        }

        lan
    }

    /// Renders this move in algebraic notation, e.g. `"Ng1f3"`, `"exd5"`, or `"a8=Q+"`.
    ///
    /// The origin square of a non-pawn move is always included, rather than
    /// only when needed for disambiguation: knowing whether a move is
    /// ambiguous requires generating the rest of the move list, which is
    /// long gone by the time a move is displayed.
    pub fn to_algebraic(&self) -> String {
        let mut text = String::new();

        if self.piece.is_pawn() {
            if self.is_capture() {
                text.push(self.from.file_letter());
            }
        } else {
            text.push(self.piece.kind().algebraic_char());
            text.push_str(&self.from.to_string());
        }

        if self.is_capture() {
            text.push('x');
        }

        text.push_str(&self.to.to_string());

        if let Some(promoted) = self.promoted {
            text.push('=');
            text.push(promoted.kind().algebraic_char());
        }

        if self.opponent_in_check {
            text.push('+');
        }

        text
    }

    /// Serializes this move to a compact token of URL-safe characters,
    /// e.g. `"e2-e4P"` or `"d7-e8Pxry-Qz"`. Deserialize later with
    /// [`Move::deserialize`].
    pub fn serialize(&self) -> String {
        let mut token = format!("{}-{}{}", self.from, self.to, self.piece.to_char());

        if let Some(captured) = self.captured {
            token.push('x');
            token.push(captured.to_char());
        }

        if let Some(promoted) = self.promoted {
            token.push('y');
            token.push(promoted.to_char());
        }

        if self.opponent_in_check {
            token.push('z');
        }

        token
    }

    /// Deserializes a move from the token created by [`Move::serialize`].
    ///
    /// The progress counter cannot be recovered from the token; it is
    /// restored to the same "known or unknown" state a freshly-constructed
    /// move would have.
    pub fn deserialize(token: &str) -> Result<Self> {
        let bytes = token.as_bytes();
        if !token.is_ascii() || bytes.len() < 6 || bytes[2] != b'-' {
            bail!("Move token is badly formatted: {token:?}");
        }

        let from: Square = token[0..2].parse()?;
        let to: Square = token[3..5].parse()?;
        let piece = Piece::from_char(bytes[5] as char)?;

        let mut i = 6;
        let mut captured = None;
        if bytes.get(i) == Some(&b'x') {
            let Some(&ch) = bytes.get(i + 1) else {
                bail!("Move token is missing its captured piece: {token:?}");
            };
            captured = Some(Piece::from_char(ch as char)?);
            i += 2;
        }

        let mut promoted = None;
        if bytes.get(i) == Some(&b'y') {
            let Some(&ch) = bytes.get(i + 1) else {
                bail!("Move token is missing its promoted piece: {token:?}");
            };
            promoted = Some(Piece::from_char(ch as char)?);
            i += 2;
        }

        let mut mv = Self::from_parts(from, to, piece, captured, promoted);

        if bytes.get(i) == Some(&b'z') {
            mv.set_check_status(false, true);
            i += 1;
        }

        if i != bytes.len() {
            bail!("Move token has trailing characters: {token:?}");
        }

        Ok(mv)
    }

    /// A comparator that puts the best captures first, for ordering moves
    /// during search: highest captured value first, then checking moves
    /// before non-checking ones.
    ///
    /// Intended for use with a *stable* sort, so that ties keep their
    /// generation order and search stays deterministic.
    pub fn capture_order(a: &Self, b: &Self) -> Ordering {
        let value_a = a.captured.map_or(0, |p| p.value());
        let value_b = b.captured.map_or(0, |p| p.value());

        value_b
            .cmp(&value_a)
            .then_with(|| b.is_check().cmp(&a.is_check()))
    }
}

impl PartialEq for Move {
    /// Two moves are equal if their squares and pieces match; the derived
    /// check flags and progress counter are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.piece == other.piece
            && self.captured == other.captured
            && self.promoted == other.promoted
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    #[test]
    fn test_lan_roundtrip() {
        let start = Board::standard();
        let mv = Move::from_lan(&start, "e2e4").unwrap();
        assert_eq!(mv.to_lan(), "e2e4");
        assert_eq!(mv.piece(), Piece::WHITE_PAWN);
        assert!(!mv.is_capture());

        let promo = board("8/P6k/8/8/8/8/8/7K w - - 0 1");
        let mv = Move::from_lan(&promo, "a7a8q").unwrap();
        assert_eq!(mv.to_lan(), "a7a8q");
        assert_eq!(mv.promoted(), Some(Piece::WHITE_QUEEN));
    }

    #[test]
    fn test_bad_lan_rejected() {
        let start = Board::standard();
        assert!(Move::from_lan(&start, "0000").is_err());
        assert!(Move::from_lan(&start, "e2").is_err());
        assert!(Move::from_lan(&start, "e2e4qq").is_err());
        // Only queen promotions are understood.
        assert!(Move::from_lan(&start, "e2e4r").is_err());
        // Source square is empty.
        assert!(Move::from_lan(&start, "e4e5").is_err());
    }

    #[test]
    fn test_equality_ignores_derived_fields() {
        let start = Board::standard();
        let mv = Move::from_lan(&start, "g1f3").unwrap();
        let mut annotated = mv;
        annotated.set_check_status(false, true);
        annotated.set_plies_since_progress(17);

        assert_eq!(mv, annotated);
    }

    #[test]
    fn test_progress_counter_defaults() {
        let start = Board::standard();
        // Pawn moves reset the counter immediately.
        assert_eq!(
            Move::from_lan(&start, "e2e4").unwrap().plies_since_progress(),
            Some(0)
        );
        // Quiet piece moves need history context.
        assert_eq!(
            Move::from_lan(&start, "g1f3").unwrap().plies_since_progress(),
            None
        );
    }

    #[test]
    fn test_serialize_roundtrip() {
        let capture = board("4k3/8/3p4/8/4N3/8/8/4K3 w - - 0 1");
        let mv = Move::from_lan(&capture, "e4d6").unwrap();

        let token = mv.serialize();
        assert_eq!(token, "e4-d6Nxp");
        assert_eq!(Move::deserialize(&token).unwrap(), mv);

        assert!(Move::deserialize("e4d6").is_err());
        assert!(Move::deserialize("e4-d6Nx").is_err());
    }

    #[test]
    fn test_algebraic_rendering() {
        let capture = board("4k3/8/3p4/8/4N3/8/8/4K3 w - - 0 1");
        let mv = Move::from_lan(&capture, "e4d6").unwrap();
        assert_eq!(mv.to_algebraic(), "Ne4xd6");

        let pawn_capture = board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let mv = Move::from_lan(&pawn_capture, "e4d5").unwrap();
        assert_eq!(mv.to_algebraic(), "exd5");
    }

    #[test]
    fn test_capture_ordering() {
        let b = board("4k3/8/3q1n2/8/4N3/8/8/4K3 w - - 0 1");
        let queen_take = Move::from_lan(&b, "e4d6").unwrap();
        let knight_take = Move::from_lan(&b, "e4f6").unwrap();
        let quiet = Move::from_lan(&b, "e4g3").unwrap();

        let mut moves = vec![quiet, knight_take, queen_take];
        moves.sort_by(Move::capture_order);
        assert_eq!(moves, vec![queen_take, knight_take, quiet]);
    }
}
