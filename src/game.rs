/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Board, Move};

/// Number of plies without a capture or pawn move after which the game is
/// drawn: 50 full moves by each side.
const NO_PROGRESS_DRAW_PLIES: usize = 100;

/// An ordered history of moves applied to a [`Board`].
///
/// The board is owned and mutated in place: [`Game::push`] applies a move
/// and records it, [`Game::pop`] undoes the most recent one. The history is
/// also where each move's [`Move::plies_since_progress`] counter gets
/// resolved, since counting quiet plies requires knowing the previous move.
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    history: Vec<Move>,
}

impl Game {
    /// Creates a new [`Game`] with no history, starting from `board`.
    #[inline(always)]
    pub const fn new(board: Board) -> Self {
        Self {
            board,
            history: Vec::new(),
        }
    }

    /// Fetches the current board position.
    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Fetches the current board position, mutably.
    ///
    /// Callers borrowing the board to search on must restore it (searches
    /// do so by construction) before touching the history again.
    #[inline(always)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// The moves played so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Number of plies played so far.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns `true` if no moves have been played.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The most recently played move, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Applies `mv` to the board, swaps the turn, and records the move.
    ///
    /// If the move's progress counter is still unknown (a quiet non-pawn
    /// move), it is resolved here as the previous move's counter plus one —
    /// or `1` when this is the first move of the game.
    pub fn push(&mut self, mut mv: Move) {
        mv.apply(&mut self.board);
        self.board.swap_sides();

        if mv.plies_since_progress().is_none() {
            let previous = self
                .history
                .last()
                .and_then(Move::plies_since_progress)
                .unwrap_or(0);
            mv.set_plies_since_progress(previous + 1);
        }

        self.history.push(mv);
    }

    /// Undoes the most recently played move, returning it, or `None` if the
    /// history is empty.
    pub fn pop(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;

        self.board.swap_sides();
        mv.undo(&mut self.board);

        Some(mv)
    }

    /// Returns `true` if the game is drawn by the no-progress rule: the last
    /// 50 full moves (100 plies) contain no capture and no pawn move.
    ///
    /// An unresolved progress counter counts as "no progress", but every
    /// move in a history built through [`Game::push`] has been resolved.
    pub fn is_draw_by_no_progress(&self) -> bool {
        self.history.len() >= NO_PROGRESS_DRAW_PLIES
            && self
                .history
                .iter()
                .rev()
                .take(NO_PROGRESS_DRAW_PLIES)
                .all(|mv| mv.plies_since_progress() != Some(0))
    }
}

impl Default for Game {
    /// A default [`Game`] starts from the traditional chess setup.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Board::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_push_pop_restores_board() {
        let mut game = Game::default();
        let before = game.board().clone();

        let e4 = Move::from_lan(game.board(), "e2e4").unwrap();
        game.push(e4);
        assert_eq!(game.board().side_to_move(), Color::Black);
        assert_eq!(game.len(), 1);

        let e5 = Move::from_lan(game.board(), "e7e5").unwrap();
        game.push(e5);
        assert_eq!(game.len(), 2);

        assert_eq!(game.pop().as_ref(), Some(&e5));
        assert_eq!(game.pop().as_ref(), Some(&e4));
        assert_eq!(game.pop(), None);

        assert_eq!(game.board(), &before);
        assert_eq!(game.board().side_to_move(), Color::White);
    }

    #[test]
    fn test_progress_counters_are_resolved() {
        let mut game = Game::default();

        // A quiet first move counts one ply since progress.
        let knight_out = Move::from_lan(game.board(), "g1f3").unwrap();
        game.push(knight_out);
        assert_eq!(game.last_move().unwrap().plies_since_progress(), Some(1));

        let reply = Move::from_lan(game.board(), "b8c6").unwrap();
        game.push(reply);
        assert_eq!(game.last_move().unwrap().plies_since_progress(), Some(2));

        // A pawn move resets the counter.
        let pawn = Move::from_lan(game.board(), "e2e4").unwrap();
        game.push(pawn);
        assert_eq!(game.last_move().unwrap().plies_since_progress(), Some(0));

        // And the count restarts after it.
        let quiet = Move::from_lan(game.board(), "c6b8").unwrap();
        game.push(quiet);
        assert_eq!(game.last_move().unwrap().plies_since_progress(), Some(1));
    }

    #[test]
    fn test_no_progress_draw_needs_full_window() {
        let mut game = Game::default();

        // Shuffle knights back and forth; no captures, no pawn moves.
        let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for i in 0..NO_PROGRESS_DRAW_PLIES - 1 {
            let mv = Move::from_lan(game.board(), cycle[i % cycle.len()]).unwrap();
            game.push(mv);
        }

        assert!(!game.is_draw_by_no_progress());

        let mv = Move::from_lan(game.board(), cycle[(NO_PROGRESS_DRAW_PLIES - 1) % 4]).unwrap();
        game.push(mv);
        assert!(game.is_draw_by_no_progress());
    }

    #[test]
    fn test_progress_inside_window_prevents_draw() {
        let mut game = Game::default();

        // A pawn move first, then 99 quiet plies: the window still contains
        // the pawn move, so there is no draw yet.
        let pawn = Move::from_lan(game.board(), "e2e4").unwrap();
        game.push(pawn);

        let cycle = ["g8f6", "g1f3", "f6g8", "f3g1"];
        for i in 0..NO_PROGRESS_DRAW_PLIES - 1 {
            let mv = Move::from_lan(game.board(), cycle[i % cycle.len()]).unwrap();
            game.push(mv);
        }

        assert_eq!(game.len(), NO_PROGRESS_DRAW_PLIES);
        assert!(!game.is_draw_by_no_progress());

        // One more quiet ply pushes the pawn move out of the window.
        let mv = Move::from_lan(game.board(), cycle[(NO_PROGRESS_DRAW_PLIES - 1) % 4]).unwrap();
        game.push(mv);
        assert!(game.is_draw_by_no_progress());
    }
}
