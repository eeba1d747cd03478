/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    time::{Duration, Instant},
};

use anyhow::{bail, Result};

use crate::{Board, Color, Evaluator, Game, Move, Score};

/// Maximum depth that can be searched.
///
/// This also bounds the recursion depth of the search, so a pathological
/// position cannot grow the call stack without limit.
pub const MAX_DEPTH: u8 = 64;

/// How often (in nodes) the search checks its clock.
///
/// Polling the clock at every node costs more than it helps, so the budget
/// is only consulted every this-many nodes, trading a slight overrun for
/// less timer overhead.
const TIMER_CHECK_INTERVAL: u64 = 2048;

/// Represents the best sequence of moves found during a search: the chosen
/// move, the opponent's best reply in the explored line, and so on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrincipalVariation(Vec<Move>);

impl PrincipalVariation {
    /// The moves of the variation, starting with the chosen best move.
    #[inline(always)]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    /// Returns `true` if the variation holds no moves.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clears the moves of `self`.
    #[inline(always)]
    fn clear(&mut self) {
        self.0.clear();
    }

    /// Replaces the contents of `self` with `mv` followed by the moves of `tail`.
    #[inline(always)]
    fn assemble(&mut self, mv: Move, tail: &Self) {
        self.clear();
        self.0.push(mv);
        self.0.extend_from_slice(&tail.0);
    }
}

impl fmt::Display for PrincipalVariation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut moves = self.0.iter();

        if let Some(first) = moves.next() {
            write!(f, "{first}")?;
        }
        for mv in moves {
            write!(f, " {mv}")?;
        }

        Ok(())
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: u8,

    /// Start time of the search.
    pub starttime: Instant,

    /// Wall-clock budget for the search.
    ///
    /// Exceeding the budget aborts the depth currently being explored; the
    /// result from the last fully-completed depth is returned instead.
    pub timeout: Duration,
}

impl SearchConfig {
    /// Constructs a new [`SearchConfig`] that searches until `timeout` has elapsed.
    #[inline(always)]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search.
    ///
    /// The word "infinite" is quoted here because the actual defaults are
    /// [`MAX_DEPTH`] and [`Duration::MAX`].
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            starttime: Instant::now(),
            timeout: Duration::MAX,
        }
    }
}

/// The result of a search: the best move found (or `None` when the side to
/// move has no legal move), its score, and some statistics about the search
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Number of positions considered.
    pub nodes: u64,

    /// Best move found during the search.
    ///
    /// `None` means the game is over: checkmate if `score` is a mate score,
    /// stalemate otherwise.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, relative to the
    /// searching side.
    pub score: Score,

    /// The deepest fully-completed depth that produced this result.
    pub depth: u8,

    /// Principal variation of the explored line, starting with `bestmove`.
    pub pv: PrincipalVariation,

    /// Wall time consumed by the search.
    pub elapsed: Duration,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            pv: PrincipalVariation::default(),
            elapsed: Duration::ZERO,
        }
    }
}

/// Executes a search on the provided board for a given side.
///
/// The board is mutated during the search — every candidate move is applied,
/// explored, and undone in strict stack order — and is always restored to
/// its original position by the time [`Search::start`] returns.
pub struct Search<'a> {
    /// The board to search on.
    board: &'a mut Board,

    /// The side the search is choosing a move for.
    side: Color,

    /// Number of positions considered so far.
    nodes: u64,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute on the provided [`Board`].
    #[inline(always)]
    pub fn new(board: &'a mut Board, side: Color, config: SearchConfig) -> Self {
        Self {
            board,
            side,
            nodes: 0,
            config,
        }
    }

    /// Start the search, returning the best result found within the budget.
    ///
    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening):
    /// a full search at depth 1, then depth 2, and so on until the time
    /// budget or [`MAX_DEPTH`] is reached. A depth interrupted by the budget
    /// is discarded — its move ordering snapshot is incomplete and would
    /// bias the choice — so the result always comes from the deepest depth
    /// that ran to completion.
    pub fn start(mut self) -> SearchResult {
        let mut result = SearchResult::default();
        let mut depth = 1;

        while depth <= self.config.max_depth
            && self.config.starttime.elapsed() < self.config.timeout
        {
            match self.search_root(depth) {
                Ok((bestmove, score, pv)) => {
                    result = SearchResult {
                        nodes: self.nodes,
                        bestmove,
                        score,
                        depth,
                        pv,
                        elapsed: self.config.starttime.elapsed(),
                    };

                    // No move at the root means checkmate or stalemate;
                    // searching deeper cannot change that.
                    if bestmove.is_none() {
                        break;
                    }

                    depth += 1;
                }

                // The budget ran out partway through this depth.
                Err(_) => break,
            }
        }

        result.nodes = self.nodes;
        result.elapsed = self.config.starttime.elapsed();
        result
    }

    /// Searches the root position at `depth`, returning the best move, its
    /// score, and the principal variation below it.
    ///
    /// Separated from [`Search::negamax`] because only the root needs to
    /// track *which* move produced the best score.
    fn search_root(
        &mut self,
        depth: u8,
    ) -> Result<(Option<Move>, Score, PrincipalVariation)> {
        let mut moves = self.board.generate_legal_moves(self.side);

        if moves.is_empty() {
            let score = if self.board.is_in_check(self.side) {
                -Score::MATE
            } else {
                Score::DRAW
            };
            return Ok((None, score, PrincipalVariation::default()));
        }

        moves.sort_by(Move::capture_order);

        let mut alpha = -Score::INF;
        let beta = Score::INF;
        let mut bestmove = None;
        let mut pv = PrincipalVariation::default();
        let mut child_pv = PrincipalVariation::default();

        for mv in moves {
            mv.apply(self.board);
            let res = self.negamax(self.side.opponent(), depth - 1, 1, -beta, -alpha, &mut child_pv);
            mv.undo(self.board);

            let score = -res?;

            if score > alpha {
                alpha = score;
                bestmove = Some(mv);
                pv.assemble(mv, &child_pv);
            }
        }

        Ok((bestmove, alpha, pv))
    }

    /// Recursive [negamax](https://www.chessprogramming.org/Negamax) search
    /// with alpha-beta pruning, scoring the position for `side`.
    ///
    /// Returns an error when the time budget runs out; every level undoes
    /// its applied move before propagating the error, so the board unwinds
    /// cleanly back to the root position.
    fn negamax(
        &mut self,
        side: Color,
        depth: u8,
        ply: i32,
        alpha: Score,
        beta: Score,
        pv: &mut PrincipalVariation,
    ) -> Result<Score> {
        self.nodes += 1;

        // Polling the clock every node is wasteful; every couple thousand is plenty.
        if self.nodes % TIMER_CHECK_INTERVAL == 0
            && self.config.starttime.elapsed() >= self.config.timeout
        {
            bail!(
                "exceeded search budget of {}ms",
                self.config.timeout.as_millis()
            );
        }

        // At the horizon, fall back to the static evaluation.
        if depth == 0 || ply >= MAX_DEPTH as i32 {
            pv.clear();
            return Ok(Evaluator::new(self.board).eval_for(side));
        }

        let mut moves = self.board.generate_legal_moves(side);

        // If there are no legal moves, it's either mate or a draw.
        if moves.is_empty() {
            pv.clear();
            let score = if self.board.is_in_check(side) {
                // Offset by the ply so that faster mates score higher.
                -Score::MATE + ply
            } else {
                // Drawing is better than losing.
                Score::DRAW
            };
            return Ok(score);
        }

        moves.sort_by(Move::capture_order);

        let mut alpha = alpha;
        let mut best = -Score::INF;
        let mut child_pv = PrincipalVariation::default();
        pv.clear();

        for mv in moves {
            mv.apply(self.board);
            let res = self.negamax(side.opponent(), depth - 1, ply + 1, -beta, -alpha, &mut child_pv);
            mv.undo(self.board);

            let score = -res?;

            if score > best {
                best = score;
                pv.assemble(mv, &child_pv);
            }

            if score > alpha {
                alpha = score;
            }

            // Our opponent has a better option earlier in the tree, so this
            // subtree can never be reached; stop exploring it.
            if alpha >= beta {
                break;
            }
        }

        Ok(best)
    }
}

/// A computer player bound to one side of a [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    color: Color,
}

impl Player {
    /// Creates a new [`Player`] that will choose moves for `color`.
    #[inline(always)]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// The side this player chooses moves for.
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Searches for this player's best move under the given wall-clock
    /// budget and, if one exists, plays it on the game.
    ///
    /// Returns the full [`SearchResult`]; a result with no best move means
    /// the player is checkmated or stalemated and the game is unchanged.
    pub fn make_move(&self, game: &mut Game, budget: Duration) -> SearchResult {
        let config = SearchConfig::with_timeout(budget);
        let result = Search::new(game.board_mut(), self.color, config).start();

        if let Some(mv) = result.bestmove {
            game.push(mv);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(fen: &str, max_depth: u8) -> SearchResult {
        let mut board = Board::from_fen(fen).unwrap();
        let side = board.side_to_move();
        let config = SearchConfig {
            max_depth,
            ..Default::default()
        };

        Search::new(&mut board, side, config).start()
    }

    #[test]
    fn test_white_mate_in_one() {
        let res = search("k7/8/KQ6/8/8/8/8/8 w - - 0 1", 3);

        assert!(res.score.is_mate(), "expected mate, got {:?}", res.score);
        assert_eq!(res.score.plies_to_mate(), 1);

        let bestmove = res.bestmove.expect("a mating move must exist");
        assert!(bestmove.is_check());
        assert_eq!(res.pv.moves().first(), Some(&bestmove));
    }

    #[test]
    fn test_checkmated_side_has_no_move() {
        let res = search("k7/1Q6/K7/8/8/8/8/8 b - - 0 1", 3);

        assert_eq!(res.bestmove, None);
        assert_eq!(res.score, -Score::MATE);
        assert!(res.pv.is_empty());
    }

    #[test]
    fn test_stalemated_side_scores_a_draw() {
        let res = search("k7/8/KQ6/8/8/8/8/8 b - - 0 1", 3);

        assert_eq!(res.bestmove, None);
        assert_eq!(res.score, Score::DRAW);
        // A stalemate is clearly distinguishable from being mated.
        assert!(!res.score.is_mate());
    }

    #[test]
    fn test_search_is_deterministic() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 0 1";

        let first = search(fen, 3);
        let second = search(fen, 3);

        assert_eq!(first.bestmove, second.bestmove);
        assert_eq!(first.score, second.score);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.pv, second.pv);
    }

    #[test]
    fn test_board_is_restored_after_search() {
        let mut board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 0 1",
        )
        .unwrap();
        let before = board.clone();
        let side = board.side_to_move();

        let config = SearchConfig {
            max_depth: 3,
            ..Default::default()
        };
        Search::new(&mut board, side, config).start();

        assert_eq!(board, before);
    }

    #[test]
    fn test_timeboxed_search_still_produces_a_move() {
        let mut board = Board::standard();
        let side = board.side_to_move();
        let config = SearchConfig::with_timeout(Duration::from_millis(50));

        let res = Search::new(&mut board, side, config).start();

        assert!(res.bestmove.is_some());
        assert!(res.depth >= 1);
        assert!(res.nodes > 0);
    }

    #[test]
    fn test_player_plays_its_move() {
        let board = Board::from_fen("k7/8/KQ6/8/8/8/8/8 w - - 0 1").unwrap();
        let mut game = Game::new(board);

        let result = Player::new(Color::White).make_move(&mut game, Duration::from_millis(200));

        assert!(result.bestmove.is_some());
        assert_eq!(game.len(), 1);
        assert_eq!(game.last_move(), result.bestmove.as_ref());
    }
}
