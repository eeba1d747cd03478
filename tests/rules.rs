/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use stoat::{Board, Game, Score, Search, SearchConfig, Square};

/// A handful of positions with varied move kinds available: the standard
/// setup, a developed midgame, and promotions (with and without capture)
/// for both sides.
const POSITIONS: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 0",
    "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 0 1",
    "rnb1k3/1P6/8/8/8/8/8/4K3 w - - 0 1",
    "8/7k/8/8/8/8/p6K/8 b - - 0 1",
];

fn board(fen: &str) -> Board {
    Board::from_fen(fen).unwrap()
}

fn search(fen: &str, max_depth: u8) -> stoat::SearchResult {
    let mut board = board(fen);
    let side = board.side_to_move();
    let config = SearchConfig {
        max_depth,
        ..Default::default()
    };

    Search::new(&mut board, side, config).start()
}

#[test]
fn square_notation_roundtrips() {
    for square in Square::iter() {
        let text = square.to_string();
        let parsed: Square = text.parse().unwrap();
        assert_eq!(parsed, square);
        assert_eq!(parsed.to_string(), text);
    }

    for bad in ["a9", "i1", "e", "e10", ""] {
        assert!(bad.parse::<Square>().is_err(), "accepted {bad:?}");
    }
}

#[test]
fn applying_and_undoing_a_move_restores_the_board_exactly() {
    for fen in POSITIONS {
        let mut board = board(fen);
        let original = board.clone();
        let side = board.side_to_move();

        for mv in board.generate_legal_moves(side) {
            mv.apply(&mut board);
            assert_ne!(board, original, "{mv} did not change the board on {fen}");

            mv.undo(&mut board);
            assert_eq!(board, original, "{mv} did not restore the board on {fen}");
        }
    }
}

#[test]
fn legal_moves_never_leave_the_own_king_attacked() {
    for fen in POSITIONS {
        let mut board = board(fen);
        let side = board.side_to_move();

        for mv in board.generate_legal_moves(side) {
            mv.apply(&mut board);
            assert_eq!(
                board.checker(side),
                None,
                "{mv} leaves the king attacked on {fen}"
            );
            mv.undo(&mut board);
        }
    }
}

#[test]
fn checkmate_is_no_moves_and_a_mate_score() {
    // The cornered king is in check from the queen and every escape square
    // is covered by the queen or the enemy king.
    let mut mated = board("k7/1Q6/K7/8/8/8/8/8 b - - 0 1");
    assert!(mated.generate_legal_moves(mated.side_to_move()).is_empty());

    let res = search("k7/1Q6/K7/8/8/8/8/8 b - - 0 1", 3);
    assert_eq!(res.bestmove, None);
    assert_eq!(res.score, -Score::MATE);
}

#[test]
fn stalemate_is_no_moves_and_a_draw_score() {
    let mut stale = board("k7/8/KQ6/8/8/8/8/8 b - - 0 1");
    assert!(stale.generate_legal_moves(stale.side_to_move()).is_empty());
    assert!(!stale.is_in_check(stale.side_to_move()));

    let res = search("k7/8/KQ6/8/8/8/8/8 b - - 0 1", 3);
    assert_eq!(res.bestmove, None);
    assert_eq!(res.score, Score::DRAW);
    assert_ne!(res.score, -Score::MATE);
}

#[test]
fn one_hundred_quiet_plies_draw_the_game() {
    let board = Board::parse(
        "r...k...
         ........
         ........
         ........
         ........
         ........
         P.......
         R...K...",
    )
    .unwrap();
    let mut game = Game::new(board);

    // A pawn move first: progress that must eventually age out of the window.
    let mv = game.board_mut().parse_move("a2-a3").unwrap();
    game.push(mv);

    // Then nothing but rook shuffling.
    let cycle = ["a8-b8", "a1-b1", "b8-a8", "b1-a1"];
    for i in 0..99 {
        let mv = game.board_mut().parse_move(cycle[i % cycle.len()]).unwrap();
        game.push(mv);
    }

    // 100 plies played, but the window still contains the pawn move.
    assert_eq!(game.len(), 100);
    assert!(!game.is_draw_by_no_progress());

    // One more quiet ply leaves 100 consecutive plies without progress.
    let mv = game.board_mut().parse_move(cycle[99 % cycle.len()]).unwrap();
    game.push(mv);
    assert!(game.is_draw_by_no_progress());
}

#[test]
fn standard_position_fen_is_exact() {
    let standard = Board::standard();
    assert_eq!(
        standard.to_fen(),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 0"
    );
    assert_eq!(Board::from_fen(&standard.to_fen()).unwrap(), standard);
}

#[test]
fn compact_tokens_roundtrip() {
    for fen in POSITIONS {
        let board = board(fen);
        let token = board.serialize();

        assert_eq!(token.len(), 65);
        assert_eq!(Board::deserialize(&token).unwrap(), board);
    }
}

#[test]
fn search_results_are_deterministic() {
    let fen = POSITIONS[1];

    let first = search(fen, 3);
    let second = search(fen, 3);

    assert_eq!(first.bestmove, second.bestmove);
    assert_eq!(first.score, second.score);
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.pv, second.pv);
}
