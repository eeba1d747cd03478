/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use stoat::{Board, Cli, Color, Command, Game, Move, Player, Search, SearchConfig, SearchResult};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Play { fen, movetime } => play(fen, Duration::from_millis(movetime)),
        Command::Solve { fen, movetime } => solve(&fen, Duration::from_millis(movetime)),
        Command::Moves { fen } => moves(&fen),
    };

    if let Err(e) = result {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }
}

/// Plays a full game, engine against engine, each side thinking for `budget`
/// per move. The game ends on checkmate, stalemate, or the no-progress draw.
fn play(fen: Option<String>, budget: Duration) -> Result<()> {
    let board = match fen {
        Some(fen) => Board::from_fen(&fen)?,
        None => Board::standard(),
    };
    let mut game = Game::new(board);

    println!("{}", game.board());

    loop {
        let side = game.board().side_to_move();
        let result = Player::new(side).make_move(&mut game, budget);

        let Some(mv) = result.bestmove else {
            if result.score.is_mate() {
                println!("{} is checkmated, end of game", side.name());
            } else {
                println!("{} is stalemated, game drawn", side.name());
            }
            break;
        };

        print_result(side, &mv, &result);
        println!("{}", game.board());

        if game.is_draw_by_no_progress() {
            println!("Game is drawn by the no-progress rule");
            break;
        }
    }

    Ok(())
}

/// Searches a single position under `budget` and prints the best move found.
fn solve(fen: &str, budget: Duration) -> Result<()> {
    let mut board = Board::from_fen(fen)?;
    let side = board.side_to_move();

    println!("{board}");

    let config = SearchConfig::with_timeout(budget);
    let result = Search::new(&mut board, side, config).start();

    let Some(mv) = result.bestmove else {
        if result.score.is_mate() {
            println!("{} is checkmated, no move to make", side.name());
        } else {
            println!("{} is stalemated, no move to make", side.name());
        }
        return Ok(());
    };

    print_result(side, &mv, &result);
    Ok(())
}

/// Prints all legal moves available in a position.
fn moves(fen: &str) -> Result<()> {
    let mut board = Board::from_fen(fen)?;
    let side = board.side_to_move();

    println!("{board}");

    let moves = board.generate_legal_moves(side);
    println!("{} legal moves for {}:", moves.len(), side.name());
    for mv in &moves {
        println!("  {} ({})", mv, mv.to_lan());
    }

    Ok(())
}

/// Prints a move chosen by search, along with its score, timing, node count,
/// and the principal variation behind it.
fn print_result(side: Color, mv: &Move, result: &SearchResult) {
    let score = if result.score.is_mate() {
        format!("mate in {}", result.score.moves_to_mate())
    } else {
        format!("{:+.2}", result.score.normalize())
    };

    println!(
        "{} plays {mv} with score {score} (depth {}, {} ms, {} positions considered)",
        side.name(),
        result.depth,
        result.elapsed.as_millis(),
        result.nodes,
    );
    println!("Principal variation: {}", result.pv);
}
