/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};

/// Command-line interface for the engine driver.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// A command to be executed by the driver.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Play a full game, engine against engine, printing each move as it is chosen.
    Play {
        /// Starting position as a FEN string. Defaults to the standard setup.
        #[arg(short, long)]
        fen: Option<String>,

        /// Time budget per move, in milliseconds.
        #[arg(short, long, default_value_t = 2000)]
        movetime: u64,
    },

    /// Search a single position and print the best move found.
    Solve {
        /// The position to search, as a FEN string.
        fen: String,

        /// Time budget for the search, in milliseconds.
        #[arg(short, long, default_value_t = 5000)]
        movetime: u64,
    },

    /// Print all legal moves available in a position.
    Moves {
        /// The position to inspect, as a FEN string.
        fen: String,
    },
}
