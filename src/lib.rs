/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The board, the pieces on it, and the rules for moving them.
mod board;

/// Command-line interface for the driver binary.
mod cli;

/// Evaluation of chess positions.
mod eval;

/// Move history over a board, and history-based draw detection.
mod game;

/// Scores assigned to positions and moves.
mod score;

/// Main engine logic; all search related code.
mod search;

pub use board::*;
pub use cli::*;
pub use eval::*;
pub use game::*;
pub use score::*;
pub use search::*;
