//! Fill a crossword grid from a template and a word list.
//!
//! The pipeline is: parse the template into a [`Board`], extract its slots (longest first), load
//! the words into a [`WordBank`], and let a [`Filler`] backtrack through the slots until every
//! one holds a word that agrees with its crossings.
//!
//! ```
//! use gridfill::{find_fill, parse_word_list, Board, FillOptions};
//!
//! let template = Board::parse(".#.\n...\n.#.")?;
//! let words = parse_word_list("cat\ndog\nago");
//!
//! let result = find_fill(&template, &words, &FillOptions::default())?;
//! assert_eq!(result.board.to_string(), "c#d\nago\nt#g");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use ::log::info;
use serde::{Deserialize, Serialize};

pub mod board_stack;
pub mod errors;
pub mod grid;
pub mod log;
pub mod rescan;
pub mod slots;
pub mod solver;
pub mod word_bank;

pub use board_stack::BoardStateStack;
pub use errors::{ConfigError, FillError};
pub use grid::{Board, Cell};
pub use rescan::{rederive_slot_records, SlotRecord};
pub use slots::{extract_slots, Slot, SlotConstraint};
pub use solver::{Choice, ExhaustionReason, FillFailure, FillOptions, FillSuccess, Filler, Statistics, Step};
pub use word_bank::{load_word_list, parse_word_list, Reservation, SelectionPolicy, Word, WordBank, WordGroup};

/// Runs shorter than this aren't slots.
pub const MIN_SLOT_LENGTH: usize = 3;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Default cap on the number of states a single fill attempt may visit.
pub const DEFAULT_MAX_ITERATIONS: u64 = 10_000_000;

/// How often (in states) the solver logs its progress.
pub const PROGRESS_LOG_INTERVAL: u64 = 100_000;

/// An identifier for a slot, assigned in discovery order while scanning the template.
pub type SlotId = usize;

/// An identifier for a word, based on its index in its length group.
pub type WordId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

/// Search for a fill, retrying with shuffled word orders if `options.restarts` allows.
///
/// The first attempt uses `options.policy`. Each retry `n` shuffles with seed `base + n`, where
/// `base` is the seed of a shuffle policy or 0 for letter-frequency ordering. Returns the first
/// success, or the failure from the last attempt.
pub fn find_fill(template: &Board, words: &[String], options: &FillOptions) -> Result<FillSuccess, FillError> {
    let base_seed = match options.policy {
        SelectionPolicy::Shuffle { seed } => seed,
        SelectionPolicy::LetterFrequency => 0,
    };

    let mut attempt: u32 = 0;
    loop {
        let mut attempt_options = options.clone();
        if attempt > 0 {
            attempt_options.policy = SelectionPolicy::Shuffle { seed: base_seed.wrapping_add(attempt as u64) };
        }

        let mut filler = Filler::new(template, words, attempt_options)?;
        match filler.run() {
            Ok(success) => return Ok(success),
            Err(failure) if attempt < options.restarts => {
                info!("Attempt {} failed: {}; restarting", attempt + 1, failure);
                attempt += 1;
            }
            Err(failure) => return Err(failure.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_fill_restarts_after_exhaustion() {
        let template = Board::parse(".#.\n...\n.#.").unwrap();
        let words = parse_word_list("cat\ndog\nago\nact\ntag\ngod");

        let options = FillOptions { max_iterations: Some(1), restarts: 2, ..FillOptions::default() };
        match find_fill(&template, &words, &options) {
            Err(FillError::Failed(FillFailure::Exhausted { .. })) => {}
            other => panic!("Expected exhaustion on every attempt, got {:?}", other),
        }

        let options = FillOptions { restarts: 2, ..FillOptions::default() };
        assert!(find_fill(&template, &words, &options).is_ok());
    }

    #[test]
    fn test_find_fill_reports_config_errors() {
        let template = Board::parse("....").unwrap();
        let words = parse_word_list("cat");

        assert!(matches!(
            find_fill(&template, &words, &FillOptions::default()),
            Err(FillError::Config(ConfigError::NoWordsOfLength { length: 4 })),
        ));
    }
}
