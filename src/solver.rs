//! The backtracking fill engine.
//!
//! The search walks the (longest-first) slot list depth-first. At each depth it reads the
//! letters already on the board to build the slot's constraint, asks the word bank for the first
//! untried candidate, and either commits it (pushing a new board snapshot) or pops back to the
//! previous depth, releasing the word that was committed there.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, trace};
use std::fmt::{Display, Formatter};

use crate::board_stack::BoardStateStack;
use crate::errors::ConfigError;
use crate::grid::{Board, Cell};
use crate::rescan::SlotRecord;
use crate::slots::{extract_slots, Slot};
use crate::word_bank::{Reservation, SelectionPolicy, WordBank};
use crate::{Direction, GridCoord, SlotId, WordId, DEFAULT_MAX_ITERATIONS, PROGRESS_LOG_INTERVAL};

/// Knobs for a fill run.
#[derive(Debug, Clone, PartialEq)]
pub struct FillOptions {
    pub policy: SelectionPolicy,

    /// Give up after visiting this many states. `None` means no limit.
    pub max_iterations: Option<u64>,

    /// Give up once this much wall-clock time has passed, checked between steps.
    pub time_limit: Option<Duration>,

    /// How many extra attempts `find_fill` makes, each with a freshly shuffled word order.
    pub restarts: u32,
}

impl Default for FillOptions {
    fn default() -> Self {
        FillOptions {
            policy: SelectionPolicy::LetterFrequency,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            time_limit: None,
            restarts: 0,
        }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub max_depth: usize,
    pub duration: Duration,
}

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub direction: Direction,
    pub start_cell: GridCoord,
    pub word: String,
}

/// A struct representing the results of a successful fill.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub board: Board,
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    /// One record per filled slot, ordered by slot id.
    pub fn slot_records(&self) -> Vec<SlotRecord> {
        let mut records: Vec<SlotRecord> = self.choices.iter().map(|choice| SlotRecord {
            id: choice.slot_id,
            x: choice.start_cell.0,
            y: choice.start_cell.1,
            direction: choice.direction,
            answer: choice.word.clone(),
        }).collect();

        records.sort_by_key(|record| record.id);
        records
    }
}

/// Why a search stopped before reaching a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionReason {
    IterationBudget,
    TimeLimit,
}

impl Display for ExhaustionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExhaustionReason::IterationBudget => write!(f, "iteration budget reached"),
            ExhaustionReason::TimeLimit => write!(f, "time limit reached"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FillFailure {
    /// Every candidate for the first slot has been tried.
    #[error("no consistent fill exists ({} states visited)", .statistics.states)]
    Unsolvable { statistics: Statistics },

    /// The search was cut off while still active. The state is consistent, so it can be
    /// resumed, but this run didn't converge.
    #[error("search stopped early: {reason} after {} states", .statistics.states)]
    Exhausted { reason: ExhaustionReason, statistics: Statistics },
}

impl FillFailure {
    pub fn statistics(&self) -> &Statistics {
        match self {
            FillFailure::Unsolvable { statistics } => statistics,
            FillFailure::Exhausted { statistics, .. } => statistics,
        }
    }
}

/// The result of a single search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A word was committed and the search moved one slot deeper.
    Advanced,
    /// No candidate fit, so the search moved back one slot.
    Regressed,
    /// Every slot is filled; nothing left to do.
    Filled,
    /// The search has backed out past the first slot; nothing left to do.
    Unsolvable,
}

/// A word committed at some depth. Pre-filled entries are committed without a reservation.
#[derive(Debug, Clone)]
struct Commitment {
    word: String,
    reservation: Option<Reservation>,
}

/// Live state of a fill: the fixed slot list, the word bank, one board per depth, and the
/// per-depth bookkeeping needed to undo a commitment.
#[derive(Debug, Clone)]
pub struct Filler {
    slots: Vec<Slot>,
    bank: WordBank,
    boards: BoardStateStack,

    /// For slots completely filled in the template, the id of the word they already hold.
    seeds: Vec<Option<WordId>>,

    /// Word ids (within the slot's length group) already tried at each depth.
    tried: Vec<BitSet>,

    /// The word currently committed at each depth.
    commitments: Vec<Option<Commitment>>,

    statistics: Statistics,
    options: FillOptions,
}

impl Filler {
    /// Set up a fill for `template` using `words` (normalized, see `parse_word_list`).
    pub fn new(template: &Board, words: &[String], options: FillOptions) -> Result<Filler, ConfigError> {
        let slots = extract_slots(template);
        let mut bank = WordBank::new(words, options.policy);

        // Entries that are completely filled in the template are always allowed, even if the
        // word list doesn't contain them or repeats them. They stay reserved for the whole
        // search so open slots can't reuse them.
        let seeds: Vec<Option<WordId>> = slots
            .iter()
            .map(|slot| {
                if !slot.constraint(template).is_fixed() {
                    return None;
                }
                let word_id = bank.add_seed(&template.read(&slot.cells));
                bank.reserve(slot.length, word_id);
                Some(word_id)
            })
            .collect();

        for slot in &slots {
            if bank.group(slot.length).map(|group| group.is_empty()).unwrap_or(true) {
                return Err(ConfigError::NoWordsOfLength { length: slot.length });
            }
        }

        info!("Filling {}x{} grid: {} slots, {} words", template.width(), template.height(), slots.len(), words.len());

        Ok(Filler {
            tried: slots.iter().map(|_| BitSet::new()).collect(),
            commitments: slots.iter().map(|_| None).collect(),
            seeds,
            boards: BoardStateStack::new(template.clone()),
            slots,
            bank,
            statistics: Statistics::default(),
            options,
        })
    }

    /// The slots being filled, in the order the search visits them.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Index of the slot being worked on, or `None` once the search has backed out past the
    /// first slot. Equal to `slots().len()` when the grid is full.
    pub fn depth(&self) -> Option<usize> {
        self.boards.len().checked_sub(1)
    }

    /// The board reflecting every slot committed so far.
    pub fn board(&self) -> Option<&Board> {
        self.boards.top()
    }

    /// The committed slots and their words, in search order.
    pub fn committed(&self) -> Vec<(&Slot, &str)> {
        self.slots.iter()
            .zip(&self.commitments)
            .filter_map(|(slot, commitment)| commitment.as_ref().map(|c| (slot, c.word.as_str())))
            .collect()
    }

    /// Replace the iteration and time limits, e.g. to resume after an exhausted run.
    pub fn set_limits(&mut self, max_iterations: Option<u64>, time_limit: Option<Duration>) {
        self.options.max_iterations = max_iterations;
        self.options.time_limit = time_limit;
    }

    /// Perform one step of the search: commit a candidate for the current slot, or undo the
    /// previous slot's commitment if there's no candidate left.
    pub fn step(&mut self) -> Step {
        let depth = match self.depth() {
            None => return Step::Unsolvable,
            Some(depth) if depth == self.slots.len() => return Step::Filled,
            Some(depth) => depth,
        };
        let Some(board) = self.boards.top() else {
            return Step::Unsolvable;
        };

        self.statistics.states += 1;

        let slot = &self.slots[depth];
        let tried = &self.tried[depth];
        let candidate = match self.seeds[depth] {
            Some(word_id) => Some(word_id).filter(|&id| !tried.contains(id)),
            None => self.bank.select(slot.length, &slot.constraint(board), tried),
        };

        match candidate.and_then(|id| self.bank.word(slot.length, id).map(|word| (id, word))) {
            Some((word_id, word)) => {
                let mut next_board = board.clone();
                for (&loc, &glyph) in slot.cells.iter().zip(&word.glyphs) {
                    next_board.set(loc, Cell::Letter(glyph));
                }
                trace!("depth {}: slot {} <- {:?}", depth, slot.id, word.string);
                let word = word.string.clone();

                self.boards.push(next_board);
                let reservation = match self.seeds[depth] {
                    Some(_) => None,
                    None => Some(self.bank.reserve(slot.length, word_id)),
                };
                self.commitments[depth] = Some(Commitment { word, reservation });
                self.tried[depth].insert(word_id);
                self.statistics.max_depth = self.statistics.max_depth.max(depth + 1);

                Step::Advanced
            }

            None => {
                trace!("depth {}: slot {} has no candidates, backtracking", depth, slot.id);

                self.boards.pop();
                let commitment = depth.checked_sub(1).and_then(|prev| self.commitments[prev].take());
                if let Some(reservation) = commitment.and_then(|c| c.reservation) {
                    self.bank.release(reservation);
                }
                // Next time we arrive at this depth it'll be under a different assignment, so
                // every word is worth trying again.
                self.tried[depth].clear();
                self.statistics.backtracks += 1;

                Step::Regressed
            }
        }
    }

    /// Step until the grid is filled, proven unfillable, or a limit is hit. Can be called again
    /// after an `Exhausted` result (typically after `set_limits`) to continue the same search.
    pub fn run(&mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        let prior_duration = self.statistics.duration;

        enum Stop {
            Filled,
            Unsolvable,
            Exhausted(ExhaustionReason),
        }

        let stop = loop {
            match self.depth() {
                None => break Stop::Unsolvable,
                Some(depth) if depth == self.slots.len() => break Stop::Filled,
                Some(_) => {}
            }

            if self.options.max_iterations.map_or(false, |max| self.statistics.states >= max) {
                break Stop::Exhausted(ExhaustionReason::IterationBudget);
            }
            if self.options.time_limit.map_or(false, |limit| prior_duration + start.elapsed() >= limit) {
                break Stop::Exhausted(ExhaustionReason::TimeLimit);
            }

            self.step();

            if self.statistics.states % PROGRESS_LOG_INTERVAL == 0 {
                debug!(
                    "{} states, depth {:?} of {}, {} backtracks",
                    self.statistics.states, self.depth(), self.slots.len(), self.statistics.backtracks,
                );
            }
        };

        self.statistics.duration = prior_duration + start.elapsed();
        let statistics = self.statistics.clone();

        match stop {
            Stop::Filled => {
                info!("Filled grid in {} states ({:?})", statistics.states, statistics.duration);

                let choices = self.slots.iter()
                    .zip(&self.commitments)
                    .filter_map(|(slot, commitment)| commitment.as_ref().map(|c| Choice {
                        slot_id: slot.id,
                        direction: slot.direction,
                        start_cell: slot.start_cell,
                        word: c.word.clone(),
                    }))
                    .collect();

                match self.boards.top() {
                    Some(board) => Ok(FillSuccess { board: board.clone(), statistics, choices }),
                    None => Err(FillFailure::Unsolvable { statistics }),
                }
            }
            Stop::Unsolvable => {
                info!("No fill exists ({} states)", statistics.states);
                Err(FillFailure::Unsolvable { statistics })
            }
            Stop::Exhausted(reason) => {
                info!("Gave up: {} ({} states, depth {:?})", reason, statistics.states, self.depth());
                Err(FillFailure::Exhausted { reason, statistics })
            }
        }
    }
}
