//! Re-derive slot records from a grid that's already been filled, e.g. one loaded back from a
//! results file. This only looks at text: '#' is a block and anything else counts as part of a
//! word. Runs are found with the same start rule and id numbering as `extract_slots`, so records
//! produced here line up with the ones from a fill.

use serde::{Deserialize, Serialize};

use crate::grid::BLOCK_CHAR;
use crate::{Direction, SlotId, MIN_SLOT_LENGTH};

/// An exported slot: where it starts, which way it runs, and what's in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub id: SlotId,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub answer: String,
}

impl SlotRecord {
    fn covers(&self, direction: Direction, x: usize, y: usize, answer: &str) -> bool {
        if self.direction != direction || !self.answer.contains(answer) {
            return false;
        }

        let len = self.answer.chars().count();
        match direction {
            Direction::Across => self.y == y && self.x <= x && x < self.x + len,
            Direction::Down => self.x == x && self.y <= y && y < self.y + len,
        }
    }
}

pub fn rederive_slot_records(filled: &str) -> Vec<SlotRecord> {
    let grid: Vec<Vec<char>> = filled
        .lines()
        .map(|line| line.chars().filter(|&c| c != ' ').collect::<Vec<char>>())
        .filter(|row| !row.is_empty())
        .collect();

    // Cells past the end of a short row act like blocks.
    let cell = |x: usize, y: usize| grid.get(y).and_then(|row| row.get(x)).copied();
    let is_fillable = |x: usize, y: usize| cell(x, y).map_or(false, |c| c != BLOCK_CHAR);

    let mut records: Vec<SlotRecord> = vec![];
    let mut next_id: SlotId = 0;

    for (y, row) in grid.iter().enumerate() {
        for x in 0..row.len() {
            if !is_fillable(x, y) {
                continue;
            }

            let starts_across = x == 0 || !is_fillable(x - 1, y);
            let starts_down = y == 0 || !is_fillable(x, y - 1);

            for (starts, direction) in [(starts_across, Direction::Across), (starts_down, Direction::Down)] {
                if !starts {
                    continue;
                }
                let id = next_id;
                next_id += 1;

                let answer: String = match direction {
                    Direction::Across => (x..).map_while(|cx| cell(cx, y).filter(|_| is_fillable(cx, y))).collect(),
                    Direction::Down => (y..).map_while(|cy| cell(x, cy).filter(|_| is_fillable(x, cy))).collect(),
                };

                if answer.chars().count() < MIN_SLOT_LENGTH {
                    continue;
                }
                if records.iter().any(|record| record.covers(direction, x, y, &answer)) {
                    continue;
                }

                records.push(SlotRecord { id, x, y, direction, answer });
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rederive_small_cross() {
        let records = rederive_slot_records("c#d\nago\nt#g");

        assert_eq!(records, vec![
            SlotRecord { id: 1, x: 0, y: 0, direction: Direction::Down, answer: "cat".to_string() },
            SlotRecord { id: 3, x: 2, y: 0, direction: Direction::Down, answer: "dog".to_string() },
            SlotRecord { id: 4, x: 0, y: 1, direction: Direction::Across, answer: "ago".to_string() },
        ]);
    }

    #[test]
    fn test_accepts_space_separated_rows() {
        assert_eq!(
            rederive_slot_records("c # d\na g o\nt # g\n"),
            rederive_slot_records("c#d\nago\nt#g"),
        );
    }

    #[test]
    fn test_repeated_text_on_one_row_is_kept() {
        let records = rederive_slot_records("cat#cat");

        let answers: Vec<_> = records.iter().map(|r| (r.x, r.answer.as_str())).collect();
        assert_eq!(answers, vec![(0, "cat"), (4, "cat")]);
    }

    #[test]
    fn test_contained_run_is_deduplicated() {
        let first = SlotRecord { id: 0, x: 0, y: 0, direction: Direction::Across, answer: "cater".to_string() };

        assert!(first.covers(Direction::Across, 2, 0, "ter"));
        assert!(!first.covers(Direction::Across, 6, 0, "ter"));
        assert!(!first.covers(Direction::Down, 2, 0, "ter"));
        assert!(!first.covers(Direction::Across, 2, 1, "ter"));
    }

    #[test]
    fn test_ragged_rows_end_runs() {
        let records = rederive_slot_records("abcd\nef\nghij");

        let summary: Vec<_> = records.iter().map(|r| (r.direction, r.answer.as_str())).collect();
        assert_eq!(summary, vec![
            (Direction::Across, "abcd"),
            (Direction::Down, "aeg"),
            (Direction::Down, "bfh"),
            (Direction::Across, "ghij"),
        ]);
    }

    #[test]
    fn test_serializes_to_json() {
        let record = SlotRecord { id: 4, x: 0, y: 1, direction: Direction::Across, answer: "ago".to_string() };

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":4,"x":0,"y":1,"direction":"across","answer":"ago"}"#,
        );
    }
}
