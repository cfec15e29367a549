use smallvec::SmallVec;

use crate::grid::{Board, Cell};
use crate::{Direction, GridCoord, SlotId, MAX_SLOT_LENGTH, MIN_SLOT_LENGTH};

/// An across or down run of fillable cells. Slots are derived once from the template and never
/// recomputed from filled letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: SlotId,
    pub direction: Direction,
    pub start_cell: GridCoord,
    pub length: usize,
    pub cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,
}

impl Slot {
    /// Derive this slot's per-cell constraint from the letters currently on `board`.
    pub fn constraint(&self, board: &Board) -> SlotConstraint {
        SlotConstraint {
            cells: self.cells.iter().map(|&loc| board.get(loc).and_then(Cell::letter)).collect(),
        }
    }
}

/// Per-cell constraint for a slot: `None` accepts any letter, `Some(c)` requires exactly `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConstraint {
    cells: SmallVec<[Option<char>; MAX_SLOT_LENGTH]>,
}

impl SlotConstraint {
    pub fn new<I: IntoIterator<Item = Option<char>>>(cells: I) -> SlotConstraint {
        SlotConstraint { cells: cells.into_iter().collect() }
    }

    /// A constraint of the given length that accepts anything.
    pub fn wildcard(length: usize) -> SlotConstraint {
        SlotConstraint { cells: (0..length).map(|_| None).collect() }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True if every cell already holds a letter.
    pub fn is_fixed(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn matches(&self, glyphs: &[char]) -> bool {
        glyphs.len() == self.cells.len()
            && self.cells.iter().zip(glyphs).all(|(cell, glyph)| cell.map_or(true, |c| c == *glyph))
    }
}

/// Scan from `start` along `direction` until a block or the grid edge.
fn scan_run(board: &Board, start: GridCoord, direction: Direction) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
    let mut cells = SmallVec::new();
    let mut loc = start;

    while board.is_fillable(loc) {
        cells.push(loc);
        loc = match direction {
            Direction::Across => (loc.0 + 1, loc.1),
            Direction::Down => (loc.0, loc.1 + 1),
        };
    }

    cells
}

/// Extract the fillable slots from a template, longest first.
///
/// Every candidate start (across or down) takes the next id from a single counter, even if its
/// run is too short to keep, so numbering matches a later re-scan of the filled grid. The kept
/// slots are stable-sorted by length descending, so ties stay in discovery order.
pub fn extract_slots(board: &Board) -> Vec<Slot> {
    let mut slots = vec![];
    let mut next_id: SlotId = 0;

    for y in 0..board.height() {
        for x in 0..board.width() {
            if !board.is_fillable((x, y)) {
                continue;
            }

            let starts_across = x == 0 || board.get((x - 1, y)) == Some(Cell::Block);
            let starts_down = y == 0 || board.get((x, y - 1)) == Some(Cell::Block);

            for (starts, direction) in [(starts_across, Direction::Across), (starts_down, Direction::Down)] {
                if !starts {
                    continue;
                }

                let id = next_id;
                next_id += 1;

                let cells = scan_run(board, (x, y), direction);
                if cells.len() >= MIN_SLOT_LENGTH {
                    slots.push(Slot { id, direction, start_cell: (x, y), length: cells.len(), cells });
                }
            }
        }
    }

    slots.sort_by(|a, b| b.length.cmp(&a.length));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slots_for_3x3_with_two_blocks() {
        let board = Board::parse(".#.\n...\n.#.").unwrap();
        let slots = extract_slots(&board);

        let summary: Vec<_> = slots.iter()
            .map(|slot| (slot.id, slot.direction, slot.start_cell, slot.length))
            .collect();

        assert_eq!(summary, vec![
            (1, Direction::Down, (0, 0), 3),
            (3, Direction::Down, (2, 0), 3),
            (4, Direction::Across, (0, 1), 3),
        ]);
        assert_eq!(slots[2].cells.as_slice(), &[(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_slots_are_sorted_longest_first() {
        let board = Board::parse(
            "
            ...#....
            ........
            ....#...
            ",
        ).unwrap();
        let slots = extract_slots(&board);

        let lengths: Vec<_> = slots.iter().map(|slot| slot.length).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
        assert_eq!(slots[0].length, 8);

        // Equal lengths keep discovery order.
        for pair in slots.windows(2) {
            if pair[0].length == pair[1].length {
                assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn test_every_slot_is_long_enough_and_consistent() {
        let templates = [
            ".....\n.#.#.\n.....\n.#.#.\n.....",
            "..#..\n.....\n#...#\n.....\n..#..",
            "....#....\n....#....\n.........\n###...###",
            "#",
            "..",
        ];

        for template in templates {
            let board = Board::parse(template).unwrap();
            for slot in extract_slots(&board) {
                assert!(slot.length >= MIN_SLOT_LENGTH, "{template}: {slot:?}");
                assert_eq!(slot.cells.len(), slot.length);
                assert_eq!(slot.cells[0], slot.start_cell);
            }
        }
    }

    #[test]
    fn test_short_runs_still_consume_ids() {
        // Row 0 has a 2-cell run and a 3-cell run; the 2-cell run and each column's 1-cell run
        // are dropped but keep their ids.
        let board = Board::parse("..#...").unwrap();
        let slots = extract_slots(&board);

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_cell, (3, 0));
        // (0,0) across=0 down=1, (1,0) down=2, (3,0) across=3.
        assert_eq!(slots[0].id, 3);
    }

    #[test]
    fn test_prefilled_letters_extend_runs() {
        let board = Board::parse("a..\n#.#\n#b#").unwrap();
        let slots = extract_slots(&board);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].direction, Direction::Across);
        assert_eq!(slots[1].start_cell, (1, 0));
        assert_eq!(slots[1].constraint(&board), SlotConstraint::new([None, None, Some('b')]));
    }

    #[test]
    fn test_constraint_matching() {
        let constraint = SlotConstraint::new([Some('c'), None, Some('t')]);

        assert!(constraint.matches(&['c', 'a', 't']));
        assert!(constraint.matches(&['c', 'o', 't']));
        assert!(!constraint.matches(&['a', 'c', 't']));
        assert!(!constraint.matches(&['c', 'a', 't', 's']));
        assert!(!constraint.is_fixed());
        assert!(SlotConstraint::wildcard(4).matches(&['w', 'x', 'y', 'z']));
    }
}
