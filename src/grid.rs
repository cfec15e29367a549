use std::fmt::{Display, Formatter};

use crate::errors::ConfigError;
use crate::GridCoord;

pub const OPEN_CHAR: char = '.';
pub const BLOCK_CHAR: char = '#';

/// The contents of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Open,
    Block,
    Letter(char),
}

impl Cell {
    /// Can a word pass through this cell?
    pub fn is_fillable(self) -> bool {
        !matches!(self, Cell::Block)
    }

    pub fn letter(self) -> Option<char> {
        match self {
            Cell::Letter(c) => Some(c),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::Open => OPEN_CHAR,
            Cell::Block => BLOCK_CHAR,
            Cell::Letter(c) => c,
        }
    }
}

/// A fixed-size rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Build a board from a string template, with . representing empty cells, # representing
    /// blocks, and letters representing themselves. Each row is trimmed and blank lines before
    /// the first row or after the last are skipped, so templates can be written indented inside
    /// test code. A blank line between rows is a ragged row.
    pub fn parse(template: &str) -> Result<Board, ConfigError> {
        let lines: Vec<&str> = template.lines().map(str::trim).collect();
        let first = lines.iter().position(|line| !line.is_empty()).unwrap_or(lines.len());
        let last = lines.iter().rposition(|line| !line.is_empty()).map_or(first, |i| i + 1);
        let rows = &lines[first..last];

        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(ConfigError::EmptyTemplate);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedTemplate { row: y, expected: width, found });
            }

            for (x, ch) in row.chars().enumerate() {
                let cell = match ch {
                    OPEN_CHAR => Cell::Open,
                    BLOCK_CHAR => Cell::Block,
                    c if c.is_alphabetic() => Cell::Letter(c.to_lowercase().next().unwrap_or(c)),
                    _ => return Err(ConfigError::InvalidTemplateChar { ch, x, y }),
                };
                cells.push(cell);
            }
        }

        Ok(Board { width, height: rows.len(), cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the cell at `loc`, or `None` if it falls outside the grid.
    pub fn get(&self, loc: GridCoord) -> Option<Cell> {
        let (x, y) = loc;
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Overwrite the cell at `loc`. Writes outside the grid are ignored.
    pub fn set(&mut self, loc: GridCoord, cell: Cell) {
        let (x, y) = loc;
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn is_fillable(&self, loc: GridCoord) -> bool {
        self.get(loc).map(Cell::is_fillable).unwrap_or(false)
    }

    /// True once no open cells remain.
    pub fn is_complete(&self) -> bool {
        !self.cells.contains(&Cell::Open)
    }

    /// Read the letters along a run of cells; open cells come back as '.'.
    pub fn read(&self, cells: &[GridCoord]) -> String {
        cells.iter().map(|&loc| self.get(loc).map(Cell::to_char).unwrap_or(OPEN_CHAR)).collect()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}
