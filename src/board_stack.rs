use crate::grid::Board;

/// One board snapshot per search depth. The bottom snapshot is the untouched template; each
/// commit pushes a modified clone of the top, and backtracking is a single pop.
#[derive(Debug, Clone)]
pub struct BoardStateStack {
    boards: Vec<Board>,
}

impl BoardStateStack {
    pub fn new(template: Board) -> BoardStateStack {
        BoardStateStack { boards: vec![template] }
    }

    pub fn push(&mut self, board: Board) {
        self.boards.push(board);
    }

    pub fn pop(&mut self) -> Option<Board> {
        self.boards.pop()
    }

    pub fn top(&self) -> Option<&Board> {
        self.boards.last()
    }

    /// Number of snapshots, which is always the solver depth + 1.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}
