use std::collections::VecDeque;

use crate::TermInt;
use Direction::*;

/// A position on the board, addressed the way the terminal is: row first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: TermInt,
    pub col: TermInt,
}

impl Cell {
    pub const fn new(row: TermInt, col: TermInt) -> Self {
        Cell { row, col }
    }

    /// The neighbouring cell one step towards `dir`, or `None` when that
    /// would leave the addressable grid.
    pub fn step(self, dir: Direction) -> Option<Cell> {
        let (row, col) = match dir {
            Up => (self.row.checked_sub(1)?, self.col),
            Down => (self.row.checked_add(1)?, self.col),
            Left => (self.row, self.col.checked_sub(1)?),
            Right => (self.row, self.col.checked_add(1)?),
        };
        Some(Cell { row, col })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Playable area, read once from the terminal. The outermost rows and
/// columns are walls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub height: TermInt,
    pub width: TermInt,
}

impl Board {
    pub fn new(height: TermInt, width: TermInt) -> Self {
        Board { height, width }
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        cell.row == 0 || cell.col == 0 || cell.row >= self.height - 1 || cell.col >= self.width - 1
    }

    pub fn interior(&self) -> impl Iterator<Item = Cell> + '_ {
        (1..self.height - 1).flat_map(move |row| (1..self.width - 1).map(move |col| Cell::new(row, col)))
    }

    pub fn interior_len(&self) -> usize {
        self.height.saturating_sub(2) as usize * self.width.saturating_sub(2) as usize
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Cell, old_head: Cell, old_tail: Option<Cell> },
    Crashed
}

#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
}

impl Snake {
    /// Builds a straight snake whose head sits at `head` and whose body
    /// trails behind it, opposite to `direction`.
    pub fn new(head: Cell, size: usize, direction: Direction) -> Self {
        let back = direction.opposite();
        let mut body = VecDeque::with_capacity(size.max(1));
        let mut cell = Some(head);

        while let Some(pos) = cell {
            body.push_back(pos);
            if body.len() == size.max(1) {
                break;
            }
            cell = pos.step(back);
        }

        Snake { body, direction }
    }

    #[cfg(test)]
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>, direction: Direction) -> Self {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        assert!(!body.is_empty(), "a snake needs at least one cell");
        Snake { body, direction }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    #[cfg(test)]
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.body.contains(cell)
    }

    /// Advances one cell. The tail is still in place when the new head is
    /// checked, so running into it counts as a crash.
    pub fn move_step(&mut self, board: &Board, grow: impl FnOnce(Cell) -> bool) -> MoveResult {
        let old_head = self.head();

        let new_head = match old_head.step(self.direction) {
            Some(cell) if !board.is_wall(cell) && !self.contains(&cell) => cell,
            _ => return MoveResult::Crashed,
        };

        self.body.push_front(new_head);

        if grow(new_head) {
            MoveResult::Moved { new_head, old_head, old_tail: None }
        } else {
            let old_tail = self.body.pop_back();
            MoveResult::Moved { new_head, old_head, old_tail }
        }
    }

    /// Returns whether the direction actually changed. Reversals are dropped.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction.is_opposite(self.direction) || new_direction == self.direction {
            return false;
        }

        self.direction = new_direction;
        true
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(20, 20)
    }

    #[test]
    fn opposite_pairs() {
        assert_eq!(Up.opposite(), Down);
        assert_eq!(Left.opposite(), Right);
        assert!(Right.is_opposite(Left));
        assert!(!Right.is_opposite(Up));
    }

    #[test]
    fn new_snake_trails_behind_head() {
        let snake = Snake::new(Cell::new(10, 5), 3, Right);
        let cells: Vec<_> = snake.body().iter().copied().collect();
        assert_eq!(cells, vec![Cell::new(10, 5), Cell::new(10, 4), Cell::new(10, 3)]);
        assert_eq!(snake.head(), Cell::new(10, 5));
        assert_eq!(snake.tail(), Cell::new(10, 3));
    }

    #[test]
    fn new_snake_stops_at_grid_edge() {
        let snake = Snake::new(Cell::new(3, 1), 5, Right);
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut snake = Snake::new(Cell::new(10, 5), 3, Right);
        assert!(!snake.set_direction(Left));
        assert_eq!(snake.get_direction(), Right);
        assert!(snake.set_direction(Up));
        assert_eq!(snake.get_direction(), Up);
    }

    #[test]
    fn step_without_growth_keeps_length() {
        let mut snake = Snake::new(Cell::new(10, 5), 3, Right);
        let res = snake.move_step(&board(), |_| false);
        assert_eq!(
            res,
            MoveResult::Moved {
                new_head: Cell::new(10, 6),
                old_head: Cell::new(10, 5),
                old_tail: Some(Cell::new(10, 3)),
            }
        );
        assert_eq!(snake.len(), 3);
    }

    #[test]
    fn step_with_growth_keeps_tail() {
        let mut snake = Snake::new(Cell::new(10, 5), 3, Right);
        let res = snake.move_step(&board(), |_| true);
        assert!(matches!(res, MoveResult::Moved { old_tail: None, .. }));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Cell::new(10, 3));
    }

    #[test]
    fn wall_is_fatal() {
        let mut snake = Snake::new(Cell::new(10, 18), 3, Right);
        assert_eq!(snake.move_step(&board(), |_| false), MoveResult::Crashed);
        assert_eq!(snake.len(), 3);

        let mut snake = Snake::new(Cell::new(1, 5), 1, Up);
        assert_eq!(snake.move_step(&board(), |_| false), MoveResult::Crashed);
    }

    #[test]
    fn body_is_fatal() {
        // Head at (5,5) moving Down into (6,5), which is mid-body.
        let cells = [
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(6, 6),
            Cell::new(6, 5),
            Cell::new(6, 4),
        ];
        let mut snake = Snake::from_cells(cells, Down);
        assert_eq!(snake.move_step(&board(), |_| false), MoveResult::Crashed);
    }

    #[test]
    fn tail_is_fatal_too() {
        let cells = [Cell::new(5, 5), Cell::new(5, 6), Cell::new(6, 6), Cell::new(6, 5)];
        let mut snake = Snake::from_cells(cells, Down);
        assert_eq!(snake.move_step(&board(), |_| false), MoveResult::Crashed);
    }

    #[test]
    fn interior_excludes_walls() {
        let b = Board::new(5, 6);
        let cells: Vec<_> = b.interior().collect();
        assert_eq!(cells.len(), b.interior_len());
        assert_eq!(cells.len(), 3 * 4);
        assert!(cells.iter().all(|c| !b.is_wall(*c)));
    }
}
