//! Procedural maze generation by recursive backtracking.
//!
//! Two shapes of the same algorithm:
//!
//! - [`Maze`]: a square grid of wall/open tiles where odd coordinates are
//!   rooms and even coordinates are walls between them. Used by the maze
//!   runner.
//! - [`CellMaze`]: a `cols x rows` graph of cells with open or closed
//!   passages between neighbours. Used to lay out tank arena walls.
//!
//! Both are perfect mazes: every room is reachable from every other room
//! through exactly one path.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{Direction, GameRng, Pos};

/// Square tile maze. `true` tiles are walls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    size: usize,
    walls: Vec<bool>,
}

impl Maze {
    /// Carve a `size x size` maze starting at (1, 1).
    ///
    /// `size` must be odd and at least 5. Every odd tile ends up open, so the
    /// finish at `(size - 2, size - 2)` is always reachable from the start.
    pub fn generate(size: usize, rng: &mut GameRng) -> Self {
        assert!(size >= 5, "maze size must be at least 5");
        assert!(size % 2 == 1, "maze size must be odd");

        let mut maze = Self {
            size,
            walls: vec![true; size * size],
        };

        let start = maze.start();
        maze.open(start);
        let mut stack = vec![start];

        while let Some(&current) = stack.last() {
            let candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|dir| {
                    let (dx, dy) = dir.delta();
                    let next = Pos::new(current.x + dx * 2, current.y + dy * 2);
                    maze.is_interior(next) && maze.is_wall(next)
                })
                .collect();

            let Some(&dir) = rng.choose(&candidates) else {
                stack.pop();
                continue;
            };

            let between = current.step(dir);
            let next = between.step(dir);
            maze.open(between);
            maze.open(next);
            stack.push(next);
        }

        maze
    }

    /// Edge length in tiles.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry tile.
    #[must_use]
    pub fn start(&self) -> Pos {
        Pos::new(1, 1)
    }

    /// Goal tile, in the far corner.
    #[must_use]
    pub fn finish(&self) -> Pos {
        let far = self.size as i32 - 2;
        Pos::new(far, far)
    }

    /// True for walls and for anything outside the grid.
    #[must_use]
    pub fn is_wall(&self, pos: Pos) -> bool {
        !pos.in_bounds(self.size, self.size) || self.walls[pos.index(self.size)]
    }

    /// True for walkable tiles.
    #[must_use]
    pub fn is_open(&self, pos: Pos) -> bool {
        !self.is_wall(pos)
    }

    /// Number of open tiles.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.walls.iter().filter(|wall| !**wall).count()
    }

    /// Moves from start to finish along the shortest path, if one exists.
    #[must_use]
    pub fn shortest_path_len(&self) -> Option<usize> {
        self.shortest_path().map(|path| path.len())
    }

    /// Arrow presses leading from start to finish by the shortest route.
    #[must_use]
    pub fn shortest_path(&self) -> Option<Vec<Direction>> {
        let mut came_from: Vec<Option<Direction>> = vec![None; self.size * self.size];
        let mut seen = vec![false; self.size * self.size];
        let mut queue = VecDeque::new();
        let start = self.start();
        seen[start.index(self.size)] = true;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            if pos == self.finish() {
                let mut path = Vec::new();
                let mut at = pos;
                while let Some(dir) = came_from[at.index(self.size)] {
                    path.push(dir);
                    at = at.step(dir.opposite());
                }
                path.reverse();
                return Some(path);
            }
            for dir in Direction::ALL {
                let next = pos.step(dir);
                if self.is_open(next) && !seen[next.index(self.size)] {
                    seen[next.index(self.size)] = true;
                    came_from[next.index(self.size)] = Some(dir);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// One text row per line: `#` for walls, `.` for open tiles.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                out.push(if self.is_wall(Pos::new(x, y)) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }

    fn is_interior(&self, pos: Pos) -> bool {
        let max = self.size as i32 - 1;
        pos.x > 0 && pos.x < max && pos.y > 0 && pos.y < max
    }

    fn open(&mut self, pos: Pos) {
        let index = pos.index(self.size);
        self.walls[index] = false;
    }
}

/// Cell graph maze: which passages between neighbouring cells are open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMaze {
    cols: usize,
    rows: usize,
    /// Passage from `(x, y)` to `(x + 1, y)`.
    open_right: Vec<bool>,
    /// Passage from `(x, y)` to `(x, y + 1)`.
    open_down: Vec<bool>,
}

impl CellMaze {
    /// Number of cell columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cell rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// True when the passage from `cell` towards `dir` is open.
    ///
    /// Passages leading out of the grid are always closed.
    #[must_use]
    pub fn is_passage_open(&self, cell: Pos, dir: Direction) -> bool {
        let other = cell.step(dir);
        if !cell.in_bounds(self.cols, self.rows) || !other.in_bounds(self.cols, self.rows) {
            return false;
        }
        match dir {
            Direction::Right => self.open_right[cell.index(self.cols)],
            Direction::Down => self.open_down[cell.index(self.cols)],
            Direction::Left => self.open_right[other.index(self.cols)],
            Direction::Up => self.open_down[other.index(self.cols)],
        }
    }

    /// Open the passage from `cell` towards `dir`. Ignored at the border.
    pub fn open_passage(&mut self, cell: Pos, dir: Direction) {
        let other = cell.step(dir);
        if !cell.in_bounds(self.cols, self.rows) || !other.in_bounds(self.cols, self.rows) {
            return;
        }
        match dir {
            Direction::Right => self.open_right[cell.index(self.cols)] = true,
            Direction::Down => self.open_down[cell.index(self.cols)] = true,
            Direction::Left => self.open_right[other.index(self.cols)] = true,
            Direction::Up => self.open_down[other.index(self.cols)] = true,
        }
    }

    /// Number of cells reachable from the top-left cell.
    #[must_use]
    pub fn reachable_cells(&self) -> usize {
        let mut seen = vec![false; self.cols * self.rows];
        let mut stack = vec![Pos::new(0, 0)];
        seen[0] = true;
        let mut count = 0;
        while let Some(cell) = stack.pop() {
            count += 1;
            for dir in Direction::ALL {
                let next = cell.step(dir);
                if self.is_passage_open(cell, dir) && !seen[next.index(self.cols)] {
                    seen[next.index(self.cols)] = true;
                    stack.push(next);
                }
            }
        }
        count
    }
}

impl Maze {
    /// Carve a `cols x rows` cell maze starting from the top-left cell.
    pub fn carve_cells(cols: usize, rows: usize, rng: &mut GameRng) -> CellMaze {
        assert!(cols > 0 && rows > 0, "cell maze needs at least one cell");

        let mut maze = CellMaze {
            cols,
            rows,
            open_right: vec![false; cols * rows],
            open_down: vec![false; cols * rows],
        };
        let mut visited = vec![false; cols * rows];
        let mut stack = vec![Pos::new(0, 0)];
        visited[0] = true;

        while let Some(&current) = stack.last() {
            let candidates: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|dir| {
                    let next = current.step(*dir);
                    next.in_bounds(cols, rows) && !visited[next.index(cols)]
                })
                .collect();

            let Some(&dir) = rng.choose(&candidates) else {
                stack.pop();
                continue;
            };

            let next = current.step(dir);
            maze.open_passage(current, dir);
            visited[next.index(cols)] = true;
            stack.push(next);
        }

        maze
    }
}
