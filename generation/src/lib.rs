#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded maze topology generation for Maze Pursuit.
//!
//! A maze starts as a grid of fully walled cells. Randomized depth-first
//! search carves a spanning tree (a perfect maze: exactly one path between
//! any two cells), then loop injection removes a bounded number of extra
//! wall pairs to create cycles. The resulting [`Maze`] is immutable; a new
//! topology is obtained only through full regeneration.

use maze_pursuit_core::{CellCoord, Direction};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

const LOOP_ATTEMPTS_PER_CELL: u64 = 8;
const MIN_LOOP_ATTEMPTS: u64 = 64;

/// Parameters describing a single maze generation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    columns: u32,
    rows: u32,
    extra_loops: u32,
    seed: u64,
}

impl GenerationRequest {
    /// Creates a new generation request.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, extra_loops: u32, seed: u64) -> Self {
        Self {
            columns,
            rows,
            extra_loops,
            seed,
        }
    }

    /// Number of cell columns the maze should span.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows the maze should span.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of connections to inject beyond the spanning tree.
    #[must_use]
    pub const fn extra_loops(&self) -> u32 {
        self.extra_loops
    }

    /// Seed consumed by the default random source.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

/// Reasons a maze generation request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The requested grid had no cells along at least one axis.
    #[error("maze dimensions must be at least 1x1 (got {columns}x{rows})")]
    EmptyDimensions {
        /// Number of cell columns provided in the request.
        columns: u32,
        /// Number of cell rows provided in the request.
        rows: u32,
    },
}

/// Set of walls still standing around a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WallSet(u8);

impl WallSet {
    const SOLID: WallSet = WallSet(0b1111);

    const fn mask(direction: Direction) -> u8 {
        match direction {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }

    const fn contains(&self, direction: Direction) -> bool {
        self.0 & Self::mask(direction) != 0
    }

    fn remove(&mut self, direction: Direction) {
        self.0 &= !Self::mask(direction);
    }
}

/// Immutable maze topology produced by [`generate`].
///
/// The designated start cell is `(0, 0)` and the designated exit cell is
/// `(columns - 1, rows - 1)`. Wall removal during generation is always
/// mutual, so for any two adjacent cells the wall between them is either
/// present on both sides or absent on both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    columns: u32,
    rows: u32,
    seed: u64,
    requested_loops: u32,
    injected_loops: u32,
    cells: Vec<WallSet>,
}

impl Maze {
    fn solid(request: GenerationRequest) -> Self {
        let cell_count_u64 = u64::from(request.columns) * u64::from(request.rows);
        let cell_count = usize::try_from(cell_count_u64).unwrap_or(0);
        Self {
            columns: request.columns,
            rows: request.rows,
            seed: request.seed,
            requested_loops: request.extra_loops,
            injected_loops: 0,
            cells: vec![WallSet::SOLID; cell_count],
        }
    }

    /// Number of cell columns the maze spans.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows the maze spans.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Seed the generator consumed for this maze.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of extra connections the generation request asked for.
    #[must_use]
    pub const fn requested_loops(&self) -> u32 {
        self.requested_loops
    }

    /// Number of extra connections actually injected.
    ///
    /// Falls short of [`Maze::requested_loops`] when the attempt budget ran
    /// out before enough removable walls were found.
    #[must_use]
    pub const fn injected_loops(&self) -> u32 {
        self.injected_loops
    }

    /// Cell every run begins at.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        CellCoord::new(0, 0)
    }

    /// Cell holding the maze exit.
    #[must_use]
    pub const fn exit_cell(&self) -> CellCoord {
        CellCoord::new(self.columns - 1, self.rows - 1)
    }

    /// Total number of cells in the maze.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the cell keeps its wall in the provided direction.
    ///
    /// Out-of-bounds cells read as fully walled so callers never treat the
    /// outside of the maze as traversable.
    #[must_use]
    pub fn has_wall(&self, cell: CellCoord, direction: Direction) -> bool {
        self.index(cell).map_or(true, |index| {
            self.cells
                .get(index)
                .map_or(true, |walls| walls.contains(direction))
        })
    }

    /// Returns the in-bounds neighbor of the cell in the provided direction.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        if self.index(cell).is_none() {
            return None;
        }

        let column = cell.column();
        let row = cell.row();
        let neighbor = match direction {
            Direction::North => CellCoord::new(column, row.checked_sub(1)?),
            Direction::East => {
                let next = column.checked_add(1)?;
                if next >= self.columns {
                    return None;
                }
                CellCoord::new(next, row)
            }
            Direction::South => {
                let next = row.checked_add(1)?;
                if next >= self.rows {
                    return None;
                }
                CellCoord::new(column, next)
            }
            Direction::West => CellCoord::new(column.checked_sub(1)?, row),
        };
        Some(neighbor)
    }

    fn remove_wall_pair(&mut self, cell: CellCoord, direction: Direction) {
        let Some(neighbor) = self.neighbor(cell, direction) else {
            return;
        };

        if let Some(index) = self.index(cell) {
            if let Some(walls) = self.cells.get_mut(index) {
                walls.remove(direction);
            }
        }
        if let Some(index) = self.index(neighbor) {
            if let Some(walls) = self.cells.get_mut(index) {
                walls.remove(direction.opposite());
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Generates a maze using the default seeded random source.
///
/// Identical requests reproduce identical mazes.
pub fn generate(request: GenerationRequest) -> Result<Maze, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
    generate_with(request, &mut rng)
}

/// Generates a maze using the provided random source.
///
/// The injectable source exists so tests and hosts can supply their own
/// deterministic randomness; [`generate`] routes through it with a
/// seed-derived ChaCha stream.
pub fn generate_with<R: Rng + ?Sized>(
    request: GenerationRequest,
    rng: &mut R,
) -> Result<Maze, GenerationError> {
    if request.columns == 0 || request.rows == 0 {
        return Err(GenerationError::EmptyDimensions {
            columns: request.columns,
            rows: request.rows,
        });
    }

    let mut maze = Maze::solid(request);
    carve(&mut maze, rng);
    maze.injected_loops = inject_loops(&mut maze, request.extra_loops, rng);
    Ok(maze)
}

/// Carves a spanning tree with an iterative randomized depth-first search.
///
/// An explicit stack replaces recursion: the worst-case carve depth equals
/// the cell count (a snake-shaped corridor), which would overflow the call
/// stack on large mazes.
fn carve<R: Rng + ?Sized>(maze: &mut Maze, rng: &mut R) {
    let mut visited = vec![false; maze.cell_count()];
    let mut stack = Vec::with_capacity(maze.cell_count());

    let start = maze.start_cell();
    if let Some(index) = maze.index(start) {
        visited[index] = true;
    }
    stack.push(start);

    while let Some(&current) = stack.last() {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);

        let mut advanced = false;
        for direction in directions {
            let Some(neighbor) = maze.neighbor(current, direction) else {
                continue;
            };
            let Some(neighbor_index) = maze.index(neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }

            maze.remove_wall_pair(current, direction);
            visited[neighbor_index] = true;
            stack.push(neighbor);
            advanced = true;
            break;
        }

        if !advanced {
            let _ = stack.pop();
        }
    }
}

/// Removes up to `requested` extra wall pairs at uniformly random positions.
///
/// Each successful removal creates exactly one cycle. Attempts are bounded
/// so a request that exceeds the number of removable walls degrades to a
/// smaller injected count instead of spinning forever; the achieved count is
/// recorded on the maze for callers to report.
fn inject_loops<R: Rng + ?Sized>(maze: &mut Maze, requested: u32, rng: &mut R) -> u32 {
    if requested == 0 {
        return 0;
    }

    let max_attempts = (maze.cell_count() as u64)
        .saturating_mul(LOOP_ATTEMPTS_PER_CELL)
        .max(MIN_LOOP_ATTEMPTS);
    let mut injected = 0;
    let mut attempts = 0;

    while injected < requested && attempts < max_attempts {
        attempts += 1;

        let cell = CellCoord::new(
            rng.gen_range(0..maze.columns()),
            rng.gen_range(0..maze.rows()),
        );
        let Some(&direction) = Direction::ALL.choose(rng) else {
            continue;
        };
        if maze.neighbor(cell, direction).is_none() {
            continue;
        }
        if !maze.has_wall(cell, direction) {
            continue;
        }

        maze.remove_wall_pair(cell, direction);
        injected += 1;
    }

    injected
}
