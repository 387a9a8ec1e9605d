#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid navigation and cached A* pathfinding for Maze Pursuit.
//!
//! The engine owns a dense scratch grid of per-cell search nodes rebuilt
//! whenever the maze changes, plus a cache of previously computed cell
//! paths keyed by `(start, goal)`. Walkability between neighboring cells is
//! read from the maze wall set on every expansion; no separate walkability
//! array exists to fall out of sync with the topology.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use maze_pursuit_core::{CellCoord, Direction, WorldPosition, WAYPOINT_LIFT};
use maze_pursuit_generation::Maze;

/// Hard cap on A* node expansions within a single search.
///
/// Bounds the work a pathological query can consume inside one simulation
/// tick; searches that exceed it report an empty path.
pub const SEARCH_NODE_CAP: usize = 1_000;

const UNVISITED_SCORE: u32 = u32::MAX;
const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Per-cell scratch state for a single A* search.
#[derive(Clone, Copy, Debug)]
struct NavigationNode {
    g_score: u32,
    f_score: u32,
    parent: Option<CellCoord>,
}

impl NavigationNode {
    const UNVISITED: NavigationNode = NavigationNode {
        g_score: UNVISITED_SCORE,
        f_score: UNVISITED_SCORE,
        parent: None,
    };
}

/// Dense node arena mirroring the maze dimensions.
#[derive(Clone, Debug, Default)]
struct NavigationGrid {
    columns: u32,
    rows: u32,
    nodes: Vec<NavigationNode>,
}

impl NavigationGrid {
    fn rebuild(&mut self, columns: u32, rows: u32) {
        let cell_count_u64 = u64::from(columns) * u64::from(rows);
        let cell_count = usize::try_from(cell_count_u64).unwrap_or(0);

        self.columns = columns;
        self.rows = rows;

        if cell_count == 0 {
            self.nodes.clear();
            return;
        }

        if self.nodes.len() != cell_count {
            self.nodes = vec![NavigationNode::UNVISITED; cell_count];
        } else {
            self.reset();
        }
    }

    fn reset(&mut self) {
        for node in &mut self.nodes {
            *node = NavigationNode::UNVISITED;
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn cell_count(&self) -> usize {
        self.nodes.len()
    }

    fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    fn node(&self, cell: CellCoord) -> Option<NavigationNode> {
        self.index(cell)
            .and_then(|index| self.nodes.get(index).copied())
    }

    fn record(&mut self, cell: CellCoord, g_score: u32, f_score: u32, parent: Option<CellCoord>) {
        if let Some(index) = self.index(cell) {
            if let Some(node) = self.nodes.get_mut(index) {
                *node = NavigationNode {
                    g_score,
                    f_score,
                    parent,
                };
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

/// Open-set entry ordered by `f` score.
///
/// Ties among equal `f` scores break on cell coordinates purely because the
/// derive needs a total order; which equally-scored node wins is not part of
/// the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f_score: u32,
    cell: CellCoord,
}

/// Cached A* pathfinding over the maze's wall topology.
#[derive(Clone, Debug)]
pub struct PathfindingEngine {
    grid: NavigationGrid,
    cache: HashMap<(CellCoord, CellCoord), Vec<CellCoord>>,
    cell_size: f32,
}

impl PathfindingEngine {
    /// Creates a new engine with the provided world-units-per-cell size.
    ///
    /// Non-positive sizes fall back to one world unit per cell.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            grid: NavigationGrid::default(),
            cache: HashMap::new(),
            cell_size,
        }
    }

    /// World-units-per-cell size used for world/cell conversion.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Rebuilds the navigation grid for the provided maze and clears the
    /// path cache.
    ///
    /// Dimensions are re-derived from the maze itself; cached paths refer to
    /// walls that may no longer exist, so the cache is dropped wholesale.
    pub fn set_maze(&mut self, maze: &Maze) {
        self.grid.rebuild(maze.columns(), maze.rows());
        self.clear_cache();
    }

    /// Empties the path cache unconditionally. Idempotent.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cell paths currently cached.
    #[must_use]
    pub fn cached_path_count(&self) -> usize {
        self.cache.len()
    }

    /// Dimensions of the navigation grid in cells.
    #[must_use]
    pub fn grid_dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    /// One-line summary of engine state for diagnostics. Non-contractual.
    #[must_use]
    pub fn debug_summary(&self) -> String {
        let (columns, rows) = self.grid.dimensions();
        format!(
            "navigation grid {}x{}, {} cached paths",
            columns,
            rows,
            self.cache.len()
        )
    }

    /// Maps a world position to the grid cell containing it.
    ///
    /// Returns `None` for positions outside the grid's world extent; callers
    /// must treat that as an unanswerable query, not clamp it away.
    #[must_use]
    pub fn world_to_cell(&self, position: WorldPosition) -> Option<CellCoord> {
        let (columns, rows) = self.grid.dimensions();
        if columns == 0 || rows == 0 {
            return None;
        }

        let column = (position.x() / self.cell_size).floor();
        let row = (position.z() / self.cell_size).floor();
        if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
            return None;
        }

        let column = column as u32;
        let row = row as u32;
        if column >= columns || row >= rows {
            return None;
        }
        Some(CellCoord::new(column, row))
    }

    /// World position of the cell's center at the shared waypoint height.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPosition {
        WorldPosition::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            WAYPOINT_LIFT,
            (cell.row() as f32 + 0.5) * self.cell_size,
        )
    }

    /// Computes a world-space path between two world positions.
    ///
    /// Returns an empty path when either endpoint maps outside the grid,
    /// when the search exhausts its node budget, or when no route exists.
    /// Successful cell paths are cached by `(start, goal)`; cache hits
    /// redo the world conversion so a changed cell size never serves stale
    /// world coordinates. Failures are never cached.
    pub fn find_path(
        &mut self,
        maze: &Maze,
        from: WorldPosition,
        to: WorldPosition,
    ) -> Vec<WorldPosition> {
        if self.grid.dimensions() != (maze.columns(), maze.rows()) {
            // The world swapped mazes without a set_maze call; rebuild once
            // before answering.
            self.set_maze(maze);
        }
        if self.grid.is_empty() {
            return Vec::new();
        }

        let Some(start) = self.world_to_cell(from) else {
            return Vec::new();
        };
        let Some(goal) = self.world_to_cell(to) else {
            return Vec::new();
        };

        if let Some(cells) = self.cache.get(&(start, goal)) {
            return cells.iter().map(|&cell| self.cell_center(cell)).collect();
        }

        let Some(cells) = self.search(maze, start, goal) else {
            return Vec::new();
        };

        let world_path = cells.iter().map(|&cell| self.cell_center(cell)).collect();
        let _ = self.cache.insert((start, goal), cells);
        world_path
    }

    fn search(&mut self, maze: &Maze, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
        self.grid.reset();
        if !self.grid.contains(start) || !self.grid.contains(goal) {
            return None;
        }

        let start_f = start.manhattan_distance(goal);
        self.grid.record(start, 0, start_f, None);

        let mut open = BinaryHeap::new();
        open.push(Reverse(OpenEntry {
            f_score: start_f,
            cell: start,
        }));

        let mut expansions = 0;
        while let Some(Reverse(entry)) = open.pop() {
            let Some(node) = self.grid.node(entry.cell) else {
                continue;
            };
            if entry.f_score > node.f_score {
                // Superseded heap entry; the cell was reached cheaper since.
                continue;
            }

            if entry.cell == goal {
                return self.reconstruct(start, goal);
            }

            expansions += 1;
            if expansions >= SEARCH_NODE_CAP {
                return None;
            }

            for direction in Direction::ALL {
                if maze.has_wall(entry.cell, direction) {
                    continue;
                }
                let Some(neighbor) = maze.neighbor(entry.cell, direction) else {
                    continue;
                };
                let Some(neighbor_node) = self.grid.node(neighbor) else {
                    continue;
                };

                let tentative = node.g_score.saturating_add(1);
                if tentative >= neighbor_node.g_score {
                    continue;
                }

                let f_score = tentative.saturating_add(neighbor.manhattan_distance(goal));
                self.grid.record(neighbor, tentative, f_score, Some(entry.cell));
                open.push(Reverse(OpenEntry {
                    f_score,
                    cell: neighbor,
                }));
            }
        }

        None
    }

    /// Walks parent pointers from the goal back to the start.
    ///
    /// The hop counter bounds the walk by the cell count so a corrupted
    /// parent chain terminates instead of cycling.
    fn reconstruct(&self, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
        let hop_limit = self.grid.cell_count();
        let mut path = Vec::new();
        let mut current = goal;
        let mut hops = 0;

        loop {
            path.push(current);
            if current == start {
                break;
            }

            hops += 1;
            if hops > hop_limit {
                return None;
            }
            current = self.grid.node(current)?.parent?;
        }

        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{PathfindingEngine, DEFAULT_CELL_SIZE};
    use maze_pursuit_core::{CellCoord, WorldPosition, WAYPOINT_LIFT};
    use maze_pursuit_generation::{generate, GenerationRequest};

    fn engine_for(columns: u32, rows: u32) -> PathfindingEngine {
        let maze = generate(GenerationRequest::new(columns, rows, 0, 5)).expect("generate");
        let mut engine = PathfindingEngine::new(1.0);
        engine.set_maze(&maze);
        engine
    }

    #[test]
    fn non_positive_cell_sizes_fall_back_to_default() {
        assert_eq!(PathfindingEngine::new(-2.0).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(PathfindingEngine::new(0.0).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(PathfindingEngine::new(2.5).cell_size(), 2.5);
    }

    #[test]
    fn world_to_cell_floors_into_the_grid() {
        let engine = engine_for(4, 3);

        assert_eq!(
            engine.world_to_cell(WorldPosition::new(0.2, 0.0, 0.9)),
            Some(CellCoord::new(0, 0))
        );
        assert_eq!(
            engine.world_to_cell(WorldPosition::new(3.999, 0.0, 2.001)),
            Some(CellCoord::new(3, 2))
        );
    }

    #[test]
    fn world_to_cell_rejects_positions_outside_the_extent() {
        let engine = engine_for(4, 3);

        assert!(engine
            .world_to_cell(WorldPosition::new(-0.1, 0.0, 1.0))
            .is_none());
        assert!(engine
            .world_to_cell(WorldPosition::new(1.0, 0.0, 3.0))
            .is_none());
        assert!(engine
            .world_to_cell(WorldPosition::new(4.0, 0.0, 1.0))
            .is_none());
        assert!(engine
            .world_to_cell(WorldPosition::new(f32::NAN, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn cell_center_sits_at_the_waypoint_height() {
        let maze = generate(GenerationRequest::new(4, 3, 0, 5)).expect("generate");
        let mut engine = PathfindingEngine::new(2.0);
        engine.set_maze(&maze);

        let center = engine.cell_center(CellCoord::new(1, 2));
        assert_eq!(center, WorldPosition::new(3.0, WAYPOINT_LIFT, 5.0));
    }

    #[test]
    fn debug_summary_reports_grid_and_cache() {
        let engine = engine_for(4, 3);
        assert_eq!(engine.debug_summary(), "navigation grid 4x3, 0 cached paths");
    }
}
