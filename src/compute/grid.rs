//! Grid - Cell storage and the generation-advance driver.
//!
//! Cells are stored in a flat array indexed column-major,
//! `[x * height + y]`, so iteration visits each column top to bottom before
//! moving right. Neighborhoods are derived from coordinates on demand and
//! clipped to the grid bounds (no wraparound).

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::{Cell, CellState, GameRule};
use crate::pattern::{GridLoader, PatternError};

/// All 8 offsets: W, E, N, S, NW, SW, NE, SE.
const OFFSETS_8: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Grid construction and access errors.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Height and width must be greater than 0 (width: {width}, height: {height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Grid is already initialized")]
    AlreadyInitialized,
    #[error("Grid is not initialized")]
    NotInitialized,
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    #[error("Coordinate ({x}, {y}) cannot address a grid cell")]
    CoordinateOutOfRange { x: i64, y: i64 },
    #[error(
        "Pattern of size {pattern_width}x{pattern_height} does not fit into a {width}x{height} grid"
    )]
    PatternTooLarge {
        pattern_width: usize,
        pattern_height: usize,
        width: usize,
        height: usize,
    },
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Rectangular grid of two-state cells.
///
/// A grid starts out uninitialized and is sized exactly once, either
/// directly or from a [`GridLoader`]. It is never resized afterwards.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Cells, indexed `[x * height + y]`.
    cells: Vec<Cell>,
    /// Pre-allocated buffer for next states (reused each generation).
    next_states: Vec<CellState>,
    /// Number of generations advanced since initialization.
    generation: u64,
}

impl Grid {
    /// Create an empty, uninitialized grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid of dead cells with the given dimensions.
    pub fn with_size(width: usize, height: usize) -> Result<Self, GridError> {
        let mut grid = Self::new();
        grid.initialize(width, height)?;
        Ok(grid)
    }

    /// Create a grid sized and painted by a loader.
    pub fn from_loader<L: GridLoader + ?Sized>(loader: &L) -> Result<Self, GridError> {
        let mut grid = Self::new();
        grid.initialize_from(loader)?;
        Ok(grid)
    }

    /// Create a fixed-size grid and paint a loader's pattern into it.
    pub fn with_size_and_loader<L: GridLoader + ?Sized>(
        width: usize,
        height: usize,
        loader: &L,
    ) -> Result<Self, GridError> {
        let mut grid = Self::new();
        grid.initialize_fixed(width, height, loader)?;
        Ok(grid)
    }

    /// Allocate `width * height` dead cells.
    pub fn initialize(&mut self, width: usize, height: usize) -> Result<(), GridError> {
        if self.is_initialized() {
            return Err(GridError::AlreadyInitialized);
        }
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }

        let size = width
            .checked_mul(height)
            .ok_or(GridError::InvalidDimensions { width, height })?;

        self.width = width;
        self.height = height;
        self.cells = vec![Cell::new(); size];
        self.next_states = vec![CellState::Dead; size];
        self.generation = 0;

        log::debug!("Initialized {}x{} grid", width, height);
        Ok(())
    }

    /// Size the grid to the loader's declared extent, then let it paint.
    ///
    /// The grid is left uninitialized if painting fails.
    pub fn initialize_from<L: GridLoader + ?Sized>(&mut self, loader: &L) -> Result<(), GridError> {
        self.paint(loader.width(), loader.height(), loader)
    }

    /// Size the grid explicitly, then let the loader paint.
    ///
    /// The loader's declared extent must fit into `width x height`. The grid
    /// is left uninitialized if painting fails.
    pub fn initialize_fixed<L: GridLoader + ?Sized>(
        &mut self,
        width: usize,
        height: usize,
        loader: &L,
    ) -> Result<(), GridError> {
        if self.is_initialized() {
            return Err(GridError::AlreadyInitialized);
        }
        let (pattern_width, pattern_height) = (loader.width(), loader.height());
        if pattern_width > width || pattern_height > height {
            return Err(GridError::PatternTooLarge {
                pattern_width,
                pattern_height,
                width,
                height,
            });
        }
        self.paint(width, height, loader)
    }

    /// Size and paint a scratch grid, adopting it only once the loader succeeds.
    fn paint<L: GridLoader + ?Sized>(
        &mut self,
        width: usize,
        height: usize,
        loader: &L,
    ) -> Result<(), GridError> {
        if self.is_initialized() {
            return Err(GridError::AlreadyInitialized);
        }
        let mut grid = Self::new();
        grid.initialize(width, height)?;
        loader.set_initial_state(&mut grid)?;
        *self = grid;
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Grid width (column count). Zero while uninitialized.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height (row count). Zero while uninitialized.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of generations advanced since initialization.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of alive cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Get the state of the cell at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Result<CellState, GridError> {
        Ok(self.cell(x, y)?.current_state())
    }

    /// Set the current state of the cell at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> Result<(), GridError> {
        let idx = self.index(x, y)?;
        self.cells[idx].set_current_state(state);
        Ok(())
    }

    /// Get the cell at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Result<&Cell, GridError> {
        let idx = self.index(x, y)?;
        Ok(&self.cells[idx])
    }

    /// Iterate over all cells, by column, then by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Snapshot of the current states as rows, top to bottom.
    pub fn rows(&self) -> Vec<Vec<CellState>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[x * self.height + y].current_state())
                    .collect()
            })
            .collect()
    }

    /// Coordinates of the up to 8 cells adjacent to `(x, y)`, clipped to the grid.
    pub fn neighbors(
        &self,
        x: usize,
        y: usize,
    ) -> Result<impl Iterator<Item = (usize, usize)>, GridError> {
        self.index(x, y)?;
        Ok(neighbor_coords(x, y, self.width, self.height))
    }

    /// Number of alive cells adjacent to `(x, y)`.
    pub fn count_alive_neighbors(&self, x: usize, y: usize) -> Result<u32, GridError> {
        self.index(x, y)?;
        Ok(count_alive_around(&self.cells, self.width, self.height, x, y))
    }

    /// Advance one generation under `rule`.
    ///
    /// Every next state is computed from the current snapshot before any
    /// cell is updated.
    pub fn advance_generation(&mut self, rule: &GameRule) -> Result<(), GridError> {
        if !self.is_initialized() {
            return Err(GridError::NotInitialized);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let (width, height) = (self.width, self.height);
            let cells = &self.cells;

            // 1. Evaluate the rule against the current snapshot (read-only).
            self.next_states
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, next)| {
                    *next = evaluate(cells, width, height, rule, idx);
                });

            // 2. Apply. Each write touches only its own cell.
            self.cells
                .par_iter_mut()
                .zip(self.next_states.par_iter())
                .for_each(|(cell, &next)| {
                    cell.set_next_state(next);
                    cell.update();
                });
        }

        #[cfg(target_arch = "wasm32")]
        self.step_sequential(rule);

        self.finish_generation();
        Ok(())
    }

    /// Advance one generation on the calling thread only.
    pub fn advance_generation_sequential(&mut self, rule: &GameRule) -> Result<(), GridError> {
        if !self.is_initialized() {
            return Err(GridError::NotInitialized);
        }
        self.step_sequential(rule);
        self.finish_generation();
        Ok(())
    }

    /// Advance `generations` generations.
    pub fn run(&mut self, rule: &GameRule, generations: u64) -> Result<(), GridError> {
        for _ in 0..generations {
            self.advance_generation(rule)?;
        }
        Ok(())
    }

    fn step_sequential(&mut self, rule: &GameRule) {
        let (width, height) = (self.width, self.height);
        for (idx, next) in self.next_states.iter_mut().enumerate() {
            *next = evaluate(&self.cells, width, height, rule, idx);
        }
        for (cell, &next) in self.cells.iter_mut().zip(self.next_states.iter()) {
            cell.set_next_state(next);
            cell.update();
        }
    }

    fn finish_generation(&mut self) {
        self.generation += 1;
        log::trace!(
            "Generation {}: population {}",
            self.generation,
            self.population()
        );
    }

    /// Flat index of `(x, y)`, validating initialization and bounds.
    fn index(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if !self.is_initialized() {
            return Err(GridError::NotInitialized);
        }
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(x * self.height + y)
    }
}

fn neighbor_coords(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    OFFSETS_8.iter().filter_map(move |&(dx, dy)| {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < width && ny < height).then_some((nx, ny))
    })
}

fn count_alive_around(cells: &[Cell], width: usize, height: usize, x: usize, y: usize) -> u32 {
    Cell::count_alive(neighbor_coords(x, y, width, height).map(|(nx, ny)| &cells[nx * height + ny]))
}

#[inline]
fn evaluate(cells: &[Cell], width: usize, height: usize, rule: &GameRule, idx: usize) -> CellState {
    let (x, y) = (idx / height, idx % height);
    let alive = count_alive_around(cells, width, height, x, y);
    rule.next_state(cells[idx].current_state(), alive)
}

/// Grid statistics for monitoring.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridStats {
    pub generation: u64,
    pub width: usize,
    pub height: usize,
    pub population: usize,
    /// Fraction of alive cells (0.0-1.0).
    pub density: f32,
}

impl GridStats {
    /// Compute statistics from a grid.
    pub fn from_grid(grid: &Grid) -> Self {
        let population = grid.population();
        let density = if grid.cell_count() == 0 {
            0.0
        } else {
            population as f32 / grid.cell_count() as f32
        };
        Self {
            generation: grid.generation(),
            width: grid.width(),
            height: grid.height(),
            population,
            density,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::fixtures::check_blinker;
    use proptest::prelude::*;

    /// Loader that paints the origin, or fails after painting it.
    struct Painted {
        size: (usize, usize),
        fail: bool,
    }

    impl GridLoader for Painted {
        fn width(&self) -> usize {
            self.size.0
        }

        fn height(&self) -> usize {
            self.size.1
        }

        fn game_rule(&self) -> Option<GameRule> {
            None
        }

        fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError> {
            grid.set(0, 0, CellState::Alive)?;
            if self.fail {
                return Err(PatternError::InvalidCharacter('x').into());
            }
            Ok(())
        }
    }

    /// 5x5 grid with a horizontal blinker on row 2.
    fn blinker() -> Grid {
        let mut grid = Grid::with_size(5, 5).unwrap();
        grid.set(1, 2, CellState::Alive).unwrap();
        grid.set(2, 2, CellState::Alive).unwrap();
        grid.set(3, 2, CellState::Alive).unwrap();
        grid
    }

    #[test]
    fn test_initial_state() {
        check_blinker(&blinker(), false);
    }

    #[test]
    fn test_one_generation() {
        let mut grid = blinker();
        grid.advance_generation(&GameRule::conway()).unwrap();
        check_blinker(&grid, true);
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn test_two_generations() {
        let mut grid = blinker();
        grid.run(&GameRule::conway(), 2).unwrap();
        check_blinker(&grid, false);
        assert_eq!(grid.generation(), 2);
    }

    #[test]
    fn test_sequential_generation() {
        let mut grid = blinker();
        grid.advance_generation_sequential(&GameRule::conway()).unwrap();
        check_blinker(&grid, true);
    }

    #[test]
    fn test_invalid_dimensions() {
        for (w, h) in [(0, 5), (5, 0), (0, 0)] {
            let err = Grid::with_size(w, h).unwrap_err();
            assert!(matches!(err, GridError::InvalidDimensions { .. }));
        }
    }

    #[test]
    fn test_initialize_only_once() {
        let mut grid = blinker();
        assert!(matches!(
            grid.initialize(10, 10),
            Err(GridError::AlreadyInitialized)
        ));
        assert!(matches!(
            grid.initialize(5, 5),
            Err(GridError::AlreadyInitialized)
        ));
        // Dimensions unchanged
        assert_eq!((grid.width(), grid.height()), (5, 5));
    }

    #[test]
    fn test_reinitialize_reports_state_before_arguments() {
        let mut grid = Grid::with_size(3, 3).unwrap();
        assert!(matches!(
            grid.initialize(0, 0),
            Err(GridError::AlreadyInitialized)
        ));

        let loader = Painted {
            size: (9, 9),
            fail: false,
        };
        assert!(matches!(
            grid.initialize_fixed(3, 3, &loader),
            Err(GridError::AlreadyInitialized)
        ));
        assert!(matches!(
            grid.initialize_from(&loader),
            Err(GridError::AlreadyInitialized)
        ));
        assert_eq!((grid.width(), grid.height()), (3, 3));
    }

    #[test]
    fn test_failed_paint_leaves_grid_uninitialized() {
        let failing = Painted {
            size: (3, 3),
            fail: true,
        };
        let mut grid = Grid::new();
        assert!(grid.initialize_from(&failing).is_err());
        assert!(!grid.is_initialized());
        assert!(grid.initialize_fixed(5, 5, &failing).is_err());
        assert!(!grid.is_initialized());

        // Still usable afterwards
        let loader = Painted {
            size: (3, 3),
            fail: false,
        };
        grid.initialize_from(&loader).unwrap();
        assert_eq!(grid.population(), 1);
    }

    #[test]
    fn test_uninitialized_grid() {
        let mut grid = Grid::new();
        assert!(!grid.is_initialized());
        assert!(matches!(grid.get(0, 0), Err(GridError::NotInitialized)));
        assert!(matches!(
            grid.count_alive_neighbors(0, 0),
            Err(GridError::NotInitialized)
        ));
        assert!(matches!(
            grid.advance_generation(&GameRule::conway()),
            Err(GridError::NotInitialized)
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = blinker();
        assert!(matches!(grid.get(5, 0), Err(GridError::OutOfBounds { .. })));
        assert!(matches!(
            grid.set(0, 5, CellState::Alive),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_cell_list() {
        let grid = blinker();
        assert_eq!(grid.cells().count(), 25);
        assert_eq!(grid.cell_count(), 25);
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn test_cells_are_column_major() {
        let mut grid = Grid::with_size(2, 3).unwrap();
        // (1, 0) is the first cell of the second column
        grid.set(1, 0, CellState::Alive).unwrap();
        let states: Vec<bool> = grid.cells().map(|c| c.is_alive()).collect();
        assert_eq!(states, vec![false, false, false, true, false, false]);
    }

    #[test]
    fn test_rows() {
        let grid = blinker();
        let rows = grid.rows();
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(row.len(), 5);
        }
        assert_eq!(
            rows[2],
            vec![
                CellState::Dead,
                CellState::Alive,
                CellState::Alive,
                CellState::Alive,
                CellState::Dead
            ]
        );
    }

    #[test]
    fn test_count_alive_neighbors() {
        let grid = blinker();
        assert_eq!(grid.count_alive_neighbors(2, 2).unwrap(), 2);
        assert_eq!(grid.count_alive_neighbors(2, 1).unwrap(), 3);
        assert_eq!(grid.count_alive_neighbors(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_neighbors_exclude_self() {
        let grid = Grid::with_size(3, 3).unwrap();
        let neighbors: Vec<_> = grid.neighbors(1, 1).unwrap().collect();
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&(1, 1)));
    }

    #[test]
    fn test_single_cell_grid() {
        let mut grid = Grid::with_size(1, 1).unwrap();
        assert_eq!(grid.neighbors(0, 0).unwrap().count(), 0);
        grid.set(0, 0, CellState::Alive).unwrap();
        grid.advance_generation(&GameRule::conway()).unwrap();
        assert_eq!(grid.get(0, 0).unwrap(), CellState::Dead);
    }

    #[test]
    fn test_stats() {
        let grid = blinker();
        let stats = GridStats::from_grid(&grid);
        assert_eq!(stats.population, 3);
        assert_eq!(stats.generation, 0);
        assert!((stats.density - 3.0 / 25.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn fresh_grid_is_dead(width in 1usize..40, height in 1usize..40) {
            let grid = Grid::with_size(width, height).unwrap();
            prop_assert_eq!(grid.cell_count(), width * height);
            prop_assert!(grid.cells().all(|c| c.current_state() == CellState::Dead));
        }

        #[test]
        fn neighbor_counts_follow_position(width in 2usize..20, height in 2usize..20) {
            let grid = Grid::with_size(width, height).unwrap();
            for x in 0..width {
                for y in 0..height {
                    let on_x_edge = x == 0 || x == width - 1;
                    let on_y_edge = y == 0 || y == height - 1;
                    let expected = match (on_x_edge, on_y_edge) {
                        (true, true) => 3,
                        (true, false) | (false, true) => 5,
                        (false, false) => 8,
                    };
                    prop_assert_eq!(grid.neighbors(x, y).unwrap().count(), expected);
                }
            }
        }

        #[test]
        fn parallel_matches_sequential(
            width in 1usize..16,
            height in 1usize..16,
            alive in proptest::collection::vec((0usize..16, 0usize..16), 0..64),
            steps in 1u64..6,
        ) {
            let mut parallel = Grid::with_size(width, height).unwrap();
            for (x, y) in alive {
                if x < width && y < height {
                    parallel.set(x, y, CellState::Alive).unwrap();
                }
            }
            let mut sequential = parallel.clone();
            let rule = GameRule::conway();
            for _ in 0..steps {
                parallel.advance_generation(&rule).unwrap();
                sequential.advance_generation_sequential(&rule).unwrap();
            }
            prop_assert_eq!(parallel.rows(), sequential.rows());
        }
    }
}
