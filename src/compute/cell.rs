//! Cell state and the per-cell two-phase transition.

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }
}

/// One grid position.
///
/// A cell holds its current state and the state it will take on the next
/// call to [`Cell::update`]. Neighborhoods are not stored on the cell; the
/// owning [`Grid`](super::Grid) derives them from coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    current: CellState,
    next: CellState,
}

impl Cell {
    /// Create a new, dead cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell with the given current state and no pending transition.
    pub fn with_state(state: CellState) -> Self {
        Self {
            current: state,
            next: state,
        }
    }

    #[inline]
    pub fn current_state(&self) -> CellState {
        self.current
    }

    #[inline]
    pub fn next_state(&self) -> CellState {
        self.next
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current.is_alive()
    }

    /// Overwrite the current state. The pending state is left untouched.
    #[inline]
    pub fn set_current_state(&mut self, state: CellState) {
        self.current = state;
    }

    /// Set the state applied by the next [`Cell::update`].
    #[inline]
    pub fn set_next_state(&mut self, state: CellState) {
        self.next = state;
    }

    /// Apply the pending state. Idempotent until the next `set_next_state`.
    #[inline]
    pub fn update(&mut self) {
        self.current = self.next;
    }

    /// Cancel the pending transition.
    #[inline]
    pub fn reset(&mut self) {
        self.next = self.current;
    }

    /// Count the alive cells in a neighborhood.
    ///
    /// The count is accumulated directly in `u32`, so no conversion can fail.
    pub fn count_alive<'a, I>(neighbors: I) -> u32
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        neighbors
            .into_iter()
            .filter(|cell| cell.is_alive())
            .fold(0u32, |count, _| count.saturating_add(1))
    }
}
