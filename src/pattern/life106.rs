//! Loader for the Life 1.06 format: a `#Life 1.06` header followed by one
//! `x y` pair per alive cell. The format cannot express a rule.

use std::path::Path;
use std::str::FromStr;

use super::{GridLoader, PatternError, read_pattern_file};
use crate::compute::{CellState, GameRule, Grid, GridError};

const FORMAT: &str = "Life 1.06";
const VERSION: &str = "1.06";
const LIFE_LINE_PREFIX: &str = "#Life";

/// Coordinates of one alive cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoordinates {
    x: i64,
    y: i64,
}

impl CellCoordinates {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }
}

/// Parses `"<x> <y>"`.
impl FromStr for CellCoordinates {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PatternError::InvalidCoordinates {
            line: s.to_string(),
        };
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [x, y] = &parts[..] else {
            return Err(invalid());
        };
        Ok(Self {
            x: x.parse().map_err(|_| invalid())?,
            y: y.parse().map_err(|_| invalid())?,
        })
    }
}

/// Parsed Life 1.06 pattern.
#[derive(Debug, Clone, Default)]
pub struct Life106Loader {
    alive_cells: Vec<CellCoordinates>,
}

impl Life106Loader {
    /// Load and parse a Life 1.06 file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        read_pattern_file(path.as_ref())?.parse()
    }

    pub fn alive_cells(&self) -> &[CellCoordinates] {
        &self.alive_cells
    }

    fn parse_line(&mut self, line: &str) -> Result<(), PatternError> {
        if line.starts_with('#') {
            return Ok(());
        }
        self.alive_cells.push(line.parse()?);
        Ok(())
    }
}

/// Extent covering coordinates `0..=max`, or 0 when nothing is non-negative.
fn extent(max: Option<i64>) -> usize {
    max.and_then(|m| usize::try_from(m.saturating_add(1)).ok())
        .unwrap_or(0)
}

impl FromStr for Life106Loader {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let header = text.lines().next().unwrap_or("");
        let Some(version) = header.strip_prefix(LIFE_LINE_PREFIX) else {
            return Err(PatternError::MissingHeader { format: FORMAT });
        };
        // The version suffix is optional
        if !version.is_empty() && version.trim() != VERSION {
            return Err(PatternError::UnsupportedVersion {
                format: FORMAT,
                expected: VERSION,
                found: version.trim().to_string(),
            });
        }

        let mut loader = Self::default();
        for line in text.lines() {
            loader.parse_line(line)?;
        }

        log::debug!(
            "Parsed Life 1.06 pattern: {} cell(s), {}x{}",
            loader.alive_cells.len(),
            loader.width(),
            loader.height()
        );
        Ok(loader)
    }
}

impl GridLoader for Life106Loader {
    fn width(&self) -> usize {
        extent(self.alive_cells.iter().map(CellCoordinates::x).max())
    }

    fn height(&self) -> usize {
        extent(self.alive_cells.iter().map(CellCoordinates::y).max())
    }

    fn game_rule(&self) -> Option<GameRule> {
        None
    }

    fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError> {
        for cell in &self.alive_cells {
            let out_of_range = || GridError::CoordinateOutOfRange {
                x: cell.x,
                y: cell.y,
            };
            let x = usize::try_from(cell.x).map_err(|_| out_of_range())?;
            let y = usize::try_from(cell.y).map_err(|_| out_of_range())?;
            grid.set(x, y, CellState::Alive)?;
        }
        Ok(())
    }
}
