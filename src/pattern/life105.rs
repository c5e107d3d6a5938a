//! Loader for the Life 1.05 format.
//!
//! ```text
//! #Life 1.05
//! #D A simple blinker
//! #N
//! #P -1 0
//! ***
//! ```
//!
//! Only the first cell block is painted onto the grid. All parsed blocks
//! remain available through [`Life105Loader::cell_blocks`].

use std::path::Path;
use std::str::FromStr;

use super::{GridLoader, PatternError, read_pattern_file};
use crate::compute::{CellState, GameRule, Grid, GridError};

const FORMAT: &str = "Life 1.05";
const VERSION: &str = "1.05";
const LIFE_LINE_PREFIX: &str = "#Life";

/// A rectangular block of pattern rows placed at an offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellBlock {
    x: i64,
    y: i64,
    rows: Vec<Vec<char>>,
}

impl CellBlock {
    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    /// Pattern rows, each a sequence of `.` (dead) and `*` (alive).
    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Parsed Life 1.05 pattern.
#[derive(Debug, Clone, Default)]
pub struct Life105Loader {
    comments: String,
    rule: Option<GameRule>,
    cell_blocks: Vec<CellBlock>,
}

impl Life105Loader {
    /// Load and parse a Life 1.05 file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        read_pattern_file(path.as_ref())?.parse()
    }

    /// Comment lines (`#D`, `#C`, `#O`), one per line.
    pub fn comment(&self) -> &str {
        self.comments.trim()
    }

    /// All parsed cell blocks, in file order.
    pub fn cell_blocks(&self) -> &[CellBlock] {
        &self.cell_blocks
    }

    fn parse_line(&mut self, line: &str) -> Result<(), PatternError> {
        if line.trim().is_empty() {
            return Ok(());
        }
        if line.starts_with('#') {
            self.parse_hash_line(line)
        } else {
            self.parse_pattern_line(line);
            Ok(())
        }
    }

    fn parse_pattern_line(&mut self, line: &str) {
        // Pattern rows before any #P line form an implicit block at (0, 0)
        if self.cell_blocks.is_empty() {
            self.cell_blocks.push(CellBlock::default());
        }
        if let Some(block) = self.cell_blocks.last_mut() {
            block.rows.push(line.trim().chars().collect());
        }
    }

    fn parse_hash_line(&mut self, line: &str) -> Result<(), PatternError> {
        if line.starts_with(LIFE_LINE_PREFIX) {
            return Ok(());
        }

        let mut chars = line.chars();
        chars.next();
        let Some(tag) = chars.next() else {
            return Err(PatternError::UnknownLineType {
                line: line.to_string(),
            });
        };
        let content = chars.as_str();

        match tag {
            'D' | 'C' | 'O' => {
                if content.is_empty() {
                    self.comments.push('\n');
                }
                self.comments.push_str(content.trim());
                self.comments.push('\n');
            }
            'N' => self.rule = Some(GameRule::conway()),
            'R' => {
                // Empty trailing segments do not count
                let parts: Vec<&str> = content.trim().trim_end_matches('/').split('/').collect();
                let [survive, birth] = &parts[..] else {
                    return Err(PatternError::InvalidRule {
                        line: line.to_string(),
                    });
                };
                self.rule = Some(GameRule::from_digits(survive, birth)?);
            }
            'P' => {
                let invalid = || PatternError::InvalidPlacement {
                    line: line.to_string(),
                };
                let parts: Vec<&str> = content.split_whitespace().collect();
                let [x, y] = &parts[..] else {
                    return Err(invalid());
                };
                let x = x.parse().map_err(|_| invalid())?;
                let y = y.parse().map_err(|_| invalid())?;
                self.cell_blocks.push(CellBlock {
                    x,
                    y,
                    rows: Vec::new(),
                });
            }
            _ => {
                return Err(PatternError::UnknownLineType {
                    line: line.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for Life105Loader {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let header = text.lines().next().unwrap_or("");
        let Some(version) = header.strip_prefix(LIFE_LINE_PREFIX) else {
            return Err(PatternError::MissingHeader { format: FORMAT });
        };
        let version = version.trim();
        if version != VERSION {
            return Err(PatternError::UnsupportedVersion {
                format: FORMAT,
                expected: VERSION,
                found: version.to_string(),
            });
        }

        let mut loader = Self::default();
        for line in text.lines() {
            loader.parse_line(line)?;
        }

        if loader.cell_blocks.is_empty() {
            return Err(PatternError::NoPatterns);
        }
        if loader.cell_blocks.len() > 1 {
            log::warn!(
                "{} cell blocks defined, only the first is used",
                loader.cell_blocks.len()
            );
        }
        log::debug!(
            "Parsed Life 1.05 pattern: {} block(s), {}x{}",
            loader.cell_blocks.len(),
            loader.width(),
            loader.height()
        );
        Ok(loader)
    }
}

impl GridLoader for Life105Loader {
    fn width(&self) -> usize {
        self.cell_blocks.first().map_or(0, CellBlock::width)
    }

    fn height(&self) -> usize {
        self.cell_blocks.first().map_or(0, |block| block.rows.len())
    }

    fn game_rule(&self) -> Option<GameRule> {
        Some(self.rule.clone().unwrap_or_else(GameRule::conway))
    }

    fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError> {
        let block = self.cell_blocks.first().ok_or(PatternError::NoPatterns)?;
        for (y, row) in block.rows.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let state = match c {
                    '.' => CellState::Dead,
                    '*' => CellState::Alive,
                    other => return Err(PatternError::InvalidCharacter(other).into()),
                };
                grid.set(x, y, state)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CONWAY;
    use crate::pattern::fixtures::{BLINKER_105, check_blinker};
    use tempfile::tempdir;

    const BLINKER_MULTI: &str = "#Life 1.05\n#D A simple blinker\n#N\n#P 0 0\n.....\n.....\n.***.\n.....\n.....\n#P 10 10\n***\n";

    #[test]
    fn test_load_life_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blinker.lif");
        std::fs::write(&path, BLINKER_105).unwrap();

        let loader = Life105Loader::from_path(&path).unwrap();
        let mut grid = Grid::from_loader(&loader).unwrap();
        check_blinker(&grid, false);
        assert_eq!(loader.comment(), "A simple blinker");
        assert_eq!(loader.width(), 5);
        assert_eq!(loader.height(), 5);

        grid.advance_generation(&loader.game_rule().unwrap()).unwrap();
        check_blinker(&grid, true);
    }

    #[test]
    fn test_multi_pattern_paints_first_block() {
        let loader: Life105Loader = BLINKER_MULTI.parse().unwrap();
        assert_eq!(loader.cell_blocks().len(), 2);
        assert_eq!(loader.cell_blocks()[1].x(), 10);
        assert_eq!(loader.cell_blocks()[1].y(), 10);
        assert_eq!(loader.width(), 5);
        assert_eq!(loader.height(), 5);

        let mut grid = Grid::from_loader(&loader).unwrap();
        check_blinker(&grid, false);
        grid.advance_generation(&loader.game_rule().unwrap()).unwrap();
        check_blinker(&grid, true);
    }

    #[test]
    fn test_implicit_block() {
        let loader: Life105Loader = "#Life 1.05\n.*\n**\n".parse().unwrap();
        assert_eq!(loader.cell_blocks().len(), 1);
        assert_eq!((loader.cell_blocks()[0].x(), loader.cell_blocks()[0].y()), (0, 0));
        assert_eq!((loader.width(), loader.height()), (2, 2));
    }

    #[test]
    fn test_ragged_rows() {
        let loader: Life105Loader = "#Life 1.05\n*\n.**\n".parse().unwrap();
        assert_eq!((loader.width(), loader.height()), (3, 2));
        let grid = Grid::from_loader(&loader).unwrap();
        assert_eq!(grid.population(), 3);
        assert_eq!(grid.get(1, 0).unwrap(), CellState::Dead);
    }

    #[test]
    fn test_invalid_pattern_character() {
        let loader: Life105Loader = "#Life 1.05\n.*.\n.o.\n".parse().unwrap();
        let err = Grid::from_loader(&loader).unwrap_err();
        assert!(matches!(
            err,
            GridError::Pattern(PatternError::InvalidCharacter('o'))
        ));
    }

    #[test]
    fn test_invalid_version() {
        let err = "#Life 1.06\n1 2\n".parse::<Life105Loader>().unwrap_err();
        assert!(matches!(err, PatternError::UnsupportedVersion { .. }));

        let err = "#Life\n***\n".parse::<Life105Loader>().unwrap_err();
        assert!(matches!(err, PatternError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_missing_header() {
        let err = "x = 3, y = 1\n3o!\n".parse::<Life105Loader>().unwrap_err();
        assert!(matches!(err, PatternError::MissingHeader { .. }));
        let err = "".parse::<Life105Loader>().unwrap_err();
        assert!(matches!(err, PatternError::MissingHeader { .. }));
    }

    #[test]
    fn test_no_patterns() {
        let err = "#Life 1.05\n#D nothing here\n".parse::<Life105Loader>().unwrap_err();
        assert!(matches!(err, PatternError::NoPatterns));
    }

    #[test]
    fn test_parse_comments() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#D a comment").unwrap();
        assert_eq!(loader.comment(), "a comment");
        loader.parse_hash_line("#C  a comment").unwrap();
        assert_eq!(loader.comment(), "a comment\na comment");
        loader.parse_hash_line("#O a comment ").unwrap();
        assert_eq!(loader.comment(), "a comment\na comment\na comment");
    }

    #[test]
    fn test_empty_comment_adds_blank_line() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#D first").unwrap();
        loader.parse_hash_line("#D").unwrap();
        loader.parse_hash_line("#D second").unwrap();
        assert_eq!(loader.comment(), "first\n\n\nsecond");
    }

    #[test]
    fn test_parse_standard_rule() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#N").unwrap();
        assert_eq!(loader.game_rule(), Some(CONWAY.clone()));
    }

    #[test]
    fn test_default_rule_is_conway() {
        let loader = Life105Loader::default();
        assert_eq!(loader.game_rule(), Some(CONWAY.clone()));
    }

    #[test]
    fn test_parse_custom_rule() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#R 23/36").unwrap();
        assert_eq!(loader.game_rule(), Some(GameRule::new([2, 3], [3, 6])));
    }

    #[test]
    fn test_parse_invalid_rules() {
        for line in ["#R", "#R ", "#R 23", "#R 2/3/4", "#R 23/", "#R /", "#R 23//"] {
            let mut loader = Life105Loader::default();
            let err = loader.parse_hash_line(line).unwrap_err();
            assert!(matches!(err, PatternError::InvalidRule { .. }), "{}", line);
        }
        for line in ["#R 3/A", "#R A/4"] {
            let mut loader = Life105Loader::default();
            let err = loader.parse_hash_line(line).unwrap_err();
            assert!(matches!(err, PatternError::Rule(_)), "{}", line);
        }
    }

    #[test]
    fn test_parse_rule_with_empty_survive_set() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#R /3").unwrap();
        assert_eq!(loader.game_rule(), Some(GameRule::from_digits("", "3").unwrap()));
    }

    #[test]
    fn test_parse_invalid_placements() {
        for line in ["#P", "#P 1", "#P 1 a", "#P x 1", "#P 1 2 3"] {
            let mut loader = Life105Loader::default();
            let err = loader.parse_hash_line(line).unwrap_err();
            assert!(
                matches!(err, PatternError::InvalidPlacement { .. }),
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_negative_placement() {
        let mut loader = Life105Loader::default();
        loader.parse_hash_line("#P -3 -1").unwrap();
        assert_eq!(loader.cell_blocks()[0].x(), -3);
        assert_eq!(loader.cell_blocks()[0].y(), -1);
    }

    #[test]
    fn test_unknown_line_type() {
        let mut loader = Life105Loader::default();
        assert!(matches!(
            loader.parse_hash_line("#X whatever"),
            Err(PatternError::UnknownLineType { .. })
        ));
        assert!(matches!(
            loader.parse_hash_line("#"),
            Err(PatternError::UnknownLineType { .. })
        ));
    }
}
