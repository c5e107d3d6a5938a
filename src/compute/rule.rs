//! Life-like transition rules.
//!
//! A rule is a pair of neighbor-count sets: counts that keep an alive cell
//! alive ("survive") and counts that bring a dead cell to life ("birth").

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::CellState;

/// Conway's Game of Life, B3/S23.
pub static CONWAY: LazyLock<GameRule> = LazyLock::new(|| GameRule::new([2, 3], [3]));

/// Rule parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Argument {input} contains non-numeric characters")]
    NonNumeric { input: String },
    #[error("Invalid rule notation {input}, expected B<digits>/S<digits>")]
    InvalidNotation { input: String },
}

/// Immutable Life-like rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameRule {
    survive: BTreeSet<u32>,
    birth: BTreeSet<u32>,
}

impl Default for GameRule {
    fn default() -> Self {
        CONWAY.clone()
    }
}

impl GameRule {
    /// Create a rule from explicit survive and birth counts.
    pub fn new<S, B>(survive: S, birth: B) -> Self
    where
        S: IntoIterator<Item = u32>,
        B: IntoIterator<Item = u32>,
    {
        Self {
            survive: survive.into_iter().collect(),
            birth: birth.into_iter().collect(),
        }
    }

    /// Create a rule from digit strings, e.g. `("23", "3")` for Conway.
    pub fn from_digits(survive: &str, birth: &str) -> Result<Self, RuleError> {
        Ok(Self {
            survive: parse_digits(survive)?,
            birth: parse_digits(birth)?,
        })
    }

    /// Conway's rule.
    pub fn conway() -> Self {
        CONWAY.clone()
    }

    pub fn survive(&self) -> &BTreeSet<u32> {
        &self.survive
    }

    pub fn birth(&self) -> &BTreeSet<u32> {
        &self.birth
    }

    /// Compute the next state of a cell from its state and alive-neighbor count.
    #[inline]
    pub fn next_state(&self, current: CellState, alive_neighbors: u32) -> CellState {
        let counts = match current {
            CellState::Alive => &self.survive,
            CellState::Dead => &self.birth,
        };
        if counts.contains(&alive_neighbors) {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

/// Parse a digit sequence into a set of counts, one digit per count.
///
/// `"23"` yields `{2, 3}`. Surrounding whitespace is ignored and an empty
/// input yields an empty set.
pub fn parse_digits(input: &str) -> Result<BTreeSet<u32>, RuleError> {
    let trimmed = input.trim();
    trimmed
        .chars()
        .map(|c| {
            c.to_digit(10).ok_or_else(|| RuleError::NonNumeric {
                input: trimmed.to_string(),
            })
        })
        .collect()
}

/// Parses `B<digits>/S<digits>` in either segment order, case-insensitively.
impl FromStr for GameRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RuleError::InvalidNotation {
            input: s.to_string(),
        };

        let segments: Vec<&str> = s.split('/').collect();
        if segments.len() != 2 {
            return Err(invalid());
        }

        let mut birth = None;
        let mut survive = None;
        for segment in segments {
            let segment = segment.trim().to_uppercase();
            if let Some(digits) = segment.strip_prefix('B') {
                if birth.replace(parse_digits(digits)?).is_some() {
                    return Err(invalid());
                }
            } else if let Some(digits) = segment.strip_prefix('S') {
                if survive.replace(parse_digits(digits)?).is_some() {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
        }

        match (survive, birth) {
            (Some(survive), Some(birth)) => Ok(Self { survive, birth }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for GameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B")?;
        for n in &self.birth {
            write!(f, "{}", n)?;
        }
        write!(f, "/S")?;
        for n in &self.survive {
            write!(f, "{}", n)?;
        }
        Ok(())
    }
}
