//! Pattern module - Loaders that size and paint a grid from pattern files.
//!
//! Three text formats are supported:
//!
//! - Life 1.05: `#Life 1.05` header, tagged `#` lines, `.`/`*` cell blocks
//! - Life 1.06: `#Life 1.06` header, one `x y` coordinate pair per line
//! - RLE: `x = W, y = H[, rule = B../S..]` header, run-length encoded body
//!
//! Every loader implements [`GridLoader`], which [`Grid`] uses during
//! initialization. Parsing is fail-fast: the first malformed line aborts
//! the load.

mod life105;
mod life106;
mod rle;

pub use life105::*;
pub use life106::*;
pub use rle::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compute::{GameRule, Grid, GridError, RuleError};
use crate::schema::PatternFormat;

/// A source of initial grid content.
pub trait GridLoader {
    /// Desired grid width.
    fn width(&self) -> usize;

    /// Desired grid height.
    fn height(&self) -> usize;

    /// Rule declared by the pattern, if the format can express one.
    fn game_rule(&self) -> Option<GameRule>;

    /// Paint the initial cell states onto an already-sized grid.
    fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError>;
}

/// Pattern parsing and loading errors.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Data file {path} does not exist or is not readable")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Not a valid {format} file, header missing")]
    MissingHeader { format: &'static str },
    #[error("Not a valid {format} file, unsupported version {found} (expected {expected})")]
    UnsupportedVersion {
        format: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("File does not define any patterns")]
    NoPatterns,
    #[error("Invalid line type: {line}")]
    UnknownLineType { line: String },
    #[error("Invalid rule definition: {line}")]
    InvalidRule { line: String },
    #[error("Invalid definition of pattern position: {line}")]
    InvalidPlacement { line: String },
    #[error("Input {line} is not a pair of numbers separated by whitespace")]
    InvalidCoordinates { line: String },
    #[error("Illegal header line format ({reason}): {line}")]
    InvalidHeader { line: String, reason: String },
    #[error("Pattern contains invalid character: {0:?}")]
    InvalidCharacter(char),
    #[error("Invalid pattern, run count without cell: {pattern}")]
    TrailingRunCount { pattern: String },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Read a pattern file into memory.
pub(crate) fn read_pattern_file(path: &Path) -> Result<String, PatternError> {
    fs::read_to_string(path).map_err(|source| PatternError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A loaded pattern in any of the supported formats.
#[derive(Debug, Clone)]
pub enum PatternFile {
    Life105(Life105Loader),
    Life106(Life106Loader),
    Rle(RleLoader),
}

impl PatternFile {
    /// Load a pattern file. The format is detected from the content when
    /// not given.
    pub fn load<P: AsRef<Path>>(
        path: P,
        format: Option<PatternFormat>,
    ) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let text = read_pattern_file(path)?;
        let pattern = Self::parse(&text, format)?;
        log::debug!("Loaded {:?} pattern from {}", pattern.format(), path.display());
        Ok(pattern)
    }

    /// Parse pattern text. The format is detected from the content when
    /// not given.
    pub fn parse(text: &str, format: Option<PatternFormat>) -> Result<Self, PatternError> {
        let format = format.unwrap_or_else(|| PatternFormat::detect(text));
        Ok(match format {
            PatternFormat::Life105 => PatternFile::Life105(text.parse()?),
            PatternFormat::Life106 => PatternFile::Life106(text.parse()?),
            PatternFormat::Rle => PatternFile::Rle(text.parse()?),
        })
    }

    pub fn format(&self) -> PatternFormat {
        match self {
            PatternFile::Life105(_) => PatternFormat::Life105,
            PatternFile::Life106(_) => PatternFormat::Life106,
            PatternFile::Rle(_) => PatternFormat::Rle,
        }
    }

    fn loader(&self) -> &dyn GridLoader {
        match self {
            PatternFile::Life105(loader) => loader,
            PatternFile::Life106(loader) => loader,
            PatternFile::Rle(loader) => loader,
        }
    }
}

impl GridLoader for PatternFile {
    fn width(&self) -> usize {
        self.loader().width()
    }

    fn height(&self) -> usize {
        self.loader().height()
    }

    fn game_rule(&self) -> Option<GameRule> {
        self.loader().game_rule()
    }

    fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError> {
        self.loader().set_initial_state(grid)
    }
}
