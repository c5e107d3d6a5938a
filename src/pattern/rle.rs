//! Loader for run-length encoded (RLE) patterns.
//!
//! ```text
//! #N Blinker
//! #C A simple blinker
//! x = 3, y = 1, rule = B3/S23
//! 3o!
//! ```
//!
//! `#` lines carry metadata, the first other line is the header, and the
//! body runs until `!`. Anything after the terminator is kept as comment.

use std::path::Path;
use std::str::FromStr;

use super::{GridLoader, PatternError, read_pattern_file};
use crate::compute::{CellState, GameRule, Grid, GridError};

const FORMAT: &str = "RLE";

/// Parsed RLE pattern.
#[derive(Debug, Clone, Default)]
pub struct RleLoader {
    header_parsed: bool,
    end_of_pattern: bool,
    comments: String,
    /// Raw run-length encoded body, including the terminator.
    pattern: String,
    width: usize,
    height: usize,
    rule: Option<GameRule>,
    pattern_name: Option<String>,
}

impl RleLoader {
    /// Load and parse an RLE file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        read_pattern_file(path.as_ref())?.parse()
    }

    /// Comments, names and trailing text, one per line.
    pub fn comment(&self) -> &str {
        &self.comments
    }

    /// Name given by a `#N` line.
    pub fn pattern_name(&self) -> Option<&str> {
        self.pattern_name.as_deref()
    }

    /// Expand a run-length encoded body into rows separated by `\n`.
    ///
    /// Whitespace is dropped, `<d><c>` repeats `c` `d` times, `$` ends a
    /// row and `!` ends the pattern. Other characters pass through.
    pub fn expand_pattern(pattern: &str) -> Result<String, PatternError> {
        let mut expanded = String::with_capacity(pattern.len());
        let mut chars = pattern.chars().filter(|c| !c.is_whitespace());

        while let Some(c) = chars.next() {
            match c {
                '!' => break,
                '$' => expanded.push('\n'),
                _ => match c.to_digit(10) {
                    Some(count) => {
                        let Some(run) = chars.next() else {
                            return Err(PatternError::TrailingRunCount {
                                pattern: pattern.to_string(),
                            });
                        };
                        let run = match run {
                            '!' => break,
                            '$' => '\n',
                            other => other,
                        };
                        expanded.extend(std::iter::repeat_n(run, count as usize));
                    }
                    None => expanded.push(c),
                },
            }
        }
        Ok(expanded)
    }

    fn parse_line(&mut self, line: &str) -> Result<(), PatternError> {
        if line.starts_with('#') {
            self.parse_hash_line(line)
        } else if !self.header_parsed {
            self.parse_header(line)
        } else if self.end_of_pattern {
            self.append_comment(None, line.trim());
            Ok(())
        } else {
            if let Some(bang) = line.find('!') {
                self.end_of_pattern = true;
                self.append_comment(None, line[bang + 1..].trim());
            }
            self.pattern.push_str(line);
            Ok(())
        }
    }

    fn parse_hash_line(&mut self, line: &str) -> Result<(), PatternError> {
        let mut chars = line.chars();
        chars.next();
        let Some(tag) = chars.next() else {
            return Ok(());
        };
        let content = chars.as_str().trim();

        match tag {
            'C' | 'c' => self.append_comment(None, content),
            'N' => {
                self.append_comment(Some("Pattern Name"), content);
                self.pattern_name = Some(content.to_string());
            }
            'O' => self.append_comment(Some("Created"), content),
            // Placement coordinates are not supported
            'P' | 'R' => {}
            'r' => {
                let (survive, birth) = match content.split_once('/') {
                    Some((survive, birth)) if !survive.is_empty() && !birth.is_empty() => {
                        (survive, birth)
                    }
                    _ => {
                        return Err(PatternError::InvalidRule {
                            line: line.to_string(),
                        });
                    }
                };
                self.rule = Some(GameRule::from_digits(survive, birth)?);
            }
            other => log::debug!("Ignoring RLE line type #{}", other),
        }
        Ok(())
    }

    fn parse_header(&mut self, line: &str) -> Result<(), PatternError> {
        let invalid = |reason: &str| PatternError::InvalidHeader {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = line.trim().split(',').collect();
        if !(2..=3).contains(&segments.len()) {
            return Err(invalid("segments"));
        }

        let mut width = None;
        let mut height = None;
        for segment in &segments[..2] {
            let parts: Vec<&str> = segment.split('=').collect();
            let [dimension, value] = &parts[..] else {
                return Err(invalid("dimensions"));
            };
            let value: usize = value.trim().parse().map_err(|_| invalid("dimensions"))?;
            match dimension.trim().to_lowercase().as_str() {
                "x" => width = Some(value),
                "y" => height = Some(value),
                _ => return Err(invalid("dimensions")),
            }
        }
        let (Some(width), Some(height)) = (width, height) else {
            return Err(invalid("dimensions"));
        };

        if let Some(segment) = segments.get(2) {
            let Some((key, definition)) = segment.split_once('=') else {
                return Err(invalid("rule"));
            };
            if !key.trim().eq_ignore_ascii_case("rule") {
                return Err(invalid("rule"));
            }
            let rule: GameRule = definition.parse().map_err(|_| invalid("rule"))?;
            self.rule = Some(rule);
        }

        self.width = width;
        self.height = height;
        self.header_parsed = true;
        Ok(())
    }

    fn append_comment(&mut self, label: Option<&str>, comment: &str) {
        if label.is_none() && comment.is_empty() {
            return;
        }
        if !self.comments.is_empty() {
            self.comments.push('\n');
        }
        if let Some(label) = label {
            self.comments.push_str(label);
            self.comments.push_str(": ");
        }
        self.comments.push_str(comment);
    }
}

impl FromStr for RleLoader {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut loader = Self::default();
        for line in text.lines() {
            loader.parse_line(line)?;
        }
        if !loader.header_parsed {
            return Err(PatternError::MissingHeader { format: FORMAT });
        }

        log::debug!(
            "Parsed RLE pattern {:?}: {}x{}",
            loader.pattern_name,
            loader.width,
            loader.height
        );
        Ok(loader)
    }
}

impl GridLoader for RleLoader {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn game_rule(&self) -> Option<GameRule> {
        Some(self.rule.clone().unwrap_or_else(GameRule::conway))
    }

    fn set_initial_state(&self, grid: &mut Grid) -> Result<(), GridError> {
        let expanded = Self::expand_pattern(&self.pattern)?;

        // Rows and cells beyond the encoded extent stay dead
        for (y, row) in expanded.split('\n').take(self.height).enumerate() {
            for (x, c) in row.trim().chars().take(self.width).enumerate() {
                let state = match c {
                    'b' => CellState::Dead,
                    'o' => CellState::Alive,
                    other => return Err(PatternError::InvalidCharacter(other).into()),
                };
                grid.set(x, y, state)?;
            }
        }
        Ok(())
    }
}
