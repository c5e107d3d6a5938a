//! Configuration types for simulation runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compute::{GameRule, RuleError};

fn default_generations() -> u64 {
    100
}

fn default_parallel() -> bool {
    true
}

/// Supported pattern file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternFormat {
    /// `#Life 1.05` tagged-line format.
    Life105,
    /// `#Life 1.06` coordinate list.
    Life106,
    /// Run-length encoded.
    Rle,
}

impl PatternFormat {
    /// Guess the format from the first line of a pattern file.
    pub fn detect(text: &str) -> Self {
        let header = text.lines().next().unwrap_or("");
        match header.strip_prefix("#Life") {
            Some(version) if version.trim() == "1.05" => PatternFormat::Life105,
            Some(_) => PatternFormat::Life106,
            None => PatternFormat::Rle,
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Pattern file to load.
    pub pattern: PathBuf,
    /// Pattern format. Detected from the file content when absent.
    #[serde(default)]
    pub format: Option<PatternFormat>,
    /// Fixed grid width. Must be given together with `height`.
    #[serde(default)]
    pub width: Option<usize>,
    /// Fixed grid height. Must be given together with `width`.
    #[serde(default)]
    pub height: Option<usize>,
    /// Rule override in B/S notation, e.g. "B36/S23".
    #[serde(default)]
    pub rule: Option<String>,
    /// Number of generations to run.
    #[serde(default = "default_generations")]
    pub generations: u64,
    /// Evaluate generations on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pattern: PathBuf::from("glider.rle"),
            format: None,
            width: Some(64),
            height: Some(64),
            rule: Some(GameRule::conway().to_string()),
            generations: default_generations(),
            parallel: default_parallel(),
        }
    }
}

impl SimulationConfig {
    /// Fixed grid size, if configured.
    pub fn fixed_size(&self) -> Option<(usize, usize)> {
        self.width.zip(self.height)
    }

    /// Parsed rule override, if configured.
    pub fn rule_override(&self) -> Result<Option<GameRule>, ConfigError> {
        Ok(self.rule.as_deref().map(str::parse::<GameRule>).transpose()?)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.width, self.height) {
            (Some(0), _) | (_, Some(0)) => return Err(ConfigError::InvalidDimensions),
            (Some(_), None) | (None, Some(_)) => return Err(ConfigError::PartialDimensions),
            _ => {}
        }
        self.rule_override()?;
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Grid width and height must be given together")]
    PartialDimensions,
    #[error("Invalid rule override: {0}")]
    InvalidRule(#[from] RuleError),
}
