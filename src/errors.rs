//! Error types for loading a fill problem and for running the search.
//!
//! Configuration problems (`ConfigError`) are detected before any search happens and are fatal.
//! Search outcomes that aren't a fill (`FillFailure`) live in `solver` and are returned as the
//! `Err` side of the solver's result, never raised as panics.

use crate::solver::FillFailure;

/// A malformed template or word list. Each variant has a stable code for lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Template has no cells")]
    EmptyTemplate,

    #[error("Template row {row} has {found} cells, expected {expected}")]
    RaggedTemplate {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid template character {ch:?} at ({x}, {y})")]
    InvalidTemplateChar { ch: char, x: usize, y: usize },

    #[error("Word list has no words of length {length}")]
    NoWordsOfLength { length: usize },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::EmptyTemplate => "C001",
            ConfigError::RaggedTemplate { .. } => "C002",
            ConfigError::InvalidTemplateChar { .. } => "C003",
            ConfigError::NoWordsOfLength { .. } => "C004",
        }
    }

    /// A short hint for fixing the input, if we have one.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ConfigError::EmptyTemplate => Some("Templates need at least one row of '.' and '#' cells"),
            ConfigError::RaggedTemplate { .. } => Some("Every template row must have the same width"),
            ConfigError::InvalidTemplateChar { .. } => {
                Some("Use '.' for open cells, '#' for blocks and letters for pre-filled cells")
            }
            ConfigError::NoWordsOfLength { .. } => None,
        }
    }

    /// Format the error with its code and help text.
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{} ({})\nHelp: {}", self, self.code(), help),
            None => format!("{} ({})", self, self.code()),
        }
    }
}

/// Everything that can stop `find_fill` short of a filled grid.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Failed(#[from] FillFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ConfigError::EmptyTemplate,
            ConfigError::RaggedTemplate { row: 1, expected: 3, found: 2 },
            ConfigError::InvalidTemplateChar { ch: '?', x: 0, y: 0 },
            ConfigError::NoWordsOfLength { length: 4 },
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_detailed_includes_help() {
        let err = ConfigError::RaggedTemplate { row: 2, expected: 5, found: 4 };
        let detailed = err.display_detailed();
        assert!(detailed.contains("C002"));
        assert!(detailed.contains("Help:"));
        assert!(detailed.starts_with("Template row 2 has 4 cells, expected 5"));
    }
}
