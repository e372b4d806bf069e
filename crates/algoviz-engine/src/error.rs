//! Error types for the algoviz engine.
//!
//! This module defines the error hierarchy for recording, playback and
//! configuration. User-facing errors carry an actionable suggestion so the
//! control surface can show them next to the offending input box.

use std::path::PathBuf;

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, VizError>;

/// Errors that can occur while recording or replaying an algorithm.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your algoviz.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// An unknown algorithm was requested or a configuration value is invalid.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigurationError {
        /// Description of the problem.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The algorithm input is malformed or does not fit the algorithm.
    #[error("Invalid input: {message}\n\nSuggestion: {suggestion}")]
    InvalidInputError {
        /// Description of what is wrong with the input.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// A playback transition was attempted from a status that does not allow it.
    ///
    /// The control surface filters these out before they reach the scheduler,
    /// so seeing one means the engine itself is wrong.
    #[error("Illegal playback transition: cannot go from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VizError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigurationError` with the given message and suggestion.
    #[must_use]
    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a `ConfigurationError` for an algorithm id nobody registered.
    #[must_use]
    pub fn unknown_algorithm(id: &str) -> Self {
        Self::configuration(
            format!("unknown algorithm '{id}'"),
            "Use one of: bubble_sort, selection_sort, insertion_sort, bfs, dfs, stack, queue",
        )
    }

    /// Creates a new `InvalidInputError` with the given message and suggestion.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidInputError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates an `InvalidInputError` for a traversal start node that is not in the graph.
    #[must_use]
    pub fn start_node_not_found(node: usize) -> Self {
        Self::invalid_input(
            format!("start node {node} is not part of the graph"),
            "Pick a start node from the graph's node list",
        )
    }

    /// Creates a new `IllegalTransition` error.
    #[must_use]
    pub fn illegal_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if the error was caused by data the user supplied.
    ///
    /// These are shown to the user and leave the previous visualization intact.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInputError { .. } | Self::ConfigurationError { .. }
        )
    }

    /// Returns `true` if this error indicates a bug or unusable environment.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IllegalTransition { .. } | Self::ConfigParseError { .. }
        )
    }
}
