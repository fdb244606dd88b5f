//! Error handling types for marko-ls
//!
//! This module provides error types used throughout the language server.

use std::path::PathBuf;
use thiserror::Error;

/// Comprehensive error type for language server operations
#[derive(Debug, Error)]
pub enum LspError {
    /// The registry knows neither a template nor a renderer for the tag
    #[error("Couldn't find a definition for tag: {tag}")]
    UnresolvedTag { tag: String },

    /// A taglib descriptor (`marko.json`, `marko-tag.json`) could not be used
    #[error("Invalid taglib {}: {message}", path.display())]
    Taglib { path: PathBuf, message: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for language server operations
pub type LspResult<T> = Result<T, LspError>;

/// Helper functions for common error patterns
impl LspError {
    /// Create an unresolved tag error
    pub fn unresolved_tag(tag: impl Into<String>) -> Self {
        LspError::UnresolvedTag { tag: tag.into() }
    }

    /// Create a taglib error
    pub fn taglib(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LspError::Taglib {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        LspError::Config {
            message: message.into(),
        }
    }
}
