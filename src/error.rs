//! Error types for eson
//!
//! Rule violations found in a document are never errors: they are reported as
//! [`Diagnostic`](crate::validators::Diagnostic)s. The types in this module cover
//! everything else, namely malformed input structures, loading failures, limits and
//! cancellation.

use std::fmt;
use thiserror::Error;

/// Result type alias using eson Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for eson operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid schema construction (duplicate names, dangling ids, ...)
    #[error("schema error: {0}")]
    Schema(String),

    /// Invalid instance document structure
    #[error("document error: {0}")]
    Document(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The validation pass was cancelled by the caller
    #[error("validation cancelled")]
    Cancelled,

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure to resolve a node to the node or schema element that logically owns it.
///
/// Lookup failures are unrecoverable for the node they concern, but never abort the
/// rest of a validation pass. They are collected on the
/// [`ValidationReport`](crate::validators::ValidationReport) so callers can tell
/// "nothing to report" apart from "could not check".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// What was being looked up
    pub message: String,
    /// Index of the document node the lookup started from, if any
    pub node: Option<usize>,
}

impl LookupFailure {
    /// Create a new lookup failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node: None,
        }
    }

    /// Set the node the lookup started from
    pub fn at_node(mut self, node: usize) -> Self {
        self.node = Some(node);
        self
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(node) = self.node {
            write!(f, " (node #{})", node)?;
        }
        Ok(())
    }
}

impl std::error::Error for LookupFailure {}
