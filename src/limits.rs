//! Limits and configuration for document validation
//!
//! This module defines the limits that protect a validation pass against
//! pathological documents (deeply nested or huge object graphs) and the
//! validator configuration that carries them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resource limits applied during a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting depth of object constructions
    pub max_depth: usize,

    /// Maximum number of object constructions per document
    pub max_objects: usize,

    /// Maximum number of diagnostics kept per document; further ones are dropped
    pub max_diagnostics: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_objects: 1_000_000,
            max_diagnostics: 10_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 32,
            max_objects: 10_000,
            max_diagnostics: 500,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 4096,
            max_objects: usize::MAX,
            max_diagnostics: usize::MAX,
        }
    }

    /// Check if the object nesting depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "object nesting depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of objects is within limits
    pub fn check_objects(&self, count: usize) -> Result<()> {
        if count > self.max_objects {
            Err(Error::LimitExceeded(format!(
                "document has {} objects, maximum is {}",
                count, self.max_objects
            )))
        } else {
            Ok(())
        }
    }
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Resource limits
    pub limits: Limits,

    /// Reject classes that live in the same project as the document
    pub check_placement: bool,

    /// Attribute used to name objects when the class has no ID attribute
    pub name_attribute: String,

    /// Report warnings produced by the materialized-graph validator
    pub report_graph_warnings: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            check_placement: true,
            name_attribute: "name".to_string(),
            report_graph_warnings: true,
        }
    }
}

impl ValidatorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Enable or disable the same-project placement rule
    pub fn with_placement_check(mut self, enabled: bool) -> Self {
        self.check_placement = enabled;
        self
    }

    /// Set the fallback name attribute
    pub fn with_name_attribute(mut self, name: impl Into<String>) -> Self {
        self.name_attribute = name.into();
        self
    }

    /// Parse a configuration from JSON; absent keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Resource(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }
}
