//! Resource locations and source spans
//!
//! Documents and schema packages are identified by URIs. Workspace resources use
//! the `platform:/resource/<project>/<path>` form; two resources are in the same
//! project when they share the segment following `resource`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// URI of a document or schema resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    url: Url,
}

impl ResourceUri {
    /// Parse a resource URI
    pub fn parse(s: &str) -> Result<Self> {
        Ok(Self { url: Url::parse(s)? })
    }

    /// Build a workspace URI for `path` inside `project`
    pub fn platform_resource(project: &str, path: &str) -> Result<Self> {
        Self::parse(&format!(
            "platform:/resource/{}/{}",
            project,
            path.trim_start_matches('/')
        ))
    }

    /// Get the underlying URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path segments, empty for URIs that cannot carry a path
    pub fn segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default()
    }

    /// Get the segment at `index`
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.url.path_segments().and_then(|mut s| s.nth(index))
    }

    /// Check if this is a `platform:/resource/...` URI
    pub fn is_platform_resource(&self) -> bool {
        self.url.scheme() == "platform" && self.segment(0) == Some("resource")
    }

    /// Project segment of a platform resource URI
    pub fn project(&self) -> Option<&str> {
        if self.is_platform_resource() {
            self.segment(1)
        } else {
            None
        }
    }

    /// Check whether two resources live in the same workspace project.
    ///
    /// Only platform resource URIs are comparable; anything else is never in the
    /// same project.
    pub fn is_in_same_project(&self, other: &ResourceUri) -> bool {
        match (self.project(), other.project()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// A region of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// 1-based line of the first character
    pub line: usize,
}

impl Span {
    /// Create a new span
    pub fn new(offset: usize, length: usize, line: usize) -> Self {
        Self {
            offset,
            length,
            line,
        }
    }

    /// Offset one past the last character
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.offset, self.end())
    }
}
