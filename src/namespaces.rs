//! Namespace identity handling
//!
//! Schema packages are identified by a name, a namespace prefix and a namespace
//! URI, nested inside an optional super package. Two packages loaded independently
//! (for example the same metamodel read twice by different loaders) are distinct
//! values in memory but describe the same namespace; [`NamespaceChain`] compares
//! them structurally.

use std::fmt;

/// Identity of a single namespace level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Package name
    pub name: String,
    /// Namespace prefix
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{{{}}}", self.prefix, self.uri)
    }
}

/// A namespace together with all of its enclosing namespaces, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamespaceChain {
    levels: Vec<Namespace>,
}

impl NamespaceChain {
    /// The empty chain, for classifiers that belong to no package
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chain from levels ordered innermost first
    pub fn from_levels(levels: Vec<Namespace>) -> Self {
        Self { levels }
    }

    /// Innermost namespace, if any
    pub fn innermost(&self) -> Option<&Namespace> {
        self.levels.first()
    }

    /// Number of levels
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterate levels, innermost first
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.levels.iter()
    }

    /// Dotted path of package names, outermost first (`outer.inner`)
    pub fn qualified_path(&self) -> String {
        self.levels
            .iter()
            .rev()
            .map(|ns| ns.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}
