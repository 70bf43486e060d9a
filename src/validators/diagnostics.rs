//! Diagnostics
//!
//! A [`Diagnostic`] is anchored at a document node and, optionally, at one slot
//! of that node and an index inside the slot. A [`SourceLocator`] turns the anchor
//! into a source [`Span`].

use crate::instance::{Document, NodeId, NodeKind, Value};
use crate::locations::Span;
use serde::{Serialize, Serializer};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document is invalid
    Error,
    /// The document is suspicious
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// Machine-readable diagnostic codes.
///
/// Automated fixes match on [`DiagnosticCode::as_str`]; the strings are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A name was declared for an object whose class has no name attribute
    CannotName,
    /// A literal does not fit the declared data type
    BadType,
    /// A cross-reference did not resolve
    Linking,
    /// The object's class lives in the same project as the document
    SameProject,
}

impl DiagnosticCode {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::CannotName => "cannotname",
            DiagnosticCode::BadType => "badtype",
            DiagnosticCode::Linking => "org.eclipse.xtext.diagnostics.Diagnostic.Linking",
            DiagnosticCode::SameProject => "sameproject",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Slots of document nodes a diagnostic can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Declared name of an object
    ObjectName,
    /// Declared class of an object
    ObjectClass,
    /// Feature assignments of an object (indexed)
    ObjectFeatures,
    /// Feature reference of an assignment
    FeatureTarget,
    /// Value of an assignment
    FeatureValue,
    /// Primitive literal
    AttributeValue,
    /// Cross-reference
    ReferenceValue,
    /// Nested object
    ContainmentValue,
}

/// A validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Message
    pub message: String,
    /// Node the diagnostic is anchored at
    pub node: Option<NodeId>,
    /// Slot of the node
    pub slot: Option<Slot>,
    /// Index inside the slot
    pub index: Option<usize>,
    /// Machine-readable code
    pub code: Option<DiagnosticCode>,
    /// Source region, once located
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            node: None,
            slot: None,
            index: None,
            code: None,
            span: None,
        }
    }

    /// Create an error
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Anchor at a node slot
    pub fn on(mut self, node: NodeId, slot: impl Into<Option<Slot>>) -> Self {
        self.node = Some(node);
        self.slot = slot.into();
        self
    }

    /// Anchor at a node without a specific slot
    pub fn on_node(mut self, node: Option<NodeId>) -> Self {
        self.node = node;
        self
    }

    /// Set the index inside the slot
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the code
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(span) = self.span {
            write!(f, " at {}", span)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(code) = self.code {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}

/// Resolves diagnostic anchors to source regions
pub trait SourceLocator: Send + Sync {
    /// Source region for a node slot, optionally at an index inside the slot
    fn locate(&self, document: &Document, node: NodeId, slot: Option<Slot>, index: Option<usize>) -> Option<Span>;
}

/// Locator using the spans recorded on document nodes.
///
/// Indexed anchors point at the indexed feature assignment or list element. A
/// node without a span borrows the span of its nearest ancestor that has one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanLocator;

impl SourceLocator for SpanLocator {
    fn locate(&self, document: &Document, node: NodeId, slot: Option<Slot>, index: Option<usize>) -> Option<Span> {
        let target = index
            .and_then(|i| match (slot, document.node(node).map(|n| &n.kind)) {
                (Some(Slot::ObjectFeatures), Some(NodeKind::Object(object))) => object.features.get(i).copied(),
                (_, Some(NodeKind::Value(Value::Multi(elements)))) => elements.get(i).copied(),
                _ => None,
            })
            .unwrap_or(node);
        let mut current = Some(target);
        while let Some(id) = current {
            let n = document.node(id)?;
            if let Some(span) = n.span {
                return Some(span);
            }
            current = n.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{FeatureLiteral, ObjectLiteral, ValueLiteral};
    use crate::locations::ResourceUri;
    use crate::schema::{Multiplicity, Schema};

    #[test]
    fn test_code_strings_are_stable() {
        assert_eq!(DiagnosticCode::CannotName.as_str(), "cannotname");
        assert_eq!(DiagnosticCode::BadType.as_str(), "badtype");
        assert_eq!(
            DiagnosticCode::Linking.as_str(),
            "org.eclipse.xtext.diagnostics.Diagnostic.Linking"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let mut d = Diagnostic::error("Name cannot be blank").with_code(DiagnosticCode::CannotName);
        d.span = Some(Span::new(3, 2, 1));
        assert_eq!(d.to_string(), "error at 1:3..5: Name cannot be blank [cannotname]");
        assert_eq!(Diagnostic::warning("w").to_string(), "warning: w");
    }

    #[test]
    fn test_diagnostic_serializes_code_as_string() {
        let d = Diagnostic::error("x").with_code(DiagnosticCode::BadType);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["code"], "badtype");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn test_span_locator() {
        let mut schema = Schema::new();
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let class = schema.add_class(pkg, "C").unwrap();
        let a = schema.add_attribute(class, "a", None, Multiplicity::OPTIONAL).unwrap();
        let root = ObjectLiteral::of(class)
            .at(Span::new(0, 40, 1))
            .with(FeatureLiteral::set(a, ValueLiteral::int(1)).at(Span::new(10, 5, 2)))
            .with(FeatureLiteral::set(a, ValueLiteral::int(2)).at(Span::new(20, 5, 3)));
        let doc = Document::from_literal(ResourceUri::platform_resource("p", "a.eson").unwrap(), root);
        let root = doc.root().unwrap();
        let locator = SpanLocator;

        assert_eq!(locator.locate(&doc, root, Some(Slot::ObjectName), None), Some(Span::new(0, 40, 1)));
        assert_eq!(
            locator.locate(&doc, root, Some(Slot::ObjectFeatures), Some(1)),
            Some(Span::new(20, 5, 3))
        );
        let second = doc.object(root).unwrap().features[1];
        let value = doc.feature(second).unwrap().value.unwrap();
        assert_eq!(locator.locate(&doc, value, None, None), Some(Span::new(20, 5, 3)));
    }
}
