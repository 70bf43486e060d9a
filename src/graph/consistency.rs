//! Materialized-graph validation
//!
//! [`GraphValidator`] is the seam for whole-graph consistency checks that run
//! after the document has been turned into objects. [`StructuralConsistency`] is
//! the default implementation: multiplicities, enumeration values and proxy
//! resolution.

use super::{MaterializedGraph, ObjectId, SlotValue};
use crate::instance::AttributeLiteral;
use crate::schema::{FeatureKind, Schema};
use std::fmt;

/// Severity of a graph diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphSeverity {
    /// Nothing to report
    Ok,
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}

/// Machine-readable codes of graph diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphCode {
    /// A slot holds fewer or more values than its multiplicity allows
    EveryMultiplicityConforms,
    /// A primitive value does not conform to its data type
    EveryDataValueConforms,
    /// A reference holds a placeholder for a target that was never found
    EveryProxyResolves,
}

impl GraphCode {
    /// Numeric code
    pub fn value(&self) -> u32 {
        match self {
            GraphCode::EveryMultiplicityConforms => 1,
            GraphCode::EveryDataValueConforms => 2,
            GraphCode::EveryProxyResolves => 4,
        }
    }
}

impl fmt::Display for GraphCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Tree of diagnostics about a materialized graph
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDiagnostic {
    /// Severity; for a parent, the highest severity of its children
    pub severity: GraphSeverity,
    /// Machine-readable code
    pub code: Option<GraphCode>,
    /// Message
    pub message: String,
    /// Objects the diagnostic is about, offending object first
    pub data: Vec<ObjectId>,
    /// Nested diagnostics
    pub children: Vec<GraphDiagnostic>,
}

impl GraphDiagnostic {
    /// Create a leaf diagnostic
    pub fn new(severity: GraphSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(GraphSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(GraphSeverity::Warning, message)
    }

    /// Set the code
    pub fn with_code(mut self, code: GraphCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add an object the diagnostic is about
    pub fn with_data(mut self, object: ObjectId) -> Self {
        self.data.push(object);
        self
    }

    /// Add a nested diagnostic, raising this diagnostic's severity if needed
    pub fn add(&mut self, child: GraphDiagnostic) {
        self.severity = self.severity.max(child.severity);
        self.children.push(child);
    }
}

/// Whole-graph consistency check
pub trait GraphValidator: Send + Sync {
    /// Validate a graph, returning a parent diagnostic whose children are the
    /// individual findings
    fn validate(&self, schema: &Schema, graph: &MaterializedGraph) -> GraphDiagnostic;
}

/// Default graph validator
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralConsistency;

impl StructuralConsistency {
    fn check_object(
        &self,
        schema: &Schema,
        graph: &MaterializedGraph,
        id: ObjectId,
        out: &mut GraphDiagnostic,
    ) {
        let Some(object) = graph.object(id) else {
            return;
        };
        let Some(class) = object.class else {
            return;
        };
        let label = graph.label(schema, id);
        for feature in schema.all_features(class) {
            let Some(f) = schema.feature(feature) else {
                continue;
            };
            let values = object.values(feature);

            if values.is_empty() && f.multiplicity.is_required() {
                out.add(
                    GraphDiagnostic::error(format!(
                        "The required feature '{}' of '{}' must be set",
                        f.name, label
                    ))
                    .with_code(GraphCode::EveryMultiplicityConforms)
                    .with_data(id),
                );
            } else if values.len() < f.multiplicity.lower {
                out.add(
                    GraphDiagnostic::error(format!(
                        "The feature '{}' of '{}' with {} values must have at least {} values",
                        f.name,
                        label,
                        values.len(),
                        f.multiplicity.lower
                    ))
                    .with_code(GraphCode::EveryMultiplicityConforms)
                    .with_data(id),
                );
            }
            if let Some(upper) = f.multiplicity.upper {
                if values.len() > upper {
                    out.add(
                        GraphDiagnostic::error(format!(
                            "The feature '{}' of '{}' with {} values may have at most {} values",
                            f.name,
                            label,
                            values.len(),
                            upper
                        ))
                        .with_code(GraphCode::EveryMultiplicityConforms)
                        .with_data(id),
                    );
                }
            }

            for value in values {
                match value {
                    SlotValue::Data(AttributeLiteral::Enum(literal))
                        if matches!(f.kind, FeatureKind::Attribute { .. }) =>
                    {
                        let Some(enum_type) = f.etype.and_then(|t| schema.classifier(t)) else {
                            continue;
                        };
                        let Some(literals) = enum_type.enum_literals() else {
                            continue;
                        };
                        if !literals.iter().any(|l| l == literal) {
                            out.add(
                                GraphDiagnostic::error(format!(
                                    "The value '{}' of feature '{}' of '{}' is not a literal of '{}'",
                                    literal, f.name, label, enum_type.name
                                ))
                                .with_code(GraphCode::EveryDataValueConforms)
                                .with_data(id),
                            );
                        }
                    }
                    SlotValue::Proxy(text) => {
                        out.add(
                            GraphDiagnostic::error(format!(
                                "The feature '{}' of '{}' contains an unresolved proxy '{}'",
                                f.name, label, text
                            ))
                            .with_code(GraphCode::EveryProxyResolves)
                            .with_data(id),
                        );
                    }
                    _ => {}
                }
            }
        }
    }
}

impl GraphValidator for StructuralConsistency {
    fn validate(&self, schema: &Schema, graph: &MaterializedGraph) -> GraphDiagnostic {
        let subject = graph
            .root()
            .map(|root| graph.label(schema, root))
            .unwrap_or_default();
        let mut result = GraphDiagnostic::new(
            GraphSeverity::Ok,
            format!("Diagnosis of '{}'", subject),
        );
        if let Some(root) = graph.root() {
            result.data.push(root);
        }
        for (id, object) in graph.objects() {
            if !object.external {
                self.check_object(schema, graph, id, &mut result);
            }
        }
        result
    }
}
