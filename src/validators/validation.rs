//! Document validation
//!
//! [`DocumentValidator`] runs one complete pass over a document: the structural
//! rules, then the materialized-graph validator, then reconciliation and source
//! location. It holds no per-document state, so a single validator can check any
//! number of documents concurrently as long as the schema is not modified.

use super::aggregate::reconcile;
use super::diagnostics::{Diagnostic, DiagnosticCode, Severity, SourceLocator, SpanLocator};
use super::rules::RuleEngine;
use crate::error::{Error, LookupFailure, Result};
use crate::graph::{GraphValidator, MaterializedGraph, StructuralConsistency};
use crate::instance::Document;
use crate::limits::ValidatorConfig;
use crate::locations::ResourceUri;
use crate::schema::Schema;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-driven cancellation flag, checked before every object visit
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone of the token observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::Cancelled`] if cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Result of validating one document
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Validated document
    pub uri: ResourceUri,
    /// Diagnostics, rule diagnostics first
    pub diagnostics: Vec<Diagnostic>,
    /// Nodes that could not be checked
    pub failures: Vec<LookupFailure>,
}

impl ValidationReport {
    /// Error diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Warning diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Diagnostics carrying `code`
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == Some(code))
    }

    /// Check if any error was reported
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Check if the document has no errors and every node could be checked
    pub fn is_valid(&self) -> bool {
        !self.has_errors() && self.failures.is_empty()
    }
}

/// Validates instance documents against a schema
pub struct DocumentValidator<'s> {
    schema: &'s Schema,
    config: ValidatorConfig,
    graph_validator: Box<dyn GraphValidator>,
    locator: Box<dyn SourceLocator>,
    cancel: CancellationToken,
}

impl<'s> DocumentValidator<'s> {
    /// Create a validator with the default configuration
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            config: ValidatorConfig::default(),
            graph_validator: Box::new(StructuralConsistency),
            locator: Box::new(SpanLocator),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the materialized-graph validator
    pub fn with_graph_validator(mut self, validator: impl GraphValidator + 'static) -> Self {
        self.graph_validator = Box::new(validator);
        self
    }

    /// Replace the source locator
    pub fn with_locator(mut self, locator: impl SourceLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Use a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Schema documents are validated against
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Validate a document.
    ///
    /// Rule problems are reported as diagnostics; an `Err` means the pass was
    /// cancelled or the document exceeded the configured limits.
    pub fn validate(&self, document: &Document) -> Result<ValidationReport> {
        debug!(uri = %document.uri(), "validating document");
        let local = RuleEngine::new(self.schema, &self.config).run(document, &self.cancel)?;
        self.cancel.check()?;

        let graph = MaterializedGraph::build(self.schema, document);
        let graph_diagnostic = self.graph_validator.validate(self.schema, &graph);
        debug!(
            objects = graph.len(),
            findings = graph_diagnostic.children.len(),
            "materialized graph validated"
        );

        let mut diagnostics = reconcile(
            local.diagnostics,
            &graph_diagnostic,
            &graph,
            document,
            self.config.report_graph_warnings,
        );
        for diagnostic in &mut diagnostics {
            if let Some(node) = diagnostic.node {
                diagnostic.span = self
                    .locator
                    .locate(document, node, diagnostic.slot, diagnostic.index);
            }
        }
        let max = self.config.limits.max_diagnostics;
        if diagnostics.len() > max {
            warn!(total = diagnostics.len(), kept = max, "too many diagnostics, truncating");
            diagnostics.truncate(max);
        }

        Ok(ValidationReport {
            uri: document.uri().clone(),
            diagnostics,
            failures: local.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphDiagnostic, GraphSeverity};
    use crate::instance::{FeatureLiteral, NodeId, ObjectLiteral, ValueLiteral};
    use crate::limits::Limits;
    use crate::locations::Span;
    use crate::schema::{Multiplicity, PrimitiveKind};
    use crate::validators::diagnostics::Slot;

    struct Complaining;

    impl GraphValidator for Complaining {
        fn validate(&self, _schema: &Schema, graph: &MaterializedGraph) -> GraphDiagnostic {
            let mut root = GraphDiagnostic::new(GraphSeverity::Ok, "Diagnosis");
            if let Some(object) = graph.root() {
                root.add(GraphDiagnostic::warning("looks odd").with_data(object));
            }
            root
        }
    }

    struct Fixed;

    impl SourceLocator for Fixed {
        fn locate(&self, _: &Document, _: NodeId, _: Option<Slot>, _: Option<usize>) -> Option<Span> {
            Some(Span::new(1, 1, 1))
        }
    }

    fn fixture() -> (Schema, Document) {
        let mut schema = Schema::with_ecore();
        let string = schema.ecore(PrimitiveKind::EString);
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let class = schema.add_class(pkg, "Note").unwrap();
        let text = schema.add_attribute(class, "text", string, Multiplicity::REQUIRED).unwrap();
        let doc = Document::from_literal(
            ResourceUri::platform_resource("p", "a.eson").unwrap(),
            ObjectLiteral::of(class)
                .at(Span::new(0, 30, 1))
                .with(FeatureLiteral::set(text, ValueLiteral::int(3)).at(Span::new(5, 10, 1)))
                .with(FeatureLiteral::set(text, ValueLiteral::string("x")).at(Span::new(16, 10, 2))),
        );
        (schema, doc)
    }

    #[test]
    fn test_report_locates_diagnostics() {
        let (schema, doc) = fixture();
        let report = DocumentValidator::new(&schema).validate(&doc).unwrap();
        let spans: Vec<_> = report.diagnostics.iter().map(|d| d.span).collect();
        assert_eq!(spans, vec![Some(Span::new(16, 10, 2)), Some(Span::new(5, 10, 1))]);
        assert_eq!(report.diagnostics[0].message, "Duplicate feature 'text'");
        assert!(report.diagnostics[1].message.starts_with("Attribute must be one of types EInt"));
        assert!(report.has_errors());
        assert!(!report.is_valid());
        assert_eq!(report.with_code(DiagnosticCode::BadType).count(), 1);
    }

    #[test]
    fn test_graph_warnings_follow_config() {
        let (schema, doc) = fixture();
        let validator = DocumentValidator::new(&schema)
            .with_graph_validator(Complaining)
            .with_locator(Fixed);
        let report = validator.validate(&doc).unwrap();
        assert_eq!(report.warnings().count(), 1);
        assert!(report.diagnostics.iter().all(|d| d.span == Some(Span::new(1, 1, 1))));

        let mut config = ValidatorConfig::default();
        config.report_graph_warnings = false;
        let quiet = DocumentValidator::new(&schema)
            .with_graph_validator(Complaining)
            .with_config(config);
        assert_eq!(quiet.validate(&doc).unwrap().warnings().count(), 0);
    }

    #[test]
    fn test_diagnostics_are_truncated() {
        let (schema, doc) = fixture();
        let config = ValidatorConfig::default().with_limits(Limits {
            max_diagnostics: 1,
            ..Limits::default()
        });
        let report = DocumentValidator::new(&schema).with_config(config).validate(&doc).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn test_cancelled_validation() {
        let (schema, doc) = fixture();
        let token = CancellationToken::new();
        let validator = DocumentValidator::new(&schema).with_cancellation(token.clone());
        token.cancel();
        assert!(matches!(validator.validate(&doc), Err(Error::Cancelled)));
    }
}
