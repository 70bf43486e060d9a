//! Instance document validators
//!
//! This module contains the validation logic: diagnostics and their source
//! location, the attribute type checker, the structural rule engine, the
//! reconciliation of graph diagnostics and the document validator tying them
//! together.

pub mod aggregate;
pub mod attributes;
pub mod diagnostics;
pub mod rules;
pub mod validation;

// Re-exports
pub use aggregate::{reconcile, remap};
pub use attributes::{AttributeTypeChecker, Expected, TypeMismatch};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity, Slot, SourceLocator, SpanLocator};
pub use rules::{LocalFindings, RuleEngine};
pub use validation::{CancellationToken, DocumentValidator, ValidationReport};
