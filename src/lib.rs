//! # eson
//!
//! Semantic validation of ESON instance-literal documents against a reflective,
//! Ecore-like schema.
//!
//! An instance document constructs an object graph: objects of schema classes,
//! with values assigned to their attributes, references and containments. The
//! validator checks that every object is well-typed, every assignment is legal,
//! every cross-reference resolves and every structural constraint holds, and
//! reports the problems as diagnostics anchored at document nodes.
//!
//! ## Features
//!
//! - Reflective schema with structural identity of classifiers across loads
//! - Tri-state resolution (`Resolved`, `Unresolved`, `Absent`) of every name
//! - Structural rules for objects, features, references, containments and attributes
//! - Validation of the materialized object graph, mapped back to the document
//! - JSON interchange format for schemas and documents
//!
//! ## Example
//!
//! ```rust,ignore
//! use eson::loaders::{load_document_file, load_schema_file};
//! use eson::validators::DocumentValidator;
//!
//! let schema = load_schema_file("shop.schema.json")?;
//! let document = load_document_file(&schema, "shelf.eson.json")?;
//! let report = DocumentValidator::new(&schema).validate(&document)?;
//! for diagnostic in &report.diagnostics {
//!     println!("{}", diagnostic);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules - foundation
pub mod error;
pub mod limits;

// Core modules - utilities
pub mod namespaces;
pub mod names;
pub mod locations;

// Schema and instance models
pub mod schema;
pub mod instance;
pub mod graph;

// Validators
pub mod validators;

// Resource loading
pub mod loaders;

// Re-exports for convenience
pub use error::{Error, LookupFailure, Result};
pub use instance::{Document, Resolution};
pub use limits::{Limits, ValidatorConfig};
pub use schema::Schema;
pub use validators::{Diagnostic, DiagnosticCode, DocumentValidator, ValidationReport};

/// Version of the eson library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
