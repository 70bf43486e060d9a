//! Attribute type checking
//!
//! Checks primitive literals against the data type declared by the feature they
//! are assigned to. Each literal kind accepts a fixed set of `ecore` primitive
//! types; enumeration literals accept any enumeration.

use super::diagnostics::{Diagnostic, DiagnosticCode, Slot};
use crate::instance::{AttributeLiteral, Document, NodeId, Value};
use crate::schema::{ClassifierId, PrimitiveKind, Schema};

/// What a literal would have accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// One of these primitive types
    OneOf(&'static [PrimitiveKind]),
    /// An enumeration
    Enumeration,
}

/// A literal whose kind does not fit the declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Offending literal node
    pub node: NodeId,
    /// Accepted types
    pub expected: Expected,
    /// Name of the declared type, `None` if the feature has no resolvable type
    pub actual: Option<String>,
}

impl TypeMismatch {
    /// Human-readable message
    pub fn message(&self) -> String {
        let actual = self.actual.as_deref().unwrap_or("???");
        match self.expected {
            Expected::OneOf(kinds) => format!(
                "Attribute must be one of types {} but was {}",
                kinds.iter().map(PrimitiveKind::name).collect::<Vec<_>>().join(", "),
                actual
            ),
            Expected::Enumeration => format!(
                "Attribute must be of type {} but was an enumeration literal",
                actual
            ),
        }
    }

    /// Convert into a bad-type diagnostic at the literal
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.message())
            .on(self.node, Slot::AttributeValue)
            .with_code(DiagnosticCode::BadType)
    }
}

/// Stateless checker of primitive literals; one instance can serve any number of
/// concurrent validations
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeTypeChecker;

impl AttributeTypeChecker {
    /// Primitive types a literal kind accepts; `None` for enumeration literals
    pub fn accepted_kinds(literal: &AttributeLiteral) -> Option<&'static [PrimitiveKind]> {
        match literal {
            AttributeLiteral::Boolean(_) => Some(PrimitiveKind::BOOLEAN),
            AttributeLiteral::String(_) => Some(PrimitiveKind::STRING),
            AttributeLiteral::Integer(_) => Some(PrimitiveKind::INTEGER),
            AttributeLiteral::Double(_) => Some(PrimitiveKind::DOUBLE),
            AttributeLiteral::Enum(_) => None,
        }
    }

    /// Check one literal against a declared type
    pub fn accepts(&self, schema: &Schema, declared: Option<ClassifierId>, literal: &AttributeLiteral) -> bool {
        match Self::accepted_kinds(literal) {
            Some(kinds) => schema.is_primitive_kind(declared, kinds),
            None => schema.is_enum(declared),
        }
    }

    /// Check the value at `node` against a declared type.
    ///
    /// Lists are checked element by element; every failing literal is reported,
    /// and non-literal elements are ignored. The value passes if the result is
    /// empty.
    pub fn check(
        &self,
        schema: &Schema,
        declared: Option<ClassifierId>,
        document: &Document,
        node: NodeId,
    ) -> Vec<TypeMismatch> {
        let mut mismatches = Vec::new();
        match document.value(node) {
            Some(Value::Attribute(literal)) => {
                if let Some(mismatch) = self.check_literal(schema, declared, node, literal) {
                    mismatches.push(mismatch);
                }
            }
            Some(Value::Multi(elements)) => {
                for &element in elements {
                    if let Some(Value::Attribute(literal)) = document.value(element) {
                        if let Some(mismatch) = self.check_literal(schema, declared, element, literal) {
                            mismatches.push(mismatch);
                        }
                    }
                }
            }
            Some(Value::Reference(_)) | Some(Value::Containment(_)) | None => {}
        }
        mismatches
    }

    fn check_literal(
        &self,
        schema: &Schema,
        declared: Option<ClassifierId>,
        node: NodeId,
        literal: &AttributeLiteral,
    ) -> Option<TypeMismatch> {
        if self.accepts(schema, declared, literal) {
            return None;
        }
        let expected = match Self::accepted_kinds(literal) {
            Some(kinds) => Expected::OneOf(kinds),
            None => Expected::Enumeration,
        };
        Some(TypeMismatch {
            node,
            expected,
            actual: declared.and_then(|d| schema.classifier_name(d)).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{ElementLiteral, FeatureLiteral, ObjectLiteral, ValueLiteral};
    use crate::locations::ResourceUri;
    use crate::schema::{FeatureId, Multiplicity, ECORE_NS_PREFIX, ECORE_NS_URI, ECORE_PACKAGE};
    use proptest::prelude::*;

    fn literal_for(kind_set: usize) -> AttributeLiteral {
        match kind_set {
            0 => AttributeLiteral::Boolean(true),
            1 => AttributeLiteral::String("s".into()),
            2 => AttributeLiteral::Integer(1),
            _ => AttributeLiteral::Double(1.5),
        }
    }

    fn doc_with(schema_class: (crate::schema::ClassifierId, FeatureId), value: ValueLiteral) -> Document {
        let root = ObjectLiteral::of(schema_class.0).with(FeatureLiteral::set(schema_class.1, value));
        Document::from_literal(ResourceUri::platform_resource("p", "a.eson").unwrap(), root)
    }

    fn value_node(doc: &Document) -> NodeId {
        let feature = doc.object(doc.root().unwrap()).unwrap().features[0];
        doc.feature(feature).unwrap().value.unwrap()
    }

    proptest! {
        #[test]
        fn literal_accepted_exactly_by_its_kind_set(kind_index in 0usize..17, set in 0usize..4) {
            let schema = Schema::with_ecore();
            let kind = PrimitiveKind::ALL[kind_index];
            let literal = literal_for(set);
            let accepted = AttributeTypeChecker::accepted_kinds(&literal).unwrap();
            prop_assert_eq!(
                AttributeTypeChecker.accepts(&schema, schema.ecore(kind), &literal),
                accepted.contains(&kind)
            );
        }
    }

    #[test]
    fn test_integer_against_string() {
        let mut schema = Schema::with_ecore();
        let string = schema.ecore(PrimitiveKind::EString);
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let class = schema.add_class(pkg, "C").unwrap();
        let label = schema.add_attribute(class, "label", string, Multiplicity::OPTIONAL).unwrap();
        let doc = doc_with((class, label), ValueLiteral::int(3));
        let node = value_node(&doc);

        let mismatches = AttributeTypeChecker.check(&schema, string, &doc, node);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(
            mismatches[0].message(),
            "Attribute must be one of types EInt, EIntegerObject, ELong, ELongObject, \
             EBigInteger, EShort, EShortObject, EByte, EByteObject but was EString"
        );
        let diagnostic = mismatches[0].clone().into_diagnostic();
        assert_eq!(diagnostic.code, Some(DiagnosticCode::BadType));
        assert_eq!(diagnostic.node, Some(node));
    }

    #[test]
    fn test_multi_value_reports_every_bad_element() {
        let mut schema = Schema::with_ecore();
        let int = schema.ecore(PrimitiveKind::EInt);
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let class = schema.add_class(pkg, "C").unwrap();
        let numbers = schema.add_attribute(class, "numbers", int, Multiplicity::MANY).unwrap();
        let doc = doc_with(
            (class, numbers),
            ValueLiteral::multi(vec![
                ElementLiteral::string("a"),
                ElementLiteral::int(2),
                ElementLiteral::string("b"),
            ]),
        );
        let mismatches = AttributeTypeChecker.check(&schema, int, &doc, value_node(&doc));
        assert_eq!(mismatches.len(), 2);
        assert_ne!(mismatches[0].node, mismatches[1].node);
    }

    #[test]
    fn test_enum_literal() {
        let mut schema = Schema::with_ecore();
        let string = schema.ecore(PrimitiveKind::EString);
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let genre = schema.add_enum(pkg, "Genre", ["Fiction"]).unwrap();
        let literal = AttributeLiteral::Enum("Fiction".into());
        assert!(AttributeTypeChecker.accepts(&schema, Some(genre), &literal));
        assert!(!AttributeTypeChecker.accepts(&schema, string, &literal));
        assert!(!AttributeTypeChecker.accepts(&schema, Some(genre), &AttributeLiteral::String("Fiction".into())));
    }

    #[test]
    fn test_absent_declared_type() {
        let mut schema = Schema::with_ecore();
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let class = schema.add_class(pkg, "C").unwrap();
        let untyped = schema.add_attribute(class, "untyped", None, Multiplicity::OPTIONAL).unwrap();
        let doc = doc_with((class, untyped), ValueLiteral::boolean(true));
        let mismatches = AttributeTypeChecker.check(&schema, None, &doc, value_node(&doc));
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].message().ends_with("but was ???"));
    }

    #[test]
    fn test_duplicate_ecore_package_is_accepted() {
        let mut schema = Schema::new();
        let copy = schema
            .add_package(ECORE_PACKAGE, ECORE_NS_PREFIX, ECORE_NS_URI, None)
            .unwrap();
        let double = schema.add_data_type(copy, "EDouble").unwrap();
        assert!(AttributeTypeChecker.accepts(&schema, Some(double), &AttributeLiteral::Double(2.0)));
    }
}
