//! Object names and qualified classifier names
//!
//! Objects in a document may carry a name. A name is only meaningful when the
//! object's class has a name-bearing attribute, which [`name_attribute`] looks up.

use crate::error::{Error, Result};
use crate::schema::{ClassifierId, FeatureId, FeatureKind, PrimitiveKind, Schema};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\^?[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"));

/// Check if a name is empty or whitespace only
pub fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

/// Check if a string is a valid identifier (`^` escapes keywords)
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Validate every segment of a dotted qualified name
pub fn validate_qualified_name(name: &str) -> Result<()> {
    if !name.is_empty() && name.split('.').all(is_valid_identifier) {
        Ok(())
    } else {
        Err(Error::Document(format!("Invalid qualified name: '{}'", name)))
    }
}

/// Split a qualified name into its package path and simple name.
///
/// The package path is empty for simple names.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((path, simple)) => (path, simple),
        None => ("", name),
    }
}

/// Strip the keyword escape from an identifier
pub fn unescape(name: &str) -> &str {
    name.strip_prefix('^').unwrap_or(name)
}

/// Find the attribute that names instances of `class`.
///
/// A string-typed ID attribute wins; otherwise a string-typed attribute called
/// `fallback` is used. Inherited attributes are considered.
pub fn name_attribute(schema: &Schema, class: ClassifierId, fallback: &str) -> Option<FeatureId> {
    let features = schema.all_features(class);
    let is_string = |f: FeatureId| {
        schema.is_primitive_kind(schema.feature_type(f), PrimitiveKind::STRING)
    };
    let id_attribute = features.iter().copied().find(|&f| {
        matches!(
            schema.feature(f).map(|f| f.kind),
            Some(FeatureKind::Attribute { id: true })
        ) && is_string(f)
    });
    id_attribute.or_else(|| {
        features.iter().copied().find(|&f| {
            schema.is_attribute_feature(f) && schema.feature_name(f) == Some(fallback) && is_string(f)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Multiplicity;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\t\n"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("Book"));
        assert!(is_valid_identifier("_x1"));
        assert!(is_valid_identifier("^package"));
        assert!(!is_valid_identifier("1book"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier(""));
        assert_eq!(unescape("^package"), "package");
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(split_qualified_name("library.Book"), ("library", "Book"));
        assert_eq!(split_qualified_name("a.b.C"), ("a.b", "C"));
        assert_eq!(split_qualified_name("Book"), ("", "Book"));
        assert!(validate_qualified_name("a.b.C").is_ok());
        assert!(validate_qualified_name("a..C").is_err());
        assert!(validate_qualified_name("").is_err());
    }

    #[test]
    fn test_name_attribute() {
        let mut schema = Schema::with_ecore();
        let string = schema.ecore(PrimitiveKind::EString);
        let int = schema.ecore(PrimitiveKind::EInt);
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();

        let named = schema.add_class(pkg, "Named").unwrap();
        let name = schema.add_attribute(named, "name", string, Multiplicity::OPTIONAL).unwrap();
        let child = schema.add_class(pkg, "Child").unwrap();
        schema.add_super_type(child, named).unwrap();
        assert_eq!(name_attribute(&schema, child, "name"), Some(name));
        assert_eq!(name_attribute(&schema, child, "label"), None);

        let keyed = schema.add_class(pkg, "Keyed").unwrap();
        schema.add_attribute(keyed, "name", string, Multiplicity::OPTIONAL).unwrap();
        let key = schema.add_id_attribute(keyed, "key", string).unwrap();
        assert_eq!(name_attribute(&schema, keyed, "name"), Some(key));

        let numbered = schema.add_class(pkg, "Numbered").unwrap();
        schema.add_attribute(numbered, "name", int, Multiplicity::OPTIONAL).unwrap();
        assert_eq!(name_attribute(&schema, numbered, "name"), None);
    }
}
