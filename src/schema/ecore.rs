//! Built-in `ecore` primitive types
//!
//! Attribute literals are checked against the primitive data types of the `ecore`
//! package. The package is registered like any other package so that its types
//! can be referenced from schemas, and compared structurally so that a second copy
//! loaded by a different loader is still recognized.

use super::reflect::ClassifierIdentity;
use super::{Classifier, ClassifierId, ClassifierKind, Package, PackageId, Schema};
use crate::namespaces::{Namespace, NamespaceChain};
use indexmap::IndexMap;
use std::fmt;

/// Name of the built-in package
pub const ECORE_PACKAGE: &str = "ecore";
/// Namespace prefix of the built-in package
pub const ECORE_NS_PREFIX: &str = "ecore";
/// Namespace URI of the built-in package
pub const ECORE_NS_URI: &str = "http://www.eclipse.org/emf/2002/Ecore";

/// Primitive data types of the `ecore` package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    EBoolean,
    /// `java.lang.Boolean`
    EBooleanObject,
    /// `String`
    EString,
    /// `int`
    EInt,
    /// `java.lang.Integer`
    EIntegerObject,
    /// `long`
    ELong,
    /// `java.lang.Long`
    ELongObject,
    /// `java.math.BigInteger`
    EBigInteger,
    /// `short`
    EShort,
    /// `java.lang.Short`
    EShortObject,
    /// `byte`
    EByte,
    /// `java.lang.Byte`
    EByteObject,
    /// `double`
    EDouble,
    /// `java.lang.Double`
    EDoubleObject,
    /// `float`
    EFloat,
    /// `java.lang.Float`
    EFloatObject,
    /// `java.math.BigDecimal`
    EBigDecimal,
}

impl PrimitiveKind {
    /// Every primitive kind, in registration order
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::EBoolean,
        PrimitiveKind::EBooleanObject,
        PrimitiveKind::EString,
        PrimitiveKind::EInt,
        PrimitiveKind::EIntegerObject,
        PrimitiveKind::ELong,
        PrimitiveKind::ELongObject,
        PrimitiveKind::EBigInteger,
        PrimitiveKind::EShort,
        PrimitiveKind::EShortObject,
        PrimitiveKind::EByte,
        PrimitiveKind::EByteObject,
        PrimitiveKind::EDouble,
        PrimitiveKind::EDoubleObject,
        PrimitiveKind::EFloat,
        PrimitiveKind::EFloatObject,
        PrimitiveKind::EBigDecimal,
    ];

    /// Kinds accepted for boolean literals
    pub const BOOLEAN: &'static [PrimitiveKind] =
        &[PrimitiveKind::EBoolean, PrimitiveKind::EBooleanObject];

    /// Kinds accepted for string literals
    pub const STRING: &'static [PrimitiveKind] = &[PrimitiveKind::EString];

    /// Kinds accepted for integer literals
    pub const INTEGER: &'static [PrimitiveKind] = &[
        PrimitiveKind::EInt,
        PrimitiveKind::EIntegerObject,
        PrimitiveKind::ELong,
        PrimitiveKind::ELongObject,
        PrimitiveKind::EBigInteger,
        PrimitiveKind::EShort,
        PrimitiveKind::EShortObject,
        PrimitiveKind::EByte,
        PrimitiveKind::EByteObject,
    ];

    /// Kinds accepted for floating point literals
    pub const DOUBLE: &'static [PrimitiveKind] = &[
        PrimitiveKind::EDouble,
        PrimitiveKind::EDoubleObject,
        PrimitiveKind::EFloat,
        PrimitiveKind::EFloatObject,
        PrimitiveKind::EBigDecimal,
    ];

    /// Type name inside the `ecore` package
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::EBoolean => "EBoolean",
            PrimitiveKind::EBooleanObject => "EBooleanObject",
            PrimitiveKind::EString => "EString",
            PrimitiveKind::EInt => "EInt",
            PrimitiveKind::EIntegerObject => "EIntegerObject",
            PrimitiveKind::ELong => "ELong",
            PrimitiveKind::ELongObject => "ELongObject",
            PrimitiveKind::EBigInteger => "EBigInteger",
            PrimitiveKind::EShort => "EShort",
            PrimitiveKind::EShortObject => "EShortObject",
            PrimitiveKind::EByte => "EByte",
            PrimitiveKind::EByteObject => "EByteObject",
            PrimitiveKind::EDouble => "EDouble",
            PrimitiveKind::EDoubleObject => "EDoubleObject",
            PrimitiveKind::EFloat => "EFloat",
            PrimitiveKind::EFloatObject => "EFloatObject",
            PrimitiveKind::EBigDecimal => "EBigDecimal",
        }
    }

    /// Look up a kind by type name
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Structural identity of this kind's data type
    pub fn identity(&self) -> ClassifierIdentity {
        ClassifierIdentity::new(self.name(), ecore_namespace())
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Namespace chain of the built-in package
pub fn ecore_namespace() -> NamespaceChain {
    NamespaceChain::from_levels(vec![Namespace::new(
        ECORE_PACKAGE,
        ECORE_NS_PREFIX,
        ECORE_NS_URI,
    )])
}

/// Register the `ecore` package and its primitive types, returning the package.
///
/// Registering twice yields the already registered package.
pub fn register(schema: &mut Schema) -> PackageId {
    if let Some(existing) = schema.package_by_uri(ECORE_NS_URI) {
        return existing;
    }
    let package = schema.push_builtin_package(ECORE_PACKAGE, ECORE_NS_PREFIX, ECORE_NS_URI);
    for kind in PrimitiveKind::ALL {
        schema.push_builtin_data_type(package, kind.name());
    }
    package
}

impl Schema {
    /// Id of a built-in primitive type, if the `ecore` package is registered
    pub fn ecore(&self, kind: PrimitiveKind) -> Option<ClassifierId> {
        let package = self.package_by_uri(ECORE_NS_URI)?;
        self.package(package)?.classifier(kind.name())
    }

    fn push_builtin_package(&mut self, name: &str, prefix: &str, uri: &str) -> PackageId {
        let id = PackageId(self.packages.len());
        self.packages.push(Package {
            name: name.to_string(),
            ns_prefix: prefix.to_string(),
            ns_uri: uri.to_string(),
            super_package: None,
            location: None,
            classifiers: IndexMap::new(),
        });
        id
    }

    fn push_builtin_data_type(&mut self, package: PackageId, name: &str) {
        let id = ClassifierId(self.classifiers.len());
        self.packages[package.0].classifiers.insert(name.to_string(), id);
        self.classifiers.push(Classifier {
            name: name.to_string(),
            package: Some(package),
            kind: ClassifierKind::DataType,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_sets_are_disjoint() {
        let sets = [
            PrimitiveKind::BOOLEAN,
            PrimitiveKind::STRING,
            PrimitiveKind::INTEGER,
            PrimitiveKind::DOUBLE,
        ];
        let mut seen = HashSet::new();
        for set in sets {
            for kind in set {
                assert!(seen.insert(*kind), "{} in two sets", kind);
            }
        }
        assert_eq!(seen.len(), PrimitiveKind::ALL.len());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(PrimitiveKind::from_name("EInt"), Some(PrimitiveKind::EInt));
        assert_eq!(PrimitiveKind::from_name("EDate"), None);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut schema = Schema::new();
        let first = register(&mut schema);
        let second = register(&mut schema);
        assert_eq!(first, second);
        for kind in PrimitiveKind::ALL {
            let id = schema.ecore(kind).unwrap();
            assert_eq!(schema.classifier(id).unwrap().name, kind.name());
        }
    }

    #[test]
    fn test_ecore_absent() {
        let schema = Schema::new();
        assert_eq!(schema.ecore(PrimitiveKind::EString), None);
    }
}
