//! Reflective schema
//!
//! A [`Schema`] is the metamodel instance documents are checked against: packages
//! containing classifiers (data types, enumerations and classes), and classes
//! owning structural features. It is plain data, built once and then shared
//! read-only by any number of validation passes.
//!
//! Elements live in arenas and are addressed by copyable ids. Ids are only
//! meaningful for the schema that issued them.

pub mod ecore;
pub mod reflect;

pub use ecore::{PrimitiveKind, ECORE_NS_PREFIX, ECORE_NS_URI, ECORE_PACKAGE};
pub use reflect::{ClassifierIdentity, ReferenceType};

use crate::error::{Error, Result};
use crate::locations::ResourceUri;
use indexmap::IndexMap;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            /// Position in the owning arena
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Id of a [`Package`]
    PackageId
);
arena_id!(
    /// Id of a [`Classifier`]
    ClassifierId
);
arena_id!(
    /// Id of a [`StructuralFeature`]
    FeatureId
);

/// A namespace of classifiers
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Namespace prefix
    pub ns_prefix: String,
    /// Namespace URI
    pub ns_uri: String,
    /// Enclosing package
    pub super_package: Option<PackageId>,
    /// Resource the package was loaded from
    pub location: Option<ResourceUri>,
    classifiers: IndexMap<String, ClassifierId>,
}

impl Package {
    /// Classifiers declared directly in this package, in declaration order
    pub fn classifiers(&self) -> impl Iterator<Item = ClassifierId> + '_ {
        self.classifiers.values().copied()
    }

    /// Look up a classifier by simple name
    pub fn classifier(&self, name: &str) -> Option<ClassifierId> {
        self.classifiers.get(name).copied()
    }
}

/// Data type, enumeration or class
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Classifier name
    pub name: String,
    /// Owning package
    pub package: Option<PackageId>,
    /// What kind of classifier this is
    pub kind: ClassifierKind,
}

impl Classifier {
    /// Class details, if this classifier is a class
    pub fn as_class(&self) -> Option<&Class> {
        match &self.kind {
            ClassifierKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Enumeration literals, if this classifier is an enumeration
    pub fn enum_literals(&self) -> Option<&[String]> {
        match &self.kind {
            ClassifierKind::Enum(literals) => Some(literals),
            _ => None,
        }
    }
}

/// Classifier variants
#[derive(Debug, Clone)]
pub enum ClassifierKind {
    /// Primitive data type
    DataType,
    /// Enumeration with its literal names
    Enum(Vec<String>),
    /// Class
    Class(Class),
}

/// Class details
#[derive(Debug, Clone, Default)]
pub struct Class {
    /// Abstract classes cannot be instantiated
    pub is_abstract: bool,
    /// Interfaces cannot be instantiated
    pub is_interface: bool,
    /// Direct super types
    pub super_types: Vec<ClassifierId>,
    features: IndexMap<String, FeatureId>,
}

impl Class {
    /// Features declared directly on this class, in declaration order
    pub fn own_features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.features.values().copied()
    }
}

/// Feature multiplicity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    /// Minimum number of values
    pub lower: usize,
    /// Maximum number of values, `None` for unbounded
    pub upper: Option<usize>,
}

impl Multiplicity {
    /// `0..1`
    pub const OPTIONAL: Multiplicity = Multiplicity { lower: 0, upper: Some(1) };
    /// `1..1`
    pub const REQUIRED: Multiplicity = Multiplicity { lower: 1, upper: Some(1) };
    /// `0..*`
    pub const MANY: Multiplicity = Multiplicity { lower: 0, upper: None };
    /// `1..*`
    pub const AT_LEAST_ONE: Multiplicity = Multiplicity { lower: 1, upper: None };

    /// Create a multiplicity
    pub fn new(lower: usize, upper: Option<usize>) -> Self {
        Self { lower, upper }
    }

    /// Whether the feature holds a list of values
    pub fn is_many(&self) -> bool {
        self.upper.map_or(true, |upper| upper > 1)
    }

    /// Whether at least one value is required
    pub fn is_required(&self) -> bool {
        self.lower > 0
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{}..{}", self.lower, upper),
            None => write!(f, "{}..*", self.lower),
        }
    }
}

/// Attribute or relational feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Primitive-valued attribute
    Attribute {
        /// Whether the attribute identifies its object
        id: bool,
    },
    /// Reference to another object
    Reference {
        /// Whether the referenced objects are owned
        containment: bool,
    },
}

/// A named slot on a class
#[derive(Debug, Clone)]
pub struct StructuralFeature {
    /// Feature name
    pub name: String,
    /// Declaring class
    pub container: ClassifierId,
    /// Declared type
    pub etype: Option<ClassifierId>,
    /// Attribute or reference
    pub kind: FeatureKind,
    /// Multiplicity
    pub multiplicity: Multiplicity,
}

/// Arena of packages, classifiers and features
#[derive(Debug, Clone, Default)]
pub struct Schema {
    packages: Vec<Package>,
    classifiers: Vec<Classifier>,
    features: Vec<StructuralFeature>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema with the built-in `ecore` package registered
    pub fn with_ecore() -> Self {
        let mut schema = Self::new();
        ecore::register(&mut schema);
        schema
    }

    /// Get a package
    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.0)
    }

    /// Get a classifier
    pub fn classifier(&self, id: ClassifierId) -> Option<&Classifier> {
        self.classifiers.get(id.0)
    }

    /// Get a feature
    pub fn feature(&self, id: FeatureId) -> Option<&StructuralFeature> {
        self.features.get(id.0)
    }

    /// All packages
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages.iter().enumerate().map(|(i, p)| (PackageId(i), p))
    }

    /// All classifiers
    pub fn classifiers(&self) -> impl Iterator<Item = (ClassifierId, &Classifier)> {
        self.classifiers
            .iter()
            .enumerate()
            .map(|(i, c)| (ClassifierId(i), c))
    }

    /// Find a package by namespace URI
    pub fn package_by_uri(&self, uri: &str) -> Option<PackageId> {
        self.packages
            .iter()
            .position(|p| p.ns_uri == uri)
            .map(PackageId)
    }

    /// Register a package
    pub fn add_package(
        &mut self,
        name: impl Into<String>,
        ns_prefix: impl Into<String>,
        ns_uri: impl Into<String>,
        super_package: Option<PackageId>,
    ) -> Result<PackageId> {
        if let Some(parent) = super_package {
            self.package(parent)
                .ok_or_else(|| Error::Schema(format!("unknown super package #{}", parent.0)))?;
        }
        let id = PackageId(self.packages.len());
        self.packages.push(Package {
            name: name.into(),
            ns_prefix: ns_prefix.into(),
            ns_uri: ns_uri.into(),
            super_package,
            location: None,
            classifiers: IndexMap::new(),
        });
        Ok(id)
    }

    /// Record the resource a package was loaded from
    pub fn set_package_location(&mut self, package: PackageId, location: ResourceUri) -> Result<()> {
        let pkg = self
            .packages
            .get_mut(package.0)
            .ok_or_else(|| Error::Schema(format!("unknown package #{}", package.0)))?;
        pkg.location = Some(location);
        Ok(())
    }

    /// Add a primitive data type
    pub fn add_data_type(&mut self, package: PackageId, name: impl Into<String>) -> Result<ClassifierId> {
        self.add_classifier(package, name.into(), ClassifierKind::DataType)
    }

    /// Add an enumeration
    pub fn add_enum<S: Into<String>>(
        &mut self,
        package: PackageId,
        name: impl Into<String>,
        literals: impl IntoIterator<Item = S>,
    ) -> Result<ClassifierId> {
        let literals = literals.into_iter().map(Into::into).collect();
        self.add_classifier(package, name.into(), ClassifierKind::Enum(literals))
    }

    /// Add a concrete class
    pub fn add_class(&mut self, package: PackageId, name: impl Into<String>) -> Result<ClassifierId> {
        self.add_classifier(package, name.into(), ClassifierKind::Class(Class::default()))
    }

    /// Add an abstract class
    pub fn add_abstract_class(
        &mut self,
        package: PackageId,
        name: impl Into<String>,
    ) -> Result<ClassifierId> {
        let class = Class {
            is_abstract: true,
            ..Class::default()
        };
        self.add_classifier(package, name.into(), ClassifierKind::Class(class))
    }

    /// Add an interface
    pub fn add_interface(&mut self, package: PackageId, name: impl Into<String>) -> Result<ClassifierId> {
        let class = Class {
            is_abstract: true,
            is_interface: true,
            ..Class::default()
        };
        self.add_classifier(package, name.into(), ClassifierKind::Class(class))
    }

    fn add_classifier(
        &mut self,
        package: PackageId,
        name: String,
        kind: ClassifierKind,
    ) -> Result<ClassifierId> {
        let id = ClassifierId(self.classifiers.len());
        let pkg = self
            .packages
            .get_mut(package.0)
            .ok_or_else(|| Error::Schema(format!("unknown package #{}", package.0)))?;
        if pkg.classifiers.contains_key(&name) {
            return Err(Error::Schema(format!(
                "duplicate classifier '{}' in package '{}'",
                name, pkg.name
            )));
        }
        pkg.classifiers.insert(name.clone(), id);
        self.classifiers.push(Classifier {
            name,
            package: Some(package),
            kind,
        });
        Ok(id)
    }

    /// Add `super_type` to the direct super types of `class`
    pub fn add_super_type(&mut self, class: ClassifierId, super_type: ClassifierId) -> Result<()> {
        if self.class(super_type).is_none() {
            return Err(Error::Schema(format!(
                "super type #{} is not a class",
                super_type.0
            )));
        }
        if class == super_type || self.is_assignable(class, super_type) {
            return Err(Error::Schema(format!(
                "adding super type #{} to #{} creates a cycle",
                super_type.0, class.0
            )));
        }
        self.class_mut(class)?.super_types.push(super_type);
        Ok(())
    }

    /// Add an attribute to `class`
    pub fn add_attribute(
        &mut self,
        class: ClassifierId,
        name: impl Into<String>,
        etype: Option<ClassifierId>,
        multiplicity: Multiplicity,
    ) -> Result<FeatureId> {
        self.add_feature(class, name.into(), etype, FeatureKind::Attribute { id: false }, multiplicity)
    }

    /// Add an ID attribute to `class`
    pub fn add_id_attribute(
        &mut self,
        class: ClassifierId,
        name: impl Into<String>,
        etype: Option<ClassifierId>,
    ) -> Result<FeatureId> {
        self.add_feature(
            class,
            name.into(),
            etype,
            FeatureKind::Attribute { id: true },
            Multiplicity::OPTIONAL,
        )
    }

    /// Add a non-containment reference to `class`
    pub fn add_reference(
        &mut self,
        class: ClassifierId,
        name: impl Into<String>,
        etype: Option<ClassifierId>,
        multiplicity: Multiplicity,
    ) -> Result<FeatureId> {
        self.add_feature(
            class,
            name.into(),
            etype,
            FeatureKind::Reference { containment: false },
            multiplicity,
        )
    }

    /// Add a containment reference to `class`
    pub fn add_containment(
        &mut self,
        class: ClassifierId,
        name: impl Into<String>,
        etype: Option<ClassifierId>,
        multiplicity: Multiplicity,
    ) -> Result<FeatureId> {
        self.add_feature(
            class,
            name.into(),
            etype,
            FeatureKind::Reference { containment: true },
            multiplicity,
        )
    }

    fn add_feature(
        &mut self,
        class: ClassifierId,
        name: String,
        etype: Option<ClassifierId>,
        kind: FeatureKind,
        multiplicity: Multiplicity,
    ) -> Result<FeatureId> {
        if let Some(etype) = etype {
            self.classifier(etype)
                .ok_or_else(|| Error::Schema(format!("unknown feature type #{}", etype.0)))?;
        }
        let id = FeatureId(self.features.len());
        let target = self.class_mut(class)?;
        if target.features.contains_key(&name) {
            return Err(Error::Schema(format!("duplicate feature '{}'", name)));
        }
        target.features.insert(name.clone(), id);
        self.features.push(StructuralFeature {
            name,
            container: class,
            etype,
            kind,
            multiplicity,
        });
        Ok(id)
    }

    /// Class details of a classifier
    pub fn class(&self, id: ClassifierId) -> Option<&Class> {
        self.classifier(id).and_then(Classifier::as_class)
    }

    fn class_mut(&mut self, id: ClassifierId) -> Result<&mut Class> {
        match self.classifiers.get_mut(id.0).map(|c| &mut c.kind) {
            Some(ClassifierKind::Class(class)) => Ok(class),
            _ => Err(Error::Schema(format!("classifier #{} is not a class", id.0))),
        }
    }
}
