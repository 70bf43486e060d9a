//! Schema reflection queries
//!
//! Read-only questions the validator asks about a [`Schema`]. Every query accepts
//! ids that may be absent or foreign and answers conservatively instead of
//! panicking.

use super::{ClassifierId, ClassifierKind, FeatureId, FeatureKind, PrimitiveKind, Schema};
use crate::locations::ResourceUri;
use crate::namespaces::{Namespace, NamespaceChain};
use std::collections::HashSet;
use std::fmt;

/// Name of the universal object type every class conforms to
pub const UNIVERSAL_TYPE_NAME: &str = "EObject";

/// Structural identity of a classifier: its name plus its namespace chain.
///
/// Two classifiers with equal identities describe the same type even when they
/// come from independently loaded copies of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassifierIdentity {
    /// Classifier name
    pub name: String,
    /// Owning namespaces, innermost first
    pub namespaces: NamespaceChain,
}

impl ClassifierIdentity {
    /// Create a new identity
    pub fn new(name: impl Into<String>, namespaces: NamespaceChain) -> Self {
        Self {
            name: name.into(),
            namespaces,
        }
    }
}

impl fmt::Display for ClassifierIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespaces.innermost() {
            Some(ns) => write!(f, "{{{}}}{}", ns.uri, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Declared type of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    /// Any object conforms
    Universal,
    /// Instances of the class or one of its subclasses conform
    Class(ClassifierId),
}

impl Schema {
    /// Namespace chain of the package owning a classifier, innermost first
    pub fn namespace_chain(&self, classifier: ClassifierId) -> NamespaceChain {
        let mut levels = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.classifier(classifier).and_then(|c| c.package);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let Some(package) = self.package(id) else {
                break;
            };
            levels.push(Namespace::new(
                package.name.clone(),
                package.ns_prefix.clone(),
                package.ns_uri.clone(),
            ));
            current = package.super_package;
        }
        NamespaceChain::from_levels(levels)
    }

    /// Structural identity of a classifier
    pub fn identity(&self, classifier: ClassifierId) -> Option<ClassifierIdentity> {
        let c = self.classifier(classifier)?;
        Some(ClassifierIdentity::new(
            c.name.clone(),
            self.namespace_chain(classifier),
        ))
    }

    /// Compare a classifier of this schema with one of `other` structurally.
    ///
    /// Absent classifiers are equal only to each other.
    pub fn same_classifier(
        &self,
        classifier: Option<ClassifierId>,
        other: &Schema,
        other_classifier: Option<ClassifierId>,
    ) -> bool {
        match (classifier, other_classifier) {
            (None, None) => true,
            (Some(a), Some(b)) => match (self.identity(a), other.identity(b)) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }

    /// Check whether a classifier is one of the given primitive kinds.
    ///
    /// The comparison goes by name and namespace chain rather than by id, so data
    /// types from a duplicate `ecore` package still match. This accommodates
    /// loaders that produce such duplicates.
    pub fn is_primitive_kind(&self, classifier: Option<ClassifierId>, kinds: &[PrimitiveKind]) -> bool {
        let Some(identity) = classifier.and_then(|c| self.identity(c)) else {
            return false;
        };
        kinds.iter().any(|kind| kind.identity() == identity)
    }

    /// Check whether a classifier is an enumeration
    pub fn is_enum(&self, classifier: Option<ClassifierId>) -> bool {
        matches!(
            classifier.and_then(|c| self.classifier(c)).map(|c| &c.kind),
            Some(ClassifierKind::Enum(_))
        )
    }

    /// Check whether a classifier is a class
    pub fn is_class(&self, classifier: Option<ClassifierId>) -> bool {
        classifier.and_then(|c| self.class(c)).is_some()
    }

    /// Name of a classifier
    pub fn classifier_name(&self, classifier: ClassifierId) -> Option<&str> {
        self.classifier(classifier).map(|c| c.name.as_str())
    }

    /// Check whether a class can be instantiated (neither abstract nor an interface)
    pub fn is_instantiatable(&self, class: ClassifierId) -> bool {
        self.class(class)
            .map_or(false, |c| !c.is_abstract && !c.is_interface)
    }

    /// Check whether a feature is a reference (containment or not)
    pub fn is_reference_feature(&self, feature: FeatureId) -> bool {
        matches!(
            self.feature(feature).map(|f| f.kind),
            Some(FeatureKind::Reference { .. })
        )
    }

    /// Check whether a feature is a containment reference
    pub fn is_containment_feature(&self, feature: FeatureId) -> bool {
        matches!(
            self.feature(feature).map(|f| f.kind),
            Some(FeatureKind::Reference { containment: true })
        )
    }

    /// Check whether a feature is an attribute
    pub fn is_attribute_feature(&self, feature: FeatureId) -> bool {
        matches!(
            self.feature(feature).map(|f| f.kind),
            Some(FeatureKind::Attribute { .. })
        )
    }

    /// Check whether a feature holds a list of values
    pub fn is_many(&self, feature: FeatureId) -> bool {
        self.feature(feature)
            .map_or(false, |f| f.multiplicity.is_many())
    }

    /// Declared type of a feature
    pub fn feature_type(&self, feature: FeatureId) -> Option<ClassifierId> {
        self.feature(feature).and_then(|f| f.etype)
    }

    /// Name of a feature
    pub fn feature_name(&self, feature: FeatureId) -> Option<&str> {
        self.feature(feature).map(|f| f.name.as_str())
    }

    /// Declared reference type of a feature.
    ///
    /// Falls back to the universal type for attributes, untyped references and
    /// references typed by a non-class.
    pub fn reference_type(&self, feature: FeatureId) -> ReferenceType {
        match self.feature(feature) {
            Some(f) if matches!(f.kind, FeatureKind::Reference { .. }) => match f.etype {
                Some(etype) if self.is_class(Some(etype)) => ReferenceType::Class(etype),
                _ => ReferenceType::Universal,
            },
            _ => ReferenceType::Universal,
        }
    }

    /// Display name of a reference type
    pub fn reference_type_name(&self, reference_type: ReferenceType) -> &str {
        match reference_type {
            ReferenceType::Universal => UNIVERSAL_TYPE_NAME,
            ReferenceType::Class(class) => self.classifier_name(class).unwrap_or(UNIVERSAL_TYPE_NAME),
        }
    }

    /// All super types of a class, transitively, nearest first
    pub fn all_super_types(&self, class: ClassifierId) -> Vec<ClassifierId> {
        let mut result = Vec::new();
        let mut visited = HashSet::from([class]);
        let mut queue = vec![class];
        while let Some(current) = queue.pop() {
            let Some(c) = self.class(current) else {
                continue;
            };
            for &super_type in &c.super_types {
                if visited.insert(super_type) {
                    result.push(super_type);
                    queue.push(super_type);
                }
            }
        }
        result
    }

    /// All features of a class, inherited ones first
    pub fn all_features(&self, class: ClassifierId) -> Vec<FeatureId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        for owner in self.all_super_types(class).into_iter().rev().chain([class]) {
            if let Some(c) = self.class(owner) {
                for feature in c.own_features() {
                    if seen.insert(feature) {
                        result.push(feature);
                    }
                }
            }
        }
        result
    }

    /// Check whether `feature` is in the full inherited feature set of `class`
    pub fn owns_feature(&self, class: ClassifierId, feature: FeatureId) -> bool {
        let Some(owner) = self.feature(feature).map(|f| f.container) else {
            return false;
        };
        self.is_assignable(owner, class)
            && self
                .class(owner)
                .map_or(false, |c| c.own_features().any(|f| f == feature))
    }

    /// Look up a feature by name over all features of a class
    pub fn find_feature(&self, class: ClassifierId, name: &str) -> Option<FeatureId> {
        self.all_features(class)
            .into_iter()
            .rev()
            .find(|&f| self.feature_name(f) == Some(name))
    }

    /// Check whether `candidate` is `declared` or one of its subtypes
    pub fn is_assignable(&self, declared: ClassifierId, candidate: ClassifierId) -> bool {
        declared == candidate || self.all_super_types(candidate).contains(&declared)
    }

    /// Check whether `candidate` conforms to a reference type
    pub fn conforms_to(&self, reference_type: ReferenceType, candidate: ClassifierId) -> bool {
        match reference_type {
            ReferenceType::Universal => true,
            ReferenceType::Class(declared) => self.is_assignable(declared, candidate),
        }
    }

    /// Resource a classifier was loaded from, via its package or an enclosing one
    pub fn classifier_location(&self, classifier: ClassifierId) -> Option<&ResourceUri> {
        let mut visited = HashSet::new();
        let mut current = self.classifier(classifier).and_then(|c| c.package);
        while let Some(id) = current {
            if !visited.insert(id) {
                return None;
            }
            let package = self.package(id)?;
            if let Some(location) = &package.location {
                return Some(location);
            }
            current = package.super_package;
        }
        None
    }

    /// Find a classifier by qualified name (`package.sub.Name`) or unique simple name
    pub fn find_classifier(&self, qualified_name: &str) -> Option<ClassifierId> {
        let (path, name) = crate::names::split_qualified_name(qualified_name);
        let mut matches = self.classifiers().filter(|(id, c)| {
            c.name == name
                && (path.is_empty() || self.namespace_chain(*id).qualified_path() == path)
        });
        let first = matches.next().map(|(id, _)| id);
        if path.is_empty() && matches.next().is_some() {
            return None;
        }
        first
    }
}
