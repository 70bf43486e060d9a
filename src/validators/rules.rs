//! Structural rules
//!
//! The [`RuleEngine`] walks a document depth-first in source order and runs the
//! object, feature and value rules against every node. Rules are independent of
//! each other: any number of them can report on the same node, and a feature that
//! did not resolve simply switches off the rules that depend on it.

use super::attributes::AttributeTypeChecker;
use super::diagnostics::{Diagnostic, DiagnosticCode, Slot};
use super::validation::CancellationToken;
use crate::error::{LookupFailure, Result};
use crate::instance::{Document, NodeId, Reference, ReferenceTarget, Resolution, Value};
use crate::limits::ValidatorConfig;
use crate::names;
use crate::schema::{ClassifierId, FeatureId, Schema};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Diagnostics and lookup failures collected by one pass
#[derive(Debug, Clone, Default)]
pub struct LocalFindings {
    /// Rule diagnostics, in visit order
    pub diagnostics: Vec<Diagnostic>,
    /// Nodes that could not be checked
    pub failures: Vec<LookupFailure>,
}

impl LocalFindings {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn fail(&mut self, failure: LookupFailure) {
        warn!(%failure, "lookup failure, node skipped");
        self.failures.push(failure);
    }
}

/// Runs the structural rules over a document
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'a> {
    schema: &'a Schema,
    config: &'a ValidatorConfig,
    attributes: AttributeTypeChecker,
}

impl<'a> RuleEngine<'a> {
    /// Create an engine for a schema
    pub fn new(schema: &'a Schema, config: &'a ValidatorConfig) -> Self {
        Self {
            schema,
            config,
            attributes: AttributeTypeChecker,
        }
    }

    /// Run every rule over every node of the document.
    ///
    /// Fails only if the pass is cancelled or the document exceeds the configured
    /// limits.
    pub fn run(&self, document: &Document, cancel: &CancellationToken) -> Result<LocalFindings> {
        debug!(uri = %document.uri(), nodes = document.len(), "running structural rules");
        let mut walk = Walk {
            cancel,
            visited: 0,
            findings: LocalFindings::default(),
        };
        if let Some(root) = document.root() {
            self.visit_object(document, root, 0, &mut walk)?;
        }
        debug!(
            objects = walk.visited,
            diagnostics = walk.findings.diagnostics.len(),
            failures = walk.findings.failures.len(),
            "structural rules done"
        );
        Ok(walk.findings)
    }

    fn visit_object(&self, document: &Document, object: NodeId, depth: usize, walk: &mut Walk<'_>) -> Result<()> {
        walk.cancel.check()?;
        self.config.limits.check_depth(depth)?;
        walk.visited += 1;
        self.config.limits.check_objects(walk.visited)?;
        trace!(node = %object, depth, "visiting object");

        let class = self.check_object(document, object, &mut walk.findings);
        let Some(new_object) = document.object(object) else {
            return Ok(());
        };
        for &feature in &new_object.features {
            self.check_feature(document, feature, class, &mut walk.findings);
            if let Some(value) = document.feature(feature).and_then(|f| f.value) {
                self.visit_value(document, value, depth, walk)?;
            }
        }
        Ok(())
    }

    fn visit_value(&self, document: &Document, value: NodeId, depth: usize, walk: &mut Walk<'_>) -> Result<()> {
        self.check_value(document, value, &mut walk.findings);
        match document.value(value) {
            Some(Value::Containment(nested)) => self.visit_object(document, *nested, depth + 1, walk),
            Some(Value::Multi(elements)) => {
                for &element in elements {
                    self.visit_value(document, element, depth, walk)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Object rules: duplicate features, instantiability, naming and placement.
    ///
    /// Returns the declared or inferred class of the object.
    pub fn check_object(&self, document: &Document, object: NodeId, out: &mut LocalFindings) -> Option<ClassifierId> {
        let new_object = document.object(object)?;
        let class = match document.class_of(self.schema, object) {
            Ok(class) => class,
            Err(failure) => {
                out.fail(failure);
                None
            }
        };

        let mut seen = HashSet::new();
        for (index, &assignment) in new_object.features.iter().enumerate() {
            let Some(feature) = document.feature(assignment).and_then(|f| f.feature.get()) else {
                continue;
            };
            if !seen.insert(feature) {
                out.report(
                    Diagnostic::error(format!("Duplicate feature '{}'", self.feature_name(feature)))
                        .on(object, Slot::ObjectFeatures)
                        .at_index(index),
                );
            }
        }

        if let Some(class) = class {
            if !self.schema.is_instantiatable(class) {
                out.report(
                    Diagnostic::error("Abstract classes or interfaces cannot be instantiated")
                        .on(object, Slot::ObjectClass),
                );
            }
        }

        if let Some(name) = &new_object.name {
            if names::is_blank(name) {
                out.report(Diagnostic::error("Name cannot be blank").on(object, Slot::ObjectName));
            }
            if let Some(class) = class {
                if names::name_attribute(self.schema, class, &self.config.name_attribute).is_none() {
                    out.report(
                        Diagnostic::error(format!("Cannot name {}", self.class_name(class)))
                            .on(object, Slot::ObjectName)
                            .with_code(DiagnosticCode::CannotName),
                    );
                }
            }
        }

        if self.config.check_placement {
            if let Some(location) = class.and_then(|c| self.schema.classifier_location(c)) {
                if location.is_in_same_project(document.uri()) {
                    out.report(
                        Diagnostic::error(format!(
                            "Class must be in a different project than the document \
                             (so that it gets indexed first): {}",
                            class.map(|c| self.class_name(c)).unwrap_or_default()
                        ))
                        .on(object, Slot::ObjectClass)
                        .with_code(DiagnosticCode::SameProject),
                    );
                }
            }
        }
        class
    }

    /// Feature rules: cardinality, ownership by `class` and presence of a value.
    ///
    /// Nothing is checked for an assignment whose feature did not resolve.
    pub fn check_feature(
        &self,
        document: &Document,
        assignment: NodeId,
        class: Option<ClassifierId>,
        out: &mut LocalFindings,
    ) {
        let Some(feature_assignment) = document.feature(assignment) else {
            return;
        };
        let Some(feature) = feature_assignment.feature.get() else {
            return;
        };
        let name = self.feature_name(feature);

        if let Some(value) = feature_assignment.value {
            let is_list = matches!(document.value(value), Some(Value::Multi(_)));
            match (is_list, self.schema.is_many(feature)) {
                (true, false) => out.report(
                    Diagnostic::error(
                        "Cannot assign multiple elements to a feature with cardinality 1 (remove [...])",
                    )
                    .on(assignment, Slot::FeatureValue),
                ),
                (false, true) => out.report(
                    Diagnostic::error(
                        "Cannot assign a single element to a feature with cardinality >1 (use [...])",
                    )
                    .on(assignment, Slot::FeatureValue),
                ),
                _ => {}
            }
        }

        if let Some(class) = class {
            if !self.schema.owns_feature(class, feature) {
                out.report(
                    Diagnostic::error(format!("{} has no feature {}", self.class_name(class), name))
                        .on(assignment, Slot::FeatureTarget),
                );
            }
        }

        if feature_assignment.value.is_none() {
            out.report(
                Diagnostic::error(format!("Feature missing value: {}", name)).on(assignment, Slot::FeatureValue),
            );
        }
    }

    /// Value rules for one value node; list elements are checked separately
    pub fn check_value(&self, document: &Document, value: NodeId, out: &mut LocalFindings) {
        match document.value(value) {
            Some(Value::Attribute(_)) => {
                if let Some(feature) = self.assigned_feature(document, value, out) {
                    self.check_attribute(document, value, feature, out);
                }
            }
            Some(Value::Reference(reference)) => {
                if let Some(feature) = self.assigned_feature(document, value, out) {
                    self.check_reference(document, value, reference, feature, out);
                }
            }
            Some(Value::Containment(nested)) => {
                if let Some(feature) = self.assigned_feature(document, value, out) {
                    self.check_containment(document, value, *nested, feature, out);
                }
            }
            Some(Value::Multi(_)) | None => {}
        }
    }

    fn check_attribute(&self, document: &Document, value: NodeId, feature: FeatureId, out: &mut LocalFindings) {
        if self.schema.is_reference_feature(feature) {
            out.report(Diagnostic::error("Value must be an attribute but is a reference").on_node(Some(value)));
        }
        for mismatch in self
            .attributes
            .check(self.schema, self.schema.feature_type(feature), document, value)
        {
            out.report(mismatch.into_diagnostic());
        }
    }

    fn check_reference(
        &self,
        document: &Document,
        value: NodeId,
        reference: &Reference,
        feature: FeatureId,
        out: &mut LocalFindings,
    ) {
        if !self.schema.is_reference_feature(feature) {
            out.report(
                Diagnostic::error("Value must be a reference but is an attribute").on(value, Slot::ReferenceValue),
            );
        }
        if self.schema.is_containment_feature(feature) {
            out.report(
                Diagnostic::error("Value must be a reference but is a containment").on(value, Slot::ReferenceValue),
            );
        }

        let reference_type = self.schema.reference_type(feature);
        let candidate = match &reference.target {
            Resolution::Unresolved => {
                out.report(
                    Diagnostic::error(format!(
                        "Unknown {}: {}",
                        self.schema.reference_type_name(reference_type),
                        reference.text
                    ))
                    .on(value, Slot::ReferenceValue)
                    .with_code(DiagnosticCode::Linking),
                );
                return;
            }
            Resolution::Absent => return,
            Resolution::Resolved(ReferenceTarget::External { class }) => Some(*class),
            Resolution::Resolved(ReferenceTarget::Local(target)) => match document.class_of(self.schema, *target) {
                Ok(class) => class,
                Err(failure) => {
                    out.fail(failure);
                    None
                }
            },
        };
        if let Some(candidate) = candidate {
            if !self.schema.conforms_to(reference_type, candidate) {
                out.report(
                    Diagnostic::error(format!(
                        "Wrong type. Expected instance of '{}'",
                        self.schema.reference_type_name(reference_type)
                    ))
                    .on(value, Slot::ReferenceValue),
                );
            }
        }
    }

    fn check_containment(
        &self,
        document: &Document,
        value: NodeId,
        nested: NodeId,
        feature: FeatureId,
        out: &mut LocalFindings,
    ) {
        if !self.schema.is_containment_feature(feature) {
            out.report(
                Diagnostic::error("Value must be a new object but is a reference").on(value, Slot::FeatureValue),
            );
        }
        let declared = document.object(nested).and_then(|o| o.class.get());
        let expected = self.schema.feature_type(feature).filter(|&t| self.schema.is_class(Some(t)));
        if let (Some(declared), Some(expected)) = (declared, expected) {
            if !self.schema.is_assignable(expected, declared) {
                out.report(
                    Diagnostic::error(format!("Wrong type. Expected instance of '{}'", self.class_name(expected)))
                        .on(value, Slot::ContainmentValue),
                );
            }
        }
    }

    /// Resolved schema feature of the assignment owning a value
    fn assigned_feature(&self, document: &Document, value: NodeId, out: &mut LocalFindings) -> Option<FeatureId> {
        match document.owning_feature(value) {
            Ok(assignment) => document.feature(assignment).and_then(|f| f.feature.get()),
            Err(failure) => {
                out.fail(failure);
                None
            }
        }
    }

    fn feature_name(&self, feature: FeatureId) -> &str {
        self.schema.feature_name(feature).unwrap_or("???")
    }

    fn class_name(&self, class: ClassifierId) -> &str {
        self.schema.classifier_name(class).unwrap_or("???")
    }
}

struct Walk<'c> {
    cancel: &'c CancellationToken,
    visited: usize,
    findings: LocalFindings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::instance::{ElementLiteral, FeatureLiteral, ObjectLiteral, ReferenceLiteral, ValueLiteral};
    use crate::limits::Limits;
    use crate::locations::ResourceUri;
    use crate::schema::{Multiplicity, PrimitiveKind};
    use pretty_assertions::assert_eq;

    struct Shop {
        schema: Schema,
        item: ClassifierId,
        gadget: ClassifierId,
        shelf: ClassifierId,
        product: ClassifierId,
        name: FeatureId,
        price: FeatureId,
        tags: FeatureId,
        items: FeatureId,
        featured: FeatureId,
        favourite: FeatureId,
        sku: FeatureId,
    }

    fn shop() -> Shop {
        let mut schema = Schema::with_ecore();
        let string = schema.ecore(PrimitiveKind::EString);
        let int = schema.ecore(PrimitiveKind::EInt);
        let pkg = schema.add_package("shop", "shop", "http://example.org/shop", None).unwrap();
        schema
            .set_package_location(pkg, ResourceUri::platform_resource("model", "shop.ecore").unwrap())
            .unwrap();
        let product = schema.add_abstract_class(pkg, "Product").unwrap();
        let name = schema.add_attribute(product, "name", string, Multiplicity::OPTIONAL).unwrap();
        let price = schema.add_attribute(product, "price", int, Multiplicity::OPTIONAL).unwrap();
        let tags = schema.add_attribute(product, "tags", string, Multiplicity::MANY).unwrap();
        let item = schema.add_class(pkg, "Item").unwrap();
        schema.add_super_type(item, product).unwrap();
        let gadget = schema.add_class(pkg, "Gadget").unwrap();
        let sku = schema.add_attribute(gadget, "sku", int, Multiplicity::OPTIONAL).unwrap();
        let shelf = schema.add_class(pkg, "Shelf").unwrap();
        let items = schema.add_containment(shelf, "items", Some(product), Multiplicity::MANY).unwrap();
        let featured = schema.add_containment(shelf, "featured", Some(item), Multiplicity::OPTIONAL).unwrap();
        let favourite = schema.add_reference(shelf, "favourite", Some(item), Multiplicity::OPTIONAL).unwrap();
        Shop {
            schema,
            item,
            gadget,
            shelf,
            product,
            name,
            price,
            tags,
            items,
            featured,
            favourite,
            sku,
        }
    }

    fn document(root: ObjectLiteral) -> Document {
        Document::from_literal(ResourceUri::platform_resource("docs", "shelf.eson").unwrap(), root)
    }

    fn run(shop: &Shop, root: ObjectLiteral) -> LocalFindings {
        let config = ValidatorConfig::default();
        RuleEngine::new(&shop.schema, &config)
            .run(&document(root), &CancellationToken::new())
            .unwrap()
    }

    fn messages(findings: &LocalFindings) -> Vec<&str> {
        findings.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_valid_document_is_clean() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf)
                .with(FeatureLiteral::set(
                    s.items,
                    ValueLiteral::multi(vec![ElementLiteral::contain(
                        ObjectLiteral::of(s.item)
                            .named("pen")
                            .with(FeatureLiteral::set(s.price, ValueLiteral::int(3)))
                            .with(FeatureLiteral::set(s.tags, ValueLiteral::multi(vec![ElementLiteral::string("a")]))),
                    )]),
                ))
                .with(FeatureLiteral::set(s.favourite, ValueLiteral::reference(ReferenceLiteral::to("pen")))),
        );
        assert_eq!(messages(&findings), Vec::<&str>::new());
        assert!(findings.failures.is_empty());
    }

    #[test]
    fn test_duplicate_feature_at_second_occurrence() {
        let s = shop();
        let root = document(
            ObjectLiteral::of(s.item)
                .with(FeatureLiteral::set(s.price, ValueLiteral::int(1)))
                .with(FeatureLiteral::unresolved(ValueLiteral::int(2)))
                .with(FeatureLiteral::unresolved(ValueLiteral::int(2)))
                .with(FeatureLiteral::set(s.price, ValueLiteral::int(3))),
        );
        let config = ValidatorConfig::default();
        let findings = RuleEngine::new(&s.schema, &config)
            .run(&root, &CancellationToken::new())
            .unwrap();
        assert_eq!(messages(&findings), vec!["Duplicate feature 'price'"]);
        let d = &findings.diagnostics[0];
        assert_eq!(d.node, root.root());
        assert_eq!(d.slot, Some(Slot::ObjectFeatures));
        assert_eq!(d.index, Some(3));
    }

    #[test]
    fn test_abstract_class() {
        let s = shop();
        let findings = run(&s, ObjectLiteral::of(s.product));
        assert_eq!(
            messages(&findings),
            vec!["Abstract classes or interfaces cannot be instantiated"]
        );
    }

    #[test]
    fn test_naming() {
        let s = shop();
        let blank = run(&s, ObjectLiteral::of(s.item).named("   "));
        assert_eq!(messages(&blank), vec!["Name cannot be blank"]);

        let unnameable = run(&s, ObjectLiteral::of(s.gadget).named("g"));
        assert_eq!(messages(&unnameable), vec!["Cannot name Gadget"]);
        assert_eq!(unnameable.diagnostics[0].code, Some(DiagnosticCode::CannotName));

        let both = run(&s, ObjectLiteral::of(s.gadget).named(""));
        assert_eq!(messages(&both), vec!["Name cannot be blank", "Cannot name Gadget"]);

        let fine = run(&s, ObjectLiteral::of(s.item).named("pen"));
        assert!(fine.diagnostics.is_empty());
    }

    #[test]
    fn test_same_project_placement() {
        let s = shop();
        let config = ValidatorConfig::default();
        let engine = RuleEngine::new(&s.schema, &config);
        let same = Document::from_literal(
            ResourceUri::platform_resource("model", "items.eson").unwrap(),
            ObjectLiteral::of(s.item),
        );
        let findings = engine.run(&same, &CancellationToken::new()).unwrap();
        assert_eq!(findings.diagnostics.len(), 1);
        assert_eq!(findings.diagnostics[0].code, Some(DiagnosticCode::SameProject));
        assert_eq!(findings.diagnostics[0].slot, Some(Slot::ObjectClass));

        let unchecked = ValidatorConfig::default().with_placement_check(false);
        let findings = RuleEngine::new(&s.schema, &unchecked)
            .run(&same, &CancellationToken::new())
            .unwrap();
        assert!(findings.diagnostics.is_empty());
    }

    #[test]
    fn test_cardinality() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.item)
                .with(FeatureLiteral::set(s.price, ValueLiteral::multi(vec![ElementLiteral::int(1)])))
                .with(FeatureLiteral::set(s.tags, ValueLiteral::string("x"))),
        );
        assert_eq!(
            messages(&findings),
            vec![
                "Cannot assign multiple elements to a feature with cardinality 1 (remove [...])",
                "Cannot assign a single element to a feature with cardinality >1 (use [...])",
            ]
        );
    }

    #[test]
    fn test_feature_not_owned_and_missing_value() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.item)
                .with(FeatureLiteral::set(s.sku, ValueLiteral::int(1)))
                .with(FeatureLiteral::missing(s.name)),
        );
        assert_eq!(
            messages(&findings),
            vec!["Item has no feature sku", "Feature missing value: name"]
        );
        assert_eq!(findings.diagnostics[0].slot, Some(Slot::FeatureTarget));
    }

    #[test]
    fn test_unresolved_feature_switches_off_feature_rules() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.item).with(FeatureLiteral::new(Resolution::Unresolved, None)),
        );
        assert!(findings.diagnostics.is_empty());
    }

    #[test]
    fn test_reference_to_containment_and_attribute() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf)
                .with(FeatureLiteral::set(
                    s.featured,
                    ValueLiteral::reference(ReferenceLiteral::external("other", s.item)),
                ))
                .with(FeatureLiteral::set(
                    s.items,
                    ValueLiteral::multi(vec![ElementLiteral::contain(
                        ObjectLiteral::of(s.item)
                            .with(FeatureLiteral::set(s.name, ValueLiteral::reference(ReferenceLiteral::external("x", s.item)))),
                    )]),
                )),
        );
        assert_eq!(
            messages(&findings),
            vec![
                "Value must be a reference but is a containment",
                "Value must be a reference but is an attribute",
            ]
        );
    }

    #[test]
    fn test_containment_into_reference() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf).with(FeatureLiteral::set(
                s.favourite,
                ValueLiteral::contain(ObjectLiteral::of(s.item)),
            )),
        );
        assert_eq!(messages(&findings), vec!["Value must be a new object but is a reference"]);
    }

    #[test]
    fn test_containment_into_attribute() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.item).with(FeatureLiteral::set(
                s.name,
                ValueLiteral::contain(ObjectLiteral::of(s.item)),
            )),
        );
        assert_eq!(messages(&findings), vec!["Value must be a new object but is a reference"]);
        assert_eq!(findings.diagnostics[0].slot, Some(Slot::FeatureValue));
    }

    #[test]
    fn test_containment_wrong_type() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf).with(FeatureLiteral::set(
                s.featured,
                ValueLiteral::contain(ObjectLiteral::of(s.gadget)),
            )),
        );
        assert_eq!(messages(&findings), vec!["Wrong type. Expected instance of 'Item'"]);
        assert_eq!(findings.diagnostics[0].slot, Some(Slot::ContainmentValue));
    }

    #[test]
    fn test_unresolved_reference_reports_linking_only() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf).with(FeatureLiteral::set(
                s.favourite,
                ValueLiteral::reference(ReferenceLiteral::to("nowhere")),
            )),
        );
        assert_eq!(messages(&findings), vec!["Unknown Item: nowhere"]);
        assert_eq!(findings.diagnostics[0].code, Some(DiagnosticCode::Linking));
    }

    #[test]
    fn test_reference_wrong_type() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf)
                .with(FeatureLiteral::set(
                    s.favourite,
                    ValueLiteral::reference(ReferenceLiteral::external("gizmo", s.gadget)),
                )),
        );
        assert_eq!(messages(&findings), vec!["Wrong type. Expected instance of 'Item'"]);
    }

    #[test]
    fn test_attribute_rules() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf)
                .with(FeatureLiteral::set(s.favourite, ValueLiteral::string("pen")))
                .with(FeatureLiteral::set(
                    s.items,
                    ValueLiteral::multi(vec![ElementLiteral::contain(
                        ObjectLiteral::of(s.item).with(FeatureLiteral::set(
                            s.tags,
                            ValueLiteral::multi(vec![ElementLiteral::int(1), ElementLiteral::string("ok"), ElementLiteral::int(2)]),
                        )),
                    )]),
                )),
        );
        let codes: Vec<_> = findings.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                None,
                Some(DiagnosticCode::BadType),
                Some(DiagnosticCode::BadType),
                Some(DiagnosticCode::BadType),
            ]
        );
        assert_eq!(findings.diagnostics[0].message, "Value must be an attribute but is a reference");
        assert_eq!(findings.diagnostics[0].slot, None);
        assert!(findings.diagnostics[1].message.ends_with("but was Item"));
    }

    #[test]
    fn test_inferred_class_is_checked() {
        let s = shop();
        let findings = run(
            &s,
            ObjectLiteral::of(s.shelf).with(FeatureLiteral::set(
                s.items,
                ValueLiteral::multi(vec![ElementLiteral::contain(ObjectLiteral::inferred().named("p"))]),
            )),
        );
        assert_eq!(
            messages(&findings),
            vec!["Abstract classes or interfaces cannot be instantiated"]
        );
    }

    #[test]
    fn test_detached_value_is_a_lookup_failure() {
        let s = shop();
        let mut doc = document(
            ObjectLiteral::of(s.item).with(FeatureLiteral::set(s.price, ValueLiteral::string("x"))),
        );
        let feature = doc.object(doc.root().unwrap()).unwrap().features[0];
        let value = doc.feature(feature).unwrap().value.unwrap();
        doc.detach(value);

        let config = ValidatorConfig::default();
        let findings = RuleEngine::new(&s.schema, &config)
            .run(&doc, &CancellationToken::new())
            .unwrap();
        assert!(findings.diagnostics.is_empty());
        assert_eq!(findings.failures.len(), 1);
        assert_eq!(findings.failures[0].node, Some(value.index()));
    }

    #[test]
    fn test_limits_and_cancellation() {
        let s = shop();
        let doc = document(ObjectLiteral::of(s.shelf).with(FeatureLiteral::set(
            s.featured,
            ValueLiteral::contain(ObjectLiteral::of(s.item)),
        )));
        let shallow = ValidatorConfig::default().with_limits(Limits {
            max_depth: 0,
            ..Limits::default()
        });
        let result = RuleEngine::new(&s.schema, &shallow).run(&doc, &CancellationToken::new());
        assert!(matches!(result, Err(Error::LimitExceeded(_))));

        let config = ValidatorConfig::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = RuleEngine::new(&s.schema, &config).run(&doc, &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
