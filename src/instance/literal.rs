//! Literal trees
//!
//! An [`ObjectLiteral`] is the owned, nested form of a document as a parser
//! produces it. [`Document::from_literal`] lowers it into the node arena and
//! resolves cross-references to named objects of the same document.

use super::{
    AttributeLiteral, Document, FeatureAssignment, NewObject, NodeId, NodeKind, Reference,
    ReferenceTarget, Resolution, Value,
};
use crate::locations::{ResourceUri, Span};
use crate::schema::{ClassifierId, FeatureId};

/// Object construction literal
#[derive(Debug, Clone)]
pub struct ObjectLiteral {
    /// Declared name
    pub name: Option<String>,
    /// Declared class
    pub class: Resolution<ClassifierId>,
    /// Feature assignments
    pub features: Vec<FeatureLiteral>,
    /// Source region
    pub span: Option<Span>,
}

impl ObjectLiteral {
    /// Object declaring `class`
    pub fn of(class: ClassifierId) -> Self {
        Self::with_class(Resolution::Resolved(class))
    }

    /// Object without a declared class
    pub fn inferred() -> Self {
        Self::with_class(Resolution::Absent)
    }

    /// Object declaring a class that did not resolve
    pub fn unresolved_class() -> Self {
        Self::with_class(Resolution::Unresolved)
    }

    /// Object with the given class resolution
    pub fn with_class(class: Resolution<ClassifierId>) -> Self {
        Self {
            name: None,
            class,
            features: Vec::new(),
            span: None,
        }
    }

    /// Set the declared name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a feature assignment
    pub fn with(mut self, feature: FeatureLiteral) -> Self {
        self.features.push(feature);
        self
    }

    /// Set the source region
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Feature assignment literal
#[derive(Debug, Clone)]
pub struct FeatureLiteral {
    /// Assigned feature
    pub feature: Resolution<FeatureId>,
    /// Assigned value
    pub value: Option<ValueLiteral>,
    /// Source region of the whole assignment
    pub span: Option<Span>,
    /// Source region of the value
    pub value_span: Option<Span>,
}

impl FeatureLiteral {
    /// Assign `value` to a resolved feature
    pub fn set(feature: FeatureId, value: ValueLiteral) -> Self {
        Self::new(Resolution::Resolved(feature), Some(value))
    }

    /// Assignment to a resolved feature without a value
    pub fn missing(feature: FeatureId) -> Self {
        Self::new(Resolution::Resolved(feature), None)
    }

    /// Assign `value` to a feature name that did not resolve
    pub fn unresolved(value: ValueLiteral) -> Self {
        Self::new(Resolution::Unresolved, Some(value))
    }

    /// Assignment with explicit parts
    pub fn new(feature: Resolution<FeatureId>, value: Option<ValueLiteral>) -> Self {
        Self {
            feature,
            value,
            span: None,
            value_span: None,
        }
    }

    /// Set the source region of the assignment
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Set the source region of the value
    pub fn value_at(mut self, span: Span) -> Self {
        self.value_span = Some(span);
        self
    }
}

/// Value literal
#[derive(Debug, Clone)]
pub enum ValueLiteral {
    /// Primitive literal
    Attribute(AttributeLiteral),
    /// Cross-reference
    Reference(ReferenceLiteral),
    /// Nested object
    Containment(ObjectLiteral),
    /// `[...]` list
    Multi(Vec<ElementLiteral>),
}

impl ValueLiteral {
    /// Boolean literal
    pub fn boolean(value: bool) -> Self {
        ValueLiteral::Attribute(AttributeLiteral::Boolean(value))
    }

    /// String literal
    pub fn string(value: impl Into<String>) -> Self {
        ValueLiteral::Attribute(AttributeLiteral::String(value.into()))
    }

    /// Integer literal
    pub fn int(value: i64) -> Self {
        ValueLiteral::Attribute(AttributeLiteral::Integer(value))
    }

    /// Floating point literal
    pub fn double(value: f64) -> Self {
        ValueLiteral::Attribute(AttributeLiteral::Double(value))
    }

    /// Enumeration literal
    pub fn enumeration(literal: impl Into<String>) -> Self {
        ValueLiteral::Attribute(AttributeLiteral::Enum(literal.into()))
    }

    /// Cross-reference
    pub fn reference(reference: ReferenceLiteral) -> Self {
        ValueLiteral::Reference(reference)
    }

    /// Nested object
    pub fn contain(object: ObjectLiteral) -> Self {
        ValueLiteral::Containment(object)
    }

    /// List of elements
    pub fn multi(elements: Vec<ElementLiteral>) -> Self {
        ValueLiteral::Multi(elements)
    }
}

/// Element of a `[...]` list; lists do not nest
#[derive(Debug, Clone)]
pub enum ElementLiteral {
    /// Primitive literal
    Attribute(AttributeLiteral),
    /// Cross-reference
    Reference(ReferenceLiteral),
    /// Nested object
    Containment(ObjectLiteral),
}

impl ElementLiteral {
    /// String literal
    pub fn string(value: impl Into<String>) -> Self {
        ElementLiteral::Attribute(AttributeLiteral::String(value.into()))
    }

    /// Integer literal
    pub fn int(value: i64) -> Self {
        ElementLiteral::Attribute(AttributeLiteral::Integer(value))
    }

    /// Cross-reference
    pub fn reference(reference: ReferenceLiteral) -> Self {
        ElementLiteral::Reference(reference)
    }

    /// Nested object
    pub fn contain(object: ObjectLiteral) -> Self {
        ElementLiteral::Containment(object)
    }
}

impl From<ElementLiteral> for ValueLiteral {
    fn from(element: ElementLiteral) -> Self {
        match element {
            ElementLiteral::Attribute(a) => ValueLiteral::Attribute(a),
            ElementLiteral::Reference(r) => ValueLiteral::Reference(r),
            ElementLiteral::Containment(o) => ValueLiteral::Containment(o),
        }
    }
}

/// Cross-reference literal
#[derive(Debug, Clone)]
pub struct ReferenceLiteral {
    /// Text as written
    pub text: String,
    /// How the target is found
    pub target: TargetLiteral,
}

impl ReferenceLiteral {
    /// Reference to the object named `name` in the same document
    pub fn to(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            target: TargetLiteral::Named(name),
        }
    }

    /// Reference to an object outside the document
    pub fn external(text: impl Into<String>, class: ClassifierId) -> Self {
        Self {
            text: text.into(),
            target: TargetLiteral::External(class),
        }
    }

    /// Reference the name resolver could not resolve
    pub fn unresolved(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: TargetLiteral::Unresolved,
        }
    }
}

/// Target of a cross-reference literal
#[derive(Debug, Clone, PartialEq)]
pub enum TargetLiteral {
    /// Named object of the same document
    Named(String),
    /// Object outside the document, of the given class
    External(ClassifierId),
    /// Already known to be unresolvable
    Unresolved,
}

impl Document {
    /// Lower a literal tree into a document.
    ///
    /// References to named objects are resolved once every object is known; a
    /// name no object declares yields an unresolved reference.
    pub fn from_literal(uri: ResourceUri, root: ObjectLiteral) -> Document {
        let mut lowering = Lowering {
            document: Document::empty(uri),
            pending: Vec::new(),
        };
        let root = lowering.object(None, root);
        lowering.document.root = Some(root);
        lowering.finish()
    }
}

struct Lowering {
    document: Document,
    pending: Vec<(NodeId, String)>,
}

impl Lowering {
    fn object(&mut self, parent: Option<NodeId>, literal: ObjectLiteral) -> NodeId {
        let id = self.document.push(
            parent,
            literal.span,
            NodeKind::Object(NewObject {
                name: literal.name,
                class: literal.class,
                features: Vec::new(),
            }),
        );
        let features: Vec<NodeId> = literal
            .features
            .into_iter()
            .map(|feature| self.feature(id, feature))
            .collect();
        if let Some(NodeKind::Object(object)) = self.document.node_mut(id).map(|n| &mut n.kind) {
            object.features = features;
        }
        id
    }

    fn feature(&mut self, parent: NodeId, literal: FeatureLiteral) -> NodeId {
        let id = self.document.push(
            Some(parent),
            literal.span,
            NodeKind::Feature(FeatureAssignment {
                feature: literal.feature,
                value: None,
            }),
        );
        let value_span = literal.value_span.or(literal.span);
        let value = literal.value.map(|value| self.value(id, value, value_span));
        if let Some(NodeKind::Feature(feature)) = self.document.node_mut(id).map(|n| &mut n.kind) {
            feature.value = value;
        }
        id
    }

    fn value(&mut self, parent: NodeId, literal: ValueLiteral, span: Option<Span>) -> NodeId {
        match literal {
            ValueLiteral::Attribute(attribute) => {
                self.document
                    .push(Some(parent), span, NodeKind::Value(Value::Attribute(attribute)))
            }
            ValueLiteral::Reference(reference) => self.reference(parent, reference, span),
            ValueLiteral::Containment(object) => {
                let id = self
                    .document
                    .push(Some(parent), span, NodeKind::Value(Value::Containment(NodeId(0))));
                let nested = self.object(Some(id), object);
                if let Some(NodeKind::Value(value)) = self.document.node_mut(id).map(|n| &mut n.kind) {
                    *value = Value::Containment(nested);
                }
                id
            }
            ValueLiteral::Multi(elements) => {
                let id = self
                    .document
                    .push(Some(parent), span, NodeKind::Value(Value::Multi(Vec::new())));
                let values: Vec<NodeId> = elements
                    .into_iter()
                    .map(|element| self.value(id, element.into(), None))
                    .collect();
                if let Some(NodeKind::Value(value)) = self.document.node_mut(id).map(|n| &mut n.kind) {
                    *value = Value::Multi(values);
                }
                id
            }
        }
    }

    fn reference(&mut self, parent: NodeId, literal: ReferenceLiteral, span: Option<Span>) -> NodeId {
        let target = match &literal.target {
            TargetLiteral::External(class) => Resolution::Resolved(ReferenceTarget::External { class: *class }),
            TargetLiteral::Named(_) | TargetLiteral::Unresolved => Resolution::Unresolved,
        };
        let id = self.document.push(
            Some(parent),
            span,
            NodeKind::Value(Value::Reference(Reference {
                target,
                text: literal.text,
            })),
        );
        if let TargetLiteral::Named(name) = literal.target {
            self.pending.push((id, name));
        }
        id
    }

    fn finish(mut self) -> Document {
        for (id, name) in std::mem::take(&mut self.pending) {
            let Some(target) = self.document.object_named(&name) else {
                continue;
            };
            if let Some(NodeKind::Value(Value::Reference(reference))) =
                self.document.node_mut(id).map(|n| &mut n.kind)
            {
                reference.target = Resolution::Resolved(ReferenceTarget::Local(target));
            }
        }
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Multiplicity, Schema};

    #[test]
    fn test_lowering_links_parents() {
        let mut schema = Schema::new();
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let node = schema.add_class(pkg, "Node").unwrap();
        let next = schema.add_reference(node, "next", Some(node), Multiplicity::OPTIONAL).unwrap();
        let children = schema.add_containment(node, "children", Some(node), Multiplicity::MANY).unwrap();

        let root = ObjectLiteral::of(node)
            .named("a")
            .with(FeatureLiteral::set(next, ValueLiteral::reference(ReferenceLiteral::to("b"))))
            .with(FeatureLiteral::set(
                children,
                ValueLiteral::multi(vec![ElementLiteral::contain(ObjectLiteral::of(node).named("b"))]),
            ));
        let uri = ResourceUri::platform_resource("p", "a.eson").unwrap();
        let doc = Document::from_literal(uri, root);

        let a = doc.root().unwrap();
        let b = doc.object_named("b").unwrap();
        let first = doc.object(a).unwrap().features[0];
        let value = doc.feature(first).unwrap().value.unwrap();
        match doc.value(value) {
            Some(Value::Reference(reference)) => {
                assert_eq!(reference.target, Resolution::Resolved(ReferenceTarget::Local(b)));
                assert_eq!(reference.text, "b");
            }
            other => panic!("expected reference, got {:?}", other),
        }
        assert_eq!(doc.parent(value), Some(first));
        assert_eq!(doc.parent(first), Some(a));
    }

    #[test]
    fn test_unknown_names_stay_unresolved() {
        let mut schema = Schema::new();
        let pkg = schema.add_package("m", "m", "urn:m", None).unwrap();
        let node = schema.add_class(pkg, "Node").unwrap();
        let next = schema.add_reference(node, "next", Some(node), Multiplicity::OPTIONAL).unwrap();
        let root = ObjectLiteral::of(node)
            .with(FeatureLiteral::set(next, ValueLiteral::reference(ReferenceLiteral::to("nowhere"))));
        let doc = Document::from_literal(ResourceUri::platform_resource("p", "a.eson").unwrap(), root);
        let feature = doc.object(doc.root().unwrap()).unwrap().features[0];
        let value = doc.feature(feature).unwrap().value.unwrap();
        assert!(matches!(
            doc.value(value),
            Some(Value::Reference(Reference { target: Resolution::Unresolved, .. }))
        ));
    }

    #[test]
    fn test_spans_are_kept() {
        let root = ObjectLiteral::inferred()
            .at(Span::new(0, 20, 1))
            .with(FeatureLiteral::unresolved(ValueLiteral::int(1)).at(Span::new(5, 6, 1)));
        let doc = Document::from_literal(ResourceUri::platform_resource("p", "a.eson").unwrap(), root);
        let root = doc.root().unwrap();
        assert_eq!(doc.node(root).unwrap().span, Some(Span::new(0, 20, 1)));
        let feature = doc.object(root).unwrap().features[0];
        let value = doc.feature(feature).unwrap().value.unwrap();
        assert_eq!(doc.node(value).unwrap().span, Some(Span::new(5, 6, 1)));
    }
}
