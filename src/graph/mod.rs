//! Materialized object graphs
//!
//! After the structural rules have run, the document is turned into the object
//! graph it describes: one [`MaterializedObject`] per object construction with its
//! feature slots filled in. A [`GraphValidator`] then checks the graph as a whole,
//! and the validator maps its findings back to document nodes through
//! [`MaterializedGraph::origin`].

pub mod consistency;

pub use consistency::{
    GraphCode, GraphDiagnostic, GraphSeverity, GraphValidator, StructuralConsistency,
};

use crate::instance::{AttributeLiteral, Document, NodeId, ReferenceTarget, Resolution, Value};
use crate::schema::{ClassifierId, FeatureId, Schema};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// Id of a materialized object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Position in the graph
    pub fn index(self) -> usize {
        self.0
    }
}

/// Value held by a feature slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    /// Primitive value
    Data(AttributeLiteral),
    /// Contained or referenced object
    Object(ObjectId),
    /// Placeholder for a reference that did not resolve
    Proxy(String),
}

/// An object of the graph
#[derive(Debug, Clone)]
pub struct MaterializedObject {
    /// Class of the object, if known
    pub class: Option<ClassifierId>,
    /// Declared name
    pub name: Option<String>,
    /// Defined outside the document and only referenced from it
    pub external: bool,
    /// Feature slots in assignment order
    pub slots: IndexMap<FeatureId, Vec<SlotValue>>,
}

impl MaterializedObject {
    /// Values of a feature slot; empty if unset
    pub fn values(&self, feature: FeatureId) -> &[SlotValue] {
        self.slots.get(&feature).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Object graph built from a document
#[derive(Debug, Clone, Default)]
pub struct MaterializedGraph {
    objects: Vec<MaterializedObject>,
    root: Option<ObjectId>,
    origins: HashMap<ObjectId, NodeId>,
}

impl MaterializedGraph {
    /// Build the graph a document describes.
    ///
    /// Assignments to unresolved features are skipped. A single-valued slot keeps
    /// the last value assigned to it.
    pub fn build(schema: &Schema, document: &Document) -> Self {
        let mut graph = MaterializedGraph::default();
        let mut by_node = HashMap::new();
        let mut order = Vec::new();
        for node in document.objects() {
            let Some(object) = document.object(node) else {
                continue;
            };
            let id = graph.push(MaterializedObject {
                class: document.class_of(schema, node).ok().flatten(),
                name: object.name.clone(),
                external: false,
                slots: IndexMap::new(),
            });
            graph.origins.insert(id, node);
            by_node.insert(node, id);
            order.push((node, id));
        }
        graph.root = document.root().and_then(|root| by_node.get(&root).copied());

        for (node, id) in order {
            let Some(object) = document.object(node) else {
                continue;
            };
            for &assignment in &object.features {
                let Some(assignment) = document.feature(assignment) else {
                    continue;
                };
                let (Some(feature), Some(value)) = (assignment.feature.get(), assignment.value) else {
                    continue;
                };
                let mut values = Vec::new();
                graph.collect(document, &by_node, value, &mut values);
                let slot = graph.objects[id.0].slots.entry(feature).or_default();
                if schema.is_many(feature) {
                    slot.extend(values);
                } else if let Some(last) = values.pop() {
                    *slot = vec![last];
                }
            }
        }
        graph
    }

    fn push(&mut self, object: MaterializedObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    fn collect(
        &mut self,
        document: &Document,
        by_node: &HashMap<NodeId, ObjectId>,
        value: NodeId,
        out: &mut Vec<SlotValue>,
    ) {
        match document.value(value) {
            Some(Value::Attribute(literal)) => out.push(SlotValue::Data(literal.clone())),
            Some(Value::Containment(object)) => {
                if let Some(&id) = by_node.get(object) {
                    out.push(SlotValue::Object(id));
                }
            }
            Some(Value::Reference(reference)) => match &reference.target {
                Resolution::Resolved(ReferenceTarget::Local(node)) => {
                    if let Some(&id) = by_node.get(node) {
                        out.push(SlotValue::Object(id));
                    }
                }
                Resolution::Resolved(ReferenceTarget::External { class }) => {
                    let id = self.push(MaterializedObject {
                        class: Some(*class),
                        name: Some(reference.text.clone()),
                        external: true,
                        slots: IndexMap::new(),
                    });
                    out.push(SlotValue::Object(id));
                }
                Resolution::Unresolved => out.push(SlotValue::Proxy(reference.text.clone())),
                Resolution::Absent => {}
            },
            Some(Value::Multi(elements)) => {
                for &element in elements {
                    self.collect(document, by_node, element, out);
                }
            }
            None => {}
        }
    }

    /// Root object
    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    /// Get an object
    pub fn object(&self, id: ObjectId) -> Option<&MaterializedObject> {
        self.objects.get(id.0)
    }

    /// All objects, document objects first
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &MaterializedObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the graph has no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object construction node an object was built from
    pub fn origin(&self, id: ObjectId) -> Option<NodeId> {
        self.origins.get(&id).copied()
    }

    /// Human readable label of an object, used in messages
    pub fn label(&self, schema: &Schema, id: ObjectId) -> String {
        let Some(object) = self.object(id) else {
            return format!("{}", id);
        };
        let class = object
            .class
            .and_then(|c| schema.classifier_name(c))
            .unwrap_or("EObject");
        match &object.name {
            Some(name) => format!("{} {}", class, name),
            None => class.to_string(),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
