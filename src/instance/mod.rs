//! Instance documents
//!
//! A [`Document`] is the parsed form of an instance-literal source file: a tree of
//! object constructions, feature assignments and values. Nodes live in an arena
//! addressed by [`NodeId`] and keep a link to their parent, so rules can walk from
//! a value up to the feature assignment and object that own it.
//!
//! Documents are produced by lowering an [`ObjectLiteral`] tree (see
//! [`literal`]), which is what a parser or the JSON loaders build.

pub mod literal;

pub use literal::{ElementLiteral, FeatureLiteral, ObjectLiteral, ReferenceLiteral, TargetLiteral, ValueLiteral};

use crate::error::LookupFailure;
use crate::locations::{ResourceUri, Span};
use crate::schema::{ClassifierId, FeatureId, ReferenceType, Schema};
use serde::Serialize;
use std::fmt;

/// Outcome of resolving a cross-reference to the schema or to another object.
///
/// `Unresolved` is a regular, checkable state: the reference was written but no
/// target was found. `Absent` means nothing was written at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The reference resolved to a target
    Resolved(T),
    /// The reference was written but could not be resolved
    Unresolved,
    /// No reference was written
    Absent,
}

impl<T> Resolution<T> {
    /// Resolved target, if any
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(target) => Some(target),
            _ => None,
        }
    }

    /// Check if the reference resolved
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Check if the reference was written but did not resolve
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved)
    }

    /// Check if no reference was written
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolution::Absent)
    }

    /// Map the resolved target
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(target) => Resolution::Resolved(f(target)),
            Resolution::Unresolved => Resolution::Unresolved,
            Resolution::Absent => Resolution::Absent,
        }
    }
}

impl<T: Copy> Resolution<T> {
    /// Copy of the resolved target, if any
    pub fn get(&self) -> Option<T> {
        self.resolved().copied()
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    /// `None` becomes [`Resolution::Unresolved`]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(target) => Resolution::Resolved(target),
            None => Resolution::Unresolved,
        }
    }
}

/// Id of a document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the document arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document node
#[derive(Debug, Clone)]
pub struct Node {
    /// Enclosing node, `None` for the root object
    pub parent: Option<NodeId>,
    /// Source region of the node
    pub span: Option<Span>,
    /// Node payload
    pub kind: NodeKind,
}

/// Node payloads
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Object construction
    Object(NewObject),
    /// Feature assignment
    Feature(FeatureAssignment),
    /// Assigned value
    Value(Value),
}

/// Construction of a new object
#[derive(Debug, Clone)]
pub struct NewObject {
    /// Declared name
    pub name: Option<String>,
    /// Declared class; `Absent` means the class is inferred from the context
    pub class: Resolution<ClassifierId>,
    /// Feature assignment nodes, in source order
    pub features: Vec<NodeId>,
}

/// Assignment of a value to a feature
#[derive(Debug, Clone)]
pub struct FeatureAssignment {
    /// Assigned schema feature
    pub feature: Resolution<FeatureId>,
    /// Assigned value node
    pub value: Option<NodeId>,
}

/// Assigned values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Primitive literal
    Attribute(AttributeLiteral),
    /// Cross-reference to an existing object
    Reference(Reference),
    /// Nested object construction node
    Containment(NodeId),
    /// List of element value nodes; elements are never lists themselves
    Multi(Vec<NodeId>),
}

/// Primitive literals
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeLiteral {
    /// `true` / `false`
    Boolean(bool),
    /// Quoted string
    String(String),
    /// Integer
    Integer(i64),
    /// Floating point number
    Double(f64),
    /// Enumeration literal name
    Enum(String),
}

/// Cross-reference value
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Resolved target
    pub target: Resolution<ReferenceTarget>,
    /// Cross-reference text as written
    pub text: String,
}

/// Target of a resolved cross-reference
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceTarget {
    /// Object construction in the same document
    Local(NodeId),
    /// Object defined elsewhere, known only by its class
    External {
        /// Class of the target object
        class: ClassifierId,
    },
}

/// Parsed instance document
#[derive(Debug, Clone)]
pub struct Document {
    uri: ResourceUri,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// Create a document without content
    pub fn empty(uri: ResourceUri) -> Self {
        Self {
            uri,
            nodes: Vec::new(),
            root: None,
        }
    }

    /// URI of the document
    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Root object construction
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get an object construction
    pub fn object(&self, id: NodeId) -> Option<&NewObject> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// Get a feature assignment
    pub fn feature(&self, id: NodeId) -> Option<&FeatureAssignment> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Feature(feature)) => Some(feature),
            _ => None,
        }
    }

    /// Get a value
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Find the first object construction declaring `name`
    pub fn object_named(&self, name: &str) -> Option<NodeId> {
        self.objects()
            .into_iter()
            .find(|&id| self.object(id).and_then(|o| o.name.as_deref()) == Some(name))
    }

    /// All object constructions, depth-first in source order
    pub fn objects(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(object) = self.object(id) else {
                continue;
            };
            result.push(id);
            let mut nested = Vec::new();
            for &feature in &object.features {
                if let Some(value) = self.feature(feature).and_then(|f| f.value) {
                    self.collect_contained(value, &mut nested);
                }
            }
            stack.extend(nested.into_iter().rev());
        }
        result
    }

    fn collect_contained(&self, value: NodeId, out: &mut Vec<NodeId>) {
        match self.value(value) {
            Some(Value::Containment(object)) => out.push(*object),
            Some(Value::Multi(elements)) => {
                for &element in elements {
                    self.collect_contained(element, out);
                }
            }
            _ => {}
        }
    }

    /// Nesting depth of an object construction, 0 for the root
    pub fn depth(&self, object: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(object);
        while let Some(id) = current {
            if matches!(self.node(id).map(|n| &n.kind), Some(NodeKind::Object(_))) {
                depth += 1;
            }
            current = self.parent(id);
        }
        depth
    }

    /// Walk up from a value, through any enclosing list, to the feature assignment
    /// that owns it
    pub fn owning_feature(&self, value: NodeId) -> Result<NodeId, LookupFailure> {
        let mut current = self.parent(value);
        while let Some(id) = current {
            match self.node(id).map(|n| &n.kind) {
                Some(NodeKind::Feature(_)) => return Ok(id),
                Some(NodeKind::Value(Value::Multi(_))) => current = self.parent(id),
                _ => break,
            }
        }
        Err(LookupFailure::new("value is not contained in a feature assignment").at_node(value.0))
    }

    /// Declared class of an object, or the class inferred from the containment
    /// feature it is assigned to.
    ///
    /// A declared class that did not resolve yields `None`, as does a root object
    /// without a declared class.
    pub fn class_of(&self, schema: &Schema, object: NodeId) -> Result<Option<ClassifierId>, LookupFailure> {
        let new_object = self
            .object(object)
            .ok_or_else(|| LookupFailure::new("node is not an object construction").at_node(object.0))?;
        match new_object.class {
            Resolution::Resolved(class) => Ok(Some(class)),
            Resolution::Unresolved => Ok(None),
            Resolution::Absent => {
                let Some(container) = self.parent(object) else {
                    return Ok(None);
                };
                if !matches!(self.value(container), Some(Value::Containment(_))) {
                    return Err(LookupFailure::new("object is not contained in a containment value")
                        .at_node(object.0));
                }
                let feature = self.owning_feature(container)?;
                let inferred = self
                    .feature(feature)
                    .and_then(|f| f.feature.get())
                    .map(|f| schema.reference_type(f));
                Ok(match inferred {
                    Some(ReferenceType::Class(class)) => Some(class),
                    _ => None,
                })
            }
        }
    }

    fn push(&mut self, parent: Option<NodeId>, span: Option<Span>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, span, kind });
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Cut a node loose from its parent, producing a malformed tree
    #[cfg(test)]
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }
}
