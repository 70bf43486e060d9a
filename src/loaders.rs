//! Resource loading utilities
//!
//! This module reads schemas and instance documents from a JSON interchange
//! format. Schema loading is strict about structure but lenient about type
//! names: a feature whose type cannot be found is loaded untyped. Document
//! loading never fails on names: classes, features and references that cannot
//! be resolved are loaded as unresolved and left to the validator to report.
//!
//! ```json
//! { "packages": [ { "name": "shop", "nsPrefix": "shop", "nsURI": "http://example.org/shop",
//!     "location": "platform:/resource/model/shop.ecore",
//!     "classes": [ { "name": "Item",
//!       "attributes": [ { "name": "name", "type": "ecore.EString" } ] } ] } ] }
//! ```
//!
//! ```json
//! { "uri": "platform:/resource/docs/items.eson",
//!   "root": { "class": "shop.Item", "name": "pen",
//!     "features": [ { "feature": "name", "value": { "string": "Pen" } } ] } }
//! ```

use crate::error::{Error, Result};
use crate::instance::{AttributeLiteral, Document, ElementLiteral, FeatureLiteral, ObjectLiteral, ReferenceLiteral, Resolution, ValueLiteral};
use crate::locations::{ResourceUri, Span};
use crate::names;
use crate::schema::{ClassifierId, Multiplicity, PackageId, ReferenceType, Schema};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Schema description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    /// Top-level packages
    pub packages: Vec<PackageDef>,
}

/// Package description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDef {
    /// Package name
    pub name: String,
    /// Namespace prefix
    pub ns_prefix: String,
    /// Namespace URI
    #[serde(rename = "nsURI")]
    pub ns_uri: String,
    /// Resource the package lives in
    #[serde(default)]
    pub location: Option<String>,
    /// Primitive data types
    #[serde(default)]
    pub data_types: Vec<String>,
    /// Enumerations
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /// Classes
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    /// Nested packages
    #[serde(default)]
    pub subpackages: Vec<PackageDef>,
}

/// Enumeration description
#[derive(Debug, Clone, Deserialize)]
pub struct EnumDef {
    /// Enumeration name
    pub name: String,
    /// Literal names
    pub literals: Vec<String>,
}

/// Class description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    /// Class name
    pub name: String,
    /// Abstract classes cannot be instantiated
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Interfaces cannot be instantiated
    #[serde(default, rename = "interface")]
    pub is_interface: bool,
    /// Qualified or simple names of the direct super types
    #[serde(default)]
    pub super_types: Vec<String>,
    /// Attributes
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// References and containments
    #[serde(default)]
    pub references: Vec<ReferenceDef>,
}

/// Attribute description
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDef {
    /// Attribute name
    pub name: String,
    /// Qualified or simple name of the data type
    #[serde(rename = "type", default)]
    pub etype: Option<String>,
    /// Lower bound
    #[serde(default)]
    pub lower: usize,
    /// Upper bound, `-1` for unbounded
    #[serde(default = "single")]
    pub upper: i64,
    /// Whether the attribute identifies its object
    #[serde(default)]
    pub id: bool,
}

/// Reference description
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceDef {
    /// Reference name
    pub name: String,
    /// Qualified or simple name of the referenced class
    #[serde(rename = "type", default)]
    pub etype: Option<String>,
    /// Whether referenced objects are owned
    #[serde(default)]
    pub containment: bool,
    /// Lower bound
    #[serde(default)]
    pub lower: usize,
    /// Upper bound, `-1` for unbounded
    #[serde(default = "single")]
    pub upper: i64,
}

fn single() -> i64 {
    1
}

fn multiplicity(lower: usize, upper: i64) -> Multiplicity {
    Multiplicity::new(lower, usize::try_from(upper).ok())
}

/// Document description
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDef {
    /// Document URI
    pub uri: String,
    /// Root object
    pub root: ObjectDef,
}

/// Object construction description
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDef {
    /// Qualified or simple class name; omitted to infer the class
    #[serde(default)]
    pub class: Option<String>,
    /// Declared name
    #[serde(default)]
    pub name: Option<String>,
    /// Feature assignments
    #[serde(default)]
    pub features: Vec<FeatureDef>,
    /// Source region
    #[serde(default)]
    pub span: Option<Span>,
}

/// Feature assignment description
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureDef {
    /// Feature name
    pub feature: String,
    /// Assigned value; omitted for a missing value
    #[serde(default)]
    pub value: Option<ValueDef>,
    /// Source region
    #[serde(default)]
    pub span: Option<Span>,
}

/// Value description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDef {
    /// Boolean literal
    Bool(bool),
    /// String literal
    String(String),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Double(f64),
    /// Enumeration literal
    Enum(String),
    /// Cross-reference
    Ref(RefDef),
    /// Nested object
    New(Box<ObjectDef>),
    /// List of values
    Multi(Vec<ValueDef>),
}

/// Cross-reference description
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefDef {
    /// Name of an object of the same document
    Local(String),
    /// Object of another resource, known by its class
    External {
        /// Cross-reference text
        name: String,
        /// Qualified or simple class name of the target
        class: String,
    },
}

/// Load a schema from a JSON string. The `ecore` built-ins are always present.
pub fn load_schema_str(json: &str) -> Result<Schema> {
    let def: SchemaDef = serde_json::from_str(json)?;
    build_schema(&def)
}

/// Load a schema from a JSON file
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<Schema> {
    load_schema_str(&read(path.as_ref())?)
}

/// Build a schema from its description
pub fn build_schema(def: &SchemaDef) -> Result<Schema> {
    let mut schema = Schema::with_ecore();
    let mut classes = Vec::new();
    for package in &def.packages {
        declare_package(&mut schema, package, None, &mut classes)?;
    }
    for (class, class_def) in classes {
        for super_type in &class_def.super_types {
            let resolved = schema
                .find_classifier(super_type)
                .ok_or_else(|| Error::Schema(format!("unknown super type '{}' of '{}'", super_type, class_def.name)))?;
            schema.add_super_type(class, resolved)?;
        }
        for attribute in &class_def.attributes {
            let etype = resolve_type(&schema, attribute.etype.as_deref(), &attribute.name);
            if attribute.id {
                schema.add_id_attribute(class, attribute.name.clone(), etype)?;
            } else {
                schema.add_attribute(
                    class,
                    attribute.name.clone(),
                    etype,
                    multiplicity(attribute.lower, attribute.upper),
                )?;
            }
        }
        for reference in &class_def.references {
            let etype = resolve_type(&schema, reference.etype.as_deref(), &reference.name);
            let bounds = multiplicity(reference.lower, reference.upper);
            if reference.containment {
                schema.add_containment(class, reference.name.clone(), etype, bounds)?;
            } else {
                schema.add_reference(class, reference.name.clone(), etype, bounds)?;
            }
        }
    }
    debug!(classifiers = schema.classifiers().count(), "schema loaded");
    Ok(schema)
}

fn declare_package<'d>(
    schema: &mut Schema,
    def: &'d PackageDef,
    parent: Option<PackageId>,
    classes: &mut Vec<(ClassifierId, &'d ClassDef)>,
) -> Result<()> {
    let package = schema.add_package(def.name.clone(), def.ns_prefix.clone(), def.ns_uri.clone(), parent)?;
    if let Some(location) = &def.location {
        schema.set_package_location(package, ResourceUri::parse(location)?)?;
    }
    for data_type in &def.data_types {
        schema.add_data_type(package, data_type.clone())?;
    }
    for enumeration in &def.enums {
        schema.add_enum(package, enumeration.name.clone(), enumeration.literals.iter().cloned())?;
    }
    for class in &def.classes {
        let id = match (class.is_interface, class.is_abstract) {
            (true, _) => schema.add_interface(package, class.name.clone())?,
            (false, true) => schema.add_abstract_class(package, class.name.clone())?,
            (false, false) => schema.add_class(package, class.name.clone())?,
        };
        classes.push((id, class));
    }
    for sub in &def.subpackages {
        declare_package(schema, sub, Some(package), classes)?;
    }
    Ok(())
}

fn resolve_type(schema: &Schema, name: Option<&str>, feature: &str) -> Option<ClassifierId> {
    let name = name?;
    let resolved = schema.find_classifier(name);
    if resolved.is_none() {
        warn!(feature, etype = name, "unknown feature type, feature left untyped");
    }
    resolved
}

/// Load a document from a JSON string, resolving names against `schema`
pub fn load_document_str(schema: &Schema, json: &str) -> Result<Document> {
    let def: DocumentDef = serde_json::from_str(json)?;
    build_document(schema, &def)
}

/// Load a document from a JSON file
pub fn load_document_file(schema: &Schema, path: impl AsRef<Path>) -> Result<Document> {
    load_document_str(schema, &read(path.as_ref())?)
}

/// Build a document from its description
pub fn build_document(schema: &Schema, def: &DocumentDef) -> Result<Document> {
    let uri = ResourceUri::parse(&def.uri)?;
    let root = DocumentResolver { schema }.object(&def.root, None)?;
    Ok(Document::from_literal(uri, root))
}

/// Resolves the names of a document description against a schema
struct DocumentResolver<'s> {
    schema: &'s Schema,
}

impl DocumentResolver<'_> {
    fn object(&self, def: &ObjectDef, inferred: Option<ClassifierId>) -> Result<ObjectLiteral> {
        let class = match &def.class {
            Some(name) => {
                names::validate_qualified_name(name)?;
                Resolution::from(self.schema.find_classifier(names::unescape(name)))
            }
            None => Resolution::Absent,
        };
        let effective = match class {
            Resolution::Resolved(class) => Some(class),
            Resolution::Unresolved => None,
            Resolution::Absent => inferred,
        };
        let mut literal = ObjectLiteral::with_class(class);
        if let Some(name) = &def.name {
            literal = literal.named(name.clone());
        }
        if let Some(span) = def.span {
            literal = literal.at(span);
        }
        for feature in &def.features {
            literal = literal.with(self.feature(feature, effective)?);
        }
        Ok(literal)
    }

    fn feature(&self, def: &FeatureDef, class: Option<ClassifierId>) -> Result<FeatureLiteral> {
        let feature = Resolution::from(
            class.and_then(|c| self.schema.find_feature(c, names::unescape(&def.feature))),
        );
        let inferred = match feature.get().map(|f| self.schema.reference_type(f)) {
            Some(ReferenceType::Class(class)) => Some(class),
            _ => None,
        };
        let value = def
            .value
            .as_ref()
            .map(|v| self.value(v, inferred))
            .transpose()?;
        let mut literal = FeatureLiteral::new(feature, value);
        if let Some(span) = def.span {
            literal = literal.at(span);
        }
        Ok(literal)
    }

    fn value(&self, def: &ValueDef, inferred: Option<ClassifierId>) -> Result<ValueLiteral> {
        Ok(match def {
            ValueDef::Multi(elements) => ValueLiteral::multi(
                elements
                    .iter()
                    .map(|e| self.element(e, inferred))
                    .collect::<Result<Vec<_>>>()?,
            ),
            single => self.element(single, inferred)?.into(),
        })
    }

    fn element(&self, def: &ValueDef, inferred: Option<ClassifierId>) -> Result<ElementLiteral> {
        Ok(match def {
            ValueDef::Bool(b) => ElementLiteral::Attribute(AttributeLiteral::Boolean(*b)),
            ValueDef::String(s) => ElementLiteral::string(s.clone()),
            ValueDef::Int(i) => ElementLiteral::int(*i),
            ValueDef::Double(d) => ElementLiteral::Attribute(AttributeLiteral::Double(*d)),
            ValueDef::Enum(e) => ElementLiteral::Attribute(AttributeLiteral::Enum(e.clone())),
            ValueDef::Ref(RefDef::Local(name)) => ElementLiteral::reference(ReferenceLiteral::to(name.clone())),
            ValueDef::Ref(RefDef::External { name, class }) => {
                ElementLiteral::reference(match self.schema.find_classifier(class) {
                    Some(class) => ReferenceLiteral::external(name.clone(), class),
                    None => ReferenceLiteral::unresolved(name.clone()),
                })
            }
            ValueDef::New(object) => ElementLiteral::contain(self.object(object, inferred)?),
            ValueDef::Multi(_) => {
                return Err(Error::Document("lists cannot be nested".to_string()));
            }
        })
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::Resource(format!("Failed to read file '{}': {}", path.display(), e)))
}
