//! Resource class analysis
//!
//! Validates a [`ResourceSchema`] and resolves it into an immutable [`EntityDescription`]:
//! IRIs expanded, graphs resolved against the base URI, related types resolved to their RDF
//! type and default graph, datatypes checked against the deserializer registry.

use super::deserializer::{Datatype, DeserializerRegistry};
use super::model::SparqlResource;
use super::schema::{FieldKind, ResourceSchema, TargetType};
use crate::config::OgmConfig;
use crate::error::{OgmError, OgmResult};
use crate::rdf::{NamedNode, NamespaceManager};
use crate::sparql::Variable;
use crate::uri::UriStrategy;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::TypeId;
use tracing::debug;

static VARIABLE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Related type of an object field, resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedType {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub rdf_type: NamedNode,
    /// Default graph of the related type
    pub graph: Option<NamedNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldRole {
    Data(Datatype),
    Object(RelatedType),
    Label,
    DataList(Datatype),
    ObjectList(RelatedType),
}

/// Resolved mapping of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescription {
    pub name: String,
    pub property: NamedNode,
    pub role: FieldRole,
    pub required: bool,
    pub reverse: bool,
}

impl FieldDescription {
    pub fn variable(&self) -> Variable {
        Variable::new(self.name.as_str())
    }

    pub fn is_optional(&self) -> bool {
        !self.required
    }

    pub fn is_list(&self) -> bool {
        matches!(self.role, FieldRole::DataList(_) | FieldRole::ObjectList(_))
    }

    pub fn datatype(&self) -> Option<&Datatype> {
        match &self.role {
            FieldRole::Data(datatype) | FieldRole::DataList(datatype) => Some(datatype),
            _ => None,
        }
    }

    pub fn related(&self) -> Option<&RelatedType> {
        match &self.role {
            FieldRole::Object(related) | FieldRole::ObjectList(related) => Some(related),
            _ => None,
        }
    }
}

/// Analyzed mapping of one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescription {
    type_id: TypeId,
    type_name: &'static str,
    rdf_type: NamedNode,
    graph: Option<NamedNode>,
    uri_field: String,
    type_field: String,
    type_label_field: String,
    allow_blank_node: bool,
    uri_strategy: UriStrategy,
    fields: IndexMap<String, FieldDescription>,
}

impl EntityDescription {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn rdf_type(&self) -> &NamedNode {
        &self.rdf_type
    }

    pub fn graph(&self) -> Option<&NamedNode> {
        self.graph.as_ref()
    }

    pub fn uri_field(&self) -> &str {
        &self.uri_field
    }

    pub fn type_field(&self) -> &str {
        &self.type_field
    }

    pub fn type_label_field(&self) -> &str {
        &self.type_label_field
    }

    pub fn allow_blank_node(&self) -> bool {
        self.allow_blank_node
    }

    pub fn uri_strategy(&self) -> &UriStrategy {
        &self.uri_strategy
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescription> {
        self.fields.get(name)
    }

    /// First field mapped to `property`
    pub fn field_by_property(&self, property: &NamedNode) -> Option<&FieldDescription> {
        self.fields().find(|f| &f.property == property)
    }

    pub fn data_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| matches!(f.role, FieldRole::Data(_)))
    }

    pub fn object_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| matches!(f.role, FieldRole::Object(_)))
    }

    pub fn label_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| matches!(f.role, FieldRole::Label))
    }

    pub fn data_list_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| matches!(f.role, FieldRole::DataList(_)))
    }

    pub fn object_list_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| matches!(f.role, FieldRole::ObjectList(_)))
    }

    /// Single-valued fields, selected as query variables
    pub fn scalar_properties(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields().filter(|f| !f.is_list())
    }

    pub fn optional_field_count(&self) -> usize {
        self.scalar_properties().filter(|f| f.is_optional()).count()
    }
}

/// Analyzer of entity schemas
pub struct ResourceClassAnalyzer<'a> {
    registry: &'a DeserializerRegistry,
    namespaces: &'a NamespaceManager,
    config: &'a OgmConfig,
}

impl<'a> ResourceClassAnalyzer<'a> {
    pub fn new(
        registry: &'a DeserializerRegistry,
        namespaces: &'a NamespaceManager,
        config: &'a OgmConfig,
    ) -> Self {
        Self {
            registry,
            namespaces,
            config,
        }
    }

    pub fn analyze<T: SparqlResource>(&self) -> OgmResult<EntityDescription> {
        self.analyze_schema(TypeId::of::<T>(), std::any::type_name::<T>(), T::schema())
    }

    pub fn analyze_schema(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        schema: ResourceSchema,
    ) -> OgmResult<EntityDescription> {
        let fail = |message: String| OgmError::mapping(type_name, message);

        let uri_field = schema
            .uri_field
            .clone()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| fail("no URI field declared".to_string()))?;
        let (rdf_type, graph) = self.resolve_type(type_name, &schema)?;

        let type_label_field = format!("{}Name", schema.type_field);
        let reserved = [uri_field.clone(), schema.type_field.clone(), type_label_field.clone()];
        if reserved[0] == reserved[1] || reserved[0] == reserved[2] {
            return Err(fail(format!(
                "URI field and type field must differ, got '{}'",
                uri_field
            )));
        }
        for name in &reserved {
            check_variable_name(name).map_err(&fail)?;
        }

        let mut fields: IndexMap<String, FieldDescription> = IndexMap::new();
        for declaration in schema.fields {
            let name = declaration.name;
            check_variable_name(&name).map_err(&fail)?;
            if reserved.contains(&name) {
                return Err(fail(format!("field '{}' clashes with a reserved variable", name)));
            }
            if let Some(previous) = fields.get(&name) {
                let both_roles = matches!(
                    (&previous.role, &declaration.kind),
                    (FieldRole::Data(_), FieldKind::Object(_))
                        | (FieldRole::Object(_), FieldKind::Data(_))
                );
                return Err(fail(if both_roles {
                    format!("field '{}' declared both as data and object property", name)
                } else {
                    format!("field '{}' declared twice", name)
                }));
            }

            let property = self
                .namespaces
                .resolve(&declaration.property)
                .map_err(|e| fail(format!("invalid property of field '{}': {}", name, e)))?;

            let role = match declaration.kind {
                FieldKind::Data(datatype) => FieldRole::Data(self.check_datatype(&name, datatype).map_err(&fail)?),
                FieldKind::DataList(datatype) => {
                    FieldRole::DataList(self.check_datatype(&name, datatype).map_err(&fail)?)
                }
                FieldKind::Label => FieldRole::Label,
                FieldKind::Object(target) => FieldRole::Object(self.related(type_name, &name, target)?),
                FieldKind::ObjectList(target) => {
                    FieldRole::ObjectList(self.related(type_name, &name, target)?)
                }
            };

            if declaration.reverse {
                match &role {
                    FieldRole::Label => {
                        return Err(fail(format!("label field '{}' cannot be reverse", name)))
                    }
                    FieldRole::Data(datatype) | FieldRole::DataList(datatype)
                        if *datatype != Datatype::Uri =>
                    {
                        return Err(fail(format!(
                            "reverse data field '{}' must hold URIs, not {}",
                            name, datatype
                        )))
                    }
                    _ => {}
                }
            }

            fields.insert(
                name.clone(),
                FieldDescription {
                    name,
                    property,
                    role,
                    required: declaration.required,
                    reverse: declaration.reverse,
                },
            );
        }

        let uri_strategy = match schema.uri_strategy {
            Some(strategy) => strategy,
            None => UriStrategy::random(format!("id/{}", local_name(&rdf_type).to_lowercase())),
        };
        for field in uri_strategy.fields() {
            if !fields.contains_key(field) {
                return Err(fail(format!("URI strategy reads undeclared field '{}'", field)));
            }
        }

        debug!("Analyzed {} as {} ({} fields)", type_name, rdf_type, fields.len());

        Ok(EntityDescription {
            type_id,
            type_name,
            rdf_type,
            graph,
            uri_field,
            type_field: schema.type_field,
            type_label_field,
            allow_blank_node: schema.allow_blank_node,
            uri_strategy,
            fields,
        })
    }

    /// RDF type and default graph of a schema
    fn resolve_type(
        &self,
        type_name: &'static str,
        schema: &ResourceSchema,
    ) -> OgmResult<(NamedNode, Option<NamedNode>)> {
        let declared = schema
            .rdf_type
            .as_deref()
            .ok_or_else(|| OgmError::mapping(type_name, "no RDF type declared"))?;
        let rdf_type = self
            .namespaces
            .resolve(declared)
            .map_err(|e| OgmError::mapping(type_name, format!("invalid RDF type: {}", e)))?;

        let graph = match schema.graph.as_deref() {
            Some(graph) => Some(self.resolve_graph(graph).map_err(|e| {
                OgmError::mapping(type_name, format!("invalid graph '{}': {}", graph, e))
            })?),
            None => None,
        };
        Ok((rdf_type, graph))
    }

    pub(crate) fn resolve_graph(&self, graph: &str) -> OgmResult<NamedNode> {
        match self.namespaces.resolve(graph) {
            Ok(node) => Ok(node),
            Err(_) => Ok(NamedNode::new(&self.config.resolve(graph))?),
        }
    }

    fn check_datatype(&self, field: &str, datatype: Datatype) -> Result<Datatype, String> {
        if self.registry.contains(&datatype) {
            Ok(datatype)
        } else {
            Err(format!("no deserializer for datatype {} of field '{}'", datatype, field))
        }
    }

    fn related(&self, type_name: &'static str, field: &str, target: TargetType) -> OgmResult<RelatedType> {
        let (rdf_type, graph) = self
            .resolve_type(target.type_name, &(target.schema)())
            .map_err(|e| {
                OgmError::mapping(type_name, format!("related type of field '{}': {}", field, e))
            })?;
        Ok(RelatedType {
            type_id: target.type_id,
            type_name: target.type_name,
            rdf_type,
            graph,
        })
    }

    /// RDF type of a schema, without full analysis
    pub(crate) fn rdf_type_of(&self, type_name: &'static str, schema: &ResourceSchema) -> OgmResult<NamedNode> {
        self.resolve_type(type_name, schema).map(|(rdf_type, _)| rdf_type)
    }
}

fn check_variable_name(name: &str) -> Result<(), String> {
    if VARIABLE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid variable name", name))
    }
}

fn local_name(iri: &NamedNode) -> &str {
    let iri = iri.as_str();
    iri.rsplit(|c| c == '#' || c == '/').find(|s| !s.is_empty()).unwrap_or(iri)
}
