//! Declarative mapping of an entity type
//!
//! A [`ResourceSchema`] is the static description table of one type: its RDF type, default
//! graph, URI field, URI strategy and one [`FieldDeclaration`] per mapped field. IRIs may be
//! absolute or prefixed names known to the namespace manager; graphs may also be relative to
//! the configured base URI.

use super::deserializer::Datatype;
use super::model::SparqlResource;
use crate::uri::UriStrategy;
use std::any::TypeId;
use std::fmt;

/// Related entity type of an object field
#[derive(Clone, Copy)]
pub struct TargetType {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub schema: fn() -> ResourceSchema,
}

impl TargetType {
    pub fn of<T: SparqlResource>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            schema: T::schema,
        }
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Data(Datatype),
    Object(TargetType),
    /// Language-tagged text
    Label,
    DataList(Datatype),
    ObjectList(TargetType),
}

/// One mapped field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub property: String,
    pub kind: FieldKind,
    pub required: bool,
    pub reverse: bool,
}

impl FieldDeclaration {
    fn new(name: &str, property: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            property: property.to_string(),
            kind,
            required: false,
            reverse: false,
        }
    }

    pub fn data(name: &str, property: &str, datatype: Datatype) -> Self {
        Self::new(name, property, FieldKind::Data(datatype))
    }

    pub fn object<T: SparqlResource>(name: &str, property: &str) -> Self {
        Self::new(name, property, FieldKind::Object(TargetType::of::<T>()))
    }

    pub fn label(name: &str, property: &str) -> Self {
        Self::new(name, property, FieldKind::Label)
    }

    pub fn data_list(name: &str, property: &str, datatype: Datatype) -> Self {
        Self::new(name, property, FieldKind::DataList(datatype))
    }

    pub fn object_list<T: SparqlResource>(name: &str, property: &str) -> Self {
        Self::new(name, property, FieldKind::ObjectList(TargetType::of::<T>()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The related value is the subject of the stored triple
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Mapping declaration of one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    pub rdf_type: Option<String>,
    pub graph: Option<String>,
    pub uri_field: Option<String>,
    pub type_field: String,
    pub allow_blank_node: bool,
    pub uri_strategy: Option<UriStrategy>,
    pub fields: Vec<FieldDeclaration>,
}

impl Default for ResourceSchema {
    fn default() -> Self {
        Self {
            rdf_type: None,
            graph: None,
            uri_field: None,
            type_field: "rdfType".to_string(),
            allow_blank_node: false,
            uri_strategy: None,
            fields: Vec::new(),
        }
    }
}

impl ResourceSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rdf_type(mut self, rdf_type: &str) -> Self {
        self.rdf_type = Some(rdf_type.to_string());
        self
    }

    /// Default graph of the type's resources
    pub fn graph(mut self, graph: &str) -> Self {
        self.graph = Some(graph.to_string());
        self
    }

    pub fn uri_field(mut self, name: &str) -> Self {
        self.uri_field = Some(name.to_string());
        self
    }

    pub fn type_field(mut self, name: &str) -> Self {
        self.type_field = name.to_string();
        self
    }

    pub fn allow_blank_node(mut self) -> Self {
        self.allow_blank_node = true;
        self
    }

    pub fn uri_strategy(mut self, strategy: UriStrategy) -> Self {
        self.uri_strategy = Some(strategy);
        self
    }

    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }
}
