//! Mapping between typed entities and RDF resources
//!
//! - Entity schema declaration ([`ResourceSchema`]) and its analysis ([`EntityDescription`])
//! - Query and update generation ([`ClassQueryBuilder`])
//! - Value conversion ([`DeserializerRegistry`])
//! - Lazy relations ([`LazyRelation`], [`LazyList`])
//! - The process-wide [`MapperIndex`]

mod analyzer;
mod builder;
mod deserializer;
mod index;
mod model;
mod proxy;
mod schema;
mod shacl;

pub use analyzer::{
    EntityDescription, FieldDescription, FieldRole, RelatedType, ResourceClassAnalyzer,
};
pub use builder::ClassQueryBuilder;
pub use deserializer::{
    DataValue, Datatype, Deserializer, DeserializerError, DeserializerRegistry, DeserializerResult,
};
pub use index::{ClassMapper, MapperIndex, MapperIndexBuilder};
pub use model::{FieldValue, Label, Relation, ResourceValues, SparqlResource};
pub use proxy::{LazyList, LazyRelation, RelationKey, RelationLoader, RelationState, TARGET_VAR};
pub use schema::{FieldDeclaration, FieldKind, ResourceSchema, TargetType};
pub use shacl::ShapeDocument;
