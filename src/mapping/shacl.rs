//! SHACL shapes of mapped types
//!
//! One `sh:NodeShape` per type, one `sh:property` per non-reverse field. Shapes only describe
//! the mapping; they are validated by the store, never here.

use super::analyzer::{EntityDescription, FieldRole};
use super::deserializer::Datatype;
use crate::rdf::namespace::{rdf, sh, term, xsd};
use crate::rdf::{
    BlankNode, Literal, NamedNode, RdfFormat, RdfObject, RdfSerializer, RdfSubject, SerializeResult,
    Triple,
};

/// Shape of one mapped type
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDocument {
    shape: NamedNode,
    triples: Vec<Triple>,
}

impl ShapeDocument {
    /// Shape of `description`, named `<rdfType>_ShapeSHACL`
    pub fn of(description: &EntityDescription) -> Self {
        let shape = NamedNode::new_unchecked(format!("{}_ShapeSHACL", description.rdf_type().as_str()));
        let mut triples = vec![
            Triple::new(shape.clone(), term(rdf::TYPE), term(sh::NODE_SHAPE)),
            Triple::new(shape.clone(), term(sh::TARGET_CLASS), description.rdf_type().clone()),
        ];

        for field in description.fields().filter(|f| !f.reverse) {
            let node = RdfSubject::BlankNode(BlankNode::new());
            triples.push(Triple::new(shape.clone(), term(sh::PROPERTY), node.clone()));
            triples.push(Triple::new(node.clone(), term(sh::PATH), field.property.clone()));

            let (constraint, value, single): (&'static str, RdfObject, bool) = match &field.role {
                FieldRole::Data(Datatype::Uri) => (sh::NODE_KIND, term(sh::IRI).into(), true),
                FieldRole::Data(datatype) => (sh::DATATYPE, datatype.iri().into(), true),
                FieldRole::DataList(Datatype::Uri) => (sh::NODE_KIND, term(sh::IRI).into(), false),
                FieldRole::DataList(datatype) => (sh::DATATYPE, datatype.iri().into(), false),
                FieldRole::Label => (sh::DATATYPE, term(rdf::LANG_STRING).into(), false),
                FieldRole::Object(related) => (sh::CLASS, related.rdf_type.clone().into(), true),
                FieldRole::ObjectList(related) => (sh::CLASS, related.rdf_type.clone().into(), false),
            };
            triples.push(Triple::new(node.clone(), term(constraint), value));

            let min = if field.required { "1" } else { "0" };
            triples.push(Triple::new(node.clone(), term(sh::MIN_COUNT), integer(min)));
            if single {
                triples.push(Triple::new(node.clone(), term(sh::MAX_COUNT), integer("1")));
            }
            if matches!(field.role, FieldRole::Label) {
                triples.push(Triple::new(
                    node,
                    term(sh::UNIQUE_LANG),
                    Literal::new_typed_literal("true", term(xsd::BOOLEAN)),
                ));
            }
        }

        Self { shape, triples }
    }

    pub fn shape(&self) -> &NamedNode {
        &self.shape
    }

    pub fn to_triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn to_turtle(&self) -> SerializeResult<String> {
        RdfSerializer::serialize(&self.triples, RdfFormat::Turtle)
    }
}

fn integer(value: &str) -> Literal {
    Literal::new_typed_literal(value, term(xsd::INTEGER))
}
