//! RDF type definitions
//!
//! Wrapper types around the oxrdf primitives. Every value the mapping layer writes to or reads
//! from a store goes through these types, so `Display` always produces valid SPARQL/N-Triples
//! term syntax (escaped literals, bracketed IRIs).

use oxrdf::{
    BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode, Subject as OxSubject,
    Term as OxTerm, Triple as OxTriple,
};
use std::fmt;
use thiserror::Error;

/// RDF errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Invalid blank node
    #[error("Invalid blank node: {0}")]
    InvalidBlankNode(String),

    /// Invalid literal
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    /// Term kind not usable at this position (e.g. a literal as subject)
    #[error("Unexpected term {term}: expected {expected}")]
    UnexpectedTerm { term: String, expected: &'static str },
}

pub type RdfResult<T> = Result<T, RdfError>;

/// Named node (IRI)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    /// Create a new named node from an IRI string
    pub fn new(iri: &str) -> RdfResult<Self> {
        OxNamedNode::new(iri)
            .map(Self)
            .map_err(|e| RdfError::InvalidIri(format!("{iri}: {e}")))
    }

    /// Create a named node without validating the IRI.
    ///
    /// Only for IRIs known to be valid, such as vocabulary constants.
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(OxNamedNode::new_unchecked(iri))
    }

    /// Get the IRI string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the inner oxrdf NamedNode
    pub fn inner(&self) -> &OxNamedNode {
        &self.0
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(node: OxNamedNode) -> Self {
        Self(node)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(node: NamedNode) -> Self {
        node.0
    }
}

/// Blank node (anonymous node)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    /// Create a new blank node with a unique identifier
    pub fn new() -> Self {
        Self(OxBlankNode::default())
    }

    /// Create a blank node from a string identifier
    pub fn from_id(id: &str) -> RdfResult<Self> {
        OxBlankNode::new(id)
            .map(Self)
            .map_err(|e| RdfError::InvalidBlankNode(e.to_string()))
    }

    /// Get the blank node identifier
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.as_str())
    }
}

impl From<OxBlankNode> for BlankNode {
    fn from(node: OxBlankNode) -> Self {
        Self(node)
    }
}

/// RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    /// Create a simple literal (xsd:string)
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self(OxLiteral::new_simple_literal(value))
    }

    /// Create a literal with language tag
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        OxLiteral::new_language_tagged_literal(value, language)
            .map(Self)
            .map_err(|e| RdfError::InvalidLiteral(e.to_string()))
    }

    /// Create a typed literal
    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Self(OxLiteral::new_typed_literal(value, datatype.0))
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// Get the language tag if present
    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }

    /// Get the datatype
    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // oxrdf escapes the lexical form and omits the xsd:string datatype
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<OxLiteral> for Literal {
    fn from(lit: OxLiteral) -> Self {
        Self(lit)
    }
}

/// RDF subject (NamedNode or BlankNode)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
}

impl RdfSubject {
    /// Check if this is a blank node
    pub fn is_blank_node(&self) -> bool {
        matches!(self, RdfSubject::BlankNode(_))
    }
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(n) => write!(f, "{}", n),
            RdfSubject::BlankNode(b) => write!(f, "{}", b),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(node: NamedNode) -> Self {
        RdfSubject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(node: BlankNode) -> Self {
        RdfSubject::BlankNode(node)
    }
}

impl TryFrom<OxSubject> for RdfSubject {
    type Error = RdfError;

    fn try_from(subject: OxSubject) -> RdfResult<Self> {
        match subject {
            OxSubject::NamedNode(n) => Ok(RdfSubject::NamedNode(n.into())),
            OxSubject::BlankNode(b) => Ok(RdfSubject::BlankNode(b.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::UnexpectedTerm {
                term: other.to_string(),
                expected: "named node or blank node",
            }),
        }
    }
}

impl TryFrom<RdfObject> for RdfSubject {
    type Error = RdfError;

    fn try_from(object: RdfObject) -> RdfResult<Self> {
        match object {
            RdfObject::NamedNode(n) => Ok(RdfSubject::NamedNode(n)),
            RdfObject::BlankNode(b) => Ok(RdfSubject::BlankNode(b)),
            RdfObject::Literal(l) => Err(RdfError::UnexpectedTerm {
                term: l.to_string(),
                expected: "named node or blank node",
            }),
        }
    }
}

impl From<RdfSubject> for OxSubject {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => OxSubject::NamedNode(n.0),
            RdfSubject::BlankNode(b) => OxSubject::BlankNode(b.0),
        }
    }
}

/// RDF predicate (always a NamedNode)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RdfPredicate(NamedNode);

impl RdfPredicate {
    /// Create a new predicate from an IRI
    pub fn new(iri: &str) -> RdfResult<Self> {
        Ok(Self(NamedNode::new(iri)?))
    }

    /// Get the underlying named node
    pub fn as_named_node(&self) -> &NamedNode {
        &self.0
    }
}

impl fmt::Display for RdfPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for RdfPredicate {
    fn from(node: NamedNode) -> Self {
        RdfPredicate(node)
    }
}

impl From<RdfPredicate> for NamedNode {
    fn from(pred: RdfPredicate) -> Self {
        pred.0
    }
}

/// RDF object (NamedNode, BlankNode, or Literal)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfObject {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl RdfObject {
    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, RdfObject::Literal(_))
    }
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::NamedNode(n) => write!(f, "{}", n),
            RdfObject::BlankNode(b) => write!(f, "{}", b),
            RdfObject::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<NamedNode> for RdfObject {
    fn from(node: NamedNode) -> Self {
        RdfObject::NamedNode(node)
    }
}

impl From<BlankNode> for RdfObject {
    fn from(node: BlankNode) -> Self {
        RdfObject::BlankNode(node)
    }
}

impl From<Literal> for RdfObject {
    fn from(lit: Literal) -> Self {
        RdfObject::Literal(lit)
    }
}

impl From<RdfSubject> for RdfObject {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => RdfObject::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfObject::BlankNode(b),
        }
    }
}

impl TryFrom<OxTerm> for RdfObject {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        match term {
            OxTerm::NamedNode(n) => Ok(RdfObject::NamedNode(n.into())),
            OxTerm::BlankNode(b) => Ok(RdfObject::BlankNode(b.into())),
            OxTerm::Literal(l) => Ok(RdfObject::Literal(l.into())),
            #[allow(unreachable_patterns)]
            other => Err(RdfError::UnexpectedTerm {
                term: other.to_string(),
                expected: "named node, blank node or literal",
            }),
        }
    }
}

impl From<RdfObject> for OxTerm {
    fn from(object: RdfObject) -> Self {
        match object {
            RdfObject::NamedNode(n) => OxTerm::NamedNode(n.0),
            RdfObject::BlankNode(b) => OxTerm::BlankNode(b.0),
            RdfObject::Literal(l) => OxTerm::Literal(l.0),
        }
    }
}

/// RDF term (any RDF value), as bound in a query solution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    /// Named node (IRI)
    NamedNode(NamedNode),
    /// Blank node
    BlankNode(BlankNode),
    /// Literal value
    Literal(Literal),
}

impl RdfTerm {
    /// Get the named node if this term is an IRI
    pub fn as_named_node(&self) -> Option<&NamedNode> {
        match self {
            RdfTerm::NamedNode(n) => Some(n),
            _ => None,
        }
    }

    /// Get the literal if this term is a literal
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            RdfTerm::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// IRI string, blank node id or lexical form
    pub fn lexical_form(&self) -> &str {
        match self {
            RdfTerm::NamedNode(n) => n.as_str(),
            RdfTerm::BlankNode(b) => b.as_str(),
            RdfTerm::Literal(l) => l.value(),
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::NamedNode(n) => write!(f, "{}", n),
            RdfTerm::BlankNode(b) => write!(f, "{}", b),
            RdfTerm::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<RdfSubject> for RdfTerm {
    fn from(subject: RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfTerm::BlankNode(b),
        }
    }
}

impl From<RdfObject> for RdfTerm {
    fn from(object: RdfObject) -> Self {
        match object {
            RdfObject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfObject::BlankNode(b) => RdfTerm::BlankNode(b),
            RdfObject::Literal(l) => RdfTerm::Literal(l),
        }
    }
}

impl From<NamedNode> for RdfTerm {
    fn from(node: NamedNode) -> Self {
        RdfTerm::NamedNode(node)
    }
}

impl From<RdfTerm> for RdfObject {
    fn from(term: RdfTerm) -> Self {
        match term {
            RdfTerm::NamedNode(n) => RdfObject::NamedNode(n),
            RdfTerm::BlankNode(b) => RdfObject::BlankNode(b),
            RdfTerm::Literal(l) => RdfObject::Literal(l),
        }
    }
}

impl TryFrom<OxTerm> for RdfTerm {
    type Error = RdfError;

    fn try_from(term: OxTerm) -> RdfResult<Self> {
        RdfObject::try_from(term).map(RdfTerm::from)
    }
}

/// RDF triple (subject-predicate-object)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    /// Subject
    pub subject: RdfSubject,
    /// Predicate
    pub predicate: RdfPredicate,
    /// Object
    pub object: RdfObject,
}

impl Triple {
    /// Create a new triple
    pub fn new(
        subject: impl Into<RdfSubject>,
        predicate: impl Into<RdfPredicate>,
        object: impl Into<RdfObject>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Place this triple in a graph (None = default graph)
    pub fn in_graph(self, graph: Option<NamedNode>) -> Quad {
        Quad {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            graph,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

impl TryFrom<OxTriple> for Triple {
    type Error = RdfError;

    fn try_from(triple: OxTriple) -> RdfResult<Self> {
        Ok(Self {
            subject: triple.subject.try_into()?,
            predicate: RdfPredicate(triple.predicate.into()),
            object: triple.object.try_into()?,
        })
    }
}

/// RDF quad (triple + named graph)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    /// Subject
    pub subject: RdfSubject,
    /// Predicate
    pub predicate: RdfPredicate,
    /// Object
    pub object: RdfObject,
    /// Named graph (None = default graph)
    pub graph: Option<NamedNode>,
}

impl Quad {
    /// Get the triple part (without graph)
    pub fn as_triple(&self) -> Triple {
        Triple {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, graph
            )
        } else {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_node() {
        let node = NamedNode::new("http://example.org/alice").unwrap();
        assert_eq!(node.as_str(), "http://example.org/alice");
        assert_eq!(node.to_string(), "<http://example.org/alice>");

        assert!(NamedNode::new("not an iri").is_err());
    }

    #[test]
    fn test_blank_node() {
        let node1 = BlankNode::new();
        let node2 = BlankNode::new();
        assert_ne!(node1, node2);
        assert_eq!(BlankNode::from_id("b0").unwrap().to_string(), "_:b0");
    }

    #[test]
    fn test_literal_display_is_escaped() {
        let lit = Literal::new_simple_literal("say \"kg\"\n");
        assert_eq!(lit.to_string(), "\"say \\\"kg\\\"\\n\"");

        let lit = Literal::new_language_tagged_literal("Kilogramme", "fr").unwrap();
        assert_eq!(lit.language(), Some("fr"));
        assert_eq!(lit.to_string(), "\"Kilogramme\"@fr");

        let dt = NamedNode::new("http://www.w3.org/2001/XMLSchema#double").unwrap();
        let lit = Literal::new_typed_literal("1.5", dt);
        assert_eq!(
            lit.to_string(),
            "\"1.5\"^^<http://www.w3.org/2001/XMLSchema#double>"
        );
    }

    #[test]
    fn test_literal_cannot_be_subject() {
        let object = RdfObject::Literal(Literal::new_simple_literal("kg"));
        assert!(RdfSubject::try_from(object).is_err());

        let object = RdfObject::NamedNode(NamedNode::new("http://example.org/kg").unwrap());
        assert!(RdfSubject::try_from(object).is_ok());
    }

    #[test]
    fn test_triple_into_quad() {
        let subject = NamedNode::new("http://example.org/alice").unwrap();
        let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
        let object = Literal::new_simple_literal("Alice");
        let graph = NamedNode::new("http://example.org/graph/social").unwrap();

        let quad = Triple::new(subject, predicate, object).in_graph(Some(graph.clone()));
        assert_eq!(quad.graph, Some(graph));
        assert!(quad.as_triple().object.is_literal());
    }
}
