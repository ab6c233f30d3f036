//! RDF primitives used by the mapping layer
//!
//! - RDF terms, triples and quads (wrapping oxrdf)
//! - Vocabulary constants and namespace prefixes
//! - Turtle, N-Triples and RDF/XML parsing, Turtle serialization
//!
//! # Example
//!
//! ```rust
//! use samyama_ogm::rdf::{NamedNode, Literal, RdfPredicate, Triple};
//!
//! let subject = NamedNode::new("http://example.org/unit/kg").unwrap();
//! let predicate = RdfPredicate::new("http://example.org/vocab#hasSymbol").unwrap();
//! let triple = Triple::new(subject, predicate, Literal::new_simple_literal("kg"));
//!
//! assert_eq!(
//!     triple.to_string(),
//!     "<http://example.org/unit/kg> <http://example.org/vocab#hasSymbol> \"kg\" ."
//! );
//! ```

pub mod namespace;
mod serialization;
mod types;

pub use types::{
    BlankNode, Literal, NamedNode, Quad, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    RdfTerm, Triple,
};

pub use namespace::{NamespaceManager, PrefixError, PrefixResult};

pub use serialization::{
    NTriplesParserWrapper, ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer,
    RdfXmlParserWrapper, SerializeError, SerializeResult, TurtleParserWrapper,
    TurtleSerializerWrapper,
};
