//! RDF/XML parsing (rio_xml)

use super::turtle::collect_triples;
use super::{ParseError, ParseResult};
use crate::rdf::Triple;
use rio_xml::{RdfXmlError, RdfXmlParser};
use std::io::BufRead;

impl From<RdfXmlError> for ParseError {
    fn from(e: RdfXmlError) -> Self {
        ParseError::Parse(e.to_string())
    }
}

/// RDF/XML parser, used for OWL ontology files
pub struct RdfXmlParserWrapper;

impl RdfXmlParserWrapper {
    /// Parse RDF/XML from any buffered reader
    pub fn parse_reader(input: impl BufRead) -> ParseResult<Vec<Triple>> {
        collect_triples(RdfXmlParser::new(input, None))
    }
}
