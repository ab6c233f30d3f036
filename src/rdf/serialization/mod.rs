//! RDF serialization formats
//!
//! Ontologies are loaded from Turtle, N-Triples or RDF/XML; generated shape documents are
//! written as Turtle.

mod rdfxml;
mod turtle;

pub use rdfxml::RdfXmlParserWrapper;
pub use turtle::{NTriplesParserWrapper, TurtleParserWrapper, TurtleSerializerWrapper};

use super::Triple;
use std::io::BufRead;
use thiserror::Error;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// RDF/XML format (.rdf, .owl)
    RdfXml,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Media type of the format
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(RdfFormat),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a reader
    pub fn parse(input: impl BufRead, format: RdfFormat) -> ParseResult<Vec<Triple>> {
        match format {
            RdfFormat::Turtle => TurtleParserWrapper::parse_reader(input),
            RdfFormat::NTriples => NTriplesParserWrapper::parse_reader(input),
            RdfFormat::RdfXml => RdfXmlParserWrapper::parse_reader(input),
        }
    }

    /// Parse RDF data from a string
    pub fn parse_str(input: &str, format: RdfFormat) -> ParseResult<Vec<Triple>> {
        Self::parse(input.as_bytes(), format)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a string
    pub fn serialize(triples: &[Triple], format: RdfFormat) -> SerializeResult<String> {
        match format {
            RdfFormat::Turtle => TurtleSerializerWrapper::serialize(triples),
            RdfFormat::NTriples => Ok(triples.iter().map(|t| format!("{t}\n")).collect()),
            other => Err(SerializeError::UnsupportedFormat(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("owl"), Some(RdfFormat::RdfXml));
        assert_eq!(RdfFormat::from_extension("json"), None);
    }

    #[test]
    fn test_parse_each_format() {
        let turtle = "@prefix ex: <http://example.org/> . ex:kg ex:symbol \"kg\" .";
        assert_eq!(RdfParser::parse_str(turtle, RdfFormat::Turtle).unwrap().len(), 1);

        let ntriples = "<http://example.org/kg> <http://example.org/symbol> \"kg\" .\n";
        assert_eq!(RdfParser::parse_str(ntriples, RdfFormat::NTriples).unwrap().len(), 1);

        let xml = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/">
  <rdf:Description rdf:about="http://example.org/kg">
    <ex:symbol>kg</ex:symbol>
  </rdf:Description>
</rdf:RDF>"#;
        assert_eq!(RdfParser::parse_str(xml, RdfFormat::RdfXml).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        assert!(RdfParser::parse_str("<http://example.org/a> .", RdfFormat::Turtle).is_err());
    }

    #[test]
    fn test_rdfxml_serialization_is_unsupported() {
        assert!(matches!(
            RdfSerializer::serialize(&[], RdfFormat::RdfXml),
            Err(SerializeError::UnsupportedFormat(RdfFormat::RdfXml))
        ));
    }
}
