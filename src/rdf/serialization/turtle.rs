//! Turtle and N-Triples implementation (rio_turtle)

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::namespace::xsd;
use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleError, TurtleFormatter, TurtleParser};
use std::io::BufRead;

impl From<TurtleError> for ParseError {
    fn from(e: TurtleError) -> Self {
        ParseError::Parse(e.to_string())
    }
}

/// Turtle parser
pub struct TurtleParserWrapper;

impl TurtleParserWrapper {
    /// Parse Turtle string to Triples
    pub fn parse(input: &str) -> ParseResult<Vec<Triple>> {
        Self::parse_reader(input.as_bytes())
    }

    /// Parse Turtle from any buffered reader
    pub fn parse_reader(input: impl BufRead) -> ParseResult<Vec<Triple>> {
        collect_triples(TurtleParser::new(input, None))
    }
}

/// N-Triples parser
pub struct NTriplesParserWrapper;

impl NTriplesParserWrapper {
    /// Parse N-Triples from any buffered reader
    pub fn parse_reader(input: impl BufRead) -> ParseResult<Vec<Triple>> {
        collect_triples(NTriplesParser::new(input))
    }
}

/// Drain a rio parser into owned triples
pub(super) fn collect_triples<P>(mut parser: P) -> ParseResult<Vec<Triple>>
where
    P: TriplesParser,
    ParseError: From<P::Error>,
{
    let mut triples = Vec::new();
    parser.parse_all(&mut |t| -> Result<(), ParseError> {
        let subject = convert_subject(t.subject)?;
        let predicate = convert_predicate(t.predicate)?;
        let object = convert_object(t.object)?;
        triples.push(Triple::new(subject, predicate, object));
        Ok(())
    })?;
    Ok(triples)
}

/// Turtle serializer
pub struct TurtleSerializerWrapper;

impl TurtleSerializerWrapper {
    /// Serialize Triples to Turtle string
    pub fn serialize(triples: &[Triple]) -> SerializeResult<String> {
        let mut output = Vec::new();
        let mut formatter = TurtleFormatter::new(&mut output);

        for triple in triples {
            let subject = match &triple.subject {
                RdfSubject::NamedNode(n) => {
                    rio_api::model::Subject::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
                }
                RdfSubject::BlankNode(b) => {
                    rio_api::model::Subject::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
                }
            };

            let predicate = rio_api::model::NamedNode {
                iri: triple.predicate.as_named_node().as_str(),
            };

            let datatype;
            let object = match &triple.object {
                RdfObject::NamedNode(n) => {
                    rio_api::model::Term::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
                }
                RdfObject::BlankNode(b) => {
                    rio_api::model::Term::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
                }
                RdfObject::Literal(l) => {
                    let literal = if let Some(language) = l.language() {
                        rio_api::model::Literal::LanguageTaggedString {
                            value: l.value(),
                            language,
                        }
                    } else {
                        datatype = l.datatype();
                        if datatype.as_str() == xsd::STRING {
                            rio_api::model::Literal::Simple { value: l.value() }
                        } else {
                            rio_api::model::Literal::Typed {
                                value: l.value(),
                                datatype: rio_api::model::NamedNode {
                                    iri: datatype.as_str(),
                                },
                            }
                        }
                    };
                    rio_api::model::Term::Literal(literal)
                }
            };

            formatter
                .format(&rio_api::model::Triple {
                    subject,
                    predicate,
                    object,
                })
                .map_err(|e| SerializeError::Serialize(e.to_string()))?;
        }

        formatter
            .finish()
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;

        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}

pub(super) fn convert_subject(s: rio_api::model::Subject) -> ParseResult<RdfSubject> {
    match s {
        rio_api::model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(
            BlankNode::from_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

pub(super) fn convert_predicate(p: rio_api::model::NamedNode) -> ParseResult<RdfPredicate> {
    RdfPredicate::new(p.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

pub(super) fn convert_object(o: rio_api::model::Term) -> ParseResult<RdfObject> {
    match o {
        rio_api::model::Term::NamedNode(n) => Ok(RdfObject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Term::BlankNode(b) => Ok(RdfObject::BlankNode(
            BlankNode::from_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        rio_api::model::Term::Literal(l) => match l {
            rio_api::model::Literal::Simple { value } => {
                Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
            }
            rio_api::model::Literal::LanguageTaggedString { value, language } => {
                Ok(RdfObject::Literal(
                    Literal::new_language_tagged_literal(value, language)
                        .map_err(|e| ParseError::Parse(e.to_string()))?,
                ))
            }
            rio_api::model::Literal::Typed { value, datatype } => {
                let dt =
                    NamedNode::new(datatype.iri).map_err(|e| ParseError::Parse(e.to_string()))?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}
