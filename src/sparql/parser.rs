//! SPARQL syntax validation using the spargebra library
//!
//! Generated text is parsed before it is handed to a store so that a malformed query surfaces
//! as a typed error carrying the offending text, independent of the store's own diagnostics.

use thiserror::Error;

/// Parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Syntax error
    #[error("Syntax error: {message}\n{text}")]
    Syntax { message: String, text: String },
}

/// SPARQL parser
pub struct SparqlParser;

impl SparqlParser {
    /// Parse a SPARQL query string
    pub fn parse(query: &str) -> Result<spargebra::Query, ParseError> {
        spargebra::Query::parse(query, None).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
            text: query.to_string(),
        })
    }

    /// Parse a SPARQL UPDATE string
    pub fn parse_update(update: &str) -> Result<spargebra::Update, ParseError> {
        spargebra::Update::parse(update, None).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
            text: update.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        assert!(SparqlParser::parse("SELECT * WHERE { ?s ?p ?o }").is_ok());
        assert!(SparqlParser::parse("SELECT * WHERE { ?s ?p }").is_err());
    }

    #[test]
    fn test_parse_update() {
        assert!(SparqlParser::parse_update(
            "INSERT DATA { GRAPH <http://example.org/g> { <http://example.org/s> <http://example.org/p> \"o\" . } }"
        )
        .is_ok());
        assert!(SparqlParser::parse_update("INSERT DATA { ?s ?p ?o }").is_err());
    }
}
