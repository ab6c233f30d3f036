//! Vocabulary constants and namespace prefix management
//!
//! The mapping layer only needs a handful of well-known terms (rdf:type, rdfs:subClassOf,
//! rdfs:label, the XSD datatypes and the SHACL core vocabulary); they are exposed as string
//! constants plus `NamedNode` constructors. `NamespaceManager` expands compact IRIs such as
//! `xsd:double` when URI values are given in prefixed form.

use super::NamedNode;
use std::collections::HashMap;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

pub mod rdf {
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
}

pub mod owl {
    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
}

pub mod xsd {
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";
    pub const SHORT: &str = "http://www.w3.org/2001/XMLSchema#short";
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
}

pub mod sh {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/shacl#";
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const UNIQUE_LANG: &str = "http://www.w3.org/ns/shacl#uniqueLang";
}

/// Build a named node for one of the vocabulary constants
pub fn term(iri: &'static str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

/// Namespace manager with common prefixes
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings
    prefixes: HashMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with common prefixes
    pub fn new() -> Self {
        let mut mgr = Self {
            prefixes: HashMap::new(),
        };

        mgr.add_prefix("rdf", rdf::NAMESPACE);
        mgr.add_prefix("rdfs", rdfs::NAMESPACE);
        mgr.add_prefix("xsd", xsd::NAMESPACE);
        mgr.add_prefix("owl", owl::NAMESPACE);
        mgr.add_prefix("sh", sh::NAMESPACE);
        mgr.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        mgr.add_prefix("dcterms", "http://purl.org/dc/terms/");
        mgr.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");

        mgr
    }

    /// Add a prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        match compact_iri.split_once(':') {
            Some((prefix, local)) => Ok(format!("{}{}", self.get_iri(prefix)?, local)),
            None => Err(PrefixError::InvalidIri(compact_iri.to_string())),
        }
    }

    /// Resolve a value that is either an absolute IRI or a compact IRI with a known prefix
    pub fn resolve(&self, value: &str) -> PrefixResult<NamedNode> {
        let value = value.trim();
        let iri = match value.split_once(':') {
            Some((prefix, _)) if self.prefixes.contains_key(prefix) => self.expand(value)?,
            _ => value.to_string(),
        };
        NamedNode::new(&iri).map_err(|_| PrefixError::InvalidIri(value.to_string()))
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, namespace)| iri.starts_with(namespace.as_str()))
            .max_by_key(|(_, namespace)| namespace.len())
            .map(|(prefix, namespace)| format!("{}:{}", prefix, &iri[namespace.len()..]))
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let mgr = NamespaceManager::new();

        assert_eq!(mgr.get_iri("rdf").unwrap(), rdf::NAMESPACE);
        assert_eq!(mgr.get_iri("sh").unwrap(), sh::NAMESPACE);
        assert!(mgr.get_iri("ex").is_err());
    }

    #[test]
    fn test_expand() {
        let mgr = NamespaceManager::new();

        assert_eq!(mgr.expand("rdf:type").unwrap(), rdf::TYPE);
        assert_eq!(mgr.expand("xsd:double").unwrap(), xsd::DOUBLE);
    }

    #[test]
    fn test_resolve_prefixed_and_absolute() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ex", "http://example.org/");

        assert_eq!(mgr.resolve("ex:kg").unwrap().as_str(), "http://example.org/kg");
        assert_eq!(
            mgr.resolve("http://example.org/g").unwrap().as_str(),
            "http://example.org/g"
        );
        assert!(mgr.resolve("no iri here").is_err());
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ex", "http://example.org/");
        mgr.add_prefix("exv", "http://example.org/vocab#");

        assert_eq!(
            mgr.compact("http://example.org/vocab#Unit"),
            Some("exv:Unit".to_string())
        );
        assert_eq!(mgr.compact(rdfs::LABEL), Some("rdfs:label".to_string()));
        assert_eq!(mgr.compact("urn:x"), None);
    }
}
