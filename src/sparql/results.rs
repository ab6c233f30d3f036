//! SPARQL query results

use crate::rdf::{Literal, NamedNode, RdfTerm};
use std::collections::HashMap;

/// Query solution (variable bindings of one result row)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings
    pub bindings: HashMap<String, RdfTerm>,
}

impl QuerySolution {
    /// Create a new query solution
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a binding
    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable)
    }

    /// Get a binding when it is an IRI
    pub fn get_named_node(&self, variable: &str) -> Option<&NamedNode> {
        self.get(variable).and_then(RdfTerm::as_named_node)
    }

    /// Get a binding when it is a literal
    pub fn get_literal(&self, variable: &str) -> Option<&Literal> {
        self.get(variable).and_then(RdfTerm::as_literal)
    }

    /// Add a binding
    pub fn bind(&mut self, variable: impl Into<String>, term: RdfTerm) {
        self.bindings.insert(variable.into(), term);
    }

    pub fn is_bound(&self, variable: &str) -> bool {
        self.bindings.contains_key(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_solution() {
        let mut solution = QuerySolution::new();
        assert!(solution.bindings.is_empty());

        let uri = NamedNode::new("http://example.org/kg").unwrap();
        solution.bind("uri", RdfTerm::NamedNode(uri.clone()));
        solution.bind("symbol", RdfTerm::Literal(Literal::new_simple_literal("kg")));

        assert_eq!(solution.get_named_node("uri"), Some(&uri));
        assert_eq!(solution.get_literal("symbol").map(|l| l.value()), Some("kg"));
        assert!(solution.get_named_node("symbol").is_none());
        assert!(!solution.is_bound("alternativeSymbol"));
    }
}
