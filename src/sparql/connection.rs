//! Store connection abstraction
//!
//! The mapping layer builds abstract queries; a connection serializes them to the store's wire
//! format, executes them and returns row-oriented results. Implementations must apply one
//! `execute_update` call atomically and buffer updates between `start_transaction` and
//! `commit_transaction`.

use super::results::QuerySolution;
use super::skeleton::{AskQuery, ConstructQuery, SelectQuery, UpdateQuery};
use super::SparqlResult;
use crate::rdf::{NamedNode, RdfFormat, RdfParser, Triple};
use std::io::BufRead;
use tracing::info;

/// Connection to a single SPARQL store
pub trait SparqlConnection: Send + Sync {
    /// Run a SELECT query and return its rows
    fn execute_select(&self, query: &SelectQuery) -> SparqlResult<Vec<QuerySolution>>;

    /// Run an ASK query
    fn execute_ask(&self, query: &AskQuery) -> SparqlResult<bool>;

    /// Run a CONSTRUCT query
    fn execute_construct(&self, query: &ConstructQuery) -> SparqlResult<Vec<Triple>>;

    /// Apply an update request as one atomic unit
    fn execute_update(&self, update: &UpdateQuery) -> SparqlResult<()>;

    /// Apply an update request made of deletions
    fn execute_delete(&self, delete: &UpdateQuery) -> SparqlResult<()> {
        self.execute_update(delete)
    }

    fn start_transaction(&self) -> SparqlResult<()>;

    fn commit_transaction(&self) -> SparqlResult<()>;

    fn rollback_transaction(&self) -> SparqlResult<()>;

    /// Whether a transaction is currently open on this connection
    fn in_transaction(&self) -> bool;

    /// Remove every triple of a named graph
    fn clear_graph(&self, graph: &NamedNode) -> SparqlResult<()> {
        let mut update = UpdateQuery::new();
        update.clear(Some(graph.clone()));
        self.execute_update(&update)
    }

    /// Remove every triple of the store
    fn clear(&self) -> SparqlResult<()> {
        let mut update = UpdateQuery::new();
        update.clear(None);
        self.execute_update(&update)
    }

    /// Parse an RDF document and insert its triples into a named graph
    fn load_ontology(
        &self,
        graph: &NamedNode,
        input: &mut dyn BufRead,
        format: RdfFormat,
    ) -> SparqlResult<()> {
        let triples = RdfParser::parse(input, format).map_err(super::QueryExecutionError::from)?;
        info!("Loading {} triples into {}", triples.len(), graph);

        let mut update = UpdateQuery::new();
        for triple in triples {
            update.insert(triple.in_graph(Some(graph.clone())));
        }
        self.execute_update(&update)
    }
}
