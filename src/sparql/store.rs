//! In-memory connection backed by an oxigraph store

use super::connection::SparqlConnection;
use super::parser::SparqlParser;
use super::results::QuerySolution;
use super::skeleton::{AskQuery, ConstructQuery, SelectQuery, UpdateQuery};
use super::{QueryExecutionError, SparqlResult, TransactionError};
use crate::rdf::{RdfTerm, Triple};
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::Store;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Connection to an oxigraph store.
///
/// Queries see the default graph as the union of all named graphs. Updates issued while a
/// transaction is open are buffered and applied as a single update request on commit; reads
/// inside the transaction see the last committed state.
pub struct OxigraphConnection {
    store: Store,
    pending: Mutex<Option<Vec<String>>>,
}

impl OxigraphConnection {
    /// Create a connection to a fresh in-memory store
    pub fn new() -> SparqlResult<Self> {
        let store = Store::new().map_err(|e| QueryExecutionError::Store(e.to_string()))?;
        Ok(Self::with_store(store))
    }

    /// Wrap an existing store
    pub fn with_store(store: Store) -> Self {
        Self {
            store,
            pending: Mutex::new(None),
        }
    }

    /// New connection sharing the same store but with its own transaction state
    pub fn session(&self) -> Self {
        Self::with_store(self.store.clone())
    }

    /// Underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn evaluate(&self, text: &str) -> SparqlResult<QueryResults> {
        SparqlParser::parse(text).map_err(QueryExecutionError::from)?;
        let mut query =
            Query::parse(text, None).map_err(|e| QueryExecutionError::Store(e.to_string()))?;
        query.dataset_mut().set_default_graph_as_union();

        Ok(self
            .store
            .query(query)
            .map_err(|e| QueryExecutionError::Store(e.to_string()))?)
    }

    fn apply(&self, text: &str) -> SparqlResult<()> {
        SparqlParser::parse_update(text).map_err(QueryExecutionError::from)?;
        Ok(self
            .store
            .update(text)
            .map_err(|e| QueryExecutionError::Store(e.to_string()))?)
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<Vec<String>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SparqlConnection for OxigraphConnection {
    fn execute_select(&self, query: &SelectQuery) -> SparqlResult<Vec<QuerySolution>> {
        match self.evaluate(&query.to_string())? {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution =
                        solution.map_err(|e| QueryExecutionError::Store(e.to_string()))?;

                    let mut row = QuerySolution::new();
                    for (variable, term) in solution.iter() {
                        row.bind(
                            variable.as_str(),
                            RdfTerm::try_from(term.clone()).map_err(QueryExecutionError::from)?,
                        );
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            _ => Err(QueryExecutionError::UnexpectedResults("solutions").into()),
        }
    }

    fn execute_ask(&self, query: &AskQuery) -> SparqlResult<bool> {
        match self.evaluate(&query.to_string())? {
            QueryResults::Boolean(result) => Ok(result),
            _ => Err(QueryExecutionError::UnexpectedResults("boolean").into()),
        }
    }

    fn execute_construct(&self, query: &ConstructQuery) -> SparqlResult<Vec<Triple>> {
        match self.evaluate(&query.to_string())? {
            QueryResults::Graph(triples) => {
                let mut out = Vec::new();
                for triple in triples {
                    let triple = triple.map_err(|e| QueryExecutionError::Store(e.to_string()))?;
                    out.push(Triple::try_from(triple).map_err(QueryExecutionError::from)?);
                }
                Ok(out)
            }
            _ => Err(QueryExecutionError::UnexpectedResults("graph").into()),
        }
    }

    fn execute_update(&self, update: &UpdateQuery) -> SparqlResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        let text = update.to_string();

        let mut pending = self.pending();
        if let Some(buffer) = pending.as_mut() {
            SparqlParser::parse_update(&text).map_err(QueryExecutionError::from)?;
            buffer.push(text);
            return Ok(());
        }
        drop(pending);

        self.apply(&text)
    }

    fn start_transaction(&self) -> SparqlResult<()> {
        let mut pending = self.pending();
        if pending.is_some() {
            return Err(TransactionError::AlreadyStarted.into());
        }
        *pending = Some(Vec::new());
        Ok(())
    }

    fn commit_transaction(&self) -> SparqlResult<()> {
        let buffer = self
            .pending()
            .take()
            .ok_or(TransactionError::NotStarted)?;
        if buffer.is_empty() {
            return Ok(());
        }

        debug!("Committing transaction with {} update(s)", buffer.len());
        self.apply(&buffer.join(" ;\n"))
            .map_err(|e| TransactionError::Commit(e.to_string()).into())
    }

    fn rollback_transaction(&self) -> SparqlResult<()> {
        let buffer = self
            .pending()
            .take()
            .ok_or(TransactionError::NotStarted)?;
        debug!("Rolled back transaction, {} update(s) discarded", buffer.len());
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.pending().is_some()
    }
}
