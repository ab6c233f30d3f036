//! SPARQL 1.1 query construction and execution
//!
//! Queries are assembled as an abstract tree ([`GroupPattern`], [`QuerySkeleton`],
//! [`SelectQuery`], [`UpdateQuery`]) and rendered to SPARQL text only at the connection
//! boundary, where it is validated before being handed to the store.
//!
//! # Example
//!
//! ```rust
//! use samyama_ogm::sparql::{
//!     GroupPattern, OxigraphConnection, Projection, QuerySkeleton, SelectQuery,
//!     SparqlConnection, TriplePattern, Variable,
//! };
//! use samyama_ogm::rdf::NamedNode;
//!
//! let connection = OxigraphConnection::new().unwrap();
//!
//! let mut root = GroupPattern::new();
//! root.add_triple(TriplePattern::new(
//!     Variable::new("uri"),
//!     NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
//!     Variable::new("name"),
//! ));
//! let mut query = SelectQuery::new(QuerySkeleton::from_pattern(root));
//! query.add_projection(Projection::Variable(Variable::new("name")));
//!
//! let rows = connection.execute_select(&query).unwrap();
//! assert!(rows.is_empty());
//! ```

mod algebra;
mod connection;
mod parser;
mod results;
mod skeleton;
mod store;

pub use algebra::{
    Expression, Function, GroupElement, GroupPattern, OrderCondition, OrderDirection,
    PropertyPath, TermPattern, TriplePattern, Variable,
};
pub use connection::SparqlConnection;
pub use parser::{ParseError as SparqlParseError, SparqlParser};
pub use results::QuerySolution;
pub use skeleton::{
    AskQuery, ConstructQuery, Projection, QuerySkeleton, SelectQuery, UpdateOperation,
    UpdateQuery,
};
pub use store::OxigraphConnection;

use crate::rdf::RdfError;
use thiserror::Error;

/// A query or update the store could not run
#[derive(Error, Debug)]
pub enum QueryExecutionError {
    /// Generated text failed syntax validation
    #[error("Malformed query: {0}")]
    Malformed(#[from] parser::ParseError),

    /// The store rejected or failed to evaluate the request
    #[error("Store error: {0}")]
    Store(String),

    /// The store answered with a result form other than the one requested
    #[error("Unexpected query results, expected {0}")]
    UnexpectedResults(&'static str),

    /// A returned term could not be represented
    #[error("Invalid term in results: {0}")]
    InvalidTerm(#[from] RdfError),

    /// An RDF document could not be parsed
    #[error("Load error: {0}")]
    Load(#[from] crate::rdf::ParseError),
}

/// Transaction state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction already started")]
    AlreadyStarted,

    #[error("No transaction in progress")]
    NotStarted,

    #[error("Commit failed: {0}")]
    Commit(String),
}

/// SPARQL errors
#[derive(Error, Debug)]
pub enum SparqlError {
    #[error(transparent)]
    Query(#[from] QueryExecutionError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

pub type SparqlResult<T> = Result<T, SparqlError>;
