//! Error taxonomy of the mapping layer

use crate::config::ConfigError;
use crate::mapping::DeserializerError;
use crate::rdf::{NamedNode, PrefixError, RdfError};
use crate::sparql::{QueryExecutionError, SparqlError, TransactionError};
use crate::uri::UriError;
use std::sync::Arc;
use thiserror::Error;

/// Mapping layer errors
#[derive(Error, Debug)]
pub enum OgmError {
    /// Malformed entity schema, detected at analysis time
    #[error("Invalid mapping for {type_name}: {message}")]
    MappingDefinition {
        type_name: &'static str,
        message: String,
    },

    /// Type was never registered with the mapper index
    #[error("Unknown mapped type: {0}")]
    UnknownMappedType(String),

    /// Required field without value
    #[error("Missing value for required field '{field}'")]
    MissingRequiredField { field: String },

    /// Object property value without a URI
    #[error("Related resource of field '{field}' has no URI")]
    UnresolvedReference { field: String },

    /// Caller supplied URI is already used
    #[error("URI already exists: {0}")]
    AlreadyExistingUri(NamedNode),

    /// No free URI found within the strategy retry bound
    #[error("Could not generate a free URI under {prefix} after {attempts} attempts")]
    UriGenerationExhausted { prefix: String, attempts: u32 },

    /// Order or filter on a field the type does not declare
    #[error("Unknown field '{field}' for {type_name}")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// Update or delete of a resource absent from the store
    #[error("Resource not found: {0}")]
    NotFound(NamedNode),

    /// Several resources where one was expected
    #[error("Multiple results for {0}")]
    MultipleResults(String),

    /// Stored value cannot be converted to the declared datatype
    #[error("Deserialization error on field '{field}': {source}")]
    Deserialization {
        field: String,
        #[source]
        source: DeserializerError,
    },

    /// Memoized failure of a lazy relation
    #[error("Relation load failed: {0}")]
    RelationLoad(Arc<OgmError>),

    #[error(transparent)]
    QueryExecution(#[from] QueryExecutionError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    UriGeneration(#[from] UriError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rdf(#[from] RdfError),

    #[error(transparent)]
    Prefix(#[from] PrefixError),
}

impl From<SparqlError> for OgmError {
    fn from(err: SparqlError) -> Self {
        match err {
            SparqlError::Query(e) => OgmError::QueryExecution(e),
            SparqlError::Transaction(e) => OgmError::Transaction(e),
        }
    }
}

impl OgmError {
    pub(crate) fn mapping(type_name: &'static str, message: impl Into<String>) -> Self {
        OgmError::MappingDefinition {
            type_name,
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        OgmError::MissingRequiredField {
            field: field.into(),
        }
    }

    pub(crate) fn deserialization(field: impl Into<String>, source: DeserializerError) -> Self {
        OgmError::Deserialization {
            field: field.into(),
            source,
        }
    }

    pub(crate) fn unresolved(field: impl Into<String>) -> Self {
        OgmError::UnresolvedReference {
            field: field.into(),
        }
    }
}

pub type OgmResult<T> = Result<T, OgmError>;
