//! Samyama OGM
//!
//! Object-graph mapping between typed Rust entities and RDF triple stores queried over SPARQL 1.1.
//!
//! # Architecture
//!
//! - [`rdf`]: RDF terms, namespaces, parsing and serialization
//! - [`sparql`]: SPARQL query tree, results and store connections
//! - [`mapping`]: entity schemas, their analysis and the query builders derived from them
//! - [`uri`]: URI generation strategies
//! - [`service`]: typed CRUD and search over one connection
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_ogm::mapping::{Datatype, FieldDeclaration, ResourceSchema, ResourceValues};
//! use samyama_ogm::rdf::NamedNode;
//! use samyama_ogm::sparql::OxigraphConnection;
//! use samyama_ogm::uri::UriStrategy;
//! use samyama_ogm::{MapperIndex, OgmConfig, OgmResult, SearchQuery, SparqlResource, SparqlService};
//! use std::sync::Arc;
//!
//! struct Unit {
//!     uri: Option<NamedNode>,
//!     symbol: String,
//! }
//!
//! impl SparqlResource for Unit {
//!     fn schema() -> ResourceSchema {
//!         ResourceSchema::new()
//!             .rdf_type("http://example.org/vocab#Unit")
//!             .graph("set/units")
//!             .uri_field("uri")
//!             .uri_strategy(UriStrategy::segments("id/unit", &["symbol"]))
//!             .field(
//!                 FieldDeclaration::data("symbol", "http://example.org/vocab#symbol", Datatype::String)
//!                     .required(),
//!             )
//!     }
//!
//!     fn uri(&self) -> Option<&NamedNode> {
//!         self.uri.as_ref()
//!     }
//!
//!     fn set_uri(&mut self, uri: NamedNode) {
//!         self.uri = Some(uri);
//!     }
//!
//!     fn to_values(&self) -> ResourceValues {
//!         ResourceValues::new(self.uri.as_ref()).data("symbol", Some(self.symbol.as_str()))
//!     }
//!
//!     fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
//!         Ok(Unit {
//!             uri: values.uri.clone(),
//!             symbol: values.require_data("symbol")?,
//!         })
//!     }
//! }
//!
//! let index = MapperIndex::builder()
//!     .register::<Unit>()
//!     .build_with_defaults(OgmConfig::default())
//!     .unwrap();
//! let service = SparqlService::new(OxigraphConnection::new().unwrap(), Arc::new(index));
//!
//! let mut unit = Unit { uri: None, symbol: "kg".to_string() };
//! service.create(&mut unit).unwrap();
//! assert_eq!(
//!     unit.uri.as_ref().unwrap().as_str(),
//!     "http://default.samyama.org/id/unit/kg"
//! );
//!
//! let units: Vec<Unit> = service.search(&SearchQuery::new()).unwrap();
//! assert_eq!(units.len(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod mapping;
pub mod rdf;
pub mod service;
pub mod sparql;
pub mod uri;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, OgmConfig};

pub use error::{OgmError, OgmResult};

pub use mapping::{
    ClassQueryBuilder, EntityDescription, Label, LazyList, LazyRelation, MapperIndex,
    RelationLoader, ResourceValues, SparqlResource,
};

pub use rdf::{BlankNode, Literal, NamedNode, NamespaceManager, RdfFormat, Triple};

pub use service::{OrderBy, PaginatedList, SearchQuery, SparqlService};

pub use sparql::{
    OxigraphConnection, QuerySolution, SelectQuery, SparqlConnection, SparqlError, SparqlResult,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "1.0.0");
    }
}
