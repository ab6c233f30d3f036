#![allow(dead_code)]

use samyama_ogm::mapping::{
    Datatype, FieldDeclaration, Label, LazyList, LazyRelation, ResourceSchema, ResourceValues,
};
use samyama_ogm::rdf::NamedNode;
use samyama_ogm::sparql::OxigraphConnection;
use samyama_ogm::uri::UriStrategy;
use samyama_ogm::{MapperIndex, OgmConfig, OgmResult, SparqlResource, SparqlService};
use std::sync::{Arc, Once};

pub const VOCAB: &str = "http://example.org/vocab#";

pub fn vocab(local: &str) -> NamedNode {
    NamedNode::new(&format!("{}{}", VOCAB, local)).unwrap()
}

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn config() -> OgmConfig {
    let mut config = OgmConfig {
        base_uri: "http://test.samyama.org/".to_string(),
        ..OgmConfig::default()
    };
    config.prefixes.insert("ex".to_string(), VOCAB.to_string());
    config
}

pub fn index() -> Arc<MapperIndex> {
    Arc::new(
        MapperIndex::builder()
            .register::<Unit>()
            .register::<Variable>()
            .register::<Event>()
            .register::<Study>()
            .register::<Experiment>()
            .build_with_defaults(config())
            .unwrap(),
    )
}

pub fn service() -> SparqlService<OxigraphConnection> {
    init_tracing();
    SparqlService::new(OxigraphConnection::new().unwrap(), index())
}

/// Measurement unit, with one required and one optional field
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub uri: Option<NamedNode>,
    pub symbol: String,
    pub alternative_symbol: Option<String>,
}

impl Unit {
    pub fn new(symbol: &str) -> Self {
        Self {
            uri: None,
            symbol: symbol.to_string(),
            alternative_symbol: None,
        }
    }
}

impl SparqlResource for Unit {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("ex:Unit")
            .graph("set/units")
            .uri_field("uri")
            .uri_strategy(UriStrategy::segments("id/unit", &["symbol"]))
            .field(FieldDeclaration::data("symbol", "ex:symbol", Datatype::String).required())
            .field(FieldDeclaration::data(
                "alternativeSymbol",
                "ex:alternativeSymbol",
                Datatype::String,
            ))
    }

    fn uri(&self) -> Option<&NamedNode> {
        self.uri.as_ref()
    }

    fn set_uri(&mut self, uri: NamedNode) {
        self.uri = Some(uri);
    }

    fn to_values(&self) -> ResourceValues {
        ResourceValues::new(self.uri.as_ref())
            .data("symbol", Some(self.symbol.as_str()))
            .data("alternativeSymbol", self.alternative_symbol.as_deref())
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Self {
            uri: values.uri.clone(),
            symbol: values.require_data("symbol")?,
            alternative_symbol: values.take_data("alternativeSymbol")?,
        })
    }
}

/// Observed variable with a translated name and an optional unit
#[derive(Debug, Clone)]
pub struct Variable {
    pub uri: Option<NamedNode>,
    pub name: Label,
    pub comment: Option<Label>,
    pub unit: Option<LazyRelation<Unit>>,
    pub synonyms: Vec<String>,
}

impl Variable {
    pub fn new(name: Label) -> Self {
        Self {
            uri: None,
            name,
            comment: None,
            unit: None,
            synonyms: Vec::new(),
        }
    }
}

impl SparqlResource for Variable {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("ex:Variable")
            .graph("set/variables")
            .uri_field("uri")
            .uri_strategy(UriStrategy::segments("id/variable", &["name"]))
            .field(FieldDeclaration::label("name", "rdfs:label").required())
            .field(FieldDeclaration::label("comment", "rdfs:comment"))
            .field(FieldDeclaration::object::<Unit>("unit", "ex:hasUnit"))
            .field(FieldDeclaration::data_list("synonyms", "ex:synonym", Datatype::String))
    }

    fn uri(&self) -> Option<&NamedNode> {
        self.uri.as_ref()
    }

    fn set_uri(&mut self, uri: NamedNode) {
        self.uri = Some(uri);
    }

    fn to_values(&self) -> ResourceValues {
        ResourceValues::new(self.uri.as_ref())
            .label("name", Some(&self.name))
            .label("comment", self.comment.as_ref())
            .object("unit", self.unit.as_ref())
            .data_list("synonyms", &self.synonyms)
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Self {
            uri: values.uri.clone(),
            name: values.take_label("name")?.unwrap_or_default(),
            comment: values.take_label("comment")?,
            unit: values.take_relation("unit")?,
            synonyms: values.take_data_list("synonyms")?,
        })
    }
}

/// Event numbered by a per-year sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub uri: Option<NamedNode>,
    pub description: String,
}

impl Event {
    pub fn new(description: &str) -> Self {
        Self {
            uri: None,
            description: description.to_string(),
        }
    }
}

impl SparqlResource for Event {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("ex:Event")
            .uri_field("uri")
            .uri_strategy(UriStrategy::year_sequence("id/event", "ev"))
            .field(FieldDeclaration::data("description", "ex:description", Datatype::String).required())
    }

    fn uri(&self) -> Option<&NamedNode> {
        self.uri.as_ref()
    }

    fn set_uri(&mut self, uri: NamedNode) {
        self.uri = Some(uri);
    }

    fn to_values(&self) -> ResourceValues {
        ResourceValues::new(self.uri.as_ref()).data("description", Some(self.description.as_str()))
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Self {
            uri: values.uri.clone(),
            description: values.require_data("description")?,
        })
    }
}

/// Study listing the experiments that declare themselves part of it
#[derive(Debug, Clone)]
pub struct Study {
    pub uri: Option<NamedNode>,
    pub title: String,
    pub experiments: LazyList<Experiment>,
}

impl SparqlResource for Study {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("ex:Study")
            .uri_field("uri")
            .uri_strategy(UriStrategy::segments("id/study", &["title"]))
            .field(FieldDeclaration::data("title", "ex:title", Datatype::String).required())
            .field(FieldDeclaration::object_list::<Experiment>("experiments", "ex:partOf").reverse())
    }

    fn uri(&self) -> Option<&NamedNode> {
        self.uri.as_ref()
    }

    fn set_uri(&mut self, uri: NamedNode) {
        self.uri = Some(uri);
    }

    fn to_values(&self) -> ResourceValues {
        ResourceValues::new(self.uri.as_ref())
            .data("title", Some(self.title.as_str()))
            .object_list("experiments", &self.experiments)
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Self {
            uri: values.uri.clone(),
            title: values.require_data("title")?,
            experiments: values.take_list("experiments")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Experiment {
    pub uri: Option<NamedNode>,
    pub name: String,
    pub study: Option<LazyRelation<Study>>,
}

impl Experiment {
    pub fn new(name: &str) -> Self {
        Self {
            uri: None,
            name: name.to_string(),
            study: None,
        }
    }
}

impl SparqlResource for Experiment {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("ex:Experiment")
            .uri_field("uri")
            .uri_strategy(UriStrategy::content_hash("id/experiment", &["name"]))
            .field(FieldDeclaration::data("name", "ex:name", Datatype::String).required())
            .field(FieldDeclaration::object::<Study>("study", "ex:partOf"))
    }

    fn uri(&self) -> Option<&NamedNode> {
        self.uri.as_ref()
    }

    fn set_uri(&mut self, uri: NamedNode) {
        self.uri = Some(uri);
    }

    fn to_values(&self) -> ResourceValues {
        ResourceValues::new(self.uri.as_ref())
            .data("name", Some(self.name.as_str()))
            .object("study", self.study.as_ref())
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Self {
            uri: values.uri.clone(),
            name: values.require_data("name")?,
            study: values.take_relation("study")?,
        })
    }
}
