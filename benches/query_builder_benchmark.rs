use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use samyama_ogm::mapping::{Datatype, FieldDeclaration, Label, ResourceSchema, ResourceValues};
use samyama_ogm::rdf::NamedNode;
use samyama_ogm::sparql::{OxigraphConnection, SparqlParser};
use samyama_ogm::{MapperIndex, OgmConfig, OgmResult, SearchQuery, SparqlResource, SparqlService};
use std::sync::Arc;

struct Sensor {
    uri: Option<NamedNode>,
    name: Label,
    serial: String,
    model: Option<String>,
}

impl SparqlResource for Sensor {
    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .rdf_type("http://example.org/vocab#Sensor")
            .graph("set/devices")
            .uri_field("uri")
            .field(FieldDeclaration::label("name", "rdfs:label").required())
            .field(FieldDeclaration::data("serial", "http://example.org/vocab#serial", Datatype::String).required())
            .field(FieldDeclaration::data("model", "http://example.org/vocab#model", Datatype::String))
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
            .data("serial", Some(self.serial.as_str()))
            .data("model", self.model.as_deref())
    }

    fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
        Ok(Sensor {
            uri: values.uri.clone(),
            name: values.take_label("name")?.unwrap_or_default(),
            serial: values.require_data("serial")?,
            model: values.take_data("model")?,
        })
    }
}

fn sensor(i: usize) -> Sensor {
    Sensor {
        uri: None,
        name: Label::of("en", format!("Sensor {}", i)).with_translation("fr", format!("Capteur {}", i)),
        serial: format!("SN-{:06}", i),
        model: (i % 2 == 0).then(|| "T-800".to_string()),
    }
}

fn index() -> Arc<MapperIndex> {
    Arc::new(
        MapperIndex::builder()
            .register::<Sensor>()
            .build_with_defaults(OgmConfig::default())
            .unwrap(),
    )
}

/// Benchmark SELECT generation and rendering
fn bench_build_select(c: &mut Criterion) {
    let index = index();
    let builder = index.builder_of::<Sensor>().unwrap();

    c.bench_function("build_select", |b| {
        b.iter(|| builder.build_select(None, Some("en")).to_string())
    });

    c.bench_function("build_select_and_validate", |b| {
        b.iter(|| {
            let text = builder.build_select(None, Some("en")).to_string();
            SparqlParser::parse(&text).unwrap();
        })
    });
}

/// Benchmark INSERT DATA generation
fn bench_build_create(c: &mut Criterion) {
    let index = index();
    let builder = index.builder_of::<Sensor>().unwrap();
    let mut values = sensor(1).to_values();
    values.uri = Some(NamedNode::new("http://example.org/id/sensor/1").unwrap());

    c.bench_function("build_create", |b| {
        b.iter(|| builder.build_create(None, &values).unwrap().to_string())
    });
}

/// Benchmark search over an in-memory store
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000].iter() {
        let service = SparqlService::new(OxigraphConnection::new().unwrap(), index());
        let mut sensors: Vec<Sensor> = (0..*size).map(sensor).collect();
        service.create_all(&mut sensors).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let query = SearchQuery::new().page(0, 20);
            b.iter(|| service.search::<Sensor>(&query).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_select, bench_build_create, bench_search);
criterion_main!(benches);
