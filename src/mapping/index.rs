//! Mapper index
//!
//! The table of mapped types is fixed when the index is built. Each entry analyzes its type on
//! first use through a `OnceCell`: concurrent first accesses block on the cell and share one
//! analysis, later reads never lock.

use super::analyzer::{EntityDescription, ResourceClassAnalyzer};
use super::builder::ClassQueryBuilder;
use super::deserializer::DeserializerRegistry;
use super::model::SparqlResource;
use super::schema::ResourceSchema;
use super::shacl::ShapeDocument;
use crate::config::OgmConfig;
use crate::error::{OgmError, OgmResult};
use crate::rdf::{NamedNode, NamespaceManager};
use crate::uri::{SequenceCounter, UriGenerator};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHasher};
use std::any::TypeId;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Analyzed type with its query builder and URI generator
pub struct ClassMapper {
    description: Arc<EntityDescription>,
    builder: ClassQueryBuilder,
    uri_generator: Arc<dyn UriGenerator>,
}

impl ClassMapper {
    pub fn description(&self) -> &Arc<EntityDescription> {
        &self.description
    }

    pub fn builder(&self) -> &ClassQueryBuilder {
        &self.builder
    }

    pub fn uri_generator(&self) -> &Arc<dyn UriGenerator> {
        &self.uri_generator
    }
}

struct Entry {
    type_name: &'static str,
    schema: fn() -> ResourceSchema,
    mapper: OnceCell<ClassMapper>,
}

/// Registration of the mapped types
#[derive(Default)]
pub struct MapperIndexBuilder {
    types: Vec<(TypeId, &'static str, fn() -> ResourceSchema)>,
}

impl MapperIndexBuilder {
    pub fn register<T: SparqlResource>(mut self) -> Self {
        self.types
            .push((TypeId::of::<T>(), std::any::type_name::<T>(), T::schema));
        self
    }

    /// Build with the default deserializers, URI values resolving the configured prefixes
    pub fn build_with_defaults(self, config: OgmConfig) -> OgmResult<MapperIndex> {
        let registry = DeserializerRegistry::with_defaults(namespaces_of(&config));
        self.build(config, registry)
    }

    /// Validate the configuration and resolve the RDF type of every registered type
    pub fn build(self, config: OgmConfig, registry: DeserializerRegistry) -> OgmResult<MapperIndex> {
        config.validate()?;
        let namespaces = namespaces_of(&config);

        let mut entries: FxIndexMap<TypeId, Entry> = FxIndexMap::default();
        let mut by_rdf_type: FxHashMap<NamedNode, TypeId> = FxHashMap::default();
        {
            let analyzer = ResourceClassAnalyzer::new(&registry, &namespaces, &config);
            for (type_id, type_name, schema) in self.types {
                if entries.contains_key(&type_id) {
                    continue;
                }
                let rdf_type = analyzer.rdf_type_of(type_name, &schema())?;
                by_rdf_type.entry(rdf_type).or_insert(type_id);
                entries.insert(
                    type_id,
                    Entry {
                        type_name,
                        schema,
                        mapper: OnceCell::new(),
                    },
                );
            }
        }

        Ok(MapperIndex {
            entries,
            by_rdf_type,
            analysis_count: AtomicUsize::new(0),
            counter: Arc::new(SequenceCounter::new()),
            namespaces,
            config: Arc::new(config),
            registry: Arc::new(registry),
        })
    }
}

fn namespaces_of(config: &OgmConfig) -> NamespaceManager {
    let mut namespaces = NamespaceManager::new();
    for (prefix, iri) in &config.prefixes {
        namespaces.add_prefix(prefix.as_str(), iri.as_str());
    }
    namespaces
}

/// Process-wide table of analyzed types
pub struct MapperIndex {
    entries: FxIndexMap<TypeId, Entry>,
    by_rdf_type: FxHashMap<NamedNode, TypeId>,
    analysis_count: AtomicUsize,
    counter: Arc<SequenceCounter>,
    namespaces: NamespaceManager,
    config: Arc<OgmConfig>,
    registry: Arc<DeserializerRegistry>,
}

impl MapperIndex {
    pub fn builder() -> MapperIndexBuilder {
        MapperIndexBuilder::default()
    }

    pub fn mapper<T: SparqlResource>(&self) -> OgmResult<&ClassMapper> {
        self.mapper_of(TypeId::of::<T>())
            .map_err(|_| OgmError::UnknownMappedType(std::any::type_name::<T>().to_string()))
    }

    fn mapper_of(&self, type_id: TypeId) -> OgmResult<&ClassMapper> {
        let entry = self
            .entries
            .get(&type_id)
            .ok_or_else(|| OgmError::UnknownMappedType(format!("{:?}", type_id)))?;
        entry
            .mapper
            .get_or_try_init(|| self.analyze(type_id, entry))
    }

    fn analyze(&self, type_id: TypeId, entry: &Entry) -> OgmResult<ClassMapper> {
        let analyzer = ResourceClassAnalyzer::new(&self.registry, &self.namespaces, &self.config);
        let description = Arc::new(analyzer.analyze_schema(type_id, entry.type_name, (entry.schema)())?);
        self.analysis_count.fetch_add(1, Ordering::SeqCst);
        debug!("Cached mapping of {}", entry.type_name);

        let uri_generator = description
            .uri_strategy()
            .generator(description.rdf_type().as_str(), &self.counter);
        let builder = ClassQueryBuilder::new(
            Arc::clone(&description),
            Arc::clone(&self.registry),
            self.config.default_language.clone(),
        );
        Ok(ClassMapper {
            description,
            builder,
            uri_generator,
        })
    }

    /// Analyzed description of `T`
    pub fn analyzer<T: SparqlResource>(&self) -> OgmResult<Arc<EntityDescription>> {
        self.mapper::<T>().map(|m| Arc::clone(&m.description))
    }

    pub fn builder_of<T: SparqlResource>(&self) -> OgmResult<&ClassQueryBuilder> {
        self.mapper::<T>().map(|m| &m.builder)
    }

    /// Mapper of the type registered for `rdf_type`
    pub fn for_rdf_type(&self, rdf_type: &NamedNode) -> OgmResult<&ClassMapper> {
        let type_id = self
            .by_rdf_type
            .get(rdf_type)
            .ok_or_else(|| OgmError::UnknownMappedType(rdf_type.as_str().to_string()))?;
        self.mapper_of(*type_id)
    }

    /// Registered type names, in registration order
    pub fn registered_types(&self) -> Vec<&'static str> {
        self.entries.values().map(|e| e.type_name).collect()
    }

    /// Shapes of every registered type
    pub fn generate_shapes(&self) -> OgmResult<Vec<ShapeDocument>> {
        self.entries
            .keys()
            .map(|type_id| {
                self.mapper_of(*type_id)
                    .map(|m| m.builder.generate_shape_constraints())
            })
            .collect()
    }

    /// Number of analyses run so far
    pub fn analysis_count(&self) -> usize {
        self.analysis_count.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &Arc<OgmConfig> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DeserializerRegistry> {
        &self.registry
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn counter(&self) -> &Arc<SequenceCounter> {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Datatype, FieldDeclaration, ResourceValues};
    use std::thread;

    #[derive(Debug)]
    struct Site;

    impl SparqlResource for Site {
        fn schema() -> ResourceSchema {
            ResourceSchema::new()
                .rdf_type("ex:Site")
                .uri_field("uri")
                .field(FieldDeclaration::data("name", "ex:name", Datatype::String).required())
        }

        fn uri(&self) -> Option<&NamedNode> {
            None
        }

        fn set_uri(&mut self, _uri: NamedNode) {}

        fn to_values(&self) -> ResourceValues {
            ResourceValues::default()
        }

        fn from_values(_values: ResourceValues) -> OgmResult<Self> {
            Ok(Site)
        }
    }

    #[derive(Debug)]
    struct Unregistered;

    impl SparqlResource for Unregistered {
        fn schema() -> ResourceSchema {
            ResourceSchema::new()
        }

        fn uri(&self) -> Option<&NamedNode> {
            None
        }

        fn set_uri(&mut self, _uri: NamedNode) {}

        fn to_values(&self) -> ResourceValues {
            ResourceValues::default()
        }

        fn from_values(_values: ResourceValues) -> OgmResult<Self> {
            Ok(Unregistered)
        }
    }

    fn config() -> OgmConfig {
        let mut config = OgmConfig::default();
        config
            .prefixes
            .insert("ex".to_string(), "http://example.org/".to_string());
        config
    }

    #[test]
    fn test_concurrent_first_access_analyzes_once() {
        let index = MapperIndex::builder()
            .register::<Site>()
            .build_with_defaults(config())
            .unwrap();
        assert_eq!(index.analysis_count(), 0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let description = index.analyzer::<Site>().unwrap();
                    assert_eq!(description.rdf_type().as_str(), "http://example.org/Site");
                });
            }
        });
        assert_eq!(index.analysis_count(), 1);
    }

    #[test]
    fn test_lookup_by_rdf_type() {
        let index = MapperIndex::builder()
            .register::<Site>()
            .register::<Site>()
            .build_with_defaults(config())
            .unwrap();
        assert_eq!(index.registered_types().len(), 1);

        let mapper = index
            .for_rdf_type(&NamedNode::new("http://example.org/Site").unwrap())
            .unwrap();
        assert_eq!(mapper.description().type_name(), std::any::type_name::<Site>());
        assert_eq!(index.generate_shapes().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_type() {
        let index = MapperIndex::builder()
            .register::<Site>()
            .build_with_defaults(config())
            .unwrap();
        assert!(matches!(
            index.mapper::<Unregistered>(),
            Err(OgmError::UnknownMappedType(_))
        ));
        assert!(index
            .for_rdf_type(&NamedNode::new("http://example.org/Other").unwrap())
            .is_err());
    }

    #[test]
    fn test_invalid_type_rejected_at_build() {
        let result = MapperIndex::builder()
            .register::<Unregistered>()
            .build_with_defaults(config());
        assert!(matches!(result, Err(OgmError::MappingDefinition { .. })));
    }
}
