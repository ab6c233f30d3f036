//! SPARQL service facade
//!
//! Entry point of callers: typed CRUD, search, pagination and existence checks over one
//! [`SparqlConnection`], using the [`MapperIndex`] for query generation.
//!
//! # URI uniqueness
//!
//! Creating a resource checks its URI against the store before inserting it. Inside a process
//! the check-then-insert sequence is closed by two mechanisms:
//! - a lock per URI prefix, held while candidates are drawn and checked
//! - a reservation set shared by the sessions of a service, holding URIs that are checked but
//!   not yet visible in the store (pending insert, or buffered in an open transaction)

use crate::config::OgmConfig;
use crate::error::{OgmError, OgmResult};
use crate::mapping::{
    ClassMapper, ClassQueryBuilder, DataValue, FieldRole, FieldValue, MapperIndex, RelationKey,
    RelationLoader, ResourceValues, SparqlResource, TARGET_VAR,
};
use crate::rdf::namespace::{rdf, rdfs, term};
use crate::rdf::{NamedNode, RdfFormat, RdfObject, RdfTerm, Triple};
use crate::sparql::{
    AskQuery, ConstructQuery, Expression, Function, GroupPattern, OrderDirection, Projection,
    PropertyPath, QueryExecutionError, QuerySkeleton, SelectQuery, SparqlConnection,
    TriplePattern, UpdateQuery, Variable,
};
use crate::uri::{SequenceScope, UriLocks};
use std::collections::HashSet;
use std::io::BufRead;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

const COUNT_VAR: &str = "totalCount";

/// Sort key of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Parameters of a search.
///
/// The filter callback receives the SELECT (or the COUNT) before execution and may add
/// patterns and filters on the field variables.
#[derive(Clone, Default)]
pub struct SearchQuery<'a> {
    pub graph: Option<NamedNode>,
    /// Language of label fields, the configured default when `None`
    pub lang: Option<String>,
    pub filter: Option<&'a dyn Fn(&mut SelectQuery)>,
    pub order_by: Vec<OrderBy>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl<'a> SearchQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(mut self, graph: NamedNode) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn filter(mut self, filter: &'a dyn Fn(&mut SelectQuery)) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Page `page` (from 0) of `page_size` resources
    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    fn offset(&self) -> Option<usize> {
        self.page_size.map(|size| self.page.unwrap_or(0) * size)
    }
}

/// One page of results with the total count
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl<T> PaginatedList<T> {
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return usize::from(self.total > 0);
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Typed access to the resources of one store.
///
/// A service can be shared between threads: every write releases only the reservations it made.
/// The transaction state belongs to the connection, so a thread that needs its own transaction
/// works through a [`session`](Self::session).
pub struct SparqlService<C: SparqlConnection> {
    connection: C,
    index: Arc<MapperIndex>,
    locks: Arc<UriLocks>,
    reserved: Arc<Mutex<HashSet<NamedNode>>>,
    held: Mutex<Vec<NamedNode>>,
}

impl<C: SparqlConnection> SparqlService<C> {
    pub fn new(connection: C, index: Arc<MapperIndex>) -> Self {
        Self {
            connection,
            index,
            locks: Arc::new(UriLocks::new()),
            reserved: Arc::new(Mutex::new(HashSet::new())),
            held: Mutex::new(Vec::new()),
        }
    }

    /// Service over another connection to the same store, sharing URI locks and reservations
    pub fn session(&self, connection: C) -> Self {
        Self {
            connection,
            index: Arc::clone(&self.index),
            locks: Arc::clone(&self.locks),
            reserved: Arc::clone(&self.reserved),
            held: Mutex::new(Vec::new()),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn index(&self) -> &Arc<MapperIndex> {
        &self.index
    }

    pub fn config(&self) -> &OgmConfig {
        self.index.config()
    }

    fn read_lang(&self, lang: Option<&str>) -> String {
        lang.unwrap_or(&self.config().default_language).to_string()
    }

    // ---- search -------------------------------------------------------------------------

    pub fn search<T: SparqlResource>(&self, query: &SearchQuery<'_>) -> OgmResult<Vec<T>> {
        let builder = self.index.mapper::<T>()?.builder();
        let lang = self.read_lang(query.lang.as_deref());

        let mut select = builder.build_select(query.graph.as_ref(), Some(lang.as_str()));
        if let Some(filter) = query.filter {
            filter(&mut select);
        }
        for order in &query.order_by {
            select.add_order_by(builder.order_condition(&order.field, order.direction)?);
        }
        select.set_limit(query.page_size);
        select.set_offset(query.offset());

        let rows = self.connection.execute_select(&select)?;
        let mut values =
            builder.from_solutions(&rows, query.graph.as_ref(), Some(lang.as_str()))?;
        self.load_data_lists(builder, &mut values, query.graph.as_ref())?;
        values.into_iter().map(T::from_values).collect()
    }

    /// Search one page, counting the matches first
    pub fn search_with_pagination<T: SparqlResource>(
        &self,
        query: &SearchQuery<'_>,
    ) -> OgmResult<PaginatedList<T>> {
        let total = self.count::<T>(query)?;
        let page = query.page.unwrap_or(0);
        let page_size = query.page_size.unwrap_or(total);

        let items = match query.offset() {
            Some(offset) if offset >= total => {
                debug!("Page {} is beyond {} results, skipping select", page, total);
                Vec::new()
            }
            _ => self.search(query)?,
        };
        Ok(PaginatedList {
            items,
            page,
            page_size,
            total,
        })
    }

    /// Number of resources matching the graph, language and filter of `query`
    pub fn count<T: SparqlResource>(&self, query: &SearchQuery<'_>) -> OgmResult<usize> {
        let builder = self.index.mapper::<T>()?.builder();
        let lang = self.read_lang(query.lang.as_deref());

        let mut select =
            builder.build_count(query.graph.as_ref(), COUNT_VAR, Some(lang.as_str()));
        if let Some(filter) = query.filter {
            filter(&mut select);
        }
        let rows = self.connection.execute_select(&select)?;
        rows.first()
            .and_then(|row| row.get_literal(COUNT_VAR))
            .and_then(|count| count.value().parse().ok())
            .ok_or(OgmError::QueryExecution(
                QueryExecutionError::UnexpectedResults("a count"),
            ))
    }

    // ---- reads --------------------------------------------------------------------------

    /// Resource by URI in the type default graph, `None` when absent
    pub fn get_by_uri<T: SparqlResource>(
        &self,
        uri: &NamedNode,
        lang: Option<&str>,
    ) -> OgmResult<Option<T>> {
        let mapper = self.index.mapper::<T>()?;
        let lang = self.read_lang(lang);
        let mut values =
            self.load_values(mapper.builder(), &[uri.clone()], None, Some(lang.as_str()))?;

        match values.pop() {
            Some(values) => T::from_values(values).map(Some),
            None => {
                // a required label without a translation in `lang` hides the whole resource
                let required_label = mapper
                    .description()
                    .label_properties()
                    .find(|f| f.required)
                    .map(|f| f.name.clone());
                match required_label {
                    Some(field) if self.uri_exists_for_type::<T>(uri)? => {
                        Err(OgmError::missing(field))
                    }
                    _ => Ok(None),
                }
            }
        }
    }

    /// Resources by URI, absent ones skipped, in store order
    pub fn get_by_uris<T: SparqlResource>(
        &self,
        uris: &[NamedNode],
        lang: Option<&str>,
    ) -> OgmResult<Vec<T>> {
        if uris.is_empty() {
            return Ok(Vec::new());
        }
        let builder = self.index.mapper::<T>()?.builder();
        let lang = self.read_lang(lang);
        self.load_values(builder, uris, None, Some(lang.as_str()))?
            .into_iter()
            .map(T::from_values)
            .collect()
    }

    /// Single resource whose field mapped to `property` equals `value`
    pub fn get_by_unique_property_value<T: SparqlResource>(
        &self,
        property: &NamedNode,
        value: impl Into<DataValue>,
        lang: Option<&str>,
    ) -> OgmResult<Option<T>> {
        let builder = self.index.mapper::<T>()?.builder();
        let lang = self.read_lang(lang);
        let filter = self.property_filter(builder, property, &value.into())?;

        let mut select = builder.build_select(None, Some(lang.as_str()));
        select.add_filter(filter);
        let rows = self.connection.execute_select(&select)?;
        let mut values = builder.from_solutions(&rows, None, Some(lang.as_str()))?;
        if values.len() > 1 {
            return Err(OgmError::MultipleResults(format!(
                "{} ({})",
                property,
                uri_list(&values)
            )));
        }
        self.load_data_lists(builder, &mut values, None)?;
        values.pop().map(T::from_values).transpose()
    }

    pub fn exists_by_unique_property_value<T: SparqlResource>(
        &self,
        property: &NamedNode,
        value: impl Into<DataValue>,
    ) -> OgmResult<bool> {
        let builder = self.index.mapper::<T>()?.builder();
        let filter = self.property_filter(builder, property, &value.into())?;
        let mut ask = builder.build_ask(None, None);
        ask.skeleton_mut().root_mut().add_filter(filter);
        Ok(self.connection.execute_ask(&ask)?)
    }

    fn property_filter(
        &self,
        builder: &ClassQueryBuilder,
        property: &NamedNode,
        value: &DataValue,
    ) -> OgmResult<Expression> {
        let description = builder.description();
        let field = description
            .field_by_property(property)
            .filter(|f| !f.is_list())
            .ok_or_else(|| OgmError::UnknownField {
                type_name: description.type_name(),
                field: property.as_str().to_string(),
            })?;
        let variable = Expression::Variable(field.variable());

        if let FieldRole::Label = field.role {
            return Ok(Expression::Call(Function::Str, vec![variable])
                .equal(Expression::string(value.lexical())));
        }
        let node = self
            .index
            .registry()
            .node_of(value)
            .map_err(|source| OgmError::deserialization(&field.name, source))?;
        let expected = match node {
            RdfObject::NamedNode(node) => Expression::NamedNode(node),
            RdfObject::Literal(literal) => Expression::Literal(literal),
            RdfObject::BlankNode(_) => return Err(OgmError::unresolved(&field.name)),
        };
        Ok(variable.equal(expected))
    }

    /// Whether `uri` appears as subject or object of any triple
    pub fn uri_exists(&self, uri: &NamedNode) -> OgmResult<bool> {
        let (p, o, s) = (Variable::new("p"), Variable::new("o"), Variable::new("s"));
        let mut outgoing = GroupPattern::new();
        outgoing.add_triple(TriplePattern::new(uri, &p, &o));
        let mut incoming = GroupPattern::new();
        incoming.add_triple(TriplePattern::new(&s, &p, uri));

        let mut pattern = GroupPattern::new();
        pattern.add_union(vec![outgoing, incoming]);
        let ask = AskQuery::new(QuerySkeleton::from_pattern(pattern));
        Ok(self.connection.execute_ask(&ask)?)
    }

    /// Whether `uri` is typed with the RDF type of `T` or one of its subclasses
    pub fn uri_exists_for_type<T: SparqlResource>(&self, uri: &NamedNode) -> OgmResult<bool> {
        let mapper = self.index.mapper::<T>()?;
        let rdf_type = Variable::new("rdfType");
        let mut pattern = GroupPattern::new();
        pattern.add_triple(TriplePattern::new(uri, term(rdf::TYPE), &rdf_type));
        pattern.add_triple(TriplePattern::new(
            &rdf_type,
            PropertyPath::ZeroOrMore(term(rdfs::SUB_CLASS_OF)),
            mapper.description().rdf_type(),
        ));
        let ask = AskQuery::new(QuerySkeleton::from_pattern(pattern));
        Ok(self.connection.execute_ask(&ask)?)
    }

    /// Outgoing triples of a resource, across graphs
    pub fn describe(&self, uri: &NamedNode) -> OgmResult<Vec<Triple>> {
        let triple = TriplePattern::new(uri, &Variable::new("p"), &Variable::new("o"));
        let mut pattern = GroupPattern::new();
        pattern.add_triple(triple.clone());
        let construct = ConstructQuery::new(vec![triple], pattern);
        Ok(self.connection.execute_construct(&construct)?)
    }

    fn load_values(
        &self,
        builder: &ClassQueryBuilder,
        uris: &[NamedNode],
        graph: Option<&NamedNode>,
        lang: Option<&str>,
    ) -> OgmResult<Vec<ResourceValues>> {
        let mut select = builder.build_select(graph, lang);
        select.add_values(
            builder.uri_variable(),
            uris.iter().cloned().map(RdfTerm::from).collect(),
        );
        let rows = self.connection.execute_select(&select)?;
        let mut values = builder.from_solutions(&rows, graph, lang)?;
        self.load_data_lists(builder, &mut values, graph)?;
        Ok(values)
    }

    /// One batch SELECT per data list field
    fn load_data_lists(
        &self,
        builder: &ClassQueryBuilder,
        values: &mut [ResourceValues],
        graph: Option<&NamedNode>,
    ) -> OgmResult<()> {
        let uris: Vec<NamedNode> = values.iter().filter_map(|v| v.uri.clone()).collect();
        if uris.is_empty() {
            return Ok(());
        }
        for field in builder.description().data_list_properties() {
            let select = builder.build_data_list_select(&field.name, &uris, graph)?;
            let rows = self.connection.execute_select(&select)?;
            builder.apply_data_list(&field.name, values, &rows)?;
        }
        Ok(())
    }

    /// Replace unloaded to-many relations by the URIs they hold
    fn resolve_deferred(&self, values: &mut ResourceValues) -> OgmResult<()> {
        for value in values.fields.values_mut() {
            if let FieldValue::Deferred(key) = value {
                let uris = self.related_uris(key)?;
                *value = FieldValue::ObjectList(uris.into_iter().map(Some).collect());
            }
        }
        Ok(())
    }

    fn related_uris(&self, key: &RelationKey) -> OgmResult<Vec<NamedNode>> {
        let rows = self.connection.execute_select(&key.uri_query())?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_named_node(TARGET_VAR).cloned())
            .collect())
    }

    /// Stored copy of a resource with every list loaded, all languages
    fn load_complete(&self, mapper: &ClassMapper, uri: &NamedNode) -> OgmResult<ResourceValues> {
        let mut values = self
            .load_values(mapper.builder(), &[uri.clone()], None, None)?
            .pop()
            .ok_or_else(|| OgmError::NotFound(uri.clone()))?;
        self.resolve_deferred(&mut values)?;
        Ok(values)
    }

    // ---- writes -------------------------------------------------------------------------

    /// Insert a resource, generating its URI when unset
    pub fn create<T: SparqlResource>(&self, instance: &mut T) -> OgmResult<()> {
        self.create_all(std::slice::from_mut(instance))
    }

    /// Insert resources in a single update request.
    ///
    /// Generated URIs are set on the instances only once the update is accepted.
    pub fn create_all<T: SparqlResource>(&self, instances: &mut [T]) -> OgmResult<()> {
        let mapper = self.index.mapper::<T>()?;
        let mut reserved = Vec::with_capacity(instances.len());
        let uris = match self.create_reserved(mapper, instances, &mut reserved) {
            Ok(uris) => {
                self.settle(reserved);
                uris
            }
            Err(err) => {
                self.release(&reserved);
                return Err(err);
            }
        };
        for (instance, uri) in instances.iter_mut().zip(uris) {
            if let Some(uri) = uri {
                instance.set_uri(uri);
            }
        }
        Ok(())
    }

    /// Write the instances, returning the URI generated for each one that had none
    fn create_reserved<T: SparqlResource>(
        &self,
        mapper: &ClassMapper,
        instances: &[T],
        reserved: &mut Vec<NamedNode>,
    ) -> OgmResult<Vec<Option<NamedNode>>> {
        let mut update = UpdateQuery::new();
        let mut generated = Vec::with_capacity(instances.len());
        for instance in instances {
            let mut values = instance.to_values();
            let uri = self.assign_uri(mapper, &values, reserved)?;
            if values.uri.is_none() {
                values.uri = Some(uri.clone());
                generated.push(Some(uri));
            } else {
                generated.push(None);
            }
            mapper.builder().add_create(None, &values, &mut update)?;
        }
        self.write(&update)?;
        Ok(generated)
    }

    /// Check or generate the URI of a new resource and reserve it
    fn assign_uri(
        &self,
        mapper: &ClassMapper,
        values: &ResourceValues,
        reserved: &mut Vec<NamedNode>,
    ) -> OgmResult<NamedNode> {
        let config = self.config();
        let generator = mapper.uri_generator();
        let prefix = generator.prefix(config);
        let lock = self.locks.lock_for(&prefix);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(uri) = values.uri.clone() {
            if self.uri_exists(&uri)? || !self.reserve(&uri) {
                return Err(OgmError::AlreadyExistingUri(uri));
            }
            reserved.push(uri.clone());
            return Ok(uri);
        }

        if let Some(sequence) = generator.sequence(config) {
            self.seed_sequence(&sequence)?;
        }
        let attempts = generator
            .max_retries()
            .unwrap_or(config.uri_generation_max_retries)
            .max(1);
        for retry in 0..attempts {
            let candidate = generator.generate(config, values, retry)?;
            if !self.uri_exists(&candidate)? && self.reserve(&candidate) {
                reserved.push(candidate.clone());
                return Ok(candidate);
            }
            debug!("URI {} already used, retrying", candidate);
        }
        Err(OgmError::UriGenerationExhausted { prefix, attempts })
    }

    /// Move a sequence past the highest number already stored, once per sequence
    fn seed_sequence(&self, sequence: &SequenceScope) -> OgmResult<()> {
        if sequence.is_seeded() {
            return Ok(());
        }
        let uri = Variable::new("uri");
        let mut pattern = GroupPattern::new();
        pattern.add_triple(TriplePattern::new(&uri, term(rdf::TYPE), &Variable::new("rdfType")));
        pattern.add_filter(Expression::Call(
            Function::StrStarts,
            vec![
                Expression::Call(Function::Str, vec![Expression::Variable(uri.clone())]),
                Expression::string(sequence.stem()),
            ],
        ));
        let mut select = SelectQuery::new(QuerySkeleton::from_pattern(pattern)).distinct();
        select.add_projection(Projection::Variable(uri.clone()));

        let rows = self.connection.execute_select(&select)?;
        let last = rows
            .iter()
            .filter_map(|row| row.get_named_node(uri.as_str()))
            .filter_map(|node| sequence.number_of(node.as_str()))
            .max()
            .unwrap_or(0);
        debug!("Sequence {} starts after {}", sequence.stem(), last);
        sequence.seed(last);
        Ok(())
    }

    /// Replace the stored copy of a resource
    pub fn update<T: SparqlResource>(&self, instance: &T) -> OgmResult<()> {
        self.update_all(std::slice::from_ref(instance))
    }

    pub fn update_all<T: SparqlResource>(&self, instances: &[T]) -> OgmResult<()> {
        let mapper = self.index.mapper::<T>()?;
        let mut update = UpdateQuery::new();
        for instance in instances {
            let uri = instance
                .uri()
                .ok_or_else(|| OgmError::missing(mapper.description().uri_field()))?;
            let old = self.load_complete(mapper, uri)?;
            let mut new = instance.to_values();
            // a stored subclass type survives an update through the base type
            if new.rdf_type.is_none() {
                new.rdf_type = old.rdf_type.clone();
            }
            // unloaded relations keep their stored value
            for (name, value) in new.fields.iter_mut() {
                if let FieldValue::Deferred(_) = value {
                    *value = old.get(name).cloned().unwrap_or(FieldValue::Null);
                }
            }
            mapper.builder().add_delete(None, &old, &mut update)?;
            mapper.builder().add_create(None, &new, &mut update)?;
        }
        self.write(&update)
    }

    pub fn delete<T: SparqlResource>(&self, uri: &NamedNode) -> OgmResult<()> {
        self.delete_all::<T>(std::slice::from_ref(uri))
    }

    /// Delete resources, each through a freshly loaded copy
    pub fn delete_all<T: SparqlResource>(&self, uris: &[NamedNode]) -> OgmResult<()> {
        let mapper = self.index.mapper::<T>()?;
        let mut update = UpdateQuery::new();
        for uri in uris {
            let old = self.load_complete(mapper, uri)?;
            mapper.builder().add_delete(None, &old, &mut update)?;
        }
        self.write(&update)
    }

    /// Delete one `subject property object` statement
    pub fn delete_object_relation(
        &self,
        graph: Option<&NamedNode>,
        subject: &NamedNode,
        property: &NamedNode,
        object: &NamedNode,
    ) -> OgmResult<()> {
        let mut update = UpdateQuery::new();
        update.delete(
            Triple::new(subject.clone(), property.clone(), object.clone()).in_graph(graph.cloned()),
        );
        self.write(&update)
    }

    fn write(&self, update: &UpdateQuery) -> OgmResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        Ok(self.connection.execute_update(update)?)
    }

    // ---- reservations -------------------------------------------------------------------

    /// Reserve a URI, false when another caller holds it
    fn reserve(&self, uri: &NamedNode) -> bool {
        let mut reserved = self.reserved.lock().unwrap_or_else(PoisonError::into_inner);
        reserved.insert(uri.clone())
    }

    fn release(&self, uris: &[NamedNode]) {
        if uris.is_empty() {
            return;
        }
        let mut reserved = self.reserved.lock().unwrap_or_else(PoisonError::into_inner);
        for uri in uris {
            reserved.remove(uri);
        }
    }

    /// Release the reservations of one write, or hand them to the open transaction
    fn settle(&self, uris: Vec<NamedNode>) {
        if self.connection.in_transaction() {
            self.held
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(uris);
        } else {
            self.release(&uris);
        }
    }

    /// Release the reservations held by the transaction
    fn release_held(&self) {
        let held = std::mem::take(&mut *self.held.lock().unwrap_or_else(PoisonError::into_inner));
        self.release(&held);
    }

    // ---- graphs and ontologies ----------------------------------------------------------

    pub fn clear_graph(&self, graph: &NamedNode) -> OgmResult<()> {
        info!("Clearing graph {}", graph);
        Ok(self.connection.clear_graph(graph)?)
    }

    pub fn clear(&self) -> OgmResult<()> {
        info!("Clearing every graph");
        Ok(self.connection.clear()?)
    }

    pub fn load_ontology(
        &self,
        graph: &NamedNode,
        input: &mut dyn BufRead,
        format: RdfFormat,
    ) -> OgmResult<()> {
        Ok(self.connection.load_ontology(graph, input, format)?)
    }

    /// Load ontologies in one transaction, clearing their graphs first when `reset` is set
    pub fn install_ontologies<'r>(
        &self,
        ontologies: Vec<(NamedNode, &'r mut dyn BufRead, RdfFormat)>,
        reset: bool,
    ) -> OgmResult<()> {
        info!("Installing {} ontologies (reset: {})", ontologies.len(), reset);
        self.in_transaction(|service| {
            for (graph, input, format) in ontologies {
                if reset {
                    service.clear_graph(&graph)?;
                }
                service.load_ontology(&graph, input, format)?;
            }
            Ok(())
        })
    }

    // ---- transactions -------------------------------------------------------------------

    pub fn start_transaction(&self) -> OgmResult<()> {
        Ok(self.connection.start_transaction()?)
    }

    pub fn commit_transaction(&self) -> OgmResult<()> {
        let result = self.connection.commit_transaction();
        self.release_held();
        Ok(result?)
    }

    pub fn rollback_transaction(&self) -> OgmResult<()> {
        let result = self.connection.rollback_transaction();
        self.release_held();
        Ok(result?)
    }

    pub fn transaction_active(&self) -> bool {
        self.connection.in_transaction()
    }

    /// Run `work` in a transaction, committed on success and rolled back on failure
    pub fn in_transaction<R>(&self, work: impl FnOnce(&Self) -> OgmResult<R>) -> OgmResult<R> {
        self.start_transaction()?;
        match work(self) {
            Ok(value) => {
                self.commit_transaction()?;
                Ok(value)
            }
            Err(err) => {
                warn!("Rolling back transaction: {}", err);
                self.rollback_transaction()?;
                Err(err)
            }
        }
    }
}

impl<C: SparqlConnection> RelationLoader for SparqlService<C> {
    fn load_resource<T: SparqlResource>(
        &self,
        uri: &NamedNode,
        lang: Option<&str>,
    ) -> OgmResult<Option<T>> {
        self.get_by_uri(uri, lang)
    }

    fn load_related<T: SparqlResource>(&self, key: &RelationKey) -> OgmResult<Vec<T>> {
        let uris = self.related_uris(key)?;
        self.get_by_uris(&uris, key.lang.as_deref())
    }
}

fn uri_list(values: &[ResourceValues]) -> String {
    values
        .iter()
        .filter_map(|v| v.uri.as_ref().map(|u| u.as_str().to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}
