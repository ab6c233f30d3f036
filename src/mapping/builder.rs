//! Class query builder
//!
//! Turns an [`EntityDescription`] into query skeletons and update bodies, and turns result rows
//! back into [`ResourceValues`].
//!
//! WHERE construction, for a resource variable `?uri` read in graph `g`:
//! - `?uri rdf:type ?rdfType` in the required block of `g`, and `?rdfType rdfs:subClassOf* <T>`
//!   in the root group so subclass instances match
//! - the type label through an optional `rdfs:label` in the requested language
//! - one triple per single-valued field, required fields in the required block of their graph,
//!   optional fields as one optional block each in the bucket of their graph
//! - list fields are never joined; they are read with one batch query per field

use super::analyzer::{EntityDescription, FieldDescription, FieldRole};
use super::deserializer::DeserializerRegistry;
use super::model::{FieldValue, Label, ResourceValues};
use super::proxy::RelationKey;
use super::shacl::ShapeDocument;
use crate::error::{OgmError, OgmResult};
use crate::rdf::namespace::{owl, rdf, rdfs, term};
use crate::rdf::{Literal, NamedNode, Quad, RdfObject, RdfSubject, RdfTerm, Triple};
use crate::sparql::{
    AskQuery, Expression, GroupPattern, OrderCondition, OrderDirection, Projection, PropertyPath,
    QuerySkeleton, QuerySolution, SelectQuery, TermPattern, TriplePattern, UpdateQuery, Variable,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Query builder of one mapped type
#[derive(Clone)]
pub struct ClassQueryBuilder {
    description: Arc<EntityDescription>,
    registry: Arc<DeserializerRegistry>,
    default_language: String,
}

impl ClassQueryBuilder {
    pub fn new(
        description: Arc<EntityDescription>,
        registry: Arc<DeserializerRegistry>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            description,
            registry,
            default_language: default_language.into(),
        }
    }

    pub fn description(&self) -> &EntityDescription {
        &self.description
    }

    pub fn uri_variable(&self) -> Variable {
        Variable::new(self.description.uri_field())
    }

    pub fn type_variable(&self) -> Variable {
        Variable::new(self.description.type_field())
    }

    pub fn type_label_variable(&self) -> Variable {
        Variable::new(self.description.type_label_field())
    }

    /// Graph of the resources, the type default graph unless overridden
    pub fn graph<'a>(&'a self, graph: Option<&'a NamedNode>) -> Option<&'a NamedNode> {
        graph.or(self.description.graph())
    }

    /// Language of label filters: `None` disables them, an empty tag means the default language
    pub fn resolve_lang(&self, lang: Option<&str>) -> Option<String> {
        match lang {
            None => None,
            Some("") => Some(self.default_language.clone()),
            Some(lang) => Some(lang.to_string()),
        }
    }

    /// Graph holding the triples of a field when read
    fn read_graph<'a>(
        &'a self,
        field: &'a FieldDescription,
        graph: Option<&'a NamedNode>,
    ) -> Option<&'a NamedNode> {
        match &field.role {
            FieldRole::Object(related) | FieldRole::ObjectList(related) if field.reverse => {
                related.graph.as_ref()
            }
            _ => graph,
        }
    }

    /// Graph holding the triples of a field when written
    fn write_graph<'a>(
        &'a self,
        field: &'a FieldDescription,
        graph: Option<&'a NamedNode>,
    ) -> Option<&'a NamedNode> {
        self.read_graph(field, graph).or(graph)
    }

    /// Triple between `?uri` and `value`, in the direction of the field
    fn field_triple(&self, field: &FieldDescription, value: impl Into<TermPattern>) -> TriplePattern {
        let uri = self.uri_variable();
        if field.reverse {
            TriplePattern::new(value, &field.property, uri)
        } else {
            TriplePattern::new(uri, &field.property, value)
        }
    }

    /// Graph-partitioned WHERE clause shared by SELECT, ASK and COUNT
    pub fn initialize(&self, graph: Option<&NamedNode>, lang: Option<&str>) -> QuerySkeleton {
        let graph = self.graph(graph);
        let lang = self.resolve_lang(lang);
        let uri = self.uri_variable();
        let rdf_type = self.type_variable();
        let type_label = self.type_label_variable();

        let mut skeleton = QuerySkeleton::new();
        skeleton
            .required_mut(graph)
            .add_triple(TriplePattern::new(&uri, term(rdf::TYPE), &rdf_type));

        let root = skeleton.root_mut();
        root.add_triple(TriplePattern::new(
            &rdf_type,
            PropertyPath::ZeroOrMore(term(rdfs::SUB_CLASS_OF)),
            self.description.rdf_type(),
        ));
        let mut label_block = GroupPattern::new();
        label_block.add_triple(TriplePattern::new(&rdf_type, term(rdfs::LABEL), &type_label));
        if let Some(lang) = &lang {
            label_block.add_filter(Expression::lang_equals(&type_label, lang));
        }
        root.add_optional(label_block);

        for field in self.description.scalar_properties() {
            let variable = field.variable();
            let mut block = GroupPattern::new();
            block.add_triple(self.field_triple(field, &variable));

            if let (FieldRole::Label, Some(lang)) = (&field.role, &lang) {
                block.add_filter(Expression::lang_equals(&variable, lang));
            }
            if field.property.as_str() == rdfs::SUB_CLASS_OF {
                block.add_triple(TriplePattern::new(&variable, term(rdf::TYPE), term(owl::CLASS)));
            }

            let field_graph = self.read_graph(field, graph);
            if field.required {
                skeleton.required_mut(field_graph).extend(block);
            } else {
                skeleton.add_optional(field_graph, block);
            }
        }

        if !self.description.allow_blank_node() {
            skeleton
                .required_mut(graph)
                .add_filter(Expression::is_blank(&uri).negate());
        }
        skeleton
    }

    /// `SELECT DISTINCT` of the resource, its type, type label and every single-valued field
    pub fn build_select(&self, graph: Option<&NamedNode>, lang: Option<&str>) -> SelectQuery {
        let mut query = SelectQuery::new(self.initialize(graph, lang)).distinct();
        query.add_projection(Projection::Variable(self.uri_variable()));
        query.add_projection(Projection::Variable(self.type_variable()));
        query.add_projection(Projection::Variable(self.type_label_variable()));
        for field in self.description.scalar_properties() {
            query.add_projection(Projection::Variable(field.variable()));
        }
        query
    }

    pub fn build_ask(&self, graph: Option<&NamedNode>, lang: Option<&str>) -> AskQuery {
        AskQuery::new(self.initialize(graph, lang))
    }

    /// `COUNT(DISTINCT ?uri)` bound to `count_var`
    pub fn build_count(
        &self,
        graph: Option<&NamedNode>,
        count_var: &str,
        lang: Option<&str>,
    ) -> SelectQuery {
        let mut query = SelectQuery::new(self.initialize(graph, lang));
        query.add_projection(Projection::CountDistinct {
            variable: self.uri_variable(),
            alias: Variable::new(count_var),
        });
        query
    }

    pub fn build_create(&self, graph: Option<&NamedNode>, values: &ResourceValues) -> OgmResult<UpdateQuery> {
        let mut update = UpdateQuery::new();
        self.add_create(graph, values, &mut update)?;
        Ok(update)
    }

    /// Append the INSERT quads of `values` to `update`
    pub fn add_create(
        &self,
        graph: Option<&NamedNode>,
        values: &ResourceValues,
        update: &mut UpdateQuery,
    ) -> OgmResult<()> {
        let graph = self.graph(graph);
        let subject = self.subject(values)?;

        for quad in self.resource_quads(&subject, values, graph, true)? {
            update.insert(quad);
        }
        for relation in &values.relations {
            let node = self
                .registry
                .node_of(&relation.value)
                .map_err(|source| OgmError::deserialization(relation.property.as_str(), source))?;
            let relation_graph = relation.graph.as_ref().or(graph).cloned();
            update.insert(
                Triple::new(subject.clone(), relation.property.clone(), node).in_graph(relation_graph),
            );
        }
        Ok(())
    }

    pub fn build_delete(&self, graph: Option<&NamedNode>, values: &ResourceValues) -> OgmResult<UpdateQuery> {
        let mut update = UpdateQuery::new();
        self.add_delete(graph, values, &mut update)?;
        Ok(update)
    }

    /// Append the DELETE quads of a loaded copy to `update`
    pub fn add_delete(
        &self,
        graph: Option<&NamedNode>,
        values: &ResourceValues,
        update: &mut UpdateQuery,
    ) -> OgmResult<()> {
        let graph = self.graph(graph);
        let subject = self.subject(values)?;
        for quad in self.resource_quads(&subject, values, graph, false)? {
            update.delete(quad);
        }
        Ok(())
    }

    /// Replace the stored copy `old` by `new` in a single request
    pub fn build_update(
        &self,
        graph: Option<&NamedNode>,
        old: &ResourceValues,
        new: &ResourceValues,
    ) -> OgmResult<UpdateQuery> {
        let mut update = UpdateQuery::new();
        self.add_delete(graph, old, &mut update)?;
        self.add_create(graph, new, &mut update)?;
        Ok(update)
    }

    /// SHACL shape of the mapped type
    pub fn generate_shape_constraints(&self) -> ShapeDocument {
        ShapeDocument::of(&self.description)
    }

    fn subject(&self, values: &ResourceValues) -> OgmResult<RdfSubject> {
        match (&values.uri, &values.blank_node) {
            (Some(uri), _) => Ok(RdfSubject::NamedNode(uri.clone())),
            (None, Some(node)) if self.description.allow_blank_node() => {
                Ok(RdfSubject::BlankNode(node.clone()))
            }
            _ => Err(OgmError::missing(self.description.uri_field())),
        }
    }

    /// Type triple and field triples of one resource.
    ///
    /// `strict` enforces required fields and resolved references, as needed on insert.
    fn resource_quads(
        &self,
        subject: &RdfSubject,
        values: &ResourceValues,
        graph: Option<&NamedNode>,
        strict: bool,
    ) -> OgmResult<Vec<Quad>> {
        let rdf_type = values
            .rdf_type
            .clone()
            .unwrap_or_else(|| self.description.rdf_type().clone());
        let mut quads =
            vec![Triple::new(subject.clone(), term(rdf::TYPE), rdf_type).in_graph(graph.cloned())];

        for field in self.description.fields() {
            let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
            let field_graph = self.write_graph(field, graph);
            let mut objects: Vec<RdfObject> = Vec::new();

            match (&field.role, value) {
                (_, FieldValue::Null) => {}
                (FieldRole::Data(datatype), FieldValue::Data(data)) => {
                    let node = self
                        .registry
                        .for_datatype(datatype)
                        .and_then(|d| d.get_node(data))
                        .map_err(|source| OgmError::deserialization(&field.name, source))?;
                    objects.push(node);
                }
                (FieldRole::Label, FieldValue::Label(label)) => {
                    for (lang, text) in label.translations() {
                        let literal = if lang.is_empty() {
                            Literal::new_simple_literal(text.as_str())
                        } else {
                            Literal::new_language_tagged_literal(text.as_str(), lang.as_str())?
                        };
                        objects.push(literal.into());
                    }
                }
                (FieldRole::Object(_), FieldValue::Object(uri)) => match uri {
                    Some(uri) => objects.push(uri.clone().into()),
                    None if strict => return Err(OgmError::unresolved(&field.name)),
                    None => {}
                },
                (FieldRole::DataList(datatype), FieldValue::DataList(list)) => {
                    let deserializer = self
                        .registry
                        .for_datatype(datatype)
                        .map_err(|source| OgmError::deserialization(&field.name, source))?;
                    for data in list {
                        objects.push(
                            deserializer
                                .get_node(data)
                                .map_err(|source| OgmError::deserialization(&field.name, source))?,
                        );
                    }
                }
                (FieldRole::ObjectList(_), FieldValue::ObjectList(uris)) => {
                    for uri in uris {
                        match uri {
                            Some(uri) => objects.push(uri.clone().into()),
                            None if strict => return Err(OgmError::unresolved(&field.name)),
                            None => {}
                        }
                    }
                }
                (_, FieldValue::Deferred(_)) => {
                    if strict {
                        return Err(OgmError::unresolved(&field.name));
                    }
                }
                (_, other) => return Err(mismatch(field, other)),
            }

            if strict && field.required && objects.is_empty() {
                return Err(OgmError::missing(&field.name));
            }
            for object in objects {
                quads.push(self.field_quad(field, subject, object, field_graph)?);
            }
        }
        Ok(quads)
    }

    fn field_quad(
        &self,
        field: &FieldDescription,
        subject: &RdfSubject,
        object: RdfObject,
        graph: Option<&NamedNode>,
    ) -> OgmResult<Quad> {
        let triple = if field.reverse {
            Triple::new(RdfSubject::try_from(object)?, field.property.clone(), subject.clone())
        } else {
            Triple::new(subject.clone(), field.property.clone(), object)
        };
        Ok(triple.in_graph(graph.cloned()))
    }

    /// Variable of a declared single-valued field, the URI or the type
    pub fn field_variable(&self, field: &str) -> OgmResult<Variable> {
        if field == self.description.uri_field() || field == self.description.type_field() {
            return Ok(Variable::new(field));
        }
        match self.description.field(field) {
            Some(description) if !description.is_list() => Ok(description.variable()),
            _ => Err(OgmError::UnknownField {
                type_name: self.description.type_name(),
                field: field.to_string(),
            }),
        }
    }

    pub fn order_expression(&self, field: &str) -> OgmResult<Expression> {
        self.field_variable(field).map(Expression::Variable)
    }

    pub fn order_condition(&self, field: &str, direction: OrderDirection) -> OgmResult<OrderCondition> {
        Ok(OrderCondition {
            expression: self.order_expression(field)?,
            direction,
        })
    }

    /// Values of every resource in `rows`, in first-seen order.
    ///
    /// Rows sharing a resource are merged: label translations accumulate, other fields keep
    /// their first binding.
    pub fn from_solutions(
        &self,
        rows: &[QuerySolution],
        graph: Option<&NamedNode>,
        lang: Option<&str>,
    ) -> OgmResult<Vec<ResourceValues>> {
        let mut resources: IndexMap<String, ResourceValues> = IndexMap::new();
        for row in rows {
            let values = self.from_solution(row, graph, lang)?;
            let key = match (&values.uri, &values.blank_node) {
                (Some(uri), _) => uri.as_str().to_string(),
                (None, Some(node)) => format!("_:{}", node.as_str()),
                (None, None) => continue,
            };
            match resources.get_mut(&key) {
                Some(existing) => merge_labels(existing, values),
                None => {
                    resources.insert(key, values);
                }
            }
        }
        Ok(resources.into_values().collect())
    }

    /// Values of one result row
    pub fn from_solution(
        &self,
        row: &QuerySolution,
        graph: Option<&NamedNode>,
        lang: Option<&str>,
    ) -> OgmResult<ResourceValues> {
        let graph = self.graph(graph);
        let resolved_lang = self.resolve_lang(lang);
        let mut values = ResourceValues::default();

        match row.get(self.description.uri_field()) {
            Some(RdfTerm::NamedNode(uri)) => values.uri = Some(uri.clone()),
            Some(RdfTerm::BlankNode(node)) => values.blank_node = Some(node.clone()),
            _ => return Err(OgmError::missing(self.description.uri_field())),
        }
        values.rdf_type = row.get_named_node(self.description.type_field()).cloned();
        values.rdf_type_label = row
            .get_literal(self.description.type_label_field())
            .map(|l| l.value().to_string());
        values.lang = resolved_lang.clone();

        for field in self.description.fields() {
            let value = match &field.role {
                FieldRole::DataList(_) => FieldValue::DataList(Vec::new()),
                FieldRole::ObjectList(_) => match &values.uri {
                    Some(owner) => FieldValue::Deferred(RelationKey {
                        owner: owner.clone(),
                        field: field.name.clone(),
                        property: field.property.clone(),
                        reverse: field.reverse,
                        graph: self.read_graph(field, graph).cloned(),
                        lang: resolved_lang.clone(),
                    }),
                    None => FieldValue::ObjectList(Vec::new()),
                },
                role => {
                    let bound = row.get(&field.name);
                    if bound.is_none() && field.required {
                        return Err(OgmError::missing(&field.name));
                    }
                    match (role, bound) {
                        (_, None) => FieldValue::Null,
                        (FieldRole::Data(datatype), Some(term)) => {
                            let data = self
                                .registry
                                .for_datatype(datatype)
                                .and_then(|d| d.from_node(term))
                                .map_err(|source| OgmError::deserialization(&field.name, source))?;
                            FieldValue::Data(data)
                        }
                        (FieldRole::Label, Some(term)) => {
                            let language = term
                                .as_literal()
                                .and_then(Literal::language)
                                .unwrap_or_default();
                            FieldValue::Label(Label::of(language, term.lexical_form()))
                        }
                        (FieldRole::Object(_), Some(term)) => {
                            FieldValue::Object(term.as_named_node().cloned())
                        }
                        _ => FieldValue::Null,
                    }
                }
            };
            values.set(field.name.clone(), value);
        }
        Ok(values)
    }

    /// Batch SELECT of one data list field for several resources
    pub fn build_data_list_select(
        &self,
        field: &str,
        uris: &[NamedNode],
        graph: Option<&NamedNode>,
    ) -> OgmResult<SelectQuery> {
        let field = self.data_list_field(field)?;
        let uri = self.uri_variable();
        let variable = field.variable();

        let mut query = SelectQuery::new(QuerySkeleton::new()).distinct();
        query.add_projection(Projection::Variable(uri.clone()));
        query.add_projection(Projection::Variable(variable.clone()));
        let triple = self.field_triple(field, &variable);
        match self.graph(graph) {
            Some(graph) => query.add_graph_where(graph, triple),
            None => query.add_where(triple),
        }
        query.add_values(uri, uris.iter().cloned().map(RdfTerm::from).collect());
        Ok(query)
    }

    /// Distribute the rows of [`build_data_list_select`](Self::build_data_list_select)
    pub fn apply_data_list(
        &self,
        field: &str,
        resources: &mut [ResourceValues],
        rows: &[QuerySolution],
    ) -> OgmResult<()> {
        let description = self.data_list_field(field)?;
        let datatype = match &description.role {
            FieldRole::DataList(datatype) => datatype,
            _ => return Ok(()),
        };
        let deserializer = self
            .registry
            .for_datatype(datatype)
            .map_err(|source| OgmError::deserialization(field, source))?;

        let mut by_uri: IndexMap<&NamedNode, Vec<_>> = IndexMap::new();
        for row in rows {
            if let (Some(uri), Some(term)) = (
                row.get_named_node(self.description.uri_field()),
                row.get(&description.name),
            ) {
                let data = deserializer
                    .from_node(term)
                    .map_err(|source| OgmError::deserialization(field, source))?;
                by_uri.entry(uri).or_default().push(data);
            }
        }

        for resource in resources.iter_mut() {
            let list = resource
                .uri
                .as_ref()
                .and_then(|uri| by_uri.get(uri))
                .cloned()
                .unwrap_or_default();
            if description.required && list.is_empty() {
                return Err(OgmError::missing(field));
            }
            resource.set(field, FieldValue::DataList(list));
        }
        Ok(())
    }

    fn data_list_field(&self, field: &str) -> OgmResult<&FieldDescription> {
        self.description
            .field(field)
            .filter(|f| matches!(f.role, FieldRole::DataList(_)))
            .ok_or_else(|| OgmError::UnknownField {
                type_name: self.description.type_name(),
                field: field.to_string(),
            })
    }
}

fn merge_labels(existing: &mut ResourceValues, other: ResourceValues) {
    for (name, value) in other.fields {
        if let FieldValue::Label(label) = value {
            match existing.fields.get_mut(&name) {
                Some(FieldValue::Label(current)) => {
                    for (lang, text) in label.translations() {
                        current.add_translation(lang.as_str(), text.as_str());
                    }
                }
                Some(slot @ FieldValue::Null) => *slot = FieldValue::Label(label),
                _ => {}
            }
        }
    }
}

fn mismatch(field: &FieldDescription, value: &FieldValue) -> OgmError {
    OgmError::deserialization(
        &field.name,
        super::deserializer::DeserializerError::MismatchedValue {
            expected: format!("{:?}", field.role),
            found: format!("{:?}", value),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OgmConfig;
    use crate::mapping::{
        Datatype, FieldDeclaration, Relation, ResourceClassAnalyzer, ResourceSchema,
        SparqlResource,
    };
    use crate::rdf::NamespaceManager;
    use crate::sparql::SparqlParser;

    #[derive(Debug)]
    struct Unit;

    impl SparqlResource for Unit {
        fn schema() -> ResourceSchema {
            ResourceSchema::new()
                .rdf_type("http://example.org/vocab#Unit")
                .graph("http://example.org/set/units")
                .uri_field("uri")
                .field(FieldDeclaration::data("symbol", "http://example.org/vocab#hasSymbol", Datatype::String).required())
                .field(FieldDeclaration::data(
                    "alternativeSymbol",
                    "http://example.org/vocab#hasAlternativeSymbol",
                    Datatype::String,
                ))
        }

        fn uri(&self) -> Option<&NamedNode> {
            None
        }

        fn set_uri(&mut self, _uri: NamedNode) {}

        fn to_values(&self) -> ResourceValues {
            ResourceValues::default()
        }

        fn from_values(_values: ResourceValues) -> OgmResult<Self> {
            Ok(Unit)
        }
    }

    #[derive(Debug)]
    struct Measure;

    impl SparqlResource for Measure {
        fn schema() -> ResourceSchema {
            ResourceSchema::new()
                .rdf_type("http://example.org/vocab#Variable")
                .uri_field("uri")
                .field(FieldDeclaration::label("name", "rdfs:label").required())
                .field(FieldDeclaration::object::<Unit>("unit", "http://example.org/vocab#hasUnit"))
                .field(FieldDeclaration::object::<Unit>("usedBy", "http://example.org/vocab#uses").reverse())
                .field(FieldDeclaration::data_list("synonyms", "http://example.org/vocab#synonym", Datatype::String))
        }

        fn uri(&self) -> Option<&NamedNode> {
            None
        }

        fn set_uri(&mut self, _uri: NamedNode) {}

        fn to_values(&self) -> ResourceValues {
            ResourceValues::default()
        }

        fn from_values(_values: ResourceValues) -> OgmResult<Self> {
            Ok(Measure)
        }
    }

    fn builder<T: SparqlResource>() -> ClassQueryBuilder {
        let registry = DeserializerRegistry::default();
        let namespaces = NamespaceManager::new();
        let config = OgmConfig::default();
        let description = ResourceClassAnalyzer::new(&registry, &namespaces, &config)
            .analyze::<T>()
            .unwrap();
        ClassQueryBuilder::new(Arc::new(description), Arc::new(registry), "en")
    }

    fn iri(value: &str) -> NamedNode {
        NamedNode::new(value).unwrap()
    }

    #[test]
    fn test_unit_create_skips_null_optional_field() {
        let builder = builder::<Unit>();
        let values = ResourceValues::new(Some(&iri("http://example.org/unit/kg")))
            .data("symbol", Some("kg"))
            .data::<String>("alternativeSymbol", None);

        let update = builder.build_create(None, &values).unwrap();
        let quads: Vec<_> = update.inserted_quads().collect();
        assert_eq!(quads.len(), 2);
        assert!(quads
            .iter()
            .all(|q| q.graph.as_ref().map(|g| g.as_str()) == Some("http://example.org/set/units")));
        assert!(SparqlParser::parse_update(&update.to_string()).is_ok());
    }

    #[test]
    fn test_required_field_missing_on_create() {
        let builder = builder::<Unit>();
        let values = ResourceValues::new(Some(&iri("http://example.org/unit/kg")));
        assert!(matches!(
            builder.build_create(None, &values),
            Err(OgmError::MissingRequiredField { field }) if field == "symbol"
        ));
    }

    #[test]
    fn test_select_places_optional_fields() {
        let builder = builder::<Unit>();
        let query = builder.build_select(None, None);
        let skeleton = query.skeleton();
        assert_eq!(skeleton.optional_block_count(), 1);

        let text = query.to_string();
        assert!(text.starts_with("SELECT DISTINCT"));
        assert!(text.contains("OPTIONAL"));
        assert!(text.contains("!isBlank(?uri)"));
        assert!(SparqlParser::parse(&text).is_ok());
    }

    #[test]
    fn test_label_filter_and_reverse_triple() {
        let builder = builder::<Measure>();
        let query = builder.build_select(None, Some("fr"));
        let text = query.to_string();
        assert!(text.contains("lang(?name) = \"fr\""));
        assert!(text.contains("?usedBy <http://example.org/vocab#uses> ?uri"));
        assert!(text.contains("?uri <http://example.org/vocab#hasUnit> ?unit"));
        // reverse object field is read in the graph of the related type
        assert!(text.contains("GRAPH <http://example.org/set/units>"));
        assert!(!text.contains("?synonyms"));
        assert!(SparqlParser::parse(&text).is_ok());

        let default_lang = builder.build_select(None, Some("")).to_string();
        assert!(default_lang.contains("lang(?name) = \"en\""));
    }

    #[test]
    fn test_count_and_ask_share_where_clause() {
        let builder = builder::<Measure>();
        let count = builder.build_count(None, "total", None);
        let ask = builder.build_ask(None, None);
        assert_eq!(count.skeleton(), ask.skeleton());
        assert!(count.to_string().contains("COUNT(DISTINCT ?uri) AS ?total"));
        assert!(SparqlParser::parse(&count.to_string()).is_ok());
        assert!(SparqlParser::parse(&ask.to_string()).is_ok());
    }

    #[test]
    fn test_create_labels_lists_and_relations() {
        let builder = builder::<Measure>();
        let owner = iri("http://example.org/var/height");
        let mut values = ResourceValues::new(Some(&owner))
            .label("name", Some(&Label::of("en", "Height").with_translation("fr", "Hauteur")))
            .data_list("synonyms", &["tallness", "stature"])
            .relation(
                Relation::new(iri("http://example.org/vocab#note"), "checked")
                    .in_graph(iri("http://example.org/notes")),
            );
        values.set("usedBy", FieldValue::Object(Some(iri("http://example.org/unit/m"))));

        let update = builder.build_create(None, &values).unwrap();
        let quads: Vec<_> = update.inserted_quads().collect();
        // type, two translations, two synonyms, reverse object, relation
        assert_eq!(quads.len(), 7);

        let reverse = quads
            .iter()
            .find(|q| q.predicate.as_named_node().as_str() == "http://example.org/vocab#uses")
            .unwrap();
        assert_eq!(reverse.subject.to_string(), "<http://example.org/unit/m>");
        assert_eq!(
            reverse.graph.as_ref().unwrap().as_str(),
            "http://example.org/set/units"
        );

        let relation = quads
            .iter()
            .find(|q| q.predicate.as_named_node().as_str() == "http://example.org/vocab#note")
            .unwrap();
        assert_eq!(relation.graph.as_ref().unwrap().as_str(), "http://example.org/notes");
    }

    #[test]
    fn test_unresolved_reference() {
        let builder = builder::<Measure>();
        let mut values = ResourceValues::new(Some(&iri("http://example.org/var/h")))
            .label("name", Some(&Label::of("en", "H")));
        values.set("unit", FieldValue::Object(None));
        assert!(matches!(
            builder.build_create(None, &values),
            Err(OgmError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_from_solutions_merges_translations() {
        let builder = builder::<Measure>();
        let mut en = QuerySolution::new();
        en.bind("uri", RdfTerm::from(iri("http://example.org/var/h")));
        en.bind(
            "name",
            RdfTerm::Literal(Literal::new_language_tagged_literal("Height", "en").unwrap()),
        );
        let mut fr = en.clone();
        fr.bind(
            "name",
            RdfTerm::Literal(Literal::new_language_tagged_literal("Hauteur", "fr").unwrap()),
        );

        let resources = builder.from_solutions(&[en, fr], None, None).unwrap();
        assert_eq!(resources.len(), 1);
        let label = match resources[0].get("name") {
            Some(FieldValue::Label(label)) => label.clone(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(label.get("fr"), Some("Hauteur"));
        assert_eq!(label.get("en"), Some("Height"));
        assert!(matches!(resources[0].get("synonyms"), Some(FieldValue::DataList(l)) if l.is_empty()));
    }

    #[test]
    fn test_unbound_required_field_fails() {
        let builder = builder::<Unit>();
        let mut row = QuerySolution::new();
        row.bind("uri", RdfTerm::from(iri("http://example.org/unit/kg")));
        assert!(matches!(
            builder.from_solution(&row, None, None),
            Err(OgmError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_order_on_unknown_field() {
        let builder = builder::<Unit>();
        assert!(builder.order_expression("symbol").is_ok());
        assert!(builder.order_expression("uri").is_ok());
        assert!(matches!(
            builder.order_expression("weight"),
            Err(OgmError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_data_list_batch_select() {
        let builder = builder::<Measure>();
        let query = builder
            .build_data_list_select("synonyms", &[iri("http://example.org/var/h")], None)
            .unwrap();
        let text = query.to_string();
        assert!(text.contains("VALUES ?uri"));
        assert!(SparqlParser::parse(&text).is_ok());
        assert!(builder.build_data_list_select("name", &[], None).is_err());
    }
}
