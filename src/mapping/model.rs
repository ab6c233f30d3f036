//! Entity values exchanged between typed entities and the query builder

use super::deserializer::{DataValue, DeserializerError};
use super::proxy::{LazyList, LazyRelation, RelationKey};
use super::schema::ResourceSchema;
use crate::error::{OgmError, OgmResult};
use crate::rdf::{BlankNode, NamedNode};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Language-tagged text, one value per language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    translations: BTreeMap<String, String>,
}

impl Label {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label holding a single translation
    pub fn of(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().with_translation(lang, value)
    }

    pub fn with_translation(mut self, lang: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_translation(lang, value);
        self
    }

    /// Set the translation of a language, replacing any previous one
    pub fn add_translation(&mut self, lang: impl Into<String>, value: impl Into<String>) {
        self.translations.insert(lang.into(), value.into());
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.translations.get(lang).map(String::as_str)
    }

    pub fn translations(&self) -> &BTreeMap<String, String> {
        &self.translations
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Translation of `lang`, or the first one in language order
    pub fn preferred(&self, lang: &str) -> Option<&str> {
        self.get(lang)
            .or_else(|| self.translations.values().next().map(String::as_str))
    }
}

/// Value of one declared field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Data(DataValue),
    Label(Label),
    /// Related resource; `None` when the related instance has no URI yet
    Object(Option<NamedNode>),
    DataList(Vec<DataValue>),
    ObjectList(Vec<Option<NamedNode>>),
    /// To-many relation not loaded yet
    Deferred(RelationKey),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Ad hoc statement attached to an instance, outside of its declared fields
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub property: NamedNode,
    pub value: DataValue,
    /// Graph override, the instance graph when `None`
    pub graph: Option<NamedNode>,
}

impl Relation {
    pub fn new(property: NamedNode, value: impl Into<DataValue>) -> Self {
        Self {
            property,
            value: value.into(),
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: NamedNode) -> Self {
        self.graph = Some(graph);
        self
    }
}

/// Untyped values of one resource.
///
/// Produced by [`SparqlResource::to_values`] before writes and by the query builder from
/// result rows before [`SparqlResource::from_values`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceValues {
    pub uri: Option<NamedNode>,
    /// Subject of resources stored without URI
    pub blank_node: Option<BlankNode>,
    pub rdf_type: Option<NamedNode>,
    /// Label of the RDF type in the read language
    pub rdf_type_label: Option<String>,
    /// Language the values were read in
    pub lang: Option<String>,
    pub fields: IndexMap<String, FieldValue>,
    pub relations: Vec<Relation>,
}

impl ResourceValues {
    pub fn new(uri: Option<&NamedNode>) -> Self {
        Self {
            uri: uri.cloned(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, rdf_type: Option<&NamedNode>) -> Self {
        self.rdf_type = rdf_type.cloned();
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn data<V: Into<DataValue>>(mut self, field: &str, value: Option<V>) -> Self {
        let value = value.map_or(FieldValue::Null, |v| FieldValue::Data(v.into()));
        self.set(field, value);
        self
    }

    pub fn label(mut self, field: &str, value: Option<&Label>) -> Self {
        let value = value.map_or(FieldValue::Null, |l| FieldValue::Label(l.clone()));
        self.set(field, value);
        self
    }

    pub fn object<T: SparqlResource>(mut self, field: &str, value: Option<&LazyRelation<T>>) -> Self {
        let value = value.map_or(FieldValue::Null, |r| FieldValue::Object(r.uri().cloned()));
        self.set(field, value);
        self
    }

    pub fn data_list<V: Into<DataValue> + Clone>(mut self, field: &str, values: &[V]) -> Self {
        let values = values.iter().cloned().map(Into::into).collect();
        self.set(field, FieldValue::DataList(values));
        self
    }

    pub fn object_list<T: SparqlResource>(mut self, field: &str, list: &LazyList<T>) -> Self {
        let value = match (list.uris(), list.key()) {
            (Some(uris), _) => FieldValue::ObjectList(uris),
            (None, Some(key)) => FieldValue::Deferred(key.clone()),
            (None, None) => FieldValue::ObjectList(Vec::new()),
        };
        self.set(field, value);
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Remove a field value, `Null` when absent
    pub fn take(&mut self, field: &str) -> FieldValue {
        self.fields.shift_remove(field).unwrap_or(FieldValue::Null)
    }

    pub fn take_data<V>(&mut self, field: &str) -> OgmResult<Option<V>>
    where
        V: TryFrom<DataValue, Error = DeserializerError>,
    {
        match self.take(field) {
            FieldValue::Null => Ok(None),
            FieldValue::Data(value) => V::try_from(value)
                .map(Some)
                .map_err(|source| OgmError::deserialization(field, source)),
            other => Err(unexpected(field, &other)),
        }
    }

    /// Like [`take_data`](Self::take_data), failing when the value is missing
    pub fn require_data<V>(&mut self, field: &str) -> OgmResult<V>
    where
        V: TryFrom<DataValue, Error = DeserializerError>,
    {
        self.take_data(field)?
            .ok_or_else(|| OgmError::missing(field))
    }

    pub fn take_label(&mut self, field: &str) -> OgmResult<Option<Label>> {
        match self.take(field) {
            FieldValue::Null => Ok(None),
            FieldValue::Label(label) => Ok(Some(label)),
            other => Err(unexpected(field, &other)),
        }
    }

    pub fn take_data_list<V>(&mut self, field: &str) -> OgmResult<Vec<V>>
    where
        V: TryFrom<DataValue, Error = DeserializerError>,
    {
        match self.take(field) {
            FieldValue::Null => Ok(Vec::new()),
            FieldValue::DataList(values) => values
                .into_iter()
                .map(|v| V::try_from(v).map_err(|source| OgmError::deserialization(field, source)))
                .collect(),
            other => Err(unexpected(field, &other)),
        }
    }

    /// To-one relation, unloaded
    pub fn take_relation<T: SparqlResource>(&mut self, field: &str) -> OgmResult<Option<LazyRelation<T>>> {
        match self.take(field) {
            FieldValue::Null | FieldValue::Object(None) => Ok(None),
            FieldValue::Object(Some(uri)) => {
                Ok(Some(LazyRelation::unloaded(uri).with_lang(self.lang.clone())))
            }
            other => Err(unexpected(field, &other)),
        }
    }

    /// To-many relation, unloaded when read from the store
    pub fn take_list<T: SparqlResource>(&mut self, field: &str) -> OgmResult<LazyList<T>> {
        match self.take(field) {
            FieldValue::Deferred(key) => Ok(LazyList::unloaded(key)),
            FieldValue::Null | FieldValue::ObjectList(_) => Ok(LazyList::default()),
            other => Err(unexpected(field, &other)),
        }
    }
}

fn unexpected(field: &str, value: &FieldValue) -> OgmError {
    let found = match value {
        FieldValue::Null => "null",
        FieldValue::Data(_) => "data value",
        FieldValue::Label(_) => "label",
        FieldValue::Object(_) => "object",
        FieldValue::DataList(_) => "data list",
        FieldValue::ObjectList(_) => "object list",
        FieldValue::Deferred(_) => "deferred relation",
    };
    OgmError::deserialization(
        field,
        DeserializerError::MismatchedValue {
            expected: "declared field kind".to_string(),
            found: found.to_string(),
        },
    )
}

/// Entity mapped to RDF resources
///
/// ```rust
/// use samyama_ogm::mapping::{Datatype, FieldDeclaration, ResourceSchema, ResourceValues, SparqlResource};
/// use samyama_ogm::rdf::NamedNode;
/// use samyama_ogm::OgmResult;
///
/// #[derive(Debug, Clone, Default)]
/// struct Unit {
///     uri: Option<NamedNode>,
///     symbol: String,
///     alternative_symbol: Option<String>,
/// }
///
/// impl SparqlResource for Unit {
///     fn schema() -> ResourceSchema {
///         ResourceSchema::new()
///             .rdf_type("http://example.org/vocab#Unit")
///             .graph("set/units")
///             .uri_field("uri")
///             .field(FieldDeclaration::data("symbol", "http://example.org/vocab#hasSymbol", Datatype::String).required())
///             .field(FieldDeclaration::data("alternativeSymbol", "http://example.org/vocab#hasAlternativeSymbol", Datatype::String))
///     }
///
///     fn uri(&self) -> Option<&NamedNode> {
///         self.uri.as_ref()
///     }
///
///     fn set_uri(&mut self, uri: NamedNode) {
///         self.uri = Some(uri);
///     }
///
///     fn to_values(&self) -> ResourceValues {
///         ResourceValues::new(self.uri.as_ref())
///             .data("symbol", Some(self.symbol.clone()))
///             .data("alternativeSymbol", self.alternative_symbol.clone())
///     }
///
///     fn from_values(mut values: ResourceValues) -> OgmResult<Self> {
///         Ok(Self {
///             uri: values.uri.take(),
///             symbol: values.require_data("symbol")?,
///             alternative_symbol: values.take_data("alternativeSymbol")?,
///         })
///     }
/// }
/// ```
pub trait SparqlResource: Sized + Send + Sync + 'static {
    /// Mapping declaration, analyzed once per process
    fn schema() -> ResourceSchema;

    fn uri(&self) -> Option<&NamedNode>;

    fn set_uri(&mut self, uri: NamedNode);

    fn to_values(&self) -> ResourceValues;

    fn from_values(values: ResourceValues) -> OgmResult<Self>;
}
