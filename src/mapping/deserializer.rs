//! Deserializer registry
//!
//! Converters between typed field values and RDF nodes. The query builder uses them to turn
//! instance values into literals or IRIs, the result path to turn bound terms back into values.

use crate::rdf::namespace::xsd;
use crate::rdf::{Literal, NamedNode, NamespaceManager, PrefixError, RdfObject, RdfTerm};
use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap());

/// Deserializer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeserializerError {
    #[error("Invalid {datatype} value: '{value}'")]
    InvalidValue { value: String, datatype: String },

    #[error("Expected a {expected} value, got {found}")]
    MismatchedValue { expected: String, found: String },

    #[error("No deserializer registered for {0}")]
    Unregistered(String),

    #[error("Invalid URI value: {0}")]
    InvalidUri(String),
}

pub type DeserializerResult<T> = Result<T, DeserializerError>;

/// Declared datatype of a data field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    String,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Uri,
    Custom(NamedNode),
}

impl Datatype {
    /// XSD datatype IRI written on literals of this type
    pub fn iri(&self) -> NamedNode {
        let iri = match self {
            Datatype::String => xsd::STRING,
            Datatype::Boolean => xsd::BOOLEAN,
            Datatype::Byte => xsd::BYTE,
            Datatype::Short => xsd::SHORT,
            Datatype::Int => xsd::INT,
            Datatype::Long => xsd::LONG,
            Datatype::Float => xsd::FLOAT,
            Datatype::Double => xsd::DOUBLE,
            Datatype::Decimal => xsd::DECIMAL,
            Datatype::Date => xsd::DATE,
            Datatype::DateTime => xsd::DATE_TIME,
            Datatype::Uri => xsd::ANY_URI,
            Datatype::Custom(iri) => return iri.clone(),
        };
        NamedNode::new_unchecked(iri)
    }

    /// Built-in datatypes, each with a default deserializer
    pub fn builtins() -> [Datatype; 12] {
        [
            Datatype::String,
            Datatype::Boolean,
            Datatype::Byte,
            Datatype::Short,
            Datatype::Int,
            Datatype::Long,
            Datatype::Float,
            Datatype::Double,
            Datatype::Decimal,
            Datatype::Date,
            Datatype::DateTime,
            Datatype::Uri,
        ]
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::Custom(iri) => write!(f, "{}", iri),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    String(String),
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Lexical form, validated
    Decimal(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Uri(NamedNode),
    /// Value of a custom datatype, kept as its lexical form
    Typed { lexical: String, datatype: NamedNode },
}

impl DataValue {
    pub fn datatype(&self) -> Datatype {
        match self {
            DataValue::String(_) => Datatype::String,
            DataValue::Boolean(_) => Datatype::Boolean,
            DataValue::Byte(_) => Datatype::Byte,
            DataValue::Short(_) => Datatype::Short,
            DataValue::Int(_) => Datatype::Int,
            DataValue::Long(_) => Datatype::Long,
            DataValue::Float(_) => Datatype::Float,
            DataValue::Double(_) => Datatype::Double,
            DataValue::Decimal(_) => Datatype::Decimal,
            DataValue::Date(_) => Datatype::Date,
            DataValue::DateTime(_) => Datatype::DateTime,
            DataValue::Uri(_) => Datatype::Uri,
            DataValue::Typed { datatype, .. } => Datatype::Custom(datatype.clone()),
        }
    }

    /// Lexical form as written in a literal
    pub fn lexical(&self) -> String {
        match self {
            DataValue::String(s) | DataValue::Decimal(s) => s.clone(),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Byte(n) => n.to_string(),
            DataValue::Short(n) => n.to_string(),
            DataValue::Int(n) => n.to_string(),
            DataValue::Long(n) => n.to_string(),
            DataValue::Float(n) => float_lexical(f64::from(*n), n),
            DataValue::Double(n) => float_lexical(*n, n),
            DataValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            DataValue::DateTime(d) => d.to_rfc3339(),
            DataValue::Uri(uri) => uri.as_str().to_string(),
            DataValue::Typed { lexical, .. } => lexical.clone(),
        }
    }
}

/// `xsd:float`/`xsd:double` lexical form; `display` keeps the source precision
fn float_lexical(value: f64, display: &dyn fmt::Display) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        display.to_string()
    }
}

fn parse_float(value: &str) -> Option<f64> {
    match value.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

/// Bidirectional converter for one datatype
pub trait Deserializer: Send + Sync {
    /// Datatype IRI of produced literals (`xsd:anyURI` for IRIs)
    fn datatype(&self) -> NamedNode;

    /// Parse a lexical form
    fn from_string(&self, value: &str) -> DeserializerResult<DataValue>;

    /// RDF node of a value
    fn get_node(&self, value: &DataValue) -> DeserializerResult<RdfObject>;

    /// Value of a bound term
    fn from_node(&self, node: &RdfTerm) -> DeserializerResult<DataValue> {
        self.from_string(node.lexical_form())
    }
}

/// Converter for the built-in literal datatypes
struct LiteralDeserializer {
    datatype: Datatype,
}

impl LiteralDeserializer {
    fn invalid(&self, value: &str) -> DeserializerError {
        DeserializerError::InvalidValue {
            value: value.to_string(),
            datatype: self.datatype.to_string(),
        }
    }
}

impl Deserializer for LiteralDeserializer {
    fn datatype(&self) -> NamedNode {
        self.datatype.iri()
    }

    fn from_string(&self, value: &str) -> DeserializerResult<DataValue> {
        let trimmed = value.trim();
        let parsed = match &self.datatype {
            Datatype::String => Some(DataValue::String(value.to_string())),
            Datatype::Boolean => match trimmed {
                "true" | "1" => Some(DataValue::Boolean(true)),
                "false" | "0" => Some(DataValue::Boolean(false)),
                _ => None,
            },
            Datatype::Byte => trimmed.parse().ok().map(DataValue::Byte),
            Datatype::Short => trimmed.parse().ok().map(DataValue::Short),
            Datatype::Int => trimmed.parse().ok().map(DataValue::Int),
            Datatype::Long => trimmed.parse().ok().map(DataValue::Long),
            Datatype::Float => parse_float(trimmed).map(|n| DataValue::Float(n as f32)),
            Datatype::Double => parse_float(trimmed).map(DataValue::Double),
            Datatype::Decimal => DECIMAL
                .is_match(trimmed)
                .then(|| DataValue::Decimal(trimmed.to_string())),
            Datatype::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(DataValue::Date),
            Datatype::DateTime => DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(DataValue::DateTime),
            Datatype::Custom(datatype) => Some(DataValue::Typed {
                lexical: value.to_string(),
                datatype: datatype.clone(),
            }),
            Datatype::Uri => None,
        };
        parsed.ok_or_else(|| self.invalid(value))
    }

    fn get_node(&self, value: &DataValue) -> DeserializerResult<RdfObject> {
        if value.datatype() != self.datatype {
            return Err(DeserializerError::MismatchedValue {
                expected: self.datatype.to_string(),
                found: value.datatype().to_string(),
            });
        }

        let literal = match value {
            DataValue::String(s) => Literal::new_simple_literal(s.as_str()),
            other => Literal::new_typed_literal(other.lexical(), self.datatype.iri()),
        };
        Ok(RdfObject::Literal(literal))
    }
}

/// Converter for IRI values, accepting prefixed names
struct UriDeserializer {
    namespaces: NamespaceManager,
}

impl Deserializer for UriDeserializer {
    fn datatype(&self) -> NamedNode {
        Datatype::Uri.iri()
    }

    fn from_string(&self, value: &str) -> DeserializerResult<DataValue> {
        self.namespaces
            .resolve(value)
            .map(DataValue::Uri)
            .map_err(|e: PrefixError| DeserializerError::InvalidUri(e.to_string()))
    }

    fn get_node(&self, value: &DataValue) -> DeserializerResult<RdfObject> {
        match value {
            DataValue::Uri(uri) => Ok(RdfObject::NamedNode(uri.clone())),
            other => Err(DeserializerError::MismatchedValue {
                expected: Datatype::Uri.to_string(),
                found: other.datatype().to_string(),
            }),
        }
    }

    fn from_node(&self, node: &RdfTerm) -> DeserializerResult<DataValue> {
        match node {
            RdfTerm::NamedNode(uri) => Ok(DataValue::Uri(uri.clone())),
            other => self.from_string(other.lexical_form()),
        }
    }
}

/// Registry of deserializers by datatype
#[derive(Clone)]
pub struct DeserializerRegistry {
    deserializers: HashMap<Datatype, Arc<dyn Deserializer>>,
}

impl DeserializerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            deserializers: HashMap::new(),
        }
    }

    /// Registry holding every built-in datatype; URI values resolve prefixes with `namespaces`
    pub fn with_defaults(namespaces: NamespaceManager) -> Self {
        let mut registry = Self::new();
        for datatype in Datatype::builtins() {
            let deserializer: Arc<dyn Deserializer> = match &datatype {
                Datatype::Uri => Arc::new(UriDeserializer {
                    namespaces: namespaces.clone(),
                }),
                other => Arc::new(LiteralDeserializer { datatype: other.clone() }),
            };
            registry.deserializers.insert(datatype, deserializer);
        }
        registry
    }

    /// Add or replace the deserializer of a datatype
    pub fn register(&mut self, datatype: Datatype, deserializer: Arc<dyn Deserializer>) {
        self.deserializers.insert(datatype, deserializer);
    }

    /// Register a pass-through deserializer for a custom literal datatype
    pub fn register_custom(&mut self, datatype: NamedNode) {
        let key = Datatype::Custom(datatype);
        self.deserializers.insert(
            key.clone(),
            Arc::new(LiteralDeserializer { datatype: key }),
        );
    }

    pub fn for_datatype(&self, datatype: &Datatype) -> DeserializerResult<&Arc<dyn Deserializer>> {
        self.deserializers
            .get(datatype)
            .ok_or_else(|| DeserializerError::Unregistered(datatype.to_string()))
    }

    pub fn contains(&self, datatype: &Datatype) -> bool {
        self.deserializers.contains_key(datatype)
    }

    /// RDF node of a value, using the deserializer of its own datatype
    pub fn node_of(&self, value: &DataValue) -> DeserializerResult<RdfObject> {
        self.for_datatype(&value.datatype())?.get_node(value)
    }
}

impl Default for DeserializerRegistry {
    fn default() -> Self {
        Self::with_defaults(NamespaceManager::new())
    }
}

macro_rules! data_value_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DataValue {
                fn from(value: $ty) -> Self {
                    DataValue::$variant(value)
                }
            }

            impl TryFrom<DataValue> for $ty {
                type Error = DeserializerError;

                fn try_from(value: DataValue) -> Result<Self, Self::Error> {
                    match value {
                        DataValue::$variant(inner) => Ok(inner),
                        other => Err(DeserializerError::MismatchedValue {
                            expected: Datatype::$variant.to_string(),
                            found: other.datatype().to_string(),
                        }),
                    }
                }
            }
        )*
    };
}

data_value_conversions! {
    String => String,
    Boolean => bool,
    Byte => i8,
    Short => i16,
    Int => i32,
    Long => i64,
    Float => f32,
    Double => f64,
    Date => NaiveDate,
    DateTime => DateTime<FixedOffset>,
    Uri => NamedNode,
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}
