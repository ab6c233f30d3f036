//! URI generation strategies

use super::{
    namespace, normalize, SequenceCounter, SequenceScope, UriError, UriGenerator, UriResult,
};
use crate::config::OgmConfig;
use crate::mapping::{FieldValue, ResourceValues};
use crate::rdf::NamedNode;
use chrono::{Datelike, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Strategy declared by a mapped type
#[derive(Clone)]
pub enum UriStrategy {
    /// `{base}{path}/{slug}[/{slug}...]`, retry `n` appends `-n`
    Segments { path: String, fields: Vec<String> },
    /// `{base}{path}/{uuid}`
    Random { path: String },
    /// `{base}{path}/{year}/{code}{yy}{counter:06}`, counter scoped by type and year
    YearSequence { path: String, code: String },
    /// `{base}{path}/{sha256 of the field values}`, retry `n` appends `-n`
    ContentHash { path: String, fields: Vec<String> },
    Custom(Arc<dyn UriGenerator>),
}

impl UriStrategy {
    pub fn segments(path: impl Into<String>, fields: &[&str]) -> Self {
        UriStrategy::Segments {
            path: path.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn random(path: impl Into<String>) -> Self {
        UriStrategy::Random { path: path.into() }
    }

    pub fn year_sequence(path: impl Into<String>, code: impl Into<String>) -> Self {
        UriStrategy::YearSequence {
            path: path.into(),
            code: code.into(),
        }
    }

    pub fn content_hash(path: impl Into<String>, fields: &[&str]) -> Self {
        UriStrategy::ContentHash {
            path: path.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Fields read by the strategy
    pub fn fields(&self) -> &[String] {
        match self {
            UriStrategy::Segments { fields, .. } | UriStrategy::ContentHash { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Generator of this strategy for the type `kind`
    pub fn generator(&self, kind: &str, counter: &Arc<SequenceCounter>) -> Arc<dyn UriGenerator> {
        match self {
            UriStrategy::Segments { path, fields } => Arc::new(SegmentsGenerator {
                path: path.clone(),
                fields: fields.clone(),
            }),
            UriStrategy::Random { path } => Arc::new(RandomGenerator { path: path.clone() }),
            UriStrategy::YearSequence { path, code } => Arc::new(YearSequenceGenerator {
                path: path.clone(),
                code: code.clone(),
                kind: kind.to_string(),
                counter: Arc::clone(counter),
            }),
            UriStrategy::ContentHash { path, fields } => Arc::new(ContentHashGenerator {
                path: path.clone(),
                fields: fields.clone(),
            }),
            UriStrategy::Custom(generator) => Arc::clone(generator),
        }
    }
}

impl PartialEq for UriStrategy {
    fn eq(&self, other: &Self) -> bool {
        use UriStrategy::*;
        match (self, other) {
            (Segments { path: a, fields: f }, Segments { path: b, fields: g })
            | (ContentHash { path: a, fields: f }, ContentHash { path: b, fields: g }) => {
                a == b && f == g
            }
            (Random { path: a }, Random { path: b }) => a == b,
            (YearSequence { path: a, code: c }, YearSequence { path: b, code: d }) => {
                a == b && c == d
            }
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for UriStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriStrategy::Segments { path, fields } => f
                .debug_struct("Segments")
                .field("path", path)
                .field("fields", fields)
                .finish(),
            UriStrategy::Random { path } => f.debug_struct("Random").field("path", path).finish(),
            UriStrategy::YearSequence { path, code } => f
                .debug_struct("YearSequence")
                .field("path", path)
                .field("code", code)
                .finish(),
            UriStrategy::ContentHash { path, fields } => f
                .debug_struct("ContentHash")
                .field("path", path)
                .field("fields", fields)
                .finish(),
            UriStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Text of a field used in a URI
fn field_text(values: &ResourceValues, field: &str, lang: &str) -> Option<String> {
    match values.get(field)? {
        FieldValue::Data(value) => Some(value.lexical()),
        FieldValue::Label(label) => label.preferred(lang).map(str::to_string),
        FieldValue::Object(Some(uri)) => Some(uri.as_str().to_string()),
        _ => None,
    }
}

fn with_retry(candidate: String, retry: u32) -> String {
    if retry == 0 {
        candidate
    } else {
        format!("{}-{}", candidate, retry)
    }
}

pub struct SegmentsGenerator {
    path: String,
    fields: Vec<String>,
}

impl UriGenerator for SegmentsGenerator {
    fn prefix(&self, config: &OgmConfig) -> String {
        namespace(&config.base_uri, &self.path)
    }

    fn generate(
        &self,
        config: &OgmConfig,
        values: &ResourceValues,
        retry: u32,
    ) -> UriResult<NamedNode> {
        let segments = self
            .fields
            .iter()
            .map(|field| {
                field_text(values, field, &config.default_language)
                    .map(|text| normalize(&text))
                    .filter(|slug| !slug.is_empty())
                    .ok_or_else(|| UriError::EmptySegment(field.clone()))
            })
            .collect::<UriResult<Vec<_>>>()?;

        let candidate = format!("{}{}", self.prefix(config), segments.join("/"));
        Ok(NamedNode::new(&with_retry(candidate, retry))?)
    }
}

pub struct RandomGenerator {
    path: String,
}

impl UriGenerator for RandomGenerator {
    fn prefix(&self, config: &OgmConfig) -> String {
        namespace(&config.base_uri, &self.path)
    }

    fn generate(&self, config: &OgmConfig, _values: &ResourceValues, _retry: u32) -> UriResult<NamedNode> {
        Ok(NamedNode::new(&format!("{}{}", self.prefix(config), Uuid::new_v4()))?)
    }

    fn max_retries(&self) -> Option<u32> {
        Some(10)
    }
}

pub struct YearSequenceGenerator {
    path: String,
    code: String,
    kind: String,
    counter: Arc<SequenceCounter>,
}

impl YearSequenceGenerator {
    /// `{prefix}{year}/{code}{yy}`, followed by the sequence number in every URI of that year
    fn stem(&self, config: &OgmConfig, year: i32) -> String {
        format!(
            "{}{}/{}{:02}",
            self.prefix(config),
            year,
            normalize(&self.code),
            year.rem_euclid(100)
        )
    }

    /// Candidate for a given year, consuming one number of that year's sequence
    pub fn generate_for_year(&self, config: &OgmConfig, year: i32) -> UriResult<NamedNode> {
        let number = self.counter.next(&self.kind, year);
        let uri = format!("{}{:06}", self.stem(config, year), number);
        Ok(NamedNode::new(&uri)?)
    }

    pub fn sequence_for_year(&self, config: &OgmConfig, year: i32) -> SequenceScope {
        SequenceScope::new(self.stem(config, year), &self.kind, year, &self.counter)
    }
}

impl UriGenerator for YearSequenceGenerator {
    fn prefix(&self, config: &OgmConfig) -> String {
        namespace(&config.base_uri, &self.path)
    }

    // every attempt draws a fresh number, so the retry count is not part of the URI
    fn generate(&self, config: &OgmConfig, _values: &ResourceValues, _retry: u32) -> UriResult<NamedNode> {
        self.generate_for_year(config, Utc::now().year())
    }

    fn sequence(&self, config: &OgmConfig) -> Option<SequenceScope> {
        Some(self.sequence_for_year(config, Utc::now().year()))
    }
}

pub struct ContentHashGenerator {
    path: String,
    fields: Vec<String>,
}

impl UriGenerator for ContentHashGenerator {
    fn prefix(&self, config: &OgmConfig) -> String {
        namespace(&config.base_uri, &self.path)
    }

    fn generate(
        &self,
        config: &OgmConfig,
        values: &ResourceValues,
        retry: u32,
    ) -> UriResult<NamedNode> {
        let mut hasher = Sha256::new();
        for field in &self.fields {
            let text = field_text(values, field, &config.default_language)
                .ok_or_else(|| UriError::EmptySegment(field.clone()))?;
            hasher.update(text.as_bytes());
            hasher.update([0x1fu8]);
        }
        let digest = hasher.finalize();
        let hex: String = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();

        let candidate = format!("{}{}", self.prefix(config), hex);
        Ok(NamedNode::new(&with_retry(candidate, retry))?)
    }
}
