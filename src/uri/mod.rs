//! URI generation
//!
//! Each mapped type declares a [`UriStrategy`]; it is resolved once, when the type is analyzed,
//! into a [`UriGenerator`]. The service calls the generator with an increasing retry counter
//! until it yields a URI unused in the store or the retry ceiling is reached.

mod counter;
mod strategy;

pub use counter::{SequenceCounter, SequenceScope, UriLocks};
pub use strategy::{
    ContentHashGenerator, RandomGenerator, SegmentsGenerator, UriStrategy, YearSequenceGenerator,
};

use crate::config::OgmConfig;
use crate::mapping::ResourceValues;
use crate::rdf::{NamedNode, RdfError};
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use thiserror::Error;

static FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[$&~"'{}()\[\]|`\\^@=+%*!:/;.,?]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Characters left after stripping that are still not allowed in a path segment
const SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'<').add(b'>').add(b'#');

/// URI generation errors
#[derive(Error, Debug)]
pub enum UriError {
    /// A segment field is missing or normalizes to nothing
    #[error("No usable value in field '{0}' to build a URI")]
    EmptySegment(String),

    #[error("Generated URI is invalid: {0}")]
    Invalid(#[from] RdfError),
}

pub type UriResult<T> = Result<T, UriError>;

/// Turn free text into a URI path segment.
///
/// Removes characters reserved in URIs, replaces whitespace runs with `_` and percent-encodes
/// the rest of what a path segment cannot hold.
pub fn normalize(value: &str) -> String {
    let stripped = FORBIDDEN.replace_all(value.trim(), "");
    let joined = WHITESPACE.replace_all(stripped.trim(), "_");
    utf8_percent_encode(&joined, SEGMENT).to_string()
}

/// Namespace of generated URIs: `{base}{path}/`
pub fn namespace(base_uri: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        base_uri.to_string()
    } else {
        format!("{}{}/", base_uri, path)
    }
}

/// Candidate URI producer of one mapped type
pub trait UriGenerator: Send + Sync {
    /// Namespace shared by every candidate, used as lock key
    fn prefix(&self, config: &OgmConfig) -> String;

    /// Candidate for attempt `retry` (0 for the first one)
    fn generate(
        &self,
        config: &OgmConfig,
        values: &ResourceValues,
        retry: u32,
    ) -> UriResult<NamedNode>;

    /// Retry ceiling, the configured default when `None`
    fn max_retries(&self) -> Option<u32> {
        None
    }

    /// Numbered sequence the next candidate draws from, seeded from the store before first use
    fn sequence(&self, _config: &OgmConfig) -> Option<SequenceScope> {
        None
    }
}
