//! Lazy relation proxies
//!
//! Object-typed fields read from the store are not materialized eagerly. A proxy holds the
//! back-reference needed to fetch the related resources and a single memoized result:
//!
//! ```text
//! Unloaded --resolve--> Loading --> Loaded
//!                               \-> Failed   (replayed on every access, no retry)
//! ```
//!
//! Concurrent first resolution blocks on the cell, so the loading query runs at most once per
//! proxy instance.

use super::model::SparqlResource;
use crate::error::{OgmError, OgmResult};
use crate::rdf::NamedNode;
use crate::sparql::{Projection, QuerySkeleton, SelectQuery, TriplePattern, Variable};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Variable bound to related resources in [`RelationKey::uri_query`]
pub const TARGET_VAR: &str = "target";

/// Back-reference of a to-many relation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationKey {
    /// Resource declaring the field
    pub owner: NamedNode,
    pub field: String,
    pub property: NamedNode,
    /// Related resources are subjects of the relation triples
    pub reverse: bool,
    /// Graph holding the relation triples
    pub graph: Option<NamedNode>,
    pub lang: Option<String>,
}

impl RelationKey {
    /// Triple linking the owner to `target`, in the direction of the relation
    pub fn triple(&self, target: &Variable) -> TriplePattern {
        if self.reverse {
            TriplePattern::new(target, &self.property, &self.owner)
        } else {
            TriplePattern::new(&self.owner, &self.property, target)
        }
    }

    /// SELECT of the related resource URIs, bound to [`TARGET_VAR`]
    pub fn uri_query(&self) -> SelectQuery {
        let target = Variable::new(TARGET_VAR);
        let mut query = SelectQuery::new(QuerySkeleton::new()).distinct();
        query.add_projection(Projection::Variable(target.clone()));
        match &self.graph {
            Some(graph) => query.add_graph_where(graph, self.triple(&target)),
            None => query.add_where(self.triple(&target)),
        }
        query
    }
}

/// Loads related resources on behalf of proxies
pub trait RelationLoader {
    /// Resource by URI, `None` when absent
    fn load_resource<T: SparqlResource>(
        &self,
        uri: &NamedNode,
        lang: Option<&str>,
    ) -> OgmResult<Option<T>>;

    /// Every resource related through `key`
    fn load_related<T: SparqlResource>(&self, key: &RelationKey) -> OgmResult<Vec<T>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

fn state_of<V>(cell: &OnceCell<Result<V, Arc<OgmError>>>, loading: &AtomicBool) -> RelationState {
    match cell.get() {
        Some(Ok(_)) => RelationState::Loaded,
        Some(Err(_)) => RelationState::Failed,
        None if loading.load(Ordering::Acquire) => RelationState::Loading,
        None => RelationState::Unloaded,
    }
}

fn memoized<'a, V>(
    cell: &'a OnceCell<Result<V, Arc<OgmError>>>,
    loading: &AtomicBool,
    load: impl FnOnce() -> OgmResult<V>,
) -> OgmResult<&'a V> {
    let result = cell.get_or_init(|| {
        loading.store(true, Ordering::Release);
        let result = load().map_err(Arc::new);
        loading.store(false, Ordering::Release);
        result
    });
    result
        .as_ref()
        .map_err(|e| OgmError::RelationLoad(Arc::clone(e)))
}

/// To-one relation
pub struct LazyRelation<T> {
    uri: Option<NamedNode>,
    lang: Option<String>,
    loading: AtomicBool,
    cell: OnceCell<Result<Option<T>, Arc<OgmError>>>,
}

impl<T: SparqlResource> LazyRelation<T> {
    /// Proxy of the resource identified by `uri`
    pub fn unloaded(uri: NamedNode) -> Self {
        Self {
            uri: Some(uri),
            lang: None,
            loading: AtomicBool::new(false),
            cell: OnceCell::new(),
        }
    }

    /// Relation to an in-memory instance
    pub fn loaded(value: T) -> Self {
        Self {
            uri: value.uri().cloned(),
            lang: None,
            loading: AtomicBool::new(false),
            cell: OnceCell::with_value(Ok(Some(value))),
        }
    }

    /// Language used to read the related resource
    pub fn with_lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }

    pub fn uri(&self) -> Option<&NamedNode> {
        match self.cell.get() {
            Some(Ok(Some(value))) => value.uri().or(self.uri.as_ref()),
            _ => self.uri.as_ref(),
        }
    }

    pub fn state(&self) -> RelationState {
        state_of(&self.cell, &self.loading)
    }

    /// Related instance if already loaded
    pub fn get(&self) -> Option<&T> {
        match self.cell.get() {
            Some(Ok(value)) => value.as_ref(),
            _ => None,
        }
    }

    /// Load the related instance on first call, `None` when it does not exist
    pub fn resolve<L: RelationLoader>(&self, loader: &L) -> OgmResult<Option<&T>> {
        let value = memoized(&self.cell, &self.loading, || match &self.uri {
            Some(uri) => loader.load_resource::<T>(uri, self.lang.as_deref()),
            None => Ok(None),
        })?;
        Ok(value.as_ref())
    }
}

impl<T: Clone> Clone for LazyRelation<T> {
    fn clone(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            lang: self.lang.clone(),
            loading: AtomicBool::new(false),
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyRelation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRelation")
            .field("uri", &self.uri)
            .field("value", &self.cell.get())
            .finish()
    }
}

/// To-many relation
pub struct LazyList<T> {
    key: Option<RelationKey>,
    loading: AtomicBool,
    cell: OnceCell<Result<Vec<T>, Arc<OgmError>>>,
}

impl<T: SparqlResource> LazyList<T> {
    pub fn unloaded(key: RelationKey) -> Self {
        Self {
            key: Some(key),
            loading: AtomicBool::new(false),
            cell: OnceCell::new(),
        }
    }

    pub fn loaded(values: Vec<T>) -> Self {
        Self {
            key: None,
            loading: AtomicBool::new(false),
            cell: OnceCell::with_value(Ok(values)),
        }
    }

    pub fn key(&self) -> Option<&RelationKey> {
        self.key.as_ref()
    }

    pub fn state(&self) -> RelationState {
        state_of(&self.cell, &self.loading)
    }

    pub fn get(&self) -> Option<&[T]> {
        match self.cell.get() {
            Some(Ok(values)) => Some(values.as_slice()),
            _ => None,
        }
    }

    /// URIs of the loaded instances, `None` while unloaded
    pub fn uris(&self) -> Option<Vec<Option<NamedNode>>> {
        self.get()
            .map(|values| values.iter().map(|v| v.uri().cloned()).collect())
    }

    pub fn resolve<L: RelationLoader>(&self, loader: &L) -> OgmResult<&[T]> {
        let values = memoized(&self.cell, &self.loading, || match &self.key {
            Some(key) => loader.load_related::<T>(key),
            None => Ok(Vec::new()),
        })?;
        Ok(values.as_slice())
    }
}

impl<T: SparqlResource> Default for LazyList<T> {
    fn default() -> Self {
        Self::loaded(Vec::new())
    }
}

impl<T: Clone> Clone for LazyList<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            loading: AtomicBool::new(false),
            cell: self.cell.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyList")
            .field("key", &self.key)
            .field("values", &self.cell.get())
            .finish()
    }
}
