//! Query skeletons
//!
//! A `QuerySkeleton` is the graph-partitioned WHERE clause produced by the class query
//! builder: one required block per named graph, a list of optional blocks per named graph, and
//! a root group holding graph-independent patterns (type hierarchy, caller filters, VALUES).
//! It is rendered into a single group pattern only when the final query text is requested.
//!
//! Merge rules:
//! - the required block of graph `g` becomes `GRAPH <g> { ... }`; the default-graph block is
//!   inlined at top level
//! - optional blocks sharing the graph of a required block are nested inside that block's
//!   `GRAPH` element, each one as its own `OPTIONAL`
//! - optional blocks of any other named graph are wrapped together in a single
//!   `OPTIONAL { GRAPH <g> { ... } }`

use super::algebra::{GroupPattern, OrderCondition, TriplePattern, Variable};
use crate::rdf::{NamedNode, Quad, RdfTerm};
use indexmap::IndexMap;
use std::fmt;

/// Graph-partitioned WHERE clause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySkeleton {
    required: IndexMap<Option<NamedNode>, GroupPattern>,
    optional: IndexMap<Option<NamedNode>, Vec<GroupPattern>>,
    root: GroupPattern,
}

impl QuerySkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skeleton made of a single, graph-independent group
    pub fn from_pattern(root: GroupPattern) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Required block of a graph, created on first use
    pub fn required_mut(&mut self, graph: Option<&NamedNode>) -> &mut GroupPattern {
        self.required.entry(graph.cloned()).or_default()
    }

    /// Register one optional block in a graph bucket
    pub fn add_optional(&mut self, graph: Option<&NamedNode>, group: GroupPattern) {
        self.optional.entry(graph.cloned()).or_default().push(group);
    }

    pub fn root(&self) -> &GroupPattern {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut GroupPattern {
        &mut self.root
    }

    pub fn required(&self, graph: Option<&NamedNode>) -> Option<&GroupPattern> {
        self.required.get(&graph.cloned())
    }

    pub fn optional(&self, graph: Option<&NamedNode>) -> &[GroupPattern] {
        self.optional
            .get(&graph.cloned())
            .map(|blocks| blocks.as_slice())
            .unwrap_or(&[])
    }

    /// Graphs holding at least one required block, in insertion order
    pub fn required_graphs(&self) -> impl Iterator<Item = Option<&NamedNode>> {
        self.required.keys().map(|g| g.as_ref())
    }

    /// Number of field-level optional blocks across all graph buckets
    pub fn optional_block_count(&self) -> usize {
        self.optional.values().map(|blocks| blocks.len()).sum()
    }

    /// Merge all buckets into the final WHERE group
    pub fn to_group_pattern(&self) -> GroupPattern {
        let mut optional = self.optional.clone();
        let mut out = GroupPattern::new();

        for (graph, block) in &self.required {
            let mut block = block.clone();
            match graph {
                Some(g) => {
                    if let Some(blocks) = optional.shift_remove(graph) {
                        for group in blocks {
                            block.add_optional(group);
                        }
                    }
                    out.add_graph(g.clone(), block);
                }
                None => out.extend(block),
            }
        }

        out.extend(self.root.clone());

        for (graph, mut blocks) in optional {
            match graph {
                None => {
                    for group in blocks {
                        out.add_optional(group);
                    }
                }
                Some(g) => {
                    let inner = if blocks.len() == 1 {
                        blocks.remove(0)
                    } else {
                        let mut inner = GroupPattern::new();
                        for group in blocks {
                            inner.add_optional(group);
                        }
                        inner
                    };
                    let mut wrapper = GroupPattern::new();
                    wrapper.add_graph(g, inner);
                    out.add_optional(wrapper);
                }
            }
        }

        out
    }
}

/// Projected element of a SELECT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Variable(Variable),
    /// `(COUNT(DISTINCT ?variable) AS ?alias)`
    CountDistinct { variable: Variable, alias: Variable },
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Variable(v) => write!(f, "{}", v),
            Projection::CountDistinct { variable, alias } => {
                write!(f, "(COUNT(DISTINCT {}) AS {})", variable, alias)
            }
        }
    }
}

/// SELECT query
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    distinct: bool,
    projection: Vec<Projection>,
    skeleton: QuerySkeleton,
    order_by: Vec<OrderCondition>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl SelectQuery {
    pub fn new(skeleton: QuerySkeleton) -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            skeleton,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn add_projection(&mut self, projection: Projection) {
        self.projection.push(projection);
    }

    pub fn projection(&self) -> &[Projection] {
        &self.projection
    }

    /// Names of the projected variables (aliases for aggregates)
    pub fn variables(&self) -> Vec<&str> {
        self.projection
            .iter()
            .map(|p| match p {
                Projection::Variable(v) => v.as_str(),
                Projection::CountDistinct { alias, .. } => alias.as_str(),
            })
            .collect()
    }

    pub fn skeleton(&self) -> &QuerySkeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut QuerySkeleton {
        &mut self.skeleton
    }

    /// Add a triple pattern outside any GRAPH scope
    pub fn add_where(&mut self, triple: TriplePattern) {
        self.skeleton.root_mut().add_triple(triple);
    }

    /// Add a triple pattern scoped to a named graph
    pub fn add_graph_where(&mut self, graph: &NamedNode, triple: TriplePattern) {
        let mut group = GroupPattern::new();
        group.add_triple(triple);
        self.skeleton.root_mut().add_graph(graph.clone(), group);
    }

    pub fn add_filter(&mut self, expression: super::algebra::Expression) {
        self.skeleton.root_mut().add_filter(expression);
    }

    pub fn add_values(&mut self, variable: Variable, values: Vec<RdfTerm>) {
        self.skeleton.root_mut().add_values(variable, values);
    }

    pub fn add_order_by(&mut self, condition: OrderCondition) {
        self.order_by.push(condition);
    }

    pub fn order_by(&self) -> &[OrderCondition] {
        &self.order_by
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT")?;
        if self.distinct {
            write!(f, " DISTINCT")?;
        }
        if self.projection.is_empty() {
            write!(f, " *")?;
        }
        for projection in &self.projection {
            write!(f, " {}", projection)?;
        }
        writeln!(f)?;
        writeln!(f, "WHERE {}", self.skeleton.to_group_pattern())?;
        if !self.order_by.is_empty() {
            write!(f, "ORDER BY")?;
            for condition in &self.order_by {
                write!(f, " {}", condition)?;
            }
            writeln!(f)?;
        }
        if let Some(offset) = self.offset {
            writeln!(f, "OFFSET {}", offset)?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "LIMIT {}", limit)?;
        }
        Ok(())
    }
}

/// ASK query
#[derive(Debug, Clone, PartialEq)]
pub struct AskQuery {
    skeleton: QuerySkeleton,
}

impl AskQuery {
    pub fn new(skeleton: QuerySkeleton) -> Self {
        Self { skeleton }
    }

    pub fn skeleton(&self) -> &QuerySkeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut QuerySkeleton {
        &mut self.skeleton
    }
}

impl fmt::Display for AskQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ASK WHERE {}", self.skeleton.to_group_pattern())
    }
}

/// CONSTRUCT query
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructQuery {
    template: Vec<TriplePattern>,
    pattern: GroupPattern,
}

impl ConstructQuery {
    pub fn new(template: Vec<TriplePattern>, pattern: GroupPattern) -> Self {
        Self { template, pattern }
    }
}

impl fmt::Display for ConstructQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CONSTRUCT {{")?;
        for triple in &self.template {
            writeln!(f, "  {}", triple)?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "WHERE {}", self.pattern)
    }
}

/// One operation of an update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOperation {
    DeleteData(Vec<Quad>),
    InsertData(Vec<Quad>),
    /// `CLEAR SILENT GRAPH <g>`, or `CLEAR ALL` when no graph is given
    Clear(Option<NamedNode>),
}

/// Update request made of ordered operations, executed atomically by the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateQuery {
    operations: Vec<UpdateOperation>,
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a quad for insertion, merging with a trailing INSERT DATA
    pub fn insert(&mut self, quad: Quad) {
        match self.operations.last_mut() {
            Some(UpdateOperation::InsertData(quads)) => quads.push(quad),
            _ => self.operations.push(UpdateOperation::InsertData(vec![quad])),
        }
    }

    /// Queue a quad for deletion, merging with a trailing DELETE DATA
    pub fn delete(&mut self, quad: Quad) {
        match self.operations.last_mut() {
            Some(UpdateOperation::DeleteData(quads)) => quads.push(quad),
            _ => self.operations.push(UpdateOperation::DeleteData(vec![quad])),
        }
    }

    pub fn clear(&mut self, graph: Option<NamedNode>) {
        self.operations.push(UpdateOperation::Clear(graph));
    }

    /// Append every operation of `other`
    pub fn append(&mut self, other: UpdateQuery) {
        for operation in other.operations {
            match operation {
                UpdateOperation::InsertData(quads) => quads.into_iter().for_each(|q| self.insert(q)),
                UpdateOperation::DeleteData(quads) => quads.into_iter().for_each(|q| self.delete(q)),
                clear => self.operations.push(clear),
            }
        }
    }

    pub fn operations(&self) -> &[UpdateOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.iter().all(|op| match op {
            UpdateOperation::InsertData(q) | UpdateOperation::DeleteData(q) => q.is_empty(),
            UpdateOperation::Clear(_) => false,
        })
    }

    pub fn inserted_quads(&self) -> impl Iterator<Item = &Quad> {
        self.operations.iter().flat_map(|op| match op {
            UpdateOperation::InsertData(quads) => quads.as_slice(),
            _ => &[][..],
        })
    }

    pub fn deleted_quads(&self) -> impl Iterator<Item = &Quad> {
        self.operations.iter().flat_map(|op| match op {
            UpdateOperation::DeleteData(quads) => quads.as_slice(),
            _ => &[][..],
        })
    }

    fn write_quads(f: &mut fmt::Formatter<'_>, keyword: &str, quads: &[Quad]) -> fmt::Result {
        let mut by_graph: IndexMap<Option<&NamedNode>, Vec<&Quad>> = IndexMap::new();
        for quad in quads {
            by_graph.entry(quad.graph.as_ref()).or_default().push(quad);
        }

        writeln!(f, "{} {{", keyword)?;
        for (graph, quads) in by_graph {
            match graph {
                Some(g) => {
                    writeln!(f, "  GRAPH {} {{", g)?;
                    for quad in quads {
                        writeln!(f, "    {}", quad.as_triple())?;
                    }
                    writeln!(f, "  }}")?;
                }
                None => {
                    for quad in quads {
                        writeln!(f, "  {}", quad.as_triple())?;
                    }
                }
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Display for UpdateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for operation in &self.operations {
            let rendered = match operation {
                UpdateOperation::InsertData(q) | UpdateOperation::DeleteData(q) if q.is_empty() => {
                    continue
                }
                _ => operation,
            };
            if !first {
                writeln!(f, " ;")?;
            }
            first = false;
            match rendered {
                UpdateOperation::InsertData(quads) => Self::write_quads(f, "INSERT DATA", quads)?,
                UpdateOperation::DeleteData(quads) => Self::write_quads(f, "DELETE DATA", quads)?,
                UpdateOperation::Clear(Some(graph)) => write!(f, "CLEAR SILENT GRAPH {}", graph)?,
                UpdateOperation::Clear(None) => write!(f, "CLEAR ALL")?,
            }
        }
        Ok(())
    }
}
