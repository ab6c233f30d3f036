//! SPARQL graph pattern algebra
//!
//! A small, typed subset of SPARQL 1.1 patterns: triple patterns (with the `*` path used for
//! class hierarchies), filters, OPTIONAL, GRAPH, UNION and VALUES blocks. Every node renders to
//! SPARQL text through `Display`; IRIs are always written in full so no PREFIX header is needed.

use crate::rdf::{Literal, NamedNode, RdfTerm};
use std::fmt;

/// SPARQL variable (rendered as `?name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Subject or object position of a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermPattern {
    Variable(Variable),
    NamedNode(NamedNode),
    Literal(Literal),
}

impl fmt::Display for TermPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermPattern::Variable(v) => write!(f, "{}", v),
            TermPattern::NamedNode(n) => write!(f, "{}", n),
            TermPattern::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<Variable> for TermPattern {
    fn from(v: Variable) -> Self {
        TermPattern::Variable(v)
    }
}

impl From<&Variable> for TermPattern {
    fn from(v: &Variable) -> Self {
        TermPattern::Variable(v.clone())
    }
}

impl From<NamedNode> for TermPattern {
    fn from(n: NamedNode) -> Self {
        TermPattern::NamedNode(n)
    }
}

impl From<&NamedNode> for TermPattern {
    fn from(n: &NamedNode) -> Self {
        TermPattern::NamedNode(n.clone())
    }
}

impl From<Literal> for TermPattern {
    fn from(l: Literal) -> Self {
        TermPattern::Literal(l)
    }
}

/// Predicate position: a plain IRI, its reflexive-transitive closure (`<p>*`) or a variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    Predicate(NamedNode),
    ZeroOrMore(NamedNode),
    Variable(Variable),
}

impl PropertyPath {
    pub fn predicate(&self) -> Option<&NamedNode> {
        match self {
            PropertyPath::Predicate(p) | PropertyPath::ZeroOrMore(p) => Some(p),
            PropertyPath::Variable(_) => None,
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Predicate(p) => write!(f, "{}", p),
            PropertyPath::ZeroOrMore(p) => write!(f, "{}*", p),
            PropertyPath::Variable(v) => write!(f, "{}", v),
        }
    }
}

impl From<NamedNode> for PropertyPath {
    fn from(n: NamedNode) -> Self {
        PropertyPath::Predicate(n)
    }
}

impl From<&NamedNode> for PropertyPath {
    fn from(n: &NamedNode) -> Self {
        PropertyPath::Predicate(n.clone())
    }
}

impl From<&Variable> for PropertyPath {
    fn from(v: &Variable) -> Self {
        PropertyPath::Variable(v.clone())
    }
}

/// Triple pattern (`s p o .`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: TermPattern,
    pub path: PropertyPath,
    pub object: TermPattern,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<TermPattern>,
        path: impl Into<PropertyPath>,
        object: impl Into<TermPattern>,
    ) -> Self {
        Self {
            subject: subject.into(),
            path: path.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.path, self.object)
    }
}

/// Built-in functions usable in filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Lang,
    LangMatches,
    IsBlank,
    IsIri,
    Str,
    LCase,
    Contains,
    StrStarts,
    Regex,
}

impl Function {
    fn name(&self) -> &'static str {
        match self {
            Function::Lang => "lang",
            Function::LangMatches => "langMatches",
            Function::IsBlank => "isBlank",
            Function::IsIri => "isIRI",
            Function::Str => "str",
            Function::LCase => "lcase",
            Function::Contains => "contains",
            Function::StrStarts => "strStarts",
            Function::Regex => "regex",
        }
    }
}

/// Filter expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Variable(Variable),
    NamedNode(NamedNode),
    Literal(Literal),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    LessOrEqual(Box<Expression>, Box<Expression>),
    GreaterOrEqual(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    In(Box<Expression>, Vec<Expression>),
    Bound(Variable),
    Call(Function, Vec<Expression>),
}

impl Expression {
    pub fn var(name: impl Into<String>) -> Self {
        Expression::Variable(Variable::new(name))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::new_simple_literal(value))
    }

    pub fn equal(self, other: Expression) -> Self {
        Expression::Equal(Box::new(self), Box::new(other))
    }

    pub fn not_equal(self, other: Expression) -> Self {
        Expression::NotEqual(Box::new(self), Box::new(other))
    }

    pub fn and(self, other: Expression) -> Self {
        Expression::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expression) -> Self {
        Expression::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Expression::Not(Box::new(self))
    }

    pub fn is_in(self, values: Vec<Expression>) -> Self {
        Expression::In(Box::new(self), values)
    }

    /// `lang(?v) = "tag"`
    pub fn lang_equals(variable: &Variable, tag: &str) -> Self {
        Expression::Call(Function::Lang, vec![Expression::Variable(variable.clone())])
            .equal(Expression::string(tag))
    }

    /// `isBlank(?v)`
    pub fn is_blank(variable: &Variable) -> Self {
        Expression::Call(Function::IsBlank, vec![Expression::Variable(variable.clone())])
    }

    /// `regex(str(?v), "pattern", "i")`, the usual case-insensitive search filter
    pub fn regex_ignore_case(variable: &Variable, pattern: &str) -> Self {
        Expression::Call(
            Function::Regex,
            vec![
                Expression::Call(Function::Str, vec![Expression::Variable(variable.clone())]),
                Expression::string(pattern),
                Expression::string("i"),
            ],
        )
    }

    fn is_binary(&self) -> bool {
        matches!(
            self,
            Expression::Equal(..)
                | Expression::NotEqual(..)
                | Expression::Less(..)
                | Expression::Greater(..)
                | Expression::LessOrEqual(..)
                | Expression::GreaterOrEqual(..)
                | Expression::And(..)
                | Expression::Or(..)
                | Expression::In(..)
        )
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_binary() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    fn fmt_binary(
        f: &mut fmt::Formatter<'_>,
        left: &Expression,
        op: &str,
        right: &Expression,
    ) -> fmt::Result {
        left.fmt_operand(f)?;
        write!(f, " {} ", op)?;
        right.fmt_operand(f)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::NamedNode(n) => write!(f, "{}", n),
            Expression::Literal(l) => write!(f, "{}", l),
            Expression::Equal(a, b) => Self::fmt_binary(f, a, "=", b),
            Expression::NotEqual(a, b) => Self::fmt_binary(f, a, "!=", b),
            Expression::Less(a, b) => Self::fmt_binary(f, a, "<", b),
            Expression::Greater(a, b) => Self::fmt_binary(f, a, ">", b),
            Expression::LessOrEqual(a, b) => Self::fmt_binary(f, a, "<=", b),
            Expression::GreaterOrEqual(a, b) => Self::fmt_binary(f, a, ">=", b),
            Expression::And(a, b) => Self::fmt_binary(f, a, "&&", b),
            Expression::Or(a, b) => Self::fmt_binary(f, a, "||", b),
            Expression::Not(inner) => {
                write!(f, "!")?;
                inner.fmt_operand(f)
            }
            Expression::In(expr, values) => {
                expr.fmt_operand(f)?;
                write!(f, " IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            Expression::Bound(v) => write!(f, "bound({})", v),
            Expression::Call(function, args) => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Variable> for Expression {
    fn from(v: Variable) -> Self {
        Expression::Variable(v)
    }
}

impl From<NamedNode> for Expression {
    fn from(n: NamedNode) -> Self {
        Expression::NamedNode(n)
    }
}

impl From<Literal> for Expression {
    fn from(l: Literal) -> Self {
        Expression::Literal(l)
    }
}

/// One element of a group graph pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupElement {
    Triple(TriplePattern),
    Filter(Expression),
    Optional(GroupPattern),
    Graph(NamedNode, GroupPattern),
    Union(Vec<GroupPattern>),
    Values(Variable, Vec<RdfTerm>),
    Group(GroupPattern),
}

/// Group graph pattern (`{ ... }`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPattern {
    elements: Vec<GroupElement>,
}

impl GroupPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: GroupElement) {
        self.elements.push(element);
    }

    pub fn add_triple(&mut self, triple: TriplePattern) {
        self.push(GroupElement::Triple(triple));
    }

    pub fn add_filter(&mut self, expression: Expression) {
        self.push(GroupElement::Filter(expression));
    }

    pub fn add_optional(&mut self, group: GroupPattern) {
        self.push(GroupElement::Optional(group));
    }

    pub fn add_graph(&mut self, graph: NamedNode, group: GroupPattern) {
        self.push(GroupElement::Graph(graph, group));
    }

    pub fn add_union(&mut self, branches: Vec<GroupPattern>) {
        self.push(GroupElement::Union(branches));
    }

    pub fn add_values(&mut self, variable: Variable, values: Vec<RdfTerm>) {
        self.push(GroupElement::Values(variable, values));
    }

    /// Append every element of `other` to this group
    pub fn extend(&mut self, other: GroupPattern) {
        self.elements.extend(other.elements);
    }

    pub fn elements(&self) -> &[GroupElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Triple patterns at any depth, in document order
    pub fn triples(&self) -> Vec<&TriplePattern> {
        let mut triples = Vec::new();
        self.collect_triples(&mut triples);
        triples
    }

    fn collect_triples<'a>(&'a self, out: &mut Vec<&'a TriplePattern>) {
        for element in &self.elements {
            match element {
                GroupElement::Triple(t) => out.push(t),
                GroupElement::Optional(g) | GroupElement::Graph(_, g) | GroupElement::Group(g) => {
                    g.collect_triples(out)
                }
                GroupElement::Union(branches) => {
                    for branch in branches {
                        branch.collect_triples(out);
                    }
                }
                GroupElement::Filter(_) | GroupElement::Values(..) => {}
            }
        }
    }

    /// Number of OPTIONAL blocks at any depth
    pub fn optional_count(&self) -> usize {
        self.elements
            .iter()
            .map(|element| match element {
                GroupElement::Optional(g) => 1 + g.optional_count(),
                GroupElement::Graph(_, g) | GroupElement::Group(g) => g.optional_count(),
                GroupElement::Union(branches) => branches.iter().map(|b| b.optional_count()).sum(),
                _ => 0,
            })
            .sum()
    }

    pub(crate) fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        for element in &self.elements {
            match element {
                GroupElement::Triple(t) => writeln!(f, "{}{}", indent, t)?,
                GroupElement::Filter(e) => writeln!(f, "{}FILTER({})", indent, e)?,
                GroupElement::Optional(g) => {
                    writeln!(f, "{}OPTIONAL {{", indent)?;
                    g.write_indented(f, depth + 1)?;
                    writeln!(f, "{}}}", indent)?;
                }
                GroupElement::Graph(graph, g) => {
                    writeln!(f, "{}GRAPH {} {{", indent, graph)?;
                    g.write_indented(f, depth + 1)?;
                    writeln!(f, "{}}}", indent)?;
                }
                GroupElement::Group(g) => {
                    writeln!(f, "{}{{", indent)?;
                    g.write_indented(f, depth + 1)?;
                    writeln!(f, "{}}}", indent)?;
                }
                GroupElement::Union(branches) => {
                    for (i, branch) in branches.iter().enumerate() {
                        if i > 0 {
                            writeln!(f, "{}UNION", indent)?;
                        }
                        writeln!(f, "{}{{", indent)?;
                        branch.write_indented(f, depth + 1)?;
                        writeln!(f, "{}}}", indent)?;
                    }
                }
                GroupElement::Values(variable, values) => {
                    write!(f, "{}VALUES {} {{", indent, variable)?;
                    for value in values {
                        write!(f, " {}", value)?;
                    }
                    writeln!(f, " }}")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for GroupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        self.write_indented(f, 1)?;
        write!(f, "}}")
    }
}

/// Sort direction of an ORDER BY condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY condition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderCondition {
    pub expression: Expression,
    pub direction: OrderDirection,
}

impl fmt::Display for OrderCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            OrderDirection::Asc => write!(f, "ASC({})", self.expression),
            OrderDirection::Desc => write!(f, "DESC({})", self.expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn test_triple_pattern_rendering() {
        let t = TriplePattern::new(
            Variable::new("rdfType"),
            PropertyPath::ZeroOrMore(iri("http://www.w3.org/2000/01/rdf-schema#subClassOf")),
            iri("http://example.org/Unit"),
        );
        assert_eq!(
            t.to_string(),
            "?rdfType <http://www.w3.org/2000/01/rdf-schema#subClassOf>* <http://example.org/Unit> ."
        );
    }

    #[test]
    fn test_filter_expressions() {
        let symbol = Variable::new("symbol");
        assert_eq!(
            Expression::lang_equals(&symbol, "en").to_string(),
            "lang(?symbol) = \"en\""
        );
        assert_eq!(
            Expression::is_blank(&Variable::new("uri")).negate().to_string(),
            "!isBlank(?uri)"
        );
        let nested = Expression::var("a")
            .equal(Expression::string("x"))
            .or(Expression::var("b").not_equal(Expression::string("y")))
            .negate();
        assert_eq!(nested.to_string(), "!((?a = \"x\") || (?b != \"y\"))");
    }

    #[test]
    fn test_group_rendering_and_counting() {
        let mut optional = GroupPattern::new();
        optional.add_triple(TriplePattern::new(
            Variable::new("uri"),
            iri("http://example.org/alt"),
            Variable::new("alt"),
        ));

        let mut graph = GroupPattern::new();
        graph.add_triple(TriplePattern::new(
            Variable::new("uri"),
            iri("http://example.org/symbol"),
            Variable::new("symbol"),
        ));
        graph.add_optional(optional);

        let mut root = GroupPattern::new();
        root.add_graph(iri("http://example.org/g"), graph);
        root.add_values(
            Variable::new("uri"),
            vec![RdfTerm::NamedNode(iri("http://example.org/kg"))],
        );

        assert_eq!(root.optional_count(), 1);
        assert_eq!(root.triples().len(), 2);

        let text = root.to_string();
        assert!(text.contains("GRAPH <http://example.org/g> {"));
        assert!(text.contains("OPTIONAL {"));
        assert!(text.contains("VALUES ?uri { <http://example.org/kg> }"));
    }
}
