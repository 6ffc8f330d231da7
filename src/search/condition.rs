// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Condition tree - the `where` input of every search query
//!
//! A tree is built once, either directly through the constructors below or by
//! decoding untyped JSON with [`ConditionNode::from_json`], and is then handed
//! to the [`ConditionCompiler`](super::ConditionCompiler).
//!
//! # Example
//!
//! ```rust
//! use redis_repository::search::{Condition, ConditionBuilder, ConditionNode};
//!
//! // Single predicate
//! let adult = Condition::gte("age", 18);
//!
//! // Boolean combinations
//! let node = ConditionNode::from(adult).and(Condition::lt("age", 65));
//!
//! // Lazy builder, resolved when the query is compiled
//! let builder = ConditionBuilder::new()
//!     .eq("status", "active")
//!     .is_in("role", ["admin", "owner"]);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::QueryError;

/// A single comparable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            // Plain decimal, never exponent form: 18.0 is "18", 1e21 is 22 digits
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

impl Scalar {
    fn from_json(value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => n.as_f64().map(Scalar::Float).ok_or_else(|| {
                    QueryError::InvalidConditionFormat(format!("unrepresentable number {}", n))
                }),
            },
            other => Err(QueryError::InvalidConditionFormat(format!(
                "expected a scalar value, got {}",
                other
            ))),
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl ConditionValue {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        ConditionValue::Scalar(value.into())
    }

    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        ConditionValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Comparison operator of a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `@field:{value}`
    Eq,
    /// `-@field:{value}`
    Ne,
    /// `@field:[(value +inf]`
    Gt,
    /// `@field:[-inf (value)]`
    Lt,
    /// `@field:[value +inf]`
    Gte,
    /// `@field:[-inf value]`
    Lte,
    /// `@field:{a} | @field:{b}`
    In,
    /// `-@field:{a} -@field:{b}`
    Nin,
    /// `@field:/.*value.*/`
    Like,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::In,
        Operator::Nin,
        Operator::Like,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::Like => "like",
        }
    }

    /// Set operators take a list value, everything else a scalar.
    pub fn takes_list(&self) -> bool {
        matches!(self, Operator::In | Operator::Nin)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::UnsupportedOperator(s.to_string()))
    }
}

/// Leaf predicate: field / operator / value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: ConditionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Eq, ConditionValue::scalar(value))
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Ne, ConditionValue::scalar(value))
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Gt, ConditionValue::scalar(value))
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Lt, ConditionValue::scalar(value))
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Gte, ConditionValue::scalar(value))
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Lte, ConditionValue::scalar(value))
    }

    pub fn is_in<I, T>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::new(field, Operator::In, ConditionValue::list(values))
    }

    pub fn not_in<I, T>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::new(field, Operator::Nin, ConditionValue::list(values))
    }

    /// Unanchored substring match
    pub fn like(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, Operator::Like, ConditionValue::scalar(value))
    }
}

/// Boolean join of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// Query keyword, always upper-case.
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl FromStr for Combinator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Combinator::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Combinator::Or)
        } else {
            Err(QueryError::InvalidConditionFormat(format!(
                "unknown combinator '{}'",
                s
            )))
        }
    }
}

/// Boolean combination of condition nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub operands: Vec<ConditionNode>,
    pub combinator: Combinator,
}

impl ConditionGroup {
    pub fn new(combinator: Combinator, operands: Vec<ConditionNode>) -> Self {
        Self {
            operands,
            combinator,
        }
    }
}

/// Condition tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "Value")]
pub enum ConditionNode {
    Condition(Condition),
    Group(ConditionGroup),
}

impl From<Condition> for ConditionNode {
    fn from(condition: Condition) -> Self {
        ConditionNode::Condition(condition)
    }
}

impl From<ConditionGroup> for ConditionNode {
    fn from(group: ConditionGroup) -> Self {
        ConditionNode::Group(group)
    }
}

impl TryFrom<Value> for ConditionNode {
    type Error = QueryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl ConditionNode {
    /// Combine with AND
    pub fn and(self, other: impl Into<ConditionNode>) -> Self {
        ConditionNode::Group(ConditionGroup::new(Combinator::And, vec![self, other.into()]))
    }

    /// Combine with OR
    pub fn or(self, other: impl Into<ConditionNode>) -> Self {
        ConditionNode::Group(ConditionGroup::new(Combinator::Or, vec![self, other.into()]))
    }

    /// AND group over any number of operands (possibly none)
    pub fn all<I, N>(operands: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ConditionNode>,
    {
        ConditionNode::Group(ConditionGroup::new(
            Combinator::And,
            operands.into_iter().map(Into::into).collect(),
        ))
    }

    /// OR group over any number of operands (possibly none)
    pub fn any<I, N>(operands: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<ConditionNode>,
    {
        ConditionNode::Group(ConditionGroup::new(
            Combinator::Or,
            operands.into_iter().map(Into::into).collect(),
        ))
    }

    /// Decode an untyped tree.
    ///
    /// Shapes are recognized in this order:
    /// - `{ "result": <node> }` - already-resolved wrapper, unwrapped
    /// - `{ "field", "operator", "value" }` - leaf condition
    /// - `{ "operands", "combinator" }` - group
    ///
    /// Anything else is [`QueryError::InvalidConditionFormat`]; an operator
    /// name outside [`Operator::ALL`] is [`QueryError::UnsupportedOperator`].
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        let obj = value.as_object().ok_or_else(|| {
            QueryError::InvalidConditionFormat(format!("expected an object, got {}", value))
        })?;

        if let Some(inner) = obj.get("result") {
            return Self::from_json(inner);
        }

        if let (Some(field), Some(operator), Some(value)) =
            (obj.get("field"), obj.get("operator"), obj.get("value"))
        {
            return Self::condition_from_json(field, operator, value).map(ConditionNode::Condition);
        }

        if obj.contains_key("operands") && obj.contains_key("combinator") {
            return Self::group_from_json(obj).map(ConditionNode::Group);
        }

        Err(QueryError::InvalidConditionFormat(format!(
            "unrecognized node shape {}",
            value
        )))
    }

    fn condition_from_json(
        field: &Value,
        operator: &Value,
        value: &Value,
    ) -> Result<Condition, QueryError> {
        let field = field
            .as_str()
            .ok_or_else(|| QueryError::InvalidConditionFormat("field must be a string".into()))?;
        let operator = match operator {
            Value::String(name) => name.parse::<Operator>()?,
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        };
        let value = match value {
            Value::Array(items) => ConditionValue::List(
                items.iter().map(Scalar::from_json).collect::<Result<_, _>>()?,
            ),
            other => ConditionValue::Scalar(Scalar::from_json(other)?),
        };

        Ok(Condition::new(field, operator, value))
    }

    fn group_from_json(obj: &Map<String, Value>) -> Result<ConditionGroup, QueryError> {
        let combinator = obj
            .get("combinator")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                QueryError::InvalidConditionFormat("combinator must be a string".into())
            })?
            .parse::<Combinator>()?;
        let operands = obj
            .get("operands")
            .and_then(Value::as_array)
            .ok_or_else(|| QueryError::InvalidConditionFormat("operands must be an array".into()))?
            .iter()
            .map(Self::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConditionGroup::new(combinator, operands))
    }
}

/// Something that produces a condition tree on demand.
pub trait BuildCondition: Send + Sync {
    fn build(&self) -> ConditionNode;
}

/// Input accepted wherever a `where` clause is expected.
///
/// Use [`WhereClause::resolve`] to normalize any variant down to a plain
/// [`ConditionNode`] before looking at its shape.
#[derive(Clone)]
pub enum WhereClause {
    /// A ready tree
    Node(ConditionNode),
    /// A lazy builder, invoked on resolve
    Builder(Arc<dyn BuildCondition>),
    /// An upstream wrapper around an already-resolved clause
    Resolved(Box<WhereClause>),
}

impl WhereClause {
    pub fn builder(builder: impl BuildCondition + 'static) -> Self {
        WhereClause::Builder(Arc::new(builder))
    }

    pub fn resolved(result: impl Into<WhereClause>) -> Self {
        WhereClause::Resolved(Box::new(result.into()))
    }

    /// Unwrap builders and resolved wrappers down to the tree itself.
    pub fn resolve(&self) -> Cow<'_, ConditionNode> {
        match self {
            WhereClause::Node(node) => Cow::Borrowed(node),
            WhereClause::Builder(builder) => Cow::Owned(builder.build()),
            WhereClause::Resolved(inner) => inner.resolve(),
        }
    }
}

impl fmt::Debug for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereClause::Node(node) => f.debug_tuple("Node").field(node).finish(),
            WhereClause::Builder(_) => f.write_str("Builder(..)"),
            WhereClause::Resolved(inner) => f.debug_tuple("Resolved").field(inner).finish(),
        }
    }
}

impl From<ConditionNode> for WhereClause {
    fn from(node: ConditionNode) -> Self {
        WhereClause::Node(node)
    }
}

impl From<Condition> for WhereClause {
    fn from(condition: Condition) -> Self {
        WhereClause::Node(condition.into())
    }
}

impl From<ConditionGroup> for WhereClause {
    fn from(group: ConditionGroup) -> Self {
        WhereClause::Node(group.into())
    }
}

impl From<ConditionBuilder> for WhereClause {
    fn from(builder: ConditionBuilder) -> Self {
        WhereClause::builder(builder)
    }
}

/// Accumulates conditions and combines them when built.
#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    nodes: Vec<ConditionNode>,
    combinator: Combinator,
}

impl Default for ConditionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionBuilder {
    /// New builder joining its conditions with AND
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            combinator: Combinator::And,
        }
    }

    /// Join conditions with OR instead
    pub fn any(mut self) -> Self {
        self.combinator = Combinator::Or;
        self
    }

    pub fn push(mut self, node: impl Into<ConditionNode>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::eq(field, value))
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::ne(field, value))
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::gt(field, value))
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::lt(field, value))
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::gte(field, value))
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::lte(field, value))
    }

    pub fn is_in<I, T>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.push(Condition::is_in(field, values))
    }

    pub fn not_in<I, T>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.push(Condition::not_in(field, values))
    }

    pub fn like(self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push(Condition::like(field, value))
    }
}

impl BuildCondition for ConditionBuilder {
    /// A single condition is returned as-is; anything else becomes a group.
    fn build(&self) -> ConditionNode {
        match self.nodes.as_slice() {
            [single] => single.clone(),
            nodes => ConditionNode::Group(ConditionGroup::new(self.combinator, nodes.to_vec())),
        }
    }
}
