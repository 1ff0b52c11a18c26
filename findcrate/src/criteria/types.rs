//! Typed criteria tree.
//!
//! The JSON wire format overloads object keys: `"and"`/`"or"` are combinator
//! markers, everything else is a field name. Once parsed, a tree is made of
//! [`CriteriaNode::Leaf`] and [`CriteriaNode::Group`] only, so the compiler
//! never has to look at key names again.

use sea_orm::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::CriteriaError;

/// How the children of a group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Parse a reserved key. Only the exact lowercase words are combinators.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators for criteria leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (=)
    Eq,
    /// Not equal (<>)
    Neq,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// IN (inlined literals)
    In,
    /// NOT IN (inlined literals)
    NotIn,
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// LIKE pattern matching
    Like,
    /// NOT LIKE pattern matching
    NotLike,
    /// BETWEEN low AND high
    Between,
}

/// What kind of value an operator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one bound scalar
    Scalar,
    /// A non-empty list, inlined as literals
    List,
    /// Two bound scalars
    Pair,
    /// No value at all
    Nullary,
}

impl Operator {
    pub const ALL: [Self; 13] = [
        Self::Eq,
        Self::Neq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::In,
        Self::NotIn,
        Self::IsNull,
        Self::IsNotNull,
        Self::Like,
        Self::NotLike,
        Self::Between,
    ];

    /// The name used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
            Self::Like => "like",
            Self::NotLike => "notLike",
            Self::Between => "between",
        }
    }

    #[must_use]
    pub fn arity(self) -> Arity {
        match self {
            Self::Eq
            | Self::Neq
            | Self::Lt
            | Self::Lte
            | Self::Gt
            | Self::Gte
            | Self::Like
            | Self::NotLike => Arity::Scalar,
            Self::In | Self::NotIn => Arity::List,
            Self::Between => Arity::Pair,
            Self::IsNull | Self::IsNotNull => Arity::Nullary,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the wire name. The error carries no field; callers that know the
/// field use [`Operator::parse_for`].
impl FromStr for Operator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CriteriaError::unsupported("", s))
    }
}

impl Operator {
    /// Parse an operator name used on `field`.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::UnsupportedOperator`] for unknown names.
    pub fn parse_for(field: &str, name: &str) -> Result<Self, CriteriaError> {
        name.parse()
            .map_err(|_| CriteriaError::unsupported(field, name))
    }
}

/// The value side of a criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum CriterionValue {
    Scalar(Value),
    List(Vec<Value>),
    Pair(Value, Value),
    /// Placeholder for `isNull` / `isNotNull`
    None,
}

/// A single `(field, operator, value)` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: String,
    pub operator: Operator,
    pub value: CriterionValue,
}

impl Criterion {
    pub fn new(field: impl Into<String>, operator: Operator, value: CriterionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Check that the value shape matches what the operator needs.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::InvalidOperatorArity`] for `between`, `in` and
    /// `notIn`, and [`CriteriaError::MalformedCriterion`] for the rest.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let op = self.operator.as_str();
        match (self.operator.arity(), &self.value) {
            (Arity::Scalar, CriterionValue::Scalar(_))
            | (Arity::Pair, CriterionValue::Pair(_, _))
            | (Arity::Nullary, _) => Ok(()),
            (Arity::List, CriterionValue::List(values)) if !values.is_empty() => Ok(()),
            (Arity::List, CriterionValue::List(_)) => {
                Err(CriteriaError::arity(&self.field, op, "expected a non-empty list"))
            }
            (Arity::List, _) => Err(CriteriaError::arity(&self.field, op, "expected a list")),
            (Arity::Pair, _) => Err(CriteriaError::arity(
                &self.field,
                op,
                "expected exactly 2 values",
            )),
            (Arity::Scalar, _) => Err(CriteriaError::malformed(
                &self.field,
                format!("'{op}' expects a single value"),
            )),
        }
    }
}

/// One node of a criteria tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaNode {
    Leaf(Criterion),
    Group {
        combinator: Combinator,
        children: Vec<CriteriaNode>,
    },
}

impl CriteriaNode {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: CriterionValue) -> Self {
        Self::Leaf(Criterion::new(field, operator, value))
    }

    #[must_use]
    pub fn group(combinator: Combinator, children: Vec<CriteriaNode>) -> Self {
        Self::Group {
            combinator,
            children,
        }
    }

    /// Number of leaves under this node.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }
}

/// The root of a criteria tree: an ordered list of nodes, joined by the
/// combinator the caller compiles it with (usually AND).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    pub nodes: Vec<CriteriaNode>,
}

impl Criteria {
    #[must_use]
    pub fn new(nodes: Vec<CriteriaNode>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().map(CriteriaNode::leaf_count).sum()
    }

    /// Append a leaf, builder style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, operator: Operator, value: CriterionValue) -> Self {
        self.nodes.push(CriteriaNode::leaf(field, operator, value));
        self
    }

    /// Append a group, builder style.
    #[must_use]
    pub fn with_group(mut self, combinator: Combinator, children: Vec<CriteriaNode>) -> Self {
        self.nodes.push(CriteriaNode::group(combinator, children));
        self
    }
}

impl From<Vec<CriteriaNode>> for Criteria {
    fn from(nodes: Vec<CriteriaNode>) -> Self {
        Self::new(nodes)
    }
}
