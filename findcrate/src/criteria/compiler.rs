use sea_orm::{
    Condition, DatabaseBackend, QueryFilter, Value,
    sea_query::{
        Alias, BinOper, Expr, LikeExpr, MysqlQueryBuilder, PostgresQueryBuilder, QueryBuilder,
        SimpleExpr, SqliteQueryBuilder,
    },
};

use super::types::{Combinator, Criteria, CriteriaNode, Criterion, CriterionValue, Operator};
use crate::errors::CriteriaError;

/// Values bound while compiling one query, in placeholder order.
///
/// One instance belongs to one query build: the outer call creates it, the
/// recursive descent borrows it mutably, and it is dropped with the query.
/// Index `n` (1-based) is the `n`th placeholder sea-query renders (`$n` on
/// Postgres, the `n`th `?` elsewhere).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parameters {
    values: Vec<Value>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bound value and return its placeholder index.
    pub fn bind(&mut self, value: &Value) -> usize {
        self.values.push(value.clone());
        self.values.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Turns criteria trees into sea-query conditions for one entity alias.
#[derive(Debug, Clone)]
pub struct CriteriaCompiler {
    alias: String,
    backend: DatabaseBackend,
}

impl CriteriaCompiler {
    /// `alias` qualifies bare field names; `backend` decides literal escaping.
    pub fn new(alias: impl Into<String>, backend: DatabaseBackend) -> Self {
        Self {
            alias: alias.into(),
            backend,
        }
    }

    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[must_use]
    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// Split a field reference into `(qualifier, column)`.
    ///
    /// Purely textual: anything before the first `.` is the qualifier,
    /// otherwise the default alias is used.
    #[must_use]
    pub fn qualify<'a>(&'a self, field: &'a str) -> (&'a str, &'a str) {
        field
            .split_once('.')
            .unwrap_or((self.alias.as_str(), field))
    }

    /// Column expression for a bare or qualified field name.
    #[must_use]
    pub fn column(&self, field: &str) -> Expr {
        let (qualifier, column) = self.qualify(field);
        Expr::col((Alias::new(qualifier), Alias::new(column)))
    }

    /// Render a value as an inline SQL literal using the backend's escaping.
    ///
    /// UUIDs are written the way the driver binds them: a text literal on
    /// Postgres, a 16-byte blob (`X'..'`) on MySQL and SQLite.
    #[must_use]
    pub fn literal(&self, value: &Value) -> String {
        match (self.backend, value) {
            (DatabaseBackend::MySql | DatabaseBackend::Sqlite, Value::Uuid(Some(uuid))) => {
                format!("X'{}'", uuid.simple())
            }
            (DatabaseBackend::Postgres, _) => PostgresQueryBuilder.value_to_string(value),
            (DatabaseBackend::MySql, _) => MysqlQueryBuilder.value_to_string(value),
            (DatabaseBackend::Sqlite, _) => SqliteQueryBuilder.value_to_string(value),
        }
    }

    /// Compile `nodes` under `combinator`.
    ///
    /// Every bound scalar is recorded in `parameters`, in the order sea-query
    /// will render the placeholders. Empty groups are left out, so an empty
    /// tree yields an empty condition.
    ///
    /// # Errors
    ///
    /// The first [`CriteriaError`] found; nothing is coerced or skipped.
    pub fn compile(
        &self,
        parameters: &mut Parameters,
        combinator: Combinator,
        nodes: &[CriteriaNode],
    ) -> Result<Condition, CriteriaError> {
        let mut condition = match combinator {
            Combinator::And => Condition::all(),
            Combinator::Or => Condition::any(),
        };

        for node in nodes {
            match node {
                CriteriaNode::Group {
                    combinator,
                    children,
                } => {
                    let nested = self.compile(parameters, *combinator, children)?;
                    if !nested.is_empty() {
                        condition = condition.add(nested);
                    }
                }
                CriteriaNode::Leaf(criterion) => {
                    condition = condition.add(self.compile_leaf(parameters, criterion)?);
                }
            }
        }

        Ok(condition)
    }

    fn compile_leaf(
        &self,
        parameters: &mut Parameters,
        criterion: &Criterion,
    ) -> Result<SimpleExpr, CriteriaError> {
        criterion.validate()?;
        let column = self.column(&criterion.field);

        let expr = match criterion.operator {
            Operator::Eq => column.eq(bind_scalar(parameters, criterion)),
            Operator::Neq => column.ne(bind_scalar(parameters, criterion)),
            Operator::Lt => column.lt(bind_scalar(parameters, criterion)),
            Operator::Lte => column.lte(bind_scalar(parameters, criterion)),
            Operator::Gt => column.gt(bind_scalar(parameters, criterion)),
            Operator::Gte => column.gte(bind_scalar(parameters, criterion)),
            Operator::Like | Operator::NotLike => {
                like(column, criterion.operator, bind_scalar(parameters, criterion))
            }
            Operator::Between => {
                let (low, high) = bind_pair(parameters, criterion);
                column.between(low, high)
            }
            Operator::In => column.is_in(self.literals(criterion)),
            Operator::NotIn => column.is_not_in(self.literals(criterion)),
            Operator::IsNull => column.is_null(),
            Operator::IsNotNull => column.is_not_null(),
        };

        Ok(expr)
    }

    // TODO: bind IN lists as a single array parameter on Postgres once callers
    // no longer depend on literal inlining.
    fn literals(&self, criterion: &Criterion) -> Vec<SimpleExpr> {
        match &criterion.value {
            CriterionValue::List(values) => values
                .iter()
                .map(|value| SimpleExpr::Custom(self.literal(value)))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Escape character for `like` / `notLike` patterns, on every backend.
pub const LIKE_ESCAPE: char = '\\';

// String patterns carry `ESCAPE '\'`, so `\%` and `\_` match literally
// on SQLite too, as they do by default on Postgres and MySQL.
fn like(column: Expr, operator: Operator, pattern: Value) -> SimpleExpr {
    match (operator, pattern) {
        (Operator::NotLike, Value::String(Some(pattern))) => {
            column.not_like(LikeExpr::new(*pattern).escape(LIKE_ESCAPE))
        }
        (_, Value::String(Some(pattern))) => column.like(LikeExpr::new(*pattern).escape(LIKE_ESCAPE)),
        (Operator::NotLike, other) => column.binary(BinOper::NotLike, other),
        (_, other) => column.binary(BinOper::Like, other),
    }
}

// Shapes are checked by `Criterion::validate` before these run.
fn bind_scalar(parameters: &mut Parameters, criterion: &Criterion) -> Value {
    match &criterion.value {
        CriterionValue::Scalar(value) => {
            parameters.bind(value);
            value.clone()
        }
        _ => unreachable!("validated scalar criterion"),
    }
}

fn bind_pair(parameters: &mut Parameters, criterion: &Criterion) -> (Value, Value) {
    match &criterion.value {
        CriterionValue::Pair(low, high) => {
            parameters.bind(low);
            parameters.bind(high);
            (low.clone(), high.clone())
        }
        _ => unreachable!("validated pair criterion"),
    }
}

/// Compile `criteria` (AND at the root) and attach it to `query`.
///
/// An empty tree leaves the query untouched.
///
/// # Errors
///
/// Any [`CriteriaError`] from the compiler; `query` is consumed either way.
pub fn apply_criteria<Q>(
    query: Q,
    compiler: &CriteriaCompiler,
    parameters: &mut Parameters,
    criteria: &Criteria,
) -> Result<Q, CriteriaError>
where
    Q: QueryFilter,
{
    let bound_before = parameters.len();
    let condition = compiler.compile(parameters, Combinator::And, &criteria.nodes)?;
    tracing::debug!(
        alias = compiler.alias(),
        leaves = criteria.leaf_count(),
        bound = parameters.len() - bound_before,
        "compiled criteria"
    );

    if condition.is_empty() {
        return Ok(query);
    }
    Ok(query.filter(condition))
}
