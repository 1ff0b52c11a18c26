use sea_orm::{Order, QueryOrder, sea_query::SimpleExpr};
use serde_json::Value as Json;

use super::compiler::CriteriaCompiler;
use crate::errors::CriteriaError;

// Shared default values
const DEFAULT_SORT_ORDER: &str = "ASC";

/// Convert sort order string to Order enum
fn parse_order(sort_order: &str) -> Order {
    if sort_order.eq_ignore_ascii_case("ASC") {
        Order::Asc
    } else {
        Order::Desc
    }
}

/// Ordered `(field, direction)` pairs. Fields follow the same bare/qualified
/// rules as criteria fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderBy {
    pub entries: Vec<(String, Order)>,
}

impl OrderBy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, field: impl Into<String>, order: Order) -> Self {
        self.entries.push((field.into(), order));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a sort parameter.
    ///
    /// - `["name", "DESC"]` (React Admin; order defaults to ASC)
    /// - `{"name": "DESC", "id": "ASC"}`
    /// - `name` (a bare column, ascending)
    ///
    /// Any order other than a case-insensitive `ASC` sorts descending.
    ///
    /// # Errors
    ///
    /// [`CriteriaError::MalformedCriterion`] when the JSON is neither shape.
    pub fn parse(sort: &str) -> Result<Self, CriteriaError> {
        let sort = sort.trim();
        if sort.is_empty() {
            return Ok(Self::default());
        }
        if !sort.starts_with('[') && !sort.starts_with('{') {
            return Ok(Self::new().then(sort, Order::Asc));
        }

        let json: Json = serde_json::from_str(sort)
            .map_err(|e| CriteriaError::malformed("sort", format!("invalid JSON: {e}")))?;
        match json {
            Json::Array(parts) => match parts.as_slice() {
                [] => Ok(Self::default()),
                [Json::String(field)] => Ok(Self::new().then(field, parse_order(DEFAULT_SORT_ORDER))),
                [Json::String(field), Json::String(order)] => {
                    Ok(Self::new().then(field, parse_order(order)))
                }
                _ => Err(CriteriaError::malformed("sort", "expected [column, order]")),
            },
            Json::Object(map) => map
                .into_iter()
                .try_fold(Self::new(), |order_by, (field, order)| match order {
                    Json::String(order) => Ok(order_by.then(field, parse_order(&order))),
                    _ => Err(CriteriaError::malformed(
                        format!("sort.{field}"),
                        "order must be a string",
                    )),
                }),
            _ => Err(CriteriaError::malformed("sort", "expected an array or an object")),
        }
    }

    /// `sort_by=column&order=DESC` (standard REST).
    #[must_use]
    pub fn from_column(column: &str, order: Option<&str>) -> Self {
        Self::new().then(column, parse_order(order.unwrap_or(DEFAULT_SORT_ORDER)))
    }
}

/// Add each entry of `order_by` to `query`, in order.
pub fn apply_order_by<Q>(mut query: Q, compiler: &CriteriaCompiler, order_by: &OrderBy) -> Q
where
    Q: QueryOrder,
{
    for (field, order) in &order_by.entries {
        let column: SimpleExpr = compiler.column(field).into();
        query = query.order_by(column, order.clone());
    }
    query
}
