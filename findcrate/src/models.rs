use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::criteria::{
    Combinator, Criteria, OrderBy, SearchTermSet,
    pagination::parse_pagination,
};
use crate::errors::CriteriaError;

/// Query parameters for filtering, searching, sorting and paginating a list.
///
/// # Filtering
/// `filter` is a JSON criteria document:
/// - equality: `{"name": "example"}`
/// - lists: `{"id": [1, 2, 3]}`
/// - operators: `{"age": {"between": [18, 65]}, "deleted_at": null}`
/// - groups: `{"or": [["priority", "gte", 3], {"owner": "me"}]}`
///
/// # Searching
/// `q` is split on whitespace; every term is matched with `LIKE '%term%'`
/// against the resource's search columns. `search_mode` (`and` / `or`) joins
/// the term matches.
///
/// # Pagination
/// - **React Admin format:** `range=[0,9]`
/// - **Standard REST format:** `page=1&per_page=10`
///
/// # Sorting
/// `sort=["id","ASC"]`, `sort={"name":"DESC"}`, or `sort_by=name&order=DESC`.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct FilterOptions {
    /// JSON-encoded criteria.
    #[param(example = json!({"name": "example", "age": {"gte": 18}}))]
    pub filter: Option<String>,
    /// Free-text search terms.
    #[param(example = "alice smith")]
    pub q: Option<String>,
    /// How search terms combine: `and` or `or`.
    #[param(example = "or")]
    pub search_mode: Option<String>,
    /// Range for pagination in the format "[start, end]".
    #[param(example = "[0,9]")]
    pub range: Option<String>,
    /// Page number for standard REST pagination (1-based).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Number of items per page for standard REST pagination.
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// Sort as `["column", "order"]` or `{"column": "order"}`.
    #[param(example = r#"["id", "ASC"]"#)]
    pub sort: Option<String>,
    /// Sort column for standard REST format.
    #[param(example = "name")]
    pub sort_by: Option<String>,
    /// Sort order for standard REST format (ASC or DESC).
    #[param(example = "ASC")]
    pub order: Option<String>,
}

/// A decoded list request, ready for
/// [`CriteriaRepository::list`](crate::CriteriaRepository::list).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListQuery {
    pub criteria: Criteria,
    pub search: Vec<SearchTermSet>,
    pub order_by: OrderBy,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FilterOptions {
    /// Decode into a [`ListQuery`]. `default_combinator` is used when
    /// `search_mode` is absent.
    ///
    /// # Errors
    ///
    /// [`CriteriaError`] for invalid `filter`, `sort` or `search_mode` values.
    /// Nothing is silently dropped.
    pub fn to_list_query(&self, default_combinator: Combinator) -> Result<ListQuery, CriteriaError> {
        let criteria = match self.filter.as_deref().map(str::trim) {
            Some(filter) if !filter.is_empty() => Criteria::from_json_str(filter)?,
            _ => Criteria::default(),
        };

        let combinator = match self.search_mode.as_deref() {
            None => default_combinator,
            Some(mode) => Combinator::from_key(&mode.to_ascii_lowercase()).ok_or_else(|| {
                CriteriaError::malformed("search_mode", format!("expected 'and' or 'or', got '{mode}'"))
            })?,
        };
        let search = self
            .q
            .as_deref()
            .map(|q| SearchTermSet::parse(q, combinator))
            .filter(|set| !set.terms.is_empty())
            .into_iter()
            .collect();

        let order_by = if let Some(sort_by) = &self.sort_by {
            OrderBy::from_column(sort_by, self.order.as_deref())
        } else if let Some(sort) = &self.sort {
            if sort.starts_with('[') || sort.starts_with('{') {
                OrderBy::parse(sort)?
            } else {
                OrderBy::from_column(sort, self.order.as_deref())
            }
        } else {
            OrderBy::default()
        };

        let (offset, limit) = parse_pagination(self.page, self.per_page, self.range.as_deref());

        Ok(ListQuery {
            criteria,
            search,
            order_by,
            limit: Some(limit),
            offset: Some(offset),
        })
    }
}
