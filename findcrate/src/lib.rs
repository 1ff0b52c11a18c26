//! # findcrate
//!
//! Compile JSON criteria trees and free-text search into Sea-ORM queries.
//!
//! A criteria tree like `{"age": {"gte": 18}, "or": [{"tier": "gold"}, ["vip", "eq", true]]}`
//! becomes a parameterized condition on `Select<E>`, ready for counting,
//! paginated fetching or id-only fetching through [`CriteriaRepository`].
//!
//! ```rust,ignore
//! use findcrate::{CriteriaRepository, FilterOptions};
//!
//! let params: FilterOptions = /* axum Query extractor */;
//! let query = params.to_list_query(CustomerRepository::DEFAULT_SEARCH_COMBINATOR)?;
//! let (customers, total) = CustomerRepository::list(&db, &query).await?;
//! ```

pub mod core;
pub mod criteria;
pub mod errors;
pub mod models;

pub use crate::core::{CriteriaRepository, PrimaryKeyValue};
pub use criteria::{
    Combinator, Criteria, CriteriaCompiler, CriteriaNode, Criterion, CriterionValue, OrderBy,
    Operator, Parameters, SearchTermSet, apply_criteria, apply_order_by, apply_search_terms,
};
pub use errors::{ApiError, CriteriaError, RepositoryError};
pub use models::{FilterOptions, ListQuery};
