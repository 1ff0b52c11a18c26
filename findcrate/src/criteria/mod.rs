//! Criteria trees and their compilation into Sea-ORM conditions.
//!
//! - [`types`]: the typed tree ([`Criteria`], [`CriteriaNode`], [`Operator`])
//! - [`parse`]: the JSON wire format
//! - [`compiler`]: tree to [`sea_orm::Condition`], with bound [`Parameters`]
//! - [`search`]: free-text terms expanded into `LIKE` groups
//! - [`sort`] and [`pagination`]: the rest of a list request

pub mod compiler;
pub mod pagination;
pub mod parse;
pub mod search;
pub mod sort;
pub mod types;

pub use compiler::{CriteriaCompiler, Parameters, apply_criteria};
pub use search::{SearchTermSet, apply_search_terms};
pub use sort::{OrderBy, apply_order_by};
pub use types::{Arity, Combinator, Criteria, CriteriaNode, Criterion, CriterionValue, Operator};
