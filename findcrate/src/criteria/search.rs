use sea_orm::{QueryFilter, Value};

use super::compiler::{CriteriaCompiler, LIKE_ESCAPE, Parameters};
use super::types::{Combinator, CriteriaNode, CriterionValue, Operator};
use crate::errors::CriteriaError;

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards so `%` and `_` in a term match themselves
fn escape_like_wildcards(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Free-text terms matched with `LIKE '%term%'` across a repository's search
/// columns, joined by `combinator`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTermSet {
    pub combinator: Combinator,
    pub terms: Vec<String>,
}

impl SearchTermSet {
    pub fn new<I, S>(combinator: Combinator, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            combinator,
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Split free text on whitespace into one set.
    ///
    /// Input past the length limit is cut off at a character boundary.
    #[must_use]
    pub fn parse(text: &str, combinator: Combinator) -> Self {
        let end = text
            .char_indices()
            .map(|(index, c)| index + c.len_utf8())
            .take_while(|&end| end <= MAX_SEARCH_QUERY_LENGTH)
            .last()
            .unwrap_or(0);
        Self::new(combinator, text[..end].split_whitespace())
    }

    /// Terms with surrounding whitespace removed, blanks dropped.
    fn effective_terms(&self) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .map(|term| term.trim())
            .filter(|term| !term.is_empty())
    }

    /// Expand into one group of `LIKE` leaves, term-major:
    /// `(t1 × c1, t1 × c2, t2 × c1, …)`.
    ///
    /// Wildcards inside a term are escaped: searching `50%` finds the text
    /// `50%`, not every value starting with `50`.
    #[must_use]
    pub fn expand(&self, columns: &[&str]) -> CriteriaNode {
        let children = self
            .effective_terms()
            .flat_map(|term| {
                columns.iter().map(move |column| {
                    CriteriaNode::leaf(
                        *column,
                        Operator::Like,
                        CriterionValue::Scalar(Value::from(format!(
                            "%{}%",
                            escape_like_wildcards(term)
                        ))),
                    )
                })
            })
            .collect();
        CriteriaNode::group(self.combinator, children)
    }
}

/// AND each search set onto `query` as its own group.
///
/// A repository without search columns ignores search requests: the query is
/// returned unchanged whatever `sets` contains.
///
/// # Errors
///
/// Any [`CriteriaError`] from the compiler.
pub fn apply_search_terms<Q>(
    mut query: Q,
    compiler: &CriteriaCompiler,
    parameters: &mut Parameters,
    columns: &[&str],
    sets: &[SearchTermSet],
) -> Result<Q, CriteriaError>
where
    Q: QueryFilter,
{
    if columns.is_empty() {
        if !sets.is_empty() {
            tracing::debug!(alias = compiler.alias(), "no search columns, ignoring search terms");
        }
        return Ok(query);
    }

    for set in sets {
        let group = set.expand(columns);
        let condition = compiler.compile(parameters, Combinator::And, std::slice::from_ref(&group))?;
        tracing::debug!(
            alias = compiler.alias(),
            combinator = %set.combinator,
            leaves = group.leaf_count(),
            "expanded search terms"
        );
        if !condition.is_empty() {
            query = query.filter(condition);
        }
    }

    Ok(query)
}
