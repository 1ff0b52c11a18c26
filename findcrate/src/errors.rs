//! # Error Handling
//!
//! Three layers of errors:
//! - [`CriteriaError`]: a criteria tree or search request could not be turned
//!   into a query. Raised while parsing or compiling, before anything runs.
//! - [`RepositoryError`]: what the repository adapters return, either a
//!   criteria error or the database error from Sea-ORM, both unchanged.
//! - [`ApiError`]: the HTTP-facing form for service code built on axum.
//!   Criteria errors become `400 Bad Request` with their message; database
//!   errors become a sanitized `500` and are logged through `tracing`.
//!
//! ```rust,ignore
//! async fn list_customers(
//!     State(db): State<DatabaseConnection>,
//!     Query(params): Query<FilterOptions>,
//! ) -> Result<Json<Vec<customer::Model>>, ApiError> {
//!     let query = params.to_list_query(CustomerRepository::DEFAULT_SEARCH_COMBINATOR)?;
//!     let (items, _total) = CustomerRepository::list(&db, &query).await?;
//!     Ok(Json(items))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// A criteria tree that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// A leaf that is not a well-formed `(field, operator, value)` triple.
    MalformedCriterion {
        /// Where in the tree the problem is (e.g. `or[1]`, `age`)
        path: String,
        /// What was wrong with it
        reason: String,
    },

    /// Operator string outside the recognized set.
    UnsupportedOperator {
        field: String,
        operator: String,
    },

    /// `between` without a 2-element pair, or `in`/`notIn` without a non-empty list.
    InvalidOperatorArity {
        field: String,
        operator: String,
        reason: String,
    },
}

impl CriteriaError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCriterion {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            field: field.into(),
            operator: operator.into(),
        }
    }

    pub fn arity(
        field: impl Into<String>,
        operator: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOperatorArity {
            field: field.into(),
            operator: operator.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCriterion { path, reason } if path.is_empty() => {
                write!(f, "Malformed criterion: {reason}")
            }
            Self::MalformedCriterion { path, reason } => {
                write!(f, "Malformed criterion at '{path}': {reason}")
            }
            Self::UnsupportedOperator { field, operator } => {
                write!(f, "Unsupported operator '{operator}' on field '{field}'")
            }
            Self::InvalidOperatorArity {
                field,
                operator,
                reason,
            } => write!(f, "Invalid value for '{operator}' on field '{field}': {reason}"),
        }
    }
}

impl std::error::Error for CriteriaError {}

/// Error returned by the repository adapters.
#[derive(Debug)]
pub enum RepositoryError {
    /// The criteria or search request could not be compiled
    Criteria(CriteriaError),
    /// The database rejected or failed the query
    Database(DbErr),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Criteria(err) => write!(f, "{err}"),
            Self::Database(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Criteria(err) => Some(err),
            Self::Database(err) => Some(err),
        }
    }
}

impl From<CriteriaError> for RepositoryError {
    fn from(err: CriteriaError) -> Self {
        Self::Criteria(err)
    }
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - the filter, search or sort parameters were invalid
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// The database error details are logged but NOT sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message } | Self::Database { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::BadRequest { message } => {
                tracing::debug!(error = %message, "Rejected query parameters");
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<CriteriaError> for ApiError {
    fn from(err: CriteriaError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}

/// Criteria errors keep their 400; database errors are sanitized to 500.
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Criteria(err) => err.into(),
            RepositoryError::Database(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_with_path() {
        let err = CriteriaError::malformed("or[1]", "expected [field, operator, value]");
        assert_eq!(
            err.to_string(),
            "Malformed criterion at 'or[1]': expected [field, operator, value]"
        );
    }

    #[test]
    fn test_malformed_message_without_path() {
        let err = CriteriaError::malformed("", "expected a JSON object or array");
        assert_eq!(err.to_string(), "Malformed criterion: expected a JSON object or array");
    }

    #[test]
    fn test_unsupported_operator_message() {
        let err = CriteriaError::unsupported("age", "foo");
        assert_eq!(err.to_string(), "Unsupported operator 'foo' on field 'age'");
    }

    #[test]
    fn test_criteria_error_becomes_bad_request() {
        let err: ApiError = CriteriaError::arity("age", "between", "expected 2 values").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.user_message(),
            "Invalid value for 'between' on field 'age': expected 2 values"
        );
    }

    #[test]
    fn test_database_error_is_sanitized() {
        let repo_err = RepositoryError::from(DbErr::Custom("no such column: secret".to_string()));
        let err: ApiError = repo_err.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "A database error occurred");
    }

    #[test]
    fn test_repository_error_source() {
        use std::error::Error;

        let err = RepositoryError::from(CriteriaError::unsupported("id", "foo"));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Unsupported operator 'foo' on field 'id'");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::bad_request("bad filter").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
