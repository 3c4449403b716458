//! Error types for pgfilter

use thiserror::Error;

/// Result type alias for pgfilter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Severity reported for every rewrite failure.
pub const SEVERITY_ERROR: &str = "ERROR";

/// SQLSTATE `syntax_error`, reported when a filter expression cannot be applied.
pub const SQLSTATE_SYNTAX_ERROR: &str = "42601";

/// A Postgres-protocol shaped error describing a failed rewrite.
///
/// Mirrors the fields a server `ErrorResponse` would carry so callers can
/// handle it the same way as an error coming back from the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{severity}: {message} (SQLSTATE {code})")]
pub struct DbError {
    /// Always [`SEVERITY_ERROR`].
    pub severity: String,
    /// SQLSTATE code, [`SQLSTATE_SYNTAX_ERROR`].
    pub code: String,
    /// The offending filter expression.
    pub where_: String,
    /// Parser error detail.
    pub message: String,
    /// The statement text at the time of the failure.
    pub internal_query: String,
}

impl DbError {
    /// Create a syntax error for `expression` applied to `query`.
    pub fn syntax(
        expression: impl Into<String>,
        message: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            severity: SEVERITY_ERROR.to_string(),
            code: SQLSTATE_SYNTAX_ERROR.to_string(),
            where_: expression.into(),
            message: message.into(),
            internal_query: query.into(),
        }
    }
}

/// Error types for rewriting and executing filtered statements
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter expression could not be parsed or references an unknown column
    #[error("{0}")]
    Parse(DbError),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl FilterError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a filter parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// The structured protocol error, if this is a parse failure.
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for FilterError {
    fn from(err: DbError) -> Self {
        Self::Parse(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for FilterError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
