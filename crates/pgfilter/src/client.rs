//! Generic client trait for unified database access.

use crate::error::{FilterError, FilterResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
///
/// [`FilteredClient`](crate::FilteredClient) wraps any implementation, so a
/// filter can be applied the same way to a plain connection, a transaction or
/// a pooled client.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = FilterResult<Vec<Row>>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`FilterError::NotFound`] if no rows are returned. Extra rows
    /// are ignored.
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = FilterResult<Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| FilterError::not_found("Expected one row, got none"))
        }
    }

    /// Execute a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = FilterResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = FilterResult<u64>> + Send;

    /// Return a cancellation token for the underlying connection, if supported.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, params).await?)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        GenericClient::query(&***self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<u64> {
        GenericClient::execute(&***self, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        GenericClient::cancel_token(&***self)
    }
}
